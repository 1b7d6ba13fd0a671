//! Streaming transform engine.
//!
//! The engine reads the input in chunks of at most the configured buffer
//! size, applies the configured [`BinaryOp`] to each chunk in place and
//! appends the chunk to the output. Memory use is bounded by the buffer, and
//! the input is read once, front to back.
//!
//! ## Lifecycle
//!
//! 1. [`Transformer::prepare`] applies the overwrite policy, so the output
//!    path is always free (or forcibly freed) before anything is appended.
//! 2. [`Transformer::run`] opens both files and drives a
//!    [`TransformSession`] to the end of the input.
//!
//! Every failure is terminal. Both file handles are owned by the session and
//! closed when it is dropped, on success and on error. Output already written
//! when an error occurs is left in place.

pub mod progress;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::op::BinaryOp;
use crate::output::{apply_overwrite_policy, OutputState};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use tracing::{debug, trace};

pub use progress::{ConsoleProgress, NullProgress, Progress, StatsProgress};

/// Totals of a completed transform
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TransformReport {
    /// Bytes read from the input
    pub bytes_read: u64,
    /// Bytes written to the output
    pub bytes_written: u64,
    /// Number of non-empty chunks processed
    pub chunks: u64,
}

/// A file-to-file transform whose output path has been cleared
#[derive(Debug)]
pub struct Transformer {
    config: Config,
    output_state: OutputState,
}

impl Transformer {
    /// Applies the overwrite policy and returns a transformer ready to run
    pub fn prepare(config: Config) -> Result<Self> {
        let output_state = apply_overwrite_policy(&config)?;
        Ok(Self {
            config,
            output_state,
        })
    }

    /// The configuration this transformer runs with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether a previous output file was removed during preparation
    pub fn output_state(&self) -> OutputState {
        self.output_state
    }

    /// Transforms the input file into the output file.
    ///
    /// `progress` receives events only when the config is verbose.
    pub fn run(self, progress: &mut dyn Progress) -> Result<TransformReport> {
        let config = self.config;
        let input_path = config.input();
        let output_path = config.output();

        let input = File::open(input_path).map_err(|e| Error::input_open(input_path, e))?;
        let metadata = input
            .metadata()
            .map_err(|e| Error::input_open(input_path, e))?;
        if !metadata.is_file() {
            return Err(Error::InputNotFile {
                path: input_path.to_path_buf(),
            });
        }
        let total = metadata.len();

        // Append, never truncate: preparation already removed any old file
        let output = OpenOptions::new()
            .create(true)
            .append(true)
            .open(output_path)
            .map_err(|e| Error::output_open(output_path, e))?;

        debug!(
            "Transforming {} -> {} ({} {:#04x}, {} bytes)",
            input_path.display(),
            output_path.display(),
            config.operation(),
            config.comparator(),
            total
        );

        // Small inputs do not need the full buffer
        let capacity = usize::try_from(total)
            .map_or(config.buffer_size(), |t| config.buffer_size().min(t.max(1)));

        let session = TransformSession::new(
            input,
            output,
            config.operation(),
            config.comparator(),
            capacity,
            total,
        );

        if config.verbose() {
            session.run(progress)
        } else {
            session.run(&mut NullProgress)
        }
    }
}

/// Prepares and runs a transform in one call
pub fn transform_file(config: Config, progress: &mut dyn Progress) -> Result<TransformReport> {
    Transformer::prepare(config)?.run(progress)
}

/// One read-transform-write pass over a reader and a writer.
///
/// The session owns both streams and a single transfer buffer that is reused
/// for every chunk.
#[derive(Debug)]
pub struct TransformSession<R, W> {
    reader: R,
    writer: W,
    operation: BinaryOp,
    comparator: u8,
    buffer: Vec<u8>,
    total: u64,
    report: TransformReport,
}

impl<R: Read, W: Write> TransformSession<R, W> {
    /// Creates a session.
    ///
    /// `total` is the expected input size and is used for progress only.
    /// A `buffer_size` of zero is treated as one.
    pub fn new(
        reader: R,
        writer: W,
        operation: BinaryOp,
        comparator: u8,
        buffer_size: usize,
        total: u64,
    ) -> Self {
        Self {
            reader,
            writer,
            operation,
            comparator,
            buffer: vec![0; buffer_size.max(1)],
            total,
            report: TransformReport::default(),
        }
    }

    /// Runs until the reader reports end of input.
    ///
    /// Each chunk is handed to the writer in a single `write` call; a writer
    /// that accepts fewer bytes fails the run with [`Error::ShortWrite`].
    /// Reads and writes interrupted by a signal are reissued.
    pub fn run(mut self, progress: &mut dyn Progress) -> Result<TransformReport> {
        progress.start(self.total);

        loop {
            let n = match self.reader.read(&mut self.buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(Error::Read {
                        offset: self.report.bytes_read,
                        source,
                    })
                }
            };
            self.report.bytes_read += n as u64;
            progress.chunk_read(self.report.bytes_read, self.total);

            let chunk = &mut self.buffer[..n];
            self.operation.apply_in_place(chunk, self.comparator);

            let written = loop {
                match self.writer.write(chunk) {
                    Ok(written) => break written,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(source) => {
                        return Err(Error::Write {
                            offset: self.report.bytes_written,
                            source,
                        })
                    }
                }
            };
            if written < n {
                return Err(Error::ShortWrite {
                    expected: n,
                    written,
                });
            }

            self.report.bytes_written += n as u64;
            self.report.chunks += 1;
            trace!(
                "Chunk {}: {} bytes, {} of {} done",
                self.report.chunks,
                n,
                self.report.bytes_read,
                self.total
            );
            progress.chunk_written(n);
        }

        self.writer.flush().map_err(|source| Error::Write {
            offset: self.report.bytes_written,
            source,
        })?;

        debug!(
            "Transform complete: {} bytes in {} chunks",
            self.report.bytes_written, self.report.chunks
        );
        progress.finish(&self.report);
        Ok(self.report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn run_stream(input: &[u8], op: BinaryOp, comparator: u8, buffer_size: usize) -> Vec<u8> {
        let mut out = Vec::new();
        let session = TransformSession::new(
            Cursor::new(input),
            &mut out,
            op,
            comparator,
            buffer_size,
            input.len() as u64,
        );
        session.run(&mut NullProgress).unwrap();
        out
    }

    /// Accepts at most `limit` bytes per write
    struct ShortWriter {
        limit: usize,
    }

    impl Write for ShortWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len().min(self.limit))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct FailingReader;

    /// Fails the first read with `Interrupted`, then serves `data`
    struct InterruptedReader {
        interrupted: bool,
        data: Cursor<Vec<u8>>,
    }

    impl Read for InterruptedReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(io::Error::from(io::ErrorKind::Interrupted));
            }
            self.data.read(buf)
        }
    }

    /// Accepts `ok_writes` writes into `out`, then fails every write with
    /// `kind`; an `Interrupted` failure happens only once
    struct FlakyWriter {
        out: Vec<u8>,
        ok_writes: usize,
        kind: io::ErrorKind,
        failed: bool,
    }

    impl FlakyWriter {
        fn new(ok_writes: usize, kind: io::ErrorKind) -> Self {
            Self {
                out: Vec::new(),
                ok_writes,
                kind,
                failed: false,
            }
        }
    }

    impl Write for FlakyWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let fail = self.ok_writes == 0
                && !(self.failed && self.kind == io::ErrorKind::Interrupted);
            if fail {
                self.failed = true;
                return Err(io::Error::new(self.kind, "write failed"));
            }
            self.ok_writes = self.ok_writes.saturating_sub(1);
            self.out.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "device gone"))
        }
    }

    #[test]
    fn test_xor_example() {
        assert_eq!(
            run_stream(&[0x00, 0xFF, 0x0F], BinaryOp::Xor, 0xFF, 16),
            vec![0xFF, 0x00, 0xF0]
        );
    }

    #[test]
    fn test_and_or() {
        let input = [0b1100_1100, 0b0011_0011];
        assert_eq!(
            run_stream(&input, BinaryOp::And, 0b1010_1010, 1),
            vec![0b1000_1000, 0b0010_0010]
        );
        assert_eq!(
            run_stream(&input, BinaryOp::Or, 0b1010_1010, 1),
            vec![0b1110_1110, 0b1011_1011]
        );
    }

    #[test]
    fn test_chunking_invariance() {
        let input: Vec<u8> = (0..1000u32).map(|i| (i * 31 % 251) as u8).collect();
        let expected = run_stream(&input, BinaryOp::Xor, 0x3C, input.len() + 1);
        for size in [1, 7, 64, 999, 1000] {
            assert_eq!(run_stream(&input, BinaryOp::Xor, 0x3C, size), expected, "buffer {size}");
        }
    }

    #[test]
    fn test_empty_input() {
        let mut progress = StatsProgress::default();
        let mut out = Vec::new();
        let session =
            TransformSession::new(Cursor::new(Vec::<u8>::new()), &mut out, BinaryOp::Or, 1, 8, 0);
        let report = session.run(&mut progress).unwrap();

        assert!(out.is_empty());
        assert_eq!(report, TransformReport::default());
        assert_eq!(progress.chunks_read, 0);
        assert!(progress.finished);
    }

    #[test]
    fn test_report_and_progress_per_chunk() {
        let input = vec![7u8; 20];
        let mut progress = StatsProgress::default();
        let mut out = Vec::new();
        let report = TransformSession::new(Cursor::new(&input), &mut out, BinaryOp::And, 3, 8, 20)
            .run(&mut progress)
            .unwrap();

        assert_eq!(
            report,
            TransformReport {
                bytes_read: 20,
                bytes_written: 20,
                chunks: 3,
            }
        );
        assert_eq!(progress.total, 20);
        assert_eq!(progress.chunks_read, 3);
        assert_eq!(progress.chunks_written, 3);
        assert_eq!(progress.bytes_written, 20);
        assert!(progress.finished);
    }

    #[test]
    fn test_short_write_is_fatal() {
        let session = TransformSession::new(
            Cursor::new(vec![1u8; 10]),
            ShortWriter { limit: 4 },
            BinaryOp::Xor,
            1,
            10,
            10,
        );
        let err = session.run(&mut NullProgress).unwrap_err();
        assert!(matches!(
            err,
            Error::ShortWrite {
                expected: 10,
                written: 4
            }
        ));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_read_error_is_fatal() {
        let mut progress = StatsProgress::default();
        let err = TransformSession::new(FailingReader, Vec::<u8>::new(), BinaryOp::Xor, 1, 4, 4)
            .run(&mut progress)
            .unwrap_err();
        assert!(matches!(err, Error::Read { offset: 0, .. }));
        assert!(!progress.finished);
    }

    #[test]
    fn test_interrupted_read_is_reissued() {
        let reader = InterruptedReader {
            interrupted: false,
            data: Cursor::new(vec![1, 2, 3]),
        };
        let mut out = Vec::new();
        let report = TransformSession::new(reader, &mut out, BinaryOp::Xor, 0xFF, 8, 3)
            .run(&mut NullProgress)
            .unwrap();

        assert_eq!(report.bytes_written, 3);
        assert_eq!(out, vec![0xFE, 0xFD, 0xFC]);
    }

    #[test]
    fn test_interrupted_write_is_reissued() {
        let mut writer = FlakyWriter::new(1, io::ErrorKind::Interrupted);
        let report = TransformSession::new(
            Cursor::new(vec![0u8; 6]),
            &mut writer,
            BinaryOp::Or,
            0x0F,
            3,
            6,
        )
        .run(&mut NullProgress)
        .unwrap();

        assert_eq!(report.chunks, 2);
        assert_eq!(writer.out, vec![0x0F; 6]);
    }

    #[test]
    fn test_write_error_is_fatal() {
        let mut progress = StatsProgress::default();
        let mut writer = FlakyWriter::new(0, io::ErrorKind::Other);
        let session = TransformSession::new(
            Cursor::new(vec![1u8; 4]),
            &mut writer,
            BinaryOp::Xor,
            1,
            4,
            4,
        );
        let err = session.run(&mut progress).unwrap_err();

        assert!(matches!(err, Error::Write { offset: 0, .. }));
        assert!(err.is_fatal());
        assert!(!progress.finished);
        assert!(writer.out.is_empty());
    }

    #[test]
    fn test_write_error_reports_offset_of_written_chunks() {
        let mut progress = StatsProgress::default();
        let mut writer = FlakyWriter::new(1, io::ErrorKind::BrokenPipe);
        let session = TransformSession::new(
            Cursor::new(vec![1u8; 8]),
            &mut writer,
            BinaryOp::Xor,
            1,
            4,
            8,
        );
        let err = session.run(&mut progress).unwrap_err();

        assert!(matches!(err, Error::Write { offset: 4, .. }));
        assert_eq!(progress.chunks_written, 1);
        assert!(!progress.finished);
        assert_eq!(writer.out, vec![0u8; 4]);
    }

    #[test]
    fn test_zero_buffer_size_still_progresses() {
        assert_eq!(run_stream(&[1, 2, 3], BinaryOp::Xor, 1, 0), vec![0, 3, 2]);
    }
}
