//! Progress observers for the transform loop.
//!
//! The engine reports what it is doing through the [`Progress`] trait.
//! Observers only watch: they cannot fail the transform or change what it
//! writes.

use super::TransformReport;
use crate::units::format_bytes;
use std::io::Write;

/// Receives progress events from a running transform.
///
/// Every method has a no-op default, so implementors only override the
/// events they care about.
pub trait Progress {
    /// Called once after both files are open, with the input size in bytes
    fn start(&mut self, total: u64) {
        let _ = total;
    }

    /// Called after each read, before the chunk is transformed
    fn chunk_read(&mut self, read_so_far: u64, total: u64) {
        let _ = (read_so_far, total);
    }

    /// Called after a chunk of `len` bytes has been written
    fn chunk_written(&mut self, len: usize) {
        let _ = len;
    }

    /// Called once when the input is exhausted and output is flushed
    fn finish(&mut self, report: &TransformReport) {
        let _ = report;
    }
}

/// An observer that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl Progress for NullProgress {}

/// An observer that counts events
#[derive(Debug, Default)]
pub struct StatsProgress {
    /// Input size announced by `start`
    pub total: u64,
    /// Number of chunks read
    pub chunks_read: usize,
    /// Number of chunks written
    pub chunks_written: usize,
    /// Sum of the written chunk lengths
    pub bytes_written: u64,
    /// Whether `finish` was called
    pub finished: bool,
}

impl Progress for StatsProgress {
    fn start(&mut self, total: u64) {
        self.total = total;
    }

    fn chunk_read(&mut self, _read_so_far: u64, _total: u64) {
        self.chunks_read += 1;
    }

    fn chunk_written(&mut self, len: usize) {
        self.chunks_written += 1;
        self.bytes_written += len as u64;
    }

    fn finish(&mut self, _report: &TransformReport) {
        self.finished = true;
    }
}

/// Prints human-readable progress lines to a writer (usually stdout).
///
/// Failures writing progress are ignored.
#[derive(Debug)]
pub struct ConsoleProgress<W: Write> {
    out: W,
}

impl<W: Write> ConsoleProgress<W> {
    /// Creates an observer printing to `out`
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Returns the underlying writer
    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Share of `total` that `done` represents, in percent
fn percent(done: u64, total: u64) -> f64 {
    if total == 0 {
        100.0
    } else {
        100.0 * done as f64 / total as f64
    }
}

impl<W: Write> Progress for ConsoleProgress<W> {
    fn start(&mut self, total: u64) {
        let _ = writeln!(
            self.out,
            "Processing input file with size: {}",
            format_bytes(total)
        );
    }

    fn chunk_read(&mut self, read_so_far: u64, total: u64) {
        let _ = write!(
            self.out,
            "Read {} bytes ({}), out of {} ({:.1} percent)...",
            read_so_far,
            format_bytes(read_so_far),
            total,
            percent(read_so_far, total)
        );
        let _ = self.out.flush();
    }

    fn chunk_written(&mut self, _len: usize) {
        let _ = writeln!(self.out, " Done!");
    }

    fn finish(&mut self, report: &TransformReport) {
        let _ = writeln!(
            self.out,
            "Wrote {} ({} bytes) in {} chunk(s)",
            format_bytes(report.bytes_written),
            report.bytes_written,
            report.chunks
        );
        let _ = self.out.flush();
    }
}
