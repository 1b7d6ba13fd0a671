//! Error types for the filebinop-core library.
//!
//! Errors fall into three families: configuration errors raised while
//! resolving user parameters, the output-exists refusal of the overwrite
//! policy, and fatal I/O errors raised while transforming.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for filebinop operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all filebinop operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// No input file was supplied
    #[error("input file name not provided, pass it with --if INPUT_FILE")]
    MissingInput,

    /// No operation was supplied
    #[error("operation not provided, pass it with --op OPERATION")]
    MissingOperation,

    /// The operation name is not one of the supported set
    #[error("unsupported operation '{operation}', supported operations: {}", .supported.join(", "))]
    UnsupportedOperation {
        /// The name that was supplied
        operation: String,
        /// Names of the supported operations
        supported: Vec<&'static str>,
    },

    /// Comparator missing or not representable as a byte
    #[error("{}", comparator_message(.value))]
    InvalidComparator {
        /// The supplied value, if any
        value: Option<i64>,
    },

    /// Buffer size is not strictly positive
    #[error("buffer size must be positive, got {value}")]
    InvalidBufferSize {
        /// The supplied value
        value: i64,
    },

    /// Input path has no file name to derive an output name from
    #[error("input path '{path}' does not name a file")]
    InvalidInputPath {
        /// The offending path
        path: PathBuf,
    },

    /// Output file already exists and overwriting was not forced
    #[error("file '{path}' already exists, to overwrite it use the --force flag")]
    OutputExists {
        /// Path of the existing output file
        path: PathBuf,
    },

    /// Failed to remove a pre-existing output file
    #[error("failed to remove existing output file '{path}': {source}")]
    OutputRemove {
        /// Path of the output file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to open or stat the input file
    #[error("failed to open input file '{path}': {source}")]
    InputOpen {
        /// Path of the input file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Input path exists but is not a regular file
    #[error("input path '{path}' is not a regular file")]
    InputNotFile {
        /// Path of the input
        path: PathBuf,
    },

    /// Failed to open the output file
    #[error("failed to open output file '{path}': {source}")]
    OutputOpen {
        /// Path of the output file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to read from the input
    #[error("failed to read input after {offset} bytes: {source}")]
    Read {
        /// Bytes successfully read before the failure
        offset: u64,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to write to the output
    #[error("failed to write output after {offset} bytes: {source}")]
    Write {
        /// Bytes successfully written before the failure
        offset: u64,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The output accepted fewer bytes than were read for the chunk
    #[error("short write: {written} of {expected} bytes written to output")]
    ShortWrite {
        /// Bytes in the chunk
        expected: usize,
        /// Bytes the output accepted
        written: usize,
    },
}

impl Error {
    /// Creates a new unsupported operation error
    pub fn unsupported_operation(
        operation: impl Into<String>,
        supported: impl IntoIterator<Item = &'static str>,
    ) -> Self {
        Self::UnsupportedOperation {
            operation: operation.into(),
            supported: supported.into_iter().collect(),
        }
    }

    /// Creates a new invalid comparator error
    pub fn invalid_comparator(value: Option<i64>) -> Self {
        Self::InvalidComparator { value }
    }

    /// Creates a new invalid input path error
    pub fn invalid_input_path(path: impl Into<PathBuf>) -> Self {
        Self::InvalidInputPath { path: path.into() }
    }

    /// Creates a new output exists error
    pub fn output_exists(path: impl Into<PathBuf>) -> Self {
        Self::OutputExists { path: path.into() }
    }

    /// Creates a new output removal error
    pub fn output_remove(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::OutputRemove {
            path: path.into(),
            source,
        }
    }

    /// Creates a new input open error
    pub fn input_open(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::InputOpen {
            path: path.into(),
            source,
        }
    }

    /// Creates a new output open error
    pub fn output_open(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::OutputOpen {
            path: path.into(),
            source,
        }
    }

    /// Returns true for errors caused by invalid user parameters
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::MissingInput
                | Self::MissingOperation
                | Self::UnsupportedOperation { .. }
                | Self::InvalidComparator { .. }
                | Self::InvalidBufferSize { .. }
                | Self::InvalidInputPath { .. }
        )
    }

    /// Returns true for unrecoverable I/O failures
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::OutputRemove { .. }
                | Self::InputOpen { .. }
                | Self::InputNotFile { .. }
                | Self::OutputOpen { .. }
                | Self::Read { .. }
                | Self::Write { .. }
                | Self::ShortWrite { .. }
        )
    }
}

fn comparator_message(value: &Option<i64>) -> String {
    match value {
        Some(v) => format!("comparator {v} cannot be used, value must be a byte (0-255)"),
        None => "comparator not provided, pass it with --comp N".to_string(),
    }
}
