//! Transform configuration.
//!
//! Raw user parameters are collected in a [`ConfigBuilder`] and validated
//! once by [`ConfigBuilder::build`], producing an immutable [`Config`].
//! Building never touches the filesystem.

use crate::error::{Error, Result};
use crate::op::BinaryOp;
use std::path::{Path, PathBuf};

/// Default size of the transfer buffer, in bytes
pub const DEFAULT_BUFFER_SIZE: usize = 70_000_000;

/// Prefix prepended to the input file name when no output path is given
pub const OUTPUT_PREFIX: &str = "modified_";

/// Validated parameters for one transform run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    input: PathBuf,
    output: PathBuf,
    operation: BinaryOp,
    comparator: u8,
    force_overwrite: bool,
    buffer_size: usize,
    verbose: bool,
}

impl Config {
    /// Starts a new builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Path of the file to read
    pub fn input(&self) -> &Path {
        &self.input
    }

    /// Path of the file to write
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Operation applied to every byte
    pub fn operation(&self) -> BinaryOp {
        self.operation
    }

    /// Byte combined with every input byte
    pub fn comparator(&self) -> u8 {
        self.comparator
    }

    /// Whether a pre-existing output file may be removed
    pub fn force_overwrite(&self) -> bool {
        self.force_overwrite
    }

    /// Transfer buffer size in bytes, always greater than zero
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Whether progress should be reported
    pub fn verbose(&self) -> bool {
        self.verbose
    }
}

/// Collects raw, unvalidated parameters for a [`Config`]
///
/// Numeric parameters are accepted as signed integers so that out-of-range
/// user input (`-1`, `256`) is reported by [`build`](Self::build) rather than
/// by whatever parsed it.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    operation: Option<String>,
    comparator: Option<i64>,
    force_overwrite: bool,
    buffer_size: Option<i64>,
    verbose: bool,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self {
            input: None,
            output: None,
            operation: None,
            comparator: None,
            force_overwrite: false,
            buffer_size: None,
            verbose: true,
        }
    }
}

impl ConfigBuilder {
    /// Creates a builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the input file path
    pub fn input(mut self, path: impl Into<PathBuf>) -> Self {
        self.input = Some(path.into());
        self
    }

    /// Sets the output file path
    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    /// Sets the operation by name (`XOR`, `AND` or `OR`)
    pub fn operation(mut self, name: impl Into<String>) -> Self {
        self.operation = Some(name.into());
        self
    }

    /// Sets the comparator value
    pub fn comparator(mut self, value: i64) -> Self {
        self.comparator = Some(value);
        self
    }

    /// Sets whether an existing output file may be removed
    pub fn force_overwrite(mut self, force: bool) -> Self {
        self.force_overwrite = force;
        self
    }

    /// Sets the transfer buffer size in bytes
    pub fn buffer_size(mut self, size: i64) -> Self {
        self.buffer_size = Some(size);
        self
    }

    /// Sets whether progress is reported
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Validates the parameters and resolves the output path
    pub fn build(self) -> Result<Config> {
        let input = self.input.ok_or(Error::MissingInput)?;
        let operation: BinaryOp = self.operation.ok_or(Error::MissingOperation)?.parse()?;

        let comparator = self
            .comparator
            .and_then(|c| u8::try_from(c).ok())
            .ok_or_else(|| Error::invalid_comparator(self.comparator))?;

        let buffer_size = match self.buffer_size {
            None => DEFAULT_BUFFER_SIZE,
            Some(value) => usize::try_from(value)
                .ok()
                .filter(|&size| size > 0)
                .ok_or(Error::InvalidBufferSize { value })?,
        };

        let output = match self.output {
            Some(output) => output,
            None => default_output_path(&input)?,
        };

        Ok(Config {
            input,
            output,
            operation,
            comparator,
            force_overwrite: self.force_overwrite,
            buffer_size,
            verbose: self.verbose,
        })
    }
}

/// Derives the output path for `input`: same directory, file name prefixed
/// with [`OUTPUT_PREFIX`].
///
/// `dir/name.ext` becomes `dir/modified_name.ext`.
pub fn default_output_path(input: &Path) -> Result<PathBuf> {
    let name = input
        .file_name()
        .ok_or_else(|| Error::invalid_input_path(input))?;

    let mut prefixed = std::ffi::OsString::from(OUTPUT_PREFIX);
    prefixed.push(name);

    Ok(match input.parent() {
        Some(dir) => dir.join(prefixed),
        None => PathBuf::from(prefixed),
    })
}
