//! Output overwrite policy.

use crate::config::Config;
use crate::error::{Error, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// What the overwrite policy did to the output path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputState {
    /// No regular file existed at the output path
    Fresh,
    /// A pre-existing output file was removed
    Replaced,
}

/// Returns true if `path` names an existing file that is not a directory
fn file_exists(path: &Path) -> bool {
    fs::metadata(path).map(|m| !m.is_dir()).unwrap_or(false)
}

/// Ensures the output path is free before the engine appends to it.
///
/// An existing output file is an [`Error::OutputExists`] unless the config
/// forces overwriting, in which case the file is removed.
pub fn apply_overwrite_policy(config: &Config) -> Result<OutputState> {
    let output = config.output();

    if !file_exists(output) {
        debug!("Output path is free: {}", output.display());
        return Ok(OutputState::Fresh);
    }

    if !config.force_overwrite() {
        return Err(Error::output_exists(output));
    }

    fs::remove_file(output).map_err(|e| Error::output_remove(output, e))?;
    info!("Removed existing output file: {}", output.display());
    Ok(OutputState::Replaced)
}
