//! # filebinop-core
//!
//! A library for applying a bitwise operation between every byte of a file
//! and a fixed comparator byte.
//!
//! This crate provides the core functionality for:
//! - Validating transform parameters into an immutable configuration
//! - Enforcing the output overwrite policy
//! - Streaming a file through XOR, AND or OR in bounded memory
//!
//! ## Architecture
//!
//! - [`config`]: Parameter validation and default output naming
//! - [`op`]: The supported byte operations
//! - [`output`]: Overwrite policy for the output path
//! - [`engine`]: The read-transform-write loop and progress observers
//! - [`units`]: Human-readable byte counts
//! - [`error`]: Error types and handling
//!
//! ## Example
//!
//! ```no_run
//! use filebinop_core::{Config, ConsoleProgress, Transformer};
//!
//! let config = Config::builder()
//!     .input("firmware.bin")
//!     .operation("XOR")
//!     .comparator(0x5A)
//!     .build()?;
//!
//! let report = Transformer::prepare(config)?.run(&mut ConsoleProgress::new(std::io::stdout()))?;
//! println!("{} bytes written", report.bytes_written);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Extensibility
//!
//! - [`Progress`]: Observe the transform as it runs
//! - [`TransformSession`]: Run the loop over any `Read`/`Write` pair

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod config;
pub mod engine;
pub mod error;
pub mod op;
pub mod output;
pub mod units;

// Re-export primary types for convenience
pub use config::{Config, ConfigBuilder, DEFAULT_BUFFER_SIZE, OUTPUT_PREFIX};
pub use engine::{
    transform_file, ConsoleProgress, NullProgress, Progress, StatsProgress, TransformReport,
    TransformSession, Transformer,
};
pub use error::{Error, Result};
pub use op::BinaryOp;
pub use output::{apply_overwrite_policy, OutputState};
pub use units::format_bytes;

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
