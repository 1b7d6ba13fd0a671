//! filebinop - Apply a bitwise operation with a constant byte to a file
//!
//! Every byte of the input file is combined with the comparator byte using
//! XOR, AND or OR, and the result is streamed to the output file.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use filebinop_core::{
    format_bytes, Config, ConsoleProgress, OutputState, Transformer, DEFAULT_BUFFER_SIZE,
    OUTPUT_PREFIX,
};
use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info, Level};
use tracing_subscriber::EnvFilter;

/// How a run ended when no fatal error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    /// The transform completed
    Done,
    /// The invocation was rejected before anything was written
    Rejected,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Done => ExitCode::SUCCESS,
            Outcome::Rejected => ExitCode::from(2),
        }
    }
}

/// Apply XOR, AND or OR with a constant byte to every byte of a file
#[derive(Parser, Debug)]
#[command(name = "filebinop")]
#[command(author, version, about, long_about = None)]
#[command(override_usage = "filebinop --if INPUT_FILE --op OPERATION --comp VAL [OPTIONS]")]
struct Cli {
    /// Input file to transform
    #[arg(long = "if", value_name = "INPUT_FILE")]
    input: Option<PathBuf>,

    /// Output file [default: input directory + "modified_" + input file name]
    #[arg(long = "of", value_name = "OUTPUT_FILE")]
    output: Option<PathBuf>,

    /// Operation to apply: XOR, AND or OR
    #[arg(long = "op", value_name = "OPERATION")]
    operation: Option<String>,

    /// Comparator byte value (0-255)
    #[arg(long = "comp", value_name = "VAL", allow_negative_numbers = true)]
    comparator: Option<i64>,

    /// Remove an existing output file before writing
    #[arg(long)]
    force: bool,

    /// Buffer size in bytes used for each read and write [default: 70000000]
    #[arg(long = "buf", value_name = "BYTES", allow_negative_numbers = true)]
    buffer_size: Option<i64>,

    /// Do not print progress while processing
    #[arg(long)]
    quiet: bool,

    /// Diagnostic log verbosity on stderr (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Collects the raw arguments into a validated config
    fn config(&self) -> filebinop_core::Result<Config> {
        let mut builder = Config::builder()
            .force_overwrite(self.force)
            .verbose(!self.quiet);

        if let Some(ref input) = self.input {
            builder = builder.input(input);
        }
        if let Some(ref output) = self.output {
            builder = builder.output(output);
        }
        if let Some(ref operation) = self.operation {
            builder = builder.operation(operation);
        }
        if let Some(comparator) = self.comparator {
            builder = builder.comparator(comparator);
        }
        if let Some(size) = self.buffer_size {
            builder = builder.buffer_size(size);
        }

        builder.build()
    }
}

fn main() -> Result<ExitCode> {
    let args: Vec<OsString> = std::env::args_os().collect();

    // A bare invocation (or a single argument other than --version) only asks for usage
    let version = matches!(args.get(1).and_then(|a| a.to_str()), Some("--version" | "-V"));
    if args.len() < 3 && !version {
        print_help()?;
        return Ok(ExitCode::SUCCESS);
    }

    let cli = Cli::parse_from(args);

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    run(&cli).map(ExitCode::from)
}

/// Resolves the config, applies the overwrite policy and runs the transform
fn run(cli: &Cli) -> Result<Outcome> {
    let config = match cli.config() {
        Ok(config) => config,
        Err(e) if e.is_configuration_error() => {
            eprintln!("ERROR: {e}");
            print_help()?;
            return Ok(Outcome::Rejected);
        }
        Err(e) => return Err(e).context("Failed to resolve configuration"),
    };

    debug!(
        "Resolved config: {} {} {} -> {} (buffer {})",
        config.operation(),
        config.comparator(),
        config.input().display(),
        config.output().display(),
        format_bytes(config.buffer_size() as u64)
    );

    let transformer = match Transformer::prepare(config) {
        Ok(transformer) => transformer,
        // Only the overwrite refusal is non-fatal here
        Err(e) if !e.is_fatal() => {
            eprintln!("ERROR: {e}");
            return Ok(Outcome::Rejected);
        }
        Err(e) => return Err(e).context("Failed to prepare output file"),
    };

    if transformer.output_state() == OutputState::Replaced {
        info!(
            "Overwriting existing file: {}",
            transformer.config().output().display()
        );
    }

    let input = transformer.config().input().to_path_buf();
    let report = transformer
        .run(&mut ConsoleProgress::new(io::stdout().lock()))
        .with_context(|| format!("Failed to transform {}", input.display()))?;

    info!(
        "Transformed {} bytes in {} chunk(s)",
        report.bytes_written, report.chunks
    );

    Ok(Outcome::Done)
}

fn print_help() -> Result<()> {
    let mut cmd = Cli::command().after_help(format!(
        "Without --of the output is written next to the input as \"{OUTPUT_PREFIX}<name>\".\n\
         The default buffer size is {DEFAULT_BUFFER_SIZE} bytes ({}).",
        format_bytes(DEFAULT_BUFFER_SIZE as u64)
    ));
    cmd.print_help().context("Failed to print usage")?;
    println!();
    Ok(())
}
