//! Parses a Djinni IDL file and prints its syntax tree.
//!
//! Usage: `djinni-ast path/to/file.djinni | jq .`

use std::{
    error::Error,
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::{ArgAction, Parser, ValueEnum};
use djinni::{
    parser::{ParseOptions, DEFAULT_MAX_ERRORS},
    source::{self, SourceError},
    util::fmt::{error::render, tree},
};
use tracing_subscriber::EnvFilter;

/// Parses a Djinni IDL file and prints its syntax tree.
#[derive(Debug, Parser)]
#[command(name = "djinni-ast", version, about, long_about = None)]
struct Cli {
    /// The `.djinni` file to parse
    path: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Stop parsing once more than this many errors were found
    #[arg(long, default_value_t = DEFAULT_MAX_ERRORS)]
    max_errors: usize,

    /// Never stop parsing early, however many errors are found
    #[arg(long, conflicts_with = "max_errors")]
    no_error_limit: bool,

    /// Increase logging verbosity (-v, -vv, -vvv). `RUST_LOG` takes precedence
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    /// One JSON document
    Json,
    /// Indented, human-readable tree
    Tree,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("failed to serialize the syntax tree")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write output")]
    Io(#[from] io::Error),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            report(&cli, &error);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_directive = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        // stdout carries the tree
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let options = ParseOptions {
        max_errors: (!cli.no_error_limit).then_some(cli.max_errors),
    };
    let file = source::parse_path(&cli.path, None, options)?;
    tracing::info!(
        imports = file.imports.len(),
        decls = file.type_decls.len(),
        "parsed"
    );

    let mut out = io::stdout().lock();
    match cli.format {
        Format::Json if cli.pretty => serde_json::to_writer_pretty(&mut out, &file)?,
        Format::Json => serde_json::to_writer(&mut out, &file)?,
        Format::Tree => tree::print_file(&mut out, &file)?,
    }
    if cli.format == Format::Json {
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

fn report(cli: &Cli, error: &CliError) {
    if let CliError::Source(SourceError::Syntax { src, errors, .. }) = error {
        let path = cli.path.display().to_string();
        for e in errors {
            eprintln!("{}", render(&path, src, e));
        }
    }
    eprintln!("error: {error}");
    let mut source = error.source();
    while let Some(cause) = source {
        eprintln!("  caused by: {cause}");
        source = cause.source();
    }
}
