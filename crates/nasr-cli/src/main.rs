//! NASR - distribution inspection tool

use anyhow::Result;
use clap::Parser;
use nasr_cli::commands;
use nasr_common::checksum::ChecksumAlgorithm;
use nasr_common::logging::{init_logging, LogConfig, LogLevel};
use nasr_dist::{LayoutFormat, RecordType};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "nasr")]
#[command(author, version, about = "NASR distribution inspection tool")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Parser, Debug)]
enum Command {
    /// Parse record types from a distribution and report counts
    Parse {
        /// Distribution archive (.zip) or extracted directory
        path: PathBuf,

        /// Layout format; detected from the path name when omitted
        #[arg(short, long)]
        format: Option<LayoutFormat>,

        /// Record types to parse, comma separated (default: all)
        #[arg(short, long, value_delimiter = ',')]
        types: Vec<RecordType>,

        /// Emit assembled records as JSON
        #[arg(long)]
        json: bool,

        /// Show a byte-progress bar while reading
        #[arg(long)]
        progress: bool,
    },

    /// Print the effective cycle date of a distribution
    Cycle {
        /// Distribution archive (.zip) or extracted directory
        path: PathBuf,

        /// Layout format; detected from the path name when omitted
        #[arg(short, long)]
        format: Option<LayoutFormat>,
    },

    /// Verify a downloaded archive against an expected checksum
    Verify {
        /// Archive file to hash
        path: PathBuf,

        /// Expected hex digest
        #[arg(long)]
        digest: String,

        /// Checksum algorithm
        #[arg(long, default_value = "sha256")]
        algorithm: ChecksumAlgorithm,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Environment variables take precedence, then the verbose flag.
    let mut log_config = LogConfig::from_env().unwrap_or_else(|_| {
        LogConfig::builder()
            .log_file_prefix("nasr".to_string())
            .build()
    });
    if cli.verbose {
        log_config.level = LogLevel::Debug;
    }

    init_logging(&log_config)?;

    match cli.command {
        Command::Parse {
            path,
            format,
            types,
            json,
            progress,
        } => {
            commands::parse(&path, format, &types, json, progress).await?;
        },
        Command::Cycle { path, format } => {
            commands::cycle(&path, format).await?;
        },
        Command::Verify {
            path,
            digest,
            algorithm,
        } => {
            commands::verify(&path, &digest, algorithm).await?;
        },
    }

    Ok(())
}
