//! bspec CLI - runs behavior specifications and inspects closure descriptors

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use tracing::{error, info};

mod commands;
mod samples;

use commands::*;

/// bspec - behavior specifications with parallel examples
#[derive(Parser)]
#[command(name = "bspec")]
#[command(about = "Run behavior specifications and inspect closure descriptors")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the bundled sample specifications
    Run {
        /// Number of worker threads (defaults to hardware parallelism)
        #[arg(short, long)]
        threads: Option<usize>,
        /// Only run examples whose subject or description contains this text
        #[arg(long)]
        filter: Option<String>,
        /// Reporter
        #[arg(short, long, value_enum, default_value = "console")]
        reporter: ReporterKind,
    },

    /// Print the field map of a closure descriptor file
    Decode {
        /// Descriptor file
        input: PathBuf,
        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: DecodeFormat,
    },

    /// Write a closure descriptor file for an accessor method
    Encode {
        /// Implementation method name
        method: String,
        /// Output file
        #[arg(short, long)]
        output: PathBuf,
        /// Method signature (defaults to `()`)
        #[arg(long)]
        signature: Option<String>,
        /// Class declaring the method
        #[arg(long)]
        impl_class: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReporterKind {
    Console,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DecodeFormat {
    Table,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose)?;

    let result = match cli.command {
        Commands::Run {
            threads,
            filter,
            reporter,
        } => run_command(threads, filter, reporter, cli.verbose),
        Commands::Decode { input, format } => decode_command(&input, format),
        Commands::Encode {
            method,
            output,
            signature,
            impl_class,
        } => encode_command(&method, signature.as_deref(), impl_class.as_deref(), &output),
    };

    match result {
        Ok(()) => {
            info!("Command completed successfully");
            Ok(())
        }
        Err(e) => {
            error!("Command failed: {:#}", e);
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    // stdout carries the report
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}
