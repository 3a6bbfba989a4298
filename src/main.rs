//! `mxtool` command-line interface.
//!
//! Reads a MARCXML collection from standard input and writes the result of
//! one operation to standard output.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use mxtool::collection::{concat, select, SelectMode, Selector};
use mxtool::{read_collection, review, Element, Listing, MxConfig, ReportFormat, Schema};
use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Terminal used for review prompts and decisions.
const TTY: &str = "/dev/tty";

#[derive(Parser)]
#[command(name = "mxtool", author, version, about, long_about = None)]
struct Cli {
    /// Schema file (overrides MXTOOL_XSD)
    #[arg(long, global = true)]
    schema: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Review records one at a time and keep the chosen ones
    Review,

    /// Append the records of FILE to those read from stdin
    Cat {
        /// Second collection
        file: PathBuf,
    },

    /// Keep records matching <a|t|p>=<regex>
    Keep {
        /// Selector pattern
        pattern: String,
    },

    /// Discard records matching <a|t|p>=<regex>
    Discard {
        /// Selector pattern
        pattern: String,
    },

    /// List records sorted by call number
    Lib {
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// List records sorted by author
    Bib {
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

impl From<Format> for ReportFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => ReportFormat::Text,
            Format::Json => ReportFormat::Json,
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        error!("{e:#}");
        eprintln!("mxtool: {e:#}");
        std::process::exit(1);
    }
}

fn load_schema(cli: &Cli) -> Result<Schema> {
    let mut config = MxConfig::from_env();
    if let Some(path) = &cli.schema {
        config = config.with_schema_path(path);
    }
    config.load_schema().context("loading schema")
}

fn read_stdin(schema: &Schema) -> Result<Element> {
    read_collection(io::stdin().lock(), schema).context("reading collection from stdin")
}

fn run(cli: Cli) -> Result<()> {
    let schema = load_schema(&cli)?;
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match &cli.command {
        Commands::Review => {
            let top = read_stdin(&schema)?;
            let decisions = BufReader::new(
                File::open(TTY).with_context(|| format!("opening {TTY} for reading"))?,
            );
            let prompt = OpenOptions::new()
                .write(true)
                .open(TTY)
                .with_context(|| format!("opening {TTY} for writing"))?;
            let kept = review(&top, decisions, prompt, &mut out)?;
            info!(kept, "review complete");
        },
        Commands::Cat { file } => {
            let first = read_stdin(&schema)?;
            let input =
                File::open(file).with_context(|| format!("opening {}", file.display()))?;
            let second = read_collection(BufReader::new(input), &schema)
                .with_context(|| format!("reading collection from {}", file.display()))?;
            let written = concat(&first, &second, &mut out)?;
            info!(records = written, "concatenated");
        },
        Commands::Keep { pattern } | Commands::Discard { pattern } => {
            let mode = if matches!(cli.command, Commands::Keep { .. }) {
                SelectMode::Keep
            } else {
                SelectMode::Discard
            };
            let selector: Selector = pattern.parse()?;
            let top = read_stdin(&schema)?;
            let written = select(&top, &selector, mode, &mut out)?;
            info!(records = written, "selected");
        },
        Commands::Lib { format } | Commands::Bib { format } => {
            let listing = if matches!(cli.command, Commands::Lib { .. }) {
                Listing::Library
            } else {
                Listing::Bibliography
            };
            let mut top = read_stdin(&schema)?;
            mxtool::report::write_listing(&mut top, listing, (*format).into(), &mut out)?;
        },
    }

    out.flush()?;
    Ok(())
}
