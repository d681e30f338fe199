#![allow(clippy::doc_markdown)]
//! `flatvec` CLI - inspect, query and convert vector stores
//!
//! Usage:
//!   `flatvec info ./vectors.bin`
//!   `flatvec lookup ./vectors.bin apple --format json`
//!   `flatvec convert ./vectors.bin ./vectors.txt`

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use flatvec_core::{FlatvecConfig, StoreFormat};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "flatvec")]
#[command(author, version, about = "flatvec CLI - flat-file vector stores")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file
    #[arg(short, long, global = true, default_value = "flatvec.toml", env = "FLATVEC_CONFIG")]
    config: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Store format option
#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Binary,
    Text,
}

impl From<FormatArg> for StoreFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Binary => StoreFormat::Binary,
            FormatArg::Text => StoreFormat::Text,
        }
    }
}

/// Output rendering option
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
enum OutputArg {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Show store header, record count and index status
    Info {
        /// Path to the store file
        store: PathBuf,

        /// Store format (detected from the file name if omitted)
        #[arg(long, value_enum)]
        store_format: Option<FormatArg>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputArg,
    },

    /// Look up one identifier
    Lookup {
        /// Path to the store file
        store: PathBuf,

        /// Identifier to find
        identifier: String,

        /// Ignore the offset index and scan every record
        #[arg(long)]
        scan: bool,

        /// Store format (detected from the file name if omitted)
        #[arg(long, value_enum)]
        store_format: Option<FormatArg>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputArg,
    },

    /// Print records as `identifier|vector` lines
    Dump {
        /// Path to the store file
        store: PathBuf,

        /// Stop after this many records
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Store format (detected from the file name if omitted)
        #[arg(long, value_enum)]
        store_format: Option<FormatArg>,
    },

    /// Convert a store to another file and format
    Convert {
        /// Store to read
        input: PathBuf,

        /// Store to write (replaced if it exists)
        output: PathBuf,

        /// Input format (detected from the file name if omitted)
        #[arg(long, value_enum)]
        from: Option<FormatArg>,

        /// Output format (detected from the file name if omitted)
        #[arg(long, value_enum)]
        to: Option<FormatArg>,
    },

    /// Run the disk-space preflight for a path
    CheckSpace {
        /// File or directory to check
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = FlatvecConfig::load_from_path(&cli.config)?;
    config.validate()?;

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        config.logging.level.parse().unwrap_or(Level::INFO)
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(config.logging.with_target)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let detect = |path: &PathBuf, arg: Option<FormatArg>| {
        arg.map_or_else(|| commands::detect_format(path, &config), StoreFormat::from)
    };

    match cli.command {
        Commands::Info {
            store,
            store_format,
            format,
        } => {
            let store_format = detect(&store, store_format);
            commands::info(&store, store_format, format == OutputArg::Json)?;
        }
        Commands::Lookup {
            store,
            identifier,
            scan,
            store_format,
            format,
        } => {
            let store_format = detect(&store, store_format);
            commands::lookup(
                &store,
                store_format,
                &identifier,
                scan,
                format == OutputArg::Json,
                &config,
            )?;
        }
        Commands::Dump {
            store,
            limit,
            store_format,
        } => {
            let store_format = detect(&store, store_format);
            commands::dump(&store, store_format, limit)?;
        }
        Commands::Convert {
            input,
            output,
            from,
            to,
        } => {
            let from = detect(&input, from);
            let to = detect(&output, to);
            commands::convert(&input, from, &output, to, &config)?;
        }
        Commands::CheckSpace { path } => {
            commands::check_space(&path, &config)?;
        }
    }

    Ok(())
}
