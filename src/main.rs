//! # Butterfly-ev CLI
//!
//! Resolve encoded-value requests, run the tag parsers over line-delimited JSON edges and
//! inspect the resulting `edge_values.bin` snapshots.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cli;

#[derive(Parser)]
#[command(name = "butterfly-ev")]
#[command(about = "Bit-packed edge properties for OpenStreetMap routing graphs")]
#[command(long_about = "Encodes per-edge road properties from OSM tags:
  butterfly-ev list                                   # Built-in encoded values
  butterfly-ev resolve \"bike_priority\"                # Dependency order and layout
  butterfly-ev import -e \"car_access,max_speed\" -i edges.jsonl -o edge_values.bin
  butterfly-ev inspect edge_values.bin --edge 0")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List every built-in import unit
    List,
    /// Resolve an encoded-values string and print order and record layout
    Resolve {
        /// Comma-separated names, options after `|`, e.g. "car_average_speed|speed_bits=7"
        encoded_values: String,
    },
    /// Run the tag parsers over line-delimited JSON edges
    Import {
        /// YAML import configuration
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Encoded values to import, overrides the config file
        #[arg(short, long)]
        encoded_values: Option<String>,
        /// Edge input (JSON lines), "-" for stdin
        #[arg(short, long, default_value = "-")]
        input: PathBuf,
        /// Snapshot to write; edges are printed as JSON lines when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Worker threads (default: all cores)
        #[arg(short, long)]
        threads: Option<usize>,
    },
    /// Verify an edge_values.bin snapshot and print its layout
    Inspect {
        /// Snapshot file
        snapshot: PathBuf,
        /// Decode and print one edge record
        #[arg(long)]
        edge: Option<usize>,
    },
}

fn init_logging(verbose: u8, json: bool) -> Result<()> {
    let default = match verbose {
        0 => "butterfly_ev=info",
        1 => "butterfly_ev=debug",
        _ => "butterfly_ev=trace",
    };
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default))?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow::anyhow!("Failed to initialise logging: {e}"))
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_logging(args.verbose, args.log_json)?;

    match args.command {
        Commands::List => cli::list(),
        Commands::Resolve { encoded_values } => cli::resolve_request(&encoded_values),
        Commands::Import {
            config,
            encoded_values,
            input,
            output,
            threads,
        } => cli::import(cli::ImportArgs {
            config,
            encoded_values,
            input,
            output,
            threads,
        }),
        Commands::Inspect { snapshot, edge } => cli::inspect(&snapshot, edge),
    }
}
