use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use dagscope_index::LinkMode;
use dagscope_protocol::{DecodeError, DecoderConfig, IdNumbering};
use tracing_subscriber::EnvFilter;

mod commands;
mod render;

use commands::{
    execute_monitor_command, execute_query_command, execute_stats_command, execute_summary_command,
    LoadOptions,
};

#[derive(Parser)]
#[command(name = "dagscope")]
#[command(about = "Dagscope - inspect BlockDAG simulation logs")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// Enable debug logging (overridden by DAGSCOPE_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the block tree, then query blocks interactively
    Monitor(LogArgs),
    /// Print the block tree with transactions and gossip
    Summary(SummaryArgs),
    /// Show details for blocks by id
    Query(QueryArgs),
    /// Print DAG statistics
    Stats(StatsArgs),
}

#[derive(Args)]
pub struct LogArgs {
    /// Path to the message log
    pub log: PathBuf,
    /// Prefix of assigned message ids
    #[arg(long, default_value = dagscope_protocol::DEFAULT_ID_PREFIX)]
    pub id_prefix: String,
    /// Number the first record 002 instead of 001
    #[arg(long)]
    pub legacy_ids: bool,
    /// Link parents and gossip after the whole log is loaded
    #[arg(long)]
    pub reconcile: bool,
}

#[derive(Args)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub log: LogArgs,
    /// Emit the walk as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct QueryArgs {
    #[command(flatten)]
    pub log: LogArgs,
    /// Block id to show; repeat for several. Interactive when omitted
    #[arg(short, long = "id")]
    pub ids: Vec<String>,
    /// Emit details as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct StatsArgs {
    #[command(flatten)]
    pub log: LogArgs,
    /// Emit statistics as JSON
    #[arg(long)]
    pub json: bool,
}

impl From<LogArgs> for LoadOptions {
    fn from(args: LogArgs) -> Self {
        LoadOptions {
            path: args.log,
            decoder: DecoderConfig {
                id_prefix: args.id_prefix,
                numbering: if args.legacy_ids {
                    IdNumbering::Legacy
                } else {
                    IdNumbering::Sequential
                },
            },
            link_mode: if args.reconcile {
                LinkMode::Reconciled
            } else {
                LinkMode::SinglePass
            },
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Monitor(args) => execute_monitor_command(&args.into()),
        Commands::Summary(args) => execute_summary_command(&args.log.into(), args.json),
        Commands::Query(args) => execute_query_command(&args.log.into(), &args.ids, args.json),
        Commands::Stats(args) => execute_stats_command(&args.log.into(), args.json),
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("DAGSCOPE_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "dagscope=debug"
        } else {
            "dagscope=error"
        })
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Print a failure as a single operator-facing message.
fn report_error(err: &anyhow::Error) {
    eprintln!("Error: {:#}", err);

    if let Some(diagnostics) = err.downcast_ref::<DecodeError>().and_then(DecodeError::diagnostics) {
        eprintln!("Record content:");
        eprintln!("{:?}", diagnostics.raw);
        eprintln!("All lines:");
        for (i, line) in diagnostics.lines.iter().enumerate() {
            eprintln!("{}: {:?}", i, line);
        }
    }
}
