//! marl CLI - tabular Q-learning agents, alone or in cooperation
//!
//! This CLI provides:
//! - Learning a Q-table for a problem, alone or with in-process peers
//! - Following a saved Q-table greedily
//! - Inspecting saved Q-tables

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "marl")]
#[command(version, about = "Tabular Q-learning agents for discrete decision problems", long_about = None)]
struct Cli {
    /// Log level, overridden by RUST_LOG
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Learn or follow a policy for a problem
    Run(Box<marl::cli::commands::run::RunArgs>),

    /// Print a saved Q-table
    Inspect(marl::cli::commands::inspect::InspectArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn directive(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

fn init_tracing(level: LogLevel) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level);

    match cli.command {
        Commands::Run(args) => marl::cli::commands::run::execute(*args),
        Commands::Inspect(args) => marl::cli::commands::inspect::execute(args),
    }
}
