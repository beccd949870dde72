use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "tether",
    about = "Tether — placement inheritance between chained pipeline operations",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Path to tether.toml (defaults to the platform's well-known labels)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the affinity an operation inherits from its predecessor
    Inherit {
        /// Operation JSON (spec carries runAfter.affinityStrategy)
        #[arg(short, long)]
        operation: PathBuf,
        /// Predecessor operation JSON; omitted means "not found"
        #[arg(short, long)]
        predecessor: Option<PathBuf>,
        /// Output format: text, json or values
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Record the placement facts of an operation bound to a node
    Record {
        #[arg(short, long)]
        operation: PathBuf,
        /// Node JSON (name and labels)
        #[arg(short, long)]
        node: PathBuf,
        /// Run id; defaults to the operation's current run id plus one
        #[arg(short, long)]
        run_id: Option<u64>,
    },
    /// Check whether an operation may render its pod template yet
    Gate {
        #[arg(short, long)]
        operation: PathBuf,
        #[arg(short, long)]
        predecessor: Option<PathBuf>,
    },
    /// Manage tether.toml
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a tether.toml spelling out the defaults
    Init {
        #[arg(short, long, default_value = "tether.toml")]
        path: PathBuf,
    },
    /// Validate a tether.toml and print the effective settings
    Check {
        #[arg(short, long, default_value = "tether.toml")]
        path: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tether=info".parse()?)
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Inherit { operation, predecessor, format } => {
            commands::inherit::inherit(&operation, predecessor.as_deref(), config, &format)
        }
        Commands::Record { operation, node, run_id } => {
            commands::record::record(&operation, &node, run_id, config)
        }
        Commands::Gate { operation, predecessor } => {
            commands::inherit::gate(&operation, predecessor.as_deref(), config)
        }
        Commands::Config { action } => match action {
            ConfigAction::Init { path } => commands::config::init(&path),
            ConfigAction::Check { path } => commands::config::check(&path),
        },
    }
}
