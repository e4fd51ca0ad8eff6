//! pNode Health CLI
//!
//! Scores a pNode network from exported telemetry in a data directory.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::{style, Term};

use pnode_health::cli::{load_config, open_monitor, OutputFormat, OutputFormatter};
use pnode_health::error::Error;
use pnode_health::utils::constants::SECS_PER_DAY;

/// pNode Health - network health scoring for pNode storage networks
#[derive(Parser)]
#[command(name = "pnode-health")]
#[command(version = pnode_health::VERSION)]
#[command(about = "Health scores, trends and node deltas for a pNode network", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file (JSON)
    #[arg(short, long, env = "PNODE_HEALTH_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding nodes.json, history.json and snapshots.json
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Node directory file mapping pubkeys to managers
    #[arg(long)]
    directory: Option<PathBuf>,

    /// Output format: text, json, json-pretty
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Evaluate as of this unix timestamp instead of now
    #[arg(long)]
    at: Option<i64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Current network health score and recommendations
    Score,

    /// Historical health points
    History {
        /// Days of history to include
        #[arg(short, long, default_value = "7")]
        days: u32,
    },

    /// Trend over the historical window
    Trend {
        /// Days of history to analyze
        #[arg(short, long, default_value = "30")]
        days: u32,
    },

    /// Per-node scores with 24h and 7d deltas
    Nodes,

    /// Growth across daily snapshot rollups
    Growth,
}

// ═══════════════════════════════════════════════════════════════════════════════
// MAIN
// ═══════════════════════════════════════════════════════════════════════════════

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let term = Term::stdout();

    if let Err(e) = run_command(&cli, &term) {
        match e.downcast_ref::<Error>() {
            Some(err) if err.is_empty_history() => {
                eprintln!("{} {}", style("No data:").yellow().bold(), err);
                std::process::exit(2);
            }
            _ => {
                eprintln!("{} {}", style("Error:").red().bold(), e);
                std::process::exit(1);
            }
        }
    }
}

fn run_command(cli: &Cli, term: &Term) -> anyhow::Result<()> {
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(file) = &cli.directory {
        config.directory_file = Some(file.clone());
    }

    let monitor = open_monitor(config)?;
    let output = OutputFormatter::new(cli.format);
    let now = cli.at.unwrap_or_else(|| chrono::Utc::now().timestamp());

    let rendered = match &cli.command {
        Commands::Score => output.health(&monitor.current_health(now)?)?,
        Commands::History { days } => output.history(&monitor.history(window_start(now, *days), now)?)?,
        Commands::Trend { days } => output.trend(&monitor.trend(window_start(now, *days), now)?)?,
        Commands::Nodes => output.nodes(&monitor.node_deltas(now)?)?,
        Commands::Growth => output.growth(&monitor.growth()?)?,
    };

    term.write_line(rendered.trim_end())?;
    Ok(())
}

fn window_start(now: i64, days: u32) -> i64 {
    now - days as i64 * SECS_PER_DAY as i64
}
