mod commands;
mod infra;
mod obs;

use clap::{Parser, Subcommand};
use commands::Command;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dipwatch")]
#[command(about = "ETF drawdown monitor", version, arg_required_else_help = true)]
#[command(
    after_help = "Examples:\n  dipwatch run --config configs/sample.toml\n  dipwatch run --dry-run --at 2026-10-30T13:00:00Z\n  dipwatch validate --config configs/sample.toml\n  dipwatch calendar --config configs/sample.toml --date 2026-11-26\n"
)]
struct Cli {
    /// Log filter used when DIPWATCH_LOG is unset.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
    /// Log format: text | json.
    #[arg(long, global = true, default_value = "text")]
    log_format: String,
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Check prices once; send an alert or the month-end summary when due.
    Run {
        /// Config file (default: built-in watchlist, requires --dry-run).
        #[arg(long)]
        config: Option<PathBuf>,
        /// Log messages instead of delivering them.
        #[arg(long, default_value_t = false)]
        dry_run: bool,
        /// Evaluate as of this RFC 3339 instant instead of now.
        #[arg(long)]
        at: Option<String>,
        /// Print the run report as a single JSON line.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    Validate {
        #[arg(long)]
        config: PathBuf,
    },
    /// Show trading-day and month-end status for a date.
    Calendar {
        /// Config whose [schedule] windows apply (default: built-in windows).
        #[arg(long)]
        config: Option<PathBuf>,
        /// Date as YYYY-MM-DD (default: UTC date of --at or now).
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        at: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = obs::init_tracing(&cli.log_level, &cli.log_format) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }

    let command = match cli.command {
        CliCommand::Run {
            config,
            dry_run,
            at,
            json,
        } => Command::Run {
            config,
            dry_run,
            at,
            json,
        },
        CliCommand::Validate { config } => Command::Validate { config },
        CliCommand::Calendar { config, date, at } => Command::Calendar { config, date, at },
    };

    if let Err(err) = commands::run(command) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}
