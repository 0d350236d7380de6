mod commands;

use clap::{Parser, Subcommand};
use commands::{PeriodArgs, ReportArgs};

#[derive(Parser)]
#[command(name = "retail-kpi")]
#[command(about = "HK/MC retail KPI reporting engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the KPI report for a period
    Report(ReportArgs),
    /// Show the calendar facts of a period
    Period(PeriodArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Report(args) => commands::run_report(&args),
        Commands::Period(args) => commands::run_period(&args),
    }
}
