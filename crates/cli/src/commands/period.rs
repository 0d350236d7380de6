//! Period command: calendar facts of a `YYMM` period.

use anyhow::{Context, Result};
use clap::Args;
use retail_kpi_core::PeriodCode;

/// Arguments for the period command.
#[derive(Args, Debug, Clone)]
pub struct PeriodArgs {
    /// Period code in `YYMM` form (e.g. "2501")
    #[arg(short, long)]
    pub period: String,
}

/// Renders the calendar facts of a period.
///
/// # Errors
/// Returns an error if the period code is malformed.
pub fn render_period(args: &PeriodArgs) -> Result<String> {
    let period: PeriodCode = args
        .period
        .parse()
        .with_context(|| format!("Invalid period code '{}'", args.period))?;

    let mut output = String::new();
    output.push_str(&format!("Period:           {period}\n"));
    output.push_str(&format!("Year / Month:     {} / {:02}\n", period.year(), period.month()));
    output.push_str(&format!("Previous Month:   {}\n", period.previous()));
    output.push_str(&format!("Same Month LY:    {}\n", period.same_month_last_year()));
    output.push_str(&format!("Days In Month:    {}\n", period.days()));
    output.push_str(&format!("Current Season:   {}\n", period.current_season()));
    Ok(output)
}

/// Runs the period command.
///
/// # Errors
/// Returns an error if the period code is malformed.
pub fn run_period(args: &PeriodArgs) -> Result<()> {
    print!("{}", render_period(args)?);
    Ok(())
}
