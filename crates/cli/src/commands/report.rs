//! Report command: loads a period's snapshots and prints the KPI report.

use anyhow::{Context, Result};
use clap::Args;
use retail_kpi_core::{AppConfig, ConfigLoader, PeriodCode, SnapshotLoader};
use retail_kpi_metrics::{build_report, ReportFormatter};
use tracing::info;

/// Arguments for the report command.
#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// Period code in `YYMM` form (e.g. "2501")
    #[arg(short, long)]
    pub period: String,

    /// Directory holding the snapshot documents (overrides config)
    #[arg(short, long, env = "RETAIL_KPI_DATA_DIR")]
    pub data_dir: Option<String>,

    /// Config file path
    #[arg(short, long, default_value = "config/Config.toml")]
    pub config: String,

    /// Profile whose `Config.{profile}.toml` is layered over the config file
    #[arg(long)]
    pub profile: Option<String>,

    /// Print the report as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

fn load_config(args: &ReportArgs) -> Result<AppConfig> {
    let loaded = match &args.profile {
        Some(profile) => ConfigLoader::load_with_profile(&args.config, profile),
        None => ConfigLoader::load_from(&args.config),
    };
    let mut config =
        loaded.with_context(|| format!("Failed to load config from {}", args.config))?;
    if let Some(dir) = &args.data_dir {
        config.data.data_dir.clone_from(dir);
    }
    Ok(config)
}

/// Builds the report and renders it as text or JSON.
///
/// # Errors
/// Returns an error if the period is malformed, the config cannot be loaded,
/// or a present snapshot document cannot be read.
pub fn render_report(args: &ReportArgs) -> Result<String> {
    let period: PeriodCode = args
        .period
        .parse()
        .with_context(|| format!("Invalid period code '{}'", args.period))?;
    let config = load_config(args)?;

    info!(period = %period, data_dir = %config.data.data_dir, "Loading snapshots");
    let snapshots = SnapshotLoader::new(config.data.clone())
        .load(period)
        .with_context(|| format!("Failed to load snapshots for period {period}"))?;

    let report = build_report(&snapshots, &config.engine);
    if args.json {
        Ok(serde_json::to_string_pretty(&report)?)
    } else {
        Ok(ReportFormatter::format(&report))
    }
}

/// Runs the report command.
///
/// # Errors
/// See [`render_report`].
pub fn run_report(args: &ReportArgs) -> Result<()> {
    println!("{}", render_report(args)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn args(dir: &std::path::Path, json: bool) -> ReportArgs {
        ReportArgs {
            period: "2501".to_string(),
            data_dir: Some(dir.to_string_lossy().into_owned()),
            config: dir.join("missing.toml").to_string_lossy().into_owned(),
            profile: None,
            json,
        }
    }

    #[test]
    fn text_report_from_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("pl_2501.json"),
            r#"{"current_month": {"hk": {"net_sales": 900}, "mc": {"net_sales": 100}}}"#,
        )
        .unwrap();

        let text = render_report(&args(dir.path(), false)).unwrap();
        assert!(text.contains("RETAIL KPI REPORT  (2501)"));
        assert!(text.contains("P&L (current month)"));
        assert!(text.contains("[blended]"));
    }

    #[test]
    fn json_report_is_valid_json() {
        let dir = tempfile::tempdir().unwrap();
        let json = render_report(&args(dir.path(), true)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["period"], "2501");
        assert_eq!(value["previous_period"], "2412");
    }

    #[test]
    fn broken_document_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("store_pl_2501.json"), "[").unwrap();
        let err = render_report(&args(dir.path(), false)).unwrap_err();
        assert!(err.to_string().contains("Failed to load snapshots for period 2501"));
    }

    #[test]
    fn profile_overrides_report_rules() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("dashboard_2501.json"),
            r#"{"ending_inventory": {"current": [
                {"item": "CAP", "sesn": "24S", "stock_price": 200, "gross_sales": 8},
                {"item": "BAG", "sesn": "24S", "stock_price": 100, "gross_sales": 1}
            ]}}"#,
        )
        .unwrap();
        fs::write(dir.path().join("Config.toml"), "[engine]\nstagnant_top_n = 0\n").unwrap();
        fs::write(dir.path().join("Config.tight.toml"), "[engine]\nstagnant_top_n = 1\n").unwrap();

        let mut report_args = args(dir.path(), true);
        report_args.config = dir.path().join("Config.toml").to_string_lossy().into_owned();

        let value: serde_json::Value =
            serde_json::from_str(&render_report(&report_args).unwrap()).unwrap();
        assert_eq!(value["stagnant"][0]["candidates"].as_array().unwrap().len(), 2);

        report_args.profile = Some("tight".to_string());
        let value: serde_json::Value =
            serde_json::from_str(&render_report(&report_args).unwrap()).unwrap();
        assert_eq!(value["stagnant"][0]["count"], 2);
        assert_eq!(value["stagnant"][0]["candidates"].as_array().unwrap().len(), 1);
    }
}
