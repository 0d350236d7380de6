use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub data: DataConfig,
}

/// Thresholds and store rules used by the metrics engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Monthly gross sales below `stock_price * ratio` marks an item stagnant.
    pub stagnant_sales_ratio: Decimal,
    /// Days of sales one month represents when converting to stock days.
    pub stock_days_basis: Decimal,
    /// Regex a store code must match to count as an offline retail store.
    pub offline_store_pattern: String,
    /// Store codes whose sales are already included under another code.
    pub excluded_store_codes: Vec<String>,
    /// Closed stores below this sales-per-area are dropped from area rollups.
    pub closed_store_min_sales_per_area: Decimal,
    /// Maximum stagnant candidates kept per aging cohort (0 = unlimited).
    pub stagnant_top_n: usize,
    /// Number of stores in the top / bottom direct-profit rankings.
    pub ranking_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            stagnant_sales_ratio: Decimal::new(5, 2), // 0.05
            stock_days_basis: Decimal::from(30),
            offline_store_pattern: r"^(HK|MC)\d{2,3}$".to_string(),
            excluded_store_codes: vec!["HK099".to_string()],
            closed_store_min_sales_per_area: Decimal::ONE,
            stagnant_top_n: 20,
            ranking_size: 5,
        }
    }
}

/// Where the snapshot loader finds period documents.
///
/// File names are templates; `{period}` is replaced with the `YYMM` code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub data_dir: String,
    pub dashboard_file: String,
    pub pl_file: String,
    pub store_pl_file: String,
    pub store_status_file: String,
    pub store_areas_file: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            dashboard_file: "dashboard_{period}.json".to_string(),
            pl_file: "pl_{period}.json".to_string(),
            store_pl_file: "store_pl_{period}.json".to_string(),
            store_status_file: "store_status_{period}.json".to_string(),
            store_areas_file: "store_areas.json".to_string(),
        }
    }
}
