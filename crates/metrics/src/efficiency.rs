//! Offline store efficiency: net sales per unit of selling area.

use regex::Regex;
use retail_kpi_core::snapshot::{EfficiencyStore, OfflineStoreEfficiency, StoreAreaDocument};
use retail_kpi_core::{EngineConfig, PeriodCode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::rates::Yoy;

/// Scale applied before dividing by days, so daily figures read in thousandths.
const DAILY_SCALE: Decimal = Decimal::ONE_THOUSAND;

/// Store eligibility rules for area rollups.
#[derive(Debug, Clone)]
pub struct EfficiencyRules {
    /// Offline store naming convention; `None` accepts every code.
    pattern: Option<Regex>,
    excluded_codes: Vec<String>,
    closed_min_sales_per_area: Decimal,
}

impl EfficiencyRules {
    /// Compiles the rules from engine config.
    ///
    /// # Errors
    /// Returns an error if `offline_store_pattern` is not a valid regex.
    pub fn from_config(config: &EngineConfig) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Some(Regex::new(&config.offline_store_pattern)?),
            excluded_codes: config.excluded_store_codes.clone(),
            closed_min_sales_per_area: config.closed_store_min_sales_per_area,
        })
    }

    /// Like [`from_config`](Self::from_config), but an invalid pattern is
    /// logged and dropped instead of failing.
    #[must_use]
    pub fn from_config_lenient(config: &EngineConfig) -> Self {
        Self::from_config(config).unwrap_or_else(|e| {
            warn!(
                pattern = %config.offline_store_pattern,
                error = %e,
                "Invalid offline store pattern, accepting all store codes"
            );
            Self {
                pattern: None,
                excluded_codes: config.excluded_store_codes.clone(),
                closed_min_sales_per_area: config.closed_store_min_sales_per_area,
            }
        })
    }

    fn is_offline(&self, store_code: &str) -> bool {
        self.pattern.as_ref().map_or(true, |p| p.is_match(store_code))
    }

    /// Why `store` is left out of the area rollup, `None` if eligible.
    #[must_use]
    pub fn exclusion(&self, store: &EfficiencyStore, area: Option<Decimal>) -> Option<ExclusionReason> {
        if !self.is_offline(&store.store_code) {
            return Some(ExclusionReason::NotOffline);
        }
        if self.excluded_codes.iter().any(|c| c == &store.store_code) {
            return Some(ExclusionReason::CountedElsewhere);
        }
        if store.net_sales <= Decimal::ZERO {
            return Some(ExclusionReason::NoSales);
        }
        let Some(area) = area else {
            return Some(ExclusionReason::MissingArea);
        };
        if store.closed && sales_per_area(store.net_sales, area) < self.closed_min_sales_per_area {
            return Some(ExclusionReason::ClosedLowSales);
        }
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    /// Code does not follow the offline store naming convention.
    NotOffline,
    /// Sales are already included under another store code.
    CountedElsewhere,
    NoSales,
    /// No area on record.
    MissingArea,
    /// Closed during the period and selling too little per area to count.
    ClosedLowSales,
}

/// How the prior-year selling area was obtained. It is never measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrevAreaEstimate {
    /// `current_area * prev_store_count / current_store_count`.
    ScaledByStoreCount,
    /// No current stores to scale by; the current area is reused.
    AssumedCurrent,
}

/// `sales / area`, zero when there is no area.
#[must_use]
pub fn sales_per_area(sales: Decimal, area: Decimal) -> Decimal {
    if area > Decimal::ZERO {
        sales.checked_div(area).unwrap_or(Decimal::ZERO)
    } else {
        Decimal::ZERO
    }
}

/// `sales_per_area * 1000 / days`, zero when `days` is zero.
#[must_use]
pub fn daily_sales_per_area(sales_per_area: Decimal, days: u32) -> Decimal {
    if days == 0 {
        return Decimal::ZERO;
    }
    (sales_per_area * DAILY_SCALE)
        .checked_div(Decimal::from(days))
        .unwrap_or(Decimal::ZERO)
}

/// Prior-year area from the current area and the store counts.
#[must_use]
pub fn estimate_previous_area(
    current_area: Decimal,
    current_count: usize,
    prev_count: u32,
) -> (Decimal, PrevAreaEstimate) {
    if current_count > 0 {
        let scaled = (current_area * Decimal::from(prev_count))
            .checked_div(Decimal::from(current_count))
            .unwrap_or(current_area);
        (scaled, PrevAreaEstimate::ScaledByStoreCount)
    } else {
        (current_area, PrevAreaEstimate::AssumedCurrent)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreEfficiency {
    pub store_code: String,
    pub store_name: String,
    pub net_sales: Decimal,
    pub area: Decimal,
    pub sales_per_area: Decimal,
    pub daily_sales_per_area: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedStore {
    pub store_code: String,
    pub reason: ExclusionReason,
}

/// Sales-per-area of eligible offline stores against the prior-year estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EfficiencyReport {
    pub stores: Vec<StoreEfficiency>,
    pub excluded: Vec<ExcludedStore>,
    pub net_sales: Decimal,
    pub total_area: Decimal,
    pub sales_per_area: Decimal,
    pub daily_sales_per_area: Decimal,
    pub prev_net_sales: Decimal,
    pub prev_store_count: u32,
    pub prev_area: Decimal,
    pub prev_area_estimate: PrevAreaEstimate,
    pub prev_sales_per_area: Decimal,
    pub prev_daily_sales_per_area: Decimal,
    pub yoy: Yoy,
}

/// Computes store and aggregate efficiency for `period`.
#[must_use]
pub fn store_efficiency(
    data: &OfflineStoreEfficiency,
    areas: &StoreAreaDocument,
    period: PeriodCode,
    rules: &EfficiencyRules,
) -> EfficiencyReport {
    let days = period.days();
    let mut stores = Vec::new();
    let mut excluded = Vec::new();

    for store in &data.stores {
        let area = areas.area_of(&store.store_code);
        if let Some(reason) = rules.exclusion(store, area) {
            if reason == ExclusionReason::MissingArea {
                warn!(store = %store.store_code, "No selling area on record for offline store");
            }
            excluded.push(ExcludedStore {
                store_code: store.store_code.clone(),
                reason,
            });
            continue;
        }
        let area = area.unwrap_or_default();
        let per_area = sales_per_area(store.net_sales, area);
        stores.push(StoreEfficiency {
            store_code: store.store_code.clone(),
            store_name: store.store_name.clone(),
            net_sales: store.net_sales,
            area,
            sales_per_area: per_area,
            daily_sales_per_area: daily_sales_per_area(per_area, days),
        });
    }

    let net_sales: Decimal = stores.iter().map(|s| s.net_sales).sum();
    let total_area: Decimal = stores.iter().map(|s| s.area).sum();
    let per_area = sales_per_area(net_sales, total_area);

    let (prev_area, prev_area_estimate) =
        estimate_previous_area(total_area, stores.len(), data.prev_store_count);
    let prev_per_area = sales_per_area(data.prev_net_sales, prev_area);
    let prev_days = period.same_month_last_year().days();

    debug!(
        eligible = stores.len(),
        excluded = excluded.len(),
        total_area = %total_area,
        "Computed offline store efficiency"
    );

    EfficiencyReport {
        stores,
        excluded,
        net_sales,
        total_area,
        sales_per_area: per_area,
        daily_sales_per_area: daily_sales_per_area(per_area, days),
        prev_net_sales: data.prev_net_sales,
        prev_store_count: data.prev_store_count,
        prev_area,
        prev_area_estimate,
        prev_sales_per_area: prev_per_area,
        prev_daily_sales_per_area: daily_sales_per_area(prev_per_area, prev_days),
        yoy: Yoy::between(per_area, prev_per_area),
    }
}
