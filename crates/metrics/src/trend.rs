//! Monthly trend series with previous-year values rebuilt from YoY.

use retail_kpi_core::snapshot::MonthlySeries;
use retail_kpi_core::PeriodCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::warn;

use crate::rates::{resolve_previous, PreviousSource};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub period: PeriodCode,
    pub value: Decimal,
    /// Reported YoY ratio, percent.
    pub yoy: Option<Decimal>,
    /// Previous-year value, reconstructed from `value` and `yoy`.
    pub previous: Decimal,
    pub previous_source: PreviousSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendSeries {
    pub key: String,
    /// Oldest period first.
    pub points: Vec<TrendPoint>,
}

/// One series per key of `data`, pairing each month with its YoY ratio.
///
/// Rows keyed by something other than a `YYMM` period are skipped.
#[must_use]
pub fn trend_series(data: &MonthlySeries, yoy: &MonthlySeries) -> Vec<TrendSeries> {
    let mut periods: Vec<(PeriodCode, &String)> = Vec::new();
    for raw in data.0.keys() {
        match raw.parse::<PeriodCode>() {
            Ok(period) => periods.push((period, raw)),
            Err(e) => warn!(period = %raw, error = %e, "Skipping monthly row with invalid period"),
        }
    }
    periods.sort_by_key(|(period, _)| *period);

    let keys: BTreeSet<&String> = data.0.values().flat_map(|row| row.keys()).collect();

    keys.into_iter()
        .map(|key| TrendSeries {
            key: key.clone(),
            points: periods
                .iter()
                .filter_map(|(period, raw)| {
                    let value = data.value(raw, key)?;
                    let ratio = yoy.value(raw, key);
                    let (previous, previous_source) = resolve_previous(value, None, ratio);
                    Some(TrendPoint {
                        period: *period,
                        value,
                        yoy: ratio,
                        previous,
                        previous_source,
                    })
                })
                .collect(),
        })
        .collect()
}
