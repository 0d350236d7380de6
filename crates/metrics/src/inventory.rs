//! Inventory aging: weighted stock-weeks, season-age cohorts and stagnant
//! stock detection.
//!
//! Season age is counted in half-year seasons back from the season that is
//! current in the reporting period. Two seasons make one year of age.

use retail_kpi_core::snapshot::{
    AccStockSummary, EndingInventory, InventoryLine, SeasonSalesRow, StockBucket,
};
use retail_kpi_core::{EngineConfig, PeriodCode, Season};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

use crate::rates::{checked_weighted_mean, discount_rate, Yoy};

/// Accessory categories tracked for stock-weeks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccCategory {
    Hat,
    Shoe,
    Bag,
    OtherAcc,
}

impl AccCategory {
    pub const ALL: [AccCategory; 4] = [
        AccCategory::Hat,
        AccCategory::Shoe,
        AccCategory::Bag,
        AccCategory::OtherAcc,
    ];

    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Hat => "hat",
            Self::Shoe => "shoe",
            Self::Bag => "bag",
            Self::OtherAcc => "other_acc",
        }
    }

    fn bucket_in(self, buckets: &BTreeMap<String, StockBucket>) -> StockBucket {
        let aliases: &[&str] = match self {
            Self::OtherAcc => &["other_acc", "other", "acc_etc"],
            _ => &[],
        };
        buckets
            .get(self.key())
            .or_else(|| aliases.iter().find_map(|a| buckets.get(*a)))
            .copied()
            .unwrap_or_default()
    }
}

/// `Σ(weeks · stock_price) / Σ stock_price`, zero when no stock value.
///
/// # Examples
/// ```
/// use retail_kpi_core::snapshot::StockBucket;
/// use retail_kpi_metrics::inventory::weighted_stock_weeks;
/// use rust_decimal_macros::dec;
///
/// let buckets = [
///     StockBucket { stock_price: dec!(300), stock_weeks: dec!(10) },
///     StockBucket { stock_price: dec!(100), stock_weeks: dec!(30) },
/// ];
/// assert_eq!(weighted_stock_weeks(&buckets), dec!(15));
/// ```
#[must_use]
pub fn weighted_stock_weeks(buckets: &[StockBucket]) -> Decimal {
    checked_weighted_mean(buckets.iter().map(|b| (b.stock_weeks, b.stock_price)))
        .unwrap_or(Decimal::ZERO)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStock {
    pub category: AccCategory,
    pub current: StockBucket,
    pub previous: StockBucket,
    /// Weeks change against the prior-year same month.
    pub weeks_change: Decimal,
    pub stock_yoy: Yoy,
}

/// Accessory stock-weeks, latest month vs prior-year same month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockWeeksSummary {
    pub categories: Vec<CategoryStock>,
    pub current_weeks: Decimal,
    pub previous_weeks: Decimal,
    pub weeks_change: Decimal,
}

#[must_use]
pub fn acc_stock_weeks(summary: &AccStockSummary) -> StockWeeksSummary {
    let categories: Vec<CategoryStock> = AccCategory::ALL
        .into_iter()
        .map(|category| {
            let current = category.bucket_in(&summary.current);
            let previous = category.bucket_in(&summary.previous);
            CategoryStock {
                category,
                current,
                previous,
                weeks_change: current.stock_weeks - previous.stock_weeks,
                stock_yoy: Yoy::between(current.stock_price, previous.stock_price),
            }
        })
        .collect();

    let current: Vec<StockBucket> = categories.iter().map(|c| c.current).collect();
    let previous: Vec<StockBucket> = categories.iter().map(|c| c.previous).collect();
    let current_weeks = weighted_stock_weeks(&current);
    let previous_weeks = weighted_stock_weeks(&previous);
    StockWeeksSummary {
        categories,
        current_weeks,
        previous_weeks,
        weeks_change: current_weeks - previous_weeks,
    }
}

/// Age cohort of past-season stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgingCohort {
    OneYear,
    TwoYears,
    ThreeYearsPlus,
}

impl AgingCohort {
    pub const ALL: [AgingCohort; 3] = [
        AgingCohort::OneYear,
        AgingCohort::TwoYears,
        AgingCohort::ThreeYearsPlus,
    ];

    /// Cohort of stock `seasons` half-year seasons old; `None` unless past.
    #[must_use]
    pub const fn for_age(seasons: i32) -> Option<Self> {
        match seasons {
            i32::MIN..=0 => None,
            1 | 2 => Some(Self::OneYear),
            3 | 4 => Some(Self::TwoYears),
            _ => Some(Self::ThreeYearsPlus),
        }
    }
}

impl fmt::Display for AgingCohort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::OneYear => "1 year",
            Self::TwoYears => "2 years",
            Self::ThreeYearsPlus => "3+ years",
        })
    }
}

/// Position of a season code relative to the current season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonTag {
    Current,
    Past(AgingCohort),
    Future,
    /// Carry-over or unparseable code.
    Unknown,
}

impl SeasonTag {
    #[must_use]
    pub const fn cohort(&self) -> Option<AgingCohort> {
        match self {
            Self::Past(cohort) => Some(*cohort),
            _ => None,
        }
    }
}

/// Tags `code` relative to `current`.
#[must_use]
pub fn tag_season(current: Season, code: &str) -> SeasonTag {
    let Some(season) = Season::parse(code) else {
        return SeasonTag::Unknown;
    };
    let age = current.seasons_since(&season);
    match AgingCohort::for_age(age) {
        Some(cohort) => SeasonTag::Past(cohort),
        None if age == 0 => SeasonTag::Current,
        None => SeasonTag::Future,
    }
}

/// Stock of one cohort, current vs prior-year same month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohortStock {
    pub cohort: AgingCohort,
    pub current_stock: Decimal,
    pub previous_stock: Decimal,
    pub yoy: Yoy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgingCohorts {
    pub current_season: Season,
    pub previous_season: Season,
    pub cohorts: Vec<CohortStock>,
    /// Codes that could not be placed in a season.
    pub unknown_seasons: Vec<String>,
}

fn cohort_totals(lines: &[InventoryLine], season: Season, unknown: &mut Vec<String>) -> [Decimal; 3] {
    let mut totals = [Decimal::ZERO; 3];
    for line in lines {
        match tag_season(season, &line.season) {
            SeasonTag::Past(cohort) => totals[cohort as usize] += line.stock_price,
            SeasonTag::Unknown => {
                if !unknown.contains(&line.season) {
                    warn!(season = %line.season, "Unrecognized season code in ending inventory");
                    unknown.push(line.season.clone());
                }
            }
            SeasonTag::Current | SeasonTag::Future => {}
        }
    }
    totals
}

/// Buckets past-season stock into age cohorts. Each side is aged against its
/// own period's current season.
#[must_use]
pub fn aging_cohorts(inventory: &EndingInventory, period: PeriodCode) -> AgingCohorts {
    let current_season = period.current_season();
    let previous_season = period.same_month_last_year().current_season();
    let mut unknown_seasons = Vec::new();
    let current = cohort_totals(&inventory.current, current_season, &mut unknown_seasons);
    let previous = cohort_totals(&inventory.previous, previous_season, &mut unknown_seasons);

    AgingCohorts {
        current_season,
        previous_season,
        cohorts: AgingCohort::ALL
            .into_iter()
            .map(|cohort| {
                let i = cohort as usize;
                CohortStock {
                    cohort,
                    current_stock: current[i],
                    previous_stock: previous[i],
                    yoy: Yoy::between(current[i], previous[i]),
                }
            })
            .collect(),
        unknown_seasons,
    }
}

/// `gross_sales < stock_price * ratio`; equality is not stagnant.
#[must_use]
pub fn is_stagnant(gross_sales: Decimal, stock_price: Decimal, ratio: Decimal) -> bool {
    gross_sales < stock_price * ratio
}

/// Days of stock at the month's sales pace: `price / gross * basis`.
///
/// `None` when there is no stock or no sales to measure against.
#[must_use]
pub fn stock_days(stock_price: Decimal, gross_sales: Decimal, basis: Decimal) -> Option<Decimal> {
    if stock_price > Decimal::ZERO && gross_sales > Decimal::ZERO {
        stock_price
            .checked_div(gross_sales)
            .and_then(|d| d.checked_mul(basis))
    } else {
        None
    }
}

/// Aged stock whose monthly sales fall under the stagnant threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagnantCandidate {
    pub subcategory: String,
    pub season: String,
    pub cohort: AgingCohort,
    pub stock_price: Decimal,
    pub gross_sales: Decimal,
    pub net_sales: Decimal,
    pub discount_rate: Decimal,
    pub stock_days: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagnantGroup {
    pub cohort: AgingCohort,
    /// Candidates before truncation to the configured top N.
    pub count: usize,
    pub total_stock_price: Decimal,
    /// Largest stock value first.
    pub candidates: Vec<StagnantCandidate>,
}

/// Flags stagnant past-season lines of the latest month, grouped by cohort.
#[must_use]
pub fn stagnant_inventory(
    lines: &[InventoryLine],
    period: PeriodCode,
    config: &EngineConfig,
) -> Vec<StagnantGroup> {
    let current_season = period.current_season();
    let mut grouped: [Vec<StagnantCandidate>; 3] = Default::default();

    for line in lines {
        let Some(cohort) = tag_season(current_season, &line.season).cohort() else {
            continue;
        };
        if line.stock_price <= Decimal::ZERO
            || !is_stagnant(line.gross_sales, line.stock_price, config.stagnant_sales_ratio)
        {
            continue;
        }
        grouped[cohort as usize].push(StagnantCandidate {
            subcategory: line.subcategory.clone(),
            season: line.season.clone(),
            cohort,
            stock_price: line.stock_price,
            gross_sales: line.gross_sales,
            net_sales: line.net_sales,
            discount_rate: discount_rate(line.gross_sales, line.net_sales, None),
            stock_days: stock_days(line.stock_price, line.gross_sales, config.stock_days_basis),
        });
    }

    AgingCohort::ALL
        .into_iter()
        .zip(grouped)
        .map(|(cohort, mut candidates)| {
            candidates.sort_by(|a, b| {
                b.stock_price
                    .cmp(&a.stock_price)
                    .then_with(|| a.subcategory.cmp(&b.subcategory))
            });
            let count = candidates.len();
            let total_stock_price = candidates.iter().map(|c| c.stock_price).sum();
            if config.stagnant_top_n > 0 {
                candidates.truncate(config.stagnant_top_n);
            }
            debug!(%cohort, count, "Stagnant inventory cohort");
            StagnantGroup {
                cohort,
                count,
                total_stock_price,
                candidates,
            }
        })
        .collect()
}

/// A season-sales row tagged against the current season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonSalesLine {
    pub season: String,
    pub tag: SeasonTag,
    pub tag_sales: Decimal,
    pub net_sales: Decimal,
    pub net_sales_prev: Decimal,
    pub discount_rate: Decimal,
    pub yoy: Yoy,
}

/// Tags each season row and adds its discount rate and YoY. Source order is kept.
#[must_use]
pub fn season_sales(rows: &[SeasonSalesRow], period: PeriodCode) -> Vec<SeasonSalesLine> {
    let current = period.current_season();
    rows.iter()
        .map(|row| SeasonSalesLine {
            season: row.season.clone(),
            tag: tag_season(current, &row.season),
            tag_sales: row.tag_sales,
            net_sales: row.net_sales,
            net_sales_prev: row.net_sales_prev,
            discount_rate: discount_rate(row.tag_sales, row.net_sales, None),
            yoy: Yoy::between(row.net_sales, row.net_sales_prev),
        })
        .collect()
}
