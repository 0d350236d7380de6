//! Store classification.
//!
//! Each store lands in one profitability × momentum quadrant. The prior
//! period's category is threaded through for transition display, never
//! recomputed.

use retail_kpi_core::snapshot::{
    BusinessUnit, StatusSummary, StoreCategory, StoreRecord, StoreStatusDocument,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, warn};

use crate::rates::{rate, Yoy};

/// YoY (in percent) at or above which a store counts as improving.
pub const IMPROVING_YOY_THRESHOLD: Decimal = Decimal::ONE_HUNDRED;

/// Quadrant of a store with the given direct profit and net-sales YoY.
///
/// # Examples
/// ```
/// use retail_kpi_core::snapshot::StoreCategory;
/// use retail_kpi_metrics::store_class::classify;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(classify(dec!(50), dec!(120)), StoreCategory::ProfitImproving);
/// assert_eq!(classify(dec!(-30), dec!(80)), StoreCategory::LossDeteriorating);
/// ```
#[must_use]
pub fn classify(direct_profit: Decimal, yoy: Decimal) -> StoreCategory {
    let profitable = direct_profit >= Decimal::ZERO;
    let improving = yoy >= IMPROVING_YOY_THRESHOLD;
    match (profitable, improving) {
        (true, true) => StoreCategory::ProfitImproving,
        (true, false) => StoreCategory::ProfitDeteriorating,
        (false, true) => StoreCategory::LossImproving,
        (false, false) => StoreCategory::LossDeteriorating,
    }
}

/// Net-sales YoY of a store: the reported value, else derived from its sales.
#[must_use]
pub fn store_yoy(store: &StoreRecord) -> Option<Decimal> {
    store.yoy.or_else(|| {
        Yoy::between(store.current.net_sales, store.previous.net_sales).ratio()
    })
}

/// Category of a store, `None` when direct profit or YoY is undefined.
#[must_use]
pub fn classify_store(store: &StoreRecord) -> Option<StoreCategory> {
    let direct_profit = store.current.direct_profit?;
    let yoy = store_yoy(store)?;
    Some(classify(direct_profit, yoy))
}

/// Movement between the prior and current category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    Unchanged,
    Upgraded,
    Downgraded,
    /// No prior category on record.
    New,
}

impl Transition {
    #[must_use]
    pub fn between(previous: Option<StoreCategory>, current: StoreCategory) -> Self {
        match previous {
            None => Self::New,
            Some(prev) => match current.rank().cmp(&prev.rank()) {
                Ordering::Greater => Self::Upgraded,
                Ordering::Less => Self::Downgraded,
                Ordering::Equal => Self::Unchanged,
            },
        }
    }
}

/// A store with its computed category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedStore {
    pub store_code: String,
    pub store_name: String,
    pub unit: BusinessUnit,
    pub category: StoreCategory,
    pub previous_category: Option<StoreCategory>,
    pub transition: Transition,
    pub net_sales: Decimal,
    pub direct_profit: Decimal,
    pub yoy: Decimal,
    /// `(rent + labor_cost) / net_sales * 100`.
    pub rent_labor_ratio: Decimal,
    #[serde(skip)]
    rent_labor: Decimal,
}

impl ClassifiedStore {
    /// Classifies `store`, `None` when it cannot be classified.
    #[must_use]
    pub fn from_record(store: &StoreRecord) -> Option<Self> {
        let direct_profit = store.current.direct_profit?;
        let yoy = store_yoy(store)?;
        let category = classify(direct_profit, yoy);
        let rent_labor = store.current.rent() + store.current.labor_cost();
        Some(Self {
            store_code: store.store_code.clone(),
            store_name: store.store_name.clone(),
            unit: store.unit,
            category,
            previous_category: store.previous_category,
            transition: Transition::between(store.previous_category, category),
            net_sales: store.current.net_sales,
            direct_profit,
            yoy,
            rent_labor_ratio: rate(rent_labor, store.current.net_sales),
            rent_labor,
        })
    }
}

/// Aggregates of one quadrant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBucket {
    pub category: StoreCategory,
    pub count: usize,
    pub total_direct_profit: Decimal,
    /// Simple mean of store YoY values.
    pub avg_yoy: Decimal,
    /// `Σ(rent + labor) / Σ net_sales * 100`, weighted by sales.
    pub avg_rent_labor_ratio: Decimal,
    pub stores: Vec<ClassifiedStore>,
}

impl CategoryBucket {
    fn from_stores(category: StoreCategory, stores: Vec<ClassifiedStore>) -> Self {
        let count = stores.len();
        let total_direct_profit = stores.iter().map(|s| s.direct_profit).sum();
        let avg_yoy = if count == 0 {
            Decimal::ZERO
        } else {
            stores.iter().map(|s| s.yoy).sum::<Decimal>() / Decimal::from(count)
        };
        let rent_labor: Decimal = stores.iter().map(|s| s.rent_labor).sum();
        let net_sales: Decimal = stores.iter().map(|s| s.net_sales).sum();
        Self {
            category,
            count,
            total_direct_profit,
            avg_yoy,
            avg_rent_labor_ratio: rate(rent_labor, net_sales),
            stores,
        }
    }
}

/// Computed summary of one business unit, next to the reported one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitStoreSummary {
    pub unit: BusinessUnit,
    pub store_count: usize,
    pub profit_stores: usize,
    pub loss_stores: usize,
    pub total_net_sales: Decimal,
    pub total_direct_profit: Decimal,
    pub direct_profit_rate: Decimal,
    pub reported: Option<StatusSummary>,
}

/// A store ranked by direct profit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedStore {
    pub rank: usize,
    pub store_code: String,
    pub store_name: String,
    pub direct_profit: Decimal,
    pub net_sales: Decimal,
}

/// A store listed under a bucket other than its computed category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMismatch {
    pub store_code: String,
    pub reported: StoreCategory,
    pub computed: StoreCategory,
}

/// Full classification of a store set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreClassification {
    /// One bucket per category, in `StoreCategory::ALL` order.
    pub buckets: Vec<CategoryBucket>,
    /// Codes of stores without a direct profit or YoY.
    pub unclassified: Vec<String>,
    pub unit_summaries: Vec<UnitStoreSummary>,
    pub top: Vec<RankedStore>,
    pub bottom: Vec<RankedStore>,
    pub mismatches: Vec<CategoryMismatch>,
}

impl StoreClassification {
    #[must_use]
    pub fn bucket(&self, category: StoreCategory) -> Option<&CategoryBucket> {
        self.buckets.iter().find(|b| b.category == category)
    }

    /// Number of classified stores across all buckets.
    #[must_use]
    pub fn classified_count(&self) -> usize {
        self.buckets.iter().map(|b| b.count).sum()
    }
}

/// Classifies a store set into the four buckets.
#[must_use]
pub fn classify_stores(stores: &[StoreRecord], ranking_size: usize) -> StoreClassification {
    let mut grouped: Vec<Vec<ClassifiedStore>> = vec![Vec::new(); StoreCategory::ALL.len()];
    let mut unclassified = Vec::new();

    for store in stores {
        match ClassifiedStore::from_record(store) {
            Some(classified) => {
                let slot = StoreCategory::ALL
                    .iter()
                    .position(|c| *c == classified.category)
                    .unwrap_or_default();
                grouped[slot].push(classified);
            }
            None => unclassified.push(store.store_code.clone()),
        }
    }

    if !unclassified.is_empty() {
        debug!(count = unclassified.len(), "Stores without direct profit or YoY left unclassified");
    }

    let buckets = StoreCategory::ALL
        .into_iter()
        .zip(grouped)
        .map(|(category, members)| CategoryBucket::from_stores(category, members))
        .collect();

    let (top, bottom) = rank_by_direct_profit(stores, ranking_size);

    StoreClassification {
        buckets,
        unclassified,
        unit_summaries: [BusinessUnit::Hk, BusinessUnit::Mc, BusinessUnit::Total]
            .into_iter()
            .map(|unit| unit_summary(stores, unit))
            .collect(),
        top,
        bottom,
        mismatches: Vec::new(),
    }
}

/// Classifies the stores of a store-status document, attaching its reported
/// unit summaries and cross-checking its pre-assigned buckets.
#[must_use]
pub fn classify_status_document(doc: &StoreStatusDocument, ranking_size: usize) -> StoreClassification {
    let stores: Vec<StoreRecord> = doc.categories.labelled().map(|(_, s)| s.clone()).collect();
    let mut classification = classify_stores(&stores, ranking_size);

    for summary in &mut classification.unit_summaries {
        summary.reported = match summary.unit {
            BusinessUnit::Hk => doc.summary.clone(),
            BusinessUnit::Mc => doc.mc_summary.clone(),
            BusinessUnit::Total => None,
        };
    }
    classification.mismatches = reported_bucket_mismatches(doc);
    classification
}

/// Stores whose listed bucket differs from their computed category.
#[must_use]
pub fn reported_bucket_mismatches(doc: &StoreStatusDocument) -> Vec<CategoryMismatch> {
    let mismatches: Vec<CategoryMismatch> = doc
        .categories
        .labelled()
        .filter_map(|(reported, store)| {
            let computed = classify_store(store)?;
            (computed != reported).then(|| CategoryMismatch {
                store_code: store.store_code.clone(),
                reported,
                computed,
            })
        })
        .collect();
    if !mismatches.is_empty() {
        warn!(count = mismatches.len(), "Store-status buckets disagree with computed categories");
    }
    mismatches
}

fn unit_summary(stores: &[StoreRecord], unit: BusinessUnit) -> UnitStoreSummary {
    let members: Vec<&StoreRecord> = stores.iter().filter(|s| s.unit.within(unit)).collect();
    let profit_stores = members
        .iter()
        .filter(|s| s.current.direct_profit.is_some_and(|dp| dp >= Decimal::ZERO))
        .count();
    let loss_stores = members
        .iter()
        .filter(|s| s.current.direct_profit.is_some_and(|dp| dp < Decimal::ZERO))
        .count();
    let total_net_sales: Decimal = members.iter().map(|s| s.current.net_sales).sum();
    let total_direct_profit: Decimal = members
        .iter()
        .filter_map(|s| s.current.direct_profit)
        .sum();
    UnitStoreSummary {
        unit,
        store_count: members.len(),
        profit_stores,
        loss_stores,
        total_net_sales,
        total_direct_profit,
        direct_profit_rate: rate(total_direct_profit, total_net_sales),
        reported: None,
    }
}

fn rank_by_direct_profit(stores: &[StoreRecord], n: usize) -> (Vec<RankedStore>, Vec<RankedStore>) {
    let mut with_profit: Vec<(&StoreRecord, Decimal)> = stores
        .iter()
        .filter_map(|s| s.current.direct_profit.map(|dp| (s, dp)))
        .collect();
    with_profit.sort_by(|(a, a_dp), (b, b_dp)| {
        b_dp.cmp(a_dp).then_with(|| a.store_code.cmp(&b.store_code))
    });

    let ranked = |(i, (store, dp)): (usize, &(&StoreRecord, Decimal))| RankedStore {
        rank: i + 1,
        store_code: store.store_code.clone(),
        store_name: store.store_name.clone(),
        direct_profit: *dp,
        net_sales: store.current.net_sales,
    };
    let top = with_profit.iter().take(n).enumerate().map(ranked).collect();
    let bottom = with_profit.iter().rev().take(n).enumerate().map(ranked).collect();
    (top, bottom)
}
