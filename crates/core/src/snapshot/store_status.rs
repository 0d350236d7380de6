//! Store-status document: stores pre-bucketed by category plus unit summaries.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::lenient;
use super::store::{StoreCategory, StoreRecord};

/// Stores as bucketed by the snapshot producer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStatusCategories {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub profit_improving: Vec<StoreRecord>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub profit_deteriorating: Vec<StoreRecord>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub loss_improving: Vec<StoreRecord>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub loss_deteriorating: Vec<StoreRecord>,
}

impl StoreStatusCategories {
    #[must_use]
    pub fn bucket(&self, category: StoreCategory) -> &[StoreRecord] {
        match category {
            StoreCategory::ProfitImproving => &self.profit_improving,
            StoreCategory::ProfitDeteriorating => &self.profit_deteriorating,
            StoreCategory::LossImproving => &self.loss_improving,
            StoreCategory::LossDeteriorating => &self.loss_deteriorating,
        }
    }

    /// Every store with the bucket it was listed under, in bucket order.
    pub fn labelled(&self) -> impl Iterator<Item = (StoreCategory, &StoreRecord)> + '_ {
        StoreCategory::ALL
            .into_iter()
            .flat_map(move |c| self.bucket(c).iter().map(move |s| (c, s)))
    }
}

/// Reported unit summary (`summary` for HK, `mc_summary` for Macau).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
    #[serde(default, deserialize_with = "lenient::count")]
    pub total_stores: u32,
    #[serde(default, deserialize_with = "lenient::count")]
    pub profit_stores: u32,
    #[serde(default, deserialize_with = "lenient::count")]
    pub loss_stores: u32,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub total_net_sales: Decimal,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub total_direct_profit: Decimal,
}

/// Store-status document for one period.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStatusDocument {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub categories: StoreStatusCategories,
    #[serde(default)]
    pub summary: Option<StatusSummary>,
    #[serde(default)]
    pub mc_summary: Option<StatusSummary>,
}
