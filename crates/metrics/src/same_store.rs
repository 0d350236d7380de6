//! Like-for-like store set for YoY comparison.

use retail_kpi_core::snapshot::{BusinessUnit, StoreRecord};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::rates::Yoy;

/// Why a store is left out of the same-store set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SameStoreExclusion {
    /// No sales last year: opened within the window.
    NoPreviousSales,
    /// No sales this period: closed within the window.
    NoCurrentSales,
    NoSalesEitherPeriod,
}

impl fmt::Display for SameStoreExclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NoPreviousSales => "no sales in previous period (new store)",
            Self::NoCurrentSales => "no sales in current period (closed store)",
            Self::NoSalesEitherPeriod => "no sales in either period",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SameStoreEntry {
    pub store_code: String,
    pub store_name: String,
    pub net_sales: Decimal,
    pub net_sales_prev: Decimal,
    pub yoy: Yoy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedEntry {
    pub store_code: String,
    pub store_name: String,
    pub reason: SameStoreExclusion,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SameStoreSet {
    pub unit: BusinessUnit,
    /// Stores trading in both periods, in source order.
    pub included: Vec<SameStoreEntry>,
    pub excluded: Vec<ExcludedEntry>,
    pub net_sales: Decimal,
    pub net_sales_prev: Decimal,
    /// `Σ current / Σ previous * 100` over included stores.
    pub yoy: Yoy,
}

impl SameStoreSet {
    #[must_use]
    pub fn total_stores(&self) -> usize {
        self.included.len() + self.excluded.len()
    }
}

fn exclusion(store: &StoreRecord) -> Option<SameStoreExclusion> {
    match (
        store.current.net_sales.is_zero(),
        store.previous.net_sales.is_zero(),
    ) {
        (false, false) => None,
        (false, true) => Some(SameStoreExclusion::NoPreviousSales),
        (true, false) => Some(SameStoreExclusion::NoCurrentSales),
        (true, true) => Some(SameStoreExclusion::NoSalesEitherPeriod),
    }
}

/// Splits the stores of `unit` into the same-store set and the rest.
#[must_use]
pub fn same_store_set(stores: &[StoreRecord], unit: BusinessUnit) -> SameStoreSet {
    let mut included = Vec::new();
    let mut excluded = Vec::new();

    for store in stores.iter().filter(|s| s.unit.within(unit)) {
        match exclusion(store) {
            None => included.push(SameStoreEntry {
                store_code: store.store_code.clone(),
                store_name: store.store_name.clone(),
                net_sales: store.current.net_sales,
                net_sales_prev: store.previous.net_sales,
                yoy: Yoy::between(store.current.net_sales, store.previous.net_sales),
            }),
            Some(reason) => excluded.push(ExcludedEntry {
                store_code: store.store_code.clone(),
                store_name: store.store_name.clone(),
                reason,
            }),
        }
    }

    let net_sales: Decimal = included.iter().map(|s| s.net_sales).sum();
    let net_sales_prev: Decimal = included.iter().map(|s| s.net_sales_prev).sum();
    SameStoreSet {
        unit,
        included,
        excluded,
        net_sales,
        net_sales_prev,
        yoy: Yoy::between(net_sales, net_sales_prev),
    }
}
