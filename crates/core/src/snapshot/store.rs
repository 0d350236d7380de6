//! Per-store P&L document and the store record model shared by the
//! store-status document.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use super::{amount_of, lenient, opt_amount_of};

/// Business unit a figure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusinessUnit {
    Hk,
    Mc,
    Total,
}

impl BusinessUnit {
    /// The two trading units, in display order.
    pub const UNITS: [BusinessUnit; 2] = [BusinessUnit::Hk, BusinessUnit::Mc];

    /// Key used by the snapshot documents (`hk`, `mc`, `total`).
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Hk => "hk",
            Self::Mc => "mc",
            Self::Total => "total",
        }
    }

    /// Resolves the unit of a store from an explicit country field, falling
    /// back to the store-code prefix (`MC...` stores trade in Macau).
    #[must_use]
    pub fn for_store(country: Option<&str>, store_code: &str) -> Self {
        match country.map(|c| c.trim().to_ascii_uppercase()) {
            Some(c) if c == "MC" || c == "MACAU" || c == "MO" => Self::Mc,
            Some(c) if c == "HK" || c == "HONGKONG" || c == "HONG KONG" => Self::Hk,
            _ if store_code.to_ascii_uppercase().starts_with("MC") => Self::Mc,
            _ => Self::Hk,
        }
    }

    /// Whether a store of unit `self` is part of the `scope` combination.
    #[must_use]
    pub fn within(&self, scope: BusinessUnit) -> bool {
        scope == BusinessUnit::Total || *self == scope
    }
}

impl fmt::Display for BusinessUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Hk => "HK",
            Self::Mc => "MC",
            Self::Total => "Total",
        })
    }
}

/// One of the 14 direct-cost line items carried per store and by the
/// headquarters opex record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostLine {
    LaborCost,
    Rent,
    Logistics,
    Marketing,
    Fee,
    Maintenance,
    Insurance,
    Utilities,
    Supplies,
    Travel,
    Communication,
    Uniform,
    Depreciation,
    OtherFee,
}

impl CostLine {
    pub const COUNT: usize = 14;

    pub const ALL: [CostLine; Self::COUNT] = [
        CostLine::LaborCost,
        CostLine::Rent,
        CostLine::Logistics,
        CostLine::Marketing,
        CostLine::Fee,
        CostLine::Maintenance,
        CostLine::Insurance,
        CostLine::Utilities,
        CostLine::Supplies,
        CostLine::Travel,
        CostLine::Communication,
        CostLine::Uniform,
        CostLine::Depreciation,
        CostLine::OtherFee,
    ];

    /// Snapshot key of the current value.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::LaborCost => "labor_cost",
            Self::Rent => "rent",
            Self::Logistics => "logistics",
            Self::Marketing => "marketing",
            Self::Fee => "fee",
            Self::Maintenance => "maintenance",
            Self::Insurance => "insurance",
            Self::Utilities => "utilities",
            Self::Supplies => "supplies",
            Self::Travel => "travel",
            Self::Communication => "communication",
            Self::Uniform => "uniform",
            Self::Depreciation => "depreciation",
            Self::OtherFee => "other_fee",
        }
    }

    /// Snapshot key of the previous-year value (`<key>_prev`).
    #[must_use]
    pub fn prev_key(&self) -> String {
        format!("{}_prev", self.key())
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// Amounts for all 14 cost lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostLines([Decimal; CostLine::COUNT]);

impl CostLines {
    #[must_use]
    pub fn get(&self, line: CostLine) -> Decimal {
        self.0[line.index()]
    }

    pub fn set(&mut self, line: CostLine, amount: Decimal) {
        self.0[line.index()] = amount;
    }

    /// Sum of every line.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.0.iter().copied().sum()
    }

    /// Iterates `(line, amount)` pairs in `CostLine::ALL` order.
    pub fn iter(&self) -> impl Iterator<Item = (CostLine, Decimal)> + '_ {
        CostLine::ALL.iter().map(move |line| (*line, self.get(*line)))
    }

    /// Reads current values (`key`) from a flat snapshot object.
    #[must_use]
    pub fn current_from(map: &Map<String, Value>) -> Self {
        let mut lines = Self::default();
        for line in CostLine::ALL {
            lines.set(line, amount_of(map, line.key()));
        }
        lines
    }

    /// Reads previous-year values (`key_prev`) from a flat snapshot object.
    #[must_use]
    pub fn previous_from(map: &Map<String, Value>) -> Self {
        let mut lines = Self::default();
        for line in CostLine::ALL {
            lines.set(line, amount_of(map, &line.prev_key()));
        }
        lines
    }
}

/// Store profitability × momentum quadrant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreCategory {
    ProfitImproving,
    ProfitDeteriorating,
    LossImproving,
    LossDeteriorating,
}

impl StoreCategory {
    pub const ALL: [StoreCategory; 4] = [
        StoreCategory::ProfitImproving,
        StoreCategory::ProfitDeteriorating,
        StoreCategory::LossImproving,
        StoreCategory::LossDeteriorating,
    ];

    /// Snapshot label (`profit_improving`, ...).
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::ProfitImproving => "profit_improving",
            Self::ProfitDeteriorating => "profit_deteriorating",
            Self::LossImproving => "loss_improving",
            Self::LossDeteriorating => "loss_deteriorating",
        }
    }

    /// Parses a snapshot label; case and separators (`-`, ` `) are ignored.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized: String = label
            .trim()
            .to_ascii_lowercase()
            .chars()
            .map(|c| if c == '-' || c == ' ' { '_' } else { c })
            .collect();
        Self::ALL.into_iter().find(|c| c.label() == normalized)
    }

    /// Rank used for transition badges; higher is better.
    #[must_use]
    pub const fn rank(&self) -> u8 {
        match self {
            Self::ProfitImproving => 3,
            Self::ProfitDeteriorating => 2,
            Self::LossImproving => 1,
            Self::LossDeteriorating => 0,
        }
    }
}

impl fmt::Display for StoreCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Figures of one store for one side (current or previous) of a comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreFigures {
    pub net_sales: Decimal,
    /// `None` when the snapshot carries no direct-profit figure at all.
    pub direct_profit: Option<Decimal>,
    pub costs: CostLines,
}

impl StoreFigures {
    #[must_use]
    pub fn rent(&self) -> Decimal {
        self.costs.get(CostLine::Rent)
    }

    #[must_use]
    pub fn labor_cost(&self) -> Decimal {
        self.costs.get(CostLine::LaborCost)
    }
}

/// Raw store entry as it appears in the JSON documents.
#[derive(Debug, Clone, Deserialize)]
struct StoreEntry {
    #[serde(default, alias = "shop_cd", alias = "code", deserialize_with = "lenient::text")]
    store_code: String,
    #[serde(default, alias = "shop_nm", alias = "name", deserialize_with = "lenient::text")]
    store_name: String,
    #[serde(default)]
    country: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_amount")]
    yoy: Option<Decimal>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    previous_category: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    closed: bool,
    #[serde(flatten)]
    figures: Map<String, Value>,
}

/// A store with its current and previous-year figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoreEntry")]
pub struct StoreRecord {
    pub store_code: String,
    pub store_name: String,
    pub unit: BusinessUnit,
    pub current: StoreFigures,
    pub previous: StoreFigures,
    /// Net-sales YoY in percent (`current / previous * 100`).
    pub yoy: Option<Decimal>,
    /// Category as labelled by the snapshot producer, if any.
    pub category: Option<StoreCategory>,
    /// Category the store held in the prior period.
    pub previous_category: Option<StoreCategory>,
    pub closed: bool,
}

impl From<StoreEntry> for StoreRecord {
    fn from(entry: StoreEntry) -> Self {
        let map = &entry.figures;
        let current = StoreFigures {
            net_sales: amount_of(map, "net_sales"),
            direct_profit: opt_amount_of(map, "direct_profit"),
            costs: CostLines::current_from(map),
        };
        let previous = StoreFigures {
            net_sales: amount_of(map, "net_sales_prev"),
            direct_profit: opt_amount_of(map, "direct_profit_prev"),
            costs: CostLines::previous_from(map),
        };
        let unit = BusinessUnit::for_store(entry.country.as_deref(), &entry.store_code);
        Self {
            store_code: entry.store_code,
            store_name: entry.store_name,
            unit,
            current,
            previous,
            yoy: entry.yoy,
            category: entry.category.as_deref().and_then(StoreCategory::from_label),
            previous_category: entry
                .previous_category
                .as_deref()
                .and_then(StoreCategory::from_label),
            closed: entry.closed,
        }
    }
}

/// Headquarters opex record: the same 14 lines, current and previous.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct OpexRecord {
    pub current: CostLines,
    pub previous: CostLines,
}

impl From<Map<String, Value>> for OpexRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self {
            current: CostLines::current_from(&map),
            previous: CostLines::previous_from(&map),
        }
    }
}

/// Per-store P&L document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct StorePlDocument {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub stores: Vec<StoreRecord>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub cumulative_stores: Vec<StoreRecord>,
    #[serde(default)]
    pub opex: Option<OpexRecord>,
    #[serde(default)]
    pub cumulative_opex: Option<OpexRecord>,
}
