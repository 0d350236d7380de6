//! P&L document: `current_month`, `prev_month` and `cumulative` scopes, each
//! with `hk` / `mc` / `total` unit blocks and an `expense_detail` breakdown.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{amount_of, opt_amount_of};
use crate::snapshot::store::BusinessUnit;

/// Absolute P&L lines of a [`FinancialRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlLine {
    TagSales,
    NetSales,
    Discount,
    Cogs,
    GrossProfit,
    DirectCost,
    DirectProfit,
    SgA,
    OperatingProfit,
}

impl PlLine {
    pub const ALL: [PlLine; 9] = [
        PlLine::TagSales,
        PlLine::NetSales,
        PlLine::Discount,
        PlLine::Cogs,
        PlLine::GrossProfit,
        PlLine::DirectCost,
        PlLine::DirectProfit,
        PlLine::SgA,
        PlLine::OperatingProfit,
    ];

    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::TagSales => "tag_sales",
            Self::NetSales => "net_sales",
            Self::Discount => "discount",
            Self::Cogs => "cogs",
            Self::GrossProfit => "gross_profit",
            Self::DirectCost => "direct_cost",
            Self::DirectProfit => "direct_profit",
            Self::SgA => "sg_a",
            Self::OperatingProfit => "operating_profit",
        }
    }
}

/// One business unit's P&L for one scope.
///
/// Rate fields are `None` when the snapshot did not precompute them; they are
/// derived from their absolute pair downstream, never the other way round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialRecord {
    pub tag_sales: Decimal,
    pub net_sales: Decimal,
    pub discount: Decimal,
    pub cogs: Decimal,
    pub gross_profit: Decimal,
    pub direct_cost: Decimal,
    pub direct_profit: Decimal,
    pub sg_a: Decimal,
    pub operating_profit: Decimal,
    pub discount_rate: Option<Decimal>,
    pub cogs_rate: Option<Decimal>,
    pub gross_profit_rate: Option<Decimal>,
    pub direct_profit_rate: Option<Decimal>,
    pub operating_profit_rate: Option<Decimal>,
}

impl FinancialRecord {
    #[must_use]
    pub fn get(&self, line: PlLine) -> Decimal {
        match line {
            PlLine::TagSales => self.tag_sales,
            PlLine::NetSales => self.net_sales,
            PlLine::Discount => self.discount,
            PlLine::Cogs => self.cogs,
            PlLine::GrossProfit => self.gross_profit,
            PlLine::DirectCost => self.direct_cost,
            PlLine::DirectProfit => self.direct_profit,
            PlLine::SgA => self.sg_a,
            PlLine::OperatingProfit => self.operating_profit,
        }
    }

    pub fn set(&mut self, line: PlLine, amount: Decimal) {
        let slot = match line {
            PlLine::TagSales => &mut self.tag_sales,
            PlLine::NetSales => &mut self.net_sales,
            PlLine::Discount => &mut self.discount,
            PlLine::Cogs => &mut self.cogs,
            PlLine::GrossProfit => &mut self.gross_profit,
            PlLine::DirectCost => &mut self.direct_cost,
            PlLine::DirectProfit => &mut self.direct_profit,
            PlLine::SgA => &mut self.sg_a,
            PlLine::OperatingProfit => &mut self.operating_profit,
        };
        *slot = amount;
    }
}

/// Raw unit block. Holds current values (`net_sales`), reported previous-year
/// values (`net_sales_prev`) and YoY ratios (`net_sales_yoy`) side by side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlUnitBlock(pub Map<String, Value>);

impl PlUnitBlock {
    /// Current-period record.
    #[must_use]
    pub fn current(&self) -> FinancialRecord {
        let map = &self.0;
        let mut record = FinancialRecord::default();
        for line in PlLine::ALL {
            record.set(line, amount_of(map, line.key()));
        }
        record.discount_rate = opt_amount_of(map, "discount_rate");
        record.cogs_rate = opt_amount_of(map, "cogs_rate");
        record.gross_profit_rate = opt_amount_of(map, "gross_profit_rate");
        record.direct_profit_rate = opt_amount_of(map, "direct_profit_rate");
        record.operating_profit_rate = opt_amount_of(map, "operating_profit_rate");
        record
    }

    /// Reported previous-year value of a line, if the snapshot carries one.
    #[must_use]
    pub fn reported_previous(&self, line: PlLine) -> Option<Decimal> {
        opt_amount_of(&self.0, &format!("{}_prev", line.key()))
    }

    /// Reported YoY ratio (percent) of a line, if the snapshot carries one.
    #[must_use]
    pub fn reported_yoy(&self, line: PlLine) -> Option<Decimal> {
        opt_amount_of(&self.0, &format!("{}_yoy", line.key()))
    }
}

/// One scope (current month, previous month, cumulative) of the P&L document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlScopeBlock {
    #[serde(default)]
    pub hk: Option<PlUnitBlock>,
    #[serde(default)]
    pub mc: Option<PlUnitBlock>,
    #[serde(default)]
    pub total: Option<PlUnitBlock>,
    /// SG&A breakdown: `{ "<line>": amount, "<line>_prev": amount, ... }`.
    #[serde(default)]
    pub expense_detail: Option<Map<String, Value>>,
}

impl PlScopeBlock {
    #[must_use]
    pub fn unit(&self, unit: BusinessUnit) -> Option<&PlUnitBlock> {
        match unit {
            BusinessUnit::Hk => self.hk.as_ref(),
            BusinessUnit::Mc => self.mc.as_ref(),
            BusinessUnit::Total => self.total.as_ref(),
        }
    }
}

/// P&L document for one period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlDocument {
    #[serde(default)]
    pub current_month: Option<PlScopeBlock>,
    #[serde(default)]
    pub prev_month: Option<PlScopeBlock>,
    #[serde(default)]
    pub cumulative: Option<PlScopeBlock>,
}
