//! Dashboard-data document: sales, channel mix, efficiency, season and
//! inventory sections for one period.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::{decimal_from_value, lenient};

/// Sales figures of one business unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesFigures {
    #[serde(default, deserialize_with = "lenient::amount")]
    pub tag_sales: Decimal,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub net_sales: Decimal,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub tag_sales_prev: Decimal,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub net_sales_prev: Decimal,
    #[serde(default, deserialize_with = "lenient::opt_amount")]
    pub discount_rate: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesSummary {
    #[serde(default)]
    pub hk: Option<SalesFigures>,
    #[serde(default)]
    pub mc: Option<SalesFigures>,
    #[serde(default)]
    pub total: Option<SalesFigures>,
}

/// One country × channel row (e.g. HK / outlet).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRow {
    #[serde(default, deserialize_with = "lenient::text")]
    pub country: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub channel: String,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub net_sales: Decimal,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub net_sales_prev: Decimal,
}

/// Store row used for sales-per-area efficiency.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EfficiencyStore {
    #[serde(default, alias = "shop_cd", deserialize_with = "lenient::text")]
    pub store_code: String,
    #[serde(default, alias = "shop_nm", deserialize_with = "lenient::text")]
    pub store_name: String,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub net_sales: Decimal,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub closed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfflineStoreEfficiency {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub stores: Vec<EfficiencyStore>,
    /// Offline net sales of the prior-year same month.
    #[serde(default, deserialize_with = "lenient::amount")]
    pub prev_net_sales: Decimal,
    /// Number of offline stores trading in the prior-year same month.
    #[serde(default, deserialize_with = "lenient::count")]
    pub prev_store_count: u32,
}

/// Net sales by fashion season code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonSalesRow {
    #[serde(default, deserialize_with = "lenient::text")]
    pub season: String,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub tag_sales: Decimal,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub net_sales: Decimal,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub net_sales_prev: Decimal,
}

/// Stock value and stock-weeks of one accessory category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockBucket {
    #[serde(default, deserialize_with = "lenient::amount")]
    pub stock_price: Decimal,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub stock_weeks: Decimal,
}

/// Accessory stock keyed by category (`hat`, `shoe`, `bag`, `other_acc`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccStockSummary {
    /// Latest month.
    #[serde(default, deserialize_with = "lenient::keyed")]
    pub current: BTreeMap<String, StockBucket>,
    /// Prior-year same month.
    #[serde(default, deserialize_with = "lenient::keyed")]
    pub previous: BTreeMap<String, StockBucket>,
}

/// Ending stock of one subcategory × season, with the month's sales.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryLine {
    #[serde(default, alias = "item", deserialize_with = "lenient::text")]
    pub subcategory: String,
    #[serde(default, alias = "sesn", deserialize_with = "lenient::text")]
    pub season: String,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub stock_price: Decimal,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub gross_sales: Decimal,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub net_sales: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndingInventory {
    /// Latest month, seasons relative to the current period.
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub current: Vec<InventoryLine>,
    /// Prior-year same month, seasons relative to that period.
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub previous: Vec<InventoryLine>,
}

/// `{ "<YYMM>": { "<key>": amount } }` monthly series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<BTreeMap<String, Option<BTreeMap<String, Value>>>>")]
pub struct MonthlySeries(pub BTreeMap<String, BTreeMap<String, Decimal>>);

impl From<Option<BTreeMap<String, Option<BTreeMap<String, Value>>>>> for MonthlySeries {
    fn from(raw: Option<BTreeMap<String, Option<BTreeMap<String, Value>>>>) -> Self {
        Self(
            raw.unwrap_or_default()
                .into_iter()
                .map(|(period, row)| {
                    let row = row
                        .unwrap_or_default()
                        .into_iter()
                        .filter_map(|(k, v)| decimal_from_value(&v).map(|d| (k, d)))
                        .collect();
                    (period, row)
                })
                .collect(),
        )
    }
}

impl MonthlySeries {
    #[must_use]
    pub fn value(&self, period: &str, key: &str) -> Option<Decimal> {
        self.0.get(period).and_then(|row| row.get(key)).copied()
    }
}

/// Store counts of one business unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreCountSummary {
    #[serde(default, deserialize_with = "lenient::count")]
    pub current: u32,
    #[serde(default, deserialize_with = "lenient::count")]
    pub previous: u32,
    #[serde(default, deserialize_with = "lenient::count")]
    pub opened: u32,
    #[serde(default, deserialize_with = "lenient::count")]
    pub closed: u32,
}

/// Dashboard-data document for one period.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardData {
    #[serde(default)]
    pub sales_summary: Option<SalesSummary>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub country_channel_summary: Vec<ChannelRow>,
    #[serde(default)]
    pub offline_store_efficiency: Option<OfflineStoreEfficiency>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub season_sales: Vec<SeasonSalesRow>,
    #[serde(default)]
    pub acc_stock_summary: Option<AccStockSummary>,
    #[serde(default)]
    pub ending_inventory: Option<EndingInventory>,
    #[serde(default)]
    pub monthly_item_data: MonthlySeries,
    #[serde(default)]
    pub monthly_item_yoy: MonthlySeries,
    #[serde(default)]
    pub monthly_inventory_data: MonthlySeries,
    #[serde(default)]
    pub monthly_inventory_yoy: MonthlySeries,
    /// Store counts keyed by unit (`hk`, `mc`, `total`).
    #[serde(default, deserialize_with = "lenient::keyed")]
    pub store_summary: BTreeMap<String, StoreCountSummary>,
}
