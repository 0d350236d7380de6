//! Typed schemas for the period-keyed JSON snapshot documents.
//!
//! Snapshots arrive loosely typed: numbers may be missing, `null`, strings with
//! thousands separators, or plain JSON numbers. Every amount goes through the
//! [`lenient`] deserializers or [`amount_of`], so a missing or malformed value
//! resolves to zero (or `None` for optional rates) at exactly one place.

pub mod areas;
pub mod dashboard;
pub mod pl;
pub mod store;
pub mod store_status;

pub use areas::StoreAreaDocument;
pub use dashboard::{
    AccStockSummary, ChannelRow, DashboardData, EndingInventory, EfficiencyStore, InventoryLine,
    MonthlySeries, OfflineStoreEfficiency, SalesFigures, SalesSummary, SeasonSalesRow,
    StockBucket, StoreCountSummary,
};
pub use pl::{FinancialRecord, PlDocument, PlLine, PlScopeBlock, PlUnitBlock};
pub use store::{
    BusinessUnit, CostLine, CostLines, OpexRecord, StoreCategory, StoreFigures, StorePlDocument,
    StoreRecord,
};
pub use store_status::{StatusSummary, StoreStatusCategories, StoreStatusDocument};

use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;

/// Converts a loosely typed JSON value into a decimal amount.
///
/// Accepts JSON numbers (including exponent form) and numeric strings such as
/// `"1,234.5"`. Everything else yields `None`.
#[must_use]
pub fn decimal_from_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(Decimal::from(i));
            }
            parse_decimal(&n.to_string())
        }
        Value::String(s) => parse_decimal(&s.replace(',', "")),
        _ => None,
    }
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

/// Reads `key` from a JSON object as an amount, defaulting to zero.
#[must_use]
pub fn amount_of(map: &Map<String, Value>, key: &str) -> Decimal {
    opt_amount_of(map, key).unwrap_or(Decimal::ZERO)
}

/// Reads `key` from a JSON object as an amount, `None` when absent or not numeric.
#[must_use]
pub fn opt_amount_of(map: &Map<String, Value>, key: &str) -> Option<Decimal> {
    map.get(key).and_then(decimal_from_value)
}

/// Serde helpers for `#[serde(default, deserialize_with = "...")]` fields.
pub mod lenient {
    use super::decimal_from_value;
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;
    use std::collections::BTreeMap;

    /// Amount that defaults to zero when `null` or malformed.
    pub fn amount<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(opt_amount(deserializer)?.unwrap_or(Decimal::ZERO))
    }

    /// Optional amount; `null` and malformed values become `None`.
    pub fn opt_amount<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.as_ref().and_then(decimal_from_value))
    }

    /// Collection or section where an explicit `null` reads as empty.
    pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + Default,
    {
        Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
    }

    /// Keyed records; a `null` map is empty and a `null` entry is the record's default.
    pub fn keyed<'de, D, T>(deserializer: D) -> Result<BTreeMap<String, T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + Default,
    {
        let raw = Option::<BTreeMap<String, Option<T>>>::deserialize(deserializer)?.unwrap_or_default();
        Ok(raw
            .into_iter()
            .map(|(k, v)| (k, v.unwrap_or_default()))
            .collect())
    }

    /// Keyed amounts; entries whose value is not numeric become zero.
    pub fn amount_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, Decimal>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<BTreeMap<String, Value>>::deserialize(deserializer)?.unwrap_or_default();
        Ok(raw
            .into_iter()
            .map(|(k, v)| {
                let amount = decimal_from_value(&v).unwrap_or(Decimal::ZERO);
                (k, amount)
            })
            .collect())
    }

    /// Count that defaults to zero; negative or fractional input is truncated to 0.. .
    pub fn count<'de, D>(deserializer: D) -> Result<u32, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::Number(n)) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| f as u64))
                .map_or(0, |c| u32::try_from(c).unwrap_or(u32::MAX)),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
            _ => 0,
        })
    }

    /// Boolean flag accepting `true`/`false`, `1`/`0`, `"Y"`/`"N"`; defaults to `false`.
    pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::Bool(b)) => b,
            Some(Value::Number(n)) => n.as_i64().is_some_and(|i| i != 0),
            Some(Value::String(s)) => matches!(
                s.trim().to_ascii_uppercase().as_str(),
                "Y" | "YES" | "TRUE" | "1" | "CLOSED"
            ),
            _ => false,
        })
    }

    /// String that tolerates numbers and `null` (store codes are sometimes numeric).
    pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn decimal_from_numbers_and_strings() {
        assert_eq!(decimal_from_value(&json!(12)), Some(dec!(12)));
        assert_eq!(decimal_from_value(&json!(0.05)), Some(dec!(0.05)));
        assert_eq!(decimal_from_value(&json!("1,234.5")), Some(dec!(1234.5)));
        assert_eq!(decimal_from_value(&json!(1.5e3)), Some(dec!(1500)));
    }

    #[test]
    fn decimal_from_non_numeric_is_none() {
        assert_eq!(decimal_from_value(&json!(null)), None);
        assert_eq!(decimal_from_value(&json!("n/a")), None);
        assert_eq!(decimal_from_value(&json!(true)), None);
        assert_eq!(decimal_from_value(&json!("")), None);
    }

    #[test]
    fn amount_of_defaults_to_zero() {
        let map = json!({ "rent": 100, "fee": null })
            .as_object()
            .cloned()
            .unwrap();
        assert_eq!(amount_of(&map, "rent"), dec!(100));
        assert_eq!(amount_of(&map, "fee"), Decimal::ZERO);
        assert_eq!(amount_of(&map, "missing"), Decimal::ZERO);
        assert_eq!(opt_amount_of(&map, "missing"), None);
    }
}
