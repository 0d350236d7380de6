//! Store-area reference document.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::lenient;

/// Selling area per store code (`store_areas: code -> area`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreAreaDocument {
    #[serde(default, deserialize_with = "lenient::amount_map")]
    pub store_areas: BTreeMap<String, Decimal>,
}

impl StoreAreaDocument {
    /// Area of a store; `None` when the store is not listed or its area is not positive.
    #[must_use]
    pub fn area_of(&self, store_code: &str) -> Option<Decimal> {
        self.store_areas
            .get(store_code)
            .copied()
            .filter(|a| *a > Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn area_lookup_ignores_non_positive() {
        let doc: StoreAreaDocument = serde_json::from_value(json!({
            "store_areas": { "HK001": 120.5, "HK002": "0", "HK003": null }
        }))
        .unwrap();
        assert_eq!(doc.area_of("HK001"), Some(dec!(120.5)));
        assert_eq!(doc.area_of("HK002"), None);
        assert_eq!(doc.area_of("HK003"), None);
        assert_eq!(doc.area_of("HK999"), None);
    }
}
