//! Cost rollup.
//!
//! Aggregates the 14 direct-cost lines across a store collection (or the
//! headquarters opex record) and expresses each line against net sales.
//! One function serves every period scope and business-unit combination.

use retail_kpi_core::snapshot::{
    opt_amount_of, BusinessUnit, CostLine, CostLines, OpexRecord, StorePlDocument, StoreRecord,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::rates::{rate, ratio_change, resolve_previous, Yoy};
use crate::scope::PeriodScope;

/// Per-line current and previous totals of a store collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostRollup {
    pub current: CostLines,
    pub previous: CostLines,
    /// Net sales of the rolled-up stores (zero for an opex record).
    pub net_sales: Decimal,
    pub net_sales_prev: Decimal,
    pub store_count: usize,
}

impl CostRollup {
    /// `Σ` of all 14 current lines.
    #[must_use]
    pub fn total_cost(&self) -> Decimal {
        self.current.total()
    }

    /// `Σ` of all 14 previous lines.
    #[must_use]
    pub fn total_cost_prev(&self) -> Decimal {
        self.previous.total()
    }

    fn add_store(&mut self, store: &StoreRecord) {
        for line in CostLine::ALL {
            self.current
                .set(line, self.current.get(line) + store.current.costs.get(line));
            self.previous
                .set(line, self.previous.get(line) + store.previous.costs.get(line));
        }
        self.net_sales += store.current.net_sales;
        self.net_sales_prev += store.previous.net_sales;
        self.store_count += 1;
    }
}

/// Rolls up every store in `stores`.
pub fn rollup<'a, I>(stores: I) -> CostRollup
where
    I: IntoIterator<Item = &'a StoreRecord>,
{
    let mut rollup = CostRollup::default();
    for store in stores {
        rollup.add_store(store);
    }
    rollup
}

/// Wraps a headquarters opex record in the rollup shape.
#[must_use]
pub fn rollup_opex(opex: &OpexRecord) -> CostRollup {
    CostRollup {
        current: opex.current,
        previous: opex.previous,
        ..CostRollup::default()
    }
}

/// Rolls up the stores of `unit` (HK, MC or both) for a period scope.
#[must_use]
pub fn scope_rollup(doc: &StorePlDocument, scope: PeriodScope, unit: BusinessUnit) -> CostRollup {
    let result = rollup(scope.stores(doc).iter().filter(|s| s.unit.within(unit)));
    debug!(
        %scope,
        %unit,
        stores = result.store_count,
        total_cost = %result.total_cost(),
        "Rolled up store costs"
    );
    result
}

/// One cost line expressed against net sales, current vs previous.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemMetrics {
    pub key: String,
    pub current: Decimal,
    pub previous: Decimal,
    /// `current / net_sales * 100`.
    pub ratio: Decimal,
    /// `previous / net_sales_prev * 100`.
    pub ratio_prev: Decimal,
    /// `ratio - ratio_prev`, in percentage points.
    pub ratio_change: Decimal,
    pub yoy: Yoy,
}

/// Builds the ratio / %p / YoY view of a single line item.
#[must_use]
pub fn line_item_metrics(
    key: &str,
    current: Decimal,
    previous: Decimal,
    net_sales: Decimal,
    net_sales_prev: Decimal,
) -> LineItemMetrics {
    let ratio = rate(current, net_sales);
    let ratio_prev = rate(previous, net_sales_prev);
    LineItemMetrics {
        key: key.to_string(),
        current,
        previous,
        ratio,
        ratio_prev,
        ratio_change: ratio_change(ratio, ratio_prev),
        yoy: Yoy::between(current, previous),
    }
}

/// A rollup expressed against net sales.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostAnalysis {
    pub scope: PeriodScope,
    pub unit: BusinessUnit,
    pub store_count: usize,
    pub net_sales: Decimal,
    pub net_sales_prev: Decimal,
    pub lines: Vec<LineItemMetrics>,
    /// Metrics of `total_cost` vs `total_cost_prev`.
    pub total: LineItemMetrics,
}

impl CostAnalysis {
    #[must_use]
    pub fn line(&self, line: CostLine) -> Option<&LineItemMetrics> {
        self.lines.iter().find(|m| m.key == line.key())
    }
}

/// Expresses `rollup` against the given net sales.
#[must_use]
pub fn analyze(
    rollup: &CostRollup,
    scope: PeriodScope,
    unit: BusinessUnit,
    net_sales: Decimal,
    net_sales_prev: Decimal,
) -> CostAnalysis {
    let lines = CostLine::ALL
        .iter()
        .map(|line| {
            line_item_metrics(
                line.key(),
                rollup.current.get(*line),
                rollup.previous.get(*line),
                net_sales,
                net_sales_prev,
            )
        })
        .collect();
    CostAnalysis {
        scope,
        unit,
        store_count: rollup.store_count,
        net_sales,
        net_sales_prev,
        lines,
        total: line_item_metrics(
            "total_cost",
            rollup.total_cost(),
            rollup.total_cost_prev(),
            net_sales,
            net_sales_prev,
        ),
    }
}

/// Store-cost analysis of a scope and unit, against the stores' own net sales.
#[must_use]
pub fn analyze_stores(doc: &StorePlDocument, scope: PeriodScope, unit: BusinessUnit) -> CostAnalysis {
    let rollup = scope_rollup(doc, scope, unit);
    analyze(&rollup, scope, unit, rollup.net_sales, rollup.net_sales_prev)
}

/// Headquarters opex analysis of a scope against the business's net sales.
///
/// An absent opex record analyzes as all-zero lines.
#[must_use]
pub fn analyze_opex(
    doc: &StorePlDocument,
    scope: PeriodScope,
    net_sales: Decimal,
    net_sales_prev: Decimal,
) -> CostAnalysis {
    let rollup = scope.opex(doc).map(rollup_opex).unwrap_or_default();
    analyze(&rollup, scope, BusinessUnit::Total, net_sales, net_sales_prev)
}

/// Analyzes a free-form expense breakdown (`{ "<line>": x, "<line>_prev": y }`).
///
/// A line without `_prev` falls back to `<line>_yoy` reconstruction. Lines are
/// returned in key order.
#[must_use]
pub fn analyze_expense_detail(
    detail: &Map<String, Value>,
    net_sales: Decimal,
    net_sales_prev: Decimal,
) -> Vec<LineItemMetrics> {
    let mut keys: Vec<&String> = detail
        .keys()
        .filter(|k| !k.ends_with("_prev") && !k.ends_with("_yoy"))
        .collect();
    keys.sort();
    keys.into_iter()
        .filter_map(|key| {
            let current = opt_amount_of(detail, key)?;
            let (previous, _) = resolve_previous(
                current,
                opt_amount_of(detail, &format!("{key}_prev")),
                opt_amount_of(detail, &format!("{key}_yoy")),
            );
            Some(line_item_metrics(key, current, previous, net_sales, net_sales_prev))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn store(code: &str, net_sales: i64, lines: &[(&str, i64)]) -> StoreRecord {
        let mut entry = json!({ "store_code": code, "net_sales": net_sales, "net_sales_prev": net_sales / 2 });
        let map = entry.as_object_mut().unwrap();
        for (key, value) in lines {
            map.insert((*key).to_string(), json!(value));
        }
        serde_json::from_value(entry).unwrap()
    }

    fn sample_doc() -> StorePlDocument {
        StorePlDocument {
            stores: vec![
                store("HK001", 1000, &[("rent", 200), ("rent_prev", 150), ("labor_cost", 100)]),
                store("HK002", 500, &[("rent", 100), ("marketing", 20), ("other_fee", 5)]),
                store("MC001", 400, &[("rent", 80), ("labor_cost", 40), ("labor_cost_prev", 30)]),
            ],
            cumulative_stores: vec![store("HK001", 9000, &[("rent", 1800)])],
            ..StorePlDocument::default()
        }
    }

    // ============================================
    // rollup Tests
    // ============================================

    #[test]
    fn rollup_sums_each_line() {
        let doc = sample_doc();
        let total = scope_rollup(&doc, PeriodScope::CurrentMonth, BusinessUnit::Total);
        assert_eq!(total.store_count, 3);
        assert_eq!(total.current.get(CostLine::Rent), dec!(380));
        assert_eq!(total.previous.get(CostLine::Rent), dec!(150));
        assert_eq!(total.current.get(CostLine::LaborCost), dec!(140));
        assert_eq!(total.net_sales, dec!(1900));
    }

    #[test]
    fn total_cost_equals_sum_of_all_lines() {
        let doc = sample_doc();
        for unit in [BusinessUnit::Hk, BusinessUnit::Mc, BusinessUnit::Total] {
            let r = scope_rollup(&doc, PeriodScope::CurrentMonth, unit);
            let by_line: Decimal = CostLine::ALL.iter().map(|l| r.current.get(*l)).sum();
            let by_line_prev: Decimal = CostLine::ALL.iter().map(|l| r.previous.get(*l)).sum();
            assert_eq!(r.total_cost(), by_line);
            assert_eq!(r.total_cost_prev(), by_line_prev);
        }
        let total = scope_rollup(&doc, PeriodScope::CurrentMonth, BusinessUnit::Total);
        assert_eq!(total.total_cost(), dec!(545));
    }

    #[test]
    fn unit_filter_selects_stores() {
        let doc = sample_doc();
        let hk = scope_rollup(&doc, PeriodScope::CurrentMonth, BusinessUnit::Hk);
        let mc = scope_rollup(&doc, PeriodScope::CurrentMonth, BusinessUnit::Mc);
        assert_eq!(hk.store_count, 2);
        assert_eq!(mc.store_count, 1);
        assert_eq!(mc.current.get(CostLine::Rent), dec!(80));
    }

    #[test]
    fn cumulative_scope_uses_cumulative_stores() {
        let doc = sample_doc();
        let cumulative = scope_rollup(&doc, PeriodScope::Cumulative, BusinessUnit::Total);
        assert_eq!(cumulative.store_count, 1);
        assert_eq!(cumulative.total_cost(), dec!(1800));
    }

    #[test]
    fn empty_collection_rolls_up_to_zero() {
        let r = rollup(std::iter::empty());
        assert_eq!(r.total_cost(), Decimal::ZERO);
        assert_eq!(r.store_count, 0);
    }

    // ============================================
    // line_item_metrics Tests
    // ============================================

    #[test]
    fn line_item_ratio_and_change() {
        let m = line_item_metrics("rent", dec!(200), dec!(100), dec!(1000), dec!(250));
        assert_eq!(m.ratio, dec!(20));
        assert_eq!(m.ratio_prev, dec!(40));
        assert_eq!(m.ratio_change, dec!(-20));
        assert_eq!(m.yoy, Yoy::Ratio(dec!(200)));
    }

    #[test]
    fn line_item_new_and_undefined_yoy() {
        let new_line = line_item_metrics("fee", dec!(10), Decimal::ZERO, dec!(100), dec!(100));
        assert_eq!(new_line.yoy, Yoy::New);
        let empty = line_item_metrics("fee", Decimal::ZERO, Decimal::ZERO, dec!(100), dec!(100));
        assert_eq!(empty.yoy, Yoy::Undefined);
    }

    #[test]
    fn line_item_without_sales_has_zero_ratio() {
        let m = line_item_metrics("rent", dec!(10), dec!(10), Decimal::ZERO, Decimal::ZERO);
        assert_eq!(m.ratio, Decimal::ZERO);
        assert_eq!(m.ratio_prev, Decimal::ZERO);
    }

    // ============================================
    // analyze Tests
    // ============================================

    #[test]
    fn analyze_stores_uses_store_sales() {
        let doc = sample_doc();
        let analysis = analyze_stores(&doc, PeriodScope::CurrentMonth, BusinessUnit::Hk);
        assert_eq!(analysis.lines.len(), CostLine::COUNT);
        assert_eq!(analysis.net_sales, dec!(1500));
        assert_eq!(analysis.total.current, dec!(425));
        let rent = analysis.line(CostLine::Rent).unwrap();
        assert_eq!(rent.ratio, dec!(20));
    }

    #[test]
    fn analyze_opex_absent_record_is_zero() {
        let doc = StorePlDocument::default();
        let analysis = analyze_opex(&doc, PeriodScope::Cumulative, dec!(1000), dec!(900));
        assert_eq!(analysis.total.current, Decimal::ZERO);
        assert_eq!(analysis.total.yoy, Yoy::Undefined);
        assert_eq!(analysis.unit, BusinessUnit::Total);
    }

    #[test]
    fn analyze_opex_reads_scope_record() {
        let doc: StorePlDocument = serde_json::from_value(json!({
            "opex": { "marketing": 50, "marketing_prev": 40 },
            "cumulative_opex": { "marketing": 400 }
        }))
        .unwrap();
        let month = analyze_opex(&doc, PeriodScope::CurrentMonth, dec!(1000), dec!(800));
        assert_eq!(month.line(CostLine::Marketing).unwrap().ratio, dec!(5));
        assert_eq!(month.line(CostLine::Marketing).unwrap().ratio_prev, dec!(5));
        let ytd = analyze_opex(&doc, PeriodScope::Cumulative, dec!(8000), dec!(8000));
        assert_eq!(ytd.total.current, dec!(400));
        assert_eq!(ytd.total.yoy, Yoy::New);
    }

    #[test]
    fn expense_detail_pairs_prev_and_yoy_keys() {
        let detail = json!({
            "salary": 300,
            "salary_prev": 250,
            "it_cost": 60,
            "it_cost_yoy": 120,
            "note": "text"
        });
        let lines = analyze_expense_detail(detail.as_object().unwrap(), dec!(3000), dec!(2500));
        let keys: Vec<&str> = lines.iter().map(|l| l.key.as_str()).collect();
        assert_eq!(keys, vec!["it_cost", "salary"]);
        assert_eq!(lines[0].previous, dec!(50));
        assert_eq!(lines[1].previous, dec!(250));
        assert_eq!(lines[1].ratio, dec!(10));
    }
}
