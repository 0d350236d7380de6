use retail_kpi_core::snapshot::{
    BusinessUnit, CostLine, InventoryLine, StoreCategory, StorePlDocument, StoreRecord,
};
use retail_kpi_core::{EngineConfig, PeriodCode, PeriodSnapshots};
use retail_kpi_metrics::cost_rollup::rollup;
use retail_kpi_metrics::efficiency::{ExclusionReason, PrevAreaEstimate};
use retail_kpi_metrics::inventory::{is_stagnant, stagnant_inventory, AgingCohort};
use retail_kpi_metrics::rates::{
    discount_rate, reconstruct_previous, weighted_average_rate, WeightedRate,
};
use retail_kpi_metrics::same_store::same_store_set;
use retail_kpi_metrics::store_class::{classify, classify_stores};
use retail_kpi_metrics::{build_report, PeriodScope, ReportFormatter, Yoy};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;

fn period(code: &str) -> PeriodCode {
    code.parse().unwrap()
}

fn stores(value: serde_json::Value) -> Vec<StoreRecord> {
    serde_json::from_value(value).unwrap()
}

// ============================================================================
// Rates
// ============================================================================

#[test]
fn test_weighted_average_stays_within_rate_range() {
    let cases = [
        vec![(dec!(10), dec!(900)), (dec!(30), dec!(100))],
        vec![(dec!(45.5), dec!(1)), (dec!(2.25), dec!(0)), (dec!(12), dec!(7))],
        vec![(dec!(-5), dec!(3)), (dec!(5), dec!(3))],
        vec![(dec!(18), dec!(250))],
    ];
    for case in cases {
        let units: Vec<WeightedRate> = case
            .iter()
            .map(|(rate, weight)| WeightedRate::new(*rate, *weight))
            .collect();
        let blended = weighted_average_rate(&units);
        let min = case.iter().map(|(r, _)| *r).min().unwrap();
        let max = case.iter().map(|(r, _)| *r).max().unwrap();
        assert!(blended >= min && blended <= max, "{blended} outside [{min}, {max}]");
    }
}

#[test]
fn test_weighted_average_without_weight_is_zero() {
    let units = [WeightedRate::new(dec!(40), Decimal::ZERO)];
    assert_eq!(weighted_average_rate(&units), Decimal::ZERO);
    assert_eq!(weighted_average_rate(&[]), Decimal::ZERO);
}

#[test]
fn test_reconstruct_previous_identities() {
    for x in [dec!(0), dec!(1), dec!(850), dec!(123456.78)] {
        assert_eq!(reconstruct_previous(x, dec!(100)), x);
        assert_eq!(reconstruct_previous(x, dec!(0)), Decimal::ZERO);
    }
}

#[test]
fn test_discount_rate_from_tag_and_net() {
    assert_eq!(discount_rate(dec!(1000), dec!(850), None), dec!(15));
    assert_eq!(discount_rate(dec!(0), dec!(850), None), Decimal::ZERO);
    assert_eq!(discount_rate(dec!(1000), dec!(850), Some(dec!(14.9))), dec!(14.9));
}

#[test]
fn test_yoy_three_states() {
    assert_eq!(Yoy::between(dec!(120), dec!(100)), Yoy::Ratio(dec!(120)));
    assert_eq!(Yoy::between(dec!(5), dec!(0)), Yoy::New);
    assert_eq!(Yoy::between(dec!(0), dec!(0)), Yoy::Undefined);
}

// ============================================================================
// Cost rollup
// ============================================================================

#[test]
fn test_total_cost_is_sum_of_all_lines() {
    let collection = stores(json!([
        {
            "store_code": "HK001", "net_sales": 1000,
            "labor_cost": 1, "rent": 2, "logistics": 3, "marketing": 4, "fee": 5,
            "maintenance": 6, "insurance": 7, "utilities": 8, "supplies": 9,
            "travel": 10, "communication": 11, "uniform": 12, "depreciation": 13,
            "other_fee": 14
        },
        { "store_code": "MC001", "rent": "1,000", "other_fee": null, "labor_cost": 250 },
        { "store_code": "HK002" }
    ]));
    let rolled = rollup(&collection);
    let by_line: Decimal = CostLine::ALL.into_iter().map(|l| rolled.current.get(l)).sum();
    assert_eq!(rolled.total_cost(), by_line);
    assert_eq!(rolled.total_cost(), dec!(1355));
    assert_eq!(rolled.store_count, 3);
}

// ============================================================================
// Store classification
// ============================================================================

#[test]
fn test_quadrant_examples() {
    assert_eq!(classify(dec!(50), dec!(120)), StoreCategory::ProfitImproving);
    assert_eq!(classify(dec!(-30), dec!(80)), StoreCategory::LossDeteriorating);
    assert_eq!(classify(dec!(0), dec!(100)), StoreCategory::ProfitImproving);
    assert_eq!(classify(dec!(-1), dec!(100)), StoreCategory::LossImproving);
}

#[test]
fn test_every_classifiable_store_lands_in_one_bucket() {
    let collection = stores(json!([
        { "store_code": "HK001", "net_sales": 100, "direct_profit": 50, "yoy": 120 },
        { "store_code": "HK002", "net_sales": 100, "direct_profit": 10, "yoy": 99 },
        { "store_code": "HK003", "net_sales": 100, "direct_profit": -5, "yoy": 130 },
        { "store_code": "MC001", "net_sales": 100, "direct_profit": -30, "yoy": 80 },
        { "store_code": "MC002", "net_sales": 100, "direct_profit": 0, "yoy": 100 },
        { "store_code": "MC003", "net_sales": 100, "yoy": 100 }
    ]));
    let result = classify_stores(&collection, 3);
    let bucketed: usize = result.buckets.iter().map(|b| b.count).sum();
    assert_eq!(bucketed, 5);
    assert_eq!(result.classified_count(), 5);
    assert_eq!(result.unclassified.len(), 1);
    assert_eq!(
        result.bucket(StoreCategory::ProfitImproving).map(|b| b.count),
        Some(2)
    );
    for category in [
        StoreCategory::ProfitDeteriorating,
        StoreCategory::LossImproving,
        StoreCategory::LossDeteriorating,
    ] {
        assert_eq!(result.bucket(category).map(|b| b.count), Some(1));
    }
}

// ============================================================================
// Same-store comparability
// ============================================================================

#[test]
fn test_same_store_excludes_zero_sales_stores() {
    let collection = stores(json!([
        { "store_code": "HK001", "net_sales": 1000, "net_sales_prev": 800 },
        { "store_code": "HK002", "net_sales": 500, "net_sales_prev": 0 },
        { "store_code": "HK003", "net_sales": 0, "net_sales_prev": 300 },
        { "store_code": "HK004", "net_sales": 200, "net_sales_prev": 200 }
    ]));
    let set = same_store_set(&collection, BusinessUnit::Hk);
    assert_eq!(set.total_stores(), collection.len());
    let codes: Vec<&str> = set.included.iter().map(|e| e.store_code.as_str()).collect();
    assert_eq!(codes, vec!["HK001", "HK004"]);
    assert_eq!(set.net_sales, dec!(1200));
    assert_eq!(set.net_sales_prev, dec!(1000));
    assert_eq!(set.yoy, Yoy::Ratio(dec!(120)));
}

// ============================================================================
// Stagnant inventory
// ============================================================================

#[test]
fn test_stagnant_boundary_is_strict() {
    let ratio = dec!(0.05);
    assert!(!is_stagnant(dec!(10), dec!(200), ratio));
    assert!(is_stagnant(dec!(9.9999999), dec!(200), ratio));
    assert!(is_stagnant(dec!(8), dec!(200), ratio));
    assert!(!is_stagnant(dec!(12), dec!(200), ratio));
}

#[test]
fn test_current_season_never_stagnant() {
    let lines: Vec<InventoryLine> = serde_json::from_value(json!([
        { "subcategory": "CAP", "season": "24F", "stock_price": 200, "gross_sales": 0 },
        { "subcategory": "CAP", "season": "24S", "stock_price": 200, "gross_sales": 8 }
    ]))
    .unwrap();
    let groups = stagnant_inventory(&lines, period("2501"), &EngineConfig::default());
    let flagged: usize = groups.iter().map(|g| g.count).sum();
    assert_eq!(flagged, 1);
    assert_eq!(groups[0].cohort, AgingCohort::OneYear);
    assert_eq!(groups[0].candidates[0].season, "24S");
}

// ============================================================================
// Period calendar
// ============================================================================

#[test]
fn test_previous_period_examples() {
    assert_eq!(period("2501").previous().to_string(), "2412");
    assert_eq!(period("2503").previous().to_string(), "2502");
}

// ============================================================================
// Full report
// ============================================================================

fn full_snapshots() -> PeriodSnapshots {
    let mut snapshots = PeriodSnapshots::empty(period("2501"));
    snapshots.dashboard = Some(
        serde_json::from_value(json!({
            "sales_summary": {
                "hk": { "tag_sales": 1000, "net_sales": 850, "tag_sales_prev": 1000, "net_sales_prev": 800 },
                "mc": { "tag_sales": 500, "net_sales": 400, "tag_sales_prev": 500, "net_sales_prev": 400 }
            },
            "offline_store_efficiency": {
                "stores": [
                    { "store_code": "HK001", "net_sales": 3100 },
                    { "store_code": "HK099", "net_sales": 500 },
                    { "store_code": "ONLINE01", "net_sales": 900 },
                    { "store_code": "MC001", "net_sales": 50, "closed": true },
                    { "store_code": "HK002", "net_sales": 0 }
                ],
                "prev_net_sales": 2000,
                "prev_store_count": 2
            },
            "acc_stock_summary": {
                "current": {
                    "hat": { "stock_price": 100, "stock_weeks": 4 },
                    "bag": { "stock_price": 300, "stock_weeks": 8 }
                },
                "previous": { "hat": { "stock_price": 100, "stock_weeks": 10 } }
            },
            "ending_inventory": {
                "current": [
                    { "subcategory": "CAP", "season": "24F", "stock_price": 1000, "gross_sales": 10 },
                    { "subcategory": "CAP", "season": "24S", "stock_price": 200, "gross_sales": 8 },
                    { "subcategory": "BAG", "season": "23S", "stock_price": 200, "gross_sales": 10 },
                    { "subcategory": "SHOE", "season": "21F", "stock_price": 500, "gross_sales": 0 }
                ],
                "previous": [
                    { "subcategory": "CAP", "season": "23S", "stock_price": 100 }
                ]
            }
        }))
        .unwrap(),
    );
    snapshots.store_pl = Some(
        serde_json::from_value::<StorePlDocument>(json!({
            "stores": [
                { "store_code": "HK001", "net_sales": 1000, "net_sales_prev": 800, "rent": 100, "labor_cost": 100, "direct_profit": 50, "yoy": 125 },
                { "store_code": "HK002", "net_sales": 500, "net_sales_prev": 0, "rent": 40, "direct_profit": -30 },
                { "store_code": "MC001", "net_sales": 400, "net_sales_prev": 500, "rent": 60, "direct_profit": -30, "yoy": 80 }
            ]
        }))
        .unwrap(),
    );
    snapshots.store_areas = Some(
        serde_json::from_value(json!({ "store_areas": { "HK001": 100, "MC001": 100 } })).unwrap(),
    );
    snapshots
}

#[test]
fn test_full_report_sections() {
    let report = build_report(&full_snapshots(), &EngineConfig::default());

    let hk = &report.sales[0];
    assert_eq!(hk.unit, BusinessUnit::Hk);
    assert_eq!(hk.discount_rate, dec!(15));
    let total = report.sales.last().unwrap();
    assert!(total.blended);
    assert_eq!(total.net_sales, dec!(1250));

    let costs = report
        .store_cost(PeriodScope::CurrentMonth, BusinessUnit::Total)
        .unwrap();
    assert_eq!(costs.total.current, dec!(300));
    assert_eq!(costs.store_count, 3);

    let stores = report.stores.as_ref().unwrap();
    assert_eq!(stores.classified_count(), 2);
    assert_eq!(stores.unclassified.len(), 1);
    assert_eq!(
        stores.bucket(StoreCategory::ProfitImproving).map(|b| b.count),
        Some(1)
    );

    let hk_same = report
        .same_store
        .iter()
        .find(|s| s.unit == BusinessUnit::Hk)
        .unwrap();
    assert_eq!(hk_same.included.len(), 1);
    assert_eq!(hk_same.yoy, Yoy::Ratio(dec!(125)));

    let efficiency = report.efficiency.as_ref().unwrap();
    assert_eq!(efficiency.stores.len(), 1);
    assert_eq!(efficiency.total_area, dec!(100));
    assert_eq!(efficiency.daily_sales_per_area, dec!(1000));
    assert_eq!(efficiency.prev_area, dec!(200));
    assert_eq!(efficiency.prev_area_estimate, PrevAreaEstimate::ScaledByStoreCount);
    let reasons: Vec<ExclusionReason> = efficiency.excluded.iter().map(|e| e.reason).collect();
    assert_eq!(
        reasons,
        vec![
            ExclusionReason::CountedElsewhere,
            ExclusionReason::NotOffline,
            ExclusionReason::ClosedLowSales,
            ExclusionReason::NoSales,
        ]
    );

    let weeks = report.stock_weeks.as_ref().unwrap();
    assert_eq!(weeks.current_weeks, dec!(7));
    assert_eq!(weeks.previous_weeks, dec!(10));
    assert_eq!(weeks.weeks_change, dec!(-3));

    let aging = report.aging.as_ref().unwrap();
    let stock: Vec<Decimal> = aging.cohorts.iter().map(|c| c.current_stock).collect();
    assert_eq!(stock, vec![dec!(200), dec!(200), dec!(500)]);
    assert_eq!(aging.cohorts[0].yoy, Yoy::Ratio(dec!(200)));

    let counts: Vec<usize> = report.stagnant.iter().map(|g| g.count).collect();
    assert_eq!(counts, vec![1, 0, 1]);
    assert_eq!(report.stagnant[2].candidates[0].stock_days, None);
}

#[test]
fn test_report_is_deterministic_and_renders() {
    let snapshots = full_snapshots();
    let config = EngineConfig::default();
    let first = build_report(&snapshots, &config);
    let second = build_report(&snapshots, &config);
    assert_eq!(first, second);

    let text = ReportFormatter::format(&first);
    assert!(text.contains("Offline Store Efficiency"));
    assert!(text.contains("Stagnant 3+ years"));
    assert!(text.contains("Same-Store Sales"));
}
