//! Report assembly over one period's snapshots.
//!
//! Each section is computed from whichever documents are present. An absent
//! document leaves its sections empty; nothing here fails.

use retail_kpi_core::snapshot::{BusinessUnit, StoreAreaDocument, StoreCountSummary, StoreRecord};
use retail_kpi_core::{EngineConfig, PeriodCode, PeriodSnapshots, Season};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::channel::{channel_mix, ChannelMix};
use crate::cost_rollup::{analyze_opex, analyze_stores, CostAnalysis};
use crate::efficiency::{store_efficiency, EfficiencyReport, EfficiencyRules};
use crate::inventory::{
    acc_stock_weeks, aging_cohorts, season_sales, stagnant_inventory, AgingCohorts,
    SeasonSalesLine, StagnantGroup, StockWeeksSummary,
};
use crate::pl_summary::{pl_summary, PlSummary};
use crate::sales::{unit_sales, UnitSales};
use crate::same_store::{same_store_set, SameStoreSet};
use crate::scope::PeriodScope;
use crate::store_class::{classify_status_document, classify_stores, StoreClassification};
use crate::trend::{trend_series, TrendSeries};

const UNITS_AND_TOTAL: [BusinessUnit; 3] = [BusinessUnit::Hk, BusinessUnit::Mc, BusinessUnit::Total];

/// Store count movement of one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreCountLine {
    pub unit: String,
    pub current: u32,
    pub previous: u32,
    pub opened: u32,
    pub closed: u32,
    pub net_change: i64,
}

impl StoreCountLine {
    fn new(unit: &str, counts: &StoreCountSummary) -> Self {
        Self {
            unit: unit.to_string(),
            current: counts.current,
            previous: counts.previous,
            opened: counts.opened,
            closed: counts.closed,
            net_change: i64::from(counts.current) - i64::from(counts.previous),
        }
    }
}

/// Every derived KPI of one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardReport {
    pub period: PeriodCode,
    pub previous_period: PeriodCode,
    pub comparison_period: PeriodCode,
    pub current_season: Season,
    pub days_in_month: u32,
    pub sales: Vec<UnitSales>,
    pub channel_mix: ChannelMix,
    pub store_counts: Vec<StoreCountLine>,
    /// One summary per period scope present in the P&L document.
    pub pl: Vec<PlSummary>,
    /// Store cost analysis per scope and unit.
    pub store_costs: Vec<CostAnalysis>,
    /// Headquarters opex analysis per scope.
    pub opex: Vec<CostAnalysis>,
    pub stores: Option<StoreClassification>,
    pub same_store: Vec<SameStoreSet>,
    pub efficiency: Option<EfficiencyReport>,
    pub season_sales: Vec<SeasonSalesLine>,
    pub stock_weeks: Option<StockWeeksSummary>,
    pub aging: Option<AgingCohorts>,
    pub stagnant: Vec<StagnantGroup>,
    pub item_trend: Vec<TrendSeries>,
    pub inventory_trend: Vec<TrendSeries>,
}

impl DashboardReport {
    #[must_use]
    pub fn pl_scope(&self, scope: PeriodScope) -> Option<&PlSummary> {
        self.pl.iter().find(|p| p.scope == scope)
    }

    #[must_use]
    pub fn store_cost(&self, scope: PeriodScope, unit: BusinessUnit) -> Option<&CostAnalysis> {
        self.store_costs
            .iter()
            .find(|c| c.scope == scope && c.unit == unit)
    }
}

/// Net sales of the business for a scope: P&L total, else the store rollup.
fn business_net_sales(pl: &[PlSummary], scope: PeriodScope, store_costs: &[CostAnalysis]) -> (Decimal, Decimal) {
    pl.iter()
        .find(|p| p.scope == scope)
        .and_then(PlSummary::total)
        .map(|t| (t.current.net_sales, t.previous.net_sales))
        .or_else(|| {
            store_costs
                .iter()
                .find(|c| c.scope == scope && c.unit == BusinessUnit::Total)
                .map(|c| (c.net_sales, c.net_sales_prev))
        })
        .unwrap_or((Decimal::ZERO, Decimal::ZERO))
}

/// Runs every engine module over `snapshots`.
#[must_use]
pub fn build_report(snapshots: &PeriodSnapshots, config: &EngineConfig) -> DashboardReport {
    let period = snapshots.period;
    let dashboard = snapshots.dashboard.as_ref();

    let pl: Vec<PlSummary> = snapshots
        .pl
        .as_ref()
        .map(|doc| {
            PeriodScope::ALL
                .into_iter()
                .filter(|scope| scope.pl_block(doc).is_some())
                .map(|scope| pl_summary(doc, scope))
                .collect()
        })
        .unwrap_or_default();

    let (store_costs, opex) = match snapshots.store_pl.as_ref() {
        Some(doc) => {
            let store_costs: Vec<CostAnalysis> = PeriodScope::ALL
                .into_iter()
                .flat_map(|scope| UNITS_AND_TOTAL.into_iter().map(move |unit| (scope, unit)))
                .map(|(scope, unit)| analyze_stores(doc, scope, unit))
                .collect();
            let opex = PeriodScope::ALL
                .into_iter()
                .filter(|scope| scope.opex(doc).is_some())
                .map(|scope| {
                    let (net_sales, net_sales_prev) = business_net_sales(&pl, scope, &store_costs);
                    analyze_opex(doc, scope, net_sales, net_sales_prev)
                })
                .collect();
            (store_costs, opex)
        }
        None => (Vec::new(), Vec::new()),
    };

    let current_stores: &[StoreRecord] = snapshots
        .store_pl
        .as_ref()
        .map(|doc| doc.stores.as_slice())
        .unwrap_or_default();

    let stores = match (snapshots.store_status.as_ref(), snapshots.store_pl.as_ref()) {
        (Some(status), _) => Some(classify_status_document(status, config.ranking_size)),
        (None, Some(_)) => Some(classify_stores(current_stores, config.ranking_size)),
        (None, None) => None,
    };

    let same_store = if current_stores.is_empty() {
        Vec::new()
    } else {
        UNITS_AND_TOTAL
            .into_iter()
            .map(|unit| same_store_set(current_stores, unit))
            .collect()
    };

    let efficiency = dashboard
        .and_then(|d| d.offline_store_efficiency.as_ref())
        .map(|data| {
            let rules = EfficiencyRules::from_config_lenient(config);
            let no_areas = StoreAreaDocument::default();
            let areas = snapshots.store_areas.as_ref().unwrap_or(&no_areas);
            store_efficiency(data, areas, period, &rules)
        });

    let report = DashboardReport {
        period,
        previous_period: period.previous(),
        comparison_period: period.same_month_last_year(),
        current_season: period.current_season(),
        days_in_month: period.days(),
        sales: dashboard
            .and_then(|d| d.sales_summary.as_ref())
            .map(unit_sales)
            .unwrap_or_default(),
        channel_mix: dashboard
            .map(|d| channel_mix(&d.country_channel_summary))
            .unwrap_or_default(),
        store_counts: dashboard
            .map(|d| {
                d.store_summary
                    .iter()
                    .map(|(unit, counts)| StoreCountLine::new(unit, counts))
                    .collect()
            })
            .unwrap_or_default(),
        pl,
        store_costs,
        opex,
        stores,
        same_store,
        efficiency,
        season_sales: dashboard
            .map(|d| season_sales(&d.season_sales, period))
            .unwrap_or_default(),
        stock_weeks: dashboard
            .and_then(|d| d.acc_stock_summary.as_ref())
            .map(acc_stock_weeks),
        aging: dashboard
            .and_then(|d| d.ending_inventory.as_ref())
            .map(|inv| aging_cohorts(inv, period)),
        stagnant: dashboard
            .and_then(|d| d.ending_inventory.as_ref())
            .map(|inv| stagnant_inventory(&inv.current, period, config))
            .unwrap_or_default(),
        item_trend: dashboard
            .map(|d| trend_series(&d.monthly_item_data, &d.monthly_item_yoy))
            .unwrap_or_default(),
        inventory_trend: dashboard
            .map(|d| trend_series(&d.monthly_inventory_data, &d.monthly_inventory_yoy))
            .unwrap_or_default(),
    };

    info!(
        period = %period,
        documents = snapshots.document_count(),
        pl_scopes = report.pl.len(),
        store_cost_views = report.store_costs.len(),
        "Built dashboard report"
    );

    report
}
