//! P&L KPI summary per period scope and business unit.
//!
//! Previous-year values are resolved line by line (reported, reconstructed
//! from YoY, or missing) and every rate is resolved or derived. When the
//! document carries no `total` block, the total is built from HK + MC with
//! rates blended by net sales.

use retail_kpi_core::snapshot::{BusinessUnit, FinancialRecord, PlDocument, PlLine, PlScopeBlock, PlUnitBlock};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cost_rollup::{analyze_expense_detail, LineItemMetrics};
use crate::rates::{previous_record, PreviousSource, ResolvedRates, Yoy};
use crate::scope::PeriodScope;

/// One P&L line, current vs previous year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlLineMetrics {
    pub line: PlLine,
    pub current: Decimal,
    pub previous: Decimal,
    pub previous_source: PreviousSource,
    pub yoy: Yoy,
}

/// P&L of one business unit for one scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitPl {
    pub unit: BusinessUnit,
    pub current: FinancialRecord,
    pub previous: FinancialRecord,
    pub lines: Vec<PlLineMetrics>,
    pub rates: ResolvedRates,
    pub rates_prev: ResolvedRates,
    /// `rates - rates_prev`, in percentage points.
    pub rate_change: ResolvedRates,
    /// Built from HK + MC rather than read from the document.
    pub blended: bool,
}

impl UnitPl {
    fn from_parts(
        unit: BusinessUnit,
        current: FinancialRecord,
        previous: FinancialRecord,
        sources: &[(PlLine, PreviousSource)],
        rates: ResolvedRates,
        rates_prev: ResolvedRates,
        blended: bool,
    ) -> Self {
        let lines = PlLine::ALL
            .into_iter()
            .map(|line| {
                let previous_source = sources
                    .iter()
                    .find(|(l, _)| *l == line)
                    .map_or(PreviousSource::Missing, |(_, s)| *s);
                PlLineMetrics {
                    line,
                    current: current.get(line),
                    previous: previous.get(line),
                    previous_source,
                    yoy: Yoy::between(current.get(line), previous.get(line)),
                }
            })
            .collect();
        Self {
            unit,
            rate_change: rates.change_from(&rates_prev),
            current,
            previous,
            lines,
            rates,
            rates_prev,
            blended,
        }
    }

    /// Unit as reported in its block.
    #[must_use]
    pub fn from_block(unit: BusinessUnit, block: &PlUnitBlock) -> Self {
        let current = block.current();
        let (previous, sources) = previous_record(block);
        let rates = ResolvedRates::of(&current);
        let rates_prev = ResolvedRates::of(&previous);
        Self::from_parts(unit, current, previous, &sources, rates, rates_prev, false)
    }

    /// Total built from unit results: amounts summed, rates blended by net sales.
    #[must_use]
    pub fn blend(units: &[&UnitPl]) -> Self {
        let mut current = FinancialRecord::default();
        let mut previous = FinancialRecord::default();
        let mut sources = Vec::with_capacity(PlLine::ALL.len());
        for line in PlLine::ALL {
            current.set(line, units.iter().map(|u| u.current.get(line)).sum());
            previous.set(line, units.iter().map(|u| u.previous.get(line)).sum());
            let unit_sources = units.iter().filter_map(|u| u.line(line).map(|m| m.previous_source));
            sources.push((line, combine_sources(unit_sources)));
        }
        let rates = ResolvedRates::blend(
            &units.iter().map(|u| (u.rates, u.current.net_sales)).collect::<Vec<_>>(),
        );
        let rates_prev = ResolvedRates::blend(
            &units.iter().map(|u| (u.rates_prev, u.previous.net_sales)).collect::<Vec<_>>(),
        );
        Self::from_parts(BusinessUnit::Total, current, previous, &sources, rates, rates_prev, true)
    }

    #[must_use]
    pub fn line(&self, line: PlLine) -> Option<&PlLineMetrics> {
        self.lines.iter().find(|m| m.line == line)
    }
}

/// Weakest provenance among the parts of a summed value.
fn combine_sources(sources: impl Iterator<Item = PreviousSource>) -> PreviousSource {
    let mut any = false;
    let mut all_missing = true;
    let mut any_reconstructed = false;
    for source in sources {
        any = true;
        match source {
            PreviousSource::Reported => all_missing = false,
            PreviousSource::Reconstructed => {
                all_missing = false;
                any_reconstructed = true;
            }
            PreviousSource::Missing => {}
        }
    }
    if !any || all_missing {
        PreviousSource::Missing
    } else if any_reconstructed {
        PreviousSource::Reconstructed
    } else {
        PreviousSource::Reported
    }
}

/// Net sales against the previous month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthOverMonth {
    pub net_sales: Decimal,
    pub prev_month_net_sales: Decimal,
    pub change: Decimal,
    /// `net_sales / prev_month_net_sales * 100`.
    pub ratio: Yoy,
}

/// P&L summary of one scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlSummary {
    pub scope: PeriodScope,
    /// HK, MC and Total, for whichever are available.
    pub units: Vec<UnitPl>,
    pub expense_detail: Vec<LineItemMetrics>,
    /// Present for the current-month scope when a previous-month block exists.
    pub month_over_month: Option<MonthOverMonth>,
}

impl PlSummary {
    #[must_use]
    pub fn unit(&self, unit: BusinessUnit) -> Option<&UnitPl> {
        self.units.iter().find(|u| u.unit == unit)
    }

    #[must_use]
    pub fn total(&self) -> Option<&UnitPl> {
        self.unit(BusinessUnit::Total)
    }
}

/// HK, MC and Total of a scope block; Total is blended when not reported.
#[must_use]
pub fn scope_units(block: &PlScopeBlock) -> Vec<UnitPl> {
    let mut units: Vec<UnitPl> = BusinessUnit::UNITS
        .into_iter()
        .filter_map(|unit| block.unit(unit).map(|b| UnitPl::from_block(unit, b)))
        .collect();

    let total = match block.total.as_ref() {
        Some(b) => Some(UnitPl::from_block(BusinessUnit::Total, b)),
        None if !units.is_empty() => {
            debug!("P&L total block absent, blending HK and MC");
            Some(UnitPl::blend(&units.iter().collect::<Vec<_>>()))
        }
        None => None,
    };
    units.extend(total);
    units
}

/// Builds the P&L summary of `scope`. An absent scope block yields no units.
#[must_use]
pub fn pl_summary(doc: &PlDocument, scope: PeriodScope) -> PlSummary {
    let Some(block) = scope.pl_block(doc) else {
        return PlSummary {
            scope,
            units: Vec::new(),
            expense_detail: Vec::new(),
            month_over_month: None,
        };
    };

    let units = scope_units(block);
    let (net_sales, net_sales_prev) = units
        .iter()
        .find(|u| u.unit == BusinessUnit::Total)
        .map_or((Decimal::ZERO, Decimal::ZERO), |t| {
            (t.current.net_sales, t.previous.net_sales)
        });

    let expense_detail = block
        .expense_detail
        .as_ref()
        .map(|detail| analyze_expense_detail(detail, net_sales, net_sales_prev))
        .unwrap_or_default();

    let month_over_month = match (scope, doc.prev_month.as_ref()) {
        (PeriodScope::CurrentMonth, Some(prev_block)) => {
            let prev_net_sales = scope_units(prev_block)
                .into_iter()
                .find(|u| u.unit == BusinessUnit::Total)
                .map_or(Decimal::ZERO, |t| t.current.net_sales);
            Some(MonthOverMonth {
                net_sales,
                prev_month_net_sales: prev_net_sales,
                change: net_sales - prev_net_sales,
                ratio: Yoy::between(net_sales, prev_net_sales),
            })
        }
        _ => None,
    };

    PlSummary {
        scope,
        units,
        expense_detail,
        month_over_month,
    }
}
