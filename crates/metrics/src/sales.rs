//! Headline sales by business unit, from the dashboard sales summary.

use retail_kpi_core::snapshot::{BusinessUnit, SalesFigures, SalesSummary};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::rates::{discount_rate, ratio_change, weighted_average_rate, WeightedRate, Yoy};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSales {
    pub unit: BusinessUnit,
    pub tag_sales: Decimal,
    pub net_sales: Decimal,
    pub tag_sales_prev: Decimal,
    pub net_sales_prev: Decimal,
    pub discount_rate: Decimal,
    pub discount_rate_prev: Decimal,
    /// In percentage points.
    pub discount_rate_change: Decimal,
    pub yoy: Yoy,
    /// Built from HK + MC rather than read from the document.
    pub blended: bool,
}

impl UnitSales {
    #[must_use]
    pub fn from_figures(unit: BusinessUnit, figures: &SalesFigures) -> Self {
        let rate = discount_rate(figures.tag_sales, figures.net_sales, figures.discount_rate);
        let rate_prev = discount_rate(figures.tag_sales_prev, figures.net_sales_prev, None);
        Self {
            unit,
            tag_sales: figures.tag_sales,
            net_sales: figures.net_sales,
            tag_sales_prev: figures.tag_sales_prev,
            net_sales_prev: figures.net_sales_prev,
            discount_rate: rate,
            discount_rate_prev: rate_prev,
            discount_rate_change: ratio_change(rate, rate_prev),
            yoy: Yoy::between(figures.net_sales, figures.net_sales_prev),
            blended: false,
        }
    }

    /// Sums units; discount rates are blended by each unit's net sales.
    #[must_use]
    pub fn blend(units: &[UnitSales]) -> Self {
        let tag_sales: Decimal = units.iter().map(|u| u.tag_sales).sum();
        let net_sales: Decimal = units.iter().map(|u| u.net_sales).sum();
        let tag_sales_prev: Decimal = units.iter().map(|u| u.tag_sales_prev).sum();
        let net_sales_prev: Decimal = units.iter().map(|u| u.net_sales_prev).sum();
        let rate = weighted_average_rate(
            &units
                .iter()
                .map(|u| WeightedRate::new(u.discount_rate, u.net_sales))
                .collect::<Vec<_>>(),
        );
        let rate_prev = weighted_average_rate(
            &units
                .iter()
                .map(|u| WeightedRate::new(u.discount_rate_prev, u.net_sales_prev))
                .collect::<Vec<_>>(),
        );
        Self {
            unit: BusinessUnit::Total,
            tag_sales,
            net_sales,
            tag_sales_prev,
            net_sales_prev,
            discount_rate: rate,
            discount_rate_prev: rate_prev,
            discount_rate_change: ratio_change(rate, rate_prev),
            yoy: Yoy::between(net_sales, net_sales_prev),
            blended: true,
        }
    }
}

/// HK, MC and Total sales. Total is blended when the summary omits it.
#[must_use]
pub fn unit_sales(summary: &SalesSummary) -> Vec<UnitSales> {
    let mut units: Vec<UnitSales> = [
        (BusinessUnit::Hk, summary.hk.as_ref()),
        (BusinessUnit::Mc, summary.mc.as_ref()),
    ]
    .into_iter()
    .filter_map(|(unit, figures)| figures.map(|f| UnitSales::from_figures(unit, f)))
    .collect();

    let total = match summary.total.as_ref() {
        Some(figures) => Some(UnitSales::from_figures(BusinessUnit::Total, figures)),
        None if !units.is_empty() => Some(UnitSales::blend(&units)),
        None => None,
    };
    units.extend(total);
    units
}
