//! Country × channel sales mix.

use retail_kpi_core::snapshot::ChannelRow;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::rates::{rate, ratio_change, Yoy};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelShare {
    pub country: String,
    pub channel: String,
    pub net_sales: Decimal,
    pub net_sales_prev: Decimal,
    /// Share of total net sales, percent.
    pub share: Decimal,
    pub share_prev: Decimal,
    /// `share - share_prev`, in percentage points.
    pub share_change: Decimal,
    pub yoy: Yoy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountrySubtotal {
    pub country: String,
    pub net_sales: Decimal,
    pub net_sales_prev: Decimal,
    pub share: Decimal,
    pub yoy: Yoy,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMix {
    pub rows: Vec<ChannelShare>,
    /// In order of first appearance.
    pub countries: Vec<CountrySubtotal>,
    pub net_sales: Decimal,
    pub net_sales_prev: Decimal,
    pub yoy: Option<Yoy>,
}

/// Shares, YoY and country subtotals of the channel rows.
#[must_use]
pub fn channel_mix(rows: &[ChannelRow]) -> ChannelMix {
    if rows.is_empty() {
        return ChannelMix::default();
    }
    let net_sales: Decimal = rows.iter().map(|r| r.net_sales).sum();
    let net_sales_prev: Decimal = rows.iter().map(|r| r.net_sales_prev).sum();

    let shares = rows
        .iter()
        .map(|row| {
            let share = rate(row.net_sales, net_sales);
            let share_prev = rate(row.net_sales_prev, net_sales_prev);
            ChannelShare {
                country: row.country.clone(),
                channel: row.channel.clone(),
                net_sales: row.net_sales,
                net_sales_prev: row.net_sales_prev,
                share,
                share_prev,
                share_change: ratio_change(share, share_prev),
                yoy: Yoy::between(row.net_sales, row.net_sales_prev),
            }
        })
        .collect();

    let mut countries: Vec<CountrySubtotal> = Vec::new();
    for row in rows {
        match countries.iter_mut().find(|c| c.country == row.country) {
            Some(subtotal) => {
                subtotal.net_sales += row.net_sales;
                subtotal.net_sales_prev += row.net_sales_prev;
            }
            None => countries.push(CountrySubtotal {
                country: row.country.clone(),
                net_sales: row.net_sales,
                net_sales_prev: row.net_sales_prev,
                share: Decimal::ZERO,
                yoy: Yoy::Undefined,
            }),
        }
    }
    for subtotal in &mut countries {
        subtotal.share = rate(subtotal.net_sales, net_sales);
        subtotal.yoy = Yoy::between(subtotal.net_sales, subtotal.net_sales_prev);
    }

    ChannelMix {
        rows: shares,
        countries,
        net_sales,
        net_sales_prev,
        yoy: Some(Yoy::between(net_sales, net_sales_prev)),
    }
}
