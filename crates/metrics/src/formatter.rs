#![allow(clippy::format_push_string)]
#![allow(clippy::uninlined_format_args)]

use retail_kpi_core::snapshot::{BusinessUnit, PlLine};
use rust_decimal::Decimal;

use crate::dashboard::DashboardReport;
use crate::rates::{PreviousSource, Yoy};
use crate::scope::PeriodScope;

const RULE: &str = "═══════════════════════════════════════════════════════════════\n";
const THIN_RULE: &str = "───────────────────────────────────────────────────────────────\n";

/// Renders a YoY for display: a ratio, `NEW`, or `-`.
#[must_use]
pub fn format_yoy(yoy: &Yoy) -> String {
    match yoy {
        Yoy::Ratio(r) => format!("{r:.1}%"),
        Yoy::New => "NEW".to_string(),
        Yoy::Undefined => "-".to_string(),
    }
}

fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp(0).abs().to_string();
    let mut grouped = String::new();
    for (i, ch) in rounded.chars().enumerate() {
        if i > 0 && (rounded.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if amount.round_dp(0).is_sign_negative() && !amount.round_dp(0).is_zero() {
        format!("-{grouped}")
    } else {
        grouped
    }
}

fn section(output: &mut String, title: &str) {
    output.push_str(title);
    output.push('\n');
    output.push_str(THIN_RULE);
}

pub struct ReportFormatter;

impl ReportFormatter {
    #[must_use]
    pub fn format(report: &DashboardReport) -> String {
        let mut output = String::new();

        output.push('\n');
        output.push_str(RULE);
        output.push_str(&format!(
            "              HK/MC RETAIL KPI REPORT  ({})\n",
            report.period
        ));
        output.push_str(RULE);
        output.push('\n');

        section(&mut output, "Period");
        output.push_str(&format!("Period:                {}\n", report.period));
        output.push_str(&format!("Previous Month:        {}\n", report.previous_period));
        output.push_str(&format!("Compared With:         {}\n", report.comparison_period));
        output.push_str(&format!("Current Season:        {}\n", report.current_season));
        output.push_str(&format!("Days In Month:         {}\n", report.days_in_month));
        output.push('\n');

        if !report.sales.is_empty() {
            section(&mut output, "Sales");
            for unit in &report.sales {
                output.push_str(&format!(
                    "{:<6} Net {:>14}  YoY {:>8}  Discount {:>6.1}% ({:+.1}%p)\n",
                    unit.unit.to_string(),
                    format_amount(unit.net_sales),
                    format_yoy(&unit.yoy),
                    unit.discount_rate,
                    unit.discount_rate_change
                ));
            }
            output.push('\n');
        }

        for scope in PeriodScope::ALL {
            let Some(pl) = report.pl_scope(scope) else {
                continue;
            };
            section(&mut output, &format!("P&L ({scope})"));
            for unit in &pl.units {
                let net = unit.line(PlLine::NetSales);
                let dp = unit.line(PlLine::DirectProfit);
                output.push_str(&format!(
                    "{:<6} Net {:>14}  YoY {:>8}  Direct Profit {:>12} ({:.1}%){}\n",
                    unit.unit.to_string(),
                    format_amount(unit.current.net_sales),
                    net.map_or_else(|| "-".to_string(), |m| format_yoy(&m.yoy)),
                    format_amount(unit.current.direct_profit),
                    unit.rates.direct_profit_rate,
                    if unit.blended { "  [blended]" } else { "" }
                ));
                if let Some(dp) = dp {
                    if dp.previous_source == PreviousSource::Reconstructed {
                        output.push_str("       (previous direct profit reconstructed from YoY)\n");
                    }
                }
            }
            if let Some(mom) = &pl.month_over_month {
                output.push_str(&format!(
                    "MoM Net Sales:         {} ({})\n",
                    format_amount(mom.change),
                    format_yoy(&mom.ratio)
                ));
            }
            output.push('\n');
        }

        if let Some(costs) = report.store_cost(PeriodScope::CurrentMonth, BusinessUnit::Total) {
            section(&mut output, "Store Direct Costs (current month)");
            for line in costs.lines.iter().filter(|l| !l.current.is_zero() || !l.previous.is_zero()) {
                output.push_str(&format!(
                    "{:<16} {:>12}  {:>6.1}%  {:+6.1}%p  YoY {:>8}\n",
                    line.key,
                    format_amount(line.current),
                    line.ratio,
                    line.ratio_change,
                    format_yoy(&line.yoy)
                ));
            }
            output.push_str(&format!(
                "{:<16} {:>12}  {:>6.1}%  {:+6.1}%p  YoY {:>8}\n",
                "Total",
                format_amount(costs.total.current),
                costs.total.ratio,
                costs.total.ratio_change,
                format_yoy(&costs.total.yoy)
            ));
            output.push('\n');
        }

        if let Some(stores) = &report.stores {
            section(&mut output, "Store Status");
            for bucket in &stores.buckets {
                output.push_str(&format!(
                    "{:<22} {:>3} stores  DP {:>12}  Avg YoY {:>6.1}%  Rent+Labor {:>5.1}%\n",
                    bucket.category.label(),
                    bucket.count,
                    format_amount(bucket.total_direct_profit),
                    bucket.avg_yoy,
                    bucket.avg_rent_labor_ratio
                ));
            }
            if !stores.unclassified.is_empty() {
                output.push_str(&format!("Unclassified:          {}\n", stores.unclassified.len()));
            }
            if !stores.mismatches.is_empty() {
                output.push_str(&format!(
                    "Bucket Mismatches:     {}\n",
                    stores.mismatches.len()
                ));
            }
            output.push('\n');
        }

        if let Some(total) = report.same_store.iter().find(|s| s.unit == BusinessUnit::Total) {
            section(&mut output, "Same-Store Sales");
            output.push_str(&format!(
                "Stores:                {} included, {} excluded\n",
                total.included.len(),
                total.excluded.len()
            ));
            output.push_str(&format!("Same-Store YoY:        {}\n", format_yoy(&total.yoy)));
            output.push('\n');
        }

        if let Some(eff) = &report.efficiency {
            section(&mut output, "Offline Store Efficiency");
            output.push_str(&format!(
                "Eligible Stores:       {} ({} excluded)\n",
                eff.stores.len(),
                eff.excluded.len()
            ));
            output.push_str(&format!("Total Area:            {}\n", format_amount(eff.total_area)));
            output.push_str(&format!(
                "Daily Sales / Area:    {:.2}  (prev {:.2}, estimated area)\n",
                eff.daily_sales_per_area, eff.prev_daily_sales_per_area
            ));
            output.push_str(&format!("YoY:                   {}\n", format_yoy(&eff.yoy)));
            output.push('\n');
        }

        if report.stock_weeks.is_some() || report.aging.is_some() {
            section(&mut output, "Inventory");
            if let Some(weeks) = &report.stock_weeks {
                output.push_str(&format!(
                    "ACC Stock Weeks:       {:.1} (prev {:.1}, {:+.1})\n",
                    weeks.current_weeks, weeks.previous_weeks, weeks.weeks_change
                ));
            }
            if let Some(aging) = &report.aging {
                for cohort in &aging.cohorts {
                    output.push_str(&format!(
                        "{:<10} stock {:>14}  YoY {:>8}\n",
                        cohort.cohort.to_string(),
                        format_amount(cohort.current_stock),
                        format_yoy(&cohort.yoy)
                    ));
                }
            }
            for group in &report.stagnant {
                output.push_str(&format!(
                    "Stagnant {:<10} {:>3} items  {:>14}\n",
                    group.cohort.to_string(),
                    group.count,
                    format_amount(group.total_stock_price)
                ));
            }
            output.push('\n');
        }

        output.push_str(RULE);
        output
    }
}
