//! Rate reconciliation: ratios, weighted blends, YoY and reconstruction of
//! previous-year values.
//!
//! Every division here is guarded. A non-positive denominator yields zero for
//! rates, and YoY keeps "new" and "undefined" apart from a numeric ratio.

use retail_kpi_core::snapshot::{FinancialRecord, PlLine, PlUnitBlock};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// `num / den * 100`, `None` on division overflow or a zero denominator.
fn pct(num: Decimal, den: Decimal) -> Option<Decimal> {
    num.checked_div(den)?.checked_mul(HUNDRED)
}

/// `Σ(value·weight) / Σweight`, `None` on overflow or a non-positive total weight.
pub(crate) fn checked_weighted_mean<I>(pairs: I) -> Option<Decimal>
where
    I: IntoIterator<Item = (Decimal, Decimal)>,
{
    let (weighted, total_weight) = pairs
        .into_iter()
        .try_fold((Decimal::ZERO, Decimal::ZERO), |(sum, weights), (value, weight)| {
            Some((
                sum.checked_add(value.checked_mul(weight)?)?,
                weights.checked_add(weight)?,
            ))
        })?;
    if total_weight <= Decimal::ZERO {
        return None;
    }
    weighted.checked_div(total_weight)
}

/// Percentage `numerator / denominator * 100`, or zero unless `denominator > 0`.
///
/// # Examples
/// ```
/// use retail_kpi_metrics::rates::rate;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(rate(dec!(150), dec!(1000)), dec!(15));
/// assert_eq!(rate(dec!(150), dec!(0)), dec!(0));
/// ```
#[must_use]
pub fn rate(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator > Decimal::ZERO {
        pct(numerator, denominator).unwrap_or(Decimal::ZERO)
    } else {
        Decimal::ZERO
    }
}

/// Estimates a previous-period value from the current value and a YoY ratio.
///
/// `current / yoy * 100` when `yoy > 0`, otherwise zero. This is the inverse
/// of a YoY that was itself rounded upstream, so it is an approximation.
#[must_use]
pub fn reconstruct_previous(current: Decimal, yoy_percent: Decimal) -> Decimal {
    if yoy_percent > Decimal::ZERO {
        current
            .checked_div(yoy_percent)
            .and_then(|v| v.checked_mul(HUNDRED))
            .unwrap_or(Decimal::ZERO)
    } else {
        Decimal::ZERO
    }
}

/// A rate with the weight it carries in a blend (usually net sales).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedRate {
    pub rate: Decimal,
    pub weight: Decimal,
}

impl WeightedRate {
    #[must_use]
    pub const fn new(rate: Decimal, weight: Decimal) -> Self {
        Self { rate, weight }
    }
}

/// `Σ(rate·weight) / Σweight`, zero when the total weight is not positive or
/// the products overflow.
///
/// HK and MC rates are combined this way, weighted by each unit's net sales.
#[must_use]
pub fn weighted_average_rate(units: &[WeightedRate]) -> Decimal {
    checked_weighted_mean(units.iter().map(|u| (u.rate, u.weight))).unwrap_or(Decimal::ZERO)
}

/// Discount rate: the reported value when present, otherwise
/// `(tag_sales - net_sales) / tag_sales * 100` guarded by `tag_sales > 0`.
#[must_use]
pub fn discount_rate(tag_sales: Decimal, net_sales: Decimal, reported: Option<Decimal>) -> Decimal {
    reported.unwrap_or_else(|| rate(tag_sales - net_sales, tag_sales))
}

/// Percentage-point change between two rates.
#[must_use]
pub fn ratio_change(current_ratio: Decimal, previous_ratio: Decimal) -> Decimal {
    current_ratio - previous_ratio
}

/// Year-over-year comparison result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Yoy {
    /// `current / previous * 100`.
    Ratio(Decimal),
    /// Previous is zero, current is not.
    New,
    /// Both sides are zero; nothing to show.
    Undefined,
}

impl Yoy {
    /// Compares `current` with `previous`.
    ///
    /// # Examples
    /// ```
    /// use retail_kpi_metrics::rates::Yoy;
    /// use rust_decimal_macros::dec;
    ///
    /// assert_eq!(Yoy::between(dec!(120), dec!(100)), Yoy::Ratio(dec!(120)));
    /// assert_eq!(Yoy::between(dec!(5), dec!(0)), Yoy::New);
    /// assert_eq!(Yoy::between(dec!(0), dec!(0)), Yoy::Undefined);
    /// ```
    #[must_use]
    pub fn between(current: Decimal, previous: Decimal) -> Self {
        if previous.is_zero() {
            if current.is_zero() {
                Self::Undefined
            } else {
                Self::New
            }
        } else {
            pct(current, previous).map_or(Self::Undefined, Self::Ratio)
        }
    }

    /// The numeric ratio, if there is one.
    #[must_use]
    pub const fn ratio(&self) -> Option<Decimal> {
        match self {
            Self::Ratio(r) => Some(*r),
            _ => None,
        }
    }
}

/// Where a previous-year figure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviousSource {
    /// The snapshot carried the previous absolute value.
    Reported,
    /// Estimated from the current value and a reported YoY ratio.
    Reconstructed,
    /// Neither was available; treated as zero.
    Missing,
}

/// Resolves a previous-year value: reported wins, then reconstruction from a
/// positive YoY, otherwise zero marked [`PreviousSource::Missing`].
#[must_use]
pub fn resolve_previous(
    current: Decimal,
    reported_previous: Option<Decimal>,
    reported_yoy: Option<Decimal>,
) -> (Decimal, PreviousSource) {
    match (reported_previous, reported_yoy) {
        (Some(previous), _) => (previous, PreviousSource::Reported),
        (None, Some(yoy)) if yoy > Decimal::ZERO => {
            (reconstruct_previous(current, yoy), PreviousSource::Reconstructed)
        }
        _ => (Decimal::ZERO, PreviousSource::Missing),
    }
}

/// The five headline P&L rates of a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRates {
    pub discount_rate: Decimal,
    pub cogs_rate: Decimal,
    pub gross_profit_rate: Decimal,
    pub direct_profit_rate: Decimal,
    pub operating_profit_rate: Decimal,
}

impl ResolvedRates {
    /// Uses each reported rate when present, otherwise derives it from its
    /// absolute pair. Cost and profit rates are over net sales.
    #[must_use]
    pub fn of(record: &FinancialRecord) -> Self {
        let net = record.net_sales;
        Self {
            discount_rate: discount_rate(record.tag_sales, net, record.discount_rate),
            cogs_rate: record.cogs_rate.unwrap_or_else(|| rate(record.cogs, net)),
            gross_profit_rate: record
                .gross_profit_rate
                .unwrap_or_else(|| rate(record.gross_profit, net)),
            direct_profit_rate: record
                .direct_profit_rate
                .unwrap_or_else(|| rate(record.direct_profit, net)),
            operating_profit_rate: record
                .operating_profit_rate
                .unwrap_or_else(|| rate(record.operating_profit, net)),
        }
    }

    /// Blends several units' rates, each weighted by its net sales.
    #[must_use]
    pub fn blend(units: &[(ResolvedRates, Decimal)]) -> Self {
        let blend_field = |pick: fn(&ResolvedRates) -> Decimal| {
            let weighted: Vec<WeightedRate> = units
                .iter()
                .map(|(rates, net_sales)| WeightedRate::new(pick(rates), *net_sales))
                .collect();
            weighted_average_rate(&weighted)
        };
        Self {
            discount_rate: blend_field(|r| r.discount_rate),
            cogs_rate: blend_field(|r| r.cogs_rate),
            gross_profit_rate: blend_field(|r| r.gross_profit_rate),
            direct_profit_rate: blend_field(|r| r.direct_profit_rate),
            operating_profit_rate: blend_field(|r| r.operating_profit_rate),
        }
    }

    /// Percentage-point deltas `self - previous`.
    #[must_use]
    pub fn change_from(&self, previous: &ResolvedRates) -> Self {
        Self {
            discount_rate: ratio_change(self.discount_rate, previous.discount_rate),
            cogs_rate: ratio_change(self.cogs_rate, previous.cogs_rate),
            gross_profit_rate: ratio_change(self.gross_profit_rate, previous.gross_profit_rate),
            direct_profit_rate: ratio_change(self.direct_profit_rate, previous.direct_profit_rate),
            operating_profit_rate: ratio_change(
                self.operating_profit_rate,
                previous.operating_profit_rate,
            ),
        }
    }
}

/// Previous-year record of a unit block with the provenance of every line.
#[must_use]
pub fn previous_record(block: &PlUnitBlock) -> (FinancialRecord, Vec<(PlLine, PreviousSource)>) {
    let current = block.current();
    let mut previous = FinancialRecord::default();
    let mut sources = Vec::with_capacity(PlLine::ALL.len());
    for line in PlLine::ALL {
        let (value, source) = resolve_previous(
            current.get(line),
            block.reported_previous(line),
            block.reported_yoy(line),
        );
        previous.set(line, value);
        sources.push((line, source));
    }
    (previous, sources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    // ============================================
    // rate Tests
    // ============================================

    #[test]
    fn rate_basic() {
        assert_eq!(rate(dec!(25), dec!(200)), dec!(12.5));
    }

    #[test]
    fn rate_zero_or_negative_denominator_is_zero() {
        assert_eq!(rate(dec!(25), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(rate(dec!(25), dec!(-10)), Decimal::ZERO);
    }

    // ============================================
    // reconstruct_previous Tests
    // ============================================

    #[test]
    fn reconstruct_at_100_is_identity() {
        for x in [dec!(0), dec!(1), dec!(850.25), dec!(-40), dec!(123456789.01)] {
            assert_eq!(reconstruct_previous(x, dec!(100)), x);
        }
    }

    #[test]
    fn reconstruct_with_zero_yoy_is_zero() {
        assert_eq!(reconstruct_previous(dec!(500), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(reconstruct_previous(dec!(500), dec!(-5)), Decimal::ZERO);
    }

    #[test]
    fn reconstruct_inverts_yoy() {
        assert_eq!(reconstruct_previous(dec!(120), dec!(120)), dec!(100));
        assert_eq!(reconstruct_previous(dec!(80), dec!(50)), dec!(160));
    }

    // ============================================
    // weighted_average_rate Tests
    // ============================================

    #[test]
    fn weighted_average_weights_by_sales() {
        let units = [
            WeightedRate::new(dec!(10), dec!(900)),
            WeightedRate::new(dec!(20), dec!(100)),
        ];
        assert_eq!(weighted_average_rate(&units), dec!(11));
    }

    #[test]
    fn weighted_average_is_not_simple_mean() {
        let units = [
            WeightedRate::new(dec!(10), dec!(3)),
            WeightedRate::new(dec!(30), dec!(1)),
        ];
        assert_ne!(weighted_average_rate(&units), dec!(20));
        assert_eq!(weighted_average_rate(&units), dec!(15));
    }

    #[test]
    fn weighted_average_without_weight_is_zero() {
        assert_eq!(weighted_average_rate(&[]), Decimal::ZERO);
        let units = [WeightedRate::new(dec!(10), Decimal::ZERO)];
        assert_eq!(weighted_average_rate(&units), Decimal::ZERO);
    }

    #[test]
    fn weighted_average_overflow_is_zero() {
        let units = [
            WeightedRate::new(dec!(50), Decimal::MAX),
            WeightedRate::new(dec!(10), dec!(1)),
        ];
        assert_eq!(weighted_average_rate(&units), Decimal::ZERO);

        let scientific = retail_kpi_core::snapshot::decimal_from_value(&json!("1e28")).unwrap();
        let units = [WeightedRate::new(dec!(20), scientific)];
        assert_eq!(weighted_average_rate(&units), Decimal::ZERO);
    }

    #[test]
    fn weighted_average_stays_within_rate_bounds() {
        let cases: [&[(Decimal, Decimal)]; 4] = [
            &[(dec!(12.5), dec!(1)), (dec!(40), dec!(7)), (dec!(3), dec!(2))],
            &[(dec!(-5), dec!(10)), (dec!(5), dec!(10))],
            &[(dec!(33.3), dec!(0)), (dec!(66.6), dec!(5)), (dec!(50), dec!(0.5))],
            &[(dec!(18), dec!(123456)), (dec!(18), dec!(7))],
        ];
        for case in cases {
            let units: Vec<WeightedRate> =
                case.iter().map(|(r, w)| WeightedRate::new(*r, *w)).collect();
            let min = case.iter().map(|(r, _)| *r).min().unwrap();
            let max = case.iter().map(|(r, _)| *r).max().unwrap();
            let avg = weighted_average_rate(&units);
            assert!(avg >= min && avg <= max, "avg {avg} outside [{min}, {max}]");
        }
    }

    // ============================================
    // discount_rate Tests
    // ============================================

    #[test]
    fn discount_rate_derived_from_tag_and_net() {
        assert_eq!(discount_rate(dec!(1000), dec!(850), None), dec!(15));
    }

    #[test]
    fn discount_rate_prefers_reported_value() {
        assert_eq!(discount_rate(dec!(1000), dec!(850), Some(dec!(14.9))), dec!(14.9));
    }

    #[test]
    fn discount_rate_without_tag_sales_is_zero() {
        assert_eq!(discount_rate(Decimal::ZERO, dec!(850), None), Decimal::ZERO);
    }

    // ============================================
    // Yoy Tests
    // ============================================

    #[test]
    fn yoy_three_states() {
        assert_eq!(Yoy::between(dec!(90), dec!(100)), Yoy::Ratio(dec!(90)));
        assert_eq!(Yoy::between(dec!(1), Decimal::ZERO), Yoy::New);
        assert_eq!(Yoy::between(Decimal::ZERO, Decimal::ZERO), Yoy::Undefined);
        assert_eq!(Yoy::between(Decimal::ZERO, dec!(10)), Yoy::Ratio(Decimal::ZERO));
    }

    #[test]
    fn yoy_serializes_with_kind_tag() {
        let json = serde_json::to_value(Yoy::New).unwrap();
        assert_eq!(json, json!({ "kind": "new" }));
    }

    // ============================================
    // resolve_previous / ResolvedRates Tests
    // ============================================

    #[test]
    fn resolve_previous_prefers_reported() {
        assert_eq!(
            resolve_previous(dec!(120), Some(dec!(99)), Some(dec!(120))),
            (dec!(99), PreviousSource::Reported)
        );
        assert_eq!(
            resolve_previous(dec!(120), None, Some(dec!(120))),
            (dec!(100), PreviousSource::Reconstructed)
        );
        assert_eq!(
            resolve_previous(dec!(120), None, Some(Decimal::ZERO)),
            (Decimal::ZERO, PreviousSource::Missing)
        );
        assert_eq!(
            resolve_previous(dec!(120), None, None),
            (Decimal::ZERO, PreviousSource::Missing)
        );
    }

    #[test]
    fn resolved_rates_derive_missing_fields() {
        let record = FinancialRecord {
            tag_sales: dec!(1000),
            net_sales: dec!(850),
            cogs: dec!(340),
            gross_profit: dec!(510),
            direct_profit: dec!(85),
            operating_profit: dec!(42.5),
            gross_profit_rate: Some(dec!(59.9)),
            ..FinancialRecord::default()
        };
        let rates = ResolvedRates::of(&record);
        assert_eq!(rates.discount_rate, dec!(15));
        assert_eq!(rates.cogs_rate, dec!(40));
        assert_eq!(rates.gross_profit_rate, dec!(59.9));
        assert_eq!(rates.direct_profit_rate, dec!(10));
        assert_eq!(rates.operating_profit_rate, dec!(5));
    }

    #[test]
    fn blend_weights_each_field_by_net_sales() {
        let hk = ResolvedRates {
            discount_rate: dec!(10),
            ..ResolvedRates::default()
        };
        let mc = ResolvedRates {
            discount_rate: dec!(30),
            ..ResolvedRates::default()
        };
        let blended = ResolvedRates::blend(&[(hk, dec!(750)), (mc, dec!(250))]);
        assert_eq!(blended.discount_rate, dec!(15));
        assert_eq!(blended.cogs_rate, Decimal::ZERO);
    }

    #[test]
    fn previous_record_tracks_sources() {
        let block: PlUnitBlock = serde_json::from_value(json!({
            "net_sales": 1200,
            "net_sales_yoy": 120,
            "tag_sales": 1500,
            "tag_sales_prev": 1300
        }))
        .unwrap();
        let (previous, sources) = previous_record(&block);
        assert_eq!(previous.net_sales, dec!(1000));
        assert_eq!(previous.tag_sales, dec!(1300));
        assert_eq!(previous.cogs, Decimal::ZERO);
        assert!(sources.contains(&(PlLine::NetSales, PreviousSource::Reconstructed)));
        assert!(sources.contains(&(PlLine::TagSales, PreviousSource::Reported)));
        assert!(sources.contains(&(PlLine::Cogs, PreviousSource::Missing)));
    }
}
