//! Period calendar.
//!
//! Reporting periods are keyed by a 4-digit `YYMM` code (e.g. `"2501"` for
//! January 2025). Fashion seasons are keyed by `YY` plus a half-year letter
//! (`"25S"` for spring/summer 2025, `"24F"` for fall/winter 2024).

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PeriodError;

/// A monthly reporting period parsed from a `YYMM` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PeriodCode {
    year: i32,
    month: u32,
}

impl PeriodCode {
    /// Creates a period from a full year and a month.
    ///
    /// # Errors
    /// Returns an error if the month is outside 1..=12 or the year is outside 2000..=2099.
    pub fn new(year: i32, month: u32) -> Result<Self, PeriodError> {
        if !(1..=12).contains(&month) {
            return Err(PeriodError::MonthOutOfRange(month));
        }
        if !(2000..=2099).contains(&year) {
            return Err(PeriodError::YearOutOfRange(year));
        }
        Ok(Self { year, month })
    }

    /// Full year (`2000 + YY`).
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// Month in 1..=12.
    #[must_use]
    pub const fn month(&self) -> u32 {
        self.month
    }

    /// The period immediately before this one. January rolls back to December
    /// of the previous year.
    ///
    /// # Examples
    /// ```
    /// use retail_kpi_core::period::PeriodCode;
    ///
    /// let p: PeriodCode = "2501".parse().unwrap();
    /// assert_eq!(p.previous().to_string(), "2412");
    /// ```
    #[must_use]
    pub const fn previous(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// The same month one year earlier (the YoY comparison period).
    #[must_use]
    pub const fn same_month_last_year(&self) -> Self {
        Self {
            year: self.year - 1,
            month: self.month,
        }
    }

    /// Number of calendar days in this period's month.
    #[must_use]
    pub fn days(&self) -> u32 {
        days_in_month(self.year, self.month)
    }

    /// The fashion season that is "in season" during this period.
    ///
    /// March to August sells the spring/summer line of the same year,
    /// September to December the fall/winter line, and January/February
    /// still belong to the previous year's fall/winter line.
    #[must_use]
    pub const fn current_season(&self) -> Season {
        match self.month {
            3..=8 => Season {
                year: self.year,
                half: SeasonHalf::SpringSummer,
            },
            9..=12 => Season {
                year: self.year,
                half: SeasonHalf::FallWinter,
            },
            _ => Season {
                year: self.year - 1,
                half: SeasonHalf::FallWinter,
            },
        }
    }
}

impl fmt::Display for PeriodCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}{:02}", self.year - 2000, self.month)
    }
}

impl FromStr for PeriodCode {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != 4 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PeriodError::Malformed(s.to_string()));
        }
        let yy: i32 = s[..2]
            .parse()
            .map_err(|_| PeriodError::Malformed(s.to_string()))?;
        let mm: u32 = s[2..]
            .parse()
            .map_err(|_| PeriodError::Malformed(s.to_string()))?;
        Self::new(2000 + yy, mm)
    }
}

impl TryFrom<String> for PeriodCode {
    type Error = PeriodError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PeriodCode> for String {
    fn from(value: PeriodCode) -> Self {
        value.to_string()
    }
}

/// Number of days in a calendar month.
///
/// Out-of-range months fall back to 30 so callers dividing by the result never
/// divide by zero.
#[must_use]
pub fn days_in_month(year: i32, month: u32) -> u32 {
    if !(1..=12).contains(&month) {
        return 30;
    }
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    next.and_then(|d| d.pred_opt()).map_or(30, |last| last.day())
}

/// Half-year of a fashion season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SeasonHalf {
    SpringSummer,
    FallWinter,
}

/// A fashion season such as `25S` or `24F`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Season {
    pub year: i32,
    pub half: SeasonHalf,
}

impl Season {
    /// Parses season codes of the form `YYS` / `YYF` (a trailing `S`/`W` after
    /// the half letter, as in `25SS` or `24FW`, is accepted).
    ///
    /// Returns `None` for carry-over or otherwise non-seasonal codes.
    #[must_use]
    pub fn parse(code: &str) -> Option<Self> {
        let code = code.trim().to_ascii_uppercase();
        if code.len() < 3 {
            return None;
        }
        let (yy, rest) = code.split_at(2);
        if !yy.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let year = 2000 + yy.parse::<i32>().ok()?;
        let half = match rest {
            "S" | "SS" => SeasonHalf::SpringSummer,
            "F" | "FW" => SeasonHalf::FallWinter,
            _ => return None,
        };
        Some(Self { year, half })
    }

    /// Sequential half-year index; consecutive seasons differ by one.
    #[must_use]
    pub const fn ordinal(&self) -> i32 {
        let half = match self.half {
            SeasonHalf::SpringSummer => 0,
            SeasonHalf::FallWinter => 1,
        };
        self.year * 2 + half
    }

    /// Number of half-year seasons between `self` and an older `other`.
    /// Zero or negative means `other` is not older than `self`.
    #[must_use]
    pub const fn seasons_since(&self, other: &Season) -> i32 {
        self.ordinal() - other.ordinal()
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self.half {
            SeasonHalf::SpringSummer => 'S',
            SeasonHalf::FallWinter => 'F',
        };
        write!(f, "{:02}{}", self.year - 2000, letter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> PeriodCode {
        s.parse().unwrap()
    }

    // ============================================
    // PeriodCode Tests
    // ============================================

    #[test]
    fn parses_year_and_month() {
        let period = p("2503");
        assert_eq!(period.year(), 2025);
        assert_eq!(period.month(), 3);
    }

    #[test]
    fn previous_rolls_back_year_in_january() {
        assert_eq!(p("2501").previous().to_string(), "2412");
    }

    #[test]
    fn previous_within_year() {
        assert_eq!(p("2503").previous().to_string(), "2502");
        assert_eq!(p("2510").previous().to_string(), "2509");
    }

    #[test]
    fn same_month_last_year_keeps_month() {
        assert_eq!(p("2506").same_month_last_year().to_string(), "2406");
    }

    #[test]
    fn display_is_zero_padded() {
        assert_eq!(PeriodCode::new(2003, 7).unwrap().to_string(), "0307");
    }

    #[test]
    fn rejects_malformed_codes() {
        assert!("251".parse::<PeriodCode>().is_err());
        assert!("25a1".parse::<PeriodCode>().is_err());
        assert!("2513".parse::<PeriodCode>().is_err());
        assert!("2500".parse::<PeriodCode>().is_err());
    }

    #[test]
    fn serde_uses_string_form() {
        let json = serde_json::to_string(&p("2412")).unwrap();
        assert_eq!(json, "\"2412\"");
        let back: PeriodCode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p("2412"));
    }

    #[test]
    fn periods_order_chronologically() {
        assert!(p("2412") < p("2501"));
        assert!(p("2501") < p("2502"));
    }

    // ============================================
    // days_in_month Tests
    // ============================================

    #[test]
    fn days_in_month_handles_leap_years() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2025, 2), 28);
        assert_eq!(days_in_month(2000, 2), 29);
    }

    #[test]
    fn days_in_month_regular_months() {
        assert_eq!(days_in_month(2025, 1), 31);
        assert_eq!(days_in_month(2025, 4), 30);
        assert_eq!(days_in_month(2025, 12), 31);
    }

    #[test]
    fn days_in_month_invalid_month_falls_back() {
        assert_eq!(days_in_month(2025, 13), 30);
    }

    // ============================================
    // Season Tests
    // ============================================

    #[test]
    fn current_season_by_month() {
        assert_eq!(p("2503").current_season().to_string(), "25S");
        assert_eq!(p("2508").current_season().to_string(), "25S");
        assert_eq!(p("2509").current_season().to_string(), "25F");
        assert_eq!(p("2501").current_season().to_string(), "24F");
    }

    #[test]
    fn season_parse_variants() {
        assert_eq!(Season::parse("25S").unwrap().to_string(), "25S");
        assert_eq!(Season::parse("24fw").unwrap().to_string(), "24F");
        assert!(Season::parse("N").is_none());
        assert!(Season::parse("CARRY").is_none());
    }

    #[test]
    fn seasons_since_counts_half_years() {
        let current = Season::parse("25F").unwrap();
        assert_eq!(current.seasons_since(&Season::parse("25S").unwrap()), 1);
        assert_eq!(current.seasons_since(&Season::parse("24F").unwrap()), 2);
        assert_eq!(current.seasons_since(&Season::parse("23S").unwrap()), 5);
        assert_eq!(current.seasons_since(&current), 0);
    }
}
