use retail_kpi_core::snapshot::{OpexRecord, PlDocument, PlScopeBlock, StorePlDocument, StoreRecord};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which slice of the period a figure covers.
///
/// Current-month and cumulative figures share every computation; only the
/// snapshot section they are read from differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodScope {
    CurrentMonth,
    Cumulative,
}

impl PeriodScope {
    pub const ALL: [PeriodScope; 2] = [PeriodScope::CurrentMonth, PeriodScope::Cumulative];

    /// Store rows of this scope in the per-store P&L document.
    #[must_use]
    pub fn stores<'a>(&self, doc: &'a StorePlDocument) -> &'a [StoreRecord] {
        match self {
            Self::CurrentMonth => &doc.stores,
            Self::Cumulative => &doc.cumulative_stores,
        }
    }

    /// Headquarters opex record of this scope.
    #[must_use]
    pub fn opex<'a>(&self, doc: &'a StorePlDocument) -> Option<&'a OpexRecord> {
        match self {
            Self::CurrentMonth => doc.opex.as_ref(),
            Self::Cumulative => doc.cumulative_opex.as_ref(),
        }
    }

    /// P&L block of this scope.
    #[must_use]
    pub fn pl_block<'a>(&self, doc: &'a PlDocument) -> Option<&'a PlScopeBlock> {
        match self {
            Self::CurrentMonth => doc.current_month.as_ref(),
            Self::Cumulative => doc.cumulative.as_ref(),
        }
    }
}

impl fmt::Display for PeriodScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CurrentMonth => "current month",
            Self::Cumulative => "cumulative",
        })
    }
}
