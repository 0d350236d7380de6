//! Reads a period's snapshot documents from a directory.
//!
//! Each document is optional: a missing file leaves its slot `None` and the
//! engine renders the matching sections empty. A file that exists but does not
//! parse is an error, so broken exports are not silently shown as zeros.

use serde::de::DeserializeOwned;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::DataConfig;
use crate::error::SnapshotError;
use crate::period::PeriodCode;
use crate::snapshot::{
    DashboardData, PlDocument, StoreAreaDocument, StorePlDocument, StoreStatusDocument,
};

/// All documents available for one reporting period.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodSnapshots {
    pub period: PeriodCode,
    pub dashboard: Option<DashboardData>,
    pub pl: Option<PlDocument>,
    pub store_pl: Option<StorePlDocument>,
    pub store_status: Option<StoreStatusDocument>,
    pub store_areas: Option<StoreAreaDocument>,
}

impl PeriodSnapshots {
    /// A period with no documents loaded.
    #[must_use]
    pub const fn empty(period: PeriodCode) -> Self {
        Self {
            period,
            dashboard: None,
            pl: None,
            store_pl: None,
            store_status: None,
            store_areas: None,
        }
    }

    /// Number of documents present.
    #[must_use]
    pub fn document_count(&self) -> usize {
        [
            self.dashboard.is_some(),
            self.pl.is_some(),
            self.store_pl.is_some(),
            self.store_status.is_some(),
            self.store_areas.is_some(),
        ]
        .into_iter()
        .filter(|present| *present)
        .count()
    }
}

pub struct SnapshotLoader {
    config: DataConfig,
}

impl SnapshotLoader {
    #[must_use]
    pub const fn new(config: DataConfig) -> Self {
        Self { config }
    }

    /// Resolves a file-name template for a period.
    #[must_use]
    pub fn path_for(&self, template: &str, period: PeriodCode) -> PathBuf {
        Path::new(&self.config.data_dir).join(template.replace("{period}", &period.to_string()))
    }

    /// Loads every document of `period` that exists on disk.
    ///
    /// # Errors
    /// Returns an error if a present document cannot be read or parsed.
    pub fn load(&self, period: PeriodCode) -> Result<PeriodSnapshots, SnapshotError> {
        let snapshots = PeriodSnapshots {
            period,
            dashboard: read_optional(&self.path_for(&self.config.dashboard_file, period))?,
            pl: read_optional(&self.path_for(&self.config.pl_file, period))?,
            store_pl: read_optional(&self.path_for(&self.config.store_pl_file, period))?,
            store_status: read_optional(&self.path_for(&self.config.store_status_file, period))?,
            store_areas: read_optional(&self.path_for(&self.config.store_areas_file, period))?,
        };

        info!(
            period = %period,
            documents = snapshots.document_count(),
            "Loaded period snapshots"
        );

        Ok(snapshots)
    }

}

fn read_optional<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, SnapshotError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "Snapshot document not present");
            return Ok(None);
        }
        Err(source) => {
            return Err(SnapshotError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_str(&text)
        .map(Some)
        .map_err(|source| SnapshotError::Json {
            path: path.to_path_buf(),
            source,
        })
}
