//! Core types for the HK/MC retail KPI engine.
//!
//! This crate provides:
//! - The `YYMM` period calendar and fashion-season arithmetic
//! - Typed, lenient schemas for the period snapshot documents
//! - Layered configuration (TOML, environment, JSON)
//! - A loader that reads a period's documents from disk

pub mod config;
pub mod config_loader;
pub mod error;
pub mod loader;
pub mod period;
pub mod snapshot;

pub use config::{AppConfig, DataConfig, EngineConfig};
pub use config_loader::ConfigLoader;
pub use error::{PeriodError, SnapshotError};
pub use loader::{PeriodSnapshots, SnapshotLoader};
pub use period::{days_in_month, PeriodCode, Season, SeasonHalf};
