//! Rate table loading functionality.
//!
//! This module provides the [`RateTableLoader`] type for loading the
//! supplementary benefit rate table from YAML or JSON files.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use rust_decimal::Decimal;
use tracing::info;

use crate::error::{EngineError, EngineResult};
use crate::models::Month;

use super::provider::RateTableProvider;
use super::types::{RateCategory, RateEntry, RateTable, RateTableMetadata, RateThreshold};

/// Loads and provides access to the rate table.
///
/// # Directory Structure
///
/// ```text
/// config/satser/
/// ├── table.yaml        # Table metadata
/// └── rates/
///     ├── 2020-05.yaml  # Rates effective from this month
///     └── 2021-05.json  # JSON is accepted as well
/// ```
///
/// # Example
///
/// ```no_run
/// use fradrag_engine::config::{RateTableLoader, RateTableProvider};
/// use fradrag_engine::models::Month;
///
/// let loader = RateTableLoader::load("./config/satser")?;
/// let rate = loader.ordinary_rate_over_67(Month::new(2021, 6)?)?;
/// println!("Monthly rate: {}", rate.monthly_rate_as_decimal());
/// # Ok::<(), fradrag_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct RateTableLoader {
    table: RateTable,
}

impl RateTableLoader {
    /// Loads the rate table from the specified directory.
    ///
    /// Fails if `table.yaml` or the `rates` directory is missing, if any file
    /// cannot be parsed, if two entries share an effective month, or if an
    /// entry holds a non-positive amount.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let metadata = Self::load_file::<RateTableMetadata>(&path.join("table.yaml"))?;
        let entries = Self::load_entries(&path.join("rates"))?;

        info!(
            name = %metadata.name,
            version = %metadata.version,
            entries = entries.len(),
            "Rate table loaded"
        );

        Ok(Self {
            table: RateTable::new(metadata, entries),
        })
    }

    /// Parses a YAML or JSON file, chosen by extension.
    fn load_file<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content).map_err(|e| EngineError::ConfigParseError {
                path: path_str,
                message: e.to_string(),
            })
        } else {
            serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
                path: path_str,
                message: e.to_string(),
            })
        }
    }

    /// Loads all entry files from the rates directory.
    fn load_entries(rates_dir: &Path) -> EngineResult<Vec<RateEntry>> {
        let rates_dir_str = rates_dir.display().to_string();

        let dir_entries = fs::read_dir(rates_dir).map_err(|_| EngineError::ConfigNotFound {
            path: rates_dir_str.clone(),
        })?;

        let mut entries = Vec::new();
        let mut seen = BTreeSet::new();

        for dir_entry in dir_entries {
            let dir_entry = dir_entry.map_err(|_| EngineError::ConfigNotFound {
                path: rates_dir_str.clone(),
            })?;

            let path = dir_entry.path();
            if !path
                .extension()
                .is_some_and(|ext| ext == "yaml" || ext == "yml" || ext == "json")
            {
                continue;
            }

            let entry = Self::load_file::<RateEntry>(&path)?;
            Self::validate_entry(&entry).map_err(|message| EngineError::ConfigParseError {
                path: path.display().to_string(),
                message,
            })?;
            if !seen.insert(entry.effective_from) {
                return Err(EngineError::ConfigParseError {
                    path: path.display().to_string(),
                    message: format!(
                        "duplicate rate entry effective from {}",
                        entry.effective_from
                    ),
                });
            }
            entries.push(entry);
        }

        if entries.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no rate files found)", rates_dir_str),
            });
        }

        Ok(entries)
    }

    fn validate_entry(entry: &RateEntry) -> Result<(), String> {
        let amounts = [
            ("base_amount", entry.base_amount),
            ("guarantee_pension.ordinary", entry.guarantee_pension.ordinary),
            ("guarantee_pension.high", entry.guarantee_pension.high),
            ("disability_factor.ordinary", entry.disability_factor.ordinary),
            ("disability_factor.high", entry.disability_factor.high),
        ];
        match amounts.iter().find(|(_, value)| *value <= Decimal::ZERO) {
            Some((field, value)) => Err(format!("{} must be positive, got {}", field, value)),
            None => Ok(()),
        }
    }

    /// Returns the loaded rate table.
    pub fn table(&self) -> &RateTable {
        &self.table
    }

    /// Consumes the loader, returning the rate table.
    pub fn into_table(self) -> RateTable {
        self.table
    }

    /// Returns the table metadata.
    pub fn metadata(&self) -> &RateTableMetadata {
        self.table.metadata()
    }
}

impl RateTableProvider for RateTableLoader {
    fn rate(&self, month: Month, category: RateCategory) -> EngineResult<RateThreshold> {
        self.table.rate(month, category)
    }
}
