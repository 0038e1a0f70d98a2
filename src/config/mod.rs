//! Rate table configuration for the Deduction Engine.
//!
//! This module defines the [`RateTableProvider`] contract that deduction
//! strategies use to look up monthly thresholds, and an immutable,
//! file-backed [`RateTable`] implementing it.
//!
//! # Example
//!
//! ```no_run
//! use fradrag_engine::config::RateTableLoader;
//!
//! let loader = RateTableLoader::load("./config/satser").unwrap();
//! println!("Loaded rate table: {}", loader.metadata().name);
//! ```

mod loader;
mod provider;
mod types;

pub use loader::RateTableLoader;
pub use provider::RateTableProvider;
pub use types::{
    DisabilityFactors, GuaranteePensionRates, MINIMUM_PAYOUT_PERCENT, MONTHS_PER_YEAR,
    RateCategory, RateEntry, RateTable, RateTableMetadata, RateThreshold,
};
