//! The rate table lookup contract used by deduction strategies.

use tracing::debug;

use super::types::{RateCategory, RateTable, RateThreshold};
use crate::error::{EngineError, EngineResult};
use crate::models::Month;

/// Read-only source of monthly full rates.
///
/// Implementations must be safe for concurrent reads; the engine never
/// mutates a provider.
pub trait RateTableProvider: Send + Sync {
    /// The full rate for `category` in `month`.
    fn rate(&self, month: Month, category: RateCategory) -> EngineResult<RateThreshold>;

    /// The ordinary rate for age claimants (guarantee pension level), used as
    /// the exemption for a spouse aged 67 or older.
    fn ordinary_rate_over_67(&self, month: Month) -> EngineResult<RateThreshold> {
        self.rate(month, RateCategory::OrdinaryAge)
    }

    /// The ordinary rate for disability claimants, used as the exemption for
    /// a spouse under 67 who is a disabled refugee.
    fn ordinary_rate_disabled(&self, month: Month) -> EngineResult<RateThreshold> {
        self.rate(month, RateCategory::OrdinaryDisabled)
    }

    /// The high rate in the same claimant branch as `category`. Two percent
    /// of it is the minimum monthly payout.
    fn high_rate(&self, month: Month, category: RateCategory) -> EngineResult<RateThreshold> {
        self.rate(month, category.high())
    }
}

impl RateTableProvider for RateTable {
    fn rate(&self, month: Month, category: RateCategory) -> EngineResult<RateThreshold> {
        let entry = self
            .entry_for(month)
            .ok_or(EngineError::RateNotFound { category, month })?;
        let threshold = RateThreshold::new(
            month,
            category,
            entry.annual_rate(category),
            entry.effective_from,
        );
        debug!(
            month = %month,
            category = %category,
            effective_from = %entry.effective_from,
            annual_rate = %threshold.annual_rate,
            "Rate looked up"
        );
        Ok(threshold)
    }
}
