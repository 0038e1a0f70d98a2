//! Rate table types.
//!
//! This module contains the strongly-typed rate table structures that are
//! deserialized from YAML or JSON rate files, and the [`RateThreshold`]
//! handed to deduction strategies.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Month, Rule, RuleProvenance};

/// Months per year, used to turn annual rates into monthly rates.
pub const MONTHS_PER_YEAR: u32 = 12;

/// Percentage of the high rate below which a monthly amount is not paid out.
pub const MINIMUM_PAYOUT_PERCENT: i64 = 2;

/// The full-rate category a monthly threshold is looked up for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateCategory {
    /// Ordinary rate for age claimants (ordinary guarantee pension level).
    OrdinaryAge,
    /// High rate for age claimants (high guarantee pension level).
    HighAge,
    /// Ordinary rate for disability claimants.
    OrdinaryDisabled,
    /// High rate for disability claimants.
    HighDisabled,
}

impl RateCategory {
    /// The high category of the same claimant branch.
    pub fn high(&self) -> RateCategory {
        match self {
            RateCategory::OrdinaryAge | RateCategory::HighAge => RateCategory::HighAge,
            RateCategory::OrdinaryDisabled | RateCategory::HighDisabled => {
                RateCategory::HighDisabled
            }
        }
    }
}

impl fmt::Display for RateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RateCategory::OrdinaryAge => "ordinary_age",
            RateCategory::HighAge => "high_age",
            RateCategory::OrdinaryDisabled => "ordinary_disabled",
            RateCategory::HighDisabled => "high_disabled",
        };
        f.write_str(name)
    }
}

/// Metadata about the rate table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RateTableMetadata {
    /// The human-readable name of the table.
    pub name: String,
    /// The version of the table.
    pub version: String,
    /// URL to the regulation the rates are taken from.
    #[serde(default)]
    pub source_url: Option<String>,
}

/// Annual guarantee pension amounts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GuaranteePensionRates {
    /// Ordinary annual guarantee pension.
    pub ordinary: Decimal,
    /// High annual guarantee pension.
    pub high: Decimal,
}

/// Factors applied to the base amount for disability claimants
/// (minimum annual benefit for disabled persons).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DisabilityFactors {
    /// Ordinary factor.
    pub ordinary: Decimal,
    /// High factor.
    pub high: Decimal,
}

/// Rates effective from a given month until the next entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RateEntry {
    /// First month the rates apply.
    pub effective_from: Month,
    /// The national insurance base amount (grunnbeløp), annual.
    pub base_amount: Decimal,
    /// Guarantee pension levels.
    pub guarantee_pension: GuaranteePensionRates,
    /// Disability factors.
    pub disability_factor: DisabilityFactors,
}

impl RateEntry {
    /// Annual full rate for `category`.
    pub fn annual_rate(&self, category: RateCategory) -> Decimal {
        match category {
            RateCategory::OrdinaryAge => self.guarantee_pension.ordinary,
            RateCategory::HighAge => self.guarantee_pension.high,
            RateCategory::OrdinaryDisabled => self.base_amount * self.disability_factor.ordinary,
            RateCategory::HighDisabled => self.base_amount * self.disability_factor.high,
        }
    }
}

/// The full rate for one month and category.
///
/// Used both as the claimant's full benefit rate and as the exemption
/// threshold for spouse deductions.
///
/// # Example
///
/// ```
/// use fradrag_engine::config::{RateCategory, RateThreshold};
/// use fradrag_engine::models::Month;
/// use rust_decimal::Decimal;
///
/// let month = Month::new(2021, 5).unwrap();
/// let threshold = RateThreshold::new(month, RateCategory::OrdinaryAge, Decimal::new(240000, 0), month);
/// assert_eq!(threshold.monthly_rate_as_decimal(), Decimal::new(20000, 0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateThreshold {
    /// The month the rate applies to.
    pub month: Month,
    /// The rate category.
    pub category: RateCategory,
    /// The annual rate.
    pub annual_rate: Decimal,
    /// Where the rate came from.
    pub provenance: RuleProvenance,
}

impl RateThreshold {
    /// Creates a threshold for `month`, taken from the table entry effective
    /// from `effective_from`.
    pub fn new(
        month: Month,
        category: RateCategory,
        annual_rate: Decimal,
        effective_from: Month,
    ) -> Self {
        Self {
            month,
            category,
            annual_rate,
            provenance: RuleProvenance::leaf(Rule::RateTable {
                category,
                effective_from,
            }),
        }
    }

    /// The monthly rate: the annual rate divided by twelve.
    pub fn monthly_rate_as_decimal(&self) -> Decimal {
        self.annual_rate / Decimal::from(MONTHS_PER_YEAR)
    }

    /// Two percent of the annual rate, per month.
    ///
    /// Taken from a high-rate threshold, this is the smallest monthly amount
    /// that is paid out.
    pub fn two_percent_monthly(&self) -> Decimal {
        self.annual_rate * Decimal::new(MINIMUM_PAYOUT_PERCENT, 2) / Decimal::from(MONTHS_PER_YEAR)
    }
}

/// A complete rate table, entries sorted oldest first.
#[derive(Debug, Clone)]
pub struct RateTable {
    metadata: RateTableMetadata,
    entries: Vec<RateEntry>,
}

impl RateTable {
    /// Creates a new rate table from its component parts.
    pub fn new(metadata: RateTableMetadata, entries: Vec<RateEntry>) -> Self {
        let mut sorted_entries = entries;
        sorted_entries.sort_by(|a, b| a.effective_from.cmp(&b.effective_from));
        Self {
            metadata,
            entries: sorted_entries,
        }
    }

    /// Returns the table metadata.
    pub fn metadata(&self) -> &RateTableMetadata {
        &self.metadata
    }

    /// Returns all entries, oldest first.
    pub fn entries(&self) -> &[RateEntry] {
        &self.entries
    }

    /// The entry in force for `month`: the latest one effective on or before it.
    pub fn entry_for(&self, month: Month) -> Option<&RateEntry> {
        self.entries.iter().rfind(|e| e.effective_from <= month)
    }
}
