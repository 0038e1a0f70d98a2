//! Deduction strategies.
//!
//! The statutory deduction rules differ between disability and age
//! claimants, and by the claimant's household. [`DeductionStrategy`] is the
//! closed set of these combinations; each variant turns per-month deduction
//! lists into [`AggregatedMonthlyDeduction`]s.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::periodize::deductions_per_month;
use super::rules::{
    cap_spouse_deductions_at_exemption, filter_lower_of_earned_and_expected_income,
    merge_spouse_deductions,
};
use crate::config::{RateTableProvider, RateThreshold};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AggregatedMonthlyDeduction, DeductionRecord, DeductionType, Month, Owner, Period,
};

/// The claimant's household, as far as deductions are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Household {
    /// No spouse or partner; only the claimant's deductions count.
    Single,
    /// Spouse or partner aged 67 or older.
    SpouseOver67,
    /// Spouse or partner under 67 who is a disabled refugee.
    SpouseUnder67DisabledRefugee,
    /// Spouse or partner under 67, not a disabled refugee.
    SpouseUnder67,
}

/// A deduction strategy: claimant branch and household.
///
/// | Household | Disability | Age |
/// |---|---|---|
/// | `Single` | claimant only, lower-of | claimant only |
/// | `SpouseOver67` | lower-of, exemption at ordinary age rate | exemption at ordinary age rate |
/// | `SpouseUnder67DisabledRefugee` | lower-of, exemption at ordinary disability rate | exemption at ordinary disability rate |
/// | `SpouseUnder67` | lower-of, merge spouse deductions | merge spouse deductions |
///
/// The disability branch also requires exactly one expected income for the
/// claimant in every month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "branch", content = "household", rename_all = "snake_case")]
pub enum DeductionStrategy {
    /// Claimant receiving supplementary benefit on the basis of disability.
    Disability(Household),
    /// Claimant receiving supplementary benefit on the basis of age.
    Age(Household),
}

impl DeductionStrategy {
    /// The household variant.
    pub fn household(&self) -> Household {
        match self {
            DeductionStrategy::Disability(household) | DeductionStrategy::Age(household) => {
                *household
            }
        }
    }

    /// Whether the lower of earned and expected income is filtered out.
    fn filters_lower_income(&self) -> bool {
        matches!(self, DeductionStrategy::Disability(_))
    }

    /// The spouse income exemption for `month`, or `None` when the household
    /// has no exemption concept.
    pub fn spouse_income_exemption<R: RateTableProvider + ?Sized>(
        &self,
        month: Month,
        rates: &R,
    ) -> EngineResult<Option<RateThreshold>> {
        match self.household() {
            Household::SpouseOver67 => rates.ordinary_rate_over_67(month).map(Some),
            Household::SpouseUnder67DisabledRefugee => rates.ordinary_rate_disabled(month).map(Some),
            Household::Single | Household::SpouseUnder67 => Ok(None),
        }
    }

    /// Checks that every month holds exactly one expected income for the
    /// claimant. Only the disability branch has this requirement.
    pub fn validate(&self, monthly: &BTreeMap<Month, Vec<DeductionRecord>>) -> EngineResult<()> {
        if !self.filters_lower_income() {
            return Ok(());
        }
        for (month, deductions) in monthly {
            let count = deductions
                .iter()
                .filter(|d| d.is(&DeductionType::ExpectedIncome, Owner::Claimant))
                .count();
            if count != 1 {
                warn!(
                    month = %month,
                    expected_income_count = count,
                    "Missing or duplicate expected income for claimant"
                );
                return Err(EngineError::PreconditionViolation {
                    month: *month,
                    message: format!(
                        "each month must contain exactly one expected income deduction for the claimant, found {}",
                        count
                    ),
                });
            }
        }
        Ok(())
    }

    /// Applies the strategy's rules to each month's deductions.
    ///
    /// Every record in `monthly` must be confined to the month it is listed
    /// under. Results are returned in ascending month order.
    pub fn aggregate<R: RateTableProvider + ?Sized>(
        &self,
        monthly: BTreeMap<Month, Vec<DeductionRecord>>,
        rates: &R,
    ) -> EngineResult<Vec<AggregatedMonthlyDeduction>> {
        self.validate(&monthly)?;

        monthly
            .into_iter()
            .map(|(month, deductions)| self.aggregate_month(month, deductions, rates))
            .collect()
    }

    fn aggregate_month<R: RateTableProvider + ?Sized>(
        &self,
        month: Month,
        deductions: Vec<DeductionRecord>,
        rates: &R,
    ) -> EngineResult<AggregatedMonthlyDeduction> {
        let household = self.household();

        let deductions = match household {
            Household::Single => deductions
                .into_iter()
                .filter(|d| d.owner() == Owner::Claimant)
                .collect(),
            _ => deductions,
        };

        let mut aggregated = AggregatedMonthlyDeduction::basis(month, deductions);
        if self.filters_lower_income() {
            aggregated = filter_lower_of_earned_and_expected_income(aggregated);
        }

        Ok(match household {
            Household::Single => aggregated,
            Household::SpouseOver67 => {
                cap_spouse_deductions_at_exemption(aggregated, &rates.ordinary_rate_over_67(month)?)
            }
            Household::SpouseUnder67DisabledRefugee => {
                cap_spouse_deductions_at_exemption(aggregated, &rates.ordinary_rate_disabled(month)?)
            }
            Household::SpouseUnder67 => merge_spouse_deductions(aggregated),
        })
    }

    /// Periodizes `deductions`, applies the strategy for every month of
    /// `benefit_period`, and indexes the result by month.
    ///
    /// The result holds exactly one entry per month of the period, also for
    /// months without any registered deduction.
    pub fn compute_aggregated_deductions<R: RateTableProvider + ?Sized>(
        &self,
        deductions: &[DeductionRecord],
        benefit_period: Period,
        rates: &R,
    ) -> EngineResult<BTreeMap<Month, AggregatedMonthlyDeduction>> {
        info!(
            strategy = ?self,
            period = %benefit_period,
            deductions = deductions.len(),
            "Computing aggregated deductions"
        );

        let monthly = deductions_per_month(deductions, benefit_period);
        Ok(self
            .aggregate(monthly, rates)?
            .into_iter()
            .map(|aggregated| (aggregated.month, aggregated))
            .collect())
    }
}

/// Computes the aggregated deductions per month of `benefit_period` using
/// `strategy`.
///
/// # Example
///
/// ```
/// use fradrag_engine::calculation::{compute_aggregated_deductions, DeductionStrategy, Household};
/// use fradrag_engine::config::{RateCategory, RateTableProvider, RateThreshold};
/// use fradrag_engine::error::EngineResult;
/// use fradrag_engine::models::{DeductionRecord, DeductionType, Month, Owner, Period};
/// use rust_decimal::Decimal;
///
/// struct FixedRates;
///
/// impl RateTableProvider for FixedRates {
///     fn rate(&self, month: Month, category: RateCategory) -> EngineResult<RateThreshold> {
///         Ok(RateThreshold::new(month, category, Decimal::new(240000, 0), month))
///     }
/// }
///
/// let january = Month::new(2021, 1).unwrap();
/// let expected_income = DeductionRecord::new(
///     DeductionType::ExpectedIncome,
///     Decimal::new(12000, 0),
///     Period::single(january),
///     Owner::Claimant,
///     None,
/// )
/// .unwrap();
///
/// let result = compute_aggregated_deductions(
///     &[expected_income.clone()],
///     Period::single(january),
///     DeductionStrategy::Disability(Household::Single),
///     &FixedRates,
/// )
/// .unwrap();
///
/// assert_eq!(result.len(), 1);
/// assert_eq!(result[&january].deductions, vec![expected_income]);
/// ```
pub fn compute_aggregated_deductions<R: RateTableProvider + ?Sized>(
    deductions: &[DeductionRecord],
    benefit_period: Period,
    strategy: DeductionStrategy,
    rates: &R,
) -> EngineResult<BTreeMap<Month, AggregatedMonthlyDeduction>> {
    strategy.compute_aggregated_deductions(deductions, benefit_period, rates)
}
