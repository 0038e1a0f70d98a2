//! Benefit calculation result models.
//!
//! This module contains the [`BenefitCalculation`] type and its per-month
//! [`MonthlyBenefit`] lines, produced by combining aggregated deductions with
//! the full rate for each month.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AggregatedMonthlyDeduction, ClaimantKind, LivingSituation, Month, Period, RuleProvenance};
use crate::config::RateCategory;

/// The net benefit for a single month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyBenefit {
    /// The month this line applies to.
    pub month: Month,
    /// The full-rate category used for the month.
    pub rate_category: RateCategory,
    /// Full monthly benefit before deductions.
    pub full_rate_monthly: Decimal,
    /// Sum of the deductions counting for the month.
    pub total_deductions: Decimal,
    /// Net benefit paid for the month, in whole kroner, never negative.
    pub net_benefit: Decimal,
    /// The deductions behind `total_deductions`.
    pub deductions: AggregatedMonthlyDeduction,
    /// The rules that produced this line.
    pub applied_rule: RuleProvenance,
    /// Set when the month pays nothing or less than the minimum payout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<BenefitRemark>,
}

/// Why a month pays nothing, or less than the minimum payout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BenefitRemark {
    /// The deductions consume the full rate.
    AmountIsZero,
    /// The amount was above zero but below two percent of the high rate.
    /// It is withheld as a [`BelowMinimumLevel`] deduction and nothing is paid.
    ///
    /// [`BelowMinimumLevel`]: super::DeductionType::BelowMinimumLevel
    BelowMinimumPayout,
    /// The amount is below two percent of the high rate only because of
    /// social assistance. It is paid out anyway.
    SocialAssistanceBelowMinimumPayout,
}

impl BenefitRemark {
    /// Returns true if the remark means nothing is paid for the month.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            BenefitRemark::AmountIsZero | BenefitRemark::BelowMinimumPayout
        )
    }
}

/// The complete result of a benefit calculation over a period.
///
/// # Example
///
/// ```
/// use fradrag_engine::models::{BenefitCalculation, ClaimantKind, LivingSituation, Month, Period};
/// use chrono::Utc;
/// use rust_decimal::Decimal;
/// use uuid::Uuid;
///
/// let calculation = BenefitCalculation {
///     calculation_id: Uuid::new_v4(),
///     timestamp: Utc::now(),
///     engine_version: "0.1.0".to_string(),
///     period: Period::single(Month::new(2021, 1).unwrap()),
///     claimant_kind: ClaimantKind::Age,
///     living_situation: LivingSituation::Alone,
///     months: vec![],
///     total_benefit: Decimal::ZERO,
/// };
/// assert!(calculation.months.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenefitCalculation {
    /// Unique identifier of this calculation.
    pub calculation_id: Uuid,
    /// When the calculation was performed.
    pub timestamp: DateTime<Utc>,
    /// Version of the engine that produced the result.
    pub engine_version: String,
    /// The calculation period.
    pub period: Period,
    /// Claimant branch.
    pub claimant_kind: ClaimantKind,
    /// Household situation for the whole period.
    pub living_situation: LivingSituation,
    /// One line per month of `period`, ascending.
    pub months: Vec<MonthlyBenefit>,
    /// Sum of `net_benefit` over all months.
    pub total_benefit: Decimal,
}

impl BenefitCalculation {
    /// The line for `month`, if it lies in the period.
    pub fn month(&self, month: Month) -> Option<&MonthlyBenefit> {
        self.months.iter().find(|m| m.month == month)
    }

    /// Every month carrying a remark, ascending.
    pub fn months_with_remark(&self) -> impl Iterator<Item = (Month, BenefitRemark)> + '_ {
        self.months
            .iter()
            .filter_map(|m| m.remark.map(|remark| (m.month, remark)))
    }

    /// Returns true if every month pays nothing.
    pub fn all_months_rejected(&self) -> bool {
        !self.months.is_empty()
            && self
                .months
                .iter()
                .all(|m| m.remark.is_some_and(|remark| remark.is_rejection()))
    }
}
