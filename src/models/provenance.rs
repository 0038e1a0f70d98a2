//! Rule provenance for audit review.
//!
//! Every aggregation step tags its result with a [`RuleProvenance`] that
//! references the provenance of its inputs, so a reviewer can trace which
//! statutory rules produced a given monthly figure.

use serde::{Deserialize, Serialize};

use super::Month;
use crate::config::RateCategory;

/// A statutory rule or data source applied during calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Rule {
    /// The deductions as registered, before any rule is applied.
    DeductionBasis,
    /// Only the higher of earned income and expected income counts.
    LowerOfEarnedAndExpectedIncome,
    /// Spouse deductions count only above the spouse income exemption.
    SpouseDeductionAboveExemption,
    /// Spouse deductions are merged into one computed deduction.
    SpouseDeductionsMerged,
    /// A rate looked up in the rate table.
    RateTable {
        /// The rate category looked up.
        category: RateCategory,
        /// The month from which the table entry applies.
        effective_from: Month,
    },
    /// Net monthly benefit computed from full rate and deductions.
    MonthlyBenefit,
    /// A net amount below two percent of the high rate is not paid out.
    BelowMinimumPayout,
}

impl Rule {
    /// Stable identifier of the rule.
    pub fn rule_id(&self) -> &'static str {
        match self {
            Rule::DeductionBasis => "deduction_basis",
            Rule::LowerOfEarnedAndExpectedIncome => "deduction_lower_of_earned_and_expected",
            Rule::SpouseDeductionAboveExemption => "deduction_spouse_above_exemption",
            Rule::SpouseDeductionsMerged => "deduction_spouse_merged",
            Rule::RateTable { .. } => "rate_table",
            Rule::MonthlyBenefit => "monthly_benefit",
            Rule::BelowMinimumPayout => "monthly_benefit_below_minimum",
        }
    }

    /// Human-readable name of the rule.
    pub fn name(&self) -> &'static str {
        match self {
            Rule::DeductionBasis => "Registered deductions",
            Rule::LowerOfEarnedAndExpectedIncome => "Higher of earned and expected income",
            Rule::SpouseDeductionAboveExemption => "Spouse deductions above exemption",
            Rule::SpouseDeductionsMerged => "Merged spouse deductions",
            Rule::RateTable { .. } => "Rate table lookup",
            Rule::MonthlyBenefit => "Monthly benefit",
            Rule::BelowMinimumPayout => "Amount below minimum payout",
        }
    }
}

/// A rule application, chained to the provenance it depends on.
///
/// # Example
///
/// ```
/// use fradrag_engine::models::{Rule, RuleProvenance};
///
/// let basis = RuleProvenance::basis();
/// let applied = RuleProvenance::applied(Rule::LowerOfEarnedAndExpectedIncome, vec![basis]);
/// assert!(applied.uses(&Rule::DeductionBasis));
/// assert_eq!(applied.rule_ids(), vec!["deduction_lower_of_earned_and_expected", "deduction_basis"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleProvenance {
    /// The rule applied in this step.
    pub rule: Rule,
    /// Provenance of the inputs this step consumed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<RuleProvenance>,
}

impl RuleProvenance {
    /// Provenance of raw, unprocessed deductions.
    pub fn basis() -> Self {
        Self::leaf(Rule::DeductionBasis)
    }

    /// Provenance with no dependencies.
    pub fn leaf(rule: Rule) -> Self {
        Self {
            rule,
            depends_on: Vec::new(),
        }
    }

    /// Provenance of `rule` applied on top of `depends_on`.
    pub fn applied(rule: Rule, depends_on: Vec<RuleProvenance>) -> Self {
        Self { rule, depends_on }
    }

    /// Returns true if `rule` appears anywhere in this chain.
    pub fn uses(&self, rule: &Rule) -> bool {
        &self.rule == rule || self.depends_on.iter().any(|p| p.uses(rule))
    }

    /// Rule identifiers in depth-first order, starting with this step.
    pub fn rule_ids(&self) -> Vec<&'static str> {
        let mut ids = vec![self.rule.rule_id()];
        for dependency in &self.depends_on {
            ids.extend(dependency.rule_ids());
        }
        ids
    }
}
