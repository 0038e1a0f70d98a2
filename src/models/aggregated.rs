//! Per-month aggregated deduction results.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{DeductionRecord, DeductionType, Month, Owner, RuleProvenance, sum_monthly};

/// The deductions that count against the benefit for one month, after a
/// deduction strategy has applied its rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedMonthlyDeduction {
    /// The month the deductions apply to.
    pub month: Month,
    /// Deductions counting for the month, each confined to `month`.
    pub deductions: Vec<DeductionRecord>,
    /// The rules that produced `deductions`.
    pub applied_rule: RuleProvenance,
}

impl AggregatedMonthlyDeduction {
    /// Wraps the registered deductions for a month, before any rule is applied.
    pub fn basis(month: Month, deductions: Vec<DeductionRecord>) -> Self {
        Self {
            month,
            deductions,
            applied_rule: RuleProvenance::basis(),
        }
    }

    /// Sum of all deductions for the month.
    pub fn total(&self) -> Decimal {
        sum_monthly(&self.deductions)
    }

    /// Deductions belonging to `owner`.
    pub fn owned_by(&self, owner: Owner) -> impl Iterator<Item = &DeductionRecord> {
        self.deductions.iter().filter(move |d| d.owner() == owner)
    }

    /// Deductions of the given type and owner.
    pub fn of_type<'a>(
        &'a self,
        deduction_type: &'a DeductionType,
        owner: Owner,
    ) -> impl Iterator<Item = &'a DeductionRecord> {
        self.deductions
            .iter()
            .filter(move |d| d.is(deduction_type, owner))
    }
}
