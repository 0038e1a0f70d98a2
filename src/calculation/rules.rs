//! Shared deduction rules applied by the deduction strategies.
//!
//! Each rule takes one month's [`AggregatedMonthlyDeduction`] and returns a
//! new one whose provenance is chained to the input's.

use rust_decimal::Decimal;
use tracing::debug;

use crate::config::RateThreshold;
use crate::models::{
    AggregatedMonthlyDeduction, DeductionRecord, DeductionType, Owner, Rule, RuleProvenance,
    sum_monthly,
};

/// Removes the lower of the claimant's earned income and expected income.
///
/// If earned income is strictly greater than expected income, the expected
/// income records are removed; otherwise the earned income records are
/// removed. Equal sums keep expected income. A month whose only income
/// record is earned income summing to zero therefore keeps neither.
///
/// # Example
///
/// ```
/// use fradrag_engine::calculation::filter_lower_of_earned_and_expected_income;
/// use fradrag_engine::models::{AggregatedMonthlyDeduction, DeductionRecord, DeductionType, Month, Owner, Period};
/// use rust_decimal::Decimal;
///
/// let month = Month::new(2021, 1).unwrap();
/// let record = |t, amount| {
///     DeductionRecord::new(t, Decimal::new(amount, 0), Period::single(month), Owner::Claimant, None).unwrap()
/// };
/// let input = AggregatedMonthlyDeduction::basis(
///     month,
///     vec![record(DeductionType::EarnedIncome, 7000), record(DeductionType::ExpectedIncome, 5000)],
/// );
///
/// let result = filter_lower_of_earned_and_expected_income(input);
/// assert_eq!(result.deductions.len(), 1);
/// assert_eq!(result.deductions[0].deduction_type(), &DeductionType::EarnedIncome);
/// ```
pub fn filter_lower_of_earned_and_expected_income(
    aggregated: AggregatedMonthlyDeduction,
) -> AggregatedMonthlyDeduction {
    let earned: Decimal = aggregated
        .of_type(&DeductionType::EarnedIncome, Owner::Claimant)
        .map(DeductionRecord::monthly_amount)
        .sum();
    let expected: Decimal = aggregated
        .of_type(&DeductionType::ExpectedIncome, Owner::Claimant)
        .map(DeductionRecord::monthly_amount)
        .sum();

    let removed = if earned > expected {
        DeductionType::ExpectedIncome
    } else {
        DeductionType::EarnedIncome
    };

    debug!(
        month = %aggregated.month,
        earned_income = %earned,
        expected_income = %expected,
        removed = ?removed,
        "Applied lower of earned and expected income"
    );

    let AggregatedMonthlyDeduction {
        month,
        deductions,
        applied_rule,
    } = aggregated;

    AggregatedMonthlyDeduction {
        month,
        deductions: deductions
            .into_iter()
            .filter(|d| !d.is(&removed, Owner::Claimant))
            .collect(),
        applied_rule: RuleProvenance::applied(
            Rule::LowerOfEarnedAndExpectedIncome,
            vec![applied_rule],
        ),
    }
}

/// Counts spouse deductions only above `threshold`, except social
/// assistance which always counts in full.
///
/// The spouse's deductions are replaced by at most one
/// [`DeductionType::ComputedSpouseDeduction`] of
/// `max(non-social-assistance sum - monthly threshold, 0) + social assistance sum`.
/// No record is added when that amount is zero.
pub fn cap_spouse_deductions_at_exemption(
    aggregated: AggregatedMonthlyDeduction,
    threshold: &RateThreshold,
) -> AggregatedMonthlyDeduction {
    let AggregatedMonthlyDeduction {
        month,
        deductions,
        applied_rule,
    } = aggregated;

    let (spouse, mut claimant): (Vec<_>, Vec<_>) = deductions
        .into_iter()
        .partition(|d| d.owner() == Owner::Spouse);

    let (social_assistance, other): (Vec<_>, Vec<_>) = spouse
        .into_iter()
        .partition(|d| d.deduction_type() == &DeductionType::SocialAssistance);
    let social_assistance_sum = sum_monthly(&social_assistance);
    let other_sum = sum_monthly(&other);

    // social assistance is excluded from the comparison with the threshold
    let excess = (other_sum - threshold.monthly_rate_as_decimal()).max(Decimal::ZERO);

    debug!(
        month = %month,
        spouse_sum = %other_sum,
        social_assistance = %social_assistance_sum,
        threshold = %threshold.monthly_rate_as_decimal(),
        excess = %excess,
        "Applied spouse exemption"
    );

    if !(social_assistance_sum.is_zero() && excess.is_zero()) {
        claimant.push(DeductionRecord::computed_spouse_deduction(
            month,
            excess + social_assistance_sum,
        ));
    }

    AggregatedMonthlyDeduction {
        month,
        deductions: claimant,
        applied_rule: RuleProvenance::applied(
            Rule::SpouseDeductionAboveExemption,
            vec![applied_rule, threshold.provenance.clone()],
        ),
    }
}

/// Replaces all spouse deductions with one
/// [`DeductionType::ComputedSpouseDeduction`] holding their sum.
///
/// Months without spouse deductions are returned unchanged apart from the
/// provenance.
pub fn merge_spouse_deductions(aggregated: AggregatedMonthlyDeduction) -> AggregatedMonthlyDeduction {
    let AggregatedMonthlyDeduction {
        month,
        deductions,
        applied_rule,
    } = aggregated;

    let (spouse, mut claimant): (Vec<_>, Vec<_>) = deductions
        .into_iter()
        .partition(|d| d.owner() == Owner::Spouse);

    if !spouse.is_empty() {
        let merged = sum_monthly(&spouse);
        debug!(
            month = %month,
            spouse_deductions = spouse.len(),
            merged = %merged,
            "Merged spouse deductions"
        );
        claimant.push(DeductionRecord::computed_spouse_deduction(month, merged));
    }

    AggregatedMonthlyDeduction {
        month,
        deductions: claimant,
        applied_rule: RuleProvenance::applied(Rule::SpouseDeductionsMerged, vec![applied_rule]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RateCategory;
    use crate::models::{Month, Period};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn january() -> Month {
        Month::new(2021, 1).unwrap()
    }

    fn record(deduction_type: DeductionType, amount: &str, owner: Owner) -> DeductionRecord {
        DeductionRecord::new(
            deduction_type,
            dec(amount),
            Period::single(january()),
            owner,
            None,
        )
        .unwrap()
    }

    fn threshold(monthly: &str) -> RateThreshold {
        RateThreshold::new(
            january(),
            RateCategory::OrdinaryAge,
            dec(monthly) * Decimal::from(12),
            january(),
        )
    }

    fn types(aggregated: &AggregatedMonthlyDeduction) -> Vec<(DeductionType, Owner)> {
        aggregated
            .deductions
            .iter()
            .map(|d| (d.deduction_type().clone(), d.owner()))
            .collect()
    }

    // ==========================================================================
    // Lower of earned and expected income
    // ==========================================================================

    #[test]
    fn test_earned_above_expected_keeps_earned() {
        let input = AggregatedMonthlyDeduction::basis(
            january(),
            vec![
                record(DeductionType::EarnedIncome, "7000", Owner::Claimant),
                record(DeductionType::ExpectedIncome, "5000", Owner::Claimant),
            ],
        );
        let result = filter_lower_of_earned_and_expected_income(input);
        assert_eq!(types(&result), vec![(DeductionType::EarnedIncome, Owner::Claimant)]);
    }

    #[test]
    fn test_expected_above_earned_keeps_expected() {
        let input = AggregatedMonthlyDeduction::basis(
            january(),
            vec![
                record(DeductionType::EarnedIncome, "3000", Owner::Claimant),
                record(DeductionType::ExpectedIncome, "5000", Owner::Claimant),
            ],
        );
        let result = filter_lower_of_earned_and_expected_income(input);
        assert_eq!(types(&result), vec![(DeductionType::ExpectedIncome, Owner::Claimant)]);
    }

    #[test]
    fn test_equal_sums_keep_expected_income() {
        let input = AggregatedMonthlyDeduction::basis(
            january(),
            vec![
                record(DeductionType::EarnedIncome, "5000", Owner::Claimant),
                record(DeductionType::ExpectedIncome, "5000", Owner::Claimant),
            ],
        );
        let result = filter_lower_of_earned_and_expected_income(input);
        assert_eq!(types(&result), vec![(DeductionType::ExpectedIncome, Owner::Claimant)]);
    }

    #[test]
    fn test_lone_earned_income_is_kept_when_positive() {
        let input = AggregatedMonthlyDeduction::basis(
            january(),
            vec![record(DeductionType::EarnedIncome, "500", Owner::Claimant)],
        );
        let result = filter_lower_of_earned_and_expected_income(input);
        assert_eq!(types(&result), vec![(DeductionType::EarnedIncome, Owner::Claimant)]);
    }

    #[test]
    fn test_lone_zero_earned_income_leaves_neither_group() {
        // 0 > 0 is false, so the earned income is the one removed
        let input = AggregatedMonthlyDeduction::basis(
            january(),
            vec![
                record(DeductionType::EarnedIncome, "0", Owner::Claimant),
                record(DeductionType::PublicPension, "1200", Owner::Claimant),
            ],
        );
        let result = filter_lower_of_earned_and_expected_income(input);
        assert_eq!(types(&result), vec![(DeductionType::PublicPension, Owner::Claimant)]);
        assert_eq!(result.total(), dec("1200"));
    }

    #[test]
    fn test_several_earned_incomes_are_summed() {
        let input = AggregatedMonthlyDeduction::basis(
            january(),
            vec![
                record(DeductionType::EarnedIncome, "3000", Owner::Claimant),
                record(DeductionType::EarnedIncome, "3000", Owner::Claimant),
                record(DeductionType::ExpectedIncome, "5000", Owner::Claimant),
            ],
        );
        let result = filter_lower_of_earned_and_expected_income(input);
        assert_eq!(result.deductions.len(), 2);
        assert_eq!(result.total(), dec("6000"));
    }

    #[test]
    fn test_spouse_earned_income_is_untouched() {
        let input = AggregatedMonthlyDeduction::basis(
            january(),
            vec![
                record(DeductionType::ExpectedIncome, "5000", Owner::Claimant),
                record(DeductionType::EarnedIncome, "9000", Owner::Spouse),
            ],
        );
        let result = filter_lower_of_earned_and_expected_income(input);
        assert_eq!(
            types(&result),
            vec![
                (DeductionType::ExpectedIncome, Owner::Claimant),
                (DeductionType::EarnedIncome, Owner::Spouse)
            ]
        );
    }

    #[test]
    fn test_lower_of_provenance_chains_basis() {
        let input = AggregatedMonthlyDeduction::basis(january(), vec![]);
        let result = filter_lower_of_earned_and_expected_income(input);
        assert_eq!(
            result.applied_rule.rule_ids(),
            vec!["deduction_lower_of_earned_and_expected", "deduction_basis"]
        );
    }

    // ==========================================================================
    // Spouse exemption
    // ==========================================================================

    #[test]
    fn test_spouse_over_threshold_adds_excess() {
        let input = AggregatedMonthlyDeduction::basis(
            january(),
            vec![
                record(DeductionType::ExpectedIncome, "1000", Owner::Claimant),
                record(DeductionType::AgePension, "15000", Owner::Spouse),
                record(DeductionType::EarnedIncome, "10000", Owner::Spouse),
            ],
        );
        let result = cap_spouse_deductions_at_exemption(input, &threshold("20000"));

        assert_eq!(result.deductions.len(), 2);
        let computed = &result.deductions[1];
        assert_eq!(computed.deduction_type(), &DeductionType::ComputedSpouseDeduction);
        assert_eq!(computed.owner(), Owner::Spouse);
        assert_eq!(computed.monthly_amount(), dec("5000"));
        assert_eq!(computed.period(), Period::single(january()));
    }

    #[test]
    fn test_spouse_under_threshold_with_social_assistance() {
        let input = AggregatedMonthlyDeduction::basis(
            january(),
            vec![
                record(DeductionType::PublicPension, "10000", Owner::Spouse),
                record(DeductionType::SocialAssistance, "3000", Owner::Spouse),
            ],
        );
        let result = cap_spouse_deductions_at_exemption(input, &threshold("20000"));

        assert_eq!(result.deductions.len(), 1);
        assert_eq!(result.deductions[0].monthly_amount(), dec("3000"));
    }

    #[test]
    fn test_social_assistance_is_added_on_top_of_excess() {
        let input = AggregatedMonthlyDeduction::basis(
            january(),
            vec![
                record(DeductionType::PublicPension, "22000", Owner::Spouse),
                record(DeductionType::SocialAssistance, "3000", Owner::Spouse),
            ],
        );
        let result = cap_spouse_deductions_at_exemption(input, &threshold("20000"));

        assert_eq!(result.deductions.len(), 1);
        assert_eq!(result.deductions[0].monthly_amount(), dec("5000"));
    }

    #[test]
    fn test_spouse_at_threshold_without_social_assistance_adds_nothing() {
        let input = AggregatedMonthlyDeduction::basis(
            january(),
            vec![
                record(DeductionType::ExpectedIncome, "1000", Owner::Claimant),
                record(DeductionType::PublicPension, "20000", Owner::Spouse),
            ],
        );
        let result = cap_spouse_deductions_at_exemption(input, &threshold("20000"));

        assert_eq!(types(&result), vec![(DeductionType::ExpectedIncome, Owner::Claimant)]);
    }

    #[test]
    fn test_exemption_provenance_includes_threshold() {
        let input = AggregatedMonthlyDeduction::basis(january(), vec![]);
        let result = cap_spouse_deductions_at_exemption(input, &threshold("20000"));
        assert_eq!(
            result.applied_rule.rule_ids(),
            vec!["deduction_spouse_above_exemption", "deduction_basis", "rate_table"]
        );
    }

    // ==========================================================================
    // Merge spouse deductions
    // ==========================================================================

    #[test]
    fn test_merge_sums_all_spouse_types() {
        let input = AggregatedMonthlyDeduction::basis(
            january(),
            vec![
                record(DeductionType::ExpectedIncome, "1000", Owner::Claimant),
                record(DeductionType::SocialAssistance, "2000", Owner::Spouse),
                record(DeductionType::EarnedIncome, "3000.50", Owner::Spouse),
                record(
                    DeductionType::Other {
                        description: "rent".to_string(),
                    },
                    "500",
                    Owner::Spouse,
                ),
            ],
        );
        let result = merge_spouse_deductions(input);

        assert_eq!(
            types(&result),
            vec![
                (DeductionType::ExpectedIncome, Owner::Claimant),
                (DeductionType::ComputedSpouseDeduction, Owner::Spouse)
            ]
        );
        assert_eq!(result.deductions[1].monthly_amount(), dec("5500.50"));
    }

    #[test]
    fn test_merge_without_spouse_deductions_keeps_claimant_deductions() {
        let input = AggregatedMonthlyDeduction::basis(
            january(),
            vec![record(DeductionType::ExpectedIncome, "1000", Owner::Claimant)],
        );
        let result = merge_spouse_deductions(input.clone());
        assert_eq!(result.deductions, input.deductions);
    }

    #[test]
    fn test_merge_keeps_zero_amount_spouse_record() {
        let input = AggregatedMonthlyDeduction::basis(
            january(),
            vec![record(DeductionType::PublicPension, "0", Owner::Spouse)],
        );
        let result = merge_spouse_deductions(input);
        assert_eq!(result.deductions.len(), 1);
        assert_eq!(result.deductions[0].monthly_amount(), Decimal::ZERO);
    }
}
