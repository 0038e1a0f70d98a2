//! Monthly benefit calculation.
//!
//! This module combines aggregated deductions with the claimant's full rate
//! into net monthly benefit amounts, and withholds amounts below the minimum
//! payout of two percent of the high rate.

use chrono::Utc;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, info};
use uuid::Uuid;

use super::strategy::{DeductionStrategy, Household};
use crate::config::{RateTableProvider, RateThreshold};
use crate::error::EngineResult;
use crate::models::{
    AggregatedMonthlyDeduction, BenefitCalculation, BenefitRemark, ClaimantKind, DeductionRecord,
    DeductionType, LivingSituation, Month, MonthlyBenefit, Owner, Period, Rule, RuleProvenance,
};

/// Version stamped on every [`BenefitCalculation`].
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Calculates the net benefit for one month.
///
/// The net benefit is the monthly full rate minus the month's deductions,
/// rounded to whole kroner (half away from zero) and never below zero.
///
/// A net amount above zero but below two percent of `high_rate` is not paid
/// out: it is added as a [`DeductionType::BelowMinimumLevel`] deduction for
/// the claimant and the net benefit becomes zero. The exception is when
/// `social_assistance` (the month's registered social assistance) lifts the
/// amount to the minimum; then the amount is paid and only remarked.
///
/// # Example
///
/// ```
/// use fradrag_engine::calculation::calculate_monthly_benefit;
/// use fradrag_engine::config::{RateCategory, RateThreshold};
/// use fradrag_engine::models::{AggregatedMonthlyDeduction, Month};
/// use rust_decimal::Decimal;
///
/// let month = Month::new(2021, 1).unwrap();
/// let full_rate = RateThreshold::new(month, RateCategory::HighAge, Decimal::new(240000, 0), month);
/// let line = calculate_monthly_benefit(
///     AggregatedMonthlyDeduction::basis(month, vec![]),
///     &full_rate,
///     &full_rate,
///     Decimal::ZERO,
/// );
/// assert_eq!(line.net_benefit, Decimal::new(20000, 0));
/// assert!(line.remark.is_none());
/// ```
pub fn calculate_monthly_benefit(
    mut deductions: AggregatedMonthlyDeduction,
    full_rate: &RateThreshold,
    high_rate: &RateThreshold,
    social_assistance: Decimal,
) -> MonthlyBenefit {
    let full_rate_monthly = full_rate.monthly_rate_as_decimal();
    let minimum_payout = high_rate.two_percent_monthly();
    let net = (full_rate_monthly - deductions.total())
        .max(Decimal::ZERO)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

    let mut depends_on = vec![deductions.applied_rule.clone(), full_rate.provenance.clone()];
    if high_rate.category != full_rate.category {
        depends_on.push(high_rate.provenance.clone());
    }
    let mut applied_rule = RuleProvenance::applied(Rule::MonthlyBenefit, depends_on);

    let (net_benefit, remark) = if net.is_zero() {
        (net, Some(BenefitRemark::AmountIsZero))
    } else if net >= minimum_payout {
        (net, None)
    } else if net + social_assistance >= minimum_payout {
        (net, Some(BenefitRemark::SocialAssistanceBelowMinimumPayout))
    } else {
        debug!(
            month = %deductions.month,
            net = %net,
            minimum_payout = %minimum_payout,
            "Withheld amount below minimum payout"
        );
        deductions
            .deductions
            .push(DeductionRecord::below_minimum_level(deductions.month, net));
        applied_rule = RuleProvenance::applied(Rule::BelowMinimumPayout, vec![applied_rule]);
        (Decimal::ZERO, Some(BenefitRemark::BelowMinimumPayout))
    };

    MonthlyBenefit {
        month: deductions.month,
        rate_category: full_rate.category,
        full_rate_monthly,
        total_deductions: deductions.total(),
        net_benefit,
        deductions,
        applied_rule,
        remark,
    }
}

/// Registered social assistance counting for `month` under `strategy`.
fn social_assistance_for(
    deductions: &[DeductionRecord],
    month: Month,
    strategy: DeductionStrategy,
) -> Decimal {
    let counts_spouse = strategy.household() != Household::Single;
    deductions
        .iter()
        .filter(|d| d.deduction_type() == &DeductionType::SocialAssistance)
        .filter(|d| d.owner() == Owner::Claimant || counts_spouse)
        .filter(|d| d.period().contains(month))
        .map(DeductionRecord::monthly_amount)
        .sum()
}

/// Calculates the benefit for every month of `period`.
///
/// The deduction strategy and full-rate category are derived from the
/// claimant kind and living situation.
pub fn calculate_benefit<R: RateTableProvider + ?Sized>(
    deductions: &[DeductionRecord],
    period: Period,
    claimant_kind: ClaimantKind,
    living_situation: LivingSituation,
    rates: &R,
) -> EngineResult<BenefitCalculation> {
    let strategy = living_situation.strategy(claimant_kind);
    let rate_category = living_situation.rate_category(claimant_kind);

    let aggregated = strategy.compute_aggregated_deductions(deductions, period, rates)?;

    let months = aggregated
        .into_values()
        .map(|month_deductions| {
            let month = month_deductions.month;
            let full_rate = rates.rate(month, rate_category)?;
            let high_rate = rates.high_rate(month, rate_category)?;
            Ok(calculate_monthly_benefit(
                month_deductions,
                &full_rate,
                &high_rate,
                social_assistance_for(deductions, month, strategy),
            ))
        })
        .collect::<EngineResult<Vec<_>>>()?;

    let total_benefit: Decimal = months.iter().map(|m| m.net_benefit).sum();

    let calculation = BenefitCalculation {
        calculation_id: Uuid::new_v4(),
        timestamp: Utc::now(),
        engine_version: ENGINE_VERSION.to_string(),
        period,
        claimant_kind,
        living_situation,
        months,
        total_benefit,
    };

    info!(
        calculation_id = %calculation.calculation_id,
        period = %period,
        strategy = ?strategy,
        total_benefit = %total_benefit,
        months_with_remark = calculation.months_with_remark().count(),
        "Benefit calculated"
    );

    Ok(calculation)
}
