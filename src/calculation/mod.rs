//! Calculation logic for the Deduction Engine.
//!
//! This module contains periodization of deductions into calendar months,
//! the shared deduction rules, the deduction strategies for disability and
//! age claimants, and the monthly benefit calculation built on top of them.

mod monthly_benefit;
mod periodize;
mod rules;
mod strategy;

pub use monthly_benefit::{ENGINE_VERSION, calculate_benefit, calculate_monthly_benefit};
pub use periodize::{deductions_per_month, periodize};
pub use rules::{
    cap_spouse_deductions_at_exemption, filter_lower_of_earned_and_expected_income,
    merge_spouse_deductions,
};
pub use strategy::{DeductionStrategy, Household, compute_aggregated_deductions};
