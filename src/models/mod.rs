//! Core data models for the Deduction Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod aggregated;
mod benefit;
mod deduction;
mod living_situation;
mod month;
mod provenance;

pub use aggregated::AggregatedMonthlyDeduction;
pub use benefit::{BenefitCalculation, BenefitRemark, MonthlyBenefit};
pub use deduction::{
    DeductionCategory, DeductionRecord, DeductionType, ForeignIncome, Owner, sum_monthly,
};
pub use living_situation::{ClaimantKind, LivingSituation};
pub use month::{Month, Period};
pub use provenance::{Rule, RuleProvenance};
