//! Periodization of deductions into calendar months.
//!
//! Downstream rules operate on one month at a time, so every deduction is
//! split into one record per month before aggregation.

use std::collections::BTreeMap;

use crate::models::{DeductionRecord, Month, Period};

/// Splits a deduction into one record per calendar month of its period.
///
/// Type, monthly amount, owner and foreign income are carried over unchanged.
///
/// # Example
///
/// ```
/// use fradrag_engine::calculation::periodize;
/// use fradrag_engine::models::{DeductionRecord, DeductionType, Month, Owner, Period};
/// use rust_decimal::Decimal;
///
/// let record = DeductionRecord::new(
///     DeductionType::PublicPension,
///     Decimal::new(3000, 0),
///     Period::new(Month::new(2021, 1).unwrap(), Month::new(2021, 3).unwrap()).unwrap(),
///     Owner::Claimant,
///     None,
/// )
/// .unwrap();
///
/// let fragments = periodize(&record);
/// assert_eq!(fragments.len(), 3);
/// assert!(fragments.iter().all(|f| f.period().month_count() == 1));
/// assert!(fragments.iter().all(|f| f.monthly_amount() == Decimal::new(3000, 0)));
/// ```
pub fn periodize(record: &DeductionRecord) -> Vec<DeductionRecord> {
    record
        .period()
        .months()
        .into_iter()
        .map(|month| record.with_period(Period::single(month)))
        .collect()
}

/// Periodizes `records` and groups the fragments by month.
///
/// Every month of `benefit_period` is present in the result, with an empty
/// list when no deduction applies. Fragments outside the period are dropped.
pub fn deductions_per_month(
    records: &[DeductionRecord],
    benefit_period: Period,
) -> BTreeMap<Month, Vec<DeductionRecord>> {
    let mut per_month: BTreeMap<Month, Vec<DeductionRecord>> = benefit_period
        .months()
        .into_iter()
        .map(|month| (month, Vec::new()))
        .collect();

    for fragment in records.iter().flat_map(periodize) {
        if let Some(deductions) = per_month.get_mut(&fragment.period().from()) {
            deductions.push(fragment);
        }
    }

    per_month
}
