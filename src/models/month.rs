//! Calendar month and month-aligned period models.
//!
//! All deduction and benefit computation happens per calendar [`Month`].
//! A [`Period`] is an inclusive, non-empty range of whole months.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

const MIN_YEAR: i32 = 1;
const MAX_YEAR: i32 = 9999;

/// A single calendar month, e.g. `2021-01`.
///
/// Months are totally ordered and serialize as `YYYY-MM` strings.
///
/// # Example
///
/// ```
/// use fradrag_engine::models::Month;
///
/// let january = Month::new(2021, 1).unwrap();
/// assert_eq!(january.to_string(), "2021-01");
/// assert_eq!(january.next(), Month::new(2021, 2).unwrap());
/// assert_eq!(january.last_day().to_string(), "2021-01-31");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Month {
    /// Always the first day of the month.
    start: NaiveDate,
}

impl Month {
    /// Creates a month from a year and a month number (1-12).
    pub fn new(year: i32, month: u32) -> EngineResult<Self> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(EngineError::InvalidMonth {
                value: format!("{}-{:02}", year, month),
            });
        }
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|start| Self { start })
            .ok_or_else(|| EngineError::InvalidMonth {
                value: format!("{}-{:02}", year, month),
            })
    }

    /// Returns the month containing the given date.
    pub fn from_date(date: NaiveDate) -> EngineResult<Self> {
        Self::new(date.year(), date.month())
    }

    /// The calendar year.
    pub fn year(&self) -> i32 {
        self.start.year()
    }

    /// The month number, 1-12.
    pub fn month(&self) -> u32 {
        self.start.month()
    }

    /// The first day of the month.
    pub fn first_day(&self) -> NaiveDate {
        self.start
    }

    /// The last day of the month.
    pub fn last_day(&self) -> NaiveDate {
        self.next().start - Days::new(1)
    }

    /// The following calendar month.
    pub fn next(&self) -> Self {
        Self {
            start: self.start + Months::new(1),
        }
    }

    /// Number of months from `self` to `other`, negative if `other` is earlier.
    pub fn months_until(&self, other: &Month) -> i64 {
        i64::from(other.year() - self.year()) * 12 + i64::from(other.month())
            - i64::from(self.month())
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for Month {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidMonth {
            value: s.to_string(),
        };
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for Month {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Month> for String {
    fn from(month: Month) -> Self {
        month.to_string()
    }
}

/// An inclusive range of whole calendar months.
///
/// A period always covers at least one month; reversed ranges are rejected
/// at construction.
///
/// # Example
///
/// ```
/// use fradrag_engine::models::{Month, Period};
///
/// let period = Period::new(Month::new(2021, 11).unwrap(), Month::new(2022, 2).unwrap()).unwrap();
/// assert_eq!(period.month_count(), 4);
/// assert!(period.contains(Month::new(2022, 1).unwrap()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPeriod")]
pub struct Period {
    from: Month,
    to: Month,
}

#[derive(Deserialize)]
struct RawPeriod {
    from: Month,
    to: Month,
}

impl TryFrom<RawPeriod> for Period {
    type Error = EngineError;

    fn try_from(raw: RawPeriod) -> Result<Self, Self::Error> {
        Period::new(raw.from, raw.to)
    }
}

impl Period {
    /// Creates a period from `from` to `to`, both inclusive.
    pub fn new(from: Month, to: Month) -> EngineResult<Self> {
        if to < from {
            return Err(EngineError::InvalidPeriod {
                message: format!("period ends ({}) before it starts ({})", to, from),
            });
        }
        Ok(Self { from, to })
    }

    /// A period covering exactly one month.
    pub fn single(month: Month) -> Self {
        Self {
            from: month,
            to: month,
        }
    }

    /// Creates a period from dates. `start` must be the first day of a month
    /// and `end` the last day of a month.
    pub fn from_dates(start: NaiveDate, end: NaiveDate) -> EngineResult<Self> {
        let from = Month::from_date(start)?;
        let to = Month::from_date(end)?;
        if from.first_day() != start {
            return Err(EngineError::InvalidPeriod {
                message: format!("{} is not the first day of a month", start),
            });
        }
        if to.last_day() != end {
            return Err(EngineError::InvalidPeriod {
                message: format!("{} is not the last day of a month", end),
            });
        }
        Self::new(from, to)
    }

    /// First month (inclusive).
    pub fn from(&self) -> Month {
        self.from
    }

    /// Last month (inclusive).
    pub fn to(&self) -> Month {
        self.to
    }

    /// Number of months covered.
    pub fn month_count(&self) -> u32 {
        // `to >= from` and years are bounded, so this fits
        (self.from.months_until(&self.to) + 1) as u32
    }

    /// Every month in the period, ascending.
    pub fn months(&self) -> Vec<Month> {
        let mut months = Vec::with_capacity(self.month_count() as usize);
        let mut current = self.from;
        while current <= self.to {
            months.push(current);
            current = current.next();
        }
        months
    }

    /// Returns true if `month` lies inside the period.
    pub fn contains(&self, month: Month) -> bool {
        month >= self.from && month <= self.to
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.from, self.to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(year: i32, month: u32) -> Month {
        Month::new(year, month).unwrap()
    }

    #[test]
    fn test_month_rejects_out_of_range_numbers() {
        assert!(Month::new(2021, 0).is_err());
        assert!(Month::new(2021, 13).is_err());
        assert!(Month::new(0, 1).is_err());
    }

    #[test]
    fn test_month_next_rolls_over_year() {
        assert_eq!(month(2021, 12).next(), month(2022, 1));
    }

    #[test]
    fn test_last_day_handles_leap_years() {
        assert_eq!(
            month(2024, 2).last_day(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert_eq!(
            month(2023, 2).last_day(),
            NaiveDate::from_ymd_opt(2023, 2, 28).unwrap()
        );
    }

    #[test]
    fn test_month_parses_and_displays() {
        let parsed: Month = "2021-05".parse().unwrap();
        assert_eq!(parsed, month(2021, 5));
        assert_eq!(parsed.to_string(), "2021-05");
        assert!("2021".parse::<Month>().is_err());
        assert!("2021-xx".parse::<Month>().is_err());
    }

    #[test]
    fn test_month_serde_as_string() {
        let json = serde_json::to_string(&month(2021, 5)).unwrap();
        assert_eq!(json, "\"2021-05\"");
        let back: Month = serde_json::from_str(&json).unwrap();
        assert_eq!(back, month(2021, 5));
        assert!(serde_json::from_str::<Month>("\"2021-13\"").is_err());
    }

    #[test]
    fn test_months_until() {
        assert_eq!(month(2021, 11).months_until(&month(2022, 2)), 3);
        assert_eq!(month(2022, 2).months_until(&month(2021, 11)), -3);
    }

    #[test]
    fn test_period_rejects_reversed_range() {
        let result = Period::new(month(2021, 5), month(2021, 4));
        assert!(matches!(result, Err(EngineError::InvalidPeriod { .. })));
    }

    #[test]
    fn test_period_months_across_year_boundary() {
        let period = Period::new(month(2021, 11), month(2022, 2)).unwrap();
        assert_eq!(
            period.months(),
            vec![month(2021, 11), month(2021, 12), month(2022, 1), month(2022, 2)]
        );
        assert_eq!(period.month_count(), 4);
    }

    #[test]
    fn test_single_month_period() {
        let period = Period::single(month(2021, 1));
        assert_eq!(period.months(), vec![month(2021, 1)]);
        assert!(period.contains(month(2021, 1)));
        assert!(!period.contains(month(2021, 2)));
    }

    #[test]
    fn test_period_from_dates_requires_whole_months() {
        let ok = Period::from_dates(
            NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2021, 12, 31).unwrap(),
        )
        .unwrap();
        assert_eq!(ok.month_count(), 12);

        assert!(
            Period::from_dates(
                NaiveDate::from_ymd_opt(2021, 1, 2).unwrap(),
                NaiveDate::from_ymd_opt(2021, 12, 31).unwrap(),
            )
            .is_err()
        );
        assert!(
            Period::from_dates(
                NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2021, 12, 30).unwrap(),
            )
            .is_err()
        );
    }

    #[test]
    fn test_period_deserialization_validates() {
        let period: Period = serde_json::from_str(r#"{"from":"2021-01","to":"2021-03"}"#).unwrap();
        assert_eq!(period.month_count(), 3);
        assert!(serde_json::from_str::<Period>(r#"{"from":"2021-03","to":"2021-01"}"#).is_err());
    }
}
