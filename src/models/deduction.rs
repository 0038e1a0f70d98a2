//! Deduction (fradrag) models.
//!
//! A [`DeductionRecord`] is an amount subtracted from the gross benefit each
//! month of its period. Records are immutable and validated at construction.

use std::cmp::Ordering;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Month, Period};
use crate::error::{EngineError, EngineResult};

/// Who a deduction belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Owner {
    /// The claimant.
    Claimant,
    /// The claimant's cohabiting spouse or partner (EPS).
    Spouse,
}

/// Fieldless category of a [`DeductionType`], used for sorting and tie-breaking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum DeductionCategory {
    AgePension,
    AgreementPension,
    AgreementPensionPrivate,
    Maintenance,
    CashBenefit,
    CapitalIncome,
    Unemployment,
    EarnedIncome,
    ExpectedIncome,
    FosterCare,
    SurvivorPension,
    IntroductionBenefit,
    QualificationBenefit,
    WelfareBenefits,
    PublicPension,
    PrivatePension,
    SocialAssistance,
    SupplementaryBenefit,
    DisabilityBenefit,
    ForeignStayReduction,
    BelowMinimumLevel,
    ComputedSpouseDeduction,
    Other,
}

/// The kind of a deduction.
///
/// The set is closed; anything not covered is registered as
/// [`DeductionType::Other`] with a free-text description.
///
/// # Example
///
/// ```
/// use fradrag_engine::models::{DeductionCategory, DeductionType};
///
/// let other = DeductionType::Other { description: "lottery".to_string() };
/// assert_eq!(other.category(), DeductionCategory::Other);
/// assert_eq!(DeductionType::ExpectedIncome.category(), DeductionCategory::ExpectedIncome);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeductionType {
    /// Alderspensjon.
    AgePension,
    /// Avtalefestet pensjon (public sector).
    AgreementPension,
    /// Avtalefestet pensjon (private sector).
    AgreementPensionPrivate,
    /// Bidrag etter ekteskapsloven.
    Maintenance,
    /// Kontantstøtte.
    CashBenefit,
    /// Kapitalinntekt.
    CapitalIncome,
    /// Dagpenger.
    Unemployment,
    /// Arbeidsinntekt.
    EarnedIncome,
    /// Forventet inntekt.
    ExpectedIncome,
    /// Fosterhjemsgodtgjørelse.
    FosterCare,
    /// Gjenlevendepensjon.
    SurvivorPension,
    /// Introduksjonsstønad.
    IntroductionBenefit,
    /// Kvalifiseringsstønad.
    QualificationBenefit,
    /// NAV-ytelser til livsopphold.
    WelfareBenefits,
    /// Offentlig pensjon.
    PublicPension,
    /// Privat pensjon.
    PrivatePension,
    /// Sosialstønad.
    SocialAssistance,
    /// Supplerende stønad.
    SupplementaryBenefit,
    /// Uføretrygd.
    DisabilityBenefit,
    /// Avkorting på grunn av utenlandsopphold.
    ForeignStayReduction,
    /// Under minstenivå.
    BelowMinimumLevel,
    /// Synthetic deduction produced from the spouse's deductions.
    ComputedSpouseDeduction,
    /// Any other deduction.
    Other {
        /// Free-text description of the deduction.
        description: String,
    },
}

impl DeductionType {
    /// The category of this deduction type.
    pub fn category(&self) -> DeductionCategory {
        match self {
            DeductionType::AgePension => DeductionCategory::AgePension,
            DeductionType::AgreementPension => DeductionCategory::AgreementPension,
            DeductionType::AgreementPensionPrivate => DeductionCategory::AgreementPensionPrivate,
            DeductionType::Maintenance => DeductionCategory::Maintenance,
            DeductionType::CashBenefit => DeductionCategory::CashBenefit,
            DeductionType::CapitalIncome => DeductionCategory::CapitalIncome,
            DeductionType::Unemployment => DeductionCategory::Unemployment,
            DeductionType::EarnedIncome => DeductionCategory::EarnedIncome,
            DeductionType::ExpectedIncome => DeductionCategory::ExpectedIncome,
            DeductionType::FosterCare => DeductionCategory::FosterCare,
            DeductionType::SurvivorPension => DeductionCategory::SurvivorPension,
            DeductionType::IntroductionBenefit => DeductionCategory::IntroductionBenefit,
            DeductionType::QualificationBenefit => DeductionCategory::QualificationBenefit,
            DeductionType::WelfareBenefits => DeductionCategory::WelfareBenefits,
            DeductionType::PublicPension => DeductionCategory::PublicPension,
            DeductionType::PrivatePension => DeductionCategory::PrivatePension,
            DeductionType::SocialAssistance => DeductionCategory::SocialAssistance,
            DeductionType::SupplementaryBenefit => DeductionCategory::SupplementaryBenefit,
            DeductionType::DisabilityBenefit => DeductionCategory::DisabilityBenefit,
            DeductionType::ForeignStayReduction => DeductionCategory::ForeignStayReduction,
            DeductionType::BelowMinimumLevel => DeductionCategory::BelowMinimumLevel,
            DeductionType::ComputedSpouseDeduction => DeductionCategory::ComputedSpouseDeduction,
            DeductionType::Other { .. } => DeductionCategory::Other,
        }
    }

    fn description(&self) -> Option<&str> {
        match self {
            DeductionType::Other { description } => Some(description),
            _ => None,
        }
    }
}

impl PartialOrd for DeductionType {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DeductionType {
    fn cmp(&self, other: &Self) -> Ordering {
        self.category()
            .cmp(&other.category())
            .then_with(|| self.description().cmp(&other.description()))
    }
}

/// Income earned abroad, reported in its original currency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawForeignIncome")]
pub struct ForeignIncome {
    amount_in_foreign_currency: i64,
    currency: String,
    exchange_rate: Decimal,
}

#[derive(Deserialize)]
struct RawForeignIncome {
    amount_in_foreign_currency: i64,
    currency: String,
    exchange_rate: Decimal,
}

impl TryFrom<RawForeignIncome> for ForeignIncome {
    type Error = EngineError;

    fn try_from(raw: RawForeignIncome) -> Result<Self, Self::Error> {
        ForeignIncome::new(raw.amount_in_foreign_currency, raw.currency, raw.exchange_rate)
    }
}

impl ForeignIncome {
    /// Creates a foreign income entry.
    pub fn new(
        amount_in_foreign_currency: i64,
        currency: impl Into<String>,
        exchange_rate: Decimal,
    ) -> EngineResult<Self> {
        let currency = currency.into();
        if amount_in_foreign_currency < 0 {
            return Err(EngineError::InvalidDeduction {
                message: "foreign amount must not be negative".to_string(),
            });
        }
        if currency.trim().is_empty() {
            return Err(EngineError::InvalidDeduction {
                message: "foreign income requires a currency".to_string(),
            });
        }
        if exchange_rate <= Decimal::ZERO {
            return Err(EngineError::InvalidDeduction {
                message: format!("exchange rate must be positive, got {}", exchange_rate),
            });
        }
        Ok(Self {
            amount_in_foreign_currency,
            currency,
            exchange_rate,
        })
    }

    /// Amount in the foreign currency.
    pub fn amount_in_foreign_currency(&self) -> i64 {
        self.amount_in_foreign_currency
    }

    /// ISO currency code.
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Exchange rate to NOK.
    pub fn exchange_rate(&self) -> Decimal {
        self.exchange_rate
    }
}

/// A single deduction applying for every month of its period.
///
/// # Example
///
/// ```
/// use fradrag_engine::models::{DeductionRecord, DeductionType, Month, Owner, Period};
/// use rust_decimal::Decimal;
///
/// let record = DeductionRecord::new(
///     DeductionType::ExpectedIncome,
///     Decimal::new(12000, 0),
///     Period::single(Month::new(2021, 1).unwrap()),
///     Owner::Claimant,
///     None,
/// )
/// .unwrap();
/// assert!(record.is(&DeductionType::ExpectedIncome, Owner::Claimant));
///
/// let negative = DeductionRecord::new(
///     DeductionType::EarnedIncome,
///     Decimal::new(-1, 0),
///     Period::single(Month::new(2021, 1).unwrap()),
///     Owner::Claimant,
///     None,
/// );
/// assert!(negative.is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDeductionRecord")]
pub struct DeductionRecord {
    deduction_type: DeductionType,
    monthly_amount: Decimal,
    period: Period,
    owner: Owner,
    #[serde(skip_serializing_if = "Option::is_none")]
    foreign_income: Option<ForeignIncome>,
}

#[derive(Deserialize)]
struct RawDeductionRecord {
    deduction_type: DeductionType,
    monthly_amount: Decimal,
    period: Period,
    owner: Owner,
    #[serde(default)]
    foreign_income: Option<ForeignIncome>,
}

impl TryFrom<RawDeductionRecord> for DeductionRecord {
    type Error = EngineError;

    fn try_from(raw: RawDeductionRecord) -> Result<Self, Self::Error> {
        DeductionRecord::new(
            raw.deduction_type,
            raw.monthly_amount,
            raw.period,
            raw.owner,
            raw.foreign_income,
        )
    }
}

impl DeductionRecord {
    /// Creates a deduction record, rejecting negative monthly amounts.
    pub fn new(
        deduction_type: DeductionType,
        monthly_amount: Decimal,
        period: Period,
        owner: Owner,
        foreign_income: Option<ForeignIncome>,
    ) -> EngineResult<Self> {
        if monthly_amount < Decimal::ZERO {
            return Err(EngineError::InvalidDeduction {
                message: format!(
                    "monthly amount must not be negative, got {} for {:?}",
                    monthly_amount, deduction_type
                ),
            });
        }
        Ok(Self {
            deduction_type,
            monthly_amount,
            period,
            owner,
            foreign_income,
        })
    }

    /// The kind of deduction.
    pub fn deduction_type(&self) -> &DeductionType {
        &self.deduction_type
    }

    /// Amount deducted per month.
    pub fn monthly_amount(&self) -> Decimal {
        self.monthly_amount
    }

    /// The months this deduction applies to.
    pub fn period(&self) -> Period {
        self.period
    }

    /// Who the deduction belongs to.
    pub fn owner(&self) -> Owner {
        self.owner
    }

    /// Foreign income details, if the deduction stems from income abroad.
    pub fn foreign_income(&self) -> Option<&ForeignIncome> {
        self.foreign_income.as_ref()
    }

    /// The synthetic spouse deduction for one month. Callers only pass sums of
    /// non-negative amounts.
    pub(crate) fn computed_spouse_deduction(month: Month, monthly_amount: Decimal) -> Self {
        Self::synthetic(
            DeductionType::ComputedSpouseDeduction,
            month,
            monthly_amount,
            Owner::Spouse,
        )
    }

    /// The claimant deduction withholding a net amount below the minimum
    /// payout. Callers only pass positive net amounts.
    pub(crate) fn below_minimum_level(month: Month, monthly_amount: Decimal) -> Self {
        Self::synthetic(
            DeductionType::BelowMinimumLevel,
            month,
            monthly_amount,
            Owner::Claimant,
        )
    }

    fn synthetic(
        deduction_type: DeductionType,
        month: Month,
        monthly_amount: Decimal,
        owner: Owner,
    ) -> Self {
        Self {
            deduction_type,
            monthly_amount,
            period: Period::single(month),
            owner,
            foreign_income: None,
        }
    }

    /// Returns a copy of this record restricted to `period`.
    pub(crate) fn with_period(&self, period: Period) -> Self {
        Self {
            period,
            ..self.clone()
        }
    }

    /// Returns true if the record has the given type and owner.
    pub fn is(&self, deduction_type: &DeductionType, owner: Owner) -> bool {
        self.owner == owner && &self.deduction_type == deduction_type
    }

    /// Total amount over the whole period.
    pub fn total_amount(&self) -> Decimal {
        self.monthly_amount * Decimal::from(self.period.month_count())
    }
}

/// Sum of the monthly amounts of `records`.
pub fn sum_monthly(records: &[DeductionRecord]) -> Decimal {
    records.iter().map(DeductionRecord::monthly_amount).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn january() -> Period {
        Period::single(Month::new(2021, 1).unwrap())
    }

    #[test]
    fn test_zero_amount_is_allowed() {
        let record = DeductionRecord::new(
            DeductionType::SocialAssistance,
            Decimal::ZERO,
            january(),
            Owner::Spouse,
            None,
        );
        assert!(record.is_ok());
    }

    #[test]
    fn test_negative_amount_is_rejected() {
        let result = DeductionRecord::new(
            DeductionType::EarnedIncome,
            Decimal::new(-500, 0),
            january(),
            Owner::Claimant,
            None,
        );
        match result {
            Err(EngineError::InvalidDeduction { message }) => {
                assert!(message.contains("-500"));
            }
            other => panic!("Expected InvalidDeduction, got {:?}", other),
        }
    }

    #[test]
    fn test_foreign_income_validation() {
        assert!(ForeignIncome::new(1000, "SEK", Decimal::new(95, 2)).is_ok());
        assert!(ForeignIncome::new(-1, "SEK", Decimal::new(95, 2)).is_err());
        assert!(ForeignIncome::new(1000, " ", Decimal::new(95, 2)).is_err());
        assert!(ForeignIncome::new(1000, "SEK", Decimal::ZERO).is_err());
    }

    #[test]
    fn test_deduction_type_ordering_uses_category_then_description() {
        let mut types = vec![
            DeductionType::Other {
                description: "b".to_string(),
            },
            DeductionType::SocialAssistance,
            DeductionType::Other {
                description: "a".to_string(),
            },
            DeductionType::AgePension,
        ];
        types.sort();
        assert_eq!(types[0], DeductionType::AgePension);
        assert_eq!(types[1], DeductionType::SocialAssistance);
        assert_eq!(
            types[2],
            DeductionType::Other {
                description: "a".to_string()
            }
        );
    }

    #[test]
    fn test_total_amount_multiplies_by_months() {
        let period = Period::new(Month::new(2021, 1).unwrap(), Month::new(2021, 3).unwrap()).unwrap();
        let record = DeductionRecord::new(
            DeductionType::PublicPension,
            Decimal::new(1500, 0),
            period,
            Owner::Claimant,
            None,
        )
        .unwrap();
        assert_eq!(record.total_amount(), Decimal::new(4500, 0));
    }

    #[test]
    fn test_deserialization_rejects_negative_amount() {
        let json = r#"{
            "deduction_type": {"type": "earned_income"},
            "monthly_amount": "-1",
            "period": {"from": "2021-01", "to": "2021-01"},
            "owner": "claimant"
        }"#;
        assert!(serde_json::from_str::<DeductionRecord>(json).is_err());
    }

    #[test]
    fn test_deserialize_other_with_foreign_income() {
        let json = r#"{
            "deduction_type": {"type": "other", "description": "rental income"},
            "monthly_amount": "2500.50",
            "period": {"from": "2021-01", "to": "2021-06"},
            "owner": "spouse",
            "foreign_income": {
                "amount_in_foreign_currency": 3000,
                "currency": "SEK",
                "exchange_rate": "0.83"
            }
        }"#;
        let record: DeductionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.owner(), Owner::Spouse);
        assert_eq!(record.deduction_type().category(), DeductionCategory::Other);
        assert_eq!(record.foreign_income().unwrap().currency(), "SEK");
        assert_eq!(record.period().month_count(), 6);
    }
}
