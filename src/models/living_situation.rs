//! Household situation (bosituasjon) of a claimant.
//!
//! The living situation decides both which deduction strategy applies and
//! whether the claimant receives the ordinary or the high full rate.

use serde::{Deserialize, Serialize};

use crate::calculation::{DeductionStrategy, Household};
use crate::config::RateCategory;

/// Which benefit branch the claimant belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimantKind {
    /// Claimant receiving supplementary benefit on the basis of disability.
    Disability,
    /// Claimant receiving supplementary benefit on the basis of age.
    Age,
}

/// The claimant's household situation for a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LivingSituation {
    /// Lives alone.
    Alone,
    /// Shares a home with an adult child or another adult who is not a spouse.
    SharesHomeWithAdult,
    /// Cohabiting spouse or partner aged 67 or older.
    SpouseOver67,
    /// Cohabiting spouse or partner under 67 who is a disabled refugee.
    SpouseUnder67DisabledRefugee,
    /// Cohabiting spouse or partner under 67 who is not a disabled refugee.
    SpouseUnder67NotDisabledRefugee,
}

impl LivingSituation {
    /// Returns true if the claimant cohabits with a spouse or partner.
    pub fn has_spouse(&self) -> bool {
        !matches!(
            self,
            LivingSituation::Alone | LivingSituation::SharesHomeWithAdult
        )
    }

    /// Returns true if the claimant is entitled to the high full rate.
    pub fn is_high_rate(&self) -> bool {
        matches!(
            self,
            LivingSituation::Alone | LivingSituation::SpouseUnder67NotDisabledRefugee
        )
    }

    /// The household variant used to select a deduction strategy.
    pub fn household(&self) -> Household {
        match self {
            LivingSituation::Alone | LivingSituation::SharesHomeWithAdult => Household::Single,
            LivingSituation::SpouseOver67 => Household::SpouseOver67,
            LivingSituation::SpouseUnder67DisabledRefugee => {
                Household::SpouseUnder67DisabledRefugee
            }
            LivingSituation::SpouseUnder67NotDisabledRefugee => Household::SpouseUnder67,
        }
    }

    /// The deduction strategy for a claimant of `kind` in this situation.
    ///
    /// # Example
    ///
    /// ```
    /// use fradrag_engine::calculation::{DeductionStrategy, Household};
    /// use fradrag_engine::models::{ClaimantKind, LivingSituation};
    ///
    /// assert_eq!(
    ///     LivingSituation::SpouseOver67.strategy(ClaimantKind::Disability),
    ///     DeductionStrategy::Disability(Household::SpouseOver67),
    /// );
    /// ```
    pub fn strategy(&self, kind: ClaimantKind) -> DeductionStrategy {
        match kind {
            ClaimantKind::Disability => DeductionStrategy::Disability(self.household()),
            ClaimantKind::Age => DeductionStrategy::Age(self.household()),
        }
    }

    /// The full-rate category for a claimant of `kind` in this situation.
    pub fn rate_category(&self, kind: ClaimantKind) -> RateCategory {
        match (kind, self.is_high_rate()) {
            (ClaimantKind::Disability, true) => RateCategory::HighDisabled,
            (ClaimantKind::Disability, false) => RateCategory::OrdinaryDisabled,
            (ClaimantKind::Age, true) => RateCategory::HighAge,
            (ClaimantKind::Age, false) => RateCategory::OrdinaryAge,
        }
    }
}
