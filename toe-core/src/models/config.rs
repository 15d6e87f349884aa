use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors for configuration values outside their legal range.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToeConfigError {
    #[error("full-credit wage minimum must be positive, got {0}")]
    InvalidFullCreditWageMin(Decimal),

    #[error("half-credit wage minimum must be positive and below the full-credit minimum, got {0}")]
    InvalidHalfCreditWageMin(Decimal),

    #[error("subsidized credit factor must be between 0 and 1, got {0}")]
    InvalidSubsidizedCreditFactor(Decimal),

    #[error("required eligibility months must be positive, got {0}")]
    InvalidRequiredToeMonths(Decimal),

    #[error("maximum window of {0} months cannot be zero")]
    InvalidMaxWindowMonths(u32),

    #[error("full-month divisor must be positive, got {0}")]
    InvalidFullMonthDivisor(Decimal),
}

/// Statutory constants of the employment-condition correction.
///
/// The defaults carry the current legal values; a caller loading a future
/// rule revision constructs its own and validates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToeConfig {
    /// Monthly gross at or above which a month earns a full
    /// eligibility-month (930 EUR).
    pub full_credit_wage_min: Decimal,
    /// Monthly gross at or above which a month earns half an
    /// eligibility-month (465 EUR).
    pub half_credit_wage_min: Decimal,
    /// Credit factor applied to subsidized-work eligibility (0.75).
    pub subsidized_credit_factor: Decimal,
    /// Chronological subsidized months earning nothing under the lockout
    /// rule (10).
    pub lockout_months: u32,
    /// Eligibility-months required to satisfy the employment condition (12).
    pub required_toe_months: Decimal,
    /// Maximum calendar-month span of the lookback window (28).
    pub max_window_months: u32,
    /// Divisor days representing a full month in wage-rate conversion (21.5).
    pub full_month_divisor: Decimal,
}

impl Default for ToeConfig {
    fn default() -> Self {
        Self {
            full_credit_wage_min: Decimal::new(930, 0),
            half_credit_wage_min: Decimal::new(465, 0),
            subsidized_credit_factor: Decimal::new(75, 2),
            lockout_months: 10,
            required_toe_months: Decimal::new(12, 0),
            max_window_months: 28,
            full_month_divisor: Decimal::new(215, 1),
        }
    }
}

impl ToeConfig {
    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`ToeConfigError`] if:
    /// - either wage threshold is not positive, or the half-credit
    ///   threshold is not below the full-credit one
    /// - `subsidized_credit_factor` is not in [0, 1]
    /// - `required_toe_months` is not positive
    /// - `max_window_months` is zero
    /// - `full_month_divisor` is not positive
    pub fn validate(&self) -> Result<(), ToeConfigError> {
        if self.full_credit_wage_min <= Decimal::ZERO {
            return Err(ToeConfigError::InvalidFullCreditWageMin(
                self.full_credit_wage_min,
            ));
        }
        if self.half_credit_wage_min <= Decimal::ZERO
            || self.half_credit_wage_min >= self.full_credit_wage_min
        {
            return Err(ToeConfigError::InvalidHalfCreditWageMin(
                self.half_credit_wage_min,
            ));
        }
        if self.subsidized_credit_factor < Decimal::ZERO
            || self.subsidized_credit_factor > Decimal::ONE
        {
            return Err(ToeConfigError::InvalidSubsidizedCreditFactor(
                self.subsidized_credit_factor,
            ));
        }
        if self.required_toe_months <= Decimal::ZERO {
            return Err(ToeConfigError::InvalidRequiredToeMonths(
                self.required_toe_months,
            ));
        }
        if self.max_window_months == 0 {
            return Err(ToeConfigError::InvalidMaxWindowMonths(
                self.max_window_months,
            ));
        }
        if self.full_month_divisor <= Decimal::ZERO {
            return Err(ToeConfigError::InvalidFullMonthDivisor(
                self.full_month_divisor,
            ));
        }
        Ok(())
    }
}

/// Employer names whose wages count as subsidized work when a row carries
/// no explicit marker.
///
/// Always passed in by the caller; the engine holds no employer state of
/// its own, so independent call sites cannot drift apart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsidizedEmployers(HashSet<String>);

impl SubsidizedEmployers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(
        &self,
        employer: &str,
    ) -> bool {
        self.0.contains(employer)
    }

    pub fn insert(
        &mut self,
        employer: impl Into<String>,
    ) {
        self.0.insert(employer.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for SubsidizedEmployers {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(ToeConfig::default().validate(), Ok(()));
    }

    #[test]
    fn default_config_carries_statutory_values() {
        let config = ToeConfig::default();
        assert_eq!(config.full_credit_wage_min, dec!(930));
        assert_eq!(config.half_credit_wage_min, dec!(465));
        assert_eq!(config.subsidized_credit_factor, dec!(0.75));
        assert_eq!(config.lockout_months, 10);
        assert_eq!(config.required_toe_months, dec!(12));
        assert_eq!(config.max_window_months, 28);
        assert_eq!(config.full_month_divisor, dec!(21.5));
    }

    #[test]
    fn rejects_half_threshold_at_or_above_full() {
        let mut config = ToeConfig::default();
        config.half_credit_wage_min = dec!(930);

        assert_eq!(
            config.validate(),
            Err(ToeConfigError::InvalidHalfCreditWageMin(dec!(930)))
        );
    }

    #[test]
    fn rejects_factor_above_one() {
        let mut config = ToeConfig::default();
        config.subsidized_credit_factor = dec!(1.5);

        assert_eq!(
            config.validate(),
            Err(ToeConfigError::InvalidSubsidizedCreditFactor(dec!(1.5)))
        );
    }

    #[test]
    fn rejects_zero_divisor() {
        let mut config = ToeConfig::default();
        config.full_month_divisor = dec!(0);

        assert_eq!(
            config.validate(),
            Err(ToeConfigError::InvalidFullMonthDivisor(dec!(0)))
        );
    }

    #[test]
    fn employer_set_membership() {
        let employers: SubsidizedEmployers = ["Nokia Oyj"].into_iter().collect();
        assert!(employers.contains("Nokia Oyj"));
        assert!(!employers.contains("Firma Oy"));
    }
}
