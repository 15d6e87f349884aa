use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::month::YearMonth;

/// One reported income line within a month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeRow {
    pub payment_date: Option<NaiveDate>,
    pub income_type: String,
    pub amount: Decimal,
    pub employer: String,
    /// Earning period the payment covers, when reported separately from
    /// the payment date.
    pub earning_period: Option<(NaiveDate, NaiveDate)>,
    /// Explicit subsidized-work marker. When present it overrides the
    /// employer-set inference.
    pub subsidized: Option<bool>,
}

/// One calendar month of reported income for a claimant.
///
/// The engine treats periods as read-only input: it derives segments and
/// correction rows from them but never mutates one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthPeriod {
    /// Stable identifier derived from the year-month, `"YYYY-MM"`.
    pub id: String,
    /// Human label, `"YYYY MonthName"` with a Finnish month name.
    pub label: String,
    pub rows: Vec<IncomeRow>,
    /// System-computed eligibility for the month, 0 / 0.5 / 1.0. This is
    /// the uncorrected figure the correction is measured against.
    pub toe_system: Decimal,
    /// Divisor days used for wage-rate conversion, typically 21.5 for a
    /// full month.
    pub divisor_days: Decimal,
    /// Cached gross total for the month. Callers keep this equal to the
    /// sum of `rows` amounts; the engine reads it as-is.
    pub total_wage: Decimal,
}

impl MonthPeriod {
    /// The calendar month this period covers, parsed from the label.
    ///
    /// `None` for an unparseable label; such periods fall outside every
    /// review window and drop out of segment building.
    pub fn month(&self) -> Option<YearMonth> {
        YearMonth::from_period_label(&self.label)
    }
}
