use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::month::YearMonth;

/// How a month's income divides between normal and subsidized work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentKind {
    /// Normal work present (possibly alongside subsidized work). Months
    /// with only normal work are `Common` too, with a zero subsidized side.
    Common,
    /// Only subsidized work in the month.
    SubsidyOnly,
}

/// The engine's unit of computation: one calendar month's income split
/// into normal-work and subsidized-work totals.
///
/// Segments are rebuilt from scratch on every recomputation and never
/// persisted or mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub id: String,
    pub month: YearMonth,
    pub kind: SegmentKind,
    /// Calendar months covered. Always 1 today; reserved for multi-month
    /// segments.
    pub calendar_months: u32,
    /// System-computed eligibility of the normal side, in {0, 0.5, 1.0}.
    pub toe_normal_system: Decimal,
    /// System-computed eligibility of the subsidized side, in {0, 0.5, 1.0}.
    pub toe_subsidized_system: Decimal,
    pub wage_normal_total: Decimal,
    pub wage_subsidized_total: Decimal,
    /// Underlying period ids, exactly one today.
    pub period_ids: Vec<String>,
    /// Manual override: exclude the segment from eligibility counting.
    pub include_in_toe: bool,
    /// Manual override: exclude the segment from the wage base.
    pub include_in_wage: bool,
}

impl Segment {
    /// Upper bound on the month's converted eligibility, as a decimal.
    pub fn calendar_months_toe(&self) -> Decimal {
        Decimal::from(self.calendar_months)
    }
}
