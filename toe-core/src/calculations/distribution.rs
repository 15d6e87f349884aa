//! Re-expands segment-level conversion results onto the underlying
//! periods for before/after display.
//!
//! Each row carries the system figures and the corrected figures for the
//! normal and subsidized sides separately, so a table can show what the
//! correction changed. Temporary segments — months the lockout numbering
//! pulled in from outside the selected window — appear as rows flagged
//! out-of-window.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::calculations::conversion::ToeConversionResult;
use crate::models::{MonthPeriod, YearMonth};

/// One display row per period touched by a conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodToeRow {
    pub period_id: String,
    pub label: String,
    pub month: YearMonth,
    /// System-computed eligibility of the whole month, uncorrected.
    pub toe_system_total: Decimal,
    pub toe_normal_system: Decimal,
    pub toe_subsidized_system: Decimal,
    pub wage_normal: Decimal,
    pub wage_subsidized: Decimal,
    pub toe_normal_accepted: Decimal,
    /// Converted subsidized credit for display. Zero under the
    /// aggregate-level rules, whose true value lives on the conversion
    /// result.
    pub toe_subsidized_converted: Decimal,
    /// Corrected month total, capped at one calendar month.
    pub toe_corrected_total: Decimal,
    pub subsidized_position: Option<u32>,
    /// False for months the conversion only pulled in to keep the
    /// chronological numbering correct.
    pub in_selected_window: bool,
}

/// Maps segment-level results back onto individual periods, newest first.
///
/// `periods` must contain every period the conversion touched, including
/// the out-of-window months behind temporary segments; rows whose period
/// cannot be found are dropped with a warning.
pub fn distribute_corrected_toe(
    conversion: &ToeConversionResult,
    periods: &[MonthPeriod],
) -> Vec<PeriodToeRow> {
    let mut rows: Vec<PeriodToeRow> = Vec::with_capacity(conversion.segments.len());

    for converted in &conversion.segments {
        let Some(period_id) = converted.segment.period_ids.first() else {
            continue;
        };
        let Some(period) = periods.iter().find(|p| &p.id == period_id) else {
            warn!(period_id = %period_id, "conversion references an unknown period; row dropped");
            continue;
        };
        rows.push(PeriodToeRow {
            period_id: period.id.clone(),
            label: period.label.clone(),
            month: converted.segment.month,
            toe_system_total: period.toe_system,
            toe_normal_system: converted.segment.toe_normal_system,
            toe_subsidized_system: converted.segment.toe_subsidized_system,
            wage_normal: converted.segment.wage_normal_total,
            wage_subsidized: converted.segment.wage_subsidized_total,
            toe_normal_accepted: converted.toe_normal_accepted,
            toe_subsidized_converted: converted.toe_subsidized_converted,
            toe_corrected_total: converted
                .toe_total
                .min(converted.segment.calendar_months_toe()),
            subsidized_position: converted.subsidized_position,
            in_selected_window: !converted.temporary,
        });
    }

    rows.sort_by(|a, b| b.month.cmp(&a.month));
    rows
}
