//! Groups monthly income periods into computation segments.
//!
//! A segment is one calendar month's income split into a normal-work and a
//! subsidized-work side. The split drives the whole correction: eligibility
//! thresholds are applied to each side's sum separately, never to the
//! combined total — a month whose sides alone stay under a threshold must
//! not earn credit just because the mixed total crosses it.

use rust_decimal::Decimal;
use tracing::warn;

use crate::calculations::common::toe_value_from_salary;
use crate::models::{
    IncomeRow, MonthPeriod, ReviewWindow, Segment, SegmentKind, SubsidizedEmployers, ToeConfig,
    YearMonth,
};

/// Wage totals of one month, split by work kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowSplit {
    pub wage_normal: Decimal,
    pub wage_subsidized: Decimal,
    pub has_normal_rows: bool,
    pub has_subsidized_rows: bool,
}

/// Partitions income rows into normal and subsidized sides.
///
/// A row's explicit `subsidized` marker wins; without one, membership of
/// the employer in the caller-supplied set decides.
pub fn split_rows(
    rows: &[IncomeRow],
    employers: &SubsidizedEmployers,
) -> RowSplit {
    let mut split = RowSplit {
        wage_normal: Decimal::ZERO,
        wage_subsidized: Decimal::ZERO,
        has_normal_rows: false,
        has_subsidized_rows: false,
    };
    for row in rows {
        let subsidized = row
            .subsidized
            .unwrap_or_else(|| employers.contains(&row.employer));
        if subsidized {
            split.wage_subsidized += row.amount;
            split.has_subsidized_rows = true;
        } else {
            split.wage_normal += row.amount;
            split.has_normal_rows = true;
        }
    }
    split
}

/// Builds the segment list a conversion runs over.
#[derive(Debug, Clone)]
pub struct SegmentBuilder<'a> {
    config: &'a ToeConfig,
    employers: &'a SubsidizedEmployers,
}

impl<'a> SegmentBuilder<'a> {
    pub fn new(
        config: &'a ToeConfig,
        employers: &'a SubsidizedEmployers,
    ) -> Self {
        Self { config, employers }
    }

    /// Emits one segment per period inside the review window, newest month
    /// first.
    ///
    /// Periods whose label does not parse to a calendar month are outside
    /// every window and are skipped with a warning.
    pub fn build(
        &self,
        periods: &[MonthPeriod],
        window: &ReviewWindow,
    ) -> Vec<Segment> {
        let mut dated: Vec<(&MonthPeriod, YearMonth)> = Vec::new();
        for period in periods {
            match period.month() {
                Some(month) if window.contains(month) => dated.push((period, month)),
                Some(_) => {}
                None => {
                    warn!(
                        period_id = %period.id,
                        label = %period.label,
                        "period label does not parse to a calendar month; excluded"
                    );
                }
            }
        }
        dated.sort_by(|a, b| b.1.cmp(&a.1));

        dated
            .into_iter()
            .map(|(period, month)| self.segment_for(period, month))
            .collect()
    }

    /// Builds the segment of a single period.
    pub(crate) fn segment_for(
        &self,
        period: &MonthPeriod,
        month: YearMonth,
    ) -> Segment {
        let split = split_rows(&period.rows, self.employers);
        let kind = if split.has_subsidized_rows && !split.has_normal_rows {
            SegmentKind::SubsidyOnly
        } else {
            SegmentKind::Common
        };
        Segment {
            id: period.id.clone(),
            month,
            kind,
            calendar_months: 1,
            toe_normal_system: toe_value_from_salary(split.wage_normal, self.config),
            toe_subsidized_system: toe_value_from_salary(split.wage_subsidized, self.config),
            wage_normal_total: split.wage_normal,
            wage_subsidized_total: split.wage_subsidized,
            period_ids: vec![period.id.clone()],
            include_in_toe: true,
            include_in_wage: true,
        }
    }
}
