//! Converts subsidized-work eligibility into accepted credit under the
//! legal rules.
//!
//! Normal work is never discounted. Subsidized work converts by rule:
//! nothing at all (`NoAccrual`), 75% per month or on the aggregate
//! (`Percent75`), or a 10-month lockout followed by 75% on the aggregate
//! (`LockoutThenPercent75`). The two percentage rules convert and floor at
//! the aggregate level, so the true converted value exists only in
//! [`ToeConversionResult::total_subsidized_converted`]; the per-segment
//! figures under those rules are display placeholders and must not be
//! summed.
//!
//! The lockout count is anchored to the employment start date, which may
//! precede the review window. The converter therefore reaches into the
//! full period list it was handed and synthesizes temporary segments for
//! out-of-window months so the chronological numbering stays correct.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use toe_core::calculations::{SegmentBuilder, ToeConverter};
//! use toe_core::models::{
//!     IncomeRow, MonthPeriod, ReviewWindow, SubsidizedEmployers, SubsidyRule, ToeConfig,
//!     YearMonth,
//! };
//!
//! let config = ToeConfig::default();
//! let employers: SubsidizedEmployers = ["Nokia Oyj"].into_iter().collect();
//! let periods = vec![MonthPeriod {
//!     id: "2025-01".to_string(),
//!     label: "2025 tammikuu".to_string(),
//!     rows: vec![IncomeRow {
//!         payment_date: None,
//!         income_type: "Palkka".to_string(),
//!         amount: dec!(1000),
//!         employer: "Nokia Oyj".to_string(),
//!         earning_period: None,
//!         subsidized: None,
//!     }],
//!     toe_system: dec!(1.0),
//!     divisor_days: dec!(21.5),
//!     total_wage: dec!(1000),
//! }];
//!
//! let window = ReviewWindow::until(YearMonth::new(2025, 6).unwrap());
//! let segments = SegmentBuilder::new(&config, &employers).build(&periods, &window);
//! let converter = ToeConverter::new(
//!     &config,
//!     &employers,
//!     SubsidyRule::Percent75,
//!     false,
//!     None,
//!     &periods,
//! );
//!
//! let result = converter.convert(&segments);
//! // 1.0 subsidized month x 0.75 = 0.75, rounded down to the half step
//! assert_eq!(result.segments[0].toe_subsidized_converted, dec!(0.75));
//! assert_eq!(result.total_toe_real, dec!(0.5));
//! ```

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::calculations::common::round_toe_months_down;
use crate::calculations::segments::{SegmentBuilder, split_rows};
use crate::models::{
    MonthPeriod, Segment, SubsidizedEmployers, SubsidyRule, ToeConfig, YearMonth,
};

/// One segment with its accepted and converted eligibility attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertedSegment {
    pub segment: Segment,
    /// Normal-work eligibility accepted for the month, capped at the
    /// month count.
    pub toe_normal_accepted: Decimal,
    /// Subsidized eligibility converted for the month. Under the
    /// aggregate-level rules this is a display placeholder of zero.
    pub toe_subsidized_converted: Decimal,
    /// Month total, never above `calendar_months`.
    pub toe_total: Decimal,
    /// 1-based chronological position in the subsidized-month sequence,
    /// when the rule numbers them.
    pub subsidized_position: Option<u32>,
    /// Synthesized for a month outside the provided segment set, present
    /// only to keep the chronological numbering correct.
    pub temporary: bool,
}

/// Output of one conversion run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToeConversionResult {
    /// Augmented segments: the provided ones first (input order), then any
    /// temporary out-of-window segments, newest first.
    pub segments: Vec<ConvertedSegment>,
    /// Corrected eligibility total, rounded down to the half step.
    pub total_toe_real: Decimal,
    /// Aggregate-level converted subsidized credit, present for the rules
    /// that sum-then-floor across months. The per-segment display values
    /// deliberately do not add up to this.
    pub total_subsidized_converted: Option<Decimal>,
}

impl ToeConversionResult {
    fn empty() -> Self {
        Self {
            segments: Vec::new(),
            total_toe_real: Decimal::ZERO,
            total_subsidized_converted: None,
        }
    }
}

/// Rules engine for one correction pass.
///
/// `all_periods` is the full period list, not just the review window: the
/// chronological sequence of the lockout rule is anchored to the
/// employment start date and must keep counting through months the window
/// left out.
#[derive(Debug, Clone)]
pub struct ToeConverter<'a> {
    config: &'a ToeConfig,
    employers: &'a SubsidizedEmployers,
    rule: SubsidyRule,
    exception_subsidy: bool,
    employment_start: Option<NaiveDate>,
    all_periods: &'a [MonthPeriod],
}

impl<'a> ToeConverter<'a> {
    pub fn new(
        config: &'a ToeConfig,
        employers: &'a SubsidizedEmployers,
        rule: SubsidyRule,
        exception_subsidy: bool,
        employment_start: Option<NaiveDate>,
        all_periods: &'a [MonthPeriod],
    ) -> Self {
        Self {
            config,
            employers,
            rule,
            exception_subsidy,
            employment_start,
            all_periods,
        }
    }

    pub fn config(&self) -> &ToeConfig {
        self.config
    }

    pub fn rule(&self) -> SubsidyRule {
        self.rule
    }

    /// Converts the given segments under the configured rule.
    ///
    /// Segments with `include_in_toe == false` are skipped entirely: they
    /// contribute to neither the per-segment rows nor any total.
    pub fn convert(
        &self,
        segments: &[Segment],
    ) -> ToeConversionResult {
        let active: Vec<&Segment> = segments.iter().filter(|s| s.include_in_toe).collect();
        if active.is_empty() {
            return ToeConversionResult::empty();
        }

        match self.rule {
            SubsidyRule::NoAccrual => self.convert_per_segment(&active, Decimal::ZERO),
            SubsidyRule::Full => {
                let factor = if self.exception_subsidy {
                    self.config.subsidized_credit_factor
                } else {
                    Decimal::ONE
                };
                self.convert_per_segment(&active, factor)
            }
            SubsidyRule::Percent75 => match self.start_month() {
                Some(start) => self.convert_aggregate_percent(&active, start),
                None => {
                    // Legacy path: without an employment start the 75%
                    // discount applies month by month.
                    self.convert_per_segment(&active, self.config.subsidized_credit_factor)
                }
            },
            SubsidyRule::LockoutThenPercent75 => self.convert_lockout(&active),
        }
    }

    fn start_month(&self) -> Option<YearMonth> {
        self.employment_start.map(YearMonth::of)
    }

    /// Accepted normal eligibility: never discounted, capped at the month
    /// count.
    fn normal_accepted(segment: &Segment) -> Decimal {
        segment.toe_normal_system.min(segment.calendar_months_toe())
    }

    /// Straight per-month conversion: subsidized eligibility times a
    /// factor, then the one-month cap.
    fn convert_per_segment(
        &self,
        active: &[&Segment],
        factor: Decimal,
    ) -> ToeConversionResult {
        let mut converted = Vec::with_capacity(active.len());
        let mut total = Decimal::ZERO;
        for segment in active {
            let normal = Self::normal_accepted(segment);
            let subsidized = segment.toe_subsidized_system * factor;
            let capped = (normal + subsidized).min(segment.calendar_months_toe());
            total += capped;
            converted.push(ConvertedSegment {
                segment: (*segment).clone(),
                toe_normal_accepted: normal,
                toe_subsidized_converted: subsidized,
                toe_total: capped,
                subsidized_position: None,
                temporary: false,
            });
        }
        ToeConversionResult {
            segments: converted,
            total_toe_real: round_toe_months_down(total),
            total_subsidized_converted: None,
        }
    }

    /// `Percent75` with an employment start: pool the qualifying months'
    /// subsidized eligibility, convert and floor once at the aggregate.
    fn convert_aggregate_percent(
        &self,
        active: &[&Segment],
        start: YearMonth,
    ) -> ToeConversionResult {
        let mut pooled = Decimal::ZERO;
        let mut normal_sum = Decimal::ZERO;
        let mut converted = Vec::with_capacity(active.len());
        for segment in active {
            let normal = Self::normal_accepted(segment);
            normal_sum += normal;
            if segment.month >= start {
                pooled += segment.toe_subsidized_system;
            }
            converted.push(ConvertedSegment {
                segment: (*segment).clone(),
                toe_normal_accepted: normal,
                toe_subsidized_converted: Decimal::ZERO,
                toe_total: normal.min(segment.calendar_months_toe()),
                subsidized_position: None,
                temporary: false,
            });
        }
        let aggregate = (pooled * self.config.subsidized_credit_factor).floor();
        ToeConversionResult {
            segments: converted,
            total_toe_real: round_toe_months_down(normal_sum + aggregate),
            total_subsidized_converted: Some(aggregate),
        }
    }

    /// `LockoutThenPercent75`: number every subsidized month from the
    /// employment start, zero the first `lockout_months`, pool the rest.
    fn convert_lockout(
        &self,
        active: &[&Segment],
    ) -> ToeConversionResult {
        let sequence = self.subsidized_sequence(active);

        let lockout = self.config.lockout_months;
        let mut pooled = Decimal::ZERO;
        let mut positions: Vec<(SequenceSource, u32)> = Vec::new();
        for (index, entry) in sequence.into_iter().enumerate() {
            let position = index as u32 + 1;
            if position > lockout {
                pooled += entry.toe_subsidized;
            }
            positions.push((entry.source, position));
        }
        let aggregate = (pooled * self.config.subsidized_credit_factor).floor();

        let mut position_by_period: std::collections::HashMap<String, u32> =
            std::collections::HashMap::new();
        let mut temporaries: Vec<ConvertedSegment> = Vec::new();
        for (source, position) in positions {
            match source {
                SequenceSource::Window(period_id) => {
                    position_by_period.insert(period_id, position);
                }
                SequenceSource::Outside(segment) => {
                    temporaries.push(ConvertedSegment {
                        segment,
                        toe_normal_accepted: Decimal::ZERO,
                        toe_subsidized_converted: Decimal::ZERO,
                        toe_total: Decimal::ZERO,
                        subsidized_position: Some(position),
                        temporary: true,
                    });
                }
            }
        }
        temporaries.sort_by(|a, b| b.segment.month.cmp(&a.segment.month));

        let mut normal_sum = Decimal::ZERO;
        let mut converted = Vec::with_capacity(active.len() + temporaries.len());
        for segment in active {
            let normal = Self::normal_accepted(segment);
            normal_sum += normal;
            let position = segment
                .period_ids
                .first()
                .and_then(|id| position_by_period.get(id).copied());
            converted.push(ConvertedSegment {
                segment: (*segment).clone(),
                toe_normal_accepted: normal,
                toe_subsidized_converted: Decimal::ZERO,
                toe_total: normal.min(segment.calendar_months_toe()),
                subsidized_position: position,
                temporary: false,
            });
        }
        converted.extend(temporaries);

        ToeConversionResult {
            segments: converted,
            total_toe_real: round_toe_months_down(normal_sum + aggregate),
            total_subsidized_converted: Some(aggregate),
        }
    }

    /// Chronological subsidized-month sequence, oldest first.
    ///
    /// With an employment start the sequence spans every period on/after
    /// the start month that carries subsidized wages, whether or not it is
    /// inside the provided segment set; months outside the set become
    /// temporary segments. Without a start date the count degrades to the
    /// provided segments alone, anchored at the review-window boundary —
    /// an approximation, not the statutory anchor.
    fn subsidized_sequence(
        &self,
        active: &[&Segment],
    ) -> Vec<SequenceEntry> {
        let mut entries: Vec<SequenceEntry> = Vec::new();

        match self.start_month() {
            Some(start) => {
                let in_window: std::collections::HashSet<&str> = active
                    .iter()
                    .filter_map(|s| s.period_ids.first().map(String::as_str))
                    .collect();
                for segment in active {
                    if segment.month >= start && segment.wage_subsidized_total > Decimal::ZERO {
                        entries.push(SequenceEntry {
                            month: segment.month,
                            toe_subsidized: segment.toe_subsidized_system,
                            source: SequenceSource::Window(
                                segment.period_ids.first().cloned().unwrap_or_default(),
                            ),
                        });
                    }
                }
                let builder = SegmentBuilder::new(self.config, self.employers);
                for period in self.all_periods {
                    if in_window.contains(period.id.as_str()) {
                        continue;
                    }
                    let Some(month) = period.month() else {
                        continue;
                    };
                    if month < start {
                        continue;
                    }
                    let split = split_rows(&period.rows, self.employers);
                    if split.wage_subsidized <= Decimal::ZERO {
                        continue;
                    }
                    let segment = builder.segment_for(period, month);
                    entries.push(SequenceEntry {
                        month,
                        toe_subsidized: segment.toe_subsidized_system,
                        source: SequenceSource::Outside(segment),
                    });
                }
            }
            None => {
                warn!(
                    rule = self.rule.as_str(),
                    "no employment start date; counting subsidized months from the \
                     review window boundary instead"
                );
                for segment in active {
                    if segment.wage_subsidized_total > Decimal::ZERO {
                        entries.push(SequenceEntry {
                            month: segment.month,
                            toe_subsidized: segment.toe_subsidized_system,
                            source: SequenceSource::Window(
                                segment.period_ids.first().cloned().unwrap_or_default(),
                            ),
                        });
                    }
                }
            }
        }

        entries.sort_by(|a, b| a.month.cmp(&b.month));
        entries
    }
}

struct SequenceEntry {
    month: YearMonth,
    toe_subsidized: Decimal,
    source: SequenceSource,
}

enum SequenceSource {
    /// Subsidized month already present in the provided segment set,
    /// keyed by period id.
    Window(String),
    /// Subsidized month outside the provided set; carries its synthesized
    /// temporary segment.
    Outside(Segment),
}
