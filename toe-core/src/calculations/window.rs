//! Selects the lookback window that satisfies the employment condition.
//!
//! The law asks for the minimal window reaching the required
//! eligibility-months when one exists, and otherwise the widest window the
//! cap allows. Hence the asymmetric scan: grow newest-first, stop the
//! instant the requirement is met, but when it never is, keep the best
//! total found across the whole allowed span.

use serde::{Deserialize, Serialize};

use crate::calculations::conversion::{ToeConversionResult, ToeConverter};
use crate::models::{ReviewWindow, Segment};

/// Outcome of the window selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToeWindowSelection {
    /// The chosen segment subset, newest first.
    pub segments_used: Vec<Segment>,
    /// Conversion over exactly that subset.
    pub conversion: ToeConversionResult,
    /// Calendar months the subset spans.
    pub calendar_months: u32,
    /// Whether the required eligibility-months were reached.
    pub required_met: bool,
    /// Month span of the chosen subset, `None` when nothing was selected.
    pub window: Option<ReviewWindow>,
}

/// Greedily grows the segment set backward in time until the employment
/// condition is satisfied or the calendar-month cap is hit.
///
/// `all_segments` must be ordered newest first, as [`SegmentBuilder`]
/// emits them. Returns immediately on the first subset reaching the
/// required months; otherwise returns the highest-total subset seen, ties
/// resolved toward the wider window.
///
/// [`SegmentBuilder`]: crate::calculations::SegmentBuilder
pub fn select_toe_period(
    converter: &ToeConverter<'_>,
    all_segments: &[Segment],
) -> ToeWindowSelection {
    let config = converter.config();
    let max_months = config.max_window_months;
    let required = config.required_toe_months;

    let mut subset: Vec<Segment> = Vec::new();
    let mut months_used: u32 = 0;
    let mut best: Option<(usize, u32, ToeConversionResult)> = None;

    for segment in all_segments {
        if months_used + segment.calendar_months > max_months {
            break;
        }
        subset.push(segment.clone());
        months_used += segment.calendar_months;

        let conversion = converter.convert(&subset);
        if conversion.total_toe_real >= required {
            return selection(subset, conversion, months_used, true);
        }
        let replace = match &best {
            Some((_, _, held)) => conversion.total_toe_real >= held.total_toe_real,
            None => true,
        };
        if replace {
            best = Some((subset.len(), months_used, conversion));
        }
    }

    match best {
        Some((len, months, conversion)) => {
            subset.truncate(len);
            selection(subset, conversion, months, false)
        }
        None => ToeWindowSelection {
            segments_used: Vec::new(),
            conversion: converter.convert(&[]),
            calendar_months: 0,
            required_met: false,
            window: None,
        },
    }
}

fn selection(
    segments_used: Vec<Segment>,
    conversion: ToeConversionResult,
    calendar_months: u32,
    required_met: bool,
) -> ToeWindowSelection {
    let window = match (segments_used.last(), segments_used.first()) {
        (Some(oldest), Some(newest)) => Some(ReviewWindow::new(
            Some(oldest.month),
            newest.month,
        )),
        _ => None,
    };
    ToeWindowSelection {
        segments_used,
        conversion,
        calendar_months,
        required_met,
        window,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::calculations::SegmentBuilder;
    use crate::calculations::conversion::ToeConverter;
    use crate::models::{
        IncomeRow, MonthPeriod, ReviewWindow, SubsidizedEmployers, SubsidyRule, ToeConfig,
        YearMonth,
    };

    use super::*;

    fn period(
        year: i32,
        month: u32,
        amount: Decimal,
    ) -> MonthPeriod {
        let ym = YearMonth::new(year, month).unwrap();
        MonthPeriod {
            id: ym.period_id(),
            label: ym.label(),
            rows: vec![IncomeRow {
                payment_date: None,
                income_type: "Palkka".to_string(),
                amount,
                employer: "Firma Oy".to_string(),
                earning_period: None,
                subsidized: None,
            }],
            toe_system: dec!(1.0),
            divisor_days: dec!(21.5),
            total_wage: amount,
        }
    }

    /// `count` consecutive normal-work months ending December 2025,
    /// newest first once built.
    fn months_back_from_end(
        count: usize,
        amount: Decimal,
    ) -> Vec<MonthPeriod> {
        (0..count)
            .map(|i| {
                let ordinal = (2025 * 12 + 11) - i as i32;
                period(ordinal / 12, (ordinal % 12) as u32 + 1, amount)
            })
            .collect()
    }

    fn select(
        periods: &[MonthPeriod],
    ) -> ToeWindowSelection {
        let config = ToeConfig::default();
        let employers = SubsidizedEmployers::new();
        let window = ReviewWindow::until(YearMonth::new(2025, 12).unwrap());
        let segments = SegmentBuilder::new(&config, &employers).build(periods, &window);
        let converter = ToeConverter::new(
            &config,
            &employers,
            SubsidyRule::Full,
            false,
            None,
            periods,
        );
        select_toe_period(&converter, &segments)
    }

    #[test]
    fn stops_at_the_minimal_window() {
        // 28 full-credit months available; the 12 newest already satisfy
        // the requirement, so the scan must not widen further.
        let periods = months_back_from_end(28, dec!(2000));

        let result = select(&periods);

        assert_eq!(result.segments_used.len(), 12);
        assert_eq!(result.calendar_months, 12);
        assert!(result.required_met);
        assert_eq!(result.conversion.total_toe_real, dec!(12));
    }

    #[test]
    fn falls_back_to_the_full_span_when_short() {
        // 20 half-credit months top out at 10.0; the scan exhausts the
        // supply and keeps the widest subset.
        let periods = months_back_from_end(20, dec!(500));

        let result = select(&periods);

        assert_eq!(result.segments_used.len(), 20);
        assert!(!result.required_met);
        assert_eq!(result.conversion.total_toe_real, dec!(10));
    }

    #[test]
    fn respects_the_calendar_month_cap() {
        // Four half-credit months followed by 26 below-threshold ones: 30
        // months on offer, the scan may widen to 28 at most.
        let mut periods = months_back_from_end(4, dec!(500));
        let mut older = months_back_from_end(30, dec!(100));
        older.drain(0..4);
        periods.append(&mut older);

        let result = select(&periods);

        // the scan widens to the cap and never reaches 12
        assert_eq!(result.calendar_months, 28);
        assert!(!result.required_met);
        assert_eq!(result.conversion.total_toe_real, dec!(2));
    }

    #[test]
    fn reaches_exactly_twelve_with_half_months() {
        let periods = months_back_from_end(24, dec!(500));

        let result = select(&periods);

        assert!(result.required_met);
        assert_eq!(result.segments_used.len(), 24);
        assert_eq!(result.conversion.total_toe_real, dec!(12));
    }

    #[test]
    fn empty_input_selects_nothing() {
        let result = select(&[]);

        assert_eq!(result.segments_used.len(), 0);
        assert_eq!(result.calendar_months, 0);
        assert!(!result.required_met);
        assert_eq!(result.window, None);
    }

    #[test]
    fn window_span_covers_the_subset() {
        let periods = months_back_from_end(28, dec!(2000));

        let result = select(&periods);

        let window = result.window.unwrap();
        assert_eq!(window.end, YearMonth::new(2025, 12).unwrap());
        assert_eq!(window.start, YearMonth::new(2025, 1));
    }

    #[test]
    fn no_accrual_months_only_extend_the_window() {
        // Subsidized-only months under NoAccrual never accrue, so the
        // selector widens to the cap with a zero total.
        let config = ToeConfig::default();
        let employers: SubsidizedEmployers = ["Nokia Oyj"].into_iter().collect();
        let periods: Vec<MonthPeriod> = (1..=12)
            .map(|m| {
                let ym = YearMonth::new(2025, m).unwrap();
                MonthPeriod {
                    id: ym.period_id(),
                    label: ym.label(),
                    rows: vec![IncomeRow {
                        payment_date: None,
                        income_type: "Palkka".to_string(),
                        amount: dec!(1000),
                        employer: "Nokia Oyj".to_string(),
                        earning_period: None,
                        subsidized: None,
                    }],
                    toe_system: dec!(1.0),
                    divisor_days: dec!(21.5),
                    total_wage: dec!(1000),
                }
            })
            .collect();
        let review = ReviewWindow::until(YearMonth::new(2025, 12).unwrap());
        let segments = SegmentBuilder::new(&config, &employers).build(&periods, &review);
        let converter = ToeConverter::new(
            &config,
            &employers,
            SubsidyRule::NoAccrual,
            false,
            Some(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()),
            &periods,
        );

        let result = select_toe_period(&converter, &segments);

        assert_eq!(result.segments_used.len(), 12);
        assert!(!result.required_met);
        assert_eq!(result.conversion.total_toe_real, dec!(0));
    }
}
