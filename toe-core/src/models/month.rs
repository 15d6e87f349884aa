//! Calendar-month arithmetic and the Finnish-locale date formats that cross
//! the engine boundary.
//!
//! Reported income arrives keyed by period labels of the form
//! `"YYYY MonthName"` with Finnish month names (`"2025 tammikuu"`), and
//! day-precision dates arrive as `DD.MM.YYYY` strings. Both parsers are
//! lenient: malformed input yields `None` and the caller excludes the
//! record, it never aborts a computation.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Finnish month names, January first. Index = month number - 1.
const FINNISH_MONTHS: [&str; 12] = [
    "tammikuu",
    "helmikuu",
    "maaliskuu",
    "huhtikuu",
    "toukokuu",
    "kesäkuu",
    "heinäkuu",
    "elokuu",
    "syyskuu",
    "lokakuu",
    "marraskuu",
    "joulukuu",
];

/// One calendar month, the granularity the whole engine works at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    /// Returns `None` when `month` is outside `1..=12`.
    pub fn new(
        year: i32,
        month: u32,
    ) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// Parses a `"YYYY MonthName"` period label with a Finnish month name.
    ///
    /// Matching is case-insensitive. Any malformed label yields `None`.
    ///
    /// # Example
    ///
    /// ```
    /// use toe_core::YearMonth;
    ///
    /// let m = YearMonth::from_period_label("2025 tammikuu").unwrap();
    /// assert_eq!((m.year, m.month), (2025, 1));
    /// assert_eq!(YearMonth::from_period_label("tammikuu 2025"), None);
    /// ```
    pub fn from_period_label(label: &str) -> Option<Self> {
        let mut parts = label.split_whitespace();
        let year: i32 = parts.next()?.parse().ok()?;
        let name = parts.next()?;
        if parts.next().is_some() {
            return None;
        }
        let lowered = name.to_lowercase();
        let month = FINNISH_MONTHS.iter().position(|m| *m == lowered)? as u32 + 1;
        Self::new(year, month)
    }

    /// Formats back to the `"YYYY MonthName"` label shape.
    pub fn label(&self) -> String {
        format!("{} {}", self.year, FINNISH_MONTHS[(self.month - 1) as usize])
    }

    /// Stable period identifier, `"YYYY-MM"`.
    pub fn period_id(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    /// Month index on a single linear axis, for span arithmetic.
    pub fn ordinal(&self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }

    /// First day of the month.
    pub fn first_day(&self) -> NaiveDate {
        // month is validated at construction, so this cannot fail
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .unwrap_or(NaiveDate::MIN)
    }

    /// The month a given calendar date falls in.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Whether `date` falls within this calendar month.
    pub fn contains(
        &self,
        date: NaiveDate,
    ) -> bool {
        Self::of(date) == *self
    }

    /// The following calendar month.
    pub fn succ(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

/// Parses a Finnish-locale `DD.MM.YYYY` date string.
///
/// Returns `None` for malformed input rather than failing the caller.
pub fn parse_finnish_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%d.%m.%Y").ok()
}

/// Formats a date in the Finnish `DD.MM.YYYY` shape.
pub fn format_finnish_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

/// The review window segments are built over.
///
/// `start = None` means the lookback is unbounded; `end` is inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewWindow {
    pub start: Option<YearMonth>,
    pub end: YearMonth,
}

impl ReviewWindow {
    pub fn new(
        start: Option<YearMonth>,
        end: YearMonth,
    ) -> Self {
        Self { start, end }
    }

    /// Window with no lower bound.
    pub fn until(end: YearMonth) -> Self {
        Self { start: None, end }
    }

    pub fn contains(
        &self,
        month: YearMonth,
    ) -> bool {
        month <= self.end && self.start.is_none_or(|s| month >= s)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parses_label_for_every_month() {
        for (i, name) in FINNISH_MONTHS.iter().enumerate() {
            let label = format!("2025 {name}");
            let m = YearMonth::from_period_label(&label).unwrap();
            assert_eq!(m.year, 2025);
            assert_eq!(m.month, i as u32 + 1);
        }
    }

    #[test]
    fn label_parsing_is_case_insensitive() {
        let m = YearMonth::from_period_label("2024 Tammikuu").unwrap();
        assert_eq!(m, YearMonth::new(2024, 1).unwrap());
    }

    #[test]
    fn rejects_malformed_labels() {
        assert_eq!(YearMonth::from_period_label(""), None);
        assert_eq!(YearMonth::from_period_label("2025"), None);
        assert_eq!(YearMonth::from_period_label("2025 january"), None);
        assert_eq!(YearMonth::from_period_label("kuu 2025"), None);
        assert_eq!(YearMonth::from_period_label("2025 tammikuu extra"), None);
    }

    #[test]
    fn label_round_trips() {
        let m = YearMonth::new(2024, 6).unwrap();
        assert_eq!(YearMonth::from_period_label(&m.label()), Some(m));
    }

    #[test]
    fn ordering_is_chronological() {
        let dec_2024 = YearMonth::new(2024, 12).unwrap();
        let jan_2025 = YearMonth::new(2025, 1).unwrap();
        assert!(dec_2024 < jan_2025);
        assert_eq!(jan_2025.ordinal() - dec_2024.ordinal(), 1);
    }

    #[test]
    fn succ_rolls_over_year_boundary() {
        let dec = YearMonth::new(2024, 12).unwrap();
        assert_eq!(dec.succ(), YearMonth::new(2025, 1).unwrap());
    }

    #[test]
    fn finnish_date_round_trips() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
        assert_eq!(parse_finnish_date("31.03.2025"), Some(date));
        assert_eq!(format_finnish_date(date), "31.03.2025");
    }

    #[test]
    fn finnish_date_rejects_other_shapes() {
        assert_eq!(parse_finnish_date("2025-03-31"), None);
        assert_eq!(parse_finnish_date("31/03/2025"), None);
        assert_eq!(parse_finnish_date(""), None);
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let window = ReviewWindow::new(
            YearMonth::new(2024, 3),
            YearMonth::new(2024, 8).unwrap(),
        );
        assert!(window.contains(YearMonth::new(2024, 3).unwrap()));
        assert!(window.contains(YearMonth::new(2024, 8).unwrap()));
        assert!(!window.contains(YearMonth::new(2024, 2).unwrap()));
        assert!(!window.contains(YearMonth::new(2024, 9).unwrap()));
    }

    #[test]
    fn unbounded_window_accepts_any_earlier_month() {
        let window = ReviewWindow::until(YearMonth::new(2024, 8).unwrap());
        assert!(window.contains(YearMonth::new(1999, 1).unwrap()));
        assert!(!window.contains(YearMonth::new(2024, 9).unwrap()));
    }
}
