use std::collections::BTreeMap;
use std::io::Read;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use toe_core::calculations::common::toe_value_from_salary;
use toe_core::{IncomeRow, MonthPeriod, ToeConfig, YearMonth, parse_finnish_date};
use tracing::warn;

/// Errors that can occur when loading reported-income data.
#[derive(Debug, Error)]
pub enum PeriodLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Invalid date '{0}' (expected DD.MM.YYYY)")]
    InvalidDate(String),

    #[error("Row has an earning-period start but no end (or the reverse): '{0}'")]
    HalfOpenEarningPeriod(String),
}

impl From<csv::Error> for PeriodLoaderError {
    fn from(err: csv::Error) -> Self {
        PeriodLoaderError::CsvParse(err.to_string())
    }
}

/// A single record from the reported-income CSV file.
///
/// One record is one income line:
/// - `period`: the month label, `"YYYY MonthName"` with a Finnish month name
/// - `payment_date`: payment date as `DD.MM.YYYY` (may be empty)
/// - `income_type`: free-form income-type label (e.g. `Palkka`)
/// - `amount`: gross amount in EUR
/// - `employer`: employer name
/// - `subsidized`: explicit subsidized-work marker, `true`/`false` or empty
/// - `earning_start`, `earning_end`: optional earning-period range
/// - `divisor_days`: divisor days for the month (empty for the default)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct IncomeRecord {
    pub period: String,
    #[serde(default)]
    pub payment_date: Option<String>,
    pub income_type: String,
    pub amount: Decimal,
    pub employer: String,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub subsidized: Option<bool>,
    #[serde(default)]
    pub earning_start: Option<String>,
    #[serde(default)]
    pub earning_end: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub divisor_days: Option<Decimal>,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

fn deserialize_optional_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some("true") => Ok(Some(true)),
        Some("false") => Ok(Some(false)),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected 'true', 'false' or empty, got '{other}'"
        ))),
    }
}

/// Loader for reported-income data from CSV files.
///
/// Parsing and period assembly are separate steps so callers can inspect
/// or amend the raw records before grouping them into months.
pub struct PeriodLoader;

impl PeriodLoader {
    /// Parse income records from a CSV reader.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<IncomeRecord>, PeriodLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: IncomeRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Groups records into one [`MonthPeriod`] per period label, newest
    /// month first.
    ///
    /// The period id derives from the calendar month, the cached wage
    /// total from the row sum, and the system eligibility value from the
    /// salary thresholds applied to the combined total — the naive
    /// combined figure the correction engine later revises. Records whose
    /// label does not parse are skipped with a warning; malformed dates
    /// are errors.
    pub fn build_periods(
        records: &[IncomeRecord],
        config: &ToeConfig,
    ) -> Result<Vec<MonthPeriod>, PeriodLoaderError> {
        let mut grouped: BTreeMap<YearMonth, (String, Vec<IncomeRow>, Option<Decimal>)> =
            BTreeMap::new();

        for record in records {
            let Some(month) = YearMonth::from_period_label(&record.period) else {
                warn!(
                    period = %record.period,
                    "record label does not parse to a calendar month; skipped"
                );
                continue;
            };
            let row = Self::income_row(record)?;
            let entry = grouped
                .entry(month)
                .or_insert_with(|| (record.period.clone(), Vec::new(), None));
            entry.1.push(row);
            if entry.2.is_none() {
                entry.2 = record.divisor_days;
            }
        }

        let mut periods: Vec<MonthPeriod> = grouped
            .into_iter()
            .map(|(month, (label, rows, divisor))| {
                let total_wage: Decimal = rows.iter().map(|r| r.amount).sum();
                MonthPeriod {
                    id: month.period_id(),
                    label,
                    toe_system: toe_value_from_salary(total_wage, config),
                    divisor_days: divisor.unwrap_or(config.full_month_divisor),
                    total_wage,
                    rows,
                }
            })
            .collect();
        periods.reverse();
        Ok(periods)
    }

    fn income_row(record: &IncomeRecord) -> Result<IncomeRow, PeriodLoaderError> {
        let payment_date = Self::optional_date(record.payment_date.as_deref())?;
        let earning_period = match (
            Self::optional_date(record.earning_start.as_deref())?,
            Self::optional_date(record.earning_end.as_deref())?,
        ) {
            (Some(start), Some(end)) => Some((start, end)),
            (None, None) => None,
            _ => {
                return Err(PeriodLoaderError::HalfOpenEarningPeriod(
                    record.period.clone(),
                ));
            }
        };
        Ok(IncomeRow {
            payment_date,
            income_type: record.income_type.clone(),
            amount: record.amount,
            employer: record.employer.clone(),
            earning_period,
            subsidized: record.subsidized,
        })
    }

    fn optional_date(value: Option<&str>) -> Result<Option<NaiveDate>, PeriodLoaderError> {
        match value.map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => parse_finnish_date(s)
                .map(Some)
                .ok_or_else(|| PeriodLoaderError::InvalidDate(s.to_string())),
        }
    }
}
