use std::collections::BTreeMap;
use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::Parser;
use rust_decimal::Decimal;
use toe_core::calculations::{
    SegmentBuilder, ToeConverter, WageBaseCalculator, distribute_corrected_toe, select_toe_period,
};
use toe_core::{
    ReviewWindow, SubsidizedEmployers, SubsidyRule, ToeConfig, YearMonth, parse_finnish_date,
};
use toe_data::PeriodLoader;
use tracing_subscriber::EnvFilter;

/// Run the subsidized-work eligibility and wage correction over a
/// reported-income CSV file.
///
/// The CSV file should have the following columns:
/// - period: the month label, e.g. "2025 tammikuu"
/// - payment_date: payment date as DD.MM.YYYY (may be empty)
/// - income_type: income-type label, e.g. Palkka
/// - amount: gross amount in EUR
/// - employer: employer name
/// - subsidized: true/false to override employer-based inference (may be empty)
/// - earning_start, earning_end: optional earning period as DD.MM.YYYY
/// - divisor_days: divisor days for the month (empty for 21.5)
#[derive(Parser, Debug)]
#[command(name = "toe-correction")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the CSV file containing reported income
    #[arg(short, long)]
    file: PathBuf,

    /// Conversion rule: full, no-accrual, percent-75 or lockout-then-75
    #[arg(short, long, default_value = "percent-75")]
    rule: String,

    /// Treat subsidized work as exception-based subsidy when no specific
    /// rule applies
    #[arg(long, default_value_t = false)]
    exception_subsidy: bool,

    /// Employment start date anchoring the chronological rules, DD.MM.YYYY
    #[arg(short, long)]
    employment_start: Option<String>,

    /// First month of the review window, e.g. "2023 syyskuu"
    /// (default: unbounded lookback)
    #[arg(long)]
    window_start: Option<String>,

    /// Last month of the review window, e.g. "2025 elokuu"
    /// (default: the newest month in the file)
    #[arg(long)]
    window_end: Option<String>,

    /// Employer whose wages count as subsidized work; repeatable
    #[arg(short, long = "subsidized-employer")]
    subsidized_employers: Vec<String>,
}

fn month_arg(
    value: &Option<String>,
    what: &str,
) -> Result<Option<YearMonth>> {
    match value {
        None => Ok(None),
        Some(s) => match YearMonth::from_period_label(s) {
            Some(month) => Ok(Some(month)),
            None => bail!("{what} '{s}' is not a 'YYYY MonthName' label"),
        },
    }
}

fn date_arg(
    value: &Option<String>,
    what: &str,
) -> Result<Option<NaiveDate>> {
    match value {
        None => Ok(None),
        Some(s) => match parse_finnish_date(s) {
            Some(date) => Ok(Some(date)),
            None => bail!("{what} '{s}' is not a DD.MM.YYYY date"),
        },
    }
}

/// Explicit sign for delta figures, `+0.5` / `-3000.00`.
fn signed(value: Decimal) -> String {
    if value >= Decimal::ZERO {
        format!("+{value}")
    } else {
        value.to_string()
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let Some(rule) = SubsidyRule::parse(&args.rule) else {
        bail!("unknown rule '{}'", args.rule);
    };
    let employment_start = date_arg(&args.employment_start, "employment start")?;
    let window_start = month_arg(&args.window_start, "window start")?;
    let window_end = month_arg(&args.window_end, "window end")?;

    let config = ToeConfig::default();
    config.validate().context("invalid configuration")?;
    let employers: SubsidizedEmployers = args.subsidized_employers.iter().cloned().collect();

    let file = File::open(&args.file)
        .with_context(|| format!("Failed to open: {}", args.file.display()))?;
    let records = PeriodLoader::parse(file)
        .with_context(|| format!("Failed to parse CSV: {}", args.file.display()))?;
    println!("Parsed {} income records from CSV", records.len());

    let periods = PeriodLoader::build_periods(&records, &config)
        .context("Failed to assemble monthly periods")?;
    if periods.is_empty() {
        bail!("no usable periods in {}", args.file.display());
    }

    let end = match window_end {
        Some(month) => month,
        None => periods
            .iter()
            .filter_map(|p| p.month())
            .max()
            .context("no period has a parseable month")?,
    };
    let window = ReviewWindow::new(window_start, end);

    let segments = SegmentBuilder::new(&config, &employers).build(&periods, &window);
    let converter = ToeConverter::new(
        &config,
        &employers,
        rule,
        args.exception_subsidy,
        employment_start,
        &periods,
    );
    let selection = select_toe_period(&converter, &segments);
    let rows = distribute_corrected_toe(&selection.conversion, &periods);
    let correction = WageBaseCalculator::new(&config).subsidy_correction(
        &selection.conversion,
        rule,
        args.exception_subsidy,
        &periods,
        &BTreeMap::new(),
    );

    println!(
        "Selected {} calendar months ({}), rule {}",
        selection.calendar_months,
        match &selection.window {
            Some(w) => format!(
                "{} .. {}",
                w.start.map(|m| m.label()).unwrap_or_else(|| "-".to_string()),
                w.end.label()
            ),
            None => "empty".to_string(),
        },
        rule.as_str(),
    );

    println!();
    println!(
        "{:<16} {:>10} {:>10} {:>8} {:>8} {:>9} {:>5}",
        "period", "normal", "subsidized", "toe sys", "toe corr", "position", "used"
    );
    for row in &rows {
        println!(
            "{:<16} {:>10} {:>10} {:>8} {:>8} {:>9} {:>5}",
            row.label,
            row.wage_normal,
            row.wage_subsidized,
            row.toe_system_total,
            row.toe_corrected_total,
            row.subsidized_position
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".to_string()),
            if row.in_selected_window { "yes" } else { "no" },
        );
    }

    println!();
    println!(
        "Corrected eligibility: {} months ({} vs system)",
        correction.toe_corrected_total,
        signed(correction.toe_correction)
    );
    println!(
        "Subsidized months in window: {} ({} EUR gross)",
        correction.subsidized_month_count, correction.subsidized_wage_total
    );
    if correction.required_met {
        println!(
            "Accepted wage total: {} EUR -> corrected salary {} EUR total, {} EUR/month \
             ({} / {} vs system)",
            correction.accepted_wage_total,
            correction.corrected_total_salary,
            correction.corrected_average_salary,
            signed(correction.total_salary_correction),
            signed(correction.average_salary_correction),
        );
    } else {
        println!(
            "Employment condition not met ({} < {} months); wage base not determined.",
            correction.toe_corrected_total,
            config.required_toe_months,
        );
    }

    Ok(())
}
