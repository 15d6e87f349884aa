//! Wage base and the final correction record.
//!
//! The wage base reads only the selected window: normal wages count in
//! full, subsidized wages count at the rule's acceptance rate, and under
//! the lockout rule the locked months' wages are excluded outright rather
//! than discounted. The base is not determined at all until the corrected
//! eligibility satisfies the employment condition — below that the
//! correction record reports zero salary deltas.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::calculations::common::{round_money, round_toe_months_down};
use crate::calculations::conversion::{ConvertedSegment, ToeConversionResult};
use crate::models::{MonthPeriod, SubsidyRule, ToeConfig};

/// Wage base derived from the selected window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WageBaseResult {
    /// Normal-work wages, accepted in full.
    pub wage_normal_total: Decimal,
    /// Subsidized wages after the rule's acceptance rate.
    pub wage_subsidized_accepted: Decimal,
    pub accepted_wage_total: Decimal,
    /// Divisor days summed over the underlying periods.
    pub divisor_days_total: Decimal,
    pub period_count: u32,
    /// `(accepted / divisor days) x full-month divisor x period count`,
    /// rounded to cents. Zero when there are no divisor days.
    pub corrected_total_salary: Decimal,
    /// Monthly figure: the corrected total spread back over the months.
    pub corrected_average_salary: Decimal,
}

/// The correction handed back to the caller once a rule has been applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsidyCorrection {
    pub rule: SubsidyRule,
    /// Months in the selected window carrying subsidized wages.
    pub subsidized_month_count: u32,
    /// Gross subsidized wages in the selected window, before acceptance.
    pub subsidized_wage_total: Decimal,
    /// Corrected eligibility total after manual overrides, on the
    /// half-step grid.
    pub toe_corrected_total: Decimal,
    /// Corrected minus system eligibility.
    pub toe_correction: Decimal,
    pub accepted_wage_total: Decimal,
    pub corrected_total_salary: Decimal,
    /// Zero until the employment condition is satisfied.
    pub total_salary_correction: Decimal,
    pub corrected_average_salary: Decimal,
    /// Zero until the employment condition is satisfied.
    pub average_salary_correction: Decimal,
    /// Whether the corrected eligibility reached the required months.
    pub required_met: bool,
    /// Manual per-period eligibility overrides applied, echoed back.
    pub manual_toe_overrides: BTreeMap<String, Decimal>,
}

/// Computes wage bases and correction records for one configuration.
#[derive(Debug, Clone)]
pub struct WageBaseCalculator<'a> {
    config: &'a ToeConfig,
}

impl<'a> WageBaseCalculator<'a> {
    pub fn new(config: &'a ToeConfig) -> Self {
        Self { config }
    }

    /// Acceptance rate applied to one segment's subsidized wages.
    ///
    /// Under the lockout rule the first locked months are excluded
    /// entirely; subsidized wages with no chronological position (work
    /// predating the employment start) are excluded as well.
    fn subsidized_acceptance(
        &self,
        rule: SubsidyRule,
        exception_subsidy: bool,
        converted: &ConvertedSegment,
    ) -> Decimal {
        match rule {
            SubsidyRule::NoAccrual => Decimal::ZERO,
            SubsidyRule::Full => {
                if exception_subsidy {
                    self.config.subsidized_credit_factor
                } else {
                    Decimal::ZERO
                }
            }
            SubsidyRule::Percent75 => self.config.subsidized_credit_factor,
            SubsidyRule::LockoutThenPercent75 => match converted.subsidized_position {
                Some(position) if position > self.config.lockout_months => {
                    self.config.subsidized_credit_factor
                }
                _ => Decimal::ZERO,
            },
        }
    }

    /// Wage base over the selected window.
    ///
    /// Only real (non-temporary) segments with `include_in_wage` count.
    /// Callers gate on the corrected eligibility before invoking this —
    /// the function trusts them and computes unconditionally.
    pub fn wage_base(
        &self,
        conversion: &ToeConversionResult,
        rule: SubsidyRule,
        exception_subsidy: bool,
        periods: &[MonthPeriod],
    ) -> WageBaseResult {
        let mut wage_normal_total = Decimal::ZERO;
        let mut wage_subsidized_accepted = Decimal::ZERO;
        let mut divisor_days_total = Decimal::ZERO;
        let mut period_count: u32 = 0;

        for converted in &conversion.segments {
            if converted.temporary || !converted.segment.include_in_wage {
                continue;
            }
            let Some(period) = self.lookup_period(converted, periods) else {
                continue;
            };
            wage_normal_total += converted.segment.wage_normal_total;
            let rate = self.subsidized_acceptance(rule, exception_subsidy, converted);
            wage_subsidized_accepted += converted.segment.wage_subsidized_total * rate;
            divisor_days_total += period.divisor_days;
            period_count += 1;
        }

        let accepted_wage_total = wage_normal_total + wage_subsidized_accepted;
        let corrected_total_salary = self.salary_over_window(
            accepted_wage_total,
            divisor_days_total,
            period_count,
        );
        let corrected_average_salary = if period_count > 0 {
            round_money(corrected_total_salary / Decimal::from(period_count))
        } else {
            Decimal::ZERO
        };

        WageBaseResult {
            wage_normal_total,
            wage_subsidized_accepted: round_money(wage_subsidized_accepted),
            accepted_wage_total: round_money(accepted_wage_total),
            divisor_days_total,
            period_count,
            corrected_total_salary,
            corrected_average_salary,
        }
    }

    /// Full correction record: wage base plus the deltas against the
    /// system's uncorrected figures, gated on the employment condition.
    pub fn subsidy_correction(
        &self,
        conversion: &ToeConversionResult,
        rule: SubsidyRule,
        exception_subsidy: bool,
        periods: &[MonthPeriod],
        manual_toe_overrides: &BTreeMap<String, Decimal>,
    ) -> SubsidyCorrection {
        let toe_corrected_total = self.apply_toe_overrides(conversion, manual_toe_overrides);
        let required_met = toe_corrected_total >= self.config.required_toe_months;

        // System figures over the same (real) window.
        let mut system_toe_total = Decimal::ZERO;
        let mut system_total_salary = Decimal::ZERO;
        let mut system_divisor_days = Decimal::ZERO;
        let mut system_period_count: u32 = 0;
        let mut subsidized_month_count: u32 = 0;
        let mut subsidized_wage_total = Decimal::ZERO;
        for converted in &conversion.segments {
            if converted.temporary {
                continue;
            }
            let Some(period) = self.lookup_period(converted, periods) else {
                continue;
            };
            system_toe_total += period.toe_system;
            system_total_salary += period.total_wage;
            system_divisor_days += period.divisor_days;
            system_period_count += 1;
            if converted.segment.wage_subsidized_total > Decimal::ZERO {
                subsidized_month_count += 1;
                subsidized_wage_total += converted.segment.wage_subsidized_total;
            }
        }
        let system_average_salary = if system_period_count > 0 {
            round_money(
                self.salary_over_window(
                    system_total_salary,
                    system_divisor_days,
                    system_period_count,
                ) / Decimal::from(system_period_count),
            )
        } else {
            Decimal::ZERO
        };

        let base = self.wage_base(conversion, rule, exception_subsidy, periods);

        // Wage base is not determined before the employment condition is
        // satisfied; below it the correction reports the system figures
        // and zero deltas.
        let (corrected_total, total_delta, corrected_average, average_delta) = if required_met {
            (
                base.corrected_total_salary,
                round_money(base.corrected_total_salary - system_total_salary),
                base.corrected_average_salary,
                round_money(base.corrected_average_salary - system_average_salary),
            )
        } else {
            (
                system_total_salary,
                Decimal::ZERO,
                system_average_salary,
                Decimal::ZERO,
            )
        };

        SubsidyCorrection {
            rule,
            subsidized_month_count,
            subsidized_wage_total,
            toe_corrected_total,
            toe_correction: toe_corrected_total - system_toe_total,
            accepted_wage_total: base.accepted_wage_total,
            corrected_total_salary: corrected_total,
            total_salary_correction: total_delta,
            corrected_average_salary: corrected_average,
            average_salary_correction: average_delta,
            required_met,
            manual_toe_overrides: manual_toe_overrides.clone(),
        }
    }

    /// Replaces overridden periods' month totals in the corrected
    /// eligibility, then re-rounds.
    ///
    /// An override is a caseworker's explicit final figure for one month;
    /// pooled aggregate values are left as computed. Overrides naming an
    /// unknown period are ignored.
    fn apply_toe_overrides(
        &self,
        conversion: &ToeConversionResult,
        overrides: &BTreeMap<String, Decimal>,
    ) -> Decimal {
        let mut total = conversion.total_toe_real;
        for (period_id, value) in overrides {
            let Some(converted) = conversion.segments.iter().find(|c| {
                !c.temporary && c.segment.period_ids.iter().any(|id| id == period_id)
            }) else {
                warn!(period_id = %period_id, "manual override for a period outside the conversion; ignored");
                continue;
            };
            total += *value - converted.toe_total;
        }
        round_toe_months_down(total.max(Decimal::ZERO))
    }

    fn salary_over_window(
        &self,
        wage_total: Decimal,
        divisor_days: Decimal,
        period_count: u32,
    ) -> Decimal {
        if divisor_days <= Decimal::ZERO {
            if wage_total > Decimal::ZERO {
                warn!(
                    %wage_total,
                    "no divisor days in the selected window; wage base cannot be computed"
                );
            }
            return Decimal::ZERO;
        }
        let daily = wage_total / divisor_days;
        round_money(daily * self.config.full_month_divisor * Decimal::from(period_count))
    }

    fn lookup_period<'p>(
        &self,
        converted: &ConvertedSegment,
        periods: &'p [MonthPeriod],
    ) -> Option<&'p MonthPeriod> {
        let period_id = converted.segment.period_ids.first()?;
        let found = periods.iter().find(|p| &p.id == period_id);
        if found.is_none() {
            warn!(period_id = %period_id, "segment references an unknown period; skipped");
        }
        found
    }
}
