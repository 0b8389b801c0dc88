//! Cross-period stitching.
//!
//! Combines one employee's per-period aggregates across every period since
//! hire, and recomputes streaks over the concatenated day timeline so runs
//! that cross a month boundary are measured whole.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use tracing::warn;

use crate::models::{
    CrossPeriodReport, CrossPeriodStats, CrossPeriodStreaks, EmployeeRoster, MonthlySchedule,
    PeriodAverages, PeriodKey, PeriodStats, PeriodTotals, is_working_day,
};

use super::{RuleTable, TimelineDay, aggregate_month, compute_timeline_runs, mean_one_decimal};

/// Sorts periods chronologically and drops repeated period keys.
///
/// When a period key repeats, the copy with the smallest content digest is
/// kept, so the choice does not depend on input order.
fn ordered_periods(periods: &[MonthlySchedule]) -> Vec<&MonthlySchedule> {
    let mut ordered: Vec<&MonthlySchedule> = periods.iter().collect();
    ordered.sort_by_cached_key(|schedule| (schedule.period, schedule.content_digest()));

    let mut unique: Vec<&MonthlySchedule> = Vec::with_capacity(ordered.len());
    for schedule in ordered {
        if unique.last().is_some_and(|last| last.period == schedule.period) {
            warn!(period = %schedule.period, "Duplicate period ignored");
            continue;
        }
        unique.push(schedule);
    }
    unique
}

/// Periods from the employee's hire period onward, in order.
fn periods_since_hire<'a>(
    employee_id: &str,
    ordered: &[&'a MonthlySchedule],
) -> Vec<&'a MonthlySchedule> {
    ordered
        .iter()
        .skip_while(|schedule| !schedule.has_data_for(employee_id))
        .copied()
        .collect()
}

/// The earliest period containing any non-blank code for the employee.
///
/// # Example
///
/// ```
/// use workforce_stats::calculation::hire_period;
/// use workforce_stats::models::MonthlySchedule;
///
/// let january = MonthlySchedule::new("2026-01".parse().unwrap());
/// let mut february = MonthlySchedule::new("2026-02".parse().unwrap());
/// february.set_shift("emp_a", 3, "早");
///
/// let hired = hire_period("emp_a", &[february, january]);
/// assert_eq!(hired.map(|p| p.to_string()), Some("2026-02".to_string()));
/// ```
pub fn hire_period(employee_id: &str, periods: &[MonthlySchedule]) -> Option<PeriodKey> {
    periods
        .iter()
        .filter(|schedule| schedule.has_data_for(employee_id))
        .map(|schedule| schedule.period)
        .min()
}

fn timeline_for(employee_id: &str, periods: &[&MonthlySchedule]) -> Vec<TimelineDay> {
    let mut days = Vec::new();
    let mut previous: Option<PeriodKey> = None;

    for schedule in periods {
        let period = schedule.period;
        if let Some(prev) = previous {
            if prev.next() != period {
                warn!(
                    employee_id,
                    from = %prev,
                    to = %period,
                    "Non-consecutive periods; runs will not join across the gap"
                );
            }
        }
        previous = Some(period);

        days.extend(period.days().map(|(day, date)| TimelineDay {
            date,
            period,
            is_working: is_working_day(schedule.shift_on(employee_id, day)),
        }));
    }

    days
}

/// Builds the employee's chronological day timeline from hire onward.
///
/// Periods are sorted first; post-hire periods without an entry for the
/// employee contribute non-working days.
pub fn build_timeline(employee_id: &str, periods: &[MonthlySchedule]) -> Vec<TimelineDay> {
    let ordered = ordered_periods(periods);
    timeline_for(employee_id, &periods_since_hire(employee_id, &ordered))
}

/// Aggregates one employee across every period since hire.
///
/// Periods before hire are excluded entirely. Post-hire periods in which the
/// employee has no entry are not counted in the averages. Cross-period
/// streaks are only computed when more than one period is counted; with a
/// single period they stay at zero.
///
/// # Arguments
///
/// * `employee_id` - The employee to aggregate
/// * `display_name` - Name carried on the resulting row
/// * `periods` - Monthly schedules, in any order
/// * `rules` - The time-versioned rule table
///
/// # Returns
///
/// Returns `None` when the employee has no data in any period.
///
/// # Example
///
/// ```
/// use workforce_stats::calculation::{aggregate_across_periods, RuleTable};
/// use workforce_stats::models::MonthlySchedule;
///
/// let mut january = MonthlySchedule::new("2026-01".parse().unwrap());
/// january.set_shifts("emp_a", 28, &["早", "早", "休", "早"]);
/// let mut february = MonthlySchedule::new("2026-02".parse().unwrap());
/// february.set_shifts("emp_a", 1, &["早", "早", "休"]);
///
/// let stats = aggregate_across_periods("emp_a", "A", &[january, february], &RuleTable::default())
///     .unwrap();
/// assert_eq!(stats.periods_counted, 2);
/// assert!(stats.cross_period.runs.contains(&3));
/// ```
pub fn aggregate_across_periods(
    employee_id: &str,
    display_name: &str,
    periods: &[MonthlySchedule],
    rules: &RuleTable,
) -> Option<CrossPeriodStats> {
    let ordered = ordered_periods(periods);
    let included = periods_since_hire(employee_id, &ordered);
    let hire_period = included.first()?.period;

    let mut totals = PeriodTotals::default();
    let mut periods_counted: u32 = 0;

    for schedule in included.iter().filter(|s| s.has_entry(employee_id)) {
        let stats = aggregate_month(schedule, employee_id, rules);
        periods_counted += 1;
        totals.early += stats.early;
        totals.afternoon += stats.afternoon;
        totals.night += stats.night;
        totals.stock += stats.stock;
        totals.total_shifts += stats.total_shifts;
        totals.streak_avg_sum += stats.streaks.avg_run;
    }

    let counted = u64::from(periods_counted);
    let averages = PeriodAverages {
        early: mean_one_decimal(Decimal::from(totals.early), counted),
        afternoon: mean_one_decimal(Decimal::from(totals.afternoon), counted),
        night: mean_one_decimal(Decimal::from(totals.night), counted),
        stock: mean_one_decimal(Decimal::from(totals.stock), counted),
        streak: mean_one_decimal(totals.streak_avg_sum, counted),
    };

    let cross_period = if periods_counted > 1 {
        compute_timeline_runs(&timeline_for(employee_id, &included))
    } else {
        CrossPeriodStreaks::default()
    };

    Some(CrossPeriodStats {
        employee_id: employee_id.to_string(),
        display_name: display_name.to_string(),
        hire_period,
        periods_counted,
        totals,
        averages,
        cross_period,
    })
}

/// Per-period rows for the employee since hire, newest first.
///
/// Only periods in which the employee has an entry are listed.
pub fn monthly_details(
    employee_id: &str,
    periods: &[MonthlySchedule],
    rules: &RuleTable,
) -> Vec<PeriodStats> {
    let ordered = ordered_periods(periods);
    periods_since_hire(employee_id, &ordered)
        .into_iter()
        .rev()
        .filter(|schedule| schedule.has_entry(employee_id))
        .map(|schedule| aggregate_month(schedule, employee_id, rules))
        .collect()
}

/// Builds the cross-period report for every regular employee.
///
/// Employees outside the regular category are dropped before any
/// aggregation. Employees with no data in any period have no row.
pub fn build_report(
    periods: &[MonthlySchedule],
    roster: &EmployeeRoster,
    rules: &RuleTable,
) -> CrossPeriodReport {
    let employee_ids: BTreeSet<&str> = periods
        .iter()
        .flat_map(|schedule| schedule.employee_ids())
        .filter(|id| roster.is_regular(id))
        .collect();

    let rows = employee_ids
        .into_iter()
        .filter_map(|id| aggregate_across_periods(id, roster.display_name(id), periods, rules))
        .collect();

    let period_keys: BTreeSet<PeriodKey> = periods.iter().map(|s| s.period).collect();

    CrossPeriodReport {
        periods: period_keys.into_iter().collect(),
        rows,
    }
}
