//! Per-period aggregation.
//!
//! Counts one employee's shifts in one monthly schedule using the rule era
//! that governs that month.

use chrono::Datelike;

use crate::models::{MonthlySchedule, NonWorkingShift, PeriodStats, ShiftCode, is_working_day};

use super::{RuleTable, compute_runs};

/// The week-of-month number (`ceil(day / 7)`) used to group stock duties.
pub fn stock_week(day: u32) -> u32 {
    day.div_ceil(7)
}

/// Aggregates one employee's shifts for one period.
///
/// The rule era is selected from the schedule's own period, so each month
/// is bucketed under the rules that were in force at the time.
///
/// # Arguments
///
/// * `schedule` - The monthly schedule to read
/// * `employee_id` - The employee to aggregate
/// * `rules` - The time-versioned rule table
///
/// # Returns
///
/// Returns a `PeriodStats` row. An employee without an entry in the
/// schedule gets a zero-valued row rather than an error.
///
/// # Example
///
/// ```
/// use workforce_stats::calculation::{aggregate_month, RuleTable};
/// use workforce_stats::models::MonthlySchedule;
///
/// let mut schedule = MonthlySchedule::new("2026-01".parse().unwrap());
/// // 2026-01-07 is a Wednesday.
/// schedule.set_shifts("emp_a", 5, &["早", "中", "午", "休"]);
///
/// let stats = aggregate_month(&schedule, "emp_a", &RuleTable::default());
/// assert_eq!(stats.early, 2);
/// assert_eq!(stats.afternoon, 1);
/// assert_eq!(stats.stock, 1);
/// assert_eq!(stats.streaks.runs, vec![3]);
/// ```
pub fn aggregate_month(
    schedule: &MonthlySchedule,
    employee_id: &str,
    rules: &RuleTable,
) -> PeriodStats {
    let period = schedule.period;
    let rule_set = rules.select(period);
    let mut stats = PeriodStats::empty(period, &rule_set.name);

    if !schedule.has_entry(employee_id) {
        return stats;
    }

    let mut working = Vec::with_capacity(period.days_in_month() as usize);

    for (day, date) in period.days() {
        let code = schedule.shift_on(employee_id, day);
        working.push(is_working_day(code));

        let Some(code) = code else {
            continue;
        };
        stats.total_shifts += 1;

        match code {
            ShiftCode::Working(shift) => {
                if rule_set.is_early(shift) {
                    stats.early += 1;
                }
                if rule_set.is_afternoon(shift) {
                    stats.afternoon += 1;
                }
                if rule_set.is_night(shift) {
                    stats.night += 1;
                }
                if rule_set.is_stock_duty(shift, date.weekday()) {
                    stats.stock += 1;
                    let week = stock_week(day);
                    if !stats.stock_weeks.contains(&week) {
                        stats.stock_weeks.push(week);
                    }
                }
            }
            ShiftCode::NonWorking(NonWorkingShift::Rest) => stats.rest += 1,
            ShiftCode::NonWorking(NonWorkingShift::Leave) => stats.leave += 1,
            ShiftCode::NonWorking(NonWorkingShift::Unrecognized) => {}
        }
    }

    stats.streaks = compute_runs(working);
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PeriodKey;
    use rust_decimal::Decimal;

    fn period(s: &str) -> PeriodKey {
        s.parse().unwrap()
    }

    #[test]
    fn test_stock_week_numbers() {
        assert_eq!(stock_week(1), 1);
        assert_eq!(stock_week(7), 1);
        assert_eq!(stock_week(8), 2);
        assert_eq!(stock_week(28), 4);
        assert_eq!(stock_week(29), 5);
    }

    #[test]
    fn test_missing_employee_yields_zero_row() {
        let mut schedule = MonthlySchedule::new(period("2026-01"));
        schedule.set_shifts("emp_a", 1, &["早", "早"]);

        let stats = aggregate_month(&schedule, "emp_b", &RuleTable::default());
        assert_eq!(stats, PeriodStats::empty(period("2026-01"), "2025-10"));
    }

    #[test]
    fn test_legacy_era_buckets_middle_as_afternoon() {
        // 2025-09-03 is a Wednesday.
        let mut schedule = MonthlySchedule::new(period("2025-09"));
        schedule.set_shifts("emp_a", 1, &["早", "中", "中", "晚"]);

        let stats = aggregate_month(&schedule, "emp_a", &RuleTable::default());
        assert_eq!(stats.rule_era, "legacy");
        assert_eq!(stats.early, 1);
        assert_eq!(stats.afternoon, 2);
        assert_eq!(stats.night, 1);
        // Only the Wednesday middle shift is a stock duty.
        assert_eq!(stats.stock, 1);
        assert_eq!(stats.stock_weeks, vec![1]);
    }

    #[test]
    fn test_reform_era_buckets_middle_as_early() {
        // 2025-10-01 is a Wednesday.
        let mut schedule = MonthlySchedule::new(period("2025-10"));
        schedule.set_shifts("emp_a", 1, &["中", "午", "早"]);
        schedule.set_shift("emp_a", 8, "午");

        let stats = aggregate_month(&schedule, "emp_a", &RuleTable::default());
        assert_eq!(stats.rule_era, "2025-10");
        assert_eq!(stats.early, 2);
        assert_eq!(stats.afternoon, 2);
        // Middle on a Wednesday is no longer a stock duty; afternoon on Oct 8 is.
        assert_eq!(stats.stock, 1);
        assert_eq!(stats.stock_weeks, vec![2]);
    }

    #[test]
    fn test_stock_accepts_case_insensitive_aliases() {
        // 2026-01-07, 14 and 28 are Wednesdays.
        let mut schedule = MonthlySchedule::new(period("2026-01"));
        schedule.set_shift("emp_a", 7, "xx");
        schedule.set_shift("emp_a", 14, " Yy ");
        schedule.set_shift("emp_a", 28, "晚班");

        let stats = aggregate_month(&schedule, "emp_a", &RuleTable::default());
        assert_eq!(stats.stock, 3);
        assert_eq!(stats.stock_weeks, vec![1, 2, 4]);
        assert_eq!(stats.afternoon, 1);
        assert_eq!(stats.night, 2);
    }

    #[test]
    fn test_total_shifts_counts_unrecognized_but_streak_does_not() {
        let mut schedule = MonthlySchedule::new(period("2026-01"));
        schedule.set_shifts("emp_a", 1, &["早", "早", "訓練", "早", "休", "特", ""]);

        let stats = aggregate_month(&schedule, "emp_a", &RuleTable::default());
        assert_eq!(stats.total_shifts, 6);
        assert_eq!(stats.rest, 1);
        assert_eq!(stats.leave, 1);
        assert_eq!(stats.streaks.runs, vec![2, 1]);
        assert_eq!(stats.streaks.avg_run, Decimal::new(15, 1));
    }

    #[test]
    fn test_periods_either_side_of_cutover_use_their_own_rules() {
        let rules = RuleTable::default();
        let mut september = MonthlySchedule::new(period("2025-09"));
        september.set_shift("emp_a", 10, "中");
        let mut october = MonthlySchedule::new(period("2025-10"));
        october.set_shift("emp_a", 10, "中");

        let before = aggregate_month(&september, "emp_a", &rules);
        let after = aggregate_month(&october, "emp_a", &rules);
        assert_eq!((before.early, before.afternoon), (0, 1));
        assert_eq!((after.early, after.afternoon), (1, 0));
    }
}
