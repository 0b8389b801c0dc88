//! Co-worker overlap statistics.
//!
//! Counts, for every pair of regular employees, the days in one period on
//! which they worked alongside each other. Two employees work alongside each
//! other when they hold the same working shift, or when their shifts are
//! adjacent in the day (early with middle, middle with night).

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{EmployeeRoster, MonthlySchedule, PeriodKey, WorkingShift};

use super::mean_one_decimal;

/// One shared day of an overlapping pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlapDay {
    /// Day of the month.
    pub day: u32,
    /// The first employee's shift.
    pub shift: WorkingShift,
    /// The second employee's shift.
    pub partner_shift: WorkingShift,
}

/// Two employees who worked alongside each other at least once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlapPair {
    /// The lesser employee id of the pair.
    pub employee_a: String,
    /// The greater employee id of the pair.
    pub employee_b: String,
    /// Number of shared days.
    pub days: u32,
    /// The shared days, in day order.
    pub details: Vec<OverlapDay>,
}

/// Totals over every overlapping pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlapSummary {
    /// Sum of shared days over all pairs.
    pub total_overlaps: u32,
    /// Shared days of the most frequent pair.
    pub max_overlap: u32,
    /// Number of pairs with at least one shared day.
    pub total_pairs: u32,
    /// `total_overlaps / total_pairs`, rounded to one decimal.
    pub avg_overlap: Decimal,
}

/// Co-worker overlap for one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlapReport {
    /// The period covered.
    pub period: PeriodKey,
    /// Regular employees in the schedule, sorted by id.
    pub employees: Vec<String>,
    /// Pairs with at least one shared day, sorted by id pair.
    pub pairs: Vec<OverlapPair>,
    /// Totals over `pairs`.
    pub summary: OverlapSummary,
}

impl OverlapReport {
    /// The pair row for two employees, in either order.
    pub fn pair(&self, first: &str, second: &str) -> Option<&OverlapPair> {
        let (a, b) = if first <= second {
            (first, second)
        } else {
            (second, first)
        };
        self.pairs
            .iter()
            .find(|pair| pair.employee_a == a && pair.employee_b == b)
    }

    /// Shared days of two employees, in either order; zero when they never overlap.
    pub fn count(&self, first: &str, second: &str) -> u32 {
        self.pair(first, second).map_or(0, |pair| pair.days)
    }
}

/// Returns true if holders of the two shifts work alongside each other.
fn works_alongside(a: WorkingShift, b: WorkingShift) -> bool {
    use WorkingShift::{Early, Middle, Night};

    a == b
        || matches!(
            (a, b),
            (Early, Middle) | (Middle, Early) | (Middle, Night) | (Night, Middle)
        )
}

/// Counts shared working days for every pair of regular employees in `schedule`.
///
/// Only working shifts pair up; rest days, leave and unrecognized codes are
/// skipped. Codes are compared after normalization, so legacy spellings of
/// a shift pair with the current ones.
///
/// # Example
///
/// ```
/// use workforce_stats::calculation::shift_overlap;
/// use workforce_stats::models::{EmployeeRoster, MonthlySchedule};
///
/// let mut january = MonthlySchedule::new("2026-01".parse().unwrap());
/// january.set_shifts("emp_a", 1, &["早", "中", "休"]);
/// january.set_shifts("emp_b", 1, &["早", "晚", "早"]);
///
/// let report = shift_overlap(&january, &EmployeeRoster::new());
/// assert_eq!(report.count("emp_b", "emp_a"), 2);
/// assert_eq!(report.summary.total_pairs, 1);
/// ```
pub fn shift_overlap(schedule: &MonthlySchedule, roster: &EmployeeRoster) -> OverlapReport {
    let employees: Vec<&str> = schedule
        .employee_ids()
        .filter(|id| roster.is_regular(id))
        .collect();

    let mut shared: BTreeMap<(&str, &str), Vec<OverlapDay>> = BTreeMap::new();
    for (day, _) in schedule.period.days() {
        let working: Vec<(&str, WorkingShift)> = employees
            .iter()
            .filter_map(|id| {
                let shift = schedule.shift_on(id, day)?.working()?;
                Some((*id, shift))
            })
            .collect();

        for (i, &(a, shift)) in working.iter().enumerate() {
            for &(b, partner_shift) in &working[i + 1..] {
                if works_alongside(shift, partner_shift) {
                    shared.entry((a, b)).or_default().push(OverlapDay {
                        day,
                        shift,
                        partner_shift,
                    });
                }
            }
        }
    }

    let pairs: Vec<OverlapPair> = shared
        .into_iter()
        .map(|((a, b), details)| OverlapPair {
            employee_a: a.to_string(),
            employee_b: b.to_string(),
            days: u32::try_from(details.len()).unwrap_or(u32::MAX),
            details,
        })
        .collect();

    let total_overlaps: u32 = pairs.iter().map(|pair| pair.days).sum();
    let total_pairs = u32::try_from(pairs.len()).unwrap_or(u32::MAX);
    let summary = OverlapSummary {
        total_overlaps,
        max_overlap: pairs.iter().map(|pair| pair.days).max().unwrap_or(0),
        total_pairs,
        avg_overlap: mean_one_decimal(Decimal::from(total_overlaps), u64::from(total_pairs)),
    };

    debug!(
        period = %schedule.period,
        employees = employees.len(),
        pairs = total_pairs,
        "Computed shift overlap"
    );

    OverlapReport {
        period: schedule.period,
        employees: employees.into_iter().map(str::to_string).collect(),
        pairs,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EmployeeCategory;

    /// Builds a January 2026 schedule from `(employee, "code,code,...")` entries starting on day 1.
    fn january(entries: &[(&str, &str)]) -> MonthlySchedule {
        let mut schedule = MonthlySchedule::new("2026-01".parse().unwrap());
        for (employee, codes) in entries {
            let codes: Vec<&str> = codes.split(',').collect();
            schedule.set_shifts(employee, 1, &codes);
        }
        schedule
    }

    #[test]
    fn test_same_shift_pairs_and_rest_days_are_skipped() {
        let schedule = january(&[("emp_a", "早,早,休"), ("emp_b", "早,休,早")]);

        let report = shift_overlap(&schedule, &EmployeeRoster::new());
        assert_eq!(report.count("emp_a", "emp_b"), 1);
        assert_eq!(report.count("emp_b", "emp_a"), 1);

        let pair = report.pair("emp_b", "emp_a").unwrap();
        assert_eq!(pair.employee_a, "emp_a");
        assert_eq!(
            pair.details,
            vec![OverlapDay {
                day: 1,
                shift: WorkingShift::Early,
                partner_shift: WorkingShift::Early,
            }]
        );
    }

    #[test]
    fn test_adjacent_shifts_pair_up() {
        // Legacy L is a middle shift, YY a night shift.
        let schedule = january(&[("emp_a", "早"), ("emp_b", "L"), ("emp_c", "YY"), ("emp_d", "午")]);

        let report = shift_overlap(&schedule, &EmployeeRoster::new());
        assert_eq!(report.count("emp_a", "emp_b"), 1);
        assert_eq!(report.count("emp_b", "emp_c"), 1);
        assert_eq!(report.count("emp_a", "emp_c"), 0);
        assert_eq!(report.count("emp_b", "emp_d"), 0);

        let pair = report.pair("emp_c", "emp_b").unwrap();
        assert_eq!(pair.details[0].shift, WorkingShift::Middle);
        assert_eq!(pair.details[0].partner_shift, WorkingShift::Night);
    }

    #[test]
    fn test_leave_and_unrecognized_codes_do_not_pair() {
        let schedule = january(&[("emp_a", "特,??"), ("emp_b", "特,??")]);

        let report = shift_overlap(&schedule, &EmployeeRoster::new());
        assert!(report.pairs.is_empty());
        assert_eq!(report.employees, vec!["emp_a", "emp_b"]);
    }

    #[test]
    fn test_non_regular_employees_are_excluded() {
        let schedule = january(&[("emp_a", "早"), ("emp_s", "早"), ("emp_x", "早")]);
        let roster = EmployeeRoster::from_categories([
            ("emp_s", EmployeeCategory::Support),
            ("emp_x", EmployeeCategory::Excluded),
        ]);

        let report = shift_overlap(&schedule, &roster);
        assert_eq!(report.employees, vec!["emp_a"]);
        assert!(report.pairs.is_empty());
        assert_eq!(report.summary, OverlapSummary::default());
    }

    #[test]
    fn test_summary_totals() {
        let schedule = january(&[
            ("emp_a", "早,早,早,中"),
            ("emp_b", "早,早,早"),
            ("emp_c", ",,,晚"),
        ]);

        let report = shift_overlap(&schedule, &EmployeeRoster::new());
        assert_eq!(report.count("emp_a", "emp_b"), 3);
        assert_eq!(report.count("emp_a", "emp_c"), 1);
        assert_eq!(
            report.summary,
            OverlapSummary {
                total_overlaps: 4,
                max_overlap: 3,
                total_pairs: 2,
                avg_overlap: Decimal::from(2),
            }
        );
    }

    #[test]
    fn test_average_rounds_to_one_decimal() {
        // Pairs share 2, 2 and 1 days: 5 / 3 = 1.7.
        let schedule = january(&[("emp_a", "早,早,早"), ("emp_b", "早,早"), ("emp_c", "早,,早")]);

        let report = shift_overlap(&schedule, &EmployeeRoster::new());
        assert_eq!(report.summary.total_overlaps, 5);
        assert_eq!(report.summary.total_pairs, 3);
        assert_eq!(report.summary.avg_overlap, Decimal::new(17, 1));
    }

    #[test]
    fn test_empty_schedule() {
        let schedule = MonthlySchedule::new("2026-02".parse().unwrap());

        let report = shift_overlap(&schedule, &EmployeeRoster::new());
        assert!(report.employees.is_empty());
        assert_eq!(report.summary.avg_overlap, Decimal::ZERO);
    }
}
