//! Ranking and spread helpers for report rows.

use rust_decimal::prelude::{MathematicalOps, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::models::{CrossPeriodReport, CrossPeriodStats, Metric};

use super::round_one_decimal;

/// Change beyond which a series counts as rising or falling, in percent.
const TREND_THRESHOLD_PERCENT: i64 = 5;

/// One report row placed in a ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedRow {
    /// The employee.
    pub employee_id: String,
    /// Name shown in reports.
    pub display_name: String,
    /// The ranked average.
    pub value: Decimal,
    /// 1-based position, highest value first.
    pub rank: u32,
    /// Share of rows at or above this value, 0-100.
    pub percentile: u32,
}

/// Direction of a series from its first to its last value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    /// More than 5 % above the first value.
    Rising,
    /// More than 5 % below the first value.
    Falling,
    /// Within 5 %, or too little data to tell.
    Stable,
}

/// Fatigue risk implied by a longest run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakRisk {
    /// Under four consecutive days.
    Low,
    /// Four or five consecutive days.
    Medium,
    /// Six or more consecutive days.
    High,
}

/// Percentile of `value` among `values`.
///
/// Finds the first value at or above `value` in ascending order and reports
/// the share of values from that position up, rounded to a whole percent.
pub fn percentile(values: &[Decimal], value: Decimal) -> u32 {
    if values.is_empty() {
        return 0;
    }
    let mut sorted = values.to_vec();
    sorted.sort();
    let n = sorted.len();
    let index = sorted.iter().position(|v| *v >= value).unwrap_or(n);
    let share = Decimal::from((n - index) as u64) / Decimal::from(n as u64) * Decimal::ONE_HUNDRED;
    share
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
        .unwrap_or(0)
}

/// Ranks report rows by one metric's per-period average.
///
/// Rows are ordered highest first; equal values keep employee id order.
///
/// # Example
///
/// ```
/// use workforce_stats::calculation::{build_report, rank_rows, RuleTable};
/// use workforce_stats::models::{EmployeeRoster, Metric, MonthlySchedule};
///
/// let mut schedule = MonthlySchedule::new("2026-01".parse().unwrap());
/// schedule.set_shifts("emp_a", 1, &["早"]);
/// schedule.set_shifts("emp_b", 1, &["早", "早"]);
///
/// let report = build_report(&[schedule], &EmployeeRoster::new(), &RuleTable::default());
/// let ranked = rank_rows(&report, Metric::Early);
/// assert_eq!(ranked[0].employee_id, "emp_b");
/// assert_eq!(ranked[0].rank, 1);
/// assert_eq!(ranked[0].percentile, 50);
/// assert_eq!(ranked[1].percentile, 100);
/// ```
pub fn rank_rows(report: &CrossPeriodReport, metric: Metric) -> Vec<RankedRow> {
    let values: Vec<Decimal> = report.rows.iter().map(|row| row.average(metric)).collect();

    let mut rows: Vec<&CrossPeriodStats> = report.rows.iter().collect();
    rows.sort_by(|a, b| {
        b.average(metric)
            .cmp(&a.average(metric))
            .then_with(|| a.employee_id.cmp(&b.employee_id))
    });

    rows.into_iter()
        .enumerate()
        .map(|(index, row)| {
            let value = row.average(metric);
            RankedRow {
                employee_id: row.employee_id.clone(),
                display_name: row.display_name.clone(),
                value,
                rank: index as u32 + 1,
                percentile: percentile(&values, value),
            }
        })
        .collect()
}

/// Classifies the change from the first to the last value.
pub fn trend(values: &[Decimal]) -> Trend {
    let (Some(first), Some(last)) = (values.first(), values.last()) else {
        return Trend::Stable;
    };
    if values.len() < 2 || first.is_zero() {
        return Trend::Stable;
    }

    let change = (*last - *first) / *first * Decimal::ONE_HUNDRED;
    let threshold = Decimal::from(TREND_THRESHOLD_PERCENT);
    if change > threshold {
        Trend::Rising
    } else if change < -threshold {
        Trend::Falling
    } else {
        Trend::Stable
    }
}

/// Population standard deviation rounded to one decimal; zero for fewer than two values.
pub fn standard_deviation(values: &[Decimal]) -> Decimal {
    if values.len() < 2 {
        return Decimal::ZERO;
    }
    let n = Decimal::from(values.len() as u64);
    let mean = values.iter().copied().sum::<Decimal>() / n;
    let variance = values
        .iter()
        .map(|v| (*v - mean) * (*v - mean))
        .sum::<Decimal>()
        / n;
    variance
        .sqrt()
        .map(round_one_decimal)
        .unwrap_or(Decimal::ZERO)
}

/// Risk level for a longest run of consecutive working days.
pub fn streak_risk(max_run: u32) -> StreakRisk {
    match max_run {
        6.. => StreakRisk::High,
        4..=5 => StreakRisk::Medium,
        _ => StreakRisk::Low,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PeriodAverages, PeriodKey};

    fn dec(values: &[i64]) -> Vec<Decimal> {
        values.iter().map(|v| Decimal::from(*v)).collect()
    }

    fn row(id: &str, early: Decimal) -> CrossPeriodStats {
        CrossPeriodStats {
            employee_id: id.to_string(),
            display_name: id.to_uppercase(),
            hire_period: "2026-01".parse::<PeriodKey>().unwrap(),
            periods_counted: 1,
            totals: Default::default(),
            averages: PeriodAverages {
                early,
                ..Default::default()
            },
            cross_period: Default::default(),
        }
    }

    #[test]
    fn test_percentile_of_sorted_values() {
        let values = dec(&[4, 1, 3, 2]);
        assert_eq!(percentile(&values, Decimal::from(4)), 25);
        assert_eq!(percentile(&values, Decimal::from(3)), 50);
        assert_eq!(percentile(&values, Decimal::from(1)), 100);
        assert_eq!(percentile(&[], Decimal::from(1)), 0);
    }

    #[test]
    fn test_percentile_with_ties() {
        let values = dec(&[2, 2, 5]);
        assert_eq!(percentile(&values, Decimal::from(2)), 100);
        assert_eq!(percentile(&values, Decimal::from(5)), 33);
    }

    #[test]
    fn test_rank_rows_orders_descending_with_id_tiebreak() {
        let report = CrossPeriodReport {
            periods: vec![],
            rows: vec![
                row("emp_a", Decimal::new(15, 1)),
                row("emp_b", Decimal::from(3)),
                row("emp_c", Decimal::new(15, 1)),
            ],
        };

        let ranked = rank_rows(&report, Metric::Early);
        let ids: Vec<&str> = ranked.iter().map(|r| r.employee_id.as_str()).collect();
        assert_eq!(ids, vec!["emp_b", "emp_a", "emp_c"]);
        assert_eq!(ranked.iter().map(|r| r.rank).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(ranked[0].percentile, 33);
        assert_eq!(ranked[1].percentile, 100);
        assert_eq!(ranked[1].display_name, "EMP_A");
    }

    #[test]
    fn test_trend_thresholds() {
        assert_eq!(trend(&dec(&[10, 12])), Trend::Rising);
        assert_eq!(trend(&dec(&[10, 8])), Trend::Falling);
        assert_eq!(trend(&dec(&[100, 90, 105])), Trend::Stable);
        assert_eq!(trend(&dec(&[100, 105])), Trend::Stable);
        assert_eq!(trend(&dec(&[7])), Trend::Stable);
        assert_eq!(trend(&dec(&[0, 4])), Trend::Stable);
    }

    #[test]
    fn test_standard_deviation_is_population() {
        // Mean 5, squared deviations sum to 32 over 8 values.
        let values = dec(&[2, 4, 4, 4, 5, 5, 7, 9]);
        assert_eq!(standard_deviation(&values), Decimal::from(2));
        assert_eq!(standard_deviation(&dec(&[1, 2])), Decimal::new(5, 1));
        assert_eq!(standard_deviation(&dec(&[3])), Decimal::ZERO);
    }

    #[test]
    fn test_streak_risk_levels() {
        assert_eq!(streak_risk(0), StreakRisk::Low);
        assert_eq!(streak_risk(3), StreakRisk::Low);
        assert_eq!(streak_risk(4), StreakRisk::Medium);
        assert_eq!(streak_risk(5), StreakRisk::Medium);
        assert_eq!(streak_risk(6), StreakRisk::High);
        assert_eq!(streak_risk(12), StreakRisk::High);
    }
}
