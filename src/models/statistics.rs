//! Statistics result models.
//!
//! These are the rows the engine hands to dashboards: per-period stats for one
//! employee, cross-period aggregates, and the report that bundles them. They
//! are derived data and are recomputed whenever their inputs change.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::PeriodKey;

/// Summary of the working runs found in a day sequence.
///
/// # Example
///
/// ```
/// use workforce_stats::models::StreakStats;
///
/// let empty = StreakStats::default();
/// assert!(empty.runs.is_empty());
/// assert_eq!(empty.max_run, 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakStats {
    /// Length of every closed run, in sequence order.
    pub runs: Vec<u32>,
    /// Longest run, or 0 when there are none.
    pub max_run: u32,
    /// Mean run length rounded to one decimal, or 0 when there are none.
    pub avg_run: Decimal,
}

impl StreakStats {
    /// Total working days covered by the runs.
    pub fn working_days(&self) -> u32 {
        self.runs.iter().sum()
    }
}

/// Streaks over a multi-period timeline.
///
/// All fields stay at zero when the employee has data for only one period,
/// meaning "no cross-period signal yet".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossPeriodStreaks {
    /// Every run on the concatenated timeline.
    pub runs: Vec<u32>,
    /// Longest run on the timeline.
    pub max_run: u32,
    /// Mean run length on the timeline, rounded to one decimal.
    pub avg_run: Decimal,
    /// Number of runs that span at least one period seam.
    pub boundary_runs: u32,
}

/// Counts derived from one employee's schedule in one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodStats {
    /// The period these counts describe.
    pub period: PeriodKey,
    /// Name of the rule era used to bucket shifts.
    pub rule_era: String,
    /// Shifts counted in the early bucket.
    pub early: u32,
    /// Shifts counted in the afternoon bucket.
    pub afternoon: u32,
    /// Night shifts.
    pub night: u32,
    /// Stock (inventory receiving) duties.
    pub stock: u32,
    /// Week numbers (`ceil(day / 7)`) containing a stock duty.
    pub stock_weeks: Vec<u32>,
    /// Every non-blank code, working or not.
    pub total_shifts: u32,
    /// Rest days.
    pub rest: u32,
    /// Leave days.
    pub leave: u32,
    /// Runs within this period only.
    pub streaks: StreakStats,
}

impl PeriodStats {
    /// A zero-valued row for a period without data.
    pub fn empty(period: PeriodKey, rule_era: &str) -> Self {
        Self {
            period,
            rule_era: rule_era.to_string(),
            early: 0,
            afternoon: 0,
            night: 0,
            stock: 0,
            stock_weeks: Vec::new(),
            total_shifts: 0,
            rest: 0,
            leave: 0,
            streaks: StreakStats::default(),
        }
    }
}

/// Sums over the counted periods.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodTotals {
    /// Early bucket total.
    pub early: u32,
    /// Afternoon bucket total.
    pub afternoon: u32,
    /// Night shift total.
    pub night: u32,
    /// Stock duty total.
    pub stock: u32,
    /// Non-blank code total.
    pub total_shifts: u32,
    /// Sum of the per-period average run lengths.
    pub streak_avg_sum: Decimal,
}

/// Per-period averages, each rounded to one decimal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodAverages {
    /// Early shifts per period.
    pub early: Decimal,
    /// Afternoon shifts per period.
    pub afternoon: Decimal,
    /// Night shifts per period.
    pub night: Decimal,
    /// Stock duties per period.
    pub stock: Decimal,
    /// Mean of the per-period average run lengths.
    pub streak: Decimal,
}

/// A metric that report rows can be ranked by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Early shifts per period.
    Early,
    /// Afternoon shifts per period.
    Afternoon,
    /// Night shifts per period.
    Night,
    /// Stock duties per period.
    Stock,
    /// Average run length per period.
    Streak,
}

/// One employee's statistics across every period since hire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossPeriodStats {
    /// The employee.
    pub employee_id: String,
    /// Name shown in reports.
    pub display_name: String,
    /// First period with any non-blank code.
    pub hire_period: PeriodKey,
    /// Periods from hire onward in which the employee has an entry.
    pub periods_counted: u32,
    /// Sums over the counted periods.
    pub totals: PeriodTotals,
    /// `totals / periods_counted`, rounded to one decimal.
    pub averages: PeriodAverages,
    /// Streaks on the concatenated timeline; zero unless more than one period counted.
    pub cross_period: CrossPeriodStreaks,
}

impl CrossPeriodStats {
    /// Returns true if the cross-period streak fields were computed.
    pub fn has_cross_period_signal(&self) -> bool {
        self.periods_counted > 1
    }

    /// The average for `metric`.
    pub fn average(&self, metric: Metric) -> Decimal {
        match metric {
            Metric::Early => self.averages.early,
            Metric::Afternoon => self.averages.afternoon,
            Metric::Night => self.averages.night,
            Metric::Stock => self.averages.stock,
            Metric::Streak => self.averages.streak,
        }
    }
}

/// Cross-period statistics for every regular employee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossPeriodReport {
    /// Periods the report was built from, in chronological order.
    pub periods: Vec<PeriodKey>,
    /// One row per regular employee with a hire period, sorted by id.
    pub rows: Vec<CrossPeriodStats>,
}

impl CrossPeriodReport {
    /// The row for one employee.
    pub fn get(&self, employee_id: &str) -> Option<&CrossPeriodStats> {
        self.rows.iter().find(|row| row.employee_id == employee_id)
    }
}
