//! Consecutive working-day runs.
//!
//! A run is a maximal sequence of working days. Any non-working day (rest,
//! leave, an unrecognized code or a blank) closes the current run.
//!
//! Two entry points share one scanner:
//! - [`compute_runs`] scans a single sequence, typically one period.
//! - [`compute_timeline_runs`] scans a chronological concatenation of
//!   periods. A run that reaches the last day of one period and continues on
//!   the first day of the next is one run, and is also reported as a
//!   boundary run.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{CrossPeriodStreaks, PeriodKey, StreakStats};

use super::round_one_decimal;

/// One day on a multi-period timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineDay {
    /// Calendar date of the day.
    pub date: NaiveDate,
    /// Period the day belongs to.
    pub period: PeriodKey,
    /// Whether the employee worked that day.
    pub is_working: bool,
}

/// Single-pass run scanner.
#[derive(Debug, Default)]
struct RunScanner {
    current: u32,
    current_spans_seam: bool,
    seam_pending: bool,
    runs: Vec<u32>,
    boundary_runs: u32,
}

impl RunScanner {
    fn push(&mut self, is_working: bool) {
        if is_working {
            if self.seam_pending {
                self.current_spans_seam = true;
            }
            self.current += 1;
        } else {
            self.close();
        }
        self.seam_pending = false;
    }

    /// Marks that the next pushed day starts a new period.
    fn seam(&mut self) {
        self.seam_pending = self.current > 0;
    }

    fn close(&mut self) {
        if self.current >= 1 {
            self.runs.push(self.current);
            if self.current_spans_seam {
                self.boundary_runs += 1;
            }
        }
        self.current = 0;
        self.current_spans_seam = false;
        self.seam_pending = false;
    }

    fn finish(mut self) -> (Vec<u32>, u32) {
        self.close();
        (self.runs, self.boundary_runs)
    }
}

/// Summarizes closed run lengths into max and one-decimal mean.
pub fn summarize_runs(runs: Vec<u32>) -> StreakStats {
    if runs.is_empty() {
        return StreakStats::default();
    }
    let total: u32 = runs.iter().sum();
    let avg_run = round_one_decimal(Decimal::from(total) / Decimal::from(runs.len() as u64));
    let max_run = runs.iter().copied().max().unwrap_or(0);
    StreakStats {
        runs,
        max_run,
        avg_run,
    }
}

/// Finds the working runs in one ordered sequence of days.
///
/// # Example
///
/// ```
/// use rust_decimal::Decimal;
/// use workforce_stats::calculation::compute_runs;
///
/// let stats = compute_runs([true, true, false, true, true, true, false]);
/// assert_eq!(stats.runs, vec![2, 3]);
/// assert_eq!(stats.max_run, 3);
/// assert_eq!(stats.avg_run, Decimal::new(25, 1));
/// ```
pub fn compute_runs<I>(sequence: I) -> StreakStats
where
    I: IntoIterator<Item = bool>,
{
    let mut scanner = RunScanner::default();
    for is_working in sequence {
        scanner.push(is_working);
    }
    let (runs, _) = scanner.finish();
    summarize_runs(runs)
}

/// Finds the working runs on a chronological multi-period timeline.
///
/// Consecutive dates in different periods join seamlessly. A gap between
/// dates (a missing period) always closes the current run.
pub fn compute_timeline_runs(days: &[TimelineDay]) -> CrossPeriodStreaks {
    let mut scanner = RunScanner::default();
    let mut previous: Option<&TimelineDay> = None;

    for day in days {
        if let Some(prev) = previous {
            if prev.date.succ_opt() != Some(day.date) {
                scanner.close();
            } else if prev.period != day.period {
                scanner.seam();
            }
        }
        scanner.push(day.is_working);
        previous = Some(day);
    }

    let (runs, boundary_runs) = scanner.finish();
    let stats = summarize_runs(runs);
    CrossPeriodStreaks {
        runs: stats.runs,
        max_run: stats.max_run,
        avg_run: stats.avg_run,
        boundary_runs,
    }
}
