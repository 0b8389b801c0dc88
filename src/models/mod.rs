//! Core data models for the statistics engine.
//!
//! Inputs (periods, schedules, employees, metric series) and the derived
//! result rows handed back to callers.

mod employee;
mod metric;
mod period;
mod schedule;
mod shift_code;
mod statistics;

pub use employee::{Employee, EmployeeCategory, EmployeeRoster};
pub use metric::{DailyValue, MetricSeries, MetricSource};
pub use period::PeriodKey;
pub use schedule::{LAST_UPDATED_FIELD, MonthlySchedule};
pub use shift_code::{NonWorkingShift, ShiftCode, WorkingShift, is_working_day};
pub use statistics::{
    CrossPeriodReport, CrossPeriodStats, CrossPeriodStreaks, Metric, PeriodAverages, PeriodStats,
    PeriodTotals, StreakStats,
};
