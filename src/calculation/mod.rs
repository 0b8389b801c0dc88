//! Calculation logic for the statistics engine.
//!
//! This module contains the pure functions that turn schedules and metric
//! series into statistics: holiday lookup and day-type classification,
//! time-versioned shift counting rules, per-period aggregation, the
//! cross-period stitcher and its consecutive-run scanner, tag aggregation,
//! co-worker overlap, historical comparison, and the ranking helpers used
//! by dashboards.

mod classifier;
mod cross_period;
mod historical;
mod holiday_calendar;
mod overlap;
mod period_aggregator;
mod ranking;
mod rule_set;
mod streak;
mod tag_aggregator;

use rust_decimal::{Decimal, RoundingStrategy};

pub use classifier::{DayTag, classify, is_weekday, is_weekend};
pub use cross_period::{
    aggregate_across_periods, build_report, build_timeline, hire_period, monthly_details,
};
pub use historical::{
    HistoricalComparison, PeriodSummary, SampleStatus, ShiftedComparison, compare, summarize,
};
pub use holiday_calendar::{
    HolidayCalendar, PRE_HOLIDAY_WINDOW_DAYS, StaticHolidayCalendar, infer_block_starts,
    pre_holiday_window,
};
pub use overlap::{OverlapDay, OverlapPair, OverlapReport, OverlapSummary, shift_overlap};
pub use period_aggregator::{aggregate_month, stock_week};
pub use ranking::{
    RankedRow, StreakRisk, Trend, percentile, rank_rows, standard_deviation, streak_risk, trend,
};
pub use rule_set::{RuleEra, RuleSet, RuleTable};
pub use streak::{TimelineDay, compute_runs, compute_timeline_runs, summarize_runs};
pub use tag_aggregator::{TagRow, aggregate_by_tag};

/// Rounds to one decimal place, halves away from zero.
pub(crate) fn round_one_decimal(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

/// `numerator / denominator` rounded to one decimal; zero when the denominator is zero.
pub(crate) fn mean_one_decimal(numerator: Decimal, denominator: u64) -> Decimal {
    if denominator == 0 {
        return Decimal::ZERO;
    }
    round_one_decimal(numerator / Decimal::from(denominator))
}
