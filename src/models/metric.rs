//! Daily metric series.
//!
//! The tag aggregator and the historical comparator work on plain
//! `(date, value)` series: a daily flight count, a daily staffing headcount,
//! or anything else a feed can provide.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One day's value of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyValue {
    /// The calendar date.
    pub date: NaiveDate,
    /// The metric value for that date.
    pub value: Decimal,
}

/// Lookup of a metric by calendar date.
///
/// Implemented by [`MetricSeries`]; callers backed by another store can
/// implement it directly. A `None` means "no data for that date", which is
/// distinct from a recorded zero.
pub trait MetricSource {
    /// The value recorded for `date`, if any.
    fn value_on(&self, date: NaiveDate) -> Option<Decimal>;
}

/// An in-memory metric series keyed by date.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// use workforce_stats::models::{MetricSeries, MetricSource};
///
/// let day = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
/// let mut series = MetricSeries::new();
/// series.insert(day, Decimal::from(42));
///
/// assert_eq!(series.value_on(day), Some(Decimal::from(42)));
/// assert_eq!(series.value_on(day.succ_opt().unwrap()), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSeries {
    values: BTreeMap<NaiveDate, Decimal>,
}

impl MetricSeries {
    /// Creates an empty series.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records (or replaces) the value for a date.
    pub fn insert(&mut self, date: NaiveDate, value: Decimal) {
        self.values.insert(date, value);
    }

    /// Number of dates with a value.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the series holds no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values between `start` and `end` (inclusive), in date order.
    pub fn range(&self, start: NaiveDate, end: NaiveDate) -> Vec<DailyValue> {
        if start > end {
            return Vec::new();
        }
        self.values
            .range(start..=end)
            .map(|(date, value)| DailyValue {
                date: *date,
                value: *value,
            })
            .collect()
    }
}

impl FromIterator<DailyValue> for MetricSeries {
    fn from_iter<I: IntoIterator<Item = DailyValue>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|d| (d.date, d.value)).collect(),
        }
    }
}

impl MetricSource for MetricSeries {
    fn value_on(&self, date: NaiveDate) -> Option<Decimal> {
        self.values.get(&date).copied()
    }
}
