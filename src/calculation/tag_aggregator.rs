//! Per-tag aggregation of a daily metric series.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::DailyValue;

use super::{DayTag, HolidayCalendar, classify, mean_one_decimal};

/// Aggregate of a daily series over the days carrying one tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRow {
    /// The tag.
    pub tag: DayTag,
    /// Sum of the values on tagged days.
    pub total: Decimal,
    /// Number of tagged days in the series.
    pub days: u32,
    /// `total / days`, rounded to one decimal.
    pub average: Decimal,
}

/// Aggregates a daily series by day tag.
///
/// Each day is credited to every tag in its set, so a Friday public holiday
/// contributes to the weekday, weekend and public holiday rows alike. Rows
/// come back in [`DayTag::ALL`] order; tags with no days are omitted.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// use workforce_stats::calculation::{aggregate_by_tag, DayTag, StaticHolidayCalendar};
/// use workforce_stats::models::DailyValue;
///
/// let calendar = StaticHolidayCalendar::default();
/// let series = vec![DailyValue {
///     // A Friday.
///     date: NaiveDate::from_ymd_opt(2026, 1, 9).unwrap(),
///     value: Decimal::from(12),
/// }];
///
/// let rows = aggregate_by_tag(&series, &calendar);
/// let tags: Vec<DayTag> = rows.iter().map(|r| r.tag).collect();
/// assert_eq!(tags, vec![DayTag::Weekday, DayTag::Weekend]);
/// ```
pub fn aggregate_by_tag(series: &[DailyValue], calendar: &dyn HolidayCalendar) -> Vec<TagRow> {
    let mut sums: BTreeMap<DayTag, (Decimal, u32)> = BTreeMap::new();

    for point in series {
        for tag in classify(point.date, calendar) {
            let entry = sums.entry(tag).or_insert((Decimal::ZERO, 0));
            entry.0 += point.value;
            entry.1 += 1;
        }
    }

    DayTag::ALL
        .iter()
        .filter_map(|tag| {
            let (total, days) = sums.get(tag).copied()?;
            Some(TagRow {
                tag: *tag,
                total,
                days,
                average: mean_one_decimal(total, u64::from(days)),
            })
        })
        .collect()
}
