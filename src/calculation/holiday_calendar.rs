//! Public holiday and pre-holiday lookup.
//!
//! Public holidays are listed date by date, including every day of a
//! multi-day block. Pre-holiday dates are derived: the two calendar days
//! before each block start. Only block starts produce a pre-holiday window;
//! the middle and end days of a block do not.

use std::collections::BTreeSet;

use chrono::{Days, NaiveDate};
use tracing::warn;

use crate::config::HolidayTable;

/// Number of days before a block start that count as pre-holiday.
pub const PRE_HOLIDAY_WINDOW_DAYS: u64 = 2;

/// Holiday lookup used by the day classifier.
///
/// Implementations are swapped per region or year without touching callers.
pub trait HolidayCalendar: Send + Sync {
    /// Returns true if `date` is a public holiday.
    fn is_public_holiday(&self, date: NaiveDate) -> bool;

    /// Returns true if `date` falls in the window before a holiday block start.
    fn is_pre_holiday(&self, date: NaiveDate) -> bool;
}

/// A holiday calendar backed by fixed date tables.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use workforce_stats::calculation::{HolidayCalendar, StaticHolidayCalendar};
///
/// let new_year = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
/// let calendar = StaticHolidayCalendar::new("TW", [new_year], [new_year]);
///
/// assert!(calendar.is_public_holiday(new_year));
/// assert!(calendar.is_pre_holiday(NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()));
/// assert!(calendar.is_pre_holiday(NaiveDate::from_ymd_opt(2025, 12, 30).unwrap()));
/// assert!(!calendar.is_pre_holiday(NaiveDate::from_ymd_opt(2025, 12, 29).unwrap()));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticHolidayCalendar {
    region: String,
    public_holidays: BTreeSet<NaiveDate>,
    block_starts: BTreeSet<NaiveDate>,
    pre_holidays: BTreeSet<NaiveDate>,
}

impl StaticHolidayCalendar {
    /// Builds a calendar from explicit holiday dates and block start dates.
    pub fn new<H, B>(region: &str, public_holidays: H, block_starts: B) -> Self
    where
        H: IntoIterator<Item = NaiveDate>,
        B: IntoIterator<Item = NaiveDate>,
    {
        let mut calendar = Self {
            region: region.to_string(),
            ..Self::default()
        };
        calendar.extend(public_holidays, block_starts);
        calendar
    }

    /// Merges several yearly tables into one calendar.
    ///
    /// The region of the first table names the calendar. A table without
    /// block starts has them inferred from its runs of consecutive holidays.
    pub fn from_tables(tables: &[HolidayTable]) -> Self {
        let region = tables.first().map(|t| t.region.as_str()).unwrap_or_default();
        let mut calendar = Self {
            region: region.to_string(),
            ..Self::default()
        };
        for table in tables {
            let block_starts = if table.block_starts.is_empty() {
                infer_block_starts(table.public_holidays.iter().copied())
            } else {
                table.block_starts.clone()
            };
            calendar.extend(table.public_holidays.iter().copied(), block_starts);
        }
        calendar
    }

    fn extend<H, B>(&mut self, public_holidays: H, block_starts: B)
    where
        H: IntoIterator<Item = NaiveDate>,
        B: IntoIterator<Item = NaiveDate>,
    {
        self.public_holidays.extend(public_holidays);

        for start in block_starts {
            if !self.public_holidays.contains(&start) {
                warn!(
                    region = %self.region,
                    block_start = %start,
                    "Holiday block start is not listed as a public holiday"
                );
            }
            self.block_starts.insert(start);
            self.pre_holidays.extend(pre_holiday_window(start));
        }
    }

    /// The region this calendar covers.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Every public holiday date.
    pub fn public_holiday_dates(&self) -> &BTreeSet<NaiveDate> {
        &self.public_holidays
    }

    /// Every configured block start date.
    pub fn block_start_dates(&self) -> &BTreeSet<NaiveDate> {
        &self.block_starts
    }

    /// Every derived pre-holiday date.
    pub fn pre_holiday_dates(&self) -> &BTreeSet<NaiveDate> {
        &self.pre_holidays
    }
}

impl HolidayCalendar for StaticHolidayCalendar {
    fn is_public_holiday(&self, date: NaiveDate) -> bool {
        self.public_holidays.contains(&date)
    }

    fn is_pre_holiday(&self, date: NaiveDate) -> bool {
        self.pre_holidays.contains(&date)
    }
}

/// The dates in the pre-holiday window of one block start, nearest first.
pub fn pre_holiday_window(block_start: NaiveDate) -> Vec<NaiveDate> {
    (1..=PRE_HOLIDAY_WINDOW_DAYS)
        .filter_map(|n| block_start.checked_sub_days(Days::new(n)))
        .collect()
}

/// Finds the first day of every contiguous run in a set of holiday dates.
///
/// Useful when a holiday table lists dates but not block starts.
pub fn infer_block_starts<I>(public_holidays: I) -> Vec<NaiveDate>
where
    I: IntoIterator<Item = NaiveDate>,
{
    let dates: BTreeSet<NaiveDate> = public_holidays.into_iter().collect();
    dates
        .iter()
        .filter(|date| date.pred_opt().is_none_or(|prev| !dates.contains(&prev)))
        .copied()
        .collect()
}
