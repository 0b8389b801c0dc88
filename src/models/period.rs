//! Monthly period keys.
//!
//! A period is one calendar month of schedule data, identified by a
//! `YYYY-MM` key. Keys order chronologically, which the stitcher relies on
//! when it concatenates periods into one timeline.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{EngineError, EngineResult};

/// Identifies one calendar month.
///
/// # Example
///
/// ```
/// use workforce_stats::models::PeriodKey;
///
/// let period: PeriodKey = "2025-12".parse().unwrap();
/// assert_eq!(period.days_in_month(), 31);
/// assert_eq!(period.next().to_string(), "2026-01");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeriodKey {
    year: i32,
    month: u32,
}

impl PeriodKey {
    /// Creates a period key.
    ///
    /// Returns `None` if the month is not 1-12 or the year lies outside the
    /// range of calendar dates chrono can represent.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        let years = NaiveDate::MIN.year()..=NaiveDate::MAX.year();
        ((1..=12).contains(&month) && years.contains(&year)).then_some(Self { year, month })
    }

    /// The period containing `date`.
    pub fn of_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The calendar year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The calendar month (1-12).
    pub fn month(&self) -> u32 {
        self.month
    }

    /// The first day of the month.
    pub fn first_day(&self) -> NaiveDate {
        // Keys are range-checked on construction.
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// The following month, saturating at the last representable month.
    pub fn next(&self) -> Self {
        let following = if self.month == 12 {
            Self::new(self.year.saturating_add(1), 1)
        } else {
            Self::new(self.year, self.month + 1)
        };
        following.unwrap_or(*self)
    }

    /// Number of days in the month, leap years included.
    pub fn days_in_month(&self) -> u32 {
        (28..=31)
            .rev()
            .find(|&day| self.date(day).is_some())
            .unwrap_or(28)
    }

    /// The calendar date of `day` within this month, if it exists.
    pub fn date(&self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }

    /// Iterates `(day_number, date)` for every day of the month.
    pub fn days(&self) -> impl Iterator<Item = (u32, NaiveDate)> + '_ {
        (1..=self.days_in_month()).filter_map(|day| self.date(day).map(|date| (day, date)))
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for PeriodKey {
    type Err = EngineError;

    fn from_str(s: &str) -> EngineResult<Self> {
        let invalid = || EngineError::InvalidPeriodKey {
            value: s.to_string(),
        };
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.is_empty() || month.len() > 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        PeriodKey::new(year, month).ok_or_else(invalid)
    }
}

impl Serialize for PeriodKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PeriodKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> PeriodKey {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_and_display_round_trip() {
        assert_eq!(key("2025-10").to_string(), "2025-10");
        assert_eq!(key("2026-1").to_string(), "2026-01");
    }

    #[test]
    fn test_parse_rejects_malformed_keys() {
        for bad in ["2025", "2025-13", "2025-00", "25-10", "2025/10", "abcd-ef", ""] {
            assert!(
                matches!(bad.parse::<PeriodKey>(), Err(EngineError::InvalidPeriodKey { .. })),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_days_in_month_handles_leap_years() {
        assert_eq!(key("2024-02").days_in_month(), 29);
        assert_eq!(key("2025-02").days_in_month(), 28);
        assert_eq!(key("2025-04").days_in_month(), 30);
        assert_eq!(key("2025-12").days_in_month(), 31);
    }

    #[test]
    fn test_next_rolls_over_year() {
        assert_eq!(key("2025-12").next(), key("2026-01"));
        assert_eq!(key("2026-01").next(), key("2026-02"));
    }

    #[test]
    fn test_new_rejects_years_outside_calendar_range() {
        assert!(PeriodKey::new(i32::MAX, 1).is_none());
        assert!(PeriodKey::new(i32::MIN, 12).is_none());
        assert!(PeriodKey::new(NaiveDate::MAX.year() + 1, 1).is_none());
        assert!(PeriodKey::new(2026, 13).is_none());
        assert_eq!(PeriodKey::new(2026, 3), Some(key("2026-03")));
    }

    #[test]
    fn test_last_representable_month_is_well_formed() {
        let last = PeriodKey::new(NaiveDate::MAX.year(), 12).unwrap();
        assert_eq!(last.next(), last);
        assert_eq!(last.days_in_month(), 31);
        assert_eq!(last.first_day(), NaiveDate::from_ymd_opt(NaiveDate::MAX.year(), 12, 1).unwrap());

        let first = PeriodKey::new(NaiveDate::MIN.year(), 1).unwrap();
        assert_eq!(first.first_day(), NaiveDate::MIN);
        assert_eq!(first.next().month(), 2);
    }

    #[test]
    fn test_ordering_is_chronological() {
        let mut keys = vec![key("2026-01"), key("2025-10"), key("2025-09"), key("2025-12")];
        keys.sort();
        let printed: Vec<String> = keys.iter().map(ToString::to_string).collect();
        assert_eq!(printed, vec!["2025-09", "2025-10", "2025-12", "2026-01"]);
    }

    #[test]
    fn test_days_iterates_whole_month() {
        let days: Vec<(u32, NaiveDate)> = key("2026-02").days().collect();
        assert_eq!(days.len(), 28);
        assert_eq!(days[0].1, NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
        assert_eq!(days[27].0, 28);
    }

    #[test]
    fn test_serde_uses_string_form() {
        let json = serde_json::to_string(&key("2025-10")).unwrap();
        assert_eq!(json, "\"2025-10\"");
        let back: PeriodKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key("2025-10"));
    }
}
