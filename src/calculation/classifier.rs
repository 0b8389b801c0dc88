//! Day-type classification.
//!
//! Every date gets a *set* of tags. The tags overlap by definition: Friday
//! is both a weekday and part of the weekend, and a public holiday keeps its
//! weekday/weekend tags. Consumers must credit a day to each of its tags.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use super::HolidayCalendar;

/// One category a date can belong to.
///
/// The declaration order is the display order of tag reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayTag {
    /// Monday through Friday.
    Weekday,
    /// Friday through Sunday.
    Weekend,
    /// A listed public holiday.
    PublicHoliday,
    /// One of the two days before a holiday block start.
    PreHoliday,
}

impl DayTag {
    /// All tags in display order.
    pub const ALL: [DayTag; 4] = [
        DayTag::Weekday,
        DayTag::Weekend,
        DayTag::PublicHoliday,
        DayTag::PreHoliday,
    ];
}

impl fmt::Display for DayTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayTag::Weekday => write!(f, "Weekday"),
            DayTag::Weekend => write!(f, "Weekend"),
            DayTag::PublicHoliday => write!(f, "Public holiday"),
            DayTag::PreHoliday => write!(f, "Pre-holiday"),
        }
    }
}

/// Returns true for Monday through Friday.
pub fn is_weekday(weekday: Weekday) -> bool {
    !matches!(weekday, Weekday::Sat | Weekday::Sun)
}

/// Returns true for Friday, Saturday and Sunday.
pub fn is_weekend(weekday: Weekday) -> bool {
    matches!(weekday, Weekday::Fri | Weekday::Sat | Weekday::Sun)
}

/// Classifies a calendar date into its set of tags.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use workforce_stats::calculation::{classify, DayTag, StaticHolidayCalendar};
///
/// let calendar = StaticHolidayCalendar::default();
/// // 2026-01-09 is a Friday.
/// let tags = classify(NaiveDate::from_ymd_opt(2026, 1, 9).unwrap(), &calendar);
/// assert!(tags.contains(&DayTag::Weekday));
/// assert!(tags.contains(&DayTag::Weekend));
/// ```
pub fn classify(date: NaiveDate, calendar: &dyn HolidayCalendar) -> BTreeSet<DayTag> {
    let mut tags = BTreeSet::new();
    let weekday = date.weekday();

    if is_weekday(weekday) {
        tags.insert(DayTag::Weekday);
    }
    if is_weekend(weekday) {
        tags.insert(DayTag::Weekend);
    }
    if calendar.is_public_holiday(date) {
        tags.insert(DayTag::PublicHoliday);
    }
    if calendar.is_pre_holiday(date) {
        tags.insert(DayTag::PreHoliday);
    }

    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::StaticHolidayCalendar;

    fn make_date(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
    }

    fn tags(list: &[DayTag]) -> BTreeSet<DayTag> {
        list.iter().copied().collect()
    }

    #[test]
    fn test_monday_to_thursday_are_weekday_only() {
        let calendar = StaticHolidayCalendar::default();
        // 2026-01-05 is a Monday.
        for day in ["2026-01-05", "2026-01-06", "2026-01-07", "2026-01-08"] {
            assert_eq!(classify(make_date(day), &calendar), tags(&[DayTag::Weekday]), "{day}");
        }
    }

    #[test]
    fn test_friday_is_weekday_and_weekend() {
        let calendar = StaticHolidayCalendar::default();
        assert_eq!(
            classify(make_date("2026-01-09"), &calendar),
            tags(&[DayTag::Weekday, DayTag::Weekend])
        );
    }

    #[test]
    fn test_saturday_and_sunday_are_weekend_only() {
        let calendar = StaticHolidayCalendar::default();
        assert_eq!(classify(make_date("2026-01-10"), &calendar), tags(&[DayTag::Weekend]));
        assert_eq!(classify(make_date("2026-01-11"), &calendar), tags(&[DayTag::Weekend]));
    }

    #[test]
    fn test_friday_public_holiday_carries_three_tags() {
        // 2026-04-03 is a Friday and the start of a holiday block.
        let day = make_date("2026-04-03");
        let calendar = StaticHolidayCalendar::new("TW", [day], [day]);
        assert_eq!(
            classify(day, &calendar),
            tags(&[DayTag::Weekday, DayTag::Weekend, DayTag::PublicHoliday])
        );
    }

    #[test]
    fn test_pre_holiday_tag() {
        let start = make_date("2026-01-01");
        let calendar = StaticHolidayCalendar::new("TW", [start], [start]);
        // 2025-12-31 is a Wednesday.
        assert_eq!(
            classify(make_date("2025-12-31"), &calendar),
            tags(&[DayTag::Weekday, DayTag::PreHoliday])
        );
    }

    #[test]
    fn test_tag_order_and_display() {
        let ordered: Vec<DayTag> = tags(&[DayTag::PreHoliday, DayTag::Weekday, DayTag::PublicHoliday])
            .into_iter()
            .collect();
        assert_eq!(
            ordered,
            vec![DayTag::Weekday, DayTag::PublicHoliday, DayTag::PreHoliday]
        );
        assert_eq!(DayTag::PublicHoliday.to_string(), "Public holiday");
        assert_eq!(serde_json::to_string(&DayTag::PreHoliday).unwrap(), "\"pre_holiday\"");
    }
}
