//! Monthly schedule model.
//!
//! A [`MonthlySchedule`] holds the raw per-employee, per-day codes produced
//! by the schedule editor. Codes stay raw here; [`MonthlySchedule::shift_on`]
//! is the single place they are normalized into [`ShiftCode`]s.

use std::collections::BTreeMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::{EngineError, EngineResult};

use super::{DailyValue, PeriodKey, ShiftCode, is_working_day};

/// Key the editor uses for its revision timestamp inside a schedule document.
pub const LAST_UPDATED_FIELD: &str = "_lastUpdated";

/// One month of shift codes for every employee.
///
/// # Example
///
/// ```
/// use workforce_stats::models::{MonthlySchedule, ShiftCode, WorkingShift};
///
/// let mut schedule = MonthlySchedule::new("2026-01".parse().unwrap());
/// schedule.set_shift("emp_a", 5, "早");
///
/// assert!(schedule.has_data_for("emp_a"));
/// assert_eq!(schedule.shift_on("emp_a", 5), Some(ShiftCode::Working(WorkingShift::Early)));
/// assert_eq!(schedule.shift_on("emp_a", 6), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySchedule {
    /// The month this schedule covers.
    pub period: PeriodKey,
    /// Editor revision marker, if the source provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    /// Raw codes keyed by employee id, then by day of month.
    #[serde(default)]
    pub days: BTreeMap<String, BTreeMap<u32, String>>,
}

impl MonthlySchedule {
    /// Creates an empty schedule for `period`.
    pub fn new(period: PeriodKey) -> Self {
        Self {
            period,
            last_updated: None,
            days: BTreeMap::new(),
        }
    }

    /// Sets the raw code for one employee on one day.
    pub fn set_shift(&mut self, employee_id: &str, day: u32, code: &str) {
        self.days
            .entry(employee_id.to_string())
            .or_default()
            .insert(day, code.to_string());
    }

    /// Sets consecutive days starting at `first_day` from a slice of raw codes.
    pub fn set_shifts(&mut self, employee_id: &str, first_day: u32, codes: &[&str]) {
        for (offset, code) in codes.iter().enumerate() {
            self.set_shift(employee_id, first_day + offset as u32, code);
        }
    }

    /// Parses the editor's document shape:
    /// `{ "<employee>": { "<day>": "<code>", ... }, "_lastUpdated": ... }`.
    ///
    /// Non-string codes are treated as blank and day keys outside the month
    /// are dropped; both are logged.
    pub fn from_json(period: PeriodKey, json: &str) -> EngineResult<Self> {
        let document: Value =
            serde_json::from_str(json).map_err(|e| EngineError::InvalidScheduleDocument {
                message: e.to_string(),
            })?;
        let Value::Object(entries) = document else {
            return Err(EngineError::InvalidScheduleDocument {
                message: "top level must be an object".to_string(),
            });
        };

        let mut schedule = Self::new(period);
        let days_in_month = period.days_in_month();

        for (employee_id, value) in entries {
            if employee_id == LAST_UPDATED_FIELD {
                schedule.last_updated = match value {
                    Value::Null => None,
                    Value::String(s) => Some(s),
                    other => Some(other.to_string()),
                };
                continue;
            }

            let Value::Object(day_codes) = value else {
                return Err(EngineError::InvalidScheduleDocument {
                    message: format!("entry for employee '{employee_id}' must be an object"),
                });
            };

            let employee_days = schedule.days.entry(employee_id.clone()).or_default();
            for (day_key, code) in day_codes {
                let day = match day_key.trim().parse::<u32>() {
                    Ok(day) if (1..=days_in_month).contains(&day) => day,
                    _ => {
                        warn!(
                            period = %period,
                            employee_id = %employee_id,
                            day = %day_key,
                            "Dropping day outside the period"
                        );
                        continue;
                    }
                };
                match code {
                    Value::String(raw) => {
                        employee_days.insert(day, raw);
                    }
                    Value::Null => {}
                    other => {
                        warn!(
                            period = %period,
                            employee_id = %employee_id,
                            day,
                            code = %other,
                            "Treating non-string shift code as blank"
                        );
                    }
                }
            }
        }

        Ok(schedule)
    }

    /// All employee ids present in this schedule, in sorted order.
    pub fn employee_ids(&self) -> impl Iterator<Item = &str> {
        self.days.keys().map(String::as_str)
    }

    /// Whether the employee has an entry at all, even an empty one.
    pub fn has_entry(&self, employee_id: &str) -> bool {
        self.days.contains_key(employee_id)
    }

    /// Whether the employee has at least one non-blank code this month.
    pub fn has_data_for(&self, employee_id: &str) -> bool {
        self.days
            .get(employee_id)
            .is_some_and(|codes| codes.values().any(|code| !code.trim().is_empty()))
    }

    /// The normalized code for one employee on one day; `None` when blank or missing.
    pub fn shift_on(&self, employee_id: &str, day: u32) -> Option<ShiftCode> {
        self.days
            .get(employee_id)
            .and_then(|codes| codes.get(&day))
            .and_then(|raw| ShiftCode::parse(raw))
    }

    /// A digest of the schedule's contents, stable for the lifetime of the process.
    ///
    /// Used in cache fingerprints so an edited schedule never hits a result
    /// computed from its previous contents.
    pub fn content_digest(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.period.hash(&mut hasher);
        self.last_updated.hash(&mut hasher);
        self.days.hash(&mut hasher);
        hasher.finish()
    }

    /// Number of counted employees working on each day of the month.
    pub fn daily_headcount<F>(&self, mut is_counted: F) -> Vec<DailyValue>
    where
        F: FnMut(&str) -> bool,
    {
        let counted: Vec<&str> = self.employee_ids().filter(|id| is_counted(*id)).collect();

        self.period
            .days()
            .map(|(day, date)| {
                let working = counted
                    .iter()
                    .filter(|id| is_working_day(self.shift_on(**id, day)))
                    .count();
                DailyValue {
                    date,
                    value: Decimal::from(working as u64),
                }
            })
            .collect()
    }
}
