//! Time-versioned shift counting rules.
//!
//! Which codes count as "early" or "afternoon", and which weekday/shift
//! combination is a stock duty, changed at the 2025-10 roster reform. Rules
//! are kept as a table of eras keyed by the first period they apply to; each
//! period selects its era independently, so a report spanning the cutover
//! mixes both regimes correctly. Adding a new era is one more table entry.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{PeriodKey, WorkingShift};

/// How shifts are bucketed within one era.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    /// Name reported alongside per-period stats.
    pub name: String,
    /// Shifts counted in the early bucket.
    pub early: Vec<WorkingShift>,
    /// Shifts counted in the afternoon bucket.
    pub afternoon: Vec<WorkingShift>,
    /// Shifts counted as night shifts.
    pub night: Vec<WorkingShift>,
    /// Weekday on which stock arrives.
    pub stock_weekday: Weekday,
    /// Shifts that receive stock on that weekday.
    pub stock_shifts: Vec<WorkingShift>,
}

impl RuleSet {
    /// Rules in force before the 2025-10 reform.
    pub fn legacy() -> Self {
        Self {
            name: "legacy".to_string(),
            early: vec![WorkingShift::Early],
            afternoon: vec![WorkingShift::Middle],
            night: vec![WorkingShift::Night],
            stock_weekday: Weekday::Wed,
            stock_shifts: vec![WorkingShift::Middle, WorkingShift::Night],
        }
    }

    /// Rules in force from 2025-10: early and middle merge, afternoon is its own shift.
    pub fn reform_2025_10() -> Self {
        Self {
            name: "2025-10".to_string(),
            early: vec![WorkingShift::Early, WorkingShift::Middle],
            afternoon: vec![WorkingShift::Afternoon],
            night: vec![WorkingShift::Night],
            stock_weekday: Weekday::Wed,
            stock_shifts: vec![WorkingShift::Afternoon, WorkingShift::Night],
        }
    }

    /// Returns true if the shift counts in the early bucket.
    pub fn is_early(&self, shift: WorkingShift) -> bool {
        self.early.contains(&shift)
    }

    /// Returns true if the shift counts in the afternoon bucket.
    pub fn is_afternoon(&self, shift: WorkingShift) -> bool {
        self.afternoon.contains(&shift)
    }

    /// Returns true if the shift counts as a night shift.
    pub fn is_night(&self, shift: WorkingShift) -> bool {
        self.night.contains(&shift)
    }

    /// Returns true if working `shift` on `weekday` is a stock duty.
    pub fn is_stock_duty(&self, shift: WorkingShift, weekday: Weekday) -> bool {
        weekday == self.stock_weekday && self.stock_shifts.contains(&shift)
    }
}

/// A rule set and the first period it applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleEra {
    /// First period governed by these rules.
    pub effective_from: PeriodKey,
    /// The rules.
    #[serde(flatten)]
    pub rules: RuleSet,
}

/// Ordered rule eras.
///
/// # Example
///
/// ```
/// use workforce_stats::calculation::RuleTable;
///
/// let table = RuleTable::default();
/// assert_eq!(table.select("2025-09".parse().unwrap()).name, "legacy");
/// assert_eq!(table.select("2025-10".parse().unwrap()).name, "2025-10");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleTable {
    eras: Vec<RuleEra>,
}

impl RuleTable {
    /// Builds a table, sorting eras by their start period.
    ///
    /// Fails if there are no eras or two eras start in the same period.
    pub fn new(mut eras: Vec<RuleEra>) -> EngineResult<Self> {
        if eras.is_empty() {
            return Err(EngineError::InvalidSettings {
                field: "rules.eras".to_string(),
                message: "at least one rule era is required".to_string(),
            });
        }
        eras.sort_by_key(|era| era.effective_from);
        if let Some(pair) = eras
            .windows(2)
            .find(|pair| pair[0].effective_from == pair[1].effective_from)
        {
            return Err(EngineError::InvalidSettings {
                field: "rules.eras".to_string(),
                message: format!("two eras start in {}", pair[0].effective_from),
            });
        }
        Ok(Self { eras })
    }

    /// The rules governing `period`.
    ///
    /// Periods before the first era use the first era.
    pub fn select(&self, period: PeriodKey) -> &RuleSet {
        let era = self
            .eras
            .iter()
            .rev()
            .find(|era| era.effective_from <= period)
            .unwrap_or(&self.eras[0]);
        &era.rules
    }

    /// All eras in chronological order.
    pub fn eras(&self) -> &[RuleEra] {
        &self.eras
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self {
            eras: vec![
                RuleEra {
                    effective_from: era_start(1, 1),
                    rules: RuleSet::legacy(),
                },
                RuleEra {
                    effective_from: era_start(2025, 10),
                    rules: RuleSet::reform_2025_10(),
                },
            ],
        }
    }
}

// Only called with literal valid months.
fn era_start(year: i32, month: u32) -> PeriodKey {
    PeriodKey::new(year, month).unwrap_or_else(|| PeriodKey::of_date(chrono::NaiveDate::MIN))
}

impl<'de> Deserialize<'de> for RuleTable {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct RawTable {
            eras: Vec<RuleEra>,
        }
        let raw = RawTable::deserialize(deserializer)?;
        RuleTable::new(raw.eras).map_err(serde::de::Error::custom)
    }
}
