//! Shift code normalization.
//!
//! Schedules arrive as free-form strings typed into a spreadsheet-like editor,
//! including legacy single-letter encodings. Everything is normalized here, at
//! the boundary, into a closed [`ShiftCode`] so the calculation modules never
//! match on raw strings.

use serde::{Deserialize, Serialize};

/// A shift that counts as a working day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkingShift {
    /// Early shift (早).
    Early,
    /// Middle shift (中; legacy L, LL).
    Middle,
    /// Afternoon shift (午; legacy X, XX).
    Afternoon,
    /// Night shift (晚; legacy Y, A, YY, J, JJ).
    Night,
    /// D7 duty.
    D7,
    /// High-speed rail station duty (高鐵).
    HighSpeedRail,
    /// Central store duty (中央店).
    CentralStore,
}

/// A code that does not count as a working day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonWorkingShift {
    /// Scheduled rest day (休).
    Rest,
    /// Special leave (特).
    Leave,
    /// Any other non-blank code.
    Unrecognized,
}

/// A normalized, non-blank shift code.
///
/// # Example
///
/// ```
/// use workforce_stats::models::{ShiftCode, WorkingShift};
///
/// assert_eq!(ShiftCode::parse(" yy "), Some(ShiftCode::Working(WorkingShift::Night)));
/// assert_eq!(ShiftCode::parse("   "), None);
/// assert!(!ShiftCode::parse("休").unwrap().is_working());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftCode {
    /// Counts toward streaks.
    Working(WorkingShift),
    /// Breaks streaks.
    NonWorking(NonWorkingShift),
}

impl ShiftCode {
    /// Normalizes a raw code. Blank input yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let code = raw.trim();
        if code.is_empty() {
            return None;
        }

        let normalized = match code {
            "早" | "早班" => ShiftCode::Working(WorkingShift::Early),
            "中" | "中班" => ShiftCode::Working(WorkingShift::Middle),
            "午" | "午班" => ShiftCode::Working(WorkingShift::Afternoon),
            "晚" | "晚班" => ShiftCode::Working(WorkingShift::Night),
            "高鐵" => ShiftCode::Working(WorkingShift::HighSpeedRail),
            "中央店" => ShiftCode::Working(WorkingShift::CentralStore),
            "休" => ShiftCode::NonWorking(NonWorkingShift::Rest),
            "特" => ShiftCode::NonWorking(NonWorkingShift::Leave),
            other => Self::parse_latin_alias(other),
        };
        Some(normalized)
    }

    fn parse_latin_alias(code: &str) -> Self {
        match code.to_ascii_uppercase().as_str() {
            "L" | "LL" => ShiftCode::Working(WorkingShift::Middle),
            "X" | "XX" => ShiftCode::Working(WorkingShift::Afternoon),
            "Y" | "YY" | "A" | "J" | "JJ" => ShiftCode::Working(WorkingShift::Night),
            "D7" => ShiftCode::Working(WorkingShift::D7),
            _ => ShiftCode::NonWorking(NonWorkingShift::Unrecognized),
        }
    }

    /// Returns true for codes that extend a streak.
    pub fn is_working(&self) -> bool {
        matches!(self, ShiftCode::Working(_))
    }

    /// The working variant, if any.
    pub fn working(&self) -> Option<WorkingShift> {
        match self {
            ShiftCode::Working(shift) => Some(*shift),
            ShiftCode::NonWorking(_) => None,
        }
    }
}

/// Streak membership of an optional (possibly blank) code.
pub fn is_working_day(code: Option<ShiftCode>) -> bool {
    code.is_some_and(|c| c.is_working())
}
