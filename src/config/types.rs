//! Configuration types for the statistics engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files. Every section has a
//! default matching the dashboard's policy, so a partial `engine.yaml`
//! only needs the values it changes.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::RuleTable;
use crate::error::{EngineError, EngineResult};

fn invalid(field: &str, message: impl Into<String>) -> EngineError {
    EngineError::InvalidSettings {
        field: field.to_string(),
        message: message.into(),
    }
}

/// Memoization cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// How long an entry stays fresh, in milliseconds.
    pub ttl_ms: u64,
    /// Entry count that triggers batch eviction.
    pub max_entries: usize,
    /// Whether async fetches may return a stale value while refreshing it.
    pub stale_while_revalidate: bool,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_ms: 5 * 60 * 1000,
            max_entries: 100,
            stale_while_revalidate: true,
        }
    }
}

impl CacheSettings {
    /// Checks that the TTL and capacity are usable.
    pub fn validate(&self) -> EngineResult<()> {
        if self.ttl_ms == 0 {
            return Err(invalid("cache.ttl_ms", "must be greater than zero"));
        }
        if self.max_entries == 0 {
            return Err(invalid("cache.max_entries", "must be greater than zero"));
        }
        Ok(())
    }
}

/// Historical comparison settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonSettings {
    /// Offsets, in days, to compare the current series against.
    pub offsets_days: Vec<u32>,
    /// Resolved days that always make a sample sufficient.
    pub min_days: u32,
    /// Share of the current period's days that makes a sample sufficient.
    pub min_ratio: Decimal,
}

impl Default for ComparisonSettings {
    fn default() -> Self {
        Self {
            offsets_days: vec![7, 30, 365],
            min_days: 7,
            min_ratio: Decimal::new(8, 1),
        }
    }
}

impl ComparisonSettings {
    /// Checks that offsets are present and the ratio lies in `(0, 1]`.
    pub fn validate(&self) -> EngineResult<()> {
        if self.offsets_days.is_empty() {
            return Err(invalid("comparison.offsets_days", "at least one offset is required"));
        }
        if self.offsets_days.contains(&0) {
            return Err(invalid("comparison.offsets_days", "offsets must be positive"));
        }
        if self.min_ratio <= Decimal::ZERO || self.min_ratio > Decimal::ONE {
            return Err(invalid(
                "comparison.min_ratio",
                format!("{} is outside (0, 1]", self.min_ratio),
            ));
        }
        Ok(())
    }
}

/// One region's public holidays for one year, from `holidays/*.yaml`.
///
/// Every day of a multi-day block is listed in `public_holidays`; only the
/// first day of each block is listed in `block_starts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayTable {
    /// Region code, e.g. "TW".
    pub region: String,
    /// Calendar year the table covers.
    pub year: i32,
    /// Every public holiday date.
    pub public_holidays: Vec<NaiveDate>,
    /// First date of each holiday block.
    #[serde(default)]
    pub block_starts: Vec<NaiveDate>,
}

impl HolidayTable {
    /// Checks that every date belongs to the table's year.
    pub fn validate(&self) -> EngineResult<()> {
        let field = format!("holidays.{}-{}", self.region, self.year);
        if let Some(date) = self
            .public_holidays
            .iter()
            .chain(&self.block_starts)
            .find(|date| date.year() != self.year)
        {
            return Err(invalid(&field, format!("{date} is not in {}", self.year)));
        }
        Ok(())
    }
}

/// Contents of `engine.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Cache settings.
    pub cache: CacheSettings,
    /// Historical comparison settings.
    pub comparison: ComparisonSettings,
}

/// The complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Settings from `engine.yaml`.
    pub settings: EngineSettings,
    /// Shift counting rule eras.
    pub rules: RuleTable,
    /// Holiday tables, sorted by region then year.
    pub holidays: Vec<HolidayTable>,
}

impl EngineConfig {
    /// Creates a new engine configuration.
    pub fn new(settings: EngineSettings, rules: RuleTable, mut holidays: Vec<HolidayTable>) -> Self {
        holidays.sort_by(|a, b| a.region.cmp(&b.region).then(a.year.cmp(&b.year)));
        Self {
            settings,
            rules,
            holidays,
        }
    }

    /// Validates every section.
    pub fn validate(&self) -> EngineResult<()> {
        self.settings.cache.validate()?;
        self.settings.comparison.validate()?;
        for table in &self.holidays {
            table.validate()?;
        }
        Ok(())
    }

    /// Cache settings.
    pub fn cache(&self) -> &CacheSettings {
        &self.settings.cache
    }

    /// Historical comparison settings.
    pub fn comparison(&self) -> &ComparisonSettings {
        &self.settings.comparison
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_policy() {
        let settings = EngineSettings::default();
        assert_eq!(settings.cache.ttl_ms, 300_000);
        assert_eq!(settings.cache.max_entries, 100);
        assert!(settings.cache.stale_while_revalidate);
        assert_eq!(settings.comparison.offsets_days, vec![7, 30, 365]);
        assert_eq!(settings.comparison.min_days, 7);
        assert_eq!(settings.comparison.min_ratio, Decimal::new(8, 1));
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let settings: EngineSettings = serde_yaml::from_str("cache:\n  ttl_ms: 1000\n").unwrap();
        assert_eq!(settings.cache.ttl_ms, 1000);
        assert_eq!(settings.cache.max_entries, 100);
        assert_eq!(settings.comparison, ComparisonSettings::default());
    }

    #[test]
    fn test_invalid_cache_settings() {
        let zero_ttl = CacheSettings {
            ttl_ms: 0,
            ..CacheSettings::default()
        };
        assert!(matches!(
            zero_ttl.validate(),
            Err(EngineError::InvalidSettings { field, .. }) if field == "cache.ttl_ms"
        ));
        let zero_entries = CacheSettings {
            max_entries: 0,
            ..CacheSettings::default()
        };
        assert!(zero_entries.validate().is_err());
    }

    #[test]
    fn test_invalid_comparison_settings() {
        let mut settings = ComparisonSettings::default();
        settings.min_ratio = Decimal::new(15, 1);
        assert!(settings.validate().is_err());
        settings.min_ratio = Decimal::ZERO;
        assert!(settings.validate().is_err());
        settings.min_ratio = Decimal::ONE;
        assert!(settings.validate().is_ok());
        settings.offsets_days.clear();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_holiday_table_rejects_dates_outside_year() {
        let table = HolidayTable {
            region: "TW".to_string(),
            year: 2026,
            public_holidays: vec![NaiveDate::from_ymd_opt(2025, 12, 25).unwrap()],
            block_starts: vec![],
        };
        assert!(matches!(table.validate(), Err(EngineError::InvalidSettings { .. })));
    }
}
