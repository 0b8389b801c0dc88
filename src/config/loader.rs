//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading engine
//! configuration from YAML files.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::calculation::{RuleTable, StaticHolidayCalendar};
use crate::error::{EngineError, EngineResult};

use super::types::{EngineConfig, EngineSettings, HolidayTable};

/// Loads and provides access to engine configuration.
///
/// The `ConfigLoader` reads YAML configuration files from a directory,
/// validates them and provides the holiday calendar built from them.
///
/// # Directory Structure
///
/// The configuration directory should have the following structure:
/// ```text
/// config/
/// ├── engine.yaml         # Cache and comparison settings
/// ├── rules.yaml          # Shift counting rule eras (optional)
/// └── holidays/
///     └── tw-2026.yaml    # One holiday table per region and year
/// ```
///
/// # Example
///
/// ```no_run
/// use chrono::NaiveDate;
/// use workforce_stats::calculation::HolidayCalendar;
/// use workforce_stats::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config").unwrap();
/// let calendar = loader.calendar();
///
/// let new_year = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
/// assert!(calendar.is_public_holiday(new_year));
/// println!("Cache TTL: {} ms", loader.config().cache().ttl_ms);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration directory (e.g., "./config")
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - `engine.yaml` or the `holidays` directory is missing
    /// - Any file contains invalid YAML
    /// - Any value is outside its allowed range
    ///
    /// A missing `rules.yaml` falls back to the built-in rule table.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let settings = Self::load_yaml::<EngineSettings>(&path.join("engine.yaml"))?;

        let rules_path = path.join("rules.yaml");
        let rules = if rules_path.exists() {
            Self::load_yaml::<RuleTable>(&rules_path)?
        } else {
            debug!(path = %rules_path.display(), "No rules file; using built-in rule table");
            RuleTable::default()
        };

        let holidays = Self::load_holidays(&path.join("holidays"))?;

        let config = EngineConfig::new(settings, rules, holidays);
        config.validate()?;

        Ok(Self { config })
    }

    /// Wraps an already-built configuration after validating it.
    pub fn from_config(config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads all holiday tables from the holidays directory.
    fn load_holidays(holidays_dir: &Path) -> EngineResult<Vec<HolidayTable>> {
        let holidays_dir_str = holidays_dir.display().to_string();

        if !holidays_dir.exists() {
            return Err(EngineError::ConfigNotFound {
                path: holidays_dir_str,
            });
        }

        let entries = fs::read_dir(holidays_dir).map_err(|_| EngineError::ConfigNotFound {
            path: holidays_dir_str.clone(),
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: holidays_dir_str.clone(),
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut tables = Vec::with_capacity(paths.len());
        for path in &paths {
            tables.push(Self::load_yaml::<HolidayTable>(path)?);
        }

        if tables.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no holiday files found)", holidays_dir_str),
            });
        }

        Ok(tables)
    }

    /// Returns the underlying engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Consumes the loader, returning the configuration.
    pub fn into_config(self) -> EngineConfig {
        self.config
    }

    /// Builds a holiday calendar from every loaded table.
    pub fn calendar(&self) -> StaticHolidayCalendar {
        StaticHolidayCalendar::from_tables(&self.config.holidays)
    }

    /// Builds a holiday calendar from the tables of one region.
    pub fn calendar_for(&self, region: &str) -> StaticHolidayCalendar {
        let tables: Vec<HolidayTable> = self
            .config
            .holidays
            .iter()
            .filter(|table| table.region.eq_ignore_ascii_case(region))
            .cloned()
            .collect();
        StaticHolidayCalendar::from_tables(&tables)
    }
}
