//! The statistics engine service.
//!
//! [`StatisticsEngine`] bundles the loaded configuration, a holiday
//! calendar and the result caches. It is cheap to clone; clones share the
//! same caches.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};
use uuid::Uuid;

use crate::cache::{AsyncCache, CacheStats, Clock, Fetched, Fingerprint, MemoCache, SystemClock};
use crate::calculation::{
    HistoricalComparison, HolidayCalendar, OverlapReport, TagRow, aggregate_by_tag, build_report,
    compare, monthly_details, shift_overlap,
};
use crate::config::{ConfigLoader, EngineConfig};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    CrossPeriodReport, DailyValue, EmployeeRoster, MetricSource, MonthlySchedule, PeriodKey,
    PeriodStats,
};

/// Computes workforce statistics with memoized reports and coalesced period fetches.
///
/// # Example
///
/// ```no_run
/// use workforce_stats::config::ConfigLoader;
/// use workforce_stats::engine::StatisticsEngine;
/// use workforce_stats::models::{EmployeeRoster, MonthlySchedule};
///
/// let engine = StatisticsEngine::from_loader(ConfigLoader::load("./config").unwrap());
///
/// let mut january = MonthlySchedule::new("2026-01".parse().unwrap());
/// january.set_shifts("emp_a", 1, &["早", "早", "休"]);
///
/// let report = engine.cross_period_report(&[january], &EmployeeRoster::new());
/// assert_eq!(report.rows.len(), 1);
/// ```
#[derive(Clone)]
pub struct StatisticsEngine {
    config: Arc<EngineConfig>,
    calendar: Arc<dyn HolidayCalendar>,
    reports: Arc<MemoCache<Arc<CrossPeriodReport>>>,
    periods: AsyncCache<Arc<MonthlySchedule>>,
}

impl StatisticsEngine {
    /// Creates an engine whose caches age by the system clock.
    pub fn new(config: EngineConfig, calendar: Arc<dyn HolidayCalendar>) -> Self {
        Self::with_clock(config, calendar, Arc::new(SystemClock::new()))
    }

    /// Creates an engine whose caches age by the given clock.
    pub fn with_clock(
        config: EngineConfig,
        calendar: Arc<dyn HolidayCalendar>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let reports = MemoCache::with_clock(config.cache(), Arc::clone(&clock));
        let periods = AsyncCache::with_clock(config.cache(), clock);
        Self {
            config: Arc::new(config),
            calendar,
            reports: Arc::new(reports),
            periods,
        }
    }

    /// Creates an engine from loaded configuration, using its merged holiday calendar.
    pub fn from_loader(loader: ConfigLoader) -> Self {
        let calendar = Arc::new(loader.calendar());
        Self::new(loader.into_config(), calendar)
    }

    /// The configuration in use.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The holiday calendar in use.
    pub fn calendar(&self) -> &dyn HolidayCalendar {
        self.calendar.as_ref()
    }

    /// Builds the cross-period report for every regular employee.
    ///
    /// Results are memoized for the configured TTL. The key covers every
    /// input that changes the report: period keys with their content
    /// digests, employee display names and category overrides, so an edited
    /// schedule or a recategorized employee is never served a stale report.
    pub fn cross_period_report(
        &self,
        periods: &[MonthlySchedule],
        roster: &EmployeeRoster,
    ) -> Arc<CrossPeriodReport> {
        let key = report_key(periods, roster);
        if let Some(report) = self.reports.get(&key) {
            debug!(periods = periods.len(), "Serving memoized cross-period report");
            return report;
        }

        let correlation_id = Uuid::new_v4();
        let start = Instant::now();
        let report = Arc::new(build_report(periods, roster, &self.config.rules));
        self.reports.set(key, Arc::clone(&report));

        info!(
            correlation_id = %correlation_id,
            employees = report.rows.len(),
            periods = report.periods.len(),
            elapsed_us = micros(start.elapsed()),
            "Built cross-period report"
        );
        report
    }

    /// Per-period rows for one employee since hire, newest first.
    pub fn monthly_details(&self, employee_id: &str, periods: &[MonthlySchedule]) -> Vec<PeriodStats> {
        monthly_details(employee_id, periods, &self.config.rules)
    }

    /// Totals and averages of a daily series per day tag.
    pub fn tag_report(&self, series: &[DailyValue]) -> Vec<TagRow> {
        aggregate_by_tag(series, self.calendar.as_ref())
    }

    /// Daily headcount of working regular employees, totalled per day tag.
    pub fn staffing_tag_report(
        &self,
        schedule: &MonthlySchedule,
        roster: &EmployeeRoster,
    ) -> Vec<TagRow> {
        let headcount = schedule.daily_headcount(|id| roster.is_regular(id));
        self.tag_report(&headcount)
    }

    /// Shared working days for every pair of regular employees in one period.
    pub fn shift_overlap(
        &self,
        schedule: &MonthlySchedule,
        roster: &EmployeeRoster,
    ) -> OverlapReport {
        shift_overlap(schedule, roster)
    }

    /// Compares a current window against shifted windows of `source`,
    /// using the configured offsets and sample gates.
    pub fn compare(&self, current: &[DailyValue], source: &dyn MetricSource) -> HistoricalComparison {
        compare(current, source, self.config.comparison())
    }

    /// Fetches a period's schedule through the period cache.
    ///
    /// Concurrent fetches of the same period share one `loader` run. A
    /// loaded schedule for a different period is rejected and not cached.
    pub async fn fetch_period<F, Fut>(
        &self,
        period: PeriodKey,
        loader: F,
    ) -> EngineResult<Fetched<Arc<MonthlySchedule>>>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = EngineResult<MonthlySchedule>> + Send + 'static,
    {
        self.periods
            .fetch(&period.to_string(), move || async move {
                let schedule = loader().await?;
                if schedule.period != period {
                    return Err(EngineError::InvalidScheduleDocument {
                        message: format!(
                            "requested period {} but loaded {}",
                            period, schedule.period
                        ),
                    });
                }
                Ok(Arc::new(schedule))
            })
            .await
    }

    /// Drops every memoized report and cached period, including in-flight fetches.
    pub fn clear_caches(&self) {
        self.reports.clear();
        self.periods.clear();
        debug!("Engine caches cleared");
    }

    /// Statistics of the report cache.
    pub fn report_cache_stats(&self) -> CacheStats {
        self.reports.stats()
    }

    /// Statistics of the period cache.
    pub fn period_cache_stats(&self) -> CacheStats {
        self.periods.stats()
    }
}

/// Whole microseconds in `elapsed`, saturating at `u64::MAX`.
fn micros(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX)
}

/// Cache key for a cross-period report over `periods` and `roster`.
fn report_key(periods: &[MonthlySchedule], roster: &EmployeeRoster) -> String {
    let mut employee_ids: Vec<&str> = periods
        .iter()
        .flat_map(|schedule| schedule.employee_ids())
        .collect();
    employee_ids.sort_unstable();
    employee_ids.dedup();

    let first = periods.iter().map(|s| s.period).min();
    let last = periods.iter().map(|s| s.period).max();

    Fingerprint::new()
        .section(
            "periods",
            periods
                .iter()
                .map(|s| format!("{}:{:016x}", s.period, s.content_digest())),
        )
        .section(
            "employees",
            employee_ids
                .iter()
                .map(|id| format!("{:?}", (id, roster.display_name(id)))),
        )
        .section(
            "categories",
            roster
                .category_overrides()
                .into_iter()
                .map(|(id, category)| format!("{:?}", (id, category.as_str()))),
        )
        .section("first", first)
        .section("last", last)
        .build()
}
