use std::env;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchedulerError};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Scheduler configuration, typically parsed from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Initial cap on the number of keys reported as active.
    #[serde(default = "default_max_active")]
    pub max_active: usize,
    /// Wall-clock length of one unit ("minute") of job work, in milliseconds.
    #[serde(default = "default_time_unit_ms")]
    pub time_unit_ms: u64,
    /// How many time units pass between two firings of a job's ticker.
    #[serde(default = "default_ticker_interval_units")]
    pub ticker_interval_units: u32,
    /// Cadence at which a driver calls `tick()`, in milliseconds.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

fn default_max_active() -> usize { 3 }
fn default_time_unit_ms() -> u64 { 1000 }
fn default_ticker_interval_units() -> u32 { 2 }
fn default_tick_interval_ms() -> u64 { 1000 }

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_active: default_max_active(),
            time_unit_ms: default_time_unit_ms(),
            ticker_interval_units: default_ticker_interval_units(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

// ── Loading & Validation ────────────────────────────────────────────

impl SchedulerConfig {
    /// Parse config from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(toml_str)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load config from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    /// Build config from defaults plus environment overrides (call `load_dotenv()` first).
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides.
    ///
    /// - `MLFQ_MAX_ACTIVE` → `max_active`
    /// - `MLFQ_TIME_UNIT_MS` → `time_unit_ms`
    /// - `MLFQ_TICKER_INTERVAL_UNITS` → `ticker_interval_units`
    /// - `MLFQ_TICK_INTERVAL_MS` → `tick_interval_ms`
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(env_opt);
    }

    /// Apply overrides from an arbitrary key lookup. Unparsable values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("MLFQ_MAX_ACTIVE").and_then(|v| v.parse().ok()) {
            self.max_active = v;
        }
        if let Some(v) = lookup("MLFQ_TIME_UNIT_MS").and_then(|v| v.parse().ok()) {
            self.time_unit_ms = v;
        }
        if let Some(v) = lookup("MLFQ_TICKER_INTERVAL_UNITS").and_then(|v| v.parse().ok()) {
            self.ticker_interval_units = v;
        }
        if let Some(v) = lookup("MLFQ_TICK_INTERVAL_MS").and_then(|v| v.parse().ok()) {
            self.tick_interval_ms = v;
        }
    }

    /// Reject configurations the scheduler cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.max_active == 0 {
            return Err(SchedulerError::Config("max_active must be at least 1".into()));
        }
        if self.time_unit_ms == 0 {
            return Err(SchedulerError::Config("time_unit_ms must be at least 1".into()));
        }
        if self.ticker_interval_units == 0 {
            return Err(SchedulerError::Config(
                "ticker_interval_units must be at least 1".into(),
            ));
        }
        if self.tick_interval_ms == 0 {
            return Err(SchedulerError::Config("tick_interval_ms must be at least 1".into()));
        }
        Ok(())
    }

    /// Interval between two firings of a running job's ticker.
    pub fn ticker_interval(&self) -> Duration {
        Duration::from_millis(self.time_unit_ms * u64::from(self.ticker_interval_units))
    }

    /// Interval between two driver `tick()` calls.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Scheduler config loaded:");
        tracing::info!("  max_active:      {}", self.max_active);
        tracing::info!("  time_unit:       {}ms", self.time_unit_ms);
        tracing::info!("  ticker interval: {:?}", self.ticker_interval());
        tracing::info!("  tick interval:   {:?}", self.tick_interval());
    }
}
