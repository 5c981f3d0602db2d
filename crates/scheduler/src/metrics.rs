use chrono::{DateTime, Utc};
use mlfq_core::{JobKey, Tier};
use serde::Serialize;

/// Scheduler operational counters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SchedulerMetrics {
    /// Calls to `tick()`.
    pub ticks: u64,
    /// Jobs moved from pending to active.
    pub activations: u64,
    /// Jobs aged into a higher tier.
    pub promotions: u64,
    /// Jobs finished through `complete()`.
    pub completions: u64,
    /// Jobs removed through `cancel()`.
    pub cancellations: u64,
    /// Exhausted jobs dropped while compacting an active prefix.
    pub reclaimed: u64,
    /// Wall-clock time of the last `tick()`.
    pub last_tick: Option<DateTime<Utc>>,
}

impl SchedulerMetrics {
    pub fn record_tick(&mut self) {
        self.ticks += 1;
        self.last_tick = Some(Utc::now());
    }
}

/// Point-in-time view of one tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelSnapshot {
    pub tier: Tier,
    pub active: usize,
    pub pending: usize,
    pub total_time: u64,
}

/// Point-in-time view of the whole scheduler.
#[derive(Debug, Clone, Serialize)]
pub struct SchedulerSnapshot {
    pub max_active: usize,
    pub active_ops: Vec<JobKey>,
    pub levels: Vec<LevelSnapshot>,
    pub metrics: SchedulerMetrics,
}
