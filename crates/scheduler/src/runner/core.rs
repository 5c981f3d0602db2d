use std::collections::HashMap;
use std::sync::Arc;

use mlfq_core::{Job, JobKey, Result, SchedulerConfig, SchedulerError, Tier};
use tokio::runtime::Handle;
use tracing::{info, warn};

use crate::level::PriorityLevel;
use crate::metrics::{LevelSnapshot, SchedulerMetrics, SchedulerSnapshot};
use crate::ticker::{TickSource, TokioTickSource};

/// The multi-level feedback queue. Owns one [`PriorityLevel`] per [`Tier`]
/// and the key → tier map.
///
/// Driver operations take `&mut self` and are meant to be called from one
/// thread. Running jobs are advanced in the background by their tickers.
pub struct Scheduler {
    pub(super) config: SchedulerConfig,
    /// One level per tier, highest priority first.
    pub(super) levels: [PriorityLevel; 4],
    /// Current tier of every owned job.
    pub(super) priority_of: HashMap<JobKey, Tier>,
    /// Cap applied when enumerating active ops.
    pub(super) max_active: usize,
    pub(super) tick_source: Arc<dyn TickSource>,
    pub(super) metrics: SchedulerMetrics,
}

impl Scheduler {
    /// Create a scheduler whose running jobs are advanced by `tick_source`.
    pub fn new(config: SchedulerConfig, tick_source: Arc<dyn TickSource>) -> Self {
        Self {
            max_active: config.max_active,
            config,
            levels: Tier::ALL.map(PriorityLevel::new),
            priority_of: HashMap::new(),
            tick_source,
            metrics: SchedulerMetrics::default(),
        }
    }

    /// Create a scheduler whose tickers run as tasks on the given runtime.
    pub fn with_tokio(config: SchedulerConfig, handle: Handle) -> Self {
        Self::new(config, Arc::new(TokioTickSource::new(handle)))
    }

    pub(super) fn level(&self, tier: Tier) -> &PriorityLevel {
        &self.levels[tier.index()]
    }

    /// Admit a new pending job at `tier`.
    pub fn admit(
        &mut self,
        key: impl Into<JobKey>,
        name: impl Into<String>,
        minutes: u64,
        tier: Tier,
    ) -> Result<()> {
        let key = key.into();
        if self.priority_of.contains_key(&key) {
            return Err(SchedulerError::AlreadyExists(key));
        }

        let job = Job::new(key.clone(), name, minutes, tier);
        info!(key = %key, name = %job.name(), minutes, tier = %tier, "admitted");
        self.priority_of.insert(key, tier);
        self.level(tier).enqueue_pending(job);
        Ok(())
    }

    /// Withdraw a job. An active job has its ticker stopped first.
    pub fn cancel(&mut self, key: &str) -> Result<()> {
        let tier = self
            .priority_of
            .remove(key)
            .ok_or_else(|| SchedulerError::NotFound(key.to_string()))?;
        let job = self.level(tier).remove(key)?;
        self.metrics.cancellations += 1;
        info!(key = %key, tier = %tier, remaining = job.remaining_time(), "cancelled");
        Ok(())
    }

    /// Finish a job and free its activation slot.
    pub fn complete(&mut self, key: &str) -> Result<()> {
        let tier = self
            .priority_of
            .remove(key)
            .ok_or_else(|| SchedulerError::NotFound(key.to_string()))?;
        let done = self.level(tier).terminate(key)?;
        self.metrics.completions += 1;
        info!(key = %key, tier = %tier, remaining = done.job.remaining_time(), "completed");

        for reclaimed in done.reclaimed {
            self.priority_of.remove(&reclaimed);
            self.metrics.reclaimed += 1;
            info!(key = %reclaimed, tier = %tier, "reclaimed exhausted job");
        }
        Ok(())
    }

    /// Move the active-op cap by `delta`. Returns the new cap.
    ///
    /// The cap never drops below 1, and a decrease may not go below the
    /// number of jobs currently active.
    pub fn adjust_capacity(&mut self, delta: i64) -> Result<usize> {
        let requested = i64::try_from(self.max_active)
            .unwrap_or(i64::MAX)
            .saturating_add(delta);
        let floor = if delta < 0 { self.active_count().max(1) } else { 1 };

        if requested < floor as i64 {
            warn!(requested, floor, "capacity change rejected");
            return Err(SchedulerError::InvalidCapacity { requested, floor });
        }

        self.max_active = requested as usize;
        info!(max_active = self.max_active, "capacity adjusted");
        Ok(self.max_active)
    }

    /// Stop every running ticker. Jobs stay where they are.
    pub fn shutdown(&self) {
        info!("Scheduler shutdown requested");
        for level in &self.levels {
            level.stop_all();
        }
    }

    // ── Accessors ───────────────────────────────────────────────────

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn max_active(&self) -> usize {
        self.max_active
    }

    pub fn contains(&self, key: &str) -> bool {
        self.priority_of.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.levels.iter().all(PriorityLevel::is_empty)
    }

    /// Number of jobs owned across all tiers.
    pub fn len(&self) -> usize {
        self.levels.iter().map(PriorityLevel::size).sum()
    }

    /// Current tier of `key`.
    pub fn tier_of(&self, key: &str) -> Option<Tier> {
        self.priority_of.get(key).copied()
    }

    /// Clone of the job as it currently stands.
    pub fn job(&self, key: &str) -> Option<Job> {
        self.tier_of(key).and_then(|tier| self.level(tier).job(key))
    }

    pub fn remaining_time(&self, key: &str) -> Option<u64> {
        self.tier_of(key)
            .and_then(|tier| self.level(tier).remaining_time(key))
    }

    pub fn is_active(&self, key: &str) -> bool {
        self.tier_of(key)
            .and_then(|tier| self.level(tier).is_active(key))
            .unwrap_or(false)
    }

    /// Outstanding work owned by `tier`.
    pub fn total_time(&self, tier: Tier) -> u64 {
        self.level(tier).total_time()
    }

    /// Active jobs across all tiers, ignoring the cap.
    pub fn active_count(&self) -> usize {
        self.levels.iter().map(PriorityLevel::active_count).sum()
    }

    pub fn metrics(&self) -> SchedulerMetrics {
        self.metrics.clone()
    }

    pub fn snapshot(&self) -> SchedulerSnapshot {
        SchedulerSnapshot {
            max_active: self.max_active,
            active_ops: self.active_ops(),
            levels: self
                .levels
                .iter()
                .map(|level| LevelSnapshot {
                    tier: level.tier(),
                    active: level.active_count(),
                    pending: level.pending_count(),
                    total_time: level.total_time(),
                })
                .collect(),
            metrics: self.metrics(),
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        for level in &self.levels {
            level.stop_all();
        }
    }
}
