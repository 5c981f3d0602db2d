use mlfq_core::{JobKey, Result, SchedulerError};

use crate::estimate::LoadBuckets;

use super::Scheduler;

impl Scheduler {
    /// Keys of active jobs in tier order, capped at `max_active`.
    pub fn active_ops(&self) -> Vec<JobKey> {
        self.capped_active()
            .into_iter()
            .map(|(key, _)| key)
            .collect()
    }

    /// Keys of pending jobs in tier order, then arrival order.
    pub fn pending_ops(&self) -> Vec<JobKey> {
        self.levels
            .iter()
            .flat_map(|level| level.pending_keys())
            .collect()
    }

    /// Active jobs with no work left, ignoring the cap.
    pub fn finished_ops(&self) -> Vec<JobKey> {
        self.levels
            .iter()
            .flat_map(|level| level.active_entries())
            .filter(|(_, remaining)| *remaining == 0)
            .map(|(key, _)| key)
            .collect()
    }

    fn capped_active(&self) -> Vec<(JobKey, u64)> {
        self.levels
            .iter()
            .flat_map(|level| level.active_entries())
            .take(self.max_active)
            .collect()
    }

    /// Estimated wait before `key` starts running; 0 when already active.
    ///
    /// Models each active job as a server and folds every pending job of a
    /// higher tier, then every pending job queued ahead of `key` in its own
    /// tier, onto the least-loaded server in arrival order.
    pub fn estimate_delay(&self, key: &str) -> Result<u64> {
        let tier = self
            .tier_of(key)
            .ok_or_else(|| SchedulerError::NotFound(key.to_string()))?;

        let Some(ahead) = self.level(tier).pending_ahead_of(key)? else {
            return Ok(0);
        };

        let mut buckets =
            LoadBuckets::new(self.capped_active().into_iter().map(|(_, time)| time).collect());
        for level in &self.levels[..tier.index()] {
            buckets.fold_all(level.pending_times());
        }
        buckets.fold_all(ahead);

        Ok(buckets.least_loaded())
    }
}
