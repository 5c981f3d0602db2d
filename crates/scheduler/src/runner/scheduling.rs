use mlfq_core::{JobKey, Tier};
use tracing::{debug, info};

use super::Scheduler;

/// Aging transitions, applied once per tick in this order. A job moves at
/// most one tier per tick.
const PROMOTIONS: [(Tier, Tier); 3] = [
    (Tier::High, Tier::Critical),
    (Tier::Medium, Tier::High),
    (Tier::Low, Tier::Medium),
];

impl Scheduler {
    /// One scheduling cycle: activate at most one pending job (highest
    /// non-saturated tier first), then run the aging pass.
    pub fn tick(&mut self) {
        self.metrics.record_tick();

        if let Some((tier, key)) = self.activate_one() {
            self.metrics.activations += 1;
            info!(key = %key, tier = %tier, "activated");
        }

        let promoted = self.age_all();
        debug!(
            tick = self.metrics.ticks,
            promoted = promoted.len(),
            active = self.active_count(),
            "tick complete"
        );
    }

    /// Activate the first pending job of the highest tier that has one.
    pub(crate) fn activate_one(&mut self) -> Option<(Tier, JobKey)> {
        let interval = self.config.ticker_interval();
        let level = self.levels.iter().find(|level| level.pending_count() > 0)?;
        level
            .activate_next(self.tick_source.as_ref(), interval)
            .map(|key| (level.tier(), key))
    }

    /// Run every aging transition and record the new tiers.
    pub(crate) fn age_all(&mut self) -> Vec<(JobKey, Tier)> {
        let mut moved = Vec::new();
        for (from, to) in PROMOTIONS {
            let keys = self.levels[from.index()].age(Some(&self.levels[to.index()]));
            for key in keys {
                info!(key = %key, from = %from, to = %to, "promoted");
                self.priority_of.insert(key.clone(), to);
                self.metrics.promotions += 1;
                moved.push((key, to));
            }
        }
        moved
    }
}
