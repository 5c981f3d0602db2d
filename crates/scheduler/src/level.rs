//! One priority tier of the feedback queue.
//!
//! Storage is a sequence of slots split at `head`: `[0, head)` are active
//! (each has a running ticker), `[head, len)` are pending in arrival order.
//! `total_time` is the sum of remaining work over every slot. All of it sits
//! behind one mutex shared with the level's tickers.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use mlfq_core::{Job, JobKey, Result, SchedulerError, Tier};
use tracing::debug;

use crate::ticker::{TickCallback, TickOutcome, TickSource, Ticker};

struct Slot {
    job: Job,
    ticker: Option<Arc<dyn Ticker>>,
}

#[derive(Default)]
struct LevelState {
    slots: Vec<Slot>,
    head: usize,
    total_time: u64,
}

impl LevelState {
    fn position(&self, key: &str) -> Option<usize> {
        self.slots.iter().position(|slot| slot.job.key() == key)
    }

    /// Take the slot at `index` out of storage, keeping `head` and
    /// `total_time` consistent.
    fn take(&mut self, index: usize) -> Slot {
        let slot = self.slots.remove(index);
        if index < self.head {
            self.head -= 1;
        }
        self.total_time = self.total_time.saturating_sub(slot.job.remaining_time());
        slot
    }

    /// One firing of the ticker bound to `key`.
    fn consume(&mut self, key: &str) -> TickOutcome {
        let Some(index) = self.position(key) else {
            return TickOutcome::Exhausted;
        };
        let job = &mut self.slots[index].job;
        if job.decrement() {
            self.total_time = self.total_time.saturating_sub(1);
        }
        if job.remaining_time() == 0 {
            TickOutcome::Exhausted
        } else {
            TickOutcome::Continue
        }
    }
}

/// Outcome of [`PriorityLevel::terminate`].
#[derive(Debug)]
pub struct Terminated {
    pub job: Job,
    /// Exhausted active jobs dropped from the front while compacting.
    pub reclaimed: Vec<JobKey>,
}

pub struct PriorityLevel {
    tier: Tier,
    state: Arc<Mutex<LevelState>>,
}

impl PriorityLevel {
    pub fn new(tier: Tier) -> Self {
        Self {
            tier,
            state: Arc::new(Mutex::new(LevelState::default())),
        }
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// Aging threshold shared by every job waiting here.
    pub fn weight(&self) -> u64 {
        self.tier.weight()
    }

    fn lock(&self) -> MutexGuard<'_, LevelState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append to the pending suffix.
    pub fn enqueue_pending(&self, job: Job) {
        let mut state = self.lock();
        state.total_time += job.remaining_time();
        state.slots.push(Slot { job, ticker: None });
    }

    /// Start a ticker for the first pending job. Returns its key, or `None`
    /// when nothing is pending.
    pub fn activate_next(&self, source: &dyn TickSource, interval: Duration) -> Option<JobKey> {
        let mut state = self.lock();
        let head = state.head;
        let key = state.slots.get(head)?.job.key().to_string();

        let ticker = source.start(interval, tick_callback(Arc::downgrade(&self.state), key.clone()));
        state.slots[head].ticker = Some(ticker);
        state.head += 1;
        Some(key)
    }

    /// Remove a job wherever it sits. A running ticker is stopped first.
    pub fn remove(&self, key: &str) -> Result<Job> {
        let mut state = self.lock();
        let index = state
            .position(key)
            .ok_or_else(|| SchedulerError::NotFound(key.to_string()))?;
        let slot = state.take(index);
        if let Some(ticker) = &slot.ticker {
            ticker.stop();
        }
        Ok(slot.job)
    }

    /// Finish a job, then drop any exhausted jobs now at the front of the
    /// active prefix to free their activation slots.
    pub fn terminate(&self, key: &str) -> Result<Terminated> {
        let mut state = self.lock();
        let index = state
            .position(key)
            .ok_or_else(|| SchedulerError::NotFound(key.to_string()))?;
        let slot = state.take(index);
        if let Some(ticker) = &slot.ticker {
            ticker.stop();
        }

        let mut reclaimed = Vec::new();
        while state.head > 0
            && state.slots[0]
                .ticker
                .as_ref()
                .is_some_and(|ticker| ticker.is_stopped())
        {
            let front = state.take(0);
            reclaimed.push(front.job.key().to_string());
        }

        Ok(Terminated {
            job: slot.job,
            reclaimed,
        })
    }

    /// Age every pending job by one cycle and move the ones that hit their
    /// threshold into `next`. Returns the promoted keys in arrival order.
    pub fn age(&self, next: Option<&PriorityLevel>) -> Vec<JobKey> {
        let Some(next) = next else {
            return Vec::new();
        };

        let promoted: Vec<Job> = {
            let mut state = self.lock();
            let head = state.head;
            let marked: Vec<usize> = state
                .slots
                .iter_mut()
                .enumerate()
                .skip(head)
                .filter_map(|(index, slot)| slot.job.bump_age().then_some(index))
                .collect();

            marked
                .into_iter()
                .enumerate()
                .map(|(removed, index)| state.take(index - removed).job)
                .collect()
        };

        let mut keys = Vec::with_capacity(promoted.len());
        for mut job in promoted {
            debug!(key = %job.key(), from = %self.tier, to = %next.tier, age = job.age_counter(), "aged out");
            keys.push(job.key().to_string());
            job.retier(next.tier);
            next.enqueue_pending(job);
        }
        keys
    }

    /// Stop every running ticker. Used on shutdown.
    pub fn stop_all(&self) {
        let state = self.lock();
        for ticker in state.slots.iter().filter_map(|slot| slot.ticker.as_ref()) {
            ticker.stop();
        }
    }

    // ── Queries ─────────────────────────────────────────────────────

    pub fn size(&self) -> usize {
        self.lock().slots.len()
    }

    pub fn active_count(&self) -> usize {
        self.lock().head
    }

    pub fn pending_count(&self) -> usize {
        let state = self.lock();
        state.slots.len() - state.head
    }

    pub fn is_empty(&self) -> bool {
        self.lock().slots.is_empty()
    }

    pub fn total_time(&self) -> u64 {
        self.lock().total_time
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().position(key).is_some()
    }

    pub fn job(&self, key: &str) -> Option<Job> {
        let state = self.lock();
        state.position(key).map(|index| state.slots[index].job.clone())
    }

    pub fn remaining_time(&self, key: &str) -> Option<u64> {
        let state = self.lock();
        state.position(key).map(|index| state.slots[index].job.remaining_time())
    }

    /// `Some(true)` if active, `Some(false)` if pending, `None` if absent.
    pub fn is_active(&self, key: &str) -> Option<bool> {
        let state = self.lock();
        state.position(key).map(|index| index < state.head)
    }

    /// Key and remaining time of each active job, front first.
    pub fn active_entries(&self) -> Vec<(JobKey, u64)> {
        let state = self.lock();
        state.slots[..state.head]
            .iter()
            .map(|slot| (slot.job.key().to_string(), slot.job.remaining_time()))
            .collect()
    }

    /// Keys of pending jobs, in arrival order.
    pub fn pending_keys(&self) -> Vec<JobKey> {
        let state = self.lock();
        state.slots[state.head..]
            .iter()
            .map(|slot| slot.job.key().to_string())
            .collect()
    }

    /// Remaining time of each pending job, in arrival order.
    pub fn pending_times(&self) -> Vec<u64> {
        let state = self.lock();
        state.slots[state.head..]
            .iter()
            .map(|slot| slot.job.remaining_time())
            .collect()
    }

    /// Remaining times of the pending jobs queued ahead of `key`, or `None`
    /// if `key` is active.
    pub fn pending_ahead_of(&self, key: &str) -> Result<Option<Vec<u64>>> {
        let state = self.lock();
        let index = state
            .position(key)
            .ok_or_else(|| SchedulerError::NotFound(key.to_string()))?;
        if index < state.head {
            return Ok(None);
        }
        Ok(Some(
            state.slots[state.head..index]
                .iter()
                .map(|slot| slot.job.remaining_time())
                .collect(),
        ))
    }
}

/// Ticker callback bound to a job key. Holds only a weak reference so a
/// dropped level ends its tickers on their next firing.
fn tick_callback(state: Weak<Mutex<LevelState>>, key: JobKey) -> TickCallback {
    Box::new(move || {
        let Some(state) = state.upgrade() else {
            return TickOutcome::Exhausted;
        };
        let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
        state.consume(&key)
    })
}
