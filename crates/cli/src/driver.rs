use std::collections::VecDeque;

use mlfq_core::JobKey;
use mlfq_scheduler::Scheduler;
use tracing::{info, warn};

use crate::workload::Arrival;

/// What one driver step did.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct StepReport {
    pub tick: u64,
    pub admitted: Vec<JobKey>,
    pub completed: Vec<JobKey>,
}

/// External driver: admits arrivals, completes finished jobs, and calls
/// `tick()` once per step.
pub struct Driver {
    scheduler: Scheduler,
    arrivals: VecDeque<Arrival>,
    report_every: u64,
    ticks: u64,
}

impl Driver {
    pub fn new(scheduler: Scheduler, arrivals: VecDeque<Arrival>, report_every: u64) -> Self {
        Self {
            scheduler,
            arrivals,
            report_every,
            ticks: 0,
        }
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut Scheduler {
        &mut self.scheduler
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Nothing left to admit and nothing owned by the scheduler.
    pub fn is_finished(&self) -> bool {
        self.arrivals.is_empty() && self.scheduler.is_empty()
    }

    pub fn step(&mut self) -> StepReport {
        let admitted = self.admit_due();
        let completed = self.complete_finished();
        self.scheduler.tick();
        self.ticks += 1;

        if self.report_every > 0 && self.ticks % self.report_every == 0 {
            self.report();
        }

        StepReport {
            tick: self.ticks,
            admitted,
            completed,
        }
    }

    fn admit_due(&mut self) -> Vec<JobKey> {
        let mut admitted = Vec::new();
        while self
            .arrivals
            .front()
            .is_some_and(|arrival| arrival.at <= self.ticks)
        {
            let Some(arrival) = self.arrivals.pop_front() else {
                break;
            };
            match self
                .scheduler
                .admit(arrival.key.clone(), arrival.name, arrival.minutes, arrival.tier)
            {
                Ok(()) => admitted.push(arrival.key),
                Err(e) => warn!(key = %arrival.key, error = %e, "failed to admit job"),
            }
        }
        admitted
    }

    fn complete_finished(&mut self) -> Vec<JobKey> {
        let mut completed = Vec::new();
        for key in self.scheduler.finished_ops() {
            // An earlier completion may already have reclaimed it.
            if !self.scheduler.contains(&key) {
                continue;
            }
            match self.scheduler.complete(&key) {
                Ok(()) => completed.push(key),
                Err(e) => warn!(key = %key, error = %e, "failed to complete job"),
            }
        }
        completed
    }

    fn report(&self) {
        let active = self.scheduler.active_ops();
        info!(tick = self.ticks, active = ?active, "scheduler status");
        for key in self.scheduler.pending_ops() {
            match self.scheduler.estimate_delay(&key) {
                Ok(delay) => info!(key = %key, tier = ?self.scheduler.tier_of(&key), delay, "wait estimate"),
                Err(e) => warn!(key = %key, error = %e, "no wait estimate"),
            }
        }
    }
}
