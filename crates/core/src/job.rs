use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SchedulerError;

/// Unique job identifier, stable for the job's lifetime.
pub type JobKey = String;

/// Priority tier. Lower numeric value = higher priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Tier {
    /// All tiers, highest priority first.
    pub const ALL: [Tier; 4] = [Tier::Critical, Tier::High, Tier::Medium, Tier::Low];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Tier> {
        Self::ALL.get(index).copied()
    }

    /// Aging threshold for jobs waiting in this tier.
    pub fn weight(self) -> u64 {
        match self {
            Tier::Critical => 1,
            Tier::High => 2,
            Tier::Medium => 3,
            Tier::Low => 4,
        }
    }

    /// The tier a job ages into, or `None` at the top.
    pub fn promoted(self) -> Option<Tier> {
        match self {
            Tier::Critical => None,
            Tier::High => Some(Tier::Critical),
            Tier::Medium => Some(Tier::High),
            Tier::Low => Some(Tier::Medium),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Critical => "critical",
            Tier::High => "high",
            Tier::Medium => "medium",
            Tier::Low => "low",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "critical" | "0" => Ok(Tier::Critical),
            "high" | "1" => Ok(Tier::High),
            "medium" | "2" => Ok(Tier::Medium),
            "low" | "3" => Ok(Tier::Low),
            other => Err(SchedulerError::Config(format!("unknown tier: {other}"))),
        }
    }
}

/// One schedulable unit of work.
///
/// Callers only ever see clones; the mutators are driven by the scheduler
/// crate while the job is owned by a priority level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Job {
    key: JobKey,
    name: String,
    remaining_time: u64,
    age_counter: u64,
    age_threshold: u64,
}

impl Job {
    pub fn new(key: impl Into<JobKey>, name: impl Into<String>, minutes: u64, tier: Tier) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            remaining_time: minutes,
            age_counter: 0,
            age_threshold: tier.weight(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn remaining_time(&self) -> u64 {
        self.remaining_time
    }

    pub fn age_counter(&self) -> u64 {
        self.age_counter
    }

    pub fn age_threshold(&self) -> u64 {
        self.age_threshold
    }

    /// Consume one unit of work. Returns `false` once nothing is left.
    pub fn decrement(&mut self) -> bool {
        if self.remaining_time == 0 {
            return false;
        }
        self.remaining_time -= 1;
        true
    }

    /// Count one scheduling cycle spent waiting. Returns `true` when the
    /// counter lands on a positive multiple of the threshold.
    pub fn bump_age(&mut self) -> bool {
        self.age_counter += 1;
        self.age_threshold > 0 && self.age_counter % self.age_threshold == 0
    }

    /// Move into `tier`; the age counter carries over.
    pub fn retier(&mut self, tier: Tier) {
        self.age_threshold = tier.weight();
    }
}
