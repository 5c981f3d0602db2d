use std::collections::VecDeque;
use std::path::Path;

use anyhow::{Context, Result};
use mlfq_core::{JobKey, Tier};
use serde::{Deserialize, Serialize};

/// Jobs to feed into the scheduler, loaded from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Workload {
    #[serde(default)]
    pub jobs: Vec<WorkloadJob>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadJob {
    /// Explicit key; a random one is assigned when absent.
    #[serde(default)]
    pub key: Option<JobKey>,
    pub name: String,
    /// Units of work.
    pub minutes: u64,
    pub tier: Tier,
    /// Tick at which the job is admitted.
    #[serde(default)]
    pub arrive_at: u64,
}

/// A job ready for admission at a given tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arrival {
    pub key: JobKey,
    pub name: String,
    pub minutes: u64,
    pub tier: Tier,
    pub at: u64,
}

impl Workload {
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).context("failed to parse workload")
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read workload {}", path.display()))?;
        Self::from_toml(&content)
    }

    /// Resolve keys and order by arrival tick. Jobs sharing a tick keep
    /// their file order.
    pub fn into_arrivals(self) -> VecDeque<Arrival> {
        let mut arrivals: Vec<Arrival> = self
            .jobs
            .into_iter()
            .map(|job| Arrival {
                key: job
                    .key
                    .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
                name: job.name,
                minutes: job.minutes,
                tier: job.tier,
                at: job.arrive_at,
            })
            .collect();
        arrivals.sort_by_key(|arrival| arrival.at);
        arrivals.into()
    }
}
