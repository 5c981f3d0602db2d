//! Multi-level feedback queue scheduling core.
//!
//! Four priority tiers (Critical, High, Medium, Low) hold pending and active
//! jobs. Each [`Scheduler::tick`] activates at most one pending job and ages
//! waiting jobs upward. Active jobs consume work in the background through a
//! [`ticker::Ticker`], and [`Scheduler::estimate_delay`] projects wait times
//! with a greedy multi-server model.

pub mod estimate;
pub mod level;
pub mod metrics;
pub mod runner;
pub mod ticker;

pub use estimate::LoadBuckets;
pub use level::{PriorityLevel, Terminated};
pub use metrics::{LevelSnapshot, SchedulerMetrics, SchedulerSnapshot};
pub use mlfq_core::{Job, JobKey, SchedulerConfig, SchedulerError, Tier};
pub use runner::Scheduler;
pub use ticker::{ManualTickSource, TickOutcome, TickSource, Ticker, TokioTickSource};
