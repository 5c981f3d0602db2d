use clap::Parser;

/// Feedback-queue scheduler simulator.
///
/// Feeds a workload of jobs into the scheduler, calls `tick()` at the
/// configured cadence, completes jobs as they run out of work, and prints
/// the final scheduler state as JSON.
#[derive(Parser, Debug)]
#[command(name = "mlfq-sim", version, about = "Feedback-queue scheduler simulator")]
pub struct CliArgs {
    /// Path to the scheduler config TOML file.
    #[arg(long, env = "MLFQ_CONFIG", default_value = "config/mlfq.toml")]
    pub config: String,

    /// Path to the workload TOML file.
    #[arg(long, env = "MLFQ_WORKLOAD", default_value = "workloads/demo.toml")]
    pub workload: String,

    /// Stop after this many ticks even if work remains.
    #[arg(long)]
    pub max_ticks: Option<u64>,

    /// Log wait estimates for pending jobs every N ticks (0 disables).
    #[arg(long, default_value_t = 5)]
    pub report_every: u64,

    /// Adjust the active-op cap by this amount before starting.
    #[arg(long, allow_hyphen_values = true)]
    pub capacity_delta: Option<i64>,
}
