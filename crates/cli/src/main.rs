//! mlfq-sim: drives the feedback-queue scheduler over a workload file.
//!
//! Each tick admits the jobs that have arrived, completes jobs that ran out
//! of work, and calls `Scheduler::tick`. Running jobs consume work on tokio
//! tickers in the background. Exits when the workload drains, when
//! `--max-ticks` is reached, or on Ctrl+C.

mod cli;
mod driver;
mod workload;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::runtime::Handle;
use tracing::{info, warn};

use mlfq_core::{load_dotenv, SchedulerConfig};
use mlfq_scheduler::Scheduler;

use crate::cli::CliArgs;
use crate::driver::Driver;
use crate::workload::Workload;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    load_dotenv();
    let args = CliArgs::parse();

    // Fall back to defaults + env overrides if the file is missing or bad
    let config = match SchedulerConfig::from_file(&args.config) {
        Ok(cfg) => {
            info!(path = %args.config, "loaded scheduler config");
            cfg
        }
        Err(e) => {
            warn!(error = %e, path = %args.config, "failed to load config, using defaults");
            SchedulerConfig::from_env().context("invalid scheduler config from environment")?
        }
    };
    config.log_summary();

    let workload = Workload::from_file(&args.workload)?;
    info!(path = %args.workload, jobs = workload.jobs.len(), "loaded workload");

    let scheduler = Scheduler::with_tokio(config.clone(), Handle::current());
    let mut driver = Driver::new(scheduler, workload.into_arrivals(), args.report_every);

    if let Some(delta) = args.capacity_delta {
        driver
            .scheduler_mut()
            .adjust_capacity(delta)
            .context("capacity adjustment rejected")?;
    }

    let mut ticker = tokio::time::interval(config.tick_interval());
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let report = driver.step();
                if !report.completed.is_empty() {
                    info!(tick = report.tick, completed = ?report.completed, "jobs finished");
                }
                if driver.is_finished() {
                    info!(ticks = driver.ticks(), "workload drained");
                    break;
                }
                if args.max_ticks.is_some_and(|max| driver.ticks() >= max) {
                    warn!(ticks = driver.ticks(), remaining = driver.scheduler().len(), "tick limit reached");
                    break;
                }
            }
            _ = &mut ctrl_c => {
                info!("interrupted, shutting down");
                break;
            }
        }
    }

    driver.scheduler().shutdown();
    let snapshot = driver.scheduler().snapshot();
    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    info!("mlfq-sim exited cleanly");
    Ok(())
}
