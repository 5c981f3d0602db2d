pub mod config;
pub mod error;
pub mod job;

pub use config::{load_dotenv, SchedulerConfig};
pub use error::*;
pub use job::{Job, JobKey, Tier};
