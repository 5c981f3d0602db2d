use thiserror::Error;

use crate::job::JobKey;

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("Job not found: {0}")]
    NotFound(JobKey),

    #[error("Job already admitted: {0}")]
    AlreadyExists(JobKey),

    #[error("Invalid capacity {requested}: must stay at or above {floor}")]
    InvalidCapacity { requested: i64, floor: usize },

    #[error("config error: {0}")]
    Config(String),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("config I/O error: {0}")]
    ConfigIo(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
