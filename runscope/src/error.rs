use std::path::PathBuf;

use nvml_wrapper::error::NvmlError;
use thiserror::Error;

/// Errors raised while monitoring. None of them reach the caller of a
/// monitored operation; the coordinator logs and degrades instead.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("accelerator unavailable: {0}")]
    AcceleratorUnavailable(#[source] NvmlError),

    #[error("accelerator query failed on device {index}: {source}")]
    AcceleratorQuery {
        index: u32,
        #[source]
        source: NvmlError,
    },

    #[error("failed to render chart to {}: {source}", path.display())]
    Chart {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("invalid configuration in {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MonitorError>;
