//! runscope - resource usage of a single operation
//!
//! Wraps a closure, samples host CPU load, memory and (optionally) one GPU's
//! power draw or memory use on a background thread while the closure runs,
//! then charts the samples to an SVG file.
//!
//! - [`collectors`]: CPU / memory (sysinfo) and GPU (NVML) readings
//! - [`sampler`]: the background sampling loop
//! - [`monitor`]: the scoped coordinator around the monitored closure
//! - [`chart`]: SVG rendering of a session
//!
//! # Example
//!
//! ```rust,no_run
//! use runscope::monitor_resources;
//!
//! let answer = monitor_resources(|| {
//!     std::thread::sleep(std::time::Duration::from_millis(500));
//!     42
//! });
//! assert_eq!(answer, 42);
//! ```

pub mod chart;
pub mod collectors;
pub mod config;
pub mod error;
pub mod export;
pub mod metrics;
pub mod mode;
pub mod monitor;
pub mod sampler;

pub use config::MonitorConfig;
pub use error::MonitorError;
pub use metrics::{Sample, Samples, SeriesStats, Summary};
pub use mode::ChartLayout;
pub use monitor::{Monitor, Observation, monitor_resources};
