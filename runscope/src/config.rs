//! Monitor configuration.
//!
//! Every field has a default, so a JSON config file only needs the keys it
//! wants to change:
//!
//! ```json
//! { "layout": "detailed", "device_index": 1, "json_output": "run.json" }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::collectors::gpu::AcceleratorMetric;
use crate::error::{MonitorError, Result};
use crate::mode::ChartLayout;

/// Default pause after each sampling tick.
pub const DEFAULT_INTERVAL_MS: u64 = 100;

/// Default CPU measurement window.
pub const DEFAULT_CPU_WINDOW_MS: u64 = 100;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonitorConfig {
    pub layout: ChartLayout,
    /// Chart path; `None` uses the layout's default file name.
    pub output: Option<PathBuf>,
    /// Accelerator device; `None` disables GPU sampling.
    pub device_index: Option<u32>,
    pub interval_ms: u64,
    pub cpu_window_ms: u64,
    /// Log min/mean/max of every series before rendering.
    pub summary: bool,
    /// Also write the samples as JSON to this path.
    pub json_output: Option<PathBuf>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            layout: ChartLayout::default(),
            output: None,
            device_index: Some(0),
            interval_ms: DEFAULT_INTERVAL_MS,
            cpu_window_ms: DEFAULT_CPU_WINDOW_MS,
            summary: true,
            json_output: None,
        }
    }
}

impl MonitorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a config from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| MonitorError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn with_layout(mut self, layout: ChartLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_device_index(mut self, index: u32) -> Self {
        self.device_index = Some(index);
        self
    }

    pub fn without_accelerator(mut self) -> Self {
        self.device_index = None;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn with_cpu_window(mut self, window: Duration) -> Self {
        self.cpu_window_ms = window.as_millis() as u64;
        self
    }

    pub fn with_summary(mut self, summary: bool) -> Self {
        self.summary = summary;
        self
    }

    pub fn with_json_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.json_output = Some(path.into());
        self
    }

    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.layout.default_output()))
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn cpu_window(&self) -> Duration {
        Duration::from_millis(self.cpu_window_ms)
    }

    pub fn accelerator_metric(&self) -> AcceleratorMetric {
        self.layout.accelerator_metric()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = MonitorConfig::default();
        assert_eq!(config.layout, ChartLayout::Power);
        assert_eq!(config.device_index, Some(0));
        assert_eq!(config.interval(), Duration::from_millis(100));
        assert_eq!(config.cpu_window(), Duration::from_millis(100));
        assert!(config.summary);
        assert_eq!(config.output_path(), PathBuf::from("resource_usage.svg"));
    }

    #[test]
    fn test_output_follows_layout() {
        let config = MonitorConfig::new().with_layout(ChartLayout::Detailed);
        assert_eq!(config.output_path(), PathBuf::from("resource_usage_detailed.svg"));
        assert_eq!(config.accelerator_metric(), AcceleratorMetric::MemoryGib);

        let config = config.with_output("/tmp/custom.svg");
        assert_eq!(config.output_path(), PathBuf::from("/tmp/custom.svg"));
    }

    #[test]
    fn test_builder_setters() {
        let config = MonitorConfig::new()
            .without_accelerator()
            .with_interval(Duration::from_millis(250))
            .with_cpu_window(Duration::from_millis(50))
            .with_summary(false)
            .with_json_output("out.json");

        assert_eq!(config.device_index, None);
        assert_eq!(config.interval_ms, 250);
        assert_eq!(config.cpu_window_ms, 50);
        assert!(!config.summary);
        assert_eq!(config.json_output, Some(PathBuf::from("out.json")));
        assert_eq!(config.with_device_index(2).device_index, Some(2));
    }

    #[test]
    fn test_from_file_partial() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "layout": "detailed", "device_index": null }}"#).unwrap();

        let config = MonitorConfig::from_file(file.path()).unwrap();
        assert_eq!(config.layout, ChartLayout::Detailed);
        assert_eq!(config.device_index, None);
        assert_eq!(config.interval_ms, DEFAULT_INTERVAL_MS);
    }

    #[test]
    fn test_from_file_rejects_unknown_keys() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "gpu": 3 }}"#).unwrap();

        let result = MonitorConfig::from_file(file.path());
        assert!(matches!(result, Err(MonitorError::Config { .. })));
    }

    #[test]
    fn test_from_file_missing() {
        let result = MonitorConfig::from_file("/nonexistent/runscope.json");
        assert!(matches!(result, Err(MonitorError::Io(_))));
    }
}
