//! Scoped resource monitoring around a single operation.
//!
//! # Example
//!
//! ```rust,no_run
//! use runscope::{Monitor, MonitorConfig};
//!
//! let monitor = Monitor::new(MonitorConfig::new().with_output("train.svg"));
//! let loss = monitor.run(|| {
//!     // expensive work
//!     0.25
//! });
//! assert_eq!(loss, 0.25);
//! ```

use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Instant;

use log::{info, warn};

use crate::chart;
use crate::collectors::cpu::HostCollector;
use crate::collectors::gpu::Accelerator;
use crate::config::MonitorConfig;
use crate::export;
use crate::metrics::{Samples, Summary};
use crate::sampler::Sampler;

/// What a monitored call produced besides its own result.
#[derive(Debug)]
pub struct Observation<T> {
    pub output: T,
    pub samples: Samples,
    /// Where the chart was written, `None` if rendering failed.
    pub chart: Option<PathBuf>,
}

#[derive(Clone, Debug, Default)]
pub struct Monitor {
    config: MonitorConfig,
}

impl Monitor {
    pub fn new(config: MonitorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Runs `op` under monitoring and returns its result unchanged.
    pub fn run<T, F>(&self, op: F) -> T
    where
        F: FnOnce() -> T,
    {
        self.observe(op).output
    }

    /// Runs `op` under monitoring and returns its result along with the
    /// collected samples.
    ///
    /// The sampler is stopped and joined, the accelerator released and the
    /// chart rendered on every exit path. If `op` panics the panic is resumed
    /// once that is done.
    pub fn observe<T, F>(&self, op: F) -> Observation<T>
    where
        F: FnOnce() -> T,
    {
        let accelerator = self.probe_accelerator();
        let metric = self.config.accelerator_metric();
        let host = HostCollector::new(self.config.cpu_window());

        let stop = AtomicBool::new(false);
        let started = Instant::now();
        let sampler = Sampler::new(
            host,
            accelerator.as_ref(),
            metric,
            self.config.interval(),
            started,
        );

        let (outcome, samples) = thread::scope(|scope| {
            let stop = &stop;
            let handle = scope.spawn(move || sampler.run(stop));

            let outcome = panic::catch_unwind(AssertUnwindSafe(op));

            stop.store(true, Ordering::Release);
            let samples = handle.join().unwrap_or_else(|_| {
                warn!("Sampler thread panicked, no samples collected");
                Samples::new()
            });
            (outcome, samples)
        });

        if let Some(accelerator) = accelerator {
            accelerator.shutdown();
        }

        let chart = self.report(&samples);

        match outcome {
            Ok(output) => Observation {
                output,
                samples,
                chart,
            },
            Err(payload) => panic::resume_unwind(payload),
        }
    }

    fn probe_accelerator(&self) -> Option<Accelerator> {
        let index = self.config.device_index?;
        match Accelerator::probe(index) {
            Ok(accelerator) => Some(accelerator),
            Err(e) => {
                warn!("{}", e);
                warn!("GPU monitoring will not be available");
                None
            }
        }
    }

    /// Logs the summary, writes the chart and the optional JSON export.
    fn report(&self, samples: &Samples) -> Option<PathBuf> {
        let metric = self.config.accelerator_metric();

        if self.config.summary {
            info!("{}", Summary::of(samples, metric).to_string().trim_end());
        }

        if let Some(json_path) = &self.config.json_output {
            match export::save_session(json_path, samples, metric) {
                Ok(()) => info!("Samples saved to: {}", json_path.display()),
                Err(e) => warn!("Failed to save samples: {}", e),
            }
        }

        let path = self.config.output_path();
        match chart::render(&path, samples, self.config.layout, metric) {
            Ok(()) => {
                info!("Chart saved to: {}", path.display());
                Some(path)
            }
            Err(e) => {
                warn!("{}", e);
                None
            }
        }
    }
}

/// Runs `op` with the default configuration: GPU 0 power against CPU load,
/// charted to `resource_usage.svg` in the working directory.
pub fn monitor_resources<T, F>(op: F) -> T
where
    F: FnOnce() -> T,
{
    Monitor::default().run(op)
}
