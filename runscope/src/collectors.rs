pub mod cpu;
pub mod gpu;

use crate::metrics::Sample;
use cpu::HostCollector;
use gpu::{Accelerator, AcceleratorMetric};

/// Reads every subsystem once. Blocks for the host collector's CPU window.
pub fn take_sample(
    host: &mut HostCollector,
    accelerator: Option<&Accelerator>,
    metric: AcceleratorMetric,
    elapsed_secs: f64,
) -> Sample {
    let cpu_percent = host.cpu_percent();
    let memory_used_bytes = host.memory_used_bytes();
    let accelerator = accelerator
        .map(|a| a.read_or_zero(metric))
        .unwrap_or(0.0);

    Sample {
        elapsed_secs,
        cpu_percent,
        memory_used_bytes,
        accelerator,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_take_sample_without_accelerator() {
        let mut host = HostCollector::new(Duration::from_millis(10));
        let sample = take_sample(&mut host, None, AcceleratorMetric::PowerWatts, 1.5);

        assert_eq!(sample.elapsed_secs, 1.5);
        assert_eq!(sample.accelerator, 0.0);
        assert!(sample.memory_used_bytes > 0);
    }
}
