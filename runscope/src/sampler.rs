//! Background sampling loop.
//!
//! A [`Sampler`] owns its buffer and hands it back when [`Sampler::run`]
//! returns, so the collected samples are only visible to the caller after the
//! sampling thread has finished.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::collectors::{self, cpu::HostCollector, gpu::Accelerator, gpu::AcceleratorMetric};
use crate::metrics::Samples;

pub struct Sampler<'a> {
    host: HostCollector,
    accelerator: Option<&'a Accelerator>,
    metric: AcceleratorMetric,
    pause: Duration,
    started: Instant,
}

impl<'a> Sampler<'a> {
    pub fn new(
        host: HostCollector,
        accelerator: Option<&'a Accelerator>,
        metric: AcceleratorMetric,
        pause: Duration,
        started: Instant,
    ) -> Self {
        Self {
            host,
            accelerator,
            metric,
            pause,
            started,
        }
    }

    /// Samples until `stop` is set. The flag is checked before each tick,
    /// so a stop never produces a partial sample.
    pub fn run(mut self, stop: &AtomicBool) -> Samples {
        let mut samples = Samples::new();

        while !stop.load(Ordering::Acquire) {
            let elapsed = self.started.elapsed().as_secs_f64();
            let sample =
                collectors::take_sample(&mut self.host, self.accelerator, self.metric, elapsed);
            samples.push(sample);

            if !self.pause.is_zero() {
                thread::sleep(self.pause);
            }
        }

        samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sampler(pause_ms: u64) -> Sampler<'static> {
        Sampler::new(
            HostCollector::new(Duration::from_millis(20)),
            None,
            AcceleratorMetric::PowerWatts,
            Duration::from_millis(pause_ms),
            Instant::now(),
        )
    }

    #[test]
    fn test_stopped_before_start_yields_nothing() {
        let stop = AtomicBool::new(true);
        let samples = sampler(10).run(&stop);
        assert!(samples.is_empty());
    }

    #[test]
    fn test_samples_until_stopped() {
        let stop = AtomicBool::new(false);
        let samples = thread::scope(|scope| {
            let handle = scope.spawn(|| sampler(10).run(&stop));
            thread::sleep(Duration::from_millis(200));
            stop.store(true, Ordering::Release);
            handle.join().unwrap()
        });

        assert!(samples.len() >= 2);
        assert_eq!(samples.len(), samples.cpu_percent().len());
        assert_eq!(samples.len(), samples.memory_used_bytes().len());
        assert_eq!(samples.len(), samples.accelerator().len());
        assert!(samples.timestamps().windows(2).all(|w| w[0] <= w[1]));
        assert!(samples.timestamps()[0] < 0.1);
        assert!(samples.accelerator_idle());
    }
}
