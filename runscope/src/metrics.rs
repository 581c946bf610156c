use std::fmt;

use serde::Serialize;

use crate::collectors::gpu::AcceleratorMetric;

pub const BYTES_PER_GIB: f64 = (1u64 << 30) as f64;

/// One observation taken by the sampler.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Sample {
    pub elapsed_secs: f64,
    pub cpu_percent: f32,
    pub memory_used_bytes: u64,
    /// Watts or GiB depending on the session's accelerator metric, 0 when absent.
    pub accelerator: f64,
}

/// Samples of one session, stored as parallel columns of equal length.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Samples {
    timestamps: Vec<f64>,
    cpu_percent: Vec<f32>,
    memory_used_bytes: Vec<u64>,
    accelerator: Vec<f64>,
}

impl Samples {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a sample. Timestamps never go backwards: an earlier
    /// timestamp is clamped to the last one recorded.
    pub fn push(&mut self, sample: Sample) {
        let last = self.timestamps.last().copied().unwrap_or(0.0);
        self.timestamps.push(sample.elapsed_secs.max(last));
        self.cpu_percent.push(sample.cpu_percent);
        self.memory_used_bytes.push(sample.memory_used_bytes);
        self.accelerator.push(sample.accelerator);
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[f64] {
        &self.timestamps
    }

    pub fn cpu_percent(&self) -> &[f32] {
        &self.cpu_percent
    }

    pub fn memory_used_bytes(&self) -> &[u64] {
        &self.memory_used_bytes
    }

    pub fn accelerator(&self) -> &[f64] {
        &self.accelerator
    }

    pub fn memory_used_gib(&self) -> Vec<f64> {
        self.memory_used_bytes
            .iter()
            .map(|&bytes| bytes as f64 / BYTES_PER_GIB)
            .collect()
    }

    /// True when no accelerator value was ever non-zero.
    pub fn accelerator_idle(&self) -> bool {
        self.accelerator.iter().all(|&v| v == 0.0)
    }

    pub fn last_elapsed(&self) -> Option<f64> {
        self.timestamps.last().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = Sample> + '_ {
        (0..self.len()).map(move |i| Sample {
            elapsed_secs: self.timestamps[i],
            cpu_percent: self.cpu_percent[i],
            memory_used_bytes: self.memory_used_bytes[i],
            accelerator: self.accelerator[i],
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SeriesStats {
    pub min: f64,
    pub mean: f64,
    pub max: f64,
}

impl SeriesStats {
    /// Returns `None` for an empty series.
    pub fn of(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for value in values {
            count += 1;
            sum += value;
            min = min.min(value);
            max = max.max(value);
        }

        if count == 0 {
            return None;
        }

        Some(Self {
            min,
            mean: sum / count as f64,
            max,
        })
    }
}

/// Min / mean / max of every series in a session.
#[derive(Clone, Debug, Serialize)]
pub struct Summary {
    pub samples: usize,
    pub duration_secs: f64,
    pub cpu_percent: Option<SeriesStats>,
    pub memory_used_gib: Option<SeriesStats>,
    pub accelerator: Option<SeriesStats>,
    pub accelerator_metric: AcceleratorMetric,
}

impl Summary {
    pub fn of(samples: &Samples, accelerator_metric: AcceleratorMetric) -> Self {
        Self {
            samples: samples.len(),
            duration_secs: samples.last_elapsed().unwrap_or(0.0),
            cpu_percent: SeriesStats::of(samples.cpu_percent().iter().map(|&v| v as f64)),
            memory_used_gib: SeriesStats::of(samples.memory_used_gib()),
            accelerator: SeriesStats::of(samples.accelerator().iter().copied()),
            accelerator_metric,
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Resource usage ({} samples over {:.2}s):",
            self.samples, self.duration_secs
        )?;
        write_stats(f, "CPU (%)", self.cpu_percent)?;
        write_stats(f, "RAM (GiB)", self.memory_used_gib)?;
        write_stats(f, self.accelerator_metric.label(), self.accelerator)
    }
}

fn write_stats(f: &mut fmt::Formatter<'_>, name: &str, stats: Option<SeriesStats>) -> fmt::Result {
    match stats {
        Some(s) => writeln!(
            f,
            "  {:<16} min {:>8.2}  mean {:>8.2}  max {:>8.2}",
            name, s.min, s.mean, s.max
        ),
        None => writeln!(f, "  {:<16} no data", name),
    }
}
