use log::debug;
use nvml_wrapper::Nvml;
use nvml_wrapper::error::NvmlError;
use serde::Serialize;

use crate::error::MonitorError;
use crate::metrics::BYTES_PER_GIB;

/// What the accelerator column of a session records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AcceleratorMetric {
    /// Power draw, converted from NVML's milliwatts.
    PowerWatts,
    MemoryGib,
}

impl AcceleratorMetric {
    pub fn label(self) -> &'static str {
        match self {
            AcceleratorMetric::PowerWatts => "GPU Power (W)",
            AcceleratorMetric::MemoryGib => "GPU Memory (GiB)",
        }
    }
}

/// An initialized NVML library bound to one device index.
pub struct Accelerator {
    nvml: Nvml,
    index: u32,
}

impl Accelerator {
    /// Initializes NVML and checks that the device exists.
    pub fn probe(index: u32) -> Result<Self, MonitorError> {
        let nvml = Nvml::init().map_err(MonitorError::AcceleratorUnavailable)?;
        nvml.device_by_index(index)
            .map_err(MonitorError::AcceleratorUnavailable)?;
        Ok(Self { nvml, index })
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn read(&self, metric: AcceleratorMetric) -> Result<f64, MonitorError> {
        self.query(metric).map_err(|source| MonitorError::AcceleratorQuery {
            index: self.index,
            source,
        })
    }

    /// Like [`Accelerator::read`] but a failed query counts as 0.
    pub fn read_or_zero(&self, metric: AcceleratorMetric) -> f64 {
        match self.read(metric) {
            Ok(value) => value,
            Err(e) => {
                debug!("{}", e);
                0.0
            }
        }
    }

    fn query(&self, metric: AcceleratorMetric) -> Result<f64, NvmlError> {
        let device = self.nvml.device_by_index(self.index)?;
        match metric {
            AcceleratorMetric::PowerWatts => Ok(device.power_usage()? as f64 / 1000.0),
            AcceleratorMetric::MemoryGib => Ok(device.memory_info()?.used as f64 / BYTES_PER_GIB),
        }
    }

    /// Shuts NVML down. Errors are logged and dropped.
    pub fn shutdown(self) {
        if let Err(e) = self.nvml.shutdown() {
            debug!("NVML shutdown failed: {}", e);
        }
    }
}
