use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::collectors::gpu::AcceleratorMetric;

/// Chart layout, which also decides what the accelerator column records.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartLayout {
    /// GPU power and CPU load on one plot with two vertical axes.
    #[default]
    Power,
    /// GPU memory, CPU load and RAM on three stacked panels.
    Detailed,
}

impl ChartLayout {
    pub fn accelerator_metric(self) -> AcceleratorMetric {
        match self {
            ChartLayout::Power => AcceleratorMetric::PowerWatts,
            ChartLayout::Detailed => AcceleratorMetric::MemoryGib,
        }
    }

    pub fn default_output(self) -> &'static str {
        match self {
            ChartLayout::Power => "resource_usage.svg",
            ChartLayout::Detailed => "resource_usage_detailed.svg",
        }
    }
}
