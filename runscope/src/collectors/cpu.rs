use std::thread;
use std::time::Duration;

use sysinfo::System;

/// Host-wide CPU and memory readings.
pub struct HostCollector {
    system: System,
    cpu_window: Duration,
}

impl HostCollector {
    pub fn new(cpu_window: Duration) -> Self {
        let mut system = System::new();

        // First refresh to initialize counters
        system.refresh_cpu_usage();
        system.refresh_memory();

        Self { system, cpu_window }
    }

    /// Global CPU utilization measured over the collector's window.
    /// Blocks the calling thread for the length of the window.
    pub fn cpu_percent(&mut self) -> f32 {
        self.system.refresh_cpu_usage();
        thread::sleep(self.cpu_window);
        self.system.refresh_cpu_usage();
        self.system.global_cpu_usage().clamp(0.0, 100.0)
    }

    pub fn memory_used_bytes(&mut self) -> u64 {
        self.system.refresh_memory();
        self.system.used_memory()
    }

    pub fn memory_total_bytes(&self) -> u64 {
        self.system.total_memory()
    }
}
