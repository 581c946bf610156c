use std::fs;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::collectors::gpu::AcceleratorMetric;
use crate::error::Result;
use crate::metrics::{Samples, Summary};

#[derive(Serialize)]
struct SessionRecord<'a> {
    summary: Summary,
    samples: &'a Samples,
}

/// Writes a session's samples and summary as pretty JSON.
pub fn save_session(path: &Path, samples: &Samples, metric: AcceleratorMetric) -> Result<()> {
    // Create output folder if it doesn't exist
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let record = SessionRecord {
        summary: Summary::of(samples, metric),
        samples,
    };
    let json_data = serde_json::to_string_pretty(&record)?;

    let mut file = fs::File::create(path)?;
    file.write_all(json_data.as_bytes())?;
    Ok(())
}
