//! SVG charts of a monitoring session.

use std::error::Error;
use std::fs;
use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::collectors::gpu::AcceleratorMetric;
use crate::error::MonitorError;
use crate::metrics::Samples;
use crate::mode::ChartLayout;

type DrawResult = Result<(), Box<dyn Error + Send + Sync>>;

const TITLE: &str = "Resource Usage During Execution";
const ACCELERATOR_IDLE_NOTE: &str = "GPU unavailable or unused";

const ACCELERATOR_COLOR: RGBColor = RGBColor(44, 160, 44);
const CPU_COLOR: RGBColor = RGBColor(31, 119, 180);
const RAM_COLOR: RGBColor = RGBColor(255, 127, 14);

/// Renders `samples` to an SVG file at `path`, replacing any previous chart.
pub fn render(
    path: &Path,
    samples: &Samples,
    layout: ChartLayout,
    metric: AcceleratorMetric,
) -> Result<(), MonitorError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let drawn = match layout {
        ChartLayout::Power => draw_dual_axis(path, samples, metric),
        ChartLayout::Detailed => draw_stacked(path, samples, metric),
    };

    drawn.map_err(|source| MonitorError::Chart {
        path: path.to_path_buf(),
        source,
    })
}

/// Accelerator on the left axis, CPU on the right.
fn draw_dual_axis(path: &Path, samples: &Samples, metric: AcceleratorMetric) -> DrawResult {
    let root = SVGBackend::new(path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let timestamps = samples.timestamps();
    let x_end = time_axis_end(timestamps);
    let accelerator_top = value_axis_top(samples.accelerator().iter().copied());

    let mut chart = ChartBuilder::on(&root)
        .caption(TITLE, ("sans-serif", 24).into_font())
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .right_y_label_area_size(70)
        .build_cartesian_2d(0f64..x_end, 0f64..accelerator_top)?
        .set_secondary_coord(0f64..x_end, 0f64..100f64);

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("Time (s)")
        .y_desc(metric.label())
        .draw()?;

    chart
        .configure_secondary_axes()
        .y_desc("CPU Usage (%)")
        .draw()?;

    chart
        .draw_series(LineSeries::new(
            points(timestamps, samples.accelerator().iter().copied()),
            &ACCELERATOR_COLOR,
        ))?
        .label(metric.label())
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], ACCELERATOR_COLOR));

    // Drawn before the CPU series exists so it only lists the left axis.
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    chart.draw_secondary_series(LineSeries::new(
        points(timestamps, samples.cpu_percent().iter().map(|&v| v as f64)),
        &CPU_COLOR,
    ))?;

    let plot = chart.plotting_area().strip_coord_spec();
    draw_corner_legend(&plot, "CPU Usage (%)", CPU_COLOR)?;

    root.present()?;
    Ok(())
}

/// Single-entry legend in the upper right corner of `area`.
fn draw_corner_legend(
    area: &DrawingArea<SVGBackend<'_>, Shift>,
    label: &str,
    color: RGBColor,
) -> DrawResult {
    let (width, _) = area.dim_in_pixel();
    let right = width as i32 - 10;
    let left = right - 160;
    let corners = [(left, 10), (right, 40)];

    area.draw(&Rectangle::new(corners, WHITE.mix(0.8).filled()))?;
    area.draw(&Rectangle::new(corners, BLACK))?;
    area.draw(&PathElement::new(vec![(left + 10, 25), (left + 30, 25)], color))?;
    area.draw(&Text::new(
        label.to_string(),
        (left + 40, 25),
        TextStyle::from(("sans-serif", 15).into_font()).pos(Pos::new(HPos::Left, VPos::Center)),
    ))?;
    Ok(())
}

struct Panel<'a> {
    label: &'a str,
    values: Vec<f64>,
    color: RGBColor,
    /// Fixed axis top; derived from the data when `None`.
    y_top: Option<f64>,
    note: Option<&'a str>,
}

/// Accelerator, CPU and RAM on three stacked panels.
fn draw_stacked(path: &Path, samples: &Samples, metric: AcceleratorMetric) -> DrawResult {
    let root = SVGBackend::new(path, (1000, 1000)).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled(TITLE, ("sans-serif", 24).into_font())?;

    let timestamps = samples.timestamps();
    let x_end = time_axis_end(timestamps);

    let panels = [
        Panel {
            label: metric.label(),
            values: samples.accelerator().to_vec(),
            color: ACCELERATOR_COLOR,
            y_top: None,
            note: samples.accelerator_idle().then_some(ACCELERATOR_IDLE_NOTE),
        },
        Panel {
            label: "CPU Usage (%)",
            values: samples.cpu_percent().iter().map(|&v| v as f64).collect(),
            color: CPU_COLOR,
            y_top: Some(100.0),
            note: None,
        },
        Panel {
            label: "RAM Usage (GiB)",
            values: samples.memory_used_gib(),
            color: RAM_COLOR,
            y_top: None,
            note: None,
        },
    ];

    for (area, panel) in root.split_evenly((3, 1)).iter().zip(&panels) {
        draw_panel(area, timestamps, x_end, panel)?;
    }

    root.present()?;
    Ok(())
}

fn draw_panel(
    area: &DrawingArea<SVGBackend<'_>, Shift>,
    timestamps: &[f64],
    x_end: f64,
    panel: &Panel<'_>,
) -> DrawResult {
    let y_top = panel
        .y_top
        .unwrap_or_else(|| value_axis_top(panel.values.iter().copied()));

    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..x_end, 0f64..y_top)?;

    chart
        .configure_mesh()
        .bold_line_style(BLACK.mix(0.12))
        .light_line_style(BLACK.mix(0.04))
        .x_desc("Time (s)")
        .y_desc(panel.label)
        .draw()?;

    let color = panel.color;
    chart
        .draw_series(LineSeries::new(
            points(timestamps, panel.values.iter().copied()),
            &color,
        ))?
        .label(panel.label)
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));

    if let Some(note) = panel.note {
        let style = ("sans-serif", 20)
            .into_font()
            .color(&RED)
            .pos(Pos::new(HPos::Center, VPos::Center));
        chart.draw_series(std::iter::once(Text::new(
            note.to_string(),
            (x_end / 2.0, y_top / 2.0),
            style,
        )))?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    Ok(())
}

fn points(timestamps: &[f64], values: impl IntoIterator<Item = f64>) -> Vec<(f64, f64)> {
    timestamps.iter().copied().zip(values).collect()
}

/// End of the time axis; a unit range when there is nothing to span.
fn time_axis_end(timestamps: &[f64]) -> f64 {
    timestamps
        .last()
        .copied()
        .filter(|&t| t > 0.0)
        .unwrap_or(1.0)
}

/// Top of a value axis with 10% headroom; a unit range for empty or zero data.
fn value_axis_top(values: impl IntoIterator<Item = f64>) -> f64 {
    let max = values.into_iter().fold(0.0, f64::max);
    if max > 0.0 { max * 1.1 } else { 1.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Sample;
    use tempfile::tempdir;

    fn busy_samples(accelerator: f64) -> Samples {
        let mut samples = Samples::new();
        for i in 0..5 {
            samples.push(Sample {
                elapsed_secs: i as f64 * 0.2,
                cpu_percent: 10.0 * i as f32,
                memory_used_bytes: (4 + i) << 30,
                accelerator,
            });
        }
        samples
    }

    #[test]
    fn test_time_axis_end() {
        assert_eq!(time_axis_end(&[]), 1.0);
        assert_eq!(time_axis_end(&[0.0]), 1.0);
        assert_eq!(time_axis_end(&[0.0, 2.5]), 2.5);
    }

    #[test]
    fn test_value_axis_top() {
        assert_eq!(value_axis_top(Vec::new()), 1.0);
        assert_eq!(value_axis_top([0.0, 0.0]), 1.0);
        assert!((value_axis_top([5.0, 10.0]) - 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_render_power_layout() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("power.svg");

        render(&path, &busy_samples(120.0), ChartLayout::Power, AcceleratorMetric::PowerWatts)
            .unwrap();

        let svg = fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("GPU Power (W)"));
        assert!(svg.contains("CPU Usage (%)"));
    }

    #[test]
    fn test_render_power_layout_has_legend_per_axis() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("power.svg");

        render(&path, &busy_samples(80.0), ChartLayout::Power, AcceleratorMetric::PowerWatts)
            .unwrap();

        // Each label appears once as an axis title and once in its own legend.
        let svg = fs::read_to_string(&path).unwrap();
        assert_eq!(svg.matches("GPU Power (W)").count(), 2);
        assert_eq!(svg.matches("CPU Usage (%)").count(), 2);
    }

    #[test]
    fn test_render_detailed_notes_idle_accelerator() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("detailed.svg");

        render(&path, &busy_samples(0.0), ChartLayout::Detailed, AcceleratorMetric::MemoryGib)
            .unwrap();

        let svg = fs::read_to_string(&path).unwrap();
        assert!(svg.contains("RAM Usage (GiB)"));
        assert!(svg.contains(ACCELERATOR_IDLE_NOTE));
    }

    #[test]
    fn test_render_detailed_busy_accelerator_has_no_note() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("detailed.svg");

        render(&path, &busy_samples(3.5), ChartLayout::Detailed, AcceleratorMetric::MemoryGib)
            .unwrap();

        let svg = fs::read_to_string(&path).unwrap();
        assert!(!svg.contains(ACCELERATOR_IDLE_NOTE));
    }

    #[test]
    fn test_render_empty_samples() {
        let dir = tempdir().unwrap();
        for layout in [ChartLayout::Power, ChartLayout::Detailed] {
            let path = dir.path().join(layout.default_output());
            render(&path, &Samples::new(), layout, layout.accelerator_metric()).unwrap();
            assert!(path.exists());
        }
    }

    #[test]
    fn test_render_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/charts/run.svg");

        render(&path, &busy_samples(0.0), ChartLayout::Power, AcceleratorMetric::PowerWatts)
            .unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_render_overwrites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.svg");

        render(&path, &busy_samples(0.0), ChartLayout::Detailed, AcceleratorMetric::MemoryGib)
            .unwrap();
        render(&path, &busy_samples(50.0), ChartLayout::Detailed, AcceleratorMetric::MemoryGib)
            .unwrap();

        let svg = fs::read_to_string(&path).unwrap();
        assert!(!svg.contains(ACCELERATOR_IDLE_NOTE));
    }
}
