use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Command, ExitStatus, exit};

use clap::Parser;
use log::error;

use runscope::{ChartLayout, Monitor, MonitorConfig};

/// Exit code when the command could not be started.
const EXIT_SPAWN_FAILED: i32 = 127;

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            exit(2);
        }
    };

    let (program, args) = match cli.command.split_first() {
        Some(split) => split,
        None => {
            error!("No command given");
            exit(2);
        }
    };

    let monitor = Monitor::new(config);
    let status: io::Result<ExitStatus> =
        monitor.run(|| Command::new(program).args(args).status());

    match status {
        Ok(status) => exit(status.code().unwrap_or(1)),
        Err(e) => {
            error!("Failed to execute {}: {}", program, e);
            exit(EXIT_SPAWN_FAILED);
        }
    }
}

fn build_config(cli: &Cli) -> runscope::error::Result<MonitorConfig> {
    let mut config = match &cli.config {
        Some(path) => MonitorConfig::from_file(path)?,
        None => MonitorConfig::default(),
    };

    if let Some(layout) = cli.layout {
        config.layout = layout;
    }
    if let Some(output) = &cli.output {
        config.output = Some(output.clone());
    }
    if let Some(index) = cli.device {
        config.device_index = Some(index);
    }
    if cli.no_accelerator {
        config.device_index = None;
    }
    if let Some(interval) = cli.interval_ms {
        config.interval_ms = interval;
    }
    if let Some(window) = cli.cpu_window_ms {
        config.cpu_window_ms = window;
    }
    if cli.no_summary {
        config.summary = false;
    }
    if let Some(json) = &cli.json {
        config.json_output = Some(json.clone());
    }

    Ok(config)
}

/// Warnings and errors carry their level, everything else prints bare.
fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| match record.level() {
            log::Level::Warn | log::Level::Error => {
                writeln!(buf, "[{}] {}", record.level(), record.args())
            }
            _ => writeln!(buf, "{}", record.args()),
        })
        .init();
}

#[derive(Parser)]
#[command(name = "runscope")]
#[command(about = "Run a command and chart its CPU, memory and GPU usage", long_about = None)]
struct Cli {
    /// JSON config file; command-line options override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Chart output path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Chart layout
    #[arg(long, value_enum)]
    layout: Option<ChartLayout>,

    /// GPU device index
    #[arg(long)]
    device: Option<u32>,

    /// Do not sample the GPU
    #[arg(long, default_value_t = false, conflicts_with = "device")]
    no_accelerator: bool,

    /// Pause after each sample in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// CPU measurement window in milliseconds
    #[arg(long)]
    cpu_window_ms: Option<u64>,

    /// Also write the samples as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Skip the summary block
    #[arg(long, default_value_t = false)]
    no_summary: bool,

    /// Enable debug logging
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    /// Command to run, after `--`
    #[arg(last = true, required = true)]
    command: Vec<String>,
}
