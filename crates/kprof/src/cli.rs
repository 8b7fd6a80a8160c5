//! CLI definitions and argument types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use kprof::{DEFAULT_BUFFER_PARAM, Dim3, LaunchGeometry, ProfilerConfig, SimulateConfig};

/// Exit code for success.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for failure.
pub const EXIT_FAILURE: i32 = 1;

#[derive(Parser)]
#[command(name = "kprof")]
#[command(about = "Kernel event profiler - lock-free per-group trace buffers")]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (sets RUST_LOG=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output (only show errors)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub silent: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate the device-side profiler header
    Header {
        #[command(flatten)]
        profiler: ProfilerArgs,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the kernel parameter and argument fragments
    Params {
        #[command(flatten)]
        profiler: ProfilerArgs,
    },
    /// Run a synthetic instrumented launch on the CPU
    Simulate {
        /// Number of groups (0 = one per CPU)
        #[arg(short, long, default_value = "0")]
        groups: u32,

        /// Lanes per group
        #[arg(short, long, default_value = "32")]
        lanes: u32,

        /// Begin/end regions per group
        #[arg(short, long, default_value = "4")]
        regions: u32,

        /// Records reserved per group (0 = exactly what the workload needs)
        #[arg(long, default_value = "0")]
        max_events: usize,

        /// Busy-loop iterations inside each region
        #[arg(long, default_value = "10000")]
        work: u32,

        /// Emit an instant event after the last region
        #[arg(long)]
        instant: bool,

        /// Write the raw buffer (little-endian u64 words) to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Decode a raw buffer file into per-group events
    Dump {
        /// Raw buffer file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Only show this group
        #[arg(long)]
        group: Option<u32>,
    },
}

/// Profiler selection arguments.
#[derive(Args, Clone, Debug)]
pub struct ProfilerArgs {
    /// Generate the disabled (no-op) variant
    #[arg(long)]
    pub disabled: bool,

    /// Name of the buffer parameter in kernel signatures
    #[arg(long, default_value = DEFAULT_BUFFER_PARAM)]
    pub buffer_param: String,
}

impl ProfilerArgs {
    pub fn to_config(&self) -> ProfilerConfig {
        let config = if self.disabled {
            ProfilerConfig::disabled()
        } else {
            ProfilerConfig::enabled()
        };
        config.with_buffer_param(self.buffer_param.clone())
    }
}

/// Build a simulation config from CLI values.
pub fn simulate_config(
    groups: u32,
    lanes: u32,
    regions: u32,
    max_events: usize,
    work: u32,
    instant: bool,
) -> SimulateConfig {
    let groups = if groups == 0 {
        u32::try_from(num_cpus::get()).unwrap_or(1)
    } else {
        groups
    };
    let config = SimulateConfig::default()
        .with_geometry(LaunchGeometry::new(Dim3::linear(groups), Dim3::linear(lanes)))
        .with_regions(regions)
        .with_work(work)
        .with_instant(instant);
    let max_events = if max_events == 0 {
        config.events_per_group()
    } else {
        max_events
    };
    config.with_max_events_per_group(max_events)
}
