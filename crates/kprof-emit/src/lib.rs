//! Kernel source fragments for the kernel profiler.
//!
//! Used by a source-to-source code emitter at generation time: the buffer
//! parameter fragments for kernel signatures, the calls placed at
//! instrumentation points, and the device header defining them. Nothing here
//! runs on the device.

mod config;
mod header;
mod params;

pub use config::{DEFAULT_BUFFER_PARAM, DEFAULT_MAX_EVENTS_PER_GROUP, ProfilerConfig};
pub use header::{PROFILER_HEADER_NAME, gen_profiler_header};
pub use params::{ProfilingParams, profiling_ptr};
