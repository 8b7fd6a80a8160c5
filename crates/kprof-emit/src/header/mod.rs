//! Device header generators.

use tracing::debug;

use crate::config::ProfilerConfig;

mod cuda;
mod none;

/// File name the generated header is written to.
pub const PROFILER_HEADER_NAME: &str = "kprof_profiler.h";

/// Generate the device-side profiler header for `config`.
///
/// Enabled and disabled headers define the same macro names, so instrumented
/// kernel sources compile either way.
#[must_use]
pub fn gen_profiler_header(config: &ProfilerConfig) -> String {
    let header = if config.enabled {
        cuda::gen_profiler_cuda(config)
    } else {
        none::gen_profiler_none(config)
    };
    debug!(enabled = config.enabled, bytes = header.len(), "generated profiler header");
    header
}
