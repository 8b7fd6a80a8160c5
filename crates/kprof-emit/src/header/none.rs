//! Disabled profiler header generation.

use crate::config::ProfilerConfig;

/// Same macro names as the enabled header, all expanding to nothing.
#[must_use]
pub fn gen_profiler_none(_config: &ProfilerConfig) -> String {
    r"/* Kernel profiler disabled - all macros expand to nothing. */
#pragma once

#define KPROF_ENABLED 0

#define PROFILER_ADDITIONAL_FUNC_PARAMS
#define PROFILER_ADDITIONAL_FUNC_PARAMS_ARGS
#define PROFILER_ADDITIONAL_PARAMS_SETTER

#define PROFILER_INCLUDE_ALL_DECL
#define PROFILER_CLOSURE_PARAMS_DECL
#define PROFILER_PARAMS_DECL
#define PROFILER_INIT(profiler_buffer, write_thread_predicate)
#define PROFILER_EVENT_START(event)
#define PROFILER_EVENT_END(event)
#define PROFILER_EVENT_INSTANT(event)
"
    .to_string()
}
