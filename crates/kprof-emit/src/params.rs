//! Source fragments spliced into generated kernels.
//!
//! The code emitter adds one opaque buffer pointer to every kernel signature
//! and forwards it through nested calls. With profiling disabled every
//! fragment is empty, so generated code is identical to an uninstrumented
//! build.

use crate::config::ProfilerConfig;

/// Parameter declaration and argument forwarding for the buffer pointer.
///
/// Both start with `", "` so they can be appended to an existing list.
/// Disabled: `("", "")`.
#[must_use]
pub fn profiling_ptr(config: &ProfilerConfig) -> (String, String) {
    if !config.enabled {
        return (String::new(), String::new());
    }
    (
        format!(", void* {}", config.buffer_param),
        format!(", {}", config.buffer_param),
    )
}

/// All declarations the code emitter needs for one kernel.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfilingParams {
    /// Appended to the kernel parameter list.
    /// Example: ", void* profiler_buffer"
    pub param_decl: String,
    /// Appended to argument lists of nested calls.
    /// Example: ", profiler_buffer"
    pub arg_forward: String,
    /// Stores the opaque parameter into the typed pointer.
    /// Example: "profiler_buffer_ptr = static_cast<uint64_t*>(profiler_buffer);"
    pub setter: String,
    /// Typed buffer pointer declaration.
    pub params_decl: String,
    /// Per-lane writer state declarations.
    pub closure_decl: String,
}

impl ProfilingParams {
    /// Create fragments from config.
    #[must_use]
    pub fn new(config: &ProfilerConfig) -> Self {
        if !config.enabled {
            return Self::default();
        }
        let (param_decl, arg_forward) = profiling_ptr(config);
        Self {
            param_decl,
            arg_forward,
            setter: format!(
                "profiler_buffer_ptr = static_cast<uint64_t*>({});",
                config.buffer_param
            ),
            params_decl: "uint64_t* profiler_buffer_ptr;".to_string(),
            closure_decl: "uint64_t* profiler_write_ptr; \
                           uint32_t profiler_write_stride; \
                           uint32_t profiler_entry_tag_base; \
                           bool profiler_write_thread_predicate;"
                .to_string(),
        }
    }

    /// Whether any fragment is non-empty.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.param_decl.is_empty()
    }

    /// Append the buffer parameter to a parameter list.
    #[must_use]
    pub fn splice_params(&self, params: &str) -> String {
        format!("{params}{}", self.param_decl)
    }

    /// Append the buffer argument to an argument list.
    #[must_use]
    pub fn splice_args(&self, args: &str) -> String {
        format!("{args}{}", self.arg_forward)
    }

    /// Writer initialization for a kernel body.
    #[must_use]
    pub fn init(&self, write_thread_predicate: &str) -> String {
        if self.is_enabled() {
            format!("PROFILER_INIT(profiler_buffer_ptr, {write_thread_predicate});")
        } else {
            String::new()
        }
    }

    /// Begin of region `event_slot`.
    #[must_use]
    pub fn event_start(&self, event_slot: u32) -> String {
        self.event("PROFILER_EVENT_START", event_slot)
    }

    /// End of region `event_slot`.
    #[must_use]
    pub fn event_end(&self, event_slot: u32) -> String {
        self.event("PROFILER_EVENT_END", event_slot)
    }

    /// Point event `event_slot`.
    #[must_use]
    pub fn event_instant(&self, event_slot: u32) -> String {
        self.event("PROFILER_EVENT_INSTANT", event_slot)
    }

    fn event(&self, macro_name: &str, event_slot: u32) -> String {
        if self.is_enabled() {
            format!("{macro_name}({event_slot});")
        } else {
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiling_ptr_enabled() {
        let (param, arg) = profiling_ptr(&ProfilerConfig::enabled());
        assert_eq!(param, ", void* profiler_buffer");
        assert_eq!(arg, ", profiler_buffer");
    }

    #[test]
    fn test_profiling_ptr_disabled() {
        let (param, arg) = profiling_ptr(&ProfilerConfig::disabled());
        assert!(param.is_empty());
        assert!(arg.is_empty());
    }

    #[test]
    fn test_splice_signature() {
        let params = ProfilingParams::new(&ProfilerConfig::enabled().with_buffer_param("pbuf"));
        assert_eq!(
            params.splice_params("half_t* dtensor0, half_t* dtensor1"),
            "half_t* dtensor0, half_t* dtensor1, void* pbuf"
        );
        assert_eq!(params.splice_args("dtensor0, dtensor1"), "dtensor0, dtensor1, pbuf");
        assert!(params.setter.contains("static_cast<uint64_t*>(pbuf)"));
        assert!(params.closure_decl.contains("profiler_write_thread_predicate"));
    }

    #[test]
    fn test_disabled_omits_everything() {
        let params = ProfilingParams::new(&ProfilerConfig::disabled());
        assert!(!params.is_enabled());
        assert_eq!(params.splice_params("int n"), "int n");
        assert_eq!(params.splice_args("n"), "n");
        assert!(params.init("threadIdx.x == 0").is_empty());
        assert!(params.event_start(5).is_empty());
        assert!(params.event_end(5).is_empty());
        assert!(params.event_instant(5).is_empty());
    }

    #[test]
    fn test_event_calls() {
        let params = ProfilingParams::new(&ProfilerConfig::enabled());
        assert_eq!(params.event_start(5), "PROFILER_EVENT_START(5);");
        assert_eq!(params.event_end(5), "PROFILER_EVENT_END(5);");
        assert_eq!(params.event_instant(7), "PROFILER_EVENT_INSTANT(7);");
        assert_eq!(
            params.init("threadIdx.x == 0"),
            "PROFILER_INIT(profiler_buffer_ptr, threadIdx.x == 0);"
        );
    }
}
