//! Profiler emit configuration.

use kprof_format::buffer_words;

/// Default name of the buffer parameter added to kernel signatures.
pub const DEFAULT_BUFFER_PARAM: &str = "profiler_buffer";

/// Default number of records reserved per group.
pub const DEFAULT_MAX_EVENTS_PER_GROUP: usize = 256;

/// Profiler configuration for generated kernels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProfilerConfig {
    /// Emit instrumentation. When false every fragment is empty and the
    /// buffer parameter is omitted from signatures.
    pub enabled: bool,
    /// Name of the opaque buffer pointer parameter.
    pub buffer_param: String,
    /// Records reserved per group when sizing the buffer.
    pub max_events_per_group: usize,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            enabled: cfg!(feature = "profiler"),
            buffer_param: DEFAULT_BUFFER_PARAM.to_string(),
            max_events_per_group: DEFAULT_MAX_EVENTS_PER_GROUP,
        }
    }
}

impl ProfilerConfig {
    /// Instrumentation on.
    #[must_use]
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    /// Instrumentation off.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Set the buffer parameter name.
    #[must_use]
    pub fn with_buffer_param(mut self, name: impl Into<String>) -> Self {
        self.buffer_param = name.into();
        self
    }

    /// Set records reserved per group.
    #[must_use]
    pub fn with_max_events_per_group(mut self, max_events: usize) -> Self {
        self.max_events_per_group = max_events;
        self
    }

    /// Buffer words the host must allocate for `group_count` groups.
    ///
    /// `None` if profiling is disabled (no buffer is passed) or the size
    /// overflows.
    #[must_use]
    pub const fn buffer_words(&self, group_count: u32) -> Option<usize> {
        if !self.enabled {
            return None;
        }
        buffer_words(group_count, self.max_events_per_group)
    }
}
