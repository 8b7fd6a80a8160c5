//! kprof - kernel event profiler.
//!
//! Lock-free, per-group trace buffers for massively parallel kernels. Each
//! execution group writes timestamped begin/end/instant records into its own
//! stride-separated stream of one shared buffer; a decoder splits the buffer
//! back into per-group timelines.
//!
//! # Example
//!
//! ```ignore
//! use kprof::{LaunchGeometry, ManualClock, TraceBuffer, TraceView, EventWriter, launch};
//!
//! let geometry = LaunchGeometry::linear(4, 32);
//! let buffer = TraceBuffer::for_geometry(&geometry, 8)?;
//! let clock = ManualClock::ticking(1, 10);
//! launch(&geometry, &buffer, &clock, 0, |w, _lane| {
//!     w.emit_begin(5);
//!     w.emit_end(5);
//! });
//! let words = buffer.snapshot();
//! let timelines = TraceView::parse(&words)?.timelines()?;
//! ```

pub use kprof_device::{
    ActiveWriter, Clock, Dim3, EventWriter, GlobalTimer, GroupLayout, LaneId, LaunchGeometry,
    LayoutError, ManualClock, NoopWriter, PROFILER_ENABLED, ProfileWriter, TraceBuffer,
    group_fence, init, write_header,
};
pub use kprof_emit::{
    DEFAULT_BUFFER_PARAM, PROFILER_HEADER_NAME, ProfilerConfig, ProfilingParams,
    gen_profiler_header, profiling_ptr,
};
pub use kprof_format::{
    EventRecord, EventType, FormatError, GroupTimeline, Header, Tag, TraceEvent, TraceView,
    decode_tag, encode_tag, words_from_bytes, words_to_bytes,
};

mod runner;
mod summary;

pub use runner::{SimulateConfig, launch, launch_with, simulate};
pub use summary::{RegionStats, TraceSummary};

use std::path::Path;

use thiserror::Error;
use tracing::debug;

/// Profiler errors.
#[derive(Error, Debug)]
pub enum Error {
    #[error("trace format error: {0}")]
    Format(#[from] FormatError),
    #[error("buffer layout error: {0}")]
    Layout(#[from] LayoutError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("workload needs {needed} events per group, buffer holds {available}")]
    InsufficientCapacity { needed: usize, available: usize },
    #[error("workload uses {needed} event slots, tags address {max}")]
    TooManySlots { needed: u64, max: u32 },
    #[error("invalid launch geometry: {0}")]
    InvalidGeometry(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Write buffer words to `path` as little-endian `u64`s.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_words(path: impl AsRef<Path>, words: &[u64]) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, words_to_bytes(words))?;
    debug!(path = %path.display(), words = words.len(), "saved trace buffer");
    Ok(())
}

/// Read buffer words written by [`save_words`].
///
/// # Errors
///
/// Returns an error if the file cannot be read or its length is not a
/// multiple of 8 bytes.
pub fn load_words(path: impl AsRef<Path>) -> Result<Vec<u64>> {
    let bytes = std::fs::read(path)?;
    Ok(words_from_bytes(&bytes)?)
}
