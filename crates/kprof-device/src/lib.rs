//! Device-side event emission for kernel profiler trace buffers.
//!
//! Instrumented kernel code creates one writer per lane and calls
//! `emit_begin`/`emit_end`/`emit_instant` at chosen points. Groups share one
//! buffer but never the same word, so no cross-group synchronization is
//! needed.
//!
//! The `profiler` feature selects [`ActiveWriter`]: [`ProfileWriter`] when
//! enabled, the zero-sized [`NoopWriter`] otherwise. Both are always compiled
//! and share the [`EventWriter`] interface.
//!
//! ```ignore
//! use kprof_device::{EventWriter, GlobalTimer, LaunchGeometry, TraceBuffer, init};
//!
//! let geometry = LaunchGeometry::linear(4, 128);
//! let buffer = TraceBuffer::for_geometry(&geometry, 16)?;
//! // inside the kernel, for each lane:
//! let mut w = init(buffer.words(), lane, &GlobalTimer, lane.is_first_lane());
//! w.emit_begin(5);
//! // ... work ...
//! w.emit_end(5);
//! ```

mod clock;
mod geometry;
mod layout;
mod writer;

pub use clock::{Clock, GlobalTimer, ManualClock};
pub use geometry::{Dim3, LaneId, LaunchGeometry};
pub use layout::{GroupLayout, LayoutError, TraceBuffer, write_header};
pub use writer::{
    ActiveWriter, EventWriter, NoopWriter, PROFILER_ENABLED, ProfileWriter, group_fence, init,
};
