//! Event emission.
//!
//! Every lane of an instrumented kernel holds its own writer, created by
//! [`EventWriter::init`]. Only the lane whose write predicate is set stores
//! records; all lanes execute the group-local fences so the group agrees on
//! the ordering between timestamps and the instrumented work.
//!
//! # Instant events
//!
//! [`emit_instant`](EventWriter::emit_instant) stores its record at the
//! current cursor and does **not** advance it. The next begin, end or instant
//! of the same group overwrites that record. Decoders must expect this.
//!
//! # Overruns
//!
//! Capacity is the caller's responsibility. A record that would land past the
//! end of the buffer is dropped without any report.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering, fence};

use kprof_format::{EventRecord, EventType, encode_event_tag};

use crate::clock::{Clock, GlobalTimer};
use crate::geometry::LaneId;
use crate::layout::{GroupLayout, write_header};

/// Group-local ordering fence.
///
/// Orders the calling lane's memory accesses before and after the fence; it
/// never waits for other lanes or groups.
#[inline(always)]
pub fn group_fence() {
    fence(Ordering::AcqRel);
}

/// Call surface shared by the real and the no-op writer.
pub trait EventWriter<'a, C: Clock>: Sized {
    /// Set up the calling lane's writer state.
    ///
    /// Lane 0 of every group also writes the buffer header. `write_predicate`
    /// is stored as given and must hold for exactly one lane per group.
    fn init(buffer: &'a [AtomicU64], lane: LaneId, clock: &'a C, write_predicate: bool) -> Self;

    /// Record the start of region `event_slot`, then fence.
    fn emit_begin(&mut self, event_slot: u32);

    /// Fence, then record the end of region `event_slot`.
    fn emit_end(&mut self, event_slot: u32);

    /// Fence, record a point event at the current slot without advancing,
    /// fence.
    fn emit_instant(&mut self, event_slot: u32);
}

/// Writer that records events into the trace buffer.
#[derive(Debug)]
pub struct ProfileWriter<'a, C: Clock = GlobalTimer> {
    buffer: &'a [AtomicU64],
    cursor: usize,
    stride: usize,
    tag_base: u32,
    write_predicate: bool,
    clock: &'a C,
}

impl<C: Clock> ProfileWriter<'_, C> {
    /// Word index the next record will be stored at.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub const fn stride(&self) -> usize {
        self.stride
    }

    #[must_use]
    pub const fn tag_base(&self) -> u32 {
        self.tag_base
    }

    #[must_use]
    pub const fn write_predicate(&self) -> bool {
        self.write_predicate
    }

    #[inline(always)]
    fn store(&self, event_slot: u32, event_type: EventType) {
        let tag = encode_event_tag(self.tag_base, event_slot, event_type);
        let record = EventRecord::new(tag, self.clock.read_timestamp());
        if let Some(word) = self.buffer.get(self.cursor) {
            word.store(record.pack(), Ordering::Relaxed);
        }
    }
}

impl<'a, C: Clock> EventWriter<'a, C> for ProfileWriter<'a, C> {
    fn init(buffer: &'a [AtomicU64], lane: LaneId, clock: &'a C, write_predicate: bool) -> Self {
        if lane.is_first_lane() {
            write_header(buffer, lane.group_count);
        }
        let layout = GroupLayout::for_lane(lane);
        Self {
            buffer,
            cursor: layout.cursor,
            stride: layout.stride,
            tag_base: layout.tag_base,
            write_predicate,
            clock,
        }
    }

    #[inline(always)]
    fn emit_begin(&mut self, event_slot: u32) {
        if self.write_predicate {
            self.store(event_slot, EventType::Begin);
            self.cursor += self.stride;
        }
        group_fence();
    }

    #[inline(always)]
    fn emit_end(&mut self, event_slot: u32) {
        group_fence();
        if self.write_predicate {
            self.store(event_slot, EventType::End);
            self.cursor += self.stride;
        }
    }

    #[inline(always)]
    fn emit_instant(&mut self, event_slot: u32) {
        group_fence();
        if self.write_predicate {
            self.store(event_slot, EventType::Instant);
        }
        group_fence();
    }
}

/// Writer used when profiling is compiled out.
///
/// Zero-sized; every call does nothing.
#[derive(Debug, Clone, Copy)]
pub struct NoopWriter<'a, C: Clock = GlobalTimer> {
    _marker: PhantomData<&'a C>,
}

impl<'a, C: Clock> EventWriter<'a, C> for NoopWriter<'a, C> {
    #[inline(always)]
    fn init(_buffer: &'a [AtomicU64], _lane: LaneId, _clock: &'a C, _write_predicate: bool) -> Self {
        Self {
            _marker: PhantomData,
        }
    }

    #[inline(always)]
    fn emit_begin(&mut self, _event_slot: u32) {}

    #[inline(always)]
    fn emit_end(&mut self, _event_slot: u32) {}

    #[inline(always)]
    fn emit_instant(&mut self, _event_slot: u32) {}
}

/// Whether the `profiler` feature is compiled in.
pub const PROFILER_ENABLED: bool = cfg!(feature = "profiler");

/// Writer selected by the `profiler` feature.
#[cfg(feature = "profiler")]
pub type ActiveWriter<'a, C = GlobalTimer> = ProfileWriter<'a, C>;

/// Writer selected by the `profiler` feature.
#[cfg(not(feature = "profiler"))]
pub type ActiveWriter<'a, C = GlobalTimer> = NoopWriter<'a, C>;

/// Create the feature-selected writer for the calling lane.
#[inline(always)]
pub fn init<'a, C: Clock>(
    buffer: &'a [AtomicU64],
    lane: LaneId,
    clock: &'a C,
    write_predicate: bool,
) -> ActiveWriter<'a, C> {
    <ActiveWriter<'a, C> as EventWriter<'a, C>>::init(buffer, lane, clock, write_predicate)
}
