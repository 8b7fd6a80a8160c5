//! Buffer layout: host allocation, header write, per-group addressing.
//!
//! ```text
//! word 0            header {group_count: low32, unspecified: high32}
//! word 1 + g        first record of group g
//! word 1 + g + k*G  k-th record of group g (G = group_count)
//! ```
//!
//! Streams of different groups never share a word, so groups write without
//! synchronizing with each other.

use std::sync::atomic::{AtomicU64, Ordering};

use kprof_format::{EventType, HEADER_WORDS, Header, LOW_HALF_MASK, MAX_GROUPS, buffer_words, encode_tag};
use thiserror::Error;
use tracing::debug;

use crate::geometry::{Dim3, LaneId, LaunchGeometry};

/// Buffer sizing error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("launch has zero groups")]
    ZeroGroups,

    #[error("group count {group_count} exceeds the tag's addressable range ({max})")]
    TooManyGroups { group_count: u32, max: u32 },

    #[error("grid {0:?} has more groups than fit in u32")]
    GridOverflow(Dim3),

    #[error("buffer size overflows: {group_count} groups x {max_events_per_group} events")]
    SizeOverflow {
        group_count: u32,
        max_events_per_group: usize,
    },
}

/// Host-allocated trace buffer.
///
/// Devices see it as a slice of atomic words; every store is a single aligned
/// word store.
#[derive(Debug)]
pub struct TraceBuffer {
    words: Box<[AtomicU64]>,
    group_count: u32,
    max_events_per_group: usize,
}

impl TraceBuffer {
    /// Allocate a zeroed buffer of `1 + group_count * max_events_per_group` words.
    ///
    /// # Errors
    ///
    /// Returns an error if `group_count` is zero, does not fit the tag's group
    /// field, or the size overflows.
    pub fn new(group_count: u32, max_events_per_group: usize) -> Result<Self, LayoutError> {
        if group_count == 0 {
            return Err(LayoutError::ZeroGroups);
        }
        if group_count > MAX_GROUPS {
            return Err(LayoutError::TooManyGroups {
                group_count,
                max: MAX_GROUPS,
            });
        }
        let len = buffer_words(group_count, max_events_per_group).ok_or(
            LayoutError::SizeOverflow {
                group_count,
                max_events_per_group,
            },
        )?;

        let words = (0..len).map(|_| AtomicU64::new(0)).collect();
        debug!(
            groups = group_count,
            events_per_group = max_events_per_group,
            words = len,
            "allocated trace buffer"
        );
        Ok(Self {
            words,
            group_count,
            max_events_per_group,
        })
    }

    /// Allocate a buffer sized for every group of `geometry`.
    ///
    /// # Errors
    ///
    /// Same as [`TraceBuffer::new`], plus [`LayoutError::GridOverflow`] if the
    /// grid's group count does not fit in `u32`.
    pub fn for_geometry(
        geometry: &LaunchGeometry,
        max_events_per_group: usize,
    ) -> Result<Self, LayoutError> {
        let group_count = geometry
            .checked_group_count()
            .ok_or(LayoutError::GridOverflow(geometry.grid))?;
        Self::new(group_count, max_events_per_group)
    }

    /// Wrap a buffer snapshot, e.g. one loaded from disk.
    ///
    /// Group count comes from the header; trailing words that do not fill a
    /// whole row of records are kept but not counted in
    /// [`max_events_per_group`](Self::max_events_per_group).
    ///
    /// # Errors
    ///
    /// Returns an error if the slice is empty or the header reports zero
    /// groups or more groups than a tag can address.
    pub fn from_words(words: &[u64]) -> Result<Self, LayoutError> {
        let header = words.first().map_or(0, |&raw| Header::unpack(raw).group_count);
        if header == 0 {
            return Err(LayoutError::ZeroGroups);
        }
        if header > MAX_GROUPS {
            return Err(LayoutError::TooManyGroups {
                group_count: header,
                max: MAX_GROUPS,
            });
        }
        Ok(Self {
            words: words.iter().map(|&w| AtomicU64::new(w)).collect(),
            group_count: header,
            max_events_per_group: (words.len() - HEADER_WORDS) / header as usize,
        })
    }

    /// Device-visible words.
    #[must_use]
    pub fn words(&self) -> &[AtomicU64] {
        &self.words
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    #[must_use]
    pub const fn group_count(&self) -> u32 {
        self.group_count
    }

    #[must_use]
    pub const fn max_events_per_group(&self) -> usize {
        self.max_events_per_group
    }

    /// Overwrite every word with `value`.
    pub fn fill(&mut self, value: u64) {
        for word in self.words.iter_mut() {
            *word.get_mut() = value;
        }
    }

    /// Copy the buffer out for decoding.
    ///
    /// Must not race with a running launch.
    #[must_use]
    pub fn snapshot(&self) -> Vec<u64> {
        self.words.iter().map(|w| w.load(Ordering::Relaxed)).collect()
    }
}

/// Store `group_count` into the header's low half.
///
/// The high half is left as it was. This takes two read-modify-writes
/// (`fetch_and` then `fetch_or`) instead of one word store, so a concurrent
/// reader can see a zero low half between them. Every group's first lane calls
/// this with the same value, and since each caller's clear precedes its own
/// set, the final low half is `group_count` regardless of interleaving. Read
/// the header only after the launch has finished.
#[inline]
pub fn write_header(buffer: &[AtomicU64], group_count: u32) {
    if let Some(word) = buffer.first() {
        word.fetch_and(!LOW_HALF_MASK, Ordering::Relaxed);
        word.fetch_or(Header::low_bits(group_count), Ordering::Relaxed);
    }
}

/// Write position and tag base of one group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GroupLayout {
    /// Word index of the group's first record.
    pub cursor: usize,
    /// Words between consecutive records of the group.
    pub stride: usize,
    /// Tag with the group index set and slot/type zero.
    pub tag_base: u32,
}

impl GroupLayout {
    #[must_use]
    pub const fn for_lane(lane: LaneId) -> Self {
        Self {
            cursor: HEADER_WORDS + lane.group_index as usize,
            stride: lane.group_count as usize,
            tag_base: encode_tag(lane.group_index, 0, EventType::Begin),
        }
    }

    /// Word index of the group's `k`-th record.
    #[must_use]
    pub const fn slot(&self, k: usize) -> usize {
        self.cursor + k * self.stride
    }
}
