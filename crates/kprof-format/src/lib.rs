//! Wire format for kernel profiler trace buffers.
//!
//! A trace buffer is a sequence of 64-bit words. Word 0 is the [`Header`];
//! the rest holds one interleaved stream of [`EventRecord`]s per execution
//! group. This crate is shared by the device-side writer, the kernel header
//! generator and decoders so that all of them agree on one bit layout.

mod codec;
mod constants;
mod reader;

pub use codec::{
    EventRecord, EventType, Header, Tag, decode_tag, encode_event_tag, encode_tag,
};
pub use constants::*;
pub use reader::{GroupTimeline, TraceEvent, TraceView, words_from_bytes, words_to_bytes};

use thiserror::Error;

/// Errors raised while decoding a trace buffer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("trace buffer is empty (missing header word)")]
    EmptyBuffer,
    #[error("trace header reports zero groups")]
    ZeroGroups,
    #[error("reserved event type code {0}")]
    ReservedEventType(u32),
    #[error("group {group_index} out of range (group count {group_count})")]
    GroupOutOfRange { group_index: u32, group_count: u32 },
    #[error("record at word {position} belongs to group {found}, expected group {expected}")]
    GroupMismatch {
        position: usize,
        expected: u32,
        found: u32,
    },
    #[error("buffer length {0} is not a multiple of 8 bytes")]
    TruncatedWord(usize),
}

pub type Result<T> = std::result::Result<T, FormatError>;
