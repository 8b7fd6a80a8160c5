//! Packing and unpacking of tags, event records and the header word.
//!
//! Words are built with explicit shifts and masks; nothing relies on the
//! in-memory layout of a struct.

use std::fmt;

use crate::FormatError;
use crate::constants::{
    EVENT_BEGIN, EVENT_END, EVENT_IDX_MASK, EVENT_IDX_SHIFT, EVENT_INSTANT, EVENT_TYPE_MASK,
    GROUP_IDX_SHIFT, HIGH_HALF_SHIFT, LOW_HALF_MASK, MAX_EVENT_SLOTS,
};

/// Kind of a recorded event.
///
/// Code 3 is reserved and never written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum EventType {
    Begin = EVENT_BEGIN,
    End = EVENT_END,
    Instant = EVENT_INSTANT,
}

impl EventType {
    /// Numeric code stored in the tag's low bits.
    #[inline]
    #[must_use]
    pub const fn code(self) -> u32 {
        self as u32
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Begin => "begin",
            Self::End => "end",
            Self::Instant => "instant",
        }
    }
}

impl TryFrom<u32> for EventType {
    type Error = FormatError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        match code {
            EVENT_BEGIN => Ok(Self::Begin),
            EVENT_END => Ok(Self::End),
            EVENT_INSTANT => Ok(Self::Instant),
            other => Err(FormatError::ReservedEventType(other)),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Pack a tag from its three fields.
///
/// `event_slot` must be below [`MAX_EVENT_SLOTS`] and `group_index` must fit
/// the remaining high bits; out-of-range values are truncated silently in
/// release builds.
#[inline]
#[must_use]
pub const fn encode_tag(group_index: u32, event_slot: u32, event_type: EventType) -> u32 {
    debug_assert!(event_slot < MAX_EVENT_SLOTS, "event slot out of range");
    (group_index << GROUP_IDX_SHIFT) | (event_slot << EVENT_IDX_SHIFT) | event_type.code()
}

/// Complete a group's tag base (slot 0, type 0) with a slot and event type.
#[inline]
#[must_use]
pub const fn encode_event_tag(tag_base: u32, event_slot: u32, event_type: EventType) -> u32 {
    debug_assert!(event_slot < MAX_EVENT_SLOTS, "event slot out of range");
    tag_base | (event_slot << EVENT_IDX_SHIFT) | event_type.code()
}

/// Unpack a tag into `(group_index, event_slot, event_type_code)`.
///
/// Exact inverse of [`encode_tag`] for in-range inputs.
#[inline]
#[must_use]
pub const fn decode_tag(tag: u32) -> (u32, u32, u32) {
    (
        tag >> GROUP_IDX_SHIFT,
        (tag >> EVENT_IDX_SHIFT) & EVENT_IDX_MASK,
        tag & EVENT_TYPE_MASK,
    )
}

/// A decoded tag with a validated event type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Tag {
    pub group_index: u32,
    pub event_slot: u32,
    pub event_type: EventType,
}

impl Tag {
    /// Parse a raw tag, rejecting the reserved event type.
    pub fn parse(raw: u32) -> Result<Self, FormatError> {
        let (group_index, event_slot, code) = decode_tag(raw);
        Ok(Self {
            group_index,
            event_slot,
            event_type: EventType::try_from(code)?,
        })
    }

    #[must_use]
    pub const fn encode(self) -> u32 {
        encode_tag(self.group_index, self.event_slot, self.event_type)
    }
}

/// One 64-bit event record: tag in the low half, timestamp in the high half.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EventRecord {
    pub tag: u32,
    pub delta_time: u32,
}

impl EventRecord {
    #[inline]
    #[must_use]
    pub const fn new(tag: u32, delta_time: u32) -> Self {
        Self { tag, delta_time }
    }

    #[inline]
    #[must_use]
    pub const fn pack(self) -> u64 {
        ((self.delta_time as u64) << HIGH_HALF_SHIFT) | self.tag as u64
    }

    #[inline]
    #[must_use]
    pub const fn unpack(raw: u64) -> Self {
        Self {
            tag: (raw & LOW_HALF_MASK) as u32,
            delta_time: (raw >> HIGH_HALF_SHIFT) as u32,
        }
    }
}

/// Buffer header (word 0).
///
/// Only the low half carries data. The high half is never written by the
/// device; `reserved` holds whatever the buffer contained there and has no
/// meaning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Header {
    pub group_count: u32,
    pub reserved: u32,
}

impl Header {
    /// Low-half bits the device stores for `group_count`.
    #[inline]
    #[must_use]
    pub const fn low_bits(group_count: u32) -> u64 {
        group_count as u64
    }

    #[must_use]
    pub const fn unpack(raw: u64) -> Self {
        Self {
            group_count: (raw & LOW_HALF_MASK) as u32,
            reserved: (raw >> HIGH_HALF_SHIFT) as u32,
        }
    }

    #[must_use]
    pub const fn pack(self) -> u64 {
        ((self.reserved as u64) << HIGH_HALF_SHIFT) | Self::low_bits(self.group_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MAX_GROUPS;

    #[test]
    fn test_encode_tag_layout() {
        assert_eq!(encode_tag(2, 5, EventType::Begin), 32788);
        assert_eq!(encode_tag(2, 5, EventType::End), 32789);
        assert_eq!(encode_tag(0, 0, EventType::Instant), 2);
        assert_eq!(encode_tag(1, 0, EventType::Begin), 1 << 14);
    }

    #[test]
    fn test_tag_round_trip() {
        let groups = [0, 1, 2, 1000, MAX_GROUPS - 1];
        let slots = [0, 1, 5, 2047, MAX_EVENT_SLOTS - 1];
        let types = [EventType::Begin, EventType::End, EventType::Instant];
        for &g in &groups {
            for &s in &slots {
                for &t in &types {
                    assert_eq!(decode_tag(encode_tag(g, s, t)), (g, s, t.code()));
                }
            }
        }
    }

    #[test]
    fn test_event_tag_from_base() {
        let base = encode_tag(7, 0, EventType::Begin);
        assert_eq!(
            encode_event_tag(base, 12, EventType::Instant),
            encode_tag(7, 12, EventType::Instant)
        );
    }

    #[test]
    fn test_reserved_event_type() {
        assert_eq!(EventType::try_from(3), Err(FormatError::ReservedEventType(3)));
        assert!(Tag::parse(0b11).is_err());
        let tag = Tag::parse(32789).unwrap();
        assert_eq!(tag.group_index, 2);
        assert_eq!(tag.event_slot, 5);
        assert_eq!(tag.event_type, EventType::End);
        assert_eq!(tag.encode(), 32789);
    }

    #[test]
    fn test_record_halves() {
        let record = EventRecord::new(32788, 100);
        assert_eq!(record.pack(), (100u64 << 32) | 32788);
        assert_eq!(EventRecord::unpack(record.pack()), record);
        assert_eq!(EventRecord::unpack(u64::MAX), EventRecord::new(u32::MAX, u32::MAX));
    }

    #[test]
    fn test_header_keeps_reserved_half() {
        let header = Header::unpack(0xDEAD_BEEF_0000_0004);
        assert_eq!(header.group_count, 4);
        assert_eq!(header.reserved, 0xDEAD_BEEF);
        assert_eq!(header.pack(), 0xDEAD_BEEF_0000_0004);
        assert_eq!(Header::low_bits(4), 4);
    }
}
