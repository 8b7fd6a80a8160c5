//! Bit layout constants shared by the device writer, the header generator and
//! the decoder.
//!
//! Tag layout (32 bits):
//!
//! ```text
//!  31            14 13          2 1    0
//! +----------------+-------------+------+
//! |  group_index   | event_slot  | type |
//! +----------------+-------------+------+
//! ```

/// Shift of the event slot within a tag.
pub const EVENT_IDX_SHIFT: u32 = 2;
/// Shift of the group index within a tag.
pub const GROUP_IDX_SHIFT: u32 = 14;

/// Mask for the event type after no shift.
pub const EVENT_TYPE_MASK: u32 = (1 << EVENT_IDX_SHIFT) - 1;
/// Mask for the event slot after shifting by [`EVENT_IDX_SHIFT`].
pub const EVENT_IDX_MASK: u32 = (1 << (GROUP_IDX_SHIFT - EVENT_IDX_SHIFT)) - 1;

/// Number of distinct event slots (instrumentation points).
pub const MAX_EVENT_SLOTS: u32 = EVENT_IDX_MASK + 1;
/// Number of groups addressable by the tag's group field.
pub const MAX_GROUPS: u32 = 1 << (u32::BITS - GROUP_IDX_SHIFT);

/// Event type code: region begin.
pub const EVENT_BEGIN: u32 = 0x0;
/// Event type code: region end.
pub const EVENT_END: u32 = 0x1;
/// Event type code: point event.
pub const EVENT_INSTANT: u32 = 0x2;

/// Words reserved for the header at the start of the buffer.
pub const HEADER_WORDS: usize = 1;

/// Mask selecting the low 32 bits of a word.
pub const LOW_HALF_MASK: u64 = 0xFFFF_FFFF;
/// Shift of the high 32-bit half of a word.
pub const HIGH_HALF_SHIFT: u32 = 32;

/// Number of 64-bit words needed for `group_count` groups with
/// `max_events_per_group` records each, or `None` on overflow.
#[must_use]
pub const fn buffer_words(group_count: u32, max_events_per_group: usize) -> Option<usize> {
    match (group_count as usize).checked_mul(max_events_per_group) {
        Some(events) => events.checked_add(HEADER_WORDS),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masks() {
        assert_eq!(EVENT_TYPE_MASK, 0x3);
        assert_eq!(EVENT_IDX_MASK, 0xFFF);
        assert_eq!(MAX_EVENT_SLOTS, 4096);
        assert_eq!(MAX_GROUPS, 1 << 18);
    }

    #[test]
    fn test_buffer_words() {
        assert_eq!(buffer_words(4, 2), Some(9));
        assert_eq!(buffer_words(1, 0), Some(1));
        assert_eq!(buffer_words(u32::MAX, usize::MAX), None);
    }
}
