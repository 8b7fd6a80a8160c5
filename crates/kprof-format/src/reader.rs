//! Consumer side of the buffer format.
//!
//! A [`TraceView`] splits a raw buffer snapshot into per-group streams using
//! the stride rule: record `k` of group `g` lives at word
//! `HEADER_WORDS + g + k * group_count`.
//!
//! A zero word is treated as never written and ends that group's stream. An
//! all-zero record (group 0, slot 0, begin, timestamp 0) is therefore
//! indistinguishable from an empty slot.
//!
//! Instant events do not advance the writer's cursor, so a begin or end
//! emitted after an instant overwrites it; the view reports what is stored.

use crate::FormatError;
use crate::codec::{EventRecord, EventType, Header, Tag};
use crate::constants::HEADER_WORDS;

/// One decoded event of a group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraceEvent {
    pub event_slot: u32,
    pub event_type: EventType,
    pub timestamp: u32,
}

/// All decoded events of one group, in emission order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupTimeline {
    pub group_index: u32,
    pub events: Vec<TraceEvent>,
}

/// Borrowed view over a buffer snapshot.
#[derive(Clone, Copy, Debug)]
pub struct TraceView<'a> {
    words: &'a [u64],
    header: Header,
}

impl<'a> TraceView<'a> {
    /// Parse the header and validate that the buffer has at least one group.
    pub fn parse(words: &'a [u64]) -> Result<Self, FormatError> {
        let raw = *words.first().ok_or(FormatError::EmptyBuffer)?;
        let header = Header::unpack(raw);
        if header.group_count == 0 {
            return Err(FormatError::ZeroGroups);
        }
        Ok(Self { words, header })
    }

    #[must_use]
    pub const fn header(&self) -> Header {
        self.header
    }

    #[must_use]
    pub const fn group_count(&self) -> u32 {
        self.header.group_count
    }

    /// Distance in words between consecutive records of one group.
    #[must_use]
    pub const fn stride(&self) -> usize {
        self.header.group_count as usize
    }

    #[must_use]
    pub const fn words(&self) -> &'a [u64] {
        self.words
    }

    /// Raw words belonging to `group_index`, in slot order, including unwritten
    /// trailing slots.
    pub fn raw_stream(&self, group_index: u32) -> Result<impl Iterator<Item = u64> + 'a, FormatError> {
        self.check_group(group_index)?;
        let start = HEADER_WORDS + group_index as usize;
        let words = self.words.get(start..).unwrap_or_default();
        Ok(words.iter().step_by(self.stride()).copied())
    }

    /// Decode the events of one group, stopping at the first unwritten slot.
    pub fn events(&self, group_index: u32) -> Result<Vec<TraceEvent>, FormatError> {
        let mut events = Vec::new();
        for (k, raw) in self.raw_stream(group_index)?.enumerate() {
            if raw == 0 {
                break;
            }
            let record = EventRecord::unpack(raw);
            let tag = Tag::parse(record.tag)?;
            if tag.group_index != group_index {
                return Err(FormatError::GroupMismatch {
                    position: HEADER_WORDS + group_index as usize + k * self.stride(),
                    expected: group_index,
                    found: tag.group_index,
                });
            }
            events.push(TraceEvent {
                event_slot: tag.event_slot,
                event_type: tag.event_type,
                timestamp: record.delta_time,
            });
        }
        Ok(events)
    }

    /// Decode every group's timeline.
    pub fn timelines(&self) -> Result<Vec<GroupTimeline>, FormatError> {
        (0..self.group_count())
            .map(|group_index| {
                Ok(GroupTimeline {
                    group_index,
                    events: self.events(group_index)?,
                })
            })
            .collect()
    }

    const fn check_group(&self, group_index: u32) -> Result<(), FormatError> {
        if group_index >= self.header.group_count {
            return Err(FormatError::GroupOutOfRange {
                group_index,
                group_count: self.header.group_count,
            });
        }
        Ok(())
    }
}

/// Serialize words as little-endian bytes.
#[must_use]
pub fn words_to_bytes(words: &[u64]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
}

/// Parse little-endian bytes into words.
pub fn words_from_bytes(bytes: &[u8]) -> Result<Vec<u64>, FormatError> {
    let chunks = bytes.chunks_exact(8);
    if !chunks.remainder().is_empty() {
        return Err(FormatError::TruncatedWord(bytes.len()));
    }
    Ok(chunks
        .map(|chunk| {
            let mut word = [0u8; 8];
            word.copy_from_slice(chunk);
            u64::from_le_bytes(word)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_tag;

    fn record(group: u32, slot: u32, ty: EventType, ts: u32) -> u64 {
        EventRecord::new(encode_tag(group, slot, ty), ts).pack()
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(TraceView::parse(&[]).unwrap_err(), FormatError::EmptyBuffer);
        assert_eq!(TraceView::parse(&[0, 0]).unwrap_err(), FormatError::ZeroGroups);
    }

    #[test]
    fn test_stride_split() {
        // Two groups, two records each.
        let words = [
            2,
            record(0, 1, EventType::Begin, 10),
            record(1, 1, EventType::Begin, 11),
            record(0, 1, EventType::End, 20),
            record(1, 1, EventType::End, 21),
        ];
        let view = TraceView::parse(&words).unwrap();
        assert_eq!(view.stride(), 2);

        let g1 = view.events(1).unwrap();
        assert_eq!(
            g1,
            vec![
                TraceEvent { event_slot: 1, event_type: EventType::Begin, timestamp: 11 },
                TraceEvent { event_slot: 1, event_type: EventType::End, timestamp: 21 },
            ]
        );
        assert_eq!(view.timelines().unwrap().len(), 2);
    }

    #[test]
    fn test_stops_at_unwritten_slot() {
        let words = [1, record(0, 3, EventType::Instant, 5), 0, record(0, 3, EventType::End, 9)];
        let view = TraceView::parse(&words).unwrap();
        assert_eq!(view.events(0).unwrap().len(), 1);
        assert_eq!(view.raw_stream(0).unwrap().count(), 3);
    }

    #[test]
    fn test_group_mismatch() {
        let words = [2, record(1, 0, EventType::Begin, 1), 0];
        let view = TraceView::parse(&words).unwrap();
        assert_eq!(
            view.events(0).unwrap_err(),
            FormatError::GroupMismatch { position: 1, expected: 0, found: 1 }
        );
    }

    #[test]
    fn test_group_out_of_range() {
        let words = [2, 0, 0];
        let view = TraceView::parse(&words).unwrap();
        assert!(matches!(view.events(2), Err(FormatError::GroupOutOfRange { .. })));
    }

    #[test]
    fn test_reserved_header_half_is_ignored() {
        let words = [0xFFFF_FFFF_0000_0001, record(0, 0, EventType::End, 3)];
        let view = TraceView::parse(&words).unwrap();
        assert_eq!(view.group_count(), 1);
        assert_eq!(view.header().reserved, 0xFFFF_FFFF);
        assert_eq!(view.events(0).unwrap().len(), 1);
    }

    #[test]
    fn test_bytes() {
        let words = vec![4, u64::MAX, 0x0102_0304_0506_0708];
        let bytes = words_to_bytes(&words);
        assert_eq!(bytes.len(), 24);
        assert_eq!(bytes[16], 0x08);
        assert_eq!(words_from_bytes(&bytes).unwrap(), words);
        assert_eq!(words_from_bytes(&bytes[..5]), Err(FormatError::TruncatedWord(5)));
    }
}
