//! Per-slot region statistics over decoded timelines.
//!
//! Durations use wrapping subtraction, so a region spanning one 32-bit
//! timestamp wraparound is still measured correctly.

use std::collections::BTreeMap;

use kprof_format::{EventType, GroupTimeline};

/// Durations of all begin/end pairs for one event slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegionStats {
    pub event_slot: u32,
    pub count: u64,
    pub total_ns: u64,
    pub min_ns: u32,
    pub max_ns: u32,
}

impl RegionStats {
    const fn new(event_slot: u32) -> Self {
        Self {
            event_slot,
            count: 0,
            total_ns: 0,
            min_ns: u32::MAX,
            max_ns: 0,
        }
    }

    fn record(&mut self, duration: u32) {
        self.count += 1;
        self.total_ns += u64::from(duration);
        self.min_ns = self.min_ns.min(duration);
        self.max_ns = self.max_ns.max(duration);
    }

    #[must_use]
    pub const fn mean_ns(&self) -> u64 {
        if self.count == 0 { 0 } else { self.total_ns / self.count }
    }
}

/// Whole-trace summary.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TraceSummary {
    pub groups: usize,
    pub events: usize,
    pub instants: usize,
    /// Begin without end, or end without begin.
    pub unmatched: usize,
    /// Sorted by event slot.
    pub regions: Vec<RegionStats>,
}

impl TraceSummary {
    #[must_use]
    pub fn from_timelines(timelines: &[GroupTimeline]) -> Self {
        let mut summary = Self {
            groups: timelines.len(),
            ..Self::default()
        };
        let mut regions: BTreeMap<u32, RegionStats> = BTreeMap::new();

        for timeline in timelines {
            let mut open: BTreeMap<u32, u32> = BTreeMap::new();
            for event in &timeline.events {
                summary.events += 1;
                match event.event_type {
                    EventType::Begin => {
                        if open.insert(event.event_slot, event.timestamp).is_some() {
                            summary.unmatched += 1;
                        }
                    }
                    EventType::End => match open.remove(&event.event_slot) {
                        Some(begin) => regions
                            .entry(event.event_slot)
                            .or_insert_with(|| RegionStats::new(event.event_slot))
                            .record(event.timestamp.wrapping_sub(begin)),
                        None => summary.unmatched += 1,
                    },
                    EventType::Instant => summary.instants += 1,
                }
            }
            summary.unmatched += open.len();
        }

        summary.regions = regions.into_values().collect();
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kprof_format::TraceEvent;

    fn ev(event_slot: u32, event_type: EventType, timestamp: u32) -> TraceEvent {
        TraceEvent {
            event_slot,
            event_type,
            timestamp,
        }
    }

    #[test]
    fn test_region_durations() {
        let timelines = vec![
            GroupTimeline {
                group_index: 0,
                events: vec![ev(5, EventType::Begin, 100), ev(5, EventType::End, 140)],
            },
            GroupTimeline {
                group_index: 1,
                events: vec![
                    ev(5, EventType::Begin, 200),
                    ev(5, EventType::End, 260),
                    ev(9, EventType::Instant, 270),
                ],
            },
        ];
        let summary = TraceSummary::from_timelines(&timelines);
        assert_eq!(summary.groups, 2);
        assert_eq!(summary.events, 5);
        assert_eq!(summary.instants, 1);
        assert_eq!(summary.unmatched, 0);
        assert_eq!(summary.regions.len(), 1);
        let stats = summary.regions[0];
        assert_eq!(stats.event_slot, 5);
        assert_eq!(stats.count, 2);
        assert_eq!(stats.min_ns, 40);
        assert_eq!(stats.max_ns, 60);
        assert_eq!(stats.mean_ns(), 50);
    }

    #[test]
    fn test_wraparound_duration() {
        let timelines = vec![GroupTimeline {
            group_index: 0,
            events: vec![ev(1, EventType::Begin, u32::MAX - 9), ev(1, EventType::End, 10)],
        }];
        let summary = TraceSummary::from_timelines(&timelines);
        assert_eq!(summary.regions[0].max_ns, 20);
    }

    #[test]
    fn test_unmatched_events() {
        let timelines = vec![GroupTimeline {
            group_index: 0,
            events: vec![ev(1, EventType::End, 5), ev(2, EventType::Begin, 6)],
        }];
        let summary = TraceSummary::from_timelines(&timelines);
        assert_eq!(summary.unmatched, 2);
        assert!(summary.regions.is_empty());
    }
}
