//! Host launch runner.
//!
//! Runs a kernel closure over a launch geometry on the CPU: one rayon task per
//! group, lanes of a group executed in order inside that task. Groups get no
//! ordering guarantee relative to each other, like on a device.

use std::hint::black_box;

use rayon::prelude::*;
use tracing::{debug, info_span};

use kprof_device::{ActiveWriter, Clock, EventWriter, LaneId, LaunchGeometry, TraceBuffer};
use kprof_format::MAX_EVENT_SLOTS;

use crate::{Error, Result};

/// Launch `kernel` for every lane of `geometry` with the feature-selected
/// writer.
///
/// Lane `representative_lane` of each group is the one allowed to write.
pub fn launch<'a, C, K>(
    geometry: &LaunchGeometry,
    buffer: &'a TraceBuffer,
    clock: &'a C,
    representative_lane: u32,
    kernel: K,
) where
    C: Clock,
    K: Fn(&mut ActiveWriter<'a, C>, LaneId) + Sync,
{
    launch_with::<ActiveWriter<'a, C>, C, K>(geometry, buffer, clock, representative_lane, kernel);
}

/// Launch `kernel` with an explicit writer type.
pub fn launch_with<'a, W, C, K>(
    geometry: &LaunchGeometry,
    buffer: &'a TraceBuffer,
    clock: &'a C,
    representative_lane: u32,
    kernel: K,
) where
    W: EventWriter<'a, C>,
    C: Clock,
    K: Fn(&mut W, LaneId) + Sync,
{
    let _span = info_span!(
        "launch",
        groups = geometry.group_count(),
        lanes = geometry.lanes_per_group()
    )
    .entered();

    let words = buffer.words();
    let groups: Vec<_> = geometry.grid.indices().collect();
    groups.par_iter().for_each(|&group| {
        for thread in geometry.block.indices() {
            let lane = geometry.lane(group, thread);
            let mut writer = W::init(words, lane, clock, lane.lane_index == representative_lane);
            kernel(&mut writer, lane);
        }
    });
}

/// Synthetic workload for [`simulate`].
#[derive(Clone, Debug)]
pub struct SimulateConfig {
    pub geometry: LaunchGeometry,
    /// Records reserved per group.
    pub max_events_per_group: usize,
    /// Begin/end regions emitted per group, one slot each.
    pub regions: u32,
    /// Busy-loop iterations inside each region.
    pub work: u32,
    /// Emit one instant event after the last region.
    pub instant: bool,
    pub representative_lane: u32,
}

impl Default for SimulateConfig {
    fn default() -> Self {
        Self {
            geometry: LaunchGeometry::linear(4, 32),
            max_events_per_group: 16,
            regions: 4,
            work: 1_000,
            instant: false,
            representative_lane: 0,
        }
    }
}

impl SimulateConfig {
    pub const fn with_geometry(mut self, geometry: LaunchGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub const fn with_regions(mut self, regions: u32) -> Self {
        self.regions = regions;
        self
    }

    pub const fn with_max_events_per_group(mut self, max_events: usize) -> Self {
        self.max_events_per_group = max_events;
        self
    }

    pub const fn with_instant(mut self, instant: bool) -> Self {
        self.instant = instant;
        self
    }

    pub const fn with_work(mut self, work: u32) -> Self {
        self.work = work;
        self
    }

    /// Distinct event slots the workload uses: one per region, plus one for
    /// the instant.
    #[must_use]
    pub fn slots_used(&self) -> u64 {
        u64::from(self.regions) + u64::from(self.instant)
    }

    /// Records each group writes.
    #[must_use]
    pub const fn events_per_group(&self) -> usize {
        self.regions as usize * 2 + self.instant as usize
    }
}

/// Run the synthetic workload and return the filled buffer.
///
/// # Errors
///
/// Fails if the geometry is empty or overflows, the representative lane does
/// not exist, the workload needs more event slots than a tag can address, or
/// the buffer cannot hold the workload.
pub fn simulate<C: Clock>(config: &SimulateConfig, clock: &C) -> Result<TraceBuffer> {
    let lanes = config
        .geometry
        .checked_lanes_per_group()
        .ok_or_else(|| Error::InvalidGeometry("lanes per group overflow u32".to_string()))?;
    if lanes == 0 {
        return Err(Error::InvalidGeometry("group has no lanes".to_string()));
    }
    if config.representative_lane >= lanes {
        return Err(Error::InvalidGeometry(format!(
            "representative lane {} outside group of {lanes} lanes",
            config.representative_lane
        )));
    }
    let slots = config.slots_used();
    if slots > u64::from(MAX_EVENT_SLOTS) {
        return Err(Error::TooManySlots {
            needed: slots,
            max: MAX_EVENT_SLOTS,
        });
    }
    let needed = config.events_per_group();
    if needed > config.max_events_per_group {
        return Err(Error::InsufficientCapacity {
            needed,
            available: config.max_events_per_group,
        });
    }

    let buffer = TraceBuffer::for_geometry(&config.geometry, config.max_events_per_group)?;
    launch(
        &config.geometry,
        &buffer,
        clock,
        config.representative_lane,
        |writer, _lane| {
            for slot in 0..config.regions {
                writer.emit_begin(slot);
                let mut acc = 0u64;
                for i in 0..config.work {
                    acc = black_box(acc.wrapping_add(u64::from(i)));
                }
                black_box(acc);
                writer.emit_end(slot);
            }
            if config.instant {
                writer.emit_instant(config.regions);
            }
        },
    );
    debug!(
        groups = config.geometry.group_count(),
        events_per_group = needed,
        "simulation finished"
    );
    Ok(buffer)
}
