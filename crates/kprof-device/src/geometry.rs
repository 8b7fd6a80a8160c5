//! Launch geometry and lane identity.
//!
//! Group and lane indices are linearized row-major with `x` fastest:
//! `(z * dim.y + y) * dim.x + x`.

/// Three-dimensional extent or index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Dim3 {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl Dim3 {
    #[must_use]
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// One-dimensional extent `(x, 1, 1)`.
    #[must_use]
    pub const fn linear(x: u32) -> Self {
        Self::new(x, 1, 1)
    }

    /// Number of points in this extent.
    ///
    /// The product must fit in `u32`; use [`checked_volume`](Self::checked_volume)
    /// for extents that have not been validated.
    #[must_use]
    pub const fn volume(self) -> u32 {
        self.x * self.y * self.z
    }

    /// Number of points in this extent, or `None` if it overflows `u32`.
    #[must_use]
    pub const fn checked_volume(self) -> Option<u32> {
        match self.x.checked_mul(self.y) {
            Some(xy) => xy.checked_mul(self.z),
            None => None,
        }
    }

    /// Linear index of `idx` inside this extent.
    ///
    /// Cannot overflow when `idx` lies inside an extent whose
    /// [`checked_volume`](Self::checked_volume) is `Some`.
    #[must_use]
    pub const fn linearize(self, idx: Self) -> u32 {
        (idx.z * self.y + idx.y) * self.x + idx.x
    }

    /// Every index inside this extent, in linear order.
    pub fn indices(self) -> impl Iterator<Item = Self> {
        (0..self.z).flat_map(move |z| {
            (0..self.y).flat_map(move |y| (0..self.x).map(move |x| Self::new(x, y, z)))
        })
    }
}

impl Default for Dim3 {
    fn default() -> Self {
        Self::new(1, 1, 1)
    }
}

/// Grid of groups and the lanes within each group.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LaunchGeometry {
    pub grid: Dim3,
    pub block: Dim3,
}

impl LaunchGeometry {
    #[must_use]
    pub const fn new(grid: Dim3, block: Dim3) -> Self {
        Self { grid, block }
    }

    /// One-dimensional launch of `groups` groups with `lanes` lanes each.
    #[must_use]
    pub const fn linear(groups: u32, lanes: u32) -> Self {
        Self::new(Dim3::linear(groups), Dim3::linear(lanes))
    }

    /// Group count, or `None` if the grid overflows `u32`.
    #[must_use]
    pub const fn checked_group_count(&self) -> Option<u32> {
        self.grid.checked_volume()
    }

    /// Lanes per group, or `None` if the block overflows `u32`.
    #[must_use]
    pub const fn checked_lanes_per_group(&self) -> Option<u32> {
        self.block.checked_volume()
    }

    #[must_use]
    pub const fn group_count(&self) -> u32 {
        self.grid.volume()
    }

    #[must_use]
    pub const fn lanes_per_group(&self) -> u32 {
        self.block.volume()
    }

    /// Identity of the lane at `thread` inside the group at `group`.
    #[must_use]
    pub const fn lane(&self, group: Dim3, thread: Dim3) -> LaneId {
        LaneId {
            group_index: self.grid.linearize(group),
            group_count: self.group_count(),
            lane_index: self.block.linearize(thread),
        }
    }
}

/// Identity of the calling lane within a launch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LaneId {
    /// Linear index of the lane's group.
    pub group_index: u32,
    /// Total groups in the launch.
    pub group_count: u32,
    /// Linear index of the lane within its group.
    pub lane_index: u32,
}

impl LaneId {
    #[must_use]
    pub const fn new(group_index: u32, group_count: u32, lane_index: u32) -> Self {
        Self {
            group_index,
            group_count,
            lane_index,
        }
    }

    /// Whether this is lane 0 of its group.
    ///
    /// Lane 0 writes the buffer header and is the conventional representative
    /// for event writes.
    #[must_use]
    pub const fn is_first_lane(&self) -> bool {
        self.lane_index == 0
    }
}
