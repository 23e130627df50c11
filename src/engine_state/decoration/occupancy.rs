//! Ground cells of one chunk already claimed by a decoration.

use std::collections::HashSet;

use cgmath::Point3;

/// Half width of a tree's square footprint.
const FOOTPRINT_RADIUS: i32 = 1;

/// Claimed grid cells of a single decoration pass.
#[derive(Clone, Debug, Default)]
pub struct OccupiedGroundSet {
    cells: HashSet<Point3<i32>>,
}

impl OccupiedGroundSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, cell: Point3<i32>) -> bool {
        self.cells.contains(&cell)
    }

    /// Claims one cell. Returns `false` if it was already claimed.
    pub fn insert(&mut self, cell: Point3<i32>) -> bool {
        self.cells.insert(cell)
    }

    /// The 3x3 horizontal square centered on `anchor`, at the anchor's height.
    pub fn footprint(anchor: Point3<i32>) -> impl Iterator<Item = Point3<i32>> {
        (-FOOTPRINT_RADIUS..=FOOTPRINT_RADIUS).flat_map(move |x| {
            (-FOOTPRINT_RADIUS..=FOOTPRINT_RADIUS)
                .map(move |z| Point3::new(anchor.x + x, anchor.y, anchor.z + z))
        })
    }

    pub fn is_footprint_clear(&self, anchor: Point3<i32>) -> bool {
        Self::footprint(anchor).all(|cell| !self.contains(cell))
    }

    pub fn claim_footprint(&mut self, anchor: Point3<i32>) {
        self.cells.extend(Self::footprint(anchor));
    }
}
