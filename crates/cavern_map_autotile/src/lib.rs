//! Four-neighbor autotiling for cavern maps
//!
//! A grid tile's sprite variant is derived from which of its orthogonal
//! neighbors hold a tile of the same family:
//! - `NeighborMask` - set of present neighbors
//! - `variant_for` - the closed lookup table (9 shapes)
//! - `resolve_variant` - convenience wrapper over a neighbor predicate
//!
//! Grid y grows downward, so `(0, 1)` is the cell below.

/// Orthogonal neighbor offsets in canonical (sorted) order
pub const NEIGHBOR_OFFSETS: [(i32, i32); 4] = [(-1, 0), (0, -1), (0, 1), (1, 0)];

/// Set of orthogonal neighbors that share the tile's family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NeighborMask(u8);

impl NeighborMask {
    /// Neighbor at `(-1, 0)`
    pub const LEFT: NeighborMask = NeighborMask(0b0001);
    /// Neighbor at `(0, -1)`
    pub const UP: NeighborMask = NeighborMask(0b0010);
    /// Neighbor at `(0, 1)`
    pub const DOWN: NeighborMask = NeighborMask(0b0100);
    /// Neighbor at `(1, 0)`
    pub const RIGHT: NeighborMask = NeighborMask(0b1000);

    /// Empty mask
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Union of two masks
    pub const fn with(self, other: NeighborMask) -> Self {
        Self(self.0 | other.0)
    }

    /// Mask bit for an offset, `None` for anything that is not an orthogonal neighbor
    pub fn bit(offset: (i32, i32)) -> Option<NeighborMask> {
        match offset {
            (-1, 0) => Some(Self::LEFT),
            (0, -1) => Some(Self::UP),
            (0, 1) => Some(Self::DOWN),
            (1, 0) => Some(Self::RIGHT),
            _ => None,
        }
    }

    /// Build a mask from neighbor offsets; non-orthogonal offsets are ignored
    pub fn from_offsets(offsets: impl IntoIterator<Item = (i32, i32)>) -> Self {
        offsets
            .into_iter()
            .filter_map(Self::bit)
            .fold(Self::empty(), Self::with)
    }

    /// Check whether the neighbor at `offset` is present
    pub fn contains(&self, offset: (i32, i32)) -> bool {
        Self::bit(offset).is_some_and(|bit| self.0 & bit.0 != 0)
    }

    /// Present offsets in canonical order
    pub fn offsets(&self) -> Vec<(i32, i32)> {
        NEIGHBOR_OFFSETS
            .iter()
            .copied()
            .filter(|offset| self.contains(*offset))
            .collect()
    }
}

/// Look up the variant for a neighbor set.
///
/// Returns `None` for shapes outside the table (isolated tiles, straight
/// runs), in which case the tile keeps its current variant.
pub fn variant_for(mask: NeighborMask) -> Option<u32> {
    const L: u8 = NeighborMask::LEFT.0;
    const U: u8 = NeighborMask::UP.0;
    const D: u8 = NeighborMask::DOWN.0;
    const R: u8 = NeighborMask::RIGHT.0;

    match mask.0 {
        m if m == D | R => Some(0),
        m if m == L | D | R => Some(1),
        m if m == L | D => Some(2),
        m if m == L | U | D => Some(3),
        m if m == L | U => Some(4),
        m if m == L | U | R => Some(5),
        m if m == U | R => Some(6),
        m if m == U | D | R => Some(7),
        m if m == L | U | D | R => Some(8),
        _ => None,
    }
}

/// Resolve the variant of the tile at `(x, y)` given a predicate telling
/// whether a cell holds a tile of the same family
pub fn resolve_variant(x: i32, y: i32, same_family: impl Fn(i32, i32) -> bool) -> Option<u32> {
    let mask = NeighborMask::from_offsets(
        NEIGHBOR_OFFSETS
            .iter()
            .copied()
            .filter(|(dx, dy)| same_family(x + dx, y + dy)),
    );
    variant_for(mask)
}
