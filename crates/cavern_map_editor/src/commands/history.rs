//! Bounded linear undo/redo over whole-map snapshots

use cavern_map_core::{GridPos, LevelActivators, OffgridTile, Tile, Tilemap};
use std::collections::BTreeMap;

/// Maximum number of snapshots kept
pub const MAX_HISTORY: usize = 50;

/// Deep copy of a map's grid and off-grid tiles, plus the metadata records
/// of its activators
#[derive(Debug, Clone, PartialEq)]
pub struct MapSnapshot {
    pub tiles: BTreeMap<GridPos, Tile>,
    pub offgrid: Vec<OffgridTile>,
    pub activators: LevelActivators,
}

impl MapSnapshot {
    pub fn of(tilemap: &Tilemap) -> Self {
        Self {
            tiles: tilemap.tiles.clone(),
            offgrid: tilemap.offgrid.clone(),
            activators: LevelActivators::default(),
        }
    }

    /// Attach the map's activator records
    pub fn with_activators(mut self, activators: Option<&LevelActivators>) -> Self {
        self.activators = activators.cloned().unwrap_or_default();
        self
    }

    /// Replace the map's tiles with this snapshot's; the caller puts back
    /// `activators`
    pub fn restore_into(&self, tilemap: &mut Tilemap) {
        tilemap.tiles = self.tiles.clone();
        tilemap.offgrid = self.offgrid.clone();
    }
}

/// Snapshot history with a current index.
///
/// Never empty: index 0 holds the state the map was loaded with.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<MapSnapshot>,
    index: usize,
    max: usize,
}

impl History {
    pub fn new(initial: MapSnapshot) -> Self {
        Self::with_capacity(initial, MAX_HISTORY)
    }

    pub fn with_capacity(initial: MapSnapshot, max: usize) -> Self {
        Self {
            entries: vec![initial],
            index: 0,
            max: max.max(1),
        }
    }

    /// Drop everything and seed with a freshly loaded state
    pub fn reset(&mut self, initial: MapSnapshot) {
        self.entries.clear();
        self.entries.push(initial);
        self.index = 0;
    }

    /// Append a snapshot, discarding any redo tail and the oldest entry
    /// once over capacity
    pub fn record(&mut self, snapshot: MapSnapshot) {
        self.entries.truncate(self.index + 1);
        self.entries.push(snapshot);
        if self.entries.len() > self.max {
            self.entries.remove(0);
        }
        self.index = self.entries.len() - 1;
    }

    /// Step back; `None` at the oldest entry
    pub fn undo(&mut self) -> Option<&MapSnapshot> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        self.entries.get(self.index)
    }

    /// Step forward; `None` at the newest entry
    pub fn redo(&mut self) -> Option<&MapSnapshot> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        self.entries.get(self.index)
    }

    pub fn current(&self) -> &MapSnapshot {
        &self.entries[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cavern_map_core::{ActivatorKind, ActivatorRecord};

    fn map_with(count: i32) -> Tilemap {
        let mut map = Tilemap::default();
        for x in 0..count {
            map.place(GridPos::new(x, 0), Tile::new("stone", 0, GridPos::default()));
        }
        map
    }

    #[test]
    fn test_undo_redo_restores_exact_state() {
        let mut map = map_with(0);
        let mut history = History::new(MapSnapshot::of(&map));

        map.place(GridPos::new(3, 5), Tile::new("stone", 0, GridPos::default()));
        map.add_offgrid(OffgridTile::new("mushroom", 1, [4.0, 9.0]));
        history.record(MapSnapshot::of(&map));
        let after = map.clone();

        history.undo().unwrap().restore_into(&mut map);
        assert!(map.is_empty());
        assert_eq!(history.index(), 0);
        assert!(history.undo().is_none());

        history.redo().unwrap().restore_into(&mut map);
        assert_eq!(map, after);
        assert!(history.redo().is_none());
    }

    #[test]
    fn test_record_truncates_redo_tail() {
        let mut history = History::new(MapSnapshot::of(&map_with(0)));
        history.record(MapSnapshot::of(&map_with(1)));
        history.record(MapSnapshot::of(&map_with(2)));
        history.undo();
        history.undo();
        history.record(MapSnapshot::of(&map_with(5)));
        assert_eq!(history.len(), 2);
        assert_eq!(history.index(), 1);
        assert!(!history.can_redo());
        assert_eq!(history.current().tiles.len(), 5);
    }

    #[test]
    fn test_bounded_to_max() {
        let mut history = History::new(MapSnapshot::of(&map_with(0)));
        for n in 1..=60 {
            history.record(MapSnapshot::of(&map_with(n)));
            assert!(history.len() <= MAX_HISTORY);
            assert_eq!(history.index(), history.len() - 1);
        }
        assert_eq!(history.len(), MAX_HISTORY);
        // Oldest surviving entry is the 11th recorded map
        while history.undo().is_some() {}
        assert_eq!(history.current().tiles.len(), 11);
    }

    #[test]
    fn test_snapshot_equals_only_unchanged_state() {
        let mut map = map_with(2);
        let snapshot = MapSnapshot::of(&map);
        assert_eq!(snapshot, MapSnapshot::of(&map));
        map.erase(GridPos::new(0, 0));
        assert_ne!(snapshot, MapSnapshot::of(&map));
    }

    #[test]
    fn test_snapshot_carries_activator_records() {
        let map = map_with(1);
        let mut level = LevelActivators::default();
        let kind = ActivatorKind::empty("visual_and_door").unwrap();
        level
            .levers
            .insert(4, ActivatorRecord::new(4, GridPos::new(0, 0), kind));
        let bare = MapSnapshot::of(&map);
        let with = MapSnapshot::of(&map).with_activators(Some(&level));
        assert_ne!(bare, with);
        assert_eq!(with.activators, level);
        assert_eq!(MapSnapshot::of(&map).with_activators(None), bare);
    }

    #[test]
    fn test_reset_seeds_index_zero() {
        let mut history = History::new(MapSnapshot::of(&map_with(0)));
        history.record(MapSnapshot::of(&map_with(1)));
        history.reset(MapSnapshot::of(&map_with(3)));
        assert_eq!(history.len(), 1);
        assert_eq!(history.index(), 0);
        assert!(!history.can_undo());
    }
}
