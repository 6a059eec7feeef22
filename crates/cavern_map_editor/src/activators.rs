//! Activator index: placed activators grouped by category with their metadata
//!
//! Derived state, rebuilt from the tilemap and the metadata store after every
//! load, history restore and activator place/erase.

use cavern_map_core::{
    ActivatorCategory, ActivatorRecord, ActivatorStore, FileId, GridPos, IdTarget, Tilemap,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::catalog::AssetCatalog;

/// One placed activator or transition
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedActivator {
    pub tile_type: String,
    pub pos: GridPos,
    /// Missing only on transitions
    pub id: Option<u32>,
    /// Merged metadata record (levers, buttons, teleporters)
    pub record: Option<ActivatorRecord>,
    /// Transition target map
    pub destination: Option<FileId>,
    pub dest_pos: Option<GridPos>,
}

#[derive(Debug, Clone, Default)]
pub struct ActivatorIndex {
    /// Entries per category, keyed by tile key (`"x;y"`)
    entries: HashMap<ActivatorCategory, BTreeMap<String, IndexedActivator>>,
    /// Live ids per category
    ids: HashMap<ActivatorCategory, BTreeSet<u32>>,
    /// Tile types in use per category
    types: HashMap<ActivatorCategory, BTreeSet<String>>,
    /// Door id to door position
    doors: BTreeMap<u32, GridPos>,
}

impl ActivatorIndex {
    /// Build the index of one map
    pub fn build(
        tilemap: &Tilemap,
        store: &ActivatorStore,
        file_id: FileId,
        catalog: &AssetCatalog,
    ) -> Self {
        let mut index = Self::default();
        index.rebuild(tilemap, store, file_id, catalog);
        index
    }

    /// Rescan every grid tile and merge metadata from the store
    pub fn rebuild(
        &mut self,
        tilemap: &Tilemap,
        store: &ActivatorStore,
        file_id: FileId,
        catalog: &AssetCatalog,
    ) {
        self.entries.clear();
        self.ids.clear();
        self.types.clear();
        self.doors.clear();

        for (pos, tile) in &tilemap.tiles {
            if catalog.is_door(&tile.kind) {
                if let Some(id) = tile.id {
                    self.doors.insert(id, *pos);
                }
                continue;
            }
            let Some(category) = ActivatorCategory::of_tile_type(&tile.kind) else {
                continue;
            };

            let record = tile
                .id
                .and_then(|id| store.get(file_id, category, id))
                .cloned();
            if let Some(id) = tile.id {
                self.ids.entry(category).or_default().insert(id);
            }
            self.types
                .entry(category)
                .or_default()
                .insert(tile.kind.clone());
            self.entries.entry(category).or_default().insert(
                pos.key(),
                IndexedActivator {
                    tile_type: tile.kind.clone(),
                    pos: *pos,
                    id: tile.id,
                    record,
                    destination: tile.destination,
                    dest_pos: tile.dest_pos,
                },
            );
        }
    }

    /// Entries of a category, in tile key order
    pub fn entries(&self, category: ActivatorCategory) -> impl Iterator<Item = &IndexedActivator> {
        self.entries
            .get(&category)
            .into_iter()
            .flat_map(|entries| entries.values())
    }

    pub fn entry_at(&self, category: ActivatorCategory, pos: GridPos) -> Option<&IndexedActivator> {
        self.entries.get(&category)?.get(&pos.key())
    }

    pub fn len(&self, category: ActivatorCategory) -> usize {
        self.entries.get(&category).map_or(0, BTreeMap::len)
    }

    pub fn has_id(&self, category: ActivatorCategory, id: u32) -> bool {
        self.ids.get(&category).is_some_and(|ids| ids.contains(&id))
    }

    pub fn has_door(&self, id: u32) -> bool {
        self.doors.contains_key(&id)
    }

    /// Check an id against the domain an `_id` field references
    pub fn has_target(&self, target: IdTarget, id: u32) -> bool {
        match target {
            IdTarget::Doors => self.has_door(id),
            IdTarget::Teleporters => self.has_id(ActivatorCategory::Teleporters, id),
        }
    }

    /// Tile types of a category present in the map
    pub fn types_in_use(&self, category: ActivatorCategory) -> impl Iterator<Item = &str> {
        self.types
            .get(&category)
            .into_iter()
            .flat_map(|types| types.iter().map(String::as_str))
    }

    /// Drop an id from the live set ahead of erasing its tile
    pub fn release_id(&mut self, category: ActivatorCategory, id: u32) -> bool {
        self.ids
            .get_mut(&category)
            .is_some_and(|ids| ids.remove(&id))
    }

    /// Lowest id not used by the category
    pub fn lowest_unused(&self, category: ActivatorCategory) -> u32 {
        lowest_free(self.ids.get(&category).into_iter().flatten().copied())
    }

    pub fn lowest_unused_door(&self) -> u32 {
        lowest_free(self.doors.keys().copied())
    }
}

fn lowest_free(used: impl Iterator<Item = u32>) -> u32 {
    let used: BTreeSet<u32> = used.collect();
    (0..).find(|id| !used.contains(id)).unwrap_or(0)
}
