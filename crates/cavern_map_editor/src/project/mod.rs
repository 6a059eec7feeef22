//! World registry: the ordered map slots of a data directory
//!
//! A UI index (`level`) is a position in `active_maps`; the entry there is the
//! stable file id naming `maps/{id}.json`. Deleting a slot never deletes its
//! file; stale files are only cleaned up by compaction.

mod compaction;
mod file;

pub use file::*;

use cavern_map_core::{Environments, FileId, Tilemap};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct WorldRegistry {
    data_dir: PathBuf,
    active_maps: Vec<FileId>,
    pub environments: Environments,
}

impl WorldRegistry {
    /// Open a data directory, creating the maps folder and a first map if needed
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, WorldError> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(data_dir.join(MAPS_DIR))
            .map_err(|e| WorldError::Io(format!("{}: {}", data_dir.display(), e)))?;

        let environments = Self::load_environments(&data_dir);
        let mut registry = Self {
            data_dir,
            active_maps: Vec::new(),
            environments,
        };

        registry.active_maps = registry.disk_ids()?;
        if registry.active_maps.is_empty() {
            Tilemap::default().save(&registry.map_path(0))?;
            registry.active_maps.push(0);
            bevy::log::info!("Created first map in {:?}", registry.maps_dir());
        }

        bevy::log::info!(
            "Opened world {:?} with {} maps",
            registry.data_dir,
            registry.active_maps.len()
        );
        Ok(registry)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// File ids in UI order
    pub fn active_maps(&self) -> &[FileId] {
        &self.active_maps
    }

    pub fn len(&self) -> usize {
        self.active_maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active_maps.is_empty()
    }

    /// File id at a UI index
    pub fn file_id(&self, level: usize) -> Option<FileId> {
        self.active_maps.get(level).copied()
    }

    /// UI index holding a file id
    pub fn level_of(&self, file_id: FileId) -> Option<usize> {
        self.active_maps.iter().position(|id| *id == file_id)
    }

    pub fn is_active(&self, file_id: FileId) -> bool {
        self.active_maps.contains(&file_id)
    }

    /// Environment of the map at a UI index
    pub fn environment_of_level(&self, level: usize) -> &str {
        match self.file_id(level) {
            Some(file_id) => self.environments.environment_of(file_id),
            None => self.environments.environment_of(FileId::MAX),
        }
    }

    /// `1 + max(ids on disk and in memory)`, or 0 for an empty world
    pub fn next_file_id(&self) -> FileId {
        let on_disk = self.disk_ids().unwrap_or_else(|e| {
            bevy::log::warn!("Could not scan maps directory: {}", e);
            Vec::new()
        });
        on_disk
            .into_iter()
            .chain(self.active_maps.iter().copied())
            .max()
            .map_or(0, |max| max + 1)
    }

    /// Allocate a file, write an empty map to it and append a slot.
    /// Returns the new UI index.
    pub fn create_map(&mut self, environment: &str) -> Result<usize, WorldError> {
        let file_id = self.next_file_id();
        Tilemap::default().save(&self.map_path(file_id))?;
        self.active_maps.push(file_id);
        self.environments.assign(file_id, environment);
        self.save_environments()?;
        bevy::log::info!("Created map {} in environment {}", file_id, environment);
        Ok(self.active_maps.len() - 1)
    }

    /// Remove the slot at a UI index and return the UI index to show next.
    /// An emptied registry gets a fresh empty map.
    pub fn delete_map(&mut self, level: usize) -> Result<usize, WorldError> {
        if level < self.active_maps.len() {
            let removed = self.active_maps.remove(level);
            bevy::log::info!("Removed map {} from the world", removed);
        }

        if self.active_maps.is_empty() {
            let file_id = self.next_file_id();
            Tilemap::default().save(&self.map_path(file_id))?;
            self.active_maps.push(file_id);
            bevy::log::warn!("World was empty, created map {}", file_id);
        }

        Ok(level.min(self.active_maps.len() - 1))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use cavern_map_core::{ActivatorStore, GridPos, Tile};

    pub(crate) fn temp_world() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("cavern_world_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(dir.join(MAPS_DIR)).unwrap();
        dir
    }

    /// Write empty maps with the given file ids
    pub(crate) fn seed_maps(dir: &Path, ids: &[FileId]) {
        for id in ids {
            Tilemap::default()
                .save(&dir.join(MAPS_DIR).join(map_file_name(*id)))
                .unwrap();
        }
    }

    #[test]
    fn test_open_empty_dir_creates_first_map() {
        let dir = temp_world();
        let registry = WorldRegistry::open(&dir).unwrap();
        assert_eq!(registry.active_maps(), &[0]);
        assert!(dir.join("maps/0.json").exists());
        // Missing environments file falls back to the default document
        assert_eq!(registry.environments, Environments::default());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_open_scans_map_files() {
        let dir = temp_world();
        seed_maps(&dir, &[9, 0, 5]);
        std::fs::write(dir.join("maps/notes.json"), "{}").unwrap();
        let registry = WorldRegistry::open(&dir).unwrap();
        assert_eq!(registry.active_maps(), &[0, 5, 9]);
        assert_eq!(registry.level_of(9), Some(2));
        assert_eq!(registry.next_file_id(), 10);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_create_map_assigns_environment() {
        let dir = temp_world();
        seed_maps(&dir, &[0, 1]);
        let mut registry = WorldRegistry::open(&dir).unwrap();
        let level = registry.create_map("blue_cave").unwrap();
        assert_eq!(level, 2);
        assert_eq!(registry.file_id(level), Some(2));
        assert_eq!(registry.environment_of_level(level), "blue_cave");
        assert!(dir.join("maps/2.json").exists());

        let saved = Environments::load(&dir.join(ENVIRONMENTS_FILE)).unwrap();
        assert_eq!(saved.owner(2), Some("blue_cave"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_delete_keeps_file_and_clamps_index() {
        let dir = temp_world();
        seed_maps(&dir, &[0, 1, 2]);
        let mut registry = WorldRegistry::open(&dir).unwrap();
        assert_eq!(registry.delete_map(2).unwrap(), 1);
        assert_eq!(registry.active_maps(), &[0, 1]);
        assert!(dir.join("maps/2.json").exists());
        // Deleted ids are never reused before compaction
        assert_eq!(registry.next_file_id(), 3);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_delete_last_map_self_heals() {
        let dir = temp_world();
        let mut registry = WorldRegistry::open(&dir).unwrap();
        assert_eq!(registry.delete_map(0).unwrap(), 0);
        assert_eq!(registry.active_maps(), &[1]);
        assert!(dir.join("maps/1.json").exists());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_missing_map_creates_it() {
        let dir = temp_world();
        let registry = WorldRegistry::open(&dir).unwrap();
        let map = registry.load_map(4).unwrap();
        assert!(map.is_empty());
        assert!(dir.join("maps/4.json").exists());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_save_and_reload_map() {
        let dir = temp_world();
        let registry = WorldRegistry::open(&dir).unwrap();
        let mut map = Tilemap::default();
        map.place(GridPos::new(1, 1), Tile::new("stone", 0, GridPos::default()));
        registry.save_map(0, &map).unwrap();
        assert_eq!(registry.load_map(0).unwrap(), map);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_malformed_activators_load_empty() {
        let dir = temp_world();
        std::fs::write(dir.join(ACTIVATORS_FILE), "{\"0\": 12").unwrap();
        let registry = WorldRegistry::open(&dir).unwrap();
        assert_eq!(registry.load_activators(), ActivatorStore::new());
        std::fs::remove_dir_all(&dir).ok();
    }
}
