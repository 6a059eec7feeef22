//! World file save/load operations

use cavern_map_core::{ActivatorStore, Environments, FileId, MapError, Tilemap};
use std::path::{Path, PathBuf};

use super::WorldRegistry;

pub const MAPS_DIR: &str = "maps";
pub const ENVIRONMENTS_FILE: &str = "environments.json";
pub const ACTIVATORS_FILE: &str = "activators.json";

#[derive(Debug)]
pub enum WorldError {
    Io(String),
    Parse(String),
    Serialize(String),
    /// Compaction stopped part way; the renumbered maps are kept in `temp_dir`
    Compaction { temp_dir: PathBuf, message: String },
}

impl std::fmt::Display for WorldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorldError::Io(e) => write!(f, "IO error: {}", e),
            WorldError::Parse(e) => write!(f, "Parse error: {}", e),
            WorldError::Serialize(e) => write!(f, "Serialize error: {}", e),
            WorldError::Compaction { temp_dir, message } => write!(
                f,
                "Compaction failed: {} (recover maps from {})",
                message,
                temp_dir.display()
            ),
        }
    }
}

impl std::error::Error for WorldError {}

impl From<MapError> for WorldError {
    fn from(e: MapError) -> Self {
        match e {
            MapError::NotFound(path) => WorldError::Io(format!("File not found: {}", path)),
            MapError::IoError(e) => WorldError::Io(e),
            MapError::ParseError(e) => WorldError::Parse(e),
            MapError::SerializeError(e) => WorldError::Serialize(e),
        }
    }
}

/// `{file_id}.json`
pub fn map_file_name(file_id: FileId) -> String {
    format!("{}.json", file_id)
}

/// File id named by a map file, `None` for anything else
pub fn parse_map_file_name(path: &Path) -> Option<FileId> {
    if path.extension()? != "json" {
        return None;
    }
    path.file_stem()?.to_str()?.parse().ok()
}

impl WorldRegistry {
    pub fn maps_dir(&self) -> PathBuf {
        self.data_dir.join(MAPS_DIR)
    }

    pub fn map_path(&self, file_id: FileId) -> PathBuf {
        self.maps_dir().join(map_file_name(file_id))
    }

    pub fn environments_path(&self) -> PathBuf {
        self.data_dir.join(ENVIRONMENTS_FILE)
    }

    pub fn activators_path(&self) -> PathBuf {
        self.data_dir.join(ACTIVATORS_FILE)
    }

    /// Every `*.json` file in the maps directory
    pub(crate) fn map_files(&self) -> Result<Vec<PathBuf>, WorldError> {
        let entries =
            std::fs::read_dir(self.maps_dir()).map_err(|e| WorldError::Io(e.to_string()))?;
        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| WorldError::Io(e.to_string()))?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
        Ok(files)
    }

    /// File ids of the map files on disk, ascending
    pub fn disk_ids(&self) -> Result<Vec<FileId>, WorldError> {
        let mut ids: Vec<FileId> = self
            .map_files()?
            .iter()
            .filter_map(|path| parse_map_file_name(path))
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }

    /// Load a map, creating and saving an empty one if the file is missing
    pub fn load_map(&self, file_id: FileId) -> Result<Tilemap, WorldError> {
        let path = self.map_path(file_id);
        match Tilemap::load(&path) {
            Ok(map) => {
                bevy::log::info!("Loaded map {} from {:?}", file_id, path);
                Ok(map)
            }
            Err(MapError::NotFound(_)) => {
                bevy::log::warn!("Map file {:?} not found, creating an empty map", path);
                let map = Tilemap::default();
                map.save(&path)?;
                Ok(map)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn save_map(&self, file_id: FileId, map: &Tilemap) -> Result<(), WorldError> {
        map.save(&self.map_path(file_id))?;
        bevy::log::info!("Saved map {}", file_id);
        Ok(())
    }

    /// Load the activator metadata; missing or malformed documents yield an empty store
    pub fn load_activators(&self) -> ActivatorStore {
        match ActivatorStore::load(&self.activators_path()) {
            Ok(store) => store,
            Err(MapError::NotFound(_)) => ActivatorStore::new(),
            Err(e) => {
                bevy::log::warn!("Could not load activator metadata: {}. Starting empty.", e);
                ActivatorStore::new()
            }
        }
    }

    pub fn save_activators(&self, store: &ActivatorStore) -> Result<(), WorldError> {
        store.save(&self.activators_path())?;
        Ok(())
    }

    pub(crate) fn load_environments(data_dir: &Path) -> Environments {
        match Environments::load(&data_dir.join(ENVIRONMENTS_FILE)) {
            Ok(envs) => envs,
            Err(e) => {
                bevy::log::warn!("Could not load environments: {}. Using defaults.", e);
                Environments::default()
            }
        }
    }

    pub fn save_environments(&self) -> Result<(), WorldError> {
        self.environments.save(&self.environments_path())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_file_names() {
        assert_eq!(map_file_name(12), "12.json");
        assert_eq!(parse_map_file_name(Path::new("maps/12.json")), Some(12));
        assert_eq!(parse_map_file_name(Path::new("maps/12.txt")), None);
        assert_eq!(parse_map_file_name(Path::new("maps/level.json")), None);
        assert_eq!(parse_map_file_name(Path::new("maps/-1.json")), None);
    }
}
