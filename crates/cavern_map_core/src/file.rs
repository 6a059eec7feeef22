//! Document save/load operations

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

use crate::{ActivatorStore, Environments, Tilemap};

#[derive(Debug)]
pub enum MapError {
    NotFound(String),
    IoError(String),
    ParseError(String),
    SerializeError(String),
}

impl std::fmt::Display for MapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapError::NotFound(path) => write!(f, "File not found: {}", path),
            MapError::IoError(e) => write!(f, "IO error: {}", e),
            MapError::ParseError(e) => write!(f, "Parse error: {}", e),
            MapError::SerializeError(e) => write!(f, "Serialize error: {}", e),
        }
    }
}

impl std::error::Error for MapError {}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, MapError> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => MapError::NotFound(path.display().to_string()),
        _ => MapError::IoError(e.to_string()),
    })?;
    serde_json::from_str(&content).map_err(|e| MapError::ParseError(e.to_string()))
}

fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<(), MapError> {
    let content =
        serde_json::to_string_pretty(value).map_err(|e| MapError::SerializeError(e.to_string()))?;
    std::fs::write(path, content).map_err(|e| MapError::IoError(e.to_string()))
}

impl Tilemap {
    /// Load a map document. A missing file is `MapError::NotFound`.
    pub fn load(path: &Path) -> Result<Self, MapError> {
        let mut map: Tilemap = read_json(path)?;
        map.tile_size = map.tile_size.max(1);
        Ok(map)
    }

    /// Save the map document
    pub fn save(&self, path: &Path) -> Result<(), MapError> {
        write_json(self, path)
    }
}

impl ActivatorStore {
    pub fn load(path: &Path) -> Result<Self, MapError> {
        read_json(path)
    }

    pub fn save(&self, path: &Path) -> Result<(), MapError> {
        write_json(self, path)
    }
}

impl Environments {
    pub fn load(path: &Path) -> Result<Self, MapError> {
        read_json(path)
    }

    pub fn save(&self, path: &Path) -> Result<(), MapError> {
        write_json(self, path)
    }
}
