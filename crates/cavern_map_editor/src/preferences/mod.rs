//! Per-user editor preferences
//!
//! Stored as `preferences.json` in the platform config directory. Values set
//! on [`crate::EditorPlugin`] take precedence over the stored ones.

mod file;

pub use file::PreferencesError;

use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::session::PanKeys;

/// How many data directories the recent list keeps
pub const MAX_RECENT_DATA_DIRS: usize = 10;

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorPreferences {
    /// Data directory opened last
    pub data_dir: Option<PathBuf>,
    pub zoom: f64,
    pub show_grid: bool,
    pub pan_keys: PanKeys,
    /// Most recent first
    pub recent_data_dirs: Vec<PathBuf>,
}

impl Default for EditorPreferences {
    fn default() -> Self {
        Self {
            data_dir: None,
            zoom: 1.0,
            show_grid: true,
            pan_keys: PanKeys::default(),
            recent_data_dirs: Vec::new(),
        }
    }
}

impl EditorPreferences {
    /// Remember a data directory as the last one opened
    pub fn add_recent_data_dir(&mut self, path: &Path) {
        self.recent_data_dirs.retain(|p| p != path);
        self.recent_data_dirs.insert(0, path.to_path_buf());
        self.recent_data_dirs.truncate(MAX_RECENT_DATA_DIRS);
        self.data_dir = Some(path.to_path_buf());
    }

    pub fn remove_recent_data_dir(&mut self, path: &Path) {
        self.recent_data_dirs.retain(|p| p != path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_dirs_move_to_front() {
        let mut prefs = EditorPreferences::default();
        prefs.add_recent_data_dir(Path::new("a"));
        prefs.add_recent_data_dir(Path::new("b"));
        prefs.add_recent_data_dir(Path::new("a"));
        assert_eq!(
            prefs.recent_data_dirs,
            vec![PathBuf::from("a"), PathBuf::from("b")]
        );
        assert_eq!(prefs.data_dir, Some(PathBuf::from("a")));
    }

    #[test]
    fn test_recent_dirs_are_capped() {
        let mut prefs = EditorPreferences::default();
        for i in 0..(MAX_RECENT_DATA_DIRS + 3) {
            prefs.add_recent_data_dir(Path::new(&format!("dir{}", i)));
        }
        assert_eq!(prefs.recent_data_dirs.len(), MAX_RECENT_DATA_DIRS);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let prefs: EditorPreferences = serde_json::from_str(r#"{"zoom": 2.0}"#).unwrap();
        assert_eq!(prefs.zoom, 2.0);
        assert!(prefs.show_grid);
        assert_eq!(prefs.pan_keys, PanKeys::default());
    }
}
