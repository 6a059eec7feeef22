//! cavern_map_editor - Level editor for cavern platformer worlds
//!
//! This crate provides the editor for a world of tile maps:
//! - Grid and off-grid tile painting with autotiling
//! - Doors, levers, buttons and teleporters with unique ids per map
//! - Transitions between maps, with a destination cell picked on the target map
//! - Map creation, deletion and compaction of file ids
//! - Snapshot undo/redo per map
//!
//! # Usage
//!
//! ```rust,ignore
//! use bevy::prelude::*;
//! use cavern_map_editor::EditorPlugin;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(EditorPlugin::new().with_data_path("data"))
//!         .run();
//! }
//! ```
//!
//! The interaction logic lives in [`session::EditSession`], which consumes
//! semantic [`session::EditorEvent`]s and can be driven without a window.

pub mod activators;
pub mod catalog;
pub mod commands;
pub mod preferences;
pub mod project;
pub mod properties;
pub mod render;
pub mod session;
pub mod tools;
pub mod ui;

// Re-export the data crates
pub use cavern_map_autotile;
pub use cavern_map_core;

use bevy::ecs::message::MessageWriter;
use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use std::path::PathBuf;

use preferences::EditorPreferences;
use render::MapRenderPlugin;
use session::{EditSession, SessionConfig};
use tools::viewport::{MAX_ZOOM, MIN_ZOOM};
use tools::EditorToolsPlugin;
use ui::EditorUiPlugin;

/// Data directory used when neither the plugin nor the preferences name one
pub const DEFAULT_DATA_DIR: &str = "data";

/// Why the editor could not start; the app exits with code 1 on the first frame
#[derive(Resource, Debug, Clone)]
pub struct StartupError(pub String);

/// Bevy plugin running the editor on a data directory
#[derive(Default)]
pub struct EditorPlugin {
    /// Data directory. If None, taken from preferences or `./data`.
    pub data_path: Option<PathBuf>,
    /// Overrides the stored zoom
    pub initial_zoom: Option<f64>,
    /// Overrides the stored grid visibility
    pub initial_grid: Option<bool>,
}

impl EditorPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the data directory holding `maps/`, `environments.json` and `activators.json`
    pub fn with_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = Some(path.into());
        self
    }

    /// Set the initial zoom level (0.25 to 8.0)
    pub fn with_initial_zoom(mut self, zoom: f64) -> Self {
        self.initial_zoom = Some(zoom.clamp(MIN_ZOOM, MAX_ZOOM));
        self
    }

    /// Set whether to show the grid on startup
    pub fn with_initial_grid(mut self, show: bool) -> Self {
        self.initial_grid = Some(show);
        self
    }

    /// Builder path, then the last directory from preferences, then `./data`
    fn detect_data_path(&self, preferences: &EditorPreferences) -> PathBuf {
        if let Some(path) = &self.data_path {
            return path.clone();
        }
        if let Some(path) = &preferences.data_dir {
            return path.clone();
        }
        std::env::current_dir()
            .map(|p| p.join(DEFAULT_DATA_DIR))
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR))
    }

    /// Session options: plugin values win over stored preferences
    fn session_config(&self, preferences: &EditorPreferences) -> SessionConfig {
        SessionConfig {
            zoom: self.initial_zoom.unwrap_or(preferences.zoom),
            show_grid: self.initial_grid.unwrap_or(preferences.show_grid),
            pan_keys: preferences.pan_keys,
        }
    }
}

impl Plugin for EditorPlugin {
    fn build(&self, app: &mut App) {
        let mut preferences = EditorPreferences::load();
        let data_path = self.detect_data_path(&preferences);
        bevy::log::info!("EditorPlugin: Using data path: {:?}", data_path);

        app.add_plugins(EguiPlugin::default())
            .add_plugins(EditorUiPlugin)
            .add_plugins(MapRenderPlugin)
            .add_plugins(EditorToolsPlugin)
            .add_systems(Startup, setup_editor_camera);

        match EditSession::open(&data_path, self.session_config(&preferences)) {
            Ok(session) => {
                preferences.add_recent_data_dir(&data_path);
                if let Err(e) = preferences.save() {
                    bevy::log::error!("Failed to save preferences: {}", e);
                }
                app.insert_resource(session);
            }
            Err(e) => {
                bevy::log::error!("Could not open data directory {:?}: {}", data_path, e);
                preferences.remove_recent_data_dir(&data_path);
                app.insert_resource(StartupError(e.to_string()))
                    .add_systems(Startup, exit_on_startup_error);
            }
        }
        app.insert_resource(preferences);
    }
}

fn setup_editor_camera(mut commands: Commands, camera_query: Query<&Camera2d>) {
    // Only spawn if no Camera2d exists
    if camera_query.is_empty() {
        commands.spawn(Camera2d);
    }
}

fn exit_on_startup_error(error: Res<StartupError>, mut exit: MessageWriter<AppExit>) {
    bevy::log::error!("Exiting: {}", error.0);
    exit.write(AppExit::from_code(1));
}
