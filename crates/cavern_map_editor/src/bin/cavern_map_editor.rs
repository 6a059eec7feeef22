//! Standalone cavern map editor binary
//!
//! Run with: cavern_map_editor
//! Opens the last data directory from the preferences, or `./data`.

use bevy::asset::{AssetPlugin, UnapprovedPathMode};
use bevy::image::{ImageFilterMode, ImageSamplerDescriptor};
use bevy::prelude::*;
use bevy::window::{WindowResizeConstraints, WindowResolution};
use cavern_map_editor::tools::viewport::ViewLayout;
use cavern_map_editor::EditorPlugin;

fn main() -> AppExit {
    let min = ViewLayout::min_window();

    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Cavern Map Editor".to_string(),
                        resolution: WindowResolution::new(1280, 768)
                            .with_scale_factor_override(1.0),
                        resize_constraints: WindowResizeConstraints {
                            min_width: min.x,
                            min_height: min.y,
                            ..default()
                        },
                        ..default()
                    }),
                    // The session saves before the app exits
                    close_when_requested: false,
                    ..default()
                })
                .set(ImagePlugin {
                    // Pixel art sprites stay crisp when zoomed
                    default_sampler: ImageSamplerDescriptor {
                        mag_filter: ImageFilterMode::Nearest,
                        min_filter: ImageFilterMode::Nearest,
                        mipmap_filter: ImageFilterMode::Nearest,
                        ..default()
                    },
                })
                .set(AssetPlugin {
                    // Sprites are loaded from the data directory, outside the assets folder
                    unapproved_path_mode: UnapprovedPathMode::Allow,
                    ..default()
                }),
        )
        .add_plugins(EditorPlugin::default())
        .run()
}
