//! Map rendering for the editor's main view
//!
//! Sprites are loaded through the asset server from the data directory and
//! registered with egui; the map is painted on egui's background layer inside
//! the main view rectangle. Sprites that are missing on disk are drawn as
//! colored cells so every placed tile stays visible.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiTextureHandle};
use cavern_map_core::{GridPos, Tile};
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

use crate::session::{EditMode, EditSession};
use crate::tools::viewport::{ViewCamera, ViewLayout};

/// Plugin for map rendering
pub struct MapRenderPlugin;

impl Plugin for MapRenderPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SpriteTextureCache>().add_systems(
            Update,
            load_sprite_textures.run_if(resource_exists::<EditSession>),
        );
    }
}

/// State of an image load operation
#[derive(Debug, Clone, PartialEq)]
pub enum ImageLoadState {
    Loading,
    Loaded,
    Failed(String),
}

/// Sprite textures keyed by their path relative to the data directory
#[derive(Resource, Default)]
pub struct SpriteTextureCache {
    /// Loaded textures: path -> (handle, texture_id, width, height)
    pub loaded: HashMap<String, (Handle<Image>, egui::TextureId, f32, f32)>,
    /// Pending loads: path -> handle
    pub pending: HashMap<String, Handle<Image>>,
    pub load_states: HashMap<String, ImageLoadState>,
}

impl SpriteTextureCache {
    pub fn get(&self, path: &str) -> Option<(egui::TextureId, egui::Vec2)> {
        self.loaded
            .get(path)
            .map(|(_, id, w, h)| (*id, egui::vec2(*w, *h)))
    }

    fn is_settled(&self, path: &str) -> bool {
        self.loaded.contains_key(path)
            || matches!(self.load_states.get(path), Some(ImageLoadState::Failed(_)))
    }
}

/// Sprite paths needed for the current map and brush
fn wanted_sprites(session: &EditSession) -> BTreeSet<String> {
    let catalog = session.catalog();
    let map = session.tilemap();
    let brush = session.brush();
    map.tiles
        .values()
        .map(|t| (t.kind.as_str(), t.variant))
        .chain(map.offgrid.iter().map(|t| (t.kind.as_str(), t.variant)))
        .chain(std::iter::once((brush.kind.as_str(), brush.variant)))
        .map(|(kind, variant)| catalog.sprite_path(kind, variant))
        .collect()
}

/// System to load sprite textures and register them with egui
fn load_sprite_textures(
    session: Res<EditSession>,
    mut cache: ResMut<SpriteTextureCache>,
    mut contexts: EguiContexts,
    asset_server: Res<AssetServer>,
    images: Res<Assets<Image>>,
) {
    use bevy::asset::LoadState;

    for path in wanted_sprites(&session) {
        if cache.is_settled(&path) {
            continue;
        }

        if let Some(handle) = cache.pending.get(&path).cloned() {
            match asset_server.load_state(&handle) {
                LoadState::Loaded => {
                    if let Some(image) = images.get(&handle) {
                        let width = image.width() as f32;
                        let height = image.height() as f32;
                        let texture_id =
                            contexts.add_image(EguiTextureHandle::Strong(handle.clone()));
                        cache
                            .loaded
                            .insert(path.clone(), (handle, texture_id, width, height));
                        cache.pending.remove(&path);
                        cache.load_states.insert(path, ImageLoadState::Loaded);
                    }
                }
                LoadState::Failed(_) => {
                    debug!("No sprite at {}, drawing placeholder", path);
                    cache.pending.remove(&path);
                    cache
                        .load_states
                        .insert(path.clone(), ImageLoadState::Failed(path));
                }
                LoadState::Loading | LoadState::NotLoaded => {}
            }
            continue;
        }

        let full_path: PathBuf = session.registry().data_dir().join(&path);
        if !full_path.exists() {
            cache
                .load_states
                .insert(path.clone(), ImageLoadState::Failed(path));
            continue;
        }
        let asset_path = full_path.to_string_lossy().replace('\\', "/");
        let handle: Handle<Image> = asset_server.load(asset_path);
        cache.pending.insert(path.clone(), handle);
        cache.load_states.insert(path, ImageLoadState::Loading);
    }
}

/// Stable placeholder color for a tile family
pub fn family_color(kind: &str) -> egui::Color32 {
    if kind == cavern_map_core::TRANSITION_TYPE {
        return egui::Color32::from_rgb(200, 60, 200);
    }
    let hash = kind
        .bytes()
        .fold(2166136261u32, |h, b| (h ^ b as u32).wrapping_mul(16777619));
    let [r, g, b, _] = hash.to_le_bytes();
    egui::Color32::from_rgb(60 + r % 160, 60 + g % 160, 60 + b % 160)
}

/// Projection from world pixels to egui points for one frame
struct ScreenMapper<'a> {
    layout: &'a ViewLayout,
    camera: &'a ViewCamera,
}

impl ScreenMapper<'_> {
    fn point(&self, world: [f64; 2]) -> egui::Pos2 {
        let p = self.camera.world_to_screen(self.layout, world);
        egui::pos2(p.x, p.y)
    }

    fn rect(&self, world: [f64; 2], size: [f64; 2]) -> egui::Rect {
        egui::Rect::from_min_max(
            self.point(world),
            self.point([world[0] + size[0], world[1] + size[1]]),
        )
    }

    fn cell(&self, pos: GridPos, tile_size: u32) -> egui::Rect {
        let size = tile_size as f64;
        self.rect(pos.to_pixels(tile_size), [size, size])
    }
}

fn to_egui_rect(rect: bevy::math::Rect) -> egui::Rect {
    egui::Rect::from_min_max(
        egui::pos2(rect.min.x, rect.min.y),
        egui::pos2(rect.max.x, rect.max.y),
    )
}

/// Draw a sprite, or its placeholder, with the top-left corner at `world`
fn paint_sprite(
    painter: &egui::Painter,
    mapper: &ScreenMapper,
    cache: &SpriteTextureCache,
    path: &str,
    kind: &str,
    world: [f64; 2],
    fallback_size: [f64; 2],
    tint: egui::Color32,
) -> egui::Rect {
    match cache.get(path) {
        Some((texture_id, size)) => {
            let rect = mapper.rect(world, [size.x as f64, size.y as f64]);
            let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
            painter.image(texture_id, rect, uv, tint);
            rect
        }
        None => {
            let rect = mapper.rect(world, fallback_size);
            let color = family_color(kind).gamma_multiply(tint.a() as f32 / 255.0);
            painter.rect_filled(rect, 0.0, color);
            rect
        }
    }
}

fn tile_label(tile: &Tile) -> Option<String> {
    tile.id
        .map(|id| id.to_string())
        .or_else(|| tile.destination.map(|d| format!(">{}", d)))
}

/// Paint the map, grid, highlights and brush preview into the main view
pub fn paint_main_view(ctx: &egui::Context, session: &EditSession, cache: &SpriteTextureCache) {
    let layout = session.layout();
    let main = to_egui_rect(layout.main_rect());
    let painter = ctx
        .layer_painter(egui::LayerId::background())
        .with_clip_rect(main);
    painter.rect_filled(main, 0.0, egui::Color32::from_rgb(20, 18, 24));

    let mapper = ScreenMapper {
        layout: &layout,
        camera: &session.camera,
    };
    let map = session.tilemap();
    let catalog = session.catalog();
    let tile_size = map.tile_size;
    let size = tile_size as f64;

    let inspecting = matches!(session.mode(), EditMode::EditProperties);
    let open_target = session.properties().target().map(|t| t.pos());

    for tile in map.offgrid.iter() {
        let path = catalog.sprite_path(&tile.kind, tile.variant);
        let fallback = catalog.family(&tile.kind).map_or([size, size], |f| f.size);
        paint_sprite(
            &painter,
            &mapper,
            cache,
            &path,
            &tile.kind,
            tile.pos,
            fallback,
            egui::Color32::WHITE,
        );
    }

    let focused: BTreeSet<&str> = session.index().types_in_use(session.focus).collect();
    for tile in map.tiles.values() {
        let dimmed = inspecting && !focused.contains(tile.kind.as_str());
        let tint = if dimmed {
            egui::Color32::from_white_alpha(90)
        } else {
            egui::Color32::WHITE
        };
        let path = catalog.sprite_path(&tile.kind, tile.variant);
        let rect = paint_sprite(
            &painter,
            &mapper,
            cache,
            &path,
            &tile.kind,
            tile.pos.to_pixels(tile_size),
            [size, size],
            tint,
        );
        if let Some(label) = tile_label(tile) {
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                label,
                egui::FontId::monospace(10.0),
                egui::Color32::WHITE,
            );
        }
    }

    if session.show_grid {
        paint_grid(&painter, &mapper, main, session);
    }

    if let Some(pos) = open_target {
        painter.rect_stroke(
            mapper.cell(pos, tile_size),
            0.0,
            egui::Stroke::new(2.0, egui::Color32::YELLOW),
            egui::StrokeKind::Outside,
        );
    }

    let hovered = session.hovered_cell();
    let pointer = session.pointer_pos();
    let over_main = layout.main_rect().contains(pointer);
    match session.mode() {
        EditMode::Drawing if over_main => {
            let brush = session.brush();
            let path = catalog.sprite_path(&brush.kind, brush.variant);
            let world = if session.offgrid() {
                let w = session.hovered_world();
                [w[0].floor(), w[1].floor()]
            } else {
                hovered.to_pixels(tile_size)
            };
            paint_sprite(
                &painter,
                &mapper,
                cache,
                &path,
                &brush.kind,
                world,
                [size, size],
                egui::Color32::from_white_alpha(140),
            );
        }
        EditMode::PickingDestination(_) => {
            if over_main {
                painter.rect_stroke(
                    mapper.cell(hovered, tile_size),
                    0.0,
                    egui::Stroke::new(2.0, egui::Color32::LIGHT_GREEN),
                    egui::StrokeKind::Outside,
                );
            }
            painter.text(
                egui::pos2(main.center().x, main.min.y + 12.0),
                egui::Align2::CENTER_TOP,
                format!(
                    "Map {}: click the destination cell, Escape to cancel",
                    session.file_id()
                ),
                egui::FontId::default(),
                egui::Color32::WHITE,
            );
        }
        _ => {}
    }
}

fn paint_grid(
    painter: &egui::Painter,
    mapper: &ScreenMapper,
    main: egui::Rect,
    session: &EditSession,
) {
    let tile_size = session.tilemap().tile_size.max(1) as f64;
    let scroll = session.camera.scroll;
    let visible = session.camera.visible_world_size();
    let stroke = egui::Stroke::new(1.0, egui::Color32::from_white_alpha(24));

    let first_x = (scroll[0] / tile_size).floor() as i64;
    let last_x = ((scroll[0] + visible[0]) / tile_size).ceil() as i64;
    for x in first_x..=last_x {
        let sx = mapper.point([x as f64 * tile_size, 0.0]).x;
        painter.line_segment(
            [egui::pos2(sx, main.min.y), egui::pos2(sx, main.max.y)],
            stroke,
        );
    }

    let first_y = (scroll[1] / tile_size).floor() as i64;
    let last_y = ((scroll[1] + visible[1]) / tile_size).ceil() as i64;
    for y in first_y..=last_y {
        let sy = mapper.point([0.0, y as f64 * tile_size]).y;
        painter.line_segment(
            [egui::pos2(main.min.x, sy), egui::pos2(main.max.x, sy)],
            stroke,
        );
    }
}
