//! Core data structures for cavern_map
//!
//! This crate provides the persisted documents of a cavern world:
//! - `Tilemap` - sparse grid tiles plus free-form off-grid decorations (one per map file)
//! - `Tile` / `OffgridTile` - placed tiles
//! - `GridPos` - grid coordinates, keyed as `"x;y"` on disk
//! - `ActivatorStore` - per-map activator metadata (levers, buttons, teleporters)
//! - `Environments` - environment name to file id assignment

mod activator;
mod environment;
mod file;
mod grid;
mod tile;
mod tilemap;

pub use activator::{
    ActivatorCategory, ActivatorKind, ActivatorRecord, ActivatorStore, FieldKind, FieldSpec,
    FieldValue, IdTarget, LevelActivators,
};
pub use environment::{Environments, FALLBACK_ENVIRONMENT};
pub use file::MapError;
pub use grid::GridPos;
pub use tile::{ExtractedTile, OffgridTile, Tile, TileFilter, TRANSITION_TYPE};
pub use tilemap::{SpriteMetrics, Tilemap, DEFAULT_TILE_SIZE};

/// File id of a map: the stable integer naming `maps/{id}.json`
pub type FileId = u32;
