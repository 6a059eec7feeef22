//! Tilemap document: sparse grid tiles plus off-grid decorations

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::grid::tile_keys;
use crate::{ExtractedTile, FileId, GridPos, OffgridTile, Tile, TileFilter};

/// Tile size used by every known map
pub const DEFAULT_TILE_SIZE: u32 = 16;

/// Sprite dimensions lookup, used for hit-testing off-grid tiles
pub trait SpriteMetrics {
    /// Size in pixels of a sprite, `None` if the family/variant is unknown
    fn sprite_size(&self, kind: &str, variant: u32) -> Option<[f64; 2]>;
}

/// One map file: `{ tilemap, tilesize, offgrid }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tilemap {
    /// Grid tiles keyed by cell
    #[serde(rename = "tilemap", with = "tile_keys")]
    pub tiles: BTreeMap<GridPos, Tile>,
    #[serde(rename = "tilesize")]
    pub tile_size: u32,
    /// Off-grid tiles in placement order
    #[serde(default)]
    pub offgrid: Vec<OffgridTile>,
}

impl Default for Tilemap {
    fn default() -> Self {
        Self::new(DEFAULT_TILE_SIZE)
    }
}

impl Tilemap {
    /// Create an empty tilemap
    pub fn new(tile_size: u32) -> Self {
        Self {
            tiles: BTreeMap::new(),
            tile_size: tile_size.max(1),
            offgrid: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty() && self.offgrid.is_empty()
    }

    /// Get the grid tile at a cell
    pub fn get(&self, pos: GridPos) -> Option<&Tile> {
        self.tiles.get(&pos)
    }

    /// Get a mutable grid tile at a cell
    pub fn get_mut(&mut self, pos: GridPos) -> Option<&mut Tile> {
        self.tiles.get_mut(&pos)
    }

    /// Place a tile at a cell, replacing whatever was there.
    /// The tile's `pos` is forced to the cell.
    pub fn place(&mut self, pos: GridPos, mut tile: Tile) -> Option<Tile> {
        tile.pos = pos;
        self.tiles.insert(pos, tile)
    }

    /// Remove the grid tile at a cell
    pub fn erase(&mut self, pos: GridPos) -> Option<Tile> {
        self.tiles.remove(&pos)
    }

    /// Append an off-grid tile
    pub fn add_offgrid(&mut self, tile: OffgridTile) {
        self.offgrid.push(tile);
    }

    /// Remove every off-grid tile whose sprite rectangle contains `pixel`.
    /// Unknown sprites are treated as one tile square.
    pub fn erase_offgrid_hit(
        &mut self,
        pixel: [f64; 2],
        metrics: &impl SpriteMetrics,
    ) -> Vec<OffgridTile> {
        let fallback = [self.tile_size as f64; 2];
        let (hit, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.offgrid)
            .into_iter()
            .partition(|tile| {
                let size = metrics
                    .sprite_size(&tile.kind, tile.variant)
                    .unwrap_or(fallback);
                pixel[0] >= tile.pos[0]
                    && pixel[0] < tile.pos[0] + size[0]
                    && pixel[1] >= tile.pos[1]
                    && pixel[1] < tile.pos[1] + size[1]
            });
        self.offgrid = kept;
        hit
    }

    /// Copy every tile (grid and off-grid) matching one of the filters.
    /// Grid positions are converted to pixels.
    pub fn find_copies(&self, filters: &[TileFilter]) -> Vec<ExtractedTile> {
        let matches = |kind: &str, variant: u32| filters.iter().any(|f| f.matches(kind, variant));

        let mut found: Vec<ExtractedTile> = self
            .offgrid
            .iter()
            .filter(|t| matches(&t.kind, t.variant))
            .map(|t| ExtractedTile {
                kind: t.kind.clone(),
                variant: t.variant,
                pos: t.pos,
                id: None,
            })
            .collect();

        found.extend(
            self.tiles
                .values()
                .filter(|t| matches(&t.kind, t.variant))
                .map(|t| ExtractedTile {
                    kind: t.kind.clone(),
                    variant: t.variant,
                    pos: t.pos.to_pixels(self.tile_size),
                    id: t.id,
                }),
        );
        found
    }

    /// Like `find_copies`, but also removes the matched tiles
    pub fn extract_remove(&mut self, filters: &[TileFilter]) -> Vec<ExtractedTile> {
        let found = self.find_copies(filters);
        let matches = |kind: &str, variant: u32| filters.iter().any(|f| f.matches(kind, variant));
        self.offgrid.retain(|t| !matches(&t.kind, t.variant));
        self.tiles.retain(|_, t| !matches(&t.kind, t.variant));
        found
    }

    /// Recompute the variant of every tile whose family is autotiled.
    ///
    /// Variants depend only on same-family orthogonal neighbors, so a second
    /// pass changes nothing. Returns the number of tiles whose variant changed.
    pub fn autotile(&mut self, is_autotiled: impl Fn(&str) -> bool) -> usize {
        let updates: Vec<(GridPos, u32)> = self
            .tiles
            .iter()
            .filter(|(_, tile)| is_autotiled(&tile.kind))
            .filter_map(|(pos, tile)| {
                let variant = cavern_map_autotile::resolve_variant(pos.x, pos.y, |x, y| {
                    self.tiles
                        .get(&GridPos::new(x, y))
                        .is_some_and(|n| n.kind == tile.kind)
                })?;
                (variant != tile.variant).then_some((*pos, variant))
            })
            .collect();

        for (pos, variant) in &updates {
            if let Some(tile) = self.tiles.get_mut(pos) {
                tile.variant = *variant;
            }
        }
        updates.len()
    }

    /// Grid tiles whose cell overlaps the rectangle `[pixel, pixel + size]`
    /// grown by one tile on every side
    pub fn tiles_around(&self, pixel: [f64; 2], size: [f64; 2]) -> Vec<&Tile> {
        let (min, max) = self.cell_span(pixel, size);
        self.tiles_in(min.offset(-1, -1), max.offset(1, 1))
    }

    /// Grid tiles in the row directly below the rectangle `[pixel, pixel + size]`
    pub fn tiles_under(&self, pixel: [f64; 2], size: [f64; 2]) -> Vec<&Tile> {
        let (min, max) = self.cell_span(pixel, size);
        let row = ((pixel[1] + size[1].max(0.0)) / self.tile_size as f64).floor() as i32;
        self.tiles_in(GridPos::new(min.x, row), GridPos::new(max.x, row))
    }

    /// Rewrite transition destinations through a file id mapping.
    /// Destinations missing from the mapping are pointed at `fallback`.
    pub fn remap_destinations(&mut self, mapping: &HashMap<FileId, FileId>, fallback: FileId) {
        for tile in self.tiles.values_mut() {
            if let Some(destination) = tile.destination {
                tile.destination = Some(mapping.get(&destination).copied().unwrap_or(fallback));
            }
        }
    }

    /// Inclusive cell range covered by a pixel rectangle
    fn cell_span(&self, pixel: [f64; 2], size: [f64; 2]) -> (GridPos, GridPos) {
        let ts = self.tile_size as f64;
        let min = GridPos::from_pixels(pixel, self.tile_size);
        let last = |start: f64, extent: f64, first: i32| {
            if extent > 0.0 {
                (((start + extent) / ts).ceil() as i32 - 1).max(first)
            } else {
                first
            }
        };
        let max = GridPos::new(
            last(pixel[0], size[0], min.x),
            last(pixel[1], size[1], min.y),
        );
        (min, max)
    }

    fn tiles_in(&self, min: GridPos, max: GridPos) -> Vec<&Tile> {
        let mut found = Vec::new();
        for y in min.y..=max.y {
            for x in min.x..=max.x {
                if let Some(tile) = self.tiles.get(&GridPos::new(x, y)) {
                    found.push(tile);
                }
            }
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSprites;

    impl SpriteMetrics for FixedSprites {
        fn sprite_size(&self, kind: &str, _variant: u32) -> Option<[f64; 2]> {
            (kind == "mushroom").then_some([8.0, 8.0])
        }
    }

    fn stone_block() -> Tilemap {
        let mut map = Tilemap::default();
        for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            map.place(GridPos::new(x, y), Tile::new("stone", 0, GridPos::default()));
        }
        map
    }

    #[test]
    fn test_place_forces_position() {
        let mut map = Tilemap::default();
        map.place(GridPos::new(3, 5), Tile::new("stone", 0, GridPos::new(9, 9)));
        let tile = map.get(GridPos::new(3, 5)).unwrap();
        assert_eq!(tile.pos, GridPos::new(3, 5));
        assert!(map.erase(GridPos::new(3, 5)).is_some());
        assert!(map.is_empty());
    }

    #[test]
    fn test_autotile_square_block() {
        let mut map = stone_block();
        map.autotile(|kind| kind == "stone");
        let variant = |x, y| map.get(GridPos::new(x, y)).unwrap().variant;
        assert_eq!(variant(0, 0), 0);
        assert_eq!(variant(1, 0), 2);
        assert_eq!(variant(0, 1), 6);
        assert_eq!(variant(1, 1), 4);
    }

    #[test]
    fn test_autotile_is_idempotent() {
        let mut map = stone_block();
        map.place(GridPos::new(2, 0), Tile::new("stone", 5, GridPos::default()));
        map.place(GridPos::new(5, 5), Tile::new("stone", 3, GridPos::default()));
        map.autotile(|kind| kind == "stone");
        let once = map.clone();
        assert_eq!(map.autotile(|kind| kind == "stone"), 0);
        assert_eq!(map, once);
        // Isolated tile keeps its variant
        assert_eq!(map.get(GridPos::new(5, 5)).unwrap().variant, 3);
    }

    #[test]
    fn test_autotile_ignores_other_families() {
        let mut map = Tilemap::default();
        map.place(GridPos::new(0, 0), Tile::new("stone", 4, GridPos::default()));
        map.place(GridPos::new(1, 0), Tile::new("vine", 0, GridPos::default()));
        map.place(GridPos::new(0, 1), Tile::new("vine", 0, GridPos::default()));
        assert_eq!(map.autotile(|kind| kind == "stone"), 0);
        assert_eq!(map.get(GridPos::new(0, 0)).unwrap().variant, 4);
    }

    #[test]
    fn test_erase_offgrid_hit_uses_sprite_rect() {
        let mut map = Tilemap::default();
        map.add_offgrid(OffgridTile::new("mushroom", 0, [10.0, 10.0]));
        map.add_offgrid(OffgridTile::new("rock", 0, [100.0, 100.0]));

        assert!(map.erase_offgrid_hit([19.0, 19.0], &FixedSprites).is_empty());
        assert_eq!(map.erase_offgrid_hit([17.0, 12.0], &FixedSprites).len(), 1);
        // Unknown sprite falls back to a tile-sized square
        assert_eq!(map.erase_offgrid_hit([115.0, 115.0], &FixedSprites).len(), 1);
        assert!(map.offgrid.is_empty());
    }

    #[test]
    fn test_find_copies_and_extract_remove() {
        let mut map = Tilemap::default();
        map.place(GridPos::new(2, 1), Tile::new("spawners", 1, GridPos::default()));
        map.place(GridPos::new(4, 1), Tile::new("spawners", 0, GridPos::default()));
        map.add_offgrid(OffgridTile::new("spawners", 1, [3.0, 4.0]));

        let filters = [TileFilter::exact("spawners", 1)];
        let copies = map.find_copies(&filters);
        assert_eq!(copies.len(), 2);
        assert!(copies.iter().any(|t| t.pos == [32.0, 16.0]));
        assert_eq!(map.tiles.len(), 2);

        let removed = map.extract_remove(&filters);
        assert_eq!(removed.len(), 2);
        assert_eq!(map.tiles.len(), 1);
        assert!(map.offgrid.is_empty());
    }

    #[test]
    fn test_spatial_queries() {
        let mut map = Tilemap::default();
        for x in 0..6 {
            map.place(GridPos::new(x, 4), Tile::new("stone", 0, GridPos::default()));
        }
        map.place(GridPos::new(2, 2), Tile::new("stone", 0, GridPos::default()));

        // Entity of 16x16 at cell (2,3): bottom edge touches row 4
        let under = map.tiles_under([32.0, 48.0], [16.0, 16.0]);
        assert_eq!(under.len(), 1);
        assert_eq!(under[0].pos, GridPos::new(2, 4));

        let around = map.tiles_around([32.0, 48.0], [16.0, 16.0]);
        let cells: Vec<GridPos> = around.iter().map(|t| t.pos).collect();
        assert!(cells.contains(&GridPos::new(2, 2)));
        assert!(cells.contains(&GridPos::new(1, 4)));
        assert!(cells.contains(&GridPos::new(3, 4)));
        assert!(!cells.contains(&GridPos::new(0, 4)));
    }

    #[test]
    fn test_remap_destinations() {
        let mut map = Tilemap::default();
        let mut portal = Tile::transition(GridPos::new(1, 1));
        portal.destination = Some(9);
        map.place(GridPos::new(1, 1), portal);
        let mut stale = Tile::transition(GridPos::new(2, 2));
        stale.destination = Some(4);
        map.place(GridPos::new(2, 2), stale);

        let mapping: HashMap<FileId, FileId> = [(0, 0), (5, 1), (9, 2)].into_iter().collect();
        map.remap_destinations(&mapping, 0);
        assert_eq!(map.get(GridPos::new(1, 1)).unwrap().destination, Some(2));
        assert_eq!(map.get(GridPos::new(2, 2)).unwrap().destination, Some(0));
    }

    #[test]
    fn test_document_shape() {
        let mut map = Tilemap::default();
        map.place(GridPos::new(3, 5), Tile::new("stone", 0, GridPos::default()));
        map.add_offgrid(OffgridTile::new("vine", 2, [17.0, 33.5]));
        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json["tilesize"], 16);
        assert_eq!(json["tilemap"]["3;5"]["pos"], serde_json::json!([3, 5]));
        assert_eq!(json["offgrid"][0]["pos"], serde_json::json!([17, 33.5]));
    }

    #[test]
    fn test_key_is_authoritative_on_load() {
        let json = r#"{"tilemap": {"3;5": {"type": "stone", "variant": 1, "pos": [0, 0]}},
                       "tilesize": 16, "offgrid": [{"type": "vine", "variant": 0, "pos": [4, 8]}]}"#;
        let map: Tilemap = serde_json::from_str(json).unwrap();
        assert_eq!(map.get(GridPos::new(3, 5)).unwrap().pos, GridPos::new(3, 5));
        assert_eq!(map.offgrid[0].pos, [4.0, 8.0]);
        let saved = serde_json::to_string(&map).unwrap();
        assert!(saved.contains(r#""pos":[4,8]"#));
    }
}
