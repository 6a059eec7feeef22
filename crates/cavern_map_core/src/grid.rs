//! Grid coordinates

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};

use crate::Tile;

/// A grid cell coordinate, serialized as `[x, y]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(from = "[i32; 2]", into = "[i32; 2]")]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Map key used in tilemap documents (`"x;y"`)
    pub fn key(&self) -> String {
        format!("{};{}", self.x, self.y)
    }

    /// Parse a `"x;y"` key
    pub fn parse_key(key: &str) -> Option<Self> {
        let (x, y) = key.split_once(';')?;
        Some(Self::new(x.trim().parse().ok()?, y.trim().parse().ok()?))
    }

    /// Offset by a delta
    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Cell containing a pixel position
    pub fn from_pixels(pixel: [f64; 2], tile_size: u32) -> Self {
        let size = tile_size.max(1) as f64;
        Self::new(
            (pixel[0] / size).floor() as i32,
            (pixel[1] / size).floor() as i32,
        )
    }

    /// Top-left pixel corner of the cell
    pub fn to_pixels(&self, tile_size: u32) -> [f64; 2] {
        [
            self.x as f64 * tile_size as f64,
            self.y as f64 * tile_size as f64,
        ]
    }
}

impl From<[i32; 2]> for GridPos {
    fn from(value: [i32; 2]) -> Self {
        Self::new(value[0], value[1])
    }
}

impl From<GridPos> for [i32; 2] {
    fn from(value: GridPos) -> Self {
        [value.x, value.y]
    }
}

impl From<(i32, i32)> for GridPos {
    fn from(value: (i32, i32)) -> Self {
        Self::new(value.0, value.1)
    }
}

impl std::fmt::Display for GridPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Serde adapter storing grid tiles under `"x;y"` string keys.
///
/// On load the key is authoritative: each tile's `pos` is overwritten with it.
pub(crate) mod tile_keys {
    use super::*;

    pub fn serialize<S: Serializer>(
        tiles: &BTreeMap<GridPos, Tile>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(tiles.len()))?;
        for (pos, tile) in tiles {
            map.serialize_entry(&pos.key(), tile)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<GridPos, Tile>, D::Error> {
        let raw = HashMap::<String, Tile>::deserialize(deserializer)?;
        raw.into_iter()
            .map(|(key, mut tile)| {
                let pos = GridPos::parse_key(&key)
                    .ok_or_else(|| D::Error::custom(format!("invalid tile key '{}'", key)))?;
                tile.pos = pos;
                Ok((pos, tile))
            })
            .collect()
    }
}
