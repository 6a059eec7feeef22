//! Placed tiles

use serde::ser::SerializeTuple;
use serde::{Deserialize, Serialize, Serializer};

use crate::{FileId, GridPos};

/// Tile family of transition portals
pub const TRANSITION_TYPE: &str = "transition";

/// A tile placed on the grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Tile family (`stone`, `green_cave_lever`, `transition`, ...)
    #[serde(rename = "type")]
    pub kind: String,
    /// Sprite index within the family
    pub variant: u32,
    /// Grid position, always equal to the key the tile is stored under
    pub pos: GridPos,
    /// Present on doors and activators
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    /// Transition target map
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<FileId>,
    /// Transition target cell in the destination map
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_pos: Option<GridPos>,
}

impl Tile {
    /// Create a plain tile
    pub fn new(kind: impl Into<String>, variant: u32, pos: GridPos) -> Self {
        Self {
            kind: kind.into(),
            variant,
            pos,
            id: None,
            destination: None,
            dest_pos: None,
        }
    }

    /// Create a tile carrying an id (door or activator)
    pub fn with_id(kind: impl Into<String>, variant: u32, pos: GridPos, id: u32) -> Self {
        Self {
            id: Some(id),
            ..Self::new(kind, variant, pos)
        }
    }

    /// Create a transition with its default target (map 0, cell 0;0)
    pub fn transition(pos: GridPos) -> Self {
        Self {
            destination: Some(0),
            dest_pos: Some(GridPos::default()),
            ..Self::new(TRANSITION_TYPE, 0, pos)
        }
    }

    pub fn is_transition(&self) -> bool {
        self.kind == TRANSITION_TYPE
    }
}

/// A decoration placed at a free pixel position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OffgridTile {
    #[serde(rename = "type")]
    pub kind: String,
    pub variant: u32,
    /// Top-left corner in pixels
    #[serde(serialize_with = "serialize_pixel_pos")]
    pub pos: [f64; 2],
}

/// Whole coordinates are written as JSON integers, the rest as floats
fn serialize_pixel_pos<S: Serializer>(pos: &[f64; 2], serializer: S) -> Result<S::Ok, S::Error> {
    let mut tuple = serializer.serialize_tuple(2)?;
    for value in pos {
        if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
            tuple.serialize_element(&(*value as i64))?;
        } else {
            tuple.serialize_element(value)?;
        }
    }
    tuple.end()
}

impl OffgridTile {
    pub fn new(kind: impl Into<String>, variant: u32, pos: [f64; 2]) -> Self {
        Self {
            kind: kind.into(),
            variant,
            pos,
        }
    }
}

/// Selects tiles by family and optionally by variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileFilter {
    pub kind: String,
    pub variant: Option<u32>,
}

impl TileFilter {
    /// Match every variant of a family
    pub fn family(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            variant: None,
        }
    }

    /// Match one variant of a family
    pub fn exact(kind: impl Into<String>, variant: u32) -> Self {
        Self {
            kind: kind.into(),
            variant: Some(variant),
        }
    }

    pub fn matches(&self, kind: &str, variant: u32) -> bool {
        self.kind == kind && self.variant.is_none_or(|v| v == variant)
    }
}

/// A tile copied out of a tilemap, positioned in pixels
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedTile {
    pub kind: String,
    pub variant: u32,
    pub pos: [f64; 2],
    pub id: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_tile_omits_optional_fields() {
        let tile = Tile::new("stone", 3, GridPos::new(1, 2));
        let json = serde_json::to_value(&tile).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "type": "stone", "variant": 3, "pos": [1, 2] })
        );
    }

    #[test]
    fn test_transition_defaults() {
        let tile = Tile::transition(GridPos::new(10, 10));
        assert!(tile.is_transition());
        assert_eq!(tile.destination, Some(0));
        assert_eq!(tile.dest_pos, Some(GridPos::new(0, 0)));
        assert_eq!(tile.id, None);
    }

    #[test]
    fn test_offgrid_integer_position_round_trips() {
        let json = r#"{"type":"vine","variant":0,"pos":[17,40]}"#;
        let tile: OffgridTile = serde_json::from_str(json).unwrap();
        assert_eq!(tile.pos, [17.0, 40.0]);
        assert_eq!(serde_json::to_string(&tile).unwrap(), json);

        let tile = OffgridTile::new("vine", 0, [-3.0, 12.5]);
        assert_eq!(
            serde_json::to_string(&tile).unwrap(),
            r#"{"type":"vine","variant":0,"pos":[-3,12.5]}"#
        );
    }

    #[test]
    fn test_filter() {
        assert!(TileFilter::family("vine").matches("vine", 7));
        assert!(TileFilter::exact("vine", 2).matches("vine", 2));
        assert!(!TileFilter::exact("vine", 2).matches("vine", 3));
        assert!(!TileFilter::family("vine").matches("stone", 0));
    }
}
