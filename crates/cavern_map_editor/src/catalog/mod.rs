//! Asset catalog: tile, door and activator families per environment
//!
//! Read-only after startup. Loaded from `catalog.json` in the data directory
//! when present, otherwise the built-in cavern catalog is used.

use cavern_map_core::{ActivatorCategory, SpriteMetrics, TRANSITION_TYPE};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

const CATALOG_FILE: &str = "catalog.json";

fn default_variants() -> u32 {
    1
}

fn default_size() -> [f64; 2] {
    [16.0, 16.0]
}

/// A sprite family: one tile `type` and its variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyDef {
    pub name: String,
    #[serde(default = "default_variants")]
    pub variants: u32,
    /// Variants are derived from neighbors by the autotile pass
    #[serde(default)]
    pub autotile: bool,
    /// Sprite size in pixels
    #[serde(default = "default_size")]
    pub size: [f64; 2],
}

impl FamilyDef {
    pub fn new(name: &str, variants: u32) -> Self {
        Self {
            name: name.to_string(),
            variants: variants.max(1),
            autotile: false,
            size: default_size(),
        }
    }

    pub fn autotiled(mut self) -> Self {
        self.autotile = true;
        self
    }

    pub fn sized(mut self, width: f64, height: f64) -> Self {
        self.size = [width, height];
        self
    }
}

/// Families available in one environment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentAssets {
    #[serde(default)]
    pub tiles: Vec<FamilyDef>,
    #[serde(default)]
    pub doors: Vec<FamilyDef>,
    #[serde(default)]
    pub activators: Vec<FamilyDef>,
}

/// What a brush family is, as far as placement is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FamilyRole {
    Tile,
    Door,
    Activator(ActivatorCategory),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetCatalog {
    environments: IndexMap<String, EnvironmentAssets>,
    /// Families available in every environment
    #[serde(default)]
    fixed: Vec<FamilyDef>,
}

impl Default for AssetCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl AssetCatalog {
    /// The cavern asset set shipped with the game
    pub fn builtin() -> Self {
        let mut environments = IndexMap::new();
        environments.insert(
            "green_cave".to_string(),
            EnvironmentAssets {
                tiles: vec![
                    FamilyDef::new("stone", 9).autotiled(),
                    FamilyDef::new("dirt", 9).autotiled(),
                    FamilyDef::new("vine", 3).sized(16.0, 32.0),
                    FamilyDef::new("mushroom", 2).sized(8.0, 8.0),
                ],
                doors: vec![
                    FamilyDef::new("vines_door_h", 1).sized(32.0, 16.0),
                    FamilyDef::new("vines_door_v", 1).sized(16.0, 32.0),
                ],
                activators: vec![
                    FamilyDef::new("green_cave_lever", 2),
                    FamilyDef::new("green_cave_button", 2),
                    FamilyDef::new("green_cave_teleporter", 1).sized(16.0, 32.0),
                ],
            },
        );
        environments.insert(
            "blue_cave".to_string(),
            EnvironmentAssets {
                tiles: vec![
                    FamilyDef::new("ice", 9).autotiled(),
                    FamilyDef::new("crystal", 3),
                    FamilyDef::new("stalagmite", 2).sized(16.0, 32.0),
                ],
                doors: vec![FamilyDef::new("breakable_stalactite", 1).sized(16.0, 32.0)],
                activators: vec![
                    FamilyDef::new("blue_cave_lever", 2),
                    FamilyDef::new("blue_cave_button", 2),
                    FamilyDef::new("blue_cave_teleporter", 1).sized(16.0, 32.0),
                ],
            },
        );

        Self {
            environments,
            fixed: vec![
                FamilyDef::new("spawners", 3),
                FamilyDef::new(TRANSITION_TYPE, 1),
                FamilyDef::new("throwable", 2).sized(8.0, 8.0),
            ],
        }
    }

    /// Load `catalog.json` from the data directory, falling back to the
    /// built-in catalog when it is absent or malformed
    pub fn load_or_builtin(data_dir: &Path) -> Self {
        let path = data_dir.join(CATALOG_FILE);
        if !path.exists() {
            return Self::builtin();
        }
        let parsed = std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|content| {
                serde_json::from_str::<AssetCatalog>(&content).map_err(|e| e.to_string())
            });
        match parsed {
            Ok(catalog) if !catalog.environments.is_empty() => {
                bevy::log::info!("Loaded asset catalog from {:?}", path);
                catalog
            }
            Ok(_) => {
                bevy::log::warn!("Asset catalog {:?} lists no environments, using built-in", path);
                Self::builtin()
            }
            Err(e) => {
                bevy::log::warn!("Could not load asset catalog {:?}: {}. Using built-in.", path, e);
                Self::builtin()
            }
        }
    }

    /// Environment names in catalog order
    pub fn environment_names(&self) -> impl Iterator<Item = &str> {
        self.environments.keys().map(String::as_str)
    }

    /// Assets of an environment; unknown names get the first environment
    pub fn environment(&self, name: &str) -> Option<&EnvironmentAssets> {
        self.environments
            .get(name)
            .or_else(|| self.environments.values().next())
    }

    /// Brush palette of an environment: its tiles, doors and activators,
    /// then the fixed families
    pub fn palette(&self, env: &str) -> Vec<&FamilyDef> {
        let mut families: Vec<&FamilyDef> = Vec::new();
        if let Some(assets) = self.environment(env) {
            families.extend(assets.tiles.iter());
            families.extend(assets.doors.iter());
            families.extend(assets.activators.iter());
        }
        families.extend(self.fixed.iter());
        families
    }

    /// Look up a family in any environment
    pub fn family(&self, name: &str) -> Option<&FamilyDef> {
        self.environments
            .values()
            .flat_map(|e| e.tiles.iter().chain(&e.doors).chain(&e.activators))
            .chain(self.fixed.iter())
            .find(|f| f.name == name)
    }

    pub fn is_door(&self, kind: &str) -> bool {
        self.environments
            .values()
            .any(|e| e.doors.iter().any(|f| f.name == kind))
    }

    pub fn is_autotiled(&self, kind: &str) -> bool {
        self.family(kind).is_some_and(|f| f.autotile)
    }

    pub fn variant_count(&self, kind: &str) -> u32 {
        self.family(kind).map_or(1, |f| f.variants.max(1))
    }

    /// Placement role of a family
    pub fn role(&self, kind: &str) -> FamilyRole {
        if self.is_door(kind) {
            FamilyRole::Door
        } else if let Some(category) = ActivatorCategory::of_tile_type(kind) {
            FamilyRole::Activator(category)
        } else {
            FamilyRole::Tile
        }
    }

    /// Image path of a sprite, relative to the data directory
    pub fn sprite_path(&self, kind: &str, variant: u32) -> String {
        format!("sprites/{}/{}.png", kind, variant)
    }
}

impl SpriteMetrics for AssetCatalog {
    fn sprite_size(&self, kind: &str, _variant: u32) -> Option<[f64; 2]> {
        self.family(kind).map(|f| f.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookups() {
        let catalog = AssetCatalog::builtin();
        assert_eq!(
            catalog.environment_names().collect::<Vec<_>>(),
            vec!["green_cave", "blue_cave"]
        );
        assert!(catalog.is_door("vines_door_h"));
        assert!(catalog.is_door("breakable_stalactite"));
        assert!(!catalog.is_door("stone"));
        assert!(catalog.is_autotiled("stone"));
        assert!(!catalog.is_autotiled("vine"));
        assert_eq!(catalog.variant_count("stone"), 9);
        assert_eq!(catalog.variant_count("unknown"), 1);
        assert_eq!(catalog.sprite_size("mushroom", 0), Some([8.0, 8.0]));
    }

    #[test]
    fn test_roles() {
        let catalog = AssetCatalog::builtin();
        assert_eq!(catalog.role("stone"), FamilyRole::Tile);
        assert_eq!(catalog.role("vines_door_v"), FamilyRole::Door);
        assert_eq!(
            catalog.role("green_cave_lever"),
            FamilyRole::Activator(ActivatorCategory::Levers)
        );
        assert_eq!(
            catalog.role("transition"),
            FamilyRole::Activator(ActivatorCategory::Transitions)
        );
    }

    #[test]
    fn test_palette_is_environment_scoped() {
        let catalog = AssetCatalog::builtin();
        let green: Vec<&str> = catalog.palette("green_cave").iter().map(|f| f.name.as_str()).collect();
        assert!(green.contains(&"green_cave_lever"));
        assert!(!green.contains(&"blue_cave_lever"));
        assert!(green.ends_with(&["spawners", "transition", "throwable"]));
        // Unknown environment falls back to the first one
        assert_eq!(catalog.palette("lava"), catalog.palette("green_cave"));
    }

    #[test]
    fn test_load_falls_back_on_bad_file() {
        let dir = std::env::temp_dir().join(format!("cavern_catalog_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        assert_eq!(AssetCatalog::load_or_builtin(&dir), AssetCatalog::builtin());

        std::fs::write(dir.join(CATALOG_FILE), "[1, 2").unwrap();
        assert_eq!(AssetCatalog::load_or_builtin(&dir), AssetCatalog::builtin());

        std::fs::write(
            dir.join(CATALOG_FILE),
            r#"{"environments": {"lava": {"tiles": [{"name": "basalt", "variants": 9, "autotile": true}]}}}"#,
        )
        .unwrap();
        let catalog = AssetCatalog::load_or_builtin(&dir);
        assert!(catalog.is_autotiled("basalt"));
        assert_eq!(catalog.palette("lava").len(), 1);
        std::fs::remove_dir_all(&dir).ok();
    }
}
