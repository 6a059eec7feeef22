//! Full-save compaction: renumber map files densely in UI order
//!
//! Every map is first copied under its new id into a temporary directory with
//! its transition destinations rewritten. Only then are the old files deleted
//! and the new ones moved in. If anything fails before the move completes the
//! temporary directory is left in place for recovery.

use cavern_map_core::{ActivatorStore, FileId, MapError, Tilemap};
use std::collections::HashMap;
use std::path::Path;

use super::{map_file_name, WorldError, WorldRegistry};

impl WorldRegistry {
    /// Renumber `active_maps` to `0..N` on disk and in every document that
    /// references file ids. Returns the `old -> new` mapping.
    ///
    /// The caller saves the map being edited beforehand.
    pub fn compact(
        &mut self,
        store: &mut ActivatorStore,
    ) -> Result<HashMap<FileId, FileId>, WorldError> {
        let mapping: HashMap<FileId, FileId> = self
            .active_maps
            .iter()
            .enumerate()
            .map(|(new_id, old_id)| (*old_id, new_id as FileId))
            .collect();

        let temp_dir = self
            .data_dir
            .join(format!(".compaction-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&temp_dir).map_err(|e| WorldError::Io(e.to_string()))?;
        bevy::log::info!(
            "Compacting {} maps through {:?}",
            self.active_maps.len(),
            temp_dir
        );

        if let Err(message) = self.stage_and_swap(&mapping, &temp_dir) {
            bevy::log::error!(
                "Compaction failed, renumbered maps left in {:?}: {}",
                temp_dir,
                message
            );
            return Err(WorldError::Compaction { temp_dir, message });
        }

        if let Err(e) = std::fs::remove_dir(&temp_dir) {
            bevy::log::warn!("Could not remove {:?}: {}", temp_dir, e);
        }

        self.environments.renumber(&mapping);
        self.save_environments()?;

        store.renumber(&mapping);
        self.save_activators(store)?;

        self.active_maps = (0..self.active_maps.len() as FileId).collect();
        bevy::log::info!("Compaction finished");
        Ok(mapping)
    }

    /// Copy, delete, move. Errors carry a message naming the failed step.
    fn stage_and_swap(
        &self,
        mapping: &HashMap<FileId, FileId>,
        temp_dir: &Path,
    ) -> Result<(), String> {
        for (new_id, old_id) in self.active_maps.iter().enumerate() {
            let new_id = new_id as FileId;
            let mut map = match Tilemap::load(&self.map_path(*old_id)) {
                Ok(map) => map,
                Err(MapError::NotFound(_)) => Tilemap::default(),
                Err(e) => return Err(format!("reading map {}: {}", old_id, e)),
            };

            let dangling = map
                .tiles
                .values()
                .filter(|t| t.destination.is_some_and(|d| !mapping.contains_key(&d)))
                .count();
            if dangling > 0 {
                bevy::log::warn!(
                    "Map {} has {} transitions into removed maps, pointing them at itself",
                    old_id,
                    dangling
                );
            }
            map.remap_destinations(mapping, new_id);

            map.save(&temp_dir.join(map_file_name(new_id)))
                .map_err(|e| format!("staging map {} as {}: {}", old_id, new_id, e))?;
        }

        for path in self.map_files().map_err(|e| e.to_string())? {
            std::fs::remove_file(&path)
                .map_err(|e| format!("deleting {}: {}", path.display(), e))?;
        }

        let maps_dir = self.maps_dir();
        for new_id in 0..self.active_maps.len() as FileId {
            let name = map_file_name(new_id);
            std::fs::rename(temp_dir.join(&name), maps_dir.join(&name))
                .map_err(|e| format!("moving {}: {}", name, e))?;
        }
        Ok(())
    }
}
