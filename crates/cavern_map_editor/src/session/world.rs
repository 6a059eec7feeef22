//! Level switching, map management, compaction and destination picking

use cavern_map_core::{FileId, GridPos};

use super::{EditMode, EditSession, PickOrigin};
use crate::project::WorldError;

impl EditSession {
    /// Load the map at a UI index, replacing the current one without saving it
    pub(super) fn load_level(&mut self, level: usize) -> Result<(), WorldError> {
        let level = level.min(self.registry.len().saturating_sub(1));
        let file_id = self.registry.file_id(level).unwrap_or_default();
        let tilemap = self.registry.load_map(file_id)?;

        self.tilemap = tilemap;
        self.level = level;
        self.pointer.stroke = Default::default();
        self.properties.close();
        self.reindex();
        self.ensure_metadata();
        let initial = self.snapshot();
        self.history.reset(initial);
        self.fit_brush_to_environment();
        self.map_list.ensure_visible(level, self.registry.len());
        bevy::log::info!("Editing map {} (index {})", file_id, level);
        Ok(())
    }

    /// Write the current map and the activator metadata
    pub fn save_current(&mut self) -> Result<(), WorldError> {
        self.registry.save_map(self.file_id(), &self.tilemap)?;
        self.registry.save_activators(&self.activators)
    }

    /// Save the current map and switch to another UI index
    pub fn select_level(&mut self, level: usize) {
        if level == self.level || level >= self.registry.len() {
            return;
        }
        if let Err(e) = self.save_current() {
            bevy::log::error!("Failed to save map {}: {}", self.file_id(), e);
            self.set_status(format!("Could not save map: {}", e), true);
            return;
        }
        if let Err(e) = self.load_level(level) {
            self.set_status(format!("Could not load map: {}", e), true);
        }
    }

    /// Show the environment picker for a new map
    pub fn begin_create_map(&mut self) {
        self.properties.close();
        self.mode = EditMode::SelectingEnvironment;
    }

    /// Append a new empty map in `environment` and switch to it
    pub fn create_map(&mut self, environment: &str) {
        self.mode = EditMode::Drawing;
        if let Err(e) = self.save_current() {
            self.set_status(format!("Could not save map: {}", e), true);
            return;
        }
        let result = self
            .registry
            .create_map(environment)
            .and_then(|level| self.load_level(level));
        match result {
            Ok(()) => {
                let message = format!("Created map {} in {}", self.file_id(), environment);
                self.set_status(message, false);
            }
            Err(e) => self.set_status(format!("Could not create map: {}", e), true),
        }
    }

    /// Drop the current UI slot. Its file stays on disk until compaction and
    /// its unsaved edits are discarded.
    pub fn delete_current_map(&mut self) {
        let removed = self.file_id();
        let result = self
            .registry
            .delete_map(self.level)
            .and_then(|level| self.load_level(level));
        match result {
            Ok(()) => self.set_status(format!("Removed map {}", removed), false),
            Err(e) => self.set_status(format!("Could not delete map: {}", e), true),
        }
    }

    /// Save, renumber every map densely and reload the current slot
    pub fn compact_world(&mut self) {
        if let Err(e) = self.save_current() {
            self.set_status(format!("Could not save map: {}", e), true);
            return;
        }
        match self.registry.compact(&mut self.activators) {
            Ok(mapping) => {
                let level = self.level;
                match self.load_level(level) {
                    Ok(()) => {
                        self.set_status(format!("Compacted {} maps", mapping.len()), false)
                    }
                    Err(e) => self.set_status(format!("Could not reload map: {}", e), true),
                }
            }
            Err(e) => {
                bevy::log::error!("{}", e);
                self.set_status(e.to_string(), true);
            }
        }
    }

    /// Show the destination map so a cell can be clicked in it. The origin
    /// map, edits and history included, is kept aside.
    pub(super) fn begin_picking(&mut self, destination: FileId, transition_pos: GridPos) {
        let Some(dest_level) = self.registry.level_of(destination) else {
            self.set_status(format!("Map {} does not exist", destination), true);
            return;
        };
        let destination_map = if dest_level == self.level {
            self.tilemap.clone()
        } else {
            match self.registry.load_map(destination) {
                Ok(map) => map,
                Err(e) => {
                    self.set_status(format!("Could not load map {}: {}", destination, e), true);
                    return;
                }
            }
        };

        let origin = PickOrigin {
            level: self.level,
            transition_pos,
            tilemap: std::mem::replace(&mut self.tilemap, destination_map),
            history: self.history.clone(),
            resume_inspect: matches!(self.mode, EditMode::EditProperties),
            awaiting_release: self.pointer.left || self.pointer.right,
        };
        self.level = dest_level;
        let initial = self.snapshot();
        self.history.reset(initial);
        self.pointer.stroke = Default::default();
        self.properties.close();
        self.mode = EditMode::PickingDestination(Box::new(origin));
        self.reindex();
        self.set_status("Click the destination cell, Escape to cancel", false);
    }

    /// Return to the origin map, writing `dest_pos` when a cell was picked
    fn end_picking(&mut self, picked: Option<GridPos>) {
        if !self.is_picking() {
            return;
        }
        let EditMode::PickingDestination(origin) =
            std::mem::replace(&mut self.mode, EditMode::Drawing)
        else {
            return;
        };
        let origin = *origin;
        self.level = origin.level;
        self.tilemap = origin.tilemap;
        self.history = origin.history;
        self.mode = if origin.resume_inspect {
            EditMode::EditProperties
        } else {
            EditMode::Drawing
        };

        if let Some(cell) = picked {
            if let Some(tile) = self.tilemap.get_mut(origin.transition_pos) {
                tile.dest_pos = Some(cell);
            }
            self.record_snapshot();
            self.set_status(format!("Destination cell set to {}", cell.key()), false);
        }
        self.reindex();
        self.open_properties_at(origin.transition_pos);
    }

    pub(super) fn finish_picking(&mut self, cell: GridPos) {
        self.end_picking(Some(cell));
    }

    pub fn cancel_picking(&mut self) {
        self.end_picking(None);
    }

    /// Save everything and request exit: 0 on success, 1 if saving failed
    pub fn quit(&mut self) {
        // The origin map holds the unsaved edits, not the one on screen
        self.cancel_picking();
        let result = self
            .save_current()
            .and_then(|()| self.registry.save_environments());
        self.exit = Some(match result {
            Ok(()) => {
                bevy::log::info!("Saved world, exiting");
                0
            }
            Err(e) => {
                bevy::log::error!("Failed to save on exit: {}", e);
                1
            }
        });
    }
}
