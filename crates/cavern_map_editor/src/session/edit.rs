//! Map edits: painting, erasing, id-bearing placements and property commits

use cavern_map_core::{ActivatorCategory, ActivatorRecord, GridPos, OffgridTile, Tile};

use super::{Brush, DoorPrompt, EditMode, EditSession, PointerButton, Stroke};
use crate::catalog::FamilyRole;
use crate::commands::MapSnapshot;
use crate::properties::{Commit, FieldEdit, PropertyTarget, ValidationContext};
use crate::tools::viewport::Region;

impl EditSession {
    /// Left or right press in the main view while drawing
    pub(super) fn draw_press(&mut self, button: PointerButton) {
        let cell = self.hovered_cell();
        match button {
            PointerButton::Left => match self.catalog.role(&self.brush.kind) {
                FamilyRole::Door => self.open_door_prompt(cell),
                FamilyRole::Activator(ActivatorCategory::Transitions) => {
                    self.place_transition(cell)
                }
                FamilyRole::Activator(category) => self.place_activator(cell, category),
                FamilyRole::Tile => {
                    self.begin_stroke(button, cell);
                    if self.offgrid {
                        let world = self.hovered_world();
                        self.tilemap.add_offgrid(OffgridTile::new(
                            self.brush.kind.clone(),
                            self.brush.variant,
                            [world[0].floor(), world[1].floor()],
                        ));
                    } else {
                        self.paint_cell(cell);
                    }
                }
            },
            PointerButton::Right => {
                self.begin_stroke(button, cell);
                self.erase_at(cell);
            }
            PointerButton::Middle => {}
        }
    }

    fn begin_stroke(&mut self, button: PointerButton, cell: GridPos) {
        self.pointer.stroke = Stroke {
            button: Some(button),
            before: Some(self.snapshot()),
            last_cell: Some(cell),
            ended: false,
        };
    }

    /// Pointer moved to a new cell with a button held
    pub(super) fn continue_stroke(&mut self, button: PointerButton, cell: GridPos) {
        match button {
            PointerButton::Left if !self.offgrid => self.paint_cell(cell),
            PointerButton::Right => self.erase_at(cell),
            _ => {}
        }
    }

    fn paint_cell(&mut self, cell: GridPos) {
        let unchanged = self
            .tilemap
            .get(cell)
            .is_some_and(|tile| tile.kind == self.brush.kind && tile.variant == self.brush.variant);
        if unchanged {
            return;
        }
        self.clear_cell(cell);
        self.tilemap.place(
            cell,
            Tile::new(self.brush.kind.clone(), self.brush.variant, cell),
        );
    }

    /// Erase the grid tile at `cell`, or else the off-grid tiles under the pointer
    fn erase_at(&mut self, cell: GridPos) {
        if self.clear_cell(cell).is_some() {
            return;
        }
        let world = self.hovered_world();
        let removed = self.tilemap.erase_offgrid_hit(world, &self.catalog);
        if !removed.is_empty() {
            bevy::log::debug!("Erased {} off-grid tiles", removed.len());
        }
    }

    /// Remove a grid tile along with its live id and metadata record
    fn clear_cell(&mut self, cell: GridPos) -> Option<Tile> {
        let tile = self.tilemap.get(cell)?;
        let role = self.catalog.role(&tile.kind);
        if let (FamilyRole::Activator(category), Some(id)) = (role, tile.id) {
            // The id leaves the live set before the tile goes
            self.index.release_id(category, id);
            let file_id = self.file_id();
            self.activators.remove(file_id, category, id);
        }
        if role != FamilyRole::Tile {
            self.index_dirty = true;
        }
        self.tilemap.erase(cell)
    }

    fn place_transition(&mut self, cell: GridPos) {
        self.clear_cell(cell);
        self.tilemap.place(cell, Tile::transition(cell));
        self.reindex();
        self.record_snapshot();
    }

    /// Place an activator with the lowest free id and a default record, then
    /// open the property editor on it
    fn place_activator(&mut self, cell: GridPos, category: ActivatorCategory) {
        let Some(kind) = category.default_kind() else {
            return;
        };
        self.clear_cell(cell);
        self.refresh_index();

        let id = self.index.lowest_unused(category);
        let file_id = self.file_id();
        self.tilemap.place(
            cell,
            Tile::with_id(self.brush.kind.clone(), self.brush.variant, cell, id),
        );
        self.activators
            .insert(file_id, category, ActivatorRecord::new(id, cell, kind));
        self.reindex();
        self.record_snapshot();
        self.open_properties_at(cell);
    }

    fn open_door_prompt(&mut self, cell: GridPos) {
        self.refresh_index();
        self.mode = EditMode::DoorIdPrompt(DoorPrompt {
            pos: cell,
            kind: self.brush.kind.clone(),
            variant: self.brush.variant,
            buffer: self.index.lowest_unused_door().to_string(),
        });
    }

    /// Place the pending door under the typed id
    pub fn commit_door_prompt(&mut self) {
        let EditMode::DoorIdPrompt(prompt) = &self.mode else {
            return;
        };
        let Ok(id) = prompt.buffer.parse::<u32>() else {
            self.set_status("Door id needs a number", true);
            return;
        };
        if self.index.has_door(id) {
            self.set_status(format!("Door id {} is already used", id), true);
            return;
        }

        let prompt = prompt.clone();
        self.mode = EditMode::Drawing;
        self.clear_cell(prompt.pos);
        self.tilemap.place(
            prompt.pos,
            Tile::with_id(prompt.kind, prompt.variant, prompt.pos, id),
        );
        self.reindex();
        self.record_snapshot();
        self.set_status(format!("Placed door {}", id), false);
    }

    /// Close the door prompt or environment picker without acting
    pub fn cancel_modal(&mut self) {
        match self.mode {
            EditMode::DoorIdPrompt(_) | EditMode::SelectingEnvironment => {
                self.mode = EditMode::Drawing;
            }
            _ => self.properties.close(),
        }
    }

    /// Open the property editor on the activator or transition at `cell`.
    /// Returns false if there is nothing to edit there.
    pub(super) fn open_properties_at(&mut self, cell: GridPos) -> bool {
        let Some(tile) = self.tilemap.get(cell) else {
            return false;
        };
        let Some(category) = ActivatorCategory::of_tile_type(&tile.kind) else {
            return false;
        };

        let target = if category == ActivatorCategory::Transitions {
            PropertyTarget::Transition {
                pos: cell,
                destination: tile.destination.unwrap_or_default(),
                dest_pos: tile.dest_pos.unwrap_or_default(),
            }
        } else {
            let Some(id) = tile.id else {
                let message = format!("{} at {} has no id", tile.kind, cell.key());
                self.set_status(message, true);
                return false;
            };
            let stored = self.activators.get(self.file_id(), category, id).cloned();
            let Some(mut record) = stored.or_else(|| {
                category
                    .default_kind()
                    .map(|kind| ActivatorRecord::new(id, cell, kind))
            }) else {
                return false;
            };
            record.pos = cell;
            PropertyTarget::Activator { category, record }
        };

        self.focus = category;
        self.properties.open(target);
        true
    }

    /// Center the view on an activator card's tile and open it
    pub fn open_card(&mut self, category: ActivatorCategory, pos: GridPos) {
        let size = self.tilemap.tile_size as f64;
        let [x, y] = pos.to_pixels(self.tilemap.tile_size);
        self.camera
            .move_visual_to([x + size / 2.0, y + size / 2.0]);
        self.focus = category;
        self.open_properties_at(pos);
    }

    /// Start editing a field of the open target
    pub fn edit_field(&mut self, name: &str) {
        match self.properties.begin_edit(name) {
            Ok(FieldEdit::Typing) => {}
            Ok(FieldEdit::PickDestination {
                destination,
                transition_pos,
            }) => self.begin_picking(destination, transition_pos),
            Err(e) => self.set_status(e.to_string(), true),
        }
    }

    /// Validate the typed value; on failure the field stays in edit mode
    pub fn commit_field(&mut self) {
        let ctx = ValidationContext::new(&self.index, self.registry.active_maps());
        match self.properties.commit(&ctx) {
            Ok(commit) => self.apply_commit(commit),
            Err(e) => self.set_status(e.to_string(), true),
        }
    }

    /// Switch the open activator's type, clearing its fields
    pub fn select_activator_type(&mut self, type_name: &str) {
        match self.properties.set_type(type_name) {
            Ok(Some(commit)) => self.apply_commit(commit),
            Ok(None) => {}
            Err(e) => self.set_status(e.to_string(), true),
        }
    }

    pub fn close_properties(&mut self) {
        self.properties.close();
    }

    fn apply_commit(&mut self, commit: Commit) {
        let file_id = self.file_id();
        let message = match commit {
            Commit::Activator {
                category,
                previous_id,
                record,
            } => {
                if previous_id != record.id {
                    if let Some(tile) = self.tilemap.get_mut(record.pos) {
                        tile.id = Some(record.id);
                    }
                    self.activators.rekey(file_id, category, previous_id, record.id);
                }
                let message = format!("Updated {} {}", category, record.id);
                self.activators.insert(file_id, category, record);
                message
            }
            Commit::Transition {
                pos,
                destination,
                dest_pos,
            } => {
                if let Some(tile) = self.tilemap.get_mut(pos) {
                    tile.destination = Some(destination);
                    tile.dest_pos = Some(dest_pos);
                }
                format!("Transition at {} leads to map {}", pos.key(), destination)
            }
        };
        self.reindex();
        self.record_snapshot();
        self.set_status(message, false);
    }

    /// Select a brush; the variant is wrapped into the family's range
    pub fn set_brush(&mut self, kind: &str, variant: u32) {
        let count = self.catalog.variant_count(kind);
        self.brush = Brush {
            kind: kind.to_string(),
            variant: variant % count,
        };
    }

    /// Keep the brush inside the current environment's palette
    pub(super) fn fit_brush_to_environment(&mut self) {
        let palette = self.catalog.palette(self.environment());
        if palette.iter().any(|family| family.name == self.brush.kind) {
            return;
        }
        if let Some(first) = palette.first() {
            let kind = first.name.clone();
            self.set_brush(&kind, 0);
        }
    }

    pub fn toggle_offgrid(&mut self) {
        self.offgrid = !self.offgrid;
    }

    pub fn set_focus(&mut self, category: ActivatorCategory) {
        self.focus = category;
    }

    pub fn toggle_edit_properties(&mut self) {
        self.properties.close();
        self.mode = match self.mode {
            EditMode::EditProperties => EditMode::Drawing,
            _ => EditMode::EditProperties,
        };
    }

    pub fn autotile(&mut self) {
        let catalog = &self.catalog;
        let changed = self.tilemap.autotile(|kind| catalog.is_autotiled(kind));
        self.record_if_changed();
        self.set_status(format!("Autotiled {} tiles", changed), false);
    }

    /// Drop a default transition on the hovered cell
    pub fn quick_transition(&mut self) {
        if self.layout().hit_test(self.pointer.pos) != Region::Main {
            self.set_status("Point at the map to place a transition", true);
            return;
        }
        let cell = self.hovered_cell();
        self.place_transition(cell);
        self.set_status(format!("Placed transition at {}", cell.key()), false);
    }

    pub fn undo(&mut self) {
        if let Some(snapshot) = self.history.undo().cloned() {
            self.restore(snapshot);
        }
    }

    pub fn redo(&mut self) {
        if let Some(snapshot) = self.history.redo().cloned() {
            self.restore(snapshot);
        }
    }

    /// Put back a history entry, tiles and activator records together
    fn restore(&mut self, snapshot: MapSnapshot) {
        let file_id = self.file_id();
        snapshot.restore_into(&mut self.tilemap);
        self.activators.set_level(file_id, snapshot.activators);
        self.properties.close();
        self.reindex();
        self.ensure_metadata();
    }
}
