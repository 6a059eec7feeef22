//! Edit session: the editor's interaction state machine
//!
//! One [`EditSession::process`] call is one frame. Within a frame the order is
//! fixed: drain events (placing and erasing tiles as they arrive), reindex
//! activators, pan the camera, then close a finished paint stroke with a single
//! history snapshot.

mod edit;
mod events;
mod input;
mod world;

pub use events::{EditorEvent, EditorKey, PointerButton};
pub use input::PanKeys;

use bevy::math::Vec2;
use bevy::prelude::Resource;
use cavern_map_core::{ActivatorCategory, FileId, GridPos, Tilemap};
use std::collections::HashSet;
use std::path::PathBuf;

use crate::activators::ActivatorIndex;
use crate::catalog::AssetCatalog;
use crate::commands::{History, MapSnapshot};
use crate::project::{WorldError, WorldRegistry};
use crate::properties::PropertyEditor;
use crate::tools::viewport::{MapListView, ViewCamera, ViewLayout};

/// Currently selected tile family and variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Brush {
    pub kind: String,
    pub variant: u32,
}

/// Pending door placement waiting for its id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoorPrompt {
    pub pos: GridPos,
    pub kind: String,
    pub variant: u32,
    /// Digits typed so far
    pub buffer: String,
}

/// Where to return after picking a transition's destination cell
#[derive(Debug, Clone)]
pub struct PickOrigin {
    pub level: usize,
    pub transition_pos: GridPos,
    /// The origin map as it was, including unsaved edits
    tilemap: Tilemap,
    history: History,
    resume_inspect: bool,
    /// The click that started picking has not been released yet
    pub awaiting_release: bool,
}

#[derive(Debug, Clone)]
pub enum EditMode {
    /// Left-click places, right-click erases
    Drawing,
    /// Left-click opens the property editor on activators and transitions
    EditProperties,
    /// Showing a transition's destination map until a cell is clicked
    PickingDestination(Box<PickOrigin>),
    /// Environment popup for a new map
    SelectingEnvironment,
    DoorIdPrompt(DoorPrompt),
}

/// Message shown in the underbar until replaced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

/// Startup options for a session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub zoom: f64,
    pub show_grid: bool,
    pub pan_keys: PanKeys,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            show_grid: true,
            pan_keys: PanKeys::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Stroke {
    button: Option<PointerButton>,
    before: Option<MapSnapshot>,
    last_cell: Option<GridPos>,
    /// Button released; the snapshot is taken at the end of the frame
    ended: bool,
}

#[derive(Debug, Clone, Default)]
struct PointerState {
    pos: Vec2,
    left: bool,
    right: bool,
    stroke: Stroke,
}

#[derive(Debug, Clone, Default)]
struct KeyState {
    ctrl: bool,
    /// Pan keys currently held
    held: HashSet<char>,
}

/// The whole editor state for one data directory
#[derive(Resource)]
pub struct EditSession {
    registry: WorldRegistry,
    catalog: AssetCatalog,
    tilemap: Tilemap,
    activators: cavern_map_core::ActivatorStore,
    index: ActivatorIndex,
    index_dirty: bool,
    history: History,
    properties: PropertyEditor,
    level: usize,
    mode: EditMode,
    brush: Brush,
    offgrid: bool,
    pub show_grid: bool,
    /// Category highlighted in EditProperties and listed in the underbar
    pub focus: ActivatorCategory,
    pub camera: ViewCamera,
    pub map_list: MapListView,
    window: Vec2,
    pointer: PointerState,
    keys: KeyState,
    pan_keys: PanKeys,
    status: Option<StatusMessage>,
    /// An error dialog covers the popup area
    error_popup: bool,
    exit: Option<u8>,
}

impl EditSession {
    /// Open a data directory and load its first map
    pub fn open(data_dir: impl Into<PathBuf>, config: SessionConfig) -> Result<Self, WorldError> {
        let registry = WorldRegistry::open(data_dir)?;
        let catalog = AssetCatalog::load_or_builtin(registry.data_dir());
        let activators = registry.load_activators();
        let brush = catalog
            .palette(registry.environment_of_level(0))
            .first()
            .map(|family| Brush {
                kind: family.name.clone(),
                variant: 0,
            })
            .unwrap_or(Brush {
                kind: cavern_map_core::TRANSITION_TYPE.to_string(),
                variant: 0,
            });

        let mut session = Self {
            registry,
            catalog,
            tilemap: Tilemap::default(),
            activators,
            index: ActivatorIndex::default(),
            index_dirty: false,
            history: History::new(MapSnapshot::of(&Tilemap::default())),
            properties: PropertyEditor::default(),
            level: 0,
            mode: EditMode::Drawing,
            brush,
            offgrid: false,
            show_grid: config.show_grid,
            focus: ActivatorCategory::Levers,
            camera: ViewCamera::with_zoom(config.zoom),
            map_list: MapListView::default(),
            window: ViewLayout::min_window(),
            pointer: PointerState::default(),
            keys: KeyState::default(),
            pan_keys: config.pan_keys,
            status: None,
            error_popup: false,
            exit: None,
        };
        session.load_level(0)?;
        Ok(session)
    }

    /// Run one frame over the events gathered since the last one
    pub fn process(&mut self, events: &[EditorEvent]) {
        for event in events {
            self.handle_event(*event);
            if self.exit.is_some() {
                return;
            }
        }
        self.refresh_index();
        self.apply_pan();
        if self.pointer.stroke.ended {
            self.finish_stroke();
        }
    }

    pub fn registry(&self) -> &WorldRegistry {
        &self.registry
    }

    pub fn catalog(&self) -> &AssetCatalog {
        &self.catalog
    }

    pub fn tilemap(&self) -> &Tilemap {
        &self.tilemap
    }

    pub fn activators(&self) -> &cavern_map_core::ActivatorStore {
        &self.activators
    }

    pub fn index(&self) -> &ActivatorIndex {
        &self.index
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn properties(&self) -> &PropertyEditor {
        &self.properties
    }

    pub fn mode(&self) -> &EditMode {
        &self.mode
    }

    pub fn brush(&self) -> &Brush {
        &self.brush
    }

    pub fn offgrid(&self) -> bool {
        self.offgrid
    }

    /// Current UI index
    pub fn level(&self) -> usize {
        self.level
    }

    /// File id of the map being edited
    pub fn file_id(&self) -> FileId {
        self.registry.file_id(self.level).unwrap_or_default()
    }

    /// Environment of the map being edited
    pub fn environment(&self) -> &str {
        self.registry.environment_of_level(self.level)
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    /// Set once the session has handled `Quit`
    pub fn exit_code(&self) -> Option<u8> {
        self.exit
    }

    pub fn is_picking(&self) -> bool {
        matches!(self.mode, EditMode::PickingDestination(_))
    }

    /// Pointer position in window pixels
    pub fn pointer_pos(&self) -> Vec2 {
        self.pointer.pos
    }

    /// Region tree for the current window and mode
    pub fn layout(&self) -> ViewLayout {
        let modal = matches!(
            self.mode,
            EditMode::SelectingEnvironment | EditMode::DoorIdPrompt(_)
        );
        ViewLayout::new(self.window)
            .with_chrome(!self.is_picking())
            .with_popup(modal || self.error_popup || self.properties.is_open())
    }

    /// Reserve the popup area for an error dialog so clicks on it stay off the map
    pub fn set_error_popup(&mut self, shown: bool) {
        self.error_popup = shown;
    }

    /// Grid cell under the pointer
    pub fn hovered_cell(&self) -> GridPos {
        self.camera
            .screen_to_grid(&self.layout(), self.pointer.pos, self.tilemap.tile_size)
    }

    /// World pixel under the pointer
    pub fn hovered_world(&self) -> [f64; 2] {
        self.camera.screen_to_world(&self.layout(), self.pointer.pos)
    }

    fn set_status(&mut self, text: impl Into<String>, is_error: bool) {
        let text = text.into();
        if is_error {
            bevy::log::warn!("{}", text);
        } else {
            bevy::log::info!("{}", text);
        }
        self.status = Some(StatusMessage { text, is_error });
    }

    /// Current tiles and this map's activator records
    fn snapshot(&self) -> MapSnapshot {
        let activators = self.activators.level(self.file_id());
        MapSnapshot::of(&self.tilemap).with_activators(activators)
    }

    fn record_snapshot(&mut self) {
        let snapshot = self.snapshot();
        self.history.record(snapshot);
    }

    /// Record only if the map moved away from the current history entry
    fn record_if_changed(&mut self) {
        if *self.history.current() != self.snapshot() {
            self.record_snapshot();
        }
    }

    fn reindex(&mut self) {
        let file_id = self.file_id();
        self.index
            .rebuild(&self.tilemap, &self.activators, file_id, &self.catalog);
        self.index_dirty = false;
    }

    fn refresh_index(&mut self) {
        if self.index_dirty {
            self.reindex();
        }
    }

    /// Give every placed activator a metadata record
    fn ensure_metadata(&mut self) {
        let file_id = self.file_id();
        let missing: Vec<(ActivatorCategory, u32, GridPos)> = ActivatorCategory::all()
            .into_iter()
            .filter(|category| category.plural().is_some())
            .flat_map(|category| {
                self.index
                    .entries(category)
                    .filter(|entry| entry.record.is_none())
                    .filter_map(move |entry| entry.id.map(|id| (category, id, entry.pos)))
            })
            .collect();
        if missing.is_empty() {
            return;
        }

        for (category, id, pos) in &missing {
            if let Some(kind) = category.default_kind() {
                self.activators.insert(
                    file_id,
                    *category,
                    cavern_map_core::ActivatorRecord::new(*id, *pos, kind),
                );
            }
        }
        bevy::log::debug!("Created {} default activator records", missing.len());
        self.reindex();
    }

    fn finish_stroke(&mut self) {
        let stroke = std::mem::take(&mut self.pointer.stroke);
        if let Some(before) = stroke.before {
            if before != self.snapshot() {
                self.record_snapshot();
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::project::tests::{seed_maps, temp_world};
    use crate::project::{ACTIVATORS_FILE, ENVIRONMENTS_FILE};
    use cavern_map_core::{ActivatorStore, Tile};

    pub(crate) fn session_in(dir: &std::path::Path) -> EditSession {
        EditSession::open(dir, SessionConfig::default()).unwrap()
    }

    /// Screen point at the center of a grid cell under the current layout
    pub(crate) fn screen_of(session: &EditSession, cell: GridPos) -> Vec2 {
        let size = session.tilemap().tile_size as f64;
        session.camera.world_to_screen(
            &session.layout(),
            [
                cell.x as f64 * size + size / 2.0,
                cell.y as f64 * size + size / 2.0,
            ],
        )
    }

    pub(crate) fn click(session: &mut EditSession, cell: GridPos, button: PointerButton) {
        let at = screen_of(session, cell);
        session.process(&[
            EditorEvent::MouseMove(at.x, at.y),
            EditorEvent::MouseDown(button),
            EditorEvent::MouseUp(button),
        ]);
    }

    pub(crate) fn press(session: &mut EditSession, key: EditorKey) {
        session.process(&[EditorEvent::KeyDown(key), EditorEvent::KeyUp(key)]);
    }

    pub(crate) fn ctrl(session: &mut EditSession, c: char) {
        session.process(&[
            EditorEvent::KeyDown(EditorKey::Control),
            EditorEvent::KeyDown(EditorKey::Char(c)),
            EditorEvent::KeyUp(EditorKey::Char(c)),
            EditorEvent::KeyUp(EditorKey::Control),
        ]);
    }

    pub(crate) fn type_text(session: &mut EditSession, text: &str) {
        for c in text.chars() {
            press(session, EditorKey::Char(c));
        }
    }

    fn replace_field(session: &mut EditSession, field: &str, value: &str) {
        session.edit_field(field);
        while !session.properties().edited_value().is_empty() {
            press(session, EditorKey::Backspace);
        }
        type_text(session, value);
        press(session, EditorKey::Enter);
    }

    #[test]
    fn test_place_then_undo_and_redo() {
        let dir = temp_world();
        let mut session = session_in(&dir);
        session.set_brush("stone", 0);

        click(&mut session, GridPos::new(3, 5), PointerButton::Left);
        let placed = session.tilemap().get(GridPos::new(3, 5)).cloned();
        assert_eq!(placed.as_ref().map(|t| t.kind.as_str()), Some("stone"));
        assert_eq!(session.history().len(), 2);

        ctrl(&mut session, 'w');
        assert!(session.tilemap().get(GridPos::new(3, 5)).is_none());
        assert_eq!(session.history().index(), 0);

        ctrl(&mut session, 'y');
        assert_eq!(session.tilemap().get(GridPos::new(3, 5)).cloned(), placed);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_drag_stroke_is_one_snapshot() {
        let dir = temp_world();
        let mut session = session_in(&dir);
        session.set_brush("stone", 0);

        let mut events = Vec::new();
        for (i, x) in (0..5).enumerate() {
            let at = screen_of(&session, GridPos::new(x, 0));
            events.push(EditorEvent::MouseMove(at.x, at.y));
            if i == 0 {
                events.push(EditorEvent::MouseDown(PointerButton::Left));
            }
        }
        events.push(EditorEvent::MouseUp(PointerButton::Left));
        session.process(&events);

        assert_eq!(session.tilemap().tiles.len(), 5);
        assert_eq!(session.history().len(), 2);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_lever_ids_stay_unique() {
        let dir = temp_world();
        let mut session = session_in(&dir);

        // A door with id 1 for door_id to reference
        session.set_brush("vines_door_h", 0);
        click(&mut session, GridPos::new(6, 6), PointerButton::Left);
        assert!(matches!(session.mode(), EditMode::DoorIdPrompt(_)));
        press(&mut session, EditorKey::Backspace);
        type_text(&mut session, "1");
        press(&mut session, EditorKey::Enter);
        assert_eq!(session.tilemap().get(GridPos::new(6, 6)).unwrap().id, Some(1));

        session.set_brush("green_cave_lever", 0);
        click(&mut session, GridPos::new(2, 2), PointerButton::Left);
        assert!(session.properties().is_open());
        replace_field(&mut session, "id", "7");
        session.select_activator_type("visual_and_door");
        replace_field(&mut session, "visual_duration", "30");
        replace_field(&mut session, "door_id", "1");
        assert_eq!(session.status().map(|s| s.is_error), Some(false));
        press(&mut session, EditorKey::Escape);
        assert!(!session.properties().is_open());

        click(&mut session, GridPos::new(4, 2), PointerButton::Left);
        replace_field(&mut session, "id", "7");
        assert_eq!(session.properties().edited_field(), Some("id"));
        assert!(session.status().unwrap().is_error);

        while !session.properties().edited_value().is_empty() {
            press(&mut session, EditorKey::Backspace);
        }
        type_text(&mut session, "8");
        press(&mut session, EditorKey::Enter);
        assert!(!session.properties().is_editing());

        let file_id = session.file_id();
        let store = session.activators();
        let seven = store.get(file_id, ActivatorCategory::Levers, 7).unwrap();
        assert_eq!(
            seven.kind.get("visual_duration"),
            Some(cavern_map_core::FieldValue::Int(30))
        );
        assert_eq!(seven.kind.get("door_id"), Some(cavern_map_core::FieldValue::Int(1)));
        assert!(store.get(file_id, ActivatorCategory::Levers, 8).is_some());
        assert!(store.get(file_id, ActivatorCategory::Levers, 0).is_none());
        assert_eq!(session.tilemap().get(GridPos::new(4, 2)).unwrap().id, Some(8));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_pick_transition_destination_in_other_map() {
        let dir = temp_world();
        seed_maps(&dir, &[0, 1, 2]);
        let mut session = session_in(&dir);
        let portal = GridPos::new(10, 10);

        session.set_brush("transition", 0);
        click(&mut session, portal, PointerButton::Left);
        press(&mut session, EditorKey::Char('i'));
        click(&mut session, portal, PointerButton::Left);
        assert!(session.properties().is_open());
        replace_field(&mut session, "destination", "2");
        assert_eq!(session.tilemap().get(portal).unwrap().destination, Some(2));
        let before_pick = session.history().len();

        // Press on the dest_pos row inside the popup, then the field reacts
        let popup = session.layout().popup_rect().unwrap().center();
        session.process(&[
            EditorEvent::MouseMove(popup.x, popup.y),
            EditorEvent::MouseDown(PointerButton::Left),
        ]);
        session.edit_field("dest_pos");
        assert!(session.is_picking());
        assert_eq!(session.level(), 2);
        assert!(!session.properties().is_open());
        assert!(!session.layout().chrome_visible());

        // Releasing the click that started picking does nothing
        session.process(&[EditorEvent::MouseUp(PointerButton::Left)]);
        assert!(session.is_picking());

        click(&mut session, GridPos::new(4, 6), PointerButton::Left);
        assert!(!session.is_picking());
        assert_eq!(session.level(), 0);
        let tile = session.tilemap().get(portal).unwrap();
        assert_eq!(tile.dest_pos, Some(GridPos::new(4, 6)));
        assert_eq!(tile.destination, Some(2));
        assert_eq!(session.history().len(), before_pick + 1);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_autotile_square() {
        let dir = temp_world();
        let mut session = session_in(&dir);
        session.set_brush("stone", 0);
        for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            click(&mut session, GridPos::new(x, y), PointerButton::Left);
        }
        press(&mut session, EditorKey::Char('t'));

        let variant = |x, y| session.tilemap().get(GridPos::new(x, y)).unwrap().variant;
        assert_eq!(variant(0, 0), 0);
        assert_eq!(variant(1, 0), 2);
        assert_eq!(variant(0, 1), 6);
        assert_eq!(variant(1, 1), 4);
        assert_eq!(session.history().len(), 6);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_compaction_from_session() {
        let dir = temp_world();
        seed_maps(&dir, &[5, 9]);
        let mut portal_map = Tilemap::default();
        let mut portal = Tile::transition(GridPos::new(10, 10));
        portal.destination = Some(9);
        portal_map.place(GridPos::new(10, 10), portal);
        portal_map.save(&dir.join("maps/0.json")).unwrap();
        std::fs::write(
            dir.join(ENVIRONMENTS_FILE),
            r#"{"green_cave": [0, 5], "blue_cave": [9]}"#,
        )
        .unwrap();

        let mut session = session_in(&dir);
        press(&mut session, EditorKey::Char('o'));
        assert_eq!(session.registry().active_maps(), &[0, 1, 2]);
        assert_eq!(
            session.tilemap().get(GridPos::new(10, 10)).unwrap().destination,
            Some(2)
        );
        assert_eq!(session.registry().environment_of_level(2), "blue_cave");
        assert!(dir.join("maps/2.json").exists());
        assert!(!dir.join("maps/9.json").exists());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_delete_last_map_self_heals() {
        let dir = temp_world();
        let mut session = session_in(&dir);
        session.set_brush("stone", 0);
        click(&mut session, GridPos::new(1, 1), PointerButton::Left);

        session.delete_current_map();
        assert_eq!(session.registry().active_maps(), &[1]);
        assert_eq!(session.level(), 0);
        assert!(dir.join("maps/1.json").exists());
        assert!(session.tilemap().is_empty());
        assert_eq!(session.history().len(), 1);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_error_popup_blocks_map_clicks() {
        let dir = temp_world();
        let mut session = session_in(&dir);
        session.set_brush("stone", 0);
        session.set_error_popup(true);
        let center = session.layout().popup_rect().unwrap().center();
        let cell = session
            .camera
            .screen_to_grid(&session.layout(), center, session.tilemap().tile_size);
        session.process(&[
            EditorEvent::MouseMove(center.x, center.y),
            EditorEvent::MouseDown(PointerButton::Left),
            EditorEvent::MouseUp(PointerButton::Left),
        ]);
        assert!(session.tilemap().get(cell).is_none());

        session.set_error_popup(false);
        assert!(session.layout().popup_rect().is_none());
        click(&mut session, cell, PointerButton::Left);
        assert!(session.tilemap().get(cell).is_some());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_erasing_activator_releases_id_and_metadata() {
        let dir = temp_world();
        let mut session = session_in(&dir);
        session.set_brush("green_cave_button", 0);
        click(&mut session, GridPos::new(3, 3), PointerButton::Left);
        press(&mut session, EditorKey::Escape);
        let file_id = session.file_id();
        assert!(session
            .activators()
            .get(file_id, ActivatorCategory::Buttons, 0)
            .is_some());

        click(&mut session, GridPos::new(3, 3), PointerButton::Right);
        assert!(session.tilemap().get(GridPos::new(3, 3)).is_none());
        assert!(!session.index().has_id(ActivatorCategory::Buttons, 0));
        assert!(session
            .activators()
            .get(file_id, ActivatorCategory::Buttons, 0)
            .is_none());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_undo_erase_brings_back_configured_record() {
        let dir = temp_world();
        let mut session = session_in(&dir);
        session.set_brush("green_cave_teleporter", 0);
        click(&mut session, GridPos::new(2, 3), PointerButton::Left);
        replace_field(&mut session, "time", "45");
        press(&mut session, EditorKey::Escape);
        let file_id = session.file_id();
        let time = |session: &EditSession| {
            session
                .activators()
                .get(file_id, ActivatorCategory::Teleporters, 0)
                .and_then(|record| record.kind.get("time"))
        };
        assert_eq!(time(&session), Some(cavern_map_core::FieldValue::Int(45)));

        click(&mut session, GridPos::new(2, 3), PointerButton::Right);
        assert_eq!(time(&session), None);

        ctrl(&mut session, 'w');
        assert_eq!(session.tilemap().get(GridPos::new(2, 3)).unwrap().id, Some(0));
        assert_eq!(time(&session), Some(cavern_map_core::FieldValue::Int(45)));

        ctrl(&mut session, 'y');
        assert!(session.tilemap().get(GridPos::new(2, 3)).is_none());
        assert_eq!(time(&session), None);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_undo_id_change_rekeys_record() {
        let dir = temp_world();
        let mut session = session_in(&dir);
        session.set_brush("green_cave_lever", 0);
        click(&mut session, GridPos::new(2, 2), PointerButton::Left);
        replace_field(&mut session, "id", "7");
        press(&mut session, EditorKey::Escape);
        let file_id = session.file_id();
        let has = |session: &EditSession, id: u32| {
            session
                .activators()
                .get(file_id, ActivatorCategory::Levers, id)
                .is_some()
        };
        assert!(has(&session, 7) && !has(&session, 0));

        ctrl(&mut session, 'w');
        assert_eq!(session.tilemap().get(GridPos::new(2, 2)).unwrap().id, Some(0));
        assert!(has(&session, 0));
        assert!(!has(&session, 7));

        ctrl(&mut session, 'y');
        assert_eq!(session.tilemap().get(GridPos::new(2, 2)).unwrap().id, Some(7));
        assert!(has(&session, 7) && !has(&session, 0));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_metadata_commit_is_undoable() {
        let dir = temp_world();
        let mut session = session_in(&dir);
        session.set_brush("green_cave_lever", 0);
        click(&mut session, GridPos::new(2, 2), PointerButton::Left);
        assert_eq!(session.history().len(), 2);

        replace_field(&mut session, "visual_duration", "30");
        assert_eq!(session.history().len(), 3);
        press(&mut session, EditorKey::Escape);

        ctrl(&mut session, 'w');
        let file_id = session.file_id();
        let record = session
            .activators()
            .get(file_id, ActivatorCategory::Levers, 0)
            .unwrap();
        assert_eq!(
            record.kind.get("visual_duration"),
            Some(cavern_map_core::FieldValue::Empty)
        );
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_door_prompt_rejects_used_id() {
        let dir = temp_world();
        let mut session = session_in(&dir);
        session.set_brush("vines_door_v", 0);
        click(&mut session, GridPos::new(1, 1), PointerButton::Left);
        press(&mut session, EditorKey::Enter);
        assert_eq!(session.tilemap().get(GridPos::new(1, 1)).unwrap().id, Some(0));

        click(&mut session, GridPos::new(5, 1), PointerButton::Left);
        // Pre-filled with the next free id
        match session.mode() {
            EditMode::DoorIdPrompt(prompt) => assert_eq!(prompt.buffer, "1"),
            other => panic!("expected door prompt, got {:?}", other),
        }
        press(&mut session, EditorKey::Backspace);
        type_text(&mut session, "0");
        press(&mut session, EditorKey::Enter);
        assert!(matches!(session.mode(), EditMode::DoorIdPrompt(_)));
        assert!(session.tilemap().get(GridPos::new(5, 1)).is_none());

        press(&mut session, EditorKey::Escape);
        assert!(matches!(session.mode(), EditMode::Drawing));
        assert!(session.tilemap().get(GridPos::new(5, 1)).is_none());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_offgrid_place_and_erase() {
        let dir = temp_world();
        let mut session = session_in(&dir);
        session.set_brush("mushroom", 1);
        press(&mut session, EditorKey::Char('g'));
        assert!(session.offgrid());

        session.process(&[
            EditorEvent::MouseMove(37.5, 21.2),
            EditorEvent::MouseDown(PointerButton::Left),
            EditorEvent::MouseUp(PointerButton::Left),
        ]);
        assert!(session.tilemap().tiles.is_empty());
        assert_eq!(session.tilemap().offgrid.len(), 1);
        assert_eq!(session.tilemap().offgrid[0].pos, [37.0, 21.0]);

        session.process(&[
            EditorEvent::MouseMove(40.0, 25.0),
            EditorEvent::MouseDown(PointerButton::Right),
            EditorEvent::MouseUp(PointerButton::Right),
        ]);
        assert!(session.tilemap().offgrid.is_empty());
        assert_eq!(session.history().len(), 3);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_wheel_routes_by_region() {
        let dir = temp_world();
        seed_maps(&dir, &(0..20).collect::<Vec<_>>());
        let mut session = session_in(&dir);
        session.set_brush("stone", 0);

        let main = session.layout().main_rect().center();
        session.process(&[
            EditorEvent::MouseMove(main.x, main.y),
            EditorEvent::MouseWheel(1.0),
        ]);
        assert_eq!(session.brush().variant, 1);
        session.process(&[EditorEvent::MouseWheel(-1.0), EditorEvent::MouseWheel(-1.0)]);
        assert_eq!(session.brush().variant, 8);

        let list = session.layout().map_list_rect().unwrap().center();
        session.process(&[
            EditorEvent::MouseMove(list.x, list.y),
            EditorEvent::KeyDown(EditorKey::Shift),
            EditorEvent::MouseWheel(-1.0),
        ]);
        assert_eq!(session.map_list.first, 1);
        assert_eq!(session.brush().variant, 8);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_levels_wrap_and_save() {
        let dir = temp_world();
        seed_maps(&dir, &[0, 1, 2]);
        let mut session = session_in(&dir);
        session.set_brush("stone", 0);
        click(&mut session, GridPos::new(0, 0), PointerButton::Left);

        press(&mut session, EditorKey::Left);
        assert_eq!(session.level(), 2);
        press(&mut session, EditorKey::Right);
        assert_eq!(session.level(), 0);
        // The edit survived the round trip through the file
        assert!(session.tilemap().get(GridPos::new(0, 0)).is_some());
        assert_eq!(session.history().len(), 1);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_zoom_and_pan_keys() {
        let dir = temp_world();
        let mut session = session_in(&dir);
        press(&mut session, EditorKey::Down);
        assert_eq!(session.camera.zoom, 2.0);
        press(&mut session, EditorKey::Up);
        press(&mut session, EditorKey::Up);
        assert_eq!(session.camera.zoom, 0.5);

        let start = session.camera.scroll;
        session.process(&[EditorEvent::KeyDown(EditorKey::Char('d'))]);
        session.process(&[]);
        session.process(&[EditorEvent::KeyUp(EditorKey::Char('d'))]);
        assert_eq!(session.camera.scroll[0], start[0] + 2.0 * input::PAN_SPEED);
        assert_eq!(session.camera.scroll[1], start[1]);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_create_map_through_environment_picker() {
        let dir = temp_world();
        let mut session = session_in(&dir);
        session.begin_create_map();
        assert!(session.layout().popup_rect().is_some());
        session.create_map("blue_cave");
        assert!(matches!(session.mode(), EditMode::Drawing));
        assert_eq!(session.level(), 1);
        assert_eq!(session.environment(), "blue_cave");
        // Brush follows the environment's palette
        assert_eq!(session.brush().kind, "ice");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_quit_saves_everything() {
        let dir = temp_world();
        let mut session = session_in(&dir);
        session.set_brush("green_cave_teleporter", 0);
        click(&mut session, GridPos::new(2, 3), PointerButton::Left);
        session.process(&[EditorEvent::Quit]);
        assert_eq!(session.exit_code(), Some(0));

        let saved = Tilemap::load(&dir.join("maps/0.json")).unwrap();
        assert_eq!(saved.get(GridPos::new(2, 3)).unwrap().id, Some(0));
        let store = ActivatorStore::load(&dir.join(ACTIVATORS_FILE)).unwrap();
        assert!(store.get(0, ActivatorCategory::Teleporters, 0).is_some());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_quick_transition_needs_main_view() {
        let dir = temp_world();
        let mut session = session_in(&dir);
        let at = screen_of(&session, GridPos::new(2, 2));
        session.process(&[
            EditorEvent::MouseMove(at.x, at.y),
            EditorEvent::KeyDown(EditorKey::Char('p')),
        ]);
        assert!(session.tilemap().get(GridPos::new(2, 2)).unwrap().is_transition());

        let sidebar = session.layout().sidebar_rect().unwrap().center();
        session.process(&[
            EditorEvent::MouseMove(sidebar.x, sidebar.y),
            EditorEvent::KeyDown(EditorKey::Char('p')),
        ]);
        assert!(session.status().unwrap().is_error);
        assert_eq!(session.tilemap().tiles.len(), 1);
        std::fs::remove_dir_all(&dir).ok();
    }
}
