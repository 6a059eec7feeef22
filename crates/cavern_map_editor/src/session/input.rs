//! Event routing: keyboard priority and pointer regions

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use super::{EditMode, EditSession, EditorEvent, EditorKey, PointerButton};
use crate::commands::{shortcut_for, EditorAction};
use crate::properties::push_digit;
use crate::tools::viewport::Region;

/// Camera movement per frame while a pan key is held, in world pixels
pub const PAN_SPEED: f64 = 8.0;

/// Character keys that pan the camera
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanKeys {
    pub left: char,
    pub right: char,
    pub up: char,
    pub down: char,
}

impl Default for PanKeys {
    fn default() -> Self {
        Self {
            left: 'a',
            right: 'd',
            up: 'w',
            down: 's',
        }
    }
}

impl PanKeys {
    pub fn contains(&self, c: char) -> bool {
        [self.left, self.right, self.up, self.down].contains(&c)
    }

    /// Unit direction of one key, y down
    fn direction(&self, c: char) -> (f64, f64) {
        if c == self.left {
            (-1.0, 0.0)
        } else if c == self.right {
            (1.0, 0.0)
        } else if c == self.up {
            (0.0, -1.0)
        } else if c == self.down {
            (0.0, 1.0)
        } else {
            (0.0, 0.0)
        }
    }
}

impl EditSession {
    pub(super) fn handle_event(&mut self, event: EditorEvent) {
        match event {
            EditorEvent::KeyDown(key) => self.handle_key_down(key),
            EditorEvent::KeyUp(key) => self.handle_key_up(key),
            EditorEvent::MouseMove(x, y) => self.handle_mouse_move(Vec2::new(x, y)),
            EditorEvent::MouseDown(button) => self.handle_mouse_down(button),
            EditorEvent::MouseUp(button) => self.handle_mouse_up(button),
            EditorEvent::MouseWheel(dy) => self.handle_wheel(dy),
            EditorEvent::Resize(width, height) => {
                self.window = Vec2::new(width, height);
            }
            EditorEvent::Quit => self.quit(),
        }
    }

    /// Keys go to the first taker: modal prompts, destination picking, the
    /// field being typed into, then pan keys and shortcuts.
    fn handle_key_down(&mut self, key: EditorKey) {
        match key {
            EditorKey::Control => {
                self.keys.ctrl = true;
                return;
            }
            // Modifies nothing; Shift+wheel is the plain wheel
            EditorKey::Shift => return,
            _ => {}
        }

        match &mut self.mode {
            EditMode::DoorIdPrompt(prompt) => {
                match key {
                    EditorKey::Char(c) => {
                        push_digit(&mut prompt.buffer, c);
                    }
                    EditorKey::Backspace => {
                        prompt.buffer.pop();
                    }
                    EditorKey::Enter => self.commit_door_prompt(),
                    EditorKey::Escape => self.cancel_modal(),
                    _ => {}
                }
                return;
            }
            EditMode::SelectingEnvironment => {
                if key == EditorKey::Escape {
                    self.cancel_modal();
                }
                return;
            }
            EditMode::PickingDestination(_) => {
                if key == EditorKey::Escape {
                    self.cancel_picking();
                }
                return;
            }
            EditMode::Drawing | EditMode::EditProperties => {}
        }

        if self.properties.is_editing() {
            match key {
                EditorKey::Char(c) => self.properties.input_char(c),
                EditorKey::Backspace => self.properties.backspace(),
                EditorKey::Enter => self.commit_field(),
                EditorKey::Escape => self.properties.cancel_edit(),
                _ => {}
            }
            return;
        }
        if key == EditorKey::Escape && self.properties.is_open() {
            self.properties.close();
            return;
        }

        if let EditorKey::Char(c) = key {
            if !self.keys.ctrl && self.pan_keys.contains(c) {
                self.keys.held.insert(c);
                return;
            }
        }
        if let Some(action) = shortcut_for(key, self.keys.ctrl) {
            self.run_action(action);
        }
    }

    fn handle_key_up(&mut self, key: EditorKey) {
        match key {
            EditorKey::Control => self.keys.ctrl = false,
            EditorKey::Char(c) => {
                self.keys.held.remove(&c);
            }
            _ => {}
        }
    }

    fn run_action(&mut self, action: EditorAction) {
        bevy::log::debug!("Action {:?}", action);
        let count = self.registry.len();
        match action {
            EditorAction::PreviousLevel => self.select_level((self.level + count - 1) % count),
            EditorAction::NextLevel => self.select_level((self.level + 1) % count),
            EditorAction::ZoomOut => self.camera.zoom_by(0.5),
            EditorAction::ZoomIn => self.camera.zoom_by(2.0),
            EditorAction::ToggleOffgrid => self.toggle_offgrid(),
            EditorAction::Autotile => self.autotile(),
            EditorAction::ToggleEditProperties => self.toggle_edit_properties(),
            EditorAction::QuickTransition => self.quick_transition(),
            EditorAction::Compact => self.compact_world(),
            EditorAction::Undo => self.undo(),
            EditorAction::Redo => self.redo(),
        }
    }

    /// Move the camera for every pan key still held
    pub(super) fn apply_pan(&mut self) {
        let (dx, dy) = self
            .keys
            .held
            .iter()
            .map(|c| self.pan_keys.direction(*c))
            .fold((0.0, 0.0), |(x, y), (dx, dy)| (x + dx, y + dy));
        if dx != 0.0 || dy != 0.0 {
            self.camera.pan(dx * PAN_SPEED, dy * PAN_SPEED);
        }
    }

    fn region(&self) -> Region {
        self.layout().hit_test(self.pointer.pos)
    }

    fn handle_mouse_move(&mut self, pos: Vec2) {
        self.pointer.pos = pos;
        let stroke = &self.pointer.stroke;
        let Some(button) = stroke.button else {
            return;
        };
        if stroke.ended || self.region() != Region::Main {
            return;
        }
        let cell = self.hovered_cell();
        if stroke.last_cell == Some(cell) {
            return;
        }
        self.pointer.stroke.last_cell = Some(cell);
        self.continue_stroke(button, cell);
    }

    fn handle_mouse_down(&mut self, button: PointerButton) {
        match button {
            PointerButton::Left => self.pointer.left = true,
            PointerButton::Right => self.pointer.right = true,
            PointerButton::Middle => return,
        }
        // A click and release inside one frame closes the previous stroke first
        if self.pointer.stroke.ended {
            self.finish_stroke();
        }
        // Everything outside the main view belongs to the egui panels
        if self.region() != Region::Main {
            return;
        }

        match &self.mode {
            EditMode::PickingDestination(origin) => {
                if button == PointerButton::Left && !origin.awaiting_release {
                    let cell = self.hovered_cell();
                    self.finish_picking(cell);
                }
                return;
            }
            EditMode::DoorIdPrompt(_) | EditMode::SelectingEnvironment => return,
            EditMode::Drawing | EditMode::EditProperties => {}
        }

        if matches!(self.mode, EditMode::EditProperties) {
            if button == PointerButton::Left {
                let cell = self.hovered_cell();
                if !self.open_properties_at(cell) {
                    self.properties.close();
                }
            }
            return;
        }

        if self.properties.is_open() {
            self.properties.close();
            return;
        }
        self.draw_press(button);
    }

    fn handle_mouse_up(&mut self, button: PointerButton) {
        match button {
            PointerButton::Left => self.pointer.left = false,
            PointerButton::Right => self.pointer.right = false,
            PointerButton::Middle => return,
        }
        if let EditMode::PickingDestination(origin) = &mut self.mode {
            origin.awaiting_release = false;
            return;
        }
        if self.pointer.stroke.button == Some(button) {
            self.pointer.stroke.ended = true;
        }
    }

    /// Shift+wheel behaves exactly like the plain wheel
    fn handle_wheel(&mut self, dy: f32) {
        match self.region() {
            Region::MapList | Region::Sidebar => {
                self.map_list.scroll(dy, self.registry.len());
            }
            Region::Main if matches!(self.mode, EditMode::Drawing) => {
                let count = self.catalog.variant_count(&self.brush.kind);
                if dy > 0.0 {
                    self.brush.variant = (self.brush.variant + 1) % count;
                } else if dy < 0.0 {
                    self.brush.variant = (self.brush.variant + count - 1) % count;
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pan_key_directions() {
        let keys = PanKeys::default();
        assert!(keys.contains('w'));
        assert!(!keys.contains('t'));
        assert_eq!(keys.direction('a'), (-1.0, 0.0));
        assert_eq!(keys.direction('s'), (0.0, 1.0));
    }
}
