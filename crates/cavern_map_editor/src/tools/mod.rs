//! Input adapter: physical Bevy input to editor events
//!
//! Collects one frame of window input, hands it to the session and turns the
//! session's exit request into an `AppExit`.

pub mod viewport;

use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::input::keyboard::{Key, KeyboardInput};
use bevy::input::mouse::{MouseButtonInput, MouseScrollUnit, MouseWheel};
use bevy::input::ButtonState;
use bevy::prelude::*;
use bevy::window::{CursorMoved, PrimaryWindow, WindowCloseRequested};

use crate::session::{EditSession, EditorEvent, EditorKey, PointerButton};

/// Pixels of a pixel-unit scroll that count as one wheel notch
const PIXELS_PER_LINE: f32 = 20.0;

/// Plugin for viewport input
pub struct EditorToolsPlugin;

impl Plugin for EditorToolsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (collect_input_events, apply_session_exit)
                .chain()
                .run_if(resource_exists::<EditSession>),
        );
    }
}

/// Map a physical key to an editor key, ignoring everything else
pub fn editor_key(key_code: KeyCode, logical: &Key) -> Option<EditorKey> {
    let key = match key_code {
        KeyCode::ArrowLeft => EditorKey::Left,
        KeyCode::ArrowRight => EditorKey::Right,
        KeyCode::ArrowUp => EditorKey::Up,
        KeyCode::ArrowDown => EditorKey::Down,
        KeyCode::Backspace => EditorKey::Backspace,
        KeyCode::Enter | KeyCode::NumpadEnter => EditorKey::Enter,
        KeyCode::Escape => EditorKey::Escape,
        KeyCode::ControlLeft | KeyCode::ControlRight => EditorKey::Control,
        KeyCode::ShiftLeft | KeyCode::ShiftRight => EditorKey::Shift,
        _ => match logical {
            Key::Character(text) => {
                let c = text.chars().next()?;
                EditorKey::Char(c.to_ascii_lowercase())
            }
            _ => return None,
        },
    };
    Some(key)
}

fn pointer_button(button: MouseButton) -> Option<PointerButton> {
    match button {
        MouseButton::Left => Some(PointerButton::Left),
        MouseButton::Right => Some(PointerButton::Right),
        MouseButton::Middle => Some(PointerButton::Middle),
        _ => None,
    }
}

/// Wheel delta in notches, positive up
fn wheel_delta(event: &MouseWheel) -> f32 {
    match event.unit {
        MouseScrollUnit::Line => event.y,
        MouseScrollUnit::Pixel => event.y / PIXELS_PER_LINE,
    }
}

fn collect_input_events(
    mut session: ResMut<EditSession>,
    window_query: Query<&Window, With<PrimaryWindow>>,
    mut last_size: Local<Option<Vec2>>,
    mut cursor_events: MessageReader<CursorMoved>,
    mut button_events: MessageReader<MouseButtonInput>,
    mut wheel_events: MessageReader<MouseWheel>,
    mut key_events: MessageReader<KeyboardInput>,
    mut close_events: MessageReader<WindowCloseRequested>,
) {
    let mut events = Vec::new();

    if let Ok(window) = window_query.single() {
        let size = Vec2::new(window.width(), window.height());
        if *last_size != Some(size) {
            *last_size = Some(size);
            events.push(EditorEvent::Resize(size.x, size.y));
        }
    }

    for event in cursor_events.read() {
        events.push(EditorEvent::MouseMove(event.position.x, event.position.y));
    }

    for event in button_events.read() {
        let Some(button) = pointer_button(event.button) else {
            continue;
        };
        events.push(match event.state {
            ButtonState::Pressed => EditorEvent::MouseDown(button),
            ButtonState::Released => EditorEvent::MouseUp(button),
        });
    }

    for event in wheel_events.read() {
        let dy = wheel_delta(event);
        if dy != 0.0 {
            events.push(EditorEvent::MouseWheel(dy));
        }
    }

    for event in key_events.read() {
        let Some(key) = editor_key(event.key_code, &event.logical_key) else {
            continue;
        };
        match event.state {
            // Held pan keys are tracked by the session; repeats would retype digits
            ButtonState::Pressed if event.repeat => {}
            ButtonState::Pressed => events.push(EditorEvent::KeyDown(key)),
            ButtonState::Released => events.push(EditorEvent::KeyUp(key)),
        }
    }

    if close_events.read().next().is_some() {
        events.push(EditorEvent::Quit);
    }

    session.process(&events);
}

/// Exit the app once the session has saved and asked to quit
fn apply_session_exit(session: Res<EditSession>, mut exit: MessageWriter<AppExit>) {
    match session.exit_code() {
        Some(0) => {
            exit.write(AppExit::Success);
        }
        Some(code) => {
            exit.write(AppExit::from_code(code));
        }
        None => {}
    }
}
