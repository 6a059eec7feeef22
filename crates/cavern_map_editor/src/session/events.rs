//! Semantic input events consumed by the edit session
//!
//! The frontend translates physical input into these; the session never
//! sees key codes or window handles.

/// Mouse buttons the editor reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
}

/// Keys the editor reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorKey {
    Left,
    Right,
    Up,
    Down,
    /// A printable character, lowercased
    Char(char),
    Backspace,
    Enter,
    Escape,
    Control,
    Shift,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditorEvent {
    KeyDown(EditorKey),
    KeyUp(EditorKey),
    /// Pointer position in logical window pixels
    MouseMove(f32, f32),
    MouseDown(PointerButton),
    MouseUp(PointerButton),
    /// Positive scrolls up
    MouseWheel(f32),
    /// New logical window size
    Resize(f32, f32),
    Quit,
}
