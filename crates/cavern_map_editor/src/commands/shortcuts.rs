//! Keyboard shortcut table

use super::EditorAction;
use crate::session::EditorKey;

/// Action bound to a key press, given whether Control is held
pub fn shortcut_for(key: EditorKey, ctrl: bool) -> Option<EditorAction> {
    if ctrl {
        return match key {
            // Ctrl+W - Undo
            EditorKey::Char('w') => Some(EditorAction::Undo),
            // Ctrl+Y - Redo
            EditorKey::Char('y') => Some(EditorAction::Redo),
            _ => None,
        };
    }

    match key {
        EditorKey::Left => Some(EditorAction::PreviousLevel),
        EditorKey::Right => Some(EditorAction::NextLevel),
        EditorKey::Up => Some(EditorAction::ZoomOut),
        EditorKey::Down => Some(EditorAction::ZoomIn),
        EditorKey::Char('g') => Some(EditorAction::ToggleOffgrid),
        EditorKey::Char('t') => Some(EditorAction::Autotile),
        EditorKey::Char('i') => Some(EditorAction::ToggleEditProperties),
        EditorKey::Char('p') => Some(EditorAction::QuickTransition),
        EditorKey::Char('o') => Some(EditorAction::Compact),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_chords() {
        assert_eq!(shortcut_for(EditorKey::Char('w'), true), Some(EditorAction::Undo));
        assert_eq!(shortcut_for(EditorKey::Char('y'), true), Some(EditorAction::Redo));
        assert_eq!(shortcut_for(EditorKey::Char('t'), true), None);
        // Plain w is a pan key, not undo
        assert_eq!(shortcut_for(EditorKey::Char('w'), false), None);
    }

    #[test]
    fn test_plain_keys() {
        assert_eq!(shortcut_for(EditorKey::Up, false), Some(EditorAction::ZoomOut));
        assert_eq!(shortcut_for(EditorKey::Down, false), Some(EditorAction::ZoomIn));
        assert_eq!(shortcut_for(EditorKey::Char('o'), false), Some(EditorAction::Compact));
        assert_eq!(shortcut_for(EditorKey::Enter, false), None);
    }
}
