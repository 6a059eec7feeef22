//! Editor commands: undo history and keyboard shortcuts

pub mod history;
mod shortcuts;

pub use history::{History, MapSnapshot, MAX_HISTORY};
pub use shortcuts::shortcut_for;

/// Map-local actions bound to shortcuts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    PreviousLevel,
    NextLevel,
    ZoomOut,
    ZoomIn,
    ToggleOffgrid,
    Autotile,
    ToggleEditProperties,
    QuickTransition,
    Compact,
    Undo,
    Redo,
}
