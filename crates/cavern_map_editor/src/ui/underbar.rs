//! Underbar: activator cards of the focused category and the status line

use bevy_egui::egui;
use cavern_map_core::ActivatorCategory;

use super::{EditorTheme, PendingAction};
use crate::activators::IndexedActivator;
use crate::session::{EditMode, EditSession};

const CARD_SIZE: egui::Vec2 = egui::vec2(96.0, 44.0);

/// Text of one activator card
pub fn card_label(entry: &IndexedActivator) -> String {
    match (entry.id, entry.destination) {
        (Some(id), _) => format!("#{} {}\n{}", id, entry.tile_type, entry.pos.key()),
        (None, Some(destination)) => format!("to map {}\n{}", destination, entry.pos.key()),
        (None, None) => format!("{}\n{}", entry.tile_type, entry.pos.key()),
    }
}

fn mode_label(session: &EditSession) -> String {
    let mode = match session.mode() {
        EditMode::Drawing => "draw",
        EditMode::EditProperties => "properties",
        EditMode::PickingDestination(_) => "pick destination",
        EditMode::SelectingEnvironment => "new map",
        EditMode::DoorIdPrompt(_) => "door id",
    };
    let brush = session.brush();
    format!(
        "map {} | {} | {}:{}{} | zoom {:.2} | undo {}/{}",
        session.file_id(),
        mode,
        brush.kind,
        brush.variant,
        if session.offgrid() { " off-grid" } else { "" },
        session.camera.zoom,
        session.history().index(),
        session.history().len().saturating_sub(1),
    )
}

/// Render the underbar and return what was clicked
pub fn render_underbar(ui: &mut egui::Ui, session: &EditSession) -> Vec<PendingAction> {
    let mut actions = Vec::new();
    let index = session.index();

    ui.horizontal(|ui| {
        for category in ActivatorCategory::all() {
            let label = format!("{} ({})", category, index.len(category));
            if ui
                .selectable_label(session.focus == category, label)
                .clicked()
            {
                actions.push(PendingAction::SetFocus(category));
            }
        }
        ui.separator();
        ui.colored_label(EditorTheme::TEXT_MUTED, mode_label(session));
    });

    let open = session.properties().target().map(|t| t.pos());
    egui::ScrollArea::horizontal()
        .id_salt("activator_cards")
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                let entries: Vec<_> = index.entries(session.focus).collect();
                if entries.is_empty() {
                    ui.colored_label(
                        EditorTheme::TEXT_MUTED,
                        format!("No {} on this map", session.focus.display_name()),
                    );
                }
                for entry in entries {
                    let button = egui::Button::new(card_label(entry))
                        .min_size(CARD_SIZE)
                        .selected(open == Some(entry.pos));
                    if ui.add(button).clicked() {
                        actions.push(PendingAction::OpenCard(session.focus, entry.pos));
                    }
                }
            });
        });

    if let Some(status) = session.status() {
        ui.colored_label(EditorTheme::status_color(status.is_error), &status.text);
    }
    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use cavern_map_core::GridPos;

    fn entry(id: Option<u32>, destination: Option<u32>) -> IndexedActivator {
        IndexedActivator {
            tile_type: "green_cave_lever".into(),
            pos: GridPos::new(2, 5),
            id,
            record: None,
            destination,
            dest_pos: None,
        }
    }

    #[test]
    fn test_card_labels() {
        assert_eq!(card_label(&entry(Some(3), None)), "#3 green_cave_lever\n2;5");
        assert_eq!(card_label(&entry(None, Some(7))), "to map 7\n2;5");
    }
}
