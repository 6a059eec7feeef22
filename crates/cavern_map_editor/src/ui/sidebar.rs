//! Sidebar: map list, map management, brush palette and toggles

use bevy_egui::egui;

use super::{EditorTheme, PendingAction};
use crate::preferences::EditorPreferences;
use crate::session::{EditMode, EditSession};
use crate::tools::viewport::{MAP_LIST_TOP, MAP_ROW_HEIGHT};

/// Render the sidebar and return what was clicked
pub fn render_sidebar(
    ui: &mut egui::Ui,
    session: &EditSession,
    preferences: &EditorPreferences,
) -> Vec<PendingAction> {
    let mut actions = Vec::new();

    ui.allocate_ui(egui::vec2(ui.available_width(), MAP_LIST_TOP - 4.0), |ui| {
        ui.heading("Maps");
    });
    render_map_list(ui, session, &mut actions);

    ui.horizontal(|ui| {
        if ui.button("New").clicked() {
            actions.push(PendingAction::NewMap);
        }
        if ui
            .button("Delete")
            .on_hover_text("Remove this map from the list; its file is dropped on compaction")
            .clicked()
        {
            actions.push(PendingAction::DeleteMap);
        }
        if ui
            .button("Compact")
            .on_hover_text("Renumber map files densely (o)")
            .clicked()
        {
            actions.push(PendingAction::Compact);
        }
    });
    ui.separator();

    ui.label(format!("Brush ({})", session.environment()));
    render_palette(ui, session, &mut actions);
    ui.separator();

    ui.horizontal_wrapped(|ui| {
        if ui.selectable_label(session.show_grid, "Grid").clicked() {
            actions.push(PendingAction::ToggleGrid);
        }
        if ui.selectable_label(session.offgrid(), "Off-grid (g)").clicked() {
            actions.push(PendingAction::ToggleOffgrid);
        }
        let inspecting = matches!(session.mode(), EditMode::EditProperties);
        if ui.selectable_label(inspecting, "Properties (i)").clicked() {
            actions.push(PendingAction::ToggleEditProperties);
        }
        if ui.button("Autotile (t)").clicked() {
            actions.push(PendingAction::Autotile);
        }
    });
    ui.separator();

    render_data_folder(ui, session, preferences, &mut actions);
    actions
}

/// Rows of the visible slice of the map list
fn render_map_list(ui: &mut egui::Ui, session: &EditSession, actions: &mut Vec<PendingAction>) {
    let registry = session.registry();
    let total = registry.len();
    for level in session.map_list.visible(total) {
        let file_id = registry.file_id(level).unwrap_or_default();
        let label = format!("{:>3}  {}", file_id, registry.environment_of_level(level));
        let response = ui.add_sized(
            [ui.available_width(), MAP_ROW_HEIGHT - 2.0],
            egui::Button::new(label).selected(level == session.level()),
        );
        if response.clicked() {
            actions.push(PendingAction::SelectLevel(level));
        }
    }
    let first = session.map_list.first;
    let shown = session.map_list.visible(total).len();
    if shown < total {
        ui.colored_label(
            EditorTheme::TEXT_MUTED,
            format!("{}-{} of {}", first + 1, first + shown, total),
        );
    }
}

fn render_palette(ui: &mut egui::Ui, session: &EditSession, actions: &mut Vec<PendingAction>) {
    let brush = session.brush();
    let catalog = session.catalog();

    egui::ScrollArea::vertical()
        .id_salt("brush_palette")
        .max_height(ui.available_height() * 0.5)
        .show(ui, |ui| {
            for family in catalog.palette(session.environment()) {
                let selected = family.name == brush.kind;
                let label = if family.variants > 1 {
                    format!("{} [{}]", family.name, family.variants)
                } else {
                    family.name.clone()
                };
                if ui.selectable_label(selected, label).clicked() && !selected {
                    actions.push(PendingAction::SetBrush(family.name.clone(), 0));
                }
            }
        });

    let count = catalog.variant_count(&brush.kind);
    if count > 1 {
        ui.horizontal_wrapped(|ui| {
            for variant in 0..count {
                let selected = variant == brush.variant;
                if ui.selectable_label(selected, variant.to_string()).clicked() {
                    actions.push(PendingAction::SetBrush(brush.kind.clone(), variant));
                }
            }
        });
    }
}

fn render_data_folder(
    ui: &mut egui::Ui,
    session: &EditSession,
    preferences: &EditorPreferences,
    actions: &mut Vec<PendingAction>,
) {
    egui::CollapsingHeader::new("Data folder")
        .default_open(false)
        .show(ui, |ui| {
            ui.colored_label(
                EditorTheme::TEXT_MUTED,
                session.registry().data_dir().display().to_string(),
            );
            #[cfg(feature = "native")]
            if ui.button("Open...").clicked() {
                actions.push(PendingAction::OpenDataFolder);
            }
            let current = session.registry().data_dir();
            for path in preferences
                .recent_data_dirs
                .iter()
                .filter(|p| p.as_path() != current)
            {
                if ui.link(path.display().to_string()).clicked() {
                    actions.push(PendingAction::OpenRecent(path.clone()));
                }
            }
        });
}
