//! Property editor popup for activators and transitions
//!
//! Typing goes through the session's key handling, so the form only shows the
//! buffer; clicking a value starts editing it.

use bevy_egui::egui;

use super::{EditorTheme, PendingAction};
use crate::properties::{PropertyEditor, PropertyTarget};

pub fn render_property_editor(
    ctx: &egui::Context,
    rect: egui::Rect,
    editor: &PropertyEditor,
) -> Vec<PendingAction> {
    let mut actions = Vec::new();
    let Some(target) = editor.target() else {
        return actions;
    };

    egui::Window::new("Properties")
        .title_bar(false)
        .collapsible(false)
        .resizable(false)
        .frame(EditorTheme::popup_frame())
        .fixed_pos(rect.min)
        .fixed_size(rect.size())
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(format!("{} {}", target.category(), target.pos().key()));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.small_button("x").clicked() {
                        actions.push(PendingAction::CloseProperties);
                    }
                });
            });
            ui.separator();

            egui::Grid::new("property_rows")
                .num_columns(2)
                .spacing([12.0, 4.0])
                .striped(true)
                .show(ui, |ui| {
                    for row in editor.rows() {
                        ui.label(row.name);
                        if row.name == "type" {
                            if let PropertyTarget::Activator { category, .. } = target {
                                egui::ComboBox::from_id_salt("activator_type")
                                    .selected_text(&row.value)
                                    .show_ui(ui, |ui| {
                                        for kind in category.kinds() {
                                            let selected = *kind == row.value;
                                            if ui.selectable_label(selected, *kind).clicked()
                                                && !selected
                                            {
                                                actions.push(PendingAction::SelectType(*kind));
                                            }
                                        }
                                    });
                            }
                        } else if editor.edited_field() == Some(row.name) {
                            ui.horizontal(|ui| {
                                let text = egui::RichText::new(format!("{}_", editor.edited_value()))
                                    .color(EditorTheme::ACCENT);
                                ui.label(text);
                                if ui.small_button("ok").clicked() {
                                    actions.push(PendingAction::CommitField);
                                }
                            });
                        } else if row.editable {
                            let label = if row.name == "dest_pos" {
                                format!("{} (pick)", row.value)
                            } else if row.value.is_empty() {
                                "-".to_string()
                            } else {
                                row.value.clone()
                            };
                            if ui.button(label).clicked() {
                                actions.push(PendingAction::EditField(row.name));
                            }
                        } else {
                            ui.colored_label(EditorTheme::TEXT_MUTED, &row.value);
                        }
                        ui.end_row();
                    }
                });

            ui.add_space(6.0);
            ui.colored_label(
                EditorTheme::TEXT_MUTED,
                "Enter commits, Escape cancels the field or closes",
            );
        });
    actions
}
