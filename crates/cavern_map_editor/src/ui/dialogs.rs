//! Modal popups: environment picker, door id prompt and the error dialog

use bevy_egui::egui;

use super::{EditorTheme, PendingAction, UiState};
use crate::catalog::AssetCatalog;
use crate::session::DoorPrompt;

fn popup(title: &str, rect: egui::Rect) -> egui::Window<'_> {
    egui::Window::new(title)
        .collapsible(false)
        .resizable(false)
        .frame(EditorTheme::popup_frame())
        .fixed_pos(rect.min)
        .fixed_size(rect.size())
}

/// Environment list for a new map
pub fn render_environment_picker(
    ctx: &egui::Context,
    rect: egui::Rect,
    catalog: &AssetCatalog,
) -> Vec<PendingAction> {
    let mut actions = Vec::new();
    popup("New map", rect).show(ctx, |ui| {
        ui.label("Environment of the new map:");
        ui.add_space(4.0);
        for name in catalog.environment_names() {
            if ui
                .add_sized([ui.available_width(), 22.0], egui::Button::new(name))
                .clicked()
            {
                actions.push(PendingAction::CreateMap(name.to_string()));
            }
        }
        ui.separator();
        if ui.button("Cancel").clicked() {
            actions.push(PendingAction::CancelModal);
        }
    });
    actions
}

/// Door id entry before a door is placed
pub fn render_door_prompt(
    ctx: &egui::Context,
    rect: egui::Rect,
    prompt: &DoorPrompt,
) -> Vec<PendingAction> {
    let mut actions = Vec::new();
    popup("Door id", rect).show(ctx, |ui| {
        ui.label(format!("{} at {}", prompt.kind, prompt.pos.key()));
        ui.add_space(4.0);
        ui.label(
            egui::RichText::new(format!("{}_", prompt.buffer))
                .heading()
                .color(EditorTheme::ACCENT),
        );
        ui.colored_label(EditorTheme::TEXT_MUTED, "Type digits, Enter to place");
        ui.separator();
        ui.horizontal(|ui| {
            if ui.button("Place").clicked() {
                actions.push(PendingAction::CommitDoor);
            }
            if ui.button("Cancel").clicked() {
                actions.push(PendingAction::CancelModal);
            }
        });
    });
    actions
}

/// Blocking error in the popup area, shown until dismissed
pub fn render_error_dialog(ctx: &egui::Context, rect: egui::Rect, ui_state: &mut UiState) {
    let Some(error_msg) = ui_state.error_message.clone() else {
        return;
    };

    popup("Error", rect).show(ctx, |ui| {
        ui.colored_label(EditorTheme::ERROR, &error_msg);
        ui.separator();
        if ui.button("OK").clicked() {
            ui_state.error_message = None;
        }
    });
}
