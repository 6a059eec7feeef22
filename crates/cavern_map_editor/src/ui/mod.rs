//! Editor UI components using bevy_egui
//!
//! Panels only read the session while drawing and return the actions the user
//! took; the actions are applied once the frame's UI is built.

mod dialogs;
mod property_editor;
mod sidebar;
mod theme;
mod underbar;

pub use dialogs::{render_door_prompt, render_environment_picker, render_error_dialog};
pub use property_editor::render_property_editor;
pub use sidebar::render_sidebar;
pub use theme::EditorTheme;
pub use underbar::render_underbar;

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};
use cavern_map_core::{ActivatorCategory, GridPos};
use std::path::PathBuf;

use crate::preferences::EditorPreferences;
use crate::render::{paint_main_view, SpriteTextureCache};
use crate::session::{EditMode, EditSession, SessionConfig};
use crate::tools::viewport::{SIDEBAR_WIDTH, UNDERBAR_HEIGHT};

/// Main UI plugin
pub struct EditorUiPlugin;

impl Plugin for EditorUiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<UiState>().add_systems(
            EguiPrimaryContextPass,
            render_ui.run_if(resource_exists::<EditSession>),
        );
    }
}

/// UI state that is not part of the edit session
#[derive(Resource, Default)]
pub struct UiState {
    /// Blocking error, shown until dismissed
    pub error_message: Option<String>,
}

/// Actions that can be triggered from panels and popups
#[derive(Debug, Clone, PartialEq)]
pub enum PendingAction {
    SelectLevel(usize),
    NewMap,
    CreateMap(String),
    DeleteMap,
    Compact,
    SetBrush(String, u32),
    ToggleGrid,
    ToggleOffgrid,
    ToggleEditProperties,
    Autotile,
    SetFocus(ActivatorCategory),
    OpenCard(ActivatorCategory, GridPos),
    EditField(&'static str),
    CommitField,
    SelectType(&'static str),
    CloseProperties,
    CommitDoor,
    CancelModal,
    /// Pick a data folder with the native file dialog
    OpenDataFolder,
    OpenRecent(PathBuf),
}

/// Main UI rendering system
fn render_ui(
    mut contexts: EguiContexts,
    mut ui_state: ResMut<UiState>,
    mut session: ResMut<EditSession>,
    mut preferences: ResMut<EditorPreferences>,
    mut cache: ResMut<SpriteTextureCache>,
) {
    let Ok(ctx) = contexts.ctx_mut() else { return };

    EditorTheme::apply(ctx);

    let mut actions: Vec<PendingAction> = Vec::new();
    session.set_error_popup(ui_state.error_message.is_some());
    let layout = session.layout();

    if layout.chrome_visible() {
        egui::SidePanel::right("sidebar")
            .resizable(false)
            .exact_width(SIDEBAR_WIDTH)
            .show(ctx, |ui| {
                actions.extend(render_sidebar(ui, &session, &preferences));
            });

        egui::TopBottomPanel::bottom("underbar")
            .resizable(false)
            .exact_height(UNDERBAR_HEIGHT)
            .show(ctx, |ui| {
                actions.extend(render_underbar(ui, &session));
            });
    }

    paint_main_view(ctx, &session, &cache);

    if let Some(rect) = layout.popup_rect() {
        let rect = egui::Rect::from_min_max(
            egui::pos2(rect.min.x, rect.min.y),
            egui::pos2(rect.max.x, rect.max.y),
        );
        if ui_state.error_message.is_some() {
            render_error_dialog(ctx, rect, &mut ui_state);
        } else {
            match session.mode() {
                EditMode::SelectingEnvironment => {
                    actions.extend(render_environment_picker(ctx, rect, session.catalog()));
                }
                EditMode::DoorIdPrompt(prompt) => {
                    actions.extend(render_door_prompt(ctx, rect, prompt));
                }
                _ => actions.extend(render_property_editor(ctx, rect, session.properties())),
            }
        }
    }

    for action in actions {
        apply_action(
            action,
            &mut session,
            &mut ui_state,
            &mut preferences,
            &mut cache,
        );
    }
    session.set_error_popup(ui_state.error_message.is_some());
}

fn apply_action(
    action: PendingAction,
    session: &mut EditSession,
    ui_state: &mut UiState,
    preferences: &mut EditorPreferences,
    cache: &mut SpriteTextureCache,
) {
    match action {
        PendingAction::SelectLevel(level) => session.select_level(level),
        PendingAction::NewMap => session.begin_create_map(),
        PendingAction::CreateMap(environment) => session.create_map(&environment),
        PendingAction::DeleteMap => session.delete_current_map(),
        PendingAction::Compact => session.compact_world(),
        PendingAction::SetBrush(kind, variant) => session.set_brush(&kind, variant),
        PendingAction::ToggleGrid => {
            session.show_grid = !session.show_grid;
            preferences.show_grid = session.show_grid;
        }
        PendingAction::ToggleOffgrid => session.toggle_offgrid(),
        PendingAction::ToggleEditProperties => session.toggle_edit_properties(),
        PendingAction::Autotile => session.autotile(),
        PendingAction::SetFocus(category) => session.set_focus(category),
        PendingAction::OpenCard(category, pos) => session.open_card(category, pos),
        PendingAction::EditField(name) => session.edit_field(name),
        PendingAction::CommitField => session.commit_field(),
        PendingAction::SelectType(name) => session.select_activator_type(name),
        PendingAction::CloseProperties => session.close_properties(),
        PendingAction::CommitDoor => session.commit_door_prompt(),
        PendingAction::CancelModal => session.cancel_modal(),
        PendingAction::OpenDataFolder => {
            #[cfg(feature = "native")]
            {
                if let Some(path) = rfd::FileDialog::new()
                    .set_directory(session.registry().data_dir())
                    .pick_folder()
                {
                    switch_data_dir(path, session, ui_state, preferences, cache);
                }
            }
        }
        PendingAction::OpenRecent(path) => {
            switch_data_dir(path, session, ui_state, preferences, cache)
        }
    }
}

/// Save the open world and replace the session with one on `path`. The old
/// session stays if the new directory cannot be opened.
fn switch_data_dir(
    path: PathBuf,
    session: &mut EditSession,
    ui_state: &mut UiState,
    preferences: &mut EditorPreferences,
    cache: &mut SpriteTextureCache,
) {
    if let Err(e) = session.save_current() {
        ui_state.error_message = Some(format!("Failed to save before switching: {}", e));
        return;
    }

    let config = SessionConfig {
        zoom: session.camera.zoom,
        show_grid: session.show_grid,
        pan_keys: preferences.pan_keys,
    };
    match EditSession::open(&path, config) {
        Ok(opened) => {
            info!("Opened data directory {:?}", path);
            *session = opened;
            *cache = SpriteTextureCache::default();
            preferences.add_recent_data_dir(&path);
        }
        Err(e) => {
            ui_state.error_message = Some(format!("Failed to open {}: {}", path.display(), e));
            preferences.remove_recent_data_dir(&path);
        }
    }
    if let Err(e) = preferences.save() {
        error!("Failed to save preferences: {}", e);
    }
}
