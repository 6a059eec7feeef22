//! Editor theme and styling for egui
//!
//! A dark, low-contrast palette so the map stays the brightest thing on screen.

use bevy_egui::egui::{self, Color32, CornerRadius, FontFamily, FontId, Stroke, TextStyle, Visuals};

pub struct EditorTheme;

impl EditorTheme {
    pub const BG_WINDOW: Color32 = Color32::from_rgb(28, 27, 33);
    pub const BG_PANEL: Color32 = Color32::from_rgb(38, 36, 44);
    pub const BG_WIDGET: Color32 = Color32::from_rgb(54, 51, 62);
    pub const BG_HOVER: Color32 = Color32::from_rgb(70, 66, 80);
    pub const BORDER: Color32 = Color32::from_rgb(72, 69, 80);

    /// Moss green, used for the current map, brush and card
    pub const ACCENT: Color32 = Color32::from_rgb(96, 150, 88);

    pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(196, 192, 204);
    pub const TEXT_MUTED: Color32 = Color32::from_rgb(140, 136, 150);

    pub const ERROR: Color32 = Color32::from_rgb(214, 98, 90);
    pub const WARNING: Color32 = Color32::from_rgb(220, 176, 70);

    /// Apply the editor theme to the egui context
    pub fn apply(ctx: &egui::Context) {
        let mut style = (*ctx.style()).clone();
        let mut visuals = Visuals::dark();

        visuals.window_fill = Self::BG_WINDOW;
        visuals.panel_fill = Self::BG_PANEL;
        visuals.extreme_bg_color = Self::BG_WINDOW;
        visuals.window_shadow = egui::Shadow::NONE;
        visuals.popup_shadow = egui::Shadow::NONE;

        for widget in [
            &mut visuals.widgets.noninteractive,
            &mut visuals.widgets.inactive,
        ] {
            widget.bg_fill = Self::BG_WIDGET;
            widget.weak_bg_fill = Self::BG_WIDGET;
            widget.bg_stroke = Stroke::new(1.0, Self::BORDER);
            widget.fg_stroke = Stroke::new(1.0, Self::TEXT_PRIMARY);
            widget.corner_radius = CornerRadius::same(3);
        }
        visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, Self::TEXT_MUTED);

        visuals.widgets.hovered.bg_fill = Self::BG_HOVER;
        visuals.widgets.hovered.weak_bg_fill = Self::BG_HOVER;
        visuals.widgets.hovered.corner_radius = CornerRadius::same(3);
        visuals.widgets.active.bg_fill = Self::ACCENT;
        visuals.widgets.active.weak_bg_fill = Self::ACCENT;
        visuals.widgets.active.fg_stroke = Stroke::new(1.5, Color32::WHITE);
        visuals.widgets.active.corner_radius = CornerRadius::same(3);

        visuals.selection.bg_fill = Self::ACCENT;
        visuals.selection.stroke = Stroke::new(1.0, Color32::WHITE);
        visuals.warn_fg_color = Self::WARNING;
        visuals.error_fg_color = Self::ERROR;
        visuals.window_corner_radius = CornerRadius::same(4);

        style.spacing.item_spacing = egui::vec2(4.0, 2.0);
        style.spacing.button_padding = egui::vec2(6.0, 2.0);
        style
            .text_styles
            .insert(TextStyle::Body, FontId::new(12.0, FontFamily::Monospace));
        style
            .text_styles
            .insert(TextStyle::Button, FontId::new(12.0, FontFamily::Monospace));
        style
            .text_styles
            .insert(TextStyle::Heading, FontId::new(14.0, FontFamily::Monospace));

        style.visuals = visuals;
        ctx.set_style(style);
    }

    /// Color of a status line
    pub fn status_color(is_error: bool) -> Color32 {
        if is_error {
            Self::ERROR
        } else {
            Self::TEXT_PRIMARY
        }
    }

    /// Frame for the modal popups over the main view
    pub fn popup_frame() -> egui::Frame {
        egui::Frame {
            fill: Self::BG_WINDOW,
            inner_margin: egui::Margin::same(8),
            outer_margin: egui::Margin::ZERO,
            stroke: Stroke::new(1.0, Self::ACCENT),
            corner_radius: CornerRadius::same(4),
            shadow: egui::Shadow::NONE,
        }
    }
}
