//! Screen layout, region hit-testing and the map camera
//!
//! The window is split into a main view, a sidebar on the right (map list on
//! top, brush palette below) and an underbar at the bottom of the main view.
//! Modal popups sit centered over the main view. The map is drawn to a
//! virtual surface of `VIRTUAL_SIZE` that is stretched over the main view.

use bevy::math::{Rect, Vec2};
use cavern_map_core::GridPos;
use std::ops::Range;

/// Sidebar width in logical pixels
pub const SIDEBAR_WIDTH: f32 = 200.0;
/// Underbar height in logical pixels
pub const UNDERBAR_HEIGHT: f32 = 120.0;
/// Size of the virtual map surface
pub const VIRTUAL_SIZE: Vec2 = Vec2::new(480.0, 288.0);
/// Offset of the map list below the sidebar heading
pub const MAP_LIST_TOP: f32 = 32.0;
/// Number of map list rows shown at once
pub const MAP_LIST_ROWS: usize = 8;
pub const MAP_ROW_HEIGHT: f32 = 22.0;
/// Preferred popup size; shrunk to fit small main views
pub const POPUP_SIZE: Vec2 = Vec2::new(320.0, 260.0);

pub const MIN_ZOOM: f64 = 0.25;
pub const MAX_ZOOM: f64 = 8.0;

/// Regions a pointer position can fall in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Main,
    Sidebar,
    /// The scrollable map list at the top of the sidebar
    MapList,
    Underbar,
    /// Active modal popup
    Popup,
    Outside,
}

/// Region tree for the current window size and UI state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewLayout {
    window: Vec2,
    chrome: bool,
    popup: bool,
}

impl ViewLayout {
    /// Layout with sidebar and underbar visible and no popup
    pub fn new(window: Vec2) -> Self {
        Self {
            window: window.max(Vec2::ONE),
            chrome: true,
            popup: false,
        }
    }

    /// Smallest window the editor is designed for
    pub fn min_window() -> Vec2 {
        VIRTUAL_SIZE + Vec2::new(SIDEBAR_WIDTH, UNDERBAR_HEIGHT)
    }

    /// Show or hide the sidebar and underbar
    pub fn with_chrome(mut self, visible: bool) -> Self {
        self.chrome = visible;
        self
    }

    /// Show or hide the modal popup region
    pub fn with_popup(mut self, visible: bool) -> Self {
        self.popup = visible;
        self
    }

    pub fn window(&self) -> Vec2 {
        self.window
    }

    pub fn chrome_visible(&self) -> bool {
        self.chrome
    }

    pub fn main_rect(&self) -> Rect {
        if self.chrome {
            Rect::new(
                0.0,
                0.0,
                (self.window.x - SIDEBAR_WIDTH).max(1.0),
                (self.window.y - UNDERBAR_HEIGHT).max(1.0),
            )
        } else {
            Rect::new(0.0, 0.0, self.window.x, self.window.y)
        }
    }

    pub fn sidebar_rect(&self) -> Option<Rect> {
        self.chrome.then(|| {
            Rect::new(
                self.main_rect().max.x,
                0.0,
                self.window.x,
                self.window.y,
            )
        })
    }

    pub fn map_list_rect(&self) -> Option<Rect> {
        self.sidebar_rect().map(|sidebar| {
            let top = sidebar.min.y + MAP_LIST_TOP;
            Rect::new(
                sidebar.min.x,
                top,
                sidebar.max.x,
                (top + MAP_LIST_ROWS as f32 * MAP_ROW_HEIGHT).min(sidebar.max.y),
            )
        })
    }

    pub fn underbar_rect(&self) -> Option<Rect> {
        self.chrome.then(|| {
            let main = self.main_rect();
            Rect::new(0.0, main.max.y, main.max.x, self.window.y)
        })
    }

    pub fn popup_rect(&self) -> Option<Rect> {
        self.popup.then(|| {
            let main = self.main_rect();
            Rect::from_center_size(main.center(), POPUP_SIZE.min(main.size()))
        })
    }

    /// Innermost region containing `point`
    pub fn hit_test(&self, point: Vec2) -> Region {
        let inside = |rect: Option<Rect>| rect.is_some_and(|r| r.contains(point));

        if inside(self.popup_rect()) {
            Region::Popup
        } else if inside(self.map_list_rect()) {
            Region::MapList
        } else if inside(self.sidebar_rect()) {
            Region::Sidebar
        } else if inside(self.underbar_rect()) {
            Region::Underbar
        } else if self.main_rect().contains(point) {
            Region::Main
        } else {
            Region::Outside
        }
    }

    /// Scale from the virtual surface to the main view, per axis
    pub fn render_scale(&self) -> Vec2 {
        self.main_rect().size() / VIRTUAL_SIZE
    }
}

/// Camera over the map: scroll offset in world pixels plus zoom
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewCamera {
    /// World pixel shown at the top-left corner of the main view
    pub scroll: [f64; 2],
    pub zoom: f64,
}

impl Default for ViewCamera {
    fn default() -> Self {
        Self {
            scroll: [0.0, 0.0],
            zoom: 1.0,
        }
    }
}

impl ViewCamera {
    pub fn with_zoom(zoom: f64) -> Self {
        Self {
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            ..Self::default()
        }
    }

    /// `world = (screen - main.min) / (render_scale * zoom) + scroll`
    pub fn screen_to_world(&self, layout: &ViewLayout, point: Vec2) -> [f64; 2] {
        let local = point - layout.main_rect().min;
        let scale = layout.render_scale();
        [
            local.x as f64 / (scale.x as f64 * self.zoom) + self.scroll[0],
            local.y as f64 / (scale.y as f64 * self.zoom) + self.scroll[1],
        ]
    }

    pub fn world_to_screen(&self, layout: &ViewLayout, world: [f64; 2]) -> Vec2 {
        let scale = layout.render_scale();
        let origin = layout.main_rect().min;
        Vec2::new(
            ((world[0] - self.scroll[0]) * scale.x as f64 * self.zoom) as f32 + origin.x,
            ((world[1] - self.scroll[1]) * scale.y as f64 * self.zoom) as f32 + origin.y,
        )
    }

    /// Grid cell under a screen point
    pub fn screen_to_grid(&self, layout: &ViewLayout, point: Vec2, tile_size: u32) -> GridPos {
        GridPos::from_pixels(self.screen_to_world(layout, point), tile_size)
    }

    /// World-space extent of the main view
    pub fn visible_world_size(&self) -> [f64; 2] {
        [
            VIRTUAL_SIZE.x as f64 / self.zoom,
            VIRTUAL_SIZE.y as f64 / self.zoom,
        ]
    }

    /// Center the view on a world pixel position
    pub fn move_visual_to(&mut self, world: [f64; 2]) {
        let visible = self.visible_world_size();
        self.scroll = [world[0] - visible[0] / 2.0, world[1] - visible[1] / 2.0];
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.scroll[0] += dx;
        self.scroll[1] += dy;
    }

    /// Zoom by a factor, keeping the view center fixed
    pub fn zoom_by(&mut self, factor: f64) {
        let visible = self.visible_world_size();
        let center = [
            self.scroll[0] + visible[0] / 2.0,
            self.scroll[1] + visible[1] / 2.0,
        ];
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        self.move_visual_to(center);
    }
}

/// Scroll window over the map list; rows outside it are clipped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapListView {
    pub first: usize,
}

impl MapListView {
    fn max_first(total: usize) -> usize {
        total.saturating_sub(MAP_LIST_ROWS)
    }

    /// Scroll by wheel delta; positive moves toward the top of the list
    pub fn scroll(&mut self, dy: f32, total: usize) {
        if dy > 0.0 {
            self.first = self.first.saturating_sub(1);
        } else if dy < 0.0 {
            self.first = (self.first + 1).min(Self::max_first(total));
        }
    }

    /// Rows currently shown
    pub fn visible(&self, total: usize) -> Range<usize> {
        let first = self.first.min(Self::max_first(total));
        first..(first + MAP_LIST_ROWS).min(total)
    }

    /// Scroll just enough to show `row`
    pub fn ensure_visible(&mut self, row: usize, total: usize) {
        if row < self.first {
            self.first = row;
        } else if row >= self.first + MAP_LIST_ROWS {
            self.first = row + 1 - MAP_LIST_ROWS;
        }
        self.first = self.first.min(Self::max_first(total));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> ViewLayout {
        ViewLayout::new(ViewLayout::min_window())
    }

    #[test]
    fn test_hit_test_regions() {
        let layout = layout();
        assert_eq!(layout.hit_test(Vec2::new(10.0, 10.0)), Region::Main);
        assert_eq!(layout.hit_test(Vec2::new(500.0, 5.0)), Region::Sidebar);
        assert_eq!(layout.hit_test(Vec2::new(500.0, 40.0)), Region::MapList);
        assert_eq!(layout.hit_test(Vec2::new(500.0, 390.0)), Region::Sidebar);
        assert_eq!(layout.hit_test(Vec2::new(100.0, 300.0)), Region::Underbar);
        assert_eq!(layout.hit_test(Vec2::new(-5.0, 10.0)), Region::Outside);

        let modal = layout.with_popup(true);
        assert_eq!(modal.hit_test(Vec2::new(240.0, 144.0)), Region::Popup);
        assert_eq!(modal.hit_test(Vec2::new(2.0, 2.0)), Region::Main);
    }

    #[test]
    fn test_hidden_chrome_gives_main_everything() {
        let layout = layout().with_chrome(false);
        assert_eq!(layout.hit_test(Vec2::new(500.0, 40.0)), Region::Main);
        assert_eq!(layout.hit_test(Vec2::new(100.0, 300.0)), Region::Main);
        assert!(layout.sidebar_rect().is_none());
    }

    #[test]
    fn test_screen_to_grid() {
        let layout = layout();
        assert_eq!(layout.render_scale(), Vec2::ONE);
        let mut camera = ViewCamera::default();
        assert_eq!(
            camera.screen_to_grid(&layout, Vec2::new(56.0, 88.0), 16),
            GridPos::new(3, 5)
        );

        camera.zoom = 2.0;
        camera.scroll = [16.0, 0.0];
        assert_eq!(
            camera.screen_to_grid(&layout, Vec2::new(56.0, 88.0), 16),
            GridPos::new(2, 2)
        );

        // Main view twice the virtual surface
        let big = ViewLayout::new(Vec2::new(
            2.0 * VIRTUAL_SIZE.x + SIDEBAR_WIDTH,
            2.0 * VIRTUAL_SIZE.y + UNDERBAR_HEIGHT,
        ));
        assert_eq!(big.render_scale(), Vec2::new(2.0, 2.0));
        assert_eq!(
            ViewCamera::default().screen_to_grid(&big, Vec2::new(112.0, 176.0), 16),
            GridPos::new(3, 5)
        );
    }

    #[test]
    fn test_world_screen_inverse() {
        let layout = ViewLayout::new(Vec2::new(1280.0, 720.0));
        let camera = ViewCamera {
            scroll: [40.0, -12.0],
            zoom: 0.5,
        };
        let screen = camera.world_to_screen(&layout, [100.0, 64.0]);
        let world = camera.screen_to_world(&layout, screen);
        assert!((world[0] - 100.0).abs() < 1e-3);
        assert!((world[1] - 64.0).abs() < 1e-3);
    }

    #[test]
    fn test_move_visual_to_centers() {
        let mut camera = ViewCamera::default();
        camera.move_visual_to([400.0, 300.0]);
        assert_eq!(camera.scroll, [160.0, 156.0]);
        camera.zoom_by(2.0);
        assert_eq!(camera.zoom, 2.0);
        let visible = camera.visible_world_size();
        assert_eq!(camera.scroll[0] + visible[0] / 2.0, 400.0);
    }

    #[test]
    fn test_map_list_clips_and_scrolls() {
        let mut list = MapListView::default();
        assert_eq!(list.visible(3), 0..3);
        assert_eq!(list.visible(20), 0..MAP_LIST_ROWS);
        list.scroll(-1.0, 20);
        list.scroll(-1.0, 20);
        assert_eq!(list.visible(20), 2..MAP_LIST_ROWS + 2);
        list.scroll(1.0, 20);
        assert_eq!(list.first, 1);
        list.ensure_visible(19, 20);
        assert_eq!(list.visible(20), 12..20);
        list.scroll(-1.0, 20);
        assert_eq!(list.first, 12);
    }
}
