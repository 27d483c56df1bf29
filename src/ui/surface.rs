//! Paged widget surface
//!
//! Lays widget views out on an N×M page grid with wallpaper-style fractional
//! scrolling, and overlays the move/resize handle for the interactive
//! session. Handle state is purely visual: nothing here touches persistence,
//! the manager commits geometry changes when a drag ends.

use crate::core::{WidgetId, WidgetView};
use log::debug;

/// Move/resize affordance overlaid on a placed widget.
///
/// A placed widget carries exactly one handle, so move and resize modes are
/// mutually exclusive by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Handle {
    #[default]
    None,
    MoveFree,
    MoveAxial,
    ResizeDiagonal,
    ResizeAxial,
}

impl Handle {
    pub fn is_move(self) -> bool {
        matches!(self, Handle::MoveFree | Handle::MoveAxial)
    }

    pub fn is_resize(self) -> bool {
        matches!(self, Handle::ResizeDiagonal | Handle::ResizeAxial)
    }
}

/// Result of a finished drag, handed to the manager for the commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragCommit {
    pub widget_id: WidgetId,
    pub width: i32,
    pub height: i32,
    pub moved: bool,
    pub resized: bool,
}

#[derive(Debug, Clone, Copy)]
struct DragState {
    start_x: i32,
    start_y: i32,
    start_width: i32,
    start_height: i32,
    acc_dx: i32,
    acc_dy: i32,
}

/// One widget view placed on the surface.
#[derive(Debug)]
pub struct PlacedWidget {
    pub view: WidgetView,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub min_width: i32,
    pub min_height: i32,
    handle: Handle,
    click_behavior: bool,
    drag: Option<DragState>,
}

impl PlacedWidget {
    pub fn widget_id(&self) -> WidgetId {
        self.view.widget_id
    }
}

/// Multi-page container for widget views.
#[derive(Debug)]
pub struct PagedSurface {
    pages_x: u32,
    pages_y: u32,
    /// Pixel size of one page; unknown until the first layout pass.
    viewport: Option<(i32, i32)>,
    /// Fractional page position, clamped to `[0, page count]`.
    page: (f32, f32),
    views: Vec<PlacedWidget>,
}

impl PagedSurface {
    pub fn new(pages_x: u32, pages_y: u32) -> Self {
        Self {
            pages_x,
            pages_y,
            viewport: None,
            page: (0.0, 0.0),
            views: Vec::new(),
        }
    }

    pub fn set_page_count(&mut self, pages_x: u32, pages_y: u32) {
        self.pages_x = pages_x;
        self.pages_y = pages_y;
        let (px, py) = self.page;
        self.page = (self.clamp_page_x(px), self.clamp_page_y(py));
    }

    pub fn horizontal_page_count(&self) -> u32 {
        self.pages_x
    }

    pub fn vertical_page_count(&self) -> u32 {
        self.pages_y
    }

    /// Record the measured page size. Any scroll requested before the first
    /// layout pass becomes effective here.
    pub fn set_viewport(&mut self, width: i32, height: i32) {
        self.viewport = Some((width, height));
    }

    fn clamp_page_x(&self, page: f32) -> f32 {
        page.clamp(0.0, self.pages_x as f32)
    }

    fn clamp_page_y(&self, page: f32) -> f32 {
        page.clamp(0.0, self.pages_y as f32)
    }

    /// Scroll to a fractional page position. Safe to call before the first
    /// layout pass: the fractional target is kept and mapped to pixels once
    /// the viewport is known.
    pub fn scroll_to_page(&mut self, page_x: f32, page_y: f32) {
        self.page = (self.clamp_page_x(page_x), self.clamp_page_y(page_y));
    }

    pub fn page_position(&self) -> (f32, f32) {
        self.page
    }

    /// Physical scroll offset, once a layout pass has happened.
    pub fn scroll_px(&self) -> Option<(i32, i32)> {
        let (w, h) = self.viewport?;
        Some((
            (self.page.0 * w as f32) as i32,
            (self.page.1 * h as f32) as i32,
        ))
    }

    /// Append a view sized per its record. Views stack in a vertical flow;
    /// a later move drag gives them a free position.
    pub fn add_view(
        &mut self,
        view: WidgetView,
        width: i32,
        height: i32,
        min_width: i32,
        min_height: i32,
    ) {
        let y = self
            .views
            .iter()
            .map(|v| v.y + v.height)
            .max()
            .unwrap_or(0);
        debug!(
            "placing widget {} at (0, {}) size {}x{}",
            view.widget_id, y, width, height
        );
        self.views.push(PlacedWidget {
            view,
            x: 0,
            y,
            width,
            height,
            min_width,
            min_height,
            handle: Handle::None,
            click_behavior: false,
            drag: None,
        });
    }

    pub fn remove_view(&mut self, id: WidgetId) -> bool {
        let before = self.views.len();
        self.views.retain(|v| v.widget_id() != id);
        self.views.len() != before
    }

    pub fn remove_all_views(&mut self) {
        self.views.clear();
    }

    pub fn widget_ids(&self) -> Vec<WidgetId> {
        self.views.iter().map(|v| v.widget_id()).collect()
    }

    pub fn view_count(&self) -> usize {
        self.views.len()
    }

    pub fn get(&self, id: WidgetId) -> Option<&PlacedWidget> {
        self.views.iter().find(|v| v.widget_id() == id)
    }

    fn get_mut(&mut self, id: WidgetId) -> Option<&mut PlacedWidget> {
        self.views.iter_mut().find(|v| v.widget_id() == id)
    }

    /// Overlay the handle for `mode` on the view, replacing whatever handle
    /// was shown before.
    pub fn enable_handle(&mut self, id: WidgetId, mode: Handle) {
        if let Some(view) = self.get_mut(id) {
            view.handle = mode;
        }
    }

    pub fn disable_handle(&mut self, id: WidgetId) {
        if let Some(view) = self.get_mut(id) {
            view.handle = Handle::None;
            view.drag = None;
        }
    }

    /// Current handle mode, `Handle::None` for unknown views.
    pub fn handle_type(&self, id: WidgetId) -> Handle {
        self.get(id).map(|v| v.handle).unwrap_or(Handle::None)
    }

    /// Install or clear the click listeners that accompany an active handle.
    pub fn set_click_behavior(&mut self, id: WidgetId, installed: bool) {
        if let Some(view) = self.get_mut(id) {
            view.click_behavior = installed;
        }
    }

    pub fn has_click_behavior(&self, id: WidgetId) -> bool {
        self.get(id).map(|v| v.click_behavior).unwrap_or(false)
    }

    /// Start a drag on the view's handle. No-op without an active handle.
    pub fn begin_drag(&mut self, id: WidgetId) -> bool {
        match self.get_mut(id) {
            Some(view) if view.handle != Handle::None => {
                view.drag = Some(DragState {
                    start_x: view.x,
                    start_y: view.y,
                    start_width: view.width,
                    start_height: view.height,
                    acc_dx: 0,
                    acc_dy: 0,
                });
                true
            }
            _ => false,
        }
    }

    /// Apply a drag delta according to the active handle mode. Axial modes
    /// constrain to the dominant axis of the accumulated delta; resize is
    /// clamped to the provider minimum.
    pub fn drag_by(&mut self, id: WidgetId, dx: i32, dy: i32) -> bool {
        let Some(view) = self.get_mut(id) else {
            return false;
        };
        let Some(mut drag) = view.drag else {
            return false;
        };
        drag.acc_dx += dx;
        drag.acc_dy += dy;

        let (adx, ady) = match view.handle {
            Handle::MoveFree | Handle::ResizeDiagonal => (drag.acc_dx, drag.acc_dy),
            Handle::MoveAxial | Handle::ResizeAxial => {
                if drag.acc_dx.abs() >= drag.acc_dy.abs() {
                    (drag.acc_dx, 0)
                } else {
                    (0, drag.acc_dy)
                }
            }
            Handle::None => {
                view.drag = None;
                return false;
            }
        };

        if view.handle.is_move() {
            view.x = drag.start_x + adx;
            view.y = drag.start_y + ady;
        } else {
            view.width = (drag.start_width + adx).max(view.min_width);
            view.height = (drag.start_height + ady).max(view.min_height);
        }
        view.drag = Some(drag);
        true
    }

    /// Finish the drag and report the resulting geometry for the commit.
    pub fn end_drag(&mut self, id: WidgetId) -> Option<DragCommit> {
        let view = self.get_mut(id)?;
        let drag = view.drag.take()?;
        Some(DragCommit {
            widget_id: view.widget_id(),
            width: view.width,
            height: view.height,
            moved: view.x != drag.start_x || view.y != drag.start_y,
            resized: view.width != drag.start_width || view.height != drag.start_height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ProviderRef;

    fn view(id: WidgetId) -> WidgetView {
        WidgetView {
            widget_id: id,
            provider: ProviderRef::new("com.example/Test"),
        }
    }

    fn surface_with_widget(id: WidgetId) -> PagedSurface {
        let mut surface = PagedSurface::new(3, 1);
        surface.add_view(view(id), 200, 100, 50, 40);
        surface
    }

    #[test]
    fn scroll_clamps_to_page_count() {
        let mut surface = PagedSurface::new(3, 1);
        surface.scroll_to_page(5.0, -1.0);
        assert_eq!(surface.page_position(), (3.0, 0.0));
    }

    #[test]
    fn scroll_before_layout_applies_after_viewport() {
        let mut surface = PagedSurface::new(2, 1);
        surface.scroll_to_page(1.5, 0.0);
        assert_eq!(surface.scroll_px(), None);

        surface.set_viewport(400, 600);
        assert_eq!(surface.scroll_px(), Some((600, 0)));
    }

    #[test]
    fn views_stack_vertically() {
        let mut surface = PagedSurface::new(1, 1);
        surface.add_view(view(1), 200, 100, 50, 40);
        surface.add_view(view(2), 200, 80, 50, 40);

        assert_eq!(surface.get(1).unwrap().y, 0);
        assert_eq!(surface.get(2).unwrap().y, 100);
    }

    #[test]
    fn enable_handle_replaces_previous_mode() {
        let mut surface = surface_with_widget(1);
        surface.enable_handle(1, Handle::ResizeDiagonal);
        surface.enable_handle(1, Handle::MoveFree);
        assert_eq!(surface.handle_type(1), Handle::MoveFree);
    }

    #[test]
    fn handle_type_of_unknown_view_is_none() {
        let surface = surface_with_widget(1);
        assert_eq!(surface.handle_type(99), Handle::None);
    }

    #[test]
    fn free_move_follows_both_axes() {
        let mut surface = surface_with_widget(1);
        surface.enable_handle(1, Handle::MoveFree);
        assert!(surface.begin_drag(1));
        surface.drag_by(1, 30, 20);

        let v = surface.get(1).unwrap();
        assert_eq!((v.x, v.y), (30, 20));

        let commit = surface.end_drag(1).unwrap();
        assert!(commit.moved);
        assert!(!commit.resized);
    }

    #[test]
    fn axial_move_constrains_to_dominant_axis() {
        let mut surface = surface_with_widget(1);
        surface.enable_handle(1, Handle::MoveAxial);
        surface.begin_drag(1);
        surface.drag_by(1, 10, 40);

        let v = surface.get(1).unwrap();
        assert_eq!((v.x, v.y), (0, 40));
    }

    #[test]
    fn resize_clamps_to_minimum() {
        let mut surface = surface_with_widget(1);
        surface.enable_handle(1, Handle::ResizeDiagonal);
        surface.begin_drag(1);
        surface.drag_by(1, -500, -500);

        let v = surface.get(1).unwrap();
        assert_eq!((v.width, v.height), (50, 40));

        let commit = surface.end_drag(1).unwrap();
        assert!(commit.resized);
        assert!(!commit.moved);
    }

    #[test]
    fn drag_requires_active_handle() {
        let mut surface = surface_with_widget(1);
        assert!(!surface.begin_drag(1));
        assert!(surface.end_drag(1).is_none());
    }

    #[test]
    fn unchanged_drag_commits_no_flags() {
        let mut surface = surface_with_widget(1);
        surface.enable_handle(1, Handle::MoveFree);
        surface.begin_drag(1);

        let commit = surface.end_drag(1).unwrap();
        assert!(!commit.moved);
        assert!(!commit.resized);
    }
}
