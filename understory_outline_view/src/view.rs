// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The host-facing controller owning a tree.

use kurbo::{Point, Rect, Size, Vec2};
use understory_outline::{ElementId, NodeId, Relation, Tree, TreeError};

use crate::drag::{DragSession, near_edge};
use crate::host::{Host, ViewConfig};
use crate::input::MouseState;
use crate::render::{Painter, paint_rows};

/// A button press waiting to become a click or a drag.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Press {
    /// Tree-local position of the press.
    point: Point,
}

/// Routes host input into a [`Tree`] and forwards the resulting damage to a [`Host`].
///
/// Every entry point finishes by flushing queued damage to
/// [`Host::request_redraw`], keeping the caret in sync, and reporting extent
/// changes. After mutating the tree directly through [`OutlineView::tree_mut`],
/// call [`OutlineView::flush`].
pub struct OutlineView<H: Host> {
    pub(crate) tree: Tree,
    pub(crate) host: H,
    config: ViewConfig,
    drag: DragSession,
    /// Tree-local drop marker of a move drag.
    drop_indicator: Option<(Rect, Relation)>,
    press: Option<Press>,
    viewport: Size,
    autoscrolling: bool,
    caret_shown: bool,
    reported_extent: Size,
}

impl<H: Host> core::fmt::Debug for OutlineView<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OutlineView")
            .field("tree", &self.tree)
            .field("config", &self.config)
            .field("drag", &self.drag)
            .field("viewport", &self.viewport)
            .field("autoscrolling", &self.autoscrolling)
            .finish_non_exhaustive()
    }
}

impl<H: Host> OutlineView<H> {
    /// Wrap `tree` for display in `host`.
    pub fn new(tree: Tree, host: H, config: ViewConfig) -> Self {
        let viewport = host.viewport_size();
        let mut view = Self {
            tree,
            host,
            config,
            drag: DragSession::Idle,
            drop_indicator: None,
            press: None,
            viewport,
            autoscrolling: false,
            caret_shown: false,
            reported_extent: Size::ZERO,
        };
        view.flush();
        view
    }

    /// The displayed tree.
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Mutable access to the tree. Call [`OutlineView::flush`] afterwards.
    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    /// The host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the host.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// View settings.
    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    /// The drag in progress.
    pub fn drag(&self) -> &DragSession {
        &self.drag
    }

    /// Take the view apart.
    pub fn into_parts(self) -> (Tree, H) {
        (self.tree, self.host)
    }

    /// Map a window-relative point to tree-local coordinates.
    pub fn screen_to_tree(&self, window: Point) -> Point {
        window + self.host.scroll_offset() - Vec2::new(0.0, self.config.toolbar_height)
    }

    /// Offset from tree-local to content coordinates.
    fn content_offset(&self) -> Vec2 {
        Vec2::new(0.0, self.config.toolbar_height)
    }

    /// Forward queued damage, the caret, and extent changes to the host.
    pub fn flush(&mut self) {
        let offset = self.content_offset();
        for rect in self.tree.take_damage().dirty_rects {
            self.host.request_redraw(rect + offset);
        }
        match self.tree.edit_caret() {
            Some((top, height)) => {
                self.host.set_caret(top + offset, height);
                self.caret_shown = true;
            }
            None if self.caret_shown => {
                self.host.remove_caret();
                self.caret_shown = false;
            }
            None => {}
        }
        let extent = self.tree.extent();
        if extent != self.reported_extent {
            self.reported_extent = extent;
            self.host
                .extent_changed(Size::new(extent.width, extent.height + offset.y));
        }
    }

    // --- entry points ---

    /// Paint the content-coordinate area `damage`.
    pub fn on_redraw(&mut self, damage: Rect, painter: &mut impl Painter) {
        let offset = self.content_offset();
        let area = damage - offset;
        paint_rows(
            &self.tree,
            area,
            self.drag.band(),
            self.drop_indicator,
            offset,
            painter,
        );
    }

    /// The visible area changed size.
    pub fn on_resize(&mut self, viewport: Size) {
        self.viewport = viewport;
        let origin = self.host.scroll_offset().to_point();
        self.host
            .request_redraw(Rect::from_origin_size(origin, viewport));
        self.flush();
    }

    /// Handle a pointer event at a window-relative position. Returns whether it was used.
    pub fn on_mouse_event(&mut self, window: Point, state: MouseState) -> bool {
        let point = self.screen_to_tree(window);
        let handled = if !self.drag.is_idle() {
            if state.intersects(MouseState::HOLDING) {
                self.drag_update(window, point);
            } else {
                self.drag_end(point);
            }
            true
        } else if state.intersects(MouseState::DRAG) {
            self.drag_begin(window, point, state);
            true
        } else {
            if state.intersects(MouseState::PRESS) {
                self.press = Some(Press { point });
            }
            if state.contains(MouseState::DOUBLE_CLICK) {
                self.double_click(point)
            } else if state.intersects(MouseState::CLICK) {
                self.click(point, state.contains(MouseState::CLICK_2));
                true
            } else {
                state.intersects(MouseState::PRESS)
            }
        };
        self.flush();
        handled
    }

    /// Start editing `element`, scrolling it into view. Cancels any drag.
    pub fn start_edit(&mut self, element: ElementId) -> Result<(), TreeError> {
        self.cancel_drag();
        let result = self.tree.start_edit(element);
        if result.is_ok() {
            self.scroll_to(element.node);
        }
        self.flush();
        result
    }

    /// Abandon the drag in progress without changing the tree.
    pub fn cancel_drag(&mut self) {
        if let Some(band) = self.drag.band() {
            self.tree.invalidate(band);
        }
        self.set_drop_indicator(None);
        if !self.drag.is_idle() {
            log::debug!("drag cancelled");
        }
        self.drag = DragSession::Idle;
        self.press = None;
        self.stop_autoscroll();
        self.flush();
    }

    // --- clicks ---

    fn click(&mut self, point: Point, adjust: bool) {
        let hit = self.tree.hit_test(point);
        if let (Some(hit), Some(session)) = (hit, self.tree.edit_session())
            && !hit.furniture
            && session.element() == hit.element
        {
            return;
        }
        self.tree.commit_edit();
        match hit {
            Some(hit) if hit.furniture => {
                if let Err(err) = self.tree.toggle_expanded(hit.node()) {
                    log::debug!("could not toggle {:?}: {err}", hit.node());
                }
            }
            Some(hit) => {
                let node = hit.node();
                if adjust {
                    let selected = self.tree.is_selected(node);
                    if let Err(err) = self.tree.set_selected(node, !selected) {
                        log::debug!("could not adjust selection of {node:?}: {err}");
                    }
                } else {
                    self.select_only(node);
                }
            }
            None if !adjust => self.tree.clear_selection(),
            None => {}
        }
    }

    fn double_click(&mut self, point: Point) -> bool {
        let Some(hit) = self.tree.hit_test(point) else {
            return false;
        };
        if hit.furniture {
            return true;
        }
        let node = hit.node();
        if self.tree.is_folder(node) {
            if let Err(err) = self.tree.toggle_expanded(node) {
                log::debug!("could not toggle {node:?}: {err}");
            }
        } else {
            self.tree.commit_edit();
            self.select_only(node);
            self.tree.launch_selection();
        }
        true
    }

    pub(crate) fn select_only(&mut self, node: NodeId) {
        self.tree.clear_selection();
        if let Err(err) = self.tree.set_selected(node, true) {
            log::debug!("could not select {node:?}: {err}");
        }
    }

    pub(crate) fn scroll_to(&mut self, node: NodeId) {
        if let Some(b) = self.tree.node_bounds(node) {
            self.host
                .scroll_visible(b.y0 + self.config.toolbar_height, b.height());
        }
    }

    // --- drags ---

    fn drag_begin(&mut self, window: Point, point: Point, state: MouseState) {
        self.tree.commit_edit();
        let origin = self.press.map_or(point, |p| p.point);
        let adjust = state.contains(MouseState::DRAG_2);
        let hit = self.tree.hit_test(origin).filter(|h| !h.furniture);

        match hit {
            Some(hit) if !adjust && self.tree.is_movable() => {
                let node = hit.node();
                if !self.tree.is_selected(node) {
                    self.select_only(node);
                }
                let tops = self.tree.selected_nodes();
                let bounds = self
                    .tree
                    .visible_rows()
                    .iter()
                    .filter(|&&row| {
                        tops.iter()
                            .any(|&top| self.tree.is_ancestor_or_self(top, row))
                    })
                    .filter_map(|&row| self.tree.node_bounds(row))
                    .reduce(|a, b| a.union(b))
                    .unwrap_or_default();
                self.drag = DragSession::Move {
                    origin,
                    current: point,
                    bounds,
                };
                log::debug!("move drag started over {bounds:?}");
                self.host.drag_start(bounds + self.content_offset());
                self.track_drop(point);
            }
            _ => {
                self.drag = DragSession::RubberBand {
                    origin,
                    current: point,
                    toggle: adjust,
                };
                log::debug!("rubber band started at {origin:?}, toggle {adjust}");
                if let Some(band) = self.drag.band() {
                    self.tree.invalidate(band);
                }
            }
        }
        self.update_autoscroll(window);
    }

    fn drag_update(&mut self, window: Point, point: Point) {
        let old_band = self.drag.band();
        self.drag.update(point);
        if let (Some(old), Some(new)) = (old_band, self.drag.band())
            && old != new
        {
            self.tree.invalidate(old);
            self.tree.invalidate(new);
        }
        if matches!(self.drag, DragSession::Move { .. }) {
            self.track_drop(point);
        }
        self.update_autoscroll(window);
    }

    /// Move the drop marker to where a release at `point` would drop.
    fn track_drop(&mut self, point: Point) {
        let indicator = self.tree.drop_target(point).and_then(|(target, relation)| {
            let rect = self.tree.drop_indicator(target, relation)?;
            Some((rect, relation))
        });
        self.set_drop_indicator(indicator);
    }

    /// Replace the drop marker, damaging the old and new positions.
    fn set_drop_indicator(&mut self, indicator: Option<(Rect, Relation)>) {
        if indicator == self.drop_indicator {
            return;
        }
        if let Some((old, _)) = self.drop_indicator {
            self.tree.invalidate(old);
        }
        if let Some((new, _)) = indicator {
            self.tree.invalidate(new);
        }
        self.drop_indicator = indicator;
    }

    fn drag_end(&mut self, point: Point) {
        self.drag.update(point);
        self.stop_autoscroll();
        self.set_drop_indicator(None);
        match core::mem::take(&mut self.drag) {
            DragSession::Idle => {}
            DragSession::RubberBand {
                origin,
                current,
                toggle,
            } => {
                let band = Rect::from_points(origin, current);
                self.tree.invalidate(band);
                self.tree.set_range_selected(band, toggle);
            }
            DragSession::Move { .. } => {
                if let Some((target, relation)) = self.tree.drop_target(point)
                    && let Err(err) = self.tree.move_selected_nodes_to(target, relation)
                {
                    log::debug!("drop on {target:?} declined: {err}");
                }
            }
        }
        self.press = None;
    }

    fn update_autoscroll(&mut self, window: Point) {
        let near = near_edge(
            window,
            self.viewport,
            self.config.toolbar_height,
            self.config.autoscroll_margin,
        );
        if near && !self.autoscrolling {
            self.autoscrolling = true;
            self.host.begin_autoscroll();
        } else if !near {
            self.stop_autoscroll();
        }
    }

    fn stop_autoscroll(&mut self) {
        if self.autoscrolling {
            self.autoscrolling = false;
            self.host.end_autoscroll();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Key;
    use crate::render::RenderItem;
    use crate::testing::RecordingHost;
    use alloc::{boxed::Box, rc::Rc, vec, vec::Vec};
    use core::cell::RefCell;
    use understory_outline::{OwnerEvent, TreeConfig, TreeFlags};

    struct Fixture {
        view: OutlineView<RecordingHost>,
        folder: NodeId,
        a: NodeId,
        b: NodeId,
        c: NodeId,
    }

    /// Rows: 0 `Folder` (expanded), 1 `A`, 2 `B` inside it, 3 `C` at the top level.
    fn fixture(flags: TreeFlags, config: ViewConfig) -> Fixture {
        let mut tree = Tree::new(TreeConfig::default().with_flags(flags));
        let root = tree.root();
        let folder = tree.create_folder(Some(root), "Folder").unwrap();
        tree.set_expanded(folder, true).unwrap();
        let a = tree.create_entry(Some(folder), &["A"]).unwrap();
        let b = tree.create_entry(Some(folder), &["B"]).unwrap();
        let c = tree.create_entry(Some(root), &["C"]).unwrap();
        let mut view = OutlineView::new(tree, RecordingHost::default(), config);
        view.host_mut().redraws.clear();
        Fixture {
            view,
            folder,
            a,
            b,
            c,
        }
    }

    fn launches(view: &mut OutlineView<RecordingHost>) -> Rc<RefCell<Vec<NodeId>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        view.tree_mut()
            .set_owner(Box::new(move |event: OwnerEvent<'_>| {
                if let OwnerEvent::Launched { node, .. } = event {
                    sink.borrow_mut().push(node);
                }
            }));
        log
    }

    fn drag(view: &mut OutlineView<RecordingHost>, from: Point, to: Point, button2: bool) {
        let (press, start, hold) = if button2 {
            (MouseState::PRESS_2, MouseState::DRAG_2, MouseState::HOLDING_2)
        } else {
            (MouseState::PRESS_1, MouseState::DRAG_1, MouseState::HOLDING_1)
        };
        view.on_mouse_event(from, press);
        view.on_mouse_event(from, start);
        view.on_mouse_event(to, hold);
        view.on_mouse_event(to, MouseState::empty());
    }

    #[test]
    fn screen_to_tree_adds_scroll_and_removes_toolbar() {
        let mut f = fixture(TreeFlags::empty(), ViewConfig::default().with_toolbar_height(10.0));
        f.view.host_mut().scroll = Vec2::new(5.0, 100.0);
        assert_eq!(
            f.view.screen_to_tree(Point::new(20.0, 30.0)),
            Point::new(25.0, 120.0)
        );
    }

    #[test]
    fn damage_is_offset_by_the_toolbar() {
        let mut f = fixture(TreeFlags::empty(), ViewConfig::default().with_toolbar_height(10.0));
        f.view.tree_mut().set_selected(f.c, true).unwrap();
        f.view.flush();
        assert_eq!(f.view.host().redraws, vec![Rect::new(0.0, 70.0, 76.0, 90.0)]);
        assert_eq!(
            f.view.host().extents.last(),
            Some(&Size::new(76.0, 90.0)),
            "extent includes the toolbar"
        );
    }

    #[test]
    fn clicks_select_toggle_and_clear() {
        let mut f = fixture(TreeFlags::empty(), ViewConfig::default());
        f.view.on_mouse_event(Point::new(45.0, 25.0), MouseState::CLICK_1);
        assert_eq!(f.view.tree().selected_nodes(), vec![f.a]);
        f.view.on_mouse_event(Point::new(5.0, 65.0), MouseState::CLICK_2);
        assert_eq!(f.view.tree().selected_nodes(), vec![f.a, f.c], "adjust adds");
        f.view.on_mouse_event(Point::new(5.0, 65.0), MouseState::CLICK_2);
        assert_eq!(f.view.tree().selected_nodes(), vec![f.a], "adjust removes");
        f.view.on_mouse_event(Point::new(5.0, 65.0), MouseState::CLICK_1);
        assert_eq!(f.view.tree().selected_nodes(), vec![f.c], "select replaces");
        f.view.on_mouse_event(Point::new(5.0, 200.0), MouseState::CLICK_1);
        assert!(!f.view.tree().has_selection(), "empty space clears");
        assert!(!f.view.host().redraws.is_empty(), "selection changes repaint");
    }

    #[test]
    fn furniture_click_toggles_expansion() {
        let mut f = fixture(TreeFlags::empty(), ViewConfig::default());
        f.view.on_mouse_event(Point::new(5.0, 5.0), MouseState::CLICK_1);
        assert!(!f.view.tree().is_expanded(f.folder));
        assert_eq!(f.view.tree().visible_rows(), &[f.folder, f.c]);
        assert!(!f.view.tree().has_selection(), "furniture does not select");
        f.view.on_mouse_event(Point::new(5.0, 5.0), MouseState::CLICK_1);
        assert!(f.view.tree().is_expanded(f.folder));
    }

    #[test]
    fn double_click_launches_entries_and_toggles_folders() {
        let mut f = fixture(TreeFlags::empty(), ViewConfig::default());
        let log = launches(&mut f.view);
        f.view
            .on_mouse_event(Point::new(45.0, 45.0), MouseState::CLICK_1 | MouseState::DOUBLE_CLICK);
        assert_eq!(*log.borrow(), vec![f.b]);
        f.view
            .on_mouse_event(Point::new(30.0, 5.0), MouseState::CLICK_1 | MouseState::DOUBLE_CLICK);
        assert!(!f.view.tree().is_expanded(f.folder));
        assert_eq!(log.borrow().len(), 1, "folders are not launched");
    }

    #[test]
    fn rubber_band_selects_touched_rows() {
        let mut f = fixture(TreeFlags::empty(), ViewConfig::default());
        f.view.tree_mut().set_selected(f.folder, true).unwrap();
        drag(&mut f.view, Point::new(5.0, 100.0), Point::new(60.0, 25.0), false);
        assert_eq!(f.view.tree().selected_nodes(), vec![f.a, f.b, f.c]);
        assert!(f.view.drag().is_idle());
    }

    #[test]
    fn adjust_band_toggles() {
        let mut f = fixture(TreeFlags::empty(), ViewConfig::default());
        f.view.tree_mut().set_selected(f.a, true).unwrap();
        drag(&mut f.view, Point::new(45.0, 25.0), Point::new(45.0, 45.0), true);
        assert_eq!(f.view.tree().selected_nodes(), vec![f.b], "A flipped off, B on");
    }

    #[test]
    fn band_is_painted_while_dragging() {
        let mut f = fixture(TreeFlags::empty(), ViewConfig::default());
        f.view.on_mouse_event(Point::new(5.0, 100.0), MouseState::PRESS_1);
        f.view.on_mouse_event(Point::new(5.0, 100.0), MouseState::DRAG_1);
        f.view.on_mouse_event(Point::new(60.0, 50.0), MouseState::HOLDING_1);
        assert_eq!(f.view.drag().band(), Some(Rect::new(5.0, 50.0, 60.0, 100.0)));
        let mut bands = Vec::new();
        f.view.on_redraw(Rect::new(0.0, 0.0, 400.0, 300.0), &mut |item: RenderItem<'_>| {
            if let RenderItem::RubberBand { rect } = item {
                bands.push(rect);
            }
        });
        assert_eq!(bands, vec![Rect::new(5.0, 50.0, 60.0, 100.0)]);
        assert!(f.view.on_key(Key::Escape), "escape cancels the drag");
        assert!(f.view.drag().is_idle());
        assert!(!f.view.tree().has_selection(), "cancel leaves the selection alone");
    }

    #[test]
    fn move_drag_reorders_nodes() {
        let mut f = fixture(TreeFlags::empty(), ViewConfig::default());
        drag(&mut f.view, Point::new(5.0, 70.0), Point::new(50.0, 22.0), false);
        assert_eq!(f.view.tree().children_of(f.folder), &[f.c, f.a, f.b]);
        assert_eq!(f.view.tree().selected_nodes(), vec![f.c], "pressed node was selected");
        assert_eq!(f.view.host().drags, vec![Rect::new(0.0, 60.0, 16.0, 80.0)]);
    }

    #[test]
    fn move_drag_takes_the_whole_selection() {
        let mut f = fixture(TreeFlags::empty(), ViewConfig::default());
        f.view.tree_mut().set_selected(f.a, true).unwrap();
        f.view.tree_mut().set_selected(f.b, true).unwrap();
        drag(&mut f.view, Point::new(45.0, 25.0), Point::new(5.0, 200.0), false);
        let root = f.view.tree().root();
        assert_eq!(f.view.tree().children_of(root), &[f.folder, f.c, f.a, f.b]);
        assert_eq!(f.view.host().drags, vec![Rect::new(40.0, 20.0, 56.0, 60.0)]);
    }

    #[test]
    fn dragged_folders_bring_their_visible_children() {
        let mut f = fixture(TreeFlags::empty(), ViewConfig::default());
        drag(&mut f.view, Point::new(30.0, 5.0), Point::new(5.0, 200.0), false);
        assert_eq!(
            f.view.host().drags,
            vec![Rect::new(0.0, 0.0, 76.0, 60.0)],
            "folder row plus A and B"
        );
        let root = f.view.tree().root();
        assert_eq!(f.view.tree().children_of(root), &[f.c, f.folder]);
        assert_eq!(f.view.tree().children_of(f.folder), &[f.a, f.b], "children travel along");
    }

    fn indicators(view: &mut OutlineView<RecordingHost>) -> Vec<(Rect, Relation)> {
        let mut found = Vec::new();
        view.on_redraw(Rect::new(0.0, 0.0, 400.0, 300.0), &mut |item: RenderItem<'_>| {
            if let RenderItem::DropIndicator { rect, relation } = item {
                found.push((rect, relation));
            }
        });
        found
    }

    #[test]
    fn move_drag_shows_and_damages_the_drop_indicator() {
        let mut f = fixture(TreeFlags::empty(), ViewConfig::default());
        f.view.on_mouse_event(Point::new(5.0, 70.0), MouseState::PRESS_1);
        f.view.on_mouse_event(Point::new(5.0, 70.0), MouseState::DRAG_1);
        f.view.host_mut().redraws.clear();

        f.view.on_mouse_event(Point::new(50.0, 10.0), MouseState::HOLDING_1);
        let folder_row = Rect::new(0.0, 0.0, 76.0, 20.0);
        assert_eq!(indicators(&mut f.view), vec![(folder_row, Relation::FirstChild)]);
        assert!(f.view.host().redraws.contains(&folder_row), "new marker damaged");

        f.view.host_mut().redraws.clear();
        f.view.on_mouse_event(Point::new(50.0, 22.0), MouseState::HOLDING_1);
        let bar = Rect::new(40.0, 19.0, 56.0, 21.0);
        assert_eq!(indicators(&mut f.view), vec![(bar, Relation::PrevSibling)]);
        assert!(f.view.host().redraws.contains(&folder_row), "old marker damaged");
        assert!(f.view.host().redraws.contains(&bar));

        f.view.host_mut().redraws.clear();
        f.view.on_mouse_event(Point::new(52.0, 23.0), MouseState::HOLDING_1);
        assert!(f.view.host().redraws.is_empty(), "same marker, nothing to repaint");

        f.view.on_mouse_event(Point::new(52.0, 23.0), MouseState::empty());
        assert!(indicators(&mut f.view).is_empty(), "marker gone after the drop");
        assert!(f.view.host().redraws.contains(&bar));
        assert_eq!(f.view.tree().children_of(f.folder), &[f.c, f.a, f.b]);
    }

    #[test]
    fn dropping_on_a_folder_row_moves_inside() {
        let mut f = fixture(TreeFlags::empty(), ViewConfig::default());
        f.view.tree_mut().set_expanded(f.folder, false).unwrap();
        f.view.flush();
        // Rows: 0 Folder (collapsed), 1 C.
        drag(&mut f.view, Point::new(5.0, 30.0), Point::new(50.0, 10.0), false);
        assert_eq!(f.view.tree().children_of(f.folder), &[f.c, f.a, f.b]);
        assert!(!f.view.tree().has_selection(), "moved into a collapsed folder");
    }

    #[test]
    fn escape_cancels_a_move_drag() {
        let mut f = fixture(TreeFlags::empty(), ViewConfig::default());
        let root = f.view.tree().root();
        f.view.on_mouse_event(Point::new(5.0, 70.0), MouseState::PRESS_1);
        f.view.on_mouse_event(Point::new(5.0, 70.0), MouseState::DRAG_1);
        f.view.on_mouse_event(Point::new(50.0, 22.0), MouseState::HOLDING_1);
        assert!(matches!(f.view.drag(), DragSession::Move { .. }));
        f.view.host_mut().redraws.clear();
        assert!(f.view.on_key(Key::Escape));
        assert!(f.view.drag().is_idle());
        assert!(indicators(&mut f.view).is_empty());
        assert!(
            f.view.host().redraws.contains(&Rect::new(40.0, 19.0, 56.0, 21.0)),
            "marker erased"
        );
        f.view.on_mouse_event(Point::new(50.0, 22.0), MouseState::empty());
        assert_eq!(f.view.tree().children_of(root), &[f.folder, f.c], "tree unchanged");
        assert_eq!(f.view.tree().children_of(f.folder), &[f.a, f.b]);
        assert_eq!(f.view.tree().selected_nodes(), vec![f.c], "selection kept");
    }

    #[test]
    fn starting_a_drag_commits_the_edit() {
        let mut f = fixture(TreeFlags::empty(), ViewConfig::default());
        f.view.start_edit(ElementId::primary(f.a)).unwrap();
        f.view.on_key(Key::Char('!'));
        f.view.on_mouse_event(Point::new(5.0, 70.0), MouseState::PRESS_1);
        assert!(f.view.tree().is_editing(), "a press alone keeps editing");
        f.view.on_mouse_event(Point::new(5.0, 70.0), MouseState::DRAG_1);
        assert!(!f.view.tree().is_editing());
        assert_eq!(f.view.host().caret, None, "caret removed");
        let text = f.view.tree().element(ElementId::primary(f.a)).unwrap().text();
        assert_eq!(text, Some("A!"));
        f.view.on_mouse_event(Point::new(5.0, 70.0), MouseState::empty());
    }

    #[test]
    fn read_only_trees_only_rubber_band() {
        let mut f = fixture(TreeFlags::READ_ONLY, ViewConfig::default());
        f.view.on_mouse_event(Point::new(5.0, 70.0), MouseState::PRESS_1);
        f.view.on_mouse_event(Point::new(5.0, 70.0), MouseState::DRAG_1);
        assert!(matches!(f.view.drag(), DragSession::RubberBand { .. }));
        f.view.on_mouse_event(Point::new(50.0, 22.0), MouseState::empty());
        let root = f.view.tree().root();
        assert_eq!(f.view.tree().children_of(root), &[f.folder, f.c], "nothing moved");
        assert!(f.view.host().drags.is_empty());
    }

    #[test]
    fn autoscroll_follows_the_pointer() {
        let mut f = fixture(TreeFlags::empty(), ViewConfig::default());
        f.view.on_mouse_event(Point::new(100.0, 100.0), MouseState::PRESS_1);
        f.view.on_mouse_event(Point::new(100.0, 100.0), MouseState::DRAG_1);
        assert!(!f.view.host().autoscrolling);
        f.view.on_mouse_event(Point::new(100.0, 290.0), MouseState::HOLDING_1);
        assert!(f.view.host().autoscrolling, "near the bottom edge");
        f.view.on_mouse_event(Point::new(100.0, 295.0), MouseState::HOLDING_1);
        assert_eq!(f.view.host().autoscroll_starts, 1, "started once");
        f.view.on_mouse_event(Point::new(100.0, 150.0), MouseState::HOLDING_1);
        assert!(!f.view.host().autoscrolling, "left the margin");
        f.view.on_mouse_event(Point::new(100.0, 290.0), MouseState::HOLDING_1);
        f.view.on_mouse_event(Point::new(100.0, 290.0), MouseState::empty());
        assert!(!f.view.host().autoscrolling, "release stops scrolling");
    }

    #[test]
    fn editing_drives_the_caret() {
        let mut f = fixture(TreeFlags::empty(), ViewConfig::default().with_toolbar_height(10.0));
        f.view.start_edit(ElementId::primary(f.a)).unwrap();
        // Text starts after 4 of padding; one glyph of 8.
        assert_eq!(f.view.host().caret, Some((Point::new(52.0, 30.0), 20.0)));
        assert_eq!(f.view.host().scrolled_to, vec![(30.0, 20.0)]);
        assert!(f.view.on_key(Key::Char('x')));
        assert_eq!(f.view.host().caret, Some((Point::new(60.0, 30.0), 20.0)));
        assert!(f.view.on_key(Key::Enter));
        assert_eq!(f.view.host().caret, None, "caret removed on commit");
        let text = f.view.tree().element(ElementId::primary(f.a)).unwrap().text();
        assert_eq!(text, Some("Ax"));
    }

    #[test]
    fn escape_cancels_and_click_elsewhere_commits() {
        let mut f = fixture(TreeFlags::empty(), ViewConfig::default());
        f.view.start_edit(ElementId::primary(f.a)).unwrap();
        f.view.on_key(Key::Backspace);
        f.view.on_key(Key::Escape);
        let text = |view: &OutlineView<RecordingHost>| {
            view.tree()
                .element(ElementId::primary(f.a))
                .and_then(|e| e.text().map(alloc::string::String::from))
        };
        assert_eq!(text(&f.view).as_deref(), Some("A"), "cancelled");

        f.view.start_edit(ElementId::primary(f.a)).unwrap();
        f.view.on_key(Key::Char('!'));
        f.view.on_mouse_event(Point::new(45.0, 25.0), MouseState::CLICK_1);
        assert!(f.view.tree().is_editing(), "clicking the edited element keeps editing");
        f.view.on_mouse_event(Point::new(5.0, 65.0), MouseState::CLICK_1);
        assert!(!f.view.tree().is_editing());
        assert_eq!(text(&f.view).as_deref(), Some("A!"), "committed");
        assert_eq!(f.view.tree().selected_nodes(), vec![f.c]);
    }

    #[test]
    fn redraw_emits_rows_in_order() {
        let mut f = fixture(TreeFlags::empty(), ViewConfig::default().with_toolbar_height(10.0));
        f.view.tree_mut().set_selected(f.folder, true).unwrap();
        f.view.flush();
        let mut items = Vec::new();
        f.view.on_redraw(Rect::new(0.0, 10.0, 400.0, 30.0), &mut |item: RenderItem<'_>| {
            items.push(alloc::format!("{item:?}"));
        });
        assert_eq!(items.len(), 3, "background, furniture, text of the first row: {items:?}");
        assert!(items[0].starts_with("RowBackground") && items[0].contains("selected: true"));
        assert!(items[1].starts_with("Furniture") && items[1].contains("expanded: true"));
        assert!(items[2].contains("\"Folder\""));
    }

    #[test]
    fn redraw_shows_the_edit_field() {
        let mut f = fixture(TreeFlags::empty(), ViewConfig::default());
        f.view.start_edit(ElementId::primary(f.c)).unwrap();
        f.view.on_key(Key::Char('!'));
        let mut fields = Vec::new();
        f.view.on_redraw(Rect::new(0.0, 60.0, 400.0, 80.0), &mut |item: RenderItem<'_>| {
            match item {
                RenderItem::EditField { text, caret, .. } => {
                    fields.push((alloc::string::String::from(text), caret));
                }
                RenderItem::Text { .. } => panic!("edited element drawn as plain text"),
                _ => {}
            }
        });
        assert_eq!(fields, vec![(alloc::string::String::from("C!"), Point::new(20.0, 60.0))]);
    }

    #[test]
    fn resize_repaints_the_viewport() {
        let mut f = fixture(TreeFlags::empty(), ViewConfig::default());
        f.view.host_mut().scroll = Vec2::new(0.0, 40.0);
        f.view.on_resize(Size::new(200.0, 100.0));
        assert_eq!(f.view.host().redraws, vec![Rect::new(0.0, 40.0, 200.0, 140.0)]);
    }
}
