// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The window system side of an outline view.

use kurbo::{Point, Rect, Size, Vec2};

/// Services the host window provides to an [`OutlineView`](crate::OutlineView).
///
/// Rectangles and points passed to the host are in content coordinates: tree
/// coordinates shifted down by the toolbar height, independent of scrolling.
pub trait Host {
    /// Repaint `rect` soon, by calling [`OutlineView::on_redraw`](crate::OutlineView::on_redraw).
    fn request_redraw(&mut self, rect: Rect);

    /// The content position shown at the top-left of the window.
    fn scroll_offset(&self) -> Vec2;

    /// Size of the visible window area, toolbar included.
    fn viewport_size(&self) -> Size;

    /// Show the text caret with its top at `top`.
    fn set_caret(&mut self, top: Point, height: f64);

    /// Hide the text caret.
    fn remove_caret(&mut self) {}

    /// The pointer is near a window edge during a drag; start scrolling.
    fn begin_autoscroll(&mut self);

    /// Stop scrolling started by [`Host::begin_autoscroll`].
    fn end_autoscroll(&mut self);

    /// Nodes covering `bounds` are being dragged; show drag feedback.
    fn drag_start(&mut self, bounds: Rect);

    /// The content size changed; resize scroll bars or the work area.
    fn extent_changed(&mut self, extent: Size) {
        let _ = extent;
    }

    /// Scroll so that the content span `y .. y + height` is visible.
    fn scroll_visible(&mut self, y: f64, height: f64) {
        let _ = (y, height);
    }
}

/// Settings of an [`OutlineView`](crate::OutlineView).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewConfig {
    /// Height of the toolbar above the content.
    pub toolbar_height: f64,
    /// Distance from a window edge within which a drag scrolls the window.
    pub autoscroll_margin: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            toolbar_height: 0.0,
            autoscroll_margin: 32.0,
        }
    }
}

impl ViewConfig {
    /// Set the toolbar height.
    pub fn with_toolbar_height(mut self, toolbar_height: f64) -> Self {
        self.toolbar_height = toolbar_height;
        self
    }

    /// Set the autoscroll margin.
    pub fn with_autoscroll_margin(mut self, autoscroll_margin: f64) -> Self {
        self.autoscroll_margin = autoscroll_margin;
        self
    }
}
