// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A host that records every request, for tests.

use alloc::vec::Vec;
use kurbo::{Point, Rect, Size, Vec2};

use crate::host::Host;

#[derive(Debug)]
pub(crate) struct RecordingHost {
    pub(crate) scroll: Vec2,
    pub(crate) viewport: Size,
    pub(crate) redraws: Vec<Rect>,
    pub(crate) caret: Option<(Point, f64)>,
    pub(crate) autoscrolling: bool,
    pub(crate) autoscroll_starts: usize,
    pub(crate) drags: Vec<Rect>,
    pub(crate) extents: Vec<Size>,
    pub(crate) scrolled_to: Vec<(f64, f64)>,
}

impl Default for RecordingHost {
    fn default() -> Self {
        Self {
            scroll: Vec2::ZERO,
            viewport: Size::new(400.0, 300.0),
            redraws: Vec::new(),
            caret: None,
            autoscrolling: false,
            autoscroll_starts: 0,
            drags: Vec::new(),
            extents: Vec::new(),
            scrolled_to: Vec::new(),
        }
    }
}

impl Host for RecordingHost {
    fn request_redraw(&mut self, rect: Rect) {
        self.redraws.push(rect);
    }

    fn scroll_offset(&self) -> Vec2 {
        self.scroll
    }

    fn viewport_size(&self) -> Size {
        self.viewport
    }

    fn set_caret(&mut self, top: Point, height: f64) {
        self.caret = Some((top, height));
    }

    fn remove_caret(&mut self) {
        self.caret = None;
    }

    fn begin_autoscroll(&mut self) {
        self.autoscrolling = true;
        self.autoscroll_starts += 1;
    }

    fn end_autoscroll(&mut self) {
        self.autoscrolling = false;
    }

    fn drag_start(&mut self, bounds: Rect) {
        self.drags.push(bounds);
    }

    fn extent_changed(&mut self, extent: Size) {
        self.extents.push(extent);
    }

    fn scroll_visible(&mut self, y: f64, height: f64) {
        self.scrolled_to.push((y, height));
    }
}
