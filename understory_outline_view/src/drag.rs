// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drag gesture state.

use kurbo::{Point, Rect, Size};

/// The drag in progress, in tree-local coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum DragSession {
    /// No drag.
    #[default]
    Idle,
    /// Selecting the rows touched by a rectangle.
    RubberBand {
        /// Where the button went down.
        origin: Point,
        /// Latest pointer position.
        current: Point,
        /// Flip touched rows instead of replacing the selection.
        toggle: bool,
    },
    /// Moving the selected nodes.
    Move {
        /// Where the button went down.
        origin: Point,
        /// Latest pointer position.
        current: Point,
        /// Union of the dragged rows' boxes when the drag began.
        bounds: Rect,
    },
}

impl DragSession {
    /// Whether no drag is in progress.
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// The rubber band rectangle, if this is a rubber band drag.
    pub fn band(&self) -> Option<Rect> {
        match *self {
            Self::RubberBand {
                origin, current, ..
            } => Some(Rect::from_points(origin, current)),
            _ => None,
        }
    }

    /// Record a new pointer position, returning the previous one.
    pub(crate) fn update(&mut self, point: Point) -> Option<Point> {
        match self {
            Self::Idle => None,
            Self::RubberBand { current, .. } | Self::Move { current, .. } => {
                Some(core::mem::replace(current, point))
            }
        }
    }
}

/// Whether a window-relative point is close enough to an edge of the content
/// area to scroll it.
pub(crate) fn near_edge(window: Point, viewport: Size, toolbar: f64, margin: f64) -> bool {
    window.x < margin
        || window.x > viewport.width - margin
        || window.y < toolbar + margin
        || window.y > viewport.height - margin
}
