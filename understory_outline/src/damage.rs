// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Damage queued by tree operations.

use alloc::vec::Vec;
use kurbo::Rect;

/// Tree-local rectangles that should be repainted, in the order they were queued.
///
/// Rectangles may overlap; nothing is merged.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Damage {
    /// Rectangles to repaint.
    pub dirty_rects: Vec<Rect>,
}

impl Damage {
    /// Returns the union of all damage rects.
    pub fn union_rect(&self) -> Option<Rect> {
        let mut it = self.dirty_rects.iter().copied();
        let first = it.next()?;
        Some(it.fold(first, |acc, r| acc.union(r)))
    }

    /// Whether nothing needs repainting.
    pub fn is_empty(&self) -> bool {
        self.dirty_rects.is_empty()
    }
}
