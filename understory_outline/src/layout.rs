// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout pass, hit testing, and drop targets.

use alloc::vec::Vec;
use kurbo::{Point, Rect, Size};

use crate::tree::Tree;
use crate::types::{ElementId, NodeId, Relation};

/// Result of [`Tree::hit_test`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Hit {
    /// The element under the point. On the furniture gutter this is the primary element.
    pub element: ElementId,
    /// The point lies on the expand/collapse gutter of a folder row.
    pub furniture: bool,
}

impl Hit {
    /// The node of the hit element.
    pub fn node(&self) -> NodeId {
        self.element.node
    }
}

impl Tree {
    /// Re-run the layout pass and damage the whole content area.
    ///
    /// The damaged area covers the larger of the old and new extents so that
    /// rows which disappeared are repainted too. Does nothing inside
    /// [`Tree::batch`]; the batch recalculates when it ends.
    pub fn recalculate(&mut self) {
        if self.batching() {
            return;
        }
        let old = self.extent;
        self.layout();
        let new = self.extent;
        self.invalidate(Rect::new(
            0.0,
            0.0,
            old.width.max(new.width),
            old.height.max(new.height),
        ));
    }

    /// Lay out after a structural change, damaging from the first changed row down.
    pub(crate) fn relayout(&mut self) {
        if self.batching() {
            return;
        }
        let old_rows = core::mem::take(&mut self.rows);
        let old_boxes = core::mem::take(&mut self.row_boxes);
        let old_extent = self.extent;
        self.layout();

        let first_changed = old_rows
            .iter()
            .zip(&old_boxes)
            .zip(self.rows.iter().zip(&self.row_boxes))
            .position(|(old, new)| old.0 != new.0 || old.1 != new.1)
            .unwrap_or(old_rows.len().min(self.rows.len()));
        let y0 = first_changed as f64 * self.metrics.row_height;
        let width = old_extent.width.max(self.extent.width);
        let height = old_extent.height.max(self.extent.height);
        if y0 < height {
            self.invalidate(Rect::new(0.0, y0, width, height));
        }
    }

    /// Assign rows, depths and boxes to every visible node.
    fn layout(&mut self) {
        for node in self.nodes.iter_mut().flatten() {
            node.row = None;
        }
        let m = self.metrics;
        let placed = match &self.search {
            Some(query) => self.matching_entries(query),
            None => self.expanded_order(),
        };
        let mut rows = core::mem::take(&mut self.rows);
        let mut boxes = core::mem::take(&mut self.row_boxes);
        rows.clear();
        boxes.clear();

        let mut width = 0.0_f64;
        for (id, depth) in placed {
            let row = rows.len();
            let y0 = row as f64 * m.row_height;
            let y1 = y0 + m.row_height;
            let x0 = depth as f64 * m.indent_step;

            let node = self.node_mut(id);
            let mut x = if node.is_folder() {
                x0 + m.furniture_width
            } else {
                x0
            };
            for (i, element) in node.elements.iter_mut().enumerate() {
                if i > 0 {
                    x += m.column_gap;
                }
                let w = m.element_width(&element.content);
                element.bounds = Rect::new(x, y0, x + w, y1);
                x += w;
            }
            node.bounds = Rect::new(x0, y0, x, y1);
            node.row = Some(row);
            node.depth = depth;
            width = width.max(x);
            rows.push(id);
            boxes.push(node.bounds);
        }

        self.extent = Size::new(width, rows.len() as f64 * m.row_height);
        log::trace!("layout: {} rows, extent {:?}", rows.len(), self.extent);
        self.rows = rows;
        self.row_boxes = boxes;
    }

    /// Nodes under expanded folders in document order, with their depths.
    fn expanded_order(&self) -> Vec<(NodeId, usize)> {
        let mut out = Vec::new();
        let mut stack: Vec<(NodeId, usize)> = self
            .node(self.root)
            .children
            .iter()
            .rev()
            .map(|&c| (c, 0))
            .collect();
        while let Some((id, depth)) = stack.pop() {
            out.push((id, depth));
            let node = self.node(id);
            if node.shows_children() {
                stack.extend(node.children.iter().rev().map(|&c| (c, depth + 1)));
            }
        }
        out
    }

    /// Visible row index at tree-local `y`.
    pub fn row_at(&self, y: f64) -> Option<usize> {
        let row = self.row_boxes.partition_point(|b| b.y1 <= y);
        let b = self.row_boxes.get(row)?;
        (b.y0 <= y).then_some(row)
    }

    /// Find the element under a tree-local point.
    ///
    /// Returns `None` above the first row and below the last one. Anywhere else
    /// on a row hits that row's node: the furniture gutter of a folder, the
    /// element containing the point, or the primary element when the point
    /// falls in the indentation, between the elements, or beyond them.
    pub fn hit_test(&self, point: Point) -> Option<Hit> {
        let row = self.row_at(point.y)?;
        let id = self.rows[row];
        let node = self.node_opt(id)?;
        if node.is_folder() {
            let gutter_end = node.bounds.x0 + self.metrics.furniture_width;
            if point.x >= node.bounds.x0 && point.x < gutter_end {
                return Some(Hit {
                    element: ElementId::primary(id),
                    furniture: true,
                });
            }
        }
        let index = node
            .elements
            .iter()
            .position(|e| e.bounds.contains(point))
            .unwrap_or(0);
        Some(Hit {
            element: ElementId { node: id, index },
            furniture: false,
        })
    }

    /// Where dropped nodes would go for a tree-local point.
    ///
    /// On an entry row the upper half places them before the entry and the
    /// lower half after it. A folder row is split in quarters: the top quarter
    /// means before, the middle half means inside as its first children, and
    /// the bottom quarter means after, unless the folder is expanded, in which
    /// case the bottom quarter drops inside too. Points above the first row
    /// drop before it, points below the last row after the last top-level
    /// node. `None` when the tree has no rows.
    pub fn drop_target(&self, point: Point) -> Option<(NodeId, Relation)> {
        let first = *self.rows.first()?;
        if point.y < 0.0 {
            return Some((first, Relation::PrevSibling));
        }
        let Some(row) = self.row_at(point.y) else {
            let last = *self.children_of(self.root).last()?;
            return Some((last, Relation::NextSibling));
        };
        let id = self.rows[row];
        let node = self.node_opt(id)?;
        let b = self.row_boxes[row];
        let offset = point.y - b.y0;
        let height = b.height();
        let relation = if node.is_folder() {
            if offset <= height * 0.25 {
                Relation::PrevSibling
            } else if offset <= height * 0.75 || node.shows_children() {
                Relation::FirstChild
            } else {
                Relation::NextSibling
            }
        } else if offset <= height * 0.5 {
            Relation::PrevSibling
        } else {
            Relation::NextSibling
        };
        Some((id, relation))
    }

    /// Tree-local box marking a drop position returned by [`Tree::drop_target`].
    ///
    /// Before and after are a bar two units high centred on the target's top
    /// edge, or on the bottom edge of its last visible descendant. Inside is
    /// the folder's row box. `None` for hidden targets and for dropping inside
    /// an entry.
    pub fn drop_indicator(&self, target: NodeId, relation: Relation) -> Option<Rect> {
        let node = self.node_opt(target)?;
        node.row?;
        let b = node.bounds;
        let y = match relation {
            Relation::FirstChild => return node.is_folder().then_some(b),
            Relation::PrevSibling => b.y0,
            Relation::NextSibling => {
                let mut last = target;
                while self.is_expanded(last)
                    && let Some(&child) = self.children_of(last).last()
                {
                    last = child;
                }
                self.node_bounds(last).map_or(b.y1, |r| r.y1.max(b.y1))
            }
        };
        Some(Rect::new(b.x0, y - 1.0, b.x1, y + 1.0))
    }
}
