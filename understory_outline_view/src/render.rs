// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Draw items produced by [`OutlineView::on_redraw`](crate::OutlineView::on_redraw).

use kurbo::{Point, Rect, Vec2};
use understory_outline::{ElementContent, ElementId, Relation, SpriteId, Tree};

/// One thing to draw, in content coordinates.
///
/// Items arrive in painting order: for each row its background, then its
/// furniture, then its elements from left to right. The rubber band and the
/// drop indicator come last.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderItem<'a> {
    /// Background of a visible row, spanning the damaged width.
    RowBackground {
        /// Area to fill.
        rect: Rect,
        /// Whether the row's node is selected.
        selected: bool,
    },
    /// Expand/collapse glyph of a folder row.
    Furniture {
        /// The gutter box.
        rect: Rect,
        /// Whether the folder is expanded.
        expanded: bool,
    },
    /// An element icon.
    Sprite {
        /// Box of the icon.
        rect: Rect,
        /// The icon.
        sprite: SpriteId,
        /// Whether the row's node is selected.
        selected: bool,
    },
    /// Element text.
    Text {
        /// Box of the element the text belongs to.
        bounds: Rect,
        /// Top-left of the first glyph.
        origin: Point,
        /// The text.
        text: &'a str,
        /// Whether the row's node is selected.
        selected: bool,
    },
    /// The element being edited, drawn as a text field.
    EditField {
        /// The edited element.
        element: ElementId,
        /// Box of the field.
        bounds: Rect,
        /// Top-left of the first glyph.
        origin: Point,
        /// Pending text.
        text: &'a str,
        /// Top of the caret.
        caret: Point,
    },
    /// Outline of the rubber band selection.
    RubberBand {
        /// The band.
        rect: Rect,
    },
    /// Where a move drag would drop the selected nodes.
    ///
    /// For [`Relation::FirstChild`] the rectangle is the target folder's row;
    /// otherwise it is a thin bar on the row edge between the new neighbours.
    DropIndicator {
        /// The marker.
        rect: Rect,
        /// Where the nodes would go relative to the marked row.
        relation: Relation,
    },
}

/// Receiver of [`RenderItem`]s.
pub trait Painter {
    /// Draw one item.
    fn paint(&mut self, item: RenderItem<'_>);
}

impl<F> Painter for F
where
    F: FnMut(RenderItem<'_>),
{
    fn paint(&mut self, item: RenderItem<'_>) {
        self(item);
    }
}

/// Emit the rows of `tree` touching the tree-local `area`, shifted by `offset`.
pub(crate) fn paint_rows(
    tree: &Tree,
    area: Rect,
    band: Option<Rect>,
    indicator: Option<(Rect, Relation)>,
    offset: Vec2,
    painter: &mut impl Painter,
) {
    let m = tree.metrics();
    let first = tree.row_at(area.y0.max(0.0)).unwrap_or(tree.visible_rows().len());
    let edit = tree.edit_session();
    let caret = tree.edit_caret();

    for &node in tree.visible_rows().iter().skip(first) {
        let Some(row) = tree.node_bounds(node) else {
            continue;
        };
        if row.y0 >= area.y1 {
            break;
        }
        let selected = tree.is_selected(node);
        painter.paint(RenderItem::RowBackground {
            rect: Rect::new(area.x0, row.y0, area.x1, row.y1) + offset,
            selected,
        });
        if tree.is_folder(node) {
            painter.paint(RenderItem::Furniture {
                rect: Rect::new(row.x0, row.y0, row.x0 + m.furniture_width, row.y1) + offset,
                expanded: tree.is_expanded(node),
            });
        }
        for (index, element) in tree.elements_of(node).iter().enumerate() {
            let bounds = element.bounds();
            if bounds.x0 > area.x1 || bounds.x1 < area.x0 {
                continue;
            }
            if let Some(sprite) = element.sprite() {
                let x = bounds.x0 + m.text_padding;
                painter.paint(RenderItem::Sprite {
                    rect: Rect::new(x, bounds.y0, x + m.icon_width, bounds.y1) + offset,
                    sprite,
                    selected,
                });
            }
            let origin = Point::new(bounds.x0 + m.text_offset(element.content()), bounds.y0);
            let id = ElementId { node, index };
            match (edit, caret) {
                (Some(session), Some((caret, _))) if session.element() == id => {
                    painter.paint(RenderItem::EditField {
                        element: id,
                        bounds: bounds + offset,
                        origin: origin + offset,
                        text: session.buffer(),
                        caret: caret + offset,
                    });
                }
                _ => {
                    if let ElementContent::Text(text) | ElementContent::TextPlusSprite { text, .. } =
                        element.content()
                    {
                        painter.paint(RenderItem::Text {
                            bounds: bounds + offset,
                            origin: origin + offset,
                            text,
                            selected,
                        });
                    }
                }
            }
        }
    }

    if let Some(band) = band
        && touches(band, area)
    {
        painter.paint(RenderItem::RubberBand { rect: band + offset });
    }
    if let Some((rect, relation)) = indicator
        && touches(rect, area)
    {
        painter.paint(RenderItem::DropIndicator {
            rect: rect + offset,
            relation,
        });
    }
}

/// Closed-interval overlap, so zero-width outlines still paint.
fn touches(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}
