// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::Rect;

/// Whether a selection rectangle touches a row box.
///
/// Rows are half-open vertically so that a rectangle ending exactly on a row
/// boundary does not pick up the next row. A rectangle with no height selects
/// the row it lies in; horizontal edges count as touching.
pub(crate) fn selects_row(selection: Rect, row: Rect) -> bool {
    let x = selection.x0 <= row.x1 && row.x0 <= selection.x1;
    let y = if selection.y0 == selection.y1 {
        row.y0 <= selection.y0 && selection.y0 < row.y1
    } else {
        row.y0 < selection.y1 && selection.y0 < row.y1
    };
    x && y
}

/// Normalise a rectangle so that `x0 <= x1` and `y0 <= y1`.
pub(crate) fn normalized(r: Rect) -> Rect {
    Rect::new(r.x0.min(r.x1), r.y0.min(r.y1), r.x0.max(r.x1), r.y0.max(r.y1))
}
