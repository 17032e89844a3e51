// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer and keyboard input as delivered by the host.

bitflags::bitflags! {
    /// Pointer state accompanying a mouse event.
    ///
    /// Button 1 selects and button 2 adjusts (toggles). A press is reported when a
    /// button goes down, a click when it is released without moving far, and a
    /// drag on the first sample after the pointer moved with the button held.
    /// Later samples of the same drag carry the matching `HOLDING` bit; the first
    /// event without any `HOLDING` bit ends the drag.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct MouseState: u16 {
        /// Button 1 went down.
        const PRESS_1 = 1 << 0;
        /// Button 2 went down.
        const PRESS_2 = 1 << 1;
        /// Button 1 clicked.
        const CLICK_1 = 1 << 2;
        /// Button 2 clicked.
        const CLICK_2 = 1 << 3;
        /// Second click of a double click.
        const DOUBLE_CLICK = 1 << 4;
        /// A drag with button 1 started.
        const DRAG_1 = 1 << 5;
        /// A drag with button 2 started.
        const DRAG_2 = 1 << 6;
        /// Button 1 is still held during a drag.
        const HOLDING_1 = 1 << 7;
        /// Button 2 is still held during a drag.
        const HOLDING_2 = 1 << 8;
    }
}

impl MouseState {
    /// Any press bit.
    pub const PRESS: Self = Self::PRESS_1.union(Self::PRESS_2);
    /// Any click bit.
    pub const CLICK: Self = Self::CLICK_1.union(Self::CLICK_2);
    /// Any drag start bit.
    pub const DRAG: Self = Self::DRAG_1.union(Self::DRAG_2);
    /// Any holding bit.
    pub const HOLDING: Self = Self::HOLDING_1.union(Self::HOLDING_2);
}

/// A key press routed to the view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// A printable character: typed into the edit, or appended to the search text.
    Char(char),
    /// Commit an edit, or launch the selection.
    Enter,
    /// Cancel an edit, a drag, or a search, or clear the selection.
    Escape,
    /// Delete before the caret, shorten the search text, or delete the selection.
    Backspace,
    /// Delete after the caret, or delete the selection.
    Delete,
    /// Caret or selection movement.
    Left,
    /// Caret or selection movement.
    Right,
    /// Selection movement.
    Up,
    /// Selection movement.
    Down,
    /// Caret to start, or select the first row.
    Home,
    /// Caret to end, or select the last row.
    End,
    /// Select every visible row.
    SelectAll,
    /// Deselect everything.
    ClearSelection,
    /// Start editing the first selected node.
    Rename,
}
