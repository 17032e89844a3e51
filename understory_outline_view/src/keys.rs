// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keyboard routing: edit keys while editing, search and selection movement otherwise.

use alloc::string::String;
use understory_outline::{ElementId, TreeError};

use crate::host::Host;
use crate::input::Key;
use crate::view::OutlineView;

impl<H: Host> OutlineView<H> {
    /// Handle a key press. Returns whether the key was used.
    pub fn on_key(&mut self, key: Key) -> bool {
        let handled = if self.tree.is_editing() {
            self.edit_key(key)
        } else if !self.drag().is_idle() {
            if key == Key::Escape {
                self.cancel_drag();
                true
            } else {
                false
            }
        } else {
            self.browse_key(key)
        };
        self.flush();
        handled
    }

    fn edit_key(&mut self, key: Key) -> bool {
        let tree = &mut self.tree;
        match key {
            Key::Char(ch) => {
                if let Err(err) = tree.edit_insert(ch) {
                    log::debug!("dropped {ch:?}: {err}");
                }
            }
            Key::Backspace => tree.edit_backspace(),
            Key::Delete => tree.edit_delete(),
            Key::Left => tree.edit_caret_left(),
            Key::Right => tree.edit_caret_right(),
            Key::Home => tree.edit_caret_home(),
            Key::End => tree.edit_caret_end(),
            Key::Enter => {
                tree.commit_edit();
            }
            Key::Escape => {
                tree.cancel_edit();
            }
            Key::Up | Key::Down | Key::SelectAll | Key::ClearSelection | Key::Rename => {
                return false;
            }
        }
        true
    }

    fn browse_key(&mut self, key: Key) -> bool {
        match key {
            Key::Char(ch) => self.extend_search(ch),
            Key::Backspace if self.tree.is_searching() => self.shorten_search(),
            Key::Escape if self.tree.is_searching() => self.update_search(None),
            Key::Up => self.step_selection(false),
            Key::Down => self.step_selection(true),
            Key::Home => self.select_row(0),
            Key::End => {
                let last = self.tree.visible_rows().len().wrapping_sub(1);
                self.select_row(last)
            }
            Key::Left => self.select_parent(),
            Key::Right => self.toggle_selected_folder(),
            Key::Enter => self.tree.launch_selection() > 0,
            Key::Escape | Key::ClearSelection => {
                self.tree.clear_selection();
                true
            }
            Key::SelectAll => {
                self.tree.select_all();
                true
            }
            Key::Delete | Key::Backspace => match self.tree.delete_selection() {
                Ok(count) => count > 0,
                Err(TreeError::NotPermitted) => false,
                Err(err) => {
                    log::debug!("delete declined: {err}");
                    false
                }
            },
            Key::Rename => match self.tree.find_selected() {
                Some(node) => self
                    .start_edit(ElementId::primary(node))
                    .is_ok(),
                None => false,
            },
        }
    }

    /// Append a typed character to the search text.
    fn extend_search(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        let mut query = String::from(self.tree.search().unwrap_or_default());
        query.push(ch);
        self.update_search(Some(&query))
    }

    /// Drop the last character of the search text, ending the search when it empties.
    fn shorten_search(&mut self) -> bool {
        let mut query = String::from(self.tree.search().unwrap_or_default());
        query.pop();
        self.update_search(Some(&query))
    }

    fn update_search(&mut self, query: Option<&str>) -> bool {
        if let Err(err) = self.tree.set_search(query) {
            log::debug!("search for {query:?} declined: {err}");
            return false;
        }
        if let Some(&first) = self.tree.visible_rows().first() {
            self.scroll_to(first);
        }
        true
    }

    /// Select the row after (or before) the first selected one.
    ///
    /// With nothing selected, Down picks the first row and Up the last.
    fn step_selection(&mut self, down: bool) -> bool {
        let rows = self.tree.visible_rows().len();
        if rows == 0 {
            return false;
        }
        let current = self.tree.find_selected().and_then(|n| self.tree.row_of(n));
        let row = match (current, down) {
            (None, true) => 0,
            (None, false) => rows - 1,
            (Some(r), true) => (r + 1).min(rows - 1),
            (Some(r), false) => r.saturating_sub(1),
        };
        self.select_row(row)
    }

    fn select_row(&mut self, row: usize) -> bool {
        let Some(&node) = self.tree.visible_rows().get(row) else {
            return false;
        };
        self.select_only(node);
        self.scroll_to(node);
        true
    }

    /// Select the parent folder of the selection, or the first row.
    fn select_parent(&mut self) -> bool {
        let root = self.tree.root();
        match self.tree.find_selected().and_then(|n| self.tree.parent_of(n)) {
            Some(parent) if parent != root => {
                self.select_only(parent);
                self.scroll_to(parent);
                true
            }
            _ => self.select_row(0),
        }
    }

    /// Expand or collapse the selected folder; expanding steps into its first child.
    fn toggle_selected_folder(&mut self) -> bool {
        let Some(node) = self.tree.find_selected() else {
            return false;
        };
        if !self.tree.is_folder(node) {
            return false;
        }
        let expanding = !self.tree.is_expanded(node);
        if self.tree.set_expanded(node, expanding).is_err() {
            return false;
        }
        if expanding && let Some(&child) = self.tree.children_of(node).first() {
            self.select_only(child);
            self.scroll_to(child);
        }
        true
    }
}
