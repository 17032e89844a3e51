// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-place text editing of one element at a time.

use alloc::string::String;
use alloc::vec::Vec;
use kurbo::Point;

use crate::error::TreeError;
use crate::tree::{Tree, try_string};
use crate::types::{ElementId, FieldFlags, NodeFlags};

/// The element being edited, its pending text, and the caret.
///
/// The caret is a byte offset into `buffer` that always lies on a `char` boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditSession {
    pub(crate) element: ElementId,
    pub(crate) buffer: String,
    pub(crate) caret: usize,
}

impl EditSession {
    /// The element being edited.
    pub fn element(&self) -> ElementId {
        self.element
    }

    /// Text that will replace the element's text on commit.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Caret position as a byte offset into [`EditSession::buffer`].
    pub fn caret(&self) -> usize {
        self.caret
    }

    /// Caret position in characters, for measuring.
    pub fn caret_chars(&self) -> usize {
        self.buffer[..self.caret].chars().count()
    }
}

impl Tree {
    /// The active edit session, if any.
    pub fn edit_session(&self) -> Option<&EditSession> {
        self.edit.as_ref()
    }

    /// Whether an element is being edited.
    pub fn is_editing(&self) -> bool {
        self.edit.is_some()
    }

    /// Begin editing an element's text.
    ///
    /// Declines with [`TreeError::NotEditable`] when the node is not editable,
    /// its field does not allow editing, or the element shows no text. An
    /// edit of another element is committed first. Collapsed folders above
    /// the node are expanded so that the edited row is visible, and a search
    /// hiding it is ended. The buffer starts as the current text with the
    /// caret at its end.
    pub fn start_edit(&mut self, id: ElementId) -> Result<(), TreeError> {
        let node = self.node_opt(id.node).ok_or(TreeError::StaleNode)?;
        let element = node.elements.get(id.index).ok_or(TreeError::NoSuchElement)?;
        let field_editable = self
            .field(element.field)
            .is_some_and(|f| f.flags.contains(FieldFlags::ALLOW_EDIT));
        let Some(text) = element.text() else {
            log::debug!("declined to edit {id:?}: element has no text");
            return Err(TreeError::NotEditable);
        };
        if !node.flags.contains(NodeFlags::EDITABLE) || !field_editable {
            log::debug!("declined to edit {id:?}: not editable");
            return Err(TreeError::NotEditable);
        }
        if !self.is_attached(id.node) {
            return Err(TreeError::Unlinked);
        }
        if self.edit.as_ref().is_some_and(|e| e.element == id) {
            return Ok(());
        }
        let buffer = try_string(text)?;

        self.commit_edit();
        let mut ancestors = Vec::new();
        let mut current = self.parent_of(id.node);
        while let Some(p) = current {
            if p != self.root && !self.is_expanded(p) {
                ancestors.push(p);
            }
            current = self.parent_of(p);
        }
        for folder in ancestors.into_iter().rev() {
            self.set_expanded(folder, true)?;
        }
        if self.search.is_some() && self.row_of(id.node).is_none() {
            log::debug!("search ended to edit {id:?}");
            self.search = None;
            self.recalculate();
        }

        let caret = buffer.len();
        self.edit = Some(EditSession {
            element: id,
            buffer,
            caret,
        });
        self.invalidate_row(id.node);
        log::debug!("editing {id:?}");
        Ok(())
    }

    /// Edit the primary element of the first selected node.
    pub fn edit_selection(&mut self) -> Result<(), TreeError> {
        let node = self.find_selected().ok_or(TreeError::NoSuchElement)?;
        self.start_edit(ElementId::primary(node))
    }

    /// Store the buffer in the element, lay out, and notify the owner.
    ///
    /// Returns the element that was edited, or `None` when nothing was being edited.
    pub fn commit_edit(&mut self) -> Option<ElementId> {
        let EditSession {
            element: id, buffer, ..
        } = self.edit.take()?;
        let text = self
            .node_opt_mut(id.node)?
            .elements
            .get_mut(id.index)?
            .content
            .text_mut()?;
        *text = buffer;
        self.invalidate_row(id.node);
        self.relayout();
        self.notify_edited(id);
        Some(id)
    }

    /// Drop the buffer and leave the element unchanged. Returns whether an edit was active.
    pub fn cancel_edit(&mut self) -> bool {
        match self.edit.take() {
            Some(session) => {
                self.invalidate_row(session.element.node);
                true
            }
            None => false,
        }
    }

    /// Replace the whole buffer and put the caret at its end.
    pub fn set_edit_buffer(&mut self, text: &str) -> Result<(), TreeError> {
        let buffer = try_string(text)?;
        let session = self.edit.as_mut().ok_or(TreeError::NotEditable)?;
        session.caret = buffer.len();
        session.buffer = buffer;
        self.invalidate_edit_row();
        Ok(())
    }

    /// Insert a character at the caret.
    pub fn edit_insert(&mut self, ch: char) -> Result<(), TreeError> {
        let session = self.edit.as_mut().ok_or(TreeError::NotEditable)?;
        session.buffer.try_reserve(ch.len_utf8())?;
        session.buffer.insert(session.caret, ch);
        session.caret += ch.len_utf8();
        self.invalidate_edit_row();
        Ok(())
    }

    /// Remove the character before the caret.
    pub fn edit_backspace(&mut self) {
        let Some(session) = self.edit.as_mut() else {
            return;
        };
        if let Some(ch) = session.buffer[..session.caret].chars().next_back() {
            session.caret -= ch.len_utf8();
            session.buffer.remove(session.caret);
            self.invalidate_edit_row();
        }
    }

    /// Remove the character after the caret.
    pub fn edit_delete(&mut self) {
        let Some(session) = self.edit.as_mut() else {
            return;
        };
        if session.caret < session.buffer.len() {
            session.buffer.remove(session.caret);
            self.invalidate_edit_row();
        }
    }

    /// Move the caret one character left.
    pub fn edit_caret_left(&mut self) {
        if let Some(session) = self.edit.as_mut()
            && let Some(ch) = session.buffer[..session.caret].chars().next_back()
        {
            session.caret -= ch.len_utf8();
            self.invalidate_edit_row();
        }
    }

    /// Move the caret one character right.
    pub fn edit_caret_right(&mut self) {
        if let Some(session) = self.edit.as_mut()
            && let Some(ch) = session.buffer[session.caret..].chars().next()
        {
            session.caret += ch.len_utf8();
            self.invalidate_edit_row();
        }
    }

    /// Move the caret to the start of the buffer.
    pub fn edit_caret_home(&mut self) {
        if let Some(session) = self.edit.as_mut() {
            session.caret = 0;
            self.invalidate_edit_row();
        }
    }

    /// Move the caret to the end of the buffer.
    pub fn edit_caret_end(&mut self) {
        if let Some(session) = self.edit.as_mut() {
            session.caret = session.buffer.len();
            self.invalidate_edit_row();
        }
    }

    /// Tree-local top of the caret and its height.
    ///
    /// The caret sits inside the edited element's box, after the icon when the
    /// element has one, advanced by one glyph per character before it.
    pub fn edit_caret(&self) -> Option<(Point, f64)> {
        let session = self.edit.as_ref()?;
        let element = self.element(session.element)?;
        let b = element.bounds();
        let x = b.x0
            + self.metrics.text_offset(element.content())
            + self.metrics.text_width(&session.buffer[..session.caret]);
        Some((Point::new(x, b.y0), b.height()))
    }

    fn invalidate_edit_row(&mut self) {
        if let Some(node) = self.edit.as_ref().map(|s| s.element.node) {
            self.invalidate_row(node);
        }
    }
}
