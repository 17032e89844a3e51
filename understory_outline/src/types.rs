// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the outline: node and element identifiers, flags, and element content.

use alloc::string::String;
use kurbo::Rect;

/// Identifier for a node in the tree (generational).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Identifier for one element of a node.
///
/// Index `0` is always the node's primary element.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ElementId {
    /// The node owning the element.
    pub node: NodeId,
    /// Position of the element within the node's element list.
    pub index: usize,
}

impl ElementId {
    /// The primary element of `node`.
    pub const fn primary(node: NodeId) -> Self {
        Self { node, index: 0 }
    }

    /// Whether this is a node's primary element.
    pub const fn is_primary(self) -> bool {
        self.index == 0
    }
}

/// Index into the tree's field table.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct FieldId(pub u16);

/// Handle to an icon owned by the host. The outline never loads or frees sprites.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct SpriteId(pub u32);

bitflags::bitflags! {
    /// Per-node state.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// Folder children are shown. Ignored on entries.
        const EXPANDED = 0b0000_0001;
        /// Node is part of the selection.
        const SELECTED = 0b0000_0010;
        /// Node text may be edited in place.
        const EDITABLE = 0b0000_0100;
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self::EDITABLE
    }
}

bitflags::bitflags! {
    /// Behaviour switches for a whole tree.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct TreeFlags: u8 {
        /// Nodes cannot be dragged to a new position.
        const NO_MOVES = 0b0000_0001;
        /// Nodes cannot be deleted by user interaction.
        const NO_DELETES = 0b0000_0010;
        /// No moves and no deletes.
        const READ_ONLY = Self::NO_MOVES.bits() | Self::NO_DELETES.bits();
        /// Folders emptied by deleting the selection are deleted too.
        const DELETE_EMPTY_FOLDERS = 0b0000_0100;
        /// At most one node is selected at a time.
        const SINGLE_SELECTION = 0b0000_1000;
    }
}

bitflags::bitflags! {
    /// How a field is presented and whether it can be edited.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct FieldFlags: u8 {
        /// Elements of this field may be edited in place.
        const ALLOW_EDIT = 0b0000_0001;
        /// The field is the main field of its node kind.
        const DEFAULT = 0b0000_0010;
        /// Hosts should render the field name next to the value.
        const SHOW_NAME = 0b0000_0100;
    }
}

/// Description of a named field shared by all nodes of one kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDesc {
    /// Display name, e.g. `"Title"` or `"URL"`.
    pub name: String,
    /// Presentation and editing flags.
    pub flags: FieldFlags,
}

impl FieldDesc {
    /// Create a field description.
    pub fn new(name: impl Into<String>, flags: FieldFlags) -> Self {
        Self {
            name: name.into(),
            flags,
        }
    }
}

/// Whether a node can hold children.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum NodeKind {
    /// Container node.
    Folder,
    /// Leaf node.
    Entry,
}

/// Where [`Tree::link`](crate::Tree::link) places a node relative to another.
///
/// Also the drop position reported by [`Tree::drop_target`](crate::Tree::drop_target).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Relation {
    /// First child of the relation node, which must be a folder.
    FirstChild,
    /// Sibling directly after the relation node.
    NextSibling,
    /// Sibling directly before the relation node.
    PrevSibling,
}

/// What an element shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ElementContent {
    /// Text only.
    Text(String),
    /// Icon only.
    Sprite(SpriteId),
    /// Leading icon followed by text.
    TextPlusSprite {
        /// Text shown after the icon.
        text: String,
        /// Icon shown before the text.
        sprite: SpriteId,
    },
}

impl ElementContent {
    /// The element text, if it has any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) | Self::TextPlusSprite { text, .. } => Some(text),
            Self::Sprite(_) => None,
        }
    }

    /// The element icon, if it has one.
    pub fn sprite(&self) -> Option<SpriteId> {
        match self {
            Self::Sprite(sprite) | Self::TextPlusSprite { sprite, .. } => Some(*sprite),
            Self::Text(_) => None,
        }
    }

    pub(crate) fn text_mut(&mut self) -> Option<&mut String> {
        match self {
            Self::Text(text) | Self::TextPlusSprite { text, .. } => Some(text),
            Self::Sprite(_) => None,
        }
    }
}

/// One renderable field of a node.
#[derive(Clone, Debug)]
pub struct Element {
    pub(crate) field: FieldId,
    pub(crate) content: ElementContent,
    pub(crate) bounds: Rect,
    pub(crate) user_data: u64,
}

impl Element {
    pub(crate) fn new(field: FieldId, content: ElementContent) -> Self {
        Self {
            field,
            content,
            bounds: Rect::ZERO,
            user_data: 0,
        }
    }

    /// The field this element shows.
    pub fn field(&self) -> FieldId {
        self.field
    }

    /// The element content.
    pub fn content(&self) -> &ElementContent {
        &self.content
    }

    /// Shorthand for `content().text()`.
    pub fn text(&self) -> Option<&str> {
        self.content.text()
    }

    /// Shorthand for `content().sprite()`.
    pub fn sprite(&self) -> Option<SpriteId> {
        self.content.sprite()
    }

    /// Tree-local box as of the last layout pass.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Opaque value owned by the tree's client.
    pub fn user_data(&self) -> u64 {
        self.user_data
    }
}
