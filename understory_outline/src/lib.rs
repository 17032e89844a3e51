// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Outline: the toolkit-independent core of a hierarchical list view.
//!
//! Understory Outline models the folders-and-entries panels found in browsers and file managers:
//! bookmark hotlists, global history, cookie jars.
//!
//! - Keeps a tree of folders and entries, each row carrying one or more typed elements.
//! - Lays rows out in a single column with per-level indentation and computes the content extent.
//! - Hit tests points to elements and to the expand/collapse gutter of folder rows.
//! - Tracks a multi-node selection, moves selected nodes, and edits element text in place.
//! - Filters the rows down to the entries matching a search text.
//! - Queues damage rectangles for every visible change, ready to be forwarded to a host window.
//!
//! It does not draw, own a window, or read input devices. The companion
//! `understory_outline_view` crate routes host input into a [`Tree`] and emits draw items.
//!
//! ## Layout
//!
//! Row `i` spans `i * row_height .. (i + 1) * row_height` in tree-local coordinates,
//! starting at `depth * indent_step`. Folder rows reserve a `furniture_width` gutter for
//! the expand/collapse glyph before their elements. Text is measured with a fixed
//! advance per character; see [`Metrics`].
//!
//! ## Damage and batching
//!
//! Structural changes (create, link, delink, delete, expand, move, edit commit) lay the
//! tree out again immediately and queue the area from the first changed row to the bottom
//! of the content. Selection and edit changes queue a single row. [`Tree::batch`] defers
//! both layout and damage until the closure returns, then queues one full-content
//! rectangle. Drain the queue with [`Tree::take_damage`].
//!
//! ## API overview
//!
//! - [`Tree`]: node storage, layout, selection, moves, and editing.
//! - [`NodeId`]: generational handle of a node. Handles of deleted nodes stay stale forever.
//! - [`ElementId`]: a node plus an element index; index `0` is the primary element.
//! - [`TreeConfig`]/[`Metrics`]: fields, flags, default icons, and layout sizes.
//! - [`Owner`]/[`OwnerEvent`]: deletions, committed edits, and launches reported back to the
//!   feature that owns the tree.
//! - [`TreeError`]: why a request was declined. Declined requests never change the tree.
//!
//! ## Example
//!
//! ```rust
//! use kurbo::Point;
//! use understory_outline::{ElementId, Tree, TreeConfig};
//!
//! let mut tree = Tree::new(TreeConfig::default());
//! let root = tree.root();
//! let folder = tree.create_folder(Some(root), "Bookmarks").unwrap();
//! let entry = tree.create_entry(Some(folder), &["NetSurf"]).unwrap();
//! tree.set_expanded(folder, true).unwrap();
//!
//! // The entry sits on the second row.
//! let hit = tree.hit_test(Point::new(50.0, 30.0)).unwrap();
//! assert_eq!(hit.element, ElementId::primary(entry));
//!
//! // Rename it in place.
//! tree.start_edit(hit.element).unwrap();
//! tree.set_edit_buffer("NetSurf home").unwrap();
//! tree.commit_edit();
//! assert_eq!(tree.element(hit.element).unwrap().text(), Some("NetSurf home"));
//!
//! // Every change above queued something to repaint.
//! assert!(!tree.take_damage().is_empty());
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod config;
mod damage;
mod edit;
mod error;
mod layout;
mod owner;
mod search;
mod selection;
mod tree;
mod types;
mod util;

pub use config::{Metrics, TreeConfig};
pub use damage::Damage;
pub use edit::EditSession;
pub use error::TreeError;
pub use layout::Hit;
pub use owner::{Owner, OwnerEvent};
pub use tree::Tree;
pub use types::{
    Element, ElementContent, ElementId, FieldDesc, FieldFlags, FieldId, NodeFlags, NodeId,
    NodeKind, Relation, SpriteId, TreeFlags,
};
