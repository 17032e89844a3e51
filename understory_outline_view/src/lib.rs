// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Outline View: connects an [`understory_outline::Tree`] to a host window.
//!
//! The host owns the window, scroll bars, caret, and drawing surface and forwards
//! raw events to an [`OutlineView`]:
//!
//! - [`OutlineView::on_mouse_event`]: clicks select, toggle, expand, and launch; drags
//!   become rubber band selections or moves of the selected nodes.
//! - [`OutlineView::on_key`]: editing keys while an element is edited, selection
//!   movement, launching, and deletion otherwise.
//! - [`OutlineView::on_redraw`]: emits [`RenderItem`]s for a damaged area to a [`Painter`].
//! - [`OutlineView::on_resize`]: records the new viewport and repaints it.
//!
//! In the other direction the view calls the [`Host`] trait to request repaints,
//! position the caret, start drag feedback, and scroll.
//!
//! ## Coordinates
//!
//! Window coordinates are relative to the top-left of the visible window area.
//! Content coordinates are tree coordinates shifted down by
//! [`ViewConfig::toolbar_height`]; repaint requests, [`RenderItem`]s, and the caret use
//! them. [`OutlineView::screen_to_tree`] maps a window point to the tree by adding
//! [`Host::scroll_offset`] and removing the toolbar.
//!
//! ## Example
//!
//! ```rust
//! use kurbo::{Point, Rect, Size, Vec2};
//! use understory_outline::{Tree, TreeConfig};
//! use understory_outline_view::{Host, MouseState, OutlineView, RenderItem, ViewConfig};
//!
//! #[derive(Default)]
//! struct Window {
//!     dirty: Vec<Rect>,
//! }
//!
//! impl Host for Window {
//!     fn request_redraw(&mut self, rect: Rect) { self.dirty.push(rect); }
//!     fn scroll_offset(&self) -> Vec2 { Vec2::ZERO }
//!     fn viewport_size(&self) -> Size { Size::new(400.0, 300.0) }
//!     fn set_caret(&mut self, _: Point, _: f64) {}
//!     fn begin_autoscroll(&mut self) {}
//!     fn end_autoscroll(&mut self) {}
//!     fn drag_start(&mut self, _: Rect) {}
//! }
//!
//! let mut tree = Tree::new(TreeConfig::default());
//! let root = tree.root();
//! let entry = tree.create_entry(Some(root), &["NetSurf"]).unwrap();
//!
//! let mut view = OutlineView::new(tree, Window::default(), ViewConfig::default());
//! view.on_mouse_event(Point::new(10.0, 10.0), MouseState::CLICK_1);
//! assert!(view.tree().is_selected(entry));
//!
//! let mut texts = Vec::new();
//! for rect in core::mem::take(&mut view.host_mut().dirty) {
//!     view.on_redraw(rect, &mut |item: RenderItem<'_>| {
//!         if let RenderItem::Text { text, .. } = item {
//!             texts.push(text.to_owned());
//!         }
//!     });
//! }
//! assert!(texts.contains(&"NetSurf".to_owned()));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod drag;
mod host;
mod input;
mod keys;
mod render;
mod view;

#[cfg(test)]
mod testing;

pub use drag::DragSession;
pub use host::{Host, ViewConfig};
pub use input::{Key, MouseState};
pub use render::{Painter, RenderItem};
pub use view::OutlineView;
