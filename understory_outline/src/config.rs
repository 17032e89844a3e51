// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree construction settings and layout metrics.

use alloc::{vec, vec::Vec};

use crate::types::{ElementContent, FieldDesc, FieldFlags, SpriteId, TreeFlags};

/// Fixed sizes used by the layout pass, in logical pixels.
///
/// Text is measured with a single advance per character; there is no shaping.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Metrics {
    /// Height of every row.
    pub row_height: f64,
    /// Horizontal indentation per nesting level.
    pub indent_step: f64,
    /// Width of the expand/collapse gutter at the start of folder rows.
    pub furniture_width: f64,
    /// Width reserved for an element's icon.
    pub icon_width: f64,
    /// Advance of one character.
    pub glyph_width: f64,
    /// Padding on each side of an element, and between icon and text.
    pub text_padding: f64,
    /// Horizontal gap between consecutive elements of a row.
    pub column_gap: f64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            row_height: 20.0,
            indent_step: 40.0,
            furniture_width: 20.0,
            icon_width: 18.0,
            glyph_width: 8.0,
            text_padding: 4.0,
            column_gap: 16.0,
        }
    }
}

impl Metrics {
    /// Width of `text` in the fixed-advance font.
    pub fn text_width(&self, text: &str) -> f64 {
        text.chars().count() as f64 * self.glyph_width
    }

    /// Width of an element with the given content.
    pub fn element_width(&self, content: &ElementContent) -> f64 {
        let inner = match content {
            ElementContent::Text(text) => self.text_width(text),
            ElementContent::Sprite(_) => self.icon_width,
            ElementContent::TextPlusSprite { text, .. } => {
                self.icon_width + self.text_padding + self.text_width(text)
            }
        };
        inner + 2.0 * self.text_padding
    }

    /// Offset from an element's left edge to where its text starts.
    pub fn text_offset(&self, content: &ElementContent) -> f64 {
        match content {
            ElementContent::TextPlusSprite { .. } => {
                self.text_padding + self.icon_width + self.text_padding
            }
            ElementContent::Text(_) | ElementContent::Sprite(_) => self.text_padding,
        }
    }
}

/// Everything needed to create a [`Tree`](crate::Tree).
///
/// Entry nodes carry one element per entry field, in order; the first entry
/// field is their primary element. Folders carry a single element for the
/// folder field.
#[derive(Clone, Debug)]
pub struct TreeConfig {
    /// Fields of entry nodes. Must not be empty.
    pub entry_fields: Vec<FieldDesc>,
    /// Field of folder nodes.
    pub folder_field: FieldDesc,
    /// Behaviour switches.
    pub flags: TreeFlags,
    /// Layout metrics.
    pub metrics: Metrics,
    /// Icon given to new folders, if any.
    pub folder_sprite: Option<SpriteId>,
    /// Icon given to new entries, if any.
    pub entry_sprite: Option<SpriteId>,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            entry_fields: vec![FieldDesc::new(
                "Title",
                FieldFlags::DEFAULT | FieldFlags::ALLOW_EDIT,
            )],
            folder_field: FieldDesc::new("Folder", FieldFlags::DEFAULT | FieldFlags::ALLOW_EDIT),
            flags: TreeFlags::empty(),
            metrics: Metrics::default(),
            folder_sprite: None,
            entry_sprite: None,
        }
    }
}

impl TreeConfig {
    /// Replace the entry fields.
    pub fn with_entry_fields(mut self, fields: impl IntoIterator<Item = FieldDesc>) -> Self {
        self.entry_fields = fields.into_iter().collect();
        self
    }

    /// Replace the folder field.
    pub fn with_folder_field(mut self, field: FieldDesc) -> Self {
        self.folder_field = field;
        self
    }

    /// Replace the tree flags.
    pub fn with_flags(mut self, flags: TreeFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Replace the layout metrics.
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Set the default folder and entry icons.
    pub fn with_sprites(mut self, folder: Option<SpriteId>, entry: Option<SpriteId>) -> Self {
        self.folder_sprite = folder;
        self.entry_sprite = entry;
        self
    }
}
