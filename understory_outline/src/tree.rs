// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: node storage, structure, and element access.

use alloc::{boxed::Box, string::String, vec, vec::Vec};
use hashbrown::HashMap;
use kurbo::{Rect, Size};
use smallvec::SmallVec;

use crate::config::{Metrics, TreeConfig};
use crate::damage::Damage;
use crate::edit::EditSession;
use crate::error::TreeError;
use crate::owner::{Owner, OwnerEvent};
use crate::types::{
    Element, ElementContent, ElementId, FieldDesc, FieldFlags, FieldId, NodeFlags, NodeId,
    NodeKind, Relation, SpriteId, TreeFlags,
};

pub(crate) type Elements = SmallVec<[Element; 2]>;

/// A hierarchical list of folders and entries with layout, selection, and editing state.
///
/// The root node is an invisible folder that is always expanded; its
/// children are the top-level rows. Structural changes re-run the layout
/// pass and queue damage immediately unless they happen inside
/// [`Tree::batch`]. Queued damage is drained with [`Tree::take_damage`].
///
/// ## Example
///
/// ```rust
/// use understory_outline::{Tree, TreeConfig};
///
/// let mut tree = Tree::new(TreeConfig::default());
/// let root = tree.root();
/// let folder = tree.create_folder(Some(root), "Bookmarks").unwrap();
/// tree.set_expanded(folder, true).unwrap();
/// let entry = tree.create_entry(Some(folder), &["NetSurf"]).unwrap();
///
/// assert_eq!(tree.visible_rows(), &[folder, entry]);
/// assert_eq!(tree.extent().height, 2.0 * tree.metrics().row_height);
/// ```
pub struct Tree {
    /// slots
    pub(crate) nodes: Vec<Option<Node>>,
    /// last generation per slot (persists across frees)
    pub(crate) generations: Vec<u32>,
    free_list: Vec<usize>,
    pub(crate) root: NodeId,
    /// entry fields followed by the folder field
    fields: Vec<FieldDesc>,
    field_names: HashMap<String, FieldId>,
    pub(crate) flags: TreeFlags,
    pub(crate) metrics: Metrics,
    folder_sprite: Option<SpriteId>,
    entry_sprite: Option<SpriteId>,
    /// visible nodes in document order, and their row boxes
    pub(crate) rows: Vec<NodeId>,
    pub(crate) row_boxes: Vec<Rect>,
    pub(crate) extent: Size,
    pub(crate) damage: Damage,
    pub(crate) batch_depth: u32,
    pub(crate) edit: Option<EditSession>,
    /// lowercased filter text while a search is active
    pub(crate) search: Option<String>,
    owner: Option<Box<dyn Owner>>,
}

impl core::fmt::Debug for Tree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        f.debug_struct("Tree")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("rows", &self.rows.len())
            .field("extent", &self.extent)
            .field("flags", &self.flags)
            .field("editing", &self.edit)
            .field("search", &self.search)
            .field("has_owner", &self.owner.is_some())
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Node {
    generation: u32,
    pub(crate) kind: NodeKind,
    pub(crate) flags: NodeFlags,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) elements: Elements,
    /// Row box as of the last layout pass.
    pub(crate) bounds: Rect,
    /// Visible row index, `None` while hidden or unattached.
    pub(crate) row: Option<usize>,
    pub(crate) depth: usize,
}

impl Node {
    fn new(generation: u32, kind: NodeKind, flags: NodeFlags, elements: Elements) -> Self {
        Self {
            generation,
            kind,
            flags,
            parent: None,
            children: Vec::new(),
            elements,
            bounds: Rect::ZERO,
            row: None,
            depth: 0,
        }
    }

    pub(crate) fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }

    pub(crate) fn shows_children(&self) -> bool {
        self.is_folder() && self.flags.contains(NodeFlags::EXPANDED)
    }
}

/// Copy `text` into a new string, reporting allocation failure instead of aborting.
pub(crate) fn try_string(text: &str) -> Result<String, TreeError> {
    let mut s = String::new();
    s.try_reserve(text.len())?;
    s.push_str(text);
    Ok(s)
}

impl Tree {
    /// Create a tree containing only the root folder.
    pub fn new(config: TreeConfig) -> Self {
        let TreeConfig {
            mut entry_fields,
            folder_field,
            flags,
            metrics,
            folder_sprite,
            entry_sprite,
        } = config;
        if entry_fields.is_empty() {
            log::warn!("tree created without entry fields; adding a default title field");
            entry_fields.push(FieldDesc::new(
                "Title",
                FieldFlags::DEFAULT | FieldFlags::ALLOW_EDIT,
            ));
        }
        let mut fields = entry_fields;
        fields.push(folder_field);
        let mut field_names = HashMap::with_capacity(fields.len());
        for (i, field) in fields.iter().enumerate() {
            #[allow(
                clippy::cast_possible_truncation,
                reason = "Field tables are a handful of entries."
            )]
            field_names.entry(field.name.clone()).or_insert(FieldId(i as u16));
        }
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Field tables are a handful of entries."
        )]
        let folder_field = FieldId((fields.len() - 1) as u16);

        let mut root_elements = Elements::new();
        root_elements.push(Element::new(folder_field, ElementContent::Text(String::new())));
        let root = Node::new(1, NodeKind::Folder, NodeFlags::EXPANDED, root_elements);

        Self {
            nodes: vec![Some(root)],
            generations: vec![1],
            free_list: Vec::new(),
            root: NodeId::new(0, 1),
            fields,
            field_names,
            flags,
            metrics,
            folder_sprite,
            entry_sprite,
            rows: Vec::new(),
            row_boxes: Vec::new(),
            extent: Size::ZERO,
            damage: Damage::default(),
            batch_depth: 0,
            edit: None,
            search: None,
            owner: None,
        }
    }

    /// The invisible root folder.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Current behaviour switches.
    pub fn flags(&self) -> TreeFlags {
        self.flags
    }

    /// Replace the behaviour switches.
    pub fn set_flags(&mut self, flags: TreeFlags) {
        self.flags = flags;
    }

    /// Whether dragging nodes to a new position is allowed.
    pub fn is_movable(&self) -> bool {
        !self.flags.contains(TreeFlags::NO_MOVES)
    }

    /// Layout metrics.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Replace the layout metrics and recalculate.
    pub fn set_metrics(&mut self, metrics: Metrics) {
        self.metrics = metrics;
        self.recalculate();
    }

    /// Content size as of the last layout pass: widest row by total row height.
    pub fn extent(&self) -> Size {
        self.extent
    }

    /// Register the receiver of node notifications, replacing any previous one.
    pub fn set_owner(&mut self, owner: Box<dyn Owner>) {
        self.owner = Some(owner);
    }

    /// Remove and return the registered owner.
    pub fn take_owner(&mut self) -> Option<Box<dyn Owner>> {
        self.owner.take()
    }

    pub(crate) fn notify(&mut self, event: OwnerEvent<'_>) {
        match self.owner.as_mut() {
            Some(owner) => owner.node_event(event),
            None => log::trace!("no owner registered, dropping {event:?}"),
        }
    }

    /// Report a committed edit, lending the element text to the owner.
    pub(crate) fn notify_edited(&mut self, id: ElementId) {
        let Some(mut owner) = self.owner.take() else {
            return;
        };
        if let Some(element) = self.element(id) {
            owner.node_event(OwnerEvent::Edited {
                node: id.node,
                field: element.field,
                text: element.text().unwrap_or_default(),
                user_data: element.user_data,
            });
        }
        self.owner = Some(owner);
    }

    /// Run `f` to edit the tree in bulk, then lay out and damage once.
    ///
    /// Inside the batch no layout pass runs and no damage is queued, so row
    /// boxes, [`Tree::visible_rows`], and hit testing reflect the state before
    /// the batch until it ends. Deleted nodes are the exception: they leave the
    /// visible rows at once and hit testing over their rows finds nothing.
    /// Batches nest; only the outermost one recalculates.
    pub fn batch<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.batch_depth += 1;
        let result = f(self);
        self.batch_depth -= 1;
        if self.batch_depth == 0 {
            self.recalculate();
        }
        result
    }

    pub(crate) fn batching(&self) -> bool {
        self.batch_depth > 0
    }

    // --- fields ---

    /// The field description for `id`.
    pub fn field(&self, id: FieldId) -> Option<&FieldDesc> {
        self.fields.get(usize::from(id.0))
    }

    /// Look up a field by name.
    pub fn field_by_name(&self, name: &str) -> Option<FieldId> {
        self.field_names.get(name).copied()
    }

    /// The `i`th entry field; `entry_field(0)` is the main entry field.
    pub fn entry_field(&self, i: usize) -> Option<FieldId> {
        if i + 1 < self.fields.len() {
            #[allow(
                clippy::cast_possible_truncation,
                reason = "Field tables are a handful of entries."
            )]
            Some(FieldId(i as u16))
        } else {
            None
        }
    }

    /// Number of entry fields.
    pub fn entry_field_count(&self) -> usize {
        self.fields.len() - 1
    }

    /// The field shown by folders.
    pub fn folder_field(&self) -> FieldId {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Field tables are a handful of entries."
        )]
        FieldId((self.fields.len() - 1) as u16)
    }

    // --- creation ---

    /// Create a folder as the last child of `parent`, or unattached for a later [`Tree::link`].
    ///
    /// New folders start collapsed.
    pub fn create_folder(
        &mut self,
        parent: Option<NodeId>,
        title: &str,
    ) -> Result<NodeId, TreeError> {
        let text = try_string(title)?;
        let content = match self.folder_sprite {
            Some(sprite) => ElementContent::TextPlusSprite { text, sprite },
            None => ElementContent::Text(text),
        };
        let mut elements = Elements::new();
        elements.push(Element::new(self.folder_field(), content));
        self.create_node(parent, NodeKind::Folder, elements)
    }

    /// Create an entry as the last child of `parent`, or unattached.
    ///
    /// Element `i` holds `values[i]` for entry field `i`. The primary element
    /// always exists (empty when `values` is empty); values beyond the
    /// tree's entry fields are ignored.
    pub fn create_entry(
        &mut self,
        parent: Option<NodeId>,
        values: &[&str],
    ) -> Result<NodeId, TreeError> {
        let count = values.len().clamp(1, self.entry_field_count());
        let mut elements = Elements::new();
        elements
            .try_reserve(count)
            .map_err(|_| TreeError::OutOfMemory)?;
        for i in 0..count {
            let text = try_string(values.get(i).copied().unwrap_or(""))?;
            let content = match (i, self.entry_sprite) {
                (0, Some(sprite)) => ElementContent::TextPlusSprite { text, sprite },
                _ => ElementContent::Text(text),
            };
            #[allow(
                clippy::cast_possible_truncation,
                reason = "Bounded by the field table size."
            )]
            elements.push(Element::new(FieldId(i as u16), content));
        }
        self.create_node(parent, NodeKind::Entry, elements)
    }

    fn create_node(
        &mut self,
        parent: Option<NodeId>,
        kind: NodeKind,
        elements: Elements,
    ) -> Result<NodeId, TreeError> {
        if let Some(p) = parent {
            let parent_node = self.node_opt(p).ok_or(TreeError::StaleNode)?;
            if !parent_node.is_folder() {
                log::debug!("declined to create a child of entry {p:?}");
                return Err(TreeError::NotAFolder);
            }
        }
        // Reserve everything up front so a failure leaves the tree untouched.
        if self.free_list.is_empty() {
            self.nodes.try_reserve(1)?;
            self.generations.try_reserve(1)?;
        }
        self.rows.try_reserve(1)?;
        self.row_boxes.try_reserve(1)?;
        if let Some(p) = parent {
            self.node_mut(p).children.try_reserve(1)?;
        }

        let id = self.alloc(kind, elements);
        if let Some(p) = parent {
            self.node_mut(p).children.push(id);
            self.node_mut(id).parent = Some(p);
            self.relayout();
        }
        Ok(id)
    }

    fn alloc(&mut self, kind: NodeKind, elements: Elements) -> NodeId {
        let flags = NodeFlags::default();
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, kind, flags, elements));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes
                .push(Some(Node::new(generation, kind, flags, elements)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        NodeId::new(idx, generation)
    }

    // --- structure ---

    /// Insert an unattached `node` relative to `relation`.
    ///
    /// Declines without changing anything when the request is malformed: the
    /// root or an already linked node cannot be linked, entries cannot take
    /// children, the root cannot take siblings, and `relation` must not lie
    /// inside `node`'s own subtree.
    pub fn link(
        &mut self,
        node: NodeId,
        relation: NodeId,
        relationship: Relation,
    ) -> Result<(), TreeError> {
        if !self.is_alive(node) || !self.is_alive(relation) {
            return Err(TreeError::StaleNode);
        }
        if node == self.root {
            return Err(TreeError::Root);
        }
        if self.node(node).parent.is_some() {
            log::debug!("declined to link {node:?}: already linked");
            return Err(TreeError::AlreadyLinked);
        }
        if self.is_ancestor_or_self(node, relation) {
            log::debug!("declined to link {node:?} into its own subtree");
            return Err(TreeError::Cycle);
        }
        let (parent, index) = match relationship {
            Relation::FirstChild => {
                if !self.node(relation).is_folder() {
                    log::debug!("declined to link {node:?} as child of entry {relation:?}");
                    return Err(TreeError::NotAFolder);
                }
                (relation, 0)
            }
            Relation::NextSibling | Relation::PrevSibling => {
                let Some(parent) = self.node(relation).parent else {
                    log::debug!("declined to link {node:?} beside parentless {relation:?}");
                    return Err(if relation == self.root {
                        TreeError::Root
                    } else {
                        TreeError::Unlinked
                    });
                };
                let pos = self.child_position(parent, relation);
                let index = if relationship == Relation::NextSibling {
                    pos + 1
                } else {
                    pos
                };
                (parent, index)
            }
        };
        self.node_mut(parent).children.try_reserve(1)?;
        self.insert_child(parent, index, node);
        self.relayout();
        Ok(())
    }

    /// Remove `node` from its parent without freeing it.
    ///
    /// The node and its subtree stay alive and keep their state, ready to be
    /// linked elsewhere. Delinking an unattached node is a no-op.
    pub fn delink(&mut self, node: NodeId) -> Result<(), TreeError> {
        if !self.is_alive(node) {
            return Err(TreeError::StaleNode);
        }
        if node == self.root {
            return Err(TreeError::Root);
        }
        if self.node(node).parent.is_some() {
            self.unlink_parent(node);
            self.relayout();
        }
        Ok(())
    }

    /// Free `node` and every descendant, children before parents.
    ///
    /// With `notify`, the owner receives [`OwnerEvent::Deleted`] for each node
    /// just before it is freed. An edit session inside the subtree is cancelled.
    pub fn delete_subtree(&mut self, node: NodeId, notify: bool) -> Result<(), TreeError> {
        if !self.is_alive(node) {
            return Err(TreeError::StaleNode);
        }
        if node == self.root {
            log::debug!("declined to delete the root");
            return Err(TreeError::Root);
        }
        if let Some(edit) = &self.edit
            && self.is_ancestor_or_self(node, edit.element.node)
        {
            log::debug!("cancelling edit of {:?}: node deleted", edit.element);
            self.edit = None;
        }
        if self.node(node).parent.is_some() {
            self.unlink_parent(node);
        }
        let mut doomed = self.subtree(node);
        doomed.reverse();
        for id in doomed {
            if notify {
                let user_data = self.node(id).elements[0].user_data;
                self.notify(OwnerEvent::Deleted { node: id, user_data });
            }
            self.nodes[id.idx()] = None;
            self.free_list.push(id.idx());
        }
        if self.batching() {
            self.forget_dead_rows();
        }
        self.relayout();
        Ok(())
    }

    /// Expand or collapse a folder.
    ///
    /// Returns whether anything changed; entries ignore the request. Collapsing
    /// deselects the hidden descendants and commits an edit among them.
    pub fn set_expanded(&mut self, node: NodeId, expanded: bool) -> Result<bool, TreeError> {
        let n = self.node_opt(node).ok_or(TreeError::StaleNode)?;
        if node == self.root {
            return Err(TreeError::Root);
        }
        if !n.is_folder() || n.flags.contains(NodeFlags::EXPANDED) == expanded {
            return Ok(false);
        }
        if !expanded {
            if let Some(edit) = &self.edit
                && edit.element.node != node
                && self.is_ancestor_or_self(node, edit.element.node)
            {
                self.commit_edit();
            }
            for id in self.subtree(node).into_iter().skip(1) {
                self.node_mut(id).flags.remove(NodeFlags::SELECTED);
            }
        }
        self.node_mut(node).flags.set(NodeFlags::EXPANDED, expanded);
        // The furniture glyph changes even when no rows move.
        self.invalidate_row(node);
        self.relayout();
        Ok(true)
    }

    /// Flip a folder between expanded and collapsed.
    pub fn toggle_expanded(&mut self, node: NodeId) -> Result<bool, TreeError> {
        let expanded = self.is_expanded(node);
        self.set_expanded(node, !expanded)
    }

    /// Expand every folder.
    pub fn expand_all(&mut self) {
        self.batch(|tree| {
            for id in tree.subtree(tree.root) {
                if tree.node(id).is_folder() {
                    tree.node_mut(id).flags.insert(NodeFlags::EXPANDED);
                }
            }
        });
    }

    /// Collapse every folder below the root.
    pub fn collapse_all(&mut self) {
        let root = self.root;
        for id in self.children_of(root).to_vec() {
            // Collapsing the top level hides and deselects everything deeper.
            if let Err(err) = self.set_expanded(id, false) {
                log::debug!("could not collapse {id:?}: {err}");
            }
        }
        self.batch(|tree| {
            for id in tree.subtree(root).into_iter().skip(1) {
                tree.node_mut(id).flags.remove(NodeFlags::EXPANDED);
            }
        });
    }

    // --- node queries ---

    /// Returns true if `id` refers to a live node.
    ///
    /// A `NodeId` is considered live if its slot exists and its generation matches
    /// the current generation stored in that slot.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .map(|n| n.generation == id.1)
            .unwrap_or(false)
    }

    /// Whether `id` is live and reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.is_alive(id) && self.is_ancestor_or_self(self.root, id)
    }

    /// Folder or entry, for a live node.
    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.node_opt(id).map(|n| n.kind)
    }

    /// Whether `id` is a live folder.
    pub fn is_folder(&self, id: NodeId) -> bool {
        self.node_opt(id).is_some_and(Node::is_folder)
    }

    /// Returns the state flags of a live node.
    pub fn node_flags(&self, id: NodeId) -> Option<NodeFlags> {
        self.node_opt(id).map(|n| n.flags)
    }

    /// Whether `id` is a live, expanded folder.
    pub fn is_expanded(&self, id: NodeId) -> bool {
        self.node_opt(id).is_some_and(Node::shows_children)
    }

    /// Whether `id` is live and selected.
    pub fn is_selected(&self, id: NodeId) -> bool {
        self.node_opt(id)
            .is_some_and(|n| n.flags.contains(NodeFlags::SELECTED))
    }

    /// Whether `id` is live and editable.
    pub fn is_editable(&self, id: NodeId) -> bool {
        self.node_opt(id)
            .is_some_and(|n| n.flags.contains(NodeFlags::EDITABLE))
    }

    /// Allow or forbid in-place editing of a node. The root is never editable.
    pub fn set_editable(&mut self, id: NodeId, editable: bool) -> Result<(), TreeError> {
        if id == self.root {
            return Err(TreeError::Root);
        }
        let n = self.node_opt_mut(id).ok_or(TreeError::StaleNode)?;
        n.flags.set(NodeFlags::EDITABLE, editable);
        Ok(())
    }

    /// Returns the parent of a node if live, or `None` for the root, unattached nodes, or stale ids.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node_opt(id).and_then(|n| n.parent)
    }

    /// Get the children of a node, or empty slice if node is stale.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        match self.node_opt(id) {
            Some(n) => &n.children,
            None => &[],
        }
    }

    /// Row box of a visible node as of the last layout pass.
    pub fn node_bounds(&self, id: NodeId) -> Option<Rect> {
        self.node_opt(id).filter(|n| n.row.is_some()).map(|n| n.bounds)
    }

    /// Visible row index of a node.
    pub fn row_of(&self, id: NodeId) -> Option<usize> {
        self.node_opt(id).and_then(|n| n.row)
    }

    /// Nesting level of a visible node; top-level rows are at depth 0.
    pub fn depth_of(&self, id: NodeId) -> Option<usize> {
        self.node_opt(id).filter(|n| n.row.is_some()).map(|n| n.depth)
    }

    /// Visible nodes in display order as of the last layout pass.
    pub fn visible_rows(&self) -> &[NodeId] {
        &self.rows
    }

    /// Get the next node in depth-first traversal order.
    ///
    /// Collapsed folders are descended into. Returns `None` if no next node
    /// exists or if the current node is stale.
    pub fn next_depth_first(&self, current: NodeId) -> Option<NodeId> {
        if !self.is_alive(current) {
            return None;
        }
        if let Some(&first_child) = self.node(current).children.first() {
            return Some(first_child);
        }
        let mut node = current;
        while let Some(parent) = self.parent_of(node) {
            if let Some(next_sibling) = self.sibling(node, 1) {
                return Some(next_sibling);
            }
            node = parent;
        }
        None
    }

    /// Get the previous node in reverse depth-first traversal order.
    pub fn prev_depth_first(&self, current: NodeId) -> Option<NodeId> {
        if !self.is_alive(current) {
            return None;
        }
        if let Some(mut node) = self.sibling(current, -1) {
            while let Some(&last_child) = self.node(node).children.last() {
                node = last_child;
            }
            return Some(node);
        }
        self.parent_of(current)
    }

    /// Whether `ancestor` is `node` or one of its ancestors.
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent_of(id);
        }
        false
    }

    /// `node` and all its descendants in document order.
    pub(crate) fn subtree(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.node(id).children.iter().rev().copied());
        }
        out
    }

    // --- elements ---

    /// Access an element.
    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.node_opt(id.node)?.elements.get(id.index)
    }

    /// All elements of a node, primary first.
    pub fn elements_of(&self, node: NodeId) -> &[Element] {
        match self.node_opt(node) {
            Some(n) => &n.elements,
            None => &[],
        }
    }

    /// The first element of `node` showing `field`.
    pub fn find_element(&self, node: NodeId, field: FieldId) -> Option<ElementId> {
        let index = self
            .node_opt(node)?
            .elements
            .iter()
            .position(|e| e.field == field)?;
        Some(ElementId { node, index })
    }

    /// Attach an extra element to a node. It is laid out after the existing ones.
    pub fn add_element(
        &mut self,
        node: NodeId,
        field: FieldId,
        content: ElementContent,
    ) -> Result<ElementId, TreeError> {
        if self.field(field).is_none() {
            return Err(TreeError::NoSuchElement);
        }
        let n = self.node_opt_mut(node).ok_or(TreeError::StaleNode)?;
        n.elements
            .try_reserve(1)
            .map_err(|_| TreeError::OutOfMemory)?;
        n.elements.push(Element::new(field, content));
        let index = n.elements.len() - 1;
        self.invalidate_row(node);
        self.relayout();
        Ok(ElementId { node, index })
    }

    /// Replace an element's text. A sprite-only element gains the text after its icon.
    pub fn set_element_text(&mut self, id: ElementId, text: &str) -> Result<(), TreeError> {
        let new_text = try_string(text)?;
        let element = self.element_mut(id)?;
        match &mut element.content {
            ElementContent::Text(t) | ElementContent::TextPlusSprite { text: t, .. } => {
                *t = new_text;
            }
            ElementContent::Sprite(sprite) => {
                let sprite = *sprite;
                element.content = ElementContent::TextPlusSprite {
                    text: new_text,
                    sprite,
                };
            }
        }
        self.invalidate_row(id.node);
        self.relayout();
        Ok(())
    }

    /// Set an element's opaque user data. Nothing is redrawn.
    pub fn set_user_data(&mut self, id: ElementId, user_data: u64) -> Result<(), TreeError> {
        self.element_mut(id)?.user_data = user_data;
        Ok(())
    }

    /// Give a node's primary element an icon, or remove it.
    pub fn set_node_sprite(
        &mut self,
        node: NodeId,
        sprite: Option<SpriteId>,
    ) -> Result<(), TreeError> {
        let element = self.element_mut(ElementId::primary(node))?;
        let content = core::mem::replace(&mut element.content, ElementContent::Text(String::new()));
        element.content = match (content, sprite) {
            (ElementContent::Text(text) | ElementContent::TextPlusSprite { text, .. }, Some(sprite)) => {
                ElementContent::TextPlusSprite { text, sprite }
            }
            (ElementContent::Sprite(_), Some(sprite)) => ElementContent::Sprite(sprite),
            (ElementContent::Text(text) | ElementContent::TextPlusSprite { text, .. }, None) => {
                ElementContent::Text(text)
            }
            (ElementContent::Sprite(_), None) => ElementContent::Text(String::new()),
        };
        self.invalidate_row(node);
        self.relayout();
        Ok(())
    }

    fn element_mut(&mut self, id: ElementId) -> Result<&mut Element, TreeError> {
        self.node_opt_mut(id.node)
            .ok_or(TreeError::StaleNode)?
            .elements
            .get_mut(id.index)
            .ok_or(TreeError::NoSuchElement)
    }

    // --- damage ---

    /// Queue a tree-local rectangle for repaint. Dropped while batching.
    pub fn invalidate(&mut self, rect: Rect) {
        if self.batching() || rect.is_zero_area() {
            return;
        }
        self.damage.dirty_rects.push(rect);
    }

    /// Drain the queued damage.
    pub fn take_damage(&mut self) -> Damage {
        core::mem::take(&mut self.damage)
    }

    /// Queue the full-width row of a visible node.
    pub(crate) fn invalidate_row(&mut self, node: NodeId) {
        if let Some(b) = self.node_bounds(node) {
            let width = self.extent.width.max(b.x1);
            self.invalidate(Rect::new(0.0, b.y0, width, b.y1));
        }
    }

    // --- internals ---

    /// Access a node; panics if `id` is stale.
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        self.nodes[id.idx()].as_ref().expect("dangling NodeId")
    }

    /// Access a node mutably; panics if `id` is stale.
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes[id.idx()].as_mut().expect("dangling NodeId")
    }

    pub(crate) fn node_opt(&self, id: NodeId) -> Option<&Node> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        (n.generation == id.1).then_some(n)
    }

    pub(crate) fn node_opt_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    /// Drop freed nodes from the row table while layout is deferred.
    ///
    /// Surviving rows keep their boxes, so the table has gaps until the next
    /// layout pass.
    fn forget_dead_rows(&mut self) {
        let mut kept = 0;
        for i in 0..self.rows.len() {
            if self.is_alive(self.rows[i]) {
                self.rows.swap(kept, i);
                self.row_boxes.swap(kept, i);
                kept += 1;
            }
        }
        self.rows.truncate(kept);
        self.row_boxes.truncate(kept);
    }

    pub(crate) fn child_position(&self, parent: NodeId, child: NodeId) -> usize {
        self.node(parent)
            .children
            .iter()
            .position(|&c| c == child)
            .expect("child listed under its parent")
    }

    /// Insert an unattached node into `parent`'s children. Capacity must already be reserved.
    pub(crate) fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.node_mut(parent).children.insert(index, child);
        self.node_mut(child).parent = Some(parent);
    }

    pub(crate) fn unlink_parent(&mut self, id: NodeId) {
        if let Some(parent) = self.node_mut(id).parent.take() {
            self.node_mut(parent).children.retain(|c| *c != id);
        }
    }

    fn sibling(&self, node: NodeId, offset: isize) -> Option<NodeId> {
        let parent = self.parent_of(node)?;
        let siblings = &self.node(parent).children;
        let pos = siblings.iter().position(|&id| id == node)?;
        siblings.get(pos.checked_add_signed(offset)?).copied()
    }
}
