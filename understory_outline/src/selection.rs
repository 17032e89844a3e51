// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Selection state and operations on the selected nodes.

use alloc::vec::Vec;
use hashbrown::HashSet;
use kurbo::Rect;

use crate::error::TreeError;
use crate::owner::OwnerEvent;
use crate::tree::Tree;
use crate::types::{NodeFlags, NodeId, Relation, TreeFlags};
use crate::util::{normalized, selects_row};

impl Tree {
    /// Select or deselect one node. The root can never be selected.
    ///
    /// With [`TreeFlags::SINGLE_SELECTION`], selecting a node deselects every other node.
    pub fn set_selected(&mut self, node: NodeId, selected: bool) -> Result<(), TreeError> {
        if node == self.root {
            return Err(TreeError::Root);
        }
        if !self.is_alive(node) {
            return Err(TreeError::StaleNode);
        }
        if selected && self.flags.contains(TreeFlags::SINGLE_SELECTION) {
            for id in self.selected_ids() {
                if id != node {
                    self.mark_selected(id, false);
                }
            }
        }
        self.mark_selected(node, selected);
        Ok(())
    }

    /// Select or deselect `node` and every descendant. The root itself is skipped.
    pub fn set_subtree_selected(&mut self, node: NodeId, selected: bool) -> Result<(), TreeError> {
        if !self.is_alive(node) {
            return Err(TreeError::StaleNode);
        }
        for id in self.subtree(node) {
            if id != self.root {
                self.mark_selected(id, selected);
            }
        }
        Ok(())
    }

    /// Deselect every node.
    pub fn clear_selection(&mut self) {
        for id in self.selected_ids() {
            self.mark_selected(id, false);
        }
    }

    /// Select every visible row.
    ///
    /// Does nothing on a [`TreeFlags::SINGLE_SELECTION`] tree.
    pub fn select_all(&mut self) {
        if self.flags.contains(TreeFlags::SINGLE_SELECTION) {
            log::debug!("declined to select all in a single-selection tree");
            return;
        }
        for id in self.rows.clone() {
            self.mark_selected(id, true);
        }
    }

    /// Whether any node reachable from the root is selected.
    pub fn has_selection(&self) -> bool {
        self.find_selected().is_some()
    }

    /// The first selected node in document order.
    pub fn find_selected(&self) -> Option<NodeId> {
        let mut next = self.next_depth_first(self.root);
        while let Some(id) = next {
            if self.is_selected(id) {
                return Some(id);
            }
            next = self.next_depth_first(id);
        }
        None
    }

    /// Selected nodes that have no selected ancestor, in document order.
    pub fn selected_nodes(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children_of(self.root).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if self.is_selected(id) {
                out.push(id);
            } else {
                stack.extend(self.children_of(id).iter().rev().copied());
            }
        }
        out
    }

    /// Select the rows touched by a tree-local rectangle.
    ///
    /// Without `toggle`, touched rows become selected and every other node is
    /// deselected, even when the rectangle touches nothing. With `toggle`,
    /// touched rows flip and nothing else changes. A rectangle with no height
    /// touches the row it lies in.
    pub fn set_range_selected(&mut self, rect: Rect, toggle: bool) {
        let rect = normalized(rect);
        let mut touched: Vec<NodeId> = self
            .rows
            .iter()
            .zip(&self.row_boxes)
            .filter(|(_, b)| selects_row(rect, **b))
            .map(|(id, _)| *id)
            .collect();
        if self.flags.contains(TreeFlags::SINGLE_SELECTION) {
            touched.truncate(1);
        }
        if toggle {
            for id in touched {
                let selected = self.is_selected(id);
                if let Err(err) = self.set_selected(id, !selected) {
                    log::debug!("could not toggle {id:?}: {err}");
                }
            }
            return;
        }
        let keep: HashSet<NodeId> = touched.iter().copied().collect();
        for id in self.selected_ids() {
            if !keep.contains(&id) {
                self.mark_selected(id, false);
            }
        }
        for id in touched {
            self.mark_selected(id, true);
        }
    }

    /// Move the selected nodes next to `target`.
    ///
    /// The top-most selected nodes (excluding `target`) are delinked and
    /// relinked as consecutive siblings directly before or after `target`,
    /// keeping their document order. Nodes that end up hidden are deselected.
    pub fn move_selected_nodes(&mut self, target: NodeId, before: bool) -> Result<(), TreeError> {
        let relation = if before {
            Relation::PrevSibling
        } else {
            Relation::NextSibling
        };
        self.move_selected_nodes_to(target, relation)
    }

    /// Move the selected nodes to `relation` of `target`.
    ///
    /// Like [`Tree::move_selected_nodes`], and [`Relation::FirstChild`] places
    /// the nodes at the start of the folder `target`, which may be the root.
    pub fn move_selected_nodes_to(
        &mut self,
        target: NodeId,
        relation: Relation,
    ) -> Result<(), TreeError> {
        if self.flags.contains(TreeFlags::NO_MOVES) {
            log::debug!("declined to move nodes: tree does not allow moves");
            return Err(TreeError::NotPermitted);
        }
        if !self.is_alive(target) {
            return Err(TreeError::StaleNode);
        }
        let parent = match relation {
            Relation::FirstChild => {
                if !self.node(target).is_folder() {
                    log::debug!("declined to move nodes into entry {target:?}");
                    return Err(TreeError::NotAFolder);
                }
                if !self.is_attached(target) {
                    log::debug!("declined to move nodes into unlinked {target:?}");
                    return Err(TreeError::Unlinked);
                }
                target
            }
            Relation::NextSibling | Relation::PrevSibling => {
                if target == self.root {
                    return Err(TreeError::Root);
                }
                let Some(parent) = self.parent_of(target).filter(|_| self.is_attached(target))
                else {
                    log::debug!("declined to move nodes next to unlinked {target:?}");
                    return Err(TreeError::Unlinked);
                };
                parent
            }
        };
        let moving: Vec<NodeId> = self
            .selected_nodes()
            .into_iter()
            .filter(|&id| id != target)
            .collect();
        if moving.is_empty() {
            return Ok(());
        }
        if moving.iter().any(|&m| self.is_ancestor_or_self(m, target)) {
            log::debug!("declined to move nodes into their own subtree at {target:?}");
            return Err(TreeError::Cycle);
        }
        self.node_mut(parent).children.try_reserve(moving.len())?;

        for &id in &moving {
            self.unlink_parent(id);
        }
        let index = match relation {
            Relation::FirstChild => 0,
            Relation::PrevSibling => self.child_position(parent, target),
            Relation::NextSibling => self.child_position(parent, target) + 1,
        };
        for (i, &id) in moving.iter().enumerate() {
            self.insert_child(parent, index + i, id);
        }
        if !self.is_expanded(parent) || (parent != self.root && self.row_of(parent).is_none()) {
            for &id in &moving {
                for hidden in self.subtree(id) {
                    self.node_mut(hidden).flags.remove(NodeFlags::SELECTED);
                }
            }
        }
        self.relayout();
        Ok(())
    }

    /// Delete the top-most selected nodes and their subtrees, notifying the owner.
    ///
    /// With [`TreeFlags::DELETE_EMPTY_FOLDERS`], folders left without children
    /// are deleted as well, walking up until a non-empty folder is reached.
    /// Returns the number of selected subtrees deleted.
    pub fn delete_selection(&mut self) -> Result<usize, TreeError> {
        if self.flags.contains(TreeFlags::NO_DELETES) {
            log::debug!("declined to delete selection: tree does not allow deletes");
            return Err(TreeError::NotPermitted);
        }
        let doomed = self.selected_nodes();
        let prune = self.flags.contains(TreeFlags::DELETE_EMPTY_FOLDERS);
        self.batch(|tree| {
            for &id in &doomed {
                let mut parent = tree.parent_of(id);
                tree.delete_subtree(id, true)?;
                if !prune {
                    continue;
                }
                while let Some(folder) = parent {
                    if folder == tree.root || !tree.children_of(folder).is_empty() {
                        break;
                    }
                    parent = tree.parent_of(folder);
                    tree.delete_subtree(folder, true)?;
                }
            }
            Ok(doomed.len())
        })
    }

    /// Notify the owner that the selected entries should be opened.
    ///
    /// Selected folders launch every entry inside them, including hidden ones.
    /// Entries are launched in document order; the count is returned.
    pub fn launch_selection(&mut self) -> usize {
        let mut launched = Vec::new();
        for top in self.selected_nodes() {
            launched.extend(
                self.subtree(top)
                    .into_iter()
                    .filter(|&id| !self.is_folder(id)),
            );
        }
        for &id in &launched {
            let user_data = self.node(id).elements[0].user_data;
            self.notify(OwnerEvent::Launched { node: id, user_data });
        }
        launched.len()
    }

    /// Live nodes with the selected flag, in arena order.
    fn selected_ids(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .zip(&self.generations)
            .enumerate()
            .filter(|(_, (n, _))| {
                n.as_ref()
                    .is_some_and(|n| n.flags.contains(NodeFlags::SELECTED))
            })
            .map(|(i, (_, &generation))| {
                #[allow(
                    clippy::cast_possible_truncation,
                    reason = "NodeId uses 32-bit indices by design."
                )]
                NodeId::new(i as u32, generation)
            })
            .collect()
    }

    /// Flip the selected flag and damage the row if it changed.
    fn mark_selected(&mut self, id: NodeId, selected: bool) -> bool {
        let Some(node) = self.node_opt_mut(id) else {
            return false;
        };
        if node.flags.contains(NodeFlags::SELECTED) == selected {
            return false;
        }
        node.flags.set(NodeFlags::SELECTED, selected);
        self.invalidate_row(id);
        true
    }
}
