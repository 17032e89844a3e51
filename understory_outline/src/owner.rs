// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Notifications from the tree back to the feature that owns it.

use crate::types::{FieldId, NodeId};

/// Something happened to a node that its owner may want to act on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OwnerEvent<'a> {
    /// The node is about to be freed. Sent once per node, children first.
    Deleted {
        /// The node being freed; its handle is still live during the call.
        node: NodeId,
        /// User data of the node's primary element.
        user_data: u64,
    },
    /// An element's text was replaced by an in-place edit.
    Edited {
        /// The edited node.
        node: NodeId,
        /// The field of the edited element.
        field: FieldId,
        /// The committed text.
        text: &'a str,
        /// User data of the edited element.
        user_data: u64,
    },
    /// The user activated the node (double click or Enter).
    Launched {
        /// The launched entry.
        node: NodeId,
        /// User data of the node's primary element.
        user_data: u64,
    },
}

/// Receiver for [`OwnerEvent`]s.
///
/// Hotlist, history, and cookie panels each register one owner per tree.
pub trait Owner {
    /// Handle one event.
    fn node_event(&mut self, event: OwnerEvent<'_>);
}

impl<F> Owner for F
where
    F: FnMut(OwnerEvent<'_>),
{
    fn node_event(&mut self, event: OwnerEvent<'_>) {
        self(event);
    }
}
