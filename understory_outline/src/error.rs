// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors returned by tree operations.

/// Reasons a tree operation was declined.
///
/// Every operation that returns this error leaves the tree exactly as it was.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum TreeError {
    /// Memory for a node, element or text could not be reserved.
    #[error("out of memory")]
    OutOfMemory,
    /// The node handle refers to a node that has been deleted.
    #[error("stale node handle")]
    StaleNode,
    /// The node has no element at the requested index or for the requested field.
    #[error("no such element")]
    NoSuchElement,
    /// Children were requested of an entry node.
    #[error("node is not a folder")]
    NotAFolder,
    /// The root node cannot be linked, moved, deleted, or given siblings.
    #[error("operation not allowed on the root node")]
    Root,
    /// The node already has a parent; delink it first.
    #[error("node is already linked")]
    AlreadyLinked,
    /// The node is not reachable from the root.
    #[error("node is not linked into the tree")]
    Unlinked,
    /// The operation would make a node its own ancestor.
    #[error("node cannot be placed inside its own subtree")]
    Cycle,
    /// The element cannot be edited in place.
    #[error("element is not editable")]
    NotEditable,
    /// The tree flags forbid the operation.
    #[error("operation not permitted by tree flags")]
    NotPermitted,
}

impl From<alloc::collections::TryReserveError> for TreeError {
    fn from(_: alloc::collections::TryReserveError) -> Self {
        Self::OutOfMemory
    }
}
