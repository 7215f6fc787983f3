// Copyright 2025 the Glade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Configuration errors reported by tree, overlap and auto-overlap operations.

use core::fmt;

use crate::types::{ComposedId, NodeId, NodeKind, OverlapId};

/// A rejected operation.
///
/// Every variant is a configuration error: the operation did nothing (or
/// stopped before mutating anything) and the tree is still consistent.
/// Rejections are also reported on the `log` channel at `warn` level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SceneError {
    /// The node handle is stale.
    StaleNode(NodeId),
    /// The overlap handle is stale.
    StaleOverlap(OverlapId),
    /// The composed overlap handle is stale.
    StaleComposed(ComposedId),
    /// Adding `child` under `parent` would make `child` its own ancestor.
    WouldCycle {
        /// Requested parent.
        parent: NodeId,
        /// Requested child.
        child: NodeId,
    },
    /// The payload accessor does not match the node's kind.
    KindMismatch {
        /// Node addressed.
        node: NodeId,
        /// Kind the accessor needs.
        expected: NodeKind,
        /// Kind the node has.
        actual: NodeKind,
    },
    /// The overlap is already attached to another node.
    OverlapAttached {
        /// Overlap being attached.
        overlap: OverlapId,
        /// Node currently holding it.
        node: NodeId,
    },
    /// The composed overlap is already anchored to another node.
    ComposedAnchored {
        /// Composed overlap being attached.
        composed: ComposedId,
        /// Node currently holding it.
        node: NodeId,
    },
    /// The overlap already belongs to a composed overlap.
    AlreadyComposed {
        /// Overlap being added.
        overlap: OverlapId,
        /// Composed overlap that owns it.
        composed: ComposedId,
    },
    /// The node (or overlap owner) participates in an auto-overlap, so its
    /// hit region is managed by the builder.
    AutoOverlapChild(NodeId),
    /// The node has not opted into auto-overlap.
    AutoOverlapDisabled(NodeId),
    /// The subtree under `root` contains `member`, which belongs to the
    /// auto-overlap rooted at `owner` outside that subtree.
    ForeignAutoOverlap {
        /// Requested auto-overlap root.
        root: NodeId,
        /// Offending descendant.
        member: NodeId,
        /// Root of the auto-overlap that owns `member`.
        owner: NodeId,
    },
    /// The node is not the root of a built auto-overlap.
    NotAutoOverlapRoot(NodeId),
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaleNode(id) => write!(f, "node {id:?} is not alive"),
            Self::StaleOverlap(id) => write!(f, "overlap {id:?} is not alive"),
            Self::StaleComposed(id) => write!(f, "composed overlap {id:?} is not alive"),
            Self::WouldCycle { parent, child } => write!(
                f,
                "adding {child:?} under {parent:?} would make it its own ancestor"
            ),
            Self::KindMismatch {
                node,
                expected,
                actual,
            } => write!(f, "node {node:?} is {actual:?}, expected {expected:?}"),
            Self::OverlapAttached { overlap, node } => write!(
                f,
                "overlap {overlap:?} is already attached to node {node:?}"
            ),
            Self::ComposedAnchored { composed, node } => write!(
                f,
                "composed overlap {composed:?} is already anchored to node {node:?}"
            ),
            Self::AlreadyComposed { overlap, composed } => write!(
                f,
                "overlap {overlap:?} already belongs to composed overlap {composed:?}"
            ),
            Self::AutoOverlapChild(id) => write!(
                f,
                "node {id:?} is part of an auto-overlap; its hit region is managed by the builder"
            ),
            Self::AutoOverlapDisabled(id) => {
                write!(f, "auto-overlap is not enabled on node {id:?}")
            }
            Self::ForeignAutoOverlap {
                root,
                member,
                owner,
            } => write!(
                f,
                "cannot build auto-overlap on {root:?}: descendant {member:?} belongs to the auto-overlap of {owner:?}"
            ),
            Self::NotAutoOverlapRoot(id) => {
                write!(f, "node {id:?} is not the root of a built auto-overlap")
            }
        }
    }
}

impl core::error::Error for SceneError {}

/// Report `err` on the diagnostic channel and return it.
pub(crate) fn reject<T>(err: SceneError) -> Result<T, SceneError> {
    log::warn!("{err}");
    Err(err)
}
