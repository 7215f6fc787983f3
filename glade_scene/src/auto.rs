// Copyright 2025 the Glade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Auto-overlap: one composed hit region derived from a whole subtree.
//!
//! Building walks the subtree root-first, gives every node with a non-zero
//! resolved size a rectangle centered on it, and collects the rectangles in
//! a fresh composed overlap anchored to the root. Every swept node, the root
//! included, then rejects manual overlap changes until the auto-overlap is
//! destroyed. Rebuilding always tears down and starts over.

use alloc::vec::Vec;
use hashbrown::HashSet;
use kurbo::Size;

use crate::error::{SceneError, reject};
use crate::id::Entity;
use crate::measure::ContentMeasure;
use crate::overlap::{Overlap, OverlapState};
use crate::tree::Tree;
use crate::types::{ComposedId, NodeId, OverlapId};
use crate::util::centered;

/// State held by the root of a built auto-overlap.
#[derive(Clone, Debug)]
pub struct AutoOverlap {
    composed: ComposedId,
    own: Option<OverlapId>,
    swept: Vec<NodeId>,
}

impl AutoOverlap {
    /// The composed overlap holding every rectangle.
    pub fn composed(&self) -> ComposedId {
        self.composed
    }

    /// Rectangle contributed by the root itself, if its size was non-zero.
    pub fn own(&self) -> Option<OverlapId> {
        self.own
    }

    /// Descendants swept in by the last build, root-first.
    pub fn swept(&self) -> &[NodeId] {
        &self.swept
    }
}

impl Tree {
    /// Opt a node in or out of being an auto-overlap root.
    ///
    /// Only the flag changes; a built auto-overlap stays built.
    pub fn set_auto_overlap_enabled(
        &mut self,
        node: NodeId,
        enabled: bool,
    ) -> Result<(), SceneError> {
        match self.nodes.get_mut(node) {
            Some(n) => {
                n.auto_enabled = enabled;
                Ok(())
            }
            None => reject(SceneError::StaleNode(node)),
        }
    }

    /// Whether `node` has opted into being an auto-overlap root.
    pub fn auto_overlap_enabled(&self, node: NodeId) -> bool {
        self.nodes.get(node).is_some_and(|n| n.auto_enabled)
    }

    /// Whether `node` takes part in a built auto-overlap, as root or member.
    pub fn is_auto_overlap_child(&self, node: NodeId) -> bool {
        self.nodes.get(node).is_some_and(|n| n.overlap.is_auto())
    }

    /// Whether `node` is the root of a built auto-overlap.
    pub fn is_auto_overlap_built(&self, node: NodeId) -> bool {
        self.auto_overlap_of(node).is_some()
    }

    /// Auto-overlap rooted at `node`, if built.
    pub fn auto_overlap_of(&self, node: NodeId) -> Option<&AutoOverlap> {
        match &self.nodes.get(node)?.overlap {
            OverlapState::AutoRoot(auto) => Some(auto),
            _ => None,
        }
    }

    /// Build the auto-overlap of the subtree rooted at `root`.
    ///
    /// The root must have auto-overlap enabled and must not be a member of
    /// another auto-overlap; its descendants are swept in regardless of their
    /// own flag. A subtree holding a member of an auto-overlap rooted outside
    /// it is rejected. Nothing is mutated on rejection.
    ///
    /// An existing auto-overlap on `root` is torn down first, as are nested
    /// auto-overlaps rooted inside the subtree. Manual overlaps on the root
    /// and on swept descendants are detached (they stay alive).
    ///
    /// Returns the new composed overlap, anchored to `root`.
    pub fn build_auto_overlap(
        &mut self,
        root: NodeId,
        measure: &(impl ContentMeasure + ?Sized),
    ) -> Result<ComposedId, SceneError> {
        let Some(node) = self.nodes.get(root) else {
            return reject(SceneError::StaleNode(root));
        };
        if matches!(node.overlap, OverlapState::AutoMember { .. }) {
            return reject(SceneError::AutoOverlapChild(root));
        }
        if !node.auto_enabled {
            return reject(SceneError::AutoOverlapDisabled(root));
        }
        let subtree = self.subtree(root);
        for &n in &subtree[1..] {
            if let OverlapState::AutoMember { root: owner, .. } = self.node(n).overlap {
                if !self.is_ancestor_or_self(root, owner) {
                    return reject(SceneError::ForeignAutoOverlap {
                        root,
                        member: n,
                        owner,
                    });
                }
            }
        }

        // Teardown: our own auto-overlap, then any nested roots.
        for &n in &subtree {
            if matches!(self.node(n).overlap, OverlapState::AutoRoot(_)) {
                self.destroy_auto_overlap(n)?;
            }
        }
        for &n in &subtree {
            if let OverlapState::Manual(region) = self.node(n).overlap {
                if n != root {
                    log::warn!(
                        "detaching manual overlap of {n:?}: swept into auto-overlap of {root:?}"
                    );
                }
                self.detach_region(region);
                self.node_mut(n).overlap = OverlapState::Free;
            }
        }

        let composed = self.create_composed();
        if let Some(c) = self.composed.get_mut(composed) {
            c.anchor = Some(root);
        }
        let mut root_own = None;
        for &n in &subtree {
            let size = self.calculated_size(n, measure).unwrap_or(Size::ZERO);
            let own = (size != Size::ZERO).then(|| self.auto_rect(n, composed, size));
            if n == root {
                root_own = own;
            } else {
                self.node_mut(n).overlap = OverlapState::AutoMember { root, own };
            }
        }
        let swept = subtree[1..].to_vec();
        log::debug!(
            "built auto-overlap on {root:?}: {} rectangles over {} nodes",
            self.members_of(composed).len(),
            subtree.len()
        );
        self.node_mut(root).overlap = OverlapState::AutoRoot(AutoOverlap {
            composed,
            own: root_own,
            swept,
        });
        Ok(composed)
    }

    /// Tear down the auto-overlap rooted at `root`.
    ///
    /// Frees every rectangle and the composed overlap, and returns the root
    /// and every swept node to having no hit region. Swept nodes that were
    /// removed from the tree or moved elsewhere in the meantime are handled.
    pub fn destroy_auto_overlap(&mut self, root: NodeId) -> Result<(), SceneError> {
        let Some(node) = self.nodes.get(root) else {
            return reject(SceneError::StaleNode(root));
        };
        if !matches!(node.overlap, OverlapState::AutoRoot(_)) {
            return reject(SceneError::NotAutoOverlapRoot(root));
        }
        let OverlapState::AutoRoot(auto) = core::mem::take(&mut self.node_mut(root).overlap)
        else {
            unreachable!("state checked above");
        };
        // Every member of the composite is builder-owned.
        self.composed.remove(auto.composed);
        for n in auto.swept {
            let Some(member) = self.nodes.get_mut(n) else {
                continue;
            };
            if let OverlapState::AutoMember { root: owner, own } = member.overlap {
                if owner == root {
                    member.overlap = OverlapState::Free;
                    if let Some(o) = own {
                        self.overlaps.remove(o);
                    }
                }
            }
        }
        if let Some(o) = auto.own {
            self.overlaps.remove(o);
        }
        log::debug!("destroyed auto-overlap on {root:?}");
        Ok(())
    }

    /// Drop `(root, member, own rectangle)` entries from their auto-overlaps
    /// as the members leave the tree, retaining each root's lists once.
    pub(crate) fn forget_auto_members(
        &mut self,
        leaving: &[(NodeId, NodeId, Option<OverlapId>)],
    ) {
        if leaving.is_empty() {
            return;
        }
        let mut roots = HashSet::new();
        let mut members = HashSet::new();
        let mut rects = HashSet::new();
        for &(root, member, own) in leaving {
            roots.insert(root);
            members.insert(member);
            if let Some(o) = own {
                if self.overlaps.remove(o).is_some() {
                    rects.insert(o);
                }
            }
        }
        for root in roots {
            let Some(OverlapState::AutoRoot(auto)) =
                self.nodes.get_mut(root).map(|n| &mut n.overlap)
            else {
                continue;
            };
            auto.swept.retain(|n| !members.contains(n));
            if let Some(c) = self.composed.get_mut(auto.composed) {
                c.members.retain(|m| !rects.contains(m));
            }
        }
    }

    /// Rectangle of `size` centered on `node`, owned by `composed`.
    fn auto_rect(&mut self, node: NodeId, composed: ComposedId, size: Size) -> OverlapId {
        let id = self.overlaps.insert(Overlap {
            entity: Entity::new(),
            local: centered(size),
            node: Some(node),
            composed: Some(composed),
        });
        if let Some(c) = self.composed.get_mut(composed) {
            c.members.push(id);
        }
        id
    }
}
