// Copyright 2025 the Glade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overlaps, composed overlaps and hit-testing.
//!
//! An overlap is an axis-aligned rectangle stored relative to its anchor.
//! The anchor is the node it is attached to or, failing that, the anchor
//! node of the composed overlap it belongs to. Rectangle tests are strict
//! (shared edges do not count) while point tests are closed (boundaries do).

use alloc::string::String;
use alloc::vec::Vec;
use kurbo::{Point, Rect};
use smallvec::SmallVec;

use glade_input::PointerSource;

use crate::auto::AutoOverlap;
use crate::error::{SceneError, reject};
use crate::id::Entity;
use crate::tree::Tree;
use crate::types::{ComposedId, HitRegion, NodeId, OverlapId};
use crate::util::{UNRESOLVED_BOUNDS, contains_closed, offset, overlaps_strict};

/// Hit-region state of a node.
///
/// Exactly one of "manual" and "auto" can be active at a time; transitions
/// that would mix them are rejected.
#[derive(Clone, Debug, Default)]
pub enum OverlapState {
    /// No hit region.
    #[default]
    Free,
    /// A caller-attached overlap or composed overlap.
    Manual(HitRegion),
    /// Root of a built auto-overlap.
    ///
    /// The root is itself part of the auto-overlap, so it rejects manual
    /// overlap changes the same way members do.
    AutoRoot(AutoOverlap),
    /// Swept into the auto-overlap rooted at `root`.
    AutoMember {
        /// Root that owns the auto-overlap.
        root: NodeId,
        /// Rectangle this node contributed, if its size was non-zero.
        own: Option<OverlapId>,
    },
}

impl OverlapState {
    /// Whether the node participates in an auto-overlap (as root or member).
    pub fn is_auto(&self) -> bool {
        matches!(self, Self::AutoRoot(_) | Self::AutoMember { .. })
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Overlap {
    pub(crate) entity: Entity,
    /// Relative corners, exactly as given.
    pub(crate) local: Rect,
    pub(crate) node: Option<NodeId>,
    pub(crate) composed: Option<ComposedId>,
}

#[derive(Clone, Debug)]
pub(crate) struct ComposedOverlap {
    pub(crate) entity: Entity,
    pub(crate) anchor: Option<NodeId>,
    pub(crate) members: Vec<OverlapId>,
}

type RectList = SmallVec<[Rect; 4]>;

impl Tree {
    // --- overlaps ---

    /// Create a detached overlap from corners relative to its future anchor.
    ///
    /// Corners are stored as given; no normalization happens.
    pub fn create_overlap(&mut self, top_left: Point, bottom_right: Point) -> OverlapId {
        self.overlaps.insert(Overlap {
            entity: Entity::new(),
            local: Rect::new(top_left.x, top_left.y, bottom_right.x, bottom_right.y),
            node: None,
            composed: None,
        })
    }

    /// Destroy an overlap, detaching it from its node and composed overlap.
    ///
    /// Rectangles owned by an auto-overlap are rejected; tear the
    /// auto-overlap down instead.
    pub fn remove_overlap(&mut self, id: OverlapId) -> Result<(), SceneError> {
        let Some(ov) = self.overlaps.get(id) else {
            return reject(SceneError::StaleOverlap(id));
        };
        let (node, composed) = (ov.node, ov.composed);
        if let Some(node) = node {
            if self.node(node).overlap.is_auto() {
                return reject(SceneError::AutoOverlapChild(node));
            }
            self.node_mut(node).overlap = OverlapState::Free;
        }
        if let Some(c) = composed {
            if let Some(composed) = self.composed.get_mut(c) {
                composed.members.retain(|m| *m != id);
            }
        }
        self.overlaps.remove(id);
        Ok(())
    }

    /// Whether `id` refers to a live overlap.
    pub fn is_overlap_alive(&self, id: OverlapId) -> bool {
        self.overlaps.contains(id)
    }

    /// Identity of an overlap.
    pub fn overlap_entity(&self, id: OverlapId) -> Option<&Entity> {
        self.overlaps.get(id).map(|o| &o.entity)
    }

    /// Rename an overlap. Returns `false` for stale handles.
    pub fn set_overlap_name(&mut self, id: OverlapId, name: impl Into<String>) -> bool {
        match self.overlaps.get_mut(id) {
            Some(o) => {
                o.entity.set_name(name);
                true
            }
            None => false,
        }
    }

    /// Relative corners of an overlap.
    pub fn overlap_local(&self, id: OverlapId) -> Option<Rect> {
        self.overlaps.get(id).map(|o| o.local)
    }

    /// Replace the relative corners of an overlap.
    pub fn set_overlap_local(&mut self, id: OverlapId, local: Rect) {
        if let Some(o) = self.overlaps.get_mut(id) {
            o.local = local;
        }
    }

    /// Node the overlap is attached to.
    pub fn overlap_node(&self, id: OverlapId) -> Option<NodeId> {
        self.overlaps.get(id).and_then(|o| o.node)
    }

    /// Composed overlap the overlap belongs to.
    pub fn overlap_composed(&self, id: OverlapId) -> Option<ComposedId> {
        self.overlaps.get(id).and_then(|o| o.composed)
    }

    /// Absolute bounds: anchor absolute position plus the relative corners.
    ///
    /// The node anchor wins over composed membership. Without a resolvable
    /// anchor this logs an error and returns the `(-1, -1, -1, -1)` sentinel.
    pub fn overlap_bounds(&self, id: OverlapId) -> Rect {
        let Some(ov) = self.overlaps.get(id) else {
            log::error!("overlap {id:?} is not alive");
            return UNRESOLVED_BOUNDS;
        };
        let anchor = match (ov.node, ov.composed) {
            (Some(node), _) => self.absolute_position(node),
            (None, Some(c)) => self.composed_position(c),
            (None, None) => None,
        };
        match anchor {
            Some(p) => offset(ov.local, p.to_vec2()),
            None => {
                log::error!(
                    "overlap {id:?} (entity {}) has no anchor; its position is undefined",
                    ov.entity.id()
                );
                UNRESOLVED_BOUNDS
            }
        }
    }

    // --- composed overlaps ---

    /// Create an empty, unanchored composed overlap.
    pub fn create_composed(&mut self) -> ComposedId {
        self.composed.insert(ComposedOverlap {
            entity: Entity::new(),
            anchor: None,
            members: Vec::new(),
        })
    }

    /// Whether `id` refers to a live composed overlap.
    pub fn is_composed_alive(&self, id: ComposedId) -> bool {
        self.composed.contains(id)
    }

    /// Identity of a composed overlap.
    pub fn composed_entity(&self, id: ComposedId) -> Option<&Entity> {
        self.composed.get(id).map(|c| &c.entity)
    }

    /// Rename a composed overlap. Returns `false` for stale handles.
    pub fn set_composed_name(&mut self, id: ComposedId, name: impl Into<String>) -> bool {
        match self.composed.get_mut(id) {
            Some(c) => {
                c.entity.set_name(name);
                true
            }
            None => false,
        }
    }

    /// Append `overlap` to `composed`.
    ///
    /// An overlap belongs to at most one composed overlap; a second add is
    /// rejected rather than re-parenting it. The composite of a built
    /// auto-overlap only takes rectangles from its builder.
    pub fn compose(&mut self, composed: ComposedId, overlap: OverlapId) -> Result<(), SceneError> {
        let Some(c) = self.composed.get(composed) else {
            return reject(SceneError::StaleComposed(composed));
        };
        if let Some(anchor) = c.anchor {
            if self.node(anchor).overlap.is_auto() {
                return reject(SceneError::AutoOverlapChild(anchor));
            }
        }
        let Some(ov) = self.overlaps.get_mut(overlap) else {
            return reject(SceneError::StaleOverlap(overlap));
        };
        if let Some(owner) = ov.composed {
            return reject(SceneError::AlreadyComposed {
                overlap,
                composed: owner,
            });
        }
        ov.composed = Some(composed);
        if let Some(c) = self.composed.get_mut(composed) {
            c.members.push(overlap);
        }
        Ok(())
    }

    /// Members of a composed overlap, in insertion order.
    pub fn members_of(&self, id: ComposedId) -> &[OverlapId] {
        self.composed.get(id).map_or(&[], |c| &c.members)
    }

    /// Node a composed overlap is anchored to.
    pub fn composed_anchor(&self, id: ComposedId) -> Option<NodeId> {
        self.composed.get(id).and_then(|c| c.anchor)
    }

    /// Absolute position of a composed overlap: that of its anchor node.
    ///
    /// Logs an error and returns `None` when unanchored.
    pub fn composed_position(&self, id: ComposedId) -> Option<Point> {
        let Some(c) = self.composed.get(id) else {
            log::error!("composed overlap {id:?} is not alive");
            return None;
        };
        match c.anchor {
            Some(node) => self.absolute_position(node),
            None => {
                log::error!(
                    "composed overlap {id:?} (entity {}) has no anchor node",
                    c.entity.id()
                );
                None
            }
        }
    }

    /// Destroy a composed overlap. Its members stay alive, detached from it.
    ///
    /// The composite of a built auto-overlap is rejected.
    pub fn remove_composed(&mut self, id: ComposedId) -> Result<(), SceneError> {
        let Some(c) = self.composed.get(id) else {
            return reject(SceneError::StaleComposed(id));
        };
        if let Some(node) = c.anchor {
            if self.node(node).overlap.is_auto() {
                return reject(SceneError::AutoOverlapChild(node));
            }
            self.node_mut(node).overlap = OverlapState::Free;
        }
        let Some(c) = self.composed.remove(id) else {
            unreachable!("liveness checked above");
        };
        for m in c.members {
            if let Some(ov) = self.overlaps.get_mut(m) {
                ov.composed = None;
            }
        }
        Ok(())
    }

    // --- manual attachment ---

    /// Attach an overlap or composed overlap to `node` as its hit region.
    ///
    /// A previous manual region is detached first (it stays alive). Nodes
    /// that take part in an auto-overlap are rejected, as are regions
    /// already attached to another node.
    pub fn set_overlap(
        &mut self,
        node: NodeId,
        region: impl Into<HitRegion>,
    ) -> Result<(), SceneError> {
        let region = region.into();
        let Some(n) = self.nodes.get(node) else {
            return reject(SceneError::StaleNode(node));
        };
        if n.overlap.is_auto() {
            return reject(SceneError::AutoOverlapChild(node));
        }
        let current = match region {
            HitRegion::Single(o) => match self.overlaps.get(o) {
                Some(ov) => ov.node,
                None => return reject(SceneError::StaleOverlap(o)),
            },
            HitRegion::Composed(c) => match self.composed.get(c) {
                Some(co) => co.anchor,
                None => return reject(SceneError::StaleComposed(c)),
            },
        };
        match (current, region) {
            (Some(holder), _) if holder == node => return Ok(()),
            (Some(holder), HitRegion::Single(overlap)) => {
                return reject(SceneError::OverlapAttached {
                    overlap,
                    node: holder,
                });
            }
            (Some(holder), HitRegion::Composed(composed)) => {
                return reject(SceneError::ComposedAnchored {
                    composed,
                    node: holder,
                });
            }
            (None, _) => {}
        }
        if let OverlapState::Manual(previous) = self.node(node).overlap {
            self.detach_region(previous);
        }
        self.anchor_region(region, Some(node));
        self.node_mut(node).overlap = OverlapState::Manual(region);
        Ok(())
    }

    /// Detach the manual hit region of `node`, returning it.
    ///
    /// The region stays alive. Nodes that take part in an auto-overlap are
    /// rejected.
    pub fn clear_overlap(&mut self, node: NodeId) -> Result<Option<HitRegion>, SceneError> {
        let Some(n) = self.nodes.get(node) else {
            return reject(SceneError::StaleNode(node));
        };
        match n.overlap {
            OverlapState::Free => Ok(None),
            OverlapState::Manual(region) => {
                self.detach_region(region);
                self.node_mut(node).overlap = OverlapState::Free;
                Ok(Some(region))
            }
            OverlapState::AutoRoot(_) | OverlapState::AutoMember { .. } => {
                reject(SceneError::AutoOverlapChild(node))
            }
        }
    }

    /// The hit region `node` answers with.
    ///
    /// For an auto-overlap root this is the whole composite; for a member it
    /// is the member's own rectangle.
    pub fn overlap_of(&self, node: NodeId) -> Option<HitRegion> {
        match &self.nodes.get(node)?.overlap {
            OverlapState::Free => None,
            OverlapState::Manual(region) => Some(*region),
            OverlapState::AutoRoot(auto) => Some(HitRegion::Composed(auto.composed())),
            OverlapState::AutoMember { own, .. } => own.map(HitRegion::Single),
        }
    }

    /// Hit-region state of `node`.
    pub fn overlap_state(&self, node: NodeId) -> Option<&OverlapState> {
        self.nodes.get(node).map(|n| &n.overlap)
    }

    // --- queries ---

    /// Strict rectangle intersection between two regions.
    ///
    /// Composed regions intersect if any member does; two composed regions
    /// intersect if any cross pair does. Rectangles that only share an edge
    /// do not intersect. The test is symmetric.
    pub fn intersects(&self, a: impl Into<HitRegion>, b: impl Into<HitRegion>) -> bool {
        let a = self.region_bounds(a.into());
        if a.is_empty() {
            return false;
        }
        let b = self.region_bounds(b.into());
        a.iter()
            .any(|ra| b.iter().any(|rb| overlaps_strict(*ra, *rb)))
    }

    /// Closed point containment: points on an edge or corner are inside.
    pub fn contains_point(&self, region: impl Into<HitRegion>, point: Point) -> bool {
        self.region_bounds(region.into())
            .iter()
            .any(|r| contains_closed(*r, point))
    }

    /// [`contains_point`](Self::contains_point) at the pointer's current position.
    pub fn pointer_over(
        &self,
        region: impl Into<HitRegion>,
        pointer: &(impl PointerSource + ?Sized),
    ) -> bool {
        self.contains_point(region, pointer.pointer_position())
    }

    /// Absolute rectangles making up `region`.
    fn region_bounds(&self, region: HitRegion) -> RectList {
        match region {
            HitRegion::Single(o) => {
                if self.overlaps.contains(o) {
                    smallvec::smallvec![self.overlap_bounds(o)]
                } else {
                    log::warn!("overlap {o:?} is not alive");
                    RectList::new()
                }
            }
            HitRegion::Composed(c) => self
                .members_of(c)
                .iter()
                .map(|m| self.overlap_bounds(*m))
                .collect(),
        }
    }

    // --- internals ---

    /// Point the anchor of `region` at `node`.
    fn anchor_region(&mut self, region: HitRegion, node: Option<NodeId>) {
        match region {
            HitRegion::Single(o) => {
                if let Some(ov) = self.overlaps.get_mut(o) {
                    ov.node = node;
                }
            }
            HitRegion::Composed(c) => {
                if let Some(co) = self.composed.get_mut(c) {
                    co.anchor = node;
                }
            }
        }
    }

    /// Clear the node anchor of `region`; the region stays alive.
    pub(crate) fn detach_region(&mut self, region: HitRegion) {
        self.anchor_region(region, None);
    }
}
