// Copyright 2025 the Glade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: storage, structure, positions and sizes.

use alloc::string::String;
use alloc::vec::Vec;
use kurbo::{Point, Size};
use smallvec::SmallVec;

use crate::error::{SceneError, reject};
use crate::id::{Entity, EntityId};
use crate::measure::ContentMeasure;
use crate::overlap::{ComposedOverlap, Overlap, OverlapState};
use crate::slots::Slots;
use crate::types::{
    ComposedId, Layer, LocalNode, NodeId, NodeKind, OverlapId, Payload, TextInfo, Texture,
};

/// Inline capacity of a child list before it spills to the heap.
pub(crate) type Children = SmallVec<[NodeId; 4]>;

/// Node tree plus the overlaps and composed overlaps attached to it.
///
/// The tree owns every node, overlap and composed overlap and hands out
/// generational handles ([`NodeId`], [`OverlapId`], [`ComposedId`]). Parents
/// own their children exclusively; the parent link is a plain handle.
///
/// Positions are relative: a node's absolute position is its own position
/// plus the absolute position of its parent. Nothing is cached, so changes
/// are visible to the next query immediately.
///
/// ## Example
///
/// ```rust
/// use kurbo::Point;
/// use glade_scene::{LocalNode, Tree};
///
/// let mut tree = Tree::new();
/// let root = tree.insert(None, LocalNode::default().at(Point::new(100.0, 50.0)));
/// let child = tree.insert(Some(root), LocalNode::default().at(Point::new(10.0, 10.0)));
///
/// assert_eq!(tree.absolute_position(child), Some(Point::new(110.0, 60.0)));
/// assert_eq!(tree.parent_of(child), Some(root));
/// ```
pub struct Tree {
    pub(crate) nodes: Slots<NodeId, Node>,
    pub(crate) overlaps: Slots<OverlapId, Overlap>,
    pub(crate) composed: Slots<ComposedId, ComposedOverlap>,
}

impl core::fmt::Debug for Tree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tree")
            .field("nodes", &self.nodes)
            .field("overlaps", &self.overlaps)
            .field("composed", &self.composed)
            .finish()
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Node {
    pub(crate) entity: Entity,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Children,
    pub(crate) local: LocalNode,
    pub(crate) overlap: OverlapState,
    pub(crate) auto_enabled: bool,
}

impl Node {
    fn new(local: LocalNode) -> Self {
        Self {
            entity: Entity::new(),
            parent: None,
            children: Children::new(),
            local,
            overlap: OverlapState::Free,
            auto_enabled: false,
        }
    }
}

impl Tree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self {
            nodes: Slots::default(),
            overlaps: Slots::default(),
            composed: Slots::default(),
        }
    }

    /// Insert a new node, as a child of `parent` or detached if `None`.
    ///
    /// A stale `parent` is reported and the node is left detached.
    pub fn insert(&mut self, parent: Option<NodeId>, local: LocalNode) -> NodeId {
        let id = self.nodes.insert(Node::new(local));
        if let Some(p) = parent {
            if self.is_alive(p) {
                self.link_parent(id, p);
            } else {
                log::warn!("parent {p:?} is not alive; node {id:?} left detached");
            }
        }
        id
    }

    /// Remove a node and its whole subtree from the tree.
    ///
    /// Auto-overlaps rooted in the subtree are torn down. Manual overlaps are
    /// detached but stay alive. Rectangles that the removed nodes contributed
    /// to an auto-overlap rooted outside the subtree are dropped from it.
    pub fn remove(&mut self, id: NodeId) {
        if !self.is_alive(id) {
            return;
        }
        if let Some(parent) = self.node(id).parent {
            self.unlink_parent(id, parent);
        }
        let subtree = self.subtree(id);
        for &n in &subtree {
            if matches!(self.node(n).overlap, OverlapState::AutoRoot(_)) {
                let _ = self.destroy_auto_overlap(n);
            }
        }
        let mut leaving = Vec::new();
        for &n in &subtree {
            match core::mem::take(&mut self.node_mut(n).overlap) {
                OverlapState::Free | OverlapState::AutoRoot(_) => {}
                OverlapState::Manual(region) => self.detach_region(region),
                OverlapState::AutoMember { root, own } => leaving.push((root, n, own)),
            }
        }
        self.forget_auto_members(&leaving);
        for n in subtree {
            self.nodes.remove(n);
        }
    }

    /// Returns true if `id` refers to a live node.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes.contains(id)
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no live nodes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate live node handles in storage order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().map(|(id, _)| id)
    }

    // --- identity ---

    /// Identity of a live node.
    pub fn entity(&self, id: NodeId) -> Option<&Entity> {
        self.nodes.get(id).map(|n| &n.entity)
    }

    /// Rename a node. Returns `false` for stale handles.
    pub fn set_name(&mut self, id: NodeId, name: impl Into<String>) -> bool {
        match self.nodes.get_mut(id) {
            Some(n) => {
                n.entity.set_name(name);
                true
            }
            None => false,
        }
    }

    /// Find a live node by entity id.
    pub fn find_entity(&self, entity: EntityId) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, n)| n.entity.id() == entity)
            .map(|(id, _)| id)
    }

    // --- structure ---

    /// Attach `child` under `parent`.
    ///
    /// A child that already has another parent is moved. Adding a child that
    /// is already attached to `parent` does nothing. Adding `parent` (or one
    /// of its ancestors) as a child is rejected.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        if !self.is_alive(parent) {
            return reject(SceneError::StaleNode(parent));
        }
        if !self.is_alive(child) {
            return reject(SceneError::StaleNode(child));
        }
        if self.is_ancestor_or_self(child, parent) {
            return reject(SceneError::WouldCycle { parent, child });
        }
        match self.node(child).parent {
            Some(p) if p == parent => return Ok(()),
            Some(p) => self.unlink_parent(child, p),
            None => {}
        }
        self.link_parent(child, parent);
        Ok(())
    }

    /// Attach each of `children` under `parent`, stopping at the first rejection.
    pub fn add_children(
        &mut self,
        parent: NodeId,
        children: impl IntoIterator<Item = NodeId>,
    ) -> Result<(), SceneError> {
        for child in children {
            self.add_child(parent, child)?;
        }
        Ok(())
    }

    /// Detach `child` from `parent`. Returns whether `child` was a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if !self.is_alive(parent) || !self.is_alive(child) {
            return false;
        }
        if self.node(child).parent != Some(parent) {
            return false;
        }
        self.unlink_parent(child, parent);
        true
    }

    /// Returns the parent of a node if live, or `None` for roots or stale ids.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    /// Get the children of a node, or empty slice if node is stale.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map_or(&[], |n| &n.children)
    }

    // --- local data ---

    /// Position relative to the parent (or window space for a root).
    pub fn position(&self, id: NodeId) -> Option<Point> {
        self.nodes.get(id).map(|n| n.local.position)
    }

    /// Update position.
    pub fn set_position(&mut self, id: NodeId, position: Point) {
        if let Some(n) = self.nodes.get_mut(id) {
            n.local.position = position;
        }
    }

    /// Absolute position: own position plus every ancestor's position.
    pub fn absolute_position(&self, id: NodeId) -> Option<Point> {
        let node = self.nodes.get(id)?;
        let mut pos = node.local.position;
        let mut current = node.parent;
        while let Some(parent_id) = current {
            let Some(parent) = self.nodes.get(parent_id) else {
                unreachable!("parent of a live node is live");
            };
            pos += parent.local.position.to_vec2();
            current = parent.parent;
        }
        Some(pos)
    }

    /// Override size ([`Size::ZERO`] if unset).
    pub fn size(&self, id: NodeId) -> Option<Size> {
        self.nodes.get(id).map(|n| n.local.size)
    }

    /// Update override size. Pass [`Size::ZERO`] to derive size from content.
    pub fn set_size(&mut self, id: NodeId, size: Size) {
        if let Some(n) = self.nodes.get_mut(id) {
            n.local.size = size;
        }
    }

    /// Layer.
    pub fn layer(&self, id: NodeId) -> Option<Layer> {
        self.nodes.get(id).map(|n| n.local.layer)
    }

    /// Update layer.
    pub fn set_layer(&mut self, id: NodeId, layer: Layer) {
        if let Some(n) = self.nodes.get_mut(id) {
            n.local.layer = layer;
        }
    }

    /// Local data of a live node.
    pub fn local(&self, id: NodeId) -> Option<&LocalNode> {
        self.nodes.get(id).map(|n| &n.local)
    }

    /// Payload kind.
    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.nodes.get(id).map(|n| n.local.payload.kind())
    }

    /// Payload.
    pub fn payload(&self, id: NodeId) -> Option<&Payload> {
        self.nodes.get(id).map(|n| &n.local.payload)
    }

    /// Replace the payload; the node's kind follows the new payload.
    pub fn set_payload(&mut self, id: NodeId, payload: Payload) -> Result<(), SceneError> {
        match self.nodes.get_mut(id) {
            Some(n) => {
                n.local.payload = payload;
                Ok(())
            }
            None => reject(SceneError::StaleNode(id)),
        }
    }

    /// Texture of an object node.
    pub fn texture(&self, id: NodeId) -> Option<&Texture> {
        match self.payload(id)? {
            Payload::Object(texture) => texture.as_ref(),
            _ => None,
        }
    }

    /// Set or clear the texture of an object node.
    pub fn set_texture(&mut self, id: NodeId, texture: Option<Texture>) -> Result<(), SceneError> {
        let Some(n) = self.nodes.get_mut(id) else {
            return reject(SceneError::StaleNode(id));
        };
        match &mut n.local.payload {
            Payload::Object(slot) => {
                *slot = texture;
                Ok(())
            }
            other => {
                let actual = other.kind();
                reject(SceneError::KindMismatch {
                    node: id,
                    expected: NodeKind::Object,
                    actual,
                })
            }
        }
    }

    /// Text of a text node.
    pub fn text_info(&self, id: NodeId) -> Option<&TextInfo> {
        match self.payload(id)? {
            Payload::Text(info) => Some(info),
            _ => None,
        }
    }

    /// Replace the text of a text node.
    pub fn set_text_info(&mut self, id: NodeId, info: TextInfo) -> Result<(), SceneError> {
        let Some(n) = self.nodes.get_mut(id) else {
            return reject(SceneError::StaleNode(id));
        };
        match &mut n.local.payload {
            Payload::Text(slot) => {
                *slot = info;
                Ok(())
            }
            other => {
                let actual = other.kind();
                reject(SceneError::KindMismatch {
                    node: id,
                    expected: NodeKind::Text,
                    actual,
                })
            }
        }
    }

    /// Resolved size: the override if set, otherwise the content size.
    ///
    /// Base nodes and object nodes without a texture have no content, so
    /// their size is the override as is. A content size that resolves to
    /// zero (including a resource the oracle cannot measure) is reported and
    /// returned. Returns `None` only for stale handles.
    pub fn calculated_size(
        &self,
        id: NodeId,
        measure: &(impl ContentMeasure + ?Sized),
    ) -> Option<Size> {
        let node = self.nodes.get(id)?;
        let size = node.local.size;
        if size != Size::ZERO {
            return Some(size);
        }
        let content = match &node.local.payload {
            Payload::Base | Payload::Object(None) => return Some(size),
            Payload::Object(Some(texture)) => texture.content_size(measure),
            Payload::Text(info) => info.content_size(measure),
        };
        let size = content.unwrap_or(Size::ZERO);
        if size == Size::ZERO {
            log::warn!(
                "size of node {id:?} (entity {}) is zero after resolution",
                node.entity.id()
            );
        }
        Some(size)
    }

    // --- internals ---

    /// Access a node; panics if `id` is stale.
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        self.nodes.get(id).expect("dangling NodeId")
    }

    /// Access a node mutably; panics if `id` is stale.
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes.get_mut(id).expect("dangling NodeId")
    }

    /// `id` and all its descendants, root-first (pre-order).
    pub(crate) fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = alloc::vec![id];
        while let Some(n) = stack.pop() {
            out.push(n);
            // Reversed so children are visited in the order they were added.
            stack.extend(self.node(n).children.iter().rev().copied());
        }
        out
    }

    /// Whether `ancestor` is `id` or one of its ancestors.
    pub(crate) fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.node(n).parent;
        }
        false
    }

    fn link_parent(&mut self, id: NodeId, parent: NodeId) {
        let parent_node = self.node_mut(parent);
        parent_node.children.push(id);
        self.node_mut(id).parent = Some(parent);
    }

    fn unlink_parent(&mut self, id: NodeId, parent: NodeId) {
        let p = self.node_mut(parent);
        p.children.retain(|c| *c != id);
        self.node_mut(id).parent = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::NoContent;
    use crate::types::{FontHandle, ImageHandle, Primitive};
    use peniko::Color;

    const RED: Color = Color::from_rgba8(255, 0, 0, 255);

    /// Measures every image as 50x50 and text as 8 units per byte by the point size.
    struct FixedMeasure;

    impl ContentMeasure for FixedMeasure {
        fn image_size(&self, image: ImageHandle) -> Option<Size> {
            (image.0 != 0).then_some(Size::new(50.0, 50.0))
        }

        fn text_size(&self, text: &str, point_size: u32, _: FontHandle) -> Option<Size> {
            Some(Size::new(8.0 * text.len() as f64, f64::from(point_size)))
        }
    }

    #[test]
    fn absolute_position_composes_parent_chain() {
        let mut tree = Tree::new();
        let root = tree.insert(None, LocalNode::default().at(Point::new(100.0, 100.0)));
        let mid = tree.insert(Some(root), LocalNode::default().at(Point::new(-20.0, 5.0)));
        let leaf = tree.insert(Some(mid), LocalNode::default().at(Point::new(1.0, 2.0)));

        assert_eq!(tree.absolute_position(root), Some(Point::new(100.0, 100.0)));
        assert_eq!(tree.absolute_position(mid), Some(Point::new(80.0, 105.0)));
        let parent_abs = tree.absolute_position(mid).unwrap();
        assert_eq!(
            tree.absolute_position(leaf),
            Some(Point::new(1.0, 2.0) + parent_abs.to_vec2())
        );

        // Moving an ancestor moves the whole subtree immediately.
        tree.set_position(root, Point::ZERO);
        assert_eq!(tree.absolute_position(leaf), Some(Point::new(-19.0, 7.0)));
    }

    #[test]
    fn remove_child_clears_back_reference() {
        let mut tree = Tree::new();
        let parent = tree.insert(None, LocalNode::default());
        let a = tree.insert(Some(parent), LocalNode::default());
        let b = tree.insert(Some(parent), LocalNode::default());

        assert!(tree.remove_child(parent, a));
        assert_eq!(tree.parent_of(a), None);
        assert_eq!(tree.children_of(parent), &[b]);
        assert!(!tree.remove_child(parent, a), "second removal finds nothing");
        // Removing by identity: `b` is untouched.
        assert_eq!(tree.parent_of(b), Some(parent));
    }

    #[test]
    fn add_child_moves_between_parents_and_ignores_duplicates() {
        let mut tree = Tree::new();
        let p1 = tree.insert(None, LocalNode::default());
        let p2 = tree.insert(None, LocalNode::default());
        let c = tree.insert(None, LocalNode::default());

        tree.add_child(p1, c).unwrap();
        tree.add_child(p1, c).unwrap();
        assert_eq!(tree.children_of(p1), &[c]);

        tree.add_child(p2, c).unwrap();
        assert!(tree.children_of(p1).is_empty());
        assert_eq!(tree.children_of(p2), &[c]);
        assert_eq!(tree.parent_of(c), Some(p2));
    }

    #[test]
    fn add_child_rejects_cycles() {
        let mut tree = Tree::new();
        let root = tree.insert(None, LocalNode::default());
        let child = tree.insert(Some(root), LocalNode::default());
        let grandchild = tree.insert(Some(child), LocalNode::default());

        assert_eq!(
            tree.add_child(grandchild, root),
            Err(SceneError::WouldCycle {
                parent: grandchild,
                child: root
            })
        );
        assert_eq!(
            tree.add_child(root, root),
            Err(SceneError::WouldCycle {
                parent: root,
                child: root
            })
        );
        assert_eq!(tree.parent_of(root), None);
    }

    #[test]
    fn override_size_wins_over_content() {
        let mut tree = Tree::new();
        let n = tree.insert(
            None,
            LocalNode::object(Texture::Image(ImageHandle(1))).sized(Size::new(5.0, 6.0)),
        );
        assert_eq!(
            tree.calculated_size(n, &FixedMeasure),
            Some(Size::new(5.0, 6.0))
        );
        tree.set_size(n, Size::ZERO);
        assert_eq!(
            tree.calculated_size(n, &FixedMeasure),
            Some(Size::new(50.0, 50.0))
        );
    }

    #[test]
    fn content_sizes_per_payload() {
        let mut tree = Tree::new();
        let rect = tree.insert(
            None,
            LocalNode::object(Texture::Primitive(Primitive::Rectangle {
                width: 30.0,
                height: 10.0,
                color: RED,
            })),
        );
        let circle = tree.insert(
            None,
            LocalNode::object(Texture::Primitive(Primitive::Circle {
                radius: 7.0,
                color: RED,
            })),
        );
        let text = tree.insert(
            None,
            LocalNode::text(TextInfo {
                text: "hello".into(),
                point_size: 16,
                font: Some(FontHandle(1)),
                ..TextInfo::default()
            }),
        );
        let base = tree.insert(None, LocalNode::default());

        assert_eq!(
            tree.calculated_size(rect, &NoContent),
            Some(Size::new(30.0, 10.0))
        );
        assert_eq!(
            tree.calculated_size(circle, &NoContent),
            Some(Size::new(14.0, 14.0))
        );
        assert_eq!(
            tree.calculated_size(text, &FixedMeasure),
            Some(Size::new(40.0, 16.0))
        );
        assert_eq!(tree.calculated_size(base, &FixedMeasure), Some(Size::ZERO));
    }

    #[test]
    fn missing_resources_resolve_to_zero() {
        let mut tree = Tree::new();
        let image = tree.insert(None, LocalNode::object(Texture::Image(ImageHandle(0))));
        let fontless = tree.insert(
            None,
            LocalNode::text(TextInfo {
                text: "x".into(),
                ..TextInfo::default()
            }),
        );
        assert_eq!(tree.calculated_size(image, &FixedMeasure), Some(Size::ZERO));
        assert_eq!(tree.calculated_size(fontless, &FixedMeasure), Some(Size::ZERO));
    }

    #[test]
    fn payload_accessors_check_kind() {
        let mut tree = Tree::new();
        let text = tree.insert(None, LocalNode::text(TextInfo::default()));
        assert_eq!(
            tree.set_texture(text, None),
            Err(SceneError::KindMismatch {
                node: text,
                expected: NodeKind::Object,
                actual: NodeKind::Text,
            })
        );
        let obj = tree.insert(None, LocalNode::object(Texture::Image(ImageHandle(3))));
        tree.set_texture(obj, None).unwrap();
        assert!(tree.texture(obj).is_none());
        assert!(tree.set_text_info(obj, TextInfo::default()).is_err());
        assert_eq!(tree.kind(obj), Some(NodeKind::Object));
    }

    #[test]
    fn remove_frees_subtree() {
        let mut tree = Tree::new();
        let root = tree.insert(None, LocalNode::default());
        let child = tree.insert(Some(root), LocalNode::default());
        let grandchild = tree.insert(Some(child), LocalNode::default());

        tree.remove(child);
        assert!(tree.is_alive(root));
        assert!(!tree.is_alive(child));
        assert!(!tree.is_alive(grandchild));
        assert!(tree.children_of(root).is_empty());
        assert_eq!(tree.absolute_position(grandchild), None);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn entity_lookup_and_names() {
        let mut tree = Tree::new();
        let n = tree.insert(None, LocalNode::default());
        assert!(tree.set_name(n, "hero"));
        let entity = tree.entity(n).unwrap();
        assert_eq!(entity.name(), "hero");
        assert_eq!(tree.find_entity(entity.id()), Some(n));
    }

    #[test]
    fn stale_parent_leaves_node_detached() {
        let mut tree = Tree::new();
        let gone = tree.insert(None, LocalNode::default());
        tree.remove(gone);
        let n = tree.insert(Some(gone), LocalNode::default());
        assert!(tree.is_alive(n));
        assert_eq!(tree.parent_of(n), None);
    }
}
