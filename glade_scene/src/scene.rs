// Copyright 2025 the Glade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scenes: the root nodes drawn each frame, plus background and update hook.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use hashbrown::HashSet;
use peniko::Color;

use crate::id::{Entity, EntityId};
use crate::stage::FrameContext;
use crate::tree::Tree;
use crate::types::NodeId;

/// Per-frame callback run before the scene is drawn.
pub type UpdateHook = Box<dyn FnMut(&mut FrameContext<'_>)>;

/// Default background: opaque black.
pub const DEFAULT_BACKGROUND: Color = Color::from_rgba8(0, 0, 0, 255);

/// A set of root-level nodes drawn together.
///
/// The scene does not own its nodes; they live in a [`Tree`]. Membership is
/// unique and iteration follows insertion order, so nodes on the same layer
/// draw in the order they were added.
pub struct Scene {
    entity: Entity,
    nodes: Vec<NodeId>,
    members: HashSet<NodeId>,
    background: Color,
    update: Option<UpdateHook>,
    // Set by `set_update`/`clear_update` while a taken hook runs.
    update_touched: bool,
}

impl core::fmt::Debug for Scene {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Scene")
            .field("entity", &self.entity)
            .field("nodes", &self.nodes)
            .field("background", &self.background)
            .field("has_update", &self.update.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// An empty scene with a black background and no update hook.
    pub fn new() -> Self {
        Self {
            entity: Entity::new(),
            nodes: Vec::new(),
            members: HashSet::new(),
            background: DEFAULT_BACKGROUND,
            update: None,
            update_touched: false,
        }
    }

    /// Entity id of the scene.
    pub fn id(&self) -> EntityId {
        self.entity.id()
    }

    /// Display name.
    pub fn name(&self) -> &str {
        self.entity.name()
    }

    /// Replace the display name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.entity.set_name(name);
    }

    /// Add a root node. Returns `false` if it was already present.
    pub fn add_node(&mut self, node: NodeId) -> bool {
        if !self.members.insert(node) {
            return false;
        }
        self.nodes.push(node);
        true
    }

    /// Remove a node. Returns whether it was present.
    pub fn remove_node(&mut self, node: NodeId) -> bool {
        if !self.members.remove(&node) {
            return false;
        }
        self.nodes.retain(|n| *n != node);
        true
    }

    /// Whether `node` is one of the scene's roots.
    pub fn contains(&self, node: NodeId) -> bool {
        self.members.contains(&node)
    }

    /// Root nodes in insertion order. Handles freed from the tree stay
    /// listed until removed; traversal skips them.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Number of root nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the scene has no root nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Find a root node by entity id.
    pub fn find_node(&self, tree: &Tree, id: EntityId) -> Option<NodeId> {
        self.nodes
            .iter()
            .copied()
            .find(|n| tree.entity(*n).is_some_and(|e| e.id() == id))
    }

    /// Background color the frame is cleared with.
    pub fn background_color(&self) -> Color {
        self.background
    }

    /// Set the background color.
    pub fn set_background_color(&mut self, color: Color) {
        self.background = color;
    }

    /// Install the per-frame update hook, replacing any previous one.
    pub fn set_update(&mut self, hook: impl FnMut(&mut FrameContext<'_>) + 'static) {
        self.update = Some(Box::new(hook));
        self.update_touched = true;
    }

    /// Remove the update hook.
    pub fn clear_update(&mut self) {
        self.update = None;
        self.update_touched = true;
    }

    /// Whether an update hook is installed.
    pub fn has_update(&self) -> bool {
        self.update.is_some()
    }

    pub(crate) fn take_update(&mut self) -> Option<UpdateHook> {
        self.update_touched = false;
        self.update.take()
    }

    /// Put a hook back after it ran, unless it replaced or cleared itself.
    pub(crate) fn restore_update(&mut self, hook: UpdateHook) {
        if !self.update_touched {
            self.update = Some(hook);
        }
    }
}
