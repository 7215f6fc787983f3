// Copyright 2025 the Glade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glade Scene: a minimal 2D scene graph with rectangular hit regions.
//!
//! Glade Scene keeps a tree of positioned, sized, layered nodes, flattens it
//! into an ordered display list every frame, and answers pointer and
//! rectangle hit-tests against axis-aligned regions attached to nodes.
//!
//! - Node positions are relative to the parent; absolute positions are
//!   derived from the ancestor chain on demand.
//! - A node's size is an explicit override, or derived from its content
//!   (primitive extents, image and text sizes from a [`ContentMeasure`]).
//! - Hit regions are single rectangles ([overlaps](Tree::create_overlap)) or
//!   aggregates of them ([composed overlaps](Tree::create_composed)).
//! - An [auto-overlap](Tree::build_auto_overlap) derives one composed region
//!   for a whole subtree from the resolved sizes of its nodes.
//!
//! ## Not a renderer
//!
//! This crate does not open windows, load fonts or images, or rasterize.
//! [`build_display_list`] produces resolved [`DrawCommand`]s in paint order and
//! [`DisplayList::replay`] hands them to a host [`Rasterizer`]. Image and text
//! sizes come from the host through [`ContentMeasure`], and the pointer
//! position through [`PointerSource`].
//!
//! ## Paint order
//!
//! Roots and each sibling group are stable-sorted by [`Layer`] (lower layers
//! paint first) and walked depth-first. Layer order is local to a sibling
//! group: a child never paints before its parent, whatever its layer.
//!
//! ## Hit-testing rules
//!
//! [`Tree::intersects`] is strict: rectangles that only share an edge do not
//! intersect. [`Tree::contains_point`] is closed: points on an edge or corner
//! are inside. Composed regions answer for any of their members.
//!
//! ## API overview
//!
//! - [`Tree`]: owns nodes, overlaps and composed overlaps.
//! - [`LocalNode`]: per-node local data (position, size, layer, payload).
//! - [`NodeId`], [`OverlapId`], [`ComposedId`]: generational handles.
//! - [`EntityId`]: process-unique name of a node, overlap, composed overlap or scene.
//! - [`Scene`]: root nodes, background color and per-frame update hook.
//! - [`Stage`]: owns a tree and the active scene and runs frames.
//!
//! Key operations:
//! - [`Tree::insert`] / [`Tree::add_child`] / [`Tree::remove_child`] / [`Tree::remove`]
//! - [`Tree::absolute_position`] and [`Tree::calculated_size`]
//! - [`Tree::set_overlap`] / [`Tree::clear_overlap`] / [`Tree::compose`]
//! - [`Tree::build_auto_overlap`] / [`Tree::destroy_auto_overlap`]
//! - [`Tree::intersects`] / [`Tree::contains_point`] / [`Tree::pointer_over`]
//! - [`Stage::frame`]
//!
//! ## Example
//!
//! ```rust
//! use kurbo::{Point, Size};
//! use glade_scene::{LocalNode, NoContent, Tree};
//!
//! let mut tree = Tree::new();
//! let group = tree.insert(None, LocalNode::default().at(Point::new(100.0, 100.0)));
//! let left = tree.insert(Some(group), LocalNode::default().sized(Size::new(10.0, 10.0)));
//! let right = tree.insert(
//!     Some(group),
//!     LocalNode::default().at(Point::new(50.0, 0.0)).sized(Size::new(20.0, 20.0)),
//! );
//!
//! tree.set_auto_overlap_enabled(group, true).unwrap();
//! let region = tree.build_auto_overlap(group, &NoContent).unwrap();
//! assert_eq!(tree.members_of(region).len(), 2);
//!
//! assert!(tree.contains_point(region, Point::new(105.0, 105.0)));
//! assert!(tree.contains_point(region, Point::new(160.0, 90.0)));
//! assert!(!tree.contains_point(region, Point::new(130.0, 100.0)));
//! # let _ = (left, right);
//! ```
//!
//! Errors from configuration mistakes are returned as [`SceneError`] and also
//! reported through the [`log`] facade.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod auto;
mod error;
mod id;
mod measure;
mod overlap;
mod render;
mod scene;
mod slots;
mod stage;
mod tree;
mod types;
mod util;

pub use auto::AutoOverlap;
pub use error::SceneError;
pub use id::{Entity, EntityId};
pub use measure::{ContentMeasure, NoContent};
pub use overlap::OverlapState;
pub use render::{
    DisplayItem, DisplayList, DrawCommand, DrawKind, Rasterizer, build_display_list, render_into,
};
pub use scene::{DEFAULT_BACKGROUND, Scene, UpdateHook};
pub use stage::{FrameContext, Stage, StageConfig};
pub use tree::Tree;
pub use types::{
    ComposedId, FontHandle, HitRegion, ImageHandle, Layer, LocalNode, NodeId, NodeKind,
    OverlapId, Payload, Primitive, TextInfo, Texture,
};

pub use glade_input::{InputSnapshot, PointerSource};
