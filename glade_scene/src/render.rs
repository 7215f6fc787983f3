// Copyright 2025 the Glade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render traversal: flatten a scene into an ordered display list.
//!
//! Roots and each sibling group are stable-sorted by layer (lower first) and
//! walked depth-first, so a node paints before its children and a subtree
//! paints before the next sibling. Ties keep insertion order.

use alloc::vec::Vec;
use kurbo::{Point, Rect};
use peniko::Color;
use smallvec::SmallVec;

use crate::measure::ContentMeasure;
use crate::tree::Tree;
use crate::types::{ImageHandle, NodeId, Payload, Primitive, TextInfo, Texture};

/// Dispatch tag of a draw command.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum DrawKind {
    /// Filled rectangle.
    Rect,
    /// Filled circle.
    Circle,
    /// Line segment.
    Line,
    /// Image blit.
    Image,
    /// Text blit.
    Text,
}

/// One resolved draw instruction, in window coordinates.
#[derive(Clone, Debug)]
pub enum DrawCommand {
    /// Fill `bounds` with `color`.
    FillRect {
        /// Bounds centered on the node.
        bounds: Rect,
        /// Fill color.
        color: Color,
    },
    /// Fill a circle.
    FillCircle {
        /// The node's absolute position.
        center: Point,
        /// Half the resolved width.
        radius: f64,
        /// Fill color.
        color: Color,
    },
    /// Stroke a segment.
    Line {
        /// The node's absolute position.
        from: Point,
        /// End point, translated by the same offset as `from`.
        to: Point,
        /// Stroke color.
        color: Color,
    },
    /// Blit an image into `bounds`.
    Image {
        /// Bounds centered on the node.
        bounds: Rect,
        /// Image resource.
        image: ImageHandle,
    },
    /// Blit text into `bounds`.
    Text {
        /// Bounds starting at the node's absolute position.
        bounds: Rect,
        /// Text payload.
        text: TextInfo,
    },
}

impl DrawCommand {
    /// Dispatch tag.
    pub fn kind(&self) -> DrawKind {
        match self {
            Self::FillRect { .. } => DrawKind::Rect,
            Self::FillCircle { .. } => DrawKind::Circle,
            Self::Line { .. } => DrawKind::Line,
            Self::Image { .. } => DrawKind::Image,
            Self::Text { .. } => DrawKind::Text,
        }
    }
}

/// A draw command and the node it came from.
#[derive(Clone, Debug)]
pub struct DisplayItem {
    /// Source node.
    pub node: NodeId,
    /// What to draw.
    pub command: DrawCommand,
}

impl DisplayItem {
    /// Dispatch tag of the command.
    pub fn kind(&self) -> DrawKind {
        self.command.kind()
    }
}

/// Draw commands for one frame, in paint order.
#[derive(Clone, Debug, Default)]
pub struct DisplayList {
    items: Vec<DisplayItem>,
}

impl DisplayList {
    /// An empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Items in paint order.
    pub fn items(&self) -> &[DisplayItem] {
        &self.items
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the list has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate items in paint order.
    pub fn iter(&self) -> core::slice::Iter<'_, DisplayItem> {
        self.items.iter()
    }

    /// Remove every item, keeping the allocation.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Forward every item to `rasterizer`, in paint order.
    pub fn replay(&self, rasterizer: &mut (impl Rasterizer + ?Sized)) {
        for item in &self.items {
            match &item.command {
                DrawCommand::FillRect { bounds, color } => rasterizer.fill_rect(*bounds, *color),
                DrawCommand::FillCircle {
                    center,
                    radius,
                    color,
                } => rasterizer.fill_circle(*center, *radius, *color),
                DrawCommand::Line { from, to, color } => rasterizer.draw_line(*from, *to, *color),
                DrawCommand::Image { bounds, image } => rasterizer.blit_image(*bounds, *image),
                DrawCommand::Text { bounds, text } => rasterizer.blit_text(*bounds, text),
            }
        }
    }
}

impl<'a> IntoIterator for &'a DisplayList {
    type Item = &'a DisplayItem;
    type IntoIter = core::slice::Iter<'a, DisplayItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Low-level drawing backend a [`DisplayList`] is replayed into.
pub trait Rasterizer {
    /// Clear the frame to `color`.
    fn clear(&mut self, color: Color);
    /// Fill a rectangle.
    fn fill_rect(&mut self, bounds: Rect, color: Color);
    /// Fill a circle.
    fn fill_circle(&mut self, center: Point, radius: f64, color: Color);
    /// Stroke a segment.
    fn draw_line(&mut self, from: Point, to: Point, color: Color);
    /// Draw an image scaled into `bounds`.
    fn blit_image(&mut self, bounds: Rect, image: ImageHandle);
    /// Draw text into `bounds`.
    fn blit_text(&mut self, bounds: Rect, text: &TextInfo);
}

type SiblingGroup = SmallVec<[NodeId; 8]>;

/// Build the display list for `roots` and everything below them.
pub fn build_display_list(
    tree: &Tree,
    roots: &[NodeId],
    measure: &(impl ContentMeasure + ?Sized),
) -> DisplayList {
    let mut list = DisplayList::new();
    render_into(tree, roots, measure, &mut list);
    list
}

/// Like [`build_display_list`], reusing the allocation of `out`.
///
/// Stale root handles are skipped.
pub fn render_into(
    tree: &Tree,
    roots: &[NodeId],
    measure: &(impl ContentMeasure + ?Sized),
    out: &mut DisplayList,
) {
    out.clear();
    let mut stack: Vec<NodeId> = Vec::new();
    push_sorted(tree, roots, &mut stack);
    while let Some(id) = stack.pop() {
        if let Some(command) = draw_command(tree, id, measure) {
            out.items.push(DisplayItem { node: id, command });
        }
        push_sorted(tree, tree.children_of(id), &mut stack);
    }
}

/// Push a sibling group so that the lowest layer pops first.
fn push_sorted(tree: &Tree, group: &[NodeId], stack: &mut Vec<NodeId>) {
    let mut sorted: SiblingGroup = group
        .iter()
        .copied()
        .filter(|id| {
            let alive = tree.is_alive(*id);
            if !alive {
                log::debug!("skipping stale node {id:?}");
            }
            alive
        })
        .collect();
    // Stable: equal layers keep their order.
    sorted.sort_by_key(|id| tree.node(*id).local.layer);
    stack.extend(sorted.into_iter().rev());
}

fn draw_command(
    tree: &Tree,
    id: NodeId,
    measure: &(impl ContentMeasure + ?Sized),
) -> Option<DrawCommand> {
    let node = tree.node(id);
    let texture = match &node.local.payload {
        Payload::Base | Payload::Object(None) => return None,
        Payload::Text(info) => {
            let size = tree.calculated_size(id, measure)?;
            let origin = tree.absolute_position(id)?;
            return Some(DrawCommand::Text {
                bounds: Rect::from_origin_size(origin, size),
                text: info.clone(),
            });
        }
        Payload::Object(Some(texture)) => texture,
    };
    if let Texture::Image(image) = texture {
        if measure.image_size(*image).is_none() {
            log::error!("image {image:?} of node {id:?} is missing; not drawn");
            return None;
        }
    }
    let size = tree.calculated_size(id, measure)?;
    let center = tree.absolute_position(id)?;
    let command = match *texture {
        Texture::Image(image) => DrawCommand::Image {
            bounds: Rect::from_center_size(center, size),
            image,
        },
        Texture::Primitive(Primitive::Rectangle { color, .. }) => DrawCommand::FillRect {
            bounds: Rect::from_center_size(center, size),
            color,
        },
        Texture::Primitive(Primitive::Circle { color, .. }) => {
            if size.width != size.height {
                log::warn!("circle on node {id:?} resolved to non-square {size:?}; not drawn");
                return None;
            }
            DrawCommand::FillCircle {
                center,
                radius: size.width / 2.0,
                color,
            }
        }
        Texture::Primitive(Primitive::Line { from, to, color }) => {
            if node.local.position != from {
                log::warn!(
                    "line on node {id:?} starts at {from:?} but the node is at {:?}; not drawn",
                    node.local.position
                );
                return None;
            }
            DrawCommand::Line {
                from: center,
                to: center + (to - from),
                color,
            }
        }
    };
    Some(command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::NoContent;
    use crate::types::{FontHandle, LocalNode};
    use alloc::string::String;
    use kurbo::Size;

    const WHITE: Color = Color::from_rgba8(255, 255, 255, 255);

    struct Images;

    impl ContentMeasure for Images {
        fn image_size(&self, image: ImageHandle) -> Option<Size> {
            (image.0 == 7).then_some(Size::new(50.0, 50.0))
        }

        fn text_size(&self, text: &str, point_size: u32, _: FontHandle) -> Option<Size> {
            Some(Size::new(
                f64::from(point_size) * text.len() as f64,
                f64::from(point_size),
            ))
        }
    }

    fn rect(width: f64, height: f64) -> Texture {
        Texture::Primitive(Primitive::Rectangle {
            width,
            height,
            color: WHITE,
        })
    }

    #[test]
    fn image_is_centered_on_position() {
        let mut tree = Tree::new();
        let n = tree.insert(
            None,
            LocalNode::object(Texture::Image(ImageHandle(7))).at(Point::new(100.0, 100.0)),
        );
        let list = build_display_list(&tree, &[n], &Images);
        assert_eq!(list.len(), 1);
        let item = &list.items()[0];
        assert_eq!(item.kind(), DrawKind::Image);
        match item.command {
            DrawCommand::Image { bounds, image } => {
                assert_eq!(image, ImageHandle(7));
                assert_eq!((bounds.x0, bounds.y0), (75.0, 75.0));
                assert_eq!((bounds.width(), bounds.height()), (50.0, 50.0));
            }
            ref other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn layers_sort_within_each_sibling_group() {
        let mut tree = Tree::new();
        let roots: Vec<NodeId> = [3, 1, 2]
            .into_iter()
            .map(|layer| tree.insert(None, LocalNode::object(rect(1.0, 1.0)).on_layer(layer)))
            .collect();
        let parent = roots[1];
        let children: Vec<NodeId> = [3, 1, 2]
            .into_iter()
            .map(|layer| {
                tree.insert(
                    Some(parent),
                    LocalNode::object(rect(1.0, 1.0)).on_layer(layer),
                )
            })
            .collect();

        let list = build_display_list(&tree, &roots, &NoContent);
        let order: Vec<NodeId> = list.iter().map(|item| item.node).collect();
        assert_eq!(
            order,
            [
                roots[1],
                children[1],
                children[2],
                children[0],
                roots[2],
                roots[0]
            ]
        );
        let layers: Vec<u32> = order.iter().map(|n| tree.layer(*n).unwrap()).collect();
        assert_eq!(layers, [1, 1, 2, 3, 2, 3]);
    }

    #[test]
    fn equal_layers_keep_insertion_order() {
        let mut tree = Tree::new();
        let a = tree.insert(None, LocalNode::object(rect(1.0, 1.0)));
        let b = tree.insert(None, LocalNode::object(rect(1.0, 1.0)));
        let c = tree.insert(None, LocalNode::object(rect(1.0, 1.0)));
        let list = build_display_list(&tree, &[c, a, b], &NoContent);
        let order: Vec<NodeId> = list.iter().map(|item| item.node).collect();
        assert_eq!(order, [c, a, b]);
    }

    #[test]
    fn primitives_resolve_in_window_space() {
        let mut tree = Tree::new();
        let parent = tree.insert(None, LocalNode::default().at(Point::new(10.0, 10.0)));
        let circle = tree.insert(
            Some(parent),
            LocalNode::object(Texture::Primitive(Primitive::Circle {
                radius: 5.0,
                color: WHITE,
            }))
            .at(Point::new(5.0, 0.0)),
        );
        let line = tree.insert(
            Some(parent),
            LocalNode::object(Texture::Primitive(Primitive::Line {
                from: Point::new(1.0, 1.0),
                to: Point::new(4.0, 5.0),
                color: WHITE,
            }))
            .at(Point::new(1.0, 1.0)),
        );
        let boxed = tree.insert(
            Some(parent),
            LocalNode::object(rect(4.0, 2.0)).at(Point::new(0.0, 20.0)),
        );

        let list = build_display_list(&tree, &[parent], &NoContent);
        assert_eq!(list.len(), 3);
        for item in &list {
            match item.command {
                DrawCommand::FillCircle { center, radius, .. } => {
                    assert_eq!(item.node, circle);
                    assert_eq!(center, Point::new(15.0, 10.0));
                    assert_eq!(radius, 5.0);
                    assert_eq!(
                        tree.calculated_size(circle, &NoContent),
                        Some(Size::new(10.0, 10.0))
                    );
                }
                DrawCommand::Line { from, to, .. } => {
                    assert_eq!(item.node, line);
                    assert_eq!(from, Point::new(11.0, 11.0));
                    assert_eq!(to, Point::new(14.0, 15.0));
                }
                DrawCommand::FillRect { bounds, .. } => {
                    assert_eq!(item.node, boxed);
                    assert_eq!(bounds, Rect::new(8.0, 29.0, 12.0, 31.0));
                }
                ref other => panic!("unexpected command {other:?}"),
            }
        }
    }

    #[test]
    fn misconfigured_primitives_are_skipped() {
        let mut tree = Tree::new();
        let line = tree.insert(
            None,
            LocalNode::object(Texture::Primitive(Primitive::Line {
                from: Point::new(1.0, 1.0),
                to: Point::new(4.0, 5.0),
                color: WHITE,
            }))
            .at(Point::new(2.0, 2.0)),
        );
        let oval = tree.insert(
            None,
            LocalNode::object(Texture::Primitive(Primitive::Circle {
                radius: 5.0,
                color: WHITE,
            }))
            .sized(Size::new(10.0, 4.0)),
        );
        let missing = tree.insert(None, LocalNode::object(Texture::Image(ImageHandle(1))));
        let empty = tree.insert(None, LocalNode::default());
        tree.set_payload(empty, Payload::Object(None)).unwrap();
        let child = tree.insert(Some(line), LocalNode::object(rect(1.0, 1.0)));

        let list = build_display_list(&tree, &[line, oval, missing, empty], &Images);
        let order: Vec<NodeId> = list.iter().map(|item| item.node).collect();
        assert_eq!(order, [child], "children of a skipped node still draw");
    }

    #[test]
    fn text_starts_at_position() {
        let mut tree = Tree::new();
        let n = tree.insert(
            None,
            LocalNode::text(TextInfo {
                text: String::from("hi"),
                point_size: 10,
                font: Some(FontHandle(2)),
                ..TextInfo::default()
            })
            .at(Point::new(30.0, 40.0)),
        );
        let list = build_display_list(&tree, &[n], &Images);
        match &list.items()[0].command {
            DrawCommand::Text { bounds, text } => {
                assert_eq!(*bounds, Rect::new(30.0, 40.0, 50.0, 50.0));
                assert_eq!(text.text, "hi");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn stale_roots_are_skipped() {
        let mut tree = Tree::new();
        let a = tree.insert(None, LocalNode::object(rect(1.0, 1.0)));
        let b = tree.insert(None, LocalNode::object(rect(1.0, 1.0)));
        tree.remove(a);
        let mut list = build_display_list(&tree, &[a, b], &NoContent);
        assert_eq!(list.len(), 1);
        render_into(&tree, &[], &NoContent, &mut list);
        assert!(list.is_empty());
    }

    #[derive(Default)]
    struct Recorder(Vec<DrawKind>);

    impl Rasterizer for Recorder {
        fn clear(&mut self, _: Color) {}
        fn fill_rect(&mut self, _: Rect, _: Color) {
            self.0.push(DrawKind::Rect);
        }
        fn fill_circle(&mut self, _: Point, _: f64, _: Color) {
            self.0.push(DrawKind::Circle);
        }
        fn draw_line(&mut self, _: Point, _: Point, _: Color) {
            self.0.push(DrawKind::Line);
        }
        fn blit_image(&mut self, _: Rect, _: ImageHandle) {
            self.0.push(DrawKind::Image);
        }
        fn blit_text(&mut self, _: Rect, _: &TextInfo) {
            self.0.push(DrawKind::Text);
        }
    }

    #[test]
    fn replay_forwards_in_order() {
        let mut tree = Tree::new();
        let img = tree.insert(
            None,
            LocalNode::object(Texture::Image(ImageHandle(7))).on_layer(2),
        );
        let boxed = tree.insert(None, LocalNode::object(rect(1.0, 1.0)).on_layer(1));
        let list = build_display_list(&tree, &[img, boxed], &Images);
        let mut recorder = Recorder::default();
        list.replay(&mut recorder);
        assert_eq!(recorder.0, [DrawKind::Rect, DrawKind::Image]);
    }
}
