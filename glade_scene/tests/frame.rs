// Copyright 2025 the Glade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end frames: scene, update hook, traversal, replay and hit-testing.

use std::cell::RefCell;
use std::rc::Rc;

use glade_input::{InputMailbox, PointerButtons};
use glade_scene::{
    ContentMeasure, FontHandle, ImageHandle, LocalNode, Primitive, Rasterizer, Scene, Stage,
    TextInfo, Texture,
};
use kurbo::{Point, Rect, Size, Vec2};
use peniko::Color;

#[derive(Debug, PartialEq)]
enum Call {
    Clear([u8; 4]),
    Rect(Rect),
    Circle(Point, f64),
    Line(Point, Point),
    Image(Rect, ImageHandle),
    Text(Rect, String),
}

#[derive(Default)]
struct Recorder {
    calls: Vec<Call>,
}

impl Recorder {
    fn take(&mut self) -> Vec<Call> {
        std::mem::take(&mut self.calls)
    }
}

fn rgba(color: Color) -> [u8; 4] {
    let c = color.to_rgba8();
    [c.r, c.g, c.b, c.a]
}

impl Rasterizer for Recorder {
    fn clear(&mut self, color: Color) {
        self.calls.push(Call::Clear(rgba(color)));
    }
    fn fill_rect(&mut self, bounds: Rect, _: Color) {
        self.calls.push(Call::Rect(bounds));
    }
    fn fill_circle(&mut self, center: Point, radius: f64, _: Color) {
        self.calls.push(Call::Circle(center, radius));
    }
    fn draw_line(&mut self, from: Point, to: Point, _: Color) {
        self.calls.push(Call::Line(from, to));
    }
    fn blit_image(&mut self, bounds: Rect, image: ImageHandle) {
        self.calls.push(Call::Image(bounds, image));
    }
    fn blit_text(&mut self, bounds: Rect, text: &TextInfo) {
        self.calls.push(Call::Text(bounds, text.text.clone()));
    }
}

/// One 50x50 image; text is 6 units wide per byte and one point size tall.
struct Assets;

const SPRITE: ImageHandle = ImageHandle(1);
const FONT: FontHandle = FontHandle(1);

impl ContentMeasure for Assets {
    fn image_size(&self, image: ImageHandle) -> Option<Size> {
        (image == SPRITE).then_some(Size::new(50.0, 50.0))
    }

    fn text_size(&self, text: &str, point_size: u32, font: FontHandle) -> Option<Size> {
        (font == FONT).then(|| Size::new(6.0 * text.len() as f64, f64::from(point_size)))
    }
}

fn red_box(width: f64, height: f64) -> Texture {
    Texture::Primitive(Primitive::Rectangle {
        width,
        height,
        color: Color::from_rgba8(255, 0, 0, 255),
    })
}

#[test]
fn image_draws_centered_on_black() {
    let mut stage = Stage::new(Scene::new());
    let (tree, scene) = stage.parts_mut();
    let sprite = tree.insert(
        None,
        LocalNode::object(Texture::Image(SPRITE)).at(Point::new(100.0, 100.0)),
    );
    scene.add_node(sprite);

    let mut out = Recorder::default();
    let input = InputMailbox::new().take();
    assert!(stage.frame(&input, &Assets, &mut out));

    let calls = out.take();
    assert_eq!(calls[0], Call::Clear([0, 0, 0, 255]));
    let Call::Image(bounds, image) = &calls[1] else {
        panic!("expected an image blit, got {:?}", calls[1]);
    };
    assert_eq!(*image, SPRITE);
    assert_eq!((bounds.x0, bounds.y0), (75.0, 75.0));
    assert_eq!((bounds.width(), bounds.height()), (50.0, 50.0));
}

#[test]
fn paint_order_follows_layers_per_sibling_group() {
    let mut stage = Stage::new(Scene::new());
    let (tree, scene) = stage.parts_mut();
    scene.set_background_color(Color::from_rgba8(20, 40, 60, 255));

    // Roots on layers 3, 1, 2; the layer-1 root has children on layers 3, 1, 2.
    let mut roots = Vec::new();
    for (i, layer) in [3_u32, 1, 2].into_iter().enumerate() {
        let x = 100.0 * i as f64;
        let root = tree.insert(
            None,
            LocalNode::object(red_box(10.0, 10.0))
                .at(Point::new(x, 0.0))
                .on_layer(layer),
        );
        scene.add_node(root);
        roots.push(root);
    }
    for (i, layer) in [3_u32, 1, 2].into_iter().enumerate() {
        let y = 10.0 * (i + 1) as f64;
        tree.insert(
            Some(roots[1]),
            LocalNode::object(red_box(2.0, 2.0))
                .at(Point::new(0.0, y))
                .on_layer(layer),
        );
    }

    let mut out = Recorder::default();
    stage.frame(&Default::default(), &Assets, &mut out);
    let centers: Vec<Point> = out
        .take()
        .into_iter()
        .filter_map(|call| match call {
            Call::Rect(r) => Some(r.center()),
            Call::Clear(c) => {
                assert_eq!(c, [20, 40, 60, 255]);
                None
            }
            other => panic!("unexpected call {other:?}"),
        })
        .collect();
    assert_eq!(
        centers,
        [
            Point::new(100.0, 0.0),
            Point::new(100.0, 20.0),
            Point::new(100.0, 30.0),
            Point::new(100.0, 10.0),
            Point::new(200.0, 0.0),
            Point::new(0.0, 0.0),
        ]
    );
}

#[test]
fn mixed_payloads_resolve_through_the_parent_chain() {
    let mut stage = Stage::new(Scene::new());
    let (tree, scene) = stage.parts_mut();
    let hud = tree.insert(None, LocalNode::default().at(Point::new(10.0, 10.0)));
    tree.insert(
        Some(hud),
        LocalNode::text(TextInfo {
            text: "score".into(),
            point_size: 8,
            font: Some(FONT),
            ..TextInfo::default()
        })
        .at(Point::new(5.0, 5.0)),
    );
    tree.insert(
        Some(hud),
        LocalNode::object(Texture::Primitive(Primitive::Circle {
            radius: 4.0,
            color: Color::from_rgba8(0, 255, 0, 255),
        }))
        .at(Point::new(40.0, 0.0))
        .on_layer(1),
    );
    tree.insert(
        Some(hud),
        LocalNode::object(Texture::Primitive(Primitive::Line {
            from: Point::new(0.0, 30.0),
            to: Point::new(20.0, 30.0),
            color: Color::from_rgba8(255, 255, 255, 255),
        }))
        .at(Point::new(0.0, 30.0))
        .on_layer(2),
    );
    scene.add_node(hud);

    let mut out = Recorder::default();
    stage.frame(&Default::default(), &Assets, &mut out);
    assert_eq!(
        out.take(),
        [
            Call::Clear([0, 0, 0, 255]),
            Call::Text(Rect::new(15.0, 15.0, 45.0, 23.0), "score".into()),
            Call::Circle(Point::new(50.0, 10.0), 4.0),
            Call::Line(Point::new(10.0, 40.0), Point::new(30.0, 40.0)),
        ]
    );
}

#[test]
fn update_hook_drives_hit_testing_from_input() {
    let mut stage = Stage::new(Scene::new());
    let (tree, scene) = stage.parts_mut();
    let player = tree.insert(None, LocalNode::default().at(Point::new(100.0, 100.0)));
    let body = tree.insert(Some(player), LocalNode::object(red_box(20.0, 20.0)));
    let arm = tree.insert(
        Some(player),
        LocalNode::object(red_box(10.0, 4.0)).at(Point::new(20.0, 0.0)),
    );
    tree.set_auto_overlap_enabled(player, true).unwrap();
    let region = tree.build_auto_overlap(player, &Assets).unwrap();
    assert_eq!(tree.members_of(region).len(), 2);
    scene.add_node(player);

    let clicks: Rc<RefCell<Vec<u64>>> = Rc::default();
    let seen = Rc::clone(&clicks);
    scene.set_update(move |cx| {
        let clicked = cx.input.pressed.contains(PointerButtons::PRIMARY);
        if clicked && cx.tree.pointer_over(region, cx.input) {
            seen.borrow_mut().push(cx.frame);
        }
        // Walk right after hit-testing.
        let p = cx.tree.position(player).unwrap_or_default();
        cx.tree.set_position(player, p + Vec2::new(10.0, 0.0));
    });

    let mailbox = InputMailbox::new();
    let mut out = Recorder::default();
    let click = |at: Point| {
        mailbox.move_pointer(at);
        mailbox.release_button(PointerButtons::PRIMARY);
        mailbox.press_button(PointerButtons::PRIMARY);
        mailbox.take()
    };

    // Player at x = 100: the arm spans 115..125, so this is its right edge.
    stage.frame(&click(Point::new(125.0, 100.0)), &Assets, &mut out);
    // Player at x = 110: the arm spans 125..135, so this is its left edge.
    stage.frame(&click(Point::new(125.0, 100.0)), &Assets, &mut out);
    // Player at x = 120: body 110..130, arm 135..145. Between them.
    stage.frame(&click(Point::new(132.0, 100.0)), &Assets, &mut out);
    // No click, pointer over the body.
    mailbox.move_pointer(Point::new(140.0, 100.0));
    stage.frame(&mailbox.take(), &Assets, &mut out);

    assert_eq!(*clicks.borrow(), [0, 1]);
    let tree = stage.tree();
    assert!(tree.is_auto_overlap_child(body));
    assert!(tree.is_auto_overlap_child(arm));
    assert_eq!(stage.frame_count(), 4);
}

#[test]
fn rebuilding_auto_overlap_between_frames() {
    let mut stage = Stage::new(Scene::new());
    let (tree, scene) = stage.parts_mut();
    let root = tree.insert(None, LocalNode::default());
    let a = tree.insert(Some(root), LocalNode::default().sized(Size::new(10.0, 10.0)));
    let b = tree.insert(
        Some(root),
        LocalNode::default()
            .at(Point::new(50.0, 0.0))
            .sized(Size::new(20.0, 20.0)),
    );
    tree.set_auto_overlap_enabled(root, true).unwrap();
    scene.add_node(root);

    let first = tree.build_auto_overlap(root, &Assets).unwrap();
    let first_bounds: Vec<Rect> = tree
        .members_of(first)
        .iter()
        .map(|m| tree.overlap_bounds(*m))
        .collect();

    let mut out = Recorder::default();
    stage.frame(&Default::default(), &Assets, &mut out);
    assert_eq!(out.take(), [Call::Clear([0, 0, 0, 255])]);

    let tree = stage.tree_mut();
    tree.destroy_auto_overlap(root).unwrap();
    assert!(![root, a, b].iter().any(|n| tree.is_auto_overlap_child(*n)));
    let second = tree.build_auto_overlap(root, &Assets).unwrap();
    let second_bounds: Vec<Rect> = tree
        .members_of(second)
        .iter()
        .map(|m| tree.overlap_bounds(*m))
        .collect();
    assert_ne!(first, second);
    assert_eq!(first_bounds, second_bounds);

    // Rebuild in place, then drop the root; nothing dangles.
    let third = tree.build_auto_overlap(root, &Assets).unwrap();
    assert!(!tree.is_composed_alive(second));
    tree.remove(root);
    assert!(!tree.is_composed_alive(third));
    assert!(!tree.is_alive(root));

    // The scene still lists the stale root; traversal skips it.
    stage.frame(&Default::default(), &Assets, &mut out);
    assert_eq!(out.take(), [Call::Clear([0, 0, 0, 255])]);
    assert!(stage.display_list().is_empty());
    assert_eq!(stage.scene().nodes(), &[root]);
}
