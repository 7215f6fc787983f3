// Copyright 2025 the Glade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frames, input handoff and auto-overlap hit-testing, end to end.
//!
//! A player built from primitives walks right across the window while a
//! polling thread moves the pointer and clicks. The update hook hit-tests the
//! clicks against the player's auto-overlap. Every frame is replayed into a
//! rasterizer that only logs what it would draw.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p glade_demos --example scene_frames`

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use glade_input::{InputMailbox, KeyCode, PointerButtons};
use glade_scene::{
    ContentMeasure, FontHandle, ImageHandle, LocalNode, Primitive, Rasterizer, Scene, Stage,
    TextInfo, Texture,
};
use kurbo::{Point, Rect, Size, Vec2};
use peniko::Color;

const ESCAPE: KeyCode = KeyCode(27);
const LOGO: ImageHandle = ImageHandle(1);
const MONO: FontHandle = FontHandle(1);
const MAX_FRAMES: u64 = 600;

/// Stand-in for a resource cache: one image and one monospace font.
struct Assets;

impl ContentMeasure for Assets {
    fn image_size(&self, image: ImageHandle) -> Option<Size> {
        (image == LOGO).then_some(Size::new(64.0, 32.0))
    }

    fn text_size(&self, text: &str, point_size: u32, font: FontHandle) -> Option<Size> {
        let advance = f64::from(point_size) * 0.6;
        let width = advance * text.chars().count() as f64;
        (font == MONO).then_some(Size::new(width, f64::from(point_size)))
    }
}

/// Logs draw calls instead of drawing them.
#[derive(Default)]
struct LogRasterizer {
    draws: usize,
}

impl Rasterizer for LogRasterizer {
    fn clear(&mut self, color: Color) {
        let c = color.to_rgba8();
        log::trace!("clear to ({}, {}, {}, {})", c.r, c.g, c.b, c.a);
    }

    fn fill_rect(&mut self, bounds: Rect, _: Color) {
        self.draws += 1;
        log::debug!("fill_rect {bounds:?}");
    }

    fn fill_circle(&mut self, center: Point, radius: f64, _: Color) {
        self.draws += 1;
        log::debug!("fill_circle center={center:?} r={radius}");
    }

    fn draw_line(&mut self, from: Point, to: Point, _: Color) {
        self.draws += 1;
        log::debug!("draw_line {from:?} -> {to:?}");
    }

    fn blit_image(&mut self, bounds: Rect, image: ImageHandle) {
        self.draws += 1;
        log::debug!("blit_image {image:?} into {bounds:?}");
    }

    fn blit_text(&mut self, bounds: Rect, text: &TextInfo) {
        self.draws += 1;
        log::debug!("blit_text {:?} into {bounds:?}", text.text);
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut scene = Scene::new();
    scene.set_name("walk");
    scene.set_background_color(Color::from_rgba8(24, 24, 32, 255));
    let mut stage = Stage::new(scene);
    let (tree, scene) = stage.parts_mut();

    let ground = tree.insert(
        None,
        LocalNode::object(Texture::Primitive(Primitive::Line {
            from: Point::new(0.0, 300.0),
            to: Point::new(640.0, 300.0),
            color: Color::from_rgba8(120, 120, 120, 255),
        }))
        .at(Point::new(0.0, 300.0)),
    );
    let logo = tree.insert(
        None,
        LocalNode::object(Texture::Image(LOGO))
            .at(Point::new(600.0, 24.0))
            .on_layer(10),
    );

    let player = tree.insert(None, LocalNode::default().at(Point::new(40.0, 260.0)).on_layer(1));
    tree.set_name(player, "player");
    let body = tree.insert(
        Some(player),
        LocalNode::object(Texture::Primitive(Primitive::Rectangle {
            width: 20.0,
            height: 40.0,
            color: Color::from_rgba8(80, 160, 255, 255),
        })),
    );
    tree.set_name(body, "body");
    let head = tree.insert(
        Some(player),
        LocalNode::object(Texture::Primitive(Primitive::Circle {
            radius: 8.0,
            color: Color::from_rgba8(255, 220, 180, 255),
        }))
        .at(Point::new(0.0, -30.0))
        .on_layer(1),
    );
    tree.set_name(head, "head");
    tree.insert(
        Some(player),
        LocalNode::text(TextInfo {
            text: "P1".into(),
            point_size: 10,
            font: Some(MONO),
            color: Color::from_rgba8(255, 255, 255, 255),
        })
        .at(Point::new(-6.0, -52.0)),
    );

    for node in [ground, logo, player] {
        scene.add_node(node);
    }

    if let Err(err) = tree.set_auto_overlap_enabled(player, true) {
        log::error!("{err}");
        return;
    }
    let hitbox = match tree.build_auto_overlap(player, &Assets) {
        Ok(region) => region,
        Err(err) => {
            log::error!("{err}");
            return;
        }
    };
    log::info!(
        "player hitbox has {} rectangles",
        tree.members_of(hitbox).len()
    );

    scene.set_update(move |cx| {
        if cx.input.key_down(ESCAPE) || cx.frame >= MAX_FRAMES {
            log::info!("leaving after {} frames", cx.frame);
            cx.exit(0);
            return;
        }
        if cx.input.pressed.contains(PointerButtons::PRIMARY) {
            let at = cx.input.pointer;
            if cx.tree.pointer_over(hitbox, cx.input) {
                log::info!("frame {}: hit the player at {at:?}", cx.frame);
            } else {
                log::info!("frame {}: missed at {at:?}", cx.frame);
            }
        }
        if let Some(p) = cx.tree.position(player) {
            let next = if p.x > 600.0 {
                Point::new(40.0, p.y)
            } else {
                p + Vec2::new(2.0, 0.0)
            };
            cx.tree.set_position(player, next);
        }
    });

    let mailbox = Arc::new(InputMailbox::new());
    let poller = {
        let mailbox = Arc::clone(&mailbox);
        thread::spawn(move || {
            // A few clicks along the path the player walks.
            for target in [
                Point::new(60.0, 230.0),
                Point::new(100.0, 270.0),
                Point::new(80.0, 260.0),
            ] {
                thread::sleep(Duration::from_millis(120));
                mailbox.move_pointer(target);
                mailbox.press_button(PointerButtons::PRIMARY);
                thread::sleep(Duration::from_millis(20));
                mailbox.release_button(PointerButtons::PRIMARY);
            }
            thread::sleep(Duration::from_millis(100));
            mailbox.press_key(ESCAPE);
        })
    };

    let mut raster = LogRasterizer::default();
    while stage.frame(&mailbox.take(), &Assets, &mut raster) {
        thread::sleep(Duration::from_millis(16));
    }
    if poller.join().is_err() {
        log::error!("input thread panicked");
    }
    log::info!(
        "exit code {:?} after {} frames, {} draw calls",
        stage.exit_code(),
        stage.frame_count(),
        raster.draws
    );
}
