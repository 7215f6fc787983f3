// Copyright 2025 the Glade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame driver: owns the tree and active scene and runs one frame at a time.

use crate::measure::ContentMeasure;
use crate::render::{DisplayList, Rasterizer, render_into};
use crate::scene::Scene;
use crate::tree::Tree;
use glade_input::InputSnapshot;

/// Stage behavior switches.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StageConfig {
    /// Warn (once per scene) when the active scene has no update hook.
    pub report_missing_update: bool,
    /// Clear to the scene background before drawing each frame.
    pub clear_each_frame: bool,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            report_missing_update: true,
            clear_each_frame: true,
        }
    }
}

/// What an update hook gets to work with during a frame.
#[derive(Debug)]
pub struct FrameContext<'a> {
    /// The node tree.
    pub tree: &'a mut Tree,
    /// The scene being updated.
    pub scene: &'a mut Scene,
    /// Input gathered since the previous frame.
    pub input: &'a InputSnapshot,
    /// Index of this frame, starting at 0.
    pub frame: u64,
    exit: &'a mut Option<i32>,
}

impl FrameContext<'_> {
    /// Stop the stage after this frame with `code`.
    pub fn exit(&mut self, code: i32) {
        *self.exit = Some(code);
    }
}

/// Owns the tree and the active scene and renders frames.
///
/// ## Example
///
/// ```rust
/// use glade_scene::{InputSnapshot, NoContent, Scene, Stage};
///
/// struct Discard;
/// impl glade_scene::Rasterizer for Discard {
///     fn clear(&mut self, _: peniko::Color) {}
///     fn fill_rect(&mut self, _: kurbo::Rect, _: peniko::Color) {}
///     fn fill_circle(&mut self, _: kurbo::Point, _: f64, _: peniko::Color) {}
///     fn draw_line(&mut self, _: kurbo::Point, _: kurbo::Point, _: peniko::Color) {}
///     fn blit_image(&mut self, _: kurbo::Rect, _: glade_scene::ImageHandle) {}
///     fn blit_text(&mut self, _: kurbo::Rect, _: &glade_scene::TextInfo) {}
/// }
///
/// let mut scene = Scene::new();
/// scene.set_update(|cx| {
///     if cx.frame == 2 {
///         cx.exit(0);
///     }
/// });
/// let mut stage = Stage::new(scene);
/// while stage.frame(&InputSnapshot::default(), &NoContent, &mut Discard) {}
/// assert_eq!(stage.frame_count(), 3);
/// assert_eq!(stage.exit_code(), Some(0));
/// ```
#[derive(Debug)]
pub struct Stage {
    tree: Tree,
    scene: Scene,
    config: StageConfig,
    exit_code: Option<i32>,
    frame: u64,
    missing_update_reported: bool,
    display: DisplayList,
}

impl Stage {
    /// A stage with an empty tree and default configuration.
    pub fn new(scene: Scene) -> Self {
        Self::with_config(scene, StageConfig::default())
    }

    /// A stage with an empty tree.
    pub fn with_config(scene: Scene, config: StageConfig) -> Self {
        Self {
            tree: Tree::new(),
            scene,
            config,
            exit_code: None,
            frame: 0,
            missing_update_reported: false,
            display: DisplayList::new(),
        }
    }

    /// The node tree.
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// The node tree, mutably.
    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    /// The active scene.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The active scene, mutably.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Tree and scene together, for building a scene in place.
    pub fn parts_mut(&mut self) -> (&mut Tree, &mut Scene) {
        (&mut self.tree, &mut self.scene)
    }

    /// Switch the active scene, returning the previous one.
    pub fn set_scene(&mut self, scene: Scene) -> Scene {
        self.missing_update_reported = false;
        core::mem::replace(&mut self.scene, scene)
    }

    /// Configuration.
    pub fn config(&self) -> StageConfig {
        self.config
    }

    /// Whether the stage keeps producing frames.
    pub fn is_running(&self) -> bool {
        self.exit_code.is_none()
    }

    /// Stop after the current frame with `code`.
    pub fn exit(&mut self, code: i32) {
        self.exit_code = Some(code);
    }

    /// Exit code, once stopped.
    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    /// Frames rendered so far.
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Display list of the last frame.
    pub fn display_list(&self) -> &DisplayList {
        &self.display
    }

    /// Run one frame: update hook, clear, traversal, replay.
    ///
    /// A snapshot that requests quit stops the stage with code 0 before the
    /// frame runs. Returns whether the stage is still running afterwards.
    pub fn frame(
        &mut self,
        input: &InputSnapshot,
        measure: &(impl ContentMeasure + ?Sized),
        rasterizer: &mut (impl Rasterizer + ?Sized),
    ) -> bool {
        if !self.is_running() {
            return false;
        }
        if input.quit_requested {
            log::info!("quit requested");
            self.exit(0);
            return false;
        }

        match self.scene.take_update() {
            Some(mut hook) => {
                let mut cx = FrameContext {
                    tree: &mut self.tree,
                    scene: &mut self.scene,
                    input,
                    frame: self.frame,
                    exit: &mut self.exit_code,
                };
                hook(&mut cx);
                self.scene.restore_update(hook);
            }
            None => {
                if self.config.report_missing_update && !self.missing_update_reported {
                    log::warn!("scene {} has no update hook", self.scene.id());
                    self.missing_update_reported = true;
                }
            }
        }

        if self.config.clear_each_frame {
            rasterizer.clear(self.scene.background_color());
        }
        render_into(&self.tree, self.scene.nodes(), measure, &mut self.display);
        self.display.replay(rasterizer);
        self.frame += 1;
        self.is_running()
    }
}
