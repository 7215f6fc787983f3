// Copyright 2025 the Glade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types: handles, node payloads, and local node data.

use alloc::string::String;
use kurbo::{Point, Rect, Size};
use peniko::Color;

use crate::measure::ContentMeasure;
use crate::slots::SlotKey;

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
        pub struct $name(pub(crate) u32, pub(crate) u32);

        impl SlotKey for $name {
            fn from_parts(idx: u32, generation: u32) -> Self {
                Self(idx, generation)
            }

            fn idx(self) -> usize {
                self.0 as usize
            }

            fn generation(self) -> u32 {
                self.1
            }
        }
    };
}

handle!(
    /// Identifier for a node in the [`Tree`](crate::Tree) (generational).
    NodeId
);

handle!(
    /// Identifier for an [overlap](crate::Tree::create_overlap) (generational).
    OverlapId
);

handle!(
    /// Identifier for a [composed overlap](crate::Tree::create_composed) (generational).
    ComposedId
);

/// Paint-order key. Lower layers paint first; ordering is local to a sibling group.
pub type Layer = u32;

/// A hit-testable region: one rectangle or an aggregate of rectangles.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum HitRegion {
    /// A single overlap rectangle.
    Single(OverlapId),
    /// A composed overlap; queries succeed if any member succeeds.
    Composed(ComposedId),
}

impl From<OverlapId> for HitRegion {
    fn from(id: OverlapId) -> Self {
        Self::Single(id)
    }
}

impl From<ComposedId> for HitRegion {
    fn from(id: ComposedId) -> Self {
        Self::Composed(id)
    }
}

/// Opaque image resource, owned by the resource collaborator.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ImageHandle(pub u32);

/// Opaque font resource, owned by the resource collaborator.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct FontHandle(pub u32);

/// Vector primitive drawn by an object node.
#[derive(Clone, Copy, Debug)]
pub enum Primitive {
    /// Filled rectangle centered on the node.
    Rectangle {
        /// Width.
        width: f64,
        /// Height.
        height: f64,
        /// Fill color.
        color: Color,
    },
    /// Filled circle centered on the node.
    Circle {
        /// Radius.
        radius: f64,
        /// Fill color.
        color: Color,
    },
    /// Line segment.
    ///
    /// Unlike the other primitives, a line is not centered on its node: the
    /// node's `position` must equal `from`, and the segment runs to `to`.
    /// A mismatch is reported at render time and the line is skipped.
    Line {
        /// Start point; must match the node position.
        from: Point,
        /// End point.
        to: Point,
        /// Stroke color.
        color: Color,
    },
}

impl Primitive {
    /// Size the primitive needs when the node does not override it.
    pub fn content_size(&self) -> Size {
        match *self {
            Self::Rectangle { width, height, .. } => Size::new(width, height),
            Self::Circle { radius, .. } => Size::new(radius * 2.0, radius * 2.0),
            Self::Line { from, to, .. } => Rect::from_points(from, to).size(),
        }
    }

    /// Primitive color.
    pub fn color(&self) -> Color {
        match *self {
            Self::Rectangle { color, .. } | Self::Circle { color, .. } | Self::Line { color, .. } => {
                color
            }
        }
    }
}

/// Visual source of an object node.
#[derive(Clone, Copy, Debug)]
pub enum Texture {
    /// Procedural primitive.
    Primitive(Primitive),
    /// Image resource.
    Image(ImageHandle),
}

impl Texture {
    /// Content size; `None` if the image resource cannot be measured.
    pub fn content_size(&self, measure: &(impl ContentMeasure + ?Sized)) -> Option<Size> {
        match self {
            Self::Primitive(p) => Some(p.content_size()),
            Self::Image(image) => measure.image_size(*image),
        }
    }
}

/// Text payload.
#[derive(Clone, Debug)]
pub struct TextInfo {
    /// UTF-8 content.
    pub text: String,
    /// Point size.
    pub point_size: u32,
    /// Font used to shape and measure; text without a font measures as zero.
    pub font: Option<FontHandle>,
    /// Text color.
    pub color: Color,
}

impl Default for TextInfo {
    fn default() -> Self {
        Self {
            text: String::new(),
            point_size: 12,
            font: None,
            color: Color::from_rgba8(0, 0, 0, 255),
        }
    }
}

impl TextInfo {
    /// Content size; `None` without a font or if the font cannot measure the text.
    pub fn content_size(&self, measure: &(impl ContentMeasure + ?Sized)) -> Option<Size> {
        let font = self.font?;
        measure.text_size(&self.text, self.point_size, font)
    }
}

/// What a node carries.
#[derive(Clone, Debug, Default)]
pub enum Payload {
    /// Nothing to draw; groups and positions children.
    #[default]
    Base,
    /// A primitive or image, if any.
    Object(Option<Texture>),
    /// Text.
    Text(TextInfo),
}

/// Payload tag.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum NodeKind {
    /// [`Payload::Base`].
    Base,
    /// [`Payload::Object`].
    Object,
    /// [`Payload::Text`].
    Text,
}

impl Payload {
    /// The payload tag.
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Base => NodeKind::Base,
            Self::Object(_) => NodeKind::Object,
            Self::Text(_) => NodeKind::Text,
        }
    }
}

/// Local data for a node.
#[derive(Clone, Debug, Default)]
pub struct LocalNode {
    /// Position relative to the parent, or to window space for a root.
    ///
    /// Object nodes are drawn centered on this point; text nodes start here.
    pub position: Point,
    /// Override size. [`Size::ZERO`] means "derive from content".
    pub size: Size,
    /// Paint order within the sibling group.
    pub layer: Layer,
    /// What the node draws.
    pub payload: Payload,
}

impl LocalNode {
    /// An object node showing `texture`.
    pub fn object(texture: Texture) -> Self {
        Self {
            payload: Payload::Object(Some(texture)),
            ..Self::default()
        }
    }

    /// A text node.
    pub fn text(info: TextInfo) -> Self {
        Self {
            payload: Payload::Text(info),
            ..Self::default()
        }
    }

    /// Builder-style position.
    pub fn at(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    /// Builder-style layer.
    pub fn on_layer(mut self, layer: Layer) -> Self {
        self.layer = layer;
        self
    }

    /// Builder-style override size.
    pub fn sized(mut self, size: Size) -> Self {
        self.size = size;
        self
    }
}
