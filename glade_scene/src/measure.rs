// Copyright 2025 the Glade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Content-size oracle consumed by size resolution.

use kurbo::Size;

use crate::types::{FontHandle, ImageHandle};

/// Measures content owned by the resource collaborator.
///
/// Returning `None` means the resource is missing or failed to load. Size
/// resolution treats it as a zero size; rendering skips images it cannot
/// measure.
pub trait ContentMeasure {
    /// Natural size of an image.
    fn image_size(&self, image: ImageHandle) -> Option<Size>;

    /// Size of `text` rendered with `font` at `point_size`.
    fn text_size(&self, text: &str, point_size: u32, font: FontHandle) -> Option<Size>;
}

impl<T: ContentMeasure + ?Sized> ContentMeasure for &T {
    fn image_size(&self, image: ImageHandle) -> Option<Size> {
        (**self).image_size(image)
    }

    fn text_size(&self, text: &str, point_size: u32, font: FontHandle) -> Option<Size> {
        (**self).text_size(text, point_size, font)
    }
}

/// A measurer with no resources: every image and text measures as missing.
///
/// Useful for scenes built only from primitives and explicit sizes.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoContent;

impl ContentMeasure for NoContent {
    fn image_size(&self, _: ImageHandle) -> Option<Size> {
        None
    }

    fn text_size(&self, _: &str, _: u32, _: FontHandle) -> Option<Size> {
        None
    }
}
