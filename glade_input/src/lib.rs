// Copyright 2025 the Glade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glade Input: pointer and keyboard state for a single-threaded frame loop.
//!
//! The frame loop of a Glade application owns the scene and mutates it from
//! one thread. Input usually arrives on another (the windowing thread that
//! polls OS events). This crate is the seam between the two:
//!
//! - [`InputMailbox`]: a lock-free, single-producer/single-consumer handoff.
//!   The polling side deposits the latest pointer position, button and key
//!   transitions; the frame side drains it once per frame with
//!   [`InputMailbox::take`].
//! - [`InputSnapshot`]: what the frame sees. Held state (buttons, keys) plus
//!   the edges (pressed/released) that happened since the previous drain.
//! - [`PointerSource`]: the pointer-position oracle consumed by hit-testing.
//!   Snapshots implement it, and so does any closure-free type a host chooses.
//!
//! The mailbox is not a queue. If the polling side deposits two positions
//! before the frame drains, the frame sees only the last one. Edges are
//! accumulated with bitwise OR, so a press and a release inside the same frame
//! both show up.
//!
//! ```
//! use glade_input::{InputMailbox, KeyCode, PointerButtons, PointerSource};
//! use kurbo::Point;
//!
//! let mailbox = InputMailbox::new();
//!
//! // Polling thread.
//! mailbox.move_pointer(Point::new(12.0, 34.0));
//! mailbox.press_button(PointerButtons::PRIMARY);
//! mailbox.press_key(KeyCode(44));
//!
//! // Frame thread.
//! let frame = mailbox.take();
//! assert_eq!(frame.pointer_position(), Point::new(12.0, 34.0));
//! assert!(frame.pressed.contains(PointerButtons::PRIMARY));
//! assert!(frame.key_down(KeyCode(44)));
//!
//! // Edges are reset by the drain; held state is not.
//! let next = mailbox.take();
//! assert!(next.pressed.is_empty());
//! assert!(next.buttons.contains(PointerButtons::PRIMARY));
//! assert!(next.key_held(KeyCode(44)));
//! ```
//!
//! This crate is `no_std`.

#![no_std]

mod keys;
mod mailbox;

pub use keys::{KeyCode, KeySet};
pub use mailbox::{InputMailbox, InputSnapshot};

use kurbo::Point;

bitflags::bitflags! {
    /// Pointer buttons, as a set.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct PointerButtons: u8 {
        /// Primary button (usually left).
        const PRIMARY   = 0b0000_0001;
        /// Middle button or wheel press.
        const MIDDLE    = 0b0000_0010;
        /// Secondary button (usually right).
        const SECONDARY = 0b0000_0100;
    }
}

/// Source of the current pointer position in window space.
///
/// Hit-testing code asks this oracle where the pointer is rather than reading
/// platform state directly, so the same queries work against live input, a
/// recorded snapshot, or a fixed point in tests.
pub trait PointerSource {
    /// Current pointer position in window coordinates.
    fn pointer_position(&self) -> Point;
}

impl PointerSource for Point {
    fn pointer_position(&self) -> Point {
        *self
    }
}

impl<T: PointerSource + ?Sized> PointerSource for &T {
    fn pointer_position(&self) -> Point {
        (**self).pointer_position()
    }
}
