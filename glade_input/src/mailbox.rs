// Copyright 2025 the Glade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Single-producer/single-consumer input handoff.

use core::sync::atomic::{AtomicBool, AtomicU8, AtomicU64, Ordering};

use kurbo::Point;

use crate::keys::{KEY_WORDS, KeySet};
use crate::{KeyCode, PointerButtons, PointerSource};

/// Latest input state, shared between a polling thread and the frame loop.
///
/// Exactly one thread should call the producer methods (`move_pointer`,
/// `press_*`, `release_*`, `request_quit`) and exactly one thread should call
/// [`take`](Self::take). Everything is stored in atomics, so sharing through
/// an `Arc` or a `static` needs no lock.
///
/// Pointer coordinates are stored as a pair of `f32` packed into one word so
/// the frame never observes an `x` from one move and a `y` from another.
#[derive(Debug)]
pub struct InputMailbox {
    pointer: AtomicU64,
    buttons: AtomicU8,
    pressed: AtomicU8,
    released: AtomicU8,
    keys_held: [AtomicU64; KEY_WORDS],
    keys_down: [AtomicU64; KEY_WORDS],
    keys_up: [AtomicU64; KEY_WORDS],
    quit: AtomicBool,
}

impl Default for InputMailbox {
    fn default() -> Self {
        Self::new()
    }
}

/// Input observed by one frame.
///
/// Held state (`buttons`, `keys`) reflects the last deposit. Edge state
/// (`pressed`, `released`, `keys_down`, `keys_up`) holds every transition
/// deposited since the previous [`InputMailbox::take`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputSnapshot {
    /// Pointer position in window coordinates.
    pub pointer: Point,
    /// Buttons currently held.
    pub buttons: PointerButtons,
    /// Buttons pressed since the previous frame.
    pub pressed: PointerButtons,
    /// Buttons released since the previous frame.
    pub released: PointerButtons,
    /// Keys currently held.
    pub keys: KeySet,
    /// Keys pressed since the previous frame.
    pub keys_down: KeySet,
    /// Keys released since the previous frame.
    pub keys_up: KeySet,
    /// The host asked the application to stop.
    pub quit_requested: bool,
}

impl InputSnapshot {
    /// Whether `key` is held.
    pub fn key_held(&self, key: KeyCode) -> bool {
        self.keys.contains(key)
    }

    /// Whether `key` went down since the previous frame.
    pub fn key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(key)
    }

    /// Whether `key` went up since the previous frame.
    pub fn key_up(&self, key: KeyCode) -> bool {
        self.keys_up.contains(key)
    }

    /// Whether `button` is held.
    pub fn button_held(&self, button: PointerButtons) -> bool {
        self.buttons.contains(button)
    }
}

impl PointerSource for InputSnapshot {
    fn pointer_position(&self) -> Point {
        self.pointer
    }
}

#[inline]
fn pack(p: Point) -> u64 {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "window coordinates are stored at f32 precision."
    )]
    let (x, y) = (p.x as f32, p.y as f32);
    (u64::from(x.to_bits()) << 32) | u64::from(y.to_bits())
}

#[inline]
fn unpack(bits: u64) -> Point {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "each half of the word is one f32."
    )]
    let (x, y) = ((bits >> 32) as u32, bits as u32);
    Point::new(f64::from(f32::from_bits(x)), f64::from(f32::from_bits(y)))
}

impl InputMailbox {
    /// Create an empty mailbox: pointer at the origin, nothing held.
    pub const fn new() -> Self {
        Self {
            pointer: AtomicU64::new(0),
            buttons: AtomicU8::new(0),
            pressed: AtomicU8::new(0),
            released: AtomicU8::new(0),
            keys_held: [const { AtomicU64::new(0) }; KEY_WORDS],
            keys_down: [const { AtomicU64::new(0) }; KEY_WORDS],
            keys_up: [const { AtomicU64::new(0) }; KEY_WORDS],
            quit: AtomicBool::new(false),
        }
    }

    // --- producer side ---

    /// Record the latest pointer position.
    pub fn move_pointer(&self, position: Point) {
        self.pointer.store(pack(position), Ordering::Release);
    }

    /// Record that `buttons` went down.
    pub fn press_button(&self, buttons: PointerButtons) {
        self.buttons.fetch_or(buttons.bits(), Ordering::AcqRel);
        self.pressed.fetch_or(buttons.bits(), Ordering::AcqRel);
    }

    /// Record that `buttons` went up.
    pub fn release_button(&self, buttons: PointerButtons) {
        self.buttons.fetch_and(!buttons.bits(), Ordering::AcqRel);
        self.released.fetch_or(buttons.bits(), Ordering::AcqRel);
    }

    /// Record that `key` went down. Untracked scancodes are ignored.
    pub fn press_key(&self, key: KeyCode) {
        if let Some((word, bit)) = key.slot() {
            self.keys_held[word].fetch_or(bit, Ordering::AcqRel);
            self.keys_down[word].fetch_or(bit, Ordering::AcqRel);
        }
    }

    /// Record that `key` went up. Untracked scancodes are ignored.
    pub fn release_key(&self, key: KeyCode) {
        if let Some((word, bit)) = key.slot() {
            self.keys_held[word].fetch_and(!bit, Ordering::AcqRel);
            self.keys_up[word].fetch_or(bit, Ordering::AcqRel);
        }
    }

    /// Ask the frame loop to stop (window closed, signal received, ...).
    pub fn request_quit(&self) {
        self.quit.store(true, Ordering::Release);
    }

    // --- consumer side ---

    /// Latest pointer position without draining anything.
    pub fn pointer(&self) -> Point {
        unpack(self.pointer.load(Ordering::Acquire))
    }

    /// Drain the mailbox for one frame.
    ///
    /// Held state is copied; edge state and the quit request are reset.
    /// Press edges are drained before held state is read and release edges
    /// after, so a reported press is always held, released, or both.
    pub fn take(&self) -> InputSnapshot {
        let mut held = [0_u64; KEY_WORDS];
        let mut down = [0_u64; KEY_WORDS];
        let mut up = [0_u64; KEY_WORDS];
        let pressed = self.pressed.swap(0, Ordering::AcqRel);
        let buttons = self.buttons.load(Ordering::Acquire);
        let released = self.released.swap(0, Ordering::AcqRel);
        for i in 0..KEY_WORDS {
            down[i] = self.keys_down[i].swap(0, Ordering::AcqRel);
            held[i] = self.keys_held[i].load(Ordering::Acquire);
            up[i] = self.keys_up[i].swap(0, Ordering::AcqRel);
        }
        InputSnapshot {
            pointer: self.pointer(),
            buttons: PointerButtons::from_bits_truncate(buttons),
            pressed: PointerButtons::from_bits_truncate(pressed),
            released: PointerButtons::from_bits_truncate(released),
            keys: KeySet::from_words(held),
            keys_down: KeySet::from_words(down),
            keys_up: KeySet::from_words(up),
            quit_requested: self.quit.swap(false, Ordering::AcqRel),
        }
    }
}

impl PointerSource for InputMailbox {
    fn pointer_position(&self) -> Point {
        self.pointer()
    }
}
