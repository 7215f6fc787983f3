// Copyright 2025 the Glade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keyboard scancodes and fixed-size key sets.

/// Number of scancodes a [`KeySet`] can hold.
pub(crate) const KEY_CAPACITY: usize = 512;

/// Words backing a [`KeySet`].
pub(crate) const KEY_WORDS: usize = KEY_CAPACITY / 64;

/// Physical key identifier (a platform scancode).
///
/// Codes at or above 512 are not tracked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyCode(pub u16);

impl KeyCode {
    #[inline]
    pub(crate) const fn slot(self) -> Option<(usize, u64)> {
        let code = self.0 as usize;
        if code >= KEY_CAPACITY {
            return None;
        }
        Some((code / 64, 1_u64 << (code % 64)))
    }
}

/// A set of [`KeyCode`]s stored as a bitmap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct KeySet {
    words: [u64; KEY_WORDS],
}

impl KeySet {
    /// The empty set.
    pub const EMPTY: Self = Self {
        words: [0; KEY_WORDS],
    };

    pub(crate) const fn from_words(words: [u64; KEY_WORDS]) -> Self {
        Self { words }
    }

    /// Add `key`. Returns `false` if the key was already present or is out of range.
    pub fn insert(&mut self, key: KeyCode) -> bool {
        let Some((word, bit)) = key.slot() else {
            return false;
        };
        let was = self.words[word] & bit != 0;
        self.words[word] |= bit;
        !was
    }

    /// Remove `key`. Returns whether it was present.
    pub fn remove(&mut self, key: KeyCode) -> bool {
        let Some((word, bit)) = key.slot() else {
            return false;
        };
        let was = self.words[word] & bit != 0;
        self.words[word] &= !bit;
        was
    }

    /// Whether `key` is in the set.
    pub fn contains(&self, key: KeyCode) -> bool {
        key.slot()
            .is_some_and(|(word, bit)| self.words[word] & bit != 0)
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    /// Number of keys in the set.
    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Iterate keys in ascending scancode order.
    pub fn iter(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.words.iter().enumerate().flat_map(|(i, &word)| {
            (0..64_u16).filter_map(move |b| {
                if word & (1_u64 << b) == 0 {
                    return None;
                }
                #[allow(
                    clippy::cast_possible_truncation,
                    reason = "word index is below KEY_WORDS, so the code fits in u16."
                )]
                let base = i as u16 * 64;
                Some(KeyCode(base + b))
            })
        })
    }
}
