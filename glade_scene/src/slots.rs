// Copyright 2025 the Glade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Generational slot storage shared by nodes, overlaps and composed overlaps.

use alloc::vec::Vec;
use core::marker::PhantomData;

/// A generational handle: slot index plus the generation it was issued for.
pub(crate) trait SlotKey: Copy {
    fn from_parts(idx: u32, generation: u32) -> Self;
    fn idx(self) -> usize;
    fn generation(self) -> u32;
}

/// Slots addressed by generational keys.
///
/// Freed slots are recycled; each reuse bumps the slot generation so keys
/// issued before the free are detected as stale.
pub(crate) struct Slots<K, T> {
    entries: Vec<Option<T>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    _key: PhantomData<K>,
}

impl<K, T> core::fmt::Debug for Slots<K, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.entries.len();
        let alive = self.entries.iter().filter(|e| e.is_some()).count();
        f.debug_struct("Slots")
            .field("total", &total)
            .field("alive", &alive)
            .field("free_list", &self.free_list.len())
            .finish()
    }
}

impl<K, T> Default for Slots<K, T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            _key: PhantomData,
        }
    }
}

impl<K: SlotKey, T> Slots<K, T> {
    pub(crate) fn insert(&mut self, value: T) -> K {
        if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.entries[idx] = Some(value);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "handles use 32-bit indices by design."
            )]
            let idx = idx as u32;
            K::from_parts(idx, generation)
        } else {
            let generation = 1_u32;
            self.entries.push(Some(value));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "handles use 32-bit indices by design."
            )]
            let idx = (self.entries.len() - 1) as u32;
            K::from_parts(idx, generation)
        }
    }

    pub(crate) fn remove(&mut self, key: K) -> Option<T> {
        if !self.contains(key) {
            return None;
        }
        let value = self.entries[key.idx()].take();
        self.free_list.push(key.idx());
        value
    }

    pub(crate) fn contains(&self, key: K) -> bool {
        matches!(self.entries.get(key.idx()), Some(Some(_)))
            && self.generations[key.idx()] == key.generation()
    }

    pub(crate) fn get(&self, key: K) -> Option<&T> {
        if !self.contains(key) {
            return None;
        }
        self.entries[key.idx()].as_ref()
    }

    pub(crate) fn get_mut(&mut self, key: K) -> Option<&mut T> {
        if !self.contains(key) {
            return None;
        }
        self.entries[key.idx()].as_mut()
    }

    /// Iterate live entries with their keys, in slot order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (K, &T)> + '_ {
        self.entries.iter().enumerate().filter_map(|(i, e)| {
            let value = e.as_ref()?;
            #[allow(
                clippy::cast_possible_truncation,
                reason = "handles use 32-bit indices by design."
            )]
            let idx = i as u32;
            Some((K::from_parts(idx, self.generations[i]), value))
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len() - self.free_list.len()
    }
}
