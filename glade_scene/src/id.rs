// Copyright 2025 the Glade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Entity identity: process-unique ids and display names.

use alloc::string::String;
use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};

/// Process-wide sequence backing [`EntityId::next`]. Starts at 1 so 0 is never issued.
static NEXT_ENTITY: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of a node, overlap, composed overlap or scene.
///
/// Ids are issued in increasing order and never reused. Unlike the arena
/// handles ([`NodeId`](crate::NodeId) and friends), an `EntityId` says nothing
/// about where the entity is stored; it names it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(u64);

impl EntityId {
    /// Issue the next id.
    pub(crate) fn next() -> Self {
        Self(NEXT_ENTITY.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity embedded in every domain object.
#[derive(Clone, Debug)]
pub struct Entity {
    id: EntityId,
    name: String,
}

impl Entity {
    pub(crate) fn new() -> Self {
        Self {
            id: EntityId::next(),
            name: String::new(),
        }
    }

    /// The id assigned at construction.
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Display name; empty unless set.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replace the display name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }
}
