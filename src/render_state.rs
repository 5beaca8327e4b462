// src/render_state.rs
//! Identity and dirty-flag state embedded by every renderable entity.
//!
//! Each entity gets an `EntityId` at construction. The id is the key for
//! every GPU-side cache, so it must stay unique for the entity's lifetime
//! and must never be reused while a GPU resource could still reference it.
//! A monotonically increasing 64-bit counter gives us both for free.

use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ENTITY_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identity of a renderable entity. Process-unique, never recycled.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct EntityId(NonZeroU64);

impl EntityId {
    fn next() -> Self {
        let raw = NEXT_ENTITY_ID.fetch_add(1, Ordering::Relaxed);
        EntityId(NonZeroU64::new(raw).expect("entity id counter wrapped"))
    }
}

/// Per-entity render bookkeeping: identity plus the CPU-side dirty flag.
///
/// `needs_update` starts `true` (nothing has been uploaded yet), is set by
/// every mutator on the owning entity, and is cleared by the render loop
/// after a successful upsert.
#[derive(Debug)]
pub struct RenderState {
    id: EntityId,
    needs_update: bool,
}

impl RenderState {
    pub fn new() -> Self {
        Self {
            id: EntityId::next(),
            needs_update: true,
        }
    }

    #[inline]
    pub fn id(&self) -> EntityId {
        self.id
    }

    #[inline]
    pub fn needs_update(&self) -> bool {
        self.needs_update
    }

    #[inline]
    pub fn mark_dirty(&mut self) {
        self.needs_update = true;
    }

    #[inline]
    pub fn clear_dirty(&mut self) {
        self.needs_update = false;
    }
}

impl Default for RenderState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = RenderState::new();
        let b = RenderState::new();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn starts_dirty_and_round_trips() {
        let mut state = RenderState::new();
        assert!(state.needs_update());

        state.clear_dirty();
        assert!(!state.needs_update());

        state.mark_dirty();
        assert!(state.needs_update());
    }
}
