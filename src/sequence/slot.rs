//! Named, typed capture cells
//!
//! A [`Slot`] is declared once per grammar and handed out as a
//! [`SlotWrite`] (capture) or [`SlotRead`] (read-back) capability. The
//! values themselves live in a [`Context`](super::Context), never in the
//! slot, so every branch of a match attempt sees its own bindings.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Values that can be captured in a slot
pub trait SlotValue: Any + Clone + PartialEq + Send + Sync + fmt::Debug {}

impl<V> SlotValue for V where V: Any + Clone + PartialEq + Send + Sync + fmt::Debug {}

/// Untyped slot identity used for bookkeeping and validation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlotRef {
    id: u64,
    name: Arc<str>,
}

impl SlotRef {
    /// Unique id of the slot
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Name given at creation (diagnostics only)
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for SlotRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.id)
    }
}

fn next_slot_id() -> u64 {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// A named capture cell holding values of type `V`
pub struct Slot<V> {
    slot: SlotRef,
    _marker: PhantomData<fn() -> V>,
}

impl<V: SlotValue> Slot<V> {
    /// Create a fresh slot. Two slots with the same name are still distinct.
    pub fn new(name: &str) -> Self {
        Self {
            slot: SlotRef {
                id: next_slot_id(),
                name: Arc::from(name),
            },
            _marker: PhantomData,
        }
    }

    /// Capability to bind this slot
    pub fn write(&self) -> SlotWrite<V> {
        SlotWrite {
            slot: self.slot.clone(),
            _marker: PhantomData,
        }
    }

    /// Capability to read this slot back
    pub fn read(&self) -> SlotRead<V> {
        SlotRead {
            slot: self.slot.clone(),
            _marker: PhantomData,
        }
    }

    /// Untyped identity
    pub fn slot_ref(&self) -> &SlotRef {
        &self.slot
    }
}

impl<V> fmt::Debug for Slot<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Slot").field(&self.slot).finish()
    }
}

/// Write capability for a [`Slot`]
pub struct SlotWrite<V> {
    slot: SlotRef,
    _marker: PhantomData<fn() -> V>,
}

impl<V> SlotWrite<V> {
    /// Untyped identity
    pub fn slot_ref(&self) -> &SlotRef {
        &self.slot
    }
}

impl<V> Clone for SlotWrite<V> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
            _marker: PhantomData,
        }
    }
}

impl<V> fmt::Debug for SlotWrite<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SlotWrite").field(&self.slot).finish()
    }
}

/// Read capability for a [`Slot`]
pub struct SlotRead<V> {
    slot: SlotRef,
    _marker: PhantomData<fn() -> V>,
}

impl<V> SlotRead<V> {
    /// Untyped identity
    pub fn slot_ref(&self) -> &SlotRef {
        &self.slot
    }
}

impl<V> Clone for SlotRead<V> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
            _marker: PhantomData,
        }
    }
}

impl<V> fmt::Debug for SlotRead<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SlotRead").field(&self.slot).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots_with_same_name_are_distinct() {
        let a: Slot<u32> = Slot::new("counter");
        let b: Slot<u32> = Slot::new("counter");
        assert_ne!(a.slot_ref(), b.slot_ref());
        assert_eq!(a.slot_ref().name(), b.slot_ref().name());
    }

    #[test]
    fn test_read_and_write_share_identity() {
        let slot: Slot<i64> = Slot::new("value");
        assert_eq!(slot.read().slot_ref(), slot.write().slot_ref());
        assert!(slot.slot_ref().to_string().starts_with("value#"));
    }
}
