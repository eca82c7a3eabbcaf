//! Match state threaded through a sequence match attempt

use super::slot::{SlotRead, SlotRef, SlotValue, SlotWrite};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

trait Bound: Send + Sync + fmt::Debug {
    fn as_any(&self) -> &dyn Any;
}

impl<V: SlotValue> Bound for V {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Snapshot of an in-progress match: cursor, capture bindings and the
/// tokens recorded so far.
///
/// Combinators take a `Context` by value and hand back new ones, so a fork
/// is just a `clone()`. Bound values are shared behind `Arc` and never
/// mutated, so a clone can not observe writes made by a sibling branch.
#[derive(Debug, Clone)]
pub struct Context<T> {
    position: usize,
    bindings: HashMap<u64, Arc<dyn Bound>>,
    recorded: Vec<T>,
    debug: bool,
}

impl<T> Context<T> {
    /// Empty context positioned at the start of the stream
    pub fn start() -> Self {
        Self {
            position: 0,
            bindings: HashMap::new(),
            recorded: Vec::new(),
            debug: false,
        }
    }

    /// Enable per-token tracing for matches run from this context
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Whether per-token tracing is enabled
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Offset of the token currently under the cursor
    pub fn position(&self) -> usize {
        self.position
    }

    pub(crate) fn at(mut self, position: usize) -> Self {
        self.position = position;
        self
    }

    /// Bind `value` to the slot.
    ///
    /// Slots are write-once per branch: returns `None` when the slot
    /// already holds a value, which callers treat as a failed match.
    pub fn store<V: SlotValue>(mut self, slot: &SlotWrite<V>, value: V) -> Option<Self> {
        let id = slot.slot_ref().id();
        if self.bindings.contains_key(&id) {
            return None;
        }
        self.bindings.insert(id, Arc::new(value));
        Some(self)
    }

    /// Value bound to the slot in this branch, if any
    pub fn retrieve<V: SlotValue>(&self, slot: &SlotRead<V>) -> Option<V> {
        self.bindings
            .get(&slot.slot_ref().id())
            .and_then(|bound| bound.as_any().downcast_ref::<V>())
            .cloned()
    }

    /// Whether the slot is bound in this branch
    pub fn is_bound(&self, slot: &SlotRef) -> bool {
        self.bindings.contains_key(&slot.id())
    }

    /// Append a token to the accumulator
    pub fn record(mut self, token: T) -> Self {
        self.recorded.push(token);
        self
    }

    /// Tokens recorded along this branch, in match order
    pub fn recorded(&self) -> &[T] {
        &self.recorded
    }

    /// Consume the context, keeping only the recorded tokens
    pub fn into_recorded(self) -> Vec<T> {
        self.recorded
    }
}

impl<T> Default for Context<T> {
    fn default() -> Self {
        Self::start()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::Slot;

    #[test]
    fn test_store_is_write_once() {
        let slot: Slot<u32> = Slot::new("label");
        let ctx: Context<char> = Context::start();

        let ctx = ctx.store(&slot.write(), 7).unwrap();
        assert_eq!(ctx.retrieve(&slot.read()), Some(7));
        assert!(ctx.store(&slot.write(), 8).is_none());
    }

    #[test]
    fn test_forks_are_independent() {
        let slot: Slot<u32> = Slot::new("label");
        let base: Context<char> = Context::start();

        let left = base.clone().store(&slot.write(), 1).unwrap().record('a');
        let right = base.clone().store(&slot.write(), 2).unwrap();

        assert_eq!(left.retrieve(&slot.read()), Some(1));
        assert_eq!(right.retrieve(&slot.read()), Some(2));
        assert_eq!(left.recorded(), &['a']);
        assert!(right.recorded().is_empty());
        assert!(!base.is_bound(slot.slot_ref()));
    }

    #[test]
    fn test_retrieve_unbound_is_none() {
        let slot: Slot<String> = Slot::new("name");
        let ctx: Context<u8> = Context::default();
        assert_eq!(ctx.retrieve(&slot.read()), None);
    }
}
