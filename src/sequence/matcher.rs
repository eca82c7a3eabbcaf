//! Single-token predicates
//!
//! A [`Match`] decides whether one token is acceptable in a given
//! [`Context`], possibly producing a new context (captures, recordings).
//! Sequencing and repetition over many tokens live in
//! [`SequenceQuery`](super::SequenceQuery).

use super::context::Context;
use super::slot::{SlotRead, SlotRef, SlotValue, SlotWrite};
use std::fmt;
use std::sync::Arc;

type TestFn<T> = dyn Fn(Context<T>, &T) -> Option<Context<T>> + Send + Sync;

/// Predicate over a single token.
///
/// Besides the test itself, a `Match` carries the slots it needs bound
/// beforehand and the slots it binds on success. `SequenceQuery::compile`
/// uses these to reject grammars that read a slot before writing it.
pub struct Match<T> {
    test: Arc<TestFn<T>>,
    requires: Vec<SlotRef>,
    binds: Vec<SlotRef>,
}

impl<T> Clone for Match<T> {
    fn clone(&self) -> Self {
        Self {
            test: Arc::clone(&self.test),
            requires: self.requires.clone(),
            binds: self.binds.clone(),
        }
    }
}

impl<T> fmt::Debug for Match<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Match")
            .field("requires", &self.requires)
            .field("binds", &self.binds)
            .finish_non_exhaustive()
    }
}

impl<T: Clone + 'static> Match<T> {
    /// Predicate with full access to the context.
    ///
    /// Slots touched by `f` must be declared with [`Match::requiring`] and
    /// [`Match::binding`], otherwise compile-time validation can not see them.
    pub fn with_context<F>(f: F) -> Self
    where
        F: Fn(Context<T>, &T) -> Option<Context<T>> + Send + Sync + 'static,
    {
        Self {
            test: Arc::new(f),
            requires: Vec::new(),
            binds: Vec::new(),
        }
    }

    /// Context-free predicate
    pub fn when<F>(pred: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self::with_context(move |ctx, token| pred(token).then_some(ctx))
    }

    /// Accepts every token
    pub fn always() -> Self {
        Self::with_context(|ctx, _| Some(ctx))
    }

    /// Rejects every token
    pub fn never() -> Self {
        Self::with_context(|_, _| None)
    }

    /// Declare that this predicate reads `slot`
    pub fn requiring(mut self, slot: &SlotRef) -> Self {
        push_unique(&mut self.requires, slot);
        self
    }

    /// Declare that this predicate binds `slot` on success
    pub fn binding(mut self, slot: &SlotRef) -> Self {
        push_unique(&mut self.binds, slot);
        self
    }

    /// Bind the value extracted from the token.
    ///
    /// Fails when `extract` yields nothing or when the slot is already bound
    /// in this branch.
    pub fn capture<V, F>(slot: SlotWrite<V>, extract: F) -> Self
    where
        V: SlotValue,
        F: Fn(&T) -> Option<V> + Send + Sync + 'static,
    {
        let slot_ref = slot.slot_ref().clone();
        Self::with_context(move |ctx, token| {
            let value = extract(token)?;
            ctx.store(&slot, value)
        })
        .binding(&slot_ref)
    }

    /// Succeeds when the value extracted from the token equals the one
    /// already bound to `slot`.
    pub fn equals_bound<V, F>(slot: SlotRead<V>, extract: F) -> Self
    where
        V: SlotValue,
        F: Fn(&T) -> Option<V> + Send + Sync + 'static,
    {
        let slot_ref = slot.slot_ref().clone();
        Self::with_context(move |ctx, token| {
            let bound = ctx.retrieve(&slot)?;
            let value = extract(token)?;
            (bound == value).then_some(ctx)
        })
        .requiring(&slot_ref)
    }

    /// Both predicates must hold; `other` sees the context produced by `self`
    pub fn and(self, other: Match<T>) -> Self {
        let mut requires = self.requires.clone();
        for slot in &other.requires {
            if !self.binds.contains(slot) {
                push_unique(&mut requires, slot);
            }
        }
        let mut binds = self.binds.clone();
        for slot in &other.binds {
            push_unique(&mut binds, slot);
        }

        let (first, second) = (self.test, other.test);
        Self {
            test: Arc::new(move |ctx: Context<T>, token: &T| {
                first(ctx, token).and_then(|ctx| second(ctx, token))
            }),
            requires,
            binds,
        }
    }

    /// First predicate that holds wins
    pub fn or(self, other: Match<T>) -> Self {
        let mut requires = self.requires.clone();
        for slot in &other.requires {
            push_unique(&mut requires, slot);
        }
        let binds = self
            .binds
            .iter()
            .filter(|slot| other.binds.contains(slot))
            .cloned()
            .collect();

        let (first, second) = (self.test, other.test);
        Self {
            test: Arc::new(move |ctx: Context<T>, token: &T| {
                first(ctx.clone(), token).or_else(|| second(ctx, token))
            }),
            requires,
            binds,
        }
    }

    /// Holds when `self` does not; never binds anything
    pub fn negate(self) -> Self {
        let inner = self.test;
        Self {
            test: Arc::new(move |ctx: Context<T>, token: &T| {
                inner(ctx.clone(), token).is_none().then_some(ctx)
            }),
            requires: self.requires,
            binds: Vec::new(),
        }
    }

    /// Run the predicate against a token
    pub fn test(&self, ctx: Context<T>, token: &T) -> Option<Context<T>> {
        (self.test)(ctx, token)
    }

    /// Slots that must be bound before this predicate runs
    pub fn requires(&self) -> &[SlotRef] {
        &self.requires
    }

    /// Slots bound whenever this predicate succeeds
    pub fn binds(&self) -> &[SlotRef] {
        &self.binds
    }

    /// Always succeeds, appending the current token to the accumulator.
    ///
    /// Combine with `and` to mark a token as interesting without
    /// constraining what it is.
    pub fn record() -> Self {
        Self::with_context(|ctx, token: &T| Some(ctx.record(token.clone())))
    }
}

impl<T: Clone + fmt::Debug + 'static> Match<T> {
    /// Always succeeds, logging the token and cursor at debug level
    pub fn debug(label: &str) -> Self {
        let label: Arc<str> = Arc::from(label);
        Self::with_context(move |ctx, token: &T| {
            tracing::debug!(
                label = %label,
                position = ctx.position(),
                token = ?token,
                "sequence match"
            );
            Some(ctx)
        })
    }
}

fn push_unique(slots: &mut Vec<SlotRef>, slot: &SlotRef) {
    if !slots.contains(slot) {
        slots.push(slot.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::Slot;

    fn even() -> Match<u32> {
        Match::when(|n: &u32| n % 2 == 0)
    }

    #[test]
    fn test_when_and_negate() {
        let ctx = Context::start();
        assert!(even().test(ctx.clone(), &4).is_some());
        assert!(even().test(ctx.clone(), &3).is_none());
        assert!(even().negate().test(ctx, &3).is_some());
    }

    #[test]
    fn test_and_threads_context() {
        let slot: Slot<u32> = Slot::new("n");
        let m = Match::capture(slot.write(), |n: &u32| Some(*n)).and(Match::record());

        let ctx = m.test(Context::start(), &9).unwrap();
        assert_eq!(ctx.retrieve(&slot.read()), Some(9));
        assert_eq!(ctx.recorded(), &[9]);
    }

    #[test]
    fn test_or_does_not_leak_failed_branch_bindings() {
        let slot: Slot<u32> = Slot::new("n");
        let left = Match::capture(slot.write(), |n: &u32| Some(*n)).and(Match::never());
        let right = Match::always();

        let ctx = left.or(right).test(Context::start(), &5).unwrap();
        assert_eq!(ctx.retrieve(&slot.read()), None);
    }

    #[test]
    fn test_equals_bound_requires_binding() {
        let slot: Slot<u32> = Slot::new("n");
        let read_back = Match::equals_bound(slot.read(), |n: &u32| Some(*n));

        assert!(read_back.test(Context::start(), &1).is_none());

        let bound = Context::start().store(&slot.write(), 1).unwrap();
        assert!(read_back.test(bound.clone(), &1).is_some());
        assert!(read_back.test(bound, &2).is_none());
    }

    #[test]
    fn test_slot_metadata_composition() {
        let a: Slot<u32> = Slot::new("a");
        let b: Slot<u32> = Slot::new("b");

        let write_a = Match::capture(a.write(), |n: &u32| Some(*n));
        let read_a = Match::equals_bound(a.read(), |n: &u32| Some(*n));
        let read_b = Match::equals_bound(b.read(), |n: &u32| Some(*n));

        let seq = write_a.clone().and(read_a.clone());
        assert!(seq.requires().is_empty());
        assert_eq!(seq.binds(), &[a.slot_ref().clone()]);

        let alt = write_a.or(read_b);
        assert_eq!(alt.requires(), &[b.slot_ref().clone()]);
        assert!(alt.binds().is_empty());

        assert!(read_a.negate().binds().is_empty());
    }
}
