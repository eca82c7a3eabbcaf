//! Sequence query combinators and compile-time validation

use super::engine::SequenceMatcher;
use super::matcher::Match;
use super::params::QueryParams;
use super::slot::SlotRef;
use crate::{Error, Result};
use std::collections::HashSet;
use std::fmt;

/// Combinator tree node
pub(crate) enum Node<T> {
    /// Consume exactly one token satisfying the predicate
    Token(Match<T>),
    /// Run the first node, then the second from every context it produced
    Then(Box<Node<T>>, Box<Node<T>>),
    /// Union of both branches, each from its own copy of the context
    Or(Box<Node<T>>, Box<Node<T>>),
    /// Zero or more repetitions, every count explored
    ZeroOrMore(Box<Node<T>>),
}

impl<T> Clone for Node<T> {
    fn clone(&self) -> Self {
        match self {
            Node::Token(m) => Node::Token(m.clone()),
            Node::Then(a, b) => Node::Then(a.clone(), b.clone()),
            Node::Or(a, b) => Node::Or(a.clone(), b.clone()),
            Node::ZeroOrMore(inner) => Node::ZeroOrMore(inner.clone()),
        }
    }
}

impl<T> fmt::Debug for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Token(_) => write!(f, "token"),
            Node::Then(a, b) => write!(f, "({:?} {:?})", a, b),
            Node::Or(a, b) => write!(f, "({:?} | {:?})", a, b),
            Node::ZeroOrMore(inner) => write!(f, "{:?}*", inner),
        }
    }
}

impl<T: Clone + 'static> Node<T> {
    /// Whether the node can succeed without consuming a token
    fn nullable(&self) -> bool {
        match self {
            Node::Token(_) => false,
            Node::Then(a, b) => a.nullable() && b.nullable(),
            Node::Or(a, b) => a.nullable() || b.nullable(),
            Node::ZeroOrMore(_) => true,
        }
    }

    /// Check every slot read is preceded by a write on all paths reaching
    /// it. Returns the slots definitely bound after the node succeeds.
    fn check_bindings(&self, bound: &HashSet<SlotRef>) -> Result<HashSet<SlotRef>> {
        match self {
            Node::Token(m) => {
                if let Some(slot) = m.requires().iter().find(|slot| !bound.contains(*slot)) {
                    return Err(Error::UnboundSlot {
                        slot: slot.name().to_string(),
                    });
                }
                let mut after = bound.clone();
                after.extend(m.binds().iter().cloned());
                Ok(after)
            }
            Node::Then(a, b) => {
                let after_a = a.check_bindings(bound)?;
                b.check_bindings(&after_a)
            }
            Node::Or(a, b) => {
                let left = a.check_bindings(bound)?;
                let right = b.check_bindings(bound)?;
                Ok(left.intersection(&right).cloned().collect())
            }
            Node::ZeroOrMore(inner) => {
                if inner.nullable() {
                    return Err(Error::EmptyRepetition);
                }
                inner.check_bindings(bound)?;
                Ok(bound.clone())
            }
        }
    }
}

/// Entry points for building a [`SequenceQuery`]
pub struct QueryStart;

impl QueryStart {
    /// Query consuming one token that satisfies `m`
    pub fn matching<T>(m: Match<T>) -> SequenceQuery<T> {
        SequenceQuery {
            root: Node::Token(m),
        }
    }

    /// Query consuming any single token
    pub fn any<T: Clone + 'static>() -> SequenceQuery<T> {
        Self::matching(Match::always())
    }

    /// Query consisting of any number of repetitions of `repeated`
    pub fn zero_or_more<T>(repeated: SequenceQuery<T>) -> SequenceQuery<T> {
        SequenceQuery {
            root: Node::ZeroOrMore(Box::new(repeated.root)),
        }
    }
}

/// A pattern over a token stream, built by chaining combinators.
///
/// ```
/// use loopsieve::sequence::{Match, QueryParams, QueryStart};
///
/// let query = QueryStart::matching(Match::when(|c: &char| *c == 'a'))
///     .zero_or_more(QueryStart::any())
///     .then(Match::when(|c: &char| *c == 'z'));
/// let matcher = query.compile(QueryParams::new()).unwrap();
///
/// assert!(matcher.matches(&['x', 'a', 'q', 'z']));
/// assert!(!matcher.matches(&['z', 'a']));
/// ```
pub struct SequenceQuery<T> {
    root: Node<T>,
}

impl<T> Clone for SequenceQuery<T> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
        }
    }
}

impl<T> fmt::Debug for SequenceQuery<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SequenceQuery").field(&self.root).finish()
    }
}

impl<T: Clone + fmt::Debug + 'static> SequenceQuery<T> {
    /// Follow this query with one token satisfying `m`
    pub fn then(self, m: Match<T>) -> Self {
        self.then_query(QueryStart::matching(m))
    }

    /// Follow this query with another query
    pub fn then_query(self, next: SequenceQuery<T>) -> Self {
        Self {
            root: Node::Then(Box::new(self.root), Box::new(next.root)),
        }
    }

    /// Either this query or `other`; successes of both are kept
    pub fn or(self, other: SequenceQuery<T>) -> Self {
        Self {
            root: Node::Or(Box::new(self.root), Box::new(other.root)),
        }
    }

    /// Follow this query with any number of repetitions of `repeated`
    pub fn zero_or_more(self, repeated: SequenceQuery<T>) -> Self {
        Self {
            root: Node::Then(
                Box::new(self.root),
                Box::new(Node::ZeroOrMore(Box::new(repeated.root))),
            ),
        }
    }

    /// Follow this query with at least one repetition of `repeated`
    pub fn one_or_more(self, repeated: SequenceQuery<T>) -> Self {
        let once = repeated.clone();
        self.then_query(once).zero_or_more(repeated)
    }

    /// Validate the combinator tree and turn it into an executable matcher.
    ///
    /// Fails with [`Error::UnboundSlot`] when a slot can be read before it
    /// is written, and with [`Error::EmptyRepetition`] when a repeated
    /// sub-query could succeed without consuming a token.
    pub fn compile(self, params: QueryParams<T>) -> Result<SequenceMatcher<T>> {
        self.root.check_bindings(&HashSet::new())?;
        Ok(SequenceMatcher::new(self.root, params))
    }
}
