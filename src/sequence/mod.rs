//! # Sequence Matching
//!
//! Backtracking pattern matching over linear token streams.
//!
//! Patterns are built from single-token predicates ([`Match`]) combined into
//! a [`SequenceQuery`] with `then`, `or`, `zero_or_more` and `one_or_more`.
//! Named [`Slot`]s capture values from one token and compare them against
//! later tokens, which is how a grammar says "this jump goes to the label
//! seen earlier". Compiling a query validates it and yields a
//! [`SequenceMatcher`].
//!
//! ## Usage
//!
//! ```
//! use loopsieve::sequence::{Context, Match, QueryParams, QueryStart, Slot};
//!
//! // a digit, anything, then the same digit again
//! let digit: Slot<char> = Slot::new("digit");
//! let query = QueryStart::matching(
//!     Match::when(|c: &char| c.is_ascii_digit())
//!         .and(Match::capture(digit.write(), |c: &char| Some(*c)))
//!         .and(Match::record()),
//! )
//! .zero_or_more(QueryStart::any())
//! .then(Match::equals_bound(digit.read(), |c: &char| Some(*c)).and(Match::record()));
//!
//! let matcher = query.compile(QueryParams::new()).unwrap();
//! let stream: Vec<char> = "x7ab7y".chars().collect();
//! let found = matcher.context_matches(&stream, Context::start());
//!
//! assert_eq!(found.len(), 1);
//! assert_eq!(found[0].recorded(), &['7', '7']);
//! ```

mod context;
mod engine;
mod matcher;
mod params;
mod query;
mod slot;

pub use context::Context;
pub use engine::SequenceMatcher;
pub use matcher::Match;
pub use params::QueryParams;
pub use query::{QueryStart, SequenceQuery};
pub use slot::{Slot, SlotRead, SlotRef, SlotValue, SlotWrite};
