//! # Loopsieve - For-Each Loop Mutation Filter
//!
//! Backtracking sequence matching over bytecode instruction streams, and a
//! mutation testing interceptor built on it that removes candidates planted
//! on compiler generated for-each loop plumbing.
//!
//! ## Features
//!
//! - **Typed capture slots** - write-once per branch, with read-back equality
//! - **Full backtracking** - every repetition count and every alternative is explored
//! - **Static validation** - reading a slot before it is written is a compile error
//! - **Ignorable tokens** - line numbers and frames are skipped transparently
//! - **Interceptor pipeline** - feature toggles and type-ordered stages
//!
//! ## Quick Start
//!
//! ```rust
//! use loopsieve::bytecode::{ClassTree, Condition, Location, MethodBuilder, TypeRef};
//! use loopsieve::intercept::{
//!     ForEachLoopFilter, MutationDetails, MutationIdentifier, MutationInterceptor,
//! };
//! use std::sync::Arc;
//!
//! # fn main() -> loopsieve::Result<()> {
//! let location = Location::new("com/example/Names", "print", "(Ljava/util/List;)V");
//! let mut b = MethodBuilder::new(location.clone());
//! let (start, end) = (b.new_label(), b.new_label());
//! b.aload(1);
//! let iterator = b.invoke_interface("java/util/List", "iterator", TypeRef::object("java/util/Iterator"));
//! b.astore(2);
//! b.label(start);
//! b.aload(2);
//! b.invoke_interface("java/util/Iterator", "hasNext", TypeRef::Boolean);
//! b.branch(Condition::Eq, end);
//! b.aload(2);
//! b.invoke_interface("java/util/Iterator", "next", TypeRef::object("java/lang/Object"));
//! let body = b.invoke_static("com/example/Names", "print", TypeRef::Void);
//! b.goto(start);
//! b.label(end);
//! b.return_(None);
//!
//! let class = ClassTree::new("com/example/Names").with_method(b.build());
//! let candidates: Vec<MutationDetails> = [iterator, body]
//!     .into_iter()
//!     .map(|index| {
//!         MutationDetails::new(
//!             MutationIdentifier::new(location.clone(), index, "VOID_METHOD_CALLS"),
//!             "Names.java",
//!             "removed call",
//!             3,
//!         )
//!     })
//!     .collect();
//!
//! let mut filter = ForEachLoopFilter::new()?;
//! filter.begin(Arc::new(class));
//! let kept = filter.intercept(candidates)?;
//! filter.end();
//!
//! assert_eq!(kept.len(), 1);
//! assert_eq!(kept[0].instruction_index(), body);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! MethodTree → SequenceMatcher (4 grammars) → plumbing handles → filtered candidates
//! ```
//!
//! ### Main Components
//!
//! - [`sequence`] - Generic pattern matching engine over token streams
//! - [`bytecode`] - Instruction model, method builder and instruction predicates
//! - [`intercept`] - Interceptor pipeline, feature toggles and the for-each filter
//! - [`error`] - Crate-wide error type
//!
//! ## License
//!
//! Licensed under the [MIT License](https://opensource.org/licenses/MIT).

/// Version of the loopsieve crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod bytecode;
pub mod error;
pub mod intercept;
pub mod sequence;

// Re-export main types
pub use error::{Error, ErrorSeverity, Result};
pub use intercept::{ForEachLoopFilter, MutationDetails, MutationInterceptor};
