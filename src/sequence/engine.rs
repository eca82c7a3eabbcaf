//! Executable sequence matcher
//!
//! Every combinator is evaluated as a function from one [`Context`] to the
//! list of contexts it can end in. Alternation evaluates both branches from
//! their own copy of the incoming context, and repetition explores every
//! repeat count, so a later token that needs a shorter or longer run still
//! lines up. Repetition requires each round to consume at least one token,
//! which `compile` guarantees, so evaluation always terminates.

use super::context::Context;
use super::params::QueryParams;
use super::query::Node;
use std::fmt;
use std::sync::Arc;

/// Compiled, immutable pattern. Cheap to clone and safe to share.
pub struct SequenceMatcher<T> {
    root: Arc<Node<T>>,
    params: QueryParams<T>,
}

impl<T> Clone for SequenceMatcher<T> {
    fn clone(&self) -> Self {
        Self {
            root: Arc::clone(&self.root),
            params: self.params.clone(),
        }
    }
}

impl<T> fmt::Debug for SequenceMatcher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceMatcher")
            .field("root", &self.root)
            .field("params", &self.params)
            .finish()
    }
}

impl<T: Clone + fmt::Debug + 'static> SequenceMatcher<T> {
    pub(crate) fn new(root: Node<T>, params: QueryParams<T>) -> Self {
        Self {
            root: Arc::new(root),
            params,
        }
    }

    /// Whether the pattern matches the stream at all
    pub fn matches(&self, stream: &[T]) -> bool {
        !self.context_matches(stream, Context::start()).is_empty()
    }

    /// Every terminal context reachable from `context`.
    ///
    /// When scanning all offsets, the pattern is tried from each
    /// non-ignorable position and the results are concatenated; the
    /// trailing suffix is consumed, so every returned context sits at the end
    /// of the stream. Nothing is deduplicated: two distinct ways of matching
    /// produce two contexts.
    pub fn context_matches(&self, stream: &[T], context: Context<T>) -> Vec<Context<T>> {
        let context = if self.params.debug() {
            context.with_debug(true)
        } else {
            context
        };

        if !self.params.scans_all_offsets() {
            let start = self.skip_ignored(stream, 0);
            return self
                .evaluate(&self.root, stream, context.at(start))
                .into_iter()
                .filter(|ctx| self.skip_ignored(stream, ctx.position()) == stream.len())
                .collect();
        }

        let mut results = Vec::new();
        for offset in 0..=stream.len() {
            if stream.get(offset).is_some_and(|token| self.is_ignored(token)) {
                continue;
            }
            let found = self.evaluate(&self.root, stream, context.clone().at(offset));
            results.extend(found.into_iter().map(|ctx| ctx.at(stream.len())));
        }
        results
    }

    fn is_ignored(&self, token: &T) -> bool {
        self.params
            .ignores()
            .test(Context::start(), token)
            .is_some()
    }

    fn skip_ignored(&self, stream: &[T], mut position: usize) -> usize {
        while stream
            .get(position)
            .is_some_and(|token| self.is_ignored(token))
        {
            position += 1;
        }
        position
    }

    fn evaluate(&self, node: &Node<T>, stream: &[T], ctx: Context<T>) -> Vec<Context<T>> {
        match node {
            Node::Token(m) => {
                let position = self.skip_ignored(stream, ctx.position());
                let Some(token) = stream.get(position) else {
                    return Vec::new();
                };
                let debug = ctx.debug();
                let matched = m.test(ctx.at(position), token);
                if debug {
                    tracing::trace!(
                        position,
                        token = ?token,
                        matched = matched.is_some(),
                        "sequence token"
                    );
                }
                matched
                    .map(|ctx| ctx.at(position + 1))
                    .into_iter()
                    .collect()
            }
            Node::Then(first, second) => self
                .evaluate(first, stream, ctx)
                .into_iter()
                .flat_map(|ctx| self.evaluate(second, stream, ctx))
                .collect(),
            Node::Or(left, right) => {
                let mut results = self.evaluate(left, stream, ctx.clone());
                results.extend(self.evaluate(right, stream, ctx));
                results
            }
            Node::ZeroOrMore(repeated) => {
                let mut results = Vec::new();
                let mut pending = vec![ctx];
                while let Some(ctx) = pending.pop() {
                    let from = ctx.position();
                    pending.extend(
                        self.evaluate(repeated, stream, ctx.clone())
                            .into_iter()
                            .filter(|next| next.position() > from),
                    );
                    results.push(ctx);
                }
                results
            }
        }
    }
}
