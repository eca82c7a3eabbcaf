//! Matcher configuration

use super::matcher::Match;
use std::fmt;

/// Options applied when a [`SequenceQuery`](super::SequenceQuery) is compiled
pub struct QueryParams<T> {
    ignores: Match<T>,
    scan_all_offsets: bool,
    debug: bool,
}

impl<T: Clone + 'static> QueryParams<T> {
    /// No ignored tokens, scanning every offset, tracing off
    pub fn new() -> Self {
        Self {
            ignores: Match::never(),
            scan_all_offsets: true,
            debug: false,
        }
    }

    /// Tokens satisfying `ignores` are skipped transparently between
    /// matched tokens and can never be matched themselves
    pub fn with_ignores(mut self, ignores: Match<T>) -> Self {
        self.ignores = ignores;
        self
    }

    /// Emit a trace event for every token tested
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// When set (the default) the pattern may start at any offset and
    /// anything may follow it. When cleared the pattern must start at the
    /// first token and consume the whole stream.
    pub fn scan_all_offsets(mut self, scan: bool) -> Self {
        self.scan_all_offsets = scan;
        self
    }

    /// Predicate selecting ignorable tokens
    pub fn ignores(&self) -> &Match<T> {
        &self.ignores
    }

    /// Whether per-token tracing is on
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Whether every start offset is tried
    pub fn scans_all_offsets(&self) -> bool {
        self.scan_all_offsets
    }
}

impl<T: Clone + 'static> Default for QueryParams<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for QueryParams<T> {
    fn clone(&self) -> Self {
        Self {
            ignores: self.ignores.clone(),
            scan_all_offsets: self.scan_all_offsets,
            debug: self.debug,
        }
    }
}

impl<T> fmt::Debug for QueryParams<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryParams")
            .field("scan_all_offsets", &self.scan_all_offsets)
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}
