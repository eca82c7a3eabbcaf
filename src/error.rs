//! Error types for loopsieve

use thiserror::Error;

/// Sequence matching and mutation filtering errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // Grammar construction errors
    /// A query reads a capture slot that no earlier token is guaranteed to write
    ///
    /// **Triggered by:** `SequenceQuery::compile` on a grammar whose read-back
    /// (e.g. `label_node(loop_end.read())`) is reachable on a path that skips
    /// the matching `write()`
    /// **Prevention:** Capture the slot in an earlier, non-optional step
    #[error("Slot '{slot}' is read before it is written")]
    UnboundSlot {
        /// Slot name
        slot: String,
    },

    /// Repetition over a sub-query that can succeed without consuming a token
    ///
    /// **Triggered by:** `zero_or_more` / `one_or_more` wrapping another
    /// `zero_or_more`, or wrapping an alternation with an empty branch
    #[error("Repeated sub-query can match without consuming input")]
    EmptyRepetition,

    // Caller contract violations
    /// Mutation candidate names a method the class under analysis lacks
    #[error("Unknown method {method} in class {class}")]
    UnknownMethod {
        /// Class under analysis
        class: String,
        /// Method name and descriptor
        method: String,
    },

    /// Mutation candidate points past the end of its method
    #[error("Instruction {index} out of range for method {method} ({length} instructions)")]
    InstructionOutOfRange {
        /// Method name and descriptor
        method: String,
        /// Requested instruction offset
        index: usize,
        /// Number of instructions in the method
        length: usize,
    },

    /// `intercept` was called outside a `begin`/`end` pair
    #[error("No class is being processed; call begin() first")]
    NoClassInProgress,

    // Configuration errors
    /// Feature setting could not be parsed or names no known feature
    #[error("Invalid feature setting: {0}")]
    InvalidFeature(String),
}

/// Error severity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Fatal error that cannot be recovered from
    Fatal,
    /// Recoverable error that the caller may choose to ignore
    Recoverable,
}

impl Error {
    /// Create an invalid feature error with a message
    pub fn invalid_feature(msg: impl Into<String>) -> Self {
        Error::InvalidFeature(msg.into())
    }

    /// Classify error severity
    pub fn classify(&self) -> ErrorSeverity {
        match self {
            Error::InvalidFeature(_) => ErrorSeverity::Recoverable,
            _ => ErrorSeverity::Fatal,
        }
    }
}

/// Result type for loopsieve operations
pub type Result<T> = std::result::Result<T, Error>;
