//! Mutation candidates as exchanged with the candidate generator

use crate::bytecode::{ClassName, Location};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a mutation applies and which mutator produced it
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MutationIdentifier {
    /// Method containing the mutated instruction
    pub location: Location,
    /// Offset of the mutated instruction within the method body
    pub index: usize,
    /// Name of the mutator that proposed the change
    pub mutator: String,
}

impl MutationIdentifier {
    /// Create an identifier
    pub fn new(location: Location, index: usize, mutator: &str) -> Self {
        Self {
            location,
            index,
            mutator: mutator.to_string(),
        }
    }

    /// Class declaring the mutated method
    pub fn class_name(&self) -> &ClassName {
        &self.location.class
    }
}

impl fmt::Display for MutationIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{} [{}]", self.location, self.index, self.mutator)
    }
}

/// A proposed mutation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MutationDetails {
    /// Identity of the mutation
    pub id: MutationIdentifier,
    /// Source file of the class
    pub filename: String,
    /// Human-readable description of the change
    pub description: String,
    /// Source line, 0 when unknown
    pub line_number: u32,
}

impl MutationDetails {
    /// Create a candidate
    pub fn new(id: MutationIdentifier, filename: &str, description: &str, line_number: u32) -> Self {
        Self {
            id,
            filename: filename.to_string(),
            description: description.to_string(),
            line_number,
        }
    }

    /// Method the mutation applies to
    pub fn location(&self) -> &Location {
        &self.id.location
    }

    /// Offset of the mutated instruction
    pub fn instruction_index(&self) -> usize {
        self.id.index
    }
}
