//! # Bytecode Model
//!
//! A minimal view of compiled method bodies: ordered instruction lists with
//! label markers, jumps that reference labels by identity, and pseudo
//! instructions for line numbers and stack map frames.
//!
//! Instructions are produced by an external analysis step or assembled with
//! [`MethodBuilder`]. [`matchers`] provides the predicates used to write
//! sequence grammars over them.

mod builder;
mod instruction;
pub mod matchers;
mod tree;

pub use builder::MethodBuilder;
pub use instruction::{
    ArithOp, Condition, InsnHandle, Instruction, InvokeKind, LabelId, MethodRef, Opcode, Operand,
    TypeRef, ValueKind,
};
pub use tree::{ClassName, ClassTree, Location, MethodTree};
