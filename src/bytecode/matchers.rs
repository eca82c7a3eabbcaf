//! Instruction predicates for building sequence queries over method bodies

use super::instruction::{Instruction, LabelId, Opcode, TypeRef, ValueKind};
use super::tree::ClassName;
use crate::sequence::{Match, Slot, SlotRead, SlotWrite};
use std::sync::Arc;

/// Any single node, markers included
pub fn any_instruction() -> Match<Instruction> {
    Match::always()
}

/// Nodes with exactly this opcode
pub fn opcode(op: Opcode) -> Match<Instruction> {
    Match::when(move |insn: &Instruction| insn.opcode() == op)
}

/// Real instructions (not labels, line numbers or frames)
pub fn is_instruction() -> Match<Instruction> {
    Match::when(|insn: &Instruction| insn.opcode().is_instruction())
}

/// Line number and frame markers.
///
/// These carry no behaviour and, unlike labels, are never jump targets, so
/// they are the usual ignore set for [`QueryParams`](crate::sequence::QueryParams).
pub fn not_an_instruction() -> Match<Instruction> {
    Match::when(|insn: &Instruction| {
        matches!(insn.opcode(), Opcode::LineNumber | Opcode::Frame)
    })
}

/// A label marker; its identity is captured
pub fn a_label_node(slot: SlotWrite<LabelId>) -> Match<Instruction> {
    opcode(Opcode::Label).and(Match::capture(slot, |insn: &Instruction| insn.label()))
}

/// The label marker whose identity was captured earlier
pub fn label_node(slot: SlotRead<LabelId>) -> Match<Instruction> {
    Match::equals_bound(slot, |insn: &Instruction| insn.label())
}

/// Any conditional jump
pub fn a_conditional_jump() -> Match<Instruction> {
    Match::when(|insn: &Instruction| insn.opcode().is_conditional_jump())
}

/// A jump whose target equals the captured label
pub fn jumps_to(slot: SlotRead<LabelId>) -> Match<Instruction> {
    Match::equals_bound(slot, |insn: &Instruction| insn.jump_target())
}

/// A jump; its target is captured
pub fn jumps_to_capture(slot: SlotWrite<LabelId>) -> Match<Instruction> {
    Match::capture(slot, |insn: &Instruction| insn.jump_target())
}

/// A conditional jump to the label captured in `slot`
pub fn a_conditional_jump_to(slot: &Slot<LabelId>) -> Match<Instruction> {
    a_conditional_jump().and(jumps_to(slot.read()))
}

/// An unconditional jump; its target is captured
pub fn goto_label(slot: SlotWrite<LabelId>) -> Match<Instruction> {
    opcode(Opcode::Goto).and(jumps_to_capture(slot))
}

/// A store of the given kind; the local variable slot is captured
pub fn a_store_of(kind: ValueKind, slot: SlotWrite<u16>) -> Match<Instruction> {
    opcode(Opcode::Store(kind)).and(Match::capture(slot, |insn: &Instruction| insn.var()))
}

/// An int store; the local variable slot is captured
pub fn an_int_store(slot: SlotWrite<u16>) -> Match<Instruction> {
    a_store_of(ValueKind::Int, slot)
}

/// In-place increment of the local captured earlier
pub fn increments_variable(slot: SlotRead<u16>) -> Match<Instruction> {
    opcode(Opcode::Increment).and(Match::equals_bound(slot, |insn: &Instruction| insn.var()))
}

/// Integer constant with exactly this value
pub fn int_constant(value: i64) -> Match<Instruction> {
    Match::when(move |insn: &Instruction| {
        insn.opcode() == Opcode::ConstInt && insn.int_value() == Some(value)
    })
}

/// Call to `owner.name`, any dispatch kind
pub fn method_call_to(owner: &str, name: &str) -> Match<Instruction> {
    let owner = ClassName::new(owner);
    let name: Arc<str> = Arc::from(name);
    Match::when(move |insn: &Instruction| {
        insn.method()
            .is_some_and(|m| m.owner == owner && m.name == name)
    })
}

/// Call to any method with this name
pub fn method_call_named(name: &str) -> Match<Instruction> {
    let name: Arc<str> = Arc::from(name);
    Match::when(move |insn: &Instruction| insn.method().is_some_and(|m| m.name == name))
}

/// Call to any method declared to return `returns`
pub fn method_call_that_returns(returns: TypeRef) -> Match<Instruction> {
    Match::when(move |insn: &Instruction| insn.method().is_some_and(|m| m.returns == returns))
}
