//! Method bodies shaped like compiler lowered for-each loops

#![allow(dead_code)]

use loopsieve::bytecode::{
    ClassTree, Condition, InsnHandle, Instruction, Location, MethodBuilder, MethodTree, Opcode,
    Operand, TypeRef, ValueKind,
};
use loopsieve::intercept::{MutationDetails, MutationIdentifier};
use std::sync::Arc;

pub const CLASS: &str = "com/example/Loops";
pub const ITERATOR: &str = "java/util/Iterator";

/// A method plus the offsets a test cares about
pub struct LoopFixture {
    pub method: MethodTree,
    /// Offsets of compiler generated plumbing
    pub plumbing: Vec<usize>,
    /// Offsets inside the developer written loop body
    pub body: Vec<usize>,
}

impl LoopFixture {
    pub fn location(&self) -> &Location {
        self.method.location()
    }

    pub fn class(&self) -> Arc<ClassTree> {
        Arc::new(ClassTree::new(CLASS).with_method(self.method.clone()))
    }

    pub fn all_offsets(&self) -> Vec<usize> {
        (0..self.method.instructions().len()).collect()
    }

    pub fn plumbing_handles(&self) -> Vec<InsnHandle> {
        let insns = self.method.instructions();
        self.plumbing.iter().map(|&i| insns[i].handle()).collect()
    }
}

pub fn location(name: &str) -> Location {
    Location::new(CLASS, name, "(Ljava/util/List;)V")
}

pub fn candidates(location: &Location, offsets: &[usize]) -> Vec<MutationDetails> {
    offsets
        .iter()
        .map(|&index| {
            MutationDetails::new(
                MutationIdentifier::new(location.clone(), index, "TEST_MUTATOR"),
                "Loops.java",
                "test mutation",
                0,
            )
        })
        .collect()
}

pub fn offsets(mutations: &[MutationDetails]) -> Vec<usize> {
    mutations.iter().map(|m| m.instruction_index()).collect()
}

/// `for (String s : list) print(s);` with the test after the body
pub fn iterator_test_at_bottom() -> LoopFixture {
    let mut b = MethodBuilder::new(location("iteratorBottom"));
    let start = b.new_label();
    let end = b.new_label();
    let mut body = Vec::new();

    b.line(10);
    b.aload(1);
    let iterator = b.invoke_interface("java/util/List", "iterator", TypeRef::object(ITERATOR));
    b.astore(3);
    b.goto(end);
    b.label(start);
    b.aload(3);
    let next = b.invoke_interface(ITERATOR, "next", TypeRef::object("java/lang/Object"));
    body.push(b.check_cast("java/lang/String"));
    body.push(b.astore(2));
    b.line(11);
    body.push(b.aload(0));
    body.push(b.aload(2));
    body.push(b.invoke_virtual(CLASS, "print", TypeRef::Void));
    b.label(end);
    b.frame();
    b.aload(3);
    let has_next = b.invoke_interface(ITERATOR, "hasNext", TypeRef::Boolean);
    let jump = b.branch(Condition::Ne, start);
    b.return_(None);

    LoopFixture {
        method: b.build(),
        plumbing: vec![iterator, next, has_next, jump],
        body,
    }
}

/// `for (String s : list) print(s);` with the test before the body
pub fn iterator_test_at_top() -> LoopFixture {
    let mut b = MethodBuilder::new(location("iteratorTop"));
    let start = b.new_label();
    let end = b.new_label();
    let mut body = Vec::new();

    b.line(20);
    b.aload(1);
    let iterator = b.invoke_interface("java/util/List", "iterator", TypeRef::object(ITERATOR));
    b.astore(2);
    b.label(start);
    b.frame();
    b.aload(2);
    let has_next = b.invoke_interface(ITERATOR, "hasNext", TypeRef::Boolean);
    let jump = b.branch(Condition::Eq, end);
    b.aload(2);
    let next = b.invoke_interface(ITERATOR, "next", TypeRef::object("java/lang/Object"));
    body.push(b.check_cast("java/lang/String"));
    body.push(b.astore(3));
    b.line(21);
    body.push(b.aload(0));
    body.push(b.aload(3));
    body.push(b.invoke_virtual(CLASS, "print", TypeRef::Void));
    b.goto(start);
    b.label(end);
    b.frame();
    b.return_(None);

    LoopFixture {
        method: b.build(),
        plumbing: vec![iterator, has_next, jump, next],
        body,
    }
}

/// `for (int v : values) total += v;` with the bound check after the body
pub fn array_test_at_bottom() -> LoopFixture {
    let mut b = MethodBuilder::new(location("arrayBottom"));
    let start = b.new_label();
    let end = b.new_label();
    let mut body = Vec::new();

    b.line(30);
    b.aload(1);
    b.astore(4);
    b.aload(4);
    let length = b.array_length();
    b.istore(3);
    let zero = b.const_int(0);
    b.istore(2);
    b.goto(end);
    b.label(start);
    body.push(b.aload(4));
    body.push(b.iload(2));
    body.push(b.array_load(ValueKind::Int));
    body.push(b.istore(5));
    b.line(31);
    body.push(b.iload(6));
    body.push(b.iload(5));
    body.push(b.arith(ValueKind::Int, loopsieve::bytecode::ArithOp::Add));
    body.push(b.istore(6));
    let increment = b.increment(2, 1);
    b.label(end);
    b.frame();
    b.iload(2);
    b.iload(3);
    let jump = b.branch(Condition::IntLt, start);
    b.return_(None);

    LoopFixture {
        method: b.build(),
        plumbing: vec![length, zero, increment, jump],
        body,
    }
}

/// `for (int v : values) total += v;` with the bound check before the body
pub fn array_test_at_top() -> LoopFixture {
    let mut b = MethodBuilder::new(location("arrayTop"));
    let start = b.new_label();
    let end = b.new_label();
    let mut body = Vec::new();

    b.line(40);
    b.aload(1);
    b.astore(4);
    b.aload(4);
    let length = b.array_length();
    b.istore(3);
    let zero = b.const_int(0);
    b.istore(2);
    b.label(start);
    b.frame();
    b.iload(2);
    b.iload(3);
    let jump = b.branch(Condition::IntGe, end);
    body.push(b.aload(4));
    body.push(b.iload(2));
    body.push(b.array_load(ValueKind::Int));
    body.push(b.istore(5));
    b.line(41);
    body.push(b.iload(6));
    body.push(b.iload(5));
    body.push(b.arith(ValueKind::Int, loopsieve::bytecode::ArithOp::Add));
    body.push(b.istore(6));
    let increment = b.increment(2, 1);
    b.goto(start);
    b.label(end);
    b.frame();
    b.return_(None);

    LoopFixture {
        method: b.build(),
        plumbing: vec![length, zero, jump, increment],
        body,
    }
}

/// `for (int[] row : rows) for (int v : row) total += v;`, an array loop
/// with its test at the bottom inside an iterator loop tested at the top
pub fn nested_loops() -> LoopFixture {
    let mut b = MethodBuilder::new(location("nested"));
    let outer_start = b.new_label();
    let outer_end = b.new_label();
    let inner_start = b.new_label();
    let inner_end = b.new_label();
    let mut body = Vec::new();

    b.line(50);
    b.aload(1);
    let iterator = b.invoke_interface("java/util/List", "iterator", TypeRef::object(ITERATOR));
    b.astore(2);
    b.label(outer_start);
    b.frame();
    b.aload(2);
    let has_next = b.invoke_interface(ITERATOR, "hasNext", TypeRef::Boolean);
    let outer_jump = b.branch(Condition::Eq, outer_end);
    b.aload(2);
    let next = b.invoke_interface(ITERATOR, "next", TypeRef::object("java/lang/Object"));
    body.push(b.check_cast("[I"));
    body.push(b.astore(3));
    b.line(51);
    b.aload(3);
    b.astore(4);
    b.aload(4);
    let length = b.array_length();
    b.istore(5);
    let zero = b.const_int(0);
    b.istore(6);
    b.goto(inner_end);
    b.label(inner_start);
    body.push(b.aload(4));
    body.push(b.iload(6));
    body.push(b.array_load(ValueKind::Int));
    body.push(b.istore(7));
    b.line(52);
    body.push(b.iload(8));
    body.push(b.iload(7));
    body.push(b.arith(ValueKind::Int, loopsieve::bytecode::ArithOp::Add));
    body.push(b.istore(8));
    let increment = b.increment(6, 1);
    b.label(inner_end);
    b.frame();
    b.iload(6);
    b.iload(5);
    let inner_jump = b.branch(Condition::IntLt, inner_start);
    b.goto(outer_start);
    b.label(outer_end);
    b.frame();
    b.return_(None);

    LoopFixture {
        method: b.build(),
        plumbing: vec![
            iterator, has_next, outer_jump, next, length, zero, increment, inner_jump,
        ],
        body,
    }
}

/// `count` array loops tested at the top, one after another, all using
/// the same counter variable
pub fn consecutive_array_loops(count: usize) -> LoopFixture {
    let mut b = MethodBuilder::new(location("consecutive"));
    let mut plumbing = Vec::new();
    let mut body = Vec::new();

    for n in 0..count {
        let start = b.new_label();
        let end = b.new_label();

        b.line(60 + n as u32);
        b.aload(1);
        b.astore(4);
        b.aload(4);
        plumbing.push(b.array_length());
        b.istore(3);
        plumbing.push(b.const_int(0));
        b.istore(2);
        b.label(start);
        b.frame();
        b.iload(2);
        b.iload(3);
        plumbing.push(b.branch(Condition::IntGe, end));
        body.push(b.aload(4));
        body.push(b.iload(2));
        body.push(b.array_load(ValueKind::Int));
        body.push(b.invoke_static(CLASS, "use", TypeRef::Void));
        plumbing.push(b.increment(2, 1));
        b.goto(start);
        b.label(end);
        b.frame();
    }
    b.return_(None);

    LoopFixture {
        method: b.build(),
        plumbing,
        body,
    }
}

/// `for (int i = 0; i < 10; i++) tick();`, no iterator or array involved
pub fn counting_loop() -> LoopFixture {
    let mut b = MethodBuilder::new(location("counting"));
    let start = b.new_label();
    let end = b.new_label();
    let mut body = Vec::new();

    b.const_int(0);
    b.istore(1);
    b.label(start);
    b.frame();
    b.iload(1);
    b.const_int(10);
    b.branch(Condition::IntGe, end);
    body.push(b.aload(0));
    body.push(b.invoke_virtual(CLASS, "tick", TypeRef::Void));
    b.increment(1, 1);
    b.goto(start);
    b.label(end);
    b.return_(None);

    LoopFixture {
        method: b.build(),
        plumbing: Vec::new(),
        body,
    }
}

/// `for (int i = 0; i < values.length; i++) use(values[i]);`, written by hand
pub fn explicit_index_loop() -> LoopFixture {
    let mut b = MethodBuilder::new(location("explicitIndex"));
    let start = b.new_label();
    let end = b.new_label();
    let mut body = Vec::new();

    b.const_int(0);
    b.istore(2);
    b.label(start);
    b.frame();
    b.iload(2);
    b.aload(1);
    b.array_length();
    b.branch(Condition::IntGe, end);
    body.push(b.aload(1));
    body.push(b.iload(2));
    body.push(b.array_load(ValueKind::Int));
    body.push(b.invoke_static(CLASS, "use", TypeRef::Void));
    b.increment(2, 1);
    b.goto(start);
    b.label(end);
    b.return_(None);

    LoopFixture {
        method: b.build(),
        plumbing: Vec::new(),
        body,
    }
}

/// Copy of `method` with a line marker or frame inserted before each
/// instruction whose offset is in `before`. Original handles are kept;
/// markers get handles starting at `first_handle`.
pub fn with_markers(method: &MethodTree, before: &[bool], first_handle: u64) -> MethodTree {
    let mut out = Vec::new();
    let mut handle = first_handle;
    for (offset, insn) in method.instructions().iter().enumerate() {
        if before.get(offset).copied().unwrap_or(false) {
            let marker = if offset % 2 == 0 {
                Instruction::new(InsnHandle(handle), Opcode::LineNumber, Operand::Line(offset as u32))
            } else {
                Instruction::new(InsnHandle(handle), Opcode::Frame, Operand::None)
            };
            out.push(marker);
            handle += 1;
        }
        out.push(insn.clone());
    }
    MethodTree::new(method.location().clone(), out)
}
