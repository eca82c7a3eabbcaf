//! Method body assembly

use super::instruction::{
    ArithOp, Condition, InsnHandle, Instruction, InvokeKind, LabelId, MethodRef, Opcode, Operand,
    TypeRef, ValueKind,
};
use super::tree::{ClassName, Location, MethodTree};
use std::sync::atomic::{AtomicU64, Ordering};

fn next_handle() -> InsnHandle {
    static COUNTER: AtomicU64 = AtomicU64::new(1);
    InsnHandle(COUNTER.fetch_add(1, Ordering::Relaxed))
}

/// Builds a method body instruction by instruction.
///
/// Every emitted instruction gets a process-unique [`InsnHandle`]. Labels
/// are allocated with [`MethodBuilder::new_label`] and placed later with
/// [`MethodBuilder::label`], so forward jumps need no patching. Each emit
/// method returns the offset of the instruction it added.
pub struct MethodBuilder {
    location: Location,
    instructions: Vec<Instruction>,
    label_counter: u32,
}

impl MethodBuilder {
    /// Start a method body
    pub fn new(location: Location) -> Self {
        Self {
            location,
            instructions: Vec::new(),
            label_counter: 0,
        }
    }

    /// Offset the next instruction will be emitted at
    pub fn current_offset(&self) -> usize {
        self.instructions.len()
    }

    /// Finish the method
    pub fn build(self) -> MethodTree {
        MethodTree::new(self.location, self.instructions)
    }

    /// Allocate a label without placing it
    pub fn new_label(&mut self) -> LabelId {
        let label = LabelId(self.label_counter);
        self.label_counter += 1;
        label
    }

    /// Append an arbitrary instruction
    pub fn emit(&mut self, opcode: Opcode, operand: Operand) -> usize {
        let offset = self.instructions.len();
        self.instructions
            .push(Instruction::new(next_handle(), opcode, operand));
        offset
    }

    /// Place a label marker
    pub fn label(&mut self, label: LabelId) -> usize {
        self.emit(Opcode::Label, Operand::Label(label))
    }

    /// Source line marker
    pub fn line(&mut self, line: u32) -> usize {
        self.emit(Opcode::LineNumber, Operand::Line(line))
    }

    /// Stack map frame marker
    pub fn frame(&mut self) -> usize {
        self.emit(Opcode::Frame, Operand::None)
    }

    /// `nop`
    pub fn nop(&mut self) -> usize {
        self.emit(Opcode::Nop, Operand::None)
    }

    /// Push null
    pub fn const_null(&mut self) -> usize {
        self.emit(Opcode::ConstNull, Operand::None)
    }

    /// Push an integer constant
    pub fn const_int(&mut self, value: i64) -> usize {
        self.emit(Opcode::ConstInt, Operand::Int(value))
    }

    /// Load a local
    pub fn load(&mut self, kind: ValueKind, var: u16) -> usize {
        self.emit(Opcode::Load(kind), Operand::Var(var))
    }

    /// Store a local
    pub fn store(&mut self, kind: ValueKind, var: u16) -> usize {
        self.emit(Opcode::Store(kind), Operand::Var(var))
    }

    /// Load a reference local
    pub fn aload(&mut self, var: u16) -> usize {
        self.load(ValueKind::Reference, var)
    }

    /// Store a reference local
    pub fn astore(&mut self, var: u16) -> usize {
        self.store(ValueKind::Reference, var)
    }

    /// Load an int local
    pub fn iload(&mut self, var: u16) -> usize {
        self.load(ValueKind::Int, var)
    }

    /// Store an int local
    pub fn istore(&mut self, var: u16) -> usize {
        self.store(ValueKind::Int, var)
    }

    /// Add `amount` to an int local in place
    pub fn increment(&mut self, var: u16, amount: i32) -> usize {
        self.emit(Opcode::Increment, Operand::Increment { var, amount })
    }

    /// Arithmetic on the operand stack
    pub fn arith(&mut self, kind: ValueKind, op: ArithOp) -> usize {
        self.emit(Opcode::Arithmetic(kind, op), Operand::None)
    }

    /// Read an array element
    pub fn array_load(&mut self, kind: ValueKind) -> usize {
        self.emit(Opcode::ArrayLoad(kind), Operand::None)
    }

    /// Write an array element
    pub fn array_store(&mut self, kind: ValueKind) -> usize {
        self.emit(Opcode::ArrayStore(kind), Operand::None)
    }

    /// Read an array's length
    pub fn array_length(&mut self) -> usize {
        self.emit(Opcode::ArrayLength, Operand::None)
    }

    /// Conditional jump to `target`
    pub fn branch(&mut self, condition: Condition, target: LabelId) -> usize {
        self.emit(Opcode::Branch(condition), Operand::Label(target))
    }

    /// Unconditional jump to `target`
    pub fn goto(&mut self, target: LabelId) -> usize {
        self.emit(Opcode::Goto, Operand::Label(target))
    }

    /// Return from the method
    pub fn return_(&mut self, kind: Option<ValueKind>) -> usize {
        self.emit(Opcode::Return(kind), Operand::None)
    }

    /// Throw the exception on top of the stack
    pub fn throw(&mut self) -> usize {
        self.emit(Opcode::Throw, Operand::None)
    }

    /// Invoke a method
    pub fn invoke(&mut self, kind: InvokeKind, method: MethodRef) -> usize {
        self.emit(Opcode::Invoke(kind), Operand::Method(method))
    }

    /// Invoke an interface method
    pub fn invoke_interface(&mut self, owner: &str, name: &str, returns: TypeRef) -> usize {
        self.invoke(InvokeKind::Interface, MethodRef::new(owner, name, returns))
    }

    /// Invoke a virtual method
    pub fn invoke_virtual(&mut self, owner: &str, name: &str, returns: TypeRef) -> usize {
        self.invoke(InvokeKind::Virtual, MethodRef::new(owner, name, returns))
    }

    /// Invoke a static method
    pub fn invoke_static(&mut self, owner: &str, name: &str, returns: TypeRef) -> usize {
        self.invoke(InvokeKind::Static, MethodRef::new(owner, name, returns))
    }

    /// Cast the top of stack
    pub fn check_cast(&mut self, class: &str) -> usize {
        self.emit(Opcode::CheckCast, Operand::Type(ClassName::new(class)))
    }

    /// Discard the top of stack
    pub fn pop(&mut self) -> usize {
        self.emit(Opcode::Pop, Operand::None)
    }

    /// Duplicate the top of stack
    pub fn dup(&mut self) -> usize {
        self.emit(Opcode::Dup, Operand::None)
    }
}
