//! Instruction definitions

use super::tree::ClassName;
use std::fmt;
use std::sync::Arc;

/// Stable identity of one emitted instruction.
///
/// Two instructions with the same opcode and operands still have different
/// handles, so sets of handles distinguish them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InsnHandle(pub u64);

/// Identity of a jump target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelId(pub u32);

impl fmt::Display for LabelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// Value category of a local, constant or array element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// 32-bit integer (also booleans, bytes, chars, shorts)
    Int,
    /// 64-bit integer
    Long,
    /// 32-bit float
    Float,
    /// 64-bit float
    Double,
    /// Object or array reference
    Reference,
}

/// Arithmetic operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithOp {
    /// Addition
    Add,
    /// Subtraction
    Sub,
    /// Multiplication
    Mul,
    /// Division
    Div,
    /// Remainder
    Rem,
    /// Negation
    Neg,
}

/// Branch condition of a conditional jump
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    /// value == 0
    Eq,
    /// value != 0
    Ne,
    /// value < 0
    Lt,
    /// value >= 0
    Ge,
    /// value > 0
    Gt,
    /// value <= 0
    Le,
    /// lhs == rhs (ints)
    IntEq,
    /// lhs != rhs (ints)
    IntNe,
    /// lhs < rhs (ints)
    IntLt,
    /// lhs >= rhs (ints)
    IntGe,
    /// lhs > rhs (ints)
    IntGt,
    /// lhs <= rhs (ints)
    IntLe,
    /// reference is null
    Null,
    /// reference is not null
    NonNull,
}

/// Method dispatch kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvokeKind {
    /// Virtual dispatch on a class
    Virtual,
    /// Dispatch through an interface
    Interface,
    /// Static call
    Static,
    /// Constructors, private and super calls
    Special,
}

/// Instruction category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// No operation
    Nop,
    /// Push null
    ConstNull,
    /// Push an integer constant
    ConstInt,
    /// Load a local variable
    Load(ValueKind),
    /// Store into a local variable
    Store(ValueKind),
    /// Add a constant to an int local in place
    Increment,
    /// Arithmetic on the operand stack
    Arithmetic(ValueKind, ArithOp),
    /// Read an array element
    ArrayLoad(ValueKind),
    /// Write an array element
    ArrayStore(ValueKind),
    /// Read the length of an array
    ArrayLength,
    /// Conditional jump
    Branch(Condition),
    /// Unconditional jump
    Goto,
    /// Method invocation
    Invoke(InvokeKind),
    /// Type check cast
    CheckCast,
    /// Discard top of stack
    Pop,
    /// Duplicate top of stack
    Dup,
    /// Return, optionally with a value
    Return(Option<ValueKind>),
    /// Throw the exception on top of the stack
    Throw,
    /// Jump target marker (pseudo-instruction)
    Label,
    /// Source line marker (pseudo-instruction)
    LineNumber,
    /// Stack map frame (pseudo-instruction)
    Frame,
}

impl Opcode {
    /// Whether this is a real instruction rather than a marker
    pub fn is_instruction(&self) -> bool {
        !matches!(self, Opcode::Label | Opcode::LineNumber | Opcode::Frame)
    }

    /// Whether this is a conditional jump
    pub fn is_conditional_jump(&self) -> bool {
        matches!(self, Opcode::Branch(_))
    }

    /// Whether this transfers control to a label
    pub fn is_jump(&self) -> bool {
        matches!(self, Opcode::Branch(_) | Opcode::Goto)
    }
}

/// Declared result of a method
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// No value
    Void,
    /// Boolean
    Boolean,
    /// 32-bit integer
    Int,
    /// 64-bit integer
    Long,
    /// 32-bit float
    Float,
    /// 64-bit float
    Double,
    /// Instance of a class
    Object(ClassName),
    /// Array of an element type
    Array(Box<TypeRef>),
}

impl TypeRef {
    /// Object type from a class name
    pub fn object(name: &str) -> Self {
        TypeRef::Object(ClassName::new(name))
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Void => write!(f, "V"),
            TypeRef::Boolean => write!(f, "Z"),
            TypeRef::Int => write!(f, "I"),
            TypeRef::Long => write!(f, "J"),
            TypeRef::Float => write!(f, "F"),
            TypeRef::Double => write!(f, "D"),
            TypeRef::Object(name) => write!(f, "L{};", name),
            TypeRef::Array(element) => write!(f, "[{}", element),
        }
    }
}

/// Target of a method invocation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodRef {
    /// Declaring type
    pub owner: ClassName,
    /// Member name
    pub name: Arc<str>,
    /// Declared return type
    pub returns: TypeRef,
}

impl MethodRef {
    /// Create a method reference
    pub fn new(owner: &str, name: &str, returns: TypeRef) -> Self {
        Self {
            owner: ClassName::new(owner),
            name: Arc::from(name),
            returns,
        }
    }
}

/// Instruction operand
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operand {
    /// No operand
    None,
    /// Integer constant
    Int(i64),
    /// Local variable slot
    Var(u16),
    /// In-place increment of a local
    Increment {
        /// Local variable slot
        var: u16,
        /// Amount added
        amount: i32,
    },
    /// Jump target (jumps) or identity (label markers)
    Label(LabelId),
    /// Invocation target
    Method(MethodRef),
    /// Type operand (casts)
    Type(ClassName),
    /// Source line number
    Line(u32),
}

/// One node of a method body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    handle: InsnHandle,
    opcode: Opcode,
    operand: Operand,
}

impl Instruction {
    /// Create an instruction with an explicit handle
    pub fn new(handle: InsnHandle, opcode: Opcode, operand: Operand) -> Self {
        Self {
            handle,
            opcode,
            operand,
        }
    }

    /// Stable identity
    pub fn handle(&self) -> InsnHandle {
        self.handle
    }

    /// Instruction category
    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    /// Raw operand
    pub fn operand(&self) -> &Operand {
        &self.operand
    }

    /// Local variable slot used by loads, stores and increments
    pub fn var(&self) -> Option<u16> {
        match self.operand {
            Operand::Var(var) | Operand::Increment { var, .. } => Some(var),
            _ => None,
        }
    }

    /// Integer operand of constants and increments
    pub fn int_value(&self) -> Option<i64> {
        match self.operand {
            Operand::Int(value) => Some(value),
            Operand::Increment { amount, .. } => Some(amount as i64),
            _ => None,
        }
    }

    /// Label a jump goes to
    pub fn jump_target(&self) -> Option<LabelId> {
        match (self.opcode.is_jump(), &self.operand) {
            (true, Operand::Label(label)) => Some(*label),
            _ => None,
        }
    }

    /// Identity of a label marker
    pub fn label(&self) -> Option<LabelId> {
        match (self.opcode, &self.operand) {
            (Opcode::Label, Operand::Label(label)) => Some(*label),
            _ => None,
        }
    }

    /// Invocation target of a method call
    pub fn method(&self) -> Option<&MethodRef> {
        match (self.opcode, &self.operand) {
            (Opcode::Invoke(_), Operand::Method(method)) => Some(method),
            _ => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.operand {
            Operand::None => write!(f, "{:?}", self.opcode),
            Operand::Int(value) => write!(f, "{:?} {}", self.opcode, value),
            Operand::Var(var) => write!(f, "{:?} ${}", self.opcode, var),
            Operand::Increment { var, amount } => write!(f, "{:?} ${} {}", self.opcode, var, amount),
            Operand::Label(label) => write!(f, "{:?} {}", self.opcode, label),
            Operand::Method(method) => write!(
                f,
                "{:?} {}.{}()->{}",
                self.opcode, method.owner, method.name, method.returns
            ),
            Operand::Type(name) => write!(f, "{:?} {}", self.opcode, name),
            Operand::Line(line) => write!(f, "{:?} {}", self.opcode, line),
        }
    }
}
