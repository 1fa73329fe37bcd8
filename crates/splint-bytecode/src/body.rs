//! Method body representation
//!
//! A method body is a flat, indexable sequence of instruction records.
//! Branch operands name their target by instruction index, so mutating an
//! instruction's opcode or operand in place never shifts positions or
//! invalidates targets elsewhere in the body. Passes that rewrite bodies
//! must preserve sequence length for the same reason.

use crate::opcode::Opcode;
use crate::token::{CtorToken, FieldToken};

/// An instruction operand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// No operand
    None,
    /// 32-bit signed integer constant
    I32(i32),
    /// Local variable slot
    Local(u16),
    /// Branch target as an instruction index
    Target(usize),
    /// Host-registered native callback id
    Native(u16),
    /// Constructor reference
    Ctor(CtorToken),
    /// Field reference
    Field(FieldToken),
}

/// A single instruction record: opcode tag plus optional operand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    /// The operation tag
    pub opcode: Opcode,
    /// The operand, if the opcode takes one
    pub operand: Operand,
}

impl Instruction {
    /// Create an instruction with an operand
    pub fn new(opcode: Opcode, operand: Operand) -> Self {
        Self { opcode, operand }
    }

    /// Create an operand-less instruction
    pub fn simple(opcode: Opcode) -> Self {
        Self {
            opcode,
            operand: Operand::None,
        }
    }
}

/// A method body: instruction sequence plus frame information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodBody {
    /// The instruction sequence
    pub code: Vec<Instruction>,
    /// Number of local variable slots
    pub local_count: usize,
}

impl MethodBody {
    /// Create a method body
    pub fn new(code: Vec<Instruction>, local_count: usize) -> Self {
        Self { code, local_count }
    }

    /// Number of instructions in the body
    pub fn len(&self) -> usize {
        self.code.len()
    }

    /// Check if the body has no instructions
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }
}
