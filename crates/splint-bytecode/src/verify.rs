//! Method body verification
//!
//! Structural checks over an instruction sequence: operand kinds agree with
//! opcodes, branch targets are in range, local slots fit the frame, and the
//! body cannot fall off its end. Rewriting passes use this to assert that a
//! transformed body is still well formed.

use crate::body::{MethodBody, Operand};
use crate::opcode::OperandKind;

/// Method body verification errors
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    /// Operand does not match what the opcode expects
    #[error("Operand mismatch for {opcode} at index {index}")]
    OperandMismatch {
        /// Name of the offending opcode
        opcode: &'static str,
        /// Instruction index
        index: usize,
    },

    /// Branch target outside the instruction sequence
    #[error("Invalid jump target {target} at index {index} (body length {len})")]
    InvalidJumpTarget {
        /// The out-of-range target
        target: usize,
        /// Instruction index of the jump
        index: usize,
        /// Body length
        len: usize,
    },

    /// Local slot outside the declared frame
    #[error("Local slot {slot} out of range at index {index} (local count {max})")]
    LocalOutOfRange {
        /// The out-of-range slot
        slot: u16,
        /// Instruction index
        index: usize,
        /// Declared local count
        max: usize,
    },

    /// Execution can fall off the end of the body
    #[error("Body does not end with a terminator (last opcode {0})")]
    MissingTerminator(&'static str),
}

/// Verify a method body's structure
///
/// Empty bodies are allowed.
pub fn verify_body(body: &MethodBody) -> Result<(), VerifyError> {
    let len = body.code.len();

    for (index, instr) in body.code.iter().enumerate() {
        let kind = match instr.operand {
            Operand::None => OperandKind::None,
            Operand::I32(_) => OperandKind::I32,
            Operand::Local(_) => OperandKind::Local,
            Operand::Target(_) => OperandKind::Target,
            Operand::Native(_) => OperandKind::Native,
            Operand::Ctor(_) => OperandKind::Ctor,
            Operand::Field(_) => OperandKind::Field,
        };
        if kind != instr.opcode.operand_kind() {
            return Err(VerifyError::OperandMismatch {
                opcode: instr.opcode.name(),
                index,
            });
        }

        match instr.operand {
            Operand::Target(target) if target >= len => {
                return Err(VerifyError::InvalidJumpTarget { target, index, len });
            }
            Operand::Local(slot) if usize::from(slot) >= body.local_count => {
                return Err(VerifyError::LocalOutOfRange {
                    slot,
                    index,
                    max: body.local_count,
                });
            }
            _ => {}
        }
    }

    if let Some(last) = body.code.last() {
        if !last.opcode.is_terminator() {
            return Err(VerifyError::MissingTerminator(last.opcode.name()));
        }
    }

    Ok(())
}
