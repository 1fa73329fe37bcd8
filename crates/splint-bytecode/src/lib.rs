//! Splint Bytecode Definitions
//!
//! This crate provides the instruction set and method body model shared by
//! the splint patching toolkit and the host runtime model. Method bodies are
//! kept as structured instruction records with index-based branch targets,
//! so a pass that mutates an instruction in place never invalidates targets
//! elsewhere in the body.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod body;
pub mod opcode;
pub mod token;
pub mod verify;

pub use body::{Instruction, MethodBody, Operand};
pub use opcode::{Opcode, OperandKind};
pub use token::{CtorToken, FieldToken, MethodToken, TypeToken};
pub use verify::{verify_body, VerifyError};
