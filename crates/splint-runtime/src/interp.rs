//! Method body interpreter
//!
//! A straightforward stack machine over structured instruction records.
//! Jumps assign the instruction pointer directly (targets are instruction
//! indices), every other instruction falls through. A method body is
//! executed from its first instruction every time; coroutine state machines
//! encode their own resume dispatch in the body itself.

use splint_bytecode::{MethodBody, Opcode, Operand};
use splint_metadata::Image;

use crate::heap::Heap;
use crate::value::Value;

/// Execution errors
///
/// These indicate a malformed or hostile body, not a recoverable runtime
/// condition; verified bodies only produce `TypeMismatch`-class errors when
/// the object graph disagrees with the code.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    /// Pop from an empty operand stack
    #[error("stack underflow at instruction {at}")]
    StackUnderflow {
        /// Instruction index
        at: usize,
    },

    /// Value on the stack had the wrong type
    #[error("expected {expected} at instruction {at}")]
    TypeMismatch {
        /// The type the instruction needed
        expected: &'static str,
        /// Instruction index
        at: usize,
    },

    /// Local slot outside the frame
    #[error("local slot out of range at instruction {at}")]
    BadLocal {
        /// Instruction index
        at: usize,
    },

    /// Dangling object reference
    #[error("dangling object reference at instruction {at}")]
    BadObject {
        /// Instruction index
        at: usize,
    },

    /// Field token does not resolve on the receiver
    #[error("bad field access at instruction {at}")]
    BadField {
        /// Instruction index
        at: usize,
    },

    /// Constructor token does not resolve in the image
    #[error("unknown constructor at instruction {at}")]
    UnknownCtor {
        /// Instruction index
        at: usize,
    },

    /// Native id was never registered
    #[error("unknown native {id} at instruction {at}")]
    UnknownNative {
        /// The unregistered id
        id: u16,
        /// Instruction index
        at: usize,
    },

    /// Opcode/operand pairing the verifier would have rejected
    #[error("malformed instruction at {at}")]
    Malformed {
        /// Instruction index
        at: usize,
    },

    /// Execution ran past the last instruction
    #[error("execution fell off the end of the body")]
    FellOffEnd,
}

/// Host-registered native callbacks
///
/// Natives take the single argument popped by `CALL_NATIVE` and return
/// nothing; the host uses them as side-effect hooks (tracing, bookkeeping).
#[derive(Default)]
pub struct NativeRegistry {
    callbacks: Vec<Box<dyn FnMut(Value)>>,
}

impl NativeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback, returning its id
    pub fn register<F: FnMut(Value) + 'static>(&mut self, callback: F) -> u16 {
        let id = self.callbacks.len() as u16;
        self.callbacks.push(Box::new(callback));
        id
    }

    fn invoke(&mut self, id: u16, arg: Value, at: usize) -> Result<(), ExecError> {
        match self.callbacks.get_mut(id as usize) {
            Some(callback) => {
                callback(arg);
                Ok(())
            }
            None => Err(ExecError::UnknownNative { id, at }),
        }
    }

    /// Number of registered natives
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Check if no natives are registered
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

fn pop(stack: &mut Vec<Value>, at: usize) -> Result<Value, ExecError> {
    stack.pop().ok_or(ExecError::StackUnderflow { at })
}

fn pop_i32(stack: &mut Vec<Value>, at: usize) -> Result<i32, ExecError> {
    pop(stack, at)?.as_i32().ok_or(ExecError::TypeMismatch {
        expected: "i32",
        at,
    })
}

fn pop_bool(stack: &mut Vec<Value>, at: usize) -> Result<bool, ExecError> {
    pop(stack, at)?.as_bool().ok_or(ExecError::TypeMismatch {
        expected: "bool",
        at,
    })
}

/// Execute a method body against a receiver
///
/// Returns the value popped by `RETURN`, or null for `RETURN_VOID`.
pub fn run_method(
    image: &Image,
    heap: &mut Heap,
    natives: &mut NativeRegistry,
    body: &MethodBody,
    this: Value,
) -> Result<Value, ExecError> {
    let mut stack: Vec<Value> = Vec::new();
    let mut locals = vec![Value::Null; body.local_count];
    let mut ip = 0usize;

    while ip < body.code.len() {
        let at = ip;
        let instr = body.code[ip];

        match (instr.opcode, instr.operand) {
            (Opcode::Nop, Operand::None) => {}
            (Opcode::Pop, Operand::None) => {
                pop(&mut stack, at)?;
            }
            (Opcode::Dup, Operand::None) => {
                let top = *stack.last().ok_or(ExecError::StackUnderflow { at })?;
                stack.push(top);
            }

            (Opcode::ConstNull, Operand::None) => stack.push(Value::Null),
            (Opcode::ConstTrue, Operand::None) => stack.push(Value::Bool(true)),
            (Opcode::ConstFalse, Operand::None) => stack.push(Value::Bool(false)),
            (Opcode::ConstI32, Operand::I32(v)) => stack.push(Value::I32(v)),

            (Opcode::LoadLocal, Operand::Local(slot)) => {
                let value = *locals
                    .get(usize::from(slot))
                    .ok_or(ExecError::BadLocal { at })?;
                stack.push(value);
            }
            (Opcode::StoreLocal, Operand::Local(slot)) => {
                let value = pop(&mut stack, at)?;
                *locals
                    .get_mut(usize::from(slot))
                    .ok_or(ExecError::BadLocal { at })? = value;
            }
            (Opcode::LoadThis, Operand::None) => stack.push(this),

            (Opcode::Iadd, Operand::None) => {
                let b = pop_i32(&mut stack, at)?;
                let a = pop_i32(&mut stack, at)?;
                stack.push(Value::I32(a.wrapping_add(b)));
            }
            (Opcode::Isub, Operand::None) => {
                let b = pop_i32(&mut stack, at)?;
                let a = pop_i32(&mut stack, at)?;
                stack.push(Value::I32(a.wrapping_sub(b)));
            }
            (Opcode::Ilt, Operand::None) => {
                let b = pop_i32(&mut stack, at)?;
                let a = pop_i32(&mut stack, at)?;
                stack.push(Value::Bool(a < b));
            }
            (Opcode::Eq, Operand::None) => {
                let b = pop(&mut stack, at)?;
                let a = pop(&mut stack, at)?;
                stack.push(Value::Bool(a == b));
            }
            (Opcode::Ne, Operand::None) => {
                let b = pop(&mut stack, at)?;
                let a = pop(&mut stack, at)?;
                stack.push(Value::Bool(a != b));
            }

            (Opcode::Jmp, Operand::Target(target)) => {
                ip = target;
                continue;
            }
            (Opcode::JmpIfFalse, Operand::Target(target)) => {
                if !pop_bool(&mut stack, at)? {
                    ip = target;
                    continue;
                }
            }
            (Opcode::JmpIfTrue, Operand::Target(target)) => {
                if pop_bool(&mut stack, at)? {
                    ip = target;
                    continue;
                }
            }

            (Opcode::Return, Operand::None) => return pop(&mut stack, at),
            (Opcode::ReturnVoid, Operand::None) => return Ok(Value::Null),
            (Opcode::CallNative, Operand::Native(id)) => {
                let arg = pop(&mut stack, at)?;
                natives.invoke(id, arg, at)?;
            }

            (Opcode::NewObject, Operand::Ctor(ctor)) => {
                let def = image
                    .type_def(ctor.owner)
                    .ok_or(ExecError::UnknownCtor { at })?;
                if def.ctors.get(ctor.index as usize).is_none() {
                    return Err(ExecError::UnknownCtor { at });
                }
                let id = heap.alloc(ctor.owner, def.fields.len());
                stack.push(Value::Object(id));
            }
            (Opcode::LoadField, Operand::Field(field)) => {
                let id = pop(&mut stack, at)?
                    .as_object()
                    .ok_or(ExecError::TypeMismatch {
                        expected: "object",
                        at,
                    })?;
                let object = heap.get(id).ok_or(ExecError::BadObject { at })?;
                if object.class != field.owner {
                    return Err(ExecError::BadField { at });
                }
                let value = *object
                    .fields
                    .get(field.index as usize)
                    .ok_or(ExecError::BadField { at })?;
                stack.push(value);
            }
            (Opcode::StoreField, Operand::Field(field)) => {
                let value = pop(&mut stack, at)?;
                let id = pop(&mut stack, at)?
                    .as_object()
                    .ok_or(ExecError::TypeMismatch {
                        expected: "object",
                        at,
                    })?;
                let object = heap.get_mut(id).ok_or(ExecError::BadObject { at })?;
                if object.class != field.owner {
                    return Err(ExecError::BadField { at });
                }
                *object
                    .fields
                    .get_mut(field.index as usize)
                    .ok_or(ExecError::BadField { at })? = value;
            }

            _ => return Err(ExecError::Malformed { at }),
        }

        ip += 1;
    }

    Err(ExecError::FellOffEnd)
}
