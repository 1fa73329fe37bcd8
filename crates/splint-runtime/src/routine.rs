//! Coroutine routine state
//!
//! A routine is a compiler-generated state machine object plus its step
//! method. Between steps it is either awaiting a wake condition or done;
//! the wake condition is read back out of the machine's suspension token
//! field after every step.

use splint_bytecode::{FieldToken, MethodToken};

use crate::heap::ObjectId;

/// Handle to a started routine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoutineId(pub(crate) usize);

/// What wakes a suspended routine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wait {
    /// Resume on the next frame tick
    NextTick,
    /// Resume on the next fixed-step tick
    FixedStep,
}

/// Lifecycle of a routine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutineState {
    /// Currently inside a step call
    Running,
    /// Parked until its wake condition fires
    Awaiting(Wait),
    /// The step method returned false; never stepped again
    Done,
}

/// A started routine
#[derive(Debug)]
pub(crate) struct Routine {
    /// The state machine instance
    pub object: ObjectId,
    /// The step method
    pub step: MethodToken,
    /// The suspension token field read after each step
    pub current: FieldToken,
    /// Current lifecycle state
    pub state: RoutineState,
}
