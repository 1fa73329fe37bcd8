//! Splint Host Runtime Model
//!
//! An executable model of the host's cooperative scheduling: a small stack
//! interpreter over the splint instruction set, coroutine state machines
//! stepped by a two-phase frame loop (frame tick and fixed-step tick), and
//! a host container that finalizes method bodies through load-time
//! transpilers. This is what makes a rewritten wake condition observable:
//! the same routine, driven through the same phases, parks on a different
//! queue once its step body has been patched.

#![warn(rust_2018_idioms)]

pub mod frame;
pub mod heap;
pub mod host;
pub mod interp;
pub mod routine;
pub mod value;

pub use frame::FrameLoop;
pub use heap::{Heap, Object, ObjectId};
pub use host::{Host, HostError};
pub use interp::{run_method, ExecError, NativeRegistry};
pub use routine::{RoutineId, RoutineState, Wait};
pub use value::Value;
