//! Splint Patches
//!
//! Runtime patches applied to the host's compiled method bodies at load
//! time. The interesting machinery is in two places: [`locator`] finds a
//! compiler-synthesized coroutine state machine by naming convention, and
//! [`rewrite`] retargets its suspension points by mutating the instruction
//! stream in place. Everything else is the installation boundary: a patch
//! trait, a registry with config and host-version gating, and error
//! containment so one failing patch never takes the others down with it.

#![warn(rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod locator;
pub mod patch;
pub mod patches;
pub mod registry;
pub mod rewrite;

pub use config::PatchConfig;
pub use error::PatchError;
pub use locator::{locate_state_machine, StateMachine};
pub use patch::{Patch, PatchContext, Transpiler};
pub use registry::{InstallOutcome, InstallReport, PatchRegistry, TranspilerSet};
pub use rewrite::retarget_suspensions;
