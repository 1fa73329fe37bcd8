//! Host container
//!
//! Owns the metadata image, heap, natives, routines, and frame queues.
//! Method bodies are finalized through load-time transpilers exactly once,
//! before any routine runs; after that the host only executes what the
//! image holds. Starting a routine runs its first step immediately, the
//! way the host starts coroutines synchronously, then parks it on the
//! queue its suspension token selects.

use semver::Version;
use splint_bytecode::{Instruction, MethodToken, TypeToken};
use splint_metadata::{Image, Visibility};

use crate::frame::FrameLoop;
use crate::heap::Heap;
use crate::interp::{run_method, ExecError, NativeRegistry};
use crate::routine::{Routine, RoutineId, RoutineState, Wait};
use crate::value::Value;

/// Name of the step method on generated state machines
const STEP_METHOD: &str = "step";

/// Substring naming the suspension token field
const CURRENT_FIELD_MARKER: &str = "current";

/// Well-known wait type that parks a routine on the fixed-step queue
const FIXED_WAIT_TYPE: &str = "FixedStepWait";

/// Host-level errors
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// Execution of a step body failed
    #[error(transparent)]
    Exec(#[from] ExecError),

    /// Method token does not resolve in the image
    #[error("method not found in host image")]
    UnknownMethod,

    /// The type has no step method
    #[error("{type_name} has no {STEP_METHOD} method")]
    MissingStep {
        /// The offending type
        type_name: String,
    },

    /// The type has no suspension token field
    #[error("{type_name} has no suspension token field")]
    MissingCurrentField {
        /// The offending type
        type_name: String,
    },

    /// A step call broke the coroutine protocol
    #[error("step protocol violation: {detail}")]
    StepProtocol {
        /// What went wrong
        detail: &'static str,
    },
}

/// The host runtime
pub struct Host {
    image: Image,
    version: Version,
    heap: Heap,
    natives: NativeRegistry,
    routines: Vec<Routine>,
    frame: FrameLoop,
    fixed_wait: Option<TypeToken>,
}

impl Host {
    /// Create a host from a loaded image
    pub fn new(image: Image, version: Version) -> Self {
        let fixed_wait = image.type_by_name(FIXED_WAIT_TYPE);
        Self {
            image,
            version,
            heap: Heap::new(),
            natives: NativeRegistry::new(),
            routines: Vec::new(),
            frame: FrameLoop::new(),
            fixed_wait,
        }
    }

    /// The loaded metadata image
    pub fn image(&self) -> &Image {
        &self.image
    }

    /// The host's version
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Register a native callback, returning its id
    pub fn register_native<F: FnMut(Value) + 'static>(&mut self, callback: F) -> u16 {
        self.natives.register(callback)
    }

    /// Finalize a method body through a load-time transpiler
    ///
    /// The original instruction sequence is handed to `transpile` once and
    /// replaced with whatever comes back. Must happen before routines of
    /// that method are started.
    pub fn finalize_method<F>(&mut self, method: MethodToken, transpile: F) -> Result<(), HostError>
    where
        F: FnOnce(Vec<Instruction>) -> Vec<Instruction>,
    {
        let body = self
            .image
            .method_body_mut(method)
            .ok_or(HostError::UnknownMethod)?;
        let code = std::mem::take(&mut body.code);
        body.code = transpile(code);
        log::debug!("finalized method body ({} instructions)", body.code.len());
        Ok(())
    }

    /// Start a routine whose state machine is `machine`
    ///
    /// Allocates the machine instance, runs the first step immediately,
    /// and parks the routine per its suspension token.
    pub fn start_routine(&mut self, machine: TypeToken) -> Result<RoutineId, HostError> {
        let type_name = || {
            self.image
                .type_name(machine)
                .unwrap_or("<unknown>")
                .to_string()
        };

        let step = self
            .image
            .method(machine, STEP_METHOD)
            .ok_or_else(|| HostError::MissingStep {
                type_name: type_name(),
            })?;

        let current = self
            .image
            .instance_fields(machine, Visibility::Private)
            .find(|&field| {
                self.image
                    .field_def(field)
                    .is_some_and(|def| def.name.contains(CURRENT_FIELD_MARKER))
            })
            .ok_or_else(|| HostError::MissingCurrentField {
                type_name: type_name(),
            })?;

        let object = self.heap.alloc(machine, self.image.field_count(machine));
        let id = RoutineId(self.routines.len());
        self.routines.push(Routine {
            object,
            step,
            current,
            state: RoutineState::Running,
        });

        self.step_routine(id)?;
        Ok(id)
    }

    /// Run one frame-tick phase
    pub fn run_update(&mut self) -> Result<(), HostError> {
        for id in self.frame.take_tick() {
            self.step_routine(id)?;
        }
        Ok(())
    }

    /// Run one fixed-step phase
    pub fn run_fixed(&mut self) -> Result<(), HostError> {
        for id in self.frame.take_fixed() {
            self.step_routine(id)?;
        }
        Ok(())
    }

    /// Current lifecycle state of a routine
    pub fn routine_state(&self, id: RoutineId) -> Option<RoutineState> {
        self.routines.get(id.0).map(|r| r.state)
    }

    fn step_routine(&mut self, id: RoutineId) -> Result<(), HostError> {
        let (object, step, current) = {
            let routine = &self.routines[id.0];
            (routine.object, routine.step, routine.current)
        };

        let body = self
            .image
            .method_body(step)
            .ok_or(HostError::UnknownMethod)?;
        let result = run_method(
            &self.image,
            &mut self.heap,
            &mut self.natives,
            body,
            Value::Object(object),
        )?;

        match result {
            Value::Bool(true) => {
                let token = self
                    .heap
                    .get(object)
                    .and_then(|o| o.fields.get(current.index as usize))
                    .copied()
                    .ok_or(HostError::StepProtocol {
                        detail: "suspension token field missing",
                    })?;

                // Null resumes on the next frame tick; a FixedStepWait
                // instance resumes on the fixed-step tick. Anything else
                // behaves like a plain frame-tick yield.
                let wait = match token {
                    Value::Object(wait_obj)
                        if self.fixed_wait.is_some_and(|ty| {
                            self.heap.get(wait_obj).is_some_and(|o| o.class == ty)
                        }) =>
                    {
                        Wait::FixedStep
                    }
                    _ => Wait::NextTick,
                };

                self.routines[id.0].state = RoutineState::Awaiting(wait);
                self.frame.park(id, wait);
                Ok(())
            }
            Value::Bool(false) => {
                self.routines[id.0].state = RoutineState::Done;
                Ok(())
            }
            _ => Err(HostError::StepProtocol {
                detail: "step must return a bool",
            }),
        }
    }
}
