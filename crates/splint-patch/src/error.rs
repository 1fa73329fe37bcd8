//! Patch installation errors
//!
//! Every variant is fatal for installing the one patch that raised it, and
//! only that patch. The registry catches these at the installation boundary
//! and reports them; they never propagate into the host's operation.

use thiserror::Error;

/// Errors raised while resolving a patch's targets
#[derive(Debug, Error)]
pub enum PatchError {
    /// No nested type matched the generated state-machine naming convention
    #[error("{declaring}.{routine}: generated state machine type not found")]
    TargetNotFound {
        /// Declaring type name
        declaring: String,
        /// Routine name searched for
        routine: String,
    },

    /// No suspension field matched inside the located state machine
    #[error("{routine}: suspension field not found in {state_machine}")]
    FieldNotFound {
        /// State machine type name
        state_machine: String,
        /// Routine name
        routine: String,
    },

    /// A type the patch relies on is missing from the image
    #[error("type {name} not found in host image")]
    TypeNotFound {
        /// The missing type name
        name: String,
    },

    /// The wait type has no zero-argument constructor
    #[error("no zero-argument constructor on {type_name}")]
    MissingConstructor {
        /// The wait type name
        type_name: String,
    },

    /// A method the patch targets is missing
    #[error("method {name} not found on {type_name}")]
    MissingMethod {
        /// Declaring type name
        type_name: String,
        /// Method name
        name: String,
    },
}
