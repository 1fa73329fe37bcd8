//! Retarget the part startup routine's suspension points
//!
//! The host implements `Part.startup` as a coroutine resumed once per frame
//! tick: immediate work first, body setup after the first suspension, joint
//! setup after the second. Because several frame ticks can run back to back
//! before a fixed-step tick, bodies can exist and start moving before their
//! joints do. The fix is to make every suspension in that routine wake on
//! the fixed-step tick instead: each `yield null` in the generated state
//! machine becomes `yield new FixedStepWait()`.
//!
//! The generated machine's shape is owned by the host compiler, so the
//! targets are located heuristically once per process and the step body is
//! edited at finalization time, never on disk.

use once_cell::sync::OnceCell;
use semver::Version;

use crate::error::PatchError;
use crate::locator::{locate_state_machine, StateMachine};
use crate::patch::{Patch, PatchContext};
use crate::rewrite::retarget_suspensions;

/// Type declaring the startup routine
const DECLARING_TYPE: &str = "Part";

/// The coroutine's source-level name
const ROUTINE: &str = "startup";

/// Wait type whose construction replaces the null yield
const WAIT_TYPE: &str = "FixedStepWait";

/// Make `Part.startup` resume on fixed-step ticks
#[derive(Debug, Default)]
pub struct FixedStepStart {
    resolved: OnceCell<StateMachine>,
}

impl FixedStepStart {
    /// The patch's config/diagnostic name
    pub const NAME: &'static str = "fixed_step_start";

    /// Create the patch
    pub fn new() -> Self {
        Self::default()
    }
}

impl Patch for FixedStepStart {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn min_host_version(&self) -> Version {
        Version::new(1, 8, 0)
    }

    fn apply(&self, ctx: &mut PatchContext<'_>) -> Result<(), PatchError> {
        let image = ctx.image();

        let declaring =
            image
                .type_by_name(DECLARING_TYPE)
                .ok_or_else(|| PatchError::TypeNotFound {
                    name: DECLARING_TYPE.to_string(),
                })?;

        let machine = *self
            .resolved
            .get_or_try_init(|| locate_state_machine(image, declaring, ROUTINE))?;

        let wait_type = image
            .type_by_name(WAIT_TYPE)
            .ok_or_else(|| PatchError::TypeNotFound {
                name: WAIT_TYPE.to_string(),
            })?;
        let wait_ctor =
            image
                .zero_arg_constructor(wait_type)
                .ok_or_else(|| PatchError::MissingConstructor {
                    type_name: WAIT_TYPE.to_string(),
                })?;

        let current = machine.current;
        ctx.add_transpiler(machine.step, move |mut code| {
            retarget_suspensions(&mut code, current, wait_ctor);
            code
        });

        Ok(())
    }
}
