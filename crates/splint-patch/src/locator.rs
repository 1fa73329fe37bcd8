//! Coroutine state machine locator
//!
//! The host's compiler lowers a coroutine into a private nested type whose
//! name starts with `<routine>`, with a private `$state`/`$current` field
//! pair and a `step` method that resumes the routine. Those names are the
//! compiler's convention, not ours, so they are found by prefix/substring
//! matching and surfaced as typed handles. Resolution is deterministic:
//! the same declaring type and routine name always produce equal handles.

use splint_bytecode::{FieldToken, MethodToken, TypeToken};
use splint_metadata::{Image, Visibility};

use crate::error::PatchError;

/// Substring identifying the suspension token field
const CURRENT_FIELD_MARKER: &str = "current";

/// Name of the state machine's step method
pub const STEP_METHOD: &str = "step";

/// Resolved handles for a coroutine state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateMachine {
    /// The generated state machine type
    pub ty: TypeToken,
    /// The field holding the current suspension token
    pub current: FieldToken,
    /// The step method whose body encodes the suspension points
    pub step: MethodToken,
}

/// Locate the generated state machine for `routine` on `declaring`
///
/// Fails with [`PatchError::TargetNotFound`] if no private nested type
/// matches the `<routine>` naming convention, and with
/// [`PatchError::FieldNotFound`] if the located type has no private
/// instance field whose name contains `current`. Both indicate a host
/// version whose code generation this patch does not understand.
pub fn locate_state_machine(
    image: &Image,
    declaring: TypeToken,
    routine: &str,
) -> Result<StateMachine, PatchError> {
    let marker = format!("<{routine}>");

    let ty = image
        .nested_types(declaring, Visibility::Private)
        .find(|&nested| {
            image
                .type_name(nested)
                .is_some_and(|name| name.starts_with(&marker))
        })
        .ok_or_else(|| PatchError::TargetNotFound {
            declaring: image.type_name(declaring).unwrap_or("<unknown>").to_string(),
            routine: routine.to_string(),
        })?;

    let current = image
        .instance_fields(ty, Visibility::Private)
        .find(|&field| {
            image
                .field_def(field)
                .is_some_and(|def| def.name.contains(CURRENT_FIELD_MARKER))
        })
        .ok_or_else(|| PatchError::FieldNotFound {
            state_machine: image.type_name(ty).unwrap_or("<unknown>").to_string(),
            routine: routine.to_string(),
        })?;

    let step = image
        .method(ty, STEP_METHOD)
        .ok_or_else(|| PatchError::MissingMethod {
            type_name: image.type_name(ty).unwrap_or("<unknown>").to_string(),
            name: STEP_METHOD.to_string(),
        })?;

    Ok(StateMachine { ty, current, step })
}

#[cfg(test)]
mod tests {
    use super::*;
    use splint_bytecode::{Instruction, MethodBody, Opcode};
    use splint_metadata::{ImageBuilder, TypeBuilder};

    fn step_body() -> MethodBody {
        MethodBody::new(
            vec![
                Instruction::simple(Opcode::ConstFalse),
                Instruction::simple(Opcode::Return),
            ],
            0,
        )
    }

    fn image_with_machine() -> (Image, TypeToken) {
        let mut builder = ImageBuilder::new();
        let part = builder.add_type(TypeBuilder::new("Part"));
        builder.add_nested_type(
            part,
            TypeBuilder::new("<startup>machine")
                .private()
                .field("$state", Visibility::Private)
                .field("$current", Visibility::Private)
                .method(STEP_METHOD, step_body()),
        );
        (builder.build(), part)
    }

    #[test]
    fn test_locates_machine_and_field() {
        let (image, part) = image_with_machine();
        let sm = locate_state_machine(&image, part, "startup").unwrap();

        assert_eq!(image.type_name(sm.ty), Some("<startup>machine"));
        assert_eq!(image.field_def(sm.current).unwrap().name, "$current");
        assert_eq!(sm.step.owner, sm.ty);
    }

    #[test]
    fn test_resolution_deterministic() {
        let (image, part) = image_with_machine();
        let a = locate_state_machine(&image, part, "startup").unwrap();
        let b = locate_state_machine(&image, part, "startup").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_nested_type() {
        let mut builder = ImageBuilder::new();
        let part = builder.add_type(TypeBuilder::new("Part"));
        let image = builder.build();

        let err = locate_state_machine(&image, part, "startup").unwrap_err();
        assert!(matches!(err, PatchError::TargetNotFound { .. }));
    }

    #[test]
    fn test_wrong_routine_name() {
        let (image, part) = image_with_machine();
        let err = locate_state_machine(&image, part, "teardown").unwrap_err();
        assert!(matches!(err, PatchError::TargetNotFound { .. }));
    }

    #[test]
    fn test_public_nested_type_ignored() {
        let mut builder = ImageBuilder::new();
        let part = builder.add_type(TypeBuilder::new("Part"));
        // Matching name but public: not a compiler-generated machine.
        builder.add_nested_type(
            part,
            TypeBuilder::new("<startup>machine").field("$current", Visibility::Private),
        );
        let image = builder.build();

        let err = locate_state_machine(&image, part, "startup").unwrap_err();
        assert!(matches!(err, PatchError::TargetNotFound { .. }));
    }

    #[test]
    fn test_missing_current_field() {
        let mut builder = ImageBuilder::new();
        let part = builder.add_type(TypeBuilder::new("Part"));
        builder.add_nested_type(
            part,
            TypeBuilder::new("<startup>machine")
                .private()
                .field("$state", Visibility::Private),
        );
        let image = builder.build();

        let err = locate_state_machine(&image, part, "startup").unwrap_err();
        assert!(matches!(err, PatchError::FieldNotFound { .. }));
    }

    #[test]
    fn test_static_or_public_current_ignored() {
        let mut builder = ImageBuilder::new();
        let part = builder.add_type(TypeBuilder::new("Part"));
        builder.add_nested_type(
            part,
            TypeBuilder::new("<startup>machine")
                .private()
                .static_field("$current_cache", Visibility::Private)
                .field("current_size", Visibility::Public),
        );
        let image = builder.build();

        let err = locate_state_machine(&image, part, "startup").unwrap_err();
        assert!(matches!(err, PatchError::FieldNotFound { .. }));
    }
}
