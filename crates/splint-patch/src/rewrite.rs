//! Suspension point rewriting
//!
//! A coroutine suspension point that resumes on the next frame tick is
//! encoded as the pair `CONST_NULL; STORE_FIELD $current`. Retargeting the
//! wake condition means replacing the null push with the construction of a
//! wait object, leaving the field store untouched. The mutation is strictly
//! in place: sequence length, instruction positions, and therefore every
//! branch target in the body stay valid.

use splint_bytecode::{CtorToken, FieldToken, Instruction, Opcode, Operand};

/// Rewrite every suspension point storing into `field`
///
/// Scans adjacent instruction pairs; wherever `CONST_NULL` is immediately
/// followed by `STORE_FIELD` with an operand equal to `field`, the null
/// push is mutated into `NEW_OBJECT ctor`. All occurrences are rewritten.
/// Returns the number of rewritten suspension points; zero matches is a
/// valid no-op, not an error.
pub fn retarget_suspensions(
    code: &mut [Instruction],
    field: FieldToken,
    ctor: CtorToken,
) -> usize {
    let mut rewritten = 0;

    for i in 1..code.len() {
        if code[i - 1].opcode == Opcode::ConstNull
            && code[i].opcode == Opcode::StoreField
            && code[i].operand == Operand::Field(field)
        {
            code[i - 1].opcode = Opcode::NewObject;
            code[i - 1].operand = Operand::Ctor(ctor);
            rewritten += 1;
        }
    }

    rewritten
}

#[cfg(test)]
mod tests {
    use super::*;
    use splint_bytecode::{verify_body, MethodBody, TypeToken};

    fn target_field() -> FieldToken {
        FieldToken {
            owner: TypeToken(1),
            index: 1,
        }
    }

    fn other_field() -> FieldToken {
        FieldToken {
            owner: TypeToken(1),
            index: 0,
        }
    }

    fn wait_ctor() -> CtorToken {
        CtorToken {
            owner: TypeToken(2),
            index: 0,
        }
    }

    fn null_store(field: FieldToken) -> [Instruction; 2] {
        [
            Instruction::simple(Opcode::ConstNull),
            Instruction::new(Opcode::StoreField, Operand::Field(field)),
        ]
    }

    /// The `[A, null, store F, B, null, store F, C]` scenario: both pairs
    /// rewritten, length unchanged, stores untouched.
    #[test]
    fn test_rewrites_every_pair() {
        let [n1, s1] = null_store(target_field());
        let [n2, s2] = null_store(target_field());
        let mut code = vec![
            Instruction::simple(Opcode::LoadThis),
            n1,
            s1,
            Instruction::simple(Opcode::Nop),
            n2,
            s2,
            Instruction::simple(Opcode::ReturnVoid),
        ];
        let before = code.clone();

        let count = retarget_suspensions(&mut code, target_field(), wait_ctor());

        assert_eq!(count, 2);
        assert_eq!(code.len(), 7);
        for i in [1, 4] {
            assert_eq!(code[i].opcode, Opcode::NewObject);
            assert_eq!(code[i].operand, Operand::Ctor(wait_ctor()));
        }
        // Everything except the two null pushes is byte-for-byte unchanged,
        // including the field stores themselves.
        for i in [0, 2, 3, 5, 6] {
            assert_eq!(code[i], before[i]);
        }
    }

    #[test]
    fn test_zero_matches_is_identity() {
        let [n, s] = null_store(other_field());
        let mut code = vec![
            Instruction::simple(Opcode::LoadThis),
            n,
            s,
            Instruction::simple(Opcode::ReturnVoid),
        ];
        let before = code.clone();

        let count = retarget_suspensions(&mut code, target_field(), wait_ctor());

        assert_eq!(count, 0);
        assert_eq!(code, before);
    }

    #[test]
    fn test_null_without_store_untouched() {
        let mut code = vec![
            Instruction::simple(Opcode::ConstNull),
            Instruction::simple(Opcode::Pop),
            Instruction::simple(Opcode::ConstNull),
            Instruction::simple(Opcode::ReturnVoid),
        ];
        let before = code.clone();

        assert_eq!(retarget_suspensions(&mut code, target_field(), wait_ctor()), 0);
        assert_eq!(code, before);
    }

    #[test]
    fn test_reapplication_finds_nothing() {
        let [n, s] = null_store(target_field());
        let mut code = vec![Instruction::simple(Opcode::LoadThis), n, s,
            Instruction::simple(Opcode::ReturnVoid)];

        assert_eq!(retarget_suspensions(&mut code, target_field(), wait_ctor()), 1);
        let after_first = code.clone();

        // The null push no longer exists at that position, so a second
        // application is a no-op.
        assert_eq!(retarget_suspensions(&mut code, target_field(), wait_ctor()), 0);
        assert_eq!(code, after_first);
    }

    #[test]
    fn test_pair_at_sequence_edges() {
        // Nothing in the pattern requires interior positions: a store as
        // the final instruction is still rewritten.
        let [n, s] = null_store(target_field());
        let mut code = vec![n, s];

        assert_eq!(retarget_suspensions(&mut code, target_field(), wait_ctor()), 1);
        assert_eq!(code[0].opcode, Opcode::NewObject);
        assert_eq!(code[1].opcode, Opcode::StoreField);
    }

    #[test]
    fn test_branch_targets_stay_valid() {
        let [n, s] = null_store(target_field());
        let mut body = MethodBody::new(
            vec![
                Instruction::simple(Opcode::ConstTrue),
                Instruction::new(Opcode::JmpIfFalse, Operand::Target(6)),
                Instruction::simple(Opcode::LoadThis),
                n,
                s,
                Instruction::new(Opcode::Jmp, Operand::Target(6)),
                Instruction::simple(Opcode::ReturnVoid),
            ],
            0,
        );
        verify_body(&body).unwrap();

        retarget_suspensions(&mut body.code, target_field(), wait_ctor());

        // Length unchanged, so index-based targets still name the same
        // instructions and the body still verifies.
        assert_eq!(body.len(), 7);
        assert_eq!(body.code[1].operand, Operand::Target(6));
        verify_body(&body).unwrap();
    }

    #[test]
    fn test_interleaved_other_field_store() {
        let [n1, s1] = null_store(target_field());
        let [n2, s2] = null_store(other_field());
        let mut code = vec![n1, s1, n2, s2, Instruction::simple(Opcode::ReturnVoid)];

        assert_eq!(retarget_suspensions(&mut code, target_field(), wait_ctor()), 1);
        assert_eq!(code[0].opcode, Opcode::NewObject);
        assert_eq!(code[2].opcode, Opcode::ConstNull);
    }
}
