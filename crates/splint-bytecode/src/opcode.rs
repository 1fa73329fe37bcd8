//! Bytecode opcodes for host method bodies
//!
//! This module defines the instruction set used to model the host runtime's
//! compiled method bodies. It covers the subset of the host's instruction
//! set that appears in coroutine state-machine step methods.

/// Bytecode opcode enumeration
///
/// All opcodes are single-byte tags. Operands are carried alongside the tag
/// in [`Instruction`](crate::body::Instruction) records rather than inline in
/// a byte stream.
///
/// Opcodes are organized into categories:
/// - 0x00-0x0F: Stack manipulation & constants
/// - 0x10-0x1F: Local variables
/// - 0x20-0x2F: Integer arithmetic
/// - 0x50-0x7F: Comparison
/// - 0x90-0x9F: Control flow
/// - 0xA0-0xAF: Calls & returns
/// - 0xB0-0xBF: Object operations
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // ===== Stack Manipulation & Constants (0x00-0x0F) =====
    /// No operation
    Nop = 0x00,
    /// Pop top value from stack
    Pop = 0x01,
    /// Duplicate top stack value
    Dup = 0x02,

    /// Push null constant
    ConstNull = 0x04,
    /// Push true constant
    ConstTrue = 0x05,
    /// Push false constant
    ConstFalse = 0x06,
    /// Push 32-bit integer constant (operand: i32)
    ConstI32 = 0x07,

    // ===== Local Variables (0x10-0x1F) =====
    /// Load local variable onto stack (operand: u16 slot)
    LoadLocal = 0x10,
    /// Store top of stack to local variable (operand: u16 slot)
    StoreLocal = 0x11,
    /// Load the receiver object
    LoadThis = 0x12,

    // ===== Integer Arithmetic (0x20-0x2F) =====
    /// Integer addition: pop b, pop a, push a + b
    Iadd = 0x20,
    /// Integer subtraction: pop b, pop a, push a - b
    Isub = 0x21,

    // ===== Comparison (0x50-0x7F) =====
    /// Integer less than: pop b, pop a, push a < b
    Ilt = 0x52,
    /// Generic equality: pop b, pop a, push a == b (structural)
    Eq = 0x70,
    /// Generic inequality: pop b, pop a, push a != b
    Ne = 0x71,

    // ===== Control Flow (0x90-0x9F) =====
    /// Unconditional jump (operand: instruction index)
    Jmp = 0x90,
    /// Jump if false: pop a, if !a jump (operand: instruction index)
    JmpIfFalse = 0x91,
    /// Jump if true: pop a, if a jump (operand: instruction index)
    JmpIfTrue = 0x92,

    // ===== Calls & Returns (0xA0-0xAF) =====
    /// Return from method (pop return value)
    Return = 0xA2,
    /// Return from void method
    ReturnVoid = 0xA3,
    /// Call a host-registered native: pop one argument (operand: u16 id)
    CallNative = 0xA7,

    // ===== Object Operations (0xB0-0xBF) =====
    /// Construct new instance via constructor reference (operand: ctor token)
    NewObject = 0xB0,
    /// Load object field: pop object, push field value (operand: field token)
    LoadField = 0xB1,
    /// Store object field: pop value, pop object (operand: field token)
    StoreField = 0xB2,
}

/// The operand kind an opcode expects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    /// No operand
    None,
    /// 32-bit signed integer constant
    I32,
    /// Local variable slot
    Local,
    /// Branch target (instruction index)
    Target,
    /// Native callback id
    Native,
    /// Constructor reference
    Ctor,
    /// Field reference
    Field,
}

impl Opcode {
    /// Convert byte to opcode
    ///
    /// Returns None if the byte does not correspond to a valid opcode.
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Self::Nop),
            0x01 => Some(Self::Pop),
            0x02 => Some(Self::Dup),
            0x04 => Some(Self::ConstNull),
            0x05 => Some(Self::ConstTrue),
            0x06 => Some(Self::ConstFalse),
            0x07 => Some(Self::ConstI32),
            0x10 => Some(Self::LoadLocal),
            0x11 => Some(Self::StoreLocal),
            0x12 => Some(Self::LoadThis),
            0x20 => Some(Self::Iadd),
            0x21 => Some(Self::Isub),
            0x52 => Some(Self::Ilt),
            0x70 => Some(Self::Eq),
            0x71 => Some(Self::Ne),
            0x90 => Some(Self::Jmp),
            0x91 => Some(Self::JmpIfFalse),
            0x92 => Some(Self::JmpIfTrue),
            0xA2 => Some(Self::Return),
            0xA3 => Some(Self::ReturnVoid),
            0xA7 => Some(Self::CallNative),
            0xB0 => Some(Self::NewObject),
            0xB1 => Some(Self::LoadField),
            0xB2 => Some(Self::StoreField),
            _ => None,
        }
    }

    /// Convert opcode to byte
    #[inline]
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Get the human-readable name of the opcode
    pub fn name(self) -> &'static str {
        match self {
            Self::Nop => "NOP",
            Self::Pop => "POP",
            Self::Dup => "DUP",
            Self::ConstNull => "CONST_NULL",
            Self::ConstTrue => "CONST_TRUE",
            Self::ConstFalse => "CONST_FALSE",
            Self::ConstI32 => "CONST_I32",
            Self::LoadLocal => "LOAD_LOCAL",
            Self::StoreLocal => "STORE_LOCAL",
            Self::LoadThis => "LOAD_THIS",
            Self::Iadd => "IADD",
            Self::Isub => "ISUB",
            Self::Ilt => "ILT",
            Self::Eq => "EQ",
            Self::Ne => "NE",
            Self::Jmp => "JMP",
            Self::JmpIfFalse => "JMP_IF_FALSE",
            Self::JmpIfTrue => "JMP_IF_TRUE",
            Self::Return => "RETURN",
            Self::ReturnVoid => "RETURN_VOID",
            Self::CallNative => "CALL_NATIVE",
            Self::NewObject => "NEW_OBJECT",
            Self::LoadField => "LOAD_FIELD",
            Self::StoreField => "STORE_FIELD",
        }
    }

    /// The operand kind this opcode expects
    pub fn operand_kind(self) -> OperandKind {
        match self {
            Self::ConstI32 => OperandKind::I32,
            Self::LoadLocal | Self::StoreLocal => OperandKind::Local,
            Self::Jmp | Self::JmpIfFalse | Self::JmpIfTrue => OperandKind::Target,
            Self::CallNative => OperandKind::Native,
            Self::NewObject => OperandKind::Ctor,
            Self::LoadField | Self::StoreField => OperandKind::Field,
            _ => OperandKind::None,
        }
    }

    /// Check if this opcode is a jump instruction
    pub fn is_jump(self) -> bool {
        matches!(self, Self::Jmp | Self::JmpIfFalse | Self::JmpIfTrue)
    }

    /// Check if this opcode is a return instruction
    pub fn is_return(self) -> bool {
        matches!(self, Self::Return | Self::ReturnVoid)
    }

    /// Check if this opcode never falls through to the next instruction
    pub fn is_terminator(self) -> bool {
        self.is_return() || matches!(self, Self::Jmp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_roundtrip() {
        let opcodes = [
            Opcode::Nop,
            Opcode::Pop,
            Opcode::Dup,
            Opcode::ConstNull,
            Opcode::ConstTrue,
            Opcode::ConstFalse,
            Opcode::ConstI32,
            Opcode::LoadLocal,
            Opcode::StoreLocal,
            Opcode::LoadThis,
            Opcode::Iadd,
            Opcode::Isub,
            Opcode::Ilt,
            Opcode::Eq,
            Opcode::Ne,
            Opcode::Jmp,
            Opcode::JmpIfFalse,
            Opcode::JmpIfTrue,
            Opcode::Return,
            Opcode::ReturnVoid,
            Opcode::CallNative,
            Opcode::NewObject,
            Opcode::LoadField,
            Opcode::StoreField,
        ];

        for opcode in &opcodes {
            let byte = opcode.to_u8();
            let decoded = Opcode::from_u8(byte);
            assert_eq!(decoded, Some(*opcode), "Failed roundtrip for {:?}", opcode);
        }
    }

    #[test]
    fn test_invalid_opcode() {
        assert_eq!(Opcode::from_u8(0x03), None);
        assert_eq!(Opcode::from_u8(0x80), None);
        assert_eq!(Opcode::from_u8(0xFF), None);
    }

    #[test]
    fn test_opcode_names() {
        assert_eq!(Opcode::ConstNull.name(), "CONST_NULL");
        assert_eq!(Opcode::NewObject.name(), "NEW_OBJECT");
        assert_eq!(Opcode::StoreField.name(), "STORE_FIELD");
        assert_eq!(Opcode::Jmp.name(), "JMP");
    }

    #[test]
    fn test_jump_detection() {
        assert!(Opcode::Jmp.is_jump());
        assert!(Opcode::JmpIfFalse.is_jump());
        assert!(Opcode::JmpIfTrue.is_jump());
        assert!(!Opcode::Return.is_jump());
        assert!(!Opcode::StoreField.is_jump());
    }

    #[test]
    fn test_terminator_detection() {
        assert!(Opcode::Return.is_terminator());
        assert!(Opcode::ReturnVoid.is_terminator());
        assert!(Opcode::Jmp.is_terminator());
        assert!(!Opcode::JmpIfTrue.is_terminator());
        assert!(!Opcode::NewObject.is_terminator());
    }

    #[test]
    fn test_operand_kinds() {
        assert_eq!(Opcode::ConstNull.operand_kind(), OperandKind::None);
        assert_eq!(Opcode::ConstI32.operand_kind(), OperandKind::I32);
        assert_eq!(Opcode::Jmp.operand_kind(), OperandKind::Target);
        assert_eq!(Opcode::NewObject.operand_kind(), OperandKind::Ctor);
        assert_eq!(Opcode::StoreField.operand_kind(), OperandKind::Field);
        assert_eq!(Opcode::CallNative.operand_kind(), OperandKind::Native);
    }

    #[test]
    fn test_opcode_values() {
        // Byte values are part of the host's wire convention
        assert_eq!(Opcode::Nop as u8, 0x00);
        assert_eq!(Opcode::ConstNull as u8, 0x04);
        assert_eq!(Opcode::LoadLocal as u8, 0x10);
        assert_eq!(Opcode::Jmp as u8, 0x90);
        assert_eq!(Opcode::NewObject as u8, 0xB0);
        assert_eq!(Opcode::StoreField as u8, 0xB2);
    }
}
