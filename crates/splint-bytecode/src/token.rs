//! Opaque handles into host metadata
//!
//! Instructions reference types, fields, and constructors through these
//! tokens. A token is an index into the host's metadata image; two tokens
//! compare equal exactly when they designate the same metadata entry, which
//! is what the rewriting pass relies on when matching field stores.

/// Handle to a type in the host metadata image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeToken(pub u32);

/// Handle to an instance field of a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldToken {
    /// The type declaring the field
    pub owner: TypeToken,
    /// Field slot within the declaring type
    pub index: u32,
}

/// Handle to a constructor of a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CtorToken {
    /// The type being constructed
    pub owner: TypeToken,
    /// Constructor index within the declaring type
    pub index: u32,
}

/// Handle to a method of a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodToken {
    /// The type declaring the method
    pub owner: TypeToken,
    /// Method index within the declaring type
    pub index: u32,
}
