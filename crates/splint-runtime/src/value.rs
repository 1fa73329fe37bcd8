//! Runtime values

use crate::heap::ObjectId;

/// A runtime value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    /// The null reference
    Null,
    /// Boolean
    Bool(bool),
    /// 32-bit signed integer
    I32(i32),
    /// Heap object reference
    Object(ObjectId),
}

impl Value {
    /// Check for null
    pub fn is_null(self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get the boolean payload, if any
    pub fn as_bool(self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }

    /// Get the integer payload, if any
    pub fn as_i32(self) -> Option<i32> {
        match self {
            Value::I32(v) => Some(v),
            _ => None,
        }
    }

    /// Get the object reference, if any
    pub fn as_object(self) -> Option<ObjectId> {
        match self {
            Value::Object(id) => Some(id),
            _ => None,
        }
    }
}
