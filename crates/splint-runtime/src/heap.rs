//! Object heap
//!
//! A plain arena of objects. Object references are indices, so identity is
//! stable for the host's lifetime; nothing here is ever freed, matching the
//! short-lived scope of patched startup routines.

use splint_bytecode::TypeToken;

use crate::value::Value;

/// Reference to a heap object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(u32);

impl ObjectId {
    /// Arena index of the object
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A heap object: its class plus one value slot per instance field
#[derive(Debug, Clone)]
pub struct Object {
    /// The object's type
    pub class: TypeToken,
    /// Field slots, in declaration order
    pub fields: Vec<Value>,
}

/// The object heap
#[derive(Debug, Default)]
pub struct Heap {
    objects: Vec<Object>,
}

impl Heap {
    /// Create an empty heap
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an object with null-initialized field slots
    pub fn alloc(&mut self, class: TypeToken, field_count: usize) -> ObjectId {
        let id = ObjectId(self.objects.len() as u32);
        self.objects.push(Object {
            class,
            fields: vec![Value::Null; field_count],
        });
        id
    }

    /// Get an object by reference
    pub fn get(&self, id: ObjectId) -> Option<&Object> {
        self.objects.get(id.index())
    }

    /// Get a mutable object by reference
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut Object> {
        self.objects.get_mut(id.index())
    }

    /// Number of live objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the heap is empty
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_null_initialized() {
        let mut heap = Heap::new();
        let id = heap.alloc(TypeToken(4), 3);

        let obj = heap.get(id).unwrap();
        assert_eq!(obj.class, TypeToken(4));
        assert_eq!(obj.fields, vec![Value::Null; 3]);
    }

    #[test]
    fn test_identity_stable() {
        let mut heap = Heap::new();
        let a = heap.alloc(TypeToken(0), 0);
        let b = heap.alloc(TypeToken(0), 0);
        assert_ne!(a, b);

        heap.get_mut(a).unwrap().fields.push(Value::I32(1));
        assert_eq!(heap.get(a).unwrap().fields.len(), 1);
        assert!(heap.get(b).unwrap().fields.is_empty());
    }
}
