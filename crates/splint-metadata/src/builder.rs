//! Fluent construction of metadata images
//!
//! Used by the synthetic host and by tests to assemble type definitions
//! without hand-writing index bookkeeping.

use splint_bytecode::{MethodBody, TypeToken};

use crate::image::{CtorDef, FieldDef, Image, MethodDef, TypeDef, Visibility};

/// Builder for a single type definition
#[derive(Debug)]
pub struct TypeBuilder {
    name: String,
    visibility: Visibility,
    fields: Vec<FieldDef>,
    methods: Vec<MethodDef>,
    ctors: Vec<CtorDef>,
}

impl TypeBuilder {
    /// Start a public type with the given name
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            visibility: Visibility::Public,
            fields: Vec::new(),
            methods: Vec::new(),
            ctors: Vec::new(),
        }
    }

    /// Mark the type as private
    pub fn private(mut self) -> Self {
        self.visibility = Visibility::Private;
        self
    }

    /// Add an instance field
    pub fn field(mut self, name: &str, visibility: Visibility) -> Self {
        self.fields.push(FieldDef {
            name: name.to_string(),
            visibility,
            is_static: false,
        });
        self
    }

    /// Add a static field
    pub fn static_field(mut self, name: &str, visibility: Visibility) -> Self {
        self.fields.push(FieldDef {
            name: name.to_string(),
            visibility,
            is_static: true,
        });
        self
    }

    /// Add a method with its compiled body
    pub fn method(mut self, name: &str, body: MethodBody) -> Self {
        self.methods.push(MethodDef {
            name: name.to_string(),
            body,
        });
        self
    }

    /// Add a zero-argument constructor
    pub fn default_ctor(mut self) -> Self {
        self.ctors.push(CtorDef { param_count: 0 });
        self
    }

    /// Add a constructor with the given parameter count
    pub fn ctor(mut self, param_count: usize) -> Self {
        self.ctors.push(CtorDef { param_count });
        self
    }

    fn build(self, declaring: Option<TypeToken>) -> TypeDef {
        TypeDef {
            name: self.name,
            visibility: self.visibility,
            declaring,
            nested: Vec::new(),
            fields: self.fields,
            methods: self.methods,
            ctors: self.ctors,
        }
    }
}

/// Builder for a whole metadata image
#[derive(Debug, Default)]
pub struct ImageBuilder {
    image: Image,
}

impl ImageBuilder {
    /// Create an empty image builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a top-level type; its token is stable for the image lifetime
    pub fn add_type(&mut self, builder: TypeBuilder) -> TypeToken {
        let token = TypeToken(self.image.types.len() as u32);
        let def = builder.build(None);
        self.image.by_name.insert(def.name.clone(), token);
        self.image.types.push(def);
        token
    }

    /// Add a type nested inside `owner`
    ///
    /// Nested types are not addressable by top-level name lookup; they are
    /// reached through `Image::nested_types`, matching how the host's
    /// compiler-generated types are found.
    pub fn add_nested_type(&mut self, owner: TypeToken, builder: TypeBuilder) -> TypeToken {
        let token = TypeToken(self.image.types.len() as u32);
        let def = builder.build(Some(owner));
        self.image.types.push(def);
        if let Some(owner_def) = self.image.types.get_mut(owner.0 as usize) {
            owner_def.nested.push(token);
        }
        token
    }

    /// Finish and return the image
    pub fn build(self) -> Image {
        self.image
    }
}
