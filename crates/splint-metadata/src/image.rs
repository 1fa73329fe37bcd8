//! Host metadata image
//!
//! The image is a flat registry of type definitions. Tokens are indices
//! into it, so looking a handle up twice always yields the same entry and
//! handles resolved from the same name compare equal.

use rustc_hash::FxHashMap;
use splint_bytecode::{CtorToken, FieldToken, MethodBody, MethodToken, TypeToken};

/// Member visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Visible outside the declaring assembly
    Public,
    /// Compiler- or implementation-private
    Private,
}

/// An instance or static field of a type
#[derive(Debug, Clone)]
pub struct FieldDef {
    /// Field name
    pub name: String,
    /// Member visibility
    pub visibility: Visibility,
    /// Whether the field is static
    pub is_static: bool,
}

/// A method of a type
#[derive(Debug, Clone)]
pub struct MethodDef {
    /// Method name
    pub name: String,
    /// Compiled method body
    pub body: MethodBody,
}

/// A constructor of a type
#[derive(Debug, Clone)]
pub struct CtorDef {
    /// Number of parameters
    pub param_count: usize,
}

/// A type definition in the image
#[derive(Debug, Clone)]
pub struct TypeDef {
    /// Type name
    pub name: String,
    /// Type visibility
    pub visibility: Visibility,
    /// Declaring type, for nested types
    pub declaring: Option<TypeToken>,
    /// Nested types declared inside this one
    pub nested: Vec<TypeToken>,
    /// Field definitions, in declaration order
    pub fields: Vec<FieldDef>,
    /// Method definitions
    pub methods: Vec<MethodDef>,
    /// Constructor definitions
    pub ctors: Vec<CtorDef>,
}

/// The host metadata image
#[derive(Debug, Clone, Default)]
pub struct Image {
    pub(crate) types: Vec<TypeDef>,
    pub(crate) by_name: FxHashMap<String, TypeToken>,
}

impl Image {
    /// Get a type definition by token
    pub fn type_def(&self, token: TypeToken) -> Option<&TypeDef> {
        self.types.get(token.0 as usize)
    }

    /// Get a type's name by token
    pub fn type_name(&self, token: TypeToken) -> Option<&str> {
        self.type_def(token).map(|t| t.name.as_str())
    }

    /// Look up a top-level type by name
    pub fn type_by_name(&self, name: &str) -> Option<TypeToken> {
        self.by_name.get(name).copied()
    }

    /// Enumerate nested types of a type, filtered by visibility
    pub fn nested_types(
        &self,
        token: TypeToken,
        visibility: Visibility,
    ) -> impl Iterator<Item = TypeToken> + '_ {
        self.type_def(token)
            .map(|t| t.nested.as_slice())
            .unwrap_or(&[])
            .iter()
            .copied()
            .filter(move |&n| {
                self.type_def(n)
                    .is_some_and(|d| d.visibility == visibility)
            })
    }

    /// Enumerate instance fields of a type, filtered by visibility
    pub fn instance_fields(
        &self,
        token: TypeToken,
        visibility: Visibility,
    ) -> impl Iterator<Item = FieldToken> + '_ {
        self.type_def(token)
            .map(|t| t.fields.as_slice())
            .unwrap_or(&[])
            .iter()
            .enumerate()
            .filter(move |(_, f)| !f.is_static && f.visibility == visibility)
            .map(move |(index, _)| FieldToken {
                owner: token,
                index: index as u32,
            })
    }

    /// Get a field definition by token
    pub fn field_def(&self, token: FieldToken) -> Option<&FieldDef> {
        self.type_def(token.owner)?.fields.get(token.index as usize)
    }

    /// Number of field slots a fresh instance of the type carries
    pub fn field_count(&self, token: TypeToken) -> usize {
        self.type_def(token).map(|t| t.fields.len()).unwrap_or(0)
    }

    /// Look up a method by name on a type
    pub fn method(&self, token: TypeToken, name: &str) -> Option<MethodToken> {
        let def = self.type_def(token)?;
        let index = def.methods.iter().position(|m| m.name == name)?;
        Some(MethodToken {
            owner: token,
            index: index as u32,
        })
    }

    /// Get a method definition by token
    pub fn method_def(&self, token: MethodToken) -> Option<&MethodDef> {
        self.type_def(token.owner)?
            .methods
            .get(token.index as usize)
    }

    /// Get a method body by token
    pub fn method_body(&self, token: MethodToken) -> Option<&MethodBody> {
        self.method_def(token).map(|m| &m.body)
    }

    /// Get a mutable method body by token
    ///
    /// This is the hook point used when finalizing a method through
    /// installed transpilers.
    pub fn method_body_mut(&mut self, token: MethodToken) -> Option<&mut MethodBody> {
        self.types
            .get_mut(token.owner.0 as usize)?
            .methods
            .get_mut(token.index as usize)
            .map(|m| &mut m.body)
    }

    /// Resolve the zero-argument constructor of a type
    pub fn zero_arg_constructor(&self, token: TypeToken) -> Option<CtorToken> {
        let def = self.type_def(token)?;
        let index = def.ctors.iter().position(|c| c.param_count == 0)?;
        Some(CtorToken {
            owner: token,
            index: index as u32,
        })
    }

    /// Number of types in the image
    pub fn type_count(&self) -> usize {
        self.types.len()
    }
}
