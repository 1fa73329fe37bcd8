//! Splint Host Metadata
//!
//! This crate models the host runtime's reflection surface: a metadata
//! image of types, fields, methods, and constructors, addressed through the
//! opaque tokens defined in `splint-bytecode`. Patches introspect the image
//! to locate their targets; the host runtime reads method bodies out of it
//! for execution.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod builder;
pub mod image;

pub use builder::{ImageBuilder, TypeBuilder};
pub use image::{CtorDef, FieldDef, Image, MethodDef, TypeDef, Visibility};
