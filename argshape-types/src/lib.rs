//! Structural type model for argshape
//!
//! This crate plays the role of the "host type system" the validator
//! compiler queries: an interner (`TypeTable`) hands out opaque `TypeId`
//! handles and answers read-only capability queries about them (kind,
//! properties, index signatures, generic arguments, literal values).
//! The compiler never mutates a type after construction; a table is
//! scoped to one compilation run.

mod types;

pub use types::{
    LiteralNumber, ObjectType, Property, TupleElement, TupleType, TypeId, TypeKind, TypeTable,
};
