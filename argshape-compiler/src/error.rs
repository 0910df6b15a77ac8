//! Compile-time error types for the validator compiler
//!
//! An error here aborts the whole compilation with no partial output.
//! Data-driven validation
//! failures are a different universe entirely: they are values produced
//! by the compiled graph at runtime, never `Err` results here.

use miette::Diagnostic;
use thiserror::Error;

/// Fatal errors raised while compiling a type into validators
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("could not compile a validator: unsupported type category {kind}")]
    #[diagnostic(
        code(argshape::compile::unsupported_type),
        help("only structural shapes (objects, arrays, tuples, unions, intersections, literals, primitives) can be validated")
    )]
    UnsupportedType { kind: String },

    #[error("classes cannot be validated")]
    #[diagnostic(
        code(argshape::compile::class_not_supported),
        help("enable `ignore_classes` to treat class-typed properties as always valid")
    )]
    ClassNotSupported,

    #[error("encountered a method declaration, but methods are not supported")]
    #[diagnostic(
        code(argshape::compile::method_not_supported),
        help("enable `ignore_methods` to treat method properties as always valid")
    )]
    MethodNotSupported { property: String },

    #[error("unbound type parameter `{name}` with no declared default")]
    #[diagnostic(code(argshape::compile::unbound_type_parameter))]
    UnboundTypeParameter { name: String },

    #[error("property `{key}` does not exist on the indexed type")]
    #[diagnostic(code(argshape::compile::unknown_indexed_key))]
    UnknownIndexedKey { key: String },

    #[error("tuple index {index} is out of bounds for a tuple of length {length}")]
    #[diagnostic(code(argshape::compile::tuple_index_out_of_bounds))]
    TupleIndexOutOfBounds { index: usize, length: usize },

    #[error("type is nested too deeply (limit {limit})")]
    #[diagnostic(
        code(argshape::compile::depth_limit),
        help("deeply self-referential types cannot be expanded into a finite validator graph")
    )]
    DepthLimitExceeded { limit: usize },
}

/// Result alias used throughout the compiler
pub type CompileResult<T> = Result<T, CompileError>;
