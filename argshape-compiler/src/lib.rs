//! Compiles structural types into validator graphs
//!
//! The entry point is [`compile_validator`]: given a type table, a root
//! type, and a target rendering style, it lowers the type into a set of
//! named validator functions registered in a shared [`ValidatorGraph`],
//! returning the entry function's name together with the coercion
//! directives the tokenizer needs. Compiling several roots against the
//! same graph shares structurally identical validators between them.

pub mod context;
pub mod error;
pub mod graph;
pub mod indexed_access;
pub mod keyof;
pub mod message;
pub mod signature;
pub mod string_keyof;
pub mod visitor;

#[cfg(test)]
mod tests;

pub use context::{CoercionSink, CompileOptions, VisitorContext, MAX_TYPE_DEPTH};
pub use error::{CompileError, CompileResult};
pub use graph::{LiteralValue, Primitive, Validator, ValidatorGraph, ValidatorKind};
pub use message::{ErrorMessage, Segment, TargetStyle};

use argshape_types::{TypeId, TypeTable};

/// Entry point and tokenizer directives of one compiled root type
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledRoot {
    /// Name of the root validator in the shared graph
    pub entry: String,
    /// Coercion directives collected while compiling this root
    pub coercion: CoercionSink,
}

/// Compile `root` into `graph` and return its entry point
pub fn compile_validator(
    table: &TypeTable,
    root: TypeId,
    options: CompileOptions,
    style: TargetStyle,
    graph: &mut ValidatorGraph,
) -> CompileResult<CompiledRoot> {
    let mut ctx = VisitorContext::new(table, graph, options, style);
    let entry = if options.short_circuit {
        visitor::visit_short_circuit(&mut ctx)
    } else {
        visitor::visit_type(&mut ctx, root)?
    };
    Ok(CompiledRoot {
        entry,
        coercion: ctx.coercion,
    })
}
