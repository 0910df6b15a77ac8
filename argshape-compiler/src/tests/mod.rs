//! Integration tests for the validator compiler
//!
//! These drive `compile_validator` over hand-built type tables and
//! inspect the resulting graph, entry names, and coercion directives.

mod test_coercion_directives;

use crate::{
    compile_validator, CompileOptions, CompileResult, CompiledRoot, TargetStyle, ValidatorGraph,
};
use argshape_types::{TypeId, TypeTable};

fn compile(table: &TypeTable, root: TypeId) -> (CompiledRoot, ValidatorGraph) {
    compile_with(table, root, CompileOptions::default(), TargetStyle::Flags)
        .expect("compilation should succeed")
}

fn compile_with(
    table: &TypeTable,
    root: TypeId,
    options: CompileOptions,
    style: TargetStyle,
) -> CompileResult<(CompiledRoot, ValidatorGraph)> {
    let mut graph = ValidatorGraph::new();
    let compiled = compile_validator(table, root, options, style, &mut graph)?;
    Ok((compiled, graph))
}
