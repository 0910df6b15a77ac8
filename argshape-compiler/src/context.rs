//! Per-compilation mutable state threaded through the recursion
//!
//! One fresh context per root type per run. The runtime error path is
//! *not* here; it lives in the evaluator, because error paths are
//! resolved when the compiled validator executes, not when it is
//! compiled. What the compiler does track is the property-key path,
//! which keys the coercion directives handed to the tokenizer.

use std::collections::HashMap;

use argshape_types::{TypeId, TypeTable};

use crate::error::{CompileError, CompileResult};
use crate::graph::{Primitive, ValidatorGraph};
use crate::message::{MessageFactory, TargetStyle};

/// Recursion guard: types nested deeper than this fail compilation
/// instead of exhausting the call stack.
pub const MAX_TYPE_DEPTH: usize = 128;

/// Compiler options affecting emitted validators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    /// Compile an accept-everything validator instead of the real graph
    pub short_circuit: bool,
    /// Treat class-typed properties as always valid instead of failing
    pub ignore_classes: bool,
    /// Treat method properties as always valid instead of failing
    pub ignore_methods: bool,
    /// Reject keys outside the declared property set
    pub disallow_superfluous_properties: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            short_circuit: false,
            ignore_classes: true,
            ignore_methods: true,
            disallow_superfluous_properties: true,
        }
    }
}

/// A flag whose value is a homogeneous array
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayDirective {
    pub key: String,
    /// Element primitive the tokenizer should coerce raw tokens into
    pub element: Option<Primitive>,
}

/// Per-position element kind of a tuple-valued key
#[derive(Debug, Clone, PartialEq)]
pub struct TupleMember {
    pub index: usize,
    pub element: Option<Primitive>,
}

/// A flag whose value is a fixed-position tuple
#[derive(Debug, Clone, PartialEq)]
pub struct TupleDirective {
    pub key: String,
    pub members: Vec<TupleMember>,
}

/// Exact arity for a tuple-valued key (`narg` in the tokenizer)
#[derive(Debug, Clone, PartialEq)]
pub struct LengthDirective {
    pub key: String,
    pub length: usize,
}

/// Directives accumulated while compiling, consumed by the tokenizer
///
/// Append-only during one compilation pass. All raw tokens start out as
/// strings; these hints tell the tokenizer which keys to coerce before
/// validation runs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CoercionSink {
    pub arrays: Vec<ArrayDirective>,
    pub tuples: Vec<TupleDirective>,
    pub lengths: Vec<LengthDirective>,
    pub booleans: Vec<String>,
    pub numbers: Vec<String>,
    pub strings: Vec<String>,
}

impl CoercionSink {
    pub fn record_array(&mut self, key: String, element: Option<Primitive>) {
        self.arrays.push(ArrayDirective { key, element });
    }

    pub fn record_tuple(&mut self, key: String, members: Vec<TupleMember>) {
        self.tuples.push(TupleDirective { key, members });
    }

    pub fn record_length(&mut self, key: String, length: usize) {
        self.lengths.push(LengthDirective { key, length });
    }

    /// Record a top-level key's primitive kind for bare-flag handling
    pub fn record_key_primitive(&mut self, key: String, primitive: Primitive) {
        let list = match primitive {
            Primitive::Boolean => &mut self.booleans,
            Primitive::Number | Primitive::BigInt => &mut self.numbers,
            Primitive::String => &mut self.strings,
        };
        if !list.contains(&key) {
            list.push(key);
        }
    }
}

/// Mutable state threaded through one validator compilation
pub struct VisitorContext<'a> {
    pub table: &'a TypeTable,
    pub graph: &'a mut ValidatorGraph,
    pub options: CompileOptions,
    pub messages: MessageFactory,
    /// Property names pushed while descending into object properties;
    /// the first segment is the top-level flag a directive applies to
    pub key_path: Vec<String>,
    /// Generic substitution maps, innermost scope last
    pub type_mapper_stack: Vec<HashMap<TypeId, TypeId>>,
    /// Guard against a type reference expanding straight into itself
    pub previous_type_reference: Option<TypeId>,
    pub coercion: CoercionSink,
    pub depth: usize,
}

impl<'a> VisitorContext<'a> {
    pub fn new(
        table: &'a TypeTable,
        graph: &'a mut ValidatorGraph,
        options: CompileOptions,
        style: TargetStyle,
    ) -> Self {
        Self {
            table,
            graph,
            options,
            messages: MessageFactory::new(style),
            key_path: Vec::new(),
            type_mapper_stack: Vec::new(),
            previous_type_reference: None,
            coercion: CoercionSink::default(),
            depth: 0,
        }
    }

    /// Top-level key the current coercion directive applies to; the
    /// reserved positional key when compiling a root with no flag name
    pub fn coercion_key(&self) -> String {
        self.key_path
            .first()
            .cloned()
            .unwrap_or_else(|| "_".to_string())
    }

    /// Directives only make sense for keys the tokenizer can address:
    /// top-level flags and the positional root
    pub fn at_coercible_depth(&self) -> bool {
        self.key_path.len() <= 1
    }

    /// Resolve a type parameter against the mapper stack, innermost
    /// scope first. The first map containing the parameter wins.
    pub fn resolve_parameter(&self, parameter: TypeId) -> Option<TypeId> {
        self.type_mapper_stack
            .iter()
            .rev()
            .find_map(|mapping| mapping.get(&parameter).copied())
    }

    /// Bump the recursion depth, failing cleanly on pathological nesting
    pub fn enter(&mut self) -> CompileResult<()> {
        self.depth += 1;
        if self.depth > MAX_TYPE_DEPTH {
            return Err(CompileError::DepthLimitExceeded {
                limit: MAX_TYPE_DEPTH,
            });
        }
        Ok(())
    }

    pub fn leave(&mut self) {
        self.depth -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn innermost_mapping_wins() {
        let mut table = TypeTable::new();
        let graph = &mut ValidatorGraph::new();
        let param = table.parameter("T", None);
        let string = table.string();
        let number = table.number();

        let mut ctx =
            VisitorContext::new(&table, graph, CompileOptions::default(), TargetStyle::Flags);
        ctx.type_mapper_stack.push(HashMap::from([(param, string)]));
        ctx.type_mapper_stack.push(HashMap::from([(param, number)]));
        assert_eq!(ctx.resolve_parameter(param), Some(number));
        ctx.type_mapper_stack.pop();
        assert_eq!(ctx.resolve_parameter(param), Some(string));
    }

    #[test]
    fn coercion_key_defaults_to_the_positional_holder() {
        let table = TypeTable::new();
        let graph = &mut ValidatorGraph::new();
        let ctx = VisitorContext::new(
            &table,
            graph,
            CompileOptions::default(),
            TargetStyle::Positional,
        );
        assert_eq!(ctx.coercion_key(), "_");
    }
}
