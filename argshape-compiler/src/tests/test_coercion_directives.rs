use super::{compile, compile_with};
use crate::context::TupleMember;
use crate::{CompileOptions, Primitive, TargetStyle};
use argshape_types::{Property, TypeTable};
use pretty_assertions::assert_eq;

#[test]
fn top_level_primitives_are_reported_per_flag() {
    let mut table = TypeTable::new();
    let string = table.string();
    let number = table.number();
    let boolean = table.boolean();
    let root = table.object(vec![
        Property::required("name", string),
        Property::required("port", number),
        Property::required("verbose", boolean),
    ]);

    let (compiled, _graph) = compile(&table, root);
    assert_eq!(compiled.coercion.strings, vec!["name".to_string()]);
    assert_eq!(compiled.coercion.numbers, vec!["port".to_string()]);
    assert_eq!(compiled.coercion.booleans, vec!["verbose".to_string()]);
}

#[test]
fn nested_properties_do_not_produce_directives() {
    let mut table = TypeTable::new();
    let number = table.number();
    let inner = table.object(vec![Property::required("port", number)]);
    let root = table.object(vec![Property::required("server", inner)]);

    let (compiled, _graph) = compile(&table, root);
    assert!(compiled.coercion.numbers.is_empty());
    assert!(compiled.coercion.arrays.is_empty());
}

#[test]
fn array_flags_carry_an_element_hint() {
    let mut table = TypeTable::new();
    let number = table.number();
    let numbers = table.array(number);
    let root = table.object(vec![Property::required("ports", numbers)]);

    let (compiled, _graph) = compile(&table, root);
    assert_eq!(compiled.coercion.arrays.len(), 1);
    assert_eq!(compiled.coercion.arrays[0].key, "ports");
    assert_eq!(compiled.coercion.arrays[0].element, Some(Primitive::Number));
}

#[test]
fn memoized_array_shapes_still_emit_one_directive_per_flag() {
    let mut table = TypeTable::new();
    let s1 = table.string();
    let s2 = table.string();
    let first = table.array(s1);
    let second = table.array(s2);
    let root = table.object(vec![
        Property::required("include", first),
        Property::required("exclude", second),
    ]);

    let (compiled, graph) = compile(&table, root);
    let keys: Vec<&str> = compiled
        .coercion
        .arrays
        .iter()
        .map(|directive| directive.key.as_str())
        .collect();
    assert_eq!(keys, vec!["include", "exclude"]);
    // one root record, one shared array body, one _string
    assert_eq!(graph.len(), 3);
}

#[test]
fn exact_tuples_emit_member_hints_and_an_arity() {
    let mut table = TypeTable::new();
    let string = table.string();
    let number = table.number();
    let pair = table.tuple(vec![string, number]);
    let root = table.object(vec![Property::required("bind", pair)]);

    let (compiled, _graph) = compile(&table, root);
    assert_eq!(compiled.coercion.tuples.len(), 1);
    assert_eq!(compiled.coercion.tuples[0].key, "bind");
    assert_eq!(
        compiled.coercion.tuples[0].members,
        vec![
            TupleMember {
                index: 0,
                element: Some(Primitive::String),
            },
            TupleMember {
                index: 1,
                element: Some(Primitive::Number),
            },
        ]
    );
    assert_eq!(compiled.coercion.lengths.len(), 1);
    assert_eq!(compiled.coercion.lengths[0].key, "bind");
    assert_eq!(compiled.coercion.lengths[0].length, 2);
}

#[test]
fn ranged_tuples_emit_no_exact_arity() {
    let mut table = TypeTable::new();
    let string = table.string();
    let ranged = table.tuple_with_optional(vec![(string, false), (string, true)]);
    let root = table.object(vec![Property::required("span", ranged)]);

    let (compiled, _graph) = compile(&table, root);
    assert_eq!(compiled.coercion.tuples.len(), 1);
    assert!(compiled.coercion.lengths.is_empty());
}

#[test]
fn a_positional_tuple_root_uses_the_reserved_key() {
    let mut table = TypeTable::new();
    let string = table.string();
    let number = table.number();
    let pair = table.tuple(vec![string, number]);

    let (compiled, _graph) = compile_with(
        &table,
        pair,
        CompileOptions::default(),
        TargetStyle::Positional,
    )
    .expect("positional root should compile");
    assert_eq!(compiled.coercion.tuples[0].key, "_");
    assert_eq!(compiled.coercion.lengths[0].key, "_");
}

#[test]
fn uniform_literal_unions_hint_their_common_primitive() {
    let mut table = TypeTable::new();
    let yes = table.string_literal("yes");
    let no = table.string_literal("no");
    let answer = table.union(vec![yes, no]);
    let root = table.object(vec![Property::required("confirm", answer)]);

    let (compiled, _graph) = compile(&table, root);
    assert_eq!(compiled.coercion.strings, vec!["confirm".to_string()]);
}
