//! Validator graph evaluator
//!
//! Interprets compiled validators against `serde_json::Value` input.
//! The error path lives here, not in the compiler: segments are pushed
//! before descending into a nested value and popped immediately after,
//! on success and failure alike, so sibling branches never leak
//! segments into each other. Message templates render lazily at the
//! failure point, while the failing frame's path is still on the stack.

use argshape_compiler::{
    ErrorMessage, LiteralValue, Primitive, Segment, ValidatorGraph, ValidatorKind,
};
use argshape_types::LiteralNumber;
use serde_json::Value;

use crate::error::{RuntimeError, RuntimeResult};

/// Runtime type name rendered by the `actualType` placeholder
pub fn type_name(value: &Value) -> &'static str {
    match value {
        // Absence and JSON null are the same value in this universe
        Value::Null => "undefined",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) | Value::Object(_) => "object",
    }
}

/// Walks a validator graph over one value
pub struct Evaluator<'a> {
    graph: &'a ValidatorGraph,
    path: Vec<String>,
}

impl<'a> Evaluator<'a> {
    pub fn new(graph: &'a ValidatorGraph) -> Self {
        Self {
            graph,
            path: Vec::new(),
        }
    }

    /// Run the named validator. `Ok(None)` is acceptance, `Ok(Some)` the
    /// first rendered failure; `Err` only when the graph is corrupt.
    pub fn validate(&mut self, function: &str, value: &Value) -> RuntimeResult<Option<String>> {
        let validator = self
            .graph
            .get(function)
            .ok_or_else(|| RuntimeError::UnknownFunction {
                name: function.to_string(),
            })?;
        // Clone is cheap relative to descent and frees the graph borrow
        let kind = validator.kind.clone();
        match kind {
            ValidatorKind::Accept => Ok(None),
            ValidatorKind::Reject { message } => Ok(Some(self.render(&message, value))),
            ValidatorKind::Primitive { primitive, message } => {
                if primitive_matches(primitive, value) {
                    Ok(None)
                } else {
                    Ok(Some(self.render(&message, value)))
                }
            }
            ValidatorKind::Literal { value: expected, message } => {
                if literal_matches(&expected, value) {
                    Ok(None)
                } else {
                    Ok(Some(self.render(&message, value)))
                }
            }
            ValidatorKind::NonPrimitive { message } => match value {
                Value::Array(_) | Value::Object(_) => Ok(None),
                _ => Ok(Some(self.render(&message, value))),
            },
            ValidatorKind::Object {
                mismatch,
                properties,
                string_index,
                superfluous,
            } => {
                let Value::Object(map) = value else {
                    return Ok(Some(self.render(&mismatch, value)));
                };
                for property in &properties {
                    let entry = map.get(&property.name).filter(|v| !v.is_null());
                    match entry {
                        None if property.optional => continue,
                        None => {
                            self.path.push(property.name.clone());
                            let message = self.render(&property.missing, value);
                            self.path.pop();
                            return Ok(Some(message));
                        }
                        Some(inner) => {
                            if let Some(message) =
                                self.descend(property.name.clone(), &property.function, inner)?
                            {
                                return Ok(Some(message));
                            }
                        }
                    }
                }
                if let Some(index_fn) = &string_index {
                    for (key, inner) in map {
                        if properties.iter().any(|property| property.name == *key) {
                            continue;
                        }
                        if let Some(message) = self.descend(key.clone(), index_fn, inner)? {
                            return Ok(Some(message));
                        }
                    }
                }
                // Unknown keys are checked only once every declared
                // property has passed
                if let Some(check) = &superfluous {
                    for key in map.keys() {
                        if !check.allowed.iter().any(|allowed| allowed == key) {
                            return Ok(Some(format!("unknown flag --{key} is not allowed")));
                        }
                    }
                }
                Ok(None)
            }
            ValidatorKind::Array { mismatch, element } => {
                let Value::Array(items) = value else {
                    return Ok(Some(self.render(&mismatch, value)));
                };
                for (index, item) in items.iter().enumerate() {
                    if let Some(message) = self.descend(format!("[{index}]"), &element, item)? {
                        return Ok(Some(message));
                    }
                }
                Ok(None)
            }
            ValidatorKind::Tuple {
                min_length,
                max_length,
                arity,
                elements,
            } => {
                // A non-array renders the arity message with length 0
                let items = match value {
                    Value::Array(items)
                        if items.len() >= min_length && items.len() <= max_length =>
                    {
                        items
                    }
                    _ => return Ok(Some(self.render(&arity, value))),
                };
                for (index, (item, element)) in items.iter().zip(&elements).enumerate() {
                    if let Some(message) = self.descend(format!("[{index}]"), element, item)? {
                        return Ok(Some(message));
                    }
                }
                Ok(None)
            }
            ValidatorKind::Disjunction {
                members,
                no_alternatives,
            } => {
                for member in &members {
                    // Member failures are discarded: one generic message
                    // stands in for all of them
                    if self.validate(member, value)?.is_none() {
                        return Ok(None);
                    }
                }
                Ok(Some(self.render(&no_alternatives, value)))
            }
            ValidatorKind::Conjunction {
                members,
                superfluous,
            } => {
                for member in &members {
                    if let Some(message) = self.validate(member, value)? {
                        return Ok(Some(message));
                    }
                }
                // Combined unknown-key loop runs after every member passes
                if let (Some(check), Value::Object(map)) = (&superfluous, value) {
                    for key in map.keys() {
                        if !check.allowed.iter().any(|allowed| allowed == key) {
                            return Ok(Some(format!("unknown flag --{key} is not allowed")));
                        }
                    }
                }
                Ok(None)
            }
        }
    }

    /// Push a path segment, validate the nested value, pop the segment
    fn descend(
        &mut self,
        segment: String,
        function: &str,
        value: &Value,
    ) -> RuntimeResult<Option<String>> {
        self.path.push(segment);
        let result = self.validate(function, value);
        self.path.pop();
        result
    }

    /// Joined error path: `.` between segments, none before `[`
    fn joined_path(&self) -> String {
        let mut out = String::new();
        for segment in &self.path {
            if !out.is_empty() && !segment.starts_with('[') {
                out.push('.');
            }
            out.push_str(segment);
        }
        out
    }

    fn render(&self, message: &ErrorMessage, value: &Value) -> String {
        let mut out = String::new();
        for segment in &message.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Path => out.push_str(&self.joined_path()),
                Segment::ActualValue => {
                    out.push_str(&serde_json::to_string(value).unwrap_or_default());
                }
                Segment::ActualType => out.push_str(type_name(value)),
                Segment::ActualLength => {
                    let length = value.as_array().map(Vec::len).unwrap_or(0);
                    out.push_str(&length.to_string());
                }
                Segment::ExpectedType(text) | Segment::ExpectedValue(text) => out.push_str(text),
                Segment::ExpectedLength(n)
                | Segment::ExpectedMinLength(n)
                | Segment::ExpectedMaxLength(n) => out.push_str(&n.to_string()),
            }
        }
        out
    }
}

fn primitive_matches(primitive: Primitive, value: &Value) -> bool {
    match primitive {
        Primitive::String => value.is_string(),
        Primitive::Number => value.is_number(),
        Primitive::Boolean => value.is_boolean(),
        // No arbitrary-precision runtime representation: bigint means
        // "an integer" here
        Primitive::BigInt => value.is_i64() || value.is_u64(),
    }
}

fn literal_matches(expected: &LiteralValue, value: &Value) -> bool {
    match expected {
        LiteralValue::Str(text) => value.as_str() == Some(text),
        LiteralValue::Number(LiteralNumber::Int(n)) => {
            value.as_i64() == Some(*n) || value.as_f64() == Some(*n as f64)
        }
        LiteralValue::Number(LiteralNumber::Float(n)) => value.as_f64() == Some(*n),
        LiteralValue::Bool(b) => value.as_bool() == Some(*b),
        LiteralValue::Null | LiteralValue::Undefined => value.is_null(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argshape_compiler::{
        compile_validator, CompileOptions, CompileResult, CompiledRoot, TargetStyle,
    };
    use argshape_types::{Property, TypeId, TypeTable};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn compile(
        table: &TypeTable,
        root: TypeId,
        style: TargetStyle,
    ) -> CompileResult<(CompiledRoot, ValidatorGraph)> {
        let mut graph = ValidatorGraph::new();
        let compiled = compile_validator(table, root, CompileOptions::default(), style, &mut graph)?;
        Ok((compiled, graph))
    }

    fn check(graph: &ValidatorGraph, entry: &str, value: &Value) -> Option<String> {
        Evaluator::new(graph)
            .validate(entry, value)
            .expect("graph should be intact")
    }

    #[test]
    fn primitive_mismatch_renders_value_and_type() {
        let mut table = TypeTable::new();
        let boolean = table.boolean();
        let root = table.object(vec![Property::required("hello", boolean)]);
        let (compiled, graph) = compile(&table, root, TargetStyle::Flags).unwrap();

        assert_eq!(check(&graph, &compiled.entry, &json!({"hello": true})), None);
        assert_eq!(
            check(&graph, &compiled.entry, &json!({"hello": "world"})),
            Some("--hello must be of type boolean. Received \"world\" of type string".to_string())
        );
    }

    #[test]
    fn required_properties_fire_in_declaration_order() {
        let mut table = TypeTable::new();
        let string = table.string();
        let number = table.number();
        let root = table.object(vec![
            Property::required("first", string),
            Property::required("second", number),
        ]);
        let (compiled, graph) = compile(&table, root, TargetStyle::Flags).unwrap();

        // Both properties are wrong; only the first failure surfaces
        assert_eq!(
            check(&graph, &compiled.entry, &json!({"first": 1, "second": "x"})),
            Some("--first must be of type string. Received 1 of type number".to_string())
        );
        assert_eq!(
            check(&graph, &compiled.entry, &json!({})),
            Some("--first is required but missing".to_string())
        );
    }

    #[test]
    fn optional_properties_accept_absence_but_not_bad_values() {
        let mut table = TypeTable::new();
        let number = table.number();
        let root = table.object(vec![Property::optional("port", number)]);
        let (compiled, graph) = compile(&table, root, TargetStyle::Flags).unwrap();

        assert_eq!(check(&graph, &compiled.entry, &json!({})), None);
        assert_eq!(check(&graph, &compiled.entry, &json!({"port": null})), None);
        assert_eq!(
            check(&graph, &compiled.entry, &json!({"port": "x"})),
            Some("--port must be of type number. Received \"x\" of type string".to_string())
        );
    }

    #[test]
    fn unknown_keys_are_rejected_by_name() {
        let mut table = TypeTable::new();
        let boolean = table.boolean();
        let root = table.object(vec![Property::optional("flag", boolean)]);
        let (compiled, graph) = compile(&table, root, TargetStyle::Flags).unwrap();

        assert_eq!(
            check(&graph, &compiled.entry, &json!({"flag": true, "unknown": true})),
            Some("unknown flag --unknown is not allowed".to_string())
        );
    }

    #[test]
    fn failing_declared_properties_win_over_unknown_keys() {
        let mut table = TypeTable::new();
        let boolean = table.boolean();
        let root = table.object(vec![Property::required("flag", boolean)]);
        let (compiled, graph) = compile(&table, root, TargetStyle::Flags).unwrap();

        // The unknown key is present, but the declared property fails
        // first in declaration order
        assert_eq!(
            check(
                &graph,
                &compiled.entry,
                &json!({"flag": "notabool", "unknown": true})
            ),
            Some(
                "--flag must be of type boolean. Received \"notabool\" of type string".to_string()
            )
        );
        assert_eq!(
            check(&graph, &compiled.entry, &json!({"flag": true, "unknown": true})),
            Some("unknown flag --unknown is not allowed".to_string())
        );
    }

    #[test]
    fn failing_intersection_members_win_over_unknown_keys() {
        let mut table = TypeTable::new();
        let string = table.string();
        let number = table.number();
        let host = table.object(vec![Property::required("host", string)]);
        let port = table.object(vec![Property::required("port", number)]);
        let both = table.intersection(vec![host, port]);
        let (compiled, graph) = compile(&table, both, TargetStyle::Flags).unwrap();

        assert_eq!(
            check(
                &graph,
                &compiled.entry,
                &json!({"host": 1, "port": 80, "extra": true})
            ),
            Some("--host must be of type string. Received 1 of type number".to_string())
        );
        assert_eq!(
            check(
                &graph,
                &compiled.entry,
                &json!({"host": "local", "port": 80, "extra": true})
            ),
            Some("unknown flag --extra is not allowed".to_string())
        );
    }

    #[test]
    fn string_index_signatures_validate_every_undeclared_key() {
        let mut table = TypeTable::new();
        let string = table.string();
        let number = table.number();
        let root = table.open_object(vec![Property::required("name", string)], number);
        let (compiled, graph) = compile(&table, root, TargetStyle::Flags).unwrap();

        assert_eq!(
            check(
                &graph,
                &compiled.entry,
                &json!({"name": "x", "first": 1, "second": 2})
            ),
            None
        );
        // Declared properties keep their own type; the index signature
        // never re-checks them
        assert_eq!(
            check(&graph, &compiled.entry, &json!({"name": "x", "extra": "bad"})),
            Some("--extra must be of type number. Received \"bad\" of type string".to_string())
        );
        // First failing key in input order surfaces
        assert_eq!(
            check(
                &graph,
                &compiled.entry,
                &json!({"name": "x", "first": "bad", "second": "worse"})
            ),
            Some("--first must be of type number. Received \"bad\" of type string".to_string())
        );
    }

    #[test]
    fn nested_failure_paths_reflect_the_whole_chain() {
        let mut table = TypeTable::new();
        let number = table.number();
        let string = table.string();
        let pair = table.tuple(vec![string, number]);
        let rows = table.array(pair);
        let root = table.object(vec![Property::required("rows", rows)]);
        let (compiled, graph) = compile(&table, root, TargetStyle::Flags).unwrap();

        assert_eq!(
            check(
                &graph,
                &compiled.entry,
                &json!({"rows": [["a", 1], ["b", "oops"]]})
            ),
            Some(
                "--rows[1][1] must be of type number. Received \"oops\" of type string"
                    .to_string()
            )
        );
        // A sibling branch that already passed leaves no residue
        assert_eq!(
            check(&graph, &compiled.entry, &json!({"rows": [["a", 1]]})),
            None
        );
    }

    #[test]
    fn union_failures_collapse_to_one_generic_message() {
        let mut table = TypeTable::new();
        let yes = table.string_literal("yes");
        let no = table.string_literal("no");
        let answer = table.union(vec![yes, no]);
        let root = table.object(vec![Property::required("confirm", answer)]);
        let (compiled, graph) = compile(&table, root, TargetStyle::Flags).unwrap();

        assert_eq!(
            check(&graph, &compiled.entry, &json!({"confirm": "yes"})),
            None
        );
        assert_eq!(
            check(&graph, &compiled.entry, &json!({"confirm": "maybe"})),
            Some("--confirm: there are no valid alternatives".to_string())
        );
    }

    #[test]
    fn positional_tuples_render_argument_paths_and_bare_arity() {
        let mut table = TypeTable::new();
        let string = table.string();
        let pair = table.tuple(vec![string, string]);
        let (compiled, graph) = compile(&table, pair, TargetStyle::Positional).unwrap();

        assert_eq!(
            check(&graph, &compiled.entry, &json!([])),
            Some("requires exactly 2 arguments. Received [] of length 0".to_string())
        );
        assert_eq!(
            check(&graph, &compiled.entry, &json!(["a", 2])),
            Some("argument at [1] must be of type string. Received 2 of type number".to_string())
        );
        assert_eq!(check(&graph, &compiled.entry, &json!(["a", "b"])), None);
    }

    #[test]
    fn ranged_tuples_report_both_bounds() {
        let mut table = TypeTable::new();
        let string = table.string();
        let ranged =
            table.tuple_with_optional(vec![(string, false), (string, false), (string, true)]);
        let (compiled, graph) = compile(&table, ranged, TargetStyle::Positional).unwrap();

        assert_eq!(
            check(&graph, &compiled.entry, &json!(["leet", "leet", "leet", "leet"])),
            Some(
                "requires 2 to 3 arguments. Received [\"leet\",\"leet\",\"leet\",\"leet\"] of length 4"
                    .to_string()
            )
        );
        assert_eq!(check(&graph, &compiled.entry, &json!(["a", "b"])), None);
    }

    #[test]
    fn unknown_entry_names_are_a_graph_fault() {
        let graph = ValidatorGraph::new();
        let error = Evaluator::new(&graph)
            .validate("f:_missing", &json!(null))
            .expect_err("missing function should fault");
        assert_eq!(
            error,
            RuntimeError::UnknownFunction {
                name: "f:_missing".to_string()
            }
        );
    }
}
