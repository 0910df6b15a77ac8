//! Type classifier, dispatcher, and structural validator compilers
//!
//! `visit_type` examines a type's structural category in a fixed priority
//! order and routes to the matching compiler rule. Each rule derives the
//! canonical name for its type, claims it in the registry (before the
//! body exists, so recursive shapes can call themselves), compiles the
//! body (recursing through this dispatcher for nested types) and
//! registers the finished definition. The returned value is always the
//! validator's name.

use argshape_types::{ObjectType, TupleType, TypeId, TypeKind};

use crate::context::{TupleMember, VisitorContext};
use crate::error::{CompileError, CompileResult};
use crate::graph::{LiteralValue, Primitive, PropertyCheck, SuperfluousCheck, ValidatorKind};
use crate::signature::{reference_mapping, type_signature};
use crate::{indexed_access, keyof, string_keyof};

/// Compile the validator for a type and return its name
pub fn visit_type(ctx: &mut VisitorContext<'_>, ty: TypeId) -> CompileResult<String> {
    ctx.enter()?;
    let result = dispatch(ctx, ty);
    ctx.leave();
    result
}

/// Fixed-priority classification; first match wins
fn dispatch(ctx: &mut VisitorContext<'_>, ty: TypeId) -> CompileResult<String> {
    let table = ctx.table;
    match table.kind(ty) {
        TypeKind::Any => Ok(accept_validator(ctx, "_any")),
        TypeKind::Unknown => Ok(accept_validator(ctx, "_unknown")),
        TypeKind::Never => Ok(visit_never(ctx)),
        TypeKind::Null => Ok(literal_validator(ctx, LiteralValue::Null)),
        TypeKind::Undefined => Ok(literal_validator(ctx, LiteralValue::Undefined)),
        TypeKind::Number => Ok(primitive_validator(ctx, Primitive::Number)),
        TypeKind::BigInt => Ok(primitive_validator(ctx, Primitive::BigInt)),
        TypeKind::Boolean => Ok(primitive_validator(ctx, Primitive::Boolean)),
        TypeKind::String => Ok(primitive_validator(ctx, Primitive::String)),
        TypeKind::BooleanLiteral(value) => Ok(literal_validator(ctx, LiteralValue::Bool(*value))),
        TypeKind::Reference { target, args } if ctx.previous_type_reference != Some(ty) => {
            visit_type_reference(ctx, ty, *target, args.clone())
        }
        TypeKind::Parameter { name, default } => {
            visit_type_parameter(ctx, ty, name.clone(), *default)
        }
        // Mid-expansion of this exact reference: treat it as its target's
        // object shape (the instantiation mapping is already on the stack)
        TypeKind::Reference { target, .. } => visit_type(ctx, *target),
        TypeKind::Object(object) => visit_object(ctx, ty, object.clone()),
        TypeKind::Tuple(tuple) => visit_tuple(ctx, ty, tuple.clone()),
        TypeKind::StringLiteral(value) => {
            Ok(literal_validator(ctx, LiteralValue::Str(value.clone())))
        }
        TypeKind::NumberLiteral(value) => {
            Ok(literal_validator(ctx, LiteralValue::Number(*value)))
        }
        TypeKind::Union(members) => visit_union(ctx, ty, members.clone()),
        TypeKind::Intersection(members) => visit_intersection(ctx, ty, members.clone()),
        TypeKind::NonPrimitive => Ok(visit_non_primitive(ctx)),
        TypeKind::Index(inner) => keyof::visit_keyof(ctx, *inner),
        TypeKind::IndexedAccess { object, index } => {
            indexed_access::visit_indexed_access(ctx, *object, *index)
        }
    }
}

/// Accept-everything validator used by the short-circuit option
pub fn visit_short_circuit(ctx: &mut VisitorContext<'_>) -> String {
    accept_validator(ctx, "short_circuit")
}

/// Register a style-namespaced always-accept validator
pub(crate) fn accept_validator(ctx: &mut VisitorContext<'_>, base: &str) -> String {
    let name = format!("{}{base}", ctx.messages.style().signature_prefix());
    if ctx.graph.claim(&name) {
        ctx.graph.define(name.clone(), ValidatorKind::Accept);
    }
    name
}

/// Placeholder validator for ignored classes and methods
pub(crate) fn ignored_type(ctx: &mut VisitorContext<'_>) -> String {
    accept_validator(ctx, "_ignore")
}

fn visit_never(ctx: &mut VisitorContext<'_>) -> String {
    let name = format!("{}_never", ctx.messages.style().signature_prefix());
    if ctx.graph.claim(&name) {
        let message = ctx.messages.never();
        ctx.graph.define(name.clone(), ValidatorKind::Reject { message });
    }
    name
}

fn visit_non_primitive(ctx: &mut VisitorContext<'_>) -> String {
    let name = format!("{}_object", ctx.messages.style().signature_prefix());
    if ctx.graph.claim(&name) {
        let message = ctx.messages.type_mismatch("object");
        ctx.graph
            .define(name.clone(), ValidatorKind::NonPrimitive { message });
    }
    name
}

/// Register a `typeof`-style primitive validator
pub(crate) fn primitive_validator(ctx: &mut VisitorContext<'_>, primitive: Primitive) -> String {
    let name = format!(
        "{}_{}",
        ctx.messages.style().signature_prefix(),
        primitive.name()
    );
    if ctx.graph.claim(&name) {
        let message = ctx.messages.type_mismatch(primitive.name());
        ctx.graph
            .define(name.clone(), ValidatorKind::Primitive { primitive, message });
    }
    name
}

/// Register a strict-equality validator for a single literal value
///
/// Names match the canonical signature builder so a literal reached
/// through `keyof` and the same literal reached as a declared type share
/// one definition.
pub(crate) fn literal_validator(ctx: &mut VisitorContext<'_>, value: LiteralValue) -> String {
    let prefix = ctx.messages.style().signature_prefix();
    let name = match &value {
        LiteralValue::Str(text) => format!("{prefix}sl({}~{})", text.len(), text),
        LiteralValue::Number(number) => format!("{prefix}nl({number})"),
        LiteralValue::Bool(true) => format!("{prefix}_true"),
        LiteralValue::Bool(false) => format!("{prefix}_false"),
        LiteralValue::Null => format!("{prefix}_null"),
        LiteralValue::Undefined => format!("{prefix}_undefined"),
    };
    if ctx.graph.claim(&name) {
        let message = ctx.messages.literal_mismatch(value.display_value());
        ctx.graph
            .define(name.clone(), ValidatorKind::Literal { value, message });
    }
    name
}

fn visit_type_reference(
    ctx: &mut VisitorContext<'_>,
    ty: TypeId,
    target: TypeId,
    args: Vec<TypeId>,
) -> CompileResult<String> {
    let mapping = reference_mapping(ctx.table, target, &args);
    let previous = ctx.previous_type_reference;
    ctx.type_mapper_stack.push(mapping);
    ctx.previous_type_reference = Some(ty);
    let result = visit_type(ctx, target);
    ctx.previous_type_reference = previous;
    ctx.type_mapper_stack.pop();
    result
}

fn visit_type_parameter(
    ctx: &mut VisitorContext<'_>,
    ty: TypeId,
    name: String,
    default: Option<TypeId>,
) -> CompileResult<String> {
    let resolved = ctx
        .resolve_parameter(ty)
        .or(default)
        .ok_or(CompileError::UnboundTypeParameter { name })?;
    visit_type(ctx, resolved)
}

fn visit_object(
    ctx: &mut VisitorContext<'_>,
    ty: TypeId,
    object: ObjectType,
) -> CompileResult<String> {
    if object.is_class {
        if ctx.options.ignore_classes {
            return Ok(ignored_type(ctx));
        }
        return Err(CompileError::ClassNotSupported);
    }
    match object.number_index {
        // Number index signature present: array type
        Some(element) => visit_array(ctx, ty, element),
        None => visit_regular_object(ctx, ty, object),
    }
}

fn visit_array(ctx: &mut VisitorContext<'_>, ty: TypeId, element: TypeId) -> CompileResult<String> {
    // Recorded per key, not per definition: the memoized body compiles
    // once but every flag carrying this shape needs the directive
    if ctx.at_coercible_depth() {
        let hint = primitive_hint(ctx, element);
        ctx.coercion.record_array(ctx.coercion_key(), hint);
    }
    let name = type_signature(ctx, ty)?;
    if ctx.graph.claim(&name) {
        let element_fn = visit_type(ctx, element)?;
        let mismatch = ctx.messages.type_mismatch("array");
        ctx.graph.define(
            name.clone(),
            ValidatorKind::Array {
                mismatch,
                element: element_fn,
            },
        );
    }
    Ok(name)
}

fn visit_tuple(
    ctx: &mut VisitorContext<'_>,
    ty: TypeId,
    tuple: TupleType,
) -> CompileResult<String> {
    let max_length = tuple.elements.len();
    let min_length = tuple
        .elements
        .iter()
        .position(|element| element.optional)
        .unwrap_or(max_length);

    if ctx.at_coercible_depth() {
        let key = ctx.coercion_key();
        let members = tuple
            .elements
            .iter()
            .enumerate()
            .map(|(index, element)| TupleMember {
                index,
                element: primitive_hint(ctx, element.ty),
            })
            .collect();
        ctx.coercion.record_tuple(key.clone(), members);
        if min_length == max_length {
            ctx.coercion.record_length(key, max_length);
        }
    }

    let name = type_signature(ctx, ty)?;
    if ctx.graph.claim(&name) {
        let elements = tuple
            .elements
            .iter()
            .map(|element| visit_type(ctx, element.ty))
            .collect::<CompileResult<Vec<_>>>()?;
        // Exact arity gets a different message shape than ranged arity
        let arity = if min_length == max_length {
            ctx.messages.length(max_length)
        } else {
            ctx.messages.range(min_length, max_length)
        };
        ctx.graph.define(
            name.clone(),
            ValidatorKind::Tuple {
                min_length,
                max_length,
                arity,
                elements,
            },
        );
    }
    Ok(name)
}

fn visit_regular_object(
    ctx: &mut VisitorContext<'_>,
    ty: TypeId,
    object: ObjectType,
) -> CompileResult<String> {
    let name = type_signature(ctx, ty)?;
    if ctx.graph.claim(&name) {
        let string_index = match object.string_index {
            Some(index) => Some(visit_type(ctx, index)?),
            None => None,
        };

        let mut properties = Vec::new();
        for property in &object.properties {
            // Symbol-named properties are never validated or reported
            if property.is_symbol {
                continue;
            }
            let function = if property.is_method {
                if !ctx.options.ignore_methods {
                    return Err(CompileError::MethodNotSupported {
                        property: property.name.clone(),
                    });
                }
                ignored_type(ctx)
            } else {
                ctx.key_path.push(property.name.clone());
                if ctx.key_path.len() == 1 {
                    if let Some(primitive) = primitive_hint(ctx, property.ty) {
                        ctx.coercion
                            .record_key_primitive(property.name.clone(), primitive);
                    }
                }
                let function = visit_type(ctx, property.ty);
                ctx.key_path.pop();
                function?
            };
            properties.push(PropertyCheck {
                name: property.name.clone(),
                function,
                optional: property.optional,
                missing: ctx.messages.missing(),
            });
        }

        // Unknown-key rejection and an open index signature are mutually
        // exclusive: an open signature validates every key instead
        let superfluous = if ctx.options.disallow_superfluous_properties && string_index.is_none() {
            Some(SuperfluousCheck {
                allowed: object
                    .properties
                    .iter()
                    .map(|property| property.name.clone())
                    .collect(),
            })
        } else {
            None
        };

        let mismatch = ctx.messages.type_mismatch("object");
        ctx.graph.define(
            name.clone(),
            ValidatorKind::Object {
                mismatch,
                properties,
                string_index,
                superfluous,
            },
        );
    }
    Ok(name)
}

fn visit_union(
    ctx: &mut VisitorContext<'_>,
    ty: TypeId,
    members: Vec<TypeId>,
) -> CompileResult<String> {
    let name = type_signature(ctx, ty)?;
    if ctx.graph.claim(&name) {
        let member_fns = members
            .iter()
            .map(|&member| visit_type(ctx, member))
            .collect::<CompileResult<Vec<_>>>()?;
        let no_alternatives = ctx.messages.no_alternatives();
        ctx.graph.define(
            name.clone(),
            ValidatorKind::Disjunction {
                members: member_fns,
                no_alternatives,
            },
        );
    }
    Ok(name)
}

fn visit_intersection(
    ctx: &mut VisitorContext<'_>,
    ty: TypeId,
    members: Vec<TypeId>,
) -> CompileResult<String> {
    let name = type_signature(ctx, ty)?;
    if ctx.graph.claim(&name) {
        // Members must not reject keys individually: an intersection's
        // key check acts on the union of all members' allowed keys
        let outer_disallow = ctx.options.disallow_superfluous_properties;
        ctx.options.disallow_superfluous_properties = false;
        let member_fns = members
            .iter()
            .map(|&member| visit_type(ctx, member))
            .collect::<CompileResult<Vec<_>>>();
        ctx.options.disallow_superfluous_properties = outer_disallow;
        let member_fns = member_fns?;

        // The combined loop is omitted when no concrete key set exists
        let superfluous = if outer_disallow {
            string_keyof::string_keys(ctx, ty).map(|keys| SuperfluousCheck {
                allowed: keys.into_iter().collect(),
            })
        } else {
            None
        };
        ctx.graph.define(
            name.clone(),
            ValidatorKind::Conjunction {
                members: member_fns,
                superfluous,
            },
        );
    }
    Ok(name)
}

/// Human-readable label for a type category, used in diagnostics
pub(crate) fn kind_label(kind: &TypeKind) -> &'static str {
    match kind {
        TypeKind::Any => "any",
        TypeKind::Unknown => "unknown",
        TypeKind::Never => "never",
        TypeKind::Null => "null",
        TypeKind::Undefined => "undefined",
        TypeKind::NonPrimitive => "object",
        TypeKind::String => "string",
        TypeKind::Number => "number",
        TypeKind::Boolean => "boolean",
        TypeKind::BigInt => "bigint",
        TypeKind::BooleanLiteral(_) => "boolean literal",
        TypeKind::StringLiteral(_) => "string literal",
        TypeKind::NumberLiteral(_) => "number literal",
        TypeKind::Object(_) => "object",
        TypeKind::Tuple(_) => "tuple",
        TypeKind::Union(_) => "union",
        TypeKind::Intersection(_) => "intersection",
        TypeKind::Reference { .. } => "type reference",
        TypeKind::Parameter { .. } => "type parameter",
        TypeKind::Index(_) => "keyof",
        TypeKind::IndexedAccess { .. } => "indexed access",
    }
}

/// Primitive kind of a type, if one is statically determinable; used
/// purely as a tokenizer coercion hint
pub(crate) fn primitive_hint(ctx: &VisitorContext<'_>, ty: TypeId) -> Option<Primitive> {
    match ctx.table.kind(ty) {
        TypeKind::String | TypeKind::StringLiteral(_) => Some(Primitive::String),
        TypeKind::Number | TypeKind::NumberLiteral(_) => Some(Primitive::Number),
        TypeKind::Boolean | TypeKind::BooleanLiteral(_) => Some(Primitive::Boolean),
        TypeKind::BigInt => Some(Primitive::BigInt),
        TypeKind::Parameter { default, .. } => ctx
            .resolve_parameter(ty)
            .or(*default)
            .and_then(|resolved| primitive_hint(ctx, resolved)),
        TypeKind::Union(members) => {
            let mut hints = members.iter().map(|&member| primitive_hint(ctx, member));
            let first = hints.next()??;
            hints
                .all(|hint| hint == Some(first))
                .then_some(first)
        }
        _ => None,
    }
}
