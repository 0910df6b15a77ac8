//! `T[U]` compilation
//!
//! Supported index shapes: string-literal keys into objects and tuples,
//! numeric-literal positions into tuples and arrays, `number` (all
//! elements), `keyof` (all property types), and unions of any of these.

use argshape_types::{LiteralNumber, TypeId, TypeKind};

use crate::context::VisitorContext;
use crate::error::{CompileError, CompileResult};
use crate::graph::ValidatorKind;
use crate::signature::{reference_mapping, type_signature};
use crate::visitor::{kind_label, visit_type};

/// Name for an access validator synthesized from `object` and an index label
fn access_name(
    ctx: &mut VisitorContext<'_>,
    object: TypeId,
    label: &str,
) -> CompileResult<String> {
    let prefix = ctx.messages.style().signature_prefix();
    let signature = type_signature(ctx, object)?;
    let body = signature.strip_prefix(prefix).unwrap_or(&signature);
    Ok(format!("{prefix}ia({body};{label})"))
}

/// Compile the validator for `object[index]`
pub fn visit_indexed_access(
    ctx: &mut VisitorContext<'_>,
    object: TypeId,
    index: TypeId,
) -> CompileResult<String> {
    let table = ctx.table;
    match table.kind(object) {
        TypeKind::Reference { target, args } => {
            let target = *target;
            let mapping = reference_mapping(table, target, args);
            ctx.type_mapper_stack.push(mapping);
            let result = visit_indexed_access(ctx, target, index);
            ctx.type_mapper_stack.pop();
            result
        }
        TypeKind::Parameter { name, default } => {
            let resolved = ctx.resolve_parameter(object).or(*default).ok_or_else(|| {
                CompileError::UnboundTypeParameter { name: name.clone() }
            })?;
            visit_indexed_access(ctx, resolved, index)
        }
        _ => resolve_index(ctx, object, index),
    }
}

fn resolve_index(
    ctx: &mut VisitorContext<'_>,
    object: TypeId,
    index: TypeId,
) -> CompileResult<String> {
    let table = ctx.table;
    match table.kind(index) {
        TypeKind::StringLiteral(key) => {
            let key = key.clone();
            property_access(ctx, object, &key)
        }
        TypeKind::NumberLiteral(LiteralNumber::Int(position)) => {
            let position = usize::try_from(*position).map_err(|_| {
                CompileError::UnsupportedType {
                    kind: "negative numeric index".to_string(),
                }
            })?;
            position_access(ctx, object, position)
        }
        TypeKind::Number => element_access(ctx, object),
        // T[keyof U]: any property's type may show up
        TypeKind::Index(_) => all_property_access(ctx, object),
        TypeKind::Union(members) => {
            let members = members.clone();
            let index_signature = type_signature(ctx, index)?;
            let label = index_signature
                .strip_prefix(ctx.messages.style().signature_prefix())
                .unwrap_or(&index_signature)
                .to_string();
            let name = access_name(ctx, object, &label)?;
            if ctx.graph.claim(&name) {
                let member_fns = members
                    .iter()
                    .map(|&member| resolve_index(ctx, object, member))
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
        TypeKind::Parameter { name, default } => {
            let resolved = ctx.resolve_parameter(index).or(*default).ok_or_else(|| {
                CompileError::UnboundTypeParameter { name: name.clone() }
            })?;
            resolve_index(ctx, object, resolved)
        }
        other => Err(CompileError::UnsupportedType {
            kind: format!("indexed access with {} index", kind_label(other)),
        }),
    }
}

/// `T["key"]`
fn property_access(
    ctx: &mut VisitorContext<'_>,
    object: TypeId,
    key: &str,
) -> CompileResult<String> {
    let table = ctx.table;
    match table.kind(object) {
        TypeKind::Object(shape) => {
            if let Some(property) = shape
                .properties
                .iter()
                .find(|property| !property.is_symbol && property.name == key)
            {
                return visit_type(ctx, property.ty);
            }
            if let Some(index) = shape.string_index {
                return visit_type(ctx, index);
            }
            Err(CompileError::UnknownIndexedKey {
                key: key.to_string(),
            })
        }
        TypeKind::Tuple(tuple) => match key.parse::<usize>() {
            Ok(position) => {
                let length = tuple.elements.len();
                let element = tuple.elements.get(position).copied().ok_or(
                    CompileError::TupleIndexOutOfBounds {
                        index: position,
                        length,
                    },
                )?;
                visit_type(ctx, element.ty)
            }
            Err(_) => Err(CompileError::UnknownIndexedKey {
                key: key.to_string(),
            }),
        },
        other => Err(CompileError::UnsupportedType {
            kind: format!("indexed access into {}", kind_label(other)),
        }),
    }
}

/// `T[0]`
fn position_access(
    ctx: &mut VisitorContext<'_>,
    object: TypeId,
    position: usize,
) -> CompileResult<String> {
    let table = ctx.table;
    match table.kind(object) {
        TypeKind::Tuple(tuple) => {
            let length = tuple.elements.len();
            let element =
                tuple
                    .elements
                    .get(position)
                    .copied()
                    .ok_or(CompileError::TupleIndexOutOfBounds {
                        index: position,
                        length,
                    })?;
            visit_type(ctx, element.ty)
        }
        TypeKind::Object(shape) if shape.number_index.is_some() => {
            let element = shape.number_index.ok_or(CompileError::UnsupportedType {
                kind: "array without an element type".to_string(),
            })?;
            visit_type(ctx, element)
        }
        other => Err(CompileError::UnsupportedType {
            kind: format!("numeric access into {}", kind_label(other)),
        }),
    }
}

/// `T[number]`
fn element_access(ctx: &mut VisitorContext<'_>, object: TypeId) -> CompileResult<String> {
    let table = ctx.table;
    match table.kind(object) {
        TypeKind::Object(shape) if shape.number_index.is_some() => {
            let element = shape.number_index.ok_or(CompileError::UnsupportedType {
                kind: "array without an element type".to_string(),
            })?;
            visit_type(ctx, element)
        }
        TypeKind::Tuple(tuple) => {
            let elements = tuple.elements.clone();
            let name = access_name(ctx, object, "_number")?;
            if ctx.graph.claim(&name) {
                let member_fns = elements
                    .iter()
                    .map(|element| visit_type(ctx, element.ty))
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
        other => Err(CompileError::UnsupportedType {
            kind: format!("element access into {}", kind_label(other)),
        }),
    }
}

/// `T[keyof U]`
fn all_property_access(ctx: &mut VisitorContext<'_>, object: TypeId) -> CompileResult<String> {
    let table = ctx.table;
    match table.kind(object) {
        TypeKind::Object(shape) if shape.number_index.is_none() => {
            let shape = shape.clone();
            let name = access_name(ctx, object, "kf")?;
            if ctx.graph.claim(&name) {
                let mut member_fns = Vec::new();
                for property in &shape.properties {
                    if property.is_symbol || property.is_method {
                        continue;
                    }
                    member_fns.push(visit_type(ctx, property.ty)?);
                }
                if let Some(index) = shape.string_index {
                    member_fns.push(visit_type(ctx, index)?);
                }
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
        _ => element_access(ctx, object),
    }
}
