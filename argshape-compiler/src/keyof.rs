//! `keyof T` compilation
//!
//! A key query compiles to a validator over property-key values: for a
//! closed object that is a disjunction of its string-literal key names;
//! unions of types intersect their key sets, intersections union them.

use argshape_types::{TypeId, TypeKind};

use crate::context::VisitorContext;
use crate::error::{CompileError, CompileResult};
use crate::graph::{LiteralValue, Primitive, ValidatorKind};
use crate::signature::{reference_mapping, type_signature};
use crate::visitor::{kind_label, literal_validator, primitive_validator};

/// Name for the key-set validator of `inner`
fn keyof_name(ctx: &mut VisitorContext<'_>, inner: TypeId) -> CompileResult<String> {
    let prefix = ctx.messages.style().signature_prefix();
    let signature = type_signature(ctx, inner)?;
    let body = signature.strip_prefix(prefix).unwrap_or(&signature);
    Ok(format!("{prefix}kf({body})"))
}

/// Compile the validator for `keyof inner`
pub fn visit_keyof(ctx: &mut VisitorContext<'_>, inner: TypeId) -> CompileResult<String> {
    let table = ctx.table;
    match table.kind(inner) {
        TypeKind::Object(object) => {
            if object.string_index.is_some() {
                // Open maps accept any string key
                return Ok(primitive_validator(ctx, Primitive::String));
            }
            if object.number_index.is_some() {
                return Ok(primitive_validator(ctx, Primitive::Number));
            }
            let properties = object.properties.clone();
            let name = keyof_name(ctx, inner)?;
            if ctx.graph.claim(&name) {
                let members = properties
                    .iter()
                    .filter(|property| !property.is_symbol)
                    .map(|property| {
                        literal_validator(ctx, LiteralValue::Str(property.name.clone()))
                    })
                    .collect();
                let no_alternatives = ctx.messages.no_alternatives();
                ctx.graph.define(
                    name.clone(),
                    ValidatorKind::Disjunction {
                        members,
                        no_alternatives,
                    },
                );
            }
            Ok(name)
        }
        TypeKind::Tuple(_) => Ok(primitive_validator(ctx, Primitive::Number)),
        TypeKind::Any => {
            let name = format!("{}kf(_any)", ctx.messages.style().signature_prefix());
            if ctx.graph.claim(&name) {
                let members = vec![
                    primitive_validator(ctx, Primitive::String),
                    primitive_validator(ctx, Primitive::Number),
                ];
                let no_alternatives = ctx.messages.no_alternatives();
                ctx.graph.define(
                    name.clone(),
                    ValidatorKind::Disjunction {
                        members,
                        no_alternatives,
                    },
                );
            }
            Ok(name)
        }
        // keyof (A | B) = keyof A & keyof B
        TypeKind::Union(members) => {
            let members = members.clone();
            let name = keyof_name(ctx, inner)?;
            if ctx.graph.claim(&name) {
                let member_fns = members
                    .iter()
                    .map(|&member| visit_keyof(ctx, member))
                    .collect::<CompileResult<Vec<_>>>()?;
                ctx.graph.define(
                    name.clone(),
                    ValidatorKind::Conjunction {
                        members: member_fns,
                        superfluous: None,
                    },
                );
            }
            Ok(name)
        }
        // keyof (A & B) = keyof A | keyof B
        TypeKind::Intersection(members) => {
            let members = members.clone();
            let name = keyof_name(ctx, inner)?;
            if ctx.graph.claim(&name) {
                let member_fns = members
                    .iter()
                    .map(|&member| visit_keyof(ctx, member))
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
        TypeKind::Reference { target, args } => {
            let target = *target;
            let mapping = reference_mapping(table, target, args);
            ctx.type_mapper_stack.push(mapping);
            let result = visit_keyof(ctx, target);
            ctx.type_mapper_stack.pop();
            result
        }
        TypeKind::Parameter { name, default } => {
            let resolved = ctx.resolve_parameter(inner).or(*default).ok_or_else(|| {
                CompileError::UnboundTypeParameter { name: name.clone() }
            })?;
            visit_keyof(ctx, resolved)
        }
        other => Err(CompileError::UnsupportedType {
            kind: format!("keyof {}", kind_label(other)),
        }),
    }
}
