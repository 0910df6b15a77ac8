//! Canonical structural signatures
//!
//! Validator names are derived from a type's observable structural shape
//! plus the compiler options that change the compiled body (superfluous
//! key checking, message style). Two distinct handles with identical
//! shapes map to the same name and are compiled at most once. Handle
//! identity is never used; the signature is the memoization key.
//!
//! String content is length-prefixed (`5~hello`) instead of escaped, so
//! property names can contain any delimiter without ambiguity. Cycles
//! through recursive shapes are written as `rec(N)` where N is the
//! distance up the in-progress expansion stack, keeping signatures
//! structural rather than leaking interner indices.

use std::collections::HashMap;
use std::fmt::Write as _;

use argshape_types::{TypeId, TypeKind, TypeTable};

use crate::context::VisitorContext;
use crate::error::{CompileError, CompileResult};

/// Canonical name for a type under the current context
pub fn type_signature(ctx: &mut VisitorContext<'_>, ty: TypeId) -> CompileResult<String> {
    let mut out = String::from(ctx.messages.style().signature_prefix());
    let mut in_progress = Vec::new();
    write_signature(ctx, ty, &mut in_progress, &mut out)?;
    Ok(out)
}

fn write_str(out: &mut String, value: &str) {
    // Length-prefixed: unambiguous without an escaping pass
    let _ = write!(out, "{}~{}", value.len(), value);
}

fn write_signature(
    ctx: &mut VisitorContext<'_>,
    ty: TypeId,
    in_progress: &mut Vec<TypeId>,
    out: &mut String,
) -> CompileResult<()> {
    if let Some(position) = in_progress.iter().position(|&seen| seen == ty) {
        let _ = write!(out, "rec({})", in_progress.len() - position);
        return Ok(());
    }

    let table = ctx.table;
    match table.kind(ty) {
        TypeKind::Any => out.push_str("_any"),
        TypeKind::Unknown => out.push_str("_unknown"),
        TypeKind::Never => out.push_str("_never"),
        TypeKind::Null => out.push_str("_null"),
        TypeKind::Undefined => out.push_str("_undefined"),
        TypeKind::NonPrimitive => out.push_str("_object"),
        TypeKind::String => out.push_str("_string"),
        TypeKind::Number => out.push_str("_number"),
        TypeKind::Boolean => out.push_str("_boolean"),
        TypeKind::BigInt => out.push_str("_bigint"),
        TypeKind::BooleanLiteral(true) => out.push_str("_true"),
        TypeKind::BooleanLiteral(false) => out.push_str("_false"),
        TypeKind::StringLiteral(value) => {
            out.push_str("sl(");
            write_str(out, value);
            out.push(')');
        }
        TypeKind::NumberLiteral(value) => {
            let _ = write!(out, "nl({value})");
        }
        TypeKind::Object(object) => {
            in_progress.push(ty);
            let object = object.clone();
            out.push_str("ot(");
            if object.is_class {
                out.push_str("cl;");
            }
            for property in &object.properties {
                if property.is_symbol {
                    continue;
                }
                write_str(out, &property.name);
                if property.optional {
                    out.push('?');
                }
                out.push(':');
                if property.is_method {
                    out.push_str("_fn");
                } else {
                    write_signature(ctx, property.ty, in_progress, out)?;
                }
                out.push(';');
            }
            if let Some(index) = object.string_index {
                out.push_str("si:");
                write_signature(ctx, index, in_progress, out)?;
                out.push(';');
            }
            if let Some(index) = object.number_index {
                out.push_str("ni:");
                write_signature(ctx, index, in_progress, out)?;
                out.push(';');
            }
            // Arrays (number-indexed objects) never run the superfluous
            // key loop, so the option is only part of a record's identity
            if object.number_index.is_none() && ctx.options.disallow_superfluous_properties {
                out.push_str("sf;");
            }
            out.push(')');
            in_progress.pop();
        }
        TypeKind::Tuple(tuple) => {
            in_progress.push(ty);
            let elements = tuple.elements.clone();
            out.push_str("tt(");
            for element in elements {
                write_signature(ctx, element.ty, in_progress, out)?;
                if element.optional {
                    out.push('?');
                }
                out.push(';');
            }
            out.push(')');
            in_progress.pop();
        }
        TypeKind::Union(members) => {
            in_progress.push(ty);
            let members = members.clone();
            out.push_str("ut(");
            for member in members {
                write_signature(ctx, member, in_progress, out)?;
                out.push(';');
            }
            out.push(')');
            in_progress.pop();
        }
        TypeKind::Intersection(members) => {
            in_progress.push(ty);
            let members = members.clone();
            out.push_str("it(");
            for member in members {
                write_signature(ctx, member, in_progress, out)?;
                out.push(';');
            }
            if ctx.options.disallow_superfluous_properties {
                out.push_str("sf;");
            }
            out.push(')');
            in_progress.pop();
        }
        TypeKind::Reference { target, args } => {
            in_progress.push(ty);
            let target = *target;
            let mapping = reference_mapping(table, target, args);
            ctx.type_mapper_stack.push(mapping);
            let result = write_signature(ctx, target, in_progress, out);
            ctx.type_mapper_stack.pop();
            in_progress.pop();
            result?;
        }
        TypeKind::Parameter { name, default } => {
            let resolved = ctx.resolve_parameter(ty).or(*default).ok_or_else(|| {
                CompileError::UnboundTypeParameter { name: name.clone() }
            })?;
            write_signature(ctx, resolved, in_progress, out)?;
        }
        TypeKind::Index(inner) => {
            let inner = *inner;
            out.push_str("kf(");
            write_signature(ctx, inner, in_progress, out)?;
            out.push(')');
        }
        TypeKind::IndexedAccess { object, index } => {
            let (object, index) = (*object, *index);
            out.push_str("ia(");
            write_signature(ctx, object, in_progress, out)?;
            out.push(';');
            write_signature(ctx, index, in_progress, out)?;
            out.push(')');
        }
    }
    Ok(())
}

/// Substitution map for a generic instantiation
///
/// Walks the target's declared base types transitively so inherited
/// generic parameters are captured alongside the target's own, then
/// zips the target's parameter list against the instantiated arguments.
pub fn reference_mapping(
    table: &TypeTable,
    target: TypeId,
    args: &[TypeId],
) -> HashMap<TypeId, TypeId> {
    let mut mapping = HashMap::new();
    collect_base_mappings(table, target, &mut mapping);
    if let Some(object) = table.as_object(target) {
        for (&param, &arg) in object.type_params.iter().zip(args) {
            if param != arg {
                mapping.insert(param, arg);
            }
        }
    }
    mapping
}

fn collect_base_mappings(table: &TypeTable, target: TypeId, mapping: &mut HashMap<TypeId, TypeId>) {
    let Some(object) = table.as_object(target) else {
        return;
    };
    for &base in &object.base_types {
        if let TypeKind::Reference {
            target: base_target,
            args: base_args,
        } = table.kind(base)
        {
            if let Some(base_object) = table.as_object(*base_target) {
                for (&param, &arg) in base_object.type_params.iter().zip(base_args) {
                    if param != arg {
                        mapping.insert(param, arg);
                    }
                }
            }
            collect_base_mappings(table, *base_target, mapping);
        }
    }
}
