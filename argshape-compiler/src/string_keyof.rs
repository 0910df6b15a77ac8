//! Static string-key extraction
//!
//! Computes the set of property names a type can statically name, used
//! to build the combined unknown-key check for intersections. `None`
//! means the key set is open (a string index signature, or any shape
//! whose keys are not enumerable) and no combined check is emitted.

use std::collections::{BTreeSet, HashSet};

use argshape_types::{TypeId, TypeKind};

use crate::context::VisitorContext;

/// All string keys `ty` can statically carry, or `None` when open
pub fn string_keys(ctx: &VisitorContext<'_>, ty: TypeId) -> Option<BTreeSet<String>> {
    let mut seen = HashSet::new();
    collect(ctx, ty, &mut seen)
}

fn collect(
    ctx: &VisitorContext<'_>,
    ty: TypeId,
    seen: &mut HashSet<TypeId>,
) -> Option<BTreeSet<String>> {
    // Recursive shapes contribute their already-visited keys once
    if !seen.insert(ty) {
        return Some(BTreeSet::new());
    }

    match ctx.table.kind(ty) {
        TypeKind::Object(object) => {
            if object.string_index.is_some() {
                return None;
            }
            Some(
                object
                    .properties
                    .iter()
                    .filter(|property| !property.is_symbol)
                    .map(|property| property.name.clone())
                    .collect(),
            )
        }
        TypeKind::StringLiteral(value) => Some(BTreeSet::from([value.clone()])),
        // Both unions and intersections contribute every member's keys:
        // a key present on any member is addressable on the whole
        TypeKind::Union(members) | TypeKind::Intersection(members) => {
            let mut keys = BTreeSet::new();
            for &member in members {
                keys.extend(collect(ctx, member, seen)?);
            }
            Some(keys)
        }
        TypeKind::Reference { target, .. } => collect(ctx, *target, seen),
        TypeKind::Parameter { default, .. } => {
            let resolved = ctx.resolve_parameter(ty).or(*default)?;
            collect(ctx, resolved, seen)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CompileOptions;
    use crate::graph::ValidatorGraph;
    use crate::message::TargetStyle;
    use argshape_types::{Property, TypeTable};
    use pretty_assertions::assert_eq;

    fn keys_of(table: &TypeTable, ty: TypeId) -> Option<BTreeSet<String>> {
        let mut graph = ValidatorGraph::new();
        let ctx = VisitorContext::new(
            table,
            &mut graph,
            CompileOptions::default(),
            TargetStyle::Flags,
        );
        string_keys(&ctx, ty)
    }

    #[test]
    fn intersection_combines_member_keys() {
        let mut table = TypeTable::new();
        let string = table.string();
        let a = table.object(vec![Property::required("left", string)]);
        let b = table.object(vec![Property::required("right", string)]);
        let both = table.intersection(vec![a, b]);
        assert_eq!(
            keys_of(&table, both),
            Some(BTreeSet::from(["left".to_string(), "right".to_string()]))
        );
    }

    #[test]
    fn string_index_makes_the_key_set_open() {
        let mut table = TypeTable::new();
        let string = table.string();
        let closed = table.object(vec![Property::required("name", string)]);
        let open = table.open_object(vec![], string);
        let both = table.intersection(vec![closed, open]);
        assert_eq!(keys_of(&table, both), None);
    }
}
