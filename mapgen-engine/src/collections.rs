//! Collection and dictionary materialization planning.

use mapgen_ir::{CollectionPlan, CollectionShape, DictionaryPlan, Plan, PlanKind};
use mapgen_model::TypeRef;

use crate::context::ResolutionContext;
use crate::strategy::resolve_conversion;

/// Plan an element-wise collection mapping. Both sides are known to be
/// collection-shaped; the target's shape decides materialization.
pub fn collection(
    ctx: &mut ResolutionContext,
    source: TypeRef,
    target: TypeRef,
    source_element: TypeRef,
    target_element: TypeRef,
) -> Plan {
    let element = resolve_conversion(ctx, source_element, target_element);
    if element.is_error() {
        return Plan::error(source, target);
    }

    let shape = target_shape(ctx, target);
    let counted = source_is_counted(ctx, source);
    Plan::new(
        source,
        target,
        PlanKind::Collection(Box::new(CollectionPlan {
            shape,
            element,
            counted,
        })),
    )
}

/// Plan an entry-wise dictionary mapping.
pub fn dictionary(
    ctx: &mut ResolutionContext,
    source: TypeRef,
    target: TypeRef,
    source_entry: (TypeRef, TypeRef),
    target_entry: (TypeRef, TypeRef),
) -> Plan {
    let key = resolve_conversion(ctx, source_entry.0, target_entry.0);
    let value = resolve_conversion(ctx, source_entry.1, target_entry.1);
    if key.is_error() || value.is_error() {
        return Plan::error(source, target);
    }

    Plan::new(
        source,
        target,
        PlanKind::Dictionary(Box::new(DictionaryPlan { key, value })),
    )
}

fn target_shape(ctx: &ResolutionContext, target: TypeRef) -> CollectionShape {
    let descriptor = ctx.catalog.get(target.id);
    let Some(facts) = &descriptor.collection else {
        return CollectionShape::Enumerable;
    };
    if facts.array {
        CollectionShape::Array
    } else if facts.set_like {
        CollectionShape::Set
    } else if facts.stack_like {
        CollectionShape::Stack
    } else if facts.queue_like {
        CollectionShape::Queue
    } else if facts.read_only {
        CollectionShape::Enumerable
    } else {
        CollectionShape::List
    }
}

/// Whether the source exposes a length usable as a capacity hint.
fn source_is_counted(ctx: &ResolutionContext, source: TypeRef) -> bool {
    let descriptor = ctx.catalog.get(source.id);
    match &descriptor.collection {
        Some(facts) => facts.array || !facts.read_only,
        None => false,
    }
}
