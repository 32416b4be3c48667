//! Null-handling shells around core conversions.
//!
//! Core strategies are resolved on non-nullable views of both types; this
//! module re-applies the use-site nullability as a [`NullGuardPlan`] wrapper
//! according to the four-way source/target matrix.

use mapgen_ir::{FallbackValue, NullGuardPlan, OnNull, Plan, PlanKind};
use mapgen_model::{SpecialType, TypeRef};

use crate::context::ResolutionContext;
use crate::diagnostic::{Diagnostic, DiagnosticKind};

/// Wrap a core plan with the null handling the outer pair requires.
pub fn wrap(ctx: &mut ResolutionContext, source: TypeRef, target: TypeRef, inner: Plan) -> Plan {
    if inner.is_error() {
        return Plan::error(source, target);
    }

    let guard = |on_null: OnNull, inner: Plan| {
        Plan::new(
            source,
            target,
            PlanKind::NullGuard(Box::new(NullGuardPlan { on_null, inner })),
        )
    };

    match (source.nullable, target.nullable) {
        (false, false) => inner,
        (false, true) => {
            // only a nullable value type needs a lift; nullable references
            // accept the value as-is
            if ctx.catalog.get(target.id).value_type {
                guard(OnNull::Wrap, inner)
            } else {
                Plan::new(source, target, inner.kind)
            }
        }
        (true, true) => {
            if matches!(inner.kind, PlanKind::Identity) {
                return Plan::new(source, target, PlanKind::Identity);
            }
            guard(OnNull::PassNull, inner)
        }
        (true, false) => {
            if ctx.config.throw_on_null_mismatch {
                ctx.report(Diagnostic::warning(
                    DiagnosticKind::NullableSourceToNonNullableTarget,
                    format!(
                        "nullable source '{}' maps to non-nullable '{}'; a null value will throw",
                        ctx.catalog.name(source.id),
                        ctx.catalog.name(target.id)
                    ),
                ));
                return guard(OnNull::Throw, inner);
            }
            match fallback_for(ctx, target) {
                Some(fallback) => guard(OnNull::Fallback(fallback), inner),
                None => {
                    ctx.report(Diagnostic::warning(
                        DiagnosticKind::NullableSourceToNonNullableTarget,
                        format!(
                            "no null substitute exists for '{}'; a null value will throw",
                            ctx.catalog.name(target.id)
                        ),
                    ));
                    guard(OnNull::Throw, inner)
                }
            }
        }
    }
}

/// The substitute value used for a null source when throwing is disabled.
fn fallback_for(ctx: &ResolutionContext, target: TypeRef) -> Option<FallbackValue> {
    let descriptor = ctx.catalog.get(target.id);
    if descriptor.special == Some(SpecialType::String) {
        return Some(FallbackValue::EmptyString);
    }
    if descriptor.value_type {
        return Some(FallbackValue::Default);
    }
    if descriptor.has_parameterless_constructor() {
        return Some(FallbackValue::NewInstance);
    }
    None
}

#[cfg(test)]
mod tests {
    use mapgen_model::TypeCatalog;

    use super::*;
    use crate::registry::MappingRegistry;

    fn identity(source: TypeRef, target: TypeRef) -> Plan {
        Plan::new(source.as_non_null(), target.as_non_null(), PlanKind::Identity)
    }

    #[test]
    fn test_non_null_pair_passes_through() {
        let (catalog, builtins) = TypeCatalog::with_builtins();
        let mut ctx = ResolutionContext::new(&catalog, MappingRegistry::new());
        let ty = TypeRef::non_null(builtins.i32);
        let plan = wrap(&mut ctx, ty, ty, identity(ty, ty));
        assert_eq!(plan.tag(), "identity");
    }

    #[test]
    fn test_value_type_lift_wraps() {
        let (catalog, builtins) = TypeCatalog::with_builtins();
        let mut ctx = ResolutionContext::new(&catalog, MappingRegistry::new());
        let source = TypeRef::non_null(builtins.i32);
        let target = TypeRef::nullable(builtins.i32);
        let plan = wrap(&mut ctx, source, target, identity(source, target));
        match plan.kind {
            PlanKind::NullGuard(guard) => assert_eq!(guard.on_null, OnNull::Wrap),
            other => panic!("expected null guard, got {other:?}"),
        }
    }

    #[test]
    fn test_nullable_reference_target_needs_no_guard() {
        let (catalog, builtins) = TypeCatalog::with_builtins();
        let mut ctx = ResolutionContext::new(&catalog, MappingRegistry::new());
        let source = TypeRef::non_null(builtins.string);
        let target = TypeRef::nullable(builtins.string);
        let plan = wrap(&mut ctx, source, target, identity(source, target));
        assert_eq!(plan.tag(), "identity");
        assert_eq!(plan.target, target);
    }

    #[test]
    fn test_nullable_identity_skips_guard() {
        let (catalog, builtins) = TypeCatalog::with_builtins();
        let mut ctx = ResolutionContext::new(&catalog, MappingRegistry::new());
        let ty = TypeRef::nullable(builtins.i32);
        let plan = wrap(&mut ctx, ty, ty, identity(ty, ty));
        assert_eq!(plan.tag(), "identity");
    }

    #[test]
    fn test_null_mismatch_throws_and_warns() {
        let (catalog, builtins) = TypeCatalog::with_builtins();
        let mut ctx = ResolutionContext::new(&catalog, MappingRegistry::new());
        let source = TypeRef::nullable(builtins.i32);
        let target = TypeRef::non_null(builtins.i32);
        let plan = wrap(&mut ctx, source, target, identity(source, target));
        match plan.kind {
            PlanKind::NullGuard(guard) => assert_eq!(guard.on_null, OnNull::Throw),
            other => panic!("expected null guard, got {other:?}"),
        }
        assert_eq!(
            ctx.diagnostics[0].kind,
            DiagnosticKind::NullableSourceToNonNullableTarget
        );
    }

    #[test]
    fn test_null_mismatch_fallbacks() {
        let (catalog, builtins) = TypeCatalog::with_builtins();
        let mut ctx = ResolutionContext::new(&catalog, MappingRegistry::new());
        ctx.config.throw_on_null_mismatch = false;

        let int_plan = wrap(
            &mut ctx,
            TypeRef::nullable(builtins.i32),
            TypeRef::non_null(builtins.i32),
            identity(TypeRef::nullable(builtins.i32), TypeRef::non_null(builtins.i32)),
        );
        match int_plan.kind {
            PlanKind::NullGuard(guard) => {
                assert_eq!(guard.on_null, OnNull::Fallback(FallbackValue::Default));
            }
            other => panic!("expected null guard, got {other:?}"),
        }

        let string_plan = wrap(
            &mut ctx,
            TypeRef::nullable(builtins.string),
            TypeRef::non_null(builtins.string),
            identity(
                TypeRef::nullable(builtins.string),
                TypeRef::non_null(builtins.string),
            ),
        );
        match string_plan.kind {
            PlanKind::NullGuard(guard) => {
                assert_eq!(guard.on_null, OnNull::Fallback(FallbackValue::EmptyString));
            }
            other => panic!("expected null guard, got {other:?}"),
        }
        assert!(ctx.diagnostics.is_empty());
    }
}
