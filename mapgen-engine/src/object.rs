//! Object graph construction planning.
//!
//! Picks a constructor, routes matched members through constructor
//! arguments, object initializers, or setter assignments, and converts each
//! member value. Member failures degrade to diagnostics and the member is
//! dropped from the plan.

use mapgen_ir::{
    ConstructorArg, ConstructorCall, MemberBinding, ObjectPlan, Plan, PlanKind, ValueBinding,
};
use mapgen_model::{Constructor, Parameter, TypeRef};

use crate::context::ResolutionContext;
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::members::{MemberMatch, MemberMatchSet, match_members};
use crate::strategy::resolve_member_value;

/// Plan the construction (or in-place update) of a target object from a
/// source object.
pub fn resolve_object(
    ctx: &mut ResolutionContext,
    source: TypeRef,
    target: TypeRef,
    existing_target: bool,
) -> Plan {
    let set = match_members(ctx, source, target);
    report_unsatisfied_required(ctx, target, &set);

    let (constructor, consumed) = if existing_target {
        (None, Vec::new())
    } else {
        match select_constructor(ctx, target, &set) {
            Some((args, consumed)) => {
                let args = build_constructor_args(ctx, args);
                (Some(ConstructorCall { args }), consumed)
            }
            None => return Plan::error(source, target),
        }
    };

    let mut initializers = Vec::new();
    let mut assignments = Vec::new();
    for member_match in &set.matches {
        let name = member_match.target.first();
        if consumed.iter().any(|c| c == name) {
            continue;
        }
        if member_match.target_init_only {
            if existing_target {
                ctx.report(
                    Diagnostic::warning(
                        DiagnosticKind::CannotMapToReadOnlyMember,
                        format!(
                            "'{}.{}' can only be set during initialization",
                            ctx.catalog.name(target.id),
                            member_match.target
                        ),
                    )
                    .at(member_match.target.to_string()),
                );
                continue;
            }
            if let Some(binding) = bind_member(ctx, member_match) {
                initializers.push(binding);
            }
        } else if let Some(binding) = bind_member(ctx, member_match) {
            assignments.push(binding);
        }
    }

    Plan::new(
        source,
        target,
        PlanKind::Object(Box::new(ObjectPlan {
            constructor,
            initializers,
            assignments,
            existing_target,
        })),
    )
}

/// A required target member without a source cannot be satisfied by any
/// construction shape.
fn report_unsatisfied_required(
    ctx: &mut ResolutionContext,
    target: TypeRef,
    set: &MemberMatchSet,
) {
    let required: Vec<String> = ctx
        .catalog
        .get(target.id)
        .members
        .iter()
        .filter(|m| m.required && set.unmapped_targets.contains(&m.name))
        .map(|m| m.name.clone())
        .collect();
    for name in required {
        let message = format!(
            "required member '{}.{name}' has no source",
            ctx.catalog.name(target.id)
        );
        ctx.report(
            Diagnostic::error(DiagnosticKind::CouldNotCreateMapping, message).at(name),
        );
    }
}

/// Choose the constructor: a satisfiable designated constructor wins, then
/// the satisfiable candidate binding the most parameters, then the
/// parameterless fallback.
fn select_constructor(
    ctx: &mut ResolutionContext,
    target: TypeRef,
    set: &MemberMatchSet,
) -> Option<(Vec<(Parameter, MemberMatch)>, Vec<String>)> {
    let constructors: Vec<Constructor> = ctx
        .catalog
        .get(target.id)
        .constructors
        .iter()
        .filter(|c| c.visibility >= ctx.config.min_visibility)
        .cloned()
        .collect();

    let mut candidates: Vec<(bool, Vec<(Parameter, MemberMatch)>)> = Vec::new();
    for constructor in &constructors {
        if let Some(args) = satisfiable(constructor, set) {
            candidates.push((constructor.designated, args));
        }
    }

    if candidates.is_empty() {
        let message = format!(
            "no accessible constructor of '{}' can be satisfied from the source",
            ctx.catalog.name(target.id)
        );
        ctx.report(Diagnostic::error(
            DiagnosticKind::NoSuitableConstructor,
            message,
        ));
        return None;
    }

    let designated: Vec<usize> = candidates
        .iter()
        .enumerate()
        .filter(|(_, (designated, _))| *designated)
        .map(|(index, _)| index)
        .collect();
    let chosen = if let Some(&first) = designated.first() {
        if designated.len() > 1 {
            ctx.report(Diagnostic::error(
                DiagnosticKind::AmbiguousConstructor,
                format!(
                    "more than one designated constructor of '{}' is satisfiable",
                    ctx.catalog.name(target.id)
                ),
            ));
        }
        first
    } else {
        let best = candidates
            .iter()
            .map(|(_, args)| args.len())
            .max()
            .unwrap_or(0);
        let at_best: Vec<usize> = candidates
            .iter()
            .enumerate()
            .filter(|(_, (_, args))| args.len() == best)
            .map(|(index, _)| index)
            .collect();
        if best > 0 && at_best.len() > 1 {
            ctx.report(Diagnostic::warning(
                DiagnosticKind::AmbiguousConstructor,
                format!(
                    "multiple constructors of '{}' bind {best} parameters; using the first declared",
                    ctx.catalog.name(target.id)
                ),
            ));
        }
        at_best[0]
    };

    let (_, args) = candidates.swap_remove(chosen);
    let consumed = args
        .iter()
        .map(|(_, m)| m.target.first().to_string())
        .collect();
    Some((args, consumed))
}

/// Bind every non-optional parameter to a matched member by name.
fn satisfiable(
    constructor: &Constructor,
    set: &MemberMatchSet,
) -> Option<Vec<(Parameter, MemberMatch)>> {
    let mut args = Vec::new();
    for param in &constructor.params {
        let found = set.matches.iter().find(|m| {
            m.target.len() == 1 && m.target.first().eq_ignore_ascii_case(&param.name)
        });
        match found {
            Some(member_match) => args.push((param.clone(), member_match.clone())),
            None if param.optional => {}
            None => return None,
        }
    }
    Some(args)
}

fn build_constructor_args(
    ctx: &mut ResolutionContext,
    args: Vec<(Parameter, MemberMatch)>,
) -> Vec<ConstructorArg> {
    let mut built = Vec::new();
    for (param, member_match) in args {
        ctx.push_location(member_match.target.to_string());
        let plan = resolve_member_value(
            ctx,
            member_match.source_ty,
            param.ty,
            member_match.format.as_deref(),
        );
        ctx.pop_location();
        if plan.is_error() {
            continue;
        }
        built.push(ConstructorArg {
            param: param.name,
            value: ValueBinding {
                source: member_match.source_path(),
                plan,
            },
        });
    }
    built
}

/// Convert one matched member; `None` when the value conversion failed and
/// the member is dropped.
fn bind_member(ctx: &mut ResolutionContext, member_match: &MemberMatch) -> Option<MemberBinding> {
    ctx.push_location(member_match.target.to_string());
    let plan = resolve_member_value(
        ctx,
        member_match.source_ty,
        member_match.target_ty,
        member_match.format.as_deref(),
    );
    ctx.pop_location();
    if plan.is_error() {
        return None;
    }
    Some(MemberBinding {
        target: member_match.target.clone(),
        value: ValueBinding {
            source: member_match.source_path(),
            plan,
        },
    })
}

#[cfg(test)]
mod tests {
    use mapgen_model::{Member, TypeCatalog, TypeDescriptor};

    use super::*;
    use crate::registry::MappingRegistry;

    fn object_plan(plan: Plan) -> ObjectPlan {
        match plan.kind {
            PlanKind::Object(inner) => *inner,
            other => panic!("expected object plan, got {other:?}"),
        }
    }

    #[test]
    fn test_setter_based_construction() {
        let (mut catalog, builtins) = TypeCatalog::with_builtins();
        let string = TypeRef::non_null(builtins.string);
        let int = TypeRef::non_null(builtins.i32);
        let person = catalog
            .insert(
                TypeDescriptor::object("Person")
                    .member(Member::new("Name", string))
                    .member(Member::new("Age", int)),
            )
            .map(TypeRef::non_null)
            .unwrap();
        let dto = catalog
            .insert(
                TypeDescriptor::object("PersonDto")
                    .member(Member::new("Name", string))
                    .member(Member::new("Age", TypeRef::non_null(builtins.i64))),
            )
            .map(TypeRef::non_null)
            .unwrap();

        let mut ctx = ResolutionContext::new(&catalog, MappingRegistry::new());
        let plan = object_plan(resolve_object(&mut ctx, person, dto, false));

        let ctor = plan.constructor.unwrap();
        assert!(ctor.args.is_empty());
        assert_eq!(plan.assignments.len(), 2);
        assert_eq!(plan.assignments[1].value.plan.tag(), "direct");
        assert!(plan.initializers.is_empty());
    }

    #[test]
    fn test_constructor_args_and_initializers() {
        let (mut catalog, builtins) = TypeCatalog::with_builtins();
        let string = TypeRef::non_null(builtins.string);
        let int = TypeRef::non_null(builtins.i32);
        let person = catalog
            .insert(
                TypeDescriptor::object("Person")
                    .member(Member::new("Id", int))
                    .member(Member::new("Name", string))
                    .member(Member::new("Note", string)),
            )
            .map(TypeRef::non_null)
            .unwrap();
        let dto = catalog
            .insert(
                TypeDescriptor::object("PersonDto")
                    .without_parameterless_constructor()
                    .constructor(Constructor::new(vec![Parameter::new("id", int)]))
                    .member(Member::new("Id", int).read_only())
                    .member(Member::new("Name", string).init_only())
                    .member(Member::new("Note", string)),
            )
            .map(TypeRef::non_null)
            .unwrap();

        let mut ctx = ResolutionContext::new(&catalog, MappingRegistry::new());
        let plan = object_plan(resolve_object(&mut ctx, person, dto, false));

        let ctor = plan.constructor.unwrap();
        assert_eq!(ctor.args.len(), 1);
        assert_eq!(ctor.args[0].param, "id");
        assert_eq!(ctor.args[0].value.source.to_string(), "source.Id");
        assert_eq!(plan.initializers.len(), 1);
        assert_eq!(plan.initializers[0].target.to_string(), "Name");
        assert_eq!(plan.assignments.len(), 1);
        assert_eq!(plan.assignments[0].target.to_string(), "Note");
    }

    #[test]
    fn test_designated_constructor_wins() {
        let (mut catalog, builtins) = TypeCatalog::with_builtins();
        let string = TypeRef::non_null(builtins.string);
        let int = TypeRef::non_null(builtins.i32);
        let person = catalog
            .insert(
                TypeDescriptor::object("Person")
                    .member(Member::new("Id", int))
                    .member(Member::new("Name", string)),
            )
            .map(TypeRef::non_null)
            .unwrap();
        let dto = catalog
            .insert(
                TypeDescriptor::object("PersonDto")
                    .constructor(
                        Constructor::new(vec![
                            Parameter::new("id", int),
                            Parameter::new("name", string),
                        ]),
                    )
                    .constructor(Constructor::new(vec![Parameter::new("id", int)]).designated())
                    .member(Member::new("Id", int).read_only())
                    .member(Member::new("Name", string)),
            )
            .map(TypeRef::non_null)
            .unwrap();

        let mut ctx = ResolutionContext::new(&catalog, MappingRegistry::new());
        let plan = object_plan(resolve_object(&mut ctx, person, dto, false));
        assert_eq!(plan.constructor.unwrap().args.len(), 1);
        assert!(ctx.diagnostics.is_empty());
    }

    #[test]
    fn test_no_suitable_constructor_is_an_error() {
        let (mut catalog, builtins) = TypeCatalog::with_builtins();
        let guid = TypeRef::non_null(builtins.guid);
        let person = catalog
            .insert(TypeDescriptor::object("Person"))
            .map(TypeRef::non_null)
            .unwrap();
        let dto = catalog
            .insert(
                TypeDescriptor::object("PersonDto")
                    .without_parameterless_constructor()
                    .constructor(Constructor::new(vec![Parameter::new("token", guid)])),
            )
            .map(TypeRef::non_null)
            .unwrap();

        let mut ctx = ResolutionContext::new(&catalog, MappingRegistry::new());
        let plan = resolve_object(&mut ctx, person, dto, false);
        assert!(plan.is_error());
        assert!(ctx.diagnostics.iter().any(|d| {
            d.kind == DiagnosticKind::NoSuitableConstructor
        }));
    }

    #[test]
    fn test_existing_target_skips_constructor_and_init_only() {
        let (mut catalog, builtins) = TypeCatalog::with_builtins();
        let string = TypeRef::non_null(builtins.string);
        let person = catalog
            .insert(
                TypeDescriptor::object("Person")
                    .member(Member::new("Name", string))
                    .member(Member::new("Tag", string)),
            )
            .map(TypeRef::non_null)
            .unwrap();
        let dto = catalog
            .insert(
                TypeDescriptor::object("PersonDto")
                    .member(Member::new("Name", string))
                    .member(Member::new("Tag", string).init_only()),
            )
            .map(TypeRef::non_null)
            .unwrap();

        let mut ctx = ResolutionContext::new(&catalog, MappingRegistry::new());
        let plan = object_plan(resolve_object(&mut ctx, person, dto, true));
        assert!(plan.constructor.is_none());
        assert!(plan.existing_target);
        assert_eq!(plan.assignments.len(), 1);
        assert!(plan.initializers.is_empty());
        assert!(ctx.diagnostics.iter().any(|d| {
            d.kind == DiagnosticKind::CannotMapToReadOnlyMember
        }));
    }

    #[test]
    fn test_required_member_without_source_is_an_error() {
        let (mut catalog, builtins) = TypeCatalog::with_builtins();
        let string = TypeRef::non_null(builtins.string);
        let person = catalog
            .insert(TypeDescriptor::object("Person"))
            .map(TypeRef::non_null)
            .unwrap();
        let dto = catalog
            .insert(
                TypeDescriptor::object("PersonDto")
                    .member(Member::new("Name", string).required()),
            )
            .map(TypeRef::non_null)
            .unwrap();

        let mut ctx = ResolutionContext::new(&catalog, MappingRegistry::new());
        resolve_object(&mut ctx, person, dto, false);
        assert!(ctx.diagnostics.iter().any(|d| {
            d.kind == DiagnosticKind::CouldNotCreateMapping && d.severity.is_error()
        }));
    }
}
