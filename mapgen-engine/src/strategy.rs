//! The conversion strategy precedence chain.
//!
//! `resolve_conversion` is the single entry point for turning a (source,
//! target) pair into a plan node: strategies are tried in a fixed order on
//! the non-nullable core types, the first applicable one wins, and the
//! result is wrapped with null handling. When nothing applies the pair
//! degrades to an error node plus a diagnostic.

use mapgen_ir::{DispatchArm, DispatchPlan, Plan, PlanKind, TemporalConversion};
use mapgen_model::{SpecialType, TypeClass, TypeRef, classify, explicit_numeric_conversion,
    implicit_numeric_conversion};

use crate::collections;
use crate::config::ConversionKind;
use crate::context::ResolutionContext;
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::enums;
use crate::null_safety;
use crate::object::resolve_object;

/// Resolve a conversion between two use-site type references.
pub fn resolve_conversion(ctx: &mut ResolutionContext, source: TypeRef, target: TypeRef) -> Plan {
    let mut core = resolve_core(ctx, source.as_non_null(), target.as_non_null());
    // a nullable dispatch input falls through to null instead of testing arms
    if let PlanKind::Dispatch(dispatch) = &mut core.kind {
        dispatch.null_fallthrough = source.nullable && target.nullable;
    }
    null_safety::wrap(ctx, source, target, core)
}

/// Resolve a member value, routing a format string to the string
/// conversion when one is configured.
pub fn resolve_member_value(
    ctx: &mut ResolutionContext,
    source: TypeRef,
    target: TypeRef,
    format: Option<&str>,
) -> Plan {
    if let Some(format) = format {
        if matches!(classify(ctx.catalog, target.as_non_null()), TypeClass::String) {
            let core = Plan::new(
                source.as_non_null(),
                target.as_non_null(),
                PlanKind::Stringify {
                    format: Some(format.to_string()),
                },
            );
            return null_safety::wrap(ctx, source, target, core);
        }
        ctx.report(Diagnostic::warning(
            DiagnosticKind::ConfigurationConflict,
            format!(
                "format string '{format}' ignored: target '{}' is not a string",
                ctx.catalog.name(target.id)
            ),
        ));
    }
    resolve_conversion(ctx, source, target)
}

fn resolve_core(ctx: &mut ResolutionContext, source: TypeRef, target: TypeRef) -> Plan {
    let at_root = ctx.take_root();
    let enabled = |ctx: &ResolutionContext, kind| ctx.config.is_enabled(kind);

    if enabled(ctx, ConversionKind::DerivedDispatch) {
        if let Some(plan) = try_dispatch(ctx, source, target) {
            return plan;
        }
    }

    if source.id == target.id {
        if let Some(plan) = try_identity(ctx, source, target, at_root) {
            return plan;
        }
    }

    // reuse before synthesis: an applicable declared method always wins,
    // even over assignment-compatible pairs
    let exclude = at_root.then(|| ctx.method_name.clone());
    if let Some(declaration) =
        ctx.registry
            .find_reusable(ctx.catalog, source, target, exclude.as_deref())
    {
        return Plan::new(
            source,
            target,
            PlanKind::Delegate {
                method: declaration.name.clone(),
            },
        );
    }

    if enabled(ctx, ConversionKind::Direct) && try_direct(ctx, source, target) {
        return Plan::new(source, target, PlanKind::Direct);
    }

    if enabled(ctx, ConversionKind::ExplicitCast) && try_cast(ctx, source, target) {
        return Plan::new(source, target, PlanKind::Cast);
    }

    if enabled(ctx, ConversionKind::InstanceMethod) {
        if let Some(method) = find_instance_method(ctx, source, target) {
            return Plan::new(source, target, PlanKind::InstanceMethod { method });
        }
    }

    if enabled(ctx, ConversionKind::StaticFactory) {
        if let Some(method) = find_static_factory(ctx, source, target) {
            return Plan::new(source, target, PlanKind::StaticFactory { method });
        }
    }

    if enabled(ctx, ConversionKind::SourceConstructor) && has_source_constructor(ctx, source, target)
    {
        return Plan::new(source, target, PlanKind::SourceConstructor);
    }

    let source_class = classify(ctx.catalog, source);
    let target_class = classify(ctx.catalog, target);

    if enabled(ctx, ConversionKind::EnumMapping) {
        match (&source_class, &target_class) {
            (TypeClass::Enum, TypeClass::Enum) => return enums::enum_to_enum(ctx, source, target),
            (TypeClass::Enum, TypeClass::String) => {
                return enums::enum_to_string(ctx, source, target);
            }
            (TypeClass::String, TypeClass::Enum) => {
                return enums::string_to_enum(ctx, source, target);
            }
            _ => {}
        }
    }

    if enabled(ctx, ConversionKind::Parse)
        && matches!(source_class, TypeClass::String)
        && let Some(format_provider) = find_parse_method(ctx, target)
    {
        return Plan::new(source, target, PlanKind::Parse { format_provider });
    }

    if enabled(ctx, ConversionKind::Stringify) && matches!(target_class, TypeClass::String) {
        return Plan::new(source, target, PlanKind::Stringify { format: None });
    }

    if enabled(ctx, ConversionKind::Temporal)
        && let Some(temporal) = temporal_conversion(&source_class, &target_class)
    {
        return Plan::new(source, target, PlanKind::Temporal(temporal));
    }

    if enabled(ctx, ConversionKind::Dictionary)
        && let (TypeClass::Dictionary(sk, sv), TypeClass::Dictionary(tk, tv)) =
            (&source_class, &target_class)
    {
        return collections::dictionary(ctx, source, target, (*sk, *sv), (*tk, *tv));
    }

    if enabled(ctx, ConversionKind::Collection)
        && let (Some(source_element), Some(target_element)) =
            (element_of(&source_class), element_of(&target_class))
    {
        return collections::collection(ctx, source, target, source_element, target_element);
    }

    if enabled(ctx, ConversionKind::Tuple)
        && let (TypeClass::Tuple(source_elements), TypeClass::Tuple(target_elements)) =
            (&source_class, &target_class)
        && source_elements.len() == target_elements.len()
    {
        let elements: Vec<Plan> = source_elements
            .clone()
            .into_iter()
            .zip(target_elements.clone())
            .map(|(s, t)| resolve_conversion(ctx, s, t))
            .collect();
        if elements.iter().any(Plan::is_error) {
            return Plan::error(source, target);
        }
        return Plan::new(source, target, PlanKind::Tuple(elements));
    }

    if enabled(ctx, ConversionKind::ObjectConstruction)
        && matches!(source_class, TypeClass::Object)
        && matches!(target_class, TypeClass::Object)
    {
        return resolve_object_pair(ctx, source, target, at_root);
    }

    // same-type mutable pair with cloning requested lands here too
    if source.id == target.id
        && enabled(ctx, ConversionKind::ObjectConstruction)
        && matches!(target_class, TypeClass::Object)
    {
        return resolve_object_pair(ctx, source, target, at_root);
    }

    ctx.report(Diagnostic::error(
        DiagnosticKind::CouldNotCreateMapping,
        format!(
            "no conversion from '{}' to '{}'",
            ctx.catalog.name(source.id),
            ctx.catalog.name(target.id)
        ),
    ));
    Plan::error(source, target)
}

/// Same-type handling: identity unless cloning asks for reconstruction.
fn try_identity(
    ctx: &mut ResolutionContext,
    source: TypeRef,
    target: TypeRef,
    at_root: bool,
) -> Option<Plan> {
    use crate::config::Cloning;

    let descriptor = ctx.catalog.get(source.id);
    let identity = Plan::new(source, target, PlanKind::Identity);
    if descriptor.immutable || descriptor.special.is_some() || descriptor.enum_info.is_some() {
        return Some(identity);
    }
    match ctx.config.cloning {
        Cloning::None => Some(identity),
        // shallow: rebuild the root, share everything below it
        Cloning::Shallow if !at_root => Some(identity),
        Cloning::Shallow | Cloning::Deep => None,
    }
}

fn try_direct(ctx: &ResolutionContext, source: TypeRef, target: TypeRef) -> bool {
    let source_desc = ctx.catalog.get(source.id);
    let target_desc = ctx.catalog.get(target.id);

    if let (Some(from), Some(to)) = (source_desc.special, target_desc.special)
        && implicit_numeric_conversion(from, to)
    {
        return true;
    }
    if source.id != target.id && ctx.catalog.is_assignable(source.id, target.id) {
        return true;
    }
    operator_exists(ctx, source, target, true)
}

fn try_cast(ctx: &ResolutionContext, source: TypeRef, target: TypeRef) -> bool {
    let source_desc = ctx.catalog.get(source.id);
    let target_desc = ctx.catalog.get(target.id);

    if let (Some(from), Some(to)) = (source_desc.special, target_desc.special)
        && explicit_numeric_conversion(from, to)
    {
        return true;
    }
    // enum <-> numeric casts through the underlying representation
    let numeric = |desc: &mapgen_model::TypeDescriptor| {
        desc.special.is_some_and(|s| s.is_numeric() || s == SpecialType::Char)
    };
    if source_desc.enum_info.is_some() && numeric(target_desc) {
        return true;
    }
    if numeric(source_desc) && target_desc.enum_info.is_some() {
        return true;
    }
    operator_exists(ctx, source, target, false)
}

fn operator_exists(
    ctx: &ResolutionContext,
    source: TypeRef,
    target: TypeRef,
    implicit: bool,
) -> bool {
    let matches_op = |desc: &mapgen_model::TypeDescriptor| {
        desc.conversions
            .iter()
            .any(|op| op.from == source.id && op.to == target.id && op.implicit == implicit)
    };
    matches_op(ctx.catalog.get(source.id)) || matches_op(ctx.catalog.get(target.id))
}

/// An instance `To<TargetName>()` conversion method on the source. Array
/// targets also accept `To<ElementName>Array()`.
fn find_instance_method(
    ctx: &ResolutionContext,
    source: TypeRef,
    target: TypeRef,
) -> Option<String> {
    let mut names = vec![format!("To{}", alnum(ctx.catalog.name(target.id)))];
    if let TypeClass::Array(element) = classify(ctx.catalog, target) {
        names.push(format!("To{}Array", alnum(ctx.catalog.name(element.id))));
    }
    ctx.catalog
        .get(source.id)
        .methods
        .iter()
        .find(|m| {
            !m.is_static
                && m.params.is_empty()
                && m.returns.id == target.id
                && names.iter().any(|n| n.eq_ignore_ascii_case(&m.name))
        })
        .map(|m| m.name.clone())
}

/// A static `Create`/`CreateFrom`/`From`/`From<SourceName>` factory on the
/// target accepting the source. Names match case-insensitively.
fn find_static_factory(
    ctx: &ResolutionContext,
    source: TypeRef,
    target: TypeRef,
) -> Option<String> {
    let from_source = format!("From{}", alnum(ctx.catalog.name(source.id)));
    let names = ["Create", "CreateFrom", "From", from_source.as_str()];
    ctx.catalog
        .get(target.id)
        .methods
        .iter()
        .find(|m| {
            m.is_static
                && m.returns.id == target.id
                && m.params.len() == 1
                && m.params[0].id == source.id
                && names.iter().any(|n| n.eq_ignore_ascii_case(&m.name))
        })
        .map(|m| m.name.clone())
}

fn has_source_constructor(ctx: &ResolutionContext, source: TypeRef, target: TypeRef) -> bool {
    ctx.catalog.get(target.id).constructors.iter().any(|c| {
        c.required_params() == 1
            && c.params
                .iter()
                .find(|p| !p.optional)
                .is_some_and(|p| p.ty.id == source.id)
    })
}

/// A static `Parse(string)` on the target; the bool is whether it takes a
/// format provider.
fn find_parse_method(ctx: &ResolutionContext, target: TypeRef) -> Option<bool> {
    let target_desc = ctx.catalog.get(target.id);
    target_desc
        .methods
        .iter()
        .find(|m| {
            m.is_static
                && m.name == "Parse"
                && m.returns.id == target.id
                && m.params.len() == 1
                && ctx
                    .catalog
                    .get(m.params[0].id)
                    .special
                    .is_some_and(|s| s == SpecialType::String)
        })
        .map(|m| m.format_provider)
}

fn temporal_conversion(
    source_class: &TypeClass,
    target_class: &TypeClass,
) -> Option<TemporalConversion> {
    use SpecialType::{DateOnly, DateTime, TimeOnly};
    let special = |class: &TypeClass| match class {
        TypeClass::Special(special) => Some(*special),
        _ => None,
    };
    match (special(source_class)?, special(target_class)?) {
        (DateTime, DateOnly) => Some(TemporalConversion::DateTimeToDateOnly),
        (DateTime, TimeOnly) => Some(TemporalConversion::DateTimeToTimeOnly),
        (DateOnly, DateTime) => Some(TemporalConversion::DateOnlyToDateTime),
        (TimeOnly, DateTime) => Some(TemporalConversion::TimeOnlyToDateTime),
        _ => None,
    }
}

fn element_of(class: &TypeClass) -> Option<TypeRef> {
    match class {
        TypeClass::Array(element)
        | TypeClass::Set(element)
        | TypeClass::Collection(element)
        | TypeClass::Enumerable(element) => Some(*element),
        _ => None,
    }
}

/// Object pairs below the method root delegate to a memoized helper
/// method; the root pair is planned inline.
fn resolve_object_pair(
    ctx: &mut ResolutionContext,
    source: TypeRef,
    target: TypeRef,
    at_root: bool,
) -> Plan {
    if at_root {
        ctx.enter_pair(source.id, target.id);
        let plan = resolve_object(ctx, source, target, false);
        ctx.exit_pair();
        return plan;
    }

    if ctx.helper_depth + 1 > ctx.config.max_recursion_depth {
        ctx.report(Diagnostic::error(
            DiagnosticKind::MaxRecursionDepthExceeded,
            format!(
                "mapping '{}' to '{}' exceeds the maximum recursion depth of {}",
                ctx.catalog.name(source.id),
                ctx.catalog.name(target.id),
                ctx.config.max_recursion_depth
            ),
        ));
        return Plan::error(source, target);
    }

    let fingerprint = ctx.config.fingerprint();
    let (method, fresh) = ctx
        .registry
        .helper_name(ctx.catalog, source, target, fingerprint);
    if fresh {
        ctx.schedule_helper(method.clone(), source, target);
    }
    Plan::new(source, target, PlanKind::Delegate { method })
}

/// Polymorphic dispatch over registered derived pairs, when any apply to
/// this (source, target) pair.
fn try_dispatch(ctx: &mut ResolutionContext, source: TypeRef, target: TypeRef) -> Option<Plan> {
    let applicable: Vec<crate::config::DerivedTypePair> = ctx
        .config
        .derived_types
        .iter()
        .filter(|pair| {
            ctx.catalog.is_assignable(pair.source, source.id)
                && ctx.catalog.is_assignable(pair.target, target.id)
        })
        .copied()
        .collect();
    if applicable.is_empty() {
        return None;
    }

    let mut seen: Vec<mapgen_model::TypeId> = Vec::new();
    let mut pairs = Vec::new();
    for pair in applicable {
        if seen.contains(&pair.source) {
            ctx.report(Diagnostic::error(
                DiagnosticKind::AmbiguousDerivedType,
                format!(
                    "derived source type '{}' is registered more than once",
                    ctx.catalog.name(pair.source)
                ),
            ));
            continue;
        }
        seen.push(pair.source);
        pairs.push(pair);
    }
    // most derived source type tested first; registration order breaks ties
    pairs.sort_by_key(|pair| std::cmp::Reverse(ctx.catalog.inheritance_depth(pair.source)));

    // arms must not re-enter dispatch for the same registrations
    let saved = std::mem::take(&mut ctx.config.derived_types);
    let mut arms = Vec::new();
    for pair in pairs {
        let source_type = TypeRef::non_null(pair.source);
        let plan = resolve_conversion(ctx, source_type, TypeRef::non_null(pair.target));
        arms.push(DispatchArm { source_type, plan });
    }
    ctx.config.derived_types = saved;

    Some(Plan::new(
        source,
        target,
        PlanKind::Dispatch(Box::new(DispatchPlan {
            arms,
            null_fallthrough: false,
        })),
    ))
}

fn alnum(name: &str) -> String {
    name.chars().filter(|c| c.is_alphanumeric()).collect()
}
