//! Enum translation planning.
//!
//! Covers enum-to-enum translation under the configured strategy plus the
//! two string bridges (enum member names out, parsed names back in).

use mapgen_ir::{EnumArm, EnumPlan, Plan, PlanKind};
use mapgen_model::{EnumInfo, TypeRef};

use crate::config::{EnumStrategy, EnumValueMapping};
use crate::context::ResolutionContext;
use crate::diagnostic::{Diagnostic, DiagnosticKind};

/// Plan an enum-to-enum translation.
pub fn enum_to_enum(ctx: &mut ResolutionContext, source: TypeRef, target: TypeRef) -> Plan {
    let source_info = ctx.catalog.get(source.id).enum_info.clone();
    let target_info = ctx.catalog.get(target.id).enum_info.clone();
    let (Some(source_info), Some(target_info)) = (source_info, target_info) else {
        return Plan::error(source, target);
    };

    let plan = match ctx.config.enum_strategy {
        EnumStrategy::ByValue => by_value(ctx, &source_info, &target_info),
        EnumStrategy::ByValueCheckDefined => check_defined(ctx, &target_info),
        EnumStrategy::ByName => by_name(ctx, &source_info, &target_info),
    };
    Plan::new(source, target, PlanKind::Enum(plan))
}

/// Plan an enum-to-string bridge: each member renders to its (possibly
/// remapped and re-cased) name.
pub fn enum_to_string(ctx: &mut ResolutionContext, source: TypeRef, target: TypeRef) -> Plan {
    let Some(info) = ctx.catalog.get(source.id).enum_info.clone() else {
        return Plan::error(source, target);
    };
    let config = ctx.config.clone();
    report_duplicate_mappings(ctx, &config.enum_mappings, |m| m.source.as_str());

    let mut arms = Vec::new();
    for member in &info.members {
        if config.enum_ignores.contains(&member.name) {
            continue;
        }
        let rendered = config
            .enum_mappings
            .iter()
            .find(|m| m.source == member.name)
            .map(|m| m.target.clone())
            .unwrap_or_else(|| config.enum_naming.apply(&member.name));
        arms.push((member.name.clone(), rendered));
    }

    Plan::new(source, target, PlanKind::Enum(EnumPlan::ToNames { arms }))
}

/// Plan a string-to-enum bridge: rendered names parse back to members, with
/// an optional fallback member for unknown input.
pub fn string_to_enum(ctx: &mut ResolutionContext, source: TypeRef, target: TypeRef) -> Plan {
    let Some(info) = ctx.catalog.get(target.id).enum_info.clone() else {
        return Plan::error(source, target);
    };
    let config = ctx.config.clone();
    report_duplicate_mappings(ctx, &config.enum_mappings, |m| m.target.as_str());

    let mut arms = Vec::new();
    for member in &info.members {
        if config.enum_ignores.contains(&member.name) {
            continue;
        }
        let rendered = config
            .enum_mappings
            .iter()
            .find(|m| m.target == member.name)
            .map(|m| m.source.clone())
            .unwrap_or_else(|| config.enum_naming.apply(&member.name));
        arms.push((rendered, member.name.clone()));
    }

    let fallback = validated_fallback(ctx, &info);
    Plan::new(
        source,
        target,
        PlanKind::Enum(EnumPlan::FromNames {
            arms,
            case_insensitive: config.enum_ignore_case,
            fallback,
        }),
    )
}

fn by_value(
    ctx: &mut ResolutionContext,
    source_info: &EnumInfo,
    target_info: &EnumInfo,
) -> EnumPlan {
    // a by-value cast never consults the fallback member
    if let Some(fallback) = ctx.config.enum_fallback.clone() {
        ctx.report(Diagnostic::error(
            DiagnosticKind::ConfigurationConflict,
            format!(
                "enum fallback '{fallback}' requires the by-name or check-defined strategy; \
                 ignored under by-value"
            ),
        ));
    }
    // a plain cast cannot fail at runtime, but values without a defined
    // target member silently produce an undefined enum value
    for member in &source_info.members {
        if ctx.config.enum_ignores.contains(&member.name) {
            continue;
        }
        if !target_info.members.iter().any(|t| t.value == member.value) {
            ctx.report(Diagnostic::info(
                DiagnosticKind::SourceEnumValueNotMapped,
                format!(
                    "source enum member '{}' ({}) has no target member with the same value",
                    member.name, member.value
                ),
            ));
        }
    }
    EnumPlan::ByValue
}

fn check_defined(ctx: &mut ResolutionContext, target_info: &EnumInfo) -> EnumPlan {
    let mut values: Vec<i64> = target_info.members.iter().map(|m| m.value).collect();
    values.sort_unstable();
    values.dedup();
    EnumPlan::CheckDefined {
        flags: target_info.flags,
        values,
        fallback: validated_fallback(ctx, target_info),
    }
}

fn by_name(
    ctx: &mut ResolutionContext,
    source_info: &EnumInfo,
    target_info: &EnumInfo,
) -> EnumPlan {
    let config = ctx.config.clone();
    let fallback = validated_fallback(ctx, target_info);
    report_duplicate_mappings(ctx, &config.enum_mappings, |m| m.source.as_str());

    for mapping in &config.enum_mappings {
        if source_info.member(&mapping.source).is_none() {
            ctx.report(Diagnostic::warning(
                DiagnosticKind::UnusedMappingConfiguration,
                format!("enum mapping source '{}' is not a member", mapping.source),
            ));
        }
        if target_info.member(&mapping.target).is_none() {
            ctx.report(Diagnostic::warning(
                DiagnosticKind::UnusedMappingConfiguration,
                format!("enum mapping target '{}' is not a member", mapping.target),
            ));
        }
    }

    let mut arms = Vec::new();
    for member in &source_info.members {
        if config.enum_ignores.contains(&member.name) {
            continue;
        }
        let target_name = config
            .enum_mappings
            .iter()
            .find(|m| m.source == member.name)
            .map(|m| m.target.clone())
            .or_else(|| {
                target_info
                    .members
                    .iter()
                    .find(|t| {
                        if config.enum_ignore_case {
                            t.name.eq_ignore_ascii_case(&member.name)
                        } else {
                            t.name == member.name
                        }
                    })
                    .map(|t| t.name.clone())
            });

        match target_name {
            Some(target_name) if target_info.member(&target_name).is_some() => {
                arms.push(EnumArm {
                    source: member.name.clone(),
                    target: target_name,
                });
            }
            _ => {
                let diagnostic = if fallback.is_some() {
                    Diagnostic::warning(
                        DiagnosticKind::SourceEnumValueNotMapped,
                        format!(
                            "source enum member '{}' falls back to the default target",
                            member.name
                        ),
                    )
                } else {
                    Diagnostic::error(
                        DiagnosticKind::SourceEnumValueNotMapped,
                        format!("source enum member '{}' has no target member", member.name),
                    )
                };
                ctx.report(diagnostic);
            }
        }
    }

    for member in &target_info.members {
        if !arms.iter().any(|arm| arm.target == member.name) {
            ctx.report(Diagnostic::info(
                DiagnosticKind::TargetEnumValueNotMapped,
                format!(
                    "target enum member '{}' is never produced",
                    member.name
                ),
            ));
        }
    }

    EnumPlan::ByName { arms, fallback }
}

/// Report explicit mappings registered more than once for the same key;
/// the first registration stays in effect.
fn report_duplicate_mappings(
    ctx: &mut ResolutionContext,
    mappings: &[EnumValueMapping],
    key: fn(&EnumValueMapping) -> &str,
) {
    let mut seen: Vec<&str> = Vec::new();
    for mapping in mappings {
        let name = key(mapping);
        if seen.contains(&name) {
            ctx.report(Diagnostic::error(
                DiagnosticKind::ConfigurationConflict,
                format!(
                    "enum member '{name}' has more than one explicit mapping; \
                     the first one wins"
                ),
            ));
        } else {
            seen.push(name);
        }
    }
}

/// The configured fallback member, dropped with a diagnostic when it does
/// not exist on the target enum.
fn validated_fallback(ctx: &mut ResolutionContext, target_info: &EnumInfo) -> Option<String> {
    let fallback = ctx.config.enum_fallback.clone()?;
    if target_info.member(&fallback).is_some() {
        Some(fallback)
    } else {
        ctx.report(Diagnostic::warning(
            DiagnosticKind::ConfigurationConflict,
            format!("enum fallback '{fallback}' is not a target member; ignored"),
        ));
        None
    }
}

#[cfg(test)]
mod tests {
    use mapgen_model::{TypeCatalog, TypeDescriptor};

    use super::*;
    use crate::config::{EnumValueMapping, NamingStrategy};
    use crate::registry::MappingRegistry;

    fn enums() -> (TypeCatalog, TypeRef, TypeRef) {
        let (mut catalog, builtins) = TypeCatalog::with_builtins();
        let color = catalog
            .insert(TypeDescriptor::enumeration(
                "Color",
                builtins.i32,
                vec![("Red", 0), ("Green", 1), ("Blue", 2)],
            ))
            .unwrap();
        let paint = catalog
            .insert(TypeDescriptor::enumeration(
                "Paint",
                builtins.i32,
                vec![("Red", 0), ("Green", 1), ("Yellow", 3)],
            ))
            .unwrap();
        (catalog, TypeRef::non_null(color), TypeRef::non_null(paint))
    }

    #[test]
    fn test_by_value_flags_missing_values() {
        let (catalog, color, paint) = enums();
        let mut ctx = ResolutionContext::new(&catalog, MappingRegistry::new());
        let plan = enum_to_enum(&mut ctx, color, paint);
        assert!(matches!(plan.kind, PlanKind::Enum(EnumPlan::ByValue)));
        // Blue (2) has no Paint member with value 2
        assert_eq!(
            ctx.diagnostics[0].kind,
            DiagnosticKind::SourceEnumValueNotMapped
        );
    }

    #[test]
    fn test_check_defined_collects_target_values() {
        let (catalog, color, paint) = enums();
        let mut ctx = ResolutionContext::new(&catalog, MappingRegistry::new());
        ctx.config.enum_strategy = EnumStrategy::ByValueCheckDefined;
        let plan = enum_to_enum(&mut ctx, color, paint);
        match plan.kind {
            PlanKind::Enum(EnumPlan::CheckDefined { values, flags, .. }) => {
                assert_eq!(values, [0, 1, 3]);
                assert!(!flags);
            }
            other => panic!("expected check-defined, got {other:?}"),
        }
    }

    #[test]
    fn test_by_name_with_explicit_mapping_and_fallback() {
        let (catalog, color, paint) = enums();
        let mut ctx = ResolutionContext::new(&catalog, MappingRegistry::new());
        ctx.config.enum_strategy = EnumStrategy::ByName;
        ctx.config.enum_mappings.push(EnumValueMapping::new("Blue", "Yellow"));
        ctx.config.enum_fallback = Some("Red".into());

        let plan = enum_to_enum(&mut ctx, color, paint);
        match plan.kind {
            PlanKind::Enum(EnumPlan::ByName { arms, fallback }) => {
                assert_eq!(arms.len(), 3);
                assert_eq!(arms[2].source, "Blue");
                assert_eq!(arms[2].target, "Yellow");
                assert_eq!(fallback.as_deref(), Some("Red"));
            }
            other => panic!("expected by-name, got {other:?}"),
        }
    }

    #[test]
    fn test_by_name_unmatched_without_fallback_is_error() {
        let (catalog, color, paint) = enums();
        let mut ctx = ResolutionContext::new(&catalog, MappingRegistry::new());
        ctx.config.enum_strategy = EnumStrategy::ByName;
        enum_to_enum(&mut ctx, color, paint);
        assert!(ctx.diagnostics.iter().any(|d| {
            d.kind == DiagnosticKind::SourceEnumValueNotMapped && d.severity.is_error()
        }));
    }

    #[test]
    fn test_string_bridges_apply_naming() {
        let (mut catalog, builtins) = TypeCatalog::with_builtins();
        let color = catalog
            .insert(TypeDescriptor::enumeration(
                "Color",
                builtins.i32,
                vec![("DarkRed", 0), ("LightBlue", 1)],
            ))
            .map(TypeRef::non_null)
            .unwrap();
        let string = TypeRef::non_null(builtins.string);

        let mut ctx = ResolutionContext::new(&catalog, MappingRegistry::new());
        ctx.config.enum_naming = NamingStrategy::KebabCase;
        let out = enum_to_string(&mut ctx, color, string);
        match out.kind {
            PlanKind::Enum(EnumPlan::ToNames { arms }) => {
                assert_eq!(arms[0], ("DarkRed".into(), "dark-red".into()));
            }
            other => panic!("expected to-names, got {other:?}"),
        }

        let back = string_to_enum(&mut ctx, string, color);
        match back.kind {
            PlanKind::Enum(EnumPlan::FromNames { arms, fallback, .. }) => {
                assert_eq!(arms[1], ("light-blue".into(), "LightBlue".into()));
                assert!(fallback.is_none());
            }
            other => panic!("expected from-names, got {other:?}"),
        }
    }

    #[test]
    fn test_by_value_rejects_fallback() {
        let (catalog, color, paint) = enums();
        let mut ctx = ResolutionContext::new(&catalog, MappingRegistry::new());
        ctx.config.enum_fallback = Some("Red".into());
        let plan = enum_to_enum(&mut ctx, color, paint);
        assert!(matches!(plan.kind, PlanKind::Enum(EnumPlan::ByValue)));
        assert!(ctx.diagnostics.iter().any(|d| {
            d.kind == DiagnosticKind::ConfigurationConflict && d.severity.is_error()
        }));
    }

    #[test]
    fn test_duplicate_explicit_mapping_reported_first_wins() {
        let (catalog, color, paint) = enums();
        let mut ctx = ResolutionContext::new(&catalog, MappingRegistry::new());
        ctx.config.enum_strategy = EnumStrategy::ByName;
        ctx.config.enum_mappings.push(EnumValueMapping::new("Blue", "Yellow"));
        ctx.config.enum_mappings.push(EnumValueMapping::new("Blue", "Red"));

        let plan = enum_to_enum(&mut ctx, color, paint);
        match plan.kind {
            PlanKind::Enum(EnumPlan::ByName { arms, .. }) => {
                let blue = arms.iter().find(|a| a.source == "Blue").unwrap();
                assert_eq!(blue.target, "Yellow");
            }
            other => panic!("expected by-name, got {other:?}"),
        }
        assert!(ctx.diagnostics.iter().any(|d| {
            d.kind == DiagnosticKind::ConfigurationConflict && d.severity.is_error()
        }));
    }

    #[test]
    fn test_duplicate_mapping_reported_on_string_bridges() {
        let (mut catalog, builtins) = TypeCatalog::with_builtins();
        let color = catalog
            .insert(TypeDescriptor::enumeration(
                "Color",
                builtins.i32,
                vec![("Red", 0), ("Green", 1)],
            ))
            .map(TypeRef::non_null)
            .unwrap();
        let string = TypeRef::non_null(builtins.string);

        let mut ctx = ResolutionContext::new(&catalog, MappingRegistry::new());
        ctx.config.enum_mappings.push(EnumValueMapping::new("Red", "crimson"));
        ctx.config.enum_mappings.push(EnumValueMapping::new("Red", "scarlet"));
        let out = enum_to_string(&mut ctx, color, string);
        match out.kind {
            PlanKind::Enum(EnumPlan::ToNames { arms }) => {
                assert_eq!(arms[0], ("Red".into(), "crimson".into()));
            }
            other => panic!("expected to-names, got {other:?}"),
        }
        assert!(ctx.diagnostics.iter().any(|d| {
            d.kind == DiagnosticKind::ConfigurationConflict
        }));

        // the reverse bridge keys duplicates on the target member
        ctx.diagnostics.clear();
        ctx.config.enum_mappings = vec![
            EnumValueMapping::new("crimson", "Red"),
            EnumValueMapping::new("scarlet", "Red"),
        ];
        let back = string_to_enum(&mut ctx, string, color);
        match back.kind {
            PlanKind::Enum(EnumPlan::FromNames { arms, .. }) => {
                assert_eq!(arms[0], ("crimson".into(), "Red".into()));
            }
            other => panic!("expected from-names, got {other:?}"),
        }
        assert!(ctx.diagnostics.iter().any(|d| {
            d.kind == DiagnosticKind::ConfigurationConflict
        }));
    }

    #[test]
    fn test_invalid_fallback_dropped() {
        let (catalog, color, paint) = enums();
        let mut ctx = ResolutionContext::new(&catalog, MappingRegistry::new());
        ctx.config.enum_strategy = EnumStrategy::ByName;
        ctx.config.enum_fallback = Some("Chartreuse".into());
        let plan = enum_to_enum(&mut ctx, color, paint);
        match plan.kind {
            PlanKind::Enum(EnumPlan::ByName { fallback, .. }) => assert!(fallback.is_none()),
            other => panic!("expected by-name, got {other:?}"),
        }
        assert!(ctx.diagnostics.iter().any(|d| {
            d.kind == DiagnosticKind::ConfigurationConflict
        }));
    }
}
