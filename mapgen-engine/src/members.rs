//! Source-to-target member matching.
//!
//! Matching is target-driven: every assignable target member looks for a
//! readable source path, first through explicit directives, then by name,
//! then by auto-flattening (`ValueId` finding `Value.Id`). Unmatched members
//! degrade to diagnostics whose severity follows the required-mapping
//! configuration.

use mapgen_ir::SourcePath;
use mapgen_model::{Member, MemberPath, TypeCatalog, TypeRef};

use crate::config::MappingConfiguration;
use crate::context::ResolutionContext;
use crate::diagnostic::{Diagnostic, DiagnosticKind, Severity};

/// One matched (target member, source path) pair awaiting conversion.
#[derive(Debug, Clone)]
pub struct MemberMatch {
    pub target: MemberPath,
    pub target_ty: TypeRef,
    /// Final target member is settable only during initialization.
    pub target_init_only: bool,
    /// Final target member must be set during initialization.
    pub target_required: bool,
    pub source: MemberPath,
    /// Source path type, made nullable when any hop is conditional.
    pub source_ty: TypeRef,
    /// The source path is rooted at an additional method parameter instead
    /// of the primary source.
    pub from_parameter: bool,
    /// Format string from the matching directive, if any.
    pub format: Option<String>,
}

impl MemberMatch {
    /// The bound source expression, rooted at the primary source or at an
    /// additional method parameter.
    pub fn source_path(&self) -> SourcePath {
        if self.from_parameter {
            let mut path = SourcePath::parameter(self.source.first());
            path.segments
                .extend(self.source.segments().iter().skip(1).cloned());
            path
        } else {
            SourcePath::member(&self.source)
        }
    }
}

/// The outcome of matching one (source, target) pair.
#[derive(Debug, Default)]
pub struct MemberMatchSet {
    pub matches: Vec<MemberMatch>,
    /// Names of assignable target members with no source.
    pub unmapped_targets: Vec<String>,
}

impl MemberMatchSet {
    /// The match assigning a given single-segment target member, if any.
    pub fn for_target(&self, name: &str) -> Option<&MemberMatch> {
        self.matches
            .iter()
            .find(|m| m.target.len() == 1 && m.target.first() == name)
    }
}

/// Match the members of a (source, target) pair under the current
/// configuration.
pub fn match_members(
    ctx: &mut ResolutionContext,
    source: TypeRef,
    target: TypeRef,
) -> MemberMatchSet {
    let config = ctx.config.clone();
    let catalog = ctx.catalog;
    let mut set = MemberMatchSet::default();
    // target member names claimed by a directive, source roots consumed
    let mut claimed_targets: Vec<String> = Vec::new();
    let mut consumed_sources: Vec<String> = Vec::new();

    for directive in &config.member_directives {
        let Some(resolved_target) =
            resolve_target_path(catalog, target, &directive.target, config.ignore_case)
        else {
            ctx.report(
                Diagnostic::warning(
                    DiagnosticKind::UnusedMappingConfiguration,
                    format!(
                        "member directive target '{}' does not exist on '{}' or cannot be set",
                        directive.target,
                        catalog.name(target.id)
                    ),
                )
                .at(directive.target.to_string()),
            );
            continue;
        };
        let Some((source_path_ty, optional_hops)) =
            resolve_source_path(catalog, source, &directive.source, config.ignore_case)
        else {
            ctx.report(
                Diagnostic::error(
                    DiagnosticKind::SourceMemberNotFound,
                    format!(
                        "member directive source '{}' does not exist on '{}' or cannot be read",
                        directive.source,
                        catalog.name(source.id)
                    ),
                )
                .at(directive.target.to_string()),
            );
            continue;
        };

        claimed_targets.push(directive.target.first().to_string());
        consumed_sources.push(directive.source.first().to_string());
        set.matches.push(MemberMatch {
            target: directive.target.clone(),
            target_ty: resolved_target.ty,
            target_init_only: resolved_target.init_only,
            target_required: resolved_target.required,
            source: directive.source.clone(),
            source_ty: adjust_for_hops(source_path_ty, optional_hops),
            from_parameter: false,
            format: directive.format.clone(),
        });
    }

    // additional parameters act as virtual source roots: a target member
    // named after one binds the parameter itself, unless the primary source
    // carries a member of that name (the primary always outranks), and in
    // declaration order so the first parameter wins a name tie
    let target_desc = catalog.get(target.id);
    let source_desc = catalog.get(source.id);
    for (param_name, param_ty) in ctx.extra_params.clone() {
        let Some(member) = target_desc.members.iter().find(|member| {
            target_eligible(member, &config)
                && names_equal(&member.name, &param_name, config.ignore_case)
                && !claimed_targets
                    .iter()
                    .any(|claimed| names_equal(claimed, &member.name, config.ignore_case))
        }) else {
            continue;
        };
        if find_by_name(source_desc, &member.name, &config).is_some() {
            continue;
        }
        claimed_targets.push(member.name.clone());
        set.matches.push(MemberMatch {
            target: MemberPath::single(member.name.clone()),
            target_ty: member.ty,
            target_init_only: member.init_only,
            target_required: member.required,
            source: MemberPath::single(param_name),
            source_ty: param_ty,
            from_parameter: true,
            format: None,
        });
    }

    for member in &target_desc.members {
        if !target_eligible(member, &config) {
            continue;
        }
        if claimed_targets
            .iter()
            .any(|claimed| names_equal(claimed, &member.name, config.ignore_case))
        {
            continue;
        }

        let found = find_by_name(source_desc, &member.name, &config)
            .map(|source_member| {
                (
                    MemberPath::single(source_member.name.clone()),
                    source_member.ty,
                    false,
                )
            })
            .or_else(|| {
                find_flattened(
                    catalog,
                    source.id,
                    &member.name,
                    &config,
                    config.auto_flatten_depth,
                )
            });

        let Some((source_path, source_path_ty, optional_hops)) = found else {
            let severity = if config.required.requires_target() {
                Severity::Error
            } else {
                Severity::Info
            };
            ctx.report(
                Diagnostic {
                    severity,
                    kind: DiagnosticKind::SourceMemberNotFound,
                    message: format!(
                        "no source member on '{}' maps to '{}.{}'",
                        catalog.name(source.id),
                        catalog.name(target.id),
                        member.name
                    ),
                    location: None,
                }
                .at(member.name.clone()),
            );
            set.unmapped_targets.push(member.name.clone());
            continue;
        };

        consumed_sources.push(source_path.first().to_string());
        set.matches.push(MemberMatch {
            target: MemberPath::single(member.name.clone()),
            target_ty: member.ty,
            target_init_only: member.init_only,
            target_required: member.required,
            source: source_path,
            source_ty: adjust_for_hops(source_path_ty, optional_hops),
            from_parameter: false,
            format: None,
        });
    }

    report_unused_sources(ctx, source, &config, &consumed_sources);
    set
}

fn report_unused_sources(
    ctx: &mut ResolutionContext,
    source: TypeRef,
    config: &MappingConfiguration,
    consumed: &[String],
) {
    let source_desc = ctx.catalog.get(source.id);
    let mut unused = Vec::new();
    for member in &source_desc.members {
        if !source_eligible(member, config) {
            continue;
        }
        if consumed
            .iter()
            .any(|name| names_equal(name, &member.name, config.ignore_case))
        {
            continue;
        }
        unused.push(member.name.clone());
    }

    let severity = if config.required.requires_source() {
        Severity::Error
    } else {
        Severity::Info
    };
    for name in unused {
        let message = format!(
            "source member '{}.{}' is not mapped to any target member",
            ctx.catalog.name(source.id),
            name
        );
        ctx.report(
            Diagnostic {
                severity,
                kind: DiagnosticKind::SourceMemberNotMapped,
                message,
                location: None,
            }
            .at(name),
        );
    }
}

fn target_eligible(member: &Member, config: &MappingConfiguration) -> bool {
    member.assignable()
        && member.visibility >= config.min_visibility
        && !config.ignored_targets.contains(&member.name)
        && !(member.obsolete && config.obsolete_exclusion.excludes_target())
}

fn source_eligible(member: &Member, config: &MappingConfiguration) -> bool {
    member.readable
        && member.visibility >= config.min_visibility
        && !config.ignored_sources.contains(&member.name)
        && !(member.obsolete && config.obsolete_exclusion.excludes_source())
}

fn names_equal(a: &str, b: &str, ignore_case: bool) -> bool {
    if ignore_case {
        a.eq_ignore_ascii_case(b)
    } else {
        a == b
    }
}

/// Find a readable source member by name under the configured casing rule.
fn find_by_name<'d>(
    descriptor: &'d mapgen_model::TypeDescriptor,
    name: &str,
    config: &MappingConfiguration,
) -> Option<&'d Member> {
    let member = if config.ignore_case {
        descriptor.find_member_ignore_case(name)?
    } else {
        descriptor.find_member(name)?
    };
    source_eligible(member, config).then_some(member)
}

/// Find a flattened source path whose concatenated member names spell the
/// target name (`ValueId` -> `Value.Id`). Returns the path, the final type,
/// and whether any hop is nullable.
fn find_flattened(
    catalog: &TypeCatalog,
    source: mapgen_model::TypeId,
    target_name: &str,
    config: &MappingConfiguration,
    depth: usize,
) -> Option<(MemberPath, TypeRef, bool)> {
    if depth == 0 {
        return None;
    }
    let descriptor = catalog.get(source);
    for member in &descriptor.members {
        if !source_eligible(member, config) {
            continue;
        }
        let Some(rest) = strip_name_prefix(target_name, &member.name, config.ignore_case) else {
            continue;
        };
        if rest.is_empty() {
            continue;
        }
        let inner = catalog.get(member.ty.id);
        if let Some(inner_member) = find_by_name(inner, rest, config) {
            return Some((
                MemberPath::single(member.name.clone()).child(inner_member.name.clone()),
                inner_member.ty,
                member.ty.nullable,
            ));
        }
        if let Some((path, ty, hops)) =
            find_flattened(catalog, member.ty.id, rest, config, depth - 1)
        {
            let mut full = MemberPath::single(member.name.clone());
            for segment in path.segments() {
                full = full.child(segment.clone());
            }
            return Some((full, ty, hops || member.ty.nullable));
        }
    }
    None
}

fn strip_name_prefix<'a>(name: &'a str, prefix: &str, ignore_case: bool) -> Option<&'a str> {
    if name.len() < prefix.len() {
        return None;
    }
    let (head, rest) = name.split_at(prefix.len());
    names_equal(head, prefix, ignore_case).then_some(rest)
}

struct ResolvedTarget {
    ty: TypeRef,
    init_only: bool,
    required: bool,
}

/// Walk a target path: intermediate segments must be readable, the final
/// segment must be assignable.
fn resolve_target_path(
    catalog: &TypeCatalog,
    target: TypeRef,
    path: &MemberPath,
    ignore_case: bool,
) -> Option<ResolvedTarget> {
    let mut current = target;
    let mut resolved = None;
    let last_index = path.len() - 1;

    for (index, segment) in path.segments().iter().enumerate() {
        let descriptor = catalog.get(current.id);
        let member = if ignore_case {
            descriptor.find_member_ignore_case(segment)?
        } else {
            descriptor.find_member(segment)?
        };
        if index < last_index {
            if !member.readable {
                return None;
            }
        } else if !member.assignable() {
            return None;
        }
        resolved = Some(ResolvedTarget {
            ty: member.ty,
            // nested target paths are set by plain assignment
            init_only: member.init_only && path.len() == 1,
            required: member.required && path.len() == 1,
        });
        current = member.ty;
    }
    resolved
}

/// Walk a source path: every segment must be readable. Returns the final
/// type and whether any non-final hop is nullable.
fn resolve_source_path(
    catalog: &TypeCatalog,
    source: TypeRef,
    path: &MemberPath,
    ignore_case: bool,
) -> Option<(TypeRef, bool)> {
    let mut current = source;
    let mut optional_hops = false;

    for (index, segment) in path.segments().iter().enumerate() {
        let descriptor = catalog.get(current.id);
        let member = if ignore_case {
            descriptor.find_member_ignore_case(segment)?
        } else {
            descriptor.find_member(segment)?
        };
        if !member.readable {
            return None;
        }
        if index + 1 < path.len() && member.ty.nullable {
            optional_hops = true;
        }
        current = member.ty;
    }
    Some((current, optional_hops))
}

fn adjust_for_hops(ty: TypeRef, optional_hops: bool) -> TypeRef {
    if optional_hops { ty.as_nullable() } else { ty }
}

#[cfg(test)]
mod tests {
    use mapgen_model::{TypeCatalog, TypeDescriptor};

    use super::*;
    use crate::config::{MemberDirective, RequiredMapping};
    use crate::registry::MappingRegistry;

    fn setup() -> (TypeCatalog, TypeRef, TypeRef) {
        let (mut catalog, builtins) = TypeCatalog::with_builtins();
        let string = TypeRef::non_null(builtins.string);
        let int = TypeRef::non_null(builtins.i32);

        let address = catalog
            .insert(
                TypeDescriptor::object("Address")
                    .member(Member::new("City", string))
                    .member(Member::new("Zip", string)),
            )
            .unwrap();
        let person = catalog
            .insert(
                TypeDescriptor::object("Person")
                    .member(Member::new("Name", string))
                    .member(Member::new("Age", int))
                    .member(Member::new("Address", TypeRef::nullable(address))),
            )
            .unwrap();
        let dto = catalog
            .insert(
                TypeDescriptor::object("PersonDto")
                    .member(Member::new("Name", string))
                    .member(Member::new("Age", int))
                    .member(Member::new("AddressCity", string)),
            )
            .unwrap();
        (catalog, TypeRef::non_null(person), TypeRef::non_null(dto))
    }

    #[test]
    fn test_name_and_flattening_matches() {
        let (catalog, person, dto) = setup();
        let mut ctx = ResolutionContext::new(&catalog, MappingRegistry::new());
        let set = match_members(&mut ctx, person, dto);

        assert_eq!(set.matches.len(), 3);
        assert!(set.for_target("Name").is_some());
        let flattened = set.for_target("AddressCity").unwrap();
        assert_eq!(flattened.source.to_string(), "Address.City");
        // the Address hop is nullable, so the flattened value is too
        assert!(flattened.source_ty.nullable);
        assert!(set.unmapped_targets.is_empty());
    }

    #[test]
    fn test_directive_overrides_name_match() {
        let (catalog, person, dto) = setup();
        let mut ctx = ResolutionContext::new(&catalog, MappingRegistry::new());
        ctx.config.member_directives.push(MemberDirective::new(
            MemberPath::single("Name"),
            MemberPath::parse("Address.Zip").unwrap(),
        ));
        let set = match_members(&mut ctx, person, dto);

        let name = set.for_target("Name").unwrap();
        assert_eq!(name.source.to_string(), "Address.Zip");
        // directive claimed Name, so only one match binds it
        assert_eq!(
            set.matches
                .iter()
                .filter(|m| m.target.first() == "Name")
                .count(),
            1
        );
    }

    #[test]
    fn test_unmatched_target_severity_follows_required() {
        let (mut catalog, builtins) = TypeCatalog::with_builtins();
        let string = TypeRef::non_null(builtins.string);
        let a = catalog
            .insert(TypeDescriptor::object("Empty"))
            .map(TypeRef::non_null)
            .unwrap();
        let b = catalog
            .insert(TypeDescriptor::object("Wanting").member(Member::new("Name", string)))
            .map(TypeRef::non_null)
            .unwrap();

        let mut ctx = ResolutionContext::new(&catalog, MappingRegistry::new());
        let set = match_members(&mut ctx, a, b);
        assert_eq!(set.unmapped_targets, ["Name"]);
        assert_eq!(ctx.diagnostics[0].severity, Severity::Info);

        let mut strict = ResolutionContext::new(&catalog, MappingRegistry::new());
        strict.config.required = RequiredMapping::Target;
        match_members(&mut strict, a, b);
        assert!(strict.has_errors());
    }

    #[test]
    fn test_unused_source_reported() {
        let (catalog, person, dto) = setup();
        let mut ctx = ResolutionContext::new(&catalog, MappingRegistry::new());
        ctx.config.ignored_targets.insert("Age".into());
        ctx.config.required = RequiredMapping::Source;
        match_members(&mut ctx, person, dto);

        assert!(ctx.diagnostics.iter().any(|d| {
            d.kind == DiagnosticKind::SourceMemberNotMapped && d.severity.is_error()
        }));
    }

    #[test]
    fn test_ignored_and_case_insensitive_matching() {
        let (catalog, person, dto) = setup();
        let mut ctx = ResolutionContext::new(&catalog, MappingRegistry::new());
        ctx.config.ignore_case = true;
        ctx.config.ignored_sources.insert("Age".into());
        let set = match_members(&mut ctx, person, dto);

        assert!(set.for_target("Age").is_none());
        assert!(set.unmapped_targets.contains(&"Age".to_string()));
    }

    #[test]
    fn test_extra_parameter_binds_same_named_target() {
        let (mut catalog, builtins) = TypeCatalog::with_builtins();
        let string = TypeRef::non_null(builtins.string);
        let person = catalog
            .insert(TypeDescriptor::object("Person").member(Member::new("Name", string)))
            .map(TypeRef::non_null)
            .unwrap();
        let dto = catalog
            .insert(
                TypeDescriptor::object("PersonDto")
                    .member(Member::new("Name", string))
                    .member(Member::new("Note", string)),
            )
            .map(TypeRef::non_null)
            .unwrap();

        let mut ctx = ResolutionContext::new(&catalog, MappingRegistry::new());
        ctx.extra_params = vec![("Note".into(), string)];
        let set = match_members(&mut ctx, person, dto);

        let note = set.for_target("Note").unwrap();
        assert!(note.from_parameter);
        assert_eq!(note.source_path().to_string(), "Note");
        assert!(set.unmapped_targets.is_empty());
        // Name still binds the primary source member
        assert!(!set.for_target("Name").unwrap().from_parameter);
    }

    #[test]
    fn test_primary_source_member_outranks_parameter() {
        let (catalog, person, dto) = setup();
        let mut ctx = ResolutionContext::new(&catalog, MappingRegistry::new());
        let string = ctx.catalog.get(person.id).members[0].ty;
        ctx.extra_params = vec![
            ("Name".into(), string),
            ("AddressCity".into(), string),
            ("AddressCity".into(), string),
        ];
        let set = match_members(&mut ctx, person, dto);

        // Person.Name wins over the Name parameter
        let name = set.for_target("Name").unwrap();
        assert!(!name.from_parameter);
        assert_eq!(name.source_path().to_string(), "source.Name");
        // no primary root member is named AddressCity, so the first
        // parameter of that name wins over both the duplicate and the
        // Address.City flattening
        let city = set.for_target("AddressCity").unwrap();
        assert!(city.from_parameter);
        assert_eq!(
            set.matches.iter().filter(|m| m.from_parameter).count(),
            1
        );
    }

    #[test]
    fn test_bad_directive_degrades_to_diagnostics() {
        let (catalog, person, dto) = setup();
        let mut ctx = ResolutionContext::new(&catalog, MappingRegistry::new());
        ctx.config.member_directives.push(MemberDirective::new(
            MemberPath::single("Missing"),
            MemberPath::single("Name"),
        ));
        ctx.config.member_directives.push(MemberDirective::new(
            MemberPath::single("Name"),
            MemberPath::single("Nope"),
        ));
        let set = match_members(&mut ctx, person, dto);

        assert!(ctx.diagnostics.iter().any(|d| {
            d.kind == DiagnosticKind::UnusedMappingConfiguration
        }));
        assert!(ctx.diagnostics.iter().any(|d| {
            d.kind == DiagnosticKind::SourceMemberNotFound && d.severity.is_error()
        }));
        // the unresolvable directive leaves Name to match by its own name
        assert_eq!(set.for_target("Name").unwrap().source.to_string(), "Name");
    }
}
