//! Declaration registry, include composition, and helper memoization.
//!
//! The registry owns every declared mapping method plus the helper methods
//! the engine synthesizes for nested pairs. Helpers are memoized by
//! (source, target, configuration fingerprint) so one pairing is planned at
//! most once per compilation and cyclic object graphs terminate.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use mapgen_ir::MappingMethod;
use mapgen_model::{TypeCatalog, TypeRef, to_snake_case};

use crate::config::MappingConfiguration;
use crate::declaration::MappingDeclaration;
use crate::diagnostic::{Diagnostic, DiagnosticKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct HelperKey {
    source: TypeRef,
    target: TypeRef,
    fingerprint: u64,
}

#[derive(Debug)]
struct HelperEntry {
    name: String,
    method: Option<MappingMethod>,
}

/// All known mapping methods of one compilation.
#[derive(Debug, Default)]
pub struct MappingRegistry {
    declarations: Vec<MappingDeclaration>,
    helpers: IndexMap<HelperKey, HelperEntry>,
    used_names: BTreeSet<String>,
}

impl MappingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a declaration. Returns a diagnostic instead when a
    /// declaration with the same name and source type already exists.
    pub fn register(&mut self, declaration: MappingDeclaration) -> Option<Diagnostic> {
        let duplicate = self.declarations.iter().any(|existing| {
            existing.name == declaration.name && existing.source.id == declaration.source.id
        });
        if duplicate {
            return Some(Diagnostic::error(
                DiagnosticKind::DuplicateMappingDeclaration,
                format!(
                    "a mapping named '{}' with the same source type is already declared",
                    declaration.name
                ),
            ));
        }
        self.used_names.insert(declaration.name.clone());
        self.declarations.push(declaration);
        None
    }

    pub fn declarations(&self) -> &[MappingDeclaration] {
        &self.declarations
    }

    /// Find a declared method usable as-is for a (source, target) pair:
    /// same target type, source accepted via the inheritance chain, plain
    /// signature. Exact source matches win over base-type matches.
    pub fn find_reusable(
        &self,
        catalog: &TypeCatalog,
        source: TypeRef,
        target: TypeRef,
        exclude: Option<&str>,
    ) -> Option<&MappingDeclaration> {
        let candidates = self.declarations.iter().filter(|decl| {
            decl.target.id == target.id
                && !decl.existing_target
                && decl.extra_params.is_empty()
                && Some(decl.name.as_str()) != exclude
                && catalog.is_assignable(source.id, decl.source.id)
        });

        let mut base_match = None;
        for decl in candidates {
            if decl.source.id == source.id {
                return Some(decl);
            }
            if base_match.is_none() {
                base_match = Some(decl);
            }
        }
        base_match
    }

    /// Compose the effective configuration of a declaration: defaults, then
    /// each include (recursively, in listed order), then its own delta.
    /// Include problems degrade to diagnostics and the bad include is
    /// skipped.
    pub fn compose_config(
        &self,
        declaration: &MappingDeclaration,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> MappingConfiguration {
        let mut config = MappingConfiguration::default();
        let mut stack = vec![declaration.name.clone()];
        self.apply_includes(declaration, false, &mut config, &mut stack, diagnostics);
        config
    }

    fn apply_includes(
        &self,
        declaration: &MappingDeclaration,
        reversed: bool,
        config: &mut MappingConfiguration,
        stack: &mut Vec<String>,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        for include in &declaration.includes {
            if stack.contains(&include.name) {
                diagnostics.push(
                    Diagnostic::error(
                        DiagnosticKind::CircularInclude,
                        format!(
                            "configuration include cycle: {} -> {}",
                            stack.join(" -> "),
                            include.name
                        ),
                    )
                    .at(declaration.name.clone()),
                );
                continue;
            }

            let mut matches = self
                .declarations
                .iter()
                .filter(|decl| decl.name == include.name);
            let Some(included) = matches.next() else {
                diagnostics.push(
                    Diagnostic::error(
                        DiagnosticKind::UnknownInclude,
                        format!("no mapping named '{}' to include", include.name),
                    )
                    .at(declaration.name.clone()),
                );
                continue;
            };
            if matches.next().is_some() {
                diagnostics.push(
                    Diagnostic::error(
                        DiagnosticKind::AmbiguousInclude,
                        format!("more than one mapping named '{}'", include.name),
                    )
                    .at(declaration.name.clone()),
                );
                continue;
            }

            stack.push(include.name.clone());
            self.apply_includes(
                included,
                reversed != include.reversed,
                config,
                stack,
                diagnostics,
            );
            stack.pop();
        }

        if reversed {
            declaration.config.reversed().apply_to(config);
        } else {
            declaration.config.apply_to(config);
        }
    }

    /// Get or create the helper method name for a nested pair. The bool is
    /// true when the helper is fresh and its body still needs planning.
    pub fn helper_name(
        &mut self,
        catalog: &TypeCatalog,
        source: TypeRef,
        target: TypeRef,
        fingerprint: u64,
    ) -> (String, bool) {
        let key = HelperKey {
            source,
            target,
            fingerprint,
        };
        if let Some(entry) = self.helpers.get(&key) {
            return (entry.name.clone(), false);
        }

        let base = format!(
            "map_{}_to_{}",
            sanitize(catalog.name(source.id)),
            sanitize(catalog.name(target.id))
        );
        let mut name = base.clone();
        let mut suffix = 1;
        while self.used_names.contains(&name) {
            suffix += 1;
            name = format!("{base}_{suffix}");
        }
        self.used_names.insert(name.clone());
        self.helpers.insert(
            key,
            HelperEntry {
                name: name.clone(),
                method: None,
            },
        );
        (name, true)
    }

    /// Attach the planned body of a helper.
    pub fn set_helper(&mut self, name: &str, method: MappingMethod) {
        if let Some(entry) = self.helpers.values_mut().find(|e| e.name == name) {
            entry.method = Some(method);
        }
    }

    /// Drain planned helper methods in creation order.
    pub fn take_helper_methods(&mut self) -> Vec<MappingMethod> {
        self.helpers
            .drain(..)
            .filter_map(|(_, entry)| entry.method)
            .collect()
    }
}

fn sanitize(type_name: &str) -> String {
    let alnum: String = type_name.chars().filter(|c| c.is_alphanumeric()).collect();
    to_snake_case(&alnum)
}
