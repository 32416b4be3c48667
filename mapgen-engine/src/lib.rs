//! Mapping resolution engine.
//!
//! The engine turns [`MappingDeclaration`]s, resolved against a
//! [`mapgen_model::TypeCatalog`], into [`mapgen_ir::MappingMethod`] plan
//! trees plus a list of [`Diagnostic`]s. Resolution is fail-soft: a member
//! or pair that cannot be mapped degrades to a diagnostic and an error plan
//! node, and everything else still resolves.
//!
//! Nested object pairs are split into standalone helper methods, memoized
//! by (source, target, configuration fingerprint), which also terminates
//! cyclic object graphs.

mod collections;
mod config;
mod context;
mod declaration;
mod diagnostic;
mod enums;
mod members;
mod null_safety;
mod object;
mod registry;
mod strategy;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

use std::collections::BTreeSet;

use mapgen_ir::MappingMethod;
use mapgen_model::TypeCatalog;

pub use config::{
    Cloning, ConfigDelta, ConversionKind, DerivedTypePair, EnumStrategy, EnumValueMapping,
    MappingConfiguration, MemberDirective, NamingStrategy, ObsoleteExclusion, RequiredMapping,
};
pub use context::ResolutionContext;
pub use declaration::{Include, MappingDeclaration};
pub use diagnostic::{Diagnostic, DiagnosticKind, Severity};
pub use members::{MemberMatch, MemberMatchSet, match_members};
pub use registry::MappingRegistry;
pub use strategy::{resolve_conversion, resolve_member_value};

/// The outcome of resolving a set of declarations.
#[derive(Debug)]
pub struct Resolution {
    /// Declared methods in declaration order, then synthesized helpers in
    /// creation order.
    pub methods: Vec<MappingMethod>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Resolution {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_error())
    }

    /// Find a resolved method by name.
    pub fn method(&self, name: &str) -> Option<&MappingMethod> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// Resolve every declaration against the catalog.
pub fn resolve(catalog: &TypeCatalog, declarations: Vec<MappingDeclaration>) -> Resolution {
    let mut registry = MappingRegistry::new();
    let mut diagnostics = Vec::new();
    for declaration in declarations {
        if let Some(diagnostic) = registry.register(declaration) {
            diagnostics.push(diagnostic);
        }
    }

    let mut ctx = ResolutionContext::new(catalog, registry);
    ctx.diagnostics = diagnostics;

    let mut methods = Vec::new();
    let declarations: Vec<MappingDeclaration> = ctx.registry.declarations().to_vec();
    for declaration in &declarations {
        if declaration.user_implemented {
            continue;
        }
        let config = ctx
            .registry
            .compose_config(declaration, &mut ctx.diagnostics);
        ctx.begin_method(declaration.name.clone(), config, 0);
        ctx.extra_params = declaration.extra_params.clone();

        let plan = if declaration.existing_target {
            ctx.take_root();
            ctx.enter_pair(declaration.source.id, declaration.target.id);
            let plan = object::resolve_object(&mut ctx, declaration.source, declaration.target, true);
            ctx.exit_pair();
            plan
        } else {
            strategy::resolve_conversion(&mut ctx, declaration.source, declaration.target)
        };

        methods.push(MappingMethod {
            name: declaration.name.clone(),
            source: declaration.source,
            target: declaration.target,
            extra_params: declaration.extra_params.clone(),
            existing_target: declaration.existing_target,
            plan,
        });
        drain_helpers(&mut ctx);
    }

    methods.extend(ctx.registry.take_helper_methods());
    Resolution {
        methods,
        diagnostics: ctx.diagnostics,
    }
}

/// Plan the body of every helper scheduled so far, breadth-first. Helpers
/// scheduled while planning a helper join the same queue.
fn drain_helpers(ctx: &mut ResolutionContext) {
    while let Some(pending) = ctx.next_pending() {
        let config = helper_config(&ctx.config);
        ctx.begin_method(pending.name.clone(), config, pending.depth);
        let plan = strategy::resolve_conversion(ctx, pending.source, pending.target);
        let method = MappingMethod {
            name: pending.name.clone(),
            source: pending.source,
            target: pending.target,
            extra_params: Vec::new(),
            existing_target: false,
            plan,
        };
        ctx.registry.set_helper(&pending.name, method);
    }
}

/// Helpers run under the scheduling configuration minus its root-scoped
/// directives: renames, ignores, derived registrations, and explicit enum
/// mappings all bind to the declaring method's own pair.
fn helper_config(config: &MappingConfiguration) -> MappingConfiguration {
    MappingConfiguration {
        member_directives: Vec::new(),
        ignored_sources: BTreeSet::new(),
        ignored_targets: BTreeSet::new(),
        derived_types: Vec::new(),
        enum_mappings: Vec::new(),
        enum_ignores: Vec::new(),
        ..config.clone()
    }
}
