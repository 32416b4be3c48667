//! Shared state threaded through one resolution pass.

use std::collections::VecDeque;

use mapgen_model::{TypeCatalog, TypeId, TypeRef};

use crate::config::MappingConfiguration;
use crate::diagnostic::Diagnostic;
use crate::registry::MappingRegistry;

/// A nested pair whose helper body still needs planning.
#[derive(Debug, Clone)]
pub struct PendingHelper {
    pub name: String,
    pub source: TypeRef,
    pub target: TypeRef,
    /// Helper chain length from the declaration that first scheduled it.
    pub depth: usize,
}

/// Everything a resolution step may consult or record into.
///
/// One context lives for the whole pass; `config`, `method_name`, and
/// `helper_depth` are swapped per planned method.
pub struct ResolutionContext<'c> {
    pub catalog: &'c TypeCatalog,
    pub registry: MappingRegistry,
    pub config: MappingConfiguration,
    pub diagnostics: Vec<Diagnostic>,
    /// Name of the method currently being planned.
    pub method_name: String,
    /// Additional source parameters of the method currently being planned.
    pub extra_params: Vec<(String, TypeRef)>,
    /// Helper chain depth of the method currently being planned.
    pub helper_depth: usize,
    pending: VecDeque<PendingHelper>,
    pair_stack: Vec<(TypeId, TypeId)>,
    location: Vec<String>,
    root_pending: bool,
}

impl<'c> ResolutionContext<'c> {
    pub fn new(catalog: &'c TypeCatalog, registry: MappingRegistry) -> Self {
        Self {
            catalog,
            registry,
            config: MappingConfiguration::default(),
            diagnostics: Vec::new(),
            method_name: String::new(),
            extra_params: Vec::new(),
            helper_depth: 0,
            pending: VecDeque::new(),
            pair_stack: Vec::new(),
            location: Vec::new(),
            root_pending: false,
        }
    }

    /// Reset the per-method state before planning one mapping method.
    pub fn begin_method(
        &mut self,
        name: impl Into<String>,
        config: MappingConfiguration,
        helper_depth: usize,
    ) {
        self.method_name = name.into();
        self.config = config;
        self.extra_params.clear();
        self.helper_depth = helper_depth;
        self.pair_stack.clear();
        self.location.clear();
        self.root_pending = true;
    }

    /// Whether the next core resolution is the method root. Consumes the
    /// flag.
    pub fn take_root(&mut self) -> bool {
        std::mem::take(&mut self.root_pending)
    }

    /// Record a diagnostic, attaching the current member location.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        let diagnostic = if diagnostic.location.is_none() && !self.location.is_empty() {
            diagnostic.at(self.location.join("."))
        } else {
            diagnostic
        };
        self.diagnostics.push(diagnostic);
    }

    /// Whether any error diagnostic was recorded so far.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_error())
    }

    pub fn push_location(&mut self, segment: impl Into<String>) {
        self.location.push(segment.into());
    }

    pub fn pop_location(&mut self) {
        self.location.pop();
    }

    /// Enter a (source, target) pair being planned inline.
    pub fn enter_pair(&mut self, source: TypeId, target: TypeId) {
        self.pair_stack.push((source, target));
    }

    pub fn exit_pair(&mut self) {
        self.pair_stack.pop();
    }

    /// Nesting depth of inline pair planning; 0 at a method root.
    pub fn pair_depth(&self) -> usize {
        self.pair_stack.len()
    }

    /// Queue a fresh helper for later planning.
    pub fn schedule_helper(&mut self, name: String, source: TypeRef, target: TypeRef) {
        self.pending.push_back(PendingHelper {
            name,
            source,
            target,
            depth: self.helper_depth + 1,
        });
    }

    /// Next helper awaiting a body, in scheduling order.
    pub fn next_pending(&mut self) -> Option<PendingHelper> {
        self.pending.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use mapgen_model::TypeCatalog;

    use super::*;
    use crate::diagnostic::DiagnosticKind;

    #[test]
    fn test_report_attaches_location() {
        let (catalog, _) = TypeCatalog::with_builtins();
        let mut ctx = ResolutionContext::new(&catalog, MappingRegistry::new());
        ctx.push_location("Person");
        ctx.push_location("Name");
        ctx.report(Diagnostic::warning(
            DiagnosticKind::SourceMemberNotMapped,
            "unused",
        ));
        ctx.pop_location();
        assert_eq!(ctx.diagnostics[0].location.as_deref(), Some("Person.Name"));
        assert!(!ctx.has_errors());
    }

    #[test]
    fn test_pending_helpers_fifo() {
        let (catalog, builtins) = TypeCatalog::with_builtins();
        let ty = TypeRef::non_null(builtins.i32);
        let mut ctx = ResolutionContext::new(&catalog, MappingRegistry::new());
        ctx.schedule_helper("a".into(), ty, ty);
        ctx.schedule_helper("b".into(), ty, ty);
        assert_eq!(ctx.next_pending().unwrap().name, "a");
        assert_eq!(ctx.next_pending().unwrap().name, "b");
        assert!(ctx.next_pending().is_none());
    }
}
