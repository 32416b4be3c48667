//! Diagnostic types for the resolution engine.
//!
//! Resolution is fail-soft: a failure in one member or branch never aborts
//! siblings. Every step records what it could not do here and carries on.

use serde::Serialize;

/// Severity level for a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Severity {
    /// The mapping (or a member of it) cannot be generated as requested.
    Error,
    /// Generated code will behave differently than the declaration implies.
    Warning,
    /// Informational message about a resolution decision.
    Info,
}

impl Severity {
    /// Returns true if this is an error severity.
    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Error)
    }

    /// Returns true if this is a warning severity.
    pub fn is_warning(&self) -> bool {
        matches!(self, Severity::Warning)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// Machine-readable diagnostic classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticKind {
    /// No conversion strategy matched a (source, target) pair.
    CouldNotCreateMapping,
    /// A target member has no corresponding source.
    SourceMemberNotFound,
    /// A source member is not consumed by any target member.
    SourceMemberNotMapped,
    /// No accessible constructor can be satisfied.
    NoSuitableConstructor,
    /// More than one constructor candidate remains after ordering.
    AmbiguousConstructor,
    /// Nullable source flows into a non-nullable target.
    NullableSourceToNonNullableTarget,
    /// A source enum member has no outgoing mapping.
    SourceEnumValueNotMapped,
    /// A target enum member has no incoming mapping.
    TargetEnumValueNotMapped,
    /// A configuration directive conflicts with the resolved strategy and
    /// was ignored.
    ConfigurationConflict,
    /// An explicit member directive was never consumed.
    UnusedMappingConfiguration,
    /// Mapping configuration includes form a cycle.
    CircularInclude,
    /// An include name matches more than one compatible declaration.
    AmbiguousInclude,
    /// An include name matches no known declaration.
    UnknownInclude,
    /// Two derived-type registrations are equally specific.
    AmbiguousDerivedType,
    /// Planning hit the configured recursion bound; the member is unmapped.
    MaxRecursionDepthExceeded,
    /// The target member cannot receive a value.
    CannotMapToReadOnlyMember,
    /// A mapping method with the same name and source type already exists.
    DuplicateMappingDeclaration,
}

impl DiagnosticKind {
    /// Stable kebab-case code for the kind.
    pub fn code(&self) -> &'static str {
        match self {
            DiagnosticKind::CouldNotCreateMapping => "could-not-create-mapping",
            DiagnosticKind::SourceMemberNotFound => "source-member-not-found",
            DiagnosticKind::SourceMemberNotMapped => "source-member-not-mapped",
            DiagnosticKind::NoSuitableConstructor => "no-suitable-constructor",
            DiagnosticKind::AmbiguousConstructor => "ambiguous-constructor",
            DiagnosticKind::NullableSourceToNonNullableTarget => {
                "nullable-source-to-non-nullable-target"
            }
            DiagnosticKind::SourceEnumValueNotMapped => "source-enum-value-not-mapped",
            DiagnosticKind::TargetEnumValueNotMapped => "target-enum-value-not-mapped",
            DiagnosticKind::ConfigurationConflict => "configuration-conflict",
            DiagnosticKind::UnusedMappingConfiguration => "unused-mapping-configuration",
            DiagnosticKind::CircularInclude => "circular-include",
            DiagnosticKind::AmbiguousInclude => "ambiguous-include",
            DiagnosticKind::UnknownInclude => "unknown-include",
            DiagnosticKind::AmbiguousDerivedType => "ambiguous-derived-type",
            DiagnosticKind::MaxRecursionDepthExceeded => "max-recursion-depth-exceeded",
            DiagnosticKind::CannotMapToReadOnlyMember => "cannot-map-to-read-only-member",
            DiagnosticKind::DuplicateMappingDeclaration => "duplicate-mapping-declaration",
        }
    }
}

/// A diagnostic message from a resolution step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    /// The severity level of this diagnostic.
    pub severity: Severity,
    /// The classification of this diagnostic.
    pub kind: DiagnosticKind,
    /// The diagnostic message.
    pub message: String,
    /// Optional member location (e.g. "Person.Address.Street").
    pub location: Option<String>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            kind,
            message: message.into(),
            location: None,
        }
    }

    /// Create a new warning diagnostic.
    pub fn warning(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            kind,
            message: message.into(),
            location: None,
        }
    }

    /// Create a new info diagnostic.
    pub fn info(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            kind,
            message: message.into(),
            location: None,
        }
    }

    /// Add a location to this diagnostic.
    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.kind.code(), self.message)?;
        if let Some(loc) = &self.location {
            write!(f, " (at {})", loc)?;
        }
        Ok(())
    }
}
