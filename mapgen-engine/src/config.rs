//! Mapping configuration: directives, toggles, composition, and reversal.
//!
//! A [`MappingConfiguration`] is the fully composed view the engine resolves
//! against. Declarations carry [`ConfigDelta`]s — partial overrides applied
//! most-specific-last over the built-in defaults (and over any included
//! declaration's delta, see the registry).

use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use mapgen_model::{
    MemberPath, TypeId, Visibility, to_camel_case, to_kebab_case, to_pascal_case, to_snake_case,
};

/// Which side of a mapping must be fully mapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RequiredMapping {
    #[default]
    None,
    /// Every source member must be consumed.
    Source,
    /// Every target member must be assigned.
    Target,
    Both,
}

impl RequiredMapping {
    /// Whether unmapped source members are errors.
    pub fn requires_source(&self) -> bool {
        matches!(self, RequiredMapping::Source | RequiredMapping::Both)
    }

    /// Whether unmapped target members are errors.
    pub fn requires_target(&self) -> bool {
        matches!(self, RequiredMapping::Target | RequiredMapping::Both)
    }

    /// The strategy with source and target swapped.
    pub fn reversed(&self) -> Self {
        match self {
            RequiredMapping::Source => RequiredMapping::Target,
            RequiredMapping::Target => RequiredMapping::Source,
            other => *other,
        }
    }
}

/// How enum members translate between two enum types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EnumStrategy {
    /// Cast the underlying numeric value directly.
    #[default]
    ByValue,
    /// Cast, then verify the result is a defined target member.
    ByValueCheckDefined,
    /// Switch over source member names.
    ByName,
}

/// Name transform applied before enum member names are compared or rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NamingStrategy {
    #[default]
    Identity,
    CamelCase,
    PascalCase,
    SnakeCase,
    KebabCase,
}

impl NamingStrategy {
    /// Apply the transform to a member name.
    pub fn apply(&self, name: &str) -> String {
        match self {
            NamingStrategy::Identity => name.to_string(),
            NamingStrategy::CamelCase => to_camel_case(name),
            NamingStrategy::PascalCase => to_pascal_case(name),
            NamingStrategy::SnakeCase => to_snake_case(name),
            NamingStrategy::KebabCase => to_kebab_case(name),
        }
    }
}

/// Cloning behavior for same-type pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cloning {
    /// Pass references/values through unchanged.
    #[default]
    None,
    /// Reconstruct the top-level object; members copy by reference.
    Shallow,
    /// Reconstruct every mutable level.
    Deep,
}

/// Which side's obsolete members are excluded from matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ObsoleteExclusion {
    #[default]
    None,
    Source,
    Target,
    Both,
}

impl ObsoleteExclusion {
    pub fn excludes_source(&self) -> bool {
        matches!(self, ObsoleteExclusion::Source | ObsoleteExclusion::Both)
    }

    pub fn excludes_target(&self) -> bool {
        matches!(self, ObsoleteExclusion::Target | ObsoleteExclusion::Both)
    }

    pub fn reversed(&self) -> Self {
        match self {
            ObsoleteExclusion::Source => ObsoleteExclusion::Target,
            ObsoleteExclusion::Target => ObsoleteExclusion::Source,
            other => *other,
        }
    }
}

/// Individually toggle-able conversion strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConversionKind {
    Direct,
    ExplicitCast,
    InstanceMethod,
    StaticFactory,
    SourceConstructor,
    Parse,
    Stringify,
    EnumMapping,
    Temporal,
    Collection,
    Dictionary,
    Tuple,
    ObjectConstruction,
    DerivedDispatch,
}

impl ConversionKind {
    /// All conversion kinds, in strategy precedence order.
    pub const ALL: &'static [ConversionKind] = &[
        ConversionKind::Direct,
        ConversionKind::ExplicitCast,
        ConversionKind::InstanceMethod,
        ConversionKind::StaticFactory,
        ConversionKind::SourceConstructor,
        ConversionKind::Parse,
        ConversionKind::Stringify,
        ConversionKind::EnumMapping,
        ConversionKind::Temporal,
        ConversionKind::Collection,
        ConversionKind::Dictionary,
        ConversionKind::Tuple,
        ConversionKind::ObjectConstruction,
        ConversionKind::DerivedDispatch,
    ];
}

/// An explicit member mapping directive (rename, flattening, unflattening).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberDirective {
    /// Target member path; multi-segment paths unflatten.
    pub target: MemberPath,
    /// Source member path; multi-segment paths flatten.
    pub source: MemberPath,
    /// Format string routed to a string conversion.
    pub format: Option<String>,
}

impl MemberDirective {
    pub fn new(target: MemberPath, source: MemberPath) -> Self {
        Self {
            target,
            source,
            format: None,
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// The directive with source and target swapped (format cannot survive
    /// a reversal and is dropped).
    pub fn reversed(&self) -> Self {
        Self {
            target: self.source.clone(),
            source: self.target.clone(),
            format: None,
        }
    }
}

/// An explicit enum member mapping.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumValueMapping {
    pub source: String,
    pub target: String,
}

impl EnumValueMapping {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    pub fn reversed(&self) -> Self {
        Self {
            source: self.target.clone(),
            target: self.source.clone(),
        }
    }
}

/// A registered derived-type pair for polymorphic dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DerivedTypePair {
    pub source: TypeId,
    pub target: TypeId,
}

impl DerivedTypePair {
    pub fn new(source: TypeId, target: TypeId) -> Self {
        Self { source, target }
    }

    pub fn reversed(&self) -> Self {
        Self {
            source: self.target,
            target: self.source,
        }
    }
}

/// The fully composed configuration one mapping resolves against.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingConfiguration {
    /// Enabled conversion strategies.
    pub enabled: BTreeSet<ConversionKind>,
    pub required: RequiredMapping,
    pub enum_strategy: EnumStrategy,
    /// Case-insensitive enum member name comparison.
    pub enum_ignore_case: bool,
    pub enum_naming: NamingStrategy,
    /// Target member substituted for unmatched source values.
    pub enum_fallback: Option<String>,
    pub enum_mappings: Vec<EnumValueMapping>,
    /// Source enum members excluded from mapping and required checks.
    pub enum_ignores: Vec<String>,
    /// Throw on null source into non-nullable target (vs default fallback).
    pub throw_on_null_mismatch: bool,
    /// Case-insensitive member name matching.
    pub ignore_case: bool,
    pub member_directives: Vec<MemberDirective>,
    pub ignored_sources: BTreeSet<String>,
    pub ignored_targets: BTreeSet<String>,
    pub obsolete_exclusion: ObsoleteExclusion,
    pub derived_types: Vec<DerivedTypePair>,
    /// Bound on nested planning depth within one declaration.
    pub max_recursion_depth: usize,
    pub cloning: Cloning,
    /// Least accessible member visibility considered for mapping.
    pub min_visibility: Visibility,
    /// How many nested levels auto-flattening may discover.
    pub auto_flatten_depth: usize,
}

impl Default for MappingConfiguration {
    fn default() -> Self {
        Self {
            enabled: ConversionKind::ALL.iter().copied().collect(),
            required: RequiredMapping::default(),
            enum_strategy: EnumStrategy::default(),
            enum_ignore_case: false,
            enum_naming: NamingStrategy::default(),
            enum_fallback: None,
            enum_mappings: Vec::new(),
            enum_ignores: Vec::new(),
            throw_on_null_mismatch: true,
            ignore_case: false,
            member_directives: Vec::new(),
            ignored_sources: BTreeSet::new(),
            ignored_targets: BTreeSet::new(),
            obsolete_exclusion: ObsoleteExclusion::default(),
            derived_types: Vec::new(),
            max_recursion_depth: 8,
            cloning: Cloning::default(),
            min_visibility: Visibility::Public,
            auto_flatten_depth: 1,
        }
    }
}

impl MappingConfiguration {
    /// Whether a conversion strategy may be attempted.
    pub fn is_enabled(&self, kind: ConversionKind) -> bool {
        self.enabled.contains(&kind)
    }

    /// Stable hash over the configuration subset that affects nested
    /// (helper) mappings. Root-scoped directives (member renames, ignores,
    /// derived registrations) are excluded so structurally identical nested
    /// pairs share one helper.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.enabled.hash(&mut hasher);
        self.required.hash(&mut hasher);
        self.enum_strategy.hash(&mut hasher);
        self.enum_ignore_case.hash(&mut hasher);
        self.enum_naming.hash(&mut hasher);
        self.enum_fallback.hash(&mut hasher);
        self.throw_on_null_mismatch.hash(&mut hasher);
        self.ignore_case.hash(&mut hasher);
        self.obsolete_exclusion.hash(&mut hasher);
        self.max_recursion_depth.hash(&mut hasher);
        self.cloning.hash(&mut hasher);
        (self.min_visibility as u8).hash(&mut hasher);
        self.auto_flatten_depth.hash(&mut hasher);
        hasher.finish()
    }
}

/// A partial configuration override attached to one declaration or scope.
///
/// Scalar fields replace when set; directive lists extend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigDelta {
    pub enabled: Option<BTreeSet<ConversionKind>>,
    pub required: Option<RequiredMapping>,
    pub enum_strategy: Option<EnumStrategy>,
    pub enum_ignore_case: Option<bool>,
    pub enum_naming: Option<NamingStrategy>,
    pub enum_fallback: Option<String>,
    pub enum_mappings: Vec<EnumValueMapping>,
    pub enum_ignores: Vec<String>,
    pub throw_on_null_mismatch: Option<bool>,
    pub ignore_case: Option<bool>,
    pub member_directives: Vec<MemberDirective>,
    pub ignored_sources: Vec<String>,
    pub ignored_targets: Vec<String>,
    pub obsolete_exclusion: Option<ObsoleteExclusion>,
    pub derived_types: Vec<DerivedTypePair>,
    pub max_recursion_depth: Option<usize>,
    pub cloning: Option<Cloning>,
    pub min_visibility: Option<Visibility>,
    pub auto_flatten_depth: Option<usize>,
}

impl ConfigDelta {
    /// Apply this delta on top of a composed configuration.
    pub fn apply_to(&self, config: &mut MappingConfiguration) {
        if let Some(enabled) = &self.enabled {
            config.enabled = enabled.clone();
        }
        if let Some(required) = self.required {
            config.required = required;
        }
        if let Some(strategy) = self.enum_strategy {
            config.enum_strategy = strategy;
        }
        if let Some(ignore_case) = self.enum_ignore_case {
            config.enum_ignore_case = ignore_case;
        }
        if let Some(naming) = self.enum_naming {
            config.enum_naming = naming;
        }
        if let Some(fallback) = &self.enum_fallback {
            config.enum_fallback = Some(fallback.clone());
        }
        config.enum_mappings.extend(self.enum_mappings.iter().cloned());
        config.enum_ignores.extend(self.enum_ignores.iter().cloned());
        if let Some(throw) = self.throw_on_null_mismatch {
            config.throw_on_null_mismatch = throw;
        }
        if let Some(ignore_case) = self.ignore_case {
            config.ignore_case = ignore_case;
        }
        config
            .member_directives
            .extend(self.member_directives.iter().cloned());
        config.ignored_sources.extend(self.ignored_sources.iter().cloned());
        config.ignored_targets.extend(self.ignored_targets.iter().cloned());
        if let Some(obsolete) = self.obsolete_exclusion {
            config.obsolete_exclusion = obsolete;
        }
        config.derived_types.extend(self.derived_types.iter().copied());
        if let Some(depth) = self.max_recursion_depth {
            config.max_recursion_depth = depth;
        }
        if let Some(cloning) = self.cloning {
            config.cloning = cloning;
        }
        if let Some(visibility) = self.min_visibility {
            config.min_visibility = visibility;
        }
        if let Some(depth) = self.auto_flatten_depth {
            config.auto_flatten_depth = depth;
        }
    }

    /// The delta with every directional directive swapped source↔target.
    pub fn reversed(&self) -> Self {
        Self {
            required: self.required.map(|r| r.reversed()),
            enum_mappings: self.enum_mappings.iter().map(|m| m.reversed()).collect(),
            member_directives: self
                .member_directives
                .iter()
                .map(|d| d.reversed())
                .collect(),
            ignored_sources: self.ignored_targets.clone(),
            ignored_targets: self.ignored_sources.clone(),
            obsolete_exclusion: self.obsolete_exclusion.map(|o| o.reversed()),
            derived_types: self.derived_types.iter().map(|d| d.reversed()).collect(),
            ..self.clone()
        }
    }

    /// Compose the delta over built-in defaults.
    pub fn into_configuration(&self) -> MappingConfiguration {
        let mut config = MappingConfiguration::default();
        self.apply_to(&mut config);
        config
    }
}
