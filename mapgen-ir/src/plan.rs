//! The mapping plan tree.
//!
//! A [`Plan`] describes, for one (source type, target type) pair, which
//! conversion strategy was chosen and the sub-plans it requires. Plans are
//! built bottom-up by the resolution engine and never mutated afterwards.

use std::fmt;

use mapgen_model::{MemberPath, TypeRef};
use serde::Serialize;

/// Where a source expression is rooted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum SourceRoot {
    /// The primary source parameter of the mapping method.
    Primary,
    /// An additional method parameter acting as a virtual source root.
    Parameter(String),
}

/// A readable source expression: a root plus member hops.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SourcePath {
    pub root: SourceRoot,
    pub segments: Vec<String>,
}

impl SourcePath {
    /// The primary source value itself.
    pub fn primary() -> Self {
        Self {
            root: SourceRoot::Primary,
            segments: Vec::new(),
        }
    }

    /// An additional parameter by name.
    pub fn parameter(name: impl Into<String>) -> Self {
        Self {
            root: SourceRoot::Parameter(name.into()),
            segments: Vec::new(),
        }
    }

    /// A member path on the primary source.
    pub fn member(path: &MemberPath) -> Self {
        Self {
            root: SourceRoot::Primary,
            segments: path.segments().to_vec(),
        }
    }

    /// This path extended by one segment.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self {
            root: self.root.clone(),
            segments,
        }
    }
}

impl fmt::Display for SourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.root {
            SourceRoot::Primary => write!(f, "source")?,
            SourceRoot::Parameter(name) => write!(f, "{name}")?,
        }
        for segment in &self.segments {
            write!(f, ".{segment}")?;
        }
        Ok(())
    }
}

/// One resolved mapping method: the root of a plan tree plus its signature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappingMethod {
    pub name: String,
    pub source: TypeRef,
    pub target: TypeRef,
    /// Additional source parameters beyond the primary source.
    pub extra_params: Vec<(String, TypeRef)>,
    /// Update an existing target instead of constructing a new one.
    pub existing_target: bool,
    pub plan: Plan,
}

/// A plan node: the chosen strategy for one (source, target) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plan {
    pub source: TypeRef,
    pub target: TypeRef,
    pub kind: PlanKind,
}

impl Plan {
    pub fn new(source: TypeRef, target: TypeRef, kind: PlanKind) -> Self {
        Self {
            source,
            target,
            kind,
        }
    }

    /// An erroneous node left behind by a failed resolution.
    pub fn error(source: TypeRef, target: TypeRef) -> Self {
        Self::new(source, target, PlanKind::Error)
    }

    pub fn is_error(&self) -> bool {
        matches!(self.kind, PlanKind::Error)
    }

    /// Stable tag name for the chosen strategy, for walking and assertions.
    pub fn tag(&self) -> &'static str {
        match &self.kind {
            PlanKind::Identity => "identity",
            PlanKind::Direct => "direct",
            PlanKind::Cast => "cast",
            PlanKind::Delegate { .. } => "delegate",
            PlanKind::InstanceMethod { .. } => "instance-method",
            PlanKind::StaticFactory { .. } => "static-factory",
            PlanKind::SourceConstructor => "source-constructor",
            PlanKind::Parse { .. } => "parse",
            PlanKind::Stringify { .. } => "stringify",
            PlanKind::Enum(_) => "enum",
            PlanKind::Temporal(_) => "temporal",
            PlanKind::Collection(_) => "collection",
            PlanKind::Dictionary(_) => "dictionary",
            PlanKind::Tuple(_) => "tuple",
            PlanKind::Object(_) => "object",
            PlanKind::Dispatch(_) => "dispatch",
            PlanKind::NullGuard(_) => "null-guard",
            PlanKind::Error => "error",
        }
    }
}

/// The strategy tag set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PlanKind {
    /// Pass the value through unchanged.
    Identity,
    /// Implicit host-level conversion (numeric widening, derived-to-base).
    Direct,
    /// Explicit cast (numeric narrowing or a user conversion operator).
    Cast,
    /// Call a user-implemented or previously generated mapping method.
    Delegate { method: String },
    /// Call an instance conversion method on the source (`source.ToX()`).
    InstanceMethod { method: String },
    /// Call a static factory on the target type (`T.From(source)`).
    StaticFactory { method: String },
    /// Invoke a target constructor accepting the source.
    SourceConstructor,
    /// Call a static `Parse` on the target with the source string.
    Parse { format_provider: bool },
    /// Render the source to a string, optionally with a format.
    Stringify { format: Option<String> },
    Enum(EnumPlan),
    Temporal(TemporalConversion),
    Collection(Box<CollectionPlan>),
    Dictionary(Box<DictionaryPlan>),
    /// Positional element-wise tuple construction.
    Tuple(Vec<Plan>),
    Object(Box<ObjectPlan>),
    /// Derived-type polymorphic dispatch.
    Dispatch(Box<DispatchPlan>),
    /// Null-handling shell around an inner plan.
    NullGuard(Box<NullGuardPlan>),
    /// No strategy matched; emission must compile this to a throwing stub
    /// or refuse.
    Error,
}

/// Special-cased temporal conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TemporalConversion {
    DateTimeToDateOnly,
    DateTimeToTimeOnly,
    DateOnlyToDateTime,
    TimeOnlyToDateTime,
}

/// Null-handling shell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NullGuardPlan {
    pub on_null: OnNull,
    pub inner: Plan,
}

/// What happens when the source is null at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum OnNull {
    /// Nullable target: propagate the null.
    PassNull,
    /// Non-nullable source into a nullable target: no runtime check.
    Wrap,
    /// Non-nullable target, throw-on-mismatch: argument-null error.
    Throw,
    /// Non-nullable target, fallback configured: substitute a value.
    Fallback(FallbackValue),
}

/// Fallback value shape for null mismatches without throwing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FallbackValue {
    /// `default` of a value type.
    Default,
    /// The empty string.
    EmptyString,
    /// A new instance via the parameterless constructor.
    NewInstance,
}

/// Target shape for collection materialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CollectionShape {
    Array,
    List,
    Set,
    Stack,
    Queue,
    /// Target only requires iteration; materialized as a list.
    Enumerable,
}

/// Element-wise collection materialization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionPlan {
    pub shape: CollectionShape,
    pub element: Plan,
    /// The source exposes a count usable as a capacity hint.
    pub counted: bool,
}

/// Entry-wise dictionary materialization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DictionaryPlan {
    pub key: Plan,
    pub value: Plan,
}

/// Enum translation sub-strategies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum EnumPlan {
    /// Cast the underlying numeric representation directly.
    ByValue,
    /// Cast, then verify membership in the target's known values.
    CheckDefined {
        flags: bool,
        values: Vec<i64>,
        /// Target member name substituted on failure; throw when absent.
        fallback: Option<String>,
    },
    /// Member-name switch from source members to target members.
    ByName {
        arms: Vec<EnumArm>,
        fallback: Option<String>,
    },
    /// Enum to string: member name to rendered name.
    ToNames { arms: Vec<(String, String)> },
    /// String to enum: rendered name back to a target member.
    FromNames {
        arms: Vec<(String, String)>,
        case_insensitive: bool,
        fallback: Option<String>,
    },
}

/// One arm of an enum member-name switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumArm {
    pub source: String,
    pub target: String,
}

/// Object graph construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectPlan {
    /// `None` in existing-target mode.
    pub constructor: Option<ConstructorCall>,
    /// Members set through object-initializer syntax (init-only/required).
    pub initializers: Vec<MemberBinding>,
    /// Members assigned through setters after construction.
    pub assignments: Vec<MemberBinding>,
    pub existing_target: bool,
}

/// The selected constructor invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstructorCall {
    pub args: Vec<ConstructorArg>,
}

/// One constructor argument, passed by parameter name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstructorArg {
    pub param: String,
    pub value: ValueBinding,
}

/// One target member receiving a converted value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberBinding {
    pub target: MemberPath,
    pub value: ValueBinding,
}

/// A source expression paired with the plan that converts it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueBinding {
    pub source: SourcePath,
    pub plan: Plan,
}

/// Discriminated dispatch over registered derived pairs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchPlan {
    /// Evaluated in order, most-derived source type first.
    pub arms: Vec<DispatchArm>,
    /// Nullable input falls through to null; non-nullable input throws.
    pub null_fallthrough: bool,
}

/// One dispatch arm: a runtime type test delegating to a sub-mapping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchArm {
    pub source_type: TypeRef,
    pub plan: Plan,
}

#[cfg(test)]
mod tests {
    use mapgen_model::TypeCatalog;

    use super::*;

    #[test]
    fn test_source_path_display() {
        assert_eq!(SourcePath::primary().to_string(), "source");
        assert_eq!(SourcePath::primary().child("Nested").child("Id").to_string(), "source.Nested.Id");
        assert_eq!(SourcePath::parameter("extra").child("Name").to_string(), "extra.Name");
    }

    #[test]
    fn test_source_path_from_member_path() {
        let path = MemberPath::parse("Nested.Id").unwrap();
        let source = SourcePath::member(&path);
        assert_eq!(source.root, SourceRoot::Primary);
        assert_eq!(source.segments, ["Nested", "Id"]);
    }

    #[test]
    fn test_plan_tags() {
        let (_, builtins) = TypeCatalog::with_builtins();
        let ty = TypeRef::non_null(builtins.i32);
        assert_eq!(Plan::new(ty, ty, PlanKind::Identity).tag(), "identity");
        assert_eq!(Plan::error(ty, ty).tag(), "error");
        assert!(Plan::error(ty, ty).is_error());
        assert!(!Plan::new(ty, ty, PlanKind::Direct).is_error());
    }
}
