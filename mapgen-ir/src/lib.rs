//! Mapping plan intermediate representation.
//!
//! This crate defines the plan tree produced by the resolution engine and
//! the lowered statement/expression forms consumed by an emission layer.
//!
//! # Architecture
//!
//! ```text
//! TypeCatalog + declarations → mapgen-engine (resolution) → Plan tree → mapgen-lower → Stmt/Expr
//! ```
//!
//! The IR types are designed to be:
//! - Pure data (no behavior beyond small accessors)
//! - Language-agnostic (no syntax, only mapping semantics)
//! - Comparable and serializable (determinism tests, snapshots)

mod expr;
mod plan;

pub use expr::{Expr, Literal, LoweredMethod, Stmt, SwitchArm, SwitchPattern};
pub use plan::{
    CollectionPlan, CollectionShape, ConstructorArg, ConstructorCall, DictionaryPlan, DispatchArm,
    DispatchPlan, EnumArm, EnumPlan, FallbackValue, MappingMethod, MemberBinding, NullGuardPlan,
    ObjectPlan, OnNull, Plan, PlanKind, SourcePath, SourceRoot, TemporalConversion, ValueBinding,
};
