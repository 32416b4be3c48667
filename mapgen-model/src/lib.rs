//! Host type-system facade for the mapgen object-mapping generator.
//!
//! This crate provides the immutable type model the resolution engine plans
//! against. A host toolchain (or a test) populates a [`TypeCatalog`] with
//! [`TypeDescriptor`]s up front; the engine only ever reads from it.
//!
//! # Architecture
//!
//! ```text
//! host symbols → mapgen-model (TypeCatalog) → mapgen-engine (planning) → mapgen-lower
//! ```
//!
//! The types here are designed to be:
//! - Host-agnostic (no dependency on any particular compiler front-end)
//! - Immutable once inserted into the catalog
//! - Cheap to reference (`TypeId` is an interned index)

mod casing;
mod catalog;
mod classify;
mod descriptor;
mod error;
mod path;

pub use casing::{to_camel_case, to_kebab_case, to_pascal_case, to_snake_case};
pub use catalog::{Builtins, TypeCatalog, TypeId, TypeRef};
pub use classify::{TypeClass, classify, explicit_numeric_conversion, implicit_numeric_conversion};
pub use descriptor::{
    CollectionFacts, Constructor, ConversionOperator, EnumInfo, EnumMember, Member, Method,
    Parameter, SpecialType, TypeDescriptor, Visibility,
};
pub use error::{Error, Result};
pub use path::{MemberPath, PathResolution};
