//! Interned type storage and identity.

use std::collections::HashMap;

use serde::Serialize;

use crate::descriptor::{ConversionOperator, Member, Method, SpecialType, TypeDescriptor};
use crate::error::{Error, Result};

/// Interned handle to a type registered in a [`TypeCatalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeId(u32);

/// A use-site reference to a type, carrying its nullability annotation.
///
/// `TypeRef { id, nullable: true }` stands for `T?` regardless of whether
/// `T` is a value type (nullable wrapper) or a reference type (annotation);
/// the descriptor's `value_type` flag distinguishes the runtime semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TypeRef {
    pub id: TypeId,
    pub nullable: bool,
}

impl TypeRef {
    /// A non-nullable reference to the type.
    pub fn non_null(id: TypeId) -> Self {
        Self {
            id,
            nullable: false,
        }
    }

    /// A nullable reference to the type.
    pub fn nullable(id: TypeId) -> Self {
        Self { id, nullable: true }
    }

    /// The same reference with nullability stripped.
    pub fn as_non_null(self) -> Self {
        Self {
            nullable: false,
            ..self
        }
    }

    /// The same reference with nullability added.
    pub fn as_nullable(self) -> Self {
        Self {
            nullable: true,
            ..self
        }
    }
}

/// Well-known types pre-seeded into a catalog.
#[derive(Debug, Clone, Copy)]
pub struct Builtins {
    pub object: TypeId,
    pub boolean: TypeId,
    pub char: TypeId,
    pub i8: TypeId,
    pub i16: TypeId,
    pub i32: TypeId,
    pub i64: TypeId,
    pub u8: TypeId,
    pub u16: TypeId,
    pub u32: TypeId,
    pub u64: TypeId,
    pub f32: TypeId,
    pub f64: TypeId,
    pub decimal: TypeId,
    pub string: TypeId,
    pub date_time: TypeId,
    pub date_only: TypeId,
    pub time_only: TypeId,
    pub guid: TypeId,
    pub uri: TypeId,
}

/// Append-only store of [`TypeDescriptor`]s, owned by the host for the
/// duration of one compilation pass.
#[derive(Debug, Default)]
pub struct TypeCatalog {
    types: Vec<TypeDescriptor>,
    by_name: HashMap<String, TypeId>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog pre-seeded with the well-known scalar types.
    pub fn with_builtins() -> (Self, Builtins) {
        let mut catalog = Self::new();
        let mut seed = |name: &str, special: SpecialType| {
            catalog
                .insert(TypeDescriptor::special(name, special))
                .expect("builtin names are unique")
        };

        let boolean = seed("bool", SpecialType::Bool);
        let char = seed("char", SpecialType::Char);
        let i8 = seed("i8", SpecialType::Int { bits: 8, signed: true });
        let i16 = seed("i16", SpecialType::Int { bits: 16, signed: true });
        let i32 = seed("i32", SpecialType::Int { bits: 32, signed: true });
        let i64 = seed("i64", SpecialType::Int { bits: 64, signed: true });
        let u8 = seed("u8", SpecialType::Int { bits: 8, signed: false });
        let u16 = seed("u16", SpecialType::Int { bits: 16, signed: false });
        let u32 = seed("u32", SpecialType::Int { bits: 32, signed: false });
        let u64 = seed("u64", SpecialType::Int { bits: 64, signed: false });
        let f32 = seed("f32", SpecialType::Float { bits: 32 });
        let f64 = seed("f64", SpecialType::Float { bits: 64 });
        let decimal = seed("decimal", SpecialType::Decimal);
        let string = seed("string", SpecialType::String);
        let date_time = seed("DateTime", SpecialType::DateTime);
        let date_only = seed("DateOnly", SpecialType::DateOnly);
        let time_only = seed("TimeOnly", SpecialType::TimeOnly);
        let guid = seed("Guid", SpecialType::Guid);
        let uri = seed("Uri", SpecialType::Uri);
        let object = catalog
            .insert(TypeDescriptor::object("object"))
            .expect("builtin names are unique");

        let builtins = Builtins {
            object,
            boolean,
            char,
            i8,
            i16,
            i32,
            i64,
            u8,
            u16,
            u32,
            u64,
            f32,
            f64,
            decimal,
            string,
            date_time,
            date_only,
            time_only,
            guid,
            uri,
        };
        (catalog, builtins)
    }

    /// Register a descriptor, returning its interned id.
    pub fn insert(&mut self, descriptor: TypeDescriptor) -> Result<TypeId> {
        if self.by_name.contains_key(&descriptor.name) {
            return Err(Error::DuplicateType {
                name: descriptor.name,
            });
        }
        let id = TypeId(self.types.len() as u32);
        self.by_name.insert(descriptor.name.clone(), id);
        self.types.push(descriptor);
        Ok(id)
    }

    /// Get the descriptor for an id. Ids are only produced by `insert`,
    /// so lookups cannot fail.
    pub fn get(&self, id: TypeId) -> &TypeDescriptor {
        &self.types[id.0 as usize]
    }

    /// Attach a member to an already registered type. Needed to close
    /// self-referential member cycles.
    pub fn add_member(&mut self, id: TypeId, member: Member) {
        self.types[id.0 as usize].members.push(member);
    }

    /// Attach a method to an already registered type. Useful when the
    /// method signature references types registered later.
    pub fn add_method(&mut self, id: TypeId, method: Method) {
        self.types[id.0 as usize].methods.push(method);
    }

    /// Attach a conversion operator to an already registered type.
    pub fn add_conversion(&mut self, id: TypeId, op: ConversionOperator) {
        self.types[id.0 as usize].conversions.push(op);
    }

    /// Resolve a type by name.
    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    /// The declared name of a type.
    pub fn name(&self, id: TypeId) -> &str {
        &self.get(id).name
    }

    /// Find a member by exact name on a type.
    pub fn member(&self, id: TypeId, name: &str) -> Option<&Member> {
        self.get(id).find_member(name)
    }

    /// Whether `from` is the same type as `to` or derives from it.
    pub fn is_assignable(&self, from: TypeId, to: TypeId) -> bool {
        let mut current = Some(from);
        while let Some(id) = current {
            if id == to {
                return true;
            }
            current = self.get(id).base;
        }
        false
    }

    /// Length of the inheritance chain down from the root.
    pub fn inheritance_depth(&self, id: TypeId) -> usize {
        let mut depth = 0;
        let mut current = self.get(id).base;
        while let Some(base) = current {
            depth += 1;
            current = self.get(base).base;
        }
        depth
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
