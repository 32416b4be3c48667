//! Immutable type facts the resolution engine plans against.
//!
//! A [`TypeDescriptor`] records everything the engine may ask about a type:
//! its members, constructors, methods, conversion operators, and which
//! well-known shapes it matches (scalar, enum, collection, tuple, delegate).
//! Descriptors are built once by the host and never mutated afterwards.

use crate::catalog::{TypeId, TypeRef};

/// Accessibility of a member or constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Visibility {
    Private,
    Internal,
    Public,
}

/// A well-known scalar type the engine has dedicated conversion rules for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialType {
    Bool,
    Char,
    /// Sized integer (8/16/32/64 bits, signed or unsigned).
    Int { bits: u8, signed: bool },
    /// IEEE float (32 or 64 bits).
    Float { bits: u8 },
    Decimal,
    String,
    DateTime,
    DateOnly,
    TimeOnly,
    Guid,
    Uri,
}

impl SpecialType {
    /// Returns true for integer, float, and decimal kinds.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            SpecialType::Int { .. } | SpecialType::Float { .. } | SpecialType::Decimal
        )
    }

    /// Returns true for primitive kinds (numerics plus bool and char).
    pub fn is_primitive(&self) -> bool {
        self.is_numeric() || matches!(self, SpecialType::Bool | SpecialType::Char)
    }

    /// Returns true for the value-type kinds (everything except string and URI).
    pub fn is_value_type(&self) -> bool {
        !matches!(self, SpecialType::String | SpecialType::Uri)
    }
}

/// A field or property exposed by a type.
#[derive(Debug, Clone)]
pub struct Member {
    /// Member name as declared on the type.
    pub name: String,
    /// Declared type, including its nullability annotation.
    pub ty: TypeRef,
    pub visibility: Visibility,
    /// Whether the member can be read.
    pub readable: bool,
    /// Whether the member has a plain setter.
    pub writable: bool,
    /// Settable only during object initialization.
    pub init_only: bool,
    /// Must be set during object initialization.
    pub required: bool,
    /// Carries an obsolete marker.
    pub obsolete: bool,
}

impl Member {
    /// Create a public read-write member.
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            visibility: Visibility::Public,
            readable: true,
            writable: true,
            init_only: false,
            required: false,
            obsolete: false,
        }
    }

    /// Mark the member as get-only.
    pub fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }

    /// Mark the member as settable only through an object initializer.
    pub fn init_only(mut self) -> Self {
        self.writable = false;
        self.init_only = true;
        self
    }

    /// Mark the member as required during initialization.
    pub fn required(mut self) -> Self {
        self.required = true;
        self.init_only = true;
        self.writable = false;
        self
    }

    /// Mark the member as obsolete.
    pub fn obsolete(mut self) -> Self {
        self.obsolete = true;
        self
    }

    /// Set the member visibility.
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Whether the member can receive a value at all (setter or initializer).
    pub fn assignable(&self) -> bool {
        self.writable || self.init_only
    }
}

/// A constructor parameter.
#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub ty: TypeRef,
    /// Has a default value and may be omitted at the call site.
    pub optional: bool,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            optional: false,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// A constructor declared on a type.
#[derive(Debug, Clone)]
pub struct Constructor {
    pub visibility: Visibility,
    /// Marked by the host as the designated mapping constructor.
    pub designated: bool,
    pub params: Vec<Parameter>,
}

impl Constructor {
    pub fn new(params: Vec<Parameter>) -> Self {
        Self {
            visibility: Visibility::Public,
            designated: false,
            params,
        }
    }

    /// The parameterless constructor.
    pub fn parameterless() -> Self {
        Self::new(Vec::new())
    }

    pub fn designated(mut self) -> Self {
        self.designated = true;
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Number of non-optional parameters.
    pub fn required_params(&self) -> usize {
        self.params.iter().filter(|p| !p.optional).count()
    }
}

/// An instance or static method relevant to conversion heuristics
/// (`ToX()`, `Parse`, `From`, `Create`, formattable `ToString`, ...).
#[derive(Debug, Clone)]
pub struct Method {
    pub name: String,
    pub is_static: bool,
    /// Parameter types, excluding any trailing format-provider parameter.
    pub params: Vec<TypeRef>,
    pub returns: TypeRef,
    /// Accepts a trailing `IFormatProvider`-style argument.
    pub format_provider: bool,
    /// Accepts a leading format-string argument (formattable `ToString`).
    pub format_string: bool,
}

impl Method {
    /// Create an instance method.
    pub fn instance(name: impl Into<String>, params: Vec<TypeRef>, returns: TypeRef) -> Self {
        Self {
            name: name.into(),
            is_static: false,
            params,
            returns,
            format_provider: false,
            format_string: false,
        }
    }

    /// Create a static method.
    pub fn stat(name: impl Into<String>, params: Vec<TypeRef>, returns: TypeRef) -> Self {
        Self {
            is_static: true,
            ..Self::instance(name, params, returns)
        }
    }

    pub fn with_format_provider(mut self) -> Self {
        self.format_provider = true;
        self
    }

    pub fn with_format_string(mut self) -> Self {
        self.format_string = true;
        self
    }
}

/// A user-declared conversion operator.
#[derive(Debug, Clone)]
pub struct ConversionOperator {
    pub from: TypeId,
    pub to: TypeId,
    /// Implicit operators participate in direct assignment; explicit ones
    /// require a cast.
    pub implicit: bool,
}

/// One named member of an enum type.
#[derive(Debug, Clone)]
pub struct EnumMember {
    pub name: String,
    pub value: i64,
}

/// Enum-specific facts.
#[derive(Debug, Clone)]
pub struct EnumInfo {
    /// Underlying numeric representation type.
    pub underlying: TypeId,
    /// Whether the enum is a flags (bit set) enum.
    pub flags: bool,
    pub members: Vec<EnumMember>,
}

impl EnumInfo {
    /// Look up a member by name.
    pub fn member(&self, name: &str) -> Option<&EnumMember> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// Collection-shaped capability facts.
#[derive(Debug, Clone)]
pub struct CollectionFacts {
    /// Element type (for dictionaries, the key-value pair element).
    pub element: TypeRef,
    /// Key and value types when the type is dictionary-shaped.
    pub key_value: Option<(TypeRef, TypeRef)>,
    /// The type is an array.
    pub array: bool,
    /// The type exposes an `Add(element)` method.
    pub has_add: bool,
    /// The type has set semantics.
    pub set_like: bool,
    /// The type has stack (push) semantics.
    pub stack_like: bool,
    /// The type has queue (enqueue) semantics.
    pub queue_like: bool,
    /// Iteration only, no mutation surface.
    pub read_only: bool,
}

/// Immutable facts about one type.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    pub name: String,
    /// Value-type (copy) semantics vs reference semantics.
    pub value_type: bool,
    /// The type is immutable once constructed (scalars, user records).
    pub immutable: bool,
    pub special: Option<SpecialType>,
    pub enum_info: Option<EnumInfo>,
    pub collection: Option<CollectionFacts>,
    pub tuple_elements: Option<Vec<TypeRef>>,
    pub delegate: bool,
    /// Base type for reference inheritance chains.
    pub base: Option<TypeId>,
    pub members: Vec<Member>,
    pub constructors: Vec<Constructor>,
    pub methods: Vec<Method>,
    pub conversions: Vec<ConversionOperator>,
}

impl TypeDescriptor {
    fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value_type: false,
            immutable: false,
            special: None,
            enum_info: None,
            collection: None,
            tuple_elements: None,
            delegate: false,
            base: None,
            members: Vec::new(),
            constructors: Vec::new(),
            methods: Vec::new(),
            conversions: Vec::new(),
        }
    }

    /// A mutable reference object with a parameterless constructor.
    pub fn object(name: impl Into<String>) -> Self {
        Self {
            constructors: vec![Constructor::parameterless()],
            ..Self::empty(name)
        }
    }

    /// A value-type (struct-like) object.
    pub fn value_object(name: impl Into<String>) -> Self {
        Self {
            value_type: true,
            ..Self::object(name)
        }
    }

    /// A well-known scalar.
    pub fn special(name: impl Into<String>, special: SpecialType) -> Self {
        Self {
            value_type: special.is_value_type(),
            immutable: true,
            special: Some(special),
            ..Self::empty(name)
        }
    }

    /// An enum with the given named members.
    pub fn enumeration(
        name: impl Into<String>,
        underlying: TypeId,
        members: Vec<(&str, i64)>,
    ) -> Self {
        Self {
            value_type: true,
            immutable: true,
            enum_info: Some(EnumInfo {
                underlying,
                flags: false,
                members: members
                    .into_iter()
                    .map(|(name, value)| EnumMember {
                        name: name.to_string(),
                        value,
                    })
                    .collect(),
            }),
            ..Self::empty(name)
        }
    }

    /// A flags enum.
    pub fn flags_enumeration(
        name: impl Into<String>,
        underlying: TypeId,
        members: Vec<(&str, i64)>,
    ) -> Self {
        let mut desc = Self::enumeration(name, underlying, members);
        if let Some(info) = desc.enum_info.as_mut() {
            info.flags = true;
        }
        desc
    }

    /// An array of the given element type.
    pub fn array_of(name: impl Into<String>, element: TypeRef) -> Self {
        Self {
            collection: Some(CollectionFacts {
                element,
                key_value: None,
                array: true,
                has_add: false,
                set_like: false,
                stack_like: false,
                queue_like: false,
                read_only: true,
            }),
            ..Self::empty(name)
        }
    }

    /// A growable list of the given element type.
    pub fn list_of(name: impl Into<String>, element: TypeRef) -> Self {
        Self {
            collection: Some(CollectionFacts {
                element,
                key_value: None,
                array: false,
                has_add: true,
                set_like: false,
                stack_like: false,
                queue_like: false,
                read_only: false,
            }),
            constructors: vec![Constructor::parameterless()],
            ..Self::empty(name)
        }
    }

    /// A set of the given element type.
    pub fn set_of(name: impl Into<String>, element: TypeRef) -> Self {
        let mut desc = Self::list_of(name, element);
        if let Some(facts) = desc.collection.as_mut() {
            facts.set_like = true;
        }
        desc
    }

    /// A stack of the given element type.
    pub fn stack_of(name: impl Into<String>, element: TypeRef) -> Self {
        let mut desc = Self::list_of(name, element);
        if let Some(facts) = desc.collection.as_mut() {
            facts.has_add = false;
            facts.stack_like = true;
        }
        desc
    }

    /// A queue of the given element type.
    pub fn queue_of(name: impl Into<String>, element: TypeRef) -> Self {
        let mut desc = Self::list_of(name, element);
        if let Some(facts) = desc.collection.as_mut() {
            facts.has_add = false;
            facts.queue_like = true;
        }
        desc
    }

    /// A dictionary keyed by `key` with `value` entries.
    pub fn dictionary_of(name: impl Into<String>, key: TypeRef, value: TypeRef) -> Self {
        Self {
            collection: Some(CollectionFacts {
                element: value,
                key_value: Some((key, value)),
                array: false,
                has_add: true,
                set_like: false,
                stack_like: false,
                queue_like: false,
                read_only: false,
            }),
            constructors: vec![Constructor::parameterless()],
            ..Self::empty(name)
        }
    }

    /// A read-only enumerable of the given element type.
    pub fn enumerable_of(name: impl Into<String>, element: TypeRef) -> Self {
        Self {
            collection: Some(CollectionFacts {
                element,
                key_value: None,
                array: false,
                has_add: false,
                set_like: false,
                stack_like: false,
                queue_like: false,
                read_only: true,
            }),
            ..Self::empty(name)
        }
    }

    /// A tuple with positional elements.
    pub fn tuple_of(name: impl Into<String>, elements: Vec<TypeRef>) -> Self {
        Self {
            value_type: true,
            immutable: true,
            tuple_elements: Some(elements),
            ..Self::empty(name)
        }
    }

    /// A delegate (function) type.
    pub fn delegate(name: impl Into<String>) -> Self {
        Self {
            delegate: true,
            immutable: true,
            ..Self::empty(name)
        }
    }

    /// Add a member.
    pub fn member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    /// Add a constructor.
    pub fn constructor(mut self, constructor: Constructor) -> Self {
        self.constructors.push(constructor);
        self
    }

    /// Remove the default parameterless constructor added by `object()`.
    pub fn without_parameterless_constructor(mut self) -> Self {
        self.constructors.retain(|c| !c.params.is_empty());
        self
    }

    /// Add a method.
    pub fn method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    /// Add a conversion operator.
    pub fn conversion(mut self, op: ConversionOperator) -> Self {
        self.conversions.push(op);
        self
    }

    /// Set the base type.
    pub fn base(mut self, base: TypeId) -> Self {
        self.base = Some(base);
        self
    }

    /// Mark the type as immutable once constructed.
    pub fn immutable(mut self) -> Self {
        self.immutable = true;
        self
    }

    /// Find a member by exact name.
    pub fn find_member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name)
    }

    /// Find a member ignoring case. An exact-case member wins outright;
    /// otherwise the lookup returns `None` when ambiguous.
    pub fn find_member_ignore_case(&self, name: &str) -> Option<&Member> {
        if let Some(member) = self.find_member(name) {
            return Some(member);
        }
        let mut found = None;
        for member in &self.members {
            if member.name.eq_ignore_ascii_case(name) {
                if found.is_some() {
                    return None;
                }
                found = Some(member);
            }
        }
        found
    }

    /// Whether the type has an accessible parameterless constructor.
    pub fn has_parameterless_constructor(&self) -> bool {
        self.constructors
            .iter()
            .any(|c| c.required_params() == 0 && c.visibility == Visibility::Public)
    }

    /// Whether the type has a constructor taking a single count/capacity int.
    pub fn has_capacity_constructor(&self) -> bool {
        self.constructors.iter().any(|c| {
            c.params.len() == 1 && c.params[0].name.eq_ignore_ascii_case("capacity")
        })
    }
}
