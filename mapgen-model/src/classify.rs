//! Type capability classification.
//!
//! `classify` is a pure function of a type's shape. The match order is
//! load-bearing: when a type matches several shapes, the first listed wins,
//! which in turn decides which conversion strategy the engine attempts
//! first (a string is enumerable of chars, but it is a string first).

use crate::catalog::{TypeCatalog, TypeRef};
use crate::descriptor::SpecialType;

/// The classification of a type at one use site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeClass {
    /// Numeric, bool, or char scalar.
    Primitive(SpecialType),
    Enum,
    /// Temporal, GUID-like, or URI-like well-known type.
    Special(SpecialType),
    String,
    /// Nullable value-type wrapper around the inner reference.
    Nullable(TypeRef),
    Array(TypeRef),
    Dictionary(TypeRef, TypeRef),
    Set(TypeRef),
    /// Mutable collection (an `Add` method or a capacity constructor).
    Collection(TypeRef),
    /// Read-only iteration, no mutation surface.
    Enumerable(TypeRef),
    Tuple(Vec<TypeRef>),
    Delegate,
    /// Plain user-defined object.
    Object,
}

/// Classify one type reference.
pub fn classify(catalog: &TypeCatalog, ty: TypeRef) -> TypeClass {
    let descriptor = catalog.get(ty.id);

    if ty.nullable && descriptor.value_type {
        return TypeClass::Nullable(ty.as_non_null());
    }

    if let Some(special) = descriptor.special {
        if special.is_primitive() {
            return TypeClass::Primitive(special);
        }
        if special == SpecialType::String {
            return TypeClass::String;
        }
        return TypeClass::Special(special);
    }

    if descriptor.enum_info.is_some() {
        return TypeClass::Enum;
    }

    if let Some(facts) = &descriptor.collection {
        if facts.array {
            return TypeClass::Array(facts.element);
        }
        if let Some((key, value)) = facts.key_value {
            return TypeClass::Dictionary(key, value);
        }
        if facts.set_like {
            return TypeClass::Set(facts.element);
        }
        if facts.has_add
            || facts.stack_like
            || facts.queue_like
            || descriptor.has_capacity_constructor()
        {
            return TypeClass::Collection(facts.element);
        }
        return TypeClass::Enumerable(facts.element);
    }

    if let Some(elements) = &descriptor.tuple_elements {
        return TypeClass::Tuple(elements.clone());
    }

    if descriptor.delegate {
        return TypeClass::Delegate;
    }

    TypeClass::Object
}

/// Whether a host-level implicit (widening) conversion exists between two
/// scalars. Signed never widens to unsigned; unsigned widens to strictly
/// larger signed; integers widen to any float and to decimal.
pub fn implicit_numeric_conversion(from: SpecialType, to: SpecialType) -> bool {
    use SpecialType::*;

    // char behaves as a 16-bit unsigned integer for conversion purposes
    let norm = |s: SpecialType| match s {
        Char => Int {
            bits: 16,
            signed: false,
        },
        other => other,
    };

    match (norm(from), norm(to)) {
        (a, b) if a == b => true,
        (Int { bits: fb, signed: fs }, Int { bits: tb, signed: ts }) => {
            if fs == ts {
                tb >= fb
            } else {
                // unsigned -> strictly larger signed
                !fs && ts && tb > fb
            }
        }
        (Int { .. }, Float { .. }) => true,
        (Int { .. }, Decimal) => true,
        (Float { bits: fb }, Float { bits: tb }) => tb >= fb,
        _ => false,
    }
}

/// Whether an explicit numeric cast exists between two scalars: any pair of
/// numeric/char kinds that does not already convert implicitly.
pub fn explicit_numeric_conversion(from: SpecialType, to: SpecialType) -> bool {
    let castable = |s: SpecialType| s.is_numeric() || s == SpecialType::Char;
    castable(from) && castable(to) && !implicit_numeric_conversion(from, to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Member, TypeDescriptor};

    fn int(bits: u8, signed: bool) -> SpecialType {
        SpecialType::Int { bits, signed }
    }

    #[test]
    fn test_classify_primitives_and_string() {
        let (catalog, builtins) = TypeCatalog::with_builtins();
        assert_eq!(
            classify(&catalog, TypeRef::non_null(builtins.i32)),
            TypeClass::Primitive(int(32, true))
        );
        assert_eq!(
            classify(&catalog, TypeRef::non_null(builtins.string)),
            TypeClass::String
        );
        assert_eq!(
            classify(&catalog, TypeRef::non_null(builtins.date_time)),
            TypeClass::Special(SpecialType::DateTime)
        );
    }

    #[test]
    fn test_nullable_value_type_wraps() {
        let (catalog, builtins) = TypeCatalog::with_builtins();
        assert_eq!(
            classify(&catalog, TypeRef::nullable(builtins.i32)),
            TypeClass::Nullable(TypeRef::non_null(builtins.i32))
        );
        // reference nullability does not change the class
        assert_eq!(
            classify(&catalog, TypeRef::nullable(builtins.string)),
            TypeClass::String
        );
    }

    #[test]
    fn test_classify_collections() {
        let (mut catalog, builtins) = TypeCatalog::with_builtins();
        let elem = TypeRef::non_null(builtins.i32);
        let key = TypeRef::non_null(builtins.string);

        let array = catalog
            .insert(TypeDescriptor::array_of("int[]", elem))
            .unwrap();
        let list = catalog
            .insert(TypeDescriptor::list_of("List<int>", elem))
            .unwrap();
        let set = catalog
            .insert(TypeDescriptor::set_of("HashSet<int>", elem))
            .unwrap();
        let map = catalog
            .insert(TypeDescriptor::dictionary_of("Dictionary<string,int>", key, elem))
            .unwrap();
        let seq = catalog
            .insert(TypeDescriptor::enumerable_of("IEnumerable<int>", elem))
            .unwrap();

        assert_eq!(classify(&catalog, TypeRef::non_null(array)), TypeClass::Array(elem));
        assert_eq!(classify(&catalog, TypeRef::non_null(list)), TypeClass::Collection(elem));
        assert_eq!(classify(&catalog, TypeRef::non_null(set)), TypeClass::Set(elem));
        assert_eq!(
            classify(&catalog, TypeRef::non_null(map)),
            TypeClass::Dictionary(key, elem)
        );
        assert_eq!(
            classify(&catalog, TypeRef::non_null(seq)),
            TypeClass::Enumerable(elem)
        );
    }

    #[test]
    fn test_classify_enum_tuple_delegate_object() {
        let (mut catalog, builtins) = TypeCatalog::with_builtins();
        let color = catalog
            .insert(TypeDescriptor::enumeration(
                "Color",
                builtins.i32,
                vec![("Red", 0), ("Green", 1)],
            ))
            .unwrap();
        let pair = catalog
            .insert(TypeDescriptor::tuple_of(
                "(int, string)",
                vec![TypeRef::non_null(builtins.i32), TypeRef::non_null(builtins.string)],
            ))
            .unwrap();
        let action = catalog.insert(TypeDescriptor::delegate("Action")).unwrap();
        let person = catalog
            .insert(
                TypeDescriptor::object("Person")
                    .member(Member::new("Name", TypeRef::non_null(builtins.string))),
            )
            .unwrap();

        assert_eq!(classify(&catalog, TypeRef::non_null(color)), TypeClass::Enum);
        assert!(matches!(
            classify(&catalog, TypeRef::non_null(pair)),
            TypeClass::Tuple(elements) if elements.len() == 2
        ));
        assert_eq!(classify(&catalog, TypeRef::non_null(action)), TypeClass::Delegate);
        assert_eq!(classify(&catalog, TypeRef::non_null(person)), TypeClass::Object);
    }

    #[test]
    fn test_implicit_widening() {
        assert!(implicit_numeric_conversion(int(32, true), int(64, true)));
        assert!(implicit_numeric_conversion(int(32, false), int(64, true)));
        assert!(implicit_numeric_conversion(int(32, true), SpecialType::Float { bits: 64 }));
        assert!(implicit_numeric_conversion(int(64, true), SpecialType::Decimal));
        assert!(implicit_numeric_conversion(
            SpecialType::Float { bits: 32 },
            SpecialType::Float { bits: 64 }
        ));

        assert!(!implicit_numeric_conversion(int(64, true), int(32, true)));
        assert!(!implicit_numeric_conversion(int(32, true), int(64, false)));
        assert!(!implicit_numeric_conversion(int(32, true), int(32, false)));
    }

    #[test]
    fn test_explicit_narrowing() {
        assert!(explicit_numeric_conversion(int(64, true), int(32, true)));
        assert!(explicit_numeric_conversion(
            SpecialType::Float { bits: 64 },
            SpecialType::Int { bits: 32, signed: true }
        ));
        assert!(!explicit_numeric_conversion(int(32, true), int(64, true)));
        assert!(!explicit_numeric_conversion(SpecialType::Bool, int(32, true)));
        assert!(!explicit_numeric_conversion(
            SpecialType::String,
            int(32, true)
        ));
    }
}
