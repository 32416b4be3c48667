//! User-facing mapping declarations.
//!
//! A [`MappingDeclaration`] is the host's description of one mapping method
//! the user asked for: its signature, its configuration delta, and any
//! configuration includes. The engine resolves each declaration into a
//! [`mapgen_ir::MappingMethod`].

use mapgen_model::TypeRef;

use crate::config::ConfigDelta;

/// A reference to another declaration's configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Include {
    /// Name of the included declaration.
    pub name: String,
    /// Apply the included configuration with source and target swapped.
    pub reversed: bool,
}

impl Include {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reversed: false,
        }
    }

    pub fn reversed(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reversed: true,
        }
    }
}

/// One declared mapping method.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingDeclaration {
    /// Method name; unique per (name, source type).
    pub name: String,
    pub source: TypeRef,
    pub target: TypeRef,
    /// Additional source parameters beyond the primary source.
    pub extra_params: Vec<(String, TypeRef)>,
    /// Update an existing target instance instead of constructing one.
    pub existing_target: bool,
    /// The user supplied the body; the engine only registers the method
    /// for reuse and never plans it.
    pub user_implemented: bool,
    pub config: ConfigDelta,
    /// Configuration includes, applied before `config` in listed order.
    pub includes: Vec<Include>,
}

impl MappingDeclaration {
    pub fn new(name: impl Into<String>, source: TypeRef, target: TypeRef) -> Self {
        Self {
            name: name.into(),
            source,
            target,
            extra_params: Vec::new(),
            existing_target: false,
            user_implemented: false,
            config: ConfigDelta::default(),
            includes: Vec::new(),
        }
    }

    pub fn existing_target(mut self) -> Self {
        self.existing_target = true;
        self
    }

    pub fn user_implemented(mut self) -> Self {
        self.user_implemented = true;
        self
    }

    pub fn with_config(mut self, config: ConfigDelta) -> Self {
        self.config = config;
        self
    }

    pub fn include(mut self, include: Include) -> Self {
        self.includes.push(include);
        self
    }

    pub fn param(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.extra_params.push((name.into(), ty));
        self
    }
}

#[cfg(test)]
mod tests {
    use mapgen_model::TypeCatalog;

    use super::*;

    #[test]
    fn test_declaration_builder() {
        let (_, builtins) = TypeCatalog::with_builtins();
        let decl = MappingDeclaration::new(
            "map_to_dto",
            TypeRef::non_null(builtins.i32),
            TypeRef::non_null(builtins.i64),
        )
        .include(Include::reversed("map_from_dto"))
        .existing_target();

        assert!(decl.existing_target);
        assert!(!decl.user_implemented);
        assert_eq!(decl.includes.len(), 1);
        assert!(decl.includes[0].reversed);
    }
}
