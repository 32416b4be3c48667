//! Member access paths.

use std::fmt;

use serde::Serialize;

use crate::catalog::{TypeCatalog, TypeRef};
use crate::error::{Error, Result};

/// An ordered, non-empty sequence of member accesses (e.g. `Value.Nested.Id`)
/// rooted at a source or target value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MemberPath {
    segments: Vec<String>,
}

/// The outcome of resolving a [`MemberPath`] against a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathResolution {
    /// Type of the final segment.
    pub ty: TypeRef,
    /// Whether any non-final hop is nullable, requiring conditional access.
    pub optional_hops: bool,
}

impl MemberPath {
    /// Create a path from segments. Fails on an empty sequence.
    pub fn new(segments: Vec<String>) -> Result<Self> {
        if segments.is_empty() {
            return Err(Error::EmptyMemberPath);
        }
        Ok(Self { segments })
    }

    /// A single-segment path.
    pub fn single(segment: impl Into<String>) -> Self {
        Self {
            segments: vec![segment.into()],
        }
    }

    /// Parse a dot-separated path like `Nested.Id`.
    pub fn parse(path: &str) -> Result<Self> {
        if path.is_empty() {
            return Err(Error::EmptyMemberPath);
        }
        let segments: Vec<String> = path.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(Error::EmptyPathSegment {
                path: path.to_string(),
            });
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// The first segment. Paths are never empty.
    pub fn first(&self) -> &str {
        &self.segments[0]
    }

    /// The final segment. Paths are never empty.
    pub fn last(&self) -> &str {
        &self.segments[self.segments.len() - 1]
    }

    /// A new path with one more trailing segment.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    /// Walk the path from `root`, returning the final member type and
    /// whether any intermediate hop was nullable.
    ///
    /// Every non-final segment must expose the next segment as a readable
    /// member; the invariant is checked here rather than at construction
    /// so paths can be built before all types are registered.
    pub fn resolve_on(&self, catalog: &TypeCatalog, root: TypeRef) -> Result<PathResolution> {
        let mut current = root;
        let mut optional_hops = false;

        for (index, segment) in self.segments.iter().enumerate() {
            let descriptor = catalog.get(current.id);
            let member = descriptor
                .find_member(segment)
                .ok_or_else(|| Error::unknown_member(&descriptor.name, segment))?;
            if !member.readable {
                return Err(Error::UnreadableSegment {
                    ty: descriptor.name.clone(),
                    member: segment.clone(),
                });
            }
            if index + 1 < self.segments.len() && member.ty.nullable {
                optional_hops = true;
            }
            current = member.ty;
        }

        Ok(PathResolution {
            ty: current,
            optional_hops,
        })
    }
}

impl fmt::Display for MemberPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}
