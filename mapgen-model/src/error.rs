use miette::Diagnostic;
use thiserror::Error;

/// Result type for catalog and path construction.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("type '{name}' is already registered in the catalog")]
    #[diagnostic(
        code(mapgen::duplicate_type),
        help("every type name must be unique within a catalog")
    )]
    DuplicateType { name: String },

    #[error("unknown type '{name}'")]
    #[diagnostic(code(mapgen::unknown_type))]
    UnknownType { name: String },

    #[error("member path cannot be empty")]
    #[diagnostic(
        code(mapgen::empty_member_path),
        help("a member path needs at least one segment, e.g. 'Value' or 'Nested.Id'")
    )]
    EmptyMemberPath,

    #[error("member path segment cannot be empty in '{path}'")]
    #[diagnostic(code(mapgen::empty_path_segment))]
    EmptyPathSegment { path: String },

    #[error("member '{member}' not found on type '{ty}'")]
    #[diagnostic(code(mapgen::unknown_member))]
    UnknownMember { ty: String, member: String },

    #[error("member '{member}' on type '{ty}' is not a readable intermediate segment")]
    #[diagnostic(
        code(mapgen::unreadable_segment),
        help("every non-final path segment must expose the next segment as a member")
    )]
    UnreadableSegment { ty: String, member: String },
}

impl Error {
    /// Create an unknown member error.
    pub fn unknown_member(ty: impl Into<String>, member: impl Into<String>) -> Self {
        Error::UnknownMember {
            ty: ty.into(),
            member: member.into(),
        }
    }
}
