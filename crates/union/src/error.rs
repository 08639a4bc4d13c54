//! Error types for union relations
//!
//! `ModelError` is the error every collaborator call returns; union-specific
//! failures are carried in `UnionError` and wrapped by `ModelError::Union`.

use std::fmt;

/// Result type alias for model operations
pub type ModelResult<T> = Result<T, ModelError>;

/// Error types for model and relationship operations
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Storage-level failure reported by a relation backend
    Database(String),
    /// Record or relation not found
    NotFound(String),
    /// Primary key is missing or invalid
    MissingPrimaryKey,
    /// Relationship loading or mutation failed
    Relationship(String),
    /// Serialization/deserialization error
    Serialization(String),
    /// Configuration error
    Configuration(String),
    /// Union relation declaration or usage error
    Union(UnionError),
}

impl ModelError {
    /// Borrow the union error, if this is one
    pub fn as_union(&self) -> Option<&UnionError> {
        match self {
            ModelError::Union(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::Database(msg) => write!(f, "Database error: {}", msg),
            ModelError::NotFound(what) => write!(f, "Not found: {}", what),
            ModelError::MissingPrimaryKey => write!(f, "Primary key is missing or invalid"),
            ModelError::Relationship(msg) => write!(f, "Relationship error: {}", msg),
            ModelError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            ModelError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            ModelError::Union(err) => write!(f, "Union relation error: {}", err),
        }
    }
}

impl std::error::Error for ModelError {}

impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        ModelError::Serialization(err.to_string())
    }
}

impl From<UnionError> for ModelError {
    fn from(err: UnionError) -> Self {
        ModelError::Union(err)
    }
}

/// Errors raised while declaring or operating a union relation.
///
/// The first five are declaration-time errors and indicate a broken schema;
/// the rest are returned from proxy operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnionError {
    #[error("'{name}' is already defined on {entity}")]
    NameConflict { entity: String, name: String },

    #[error("union '{union}' mixes collection and single relations")]
    MixedCardinality { union: String },

    #[error("union '{union}' references undeclared relation '{member}'")]
    UnknownMember { union: String, member: String },

    #[error("union '{union}' has no member relations")]
    EmptyUnion { union: String },

    #[error("relation '{member}' does not relate the record type of union '{union}'")]
    IncompatibleMember { union: String, member: String },

    #[error("no union relation named '{name}' on {entity}")]
    UnknownUnion { entity: String, name: String },

    #[error("tried to mix sequences and single records when assigning '{union}'")]
    ShapeMismatch { union: String },

    #[error("operation '{operation}' is not supported on union '{union}'")]
    UnsupportedOperation { union: String, operation: String },

    #[error("'{operation}' cannot be used on {cardinality} union '{union}'")]
    WrongCardinalityUse {
        union: String,
        operation: String,
        cardinality: &'static str,
    },

    #[error("union '{union}' has values in several members: {members:?}")]
    AmbiguousSingle { union: String, members: Vec<String> },
}
