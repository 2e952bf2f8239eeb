//! Error types for transformation tracking
//!
//! - [`ValidationError`]: a field or record cannot be encoded/decoded
//! - [`StateViolation`]: a caller broke the lifecycle contract
//! - [`TransformationError`]: caller-facing umbrella

use std::fmt;
use xform_record::CodecError;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Renders ` for object: <id>` when the id is known
struct ForObject<'a>(&'a Option<String>);

impl fmt::Display for ForObject<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(id) => write!(f, " for object: {id}"),
            None => Ok(()),
        }
    }
}

/// A field or record failed validation
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// Required field absent
    #[error("missing {kind} {field}{}", ForObject(.id))]
    Missing {
        kind: &'static str,
        field: &'static str,
        id: Option<String>,
    },

    /// Required string field present but empty
    #[error("empty {kind} {field}{}", ForObject(.id))]
    Empty {
        kind: &'static str,
        field: &'static str,
        id: Option<String>,
    },

    /// Field present but could not be converted
    #[error("invalid {kind} {field}{}: {source}", ForObject(.id))]
    Invalid {
        kind: &'static str,
        field: &'static str,
        id: Option<String>,
        #[source]
        source: BoxError,
    },

    /// Enum field holds the unknown sentinel
    #[error("unknown {kind} {field}{}", ForObject(.id))]
    UnknownValue {
        kind: &'static str,
        field: &'static str,
        id: Option<String>,
    },

    /// Entity was built from content this code does not understand
    #[error("unknown {kind}{}", ForObject(.id))]
    UnknownContent {
        kind: &'static str,
        id: Option<String>,
    },

    /// Record older than the oldest readable version
    #[error("unsupported {kind} version: {version}{}", ForObject(.id))]
    UnsupportedVersion {
        kind: &'static str,
        version: i32,
        id: Option<String>,
    },

    /// Same metadata type listed twice in one transformation
    #[error("duplicate metadata type: {metadata_type}{}", ForObject(.id))]
    DuplicateMetadata {
        metadata_type: String,
        id: Option<String>,
    },
}

impl ValidationError {
    /// Name of the offending field, when the error is about one
    #[must_use]
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::Missing { field, .. }
            | Self::Empty { field, .. }
            | Self::Invalid { field, .. }
            | Self::UnknownValue { field, .. } => Some(field),
            Self::UnknownContent { .. }
            | Self::UnsupportedVersion { .. }
            | Self::DuplicateMetadata { .. } => None,
        }
    }

    /// Identifier of the offending object, when known
    #[must_use]
    pub fn object_id(&self) -> Option<&str> {
        match self {
            Self::Missing { id, .. }
            | Self::Empty { id, .. }
            | Self::Invalid { id, .. }
            | Self::UnknownValue { id, .. }
            | Self::UnknownContent { id, .. }
            | Self::UnsupportedVersion { id, .. }
            | Self::DuplicateMetadata { id, .. } => id.as_deref(),
        }
    }
}

/// Lifecycle contract broken by the caller
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateViolation {
    /// Operation on a deleted entity
    #[error("{kind} {id} was deleted")]
    Deleted { kind: &'static str, id: String },

    /// Transition attempted after a terminal state
    #[error("{kind} {id} already completed")]
    AlreadyCompleted { kind: &'static str, id: String },
}

impl StateViolation {
    /// Convert into the caller-facing error
    ///
    /// # Panics
    /// Always, when built with the `strict-debug` feature
    #[must_use]
    pub fn fault(self) -> TransformationError {
        if crate::strict_debug() {
            panic!("illegal state: {self}");
        }
        tracing::error!("illegal state: {}", self);
        TransformationError::IllegalState(self)
    }
}

/// Caller-facing error
#[derive(Debug, thiserror::Error)]
pub enum TransformationError {
    /// Field or record validation failed
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No entity under the given key
    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },

    /// Encode/decode machinery failed
    #[error("processing failed: {0}")]
    Processing(#[from] CodecError),

    /// Content stream could not be read
    #[error("content i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// Identifier already taken in the store
    #[error("transformation already exists: {0}")]
    AlreadyExists(String),

    /// Caller broke the lifecycle contract
    #[error("illegal state: {0}")]
    IllegalState(StateViolation),
}

impl TransformationError {
    /// No transformation with this id
    #[must_use]
    pub fn transformation_not_found(id: &str) -> Self {
        Self::NotFound {
            kind: "transformation",
            key: id.to_owned(),
        }
    }

    /// No metadata of this type in the transformation
    #[must_use]
    pub fn metadata_not_found(transform_id: &str, metadata_type: &str) -> Self {
        Self::NotFound {
            kind: "metadata",
            key: format!("{transform_id}/{metadata_type}"),
        }
    }

    /// Whether this is a lookup miss
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether the caller broke the lifecycle contract
    #[inline]
    #[must_use]
    pub fn is_programming_error(&self) -> bool {
        matches!(self, Self::IllegalState(_))
    }
}
