//! Transformation Core
//!
//! Entity base shared by every store implementation:
//!
//! - [`EntityId`]: opaque identity, generated once
//! - [`Fields`]: required/empty/enum validation with consistent messages
//! - [`Persistable`] / [`FromRecord`]: entity to record and back
//! - [`RequestInfo`]: the request descriptor
//! - [`MetadataCore`] + [`Progress`], [`TransformationCore`]: what a store
//!   composes its entities from
//! - [`api`]: the traits callers program against

#![warn(unreachable_pub)]

pub mod api;
mod content;
mod error;
mod fields;
mod id;
mod metadata;
mod persist;
mod request_info;
mod transformation;

pub use api::{MetadataTransformation, Transformation, TransformationManager, TransformationStatus};
pub use content::{drain, ContentStream};
pub use error::{StateViolation, TransformationError, ValidationError};
pub use fields::Fields;
pub use id::EntityId;
pub use metadata::{DecodedMetadata, MetadataCore, Progress};
pub use persist::{read_header, FromRecord, Persistable, PersistenceManager, RecordHead};
pub use request_info::{Location, RequestInfo, RequestLocations};
pub use transformation::{DecodedTransformation, TransformationCore};

/// Prelude for common imports
pub mod prelude {
    pub use crate::api::{
        MetadataTransformation, Transformation, TransformationManager, TransformationStatus,
    };
    pub use crate::{ContentStream, EntityId, RequestInfo, TransformationError};
    pub use xform_status::{ErrorCode, State};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Whether lifecycle violations panic instead of returning an error
pub const fn strict_debug() -> bool {
    cfg!(feature = "strict-debug")
}
