//! Transformation Records
//!
//! Versioned, forward-compatible wire records for transformation state.
//!
//! # Core Concepts
//!
//! - [`Record<B>`]: tagged envelope; unrecognized `clazz` decodes to
//!   [`Record::Unknown`] instead of failing
//! - [`RecordBody`]: per-type payload with `CLAZZ`, `CURRENT_VERSION` and
//!   `MINIMUM_VERSION`
//! - [`RequestInfoBody`], [`MetadataBody`], [`TransformationBody`]: the
//!   three persisted shapes
//! - [`AnyRecord`]: registry-driven decode when the type is not known
//! - [`json`]: buffer and stream encode/decode
//! - [`timestamp`]: decimal epoch-seconds instants
//!
//! # Example
//!
//! ```rust
//! use xform_record::{json, RecordHeader, RequestInfoBody, RequestInfoRecord};
//!
//! let record = RequestInfoRecord::new(RequestInfoBody {
//!     header: RecordHeader::new("r-1", 1),
//!     metacard_location: Some("http://localhost/metacard".into()),
//!     current_location: Some("http://localhost/current".into()),
//!     final_location: Some("http://localhost/final".into()),
//! });
//!
//! let text = json::to_string(&record).unwrap();
//! assert!(text.starts_with(r#"{"clazz":"request","id":"r-1","version":1"#));
//!
//! let back: RequestInfoRecord = json::from_str(&text).unwrap();
//! assert_eq!(back, record);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod json;
mod metadata;
mod record;
mod registry;
mod request_info;
pub mod timestamp;
mod transformation;

// Re-exports
pub use json::CodecError;
pub use metadata::{MetadataBody, MetadataRecord, ABSENT_LENGTH};
pub use record::{Record, RecordBody, RecordHeader};
pub use registry::AnyRecord;
pub use request_info::{RequestInfoBody, RequestInfoRecord};
pub use transformation::{TransformationBody, TransformationRecord};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
