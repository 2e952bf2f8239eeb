//! In-Memory Transformation Store
//!
//! Reference store for transformation tracking: a concurrent map of
//! transformations, each holding a concurrent map of sub-tasks guarded by
//! their own locks.
//!
//! ```rust
//! use xform_inmemory::prelude::*;
//! use xform_inmemory::InMemoryTransformationManager;
//!
//! let manager = InMemoryTransformationManager::new();
//! let transformation = manager
//!     .create_transform("http://host/current", "http://host/final", "http://host/metacard")
//!     .unwrap();
//!
//! let unit = transformation.add("idx").unwrap();
//! unit.succeed("text/plain", &b"hi"[..]).unwrap();
//!
//! assert_eq!(transformation.state(), State::Successful);
//! assert_eq!(unit.content_length(), Some(2));
//! ```

#![warn(unreachable_pub)]

mod config;
mod manager;
mod metadata;
mod store;
mod transformation;

pub use config::{ConfigError, InMemoryConfig};
pub use manager::InMemoryTransformationManager;
pub use metadata::InMemoryMetadata;
pub use store::TransformationStore;
pub use transformation::{InMemoryTransformation, RestoreContext};

/// Prelude for common imports
pub mod prelude {
    pub use xform_core::prelude::*;
    pub use xform_core::Persistable;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
