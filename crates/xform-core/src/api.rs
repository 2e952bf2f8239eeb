//! Caller-facing transformation API
//!
//! Store implementations provide these; callers program against them.

use crate::content::ContentStream;
use crate::error::TransformationError;
use crate::id::EntityId;
use crate::request_info::RequestInfo;
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;
use xform_status::{ErrorCode, State};

/// Status common to a transformation and each of its sub-tasks
pub trait TransformationStatus {
    /// Owning transformation
    fn transform_id(&self) -> &EntityId;

    /// Request being processed
    fn request_info(&self) -> &RequestInfo;

    /// When work started
    fn start_time(&self) -> DateTime<Utc>;

    /// When work finished; absent while running
    fn completion_time(&self) -> Option<DateTime<Utc>>;

    /// Current state
    fn state(&self) -> State;

    /// Completed duration, or time elapsed so far
    fn duration(&self) -> TimeDelta;

    /// Whether the transformation was deleted
    fn is_deleted(&self) -> bool;

    /// `Successful` or `Failed`
    fn is_completed(&self) -> bool {
        self.state().is_completed()
    }

    /// `Failed`
    fn has_failed(&self) -> bool {
        self.state().has_failed()
    }

    /// `Successful`
    fn was_successful(&self) -> bool {
        self.state().was_successful()
    }

    /// State not recognized by this code
    fn is_unknown(&self) -> bool {
        self.state() == State::Unknown
    }
}

/// One sub-task generating a derived artifact
pub trait MetadataTransformation: TransformationStatus {
    /// Sub-task identifier
    fn metadata_id(&self) -> &EntityId;

    /// Type tag, unique within the transformation
    fn metadata_type(&self) -> &str;

    /// Content type set on success
    fn content_type(&self) -> Option<String>;

    /// Content length set on success
    fn content_length(&self) -> Option<u64>;

    /// Content stored on success
    ///
    /// # Errors
    /// [`TransformationError::IllegalState`] once deleted
    fn content(&self) -> Result<Option<Arc<[u8]>>, TransformationError>;

    /// Reason set on failure
    fn failure_reason(&self) -> Option<ErrorCode>;

    /// Message set on failure
    fn failure_message(&self) -> Option<String>;

    /// Complete successfully with the given content
    ///
    /// # Errors
    /// - [`TransformationError::IllegalState`] if deleted or already completed
    /// - [`TransformationError::Io`] if the content cannot be read; the
    ///   sub-task stays in progress
    fn succeed<S: ContentStream>(&self, content_type: &str, content: S)
        -> Result<(), TransformationError>;

    /// Complete with a failure
    ///
    /// # Errors
    /// [`TransformationError::IllegalState`] if deleted or already completed
    fn fail(&self, reason: ErrorCode, message: &str) -> Result<(), TransformationError>;
}

/// A transformation and its sub-tasks
pub trait Transformation: TransformationStatus {
    /// Sub-task type
    type Metadata: MetadataTransformation;

    /// Delete this transformation and every sub-task; repeated calls are no-ops
    fn delete(&self);

    /// Sub-task for `metadata_type`, created on first call
    ///
    /// # Errors
    /// [`TransformationError::IllegalState`] if deleted or already completed
    fn add(&self, metadata_type: &str) -> Result<Arc<Self::Metadata>, TransformationError>;

    /// Existing sub-task for `metadata_type`
    ///
    /// # Errors
    /// [`TransformationError::NotFound`] when absent
    fn metadata(&self, metadata_type: &str) -> Result<Arc<Self::Metadata>, TransformationError>;

    /// Every sub-task, ordered by type
    fn metadatas(&self) -> Vec<Arc<Self::Metadata>>;

    /// Every sub-task type, sorted
    fn metadata_types(&self) -> Vec<String>;
}

/// Entry point for creating and finding transformations
pub trait TransformationManager {
    /// Transformation type
    type Transformation: Transformation;

    /// Start tracking a new transformation
    ///
    /// # Errors
    /// [`TransformationError::Validation`] for a missing or unparsable location
    fn create_transform(
        &self,
        current_location: &str,
        final_location: &str,
        metacard_location: &str,
    ) -> Result<Arc<Self::Transformation>, TransformationError>;

    /// Transformation by id
    ///
    /// # Errors
    /// [`TransformationError::NotFound`] when absent
    fn get(&self, transform_id: &str) -> Result<Arc<Self::Transformation>, TransformationError>;

    /// Sub-task by transformation id and type
    ///
    /// # Errors
    /// [`TransformationError::NotFound`] when either is absent
    fn get_metadata(
        &self,
        transform_id: &str,
        metadata_type: &str,
    ) -> Result<Arc<<Self::Transformation as Transformation>::Metadata>, TransformationError> {
        self.get(transform_id)?.metadata(metadata_type)
    }

    /// Stop tracking and mark deleted
    ///
    /// # Errors
    /// [`TransformationError::NotFound`] when absent, including a second call
    fn delete(&self, transform_id: &str) -> Result<(), TransformationError>;
}
