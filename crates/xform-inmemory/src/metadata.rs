//! In-memory metadata sub-task
//!
//! Every read of more than one lifecycle field and every transition goes
//! through the same per-unit lock, so a reader never sees a half-applied
//! transition.

use crate::transformation::DeletionFlag;
use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use xform_core::{
    drain, ContentStream, DecodedMetadata, EntityId, MetadataCore, MetadataTransformation,
    Persistable, Progress, RequestInfo, StateViolation, TransformationError, TransformationStatus,
    ValidationError,
};
use xform_record::{MetadataBody, MetadataRecord};
use xform_status::{elapsed, Clock, ErrorCode, State};

#[derive(Debug, Default)]
struct Slot {
    progress: Progress,
    content: Option<Arc<[u8]>>,
}

/// Sub-task owned by an [`InMemoryTransformation`](crate::InMemoryTransformation)
#[derive(Debug)]
pub struct InMemoryMetadata {
    core: MetadataCore,
    clock: Arc<dyn Clock>,
    deleted: DeletionFlag,
    slot: Mutex<Slot>,
}

impl InMemoryMetadata {
    pub(crate) fn new(core: MetadataCore, clock: Arc<dyn Clock>, deleted: DeletionFlag) -> Self {
        Self {
            core,
            clock,
            deleted,
            slot: Mutex::new(Slot::default()),
        }
    }

    pub(crate) fn restore(
        decoded: DecodedMetadata,
        clock: Arc<dyn Clock>,
        deleted: DeletionFlag,
    ) -> Self {
        Self {
            core: decoded.core,
            clock,
            deleted,
            slot: Mutex::new(Slot {
                progress: decoded.progress,
                content: None,
            }),
        }
    }

    /// Immutable identity
    #[inline]
    #[must_use]
    pub fn core(&self) -> &MetadataCore {
        &self.core
    }

    /// Consistent copy of every lifecycle field
    #[must_use]
    pub fn progress(&self) -> Progress {
        self.slot.lock().progress.clone()
    }

    fn violation(&self, deleted: bool) -> TransformationError {
        let kind = MetadataCore::PERSISTABLE_TYPE;
        let id = self.core.id().to_string();
        if deleted {
            StateViolation::Deleted { kind, id }.fault()
        } else {
            StateViolation::AlreadyCompleted { kind, id }.fault()
        }
    }

    fn check_not_deleted(&self) -> Result<(), TransformationError> {
        if self.deleted.is_set() {
            return Err(self.violation(true));
        }
        Ok(())
    }

    fn check_not_completed(&self, progress: &Progress) -> Result<(), TransformationError> {
        if progress.state.is_completed() {
            return Err(self.violation(false));
        }
        Ok(())
    }
}

impl TransformationStatus for InMemoryMetadata {
    fn transform_id(&self) -> &EntityId {
        self.core.transform_id()
    }

    fn request_info(&self) -> &RequestInfo {
        self.core.request_info()
    }

    fn start_time(&self) -> DateTime<Utc> {
        self.core.start_time()
    }

    fn completion_time(&self) -> Option<DateTime<Utc>> {
        self.slot.lock().progress.completion_time
    }

    fn state(&self) -> State {
        self.slot.lock().progress.state
    }

    fn duration(&self) -> TimeDelta {
        let slot = self.slot.lock();
        let completion = slot
            .progress
            .completion_time
            .filter(|_| slot.progress.state.is_completed());
        elapsed(self.core.start_time(), completion, self.clock.as_ref())
    }

    fn is_deleted(&self) -> bool {
        self.deleted.is_set()
    }
}

impl MetadataTransformation for InMemoryMetadata {
    fn metadata_id(&self) -> &EntityId {
        self.core.id()
    }

    fn metadata_type(&self) -> &str {
        self.core.metadata_type()
    }

    fn content_type(&self) -> Option<String> {
        self.slot.lock().progress.content_type.clone()
    }

    fn content_length(&self) -> Option<u64> {
        self.slot.lock().progress.content_length
    }

    fn content(&self) -> Result<Option<Arc<[u8]>>, TransformationError> {
        self.check_not_deleted()?;
        Ok(self.slot.lock().content.clone())
    }

    fn failure_reason(&self) -> Option<ErrorCode> {
        self.slot.lock().progress.failure_reason
    }

    fn failure_message(&self) -> Option<String> {
        self.slot.lock().progress.failure_message.clone()
    }

    fn succeed<S: ContentStream>(
        &self,
        content_type: &str,
        content: S,
    ) -> Result<(), TransformationError> {
        self.check_not_deleted()?;

        let mut slot = self.slot.lock();
        self.check_not_completed(&slot.progress)?;

        let bytes: Arc<[u8]> = drain(content, self.core.id().as_str())?.into();
        let length = u64::try_from(bytes.len()).unwrap_or(u64::MAX);

        let progress = &mut slot.progress;
        progress.content_type = Some(content_type.to_owned());
        progress.content_length = Some(length);
        progress.completion_time = Some(self.clock.now());
        progress.state = State::Successful;
        slot.content = Some(bytes);

        tracing::debug!(
            "metadata {} ({}) succeeded with {} bytes",
            self.core.id(),
            self.core.metadata_type(),
            length
        );
        Ok(())
    }

    fn fail(&self, reason: ErrorCode, message: &str) -> Result<(), TransformationError> {
        self.check_not_deleted()?;

        let mut slot = self.slot.lock();
        self.check_not_completed(&slot.progress)?;

        let progress = &mut slot.progress;
        progress.failure_reason = Some(reason);
        progress.failure_message = Some(message.to_owned());
        progress.completion_time = Some(self.clock.now());
        progress.state = State::Failed;

        tracing::debug!(
            "metadata {} ({}) failed: {} {}",
            self.core.id(),
            self.core.metadata_type(),
            reason,
            message
        );
        Ok(())
    }
}

impl Persistable for InMemoryMetadata {
    type Body = MetadataBody;

    const PERSISTABLE_TYPE: &'static str = MetadataCore::PERSISTABLE_TYPE;

    fn id(&self) -> &EntityId {
        self.core.id()
    }

    fn has_unknowns(&self) -> bool {
        self.core.has_unknowns(&self.slot.lock().progress)
    }

    fn to_record(&self) -> Result<MetadataRecord, ValidationError> {
        self.core.to_record(&self.slot.lock().progress)
    }
}

impl PartialEq for InMemoryMetadata {
    fn eq(&self, other: &Self) -> bool {
        self.core.id() == other.core.id()
    }
}

impl Eq for InMemoryMetadata {}

impl Hash for InMemoryMetadata {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.core.id().hash(state);
    }
}
