//! In-memory transformation aggregate
//!
//! State and completion time are never stored: both are recomputed from the
//! sub-tasks on every call. Deletion is a flag shared with every sub-task
//! and is never cleared.

use crate::metadata::InMemoryMetadata;
use crate::store::TransformationStore;
use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use xform_core::{
    EntityId, FromRecord, MetadataCore, MetadataTransformation, Persistable, RequestInfo,
    StateViolation, Transformation, TransformationCore, TransformationError,
    TransformationStatus, ValidationError,
};
use xform_record::{TransformationBody, TransformationRecord};
use xform_status::{elapsed, latest_completion, Clock, State};

/// One-way deletion marker shared by a transformation and its sub-tasks
#[derive(Debug, Clone, Default)]
pub(crate) struct DeletionFlag(Arc<AtomicBool>);

impl DeletionFlag {
    /// Set the flag; true only for the call that set it
    pub(crate) fn mark(&self) -> bool {
        !self.0.swap(true, Ordering::AcqRel)
    }

    pub(crate) fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// What a decoded transformation needs from its new owner
#[derive(Debug, Clone)]
pub struct RestoreContext {
    clock: Arc<dyn Clock>,
    store: Weak<TransformationStore>,
}

impl RestoreContext {
    /// Context for a transformation not attached to any store
    #[must_use]
    pub fn detached(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            store: Weak::new(),
        }
    }

    pub(crate) fn attached(clock: Arc<dyn Clock>, store: &Arc<TransformationStore>) -> Self {
        Self {
            clock,
            store: Arc::downgrade(store),
        }
    }
}

/// Transformation and its sub-tasks keyed by type
#[derive(Debug)]
pub struct InMemoryTransformation {
    core: TransformationCore,
    clock: Arc<dyn Clock>,
    deleted: DeletionFlag,
    metadatas: DashMap<String, Arc<InMemoryMetadata>>,
    store: Weak<TransformationStore>,
}

impl InMemoryTransformation {
    pub(crate) fn new(
        core: TransformationCore,
        clock: Arc<dyn Clock>,
        store: Weak<TransformationStore>,
    ) -> Self {
        Self {
            core,
            clock,
            deleted: DeletionFlag::default(),
            metadatas: DashMap::new(),
            store,
        }
    }

    /// Immutable identity
    #[inline]
    #[must_use]
    pub fn core(&self) -> &TransformationCore {
        &self.core
    }

    /// Mark this transformation and every sub-task deleted
    pub(crate) fn mark_deleted(&self) {
        if self.deleted.mark() {
            tracing::info!("deleted transformation {}", self.core.id());
        }
    }

    fn violation(&self, deleted: bool) -> TransformationError {
        let kind = TransformationCore::PERSISTABLE_TYPE;
        let id = self.core.id().to_string();
        if deleted {
            StateViolation::Deleted { kind, id }.fault()
        } else {
            StateViolation::AlreadyCompleted { kind, id }.fault()
        }
    }

    fn children(&self) -> impl Iterator<Item = Arc<InMemoryMetadata>> + '_ {
        self.metadatas.iter().map(|entry| Arc::clone(entry.value()))
    }
}

impl TransformationStatus for InMemoryTransformation {
    fn transform_id(&self) -> &EntityId {
        self.core.id()
    }

    fn request_info(&self) -> &RequestInfo {
        self.core.request_info()
    }

    fn start_time(&self) -> DateTime<Utc> {
        self.core.start_time()
    }

    fn completion_time(&self) -> Option<DateTime<Utc>> {
        if !self.is_completed() {
            return None;
        }
        latest_completion(self.children().map(|m| m.completion_time()))
    }

    fn state(&self) -> State {
        State::fold(self.children().map(|m| m.state()))
    }

    fn duration(&self) -> TimeDelta {
        elapsed(self.core.start_time(), self.completion_time(), self.clock.as_ref())
    }

    fn is_deleted(&self) -> bool {
        self.deleted.is_set()
    }
}

impl Transformation for InMemoryTransformation {
    type Metadata = InMemoryMetadata;

    fn delete(&self) {
        if let Some(store) = self.store.upgrade() {
            store.remove_instance(self);
        }
        self.mark_deleted();
    }

    fn add(&self, metadata_type: &str) -> Result<Arc<InMemoryMetadata>, TransformationError> {
        if self.is_deleted() {
            return Err(self.violation(true));
        }
        if self.is_completed() {
            return Err(self.violation(false));
        }

        let entry = self
            .metadatas
            .entry(metadata_type.to_owned())
            .or_insert_with(|| {
                tracing::debug!(
                    "adding metadata {} to transformation {}",
                    metadata_type,
                    self.core.id()
                );
                let core = MetadataCore::new(
                    self.core.id().clone(),
                    metadata_type,
                    self.core.request_info().clone(),
                    self.clock.now(),
                );
                Arc::new(InMemoryMetadata::new(
                    core,
                    Arc::clone(&self.clock),
                    self.deleted.clone(),
                ))
            });
        Ok(Arc::clone(entry.value()))
    }

    fn metadata(&self, metadata_type: &str) -> Result<Arc<InMemoryMetadata>, TransformationError> {
        self.metadatas
            .get(metadata_type)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| {
                TransformationError::metadata_not_found(self.core.id().as_str(), metadata_type)
            })
    }

    fn metadatas(&self) -> Vec<Arc<InMemoryMetadata>> {
        let mut children: Vec<_> = self.children().collect();
        children.sort_by(|a, b| a.metadata_type().cmp(b.metadata_type()));
        children
    }

    fn metadata_types(&self) -> Vec<String> {
        let mut types: Vec<_> = self.metadatas.iter().map(|entry| entry.key().clone()).collect();
        types.sort();
        types
    }
}

impl Persistable for InMemoryTransformation {
    type Body = TransformationBody;

    const PERSISTABLE_TYPE: &'static str = TransformationCore::PERSISTABLE_TYPE;

    fn id(&self) -> &EntityId {
        self.core.id()
    }

    fn has_unknowns(&self) -> bool {
        self.core.has_unknown_content() || self.children().any(|m| m.has_unknowns())
    }

    fn to_record(&self) -> Result<TransformationRecord, ValidationError> {
        if self.has_unknowns() {
            return Err(self.fields().unknown_content());
        }
        let records = self
            .metadatas()
            .iter()
            .map(|m| m.to_record())
            .collect::<Result<Vec<_>, _>>()?;
        self.core.to_record(records)
    }
}

impl FromRecord for InMemoryTransformation {
    type Body = TransformationBody;
    type Context = RestoreContext;

    fn from_record(
        record: TransformationRecord,
        context: &RestoreContext,
    ) -> Result<Self, ValidationError> {
        let decoded = TransformationCore::from_record(record)?;
        let deleted = DeletionFlag::default();

        let metadatas = decoded
            .metadatas
            .into_iter()
            .map(|child| {
                let metadata_type = child.core.metadata_type().to_owned();
                let metadata = InMemoryMetadata::restore(
                    child,
                    Arc::clone(&context.clock),
                    deleted.clone(),
                );
                (metadata_type, Arc::new(metadata))
            })
            .collect();

        Ok(Self {
            core: decoded.core,
            clock: Arc::clone(&context.clock),
            deleted,
            metadatas,
            store: context.store.clone(),
        })
    }
}

impl PartialEq for InMemoryTransformation {
    fn eq(&self, other: &Self) -> bool {
        self.core.id() == other.core.id()
    }
}

impl Eq for InMemoryTransformation {}

impl Hash for InMemoryTransformation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.core.id().hash(state);
    }
}
