//! In-memory transformation manager

use crate::config::{ConfigError, InMemoryConfig};
use crate::metadata::InMemoryMetadata;
use crate::store::TransformationStore;
use crate::transformation::{InMemoryTransformation, RestoreContext};
use std::io::{Read, Write};
use std::sync::Arc;
use xform_core::{
    EntityId, PersistenceManager, RequestInfo, Transformation, TransformationCore,
    TransformationError, TransformationManager,
};
use xform_status::{Clock, SystemClock};

/// Manager backed by a [`TransformationStore`]
#[derive(Debug)]
pub struct InMemoryTransformationManager {
    store: Arc<TransformationStore>,
    clock: Arc<dyn Clock>,
    persistence: PersistenceManager<RestoreContext>,
}

impl InMemoryTransformationManager {
    /// Create manager on the wall clock
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create manager on a custom clock
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self::from_store(TransformationStore::new(), clock)
    }

    /// Create manager sized by `config`
    ///
    /// # Errors
    /// [`ConfigError::InvalidShardAmount`]
    pub fn with_config(config: &InMemoryConfig, clock: Arc<dyn Clock>) -> Result<Self, ConfigError> {
        Ok(Self::from_store(TransformationStore::with_config(config)?, clock))
    }

    fn from_store(store: TransformationStore, clock: Arc<dyn Clock>) -> Self {
        let store = Arc::new(store);
        let persistence =
            PersistenceManager::new(RestoreContext::attached(Arc::clone(&clock), &store));
        Self {
            store,
            clock,
            persistence,
        }
    }

    /// Underlying store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &TransformationStore {
        &self.store
    }

    /// Number of tracked transformations
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Whether nothing is tracked
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Tracked identifiers, sorted
    #[must_use]
    pub fn ids(&self) -> Vec<EntityId> {
        self.store.ids()
    }

    /// Encode a tracked transformation
    ///
    /// # Errors
    /// [`TransformationError::NotFound`], or any encode failure
    pub fn export(&self, transform_id: &str) -> Result<String, TransformationError> {
        let transformation = self.get(transform_id)?;
        self.persistence.write(&*transformation)
    }

    /// Encode a tracked transformation into a sink
    ///
    /// # Errors
    /// [`TransformationError::NotFound`], or any encode failure
    pub fn export_to_writer<W: Write>(
        &self,
        transform_id: &str,
        writer: W,
    ) -> Result<(), TransformationError> {
        let transformation = self.get(transform_id)?;
        self.persistence.write_to(&*transformation, writer)
    }

    /// Decode a transformation and start tracking it
    ///
    /// # Errors
    /// Any decode failure, or [`TransformationError::AlreadyExists`]
    pub fn import_str(&self, content: &str) -> Result<Arc<InMemoryTransformation>, TransformationError> {
        let transformation = self.persistence.read::<InMemoryTransformation>(content)?;
        self.track(Arc::new(transformation))
    }

    /// Decode a transformation from a source and start tracking it
    ///
    /// # Errors
    /// Any decode failure, or [`TransformationError::AlreadyExists`]
    pub fn import_reader<R: Read>(
        &self,
        reader: R,
    ) -> Result<Arc<InMemoryTransformation>, TransformationError> {
        let transformation = self.persistence.read_from::<InMemoryTransformation, _>(reader)?;
        self.track(Arc::new(transformation))
    }

    fn track(
        &self,
        transformation: Arc<InMemoryTransformation>,
    ) -> Result<Arc<InMemoryTransformation>, TransformationError> {
        if !self.store.insert_if_absent(Arc::clone(&transformation)) {
            return Err(TransformationError::AlreadyExists(
                transformation.core().id().to_string(),
            ));
        }
        tracing::info!("tracking transformation {}", transformation.core().id());
        Ok(transformation)
    }
}

impl Default for InMemoryTransformationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformationManager for InMemoryTransformationManager {
    type Transformation = InMemoryTransformation;

    fn create_transform(
        &self,
        current_location: &str,
        final_location: &str,
        metacard_location: &str,
    ) -> Result<Arc<InMemoryTransformation>, TransformationError> {
        let request_info = RequestInfo::parse(metacard_location, current_location, final_location)?;
        let core = TransformationCore::new(request_info, self.clock.now());
        let transformation = Arc::new(InMemoryTransformation::new(
            core,
            Arc::clone(&self.clock),
            Arc::downgrade(&self.store),
        ));
        self.track(transformation)
    }

    fn get(&self, transform_id: &str) -> Result<Arc<InMemoryTransformation>, TransformationError> {
        self.store
            .get(transform_id)
            .ok_or_else(|| TransformationError::transformation_not_found(transform_id))
    }

    fn get_metadata(
        &self,
        transform_id: &str,
        metadata_type: &str,
    ) -> Result<Arc<InMemoryMetadata>, TransformationError> {
        self.get(transform_id)?.metadata(metadata_type)
    }

    fn delete(&self, transform_id: &str) -> Result<(), TransformationError> {
        let transformation = self
            .store
            .remove(transform_id)
            .ok_or_else(|| TransformationError::transformation_not_found(transform_id))?;
        transformation.mark_deleted();
        Ok(())
    }
}
