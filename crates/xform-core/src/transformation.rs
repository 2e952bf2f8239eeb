//! Transformation aggregate: identity, request, and its sub-task records

use crate::error::ValidationError;
use crate::fields::Fields;
use crate::id::EntityId;
use crate::metadata::{DecodedMetadata, MetadataCore};
use crate::persist::{read_header, FromRecord, Persistable};
use crate::request_info::RequestInfo;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use xform_record::{MetadataRecord, RecordHeader, TransformationBody, TransformationRecord};

/// Immutable part of a transformation
#[derive(Debug, Clone)]
pub struct TransformationCore {
    id: EntityId,
    request_info: RequestInfo,
    start_time: DateTime<Utc>,
    unknown_content: bool,
}

/// Transformation as read from a record
#[derive(Debug, Clone)]
pub struct DecodedTransformation {
    /// Immutable part
    pub core: TransformationCore,
    /// Sub-tasks in record order
    pub metadatas: Vec<DecodedMetadata>,
}

impl TransformationCore {
    /// Persistable type name
    pub const PERSISTABLE_TYPE: &'static str = "transformation";

    /// Create transformation core with a fresh id
    #[must_use]
    pub fn new(request_info: RequestInfo, start_time: DateTime<Utc>) -> Self {
        Self {
            id: EntityId::generate(),
            request_info,
            start_time,
            unknown_content: false,
        }
    }

    /// Transformation identifier
    #[inline]
    #[must_use]
    pub fn id(&self) -> &EntityId {
        &self.id
    }

    /// Request being processed
    #[inline]
    #[must_use]
    pub fn request_info(&self) -> &RequestInfo {
        &self.request_info
    }

    /// When the transformation was created
    #[inline]
    #[must_use]
    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// Unknown record variant or unknown nested request
    ///
    /// Sub-task unknowns are tracked by the sub-tasks themselves.
    #[inline]
    #[must_use]
    pub fn has_unknown_content(&self) -> bool {
        self.unknown_content
    }

    /// Validation context naming this transformation
    #[must_use]
    pub fn fields(&self) -> Fields<'_> {
        Fields::new(Self::PERSISTABLE_TYPE, Some(self.id.as_str()))
    }

    /// Encode with already-encoded sub-task records
    ///
    /// Callers pass `metadatas` sorted by type and must have checked the
    /// sub-tasks for unknowns.
    ///
    /// # Errors
    /// [`ValidationError::UnknownContent`] when unknown content is held,
    /// or a nested request failure
    pub fn to_record(
        &self,
        metadatas: Vec<MetadataRecord>,
    ) -> Result<TransformationRecord, ValidationError> {
        if self.unknown_content {
            return Err(self.fields().unknown_content());
        }

        Ok(TransformationRecord::new(TransformationBody {
            header: RecordHeader::current::<TransformationBody>(self.id.as_str()),
            request_info: Some(self.request_info.to_record()?),
            start_time: Some(self.start_time),
            metadatas,
        }))
    }

    /// Decode transformation and every sub-task
    ///
    /// # Errors
    /// Any header, required-field or sub-task failure, or
    /// [`ValidationError::DuplicateMetadata`]
    pub fn from_record(record: TransformationRecord) -> Result<DecodedTransformation, ValidationError> {
        let head = read_header(Self::PERSISTABLE_TYPE, &record)?;
        let fields = Fields::new(Self::PERSISTABLE_TYPE, Some(head.id.as_str()));
        let body = record.into_body();

        let request_info = RequestInfo::from_record(
            fields.required("request_info", body.request_info)?,
            &(),
        )?;
        let start_time = fields.required("start_time", body.start_time)?;

        let mut seen = HashSet::with_capacity(body.metadatas.len());
        let mut metadatas = Vec::with_capacity(body.metadatas.len());
        for child in body.metadatas {
            let decoded = MetadataCore::from_record(child)?;
            let metadata_type = decoded.core.metadata_type();
            if !seen.insert(metadata_type.to_owned()) {
                return Err(ValidationError::DuplicateMetadata {
                    metadata_type: metadata_type.to_owned(),
                    id: Some(head.id.to_string()),
                });
            }
            metadatas.push(decoded);
        }

        let core = Self {
            unknown_content: head.unknown || request_info.has_unknowns(),
            request_info,
            start_time,
            id: head.id,
        };

        Ok(DecodedTransformation { core, metadatas })
    }
}
