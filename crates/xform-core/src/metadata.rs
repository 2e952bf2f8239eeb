//! Metadata sub-task: immutable identity plus a mutable progress value
//!
//! Store implementations own the [`Progress`] behind whatever lock they use
//! and hand it to [`MetadataCore`] for encoding.

use crate::error::ValidationError;
use crate::fields::Fields;
use crate::id::EntityId;
use crate::persist::{read_header, FromRecord, Persistable};
use crate::request_info::RequestInfo;
use chrono::{DateTime, Utc};
use xform_record::{MetadataBody, MetadataRecord, RecordHeader, ABSENT_LENGTH};
use xform_status::{ErrorCode, State, WireName};

/// Mutable lifecycle fields of a sub-task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    /// Current state
    pub state: State,
    /// Set on success or failure
    pub completion_time: Option<DateTime<Utc>>,
    /// Set on success
    pub content_type: Option<String>,
    /// Set on success
    pub content_length: Option<u64>,
    /// Set on failure
    pub failure_reason: Option<ErrorCode>,
    /// Set on failure
    pub failure_message: Option<String>,
}

impl Progress {
    /// Fresh sub-task
    #[must_use]
    pub const fn in_progress() -> Self {
        Self {
            state: State::InProgress,
            completion_time: None,
            content_type: None,
            content_length: None,
            failure_reason: None,
            failure_message: None,
        }
    }

    /// Whether an enum field holds the unknown sentinel
    #[must_use]
    pub fn has_unknowns(&self) -> bool {
        self.state.is_unknown() || self.failure_reason.is_some_and(WireName::is_unknown)
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::in_progress()
    }
}

/// Immutable part of a sub-task
#[derive(Debug, Clone)]
pub struct MetadataCore {
    id: EntityId,
    transform_id: EntityId,
    metadata_type: String,
    request_info: RequestInfo,
    start_time: DateTime<Utc>,
    unknown_content: bool,
}

/// Sub-task as read from a record
#[derive(Debug, Clone)]
pub struct DecodedMetadata {
    /// Immutable part
    pub core: MetadataCore,
    /// Lifecycle fields as stored
    pub progress: Progress,
}

impl MetadataCore {
    /// Persistable type name
    pub const PERSISTABLE_TYPE: &'static str = "metadata";

    /// Create sub-task core with a fresh id
    #[must_use]
    pub fn new(
        transform_id: EntityId,
        metadata_type: impl Into<String>,
        request_info: RequestInfo,
        start_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: EntityId::generate(),
            transform_id,
            metadata_type: metadata_type.into(),
            request_info,
            start_time,
            unknown_content: false,
        }
    }

    /// Sub-task identifier
    #[inline]
    #[must_use]
    pub fn id(&self) -> &EntityId {
        &self.id
    }

    /// Owning transformation
    #[inline]
    #[must_use]
    pub fn transform_id(&self) -> &EntityId {
        &self.transform_id
    }

    /// Type tag
    #[inline]
    #[must_use]
    pub fn metadata_type(&self) -> &str {
        &self.metadata_type
    }

    /// Request inherited from the transformation
    #[inline]
    #[must_use]
    pub fn request_info(&self) -> &RequestInfo {
        &self.request_info
    }

    /// When the sub-task was added
    #[inline]
    #[must_use]
    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// Unknown record variant, unknown nested request, or unknown enum value
    #[must_use]
    pub fn has_unknowns(&self, progress: &Progress) -> bool {
        self.unknown_content || progress.has_unknowns()
    }

    /// Validation context naming this sub-task
    #[must_use]
    pub fn fields(&self) -> Fields<'_> {
        Fields::new(Self::PERSISTABLE_TYPE, Some(self.id.as_str()))
    }

    /// Encode together with the current progress
    ///
    /// # Errors
    /// [`ValidationError::UnknownContent`] when anything unknown is held,
    /// otherwise any required-field failure
    pub fn to_record(&self, progress: &Progress) -> Result<MetadataRecord, ValidationError> {
        let fields = self.fields();
        if self.has_unknowns(progress) {
            return Err(fields.unknown_content());
        }

        let transform_id = fields.required_str("transform_id", Some(self.transform_id.as_str()))?;
        let metadata_type = fields.required_str("type", Some(&self.metadata_type))?;
        let request_info = self.request_info.to_record()?;
        let state = fields.enum_name("state", progress.state)?;
        let failure_reason = progress
            .failure_reason
            .map(|reason| fields.enum_name("failure_reason", reason))
            .transpose()?;

        Ok(MetadataRecord::new(MetadataBody {
            header: RecordHeader::current::<MetadataBody>(self.id.as_str()),
            transform_id: Some(transform_id.to_owned()),
            metadata_type: Some(metadata_type.to_owned()),
            request_info: Some(request_info),
            state: Some(state),
            start_time: Some(self.start_time),
            completion_time: progress.completion_time,
            content_type: progress.content_type.clone(),
            content_length: progress
                .content_length
                .map_or(ABSENT_LENGTH, |len| i64::try_from(len).unwrap_or(i64::MAX)),
            failure_reason,
            failure_message: progress.failure_message.clone(),
        }))
    }

    /// Decode identity and progress
    ///
    /// # Errors
    /// Any header, required-field or nested request failure
    pub fn from_record(record: MetadataRecord) -> Result<DecodedMetadata, ValidationError> {
        let head = read_header(Self::PERSISTABLE_TYPE, &record)?;
        let fields = Fields::new(Self::PERSISTABLE_TYPE, Some(head.id.as_str()));
        let body = record.into_body();

        let transform_id = fields.required_str("transform_id", body.transform_id.as_deref())?;
        let metadata_type = fields.required_str("type", body.metadata_type.as_deref())?;
        let request_info = RequestInfo::from_record(
            fields.required("request_info", body.request_info)?,
            &(),
        )?;
        let start_time = fields.required("start_time", body.start_time)?;
        let state = fields.required_enum("state", body.state.as_deref())?;
        let failure_reason = Fields::optional_enum(body.failure_reason.as_deref());

        let progress = Progress {
            state,
            completion_time: body.completion_time,
            content_type: body.content_type,
            content_length: u64::try_from(body.content_length).ok(),
            failure_reason,
            failure_message: body.failure_message,
        };

        let core = Self {
            transform_id: EntityId::from(transform_id),
            metadata_type: metadata_type.to_owned(),
            unknown_content: head.unknown || request_info.has_unknowns(),
            request_info,
            start_time,
            id: head.id,
        };

        if core.has_unknowns(&progress) {
            tracing::warn!("metadata {} holds unknown content", core.id);
        }

        Ok(DecodedMetadata { core, progress })
    }
}
