//! Metadata record

use crate::record::{Record, RecordBody, RecordHeader};
use crate::request_info::RequestInfoRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel written in `content_length` when no content exists
pub const ABSENT_LENGTH: i64 = -1;

fn absent_length() -> i64 {
    ABSENT_LENGTH
}

/// Wire shape of one metadata sub-task
///
/// Field order is the wire order. Enum-like fields (`state`,
/// `failure_reason`) travel as their canonical names so that values added
/// by newer writers survive as plain strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataBody {
    /// Carried by the enclosing [`Record`] envelope
    #[serde(skip)]
    pub header: RecordHeader,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform_id: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub metadata_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_info: Option<RequestInfoRecord>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::timestamp::option"
    )]
    pub start_time: Option<DateTime<Utc>>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::timestamp::option"
    )]
    pub completion_time: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    /// Negative means absent; always written
    #[serde(default = "absent_length")]
    pub content_length: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_message: Option<String>,
}

impl Default for MetadataBody {
    fn default() -> Self {
        Self {
            header: RecordHeader::default(),
            transform_id: None,
            metadata_type: None,
            request_info: None,
            state: None,
            start_time: None,
            completion_time: None,
            content_type: None,
            content_length: ABSENT_LENGTH,
            failure_reason: None,
            failure_message: None,
        }
    }
}

impl RecordBody for MetadataBody {
    const CLAZZ: &'static str = "metadata";
    const CURRENT_VERSION: i32 = 1;
    const MINIMUM_VERSION: i32 = 1;

    fn header(&self) -> &RecordHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut RecordHeader {
        &mut self.header
    }
}

/// Metadata record as stored
pub type MetadataRecord = Record<MetadataBody>;
