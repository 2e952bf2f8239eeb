//! Transformation record

use crate::metadata::MetadataRecord;
use crate::record::{Record, RecordBody, RecordHeader};
use crate::request_info::RequestInfoRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Wire shape of a transformation and all of its metadata sub-tasks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformationBody {
    /// Carried by the enclosing [`Record`] envelope
    #[serde(skip)]
    pub header: RecordHeader,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_info: Option<RequestInfoRecord>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::timestamp::option"
    )]
    pub start_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub metadatas: Vec<MetadataRecord>,
}

impl RecordBody for TransformationBody {
    const CLAZZ: &'static str = "transformation";
    const CURRENT_VERSION: i32 = 1;
    const MINIMUM_VERSION: i32 = 1;

    fn header(&self) -> &RecordHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut RecordHeader {
        &mut self.header
    }
}

/// Transformation record as stored
pub type TransformationRecord = Record<TransformationBody>;
