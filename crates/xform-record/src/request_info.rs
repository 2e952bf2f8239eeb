//! Request-info record

use crate::record::{Record, RecordBody, RecordHeader};
use serde::{Deserialize, Serialize};

/// Wire shape of a request descriptor
///
/// Locations are kept as raw strings here; validation and parsing happen
/// when the owning entity is rebuilt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestInfoBody {
    /// Carried by the enclosing [`Record`] envelope
    #[serde(skip)]
    pub header: RecordHeader,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metacard_location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_location: Option<String>,
}

impl RecordBody for RequestInfoBody {
    const CLAZZ: &'static str = "request";
    const CURRENT_VERSION: i32 = 1;
    const MINIMUM_VERSION: i32 = 1;

    fn header(&self) -> &RecordHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut RecordHeader {
        &mut self.header
    }
}

/// Request-info record as stored
pub type RequestInfoRecord = Record<RequestInfoBody>;
