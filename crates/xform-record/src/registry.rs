//! Discriminator registry for untyped payloads
//!
//! Used when the caller does not know which record type a stored blob
//! holds: the `clazz` tag is peeked and looked up in a static table of
//! decode functions. Tags that are absent or not registered produce
//! [`AnyRecord::Unknown`] with the raw value preserved.

use crate::json::{self, CodecError};
use crate::metadata::{MetadataBody, MetadataRecord};
use crate::record::RecordBody;
use crate::request_info::{RequestInfoBody, RequestInfoRecord};
use crate::transformation::{TransformationBody, TransformationRecord};
use serde_json::Value;

/// Any record this crate knows how to decode
#[derive(Debug, Clone, PartialEq)]
pub enum AnyRecord {
    /// `clazz = "request"`
    RequestInfo(RequestInfoRecord),
    /// `clazz = "metadata"`
    Metadata(MetadataRecord),
    /// `clazz = "transformation"`
    Transformation(TransformationRecord),
    /// Tag absent or unregistered
    Unknown {
        /// Tag as found, if it was a string
        clazz: Option<String>,
        /// Untouched payload
        value: Value,
    },
}

type Decoder = fn(Value) -> Result<AnyRecord, serde_json::Error>;

fn decode_request_info(value: Value) -> Result<AnyRecord, serde_json::Error> {
    serde_json::from_value(value).map(AnyRecord::RequestInfo)
}

fn decode_metadata(value: Value) -> Result<AnyRecord, serde_json::Error> {
    serde_json::from_value(value).map(AnyRecord::Metadata)
}

fn decode_transformation(value: Value) -> Result<AnyRecord, serde_json::Error> {
    serde_json::from_value(value).map(AnyRecord::Transformation)
}

static DECODERS: [(&str, Decoder); 3] = [
    (RequestInfoBody::CLAZZ, decode_request_info),
    (MetadataBody::CLAZZ, decode_metadata),
    (TransformationBody::CLAZZ, decode_transformation),
];

fn lookup(clazz: &str) -> Option<Decoder> {
    DECODERS
        .iter()
        .find(|(tag, _)| *tag == clazz)
        .map(|(_, decoder)| *decoder)
}

impl AnyRecord {
    /// Decode an already-parsed JSON value
    ///
    /// # Errors
    /// Returns [`CodecError::Malformed`] if a registered tag is found but the
    /// payload does not fit its record shape
    pub fn from_value(value: Value) -> Result<Self, CodecError> {
        let clazz = value.get("clazz").and_then(Value::as_str).map(str::to_owned);

        match clazz.as_deref().and_then(lookup) {
            Some(decoder) => Ok(decoder(value)?),
            None => Ok(Self::Unknown { clazz, value }),
        }
    }

    /// Decode from a JSON string
    ///
    /// # Errors
    /// Returns [`CodecError::Malformed`] on invalid payload
    pub fn from_json(content: &str) -> Result<Self, CodecError> {
        Self::from_value(json::from_str(content)?)
    }

    /// Registered tags
    #[must_use]
    pub fn registered() -> impl Iterator<Item = &'static str> {
        DECODERS.iter().map(|(tag, _)| *tag)
    }

    /// Tag of this record
    #[must_use]
    pub fn clazz(&self) -> Option<&str> {
        match self {
            Self::RequestInfo(r) => r.clazz(),
            Self::Metadata(r) => r.clazz(),
            Self::Transformation(r) => r.clazz(),
            Self::Unknown { clazz, .. } => clazz.as_deref(),
        }
    }

    /// Identifier of this record, if readable
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::RequestInfo(r) => r.id(),
            Self::Metadata(r) => r.id(),
            Self::Transformation(r) => r.id(),
            Self::Unknown { value, .. } => value.get("id").and_then(Value::as_str),
        }
    }

    /// Whether the tag was not registered
    #[inline]
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown { .. })
    }
}
