//! Entity/record conversion contract and persistence manager
//!
//! [`Persistable`] turns an entity into its record; [`FromRecord`] rebuilds
//! an entity from one. Every reader starts with [`read_header`], which
//! applies the identity and version checks shared by all record types.

use crate::error::{TransformationError, ValidationError};
use crate::fields::Fields;
use crate::id::EntityId;
use std::io::{Read, Write};
use xform_record::{json, Record, RecordBody};

/// Entity that can be written as a record
pub trait Persistable {
    /// Record payload type
    type Body: RecordBody;

    /// Human-readable type name used in error messages
    const PERSISTABLE_TYPE: &'static str;

    /// Entity identifier
    fn id(&self) -> &EntityId;

    /// Whether the entity holds content this code does not understand
    fn has_unknowns(&self) -> bool;

    /// Build the record
    ///
    /// # Errors
    /// [`ValidationError::UnknownContent`] when [`Persistable::has_unknowns`]
    /// is true, otherwise any required-field failure
    fn to_record(&self) -> Result<Record<Self::Body>, ValidationError>;

    /// Validation context naming this entity
    fn fields(&self) -> Fields<'_> {
        Fields::new(Self::PERSISTABLE_TYPE, Some(self.id().as_str()))
    }
}

/// Entity that can be rebuilt from a record
pub trait FromRecord: Sized {
    /// Record payload type
    type Body: RecordBody;

    /// What the entity needs from its owner to be rebuilt
    type Context;

    /// Rebuild from a decoded record
    ///
    /// # Errors
    /// Any [`ValidationError`] raised while reading the fields
    fn from_record(
        record: Record<Self::Body>,
        context: &Self::Context,
    ) -> Result<Self, ValidationError>;
}

/// Identity and variant read from a record header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordHead {
    /// Validated identifier
    pub id: EntityId,
    /// Record degraded to its unknown variant
    pub unknown: bool,
}

/// Read the id, then apply the version gate
///
/// # Errors
/// - [`ValidationError::Missing`] / [`ValidationError::Empty`] for `id`
/// - [`ValidationError::UnsupportedVersion`] below `MINIMUM_VERSION`
pub fn read_header<B: RecordBody>(
    kind: &'static str,
    record: &Record<B>,
) -> Result<RecordHead, ValidationError> {
    let id = Fields::new(kind, None).required_str("id", record.id())?;
    let fields = Fields::new(kind, Some(id));

    if !record.is_supported_version() {
        return Err(fields.unsupported_version(record.version()));
    }

    let unknown = record.is_unknown();
    if unknown {
        tracing::warn!(
            "decoded {} {} with unrecognized clazz {:?}",
            kind,
            id,
            record.clazz()
        );
    }

    Ok(RecordHead {
        id: EntityId::from(id),
        unknown,
    })
}

/// Reads and writes persistable entities as JSON
///
/// `C` is the context handed to [`FromRecord::from_record`].
#[derive(Debug, Clone, Default)]
pub struct PersistenceManager<C> {
    context: C,
}

impl<C> PersistenceManager<C> {
    /// Create manager with restore context
    #[inline]
    #[must_use]
    pub fn new(context: C) -> Self {
        Self { context }
    }

    /// Restore context
    #[inline]
    #[must_use]
    pub fn context(&self) -> &C {
        &self.context
    }

    /// Encode entity into a string
    ///
    /// # Errors
    /// [`TransformationError::Validation`] if the entity cannot be encoded
    pub fn write<P: Persistable>(&self, entity: &P) -> Result<String, TransformationError> {
        let record = entity.to_record()?;
        Ok(json::to_string(&record)?)
    }

    /// Encode entity into a sink
    ///
    /// Nothing is written when validation fails.
    ///
    /// # Errors
    /// [`TransformationError::Validation`] or [`TransformationError::Processing`]
    pub fn write_to<P, W>(&self, entity: &P, writer: W) -> Result<(), TransformationError>
    where
        P: Persistable,
        W: Write,
    {
        let record = entity.to_record()?;
        Ok(json::to_writer(writer, &record)?)
    }

    /// Decode entity from a string
    ///
    /// # Errors
    /// [`TransformationError::Processing`] on malformed payload,
    /// [`TransformationError::Validation`] on invalid fields
    pub fn read<T>(&self, content: &str) -> Result<T, TransformationError>
    where
        T: FromRecord<Context = C>,
    {
        let record: Record<T::Body> = json::from_str(content)?;
        Ok(T::from_record(record, &self.context)?)
    }

    /// Decode entity from a source
    ///
    /// # Errors
    /// [`TransformationError::Processing`] on malformed payload or read
    /// failure, [`TransformationError::Validation`] on invalid fields
    pub fn read_from<T, R>(&self, reader: R) -> Result<T, TransformationError>
    where
        T: FromRecord<Context = C>,
        R: Read,
    {
        let record: Record<T::Body> = json::from_reader(reader)?;
        Ok(T::from_record(record, &self.context)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xform_record::{RecordHeader, RequestInfoBody};

    fn record(id: Option<&str>, version: i32) -> Record<RequestInfoBody> {
        Record::new(RequestInfoBody {
            header: RecordHeader {
                id: id.map(str::to_owned),
                version,
            },
            ..RequestInfoBody::default()
        })
    }

    #[test]
    fn id_is_checked_before_version() {
        let err = read_header("request info", &record(None, 0)).unwrap_err();
        assert_eq!(err.to_string(), "missing request info id");

        let err = read_header("request info", &record(Some(""), 0)).unwrap_err();
        assert_eq!(err.to_string(), "empty request info id");
    }

    #[test]
    fn version_gate_names_type_and_id() {
        let err = read_header("request info", &record(Some("r-1"), 0)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "unsupported request info version: 0 for object: r-1"
        );
    }

    #[test]
    fn future_version_passes() {
        let head = read_header("request info", &record(Some("r-1"), 1_001)).unwrap();
        assert_eq!(head.id.as_str(), "r-1");
        assert!(!head.unknown);
    }
}
