//! Field-level validation helpers shared by every persistable entity

use crate::error::ValidationError;
use xform_status::WireName;

/// Validation context: which entity type and which object a field belongs to
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    kind: &'static str,
    id: Option<&'a str>,
}

impl<'a> Fields<'a> {
    /// Context for `kind`, naming `id` in errors when known
    #[inline]
    #[must_use]
    pub const fn new(kind: &'static str, id: Option<&'a str>) -> Self {
        Self { kind, id }
    }

    /// Same kind, now with a known id
    #[inline]
    #[must_use]
    pub const fn with_id<'b>(self, id: &'b str) -> Fields<'b> {
        Fields {
            kind: self.kind,
            id: Some(id),
        }
    }

    fn owned_id(&self) -> Option<String> {
        self.id.map(str::to_owned)
    }

    /// Missing-field error
    #[must_use]
    pub fn missing(&self, field: &'static str) -> ValidationError {
        ValidationError::Missing {
            kind: self.kind,
            field,
            id: self.owned_id(),
        }
    }

    /// Empty-field error
    #[must_use]
    pub fn empty(&self, field: &'static str) -> ValidationError {
        ValidationError::Empty {
            kind: self.kind,
            field,
            id: self.owned_id(),
        }
    }

    /// Unknown-content error
    #[must_use]
    pub fn unknown_content(&self) -> ValidationError {
        ValidationError::UnknownContent {
            kind: self.kind,
            id: self.owned_id(),
        }
    }

    /// Unsupported-version error
    #[must_use]
    pub fn unsupported_version(&self, version: i32) -> ValidationError {
        ValidationError::UnsupportedVersion {
            kind: self.kind,
            version,
            id: self.owned_id(),
        }
    }

    /// Value must be present
    ///
    /// # Errors
    /// [`ValidationError::Missing`] when `value` is `None`
    pub fn required<T>(&self, field: &'static str, value: Option<T>) -> Result<T, ValidationError> {
        value.ok_or_else(|| self.missing(field))
    }

    /// String must be present and non-empty
    ///
    /// # Errors
    /// [`ValidationError::Missing`] or [`ValidationError::Empty`]
    pub fn required_str<'v>(
        &self,
        field: &'static str,
        value: Option<&'v str>,
    ) -> Result<&'v str, ValidationError> {
        match value {
            None => Err(self.missing(field)),
            Some("") => Err(self.empty(field)),
            Some(v) => Ok(v),
        }
    }

    /// Non-empty string converted through `convert`
    ///
    /// # Errors
    /// [`ValidationError::Missing`], [`ValidationError::Empty`], or
    /// [`ValidationError::Invalid`] carrying the conversion error
    pub fn convert_str<T, E, F>(
        &self,
        field: &'static str,
        value: Option<&str>,
        convert: F,
    ) -> Result<T, ValidationError>
    where
        F: FnOnce(&str) -> Result<T, E>,
        E: std::error::Error + Send + Sync + 'static,
    {
        let raw = self.required_str(field, value)?;
        convert(raw).map_err(|source| ValidationError::Invalid {
            kind: self.kind,
            field,
            id: self.owned_id(),
            source: Box::new(source),
        })
    }

    /// Required enum; unrecognized names degrade to the sentinel
    ///
    /// # Errors
    /// [`ValidationError::Missing`] or [`ValidationError::Empty`]
    pub fn required_enum<E: WireName>(
        &self,
        field: &'static str,
        value: Option<&str>,
    ) -> Result<E, ValidationError> {
        self.required_str(field, value).map(E::parse_lenient)
    }

    /// Optional enum; unrecognized names degrade to the sentinel
    #[must_use]
    pub fn optional_enum<E: WireName>(value: Option<&str>) -> Option<E> {
        value.map(E::parse_lenient)
    }

    /// Canonical name of an enum about to be written
    ///
    /// # Errors
    /// [`ValidationError::UnknownValue`] when `value` is the sentinel
    pub fn enum_name<E: WireName>(
        &self,
        field: &'static str,
        value: E,
    ) -> Result<String, ValidationError> {
        if value.is_unknown() {
            return Err(ValidationError::UnknownValue {
                kind: self.kind,
                field,
                id: self.owned_id(),
            });
        }
        Ok(value.name().to_owned())
    }
}
