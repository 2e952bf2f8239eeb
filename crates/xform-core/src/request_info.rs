//! Request descriptor
//!
//! The three locations describing one inbound job. Equality is structural
//! over the locations; the identifier only matters for persistence.

use crate::error::ValidationError;
use crate::fields::Fields;
use crate::id::EntityId;
use crate::persist::{read_header, FromRecord, Persistable};
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use url::Url;
use xform_record::{RecordHeader, RequestInfoBody, RequestInfoRecord};

/// A validated location that keeps the text it was given
///
/// The text is what gets persisted, so a decoded record re-encodes to the
/// same bytes. Equality compares the text.
#[derive(Debug, Clone)]
pub struct Location {
    text: String,
    url: Url,
}

impl Location {
    /// Validate `text` as a URL
    ///
    /// # Errors
    /// [`url::ParseError`] if `text` is not an absolute URL
    pub fn parse(text: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            url: Url::parse(text)?,
            text: text.to_owned(),
        })
    }

    /// Text as given
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Parsed form
    #[inline]
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl From<Url> for Location {
    fn from(url: Url) -> Self {
        Self {
            text: url.to_string(),
            url,
        }
    }
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for Location {}

impl Hash for Location {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Anything that can describe a request's locations
pub trait RequestLocations {
    /// Where the source metadata lives
    fn metacard_location(&self) -> &Location;

    /// Where the resource currently is
    fn current_location(&self) -> &Location;

    /// Where the resource ends up
    fn final_location(&self) -> &Location;

    /// Downcast hook; `Some` only for [`RequestInfo`] itself
    fn as_request_info(&self) -> Option<&RequestInfo> {
        None
    }
}

/// Immutable request descriptor
#[derive(Debug, Clone)]
pub struct RequestInfo {
    id: EntityId,
    metacard_location: Location,
    current_location: Location,
    final_location: Location,
    has_unknowns: bool,
}

impl RequestInfo {
    /// Persistable type name
    pub const PERSISTABLE_TYPE: &'static str = "request info";

    /// Create descriptor with a fresh id
    #[must_use]
    pub fn new(
        metacard_location: Location,
        current_location: Location,
        final_location: Location,
    ) -> Self {
        Self {
            id: EntityId::generate(),
            metacard_location,
            current_location,
            final_location,
            has_unknowns: false,
        }
    }

    /// Create descriptor from location strings
    ///
    /// # Errors
    /// [`ValidationError::Empty`] or [`ValidationError::Invalid`] for the
    /// first location that is empty or not a URL
    pub fn parse(
        metacard_location: &str,
        current_location: &str,
        final_location: &str,
    ) -> Result<Self, ValidationError> {
        let fields = Fields::new(Self::PERSISTABLE_TYPE, None);
        Ok(Self::new(
            fields.convert_str("metacard_location", Some(metacard_location), Location::parse)?,
            fields.convert_str("current_location", Some(current_location), Location::parse)?,
            fields.convert_str("final_location", Some(final_location), Location::parse)?,
        ))
    }

    /// Borrow `info` when it already is a `RequestInfo`, copy it otherwise
    #[must_use]
    pub fn wrap(info: &dyn RequestLocations) -> Cow<'_, RequestInfo> {
        match info.as_request_info() {
            Some(own) => Cow::Borrowed(own),
            None => Cow::Owned(Self::new(
                info.metacard_location().clone(),
                info.current_location().clone(),
                info.final_location().clone(),
            )),
        }
    }

    /// Identifier used in the record
    #[inline]
    #[must_use]
    pub fn id(&self) -> &EntityId {
        &self.id
    }

    /// Whether this was decoded from content this code does not understand
    #[inline]
    #[must_use]
    pub fn has_unknowns(&self) -> bool {
        self.has_unknowns
    }
}

impl RequestLocations for RequestInfo {
    fn metacard_location(&self) -> &Location {
        &self.metacard_location
    }

    fn current_location(&self) -> &Location {
        &self.current_location
    }

    fn final_location(&self) -> &Location {
        &self.final_location
    }

    fn as_request_info(&self) -> Option<&RequestInfo> {
        Some(self)
    }
}

impl PartialEq for RequestInfo {
    fn eq(&self, other: &Self) -> bool {
        self.metacard_location == other.metacard_location
            && self.current_location == other.current_location
            && self.final_location == other.final_location
    }
}

impl Eq for RequestInfo {}

impl Hash for RequestInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.metacard_location.hash(state);
        self.current_location.hash(state);
        self.final_location.hash(state);
    }
}

impl Persistable for RequestInfo {
    type Body = RequestInfoBody;

    const PERSISTABLE_TYPE: &'static str = RequestInfo::PERSISTABLE_TYPE;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn has_unknowns(&self) -> bool {
        self.has_unknowns
    }

    fn to_record(&self) -> Result<RequestInfoRecord, ValidationError> {
        if self.has_unknowns {
            return Err(self.fields().unknown_content());
        }
        Ok(RequestInfoRecord::new(RequestInfoBody {
            header: RecordHeader::current::<RequestInfoBody>(self.id.as_str()),
            metacard_location: Some(self.metacard_location.as_str().to_owned()),
            current_location: Some(self.current_location.as_str().to_owned()),
            final_location: Some(self.final_location.as_str().to_owned()),
        }))
    }
}

impl FromRecord for RequestInfo {
    type Body = RequestInfoBody;
    type Context = ();

    fn from_record(record: RequestInfoRecord, _context: &()) -> Result<Self, ValidationError> {
        let head = read_header(Self::PERSISTABLE_TYPE, &record)?;
        let fields = Fields::new(Self::PERSISTABLE_TYPE, Some(head.id.as_str()));
        let body = record.body();

        let metacard_location = fields.convert_str(
            "metacard_location",
            body.metacard_location.as_deref(),
            Location::parse,
        )?;
        let current_location = fields.convert_str(
            "current_location",
            body.current_location.as_deref(),
            Location::parse,
        )?;
        let final_location =
            fields.convert_str("final_location", body.final_location.as_deref(), Location::parse)?;

        Ok(Self {
            id: head.id,
            metacard_location,
            current_location,
            final_location,
            has_unknowns: head.unknown,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xform_record::Record;

    struct External {
        metacard: Location,
        current: Location,
        target: Location,
    }

    impl RequestLocations for External {
        fn metacard_location(&self) -> &Location {
            &self.metacard
        }

        fn current_location(&self) -> &Location {
            &self.current
        }

        fn final_location(&self) -> &Location {
            &self.target
        }
    }

    fn sample() -> RequestInfo {
        RequestInfo::parse(
            "http://localhost/metacard",
            "http://localhost/current",
            "http://localhost/final",
        )
        .unwrap()
    }

    #[test]
    fn wrap_borrows_own_type() {
        let info = sample();
        assert!(matches!(RequestInfo::wrap(&info), Cow::Borrowed(_)));
    }

    #[test]
    fn wrap_copies_foreign_type() {
        let info = sample();
        let external = External {
            metacard: info.metacard_location().clone(),
            current: info.current_location().clone(),
            target: info.final_location().clone(),
        };

        let wrapped = RequestInfo::wrap(&external);
        assert!(matches!(wrapped, Cow::Owned(_)));
        assert_eq!(*wrapped, info);
    }

    #[test]
    fn equality_ignores_id() {
        let a = sample();
        let b = sample();
        assert_ne!(a.id(), b.id());
        assert_eq!(a, b);
    }

    #[test]
    fn parse_rejects_bad_location() {
        let err = RequestInfo::parse("not a url", "http://a", "http://b").unwrap_err();
        assert!(matches!(err, ValidationError::Invalid { field: "metacard_location", .. }));

        let err = RequestInfo::parse("http://a", "", "http://b").unwrap_err();
        assert!(matches!(err, ValidationError::Empty { field: "current_location", .. }));
    }

    #[test]
    fn round_trip() {
        let info = sample();
        let back = RequestInfo::from_record(info.to_record().unwrap(), &()).unwrap();
        assert_eq!(back, info);
        assert_eq!(back.id(), info.id());
        assert!(!back.has_unknowns());
    }

    #[test]
    fn unknown_variant_refuses_encode() {
        let body = sample().to_record().unwrap().into_body();
        let record = Record::from_parts(Some("request-v2".into()), body);

        let info = RequestInfo::from_record(record, &()).unwrap();
        assert!(info.has_unknowns());

        let err = info.to_record().unwrap_err();
        assert!(matches!(err, ValidationError::UnknownContent { .. }));
        assert!(err.to_string().starts_with("unknown request info"));
    }

    #[test]
    fn missing_location_on_decode() {
        let mut body = sample().to_record().unwrap().into_body();
        body.final_location = None;

        let err = RequestInfo::from_record(Record::new(body), &()).unwrap_err();
        assert!(matches!(err, ValidationError::Missing { field: "final_location", .. }));
    }

    #[test]
    fn locations_keep_their_text() {
        let mut body = sample().to_record().unwrap().into_body();
        body.metacard_location = Some("http://a".into());
        body.current_location = Some("HTTP://Host.Example/a%7eb".into());

        let info = RequestInfo::from_record(Record::new(body.clone()), &()).unwrap();
        assert_eq!(info.metacard_location().as_str(), "http://a");
        assert_eq!(info.metacard_location().url().as_str(), "http://a/");

        let written = info.to_record().unwrap().into_body();
        assert_eq!(written.metacard_location, body.metacard_location);
        assert_eq!(written.current_location, body.current_location);
    }

    #[test]
    fn location_from_url() {
        let url = Url::parse("http://localhost/x").unwrap();
        let location = Location::from(url.clone());
        assert_eq!(location.as_str(), "http://localhost/x");
        assert_eq!(location.url(), &url);
        assert_eq!(location.to_string(), "http://localhost/x");
    }
}
