//! Versioned record envelope
//!
//! Every persisted entity is written as one flat object: a `clazz`
//! discriminator, the common [`RecordHeader`] (`id`, `version`), then the
//! entity's own fields. Decoding peeks the discriminator first; a missing or
//! unrecognized tag does not fail, it yields [`Record::Unknown`] carrying
//! whatever known fields could still be read.

use serde::de::value::{MapAccessDeserializer, StringDeserializer};
use serde::de::{DeserializeOwned, DeserializeSeed, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt::{self, Debug};
use std::marker::PhantomData;

/// Entity-specific payload of a [`Record`]
///
/// # Contract
/// - `CLAZZ` is the wire discriminator and never changes once published
/// - `CURRENT_VERSION` is what this code writes
/// - `MINIMUM_VERSION` is the oldest version this code can still read
/// - unknown fields must be ignored on decode (no `deny_unknown_fields`)
/// - the header is skipped by the body's own serde impls; the envelope
///   reads and writes `id` and `version`
pub trait RecordBody: Serialize + DeserializeOwned + Debug + Clone + PartialEq {
    /// Wire discriminator written in the `clazz` field
    const CLAZZ: &'static str;

    /// Version written by the current code
    const CURRENT_VERSION: i32;

    /// Oldest version the current code can read
    const MINIMUM_VERSION: i32;

    /// Common identity/version header
    fn header(&self) -> &RecordHeader;

    /// Mutable access to the header
    fn header_mut(&mut self) -> &mut RecordHeader;

    /// Whether a decoded discriminator designates this body type
    #[inline]
    fn accepts(clazz: &str) -> bool {
        clazz == Self::CLAZZ
    }
}

/// Identity and version shared by all records
///
/// A missing `version` decodes as `0`, which is older than any supported
/// version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordHeader {
    /// Opaque entity identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Record layout version
    #[serde(default)]
    pub version: i32,
}

impl RecordHeader {
    /// Create header with explicit id and version
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>, version: i32) -> Self {
        Self {
            id: Some(id.into()),
            version,
        }
    }

    /// Create header stamped with the current version of `B`
    #[inline]
    #[must_use]
    pub fn current<B: RecordBody>(id: impl Into<String>) -> Self {
        Self::new(id, B::CURRENT_VERSION)
    }
}

/// A decoded (or to-be-encoded) record
///
/// `Unknown` keeps the original discriminator (if any) and the fields that
/// could be read. Owners built from it must report unknown content and
/// refuse to re-encode.
#[derive(Debug, Clone, PartialEq)]
pub enum Record<B> {
    /// Discriminator recognized
    Known(B),

    /// Discriminator absent or not recognized
    Unknown {
        /// Discriminator as found on the wire
        clazz: Option<String>,
        /// Fields read with the current layout
        body: B,
    },
}

impl<B: RecordBody> Record<B> {
    /// Wrap a body as a known record
    #[inline]
    #[must_use]
    pub fn new(body: B) -> Self {
        Self::Known(body)
    }

    /// Classify a body by its decoded discriminator
    #[must_use]
    pub fn from_parts(clazz: Option<String>, body: B) -> Self {
        match clazz {
            Some(tag) if B::accepts(&tag) => Self::Known(body),
            clazz => Self::Unknown { clazz, body },
        }
    }

    /// Body regardless of variant
    #[inline]
    #[must_use]
    pub fn body(&self) -> &B {
        match self {
            Self::Known(body) | Self::Unknown { body, .. } => body,
        }
    }

    /// Consume into the body
    #[inline]
    #[must_use]
    pub fn into_body(self) -> B {
        match self {
            Self::Known(body) | Self::Unknown { body, .. } => body,
        }
    }

    /// Whether the discriminator was not recognized
    #[inline]
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown { .. })
    }

    /// Discriminator that will be written (or was read)
    #[must_use]
    pub fn clazz(&self) -> Option<&str> {
        match self {
            Self::Known(_) => Some(B::CLAZZ),
            Self::Unknown { clazz, .. } => clazz.as_deref(),
        }
    }

    /// Identifier from the header
    #[inline]
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.body().header().id.as_deref()
    }

    /// Version from the header
    #[inline]
    #[must_use]
    pub fn version(&self) -> i32 {
        self.body().header().version
    }

    /// Whether the version can be read by this code
    ///
    /// Versions above `CURRENT_VERSION` are accepted: newer fields are
    /// ignored and known fields are read normally.
    #[inline]
    #[must_use]
    pub fn is_supported_version(&self) -> bool {
        self.version() >= B::MINIMUM_VERSION
    }
}

#[derive(Serialize)]
struct TaggedRef<'a, B> {
    #[serde(skip_serializing_if = "Option::is_none")]
    clazz: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    version: i32,
    #[serde(flatten)]
    body: &'a B,
}

impl<B: RecordBody> Serialize for Record<B> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        TaggedRef {
            clazz: self.clazz(),
            id: self.id(),
            version: self.version(),
            body: self.body(),
        }
        .serialize(serializer)
    }
}

/// Map access that lifts the envelope keys out of the entry stream
///
/// The body sees every other entry straight from the underlying
/// deserializer, so values are never buffered.
struct Envelope<A> {
    entries: A,
    clazz: Option<String>,
    header: RecordHeader,
}

impl<'de, A: MapAccess<'de>> MapAccess<'de> for Envelope<A> {
    type Error = A::Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, A::Error>
    where
        K: DeserializeSeed<'de>,
    {
        while let Some(key) = self.entries.next_key::<String>()? {
            match key.as_str() {
                // a tag of any other JSON type is treated as unrecognized
                "clazz" => {
                    self.clazz = match self.entries.next_value::<Value>()? {
                        Value::String(tag) => Some(tag),
                        _ => None,
                    };
                }
                "id" => self.header.id = self.entries.next_value()?,
                "version" => self.header.version = self.entries.next_value()?,
                _ => return seed.deserialize(StringDeserializer::new(key)).map(Some),
            }
        }
        Ok(None)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, A::Error>
    where
        V: DeserializeSeed<'de>,
    {
        self.entries.next_value_seed(seed)
    }
}

struct RecordVisitor<B>(PhantomData<B>);

impl<'de, B: RecordBody> Visitor<'de> for RecordVisitor<B> {
    type Value = Record<B>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "a {} record object", B::CLAZZ)
    }

    fn visit_map<A>(self, entries: A) -> Result<Record<B>, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut envelope = Envelope {
            entries,
            clazz: None,
            header: RecordHeader::default(),
        };
        let mut body = B::deserialize(MapAccessDeserializer::new(&mut envelope))?;
        *body.header_mut() = envelope.header;
        Ok(Record::from_parts(envelope.clazz, body))
    }
}

impl<'de, B: RecordBody> Deserialize<'de> for Record<B> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(RecordVisitor(PhantomData))
    }
}
