//! Canonical wire names for enum-like fields
//!
//! Records carry enums as plain strings. Decoding never fails on an
//! unrecognized name: it maps to the type's `UNKNOWN` sentinel so that values
//! introduced by newer writers degrade instead of breaking older readers.

/// Enum with a stable canonical name and an "unknown" sentinel
pub trait WireName: Copy + Eq + 'static {
    /// Sentinel for names this code does not recognize
    const UNKNOWN: Self;

    /// Every variant, sentinel included
    const VARIANTS: &'static [Self];

    /// Canonical name written on the wire
    fn name(self) -> &'static str;

    /// Exact lookup by canonical name
    #[must_use]
    fn from_name(name: &str) -> Option<Self> {
        Self::VARIANTS.iter().copied().find(|v| v.name() == name)
    }

    /// Lookup that falls back to [`WireName::UNKNOWN`]
    #[must_use]
    fn parse_lenient(name: &str) -> Self {
        Self::from_name(name).unwrap_or(Self::UNKNOWN)
    }

    /// Whether this is the sentinel
    #[inline]
    #[must_use]
    fn is_unknown(self) -> bool {
        self == Self::UNKNOWN
    }
}

/// Reason code attached to a failed sub-task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Generation of the derived artifact failed
    TransformationFailure,
    /// Reason not recognized by this code
    Unknown,
}

impl WireName for ErrorCode {
    const UNKNOWN: Self = Self::Unknown;
    const VARIANTS: &'static [Self] = &[Self::TransformationFailure, Self::Unknown];

    fn name(self) -> &'static str {
        match self {
            Self::TransformationFailure => "TRANSFORMATION_FAILURE",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
