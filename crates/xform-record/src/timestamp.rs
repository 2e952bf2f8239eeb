//! Epoch-seconds timestamps
//!
//! Instants travel as a JSON number of seconds since the Unix epoch with a
//! nine-digit fraction, e.g. `1577836800.123456789`. The number is written
//! and read as raw text so no precision is lost to `f64`. Readers also
//! accept whole seconds, exponent notation and RFC 3339 strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::value::RawValue;

const NANOS_PER_SECOND: i128 = 1_000_000_000;
const FRACTION_DIGITS: usize = 9;

/// Decimal epoch-seconds text for `instant`
#[must_use]
pub fn format(instant: &DateTime<Utc>) -> String {
    let total = i128::from(instant.timestamp()) * NANOS_PER_SECOND
        + i128::from(instant.timestamp_subsec_nanos());
    let sign = if total < 0 { "-" } else { "" };
    let total = total.abs();
    format!(
        "{sign}{}.{:0width$}",
        total / NANOS_PER_SECOND,
        total % NANOS_PER_SECOND,
        width = FRACTION_DIGITS
    )
}

/// Parse decimal epoch seconds
///
/// Digits past the ninth fractional place are truncated.
#[must_use]
pub fn parse_decimal(text: &str) -> Option<DateTime<Utc>> {
    if text.contains(['e', 'E']) {
        return from_float(text.parse().ok()?);
    }

    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
    if whole.is_empty()
        || !whole.bytes().all(|b| b.is_ascii_digit())
        || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }

    let seconds: i128 = whole.parse().ok()?;
    let nanos: i128 = fraction
        .chars()
        .chain(std::iter::repeat('0'))
        .take(FRACTION_DIGITS)
        .collect::<String>()
        .parse()
        .ok()?;

    let total = seconds.checked_mul(NANOS_PER_SECOND)?.checked_add(nanos)?;
    from_total_nanos(if negative { -total } else { total })
}

fn from_total_nanos(total: i128) -> Option<DateTime<Utc>> {
    let seconds = i64::try_from(total.div_euclid(NANOS_PER_SECOND)).ok()?;
    let nanos = u32::try_from(total.rem_euclid(NANOS_PER_SECOND)).ok()?;
    DateTime::from_timestamp(seconds, nanos)
}

#[allow(clippy::cast_possible_truncation)]
fn from_float(value: f64) -> Option<DateTime<Utc>> {
    if !value.is_finite() {
        return None;
    }
    let seconds = value.floor();
    let nanos = ((value - seconds) * 1e9).round() as i128;
    from_total_nanos(seconds as i128 * NANOS_PER_SECOND + nanos)
}

fn parse_raw(raw: &str) -> Result<DateTime<Utc>, String> {
    if raw.starts_with('"') {
        let text: String = serde_json::from_str(raw).map_err(|e| e.to_string())?;
        return DateTime::parse_from_rfc3339(&text)
            .map(|instant| instant.with_timezone(&Utc))
            .ok()
            .or_else(|| parse_decimal(&text))
            .ok_or_else(|| format!("invalid timestamp: {text}"));
    }
    parse_decimal(raw).ok_or_else(|| format!("invalid timestamp: {raw}"))
}

/// `serde(with)` adapter for optional timestamps
pub mod option {
    use super::{format, parse_raw, RawValue};
    use super::{DateTime, Deserialize, Deserializer, Serialize, Serializer, Utc};
    use serde::de::Error as _;
    use serde::ser::Error as _;

    /// Write as a decimal number
    ///
    /// # Errors
    /// Propagates serializer failures
    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(instant) => RawValue::from_string(format(instant))
                .map_err(S::Error::custom)?
                .serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    /// Read a decimal number, whole seconds or an RFC 3339 string
    ///
    /// # Errors
    /// Fails when the value is none of those
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Some(raw) = Option::<Box<RawValue>>::deserialize(deserializer)? else {
            return Ok(None);
        };
        parse_raw(raw.get()).map(Some).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(seconds: i64, nanos: u32) -> DateTime<Utc> {
        DateTime::from_timestamp(seconds, nanos).unwrap()
    }

    #[test]
    fn formats_nine_fraction_digits() {
        assert_eq!(format(&at(1_577_836_800, 123_456_789)), "1577836800.123456789");
        assert_eq!(format(&at(1_577_836_800, 0)), "1577836800.000000000");
        assert_eq!(format(&at(0, 5)), "0.000000005");
    }

    #[test]
    fn formats_before_epoch() {
        assert_eq!(format(&at(-1, 500_000_000)), "-0.500000000");
        assert_eq!(parse_decimal("-0.5"), Some(at(-1, 500_000_000)));
    }

    #[test]
    fn parses_exactly() {
        assert_eq!(
            parse_decimal("1577836800.123456789"),
            Some(at(1_577_836_800, 123_456_789))
        );
        assert_eq!(parse_decimal("1577836800"), Some(at(1_577_836_800, 0)));
        assert_eq!(parse_decimal("1577836800.1"), Some(at(1_577_836_800, 100_000_000)));
        assert_eq!(
            parse_decimal("1577836800.1234567891234"),
            Some(at(1_577_836_800, 123_456_789))
        );
    }

    #[test]
    fn parses_exponent() {
        assert_eq!(parse_decimal("1.5E9"), Some(at(1_500_000_000, 0)));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal(".5"), None);
        assert_eq!(parse_decimal("12a"), None);
        assert!(parse_raw("true").is_err());
        assert!(parse_raw("\"yesterday\"").is_err());
    }

    #[test]
    fn accepts_rfc3339_string() {
        assert_eq!(
            parse_raw("\"2020-01-01T00:00:00.5Z\""),
            Ok(at(1_577_836_800, 500_000_000))
        );
    }

    #[test]
    fn round_trips_text() {
        let instant = at(1_700_000_123, 987_654_321);
        assert_eq!(parse_decimal(&format(&instant)), Some(instant));
    }
}
