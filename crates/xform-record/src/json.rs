//! JSON encode/decode primitives
//!
//! Buffer and stream variants share one serializer configuration, so the
//! bytes written by [`to_vec`] and [`to_writer`] are identical for the same
//! value.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{Read, Write};

/// Errors raised by the encode/decode machinery itself
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Payload is not valid JSON or does not fit the record shape
    #[error("malformed record: {0}")]
    Malformed(#[source] serde_json::Error),

    /// Underlying reader or writer failed
    #[error("record i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            Self::Io(std::io::Error::from(err))
        } else {
            Self::Malformed(err)
        }
    }
}

/// Encode into an owned string
///
/// # Errors
/// Returns [`CodecError::Malformed`] if the value cannot be represented
pub fn to_string<T>(value: &T) -> Result<String, CodecError>
where
    T: Serialize + ?Sized,
{
    Ok(serde_json::to_string(value)?)
}

/// Encode into an owned byte buffer
///
/// # Errors
/// Returns [`CodecError::Malformed`] if the value cannot be represented
pub fn to_vec<T>(value: &T) -> Result<Vec<u8>, CodecError>
where
    T: Serialize + ?Sized,
{
    Ok(serde_json::to_vec(value)?)
}

/// Encode into a streaming sink
///
/// # Errors
/// Returns [`CodecError::Io`] if the sink fails
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<(), CodecError>
where
    W: Write,
    T: Serialize + ?Sized,
{
    Ok(serde_json::to_writer(writer, value)?)
}

/// Decode from a string
///
/// # Errors
/// Returns [`CodecError::Malformed`] on invalid payload
pub fn from_str<T>(content: &str) -> Result<T, CodecError>
where
    T: DeserializeOwned,
{
    Ok(serde_json::from_str(content)?)
}

/// Decode from a byte buffer
///
/// # Errors
/// Returns [`CodecError::Malformed`] on invalid payload
pub fn from_slice<T>(content: &[u8]) -> Result<T, CodecError>
where
    T: DeserializeOwned,
{
    Ok(serde_json::from_slice(content)?)
}

/// Decode from a streaming source
///
/// # Errors
/// Returns [`CodecError::Io`] if the source fails, [`CodecError::Malformed`]
/// on invalid payload
pub fn from_reader<R, T>(reader: R) -> Result<T, CodecError>
where
    R: Read,
    T: DeserializeOwned,
{
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    struct BrokenReader;

    impl Read for BrokenReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
        }
    }

    #[test]
    fn syntax_error_is_malformed() {
        let err = from_str::<serde_json::Value>("{\"id\":").unwrap_err();
        assert!(matches!(err, CodecError::Malformed(_)));
    }

    #[test]
    fn reader_failure_is_io() {
        let err = from_reader::<_, serde_json::Value>(BrokenReader).unwrap_err();
        assert!(matches!(err, CodecError::Io(_)));
    }

    #[test]
    fn buffer_and_stream_match() {
        let value = serde_json::json!({"clazz": "request", "id": "a", "version": 1});
        let mut sink = Vec::new();
        to_writer(&mut sink, &value).unwrap();
        assert_eq!(sink, to_vec(&value).unwrap());
        assert_eq!(String::from_utf8(sink).unwrap(), to_string(&value).unwrap());
    }
}
