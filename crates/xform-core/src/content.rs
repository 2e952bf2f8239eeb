//! Content streams handed to a sub-task on success

use std::fs::File;
use std::io::{self, BufReader, Cursor, Read};

/// Readable content with an explicit close step
///
/// `close` runs after the stream has been drained. Its failure is reported
/// but never undoes a completed transition.
pub trait ContentStream: Read {
    /// Release the underlying resource
    ///
    /// # Errors
    /// Whatever the resource reports on release
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl ContentStream for &[u8] {}

impl<T: AsRef<[u8]>> ContentStream for Cursor<T> {}

impl ContentStream for File {}

impl<R: Read> ContentStream for BufReader<R> {}

impl<S: ContentStream + ?Sized> ContentStream for Box<S> {
    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

impl<S: ContentStream + ?Sized> ContentStream for &mut S {
    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

/// Read everything, then attempt to close
///
/// A read failure propagates; a close failure is logged and ignored.
///
/// # Errors
/// The first read error
pub fn drain<S: ContentStream>(mut content: S, owner: &str) -> io::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    let read = content.read_to_end(&mut bytes);

    if let Err(err) = content.close() {
        tracing::debug!("failed to close content stream for {}: {}", owner, err);
    }

    read.map(|_| bytes)
}
