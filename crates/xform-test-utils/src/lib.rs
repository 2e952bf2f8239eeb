//! Testing utilities for the transformation workspace
//!
//! Shared fixtures, misbehaving content streams, and tracing setup.

#![allow(missing_docs)]

use chrono::{DateTime, TimeDelta, Utc};
use std::io::{self, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Once};
use xform_core::{ContentStream, TransformationManager};
use xform_inmemory::{InMemoryTransformation, InMemoryTransformationManager};
use xform_status::ManualClock;

pub const METACARD_LOCATION: &str = "http://localhost:8993/metacard/1234";
pub const CURRENT_LOCATION: &str = "http://localhost:8993/resource/1234";
pub const FINAL_LOCATION: &str = "http://localhost:8993/final/1234";

/// Instant every fixture clock starts at
pub fn epoch() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

/// Manager on a manual clock starting at [`epoch`]
pub fn setup_manager() -> (InMemoryTransformationManager, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(epoch()));
    let manager = InMemoryTransformationManager::with_clock(clock.clone());
    (manager, clock)
}

/// Transformation over the sample locations
pub fn create_sample(manager: &InMemoryTransformationManager) -> Arc<InMemoryTransformation> {
    manager
        .create_transform(CURRENT_LOCATION, FINAL_LOCATION, METACARD_LOCATION)
        .unwrap()
}

/// Advance `clock` by whole seconds
pub fn tick(clock: &ManualClock, seconds: i64) {
    clock.advance(TimeDelta::seconds(seconds));
}

/// Install a test-writer subscriber once per process
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Yields `prefix`, then fails every read
#[derive(Debug)]
pub struct FailingReader {
    prefix: io::Cursor<Vec<u8>>,
}

impl FailingReader {
    pub fn new(prefix: &[u8]) -> Self {
        Self {
            prefix: io::Cursor::new(prefix.to_vec()),
        }
    }
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.prefix.read(buf)? {
            0 => Err(io::Error::new(io::ErrorKind::ConnectionReset, "stream reset")),
            n => Ok(n),
        }
    }
}

impl ContentStream for FailingReader {}

/// Reads normally, fails on close, and records that close was attempted
#[derive(Debug)]
pub struct FailingCloseStream {
    content: io::Cursor<Vec<u8>>,
    closed: Arc<AtomicBool>,
}

impl FailingCloseStream {
    pub fn new(content: &[u8]) -> Self {
        Self {
            content: io::Cursor::new(content.to_vec()),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag set once close is attempted; readable after the stream moved
    pub fn close_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.closed)
    }
}

impl Read for FailingCloseStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.content.read(buf)
    }
}

impl ContentStream for FailingCloseStream {
    fn close(&mut self) -> io::Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Err(io::Error::new(io::ErrorKind::Other, "close failed"))
    }
}
