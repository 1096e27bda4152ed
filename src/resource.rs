//! ResourceArc Wrappers
//!
//! Persistent state for streaming record parsers.

use std::sync::Mutex;

use rustler::ResourceArc;

use crate::config::RecordConfig;
use crate::strategy::RecordStream;

/// Wrapper for RecordStream that can be stored in a ResourceArc
pub struct RecordStreamResource {
    pub inner: Mutex<RecordStream>,
}

impl RecordStreamResource {
    pub fn new(config: &RecordConfig) -> Self {
        RecordStreamResource {
            inner: Mutex::new(RecordStream::new(config)),
        }
    }

    /// Run `f` with exclusive access to the stream.
    ///
    /// # Errors
    ///
    /// Returns `"mutex_poisoned"` if a previous call panicked while holding
    /// the lock.
    pub fn with_stream<F, R>(&self, f: F) -> Result<R, &'static str>
    where
        F: FnOnce(&mut RecordStream) -> R,
    {
        let mut guard = self.inner.lock().map_err(|_| "mutex_poisoned")?;
        Ok(f(&mut guard))
    }
}

#[rustler::resource_impl]
impl rustler::Resource for RecordStreamResource {}

/// Type alias for the ResourceArc
pub type RecordStreamRef = ResourceArc<RecordStreamResource>;
