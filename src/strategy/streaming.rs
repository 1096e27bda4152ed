//! Streaming Record Parser
//!
//! Push-style parser: feed chunks as they arrive, take completed records
//! whenever convenient. Memory stays bounded by one chunk, the unconsumed
//! tail and the record in progress.

use std::collections::VecDeque;

use crate::config::RecordConfig;
use crate::error::{RecordError, TokenizeError};
use crate::record::{Record, RecordBuilder, Step};
use crate::sax::SaxCollector;

/// Stateful streaming record parser
pub struct RecordStream {
    /// Tokenizer with its own input buffer and event queue
    collector: SaxCollector,
    /// Tree reconstruction state
    builder: RecordBuilder,
    /// Completed records ready to be consumed
    records: VecDeque<Record>,
    /// First tokenizer error, returned by every later call
    error: Option<TokenizeError>,
    finished: bool,
}

impl RecordStream {
    /// Create a new streaming parser
    pub fn new(config: &RecordConfig) -> Self {
        RecordStream {
            collector: SaxCollector::new(),
            builder: RecordBuilder::new(config),
            records: VecDeque::with_capacity(16),
            error: None,
            finished: false,
        }
    }

    /// Feed a chunk of data to the parser
    ///
    /// Every event the chunk produces is run through the builder before
    /// this returns. Records completed before an error stay available.
    ///
    /// # Errors
    ///
    /// Returns the tokenizer error (now or from an earlier call), or
    /// [`RecordError::Finished`] after [`finish`](Self::finish).
    pub fn feed(&mut self, chunk: &[u8]) -> Result<(), RecordError> {
        if let Some(err) = &self.error {
            return Err(err.clone().into());
        }
        if self.finished {
            return Err(RecordError::Finished);
        }

        self.collector.feed(chunk);
        self.drain()
    }

    /// Signal end of input
    ///
    /// An unterminated record is dropped. Calling this twice is harmless.
    pub fn finish(&mut self) -> Result<(), RecordError> {
        if let Some(err) = &self.error {
            return Err(err.clone().into());
        }
        if self.finished {
            return Ok(());
        }

        self.collector.finish();
        self.drain()
    }

    /// Run queued events through the builder, in order
    fn drain(&mut self) -> Result<(), RecordError> {
        for event in self.collector.take_events() {
            match self.builder.handle(event) {
                Step::Continue => {}
                Step::Record(record) => self.records.push_back(record),
                Step::Failed(err) => {
                    self.error = Some(err.clone());
                    return Err(err.into());
                }
                Step::Finished => self.finished = true,
            }
        }
        Ok(())
    }

    /// Take the oldest completed record
    pub fn next_record(&mut self) -> Option<Record> {
        self.records.pop_front()
    }

    /// Take up to `max` completed records, oldest first
    pub fn take_records(&mut self, max: usize) -> Vec<Record> {
        let count = max.min(self.records.len());
        self.records.drain(..count).collect()
    }

    /// Get number of available records
    pub fn available_records(&self) -> usize {
        self.records.len()
    }

    /// Get number of buffered, not yet tokenized bytes
    pub fn buffer_size(&self) -> usize {
        self.collector.buffer_size()
    }

    /// Check if a record is being built
    pub fn in_record(&self) -> bool {
        self.builder.in_record()
    }

    /// Number of open elements between the record root and the innermost one
    pub fn depth(&self) -> usize {
        self.builder.depth()
    }
}
