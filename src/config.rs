//! Parser Configuration
//!
//! The caller picks which element names delimit output records and how
//! large the chunks pulled from the byte source are.

use indexmap::IndexSet;

use crate::error::RecordError;

/// Chunk size used when reading from a byte source
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Validated record parser configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordConfig {
    tags: IndexSet<String>,
    chunk_size: usize,
}

impl RecordConfig {
    /// Create a configuration for the given record tags
    ///
    /// Order is kept, duplicates collapse to their first occurrence.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Config`] if no tags are given or a tag name
    /// is empty.
    pub fn new<I, S>(tags: I) -> Result<Self, RecordError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = IndexSet::new();
        for tag in tags {
            let tag = tag.into();
            if tag.is_empty() {
                return Err(RecordError::Config("record tag names must not be empty".into()));
            }
            set.insert(tag);
        }

        if set.is_empty() {
            return Err(RecordError::Config("at least one record tag is required".into()));
        }

        Ok(RecordConfig {
            tags: set,
            chunk_size: DEFAULT_CHUNK_SIZE,
        })
    }

    /// Override the read chunk size
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Config`] for a zero chunk size.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Result<Self, RecordError> {
        if chunk_size == 0 {
            return Err(RecordError::Config("chunk size must be greater than zero".into()));
        }
        self.chunk_size = chunk_size;
        Ok(self)
    }

    /// Configured record tags, in configuration order
    pub fn tags(&self) -> &IndexSet<String> {
        &self.tags
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Check if `name` is a record tag
    #[inline]
    pub fn is_record_tag(&self, name: &str) -> bool {
        self.tags.contains(name)
    }
}
