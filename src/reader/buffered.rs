//! Chunked Byte Reader
//!
//! Pulls a document from any source implementing `Read`, one bounded chunk
//! at a time.

use std::io::{ErrorKind, Read};

use crate::config::DEFAULT_CHUNK_SIZE;

/// Reader yielding fixed-capacity chunks
pub struct ChunkReader<R: Read> {
    reader: R,
    buffer: Vec<u8>,
    eof: bool,
}

impl<R: Read> ChunkReader<R> {
    /// Create a new chunk reader
    pub fn new(reader: R) -> Self {
        Self::with_capacity(reader, DEFAULT_CHUNK_SIZE)
    }

    /// Create a new chunk reader with the given chunk size
    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        ChunkReader {
            reader,
            buffer: vec![0u8; capacity.max(1)],
            eof: false,
        }
    }

    /// Read the next chunk
    ///
    /// Returns `Ok(None)` once the source is exhausted. Interrupted reads
    /// are retried.
    pub fn next_chunk(&mut self) -> std::io::Result<Option<&[u8]>> {
        if self.eof {
            return Ok(None);
        }

        loop {
            match self.reader.read(&mut self.buffer) {
                Ok(0) => {
                    self.eof = true;
                    return Ok(None);
                }
                Ok(read) => return Ok(Some(&self.buffer[..read])),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}
