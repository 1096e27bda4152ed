//! XML Reader Module
//!
//! Byte acquisition for the pull-style parser:
//! - ChunkReader: bounded chunks from any `Read` source

pub mod buffered;

pub use buffered::ChunkReader;
