//! xmlrecords - Streaming XML record extraction
//!
//! Rebuilds the subtree under each configured "record tag" into a nested
//! value, one record at a time, without holding the document in memory.
//!
//! Entry points:
//! A: Buffered (parse_records) - all records grouped by tag
//! B: Streaming (stream_*) - feed chunks, take records as they complete
//!
//! The same machinery is available to Rust callers through
//! [`RecordParser`] and [`RecordStream`].

use rustler::{Binary, Encoder, Env, NifResult, ResourceArc, Term};

pub mod config;
pub mod error;
pub mod reader;
pub mod record;
pub mod sax;
pub mod strategy;

mod resource;
mod term;

pub use config::{RecordConfig, DEFAULT_CHUNK_SIZE};
pub use error::{RecordError, TokenizeError};
pub use reader::ChunkReader;
pub use record::{Record, RecordBuilder, RecordValue, Step};
pub use sax::{SaxCollector, SaxEvent};
pub use strategy::{RecordParser, RecordSet, RecordSink, RecordStream, Records};

use resource::{RecordStreamRef, RecordStreamResource};
use term::{error_to_term, ok_tuple, record_set_to_term, records_to_term};

// ============================================================================
// Allocator Configuration
// ============================================================================

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

// ============================================================================
// Strategy A: Buffered
// ============================================================================

/// Parse a complete document, returning `{:ok, %{tag => [record]}}`
#[rustler::nif(schedule = "DirtyCpu")]
fn parse_records<'a>(env: Env<'a>, input: Binary<'a>, tags: Vec<String>) -> NifResult<Term<'a>> {
    let result =
        RecordParser::with_tags(tags).and_then(|parser| parser.parse_bytes(input.as_slice()));
    match result {
        Ok(set) => Ok(ok_tuple(env, record_set_to_term(env, &set)?)),
        Err(e) => Ok(error_to_term(env, &e)),
    }
}

/// Parse a file chunk by chunk, returning `{:ok, %{tag => [record]}}`
#[rustler::nif(schedule = "DirtyIo")]
fn parse_records_file<'a>(env: Env<'a>, path: String, tags: Vec<String>) -> NifResult<Term<'a>> {
    let result = RecordParser::with_tags(tags).and_then(|parser| parser.parse_path(&path));
    match result {
        Ok(set) => Ok(ok_tuple(env, record_set_to_term(env, &set)?)),
        Err(e) => Ok(error_to_term(env, &e)),
    }
}

// ============================================================================
// Strategy B: Streaming
// ============================================================================

/// Create a streaming record parser, returning `{:ok, ref}`
#[rustler::nif]
fn stream_new<'a>(env: Env<'a>, tags: Vec<String>) -> Term<'a> {
    match RecordConfig::new(tags) {
        Ok(config) => {
            let parser: RecordStreamRef = ResourceArc::new(RecordStreamResource::new(&config));
            ok_tuple(env, parser.encode(env))
        }
        Err(e) => error_to_term(env, &e),
    }
}

/// Feed a chunk, returning `{:ok, {available_records, buffered_bytes}}`
#[rustler::nif]
fn stream_feed<'a>(
    env: Env<'a>,
    parser: RecordStreamRef,
    chunk: Binary<'a>,
) -> NifResult<Term<'a>> {
    let outcome = parser
        .with_stream(|stream| {
            stream
                .feed(chunk.as_slice())
                .map(|()| (stream.available_records(), stream.buffer_size()))
        })
        .map_err(poisoned)?;

    Ok(match outcome {
        Ok(status) => ok_tuple(env, status.encode(env)),
        Err(e) => error_to_term(env, &e),
    })
}

/// Take up to `max` completed records as `[{tag, record}]`
#[rustler::nif]
fn stream_take<'a>(env: Env<'a>, parser: RecordStreamRef, max: usize) -> NifResult<Term<'a>> {
    let records = parser
        .with_stream(|stream| stream.take_records(max))
        .map_err(poisoned)?;
    records_to_term(env, &records)
}

/// Signal end of input, returning `{:ok, remaining_records}`
#[rustler::nif]
fn stream_finish<'a>(env: Env<'a>, parser: RecordStreamRef) -> NifResult<Term<'a>> {
    let outcome = parser
        .with_stream(|stream| {
            stream.finish().map(|()| stream.take_records(usize::MAX))
        })
        .map_err(poisoned)?;

    match outcome {
        Ok(records) => Ok(ok_tuple(env, records_to_term(env, &records)?)),
        Err(e) => Ok(error_to_term(env, &e)),
    }
}

/// Get streaming parser status:
/// `{available_records, buffered_bytes, in_record, depth}`
#[rustler::nif]
fn stream_status(parser: RecordStreamRef) -> NifResult<(usize, usize, bool, usize)> {
    parser
        .with_stream(|stream| {
            (
                stream.available_records(),
                stream.buffer_size(),
                stream.in_record(),
                stream.depth(),
            )
        })
        .map_err(poisoned)
}

fn poisoned(reason: &'static str) -> rustler::Error {
    rustler::Error::Term(Box::new(reason))
}

// ============================================================================
// NIF Initialization
// ============================================================================

rustler::init!("Elixir.XmlRecords.Native");
