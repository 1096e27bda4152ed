//! Elixir Term Conversion Utilities
//!
//! Converts records and errors to Elixir terms.

use rustler::{Encoder, Env, NewBinary, NifResult, Term};

use crate::error::RecordError;
use crate::record::{Record, RecordValue};
use crate::strategy::RecordSet;

// Pre-defined atoms for efficiency - created once at compile time
rustler::atoms! {
    ok,
    error,
}

/// Convert a folded value: text becomes a binary, a mapping an Elixir map
/// with binary keys
pub fn value_to_term<'a>(env: Env<'a>, value: &RecordValue) -> NifResult<Term<'a>> {
    match value {
        RecordValue::Text(s) => Ok(str_to_binary(env, s)),
        RecordValue::Map(map) => {
            let mut term = Term::map_new(env);
            for (key, child) in map {
                term = term.map_put(str_to_binary(env, key), value_to_term(env, child)?)?;
            }
            Ok(term)
        }
    }
}

/// Convert a record to `{tag, value}`
pub fn record_to_term<'a>(env: Env<'a>, record: &Record) -> NifResult<Term<'a>> {
    let tag = str_to_binary(env, &record.tag);
    let value = value_to_term(env, &record.value)?;
    Ok((tag, value).encode(env))
}

/// Convert records to a list of `{tag, value}` tuples - build in reverse order
pub fn records_to_term<'a>(env: Env<'a>, records: &[Record]) -> NifResult<Term<'a>> {
    let mut list = Term::list_new_empty(env);
    for record in records.iter().rev() {
        list = list.list_prepend(record_to_term(env, record)?);
    }
    Ok(list)
}

/// Convert a buffered result to `%{tag => [value]}`
pub fn record_set_to_term<'a>(env: Env<'a>, set: &RecordSet) -> NifResult<Term<'a>> {
    let mut map = Term::map_new(env);
    for (tag, values) in set.iter() {
        let mut list = Term::list_new_empty(env);
        for value in values.iter().rev() {
            list = list.list_prepend(value_to_term(env, value)?);
        }
        map = map.map_put(str_to_binary(env, tag), list)?;
    }
    Ok(map)
}

/// `{:ok, term}`
pub fn ok_tuple<'a>(env: Env<'a>, term: Term<'a>) -> Term<'a> {
    (ok(), term).encode(env)
}

/// `{:error, reason}` with the error message as a binary
pub fn error_to_term<'a>(env: Env<'a>, err: &RecordError) -> Term<'a> {
    (error(), str_to_binary(env, &err.to_string())).encode(env)
}

/// Convert a string to a binary term (more efficient than .encode())
#[inline]
fn str_to_binary<'a>(env: Env<'a>, s: &str) -> Term<'a> {
    let bytes = s.as_bytes();
    let mut binary = NewBinary::new(env, bytes.len());
    binary.as_mut_slice().copy_from_slice(bytes);
    binary.into()
}
