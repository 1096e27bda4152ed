//! Parsing Strategy Module
//!
//! One state machine, several ways to get records out of it:
//! - Buffered: collect everything into a [`RecordSet`] (`parse_all`)
//! - Callback: invoke a function per record in document order (`for_each`)
//! - Iterator: pull records one by one (`records`)
//! - Push stream: feed chunks yourself ([`RecordStream`])
//!
//! The first three read from a `Read` source through a
//! [`ChunkReader`](crate::reader::ChunkReader); all of them drive a
//! [`RecordStream`].

pub mod buffered;
pub mod streaming;

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::config::RecordConfig;
use crate::error::RecordError;
use crate::reader::ChunkReader;
use crate::record::Record;

pub use buffered::RecordSet;
pub use streaming::RecordStream;

/// Destination for completed records
pub trait RecordSink {
    fn accept(&mut self, record: Record);
}

/// Sink invoking a callback per record
struct CallbackSink<F>(F);

impl<F: FnMut(Record)> RecordSink for CallbackSink<F> {
    fn accept(&mut self, record: Record) {
        (self.0)(record)
    }
}

/// Pull-style record parser over a byte source
#[derive(Debug, Clone)]
pub struct RecordParser {
    config: RecordConfig,
}

impl RecordParser {
    pub fn new(config: RecordConfig) -> Self {
        RecordParser { config }
    }

    /// Shorthand for a parser with default chunk size
    pub fn with_tags<I, S>(tags: I) -> Result<Self, RecordError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self::new(RecordConfig::new(tags)?))
    }

    /// Parse `reader` to the end, handing each record to `sink`
    ///
    /// Records completed before an error have already been delivered when
    /// the error is returned.
    pub fn run<R: Read, S: RecordSink + ?Sized>(
        &self,
        reader: R,
        sink: &mut S,
    ) -> Result<(), RecordError> {
        let mut chunks = ChunkReader::with_capacity(reader, self.config.chunk_size());
        let mut stream = RecordStream::new(&self.config);

        while let Some(chunk) = chunks.next_chunk()? {
            let fed = stream.feed(chunk);
            deliver(&mut stream, sink);
            fed?;
        }

        let finished = stream.finish();
        deliver(&mut stream, sink);
        finished
    }

    /// Buffered mode: collect every record, or fail with nothing
    pub fn parse_all<R: Read>(&self, reader: R) -> Result<RecordSet, RecordError> {
        let mut set = RecordSet::new(&self.config);
        self.run(reader, &mut set)?;
        Ok(set)
    }

    /// Callback mode: invoke `callback` once per record, in document order
    ///
    /// The callback is never invoked after a tokenizer error.
    pub fn for_each<R: Read, F: FnMut(Record)>(
        &self,
        reader: R,
        callback: F,
    ) -> Result<(), RecordError> {
        self.run(reader, &mut CallbackSink(callback))
    }

    /// Iterator mode: yields records, then at most one error
    pub fn records<R: Read>(&self, reader: R) -> Records<R> {
        Records {
            chunks: ChunkReader::with_capacity(reader, self.config.chunk_size()),
            stream: RecordStream::new(&self.config),
            error: None,
            done: false,
        }
    }

    pub fn parse_bytes(&self, input: &[u8]) -> Result<RecordSet, RecordError> {
        self.parse_all(input)
    }

    pub fn parse_str(&self, input: &str) -> Result<RecordSet, RecordError> {
        self.parse_all(input.as_bytes())
    }

    /// Buffered mode over a file
    pub fn parse_path(&self, path: impl AsRef<Path>) -> Result<RecordSet, RecordError> {
        let file = File::open(path)?;
        self.parse_all(file)
    }
}

fn deliver<S: RecordSink + ?Sized>(stream: &mut RecordStream, sink: &mut S) {
    while let Some(record) = stream.next_record() {
        sink.accept(record);
    }
}

/// Records pulled lazily from a byte source
pub struct Records<R: Read> {
    chunks: ChunkReader<R>,
    stream: RecordStream,
    error: Option<RecordError>,
    done: bool,
}

impl<R: Read> Iterator for Records<R> {
    type Item = Result<Record, RecordError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.stream.next_record() {
                return Some(Ok(record));
            }
            if let Some(err) = self.error.take() {
                self.done = true;
                return Some(Err(err));
            }
            if self.done {
                return None;
            }

            match self.chunks.next_chunk() {
                Ok(Some(chunk)) => {
                    if let Err(err) = self.stream.feed(chunk) {
                        self.error = Some(err);
                    }
                }
                Ok(None) => match self.stream.finish() {
                    Ok(()) => self.done = true,
                    Err(err) => self.error = Some(err),
                },
                Err(err) => self.error = Some(err.into()),
            }
        }
    }
}

impl<R: Read> std::iter::FusedIterator for Records<R> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordValue;

    const DOCUMENT: &str =
        r#"<root><item id="1">A</item><item id="2"><child>B</child></item></root>"#;

    fn parser(tags: &[&str]) -> RecordParser {
        RecordParser::with_tags(tags.iter().copied()).unwrap()
    }

    fn text(s: &str) -> RecordValue {
        RecordValue::from(s)
    }

    /// Reader failing after a fixed prefix
    struct Broken<'a>(&'a [u8]);

    impl Read for Broken<'_> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.0.is_empty() {
                return Err(std::io::Error::other("disk on fire"));
            }
            let n = buf.len().min(self.0.len());
            buf[..n].copy_from_slice(&self.0[..n]);
            self.0 = &self.0[n..];
            Ok(n)
        }
    }

    #[test]
    fn test_text_scalar() {
        let set = parser(&["item"]).parse_str("<item>Hello</item>").unwrap();
        assert_eq!(set.get("item"), Some(&[text("Hello")][..]));
    }

    #[test]
    fn test_attribute_map() {
        let set = parser(&["item"])
            .parse_str(r#"<item id="1" kind="a"/>"#)
            .unwrap();
        assert_eq!(
            set.get("item"),
            Some(&[RecordValue::from([("id", text("1")), ("kind", text("a"))])][..])
        );
    }

    #[test]
    fn test_children_map() {
        let set = parser(&["item"])
            .parse_str("<item><name>A</name><qty>3</qty></item>")
            .unwrap();
        assert_eq!(
            set.get("item"),
            Some(&[RecordValue::from([("name", text("A")), ("qty", text("3"))])][..])
        );
    }

    #[test]
    fn test_duplicate_siblings() {
        let set = parser(&["item"])
            .parse_str("<item><a>1</a><a>2</a></item>")
            .unwrap();
        assert_eq!(set.get("item"), Some(&[RecordValue::from([("a", text("2"))])][..]));
    }

    #[test]
    fn test_same_named_leaf_inside_element() {
        let set = parser(&["item"])
            .parse_str("<item><a><a>1</a></a></item>")
            .unwrap();
        assert_eq!(
            set.get("item"),
            Some(&[RecordValue::from([("a", RecordValue::Map(Default::default()))])][..])
        );
    }

    #[test]
    fn test_comment_between_text_runs() {
        let set = parser(&["item"])
            .parse_str("<item>x<!-- c -->y</item>")
            .unwrap();
        assert_eq!(set.get("item"), Some(&[text("y")][..]));
    }

    #[test]
    fn test_whitespace_and_pretty_printing() {
        let input = "<items>\n  <item>\n    <name>  A  </name>\n    <empty/>\n  </item>\n</items>\n";
        let set = parser(&["item"]).parse_str(input).unwrap();
        assert_eq!(
            set.get("item"),
            Some(
                &[RecordValue::from([
                    ("name", text("A")),
                    ("empty", RecordValue::Map(Default::default())),
                ])][..]
            )
        );
    }

    #[test]
    fn test_buffered_end_to_end() {
        let set = parser(&["item", "missing"]).parse_str(DOCUMENT).unwrap();
        assert_eq!(
            set.get("item"),
            Some(&[text("A"), RecordValue::from([("child", text("B"))])][..])
        );
        assert_eq!(set.get("missing"), Some(&[][..]));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_callback_in_document_order() {
        let mut seen = Vec::new();
        parser(&["item"])
            .for_each(DOCUMENT.as_bytes(), |record| seen.push(record))
            .unwrap();
        assert_eq!(
            seen,
            vec![
                Record::new("item", text("A")),
                Record::new("item", RecordValue::from([("child", text("B"))])),
            ]
        );
    }

    #[test]
    fn test_chunk_size_does_not_change_results() {
        let expected = parser(&["item"]).parse_str(DOCUMENT).unwrap();
        for size in [1, 2, 5, 13] {
            let config = RecordConfig::new(["item"])
                .unwrap()
                .with_chunk_size(size)
                .unwrap();
            let set = RecordParser::new(config).parse_str(DOCUMENT).unwrap();
            assert_eq!(set, expected, "chunk size {}", size);
        }
    }

    #[test]
    fn test_buffered_error_returns_nothing() {
        let result = parser(&["item"]).parse_str("<root><item>A</item><item>B</oops></root>");
        assert!(matches!(result, Err(RecordError::Tokenize(_))));
    }

    #[test]
    fn test_callback_stops_at_error() {
        let config = RecordConfig::new(["item"]).unwrap().with_chunk_size(4).unwrap();
        let mut seen = Vec::new();
        let result = RecordParser::new(config).for_each(
            "<root><item>A</item><item>B</oops><item>C</item></root>".as_bytes(),
            |record| seen.push(record.value),
        );
        assert!(result.is_err());
        assert_eq!(seen, vec![text("A")]);
    }

    #[test]
    fn test_io_error_aborts() {
        let result = parser(&["item"]).parse_all(Broken(b"<root><item>A</item>"));
        assert!(matches!(result, Err(RecordError::Io(_))));
    }

    #[test]
    fn test_iterator() {
        let config = RecordConfig::new(["item"]).unwrap().with_chunk_size(3).unwrap();
        let parser = RecordParser::new(config);
        let values: Vec<RecordValue> = parser
            .records(DOCUMENT.as_bytes())
            .map(|r| r.unwrap().value)
            .collect();
        assert_eq!(values, vec![text("A"), RecordValue::from([("child", text("B"))])]);
    }

    #[test]
    fn test_iterator_yields_error_once() {
        let mut records = parser(&["item"]).records("<r><item>A</item></x>".as_bytes());
        assert_eq!(records.next().unwrap().unwrap().value, text("A"));
        assert!(records.next().unwrap().is_err());
        assert!(records.next().is_none());
        assert!(records.next().is_none());
    }

    #[test]
    fn test_unterminated_record_is_dropped() {
        let set = parser(&["item"])
            .parse_str("<root><item>A</item><item>B")
            .unwrap();
        assert_eq!(set.get("item"), Some(&[text("A")][..]));
    }

    #[test]
    fn test_parse_path() {
        let path = std::env::temp_dir().join(format!("xmlrecords-{}.xml", std::process::id()));
        std::fs::write(&path, DOCUMENT).unwrap();
        let set = parser(&["item"]).parse_path(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(set.len(), 2);

        let missing = parser(&["item"]).parse_path(path.with_extension("nope"));
        assert!(matches!(missing, Err(RecordError::Io(_))));
    }
}
