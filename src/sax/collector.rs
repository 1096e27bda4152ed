//! SAX Collector
//!
//! Chunk-fed tokenizer that queues [`SaxEvent`]s in document order.
//!
//! Each fed chunk is appended to an internal buffer; the prefix up to the
//! last complete markup construct is tokenized with quick-xml and drained,
//! the rest waits for the next chunk.

use std::mem;

use log::debug;
use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesEnd, BytesRef, BytesStart, Event};
use quick_xml::Reader;

use super::boundary::BoundaryScanner;
use super::events::SaxEvent;
use crate::error::TokenizeError;
use crate::record::Attributes;

/// Collector that turns raw chunks into SAX events
pub struct SaxCollector {
    /// Input not tokenized yet
    buffer: Vec<u8>,
    /// Resumable search for the end of the tokenizable prefix
    scanner: BoundaryScanner,
    /// Events ready to be consumed
    events: Vec<SaxEvent>,
    /// Names of currently open elements
    open: Vec<String>,
    /// Character data since the last tag
    text: String,
    /// Bytes drained from the front of `buffer` so far
    consumed: u64,
    failed: bool,
    finished: bool,
}

impl SaxCollector {
    /// Create a new collector
    pub fn new() -> Self {
        SaxCollector {
            buffer: Vec::with_capacity(8192),
            scanner: BoundaryScanner::new(),
            events: Vec::with_capacity(64),
            open: Vec::new(),
            text: String::new(),
            consumed: 0,
            failed: false,
            finished: false,
        }
    }

    /// Feed a chunk of data
    ///
    /// Ignored once the collector has failed or finished.
    pub fn feed(&mut self, chunk: &[u8]) {
        if self.failed || self.finished {
            return;
        }

        self.buffer.extend_from_slice(chunk);
        let boundary = self.scanner.scan(&self.buffer);
        if boundary == 0 {
            return;
        }

        let mut buffer = mem::take(&mut self.buffer);
        self.tokenize(&buffer[..boundary]);
        if self.failed {
            return;
        }
        buffer.drain(..boundary);
        self.buffer = buffer;
        self.consumed += boundary as u64;
    }

    /// Signal end of input and queue the `End` event
    ///
    /// Unclosed elements and an unterminated markup tail are not errors.
    pub fn finish(&mut self) {
        if self.failed || self.finished {
            return;
        }
        self.finished = true;

        if !self.buffer.is_empty() {
            debug!(
                "discarding {} unparsed bytes at end of input",
                self.buffer.len()
            );
            self.buffer.clear();
        }
        if !self.open.is_empty() {
            debug!("input ended with {} unclosed element(s)", self.open.len());
        }

        self.flush_text();
        self.events.push(SaxEvent::End);
    }

    /// Take all queued events
    pub fn take_events(&mut self) -> Vec<SaxEvent> {
        mem::take(&mut self.events)
    }

    /// Get number of buffered, not yet tokenized bytes
    pub fn buffer_size(&self) -> usize {
        self.buffer.len()
    }

    fn tokenize(&mut self, input: &[u8]) {
        let mut reader = Reader::from_reader(input);
        let config = reader.config_mut();
        // Slices start mid-document; tag balance is checked against `open`
        config.check_end_names = false;
        config.allow_unmatched_ends = true;

        loop {
            let event = match reader.read_event() {
                Ok(event) => event,
                Err(err) => {
                    let position = self.consumed + reader.error_position() as u64;
                    self.fail(err.to_string(), position);
                    return;
                }
            };
            let position = self.consumed + reader.buffer_position() as u64;

            let outcome = match event {
                Event::Start(tag) => self.start_element(&tag, false),
                Event::Empty(tag) => self.start_element(&tag, true),
                Event::End(tag) => self.end_element(&tag),
                Event::Text(text) => {
                    self.text.push_str(&String::from_utf8_lossy(&text));
                    Ok(())
                }
                Event::CData(cdata) => {
                    self.text.push_str(&String::from_utf8_lossy(&cdata));
                    Ok(())
                }
                Event::GeneralRef(entity) => self.reference(&entity),
                // Text on either side is reported separately
                Event::Comment(_) | Event::PI(_) => {
                    self.flush_text();
                    Ok(())
                }
                Event::Eof => break,
                // Declarations
                _ => Ok(()),
            };

            if let Err(message) = outcome {
                self.fail(message, position);
                return;
            }
        }
    }

    fn start_element(&mut self, tag: &BytesStart<'_>, self_closing: bool) -> Result<(), String> {
        let name = String::from_utf8_lossy(tag.name().as_ref()).into_owned();

        let mut attributes = Attributes::new();
        for attr in tag.attributes() {
            let attr = attr.map_err(|e| e.to_string())?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let raw = String::from_utf8_lossy(&attr.value);
            let value = unescape(&raw).map_err(|e| e.to_string())?;
            attributes.insert(key, value.into_owned());
        }

        self.flush_text();
        if self_closing {
            self.events.push(SaxEvent::OpenTag {
                name: name.clone(),
                attributes,
                self_closing,
            });
            self.events.push(SaxEvent::close(name));
        } else {
            self.open.push(name.clone());
            self.events.push(SaxEvent::OpenTag {
                name,
                attributes,
                self_closing,
            });
        }
        Ok(())
    }

    fn end_element(&mut self, tag: &BytesEnd<'_>) -> Result<(), String> {
        let name = String::from_utf8_lossy(tag.name().as_ref()).into_owned();

        match self.open.pop() {
            Some(open) if open == name => {}
            Some(open) => {
                return Err(format!("mismatched close tag </{}>, expected </{}>", name, open))
            }
            None => return Err(format!("unexpected close tag </{}>", name)),
        }

        self.flush_text();
        self.events.push(SaxEvent::close(name));
        Ok(())
    }

    /// `&name;` or `&#N;` / `&#xN;` in character data
    fn reference(&mut self, entity: &BytesRef<'_>) -> Result<(), String> {
        let name = String::from_utf8_lossy(entity);

        if let Some(num) = name.strip_prefix('#') {
            let code = match num.strip_prefix('x') {
                Some(hex) => u32::from_str_radix(hex, 16),
                None => num.parse::<u32>(),
            };
            return match code.ok().and_then(char::from_u32) {
                Some(c) => {
                    self.text.push(c);
                    Ok(())
                }
                None => Err(format!("invalid character reference &{};", name)),
            };
        }

        match resolve_predefined_entity(&name) {
            Some(value) => {
                self.text.push_str(value);
                Ok(())
            }
            None => Err(format!("undefined entity &{};", name)),
        }
    }

    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            self.events.push(SaxEvent::text(mem::take(&mut self.text)));
        }
    }

    fn fail(&mut self, message: String, position: u64) {
        debug!("tokenizer failed at byte {}: {}", position, message);
        self.failed = true;
        self.text.clear();
        self.buffer.clear();
        self.events
            .push(SaxEvent::Error(TokenizeError::new(message, position)));
    }
}

impl Default for SaxCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Tokenize a complete document into events, ending with `End` or `Error`
pub fn parse_sax(input: &[u8]) -> Vec<SaxEvent> {
    let mut collector = SaxCollector::new();
    collector.feed(input);
    collector.finish();
    collector.take_events()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect_chunked(input: &[u8], chunk_size: usize) -> Vec<SaxEvent> {
        let mut collector = SaxCollector::new();
        let mut events = Vec::new();
        for chunk in input.chunks(chunk_size) {
            collector.feed(chunk);
            events.extend(collector.take_events());
        }
        collector.finish();
        events.extend(collector.take_events());
        events
    }

    #[test]
    fn test_simple_parse() {
        let events = parse_sax(b"<root><child/></root>");
        assert_eq!(
            events,
            vec![
                SaxEvent::open("root"),
                SaxEvent::OpenTag {
                    name: "child".into(),
                    attributes: Attributes::new(),
                    self_closing: true,
                },
                SaxEvent::close("child"),
                SaxEvent::close("root"),
                SaxEvent::End,
            ]
        );
    }

    #[test]
    fn test_with_attributes() {
        let events = parse_sax(b"<root id=\"1\" name='a &amp; b'/>");
        match &events[0] {
            SaxEvent::OpenTag {
                attributes,
                self_closing,
                ..
            } => {
                assert!(*self_closing);
                assert_eq!(attributes.get("id").map(String::as_str), Some("1"));
                assert_eq!(attributes.get("name").map(String::as_str), Some("a & b"));
            }
            other => panic!("Expected OpenTag, got {:?}", other),
        }
    }

    #[test]
    fn test_text_is_coalesced_and_decoded() {
        let events = parse_sax(b"<a>x &lt; y &#65;&#x42;<![CDATA[ <z> ]]>!</a>");
        assert_eq!(events[1], SaxEvent::text("x < y AB <z> !"));
        assert_eq!(events[2], SaxEvent::close("a"));
    }

    #[test]
    fn test_comments_and_pis_are_dropped() {
        let events = parse_sax(b"<?xml version=\"1.0\"?><!-- c --><a><?pi x?>t</a>");
        assert_eq!(
            events,
            vec![
                SaxEvent::open("a"),
                SaxEvent::text("t"),
                SaxEvent::close("a"),
                SaxEvent::End,
            ]
        );
    }

    #[test]
    fn test_comment_splits_text() {
        let events = parse_sax(b"<a>x<!-- c -->y<?pi?>z</a>");
        assert_eq!(
            events,
            vec![
                SaxEvent::open("a"),
                SaxEvent::text("x"),
                SaxEvent::text("y"),
                SaxEvent::text("z"),
                SaxEvent::close("a"),
                SaxEvent::End,
            ]
        );
    }

    #[test]
    fn test_chunking_does_not_change_events() {
        let input: &[u8] =
            b"<root><item id=\"1\">A &amp; B</item><!-- x > y --><item><c>1 > 0</c></item></root>";
        let whole = parse_sax(input);
        for size in [1, 2, 3, 7, 16] {
            assert_eq!(collect_chunked(input, size), whole, "chunk size {}", size);
        }
    }

    #[test]
    fn test_mismatched_close_tag_is_error() {
        let events = parse_sax(b"<a><b></a>");
        match events.last() {
            Some(SaxEvent::Error(err)) => {
                assert!(err.message.contains("mismatched"), "{}", err.message);
                assert_eq!(err.position, 10);
            }
            other => panic!("Expected Error, got {:?}", other),
        }
        assert!(!events.contains(&SaxEvent::End));
    }

    #[test]
    fn test_undefined_entity_is_error() {
        let events = parse_sax(b"<a>&nope;</a>");
        assert!(matches!(events.last(), Some(SaxEvent::Error(_))));
    }

    #[test]
    fn test_fused_after_error() {
        let mut collector = SaxCollector::new();
        collector.feed(b"<a></b>");
        let events = collector.take_events();
        assert!(matches!(events.last(), Some(SaxEvent::Error(_))));

        collector.feed(b"<c></c>");
        collector.finish();
        assert!(collector.take_events().is_empty());
        assert_eq!(collector.buffer_size(), 0);
    }

    #[test]
    fn test_unterminated_input_still_ends() {
        let mut collector = SaxCollector::new();
        collector.feed(b"<root><item>text</item><ite");
        assert_eq!(collector.buffer_size(), 4);
        collector.finish();
        let events = collector.take_events();
        assert_eq!(events.last(), Some(&SaxEvent::End));
        assert_eq!(collector.buffer_size(), 0);

        collector.finish();
        assert!(collector.take_events().is_empty());
    }
}
