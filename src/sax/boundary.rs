//! Chunk Boundaries
//!
//! Finds how much of the buffered input can be tokenized without splitting
//! a markup construct across two chunks.

use memchr::{memchr, memchr3, memmem};

const COMMENT_OPEN: &[u8] = b"<!--";
const CDATA_OPEN: &[u8] = b"<![CDATA[";

/// Where the scan stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    /// Character data, looking for the next '<'
    #[default]
    Text,
    /// '<' at `start`, construct kind not known yet
    Opener { start: usize },
    /// Comment, CDATA or PI whose body starts at `body`
    Delimited {
        body: usize,
        terminator: &'static [u8],
    },
    /// Start or end tag; `quote` is the open attribute quote
    Tag { quote: Option<u8> },
    /// `<!DOCTYPE ...>` with bracket depth of the internal subset
    Declaration { depth: usize, quote: Option<u8> },
}

/// Incremental boundary finder
///
/// Keeps its position between calls so bytes already examined are not
/// scanned again. The caller must drop exactly the returned prefix from
/// its buffer and only append to it afterwards.
#[derive(Debug, Default)]
pub struct BoundaryScanner {
    state: State,
    /// Bytes of the current buffer already examined
    scanned: usize,
}

impl BoundaryScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset just past the last complete markup construct in `buf`
    ///
    /// Returns 0 when no construct is complete yet. Character data after the
    /// boundary stays buffered so text is never cut by a chunk edge.
    pub fn scan(&mut self, buf: &[u8]) -> usize {
        let mut boundary = 0;
        let mut pos = self.scanned.min(buf.len());

        loop {
            match self.state {
                State::Text => match memchr(b'<', &buf[pos..]) {
                    Some(rel) => {
                        let start = pos + rel;
                        self.state = State::Opener { start };
                    }
                    None => {
                        pos = buf.len();
                        break;
                    }
                },
                State::Opener { start } => {
                    let rest = &buf[start..];
                    // "<!-" could still become a comment or a CDATA section
                    if is_partial_prefix(rest, COMMENT_OPEN) || is_partial_prefix(rest, CDATA_OPEN) {
                        pos = buf.len();
                        break;
                    }
                    let (state, body) = if rest.starts_with(COMMENT_OPEN) {
                        let body = start + COMMENT_OPEN.len();
                        (State::Delimited { body, terminator: b"-->" }, body)
                    } else if rest.starts_with(CDATA_OPEN) {
                        let body = start + CDATA_OPEN.len();
                        (State::Delimited { body, terminator: b"]]>" }, body)
                    } else if rest.starts_with(b"<?") {
                        (State::Delimited { body: start + 2, terminator: b"?>" }, start + 2)
                    } else if rest.starts_with(b"<!") {
                        (State::Declaration { depth: 0, quote: None }, start + 2)
                    } else {
                        (State::Tag { quote: None }, start + 1)
                    };
                    self.state = state;
                    pos = body;
                }
                State::Delimited { body, terminator } => {
                    // A terminator may straddle the previous end of input
                    let from = pos.saturating_sub(terminator.len() - 1).max(body);
                    match memmem::find(&buf[from..], terminator) {
                        Some(i) => {
                            pos = from + i + terminator.len();
                            boundary = pos;
                            self.state = State::Text;
                        }
                        None => {
                            pos = buf.len();
                            break;
                        }
                    }
                }
                State::Tag { quote: Some(q) } => match memchr(q, &buf[pos..]) {
                    Some(i) => {
                        pos += i + 1;
                        self.state = State::Tag { quote: None };
                    }
                    None => {
                        pos = buf.len();
                        break;
                    }
                },
                State::Tag { quote: None } => match memchr3(b'>', b'"', b'\'', &buf[pos..]) {
                    Some(i) => {
                        let at = pos + i;
                        pos = at + 1;
                        if buf[at] == b'>' {
                            boundary = pos;
                            self.state = State::Text;
                        } else {
                            self.state = State::Tag { quote: Some(buf[at]) };
                        }
                    }
                    None => {
                        pos = buf.len();
                        break;
                    }
                },
                State::Declaration { depth, quote } => {
                    match declaration_end(&buf[pos..], depth, quote) {
                        Ok(len) => {
                            pos += len;
                            boundary = pos;
                            self.state = State::Text;
                        }
                        Err((depth, quote)) => {
                            self.state = State::Declaration { depth, quote };
                            pos = buf.len();
                            break;
                        }
                    }
                }
            }
        }

        // Offsets are kept relative to the buffer after the prefix is drained
        self.scanned = pos - boundary;
        self.state = match self.state {
            State::Opener { start } => State::Opener {
                start: start - boundary,
            },
            State::Delimited { body, terminator } => State::Delimited {
                body: body - boundary,
                terminator,
            },
            other => other,
        };
        boundary
    }
}

#[inline]
fn is_partial_prefix(rest: &[u8], pattern: &[u8]) -> bool {
    rest.len() < pattern.len() && pattern.starts_with(rest)
}

/// Bytes up to and including the closing '>' of a declaration, or the
/// bracket depth and quote reached at the end of `rest`
fn declaration_end(
    rest: &[u8],
    mut depth: usize,
    mut quote: Option<u8>,
) -> Result<usize, (usize, Option<u8>)> {
    for (i, &b) in rest.iter().enumerate() {
        if let Some(q) = quote {
            if b == q {
                quote = None;
            }
            continue;
        }
        match b {
            b'"' | b'\'' => quote = Some(b),
            b'[' => depth += 1,
            b']' => depth = depth.saturating_sub(1),
            b'>' if depth == 0 => return Ok(i + 1),
            _ => {}
        }
    }
    Err((depth, quote))
}
