//! SAX (Simple API for XML) Module
//!
//! Turns raw XML chunks into the ordered event stream consumed by the
//! record builder.
//!
//! ## Architecture
//!
//! ```text
//! chunk ---> SaxCollector ---> BoundaryScanner ---> quick-xml ---> SaxEvent[]
//!                 ^                                                       |
//!                 +------------- unconsumed tail waits for next chunk ----+
//! ```
//!
//! ## Event Types
//!
//! - `OpenTag` - Element opening tag with name, attributes, self-closing flag
//! - `Text` - Character data between two tags (entities and CDATA resolved)
//! - `CloseTag` - Element closing tag (also emitted right after a self-closing tag)
//! - `Error` - Fatal tokenizer error, always the last event
//! - `End` - End of input
//!
//! Comments, processing instructions and declarations are dropped; a
//! comment or PI still ends the current text run.

pub mod boundary;
pub mod collector;
pub mod events;

pub use collector::{parse_sax, SaxCollector};
pub use events::SaxEvent;
