//! SAX Event Types
//!
//! The ordered events a tokenizer hands to the record builder.

use crate::error::TokenizeError;
use crate::record::Attributes;

/// A SAX parsing event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaxEvent {
    /// Start of an element
    OpenTag {
        name: String,
        /// Unescaped attribute values, in document order
        attributes: Attributes,
        /// `<name/>`; the matching `CloseTag` follows immediately
        self_closing: bool,
    },

    /// Character data between two tags, entities already resolved
    Text(String),

    /// End of an element
    CloseTag { name: String },

    /// Fatal tokenizer error; nothing follows
    Error(TokenizeError),

    /// End of input
    End,
}

impl SaxEvent {
    pub fn close(name: impl Into<String>) -> Self {
        SaxEvent::CloseTag { name: name.into() }
    }

    pub fn text(value: impl Into<String>) -> Self {
        SaxEvent::Text(value.into())
    }
}

#[cfg(test)]
impl SaxEvent {
    /// Open tag without attributes
    pub fn open(name: impl Into<String>) -> Self {
        SaxEvent::OpenTag {
            name: name.into(),
            attributes: Attributes::new(),
            self_closing: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        assert_eq!(
            SaxEvent::open("item"),
            SaxEvent::OpenTag {
                name: "item".into(),
                attributes: Attributes::new(),
                self_closing: false,
            }
        );
        assert_eq!(SaxEvent::close("item"), SaxEvent::CloseTag { name: "item".into() });
        assert_eq!(SaxEvent::text("x"), SaxEvent::Text("x".into()));
    }
}
