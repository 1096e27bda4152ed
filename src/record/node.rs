//! Single tag occurrence

use indexmap::IndexMap;

use super::value::RecordValue;

/// Attribute name to (unescaped) value, in document order
pub type Attributes = IndexMap<String, String>;

/// One opened element as seen by the record builder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlNode {
    pub name: String,
    pub attributes: Attributes,
    /// Last trimmed, non-empty text seen while this node was the open leaf
    pub text: Option<String>,
    pub self_closing: bool,
}

impl XmlNode {
    pub fn new(name: impl Into<String>, attributes: Attributes, self_closing: bool) -> Self {
        XmlNode {
            name: name.into(),
            attributes,
            text: None,
            self_closing,
        }
    }

    /// Record text content; whitespace-only input is ignored
    pub fn set_text(&mut self, value: &str) {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            self.text = Some(trimmed.to_string());
        }
    }

    /// Fold into the element's text, or its attribute map
    ///
    /// Self-closing elements always fold to attributes.
    pub fn fold(self) -> RecordValue {
        match self.text {
            Some(text) if !self.self_closing => RecordValue::Text(text),
            _ => RecordValue::Map(
                self.attributes
                    .into_iter()
                    .map(|(k, v)| (k, RecordValue::Text(v)))
                    .collect(),
            ),
        }
    }
}
