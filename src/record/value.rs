//! Folded record values

use indexmap::IndexMap;

/// Ordered string-keyed mapping of folded values
pub type ValueMap = IndexMap<String, RecordValue>;

/// Value produced by folding an element subtree
///
/// Either the element's trimmed text, or a mapping (attributes for
/// childless elements, child name to child value otherwise).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValue {
    Text(String),
    Map(ValueMap),
}

impl RecordValue {
    /// Get the text if this is a scalar
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RecordValue::Text(s) => Some(s),
            RecordValue::Map(_) => None,
        }
    }

    /// Get the mapping if this is not a scalar
    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            RecordValue::Map(m) => Some(m),
            RecordValue::Text(_) => None,
        }
    }

    /// Look up a key in a mapping value
    pub fn get(&self, key: &str) -> Option<&RecordValue> {
        self.as_map().and_then(|m| m.get(key))
    }

    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self, RecordValue::Text(_))
    }
}

impl From<&str> for RecordValue {
    fn from(s: &str) -> Self {
        RecordValue::Text(s.to_string())
    }
}

impl From<String> for RecordValue {
    fn from(s: String) -> Self {
        RecordValue::Text(s)
    }
}

impl From<ValueMap> for RecordValue {
    fn from(m: ValueMap) -> Self {
        RecordValue::Map(m)
    }
}

impl<K: Into<String>, const N: usize> From<[(K, RecordValue); N]> for RecordValue {
    fn from(pairs: [(K, RecordValue); N]) -> Self {
        RecordValue::Map(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// One completed record and the tag that delimited it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub tag: String,
    pub value: RecordValue,
}

impl Record {
    pub fn new(tag: impl Into<String>, value: RecordValue) -> Self {
        Record {
            tag: tag.into(),
            value,
        }
    }
}
