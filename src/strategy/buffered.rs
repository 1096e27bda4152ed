//! Buffered Results
//!
//! Accumulates every completed record, grouped by record tag.

use indexmap::IndexMap;

use super::RecordSink;
use crate::config::RecordConfig;
use crate::record::{Record, RecordValue};

/// Completed records grouped by tag, in document order per tag
///
/// Every configured tag has an entry, empty if it never occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSet {
    records: IndexMap<String, Vec<RecordValue>>,
}

impl RecordSet {
    pub fn new(config: &RecordConfig) -> Self {
        RecordSet {
            records: config
                .tags()
                .iter()
                .map(|tag| (tag.clone(), Vec::new()))
                .collect(),
        }
    }

    pub fn push(&mut self, record: Record) {
        self.records.entry(record.tag).or_default().push(record.value);
    }

    /// Records for one tag
    pub fn get(&self, tag: &str) -> Option<&[RecordValue]> {
        self.records.get(tag).map(Vec::as_slice)
    }

    /// Iterate over (tag, records) in configuration order
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Vec<RecordValue>> {
        self.records.iter()
    }

    /// Total number of records across all tags
    pub fn len(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RecordSink for RecordSet {
    fn accept(&mut self, record: Record) {
        self.push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_tag_has_an_entry() {
        let config = RecordConfig::new(["item", "note"]).unwrap();
        let mut set = RecordSet::new(&config);
        assert!(set.is_empty());
        assert_eq!(set.get("note"), Some(&[][..]));
        assert_eq!(set.get("other"), None);

        set.push(Record::new("item", RecordValue::from("a")));
        set.push(Record::new("item", RecordValue::from("b")));

        assert_eq!(set.len(), 2);
        assert_eq!(
            set.get("item"),
            Some(&[RecordValue::from("a"), RecordValue::from("b")][..])
        );

        let tags: Vec<&str> = set.iter().map(|(tag, _)| tag.as_str()).collect();
        assert_eq!(tags, vec!["item", "note"]);
    }
}
