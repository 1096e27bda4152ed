//! Record Builder
//!
//! State machine turning SAX events into folded records.
//!
//! ## State
//!
//! ```text
//!   active record:  <item>            (NodeTree, root = record tag)
//!   ancestors:        <order>         (promoted frames, outermost first)
//!                       <line>
//!   open leaf:            <sku>       (not yet closed, may gain children)
//! ```
//!
//! An open leaf is promoted onto the ancestor stack the moment another tag
//! opens inside it. Closing a frame appends it to the frame below, or to
//! the record root when the stack is empty. Closing the record root folds
//! the whole tree into one [`Record`].
//!
//! Record tags must not nest: opening a record tag while a record is in
//! progress drops the unfinished record.

use log::{debug, trace, warn};

use super::node::{Attributes, XmlNode};
use super::tree::NodeTree;
use super::value::Record;
use crate::config::RecordConfig;
use crate::error::TokenizeError;
use crate::sax::SaxEvent;

/// The element currently open at the bottom of the tree
#[derive(Debug)]
enum OpenLeaf {
    /// The active record's own root
    RecordRoot,
    /// Any other element
    Node(XmlNode),
}

/// Outcome of feeding one event to the builder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Nothing completed
    Continue,
    /// A record closed
    Record(Record),
    /// The tokenizer failed; all in-progress state was dropped
    Failed(TokenizeError),
    /// End of input
    Finished,
}

/// Event-driven record reconstruction
#[derive(Debug)]
pub struct RecordBuilder {
    config: RecordConfig,
    leaf: Option<OpenLeaf>,
    active: Option<NodeTree>,
    ancestors: Vec<NodeTree>,
}

impl RecordBuilder {
    pub fn new(config: &RecordConfig) -> Self {
        RecordBuilder {
            config: config.clone(),
            leaf: None,
            active: None,
            ancestors: Vec::new(),
        }
    }

    /// Check if a record is in progress
    pub fn in_record(&self) -> bool {
        self.active.is_some()
    }

    /// Number of promoted frames between the record root and the open leaf
    pub fn depth(&self) -> usize {
        self.ancestors.len()
    }

    /// Dispatch one event
    pub fn handle(&mut self, event: SaxEvent) -> Step {
        trace!("event {:?}", event);
        match event {
            SaxEvent::OpenTag {
                name,
                attributes,
                self_closing,
            } => {
                self.open_tag(name, attributes, self_closing);
                Step::Continue
            }
            SaxEvent::Text(value) => {
                self.text(&value);
                Step::Continue
            }
            SaxEvent::CloseTag { name } => match self.close_tag(&name) {
                Some(record) => Step::Record(record),
                None => Step::Continue,
            },
            SaxEvent::Error(cause) => Step::Failed(self.error(cause)),
            SaxEvent::End => {
                self.end();
                Step::Finished
            }
        }
    }

    /// An element opened
    pub fn open_tag(&mut self, name: String, attributes: Attributes, self_closing: bool) {
        // The previous leaf has a child after all
        if self.active.is_some() {
            if let Some(OpenLeaf::Node(node)) = self.leaf.take() {
                if !self.config.is_record_tag(&node.name) {
                    self.ancestors.push(NodeTree::new(node));
                }
            }
        }

        let node = XmlNode::new(name, attributes, self_closing);

        if self.config.is_record_tag(&node.name) {
            if let Some(previous) = self.active.take() {
                warn!(
                    "record tag <{}> opened inside unfinished <{}> record, dropping the outer record",
                    node.name,
                    previous.name()
                );
            }
            self.ancestors.clear();
            self.active = Some(NodeTree::new(node));
            self.leaf = Some(OpenLeaf::RecordRoot);
        } else {
            self.leaf = Some(OpenLeaf::Node(node));
        }
    }

    /// Character data inside the open leaf
    pub fn text(&mut self, value: &str) {
        match self.leaf.as_mut() {
            Some(OpenLeaf::Node(node)) => node.set_text(value),
            Some(OpenLeaf::RecordRoot) => {
                if let Some(active) = self.active.as_mut() {
                    active.root.set_text(value);
                }
            }
            None => {}
        }
    }

    /// An element closed; returns the record it completed, if any
    pub fn close_tag(&mut self, name: &str) -> Option<Record> {
        let completes_record = match &self.active {
            None => return None,
            Some(active) => active.name() == name,
        };

        if completes_record {
            let tree = self.active.take()?;
            self.leaf = None;
            self.ancestors.clear();
            let record = Record::new(name, tree.fold());
            debug!("completed <{}> record", name);
            return Some(record);
        }

        // A promoted frame closes before the open leaf is considered
        let frame = match self.ancestors.last() {
            Some(top) if top.name() == name => {
                self.leaf = None;
                self.ancestors.pop()?
            }
            _ => match self.leaf.take() {
                Some(OpenLeaf::Node(node)) => NodeTree::new(node),
                other => {
                    self.leaf = other;
                    debug!("ignoring close tag </{}> with no open frame", name);
                    return None;
                }
            },
        };

        match self.ancestors.last_mut() {
            Some(parent) => parent.append_child(frame),
            None => {
                if let Some(active) = self.active.as_mut() {
                    active.append_child(frame);
                }
            }
        }
        None
    }

    /// Abort: drop everything in progress
    pub fn error(&mut self, cause: TokenizeError) -> TokenizeError {
        if let Some(active) = &self.active {
            debug!("dropping unfinished <{}> record after error", active.name());
        }
        self.reset();
        cause
    }

    /// No more events will arrive
    ///
    /// An unfinished record is dropped without being reported.
    pub fn end(&mut self) {
        if let Some(active) = &self.active {
            debug!("input ended inside <{}> record, dropping it", active.name());
        }
        self.reset();
    }

    /// Clear all state
    pub fn reset(&mut self) {
        self.leaf = None;
        self.active = None;
        self.ancestors.clear();
    }
}
