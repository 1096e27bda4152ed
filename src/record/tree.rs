//! Subtree frames

use super::node::XmlNode;
use super::value::{RecordValue, ValueMap};

/// A node together with its closed children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeTree {
    pub root: XmlNode,
    pub children: Vec<NodeTree>,
}

impl NodeTree {
    pub fn new(root: XmlNode) -> Self {
        NodeTree {
            root,
            children: Vec::new(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.root.name
    }

    pub fn append_child(&mut self, child: NodeTree) {
        self.children.push(child);
    }

    /// Fold the subtree into a value
    ///
    /// A leaf folds like its node. Otherwise each child contributes one
    /// entry keyed by its tag name; a repeated name keeps the last child's
    /// value.
    pub fn fold(self) -> RecordValue {
        if self.children.is_empty() {
            return self.root.fold();
        }

        let mut map = ValueMap::with_capacity(self.children.len());
        for child in self.children {
            let name = child.root.name.clone();
            map.insert(name, child.fold());
        }
        RecordValue::Map(map)
    }
}
