//! Record Reconstruction
//!
//! Rebuilds the subtree under each record tag from SAX events and folds it
//! into a [`RecordValue`]:
//!
//! ```text
//! SaxEvent ---> RecordBuilder ---> NodeTree ---> fold ---> Record
//!                    |
//!                    +-- open leaf (XmlNode) / ancestor stack
//! ```
//!
//! ## Folding
//!
//! - Element with children: map of child name to folded child
//!   (a repeated child name keeps the last value)
//! - Element with text and not self-closing: the trimmed text
//! - Otherwise: the attribute map

pub mod builder;
pub mod node;
pub mod tree;
pub mod value;

pub use builder::{RecordBuilder, Step};
pub use node::{Attributes, XmlNode};
pub use tree::NodeTree;
pub use value::{Record, RecordValue, ValueMap};
