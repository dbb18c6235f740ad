//! Parse-tree primitives for the Comet highlighter: node types with typed
//! props, immutable positioned trees, mounted inner languages and a
//! cursor to walk it all.

pub mod cursor;
pub mod node;
pub mod tree;

pub use cursor::TreeCursor;
pub use node::{NodeProp, NodeSet, NodeType};
pub use tree::{MOUNTED, MountedTree, OverlayRange, Tree};

pub(crate) use node::PropMap;
