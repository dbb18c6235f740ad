use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::{
    cursor::TreeCursor,
    node::{NodeProp, NodeType},
    PropMap,
};

/// Prop carrying a tree mounted inside a node. Attached to the node's
/// [`Tree`] value, not to its type: mounts are a property of a concrete
/// parse, not of a grammar.
pub static MOUNTED: Lazy<NodeProp<MountedTree>> = Lazy::new(NodeProp::new);

/// A range of a mounting node that belongs to its inner language,
/// relative to the node's start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OverlayRange {
    pub from: usize,
    pub to: usize,
}

/// A subtree parsed by another grammar.
///
/// Without an overlay the inner tree replaces the mounting node's content
/// entirely. With an overlay, only the listed ranges belong to the inner
/// language and the outer node's own children cover the gaps in between.
/// The inner tree is positioned at the mounting node's start; overlay
/// ranges are sorted and non-overlapping.
#[derive(Clone)]
pub struct MountedTree {
    pub tree: Arc<Tree>,
    pub overlay: Option<Vec<OverlayRange>>,
}

impl MountedTree {
    pub fn new(tree: Tree) -> Self {
        Self {
            tree: Arc::new(tree),
            overlay: None,
        }
    }

    pub fn with_overlay(tree: Tree, overlay: Vec<OverlayRange>) -> Self {
        Self {
            tree: Arc::new(tree),
            overlay: Some(overlay),
        }
    }
}

/// An immutable syntax tree node: a type, a byte length, and positioned
/// child subtrees. Child positions are relative to the node's own start,
/// ascending, and children never overlap.
#[derive(Clone)]
pub struct Tree {
    ty: NodeType,
    len: usize,
    children: Vec<(usize, Arc<Tree>)>,
    props: PropMap,
}

impl Tree {
    pub fn new(ty: NodeType, len: usize) -> Self {
        Self {
            ty,
            len,
            children: Vec::new(),
            props: PropMap::default(),
        }
    }

    /// Appends a child starting at `at` (relative to this node).
    pub fn child(mut self, at: usize, child: Tree) -> Self {
        debug_assert!(at + child.len <= self.len);
        if let Some((last_at, last)) = self.children.last() {
            debug_assert!(*last_at + last.len <= at);
        }
        self.children.push((at, Arc::new(child)));
        self
    }

    pub fn with_prop<T: Send + Sync + 'static>(
        mut self,
        prop: &NodeProp<T>,
        value: T,
    ) -> Self {
        self.props.insert(prop, value);
        self
    }

    pub fn ty(&self) -> &NodeType {
        &self.ty
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn children(&self) -> impl Iterator<Item = (usize, &Tree)> {
        self.children.iter().map(|(at, child)| (*at, child.as_ref()))
    }

    pub fn prop<T: Send + Sync + 'static>(
        &self,
        prop: &NodeProp<T>,
    ) -> Option<&T> {
        self.props.get(prop)
    }

    /// A cursor over this tree, positions reported from 0.
    pub fn cursor(&self) -> TreeCursor<'_> {
        TreeCursor::new(self, 0)
    }

    /// A cursor over this tree shifted by `base`, for trees that hang off
    /// a larger document (mounted trees in particular).
    pub fn cursor_at(&self, base: usize) -> TreeCursor<'_> {
        TreeCursor::new(self, base)
    }
}

impl std::fmt::Debug for Tree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.ty.name())?;
        if !self.children.is_empty() {
            let mut list = f.debug_list();
            for (at, child) in &self.children {
                list.entry(&(at, child));
            }
            list.finish()?;
        }
        Ok(())
    }
}
