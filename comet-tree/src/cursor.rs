use crate::{node::NodeType, tree::Tree};

/// A mutable position inside a [`Tree`].
///
/// The cursor tracks absolute byte offsets, so a cursor created with
/// [`Tree::cursor_at`] reports positions in the coordinates of the
/// document the tree is mounted in.
pub struct TreeCursor<'a> {
    tree: &'a Tree,
    start: usize,
    // (node, absolute start, index of the current node within it)
    parents: Vec<(&'a Tree, usize, usize)>,
}

impl<'a> TreeCursor<'a> {
    pub(crate) fn new(tree: &'a Tree, base: usize) -> Self {
        Self {
            tree,
            start: base,
            parents: Vec::new(),
        }
    }

    /// The subtree the cursor currently points at.
    pub fn tree(&self) -> &'a Tree {
        self.tree
    }

    pub fn ty(&self) -> &'a NodeType {
        self.tree.ty()
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.start + self.tree.len()
    }

    /// Moves to the first child, if any.
    pub fn first_child(&mut self) -> bool {
        let tree = self.tree;
        let Some((at, child)) = tree.children().next() else {
            return false;
        };
        self.parents.push((tree, self.start, 0));
        self.start += at;
        self.tree = child;
        true
    }

    /// Moves to the next sibling, if any.
    pub fn next_sibling(&mut self) -> bool {
        let Some((parent, parent_start, index)) = self.parents.last_mut()
        else {
            return false;
        };
        let (parent, parent_start) = (*parent, *parent_start);
        let Some((at, sibling)) = parent.children().nth(*index + 1) else {
            return false;
        };
        *index += 1;
        self.start = parent_start + at;
        self.tree = sibling;
        true
    }

    /// Moves to the parent node, if the cursor is not at its root.
    pub fn parent(&mut self) -> bool {
        let Some((parent, parent_start, _)) = self.parents.pop() else {
            return false;
        };
        self.tree = parent;
        self.start = parent_start;
        true
    }
}

#[cfg(test)]
mod tests {
    use crate::node::NodeType;

    use super::*;

    fn sample() -> Tree {
        // doc [a [b] c]
        let doc = NodeType::define_top("Doc");
        let inner = NodeType::define("Inner");
        let leaf = NodeType::define("Leaf");
        Tree::new(doc, 10)
            .child(1, Tree::new(leaf.clone(), 2))
            .child(
                3,
                Tree::new(inner, 4).child(1, Tree::new(leaf.clone(), 2)),
            )
            .child(8, Tree::new(leaf, 1))
    }

    #[test]
    fn test_walk() {
        let tree = sample();
        let mut cursor = tree.cursor();
        assert_eq!(cursor.ty().name(), "Doc");
        assert!(cursor.first_child());
        assert_eq!((cursor.start(), cursor.end()), (1, 3));
        assert!(cursor.next_sibling());
        assert_eq!(cursor.ty().name(), "Inner");
        assert!(cursor.first_child());
        assert_eq!((cursor.start(), cursor.end()), (4, 6));
        assert!(!cursor.next_sibling());
        assert!(cursor.parent());
        assert!(cursor.next_sibling());
        assert_eq!((cursor.start(), cursor.end()), (8, 9));
        assert!(!cursor.next_sibling());
        assert!(cursor.parent());
        assert!(!cursor.parent());
    }

    #[test]
    fn test_base_offset() {
        let tree = sample();
        let mut cursor = tree.cursor_at(100);
        assert_eq!((cursor.start(), cursor.end()), (100, 110));
        assert!(cursor.first_child());
        assert_eq!((cursor.start(), cursor.end()), (101, 103));
    }
}
