use generational_arena::{Arena, Index};
use std::fmt;
use tracing::instrument;

use crate::domain::error::{DomainError, DomainResult};

/// Stable handle of a node inside a [`TreeArena`].
///
/// Handles carry a generation, so a handle to a destroyed node never resolves
/// to a node created later in the same slot.
pub type NodeId = Index;

/// Upper bound on the number of children under one parent.
pub const MAX_ROWS: usize = i32::MAX as usize;

/// Tree node in the arena-based hierarchy structure.
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Display/edit payload of this node
    pub value: String,
    /// Index of parent node in the arena, None for the root and detached nodes
    pub parent: Option<Index>,
    /// Indices of child nodes in the arena, in row order
    pub children: Vec<Index>,
}

impl TreeNode {
    fn new(value: impl Into<String>, parent: Option<Index>) -> Self {
        Self {
            value: value.into(),
            parent,
            children: Vec::new(),
        }
    }
}

impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Arena-based tree with a single sentinel root.
///
/// Nodes own their children through the `children` handle list and refer to
/// their parent by handle. Removing a node frees its whole subtree from the
/// arena, after which every handle into that subtree stops resolving.
#[derive(Debug, Clone)]
pub struct TreeArena {
    /// Arena storage for all tree nodes
    arena: Arena<TreeNode>,
    /// Index of the sentinel root node
    root: Index,
}

impl TreeArena {
    pub fn new(root_value: impl Into<String>) -> Self {
        let mut arena = Arena::new();
        let root = arena.insert(TreeNode::new(root_value, None));
        Self { arena, root }
    }

    pub fn root(&self) -> Index {
        self.root
    }

    #[instrument(level = "trace", skip(self))]
    pub fn get_node(&self, idx: Index) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    pub fn contains(&self, idx: Index) -> bool {
        self.arena.contains(idx)
    }

    /// Number of nodes below the root.
    pub fn len(&self) -> usize {
        self.arena.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn child_count(&self, idx: Index) -> usize {
        self.get_node(idx).map_or(0, |n| n.children.len())
    }

    pub fn child(&self, idx: Index, row: usize) -> Option<Index> {
        self.get_node(idx)?.children.get(row).copied()
    }

    pub fn parent(&self, idx: Index) -> Option<Index> {
        self.get_node(idx)?.parent
    }

    /// Position of the node within its parent's children, 0 for the root or a detached node.
    pub fn row(&self, idx: Index) -> usize {
        self.parent(idx)
            .and_then(|p| self.get_node(p))
            .and_then(|p| p.children.iter().position(|&c| c == idx))
            .unwrap_or(0)
    }

    pub fn value(&self, idx: Index) -> Option<&str> {
        self.get_node(idx).map(|n| n.value.as_str())
    }

    pub fn set_value(&mut self, idx: Index, value: impl Into<String>) -> bool {
        match self.arena.get_mut(idx) {
            Some(node) => {
                node.value = value.into();
                true
            }
            None => false,
        }
    }

    /// Creates a node as the last child of `parent`.
    #[instrument(level = "trace", skip(self, value))]
    pub fn append_child(&mut self, parent: Index, value: impl Into<String>) -> Option<Index> {
        if !self.arena.contains(parent) {
            return None;
        }
        let idx = self.arena.insert(TreeNode::new(value, Some(parent)));
        self.arena.get_mut(parent)?.children.push(idx);
        Some(idx)
    }

    /// Creates `count` children with `value` at rows `pos..pos + count`.
    ///
    /// Fails without creating anything if `pos` is past the last row or the
    /// parent would end up with more than [`MAX_ROWS`] children.
    #[instrument(level = "debug", skip(self, value))]
    pub fn insert_children(
        &mut self,
        parent: Index,
        pos: usize,
        count: usize,
        value: &str,
    ) -> DomainResult<()> {
        let existing = self.child_count(parent);
        if !self.arena.contains(parent) || pos > existing {
            return Err(DomainError::RowOutOfRange {
                row: pos,
                count: existing,
            });
        }
        if count > MAX_ROWS - existing.min(MAX_ROWS) {
            return Err(DomainError::RangeOutOfBounds {
                start: pos,
                end: pos.saturating_add(count),
                count: existing,
            });
        }
        let created: Vec<Index> = (0..count)
            .map(|_| self.arena.insert(TreeNode::new(value, Some(parent))))
            .collect();
        if let Some(node) = self.arena.get_mut(parent) {
            node.children.splice(pos..pos, created);
        }
        Ok(())
    }

    /// Inserts an existing detached node as child of `parent` at `pos`.
    #[instrument(level = "debug", skip(self))]
    pub fn attach(&mut self, parent: Index, pos: usize, node: Index) -> DomainResult<()> {
        let existing = self.child_count(parent);
        if !self.arena.contains(parent) || pos > existing {
            return Err(DomainError::RowOutOfRange {
                row: pos,
                count: existing,
            });
        }
        match self.arena.get_mut(node) {
            Some(n) if n.parent.is_none() && node != self.root => n.parent = Some(parent),
            _ => return Err(DomainError::StaleAddress { row: pos }),
        }
        if let Some(p) = self.arena.get_mut(parent) {
            p.children.insert(pos, node);
        }
        Ok(())
    }

    /// Unlinks a node from its parent without destroying it. Returns the row it occupied.
    #[instrument(level = "debug", skip(self))]
    pub fn detach(&mut self, node: Index) -> DomainResult<usize> {
        if node == self.root {
            return Err(DomainError::RootNotMovable);
        }
        let parent = self
            .parent(node)
            .ok_or(DomainError::StaleAddress { row: 0 })?;
        let row = self.row(node);
        if let Some(p) = self.arena.get_mut(parent) {
            p.children.remove(row);
        }
        if let Some(n) = self.arena.get_mut(node) {
            n.parent = None;
        }
        Ok(row)
    }

    /// Destroys the children at rows `pos..pos + count` together with their subtrees.
    ///
    /// All-or-nothing: an out-of-bounds range removes nothing.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_children(&mut self, parent: Index, pos: usize, count: usize) -> DomainResult<()> {
        let existing = self.child_count(parent);
        let end = pos.checked_add(count).unwrap_or(usize::MAX);
        if !self.arena.contains(parent) || end > existing {
            return Err(DomainError::RangeOutOfBounds {
                start: pos,
                end,
                count: existing,
            });
        }
        let removed: Vec<Index> = match self.arena.get_mut(parent) {
            Some(p) => p.children.drain(pos..end).collect(),
            None => Vec::new(),
        };
        for child in removed {
            self.destroy_subtree(child);
        }
        Ok(())
    }

    pub fn remove_child(&mut self, parent: Index, pos: usize) -> DomainResult<()> {
        self.remove_children(parent, pos, 1)
    }

    fn destroy_subtree(&mut self, top: Index) {
        let doomed: Vec<Index> = self.iter_postorder_from(top).map(|(idx, _)| idx).collect();
        for idx in doomed {
            self.arena.remove(idx);
        }
    }

    /// True if `ancestor` is `node` itself or lies on the parent chain of `node`.
    pub fn is_ancestor_or_self(&self, ancestor: Index, node: Index) -> bool {
        let mut current = Some(node);
        while let Some(idx) = current {
            if idx == ancestor {
                return true;
            }
            current = self.parent(idx);
        }
        false
    }

    /// Number of edges between the root and `node`; top-level rows have depth 1.
    pub fn depth_of(&self, node: Index) -> usize {
        let mut depth = 0;
        let mut current = self.parent(node);
        while let Some(idx) = current {
            depth += 1;
            current = self.parent(idx);
        }
        depth
    }

    /// Height of the tree below the root (0 for an empty document).
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.calculate_depth(self.root) - 1
    }

    fn calculate_depth(&self, node_idx: Index) -> usize {
        if let Some(node) = self.get_node(node_idx) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// Pre-order traversal over the whole tree, root first.
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self, self.root)
    }

    pub fn iter_postorder_from(&self, start: Index) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self, start)
    }
}

pub struct TreeIterator<'a> {
    arena: &'a TreeArena,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(arena: &'a TreeArena, start: Index) -> Self {
        let stack = if arena.contains(start) {
            vec![start]
        } else {
            Vec::new()
        };
        Self { arena, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        let current_idx = self.stack.pop()?;
        let node = self.arena.get_node(current_idx)?;
        // Push children in reverse order for left-to-right traversal
        for &child in node.children.iter().rev() {
            self.stack.push(child);
        }
        Some((current_idx, node))
    }
}

pub struct PostOrderIterator<'a> {
    arena: &'a TreeArena,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(arena: &'a TreeArena, start: Index) -> Self {
        let stack = if arena.contains(start) {
            vec![(start, false)]
        } else {
            Vec::new()
        };
        Self { arena, stack }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (TreeArena, Index, Index) {
        let mut tree = TreeArena::new("TreeView");
        let root = tree.root();
        let a = tree.append_child(root, "A").unwrap();
        tree.append_child(a, "A1").unwrap();
        tree.append_child(a, "A2").unwrap();
        let b = tree.append_child(root, "B").unwrap();
        (tree, a, b)
    }

    #[test]
    fn test_row_and_parent_links() {
        let (tree, a, b) = sample();
        assert_eq!(tree.row(a), 0);
        assert_eq!(tree.row(b), 1);
        assert_eq!(tree.row(tree.root()), 0);
        let a2 = tree.child(a, 1).unwrap();
        assert_eq!(tree.parent(a2), Some(a));
        assert_eq!(tree.value(a2), Some("A2"));
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.depth(), 2);
    }

    #[test]
    fn test_insert_children_rejects_position_past_end() {
        let (mut tree, a, _) = sample();
        let err = tree.insert_children(a, 3, 2, "New Item").unwrap_err();
        assert_eq!(err, DomainError::RowOutOfRange { row: 3, count: 2 });
        assert_eq!(tree.child_count(a), 2);

        assert!(matches!(
            tree.insert_children(a, 1, usize::MAX, "New Item"),
            Err(DomainError::RangeOutOfBounds { .. })
        ));
        assert_eq!(tree.child_count(a), 2);

        tree.insert_children(a, 2, 2, "New Item").unwrap();
        assert_eq!(tree.child_count(a), 4);
        assert_eq!(tree.value(tree.child(a, 3).unwrap()), Some("New Item"));
    }

    #[test]
    fn test_remove_children_destroys_subtree() {
        let (mut tree, a, b) = sample();
        let a1 = tree.child(a, 0).unwrap();
        tree.remove_child(tree.root(), 0).unwrap();
        assert!(!tree.contains(a));
        assert!(!tree.contains(a1));
        assert_eq!(tree.row(b), 0);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_remove_children_is_all_or_nothing() {
        let (mut tree, a, _) = sample();
        assert!(tree.remove_children(a, 1, 2).is_err());
        assert!(tree.remove_children(a, usize::MAX, 2).is_err());
        assert_eq!(tree.child_count(a), 2);
    }

    #[test]
    fn test_detach_and_attach_keep_identity() {
        let (mut tree, a, b) = sample();
        let a1 = tree.child(a, 0).unwrap();
        assert_eq!(tree.detach(a1).unwrap(), 0);
        assert!(tree.contains(a1));
        assert_eq!(tree.parent(a1), None);
        tree.attach(b, 0, a1).unwrap();
        assert_eq!(tree.parent(a1), Some(b));
        assert_eq!(tree.child(b, 0), Some(a1));
        assert!(tree.detach(tree.root()).is_err());
    }

    #[test]
    fn test_ancestry() {
        let (tree, a, b) = sample();
        let a1 = tree.child(a, 0).unwrap();
        assert!(tree.is_ancestor_or_self(a, a1));
        assert!(tree.is_ancestor_or_self(a, a));
        assert!(!tree.is_ancestor_or_self(b, a1));
        assert_eq!(tree.depth_of(a1), 2);
    }

    #[test]
    fn test_iterators_visit_in_order() {
        let (tree, _, _) = sample();
        let pre: Vec<&str> = tree.iter().map(|(_, n)| n.value.as_str()).collect();
        assert_eq!(pre, vec!["TreeView", "A", "A1", "A2", "B"]);
        let post: Vec<&str> = tree
            .iter_postorder_from(tree.root())
            .map(|(_, n)| n.value.as_str())
            .collect();
        assert_eq!(post, vec!["A1", "A2", "A", "B", "TreeView"]);
    }
}
