use termtree::Tree;

use crate::domain::address::format_path;
use crate::domain::arena::{NodeId, TreeArena};
use crate::domain::model::TreeModel;

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeNodeConvert for TreeArena {
    fn to_tree_string(&self) -> Tree<String> {
        fn build_tree(arena: &TreeArena, node_idx: NodeId, parent_tree: &mut Tree<String>) {
            if let Some(node) = arena.get_node(node_idx) {
                for &child_idx in &node.children {
                    if let Some(child) = arena.get_node(child_idx) {
                        let mut child_tree = Tree::new(child.value.clone());
                        build_tree(arena, child_idx, &mut child_tree);
                        parent_tree.push(child_tree);
                    }
                }
            }
        }

        let root = self.root();
        let mut tree = Tree::new(self.value(root).unwrap_or_default().to_string());
        build_tree(self, root, &mut tree);
        tree
    }
}

impl TreeNodeConvert for TreeModel {
    fn to_tree_string(&self) -> Tree<String> {
        self.tree().to_tree_string()
    }
}

/// Like [`TreeNodeConvert::to_tree_string`], but every item is prefixed with its row path.
pub fn to_tree_string_with_paths(model: &TreeModel) -> Tree<String> {
    fn build_tree(
        arena: &TreeArena,
        node_idx: NodeId,
        path: &mut Vec<usize>,
        parent_tree: &mut Tree<String>,
    ) {
        let Some(node) = arena.get_node(node_idx) else {
            return;
        };
        for (row, &child_idx) in node.children.iter().enumerate() {
            path.push(row);
            let label = format!(
                "[{}] {}",
                format_path(path),
                arena.value(child_idx).unwrap_or_default()
            );
            let mut child_tree = Tree::new(label);
            build_tree(arena, child_idx, path, &mut child_tree);
            parent_tree.push(child_tree);
            path.pop();
        }
    }

    let arena = model.tree();
    let mut tree = Tree::new(arena.value(arena.root()).unwrap_or_default().to_string());
    build_tree(arena, arena.root(), &mut Vec::new(), &mut tree);
    tree
}
