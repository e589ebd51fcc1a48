/*
Rendering of a tree for terminal output via termtree.
Every root tree becomes one termtree::Tree labelled by node identifiers.
 */
use std::fmt::Display;

use generational_arena::Index;
use termtree::Tree;
use tracing::instrument;

use crate::domain::{Record, Tree as RecordTree};

pub trait TreeNodeConvert {
    fn to_tree_strings(&self) -> Vec<Tree<String>>;
}

impl<R> TreeNodeConvert for RecordTree<R>
where
    R: Record,
    R::Id: Display,
{
    #[instrument(level = "debug", skip(self))]
    fn to_tree_strings(&self) -> Vec<Tree<String>> {
        fn label<R: Record>(tree: &RecordTree<R>, idx: Index) -> String
        where
            R::Id: Display,
        {
            tree.node(idx)
                .and_then(|node| node.id.as_ref())
                .map(|id| id.to_string())
                .unwrap_or_else(|| "<no id>".to_string())
        }

        fn build_tree<R: Record>(tree: &RecordTree<R>, node_idx: Index, parent_tree: &mut Tree<String>)
        where
            R::Id: Display,
        {
            if let Some(node) = tree.node(node_idx) {
                for &child_idx in &node.children {
                    let mut child_tree = Tree::new(label(tree, child_idx));
                    build_tree(tree, child_idx, &mut child_tree);
                    parent_tree.push(child_tree);
                }
            }
        }

        self.root_nodes()
            .iter()
            .map(|&root_idx| {
                let mut tree = Tree::new(label(self, root_idx));
                build_tree(self, root_idx, &mut tree);
                tree
            })
            .collect()
    }
}
