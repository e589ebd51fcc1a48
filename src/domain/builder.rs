//! Tree builder: turns flat parent-linked records into a [`Tree`].

use std::rc::Rc;

use generational_arena::Index;
use tracing::{debug, instrument, trace};

use crate::config::TreeOptions;
use crate::domain::arena::{Tree, TreeNode};
use crate::domain::entities::Record;

/// Collects items, extra items and options, then builds the tree in one go.
///
/// Construction never fails: records without an identifier or with an unknown parent
/// identifier become roots. Duplicated identifiers resolve last-write-wins, both for
/// lookup and for the children that name them as parent.
#[derive(Debug)]
pub struct TreeBuilder<R: Record> {
    items: Vec<Rc<R>>,
    extra_items: Vec<Rc<R>>,
    options: TreeOptions,
}

impl<R: Record> Default for TreeBuilder<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> TreeBuilder<R> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            extra_items: Vec::new(),
            options: TreeOptions::default(),
        }
    }

    /// Append records to the main collection. Parents may come after their children.
    pub fn items<I>(mut self, items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Rc<R>>,
    {
        self.items.extend(items.into_iter().map(Into::into));
        self
    }

    /// Add one virtual root.
    pub fn extra_item(mut self, item: impl Into<Rc<R>>) -> Self {
        self.extra_items.push(item.into());
        self
    }

    /// Add virtual roots, kept in the given order ahead of every item root.
    pub fn extra_items<I>(mut self, items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Rc<R>>,
    {
        self.extra_items.extend(items.into_iter().map(Into::into));
        self
    }

    pub fn options(mut self, options: TreeOptions) -> Self {
        self.options = options;
        self
    }

    #[instrument(
        level = "debug",
        skip(self),
        fields(items = self.items.len(), extra_items = self.extra_items.len())
    )]
    pub fn build(self) -> Tree<R> {
        let TreeBuilder {
            items,
            extra_items,
            options,
        } = self;
        let mut tree: Tree<R> = Tree::empty(options);

        for record in extra_items {
            let id = tree.keys.id_of(&*record);
            let idx = tree.arena.insert(TreeNode::new(id.clone(), record));
            tree.root_nodes.push(idx);
            if let Some(id) = id {
                tree.extra_nodes.insert(id, idx);
            }
        }

        if items.is_empty() {
            debug!("No items, tree holds {} virtual roots", tree.root_nodes.len());
            return tree;
        }

        // First pass: create and index every node, so linkage does not depend on input order
        let created: Vec<Index> = items
            .into_iter()
            .map(|record| {
                let id = tree.keys.id_of(&*record);
                let idx = tree.arena.insert(TreeNode::new(id.clone(), record));
                if let Some(id) = id {
                    tree.node_by_id.insert(id, idx);
                }
                idx
            })
            .collect();

        // Second pass: link in input order
        for idx in created {
            tree.link(idx);
        }

        debug!(
            "Built tree: {} nodes, {} roots, {} virtual roots",
            tree.arena.len(),
            tree.root_nodes.len(),
            tree.extra_nodes.len()
        );
        tree
    }
}

impl<R: Record> Tree<R> {
    /// Build a tree from items, extra items and options.
    ///
    /// A single extra item can be passed as `Some(record)` or `[record]`, none as `None`.
    pub fn new<I, E>(items: I, extra_items: E, options: TreeOptions) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Rc<R>>,
        E: IntoIterator,
        E::Item: Into<Rc<R>>,
    {
        TreeBuilder::new()
            .items(items)
            .extra_items(extra_items)
            .options(options)
            .build()
    }

    /// Attach `idx` under the item node named by its parent id, or make it a root.
    #[instrument(level = "trace", skip(self))]
    fn link(&mut self, idx: Index) {
        let Some(node) = self.arena.get(idx) else {
            return;
        };
        let id = node.id.clone();
        let parent = self
            .keys
            .parent_id_of(&*node.data)
            .and_then(|parent_id| self.node_by_id.get(&parent_id).copied());

        match parent {
            Some(parent_idx) => {
                if let Some(node) = self.arena.get_mut(idx) {
                    node.parent = Some(parent_idx);
                }
                if let Some(parent) = self.arena.get_mut(parent_idx) {
                    parent.children.push(idx);
                }
                trace!("Linked {:?} under {:?}", id, parent_idx);
            }
            None => {
                if let Some(node) = self.arena.get_mut(idx) {
                    node.parent = None;
                }
                self.root_nodes.push(idx);
                trace!("Linked {:?} as root", id);
            }
        }

        // Nodes of the first pass are all indexed already; only a node whose id went
        // missing from the index gets its subtree registered again.
        if let Some(id) = id {
            if !self.node_by_id.contains_key(&id) {
                self.reindex_subtree(idx);
            }
        }
    }

    /// Register every node of the subtree at `start` under its own id.
    fn reindex_subtree(&mut self, start: Index) {
        for idx in self.subtree_indices(start) {
            if let Some(id) = self.arena.get(idx).and_then(|node| node.id.clone()) {
                trace!("Re-indexing {:?} -> {:?}", id, idx);
                self.node_by_id.insert(id, idx);
            }
        }
    }
}
