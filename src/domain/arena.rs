use std::collections::HashMap;
use std::rc::Rc;

use generational_arena::{Arena, Index};
use tracing::{debug, instrument, trace};

use crate::config::TreeOptions;
use crate::domain::entities::{Record, RecordKeys};
use crate::errors::{TreeError, TreeResult};

/// Tree node in the arena-based hierarchy structure.
#[derive(Debug)]
pub struct TreeNode<R: Record> {
    /// Identifier read from the record, None if the record has none
    pub id: Option<R::Id>,
    /// The caller's record, shared not copied
    pub data: Rc<R>,
    /// Index of the parent node in the arena, None for root nodes
    pub parent: Option<Index>,
    /// Indices of child nodes in the arena, in linkage order
    pub children: Vec<Index>,
}

impl<R: Record> TreeNode<R> {
    pub(crate) fn new(id: Option<R::Id>, data: Rc<R>) -> Self {
        Self {
            id,
            data,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Names the sibling list a filter pass works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Siblings {
    /// The tree's root list
    Roots,
    /// The children of the node at this index
    ChildrenOf(Index),
}

/// Multi-root tree over records, built by [`TreeBuilder`](crate::domain::TreeBuilder).
///
/// Nodes live in a generational arena and link to each other by index. Nodes from
/// `items` are indexed by id in `node_by_id`; nodes from extra items are virtual roots
/// indexed separately in `extra_nodes` and never receive children.
#[derive(Debug)]
pub struct Tree<R: Record> {
    pub(crate) arena: Arena<TreeNode<R>>,
    pub(crate) options: TreeOptions,
    pub(crate) keys: RecordKeys,
    pub(crate) node_by_id: HashMap<R::Id, Index>,
    pub(crate) root_nodes: Vec<Index>,
    pub(crate) extra_nodes: HashMap<R::Id, Index>,
}

impl<R: Record> Tree<R> {
    pub(crate) fn empty(options: TreeOptions) -> Self {
        Self {
            arena: Arena::new(),
            keys: RecordKeys::resolve(&options),
            options,
            node_by_id: HashMap::new(),
            root_nodes: Vec::new(),
            extra_nodes: HashMap::new(),
        }
    }

    pub fn options(&self) -> &TreeOptions {
        &self.options
    }

    pub fn root_nodes(&self) -> &[Index] {
        &self.root_nodes
    }

    #[instrument(level = "trace", skip(self))]
    pub fn node(&self, idx: Index) -> Option<&TreeNode<R>> {
        self.arena.get(idx)
    }

    /// Arena index for `id`, preferring item nodes over virtual roots.
    pub fn index_of(&self, id: &R::Id) -> Option<Index> {
        self.node_by_id
            .get(id)
            .or_else(|| self.extra_nodes.get(id))
            .copied()
    }

    /// Look up a node by identifier: item nodes first, then virtual roots.
    #[instrument(level = "trace", skip(self))]
    pub fn get_node_by_id(&self, id: &R::Id) -> Option<&TreeNode<R>> {
        self.index_of(id).and_then(|idx| self.arena.get(idx))
    }

    /// True if `id` names a node created from the extra items.
    pub fn is_virtual_root(&self, id: &R::Id) -> bool {
        self.extra_nodes.contains_key(id)
    }

    /// Pre-order walk over every root tree, in root order.
    ///
    /// The callback receives each node and the node the walk came from (`None` for roots).
    pub fn visit<F>(&self, mut callback: F)
    where
        F: FnMut(&TreeNode<R>, Option<&TreeNode<R>>),
    {
        for &root in &self.root_nodes {
            self.visit_node(root, None, &mut callback);
        }
    }

    /// Pre-order walk over the subtree rooted at `start`.
    pub fn visit_from<F>(&self, start: Index, mut callback: F) -> TreeResult<()>
    where
        F: FnMut(&TreeNode<R>, Option<&TreeNode<R>>),
    {
        if !self.arena.contains(start) {
            return Err(TreeError::NodeNotFound(start));
        }
        self.visit_node(start, None, &mut callback);
        Ok(())
    }

    fn visit_node<F>(&self, idx: Index, parent: Option<&TreeNode<R>>, callback: &mut F)
    where
        F: FnMut(&TreeNode<R>, Option<&TreeNode<R>>),
    {
        if let Some(node) = self.arena.get(idx) {
            callback(node, parent);
            for &child in &node.children {
                self.visit_node(child, Some(node), callback);
            }
        }
    }

    /// Indices of the subtree rooted at `start`, pre-order.
    pub(crate) fn subtree_indices(&self, start: Index) -> Vec<Index> {
        let mut indices = Vec::new();
        let mut stack = vec![start];
        while let Some(idx) = stack.pop() {
            if let Some(node) = self.arena.get(idx) {
                indices.push(idx);
                stack.extend(node.children.iter().rev());
            }
        }
        indices
    }

    /// Prune every root tree in place, keeping only nodes for which `predicate` holds.
    #[instrument(level = "debug", skip_all)]
    pub fn filter<F>(&mut self, mut predicate: F)
    where
        F: FnMut(&TreeNode<R>) -> bool,
    {
        let before = self.len();
        self.filter_siblings(Siblings::Roots, &mut predicate);
        debug!("Filtered tree: {} -> {} reachable nodes", before, self.len());
    }

    /// Prune the given sibling list in place.
    ///
    /// Children are filtered before their parent is tested. A node failing the predicate
    /// is removed from `siblings` together with its subtree.
    #[instrument(level = "debug", skip(self, predicate))]
    pub fn filter_from<F>(&mut self, siblings: Siblings, mut predicate: F) -> TreeResult<()>
    where
        F: FnMut(&TreeNode<R>) -> bool,
    {
        if let Siblings::ChildrenOf(idx) = siblings {
            if !self.arena.contains(idx) {
                return Err(TreeError::NodeNotFound(idx));
            }
        }
        self.filter_siblings(siblings, &mut predicate);
        Ok(())
    }

    fn sibling_list(&self, siblings: Siblings) -> Option<&Vec<Index>> {
        match siblings {
            Siblings::Roots => Some(&self.root_nodes),
            Siblings::ChildrenOf(idx) => self.arena.get(idx).map(|node| &node.children),
        }
    }

    fn sibling_list_mut(&mut self, siblings: Siblings) -> Option<&mut Vec<Index>> {
        match siblings {
            Siblings::Roots => Some(&mut self.root_nodes),
            Siblings::ChildrenOf(idx) => self.arena.get_mut(idx).map(|node| &mut node.children),
        }
    }

    // Reverse iteration: removing position `pos` leaves lower positions untouched.
    fn filter_siblings<F>(&mut self, siblings: Siblings, predicate: &mut F)
    where
        F: FnMut(&TreeNode<R>) -> bool,
    {
        let mut pos = self.sibling_list(siblings).map_or(0, Vec::len);
        while pos > 0 {
            pos -= 1;
            let Some(idx) = self.sibling_list(siblings).and_then(|list| list.get(pos)).copied()
            else {
                continue;
            };

            let has_children = self.arena.get(idx).is_some_and(|node| !node.is_leaf());
            if has_children {
                self.filter_siblings(Siblings::ChildrenOf(idx), predicate);
            }

            let keep = self.arena.get(idx).is_some_and(|node| predicate(node));
            if !keep {
                trace!("Removing {:?} from {:?} at position {}", idx, siblings, pos);
                if let Some(list) = self.sibling_list_mut(siblings) {
                    list.remove(pos);
                }
            }
        }
    }

    /// Number of nodes reachable from the roots.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.root_nodes.is_empty()
    }

    #[instrument(level = "trace", skip(self))]
    pub fn iter(&self) -> TreeIterator<'_, R> {
        TreeIterator::new(self)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn iter_postorder(&self) -> PostOrderIterator<'_, R> {
        PostOrderIterator::new(self)
    }

    /// Height of the tallest root tree, 0 for an empty tree.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.root_nodes
            .iter()
            .map(|&root| self.calculate_depth(root))
            .max()
            .unwrap_or(0)
    }

    fn calculate_depth(&self, node_idx: Index) -> usize {
        if let Some(node) = self.arena.get(node_idx) {
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

    /// Reachable nodes without children, pre-order.
    #[instrument(level = "debug", skip(self))]
    pub fn leaf_nodes(&self) -> Vec<&TreeNode<R>> {
        self.iter()
            .map(|(_, node)| node)
            .filter(|node| node.is_leaf())
            .collect()
    }
}

/// Pre-order iterator over all root trees.
pub struct TreeIterator<'a, R: Record> {
    tree: &'a Tree<R>,
    stack: Vec<Index>,
}

impl<'a, R: Record> TreeIterator<'a, R> {
    fn new(tree: &'a Tree<R>) -> Self {
        let stack = tree.root_nodes.iter().rev().copied().collect();
        Self { tree, stack }
    }
}

impl<'a, R: Record> Iterator for TreeIterator<'a, R> {
    type Item = (Index, &'a TreeNode<R>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.tree.arena.get(current_idx) {
                // Push children in reverse order for left-to-right traversal
                self.stack.extend(node.children.iter().rev());
                return Some((current_idx, node));
            }
        }
        None
    }
}

/// Post-order iterator over all root trees.
pub struct PostOrderIterator<'a, R: Record> {
    tree: &'a Tree<R>,
    stack: Vec<(Index, bool)>,
}

impl<'a, R: Record> PostOrderIterator<'a, R> {
    fn new(tree: &'a Tree<R>) -> Self {
        let stack = tree
            .root_nodes
            .iter()
            .rev()
            .map(|&root| (root, false))
            .collect();
        Self { tree, stack }
    }
}

impl<'a, R: Record> Iterator for PostOrderIterator<'a, R> {
    type Item = (Index, &'a TreeNode<R>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.tree.arena.get(current_idx) {
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
