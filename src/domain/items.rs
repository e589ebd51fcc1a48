//! Reconstruction of nested plain records from a [`Tree`].

use std::collections::HashMap;

use tracing::{debug, instrument};

use crate::domain::arena::Tree;
use crate::domain::entities::Record;

/// Output record waiting for its children to be attached.
struct PendingItem<R> {
    record: R,
    children: Vec<usize>,
}

impl<R: Record> Tree<R> {
    /// Rebuild nested records from the tree, one entry per top-level item.
    ///
    /// Every record is a detached clone of the node data with its children stored under
    /// `children_key`; leaves carry no `children_key` field at all. Virtual roots appear
    /// as top-level entries, and records whose parent is a virtual root are promoted to the
    /// top level instead of being nested under it.
    #[instrument(level = "debug", skip(self))]
    pub fn get_root_items(&self) -> Vec<R> {
        let mut pending: Vec<PendingItem<R>> = Vec::new();
        let mut item_by_id: HashMap<R::Id, usize> = HashMap::new();
        let mut root_slots: Vec<usize> = Vec::new();

        self.visit(|node, _| {
            let record = R::clone(&*node.data);
            let slot = pending.len();

            let parent_slot = self
                .keys
                .parent_id_of(&record)
                .and_then(|parent_id| item_by_id.get(&parent_id).copied());
            let nest_under = parent_slot.filter(|&parent| {
                !self
                    .keys
                    .id_of(&pending[parent].record)
                    .is_some_and(|parent_id| self.is_virtual_root(&parent_id))
            });

            match nest_under {
                Some(parent) => pending[parent].children.push(slot),
                None => root_slots.push(slot),
            }
            pending.push(PendingItem {
                record,
                children: Vec::new(),
            });
            if let Some(id) = node.id.clone() {
                item_by_id.insert(id, slot);
            }
        });

        // Children always sit in later slots than their parent, so a reverse sweep
        // finishes every child before the parent takes it.
        let mut finished: Vec<Option<R>> = (0..pending.len()).map(|_| None).collect();
        for (slot, item) in pending.into_iter().enumerate().rev() {
            let PendingItem {
                mut record,
                children,
            } = item;
            let children: Vec<R> = children
                .iter()
                .filter_map(|&child| finished[child].take())
                .collect();
            self.keys.attach_children(&mut record, children);
            finished[slot] = Some(record);
        }

        let root_items: Vec<R> = root_slots
            .into_iter()
            .filter_map(|slot| finished[slot].take())
            .collect();
        debug!("Reconstructed {} root items", root_items.len());
        root_items
    }
}
