//! Side table of retained descriptions.
//!
//! Each live node may remember the [`VNode`] it was last rendered from, so a
//! later patch without an explicit prior description can diff against it.
//! The table lives next to the arena, keyed by node id, and the owning
//! [`Document`](crate::Document) drops an entry when it frees the node.

use crate::VNode;
use indextree::NodeId;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub(crate) struct RetainedDescriptions {
    entries: HashMap<NodeId, VNode>,
}

impl RetainedDescriptions {
    pub(crate) fn get(&self, id: NodeId) -> Option<&VNode> {
        self.entries.get(&id)
    }

    /// Overwrites any previous entry.
    pub(crate) fn insert(&mut self, id: NodeId, vnode: VNode) {
        self.entries.insert(id, vnode);
    }

    pub(crate) fn forget(&mut self, ids: impl IntoIterator<Item = NodeId>) {
        for id in ids {
            self.entries.remove(&id);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
