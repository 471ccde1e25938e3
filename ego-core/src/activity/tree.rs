//! State-tree snapshots
//!
//! The live tree is a nest of owned structs. For logging, tests and replay
//! diffs it is flattened into a fixed-capacity arena of tagged records in
//! pre-order, so a record's index is stable for a given tree shape.

use heapless::Vec;

use super::{Node, NodeKind, ResumePoint};

/// One flattened node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NodeRecord {
    /// Pre-order index of this node
    pub index: u16,
    /// Index of the parent node (`None` for the root)
    pub parent: Option<u16>,
    /// Distance from the root
    pub depth: u8,
    /// Node tag
    pub kind: NodeKind,
    /// Resume point at capture time
    pub resume: ResumePoint,
}

/// Arena snapshot of an activity tree with room for `N` nodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTree<const N: usize> {
    records: Vec<NodeRecord, N>,
}

impl<const N: usize> StateTree<N> {
    /// Flatten `root` and all of its descendants
    ///
    /// # Panics
    ///
    /// Panics if the tree has more than `N` nodes.
    pub fn capture(root: &dyn Node) -> Self {
        let mut tree = Self {
            records: Vec::new(),
        };
        tree.visit(root, None, 0);
        tree
    }

    fn visit(&mut self, node: &dyn Node, parent: Option<u16>, depth: u8) {
        let index = self.records.len() as u16;
        let record = NodeRecord {
            index,
            parent,
            depth,
            kind: node.kind(),
            resume: node.resume_point(),
        };
        if self.records.push(record).is_err() {
            panic!("state tree does not fit into an arena of {} nodes", N);
        }
        node.for_each_child(&mut |child: &dyn Node| {
            self.visit(child, Some(index), depth.saturating_add(1))
        });
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the snapshot is empty (never true for a captured tree)
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record at `index`
    pub fn get(&self, index: u16) -> Option<&NodeRecord> {
        self.records.get(index as usize)
    }

    /// Root record
    pub fn root(&self) -> Option<&NodeRecord> {
        self.records.first()
    }

    /// All records in pre-order
    pub fn iter(&self) -> impl Iterator<Item = &NodeRecord> {
        self.records.iter()
    }

    /// Direct children of `index` in declaration order
    pub fn children_of(&self, index: u16) -> impl Iterator<Item = &NodeRecord> {
        self.records
            .iter()
            .filter(move |record| record.parent == Some(index))
    }

    /// Nodes currently suspended somewhere between entry and termination
    pub fn active_count(&self) -> usize {
        self.records
            .iter()
            .filter(|record| record.resume.is_active())
            .count()
    }

    /// Check if both snapshots come from trees of the same shape
    ///
    /// Resume points are ignored; kinds and parent links must match.
    pub fn same_shape<const M: usize>(&self, other: &StateTree<M>) -> bool {
        self.records.len() == other.records.len()
            && self
                .records
                .iter()
                .zip(other.records.iter())
                .all(|(a, b)| a.kind == b.kind && a.parent == b.parent)
    }
}
