//! N-ary edges (boxes) with slot-indexed source and target endpoints.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::node::NodeId;

/// Identifier of a [`HyperEdge`]. Ids are supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeId(pub u64);

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Flat table of all live hyperedges, keyed by id. Owned by the registry.
pub type EdgeTable<A> = BTreeMap<EdgeId, HyperEdge<A>>;

/// A hyperedge: a box with an ordered row of source slots and an ordered row
/// of target slots, each slot holding one node.
///
/// Slot order is load-bearing: [`HyperEdge::ordered_sources`] and
/// [`HyperEdge::ordered_targets`] become the positional argument order when
/// the box's payload is later called. The payload itself is opaque to this
/// crate; it is stored and returned verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HyperEdge<A> {
    id: EdgeId,
    payload: Option<A>,
    source_slots: BTreeMap<usize, NodeId>,
    target_slots: BTreeMap<usize, NodeId>,
}

impl<A> HyperEdge<A> {
    pub fn new(id: EdgeId) -> Self {
        HyperEdge {
            id,
            payload: None,
            source_slots: BTreeMap::new(),
            target_slots: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> EdgeId {
        self.id
    }

    pub fn payload(&self) -> Option<&A> {
        self.payload.as_ref()
    }

    pub fn set_payload(&mut self, payload: A) {
        self.payload = Some(payload);
    }

    /// Put `node` at source slot `slot`, replacing any previous occupant.
    pub fn set_source_slot(&mut self, slot: usize, node: NodeId) {
        self.source_slots.insert(slot, node);
    }

    /// Put `node` at target slot `slot`, replacing any previous occupant.
    pub fn set_target_slot(&mut self, slot: usize, node: NodeId) {
        self.target_slots.insert(slot, node);
    }

    pub fn source_slot(&self, slot: usize) -> Option<NodeId> {
        self.source_slots.get(&slot).copied()
    }

    pub fn target_slot(&self, slot: usize) -> Option<NodeId> {
        self.target_slots.get(&slot).copied()
    }

    /// Attach `node` at the next free source slot index; returns the index.
    pub fn push_source(&mut self, node: NodeId) -> usize {
        let slot = next_slot(&self.source_slots);
        self.source_slots.insert(slot, node);
        slot
    }

    /// Attach `node` at the next free target slot index; returns the index.
    pub fn push_target(&mut self, node: NodeId) -> usize {
        let slot = next_slot(&self.target_slots);
        self.target_slots.insert(slot, node);
        slot
    }

    /// Source nodes sorted by slot index.
    pub fn ordered_sources(&self) -> Vec<NodeId> {
        self.source_slots.values().copied().collect()
    }

    /// Target nodes sorted by slot index.
    pub fn ordered_targets(&self) -> Vec<NodeId> {
        self.target_slots.values().copied().collect()
    }

    pub fn source_slots(&self) -> &BTreeMap<usize, NodeId> {
        &self.source_slots
    }

    pub fn target_slots(&self) -> &BTreeMap<usize, NodeId> {
        &self.target_slots
    }

    /// Scrub `node` from every source slot holding it. Used when a node is
    /// deleted; the edge is not removed even if it ends up with no nodes at
    /// all. That decision belongs to the owning component.
    pub fn remove_source_by_reference(&mut self, node: NodeId) {
        self.source_slots.retain(|_, n| *n != node);
    }

    /// Scrub `node` from every target slot holding it.
    pub fn remove_target_by_reference(&mut self, node: NodeId) {
        self.target_slots.retain(|_, n| *n != node);
    }

    /// Every node referenced by a slot of this edge.
    pub fn referenced_nodes(&self) -> BTreeSet<NodeId> {
        self.source_slots
            .values()
            .chain(self.target_slots.values())
            .copied()
            .collect()
    }

    /// Whether both slot rows are empty.
    pub fn is_empty(&self) -> bool {
        self.source_slots.is_empty() && self.target_slots.is_empty()
    }

    /// Change the edge's identity. Slot maps are untouched; the caller owns
    /// rekeying every table and reference that mentions the old id.
    pub fn rekey(&mut self, new_id: EdgeId) {
        self.id = new_id;
    }
}

fn next_slot(slots: &BTreeMap<usize, NodeId>) -> usize {
    slots.keys().next_back().map_or(0, |last| last + 1)
}
