//! Topological points and their union (same-point) relation.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;

use crate::connectivity::adjacent_nodes;
use crate::hyperedge::{EdgeId, EdgeTable};

/// Identifier of a [`Node`]. Ids are supplied by the caller so they line up
/// with identifiers used elsewhere in the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Flat table of all live nodes, keyed by id. Owned by the registry;
/// components and traversals reference nodes through it.
pub type NodeTable = BTreeMap<NodeId, Node>;

/// A topological point: the endpoint of a wire or a spider.
///
/// Edges attach to a node through its `inputs` (edges where the node is a
/// target) and `outputs` (edges where it is a source). Nodes occupying the
/// same point (a spider fused with a wire endpoint) are linked through
/// `union_partners`, a symmetric relation honored by every traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    id: NodeId,
    inputs: Vec<EdgeId>,
    outputs: Vec<EdgeId>,
    union_partners: Vec<NodeId>,
}

impl Node {
    pub fn new(id: NodeId) -> Self {
        Node {
            id,
            inputs: Vec::new(),
            outputs: Vec::new(),
            union_partners: Vec::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Edges where this node appears as a target, in attachment order.
    pub fn inputs(&self) -> &[EdgeId] {
        &self.inputs
    }

    /// Edges where this node appears as a source, in attachment order.
    pub fn outputs(&self) -> &[EdgeId] {
        &self.outputs
    }

    /// Nodes declared equivalent to this one.
    pub fn union_partners(&self) -> &[NodeId] {
        &self.union_partners
    }

    /// Record `edge` as an input. Appending an edge twice is a no-op.
    pub fn append_input(&mut self, edge: EdgeId) {
        if !self.inputs.contains(&edge) {
            self.inputs.push(edge);
        }
    }

    /// Record `edge` as an output. Appending an edge twice is a no-op.
    pub fn append_output(&mut self, edge: EdgeId) {
        if !self.outputs.contains(&edge) {
            self.outputs.push(edge);
        }
    }

    pub fn remove_input(&mut self, edge: EdgeId) {
        self.inputs.retain(|&e| e != edge);
    }

    pub fn remove_output(&mut self, edge: EdgeId) {
        self.outputs.retain(|&e| e != edge);
    }

    /// Rename an edge reference in place, preserving attachment order.
    pub(crate) fn rename_edge_ref(&mut self, prev: EdgeId, new: EdgeId) {
        for e in self.inputs.iter_mut().chain(self.outputs.iter_mut()) {
            if *e == prev {
                *e = new;
            }
        }
    }

    /// Declare `a` and `b` equivalent: a bidirectional link between the two.
    ///
    /// Linking a node with itself, or relinking an existing pair, changes
    /// nothing.
    pub fn union(a: NodeId, b: NodeId, nodes: &mut NodeTable) {
        if a == b {
            return;
        }
        if let Some(node) = nodes.get_mut(&a) {
            if !node.union_partners.contains(&b) {
                node.union_partners.push(b);
            }
        }
        if let Some(node) = nodes.get_mut(&b) {
            if !node.union_partners.contains(&a) {
                node.union_partners.push(a);
            }
        }
    }

    /// All nodes reachable from `id` over union links, including `id` itself.
    ///
    /// The union sub-graph is acyclic by construction, but the traversal is
    /// visited-set-guarded and does not rely on that.
    pub fn union_closure(id: NodeId, nodes: &NodeTable) -> BTreeSet<NodeId> {
        let mut visited = BTreeSet::from([id]);
        let mut queue = VecDeque::from([id]);
        while let Some(n) = queue.pop_front() {
            if let Some(node) = nodes.get(&n) {
                for &partner in &node.union_partners {
                    if visited.insert(partner) {
                        queue.push_back(partner);
                    }
                }
            }
        }
        visited
    }

    /// The inputs of this node and of every node in its union closure,
    /// duplicate-free.
    pub fn effective_inputs(&self, nodes: &NodeTable) -> Vec<EdgeId> {
        self.effective_refs(nodes, |node| node.inputs.as_slice())
    }

    /// The outputs of this node and of every node in its union closure,
    /// duplicate-free.
    pub fn effective_outputs(&self, nodes: &NodeTable) -> Vec<EdgeId> {
        self.effective_refs(nodes, |node| node.outputs.as_slice())
    }

    fn effective_refs<'a, F>(&'a self, nodes: &'a NodeTable, refs: F) -> Vec<EdgeId>
    where
        F: Fn(&'a Node) -> &'a [EdgeId],
    {
        let mut result: Vec<EdgeId> = refs(self).to_vec();
        for member in Node::union_closure(self.id, nodes) {
            if member == self.id {
                continue;
            }
            if let Some(node) = nodes.get(&member) {
                for &edge in refs(node) {
                    if !result.contains(&edge) {
                        result.push(edge);
                    }
                }
            }
        }
        result
    }

    /// Whether `other` is reachable from this node over the combined
    /// adjacency: hyperedge traversal (in either direction) together with
    /// union links. Every node is connected to itself.
    pub fn is_connected_to<A>(
        &self,
        other: NodeId,
        nodes: &NodeTable,
        edges: &EdgeTable<A>,
    ) -> bool {
        if self.id == other {
            return true;
        }
        let mut visited = BTreeSet::from([self.id]);
        let mut queue = VecDeque::from([self.id]);
        while let Some(n) = queue.pop_front() {
            for neighbor in adjacent_nodes(n, nodes, edges) {
                if neighbor == other {
                    return true;
                }
                if visited.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }
        false
    }

    /// Unlink `id` from every union partner and scrub it from the slots of
    /// every attached edge. The edges themselves are left in place, possibly
    /// empty; whether to prune them is the owning component's decision.
    ///
    /// This is the first step of node removal. The node's own input/output
    /// lists are untouched so the caller can still see what it was attached
    /// to.
    pub fn detach<A>(id: NodeId, nodes: &mut NodeTable, edges: &mut EdgeTable<A>) {
        let (partners, inputs, outputs) = match nodes.get_mut(&id) {
            Some(node) => (
                std::mem::take(&mut node.union_partners),
                node.inputs.clone(),
                node.outputs.clone(),
            ),
            None => return,
        };
        for partner in partners {
            if let Some(node) = nodes.get_mut(&partner) {
                node.union_partners.retain(|&n| n != id);
            }
        }
        for e in inputs {
            if let Some(edge) = edges.get_mut(&e) {
                edge.remove_target_by_reference(id);
            }
        }
        for e in outputs {
            if let Some(edge) = edges.get_mut(&e) {
                edge.remove_source_by_reference(id);
            }
        }
    }
}
