//! Connected components of the diagram, called `Hypergraph` here: one
//! connected set of nodes and hyperedges with an explicit source (root) set.

use std::collections::BTreeSet;
use std::fmt;

use crate::connectivity::{attached_edges, closure_from_sources};
use crate::error::{Error, Result};
use crate::hyperedge::{EdgeId, EdgeTable};
use crate::node::{Node, NodeId, NodeTable};

/// Identifier of a [`Hypergraph`] component. Allocated by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComponentId(pub u64);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One connected fragment of the diagram.
///
/// A component is bookkeeping over the registry's flat node/edge tables: it
/// owns the *membership* of its nodes and edges (as id sets), never their
/// storage. Its node set is always the closure of `source_nodes` under
/// child-edge target traversal and union links; its edge set is every
/// member's attached edges. The registry keeps every live node and edge in
/// exactly one component.
///
/// `T` is an opaque owner tag (e.g. which drawing surface the fragment
/// belongs to); the component stores it and compares it for lookups, nothing
/// more.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hypergraph<T> {
    id: ComponentId,
    owner: Option<T>,
    source_nodes: BTreeSet<NodeId>,
    nodes: BTreeSet<NodeId>,
    edges: BTreeSet<EdgeId>,
}

impl<T> Hypergraph<T> {
    pub fn new(id: ComponentId, owner: Option<T>) -> Self {
        Hypergraph {
            id,
            owner,
            source_nodes: BTreeSet::new(),
            nodes: BTreeSet::new(),
            edges: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn owner(&self) -> Option<&T> {
        self.owner.as_ref()
    }

    pub fn into_owner(self) -> Option<T> {
        self.owner
    }

    /// The BFS roots this component's node set is derived from.
    pub fn source_nodes(&self) -> &BTreeSet<NodeId> {
        &self.source_nodes
    }

    pub fn nodes(&self) -> &BTreeSet<NodeId> {
        &self.nodes
    }

    pub fn edges(&self) -> &BTreeSet<EdgeId> {
        &self.edges
    }

    /// Member node ids in ascending order.
    pub fn all_nodes(&self) -> Vec<NodeId> {
        self.nodes.iter().copied().collect()
    }

    /// Member edge ids in ascending order.
    pub fn all_edges(&self) -> Vec<EdgeId> {
        self.edges.iter().copied().collect()
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains(&id)
    }

    pub fn contains_edge(&self, id: EdgeId) -> bool {
        self.edges.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Insert `id` and its full union closure into the component,
    /// registering each pulled-in node as a source when it has no effective
    /// inputs.
    ///
    /// The closure pull is transitive (a whole fused cluster joins at once),
    /// not a single hop. `id` must resolve in `nodes`; the registry
    /// validates ids before calling in.
    pub fn add_node(&mut self, id: NodeId, nodes: &NodeTable) {
        for member in Node::union_closure(id, nodes) {
            self.nodes.insert(member);
            if let Some(node) = nodes.get(&member) {
                if node.effective_inputs(nodes).is_empty() {
                    self.source_nodes.insert(member);
                }
            }
        }
    }

    pub fn add_nodes<I: IntoIterator<Item = NodeId>>(&mut self, ids: I, nodes: &NodeTable) {
        for id in ids {
            self.add_node(id, nodes);
        }
    }

    /// Extend the source seed set. Used when a component is freshly created
    /// from a split fragment or a merge; the caller follows up with the two
    /// rebuilds to make the component internally consistent.
    pub fn seed_sources<I: IntoIterator<Item = NodeId>>(&mut self, seeds: I) {
        self.source_nodes.extend(seeds);
    }

    /// Pop `id` from the local bookkeeping and detach it from the rest of
    /// the graph (union links, edge slots).
    ///
    /// This deliberately does *not* decide whether the removal fractured the
    /// component; recomputing global connectivity is the registry's job.
    pub fn remove_node_local<A>(
        &mut self,
        id: NodeId,
        nodes: &mut NodeTable,
        edges: &mut EdgeTable<A>,
    ) -> Result<()> {
        if !self.nodes.remove(&id) {
            return Err(Error::NodeNotInComponent {
                node: id,
                component: self.id,
            });
        }
        self.source_nodes.remove(&id);
        Node::detach(id, nodes, edges);
        Ok(())
    }

    pub fn add_edge(&mut self, id: EdgeId) {
        self.edges.insert(id);
    }

    /// Pop `id` from the local bookkeeping. The edge's storage and the
    /// references other nodes hold to it are the registry's to clean up.
    pub fn remove_edge_local(&mut self, id: EdgeId) -> Result<()> {
        if !self.edges.remove(&id) {
            return Err(Error::EdgeNotInComponent {
                edge: id,
                component: self.id,
            });
        }
        Ok(())
    }

    /// Rename an edge key. Rekeying an id onto itself succeeds as a no-op;
    /// an absent `prev` fails with `NotFound`.
    pub fn swap_edge_id(&mut self, prev: EdgeId, new: EdgeId) -> Result<()> {
        if !self.edges.contains(&prev) {
            return Err(Error::EdgeNotFound(prev));
        }
        if prev == new {
            return Ok(());
        }
        self.edges.remove(&prev);
        self.edges.insert(new);
        Ok(())
    }

    /// Re-derive the node set as the closure of `source_nodes` over
    /// child-edge targets and union links.
    pub fn rebuild_nodes_from_sources<A>(&mut self, nodes: &NodeTable, edges: &EdgeTable<A>) {
        self.nodes = closure_from_sources(&self.source_nodes, nodes, edges);
    }

    /// Re-derive the edge set as the union of every member node's attached
    /// input and output edges. Run after [`Self::rebuild_nodes_from_sources`].
    pub fn rebuild_edges_from_sources(&mut self, nodes: &NodeTable) {
        self.edges = attached_edges(&self.nodes, nodes);
    }

    /// Partition the member nodes by the union relation alone, ignoring
    /// hyperedge connectivity. Diagnostic view: each group is one fused
    /// point of the diagram.
    pub fn node_groups(&self, nodes: &NodeTable) -> Vec<Vec<NodeId>> {
        let mut seen = BTreeSet::new();
        let mut groups = Vec::new();
        for &n in &self.nodes {
            if seen.contains(&n) {
                continue;
            }
            let closure = Node::union_closure(n, nodes);
            let group: Vec<NodeId> = closure
                .iter()
                .copied()
                .filter(|member| self.nodes.contains(member))
                .collect();
            seen.extend(group.iter().copied());
            groups.push(group);
        }
        groups
    }

    /// Structural view of this component for the exporter: its id, ordered
    /// edge list with slot-ordered endpoints, node groups, and source ids.
    pub fn dump<A>(&self, nodes: &NodeTable, edges: &EdgeTable<A>) -> ComponentDump {
        ComponentDump {
            component: self.id,
            source_nodes: self.source_nodes.iter().copied().collect(),
            edges: self
                .edges
                .iter()
                .filter_map(|e| edges.get(e))
                .map(|edge| EdgeDump {
                    edge: edge.id(),
                    sources: edge.ordered_sources(),
                    targets: edge.ordered_targets(),
                })
                .collect(),
            node_groups: self.node_groups(nodes),
        }
    }
}

/// Serializable structural dump of one component. The persisted format is
/// owned by the exporter outside this crate; this is just the data it reads.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComponentDump {
    pub component: ComponentId,
    pub source_nodes: Vec<NodeId>,
    pub edges: Vec<EdgeDump>,
    pub node_groups: Vec<Vec<NodeId>>,
}

/// One hyperedge in a [`ComponentDump`], endpoints in slot order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeDump {
    pub edge: EdgeId,
    pub sources: Vec<NodeId>,
    pub targets: Vec<NodeId>,
}
