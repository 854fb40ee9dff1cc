//! The global catalog of live components, and the only mutation surface.
//!
//! Every edit the diagram editor makes (creating a point, wiring a box,
//! fusing a spider onto a wire, deleting anything) goes through one of the
//! registry's operations. The registry resolves caller-supplied ids,
//! validates them *before* mutating anything, and afterwards repairs global
//! consistency: an attachment that bridges two components merges them, a
//! deletion that fractures a component splits it into fresh components.
//! Between any two top-level calls, every node and edge is owned by exactly
//! one component and every component's node set is the closure of its
//! sources.

use std::collections::{BTreeMap, BTreeSet};

use crate::component::{ComponentDump, ComponentId, Hypergraph};
use crate::connectivity::{attached_edges, closure_from_sources, connected_components};
use crate::error::{Error, Result};
use crate::hyperedge::{EdgeId, EdgeTable, HyperEdge};
use crate::node::{Node, NodeId, NodeTable};

/// Which side of a hyperedge an attachment lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attach {
    AsInput,
    AsOutput,
}

/// An unordered collection of live [`Hypergraph`] components over flat node
/// and edge tables.
///
/// `A` is the opaque payload type attachable to a hyperedge; `T` is the
/// opaque owner tag carried by each component. Neither is interpreted here.
///
/// The registry is single-threaded and synchronous: operations either fully
/// commit or, on a precondition failure, leave the state completely
/// unchanged. A multi-threaded caller must wrap the whole registry in a
/// mutex; the internal tables are mutated freely without synchronization.
#[derive(Debug, Clone, PartialEq)]
pub struct Registry<A, T> {
    nodes: NodeTable,
    edges: EdgeTable<A>,
    components: BTreeMap<ComponentId, Hypergraph<T>>,
    // reverse indexes, maintained by every mutating call below
    node_owner: BTreeMap<NodeId, ComponentId>,
    edge_owner: BTreeMap<EdgeId, ComponentId>,
    next_component: u64,
}

impl<A, T> Default for Registry<A, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, T> Registry<A, T> {
    pub fn new() -> Self {
        Registry {
            nodes: BTreeMap::new(),
            edges: BTreeMap::new(),
            components: BTreeMap::new(),
            node_owner: BTreeMap::new(),
            edge_owner: BTreeMap::new(),
            next_component: 0,
        }
    }

    /// Create an isolated node wrapped in a fresh singleton component, so
    /// new nodes never start inside another component. The node id comes
    /// from the caller; a duplicate id is rejected.
    pub fn create_node(&mut self, id: NodeId, owner: Option<T>) -> Result<ComponentId> {
        if self.nodes.contains_key(&id) {
            return Err(Error::NodeExists(id));
        }
        self.nodes.insert(id, Node::new(id));
        let cid = self.alloc_component_id();
        let mut component = Hypergraph::new(cid, owner);
        component.add_node(id, &self.nodes);
        log::trace!("created node {} in fresh component {}", id, cid);
        Ok(self.register_component(component))
    }

    /// Attach `node` as a target of `edge` at the next free slot, creating
    /// the edge if this is its first appearance. Returns the component
    /// owning both afterwards, merging the node's and edge's components
    /// when the attachment bridges them.
    pub fn connect_as_input(&mut self, node: NodeId, edge: EdgeId) -> Result<ComponentId> {
        self.connect(node, edge, None, Attach::AsInput)
    }

    /// Attach `node` as a source of `edge` at the next free slot.
    pub fn connect_as_output(&mut self, node: NodeId, edge: EdgeId) -> Result<ComponentId> {
        self.connect(node, edge, None, Attach::AsOutput)
    }

    /// Attach `node` as a target of `edge` at an explicit slot index.
    /// Fails when a *different* node already holds the slot; re-attaching
    /// the same node is a successful no-op.
    pub fn connect_as_input_at(
        &mut self,
        node: NodeId,
        edge: EdgeId,
        slot: usize,
    ) -> Result<ComponentId> {
        self.connect(node, edge, Some(slot), Attach::AsInput)
    }

    /// Attach `node` as a source of `edge` at an explicit slot index.
    pub fn connect_as_output_at(
        &mut self,
        node: NodeId,
        edge: EdgeId,
        slot: usize,
    ) -> Result<ComponentId> {
        self.connect(node, edge, Some(slot), Attach::AsOutput)
    }

    fn connect(
        &mut self,
        node_id: NodeId,
        edge_id: EdgeId,
        slot: Option<usize>,
        side: Attach,
    ) -> Result<ComponentId> {
        let cn = *self
            .node_owner
            .get(&node_id)
            .ok_or(Error::NodeNotFound(node_id))?;
        let ce = self.edge_owner.get(&edge_id).copied();

        // an explicit slot is validated before anything is mutated
        if let (Some(slot), Some(_)) = (slot, ce) {
            let edge = self.edges.get(&edge_id).expect("owned edge is in the table");
            let occupant = match side {
                Attach::AsInput => edge.target_slot(slot),
                Attach::AsOutput => edge.source_slot(slot),
            };
            match occupant {
                Some(existing) if existing == node_id => return Ok(cn),
                Some(existing) => {
                    return Err(Error::SlotOccupied {
                        edge: edge_id,
                        slot,
                        occupant: existing,
                    })
                }
                None => {}
            }
        }

        let owning = match ce {
            None => {
                // first attachment: the edge is created inside the node's
                // component, no merge needed
                self.edges.insert(edge_id, HyperEdge::new(edge_id));
                self.edge_owner.insert(edge_id, cn);
                self.components
                    .get_mut(&cn)
                    .expect("owner index points at a live component")
                    .add_edge(edge_id);
                log::trace!("created hyperedge {} in component {}", edge_id, cn);
                cn
            }
            Some(ce) if ce == cn => cn,
            Some(ce) => {
                log::debug!(
                    "attaching node {} to hyperedge {} bridges components {} and {}",
                    node_id,
                    edge_id,
                    cn,
                    ce
                );
                self.merge_components(&[cn, ce])?
            }
        };

        let edge = self
            .edges
            .get_mut(&edge_id)
            .expect("attached edge is in the table");
        match (side, slot) {
            (Attach::AsInput, Some(slot)) => edge.set_target_slot(slot, node_id),
            (Attach::AsInput, None) => {
                edge.push_target(node_id);
            }
            (Attach::AsOutput, Some(slot)) => edge.set_source_slot(slot, node_id),
            (Attach::AsOutput, None) => {
                edge.push_source(node_id);
            }
        }
        let node = self
            .nodes
            .get_mut(&node_id)
            .expect("owned node is in the table");
        match side {
            Attach::AsInput => node.append_input(edge_id),
            Attach::AsOutput => node.append_output(edge_id),
        }
        Ok(owning)
    }

    /// Declare two nodes equivalent (a spider fusing with a wire endpoint),
    /// merging their components when they were separate. Calling this twice
    /// for the same pair changes nothing further.
    pub fn union_nodes(&mut self, node: NodeId, other: NodeId) -> Result<ComponentId> {
        let cn = *self.node_owner.get(&node).ok_or(Error::NodeNotFound(node))?;
        let co = *self
            .node_owner
            .get(&other)
            .ok_or(Error::NodeNotFound(other))?;
        if node == other {
            return Ok(cn);
        }
        let owning = if cn == co {
            cn
        } else {
            log::debug!(
                "union of nodes {} and {} merges components {} and {}",
                node,
                other,
                cn,
                co
            );
            self.merge_components(&[cn, co])?
        };
        Node::union(node, other, &mut self.nodes);
        Ok(owning)
    }

    /// Replace the listed components with one fresh component: sources are
    /// seeded with the union of every operand's source set, then the node
    /// and edge sets are rebuilt from them. The owner tag is inherited from
    /// the first operand.
    pub fn merge_components(&mut self, ids: &[ComponentId]) -> Result<ComponentId> {
        let mut operand_ids: Vec<ComponentId> = Vec::new();
        for &id in ids {
            if !self.components.contains_key(&id) {
                return Err(Error::ComponentNotFound(id));
            }
            if !operand_ids.contains(&id) {
                operand_ids.push(id);
            }
        }
        if operand_ids.is_empty() {
            return Err(Error::MergeWithoutOperands);
        }

        let merged_id = self.alloc_component_id();
        let mut operands = Vec::with_capacity(operand_ids.len());
        for id in &operand_ids {
            operands.push(
                self.deregister_component(*id)
                    .expect("operand validated above"),
            );
        }
        let mut seeds = BTreeSet::new();
        for operand in &operands {
            seeds.extend(operand.source_nodes().iter().copied());
        }
        let owner = operands.into_iter().next().and_then(Hypergraph::into_owner);

        let mut merged = Hypergraph::new(merged_id, owner);
        merged.seed_sources(seeds);
        merged.rebuild_nodes_from_sources(&self.nodes, &self.edges);
        merged.rebuild_edges_from_sources(&self.nodes);
        log::debug!("merged components {:?} into {}", operand_ids, merged_id);
        Ok(self.register_component(merged))
    }

    /// Remove a node: detach it everywhere, prune any hyperedge left with
    /// no endpoints at all, then recompute connectivity over the remaining
    /// member nodes. When the removal fractured the component, it is
    /// replaced by one fresh component per surviving group.
    pub fn remove_node(&mut self, id: NodeId) -> Result<()>
    where
        T: Clone,
    {
        let cid = *self.node_owner.get(&id).ok_or(Error::NodeNotFound(id))?;
        let (inputs, outputs) = {
            let node = self.nodes.get(&id).expect("owned node is in the table");
            (node.inputs().to_vec(), node.outputs().to_vec())
        };

        self.components
            .get_mut(&cid)
            .expect("owner index points at a live component")
            .remove_node_local(id, &mut self.nodes, &mut self.edges)?;
        self.nodes.remove(&id);
        self.node_owner.remove(&id);

        for e in inputs.into_iter().chain(outputs) {
            if self.edges.get(&e).is_some_and(|edge| edge.is_empty()) {
                self.edges.remove(&e);
                self.edge_owner.remove(&e);
                self.components
                    .get_mut(&cid)
                    .expect("owner index points at a live component")
                    .remove_edge_local(e)
                    .expect("pruned edge is in its owning component");
                log::trace!("pruned empty hyperedge {}", e);
            }
        }

        log::trace!("removed node {} from component {}", id, cid);
        self.resplit(cid);
        Ok(())
    }

    /// Remove a hyperedge: scrub every node-side reference to it, then
    /// recompute connectivity over the component's member nodes, splitting
    /// when the edge was the last thing holding groups together.
    pub fn remove_hyper_edge(&mut self, id: EdgeId) -> Result<()>
    where
        T: Clone,
    {
        let cid = *self.edge_owner.get(&id).ok_or(Error::EdgeNotFound(id))?;
        let edge = self.edges.remove(&id).expect("owned edge is in the table");
        self.edge_owner.remove(&id);
        for n in edge.referenced_nodes() {
            if let Some(node) = self.nodes.get_mut(&n) {
                node.remove_input(id);
                node.remove_output(id);
            }
        }
        self.components
            .get_mut(&cid)
            .expect("owner index points at a live component")
            .remove_edge_local(id)
            .expect("edge is in its owning component");
        log::trace!("removed hyperedge {} from component {}", id, cid);
        self.resplit(cid);
        Ok(())
    }

    /// Rename a hyperedge id everywhere it appears. Rekeying an id onto
    /// itself succeeds as a no-op; an unknown `prev` fails with `NotFound`;
    /// a `new` id that already names a different edge fails without
    /// changing anything.
    pub fn swap_hyper_edge_id(&mut self, prev: EdgeId, new: EdgeId) -> Result<()> {
        let cid = *self.edge_owner.get(&prev).ok_or(Error::EdgeNotFound(prev))?;
        if prev == new {
            return Ok(());
        }
        if self.edges.contains_key(&new) {
            return Err(Error::EdgeIdOccupied { prev, new });
        }

        self.components
            .get_mut(&cid)
            .expect("owner index points at a live component")
            .swap_edge_id(prev, new)
            .expect("edge is in its owning component");

        let mut edge = self.edges.remove(&prev).expect("owned edge is in the table");
        for n in edge.referenced_nodes() {
            if let Some(node) = self.nodes.get_mut(&n) {
                node.rename_edge_ref(prev, new);
            }
        }
        edge.rekey(new);
        self.edges.insert(new, edge);
        self.edge_owner.remove(&prev);
        self.edge_owner.insert(new, cid);
        log::trace!("rekeyed hyperedge {} to {}", prev, new);
        Ok(())
    }

    /// Store the opaque payload on an existing hyperedge.
    pub fn set_payload(&mut self, edge: EdgeId, payload: A) -> Result<()> {
        self.edges
            .get_mut(&edge)
            .ok_or(Error::EdgeNotFound(edge))?
            .set_payload(payload);
        Ok(())
    }

    /// The payload previously stored on `edge`, verbatim.
    pub fn payload(&self, edge: EdgeId) -> Option<&A> {
        self.edges.get(&edge).and_then(HyperEdge::payload)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn hyper_edge(&self, id: EdgeId) -> Option<&HyperEdge<A>> {
        self.edges.get(&id)
    }

    pub fn component(&self, id: ComponentId) -> Option<&Hypergraph<T>> {
        self.components.get(&id)
    }

    pub fn component_of_node(&self, id: NodeId) -> Option<&Hypergraph<T>> {
        self.components.get(self.node_owner.get(&id)?)
    }

    pub fn component_of_edge(&self, id: EdgeId) -> Option<&Hypergraph<T>> {
        self.components.get(self.edge_owner.get(&id)?)
    }

    /// Every component carrying the given owner tag.
    pub fn components_of(&self, owner: &T) -> Vec<&Hypergraph<T>>
    where
        T: PartialEq,
    {
        self.components
            .values()
            .filter(|c| c.owner() == Some(owner))
            .collect()
    }

    pub fn components(&self) -> impl Iterator<Item = &Hypergraph<T>> {
        self.components.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty() && self.components.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.components.clear();
        self.node_owner.clear();
        self.edge_owner.clear();
        self.next_component = 0;
    }

    /// Structural dump of every component, ordered by component id.
    pub fn dump(&self) -> Vec<ComponentDump> {
        self.components
            .values()
            .map(|c| c.dump(&self.nodes, &self.edges))
            .collect()
    }

    /// Check every registry invariant, returning a human-readable line per
    /// violation. An empty result means the registry is consistent.
    pub fn check_consistency(&self) -> Vec<String> {
        let mut problems = Vec::new();

        for component in self.components.values() {
            let closure = closure_from_sources(component.source_nodes(), &self.nodes, &self.edges);
            if &closure != component.nodes() {
                problems.push(format!(
                    "component {}: node set differs from source closure",
                    component.id()
                ));
            }
            if !component.source_nodes().is_subset(component.nodes()) {
                problems.push(format!(
                    "component {}: source nodes outside the node set",
                    component.id()
                ));
            }
            let derived = attached_edges(component.nodes(), &self.nodes);
            if &derived != component.edges() {
                problems.push(format!(
                    "component {}: edge set differs from members' attached edges",
                    component.id()
                ));
            }
        }

        let mut node_owners: BTreeMap<NodeId, usize> = BTreeMap::new();
        let mut edge_owners: BTreeMap<EdgeId, usize> = BTreeMap::new();
        for component in self.components.values() {
            for &n in component.nodes() {
                *node_owners.entry(n).or_default() += 1;
            }
            for &e in component.edges() {
                *edge_owners.entry(e).or_default() += 1;
            }
        }
        for (n, count) in &node_owners {
            if *count > 1 {
                problems.push(format!("node {} belongs to {} components", n, count));
            }
            if !self.nodes.contains_key(n) {
                problems.push(format!("component member node {} is not in the table", n));
            }
        }
        for (e, count) in &edge_owners {
            if *count > 1 {
                problems.push(format!("hyperedge {} belongs to {} components", e, count));
            }
            if !self.edges.contains_key(e) {
                problems.push(format!("component member edge {} is not in the table", e));
            }
        }
        for n in self.nodes.keys() {
            if !node_owners.contains_key(n) {
                problems.push(format!("node {} is in no component", n));
            }
            match self.node_owner.get(n) {
                None => problems.push(format!("node {} has no owner index entry", n)),
                Some(cid) => {
                    if !self
                        .components
                        .get(cid)
                        .is_some_and(|c| c.contains_node(*n))
                    {
                        problems.push(format!(
                            "node {}: owner index points at component {} which does not contain it",
                            n, cid
                        ));
                    }
                }
            }
        }
        for e in self.edges.keys() {
            if !edge_owners.contains_key(e) {
                problems.push(format!("hyperedge {} is in no component", e));
            }
            match self.edge_owner.get(e) {
                None => problems.push(format!("hyperedge {} has no owner index entry", e)),
                Some(cid) => {
                    if !self
                        .components
                        .get(cid)
                        .is_some_and(|c| c.contains_edge(*e))
                    {
                        problems.push(format!(
                            "hyperedge {}: owner index points at component {} which does not contain it",
                            e, cid
                        ));
                    }
                }
            }
        }

        for (eid, edge) in &self.edges {
            for n in edge.referenced_nodes() {
                if !self.nodes.contains_key(&n) {
                    problems.push(format!("hyperedge {} references unknown node {}", eid, n));
                }
            }
        }
        for (nid, node) in &self.nodes {
            for e in node.inputs().iter().chain(node.outputs().iter()) {
                if !self.edges.contains_key(e) {
                    problems.push(format!("node {} references unknown hyperedge {}", nid, e));
                }
            }
            for &p in node.union_partners() {
                match self.nodes.get(&p) {
                    None => problems.push(format!("node {} has unknown union partner {}", nid, p)),
                    Some(partner) => {
                        if !partner.union_partners().contains(nid) {
                            problems.push(format!("union link {} -> {} is not symmetric", nid, p));
                        }
                    }
                }
            }
        }

        problems
    }

    fn alloc_component_id(&mut self) -> ComponentId {
        let id = ComponentId(self.next_component);
        self.next_component += 1;
        id
    }

    fn register_component(&mut self, component: Hypergraph<T>) -> ComponentId {
        let id = component.id();
        for &n in component.nodes() {
            self.node_owner.insert(n, id);
        }
        for &e in component.edges() {
            self.edge_owner.insert(e, id);
        }
        self.components.insert(id, component);
        id
    }

    fn deregister_component(&mut self, id: ComponentId) -> Option<Hypergraph<T>> {
        let component = self.components.remove(&id)?;
        for n in component.nodes() {
            if self.node_owner.get(n) == Some(&id) {
                self.node_owner.remove(n);
            }
        }
        for e in component.edges() {
            if self.edge_owner.get(e) == Some(&id) {
                self.edge_owner.remove(e);
            }
        }
        Some(component)
    }

    /// Partition a component's remaining member nodes into connectivity
    /// groups after a removal. A single surviving group (or none) leaves the
    /// component as it is; more than one replaces it with a fresh component
    /// per group, each seeded with its whole group and rebuilt.
    fn resplit(&mut self, cid: ComponentId)
    where
        T: Clone,
    {
        let remaining = self
            .components
            .get(&cid)
            .expect("owner index points at a live component")
            .nodes()
            .clone();
        let groups = connected_components(&remaining, &self.nodes, &self.edges);
        if groups.len() <= 1 {
            return;
        }

        let old = self
            .deregister_component(cid)
            .expect("split component is live");
        log::debug!("component {} split into {} fragments", cid, groups.len());
        for group in groups {
            let fresh = self.alloc_component_id();
            let mut fragment = Hypergraph::new(fresh, old.owner().cloned());
            fragment.seed_sources(group);
            fragment.rebuild_nodes_from_sources(&self.nodes, &self.edges);
            fragment.rebuild_edges_from_sources(&self.nodes);
            self.register_component(fragment);
        }
    }
}
