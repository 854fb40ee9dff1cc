//! Shared connectivity traversals.
//!
//! Both removal paths (node removal and edge removal) need the same
//! "which of these nodes are still connected to each other?" computation,
//! so it lives here as one independently testable routine instead of being
//! duplicated at each call site.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::hyperedge::{EdgeId, EdgeTable};
use crate::node::{NodeId, NodeTable};
use crate::union_find::UnionFind;

/// Nodes adjacent to `id` in the *undirected* sense: every node sharing a
/// slot row with it on any attached edge, plus its union partners.
pub(crate) fn adjacent_nodes<A>(
    id: NodeId,
    nodes: &NodeTable,
    edges: &EdgeTable<A>,
) -> BTreeSet<NodeId> {
    let mut result = BTreeSet::new();
    let Some(node) = nodes.get(&id) else {
        return result;
    };
    for e in node.inputs().iter().chain(node.outputs().iter()) {
        if let Some(edge) = edges.get(e) {
            result.extend(edge.referenced_nodes());
        }
    }
    result.extend(node.union_partners().iter().copied());
    result.remove(&id);
    result
}

/// Nodes reachable from `seeds` by *directed* traversal: following each
/// node's output edges to their target nodes, and union links in either
/// direction. This is the closure that defines a component's node set.
pub(crate) fn closure_from_sources<A>(
    seeds: &BTreeSet<NodeId>,
    nodes: &NodeTable,
    edges: &EdgeTable<A>,
) -> BTreeSet<NodeId> {
    let mut visited: BTreeSet<NodeId> = seeds.clone();
    let mut queue: VecDeque<NodeId> = seeds.iter().copied().collect();
    while let Some(n) = queue.pop_front() {
        let Some(node) = nodes.get(&n) else {
            continue;
        };
        for e in node.outputs() {
            if let Some(edge) = edges.get(e) {
                for target in edge.ordered_targets() {
                    if visited.insert(target) {
                        queue.push_back(target);
                    }
                }
            }
        }
        for &partner in node.union_partners() {
            if visited.insert(partner) {
                queue.push_back(partner);
            }
        }
    }
    visited
}

/// The union of every member node's attached input and output edges.
pub(crate) fn attached_edges(members: &BTreeSet<NodeId>, nodes: &NodeTable) -> BTreeSet<EdgeId> {
    let mut result = BTreeSet::new();
    for n in members {
        if let Some(node) = nodes.get(n) {
            result.extend(node.inputs().iter().copied());
            result.extend(node.outputs().iter().copied());
        }
    }
    result
}

/// Partition `candidates` into groups of mutually connected nodes.
///
/// Two candidates land in the same group when one is reachable from the
/// other over the combined adjacency (hyperedge slots in either direction,
/// union links). Groups come back ordered by their smallest node id.
pub fn connected_components<A>(
    candidates: &BTreeSet<NodeId>,
    nodes: &NodeTable,
    edges: &EdgeTable<A>,
) -> Vec<BTreeSet<NodeId>> {
    let index: BTreeMap<NodeId, usize> = candidates
        .iter()
        .enumerate()
        .map(|(i, &n)| (n, i))
        .collect();

    let mut partition = UnionFind::new(candidates.len());
    for (&n, &i) in &index {
        for neighbor in adjacent_nodes(n, nodes, edges) {
            if let Some(&j) = index.get(&neighbor) {
                partition.union(i, j);
            }
        }
    }

    let mut groups: BTreeMap<usize, BTreeSet<NodeId>> = BTreeMap::new();
    for (&n, &i) in &index {
        groups.entry(partition.find(i)).or_default().insert(n);
    }
    let mut result: Vec<BTreeSet<NodeId>> = groups.into_values().collect();
    result.sort_by_key(|group| group.iter().next().copied());
    result
}
