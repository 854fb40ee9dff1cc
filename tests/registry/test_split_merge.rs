use incremental_hypergraphs::component::ComponentId;
use incremental_hypergraphs::error::Error;
use incremental_hypergraphs::hyperedge::EdgeId;
use incremental_hypergraphs::node::NodeId;
use incremental_hypergraphs::registry::Registry;

type TestRegistry = Registry<&'static str, &'static str>;

const A: NodeId = NodeId(1);
const B: NodeId = NodeId(2);
const C: NodeId = NodeId(3);
const X: NodeId = NodeId(10);
const Y: NodeId = NodeId(11);
const E1: EdgeId = EdgeId(1);
const E2: EdgeId = EdgeId(2);

/// A -(e1)-> B -(e2)-> C, all in one component.
fn chain() -> TestRegistry {
    let mut registry = TestRegistry::new();
    registry.create_node(A, None).unwrap();
    registry.create_node(B, None).unwrap();
    registry.create_node(C, None).unwrap();
    registry.connect_as_output(A, E1).unwrap();
    registry.connect_as_input(B, E1).unwrap();
    registry.connect_as_output(B, E2).unwrap();
    registry.connect_as_input(C, E2).unwrap();
    assert_eq!(registry.component_count(), 1);
    registry
}

#[test]
fn test_attachment_bridging_two_components_merges_them() {
    let mut registry = TestRegistry::new();
    registry.create_node(X, None).unwrap();
    registry.create_node(Y, None).unwrap();
    assert_eq!(registry.component_count(), 2);

    registry.connect_as_input(X, E1).unwrap();
    let merged = registry.connect_as_output(Y, E1).unwrap();

    assert_eq!(registry.component_count(), 1);
    let component = registry.component(merged).unwrap();
    assert!(component.contains_node(X));
    assert!(component.contains_node(Y));
    assert!(component.contains_edge(E1));

    let edge = registry.hyper_edge(E1).unwrap();
    assert_eq!(edge.target_slot(0), Some(X));
    assert_eq!(edge.source_slot(0), Some(Y));
    assert!(registry.check_consistency().is_empty());
}

#[test]
fn test_removing_a_cut_node_splits_the_component() {
    let mut registry = chain();

    registry.remove_node(B).unwrap();

    assert_eq!(registry.component_count(), 2);
    let with_a = registry.component_of_node(A).unwrap();
    let with_c = registry.component_of_node(C).unwrap();
    assert_ne!(with_a.id(), with_c.id());
    assert_eq!(with_a.all_nodes(), vec![A]);
    assert_eq!(with_c.all_nodes(), vec![C]);
    assert!(!with_a.contains_node(C));
    assert!(!with_c.contains_node(A));
    // the half-open edges stay with their surviving endpoint
    assert!(with_a.contains_edge(E1));
    assert!(with_c.contains_edge(E2));
    assert!(registry.check_consistency().is_empty());
}

#[test]
fn test_removing_a_bridging_edge_splits_the_component() {
    let mut registry = chain();

    registry.remove_hyper_edge(E1).unwrap();

    assert_eq!(registry.component_count(), 2);
    let with_a = registry.component_of_node(A).unwrap();
    let with_b = registry.component_of_node(B).unwrap();
    assert_ne!(with_a.id(), with_b.id());
    assert_eq!(with_a.all_nodes(), vec![A]);
    assert_eq!(with_b.all_nodes(), vec![B, C]);
    assert!(registry.hyper_edge(E1).is_none());
    assert!(registry.check_consistency().is_empty());
}

#[test]
fn test_removing_a_non_cut_element_does_not_split() {
    let mut registry = chain();
    // an extra wire A -(e3)-> C keeps everything connected without B
    registry.connect_as_output(A, EdgeId(3)).unwrap();
    registry.connect_as_input(C, EdgeId(3)).unwrap();

    registry.remove_node(B).unwrap();

    assert_eq!(registry.component_count(), 1);
    let component = registry.component_of_node(A).unwrap();
    assert!(component.contains_node(C));
    assert!(registry.check_consistency().is_empty());
}

#[test]
fn test_create_then_remove_round_trip_leaves_no_references() {
    let mut registry = TestRegistry::new();
    registry.create_node(NodeId(5), None).unwrap();
    registry.remove_node(NodeId(5)).unwrap();

    assert!(registry.node(NodeId(5)).is_none());
    assert!(registry.component_of_node(NodeId(5)).is_none());
    for component in registry.components() {
        assert!(!component.contains_node(NodeId(5)));
    }
    assert!(registry.check_consistency().is_empty());
}

#[test]
fn test_removing_a_node_scrubs_it_from_surviving_edge_slots() {
    let mut registry = chain();
    registry.remove_node(B).unwrap();

    let e1 = registry.hyper_edge(E1).unwrap();
    let e2 = registry.hyper_edge(E2).unwrap();
    assert!(e1.ordered_targets().is_empty());
    assert_eq!(e1.ordered_sources(), vec![A]);
    assert!(e2.ordered_sources().is_empty());
    assert_eq!(e2.ordered_targets(), vec![C]);
}

#[test]
fn test_removing_the_last_endpoint_prunes_the_edge() {
    let mut registry = TestRegistry::new();
    registry.create_node(X, None).unwrap();
    registry.connect_as_output(X, E1).unwrap();

    registry.remove_node(X).unwrap();

    assert!(registry.hyper_edge(E1).is_none());
    assert!(registry.component_of_edge(E1).is_none());
    assert!(registry.check_consistency().is_empty());
}

#[test]
fn test_union_of_two_singletons_merges_their_components() {
    let mut registry = TestRegistry::new();
    registry.create_node(X, None).unwrap();
    registry.create_node(Y, None).unwrap();

    let merged = registry.union_nodes(X, Y).unwrap();

    assert_eq!(registry.component_count(), 1);
    let component = registry.component(merged).unwrap();
    assert!(component.contains_node(X));
    assert!(component.contains_node(Y));
    // neither node has input edges, so both are sources
    assert!(component.source_nodes().contains(&X));
    assert!(component.source_nodes().contains(&Y));
    assert!(registry.check_consistency().is_empty());
}

#[test]
fn test_union_nodes_is_idempotent() {
    let mut registry = TestRegistry::new();
    registry.create_node(X, None).unwrap();
    registry.create_node(Y, None).unwrap();

    registry.union_nodes(X, Y).unwrap();
    let after_once = registry.clone();
    registry.union_nodes(X, Y).unwrap();

    assert_eq!(registry.component_count(), 1);
    assert_eq!(registry, after_once);
}

#[test]
fn test_removing_a_fused_node_unfuses_the_point() {
    let mut registry = TestRegistry::new();
    registry.create_node(X, None).unwrap();
    registry.create_node(Y, None).unwrap();
    registry.union_nodes(X, Y).unwrap();

    registry.remove_node(X).unwrap();

    assert!(registry.node(NodeId(10)).is_none());
    let survivor = registry.node(Y).unwrap();
    assert!(survivor.union_partners().is_empty());
    assert!(registry.check_consistency().is_empty());
}

#[test]
fn test_merge_components_inherits_the_first_operands_owner() {
    let mut registry = TestRegistry::new();
    let left = registry.create_node(X, Some("left")).unwrap();
    let right = registry.create_node(Y, Some("right")).unwrap();

    let merged = registry.merge_components(&[left, right]).unwrap();

    let component = registry.component(merged).unwrap();
    assert_eq!(component.owner(), Some(&"left"));
    assert!(registry.component(left).is_none());
    assert!(registry.component(right).is_none());
    assert!(registry.check_consistency().is_empty());
}

#[test]
fn test_merge_components_rejects_unknown_ids() {
    let mut registry = TestRegistry::new();
    let cid = registry.create_node(X, None).unwrap();
    let before = registry.clone();

    let err = registry
        .merge_components(&[cid, ComponentId(99)])
        .unwrap_err();
    assert_eq!(err, Error::ComponentNotFound(ComponentId(99)));
    assert_eq!(registry, before);

    let err = registry.merge_components(&[]).unwrap_err();
    assert_eq!(err, Error::MergeWithoutOperands);
}

#[test]
fn test_split_fragments_inherit_the_owner_tag() {
    let mut registry = TestRegistry::new();
    registry.create_node(A, Some("canvas")).unwrap();
    registry.create_node(B, Some("canvas")).unwrap();
    registry.connect_as_output(A, E1).unwrap();
    registry.connect_as_input(B, E1).unwrap();

    registry.remove_hyper_edge(E1).unwrap();

    assert_eq!(registry.component_count(), 2);
    assert_eq!(registry.components_of(&"canvas").len(), 2);
}

#[test]
fn test_remove_node_keeps_the_component_when_one_group_survives() {
    let mut registry = chain();
    let cid = registry.component_of_node(A).unwrap().id();

    registry.remove_node(C).unwrap();

    // no split happened, the component is the same object
    assert_eq!(registry.component_of_node(A).unwrap().id(), cid);
    assert_eq!(registry.component_count(), 1);
    assert!(registry.check_consistency().is_empty());
}
