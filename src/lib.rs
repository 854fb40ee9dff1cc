//! # Incremental Hypergraphs
//!
//! The connectivity engine behind an interactive string-diagram editor:
//! a [`Registry`](crate::registry::Registry) tracks which drawn fragments
//! form one connected topological component as the user edits, merging and
//! splitting components on the fly.
//!
//! A diagram is made of boxes (hyperedges) wired together through
//! topological points (nodes):
//!
//! ```text
//!           ┌──────┐   x        y   ┌──────┐
//!       ●───┤  f   ├───●╌╌╌╌╌╌╌╌●───┤  g   ├───●
//!           └──────┘                └──────┘
//! ```
//!
//! Here `f`'s output point `x` has been fused with `g`'s input point `y`
//! (a *union link*, drawn dotted): the two boxes now form one connected
//! component. Deleting `x` (or the fused point) leaves `f` and `g` in two
//! separate components again.
//!
//! Three kinds of edit drive everything:
//!
//! * **attachment**: a node becomes a source or target of a hyperedge
//!   ([`Registry::connect_as_input`](crate::registry::Registry::connect_as_input),
//!   [`Registry::connect_as_output`](crate::registry::Registry::connect_as_output));
//!   when node and edge lived in different components this bridges them
//!   into one.
//! * **union**: two nodes are declared to occupy the same point
//!   ([`Registry::union_nodes`](crate::registry::Registry::union_nodes)),
//!   e.g. a spider fusing with a wire endpoint; separate components merge.
//! * **removal**: deleting a node or hyperedge
//!   ([`Registry::remove_node`](crate::registry::Registry::remove_node),
//!   [`Registry::remove_hyper_edge`](crate::registry::Registry::remove_hyper_edge))
//!   may fracture a component, in which case the registry materializes one
//!   fresh component per surviving group.
//!
//! Between any two top-level registry calls every node and edge belongs to
//! exactly one component, and each component's node set is the closure of
//! its source nodes over hyperedge target traversal and union links.
//!
//! Ids for nodes and hyperedges are supplied by the caller so they line up
//! with identifiers used elsewhere in the application. Hyperedge payloads
//! and component owner tags are opaque type parameters: stored, compared
//! where asked, never interpreted.
//!
//! ```rust
//! use incremental_hypergraphs::prelude::*;
//!
//! let mut registry: Registry<&'static str, ()> = Registry::new();
//!
//! // two isolated points, each its own component
//! registry.create_node(NodeId(0), None).unwrap();
//! registry.create_node(NodeId(1), None).unwrap();
//! assert_eq!(registry.component_count(), 2);
//!
//! // wiring both into one box merges the two components
//! registry.connect_as_output(NodeId(0), EdgeId(0)).unwrap();
//! registry.connect_as_input(NodeId(1), EdgeId(0)).unwrap();
//! registry.set_payload(EdgeId(0), "f").unwrap();
//! assert_eq!(registry.component_count(), 1);
//!
//! // deleting the box splits them apart again
//! registry.remove_hyper_edge(EdgeId(0)).unwrap();
//! assert_eq!(registry.component_count(), 2);
//! ```

pub mod component;
pub mod connectivity;
pub mod error;
pub mod hyperedge;
pub mod node;
pub mod registry;
pub mod union_find;

pub mod prelude {
    //! The types most callers need.
    pub use crate::component::{ComponentDump, ComponentId, EdgeDump, Hypergraph};
    pub use crate::error::{Error, ErrorKind, Result};
    pub use crate::hyperedge::{EdgeId, HyperEdge};
    pub use crate::node::{Node, NodeId};
    pub use crate::registry::Registry;
}
