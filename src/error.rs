//! Error types for registry operations.

use crate::component::ComponentId;
use crate::hyperedge::EdgeId;
use crate::node::NodeId;
use thiserror::Error;

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The two failure categories every [`Error`] falls into.
///
/// A failed call leaves the registry unchanged; a successful no-op
/// (e.g. rekeying an edge onto its own id) is not an error at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An unknown node/edge/component id was passed.
    NotFound,
    /// The ids were known but the requested mutation is not legal.
    InvalidOperation,
}

/// Errors that can occur while mutating or querying a registry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    /// Unknown node id.
    #[error("unknown node id {0}")]
    NodeNotFound(NodeId),

    /// Unknown hyperedge id.
    #[error("unknown hyperedge id {0}")]
    EdgeNotFound(EdgeId),

    /// Unknown component id.
    #[error("unknown component id {0}")]
    ComponentNotFound(ComponentId),

    /// A node with this id is already registered.
    #[error("node id {0} is already registered")]
    NodeExists(NodeId),

    /// Rekeying an edge onto an id that already names a different edge.
    #[error("cannot rekey hyperedge {prev}: id {new} already names a different edge")]
    EdgeIdOccupied { prev: EdgeId, new: EdgeId },

    /// Connecting at an explicit slot index that another node already holds.
    #[error("slot {slot} of hyperedge {edge} is already held by node {occupant}")]
    SlotOccupied {
        edge: EdgeId,
        slot: usize,
        occupant: NodeId,
    },

    /// Removing a node from a component that does not contain it.
    #[error("component {component} does not contain node {node}")]
    NodeNotInComponent {
        node: NodeId,
        component: ComponentId,
    },

    /// Removing an edge from a component that does not contain it.
    #[error("component {component} does not contain hyperedge {edge}")]
    EdgeNotInComponent {
        edge: EdgeId,
        component: ComponentId,
    },

    /// Merging an empty component list.
    #[error("cannot merge an empty component list")]
    MergeWithoutOperands,
}

impl Error {
    /// Fold the concrete error onto its [`ErrorKind`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NodeNotFound(_) | Error::EdgeNotFound(_) | Error::ComponentNotFound(_) => {
                ErrorKind::NotFound
            }
            Error::NodeExists(_)
            | Error::EdgeIdOccupied { .. }
            | Error::SlotOccupied { .. }
            | Error::NodeNotInComponent { .. }
            | Error::EdgeNotInComponent { .. }
            | Error::MergeWithoutOperands => ErrorKind::InvalidOperation,
        }
    }
}
