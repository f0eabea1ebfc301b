use thiserror::Error;

use crate::node::NodeId;

/// Structural errors raised by [`crate::TransformTree`] operations.
///
/// Every operation validates before it mutates, so an `Err` leaves the tree
/// exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Reparenting node {node} under {parent} would create a cycle")]
    CycleDetected { node: NodeId, parent: NodeId },

    #[error("No node ids left to allocate")]
    IdsExhausted,
}
