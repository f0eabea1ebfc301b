//! Hierarchical transform nodes.
//!
//! A [`TransformTree`] owns a forest of [`TransformNode`]s. Each node stores
//! its pose relative to its parent and a cached world pose that is recomputed
//! eagerly, for the node and its whole subtree, whenever anything above or at
//! the node changes. Reparenting keeps a node where it is in the world.
//!
//! The tree is generic over the scalar type; [`TransformTreef`] and
//! [`TransformTreed`] name the `f32` and `f64` variants.

pub use transform_common as common;

mod error;
pub mod hierarchy;
pub mod node;
pub mod tree;

pub use error::TransformError;
pub use hierarchy::{Space, TransformTree, TransformTreed, TransformTreef};
pub use node::{NodeId, TransformNode};
pub use tree::{walk_tree, SubtreeCollector, TreeVisitor};
