use cgmath::BaseFloat;

use super::{NodeId, TransformNode, TransformTree};

/// Trait for implementing tree traversal operations.
///
/// Implementors of this trait can be passed to tree walking functions
/// to perform arbitrary operations on each node during traversal.
///
/// The visitor receives callbacks when entering and exiting nodes.
pub trait TreeVisitor<S: BaseFloat> {
    /// Called when entering a node (before processing its children).
    ///
    /// Returns true to continue traversing children, false to skip the subtree.
    fn enter_node(&mut self, node: &TransformNode<S>) -> bool;

    /// Called when exiting a node (after processing its children).
    fn exit_node(&mut self, _node: &TransformNode<S>) {}
}

/// Walks the transform tree starting from a given node.
///
/// Unknown ids are skipped silently; the walk is read-only.
pub fn walk_tree<S: BaseFloat, V: TreeVisitor<S>>(
    tree: &TransformTree<S>,
    node_id: NodeId,
    visitor: &mut V,
) {
    let node = match tree.get_node(node_id) {
        Some(n) => n,
        None => return,
    };

    if visitor.enter_node(node) {
        for &child_id in node.children() {
            walk_tree(tree, child_id, visitor);
        }
    }

    visitor.exit_node(node);
}

/// Collects node ids in pre-order.
#[derive(Debug, Default)]
pub struct SubtreeCollector {
    pub ids: Vec<NodeId>,
}

impl<S: BaseFloat> TreeVisitor<S> for SubtreeCollector {
    fn enter_node(&mut self, node: &TransformNode<S>) -> bool {
        self.ids.push(node.id);
        true
    }
}
