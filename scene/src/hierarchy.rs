use std::collections::HashMap;

use cgmath::{BaseFloat, Matrix4, Quaternion, Rotation, Vector3};

use crate::common::{
    apply_scale, normalize_rotation_safe, post_rotate, quaternion_from_axis_angle_safe, Pose,
};
use crate::error::TransformError;
use crate::node::{NodeId, TransformNode};
use crate::tree::{walk_tree, SubtreeCollector};

/// Frame in which [`TransformTree::translate`] and [`TransformTree::rotate`]
/// interpret their argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Space {
    /// Relative to the node's own local frame
    #[default]
    Local,
    /// Relative to the node's world frame
    World,
}

/// Owns a forest of [`TransformNode`]s and keeps their cached world poses in sync.
///
/// Nodes are stored in an arena keyed by [`NodeId`]. A node refers to its
/// parent by id and lists its children by id, so ownership only ever flows
/// from the tree to its nodes. Every mutation recomputes the world pose of the
/// touched node and its whole subtree before returning.
#[derive(Debug, Clone)]
pub struct TransformTree<S: BaseFloat> {
    pub(crate) nodes: HashMap<NodeId, TransformNode<S>>,
    pub(crate) root_nodes: Vec<NodeId>,
    pub(crate) next_node_id: NodeId,
}

/// Single-precision transform tree.
pub type TransformTreef = TransformTree<f32>;

/// Double-precision transform tree.
pub type TransformTreed = TransformTree<f64>;

impl<S: BaseFloat> Default for TransformTree<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: BaseFloat> TransformTree<S> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: HashMap::with_capacity(capacity),
            root_nodes: Vec::new(),
            next_node_id: 0,
        }
    }

    // ========== Node Creation ==========

    /// Adds a node at the given world-space pose.
    ///
    /// With a parent, the local pose is solved against the parent's current
    /// world pose so the node appears exactly where requested.
    pub fn add_node(
        &mut self,
        parent: Option<NodeId>,
        name: Option<String>,
        position: Vector3<S>,
        rotation: Quaternion<S>,
        size: Vector3<S>,
    ) -> Result<NodeId, TransformError> {
        self.add_node_with_pose(parent, name, Pose::new(position, rotation, size))
    }

    /// Adds a node with the identity pose.
    pub fn add_default_node(
        &mut self,
        parent: Option<NodeId>,
        name: Option<String>,
    ) -> Result<NodeId, TransformError> {
        self.add_node_with_pose(parent, name, Pose::identity())
    }

    /// Adds a node whose world pose is decomposed from a composed TRS matrix.
    pub fn add_node_from_matrix(
        &mut self,
        parent: Option<NodeId>,
        name: Option<String>,
        matrix: &Matrix4<S>,
    ) -> Result<NodeId, TransformError> {
        self.add_node_with_pose(parent, name, Pose::from_matrix(matrix))
    }

    /// Adds a node at the given world-space pose.
    pub fn add_node_with_pose(
        &mut self,
        parent: Option<NodeId>,
        name: Option<String>,
        pose: Pose<S>,
    ) -> Result<NodeId, TransformError> {
        let id = self.next_node_id;
        let next_node_id = id.checked_add(1).ok_or(TransformError::IdsExhausted)?;
        let mut node = TransformNode::new(id, name, pose);

        match parent {
            Some(parent_id) => {
                let parent_node = self.node_mut(parent_id)?;
                node.set_local_pose(pose.relative_to(parent_node.world_pose()));
                node.set_parent(Some(parent_id));
                parent_node.add_child(id);
            }
            None => self.root_nodes.push(id),
        }

        self.next_node_id = next_node_id;
        self.nodes.insert(id, node);
        self.refresh(id)?;

        log::debug!("Added transform node {} (parent: {:?})", id, parent);
        Ok(id)
    }

    // ========== Queries ==========

    pub fn get_node(&self, id: NodeId) -> Option<&TransformNode<S>> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes without a parent, in insertion order.
    pub fn root_nodes(&self) -> &[NodeId] {
        &self.root_nodes
    }

    /// Iterates over every node in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &TransformNode<S>> {
        self.nodes.values()
    }

    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>, TransformError> {
        Ok(self.node(id)?.parent())
    }

    pub fn children(&self, id: NodeId) -> Result<&[NodeId], TransformError> {
        Ok(self.node(id)?.children())
    }

    /// All nodes below `id` in pre-order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Result<Vec<NodeId>, TransformError> {
        self.node(id)?;
        let mut collector = SubtreeCollector::default();
        walk_tree(self, id, &mut collector);
        Ok(collector.ids.into_iter().skip(1).collect())
    }

    /// Returns true if `ancestor` appears on the parent chain of `id`.
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = self.nodes.get(&id).and_then(|node| node.parent());
        while let Some(parent_id) = current {
            if parent_id == ancestor {
                return true;
            }
            current = self.nodes.get(&parent_id).and_then(|node| node.parent());
        }
        false
    }

    // ========== Local Setters ==========

    pub fn set_local_position(&mut self, id: NodeId, position: Vector3<S>) -> Result<(), TransformError> {
        self.node_mut(id)?.set_local_position(position);
        self.refresh(id)
    }

    /// The rotation is stored as given; it does not have to be normalized.
    pub fn set_local_rotation(&mut self, id: NodeId, rotation: Quaternion<S>) -> Result<(), TransformError> {
        self.node_mut(id)?.set_local_rotation(rotation);
        self.refresh(id)
    }

    pub fn set_local_size(&mut self, id: NodeId, size: Vector3<S>) -> Result<(), TransformError> {
        self.node_mut(id)?.set_local_size(size);
        self.refresh(id)
    }

    // ========== World Setters ==========

    /// Moves the node to an absolute position by solving the matching local position.
    pub fn set_position(&mut self, id: NodeId, position: Vector3<S>) -> Result<(), TransformError> {
        let local = match self.parent_world(id)? {
            Some(parent) => Pose { position, ..Pose::identity() }.relative_to(&parent).position,
            None => position,
        };
        self.set_local_position(id, local)
    }

    /// Orients the node absolutely by solving the matching local rotation.
    pub fn set_rotation(&mut self, id: NodeId, rotation: Quaternion<S>) -> Result<(), TransformError> {
        let local = match self.parent_world(id)? {
            Some(parent) => Pose { rotation, ..Pose::identity() }.relative_to(&parent).rotation,
            None => rotation,
        };
        self.set_local_rotation(id, local)
    }

    // ========== Reparenting ==========

    /// Moves a node under `new_parent` (or makes it a root) without changing
    /// where it appears in the world.
    ///
    /// Rejects the move with [`TransformError::CycleDetected`] if
    /// `new_parent` is the node itself or one of its descendants.
    pub fn set_parent(&mut self, id: NodeId, new_parent: Option<NodeId>) -> Result<(), TransformError> {
        let old_parent = self.node(id)?.parent();
        if let Some(parent_id) = new_parent {
            self.node(parent_id)?;
            if parent_id == id || self.is_ancestor(id, parent_id) {
                log::warn!("Rejected reparenting node {} under {}: cycle", id, parent_id);
                return Err(TransformError::CycleDetected { node: id, parent: parent_id });
            }
        }

        let world = *self.node(id)?.world_pose();
        match old_parent {
            Some(old_parent_id) => self.node_mut(old_parent_id)?.remove_child(id),
            None => self.root_nodes.retain(|&root| root != id),
        }

        let node = self.node_mut(id)?;
        node.set_local_pose(world);
        node.set_parent(new_parent);

        match new_parent {
            Some(parent_id) => {
                let parent_node = self.node_mut(parent_id)?;
                let local = world.relative_to(parent_node.world_pose());
                parent_node.add_child(id);
                self.node_mut(id)?.set_local_pose(local);
            }
            None => self.root_nodes.push(id),
        }

        log::debug!(
            "Reparented transform node {}: {:?} -> {:?}",
            id,
            old_parent,
            new_parent
        );
        self.refresh(id)
    }

    // ========== Refresh ==========

    /// Recomputes the world pose of `id` and every node below it.
    ///
    /// Mutators call this themselves; calling it directly only forces a resync.
    pub fn refresh(&mut self, id: NodeId) -> Result<(), TransformError> {
        let mut stack = vec![id];
        let mut visited = 0usize;

        // Pre-order, so a parent's world pose is always final before its children read it
        while let Some(current) = stack.pop() {
            let parent_world = self.parent_world(current)?;
            let node = self.node_mut(current)?;
            let world = match parent_world {
                Some(parent) => parent.compose(node.local_pose()),
                None => *node.local_pose(),
            };
            node.set_world_pose(world);
            stack.extend(node.children().iter().rev());
            visited += 1;
        }

        log::trace!("Refreshed {} transform node(s) from {}", visited, id);
        Ok(())
    }

    // ========== Transform Manipulation Methods ==========

    /// Moves the node by `offset` expressed in the chosen frame.
    ///
    /// In [`Space::World`] the offset is rotated by the world rotation and
    /// applied to the world position; in [`Space::Local`] it is rotated by the
    /// local rotation and applied to the local position.
    pub fn translate(&mut self, id: NodeId, offset: Vector3<S>, space: Space) -> Result<(), TransformError> {
        let node = self.node(id)?;
        match space {
            Space::World => {
                let target = node.position() + normalize_rotation_safe(node.rotation()).rotate_vector(offset);
                self.set_position(id, target)
            }
            Space::Local => {
                let target = node.local_position() + normalize_rotation_safe(node.local_rotation()).rotate_vector(offset);
                self.set_local_position(id, target)
            }
        }
    }

    /// Post-multiplies the world or local rotation by `delta`.
    pub fn rotate(&mut self, id: NodeId, delta: Quaternion<S>, space: Space) -> Result<(), TransformError> {
        let node = self.node(id)?;
        match space {
            Space::World => {
                let target = post_rotate(node.rotation(), delta);
                self.set_rotation(id, target)
            }
            Space::Local => {
                let target = post_rotate(node.local_rotation(), delta);
                self.set_local_rotation(id, target)
            }
        }
    }

    /// Rotates by `angle` radians about `axis`; a zero-length axis leaves the
    /// node unchanged.
    pub fn rotate_axis_angle(
        &mut self,
        id: NodeId,
        axis: Vector3<S>,
        angle: S,
        space: Space,
    ) -> Result<(), TransformError> {
        self.rotate(id, quaternion_from_axis_angle_safe(axis, angle), space)
    }

    /// Multiplies the local size component-wise by `factor`.
    pub fn scale(&mut self, id: NodeId, factor: Vector3<S>) -> Result<(), TransformError> {
        let size = apply_scale(self.node(id)?.local_size(), factor);
        self.set_local_size(id, size)
    }

    // ========== Matrices ==========

    /// Translation * Rotation * Scale of the local pose.
    pub fn local_matrix(&self, id: NodeId) -> Result<Matrix4<S>, TransformError> {
        Ok(self.node(id)?.compute_local_transform())
    }

    /// Translation * Rotation * Scale of the world pose.
    pub fn world_matrix(&self, id: NodeId) -> Result<Matrix4<S>, TransformError> {
        Ok(self.node(id)?.compute_world_transform())
    }

    // ========== Clone / Remove ==========

    /// Deep-copies `id` and its subtree.
    ///
    /// The copy gets the same parent as the original, so it lands next to it
    /// as a sibling, and every copied node keeps the world pose of its source.
    /// Returns the id of the copied root.
    pub fn clone_subtree(&mut self, id: NodeId) -> Result<NodeId, TransformError> {
        let parent = self.node(id)?.parent();

        let mut collector = SubtreeCollector::default();
        walk_tree(self, id, &mut collector);
        NodeId::try_from(collector.ids.len())
            .ok()
            .and_then(|count| self.next_node_id.checked_add(count))
            .ok_or(TransformError::IdsExhausted)?;

        let clone = self.clone_under(id, parent)?;
        log::debug!("Cloned transform subtree {} as {}", id, clone);
        Ok(clone)
    }

    fn clone_under(&mut self, source: NodeId, parent: Option<NodeId>) -> Result<NodeId, TransformError> {
        let node = self.node(source)?;
        let name = node.name.clone();
        let world = *node.world_pose();
        let children = node.children().to_vec();

        let clone = self.add_node_with_pose(parent, name, world)?;
        for child in children {
            self.clone_under(child, Some(clone))?;
        }
        Ok(clone)
    }

    /// Removes `id` together with its whole subtree.
    ///
    /// Children are never promoted; reparent them first to keep them.
    /// Returns the removed ids in pre-order.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Vec<NodeId>, TransformError> {
        let parent = self.node(id)?.parent();

        let mut collector = SubtreeCollector::default();
        walk_tree(self, id, &mut collector);

        match parent {
            Some(parent_id) => self.node_mut(parent_id)?.remove_child(id),
            None => self.root_nodes.retain(|&root| root != id),
        }
        for removed in &collector.ids {
            self.nodes.remove(removed);
        }

        log::debug!("Removed {} transform node(s) rooted at {}", collector.ids.len(), id);
        Ok(collector.ids)
    }

    // ========== Internal ==========

    fn node(&self, id: NodeId) -> Result<&TransformNode<S>, TransformError> {
        self.nodes.get(&id).ok_or(TransformError::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut TransformNode<S>, TransformError> {
        self.nodes.get_mut(&id).ok_or(TransformError::NodeNotFound(id))
    }

    fn parent_world(&self, id: NodeId) -> Result<Option<Pose<S>>, TransformError> {
        match self.node(id)?.parent() {
            Some(parent_id) => Ok(Some(*self.node(parent_id)?.world_pose())),
            None => Ok(None),
        }
    }
}
