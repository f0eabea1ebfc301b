use crate::common::{local_axes, local_axis_x, local_axis_y, local_axis_z, Pose};
use cgmath::{BaseFloat, Matrix4, Quaternion, Vector3};

/// Unique identifier for a node in a [`crate::TransformTree`].
pub type NodeId = u32;

/// A node in the transform hierarchy.
///
/// Holds the pose relative to the parent (local) and the cached absolute pose
/// (world). Nodes are owned by a [`crate::TransformTree`]; all mutation goes
/// through the tree so the cached world pose and the parent/child links stay
/// consistent.
#[derive(Debug, Clone)]
pub struct TransformNode<S: BaseFloat> {
    pub id: NodeId,
    pub name: Option<String>,

    // Relative to the parent, or to the world for root nodes
    local: Pose<S>,

    // Derived, written only by the refresh pass
    world: Pose<S>,

    // Hierarchy
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl<S: BaseFloat> TransformNode<S> {
    /// Creates a detached node whose local and world pose are both `pose`.
    pub(crate) fn new(id: NodeId, name: Option<String>, pose: Pose<S>) -> Self {
        Self {
            id,
            name,
            local: pose,
            world: pose,
            parent: None,
            children: Vec::new(),
        }
    }

    // ========== Local Pose ==========

    pub fn local_pose(&self) -> &Pose<S> {
        &self.local
    }

    pub fn local_position(&self) -> Vector3<S> {
        self.local.position
    }

    pub fn local_rotation(&self) -> Quaternion<S> {
        self.local.rotation
    }

    pub fn local_size(&self) -> Vector3<S> {
        self.local.scale
    }

    pub(crate) fn set_local_pose(&mut self, pose: Pose<S>) {
        self.local = pose;
    }

    pub(crate) fn set_local_position(&mut self, position: Vector3<S>) {
        self.local.position = position;
    }

    pub(crate) fn set_local_rotation(&mut self, rotation: Quaternion<S>) {
        self.local.rotation = rotation;
    }

    pub(crate) fn set_local_size(&mut self, size: Vector3<S>) {
        self.local.scale = size;
    }

    // ========== World Pose ==========

    pub fn world_pose(&self) -> &Pose<S> {
        &self.world
    }

    /// Absolute position.
    pub fn position(&self) -> Vector3<S> {
        self.world.position
    }

    /// Absolute rotation.
    pub fn rotation(&self) -> Quaternion<S> {
        self.world.rotation
    }

    /// Absolute size, the product of every scale up the parent chain.
    pub fn size(&self) -> Vector3<S> {
        self.world.scale
    }

    /// Stores a freshly computed world pose. Only the refresh pass calls this.
    pub(crate) fn set_world_pose(&mut self, pose: Pose<S>) {
        self.world = pose;
    }

    // ========== Hierarchy ==========

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Sets the parent node ID (internal use only - the tree keeps both directions in sync).
    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Adds a child node ID to this node's children list (internal use only).
    pub(crate) fn add_child(&mut self, child: NodeId) {
        if !self.children.contains(&child) {
            self.children.push(child);
        }
    }

    /// Removes a child node ID from this node's children list (internal use only).
    pub(crate) fn remove_child(&mut self, child: NodeId) {
        self.children.retain(|&id| id != child);
    }

    // ========== Matrices ==========

    pub fn local_translation_matrix(&self) -> Matrix4<S> {
        self.local.translation_matrix()
    }

    pub fn local_rotation_matrix(&self) -> Matrix4<S> {
        self.local.rotation_matrix()
    }

    pub fn local_scale_matrix(&self) -> Matrix4<S> {
        self.local.scale_matrix()
    }

    /// Computes the local transform matrix from position, rotation, and scale.
    ///
    /// The order of operations is: Translation * Rotation * Scale (TRS)
    pub fn compute_local_transform(&self) -> Matrix4<S> {
        self.local.to_matrix()
    }

    pub fn translation_matrix(&self) -> Matrix4<S> {
        self.world.translation_matrix()
    }

    pub fn rotation_matrix(&self) -> Matrix4<S> {
        self.world.rotation_matrix()
    }

    pub fn scale_matrix(&self) -> Matrix4<S> {
        self.world.scale_matrix()
    }

    /// Same TRS composition as [`Self::compute_local_transform`], from the world pose.
    pub fn compute_world_transform(&self) -> Matrix4<S> {
        self.world.to_matrix()
    }

    // ========== Axes ==========

    /// Returns the local X axis (right) in world space.
    pub fn local_x_axis(&self) -> Vector3<S> {
        local_axis_x(self.world.rotation)
    }

    /// Returns the local Y axis (up) in world space.
    pub fn local_y_axis(&self) -> Vector3<S> {
        local_axis_y(self.world.rotation)
    }

    /// Returns the local Z axis (forward) in world space.
    pub fn local_z_axis(&self) -> Vector3<S> {
        local_axis_z(self.world.rotation)
    }

    /// Returns all local axes (right, up, forward) in world space.
    pub fn local_axes(&self) -> (Vector3<S>, Vector3<S>, Vector3<S>) {
        local_axes(self.world.rotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::EPSILON;
    use cgmath::{Deg, Rotation3, SquareMatrix};

    fn pose(position: Vector3<f32>, rotation: Quaternion<f32>, scale: Vector3<f32>) -> Pose<f32> {
        Pose::new(position, rotation, scale)
    }

    // ========================================================================
    // Node Creation Tests
    // ========================================================================

    #[test]
    fn test_node_new() {
        let position = Vector3::new(1.0, 2.0, 3.0);
        let rotation = Quaternion::new(1.0, 0.0, 0.0, 0.0);
        let scale = Vector3::new(2.0, 2.0, 2.0);

        let node = TransformNode::new(42, None, pose(position, rotation, scale));

        assert_eq!(node.id, 42);
        assert_eq!(node.local_position(), position);
        assert_eq!(node.local_rotation(), rotation);
        assert_eq!(node.local_size(), scale);
        // A detached node's world pose is its local pose
        assert_eq!(node.world_pose(), node.local_pose());
    }

    #[test]
    fn test_node_default_values() {
        let node = TransformNode::<f32>::new(7, Some("root".to_string()), Pose::identity());

        assert_eq!(node.id, 7);
        assert_eq!(node.name.as_deref(), Some("root"));
        assert_eq!(node.parent(), None);
        assert_eq!(node.children().len(), 0);
    }

    // ========================================================================
    // Node Transform Tests
    // ========================================================================

    #[test]
    fn test_node_local_transform_identity() {
        let node = TransformNode::<f32>::new(0, None, Pose::identity());
        let transform = node.compute_local_transform();
        let identity: Matrix4<f32> = Matrix4::identity();

        for i in 0..4 {
            for j in 0..4 {
                assert!(
                    (transform[i][j] - identity[i][j]).abs() < EPSILON,
                    "Transform element [{i}][{j}] = {}, expected {}",
                    transform[i][j],
                    identity[i][j]
                );
            }
        }
    }

    #[test]
    fn test_compute_local_transform_translation_only() {
        let node = TransformNode::new(
            0,
            None,
            pose(Vector3::new(5.0, 10.0, 15.0), Quaternion::new(1.0, 0.0, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0)),
        );
        let transform = node.compute_local_transform();

        // Check translation components (last column)
        assert!((transform[3][0] - 5.0).abs() < EPSILON);
        assert!((transform[3][1] - 10.0).abs() < EPSILON);
        assert!((transform[3][2] - 15.0).abs() < EPSILON);
        assert!((transform[3][3] - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_compute_local_transform_rotation_only() {
        let node = TransformNode::new(
            0,
            None,
            pose(Vector3::new(0.0, 0.0, 0.0), Quaternion::from_angle_z(Deg(90.0)), Vector3::new(1.0, 1.0, 1.0)),
        );
        let transform = node.compute_local_transform();

        // Apply transform to point (1, 0, 0) - should become roughly (0, 1, 0)
        let point = Vector3::new(1.0, 0.0, 0.0);
        let rotated_x = transform[0][0] * point.x + transform[1][0] * point.y + transform[2][0] * point.z;
        let rotated_y = transform[0][1] * point.x + transform[1][1] * point.y + transform[2][1] * point.z;
        let rotated_z = transform[0][2] * point.x + transform[1][2] * point.y + transform[2][2] * point.z;

        assert!(rotated_x.abs() < EPSILON, "Expected x ≈ 0, got {}", rotated_x);
        assert!((rotated_y - 1.0).abs() < EPSILON, "Expected y ≈ 1, got {}", rotated_y);
        assert!(rotated_z.abs() < EPSILON, "Expected z ≈ 0, got {}", rotated_z);
    }

    #[test]
    fn test_compute_local_transform_trs_composition() {
        let node = TransformNode::new(
            0,
            None,
            pose(Vector3::new(10.0, 20.0, 30.0), Quaternion::from_angle_y(Deg(45.0)), Vector3::new(2.0, 3.0, 4.0)),
        );
        let transform = node.compute_local_transform();

        let expected =
            node.local_translation_matrix() * node.local_rotation_matrix() * node.local_scale_matrix();

        for i in 0..4 {
            for j in 0..4 {
                assert!(
                    (transform[i][j] - expected[i][j]).abs() < EPSILON,
                    "Transform element [{i}][{j}] = {}, expected {}",
                    transform[i][j],
                    expected[i][j]
                );
            }
        }
    }

    #[test]
    fn test_world_transform_reads_world_pose() {
        let mut node = TransformNode::<f32>::new(0, None, Pose::identity());
        node.set_world_pose(pose(
            Vector3::new(1.0, 2.0, 3.0),
            Quaternion::new(1.0, 0.0, 0.0, 0.0),
            Vector3::new(2.0, 2.0, 2.0),
        ));

        let world = node.compute_world_transform();
        let local = node.compute_local_transform();

        assert!((world[3][0] - 1.0).abs() < EPSILON);
        assert!((world[0][0] - 2.0).abs() < EPSILON);
        // Local pose untouched
        assert!(local[3][0].abs() < EPSILON);
        assert!((local[0][0] - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_zero_scale() {
        let node = TransformNode::new(
            0,
            None,
            pose(Vector3::new(0.0, 0.0, 0.0), Quaternion::new(1.0, 0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 0.0)),
        );
        let transform = node.compute_local_transform();

        // Should produce a zero-scale transform (degenerate)
        assert_eq!(transform[0][0], 0.0);
        assert_eq!(transform[1][1], 0.0);
        assert_eq!(transform[2][2], 0.0);
    }

    // ========================================================================
    // Node Hierarchy Tests
    // ========================================================================

    #[test]
    fn test_set_parent() {
        let mut node = TransformNode::<f32>::new(1, None, Pose::identity());
        assert_eq!(node.parent(), None);

        node.set_parent(Some(10));
        assert_eq!(node.parent(), Some(10));

        node.set_parent(None);
        assert_eq!(node.parent(), None);
    }

    #[test]
    fn test_add_child_duplicate_ignored() {
        let mut node = TransformNode::<f32>::new(1, None, Pose::identity());

        node.add_child(5);
        node.add_child(5); // Duplicate
        node.add_child(5); // Duplicate

        assert_eq!(node.children(), &[5]);
    }

    #[test]
    fn test_remove_child_keeps_order() {
        let mut node = TransformNode::<f32>::new(1, None, Pose::identity());

        node.add_child(5);
        node.add_child(10);
        node.add_child(15);
        node.remove_child(10);

        assert_eq!(node.children(), &[5, 15]);

        // Removing non-existent child should not panic
        node.remove_child(999);
        assert_eq!(node.children(), &[5, 15]);
    }

    // ========================================================================
    // Axis Tests
    // ========================================================================

    #[test]
    fn test_local_axes_follow_world_rotation() {
        let mut node = TransformNode::<f32>::new(0, None, Pose::identity());
        node.set_world_pose(pose(
            Vector3::new(0.0, 0.0, 0.0),
            Quaternion::from_angle_y(Deg(90.0)),
            Vector3::new(1.0, 1.0, 1.0),
        ));

        let (right, up, forward) = node.local_axes();

        // +X turns into -Z, +Z turns into +X
        assert!((right.z + 1.0).abs() < EPSILON);
        assert!((up.y - 1.0).abs() < EPSILON);
        assert!((forward.x - 1.0).abs() < EPSILON);
        assert_eq!(node.local_x_axis(), right);
        assert_eq!(node.local_y_axis(), up);
        assert_eq!(node.local_z_axis(), forward);
    }
}
