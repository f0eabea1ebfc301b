use cgmath::{BaseFloat, Matrix4, One, Quaternion, Rotation, Vector3};

use crate::transform_ops::{
    apply_scale, divide_scale_safe, extract_rotation, extract_scale, extract_translation,
    invert_rotation, normalize_rotation_safe,
};

/// A position, rotation and non-uniform scale.
///
/// Used both for a node's offset from its parent (local pose) and for its
/// absolute placement (world pose).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pose<S> {
    pub position: Vector3<S>,
    pub rotation: Quaternion<S>,
    pub scale: Vector3<S>,
}

/// Single-precision pose.
pub type Posef = Pose<f32>;

/// Double-precision pose.
pub type Posed = Pose<f64>;

impl<S: BaseFloat> Default for Pose<S> {
    fn default() -> Self {
        Self::identity()
    }
}

impl<S: BaseFloat> Pose<S> {
    pub fn new(position: Vector3<S>, rotation: Quaternion<S>, scale: Vector3<S>) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Zero offset, identity rotation, unit scale.
    pub fn identity() -> Self {
        Self {
            position: Vector3::new(S::zero(), S::zero(), S::zero()),
            rotation: Quaternion::one(),
            scale: Vector3::new(S::one(), S::one(), S::one()),
        }
    }

    /// Decomposes a composed `T * R * S` matrix.
    ///
    /// Shear cannot be represented and is discarded by the rotation
    /// orthonormalization.
    pub fn from_matrix(matrix: &Matrix4<S>) -> Self {
        Self {
            position: extract_translation(matrix),
            rotation: extract_rotation(matrix),
            scale: extract_scale(matrix),
        }
    }

    /// Places `local` inside the frame described by `self`.
    ///
    /// The translation and rotation of the result match those of
    /// `self.to_matrix() * local.to_matrix()` for unit rotations.
    ///
    /// Offsets are turned by the direction of `self.rotation` only; a
    /// non-unit magnitude is carried in the rotation product and never
    /// stretches positions.
    pub fn compose(&self, local: &Pose<S>) -> Pose<S> {
        let offset = apply_scale(self.scale, local.position);
        let direction = normalize_rotation_safe(self.rotation);
        Pose {
            position: self.position + direction.rotate_vector(offset),
            rotation: self.rotation * local.rotation,
            scale: apply_scale(self.scale, local.scale),
        }
    }

    /// Solves the local pose that `parent.compose()` turns back into `self`.
    ///
    /// Axes where the parent scale is zero cannot be recovered and come back
    /// as zero.
    pub fn relative_to(&self, parent: &Pose<S>) -> Pose<S> {
        let inverse_direction = invert_rotation(normalize_rotation_safe(parent.rotation));
        let offset = inverse_direction.rotate_vector(self.position - parent.position);
        Pose {
            position: divide_scale_safe(offset, parent.scale),
            rotation: invert_rotation(parent.rotation) * self.rotation,
            scale: divide_scale_safe(self.scale, parent.scale),
        }
    }

    pub fn translation_matrix(&self) -> Matrix4<S> {
        Matrix4::from_translation(self.position)
    }

    pub fn rotation_matrix(&self) -> Matrix4<S> {
        Matrix4::from(self.rotation)
    }

    pub fn scale_matrix(&self) -> Matrix4<S> {
        Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    /// Computes the transform matrix from position, rotation, and scale.
    ///
    /// The order of operations is: Translation * Rotation * Scale (TRS)
    pub fn to_matrix(&self) -> Matrix4<S> {
        self.translation_matrix() * self.rotation_matrix() * self.scale_matrix()
    }
}
