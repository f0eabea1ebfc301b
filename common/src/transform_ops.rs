//! Transform operations for combining and decomposing positions, rotations, and scales.
//!
//! Pure functions over `cgmath` types, generic over the scalar precision. Every
//! operation that could divide by zero or normalize a zero-length value falls
//! back to a well-defined result instead of producing NaN.

use cgmath::{
    BaseFloat, ElementWise, InnerSpace, Matrix3, Matrix4, One, Quaternion, Rad, Rotation,
    Rotation3, Vector3, Vector4,
};

// =============================================================================
// Scale Utilities
// =============================================================================

/// Applies component-wise scale to an existing scale vector.
pub fn apply_scale<S: BaseFloat>(current_scale: Vector3<S>, scale_factor: Vector3<S>) -> Vector3<S> {
    current_scale.mul_element_wise(scale_factor)
}

/// Divides `value` by `divisor` component-wise.
///
/// Components whose divisor is within epsilon of zero yield zero: a collapsed
/// axis carries no information that could be recovered.
pub fn divide_scale_safe<S: BaseFloat>(value: Vector3<S>, divisor: Vector3<S>) -> Vector3<S> {
    let div = |v: S, d: S| if d.abs() > S::epsilon() { v / d } else { S::zero() };
    Vector3::new(
        div(value.x, divisor.x),
        div(value.y, divisor.y),
        div(value.z, divisor.z),
    )
}

// =============================================================================
// Rotation Utilities
// =============================================================================

/// Composes a rotation by applying `delta` after `current` in the frame of `current`.
///
/// This is a post-multiplication (`current * delta`), which is how both the
/// local and world `rotate` helpers on a transform node are defined.
pub fn post_rotate<S: BaseFloat>(current: Quaternion<S>, delta: Quaternion<S>) -> Quaternion<S> {
    current * delta
}

/// Inverts a rotation quaternion.
///
/// Unlike a bare conjugate this also handles quaternions that were never
/// normalized. A zero quaternion inverts to the identity.
pub fn invert_rotation<S: BaseFloat>(rotation: Quaternion<S>) -> Quaternion<S> {
    if rotation.magnitude2() > S::epsilon() {
        rotation.invert()
    } else {
        Quaternion::one()
    }
}

/// Normalizes a quaternion, returning the identity for near-zero input.
pub fn normalize_rotation_safe<S: BaseFloat>(rotation: Quaternion<S>) -> Quaternion<S> {
    if rotation.magnitude2() > S::epsilon() {
        rotation.normalize()
    } else {
        Quaternion::one()
    }
}

/// Creates a rotation quaternion from an axis and angle, with safety for zero-length axes.
///
/// If the axis has near-zero magnitude, returns an identity quaternion.
///
/// # Arguments
/// * `axis` - The axis to rotate around (does not need to be normalized)
/// * `angle` - The rotation angle in radians
pub fn quaternion_from_axis_angle_safe<S: BaseFloat>(axis: Vector3<S>, angle: S) -> Quaternion<S> {
    if axis.magnitude2() > S::epsilon() {
        Quaternion::from_axis_angle(axis.normalize(), Rad(angle))
    } else {
        Quaternion::one()
    }
}

// =============================================================================
// Axis Computation
// =============================================================================

/// Computes the local X axis (right) for a given orientation.
pub fn local_axis_x<S: BaseFloat>(rotation: Quaternion<S>) -> Vector3<S> {
    normalize_rotation_safe(rotation).rotate_vector(Vector3::unit_x())
}

/// Computes the local Y axis (up) for a given orientation.
pub fn local_axis_y<S: BaseFloat>(rotation: Quaternion<S>) -> Vector3<S> {
    normalize_rotation_safe(rotation).rotate_vector(Vector3::unit_y())
}

/// Computes the local Z axis (forward) for a given orientation.
pub fn local_axis_z<S: BaseFloat>(rotation: Quaternion<S>) -> Vector3<S> {
    normalize_rotation_safe(rotation).rotate_vector(Vector3::unit_z())
}

/// Computes all three local axes for a given orientation.
///
/// # Returns
/// A tuple of (right, up, forward) vectors in the orientation's parent space
pub fn local_axes<S: BaseFloat>(rotation: Quaternion<S>) -> (Vector3<S>, Vector3<S>, Vector3<S>) {
    (
        local_axis_x(rotation),
        local_axis_y(rotation),
        local_axis_z(rotation),
    )
}

// =============================================================================
// Matrix Decomposition
// =============================================================================

/// Extracts the translation column of a composed transform matrix.
pub fn extract_translation<S: BaseFloat>(matrix: &Matrix4<S>) -> Vector3<S> {
    matrix.w.truncate()
}

/// Extracts the per-axis scale of a composed transform matrix.
///
/// Each component is the length of the corresponding rotation basis vector.
pub fn extract_scale<S: BaseFloat>(matrix: &Matrix4<S>) -> Vector3<S> {
    Vector3::new(
        matrix.x.truncate().magnitude(),
        matrix.y.truncate().magnitude(),
        matrix.z.truncate().magnitude(),
    )
}

/// Extracts the rotation of a composed transform matrix.
///
/// The basis vectors are orthonormalized by dividing out their length before
/// conversion. A collapsed basis vector is replaced by its unit axis.
pub fn extract_rotation<S: BaseFloat>(matrix: &Matrix4<S>) -> Quaternion<S> {
    let scale = extract_scale(matrix);

    let basis = |column: Vector4<S>, length: S, fallback: Vector3<S>| {
        if length > S::epsilon() {
            column.truncate() / length
        } else {
            fallback
        }
    };

    let rotation = Matrix3::from_cols(
        basis(matrix.x, scale.x, Vector3::unit_x()),
        basis(matrix.y, scale.y, Vector3::unit_y()),
        basis(matrix.z, scale.z, Vector3::unit_z()),
    );

    normalize_rotation_safe(Quaternion::from(rotation))
}
