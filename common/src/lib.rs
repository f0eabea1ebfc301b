//! Pose-level math shared by the transform hierarchy.
//!
//! The raw vector, quaternion and matrix types come from `cgmath`; this crate
//! adds the position/rotation/scale compositions a scene tree needs, with
//! epsilon-guarded fallbacks for degenerate input.

mod pose;
mod transform_ops;

pub use pose::{Pose, Posed, Posef};
pub use transform_ops::*;

/// Tolerance used when comparing single-precision results.
pub const EPSILON: f32 = 1e-4;

/// Tolerance used when comparing double-precision results.
pub const EPSILON_F64: f64 = 1e-9;
