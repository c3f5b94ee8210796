//! Anchor types reported by the AR tracking source

use bevy_math::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a tracked anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnchorId(pub Uuid);

impl AnchorId {
    /// Generate a fresh random anchor ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AnchorId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AnchorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Orientation class of a detected plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaneAlignment {
    /// Floors, tables, ceilings
    Horizontal,
    /// Walls
    Vertical,
}

/// Rigid pose in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Pose at a position with no rotation
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    /// Build a pose from a column-major rigid transform
    ///
    /// Scale is discarded; tracking transforms are unit scale.
    pub fn from_matrix(matrix: Mat4) -> Self {
        let (_scale, rotation, position) = matrix.to_scale_rotation_translation();
        Self { position, rotation }
    }

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }

    /// The transform's local +Z axis in world space (third matrix column)
    pub fn forward_axis(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    pub fn distance_to(&self, point: Vec3) -> f32 {
        self.position.distance(point)
    }
}

/// A tracked real-world surface
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    pub id: AnchorId,
    pub pose: Pose,
    pub alignment: PlaneAlignment,
}

impl Anchor {
    pub fn new(id: AnchorId, pose: Pose, alignment: PlaneAlignment) -> Self {
        Self { id, pose, alignment }
    }

    /// Vertical plane anchor with a fresh ID
    pub fn wall(pose: Pose) -> Self {
        Self::new(AnchorId::new(), pose, PlaneAlignment::Vertical)
    }

    /// Only vertical planes can carry an ad
    pub fn is_wall(&self) -> bool {
        self.alignment == PlaneAlignment::Vertical
    }

    /// Outward normal of the plane, taken from the anchor's +Z axis
    pub fn normal(&self) -> Vec3 {
        self.pose.forward_axis().normalize_or_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_pose_from_matrix() {
        let rotation = Quat::from_rotation_y(FRAC_PI_2);
        let matrix = Mat4::from_rotation_translation(rotation, Vec3::new(1.0, 2.0, 3.0));
        let pose = Pose::from_matrix(matrix);

        assert!(pose.position.abs_diff_eq(Vec3::new(1.0, 2.0, 3.0), 1e-5));
        assert!(pose.forward_axis().abs_diff_eq(matrix.z_axis.truncate(), 1e-5));
    }

    #[test]
    fn test_anchor_normal() {
        let anchor = Anchor::wall(Pose::new(Vec3::ZERO, Quat::from_rotation_y(FRAC_PI_2)));
        assert!(anchor.is_wall());
        assert!(anchor.normal().abs_diff_eq(Vec3::X, 1e-5));
    }

    #[test]
    fn test_horizontal_is_not_wall() {
        let anchor = Anchor::new(AnchorId::new(), Pose::IDENTITY, PlaneAlignment::Horizontal);
        assert!(!anchor.is_wall());
    }
}
