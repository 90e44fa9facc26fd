//! Camera orientation consumed for billboarding

use glam::{Quat, Vec3};

/// The two camera axes a billboard quad is spanned by
///
/// Both vectors are expected to be unit length and perpendicular; they are
/// read once per manager update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraBasis {
    /// Screen-right direction in world space
    pub right: Vec3,
    /// Screen-up direction in world space
    pub up: Vec3,
}

impl CameraBasis {
    /// Create a basis from explicit right and up vectors
    pub fn new(right: Vec3, up: Vec3) -> Self {
        Self { right, up }
    }

    /// Basis of a camera rotated by `rotation` from the default view down -Z
    pub fn from_rotation(rotation: Quat) -> Self {
        Self {
            right: rotation * Vec3::X,
            up: rotation * Vec3::Y,
        }
    }

    /// Basis of a camera looking along `forward` with `world_up` as a hint
    ///
    /// Falls back to the default basis if the two vectors are collinear.
    pub fn looking_along(forward: Vec3, world_up: Vec3) -> Self {
        let right = forward.cross(world_up).normalize_or_zero();
        if right == Vec3::ZERO {
            return Self::default();
        }
        let up = right.cross(forward).normalize();
        Self { right, up }
    }

    /// Direction from the quad toward the viewer
    pub fn facing(&self) -> Vec3 {
        self.right.cross(self.up)
    }
}

impl Default for CameraBasis {
    fn default() -> Self {
        Self {
            right: Vec3::X,
            up: Vec3::Y,
        }
    }
}
