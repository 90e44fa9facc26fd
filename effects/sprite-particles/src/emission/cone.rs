//! Random initial directions inside the emission cone

use std::f32::consts::{PI, TAU};

use glam::Vec3;
use rand::Rng;

use super::rotation::RotationBasis;

/// Draws unit directions within `max_angle` of the emission direction
///
/// The polar angle is drawn over the whole half-turn and then clamped to the
/// cone's half-angle, so samples that fall outside pile up on the rim instead
/// of being rejected. Narrow cones therefore look like a bright ring around a
/// sparse core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConeSampler {
    max_angle: f32,
}

impl ConeSampler {
    /// Create a sampler; the half-angle is clamped to `[0, PI]`
    pub fn new(max_angle: f32) -> Self {
        Self {
            max_angle: clamp_cone_angle(max_angle),
        }
    }

    /// Cone half-angle in radians
    pub fn max_angle(&self) -> f32 {
        self.max_angle
    }

    /// A random unit direction rotated into world space by `basis`
    pub fn sample_direction<R: Rng + ?Sized>(&self, basis: &RotationBasis, rng: &mut R) -> Vec3 {
        let azimuth = TAU * rng.random::<f32>();
        let polar = (PI * rng.random::<f32>()).min(self.max_angle);
        basis.rotate(local_direction(azimuth, polar))
    }

    /// A random direction scaled by `speed`
    pub fn sample_velocity<R: Rng + ?Sized>(
        &self,
        basis: &RotationBasis,
        speed: f32,
        rng: &mut R,
    ) -> Vec3 {
        self.sample_direction(basis, rng) * speed
    }
}

impl Default for ConeSampler {
    fn default() -> Self {
        Self::new(std::f32::consts::FRAC_PI_4)
    }
}

/// Direction in the cone's local frame, where +Y is the cone axis
#[inline]
pub fn local_direction(azimuth: f32, polar: f32) -> Vec3 {
    let (sin_p, cos_p) = polar.sin_cos();
    let (sin_a, cos_a) = azimuth.sin_cos();
    Vec3::new(cos_a * sin_p, cos_p, sin_a * sin_p)
}

/// Clamp a cone half-angle into `[0, PI]`, mapping NaN to zero
pub fn clamp_cone_angle(angle: f32) -> f32 {
    if angle.is_nan() { 0.0 } else { angle.clamp(0.0, PI) }
}
