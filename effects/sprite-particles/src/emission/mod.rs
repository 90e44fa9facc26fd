//! Where and in which direction particles are born
//!
//! - [`EmitterGeometry`]: spawn positions (point, line, rectangle, ring, mesh)
//! - [`ConeSampler`]: initial directions inside the emission cone
//! - [`RotationBasis`]: carries the canonical cone onto the emission direction

mod cone;
mod geometry;
mod rotation;

pub use cone::{ConeSampler, clamp_cone_angle, local_direction};
pub use geometry::{EmitterGeometry, GeometryKind};
pub use rotation::{MIN_DIRECTION_LENGTH, REFERENCE_UP, RotationBasis};
