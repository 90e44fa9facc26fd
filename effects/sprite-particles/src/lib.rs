//! CPU billboard particle simulation
//!
//! This crate advances a fixed pool of camera-facing point sprites (birth,
//! aging, motion, color and size interpolation, death and rebirth) and writes
//! flat vertex, color, texture coordinate and index buffers for a renderer.
//!
//! # Architecture
//!
//! - [`ParticleManager`]: owns the pool, the clock and flow control, and
//!   publishes [`RenderBuffers`]
//! - [`ParticlePool`]: struct-of-arrays particle storage and per-particle
//!   kinematics
//! - [`ParticleConfig`]: emission, motion and appearance parameters
//! - [`emission`]: spawn positions, emission cone and its rotation basis
//!
//! # Usage
//!
//! ```rust,no_run
//! use glam::Vec3;
//! use sprite_particles::{CameraBasis, EmitterGeometry, ParticleManager};
//!
//! # fn main() -> sprite_particles::Result<()> {
//! let mut manager = ParticleManager::new(256)?;
//! manager.config_mut().set_emission_direction(Vec3::new(0.0, 1.0, 0.2));
//! manager.config_mut().set_gravity(Vec3::new(0.0, -0.0005, 0.0));
//! manager.set_geometry(EmitterGeometry::line(Vec3::ZERO, Vec3::X * 10.0))?;
//! manager.warm_up(3)?;
//!
//! // Once per frame
//! manager.set_camera(CameraBasis::looking_along(Vec3::NEG_Z, Vec3::Y));
//! manager.update(16.0)?;
//! let buffers = manager.buffers();
//! assert_eq!(buffers.vertices.len(), 256 * 4);
//! # Ok(())
//! # }
//! ```

pub mod bounds;
pub mod camera;
pub mod color;
pub mod config;
pub mod controller;
pub mod emission;
pub mod error;
pub mod manager;
pub mod particle;

pub use bounds::Aabb;
pub use camera::CameraBasis;
pub use color::ColorRgba;
pub use config::{ParticleConfig, RepeatMode};
pub use controller::Controller;
pub use emission::{ConeSampler, EmitterGeometry, GeometryKind, RotationBasis};
pub use error::{ParticleError, Result};
pub use manager::{ParticleManager, RenderBuffers};
pub use particle::{Particle, ParticlePool, ParticleStatus, PoolStats};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
