//! Spawn-position sources

use std::fmt;
use std::sync::Arc;

use glam::Vec3;
use rand::Rng;

use crate::error::{ParticleError, Result};

/// Which kind of emitter geometry is in use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub enum GeometryKind {
    /// Single fixed point
    Point,
    /// Line segment
    Line,
    /// Parallelogram spanned by three corners
    Rectangle,
    /// Flat annulus
    Ring,
    /// Vertices of an external mesh
    Mesh,
}

impl GeometryKind {
    /// Lower-case name used in logs and errors
    pub fn name(self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::Line => "line",
            Self::Rectangle => "rectangle",
            Self::Ring => "ring",
            Self::Mesh => "mesh",
        }
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where newly (re)spawned particles are placed
///
/// Sampling is stateless: each call draws an independent point.
#[derive(Debug, Clone, PartialEq)]
pub enum EmitterGeometry {
    /// Every particle starts at `origin`
    Point {
        /// Spawn position
        origin: Vec3,
    },
    /// Uniformly along the segment `start`-`end`
    Line {
        /// First endpoint
        start: Vec3,
        /// Second endpoint
        end: Vec3,
    },
    /// Uniformly over `a + s * (b - a) + t * (c - a)` for `s, t` in `[0, 1]`
    Rectangle {
        /// Shared corner
        a: Vec3,
        /// Corner along the first edge
        b: Vec3,
        /// Corner along the second edge
        c: Vec3,
    },
    /// Uniformly over the annulus around `center` perpendicular to `normal`
    Ring {
        /// Ring center
        center: Vec3,
        /// Plane normal; need not be unit length
        normal: Vec3,
        /// Radius of the hole
        inner_radius: f32,
        /// Radius of the rim
        outer_radius: f32,
    },
    /// A random vertex of a mesh owned elsewhere
    MeshVertices {
        /// Read-only vertex positions
        vertices: Arc<[Vec3]>,
    },
}

impl EmitterGeometry {
    /// Point emitter
    pub fn point(origin: Vec3) -> Self {
        Self::Point { origin }
    }

    /// Line-segment emitter
    pub fn line(start: Vec3, end: Vec3) -> Self {
        Self::Line { start, end }
    }

    /// Rectangle emitter from three corners
    pub fn rectangle(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self::Rectangle { a, b, c }
    }

    /// Ring emitter; radii are made non-negative and ordered
    pub fn ring(center: Vec3, normal: Vec3, inner_radius: f32, outer_radius: f32) -> Self {
        let inner = inner_radius.max(0.0);
        let outer = outer_radius.max(0.0);
        Self::Ring {
            center,
            normal,
            inner_radius: inner.min(outer),
            outer_radius: inner.max(outer),
        }
    }

    /// Mesh-vertex emitter; fails if there are no vertices
    pub fn mesh(vertices: impl Into<Arc<[Vec3]>>) -> Result<Self> {
        let geometry = Self::MeshVertices {
            vertices: vertices.into(),
        };
        geometry.validate()?;
        Ok(geometry)
    }

    /// Kind of this geometry
    pub fn kind(&self) -> GeometryKind {
        match self {
            Self::Point { .. } => GeometryKind::Point,
            Self::Line { .. } => GeometryKind::Line,
            Self::Rectangle { .. } => GeometryKind::Rectangle,
            Self::Ring { .. } => GeometryKind::Ring,
            Self::MeshVertices { .. } => GeometryKind::Mesh,
        }
    }

    /// Check that the geometry has data to sample from
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::MeshVertices { vertices } if vertices.is_empty() => {
                Err(ParticleError::EmptyEmitter {
                    kind: GeometryKind::Mesh.name(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Draw one spawn position
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec3> {
        let position = match self {
            Self::Point { origin } => *origin,
            Self::Line { start, end } => start.lerp(*end, rng.random::<f32>()),
            Self::Rectangle { a, b, c } => {
                let s = rng.random::<f32>();
                let t = rng.random::<f32>();
                *a + (*b - *a) * s + (*c - *a) * t
            }
            Self::Ring {
                center,
                normal,
                inner_radius,
                outer_radius,
            } => {
                let (u, v) = normal.normalize_or(Vec3::Y).any_orthonormal_pair();
                // sqrt keeps the density uniform over the annulus area
                let inner_sq = inner_radius * inner_radius;
                let outer_sq = outer_radius * outer_radius;
                let radius = (inner_sq + rng.random::<f32>() * (outer_sq - inner_sq)).sqrt();
                let (sin, cos) = (std::f32::consts::TAU * rng.random::<f32>()).sin_cos();
                *center + (u * cos + v * sin) * radius
            }
            Self::MeshVertices { vertices } => {
                if vertices.is_empty() {
                    return Err(ParticleError::EmptyEmitter {
                        kind: GeometryKind::Mesh.name(),
                    });
                }
                vertices[rng.random_range(0..vertices.len())]
            }
        };
        Ok(position)
    }
}

impl Default for EmitterGeometry {
    fn default() -> Self {
        Self::Point { origin: Vec3::ZERO }
    }
}
