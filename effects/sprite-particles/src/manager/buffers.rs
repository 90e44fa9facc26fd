//! Flat render buffers
//!
//! Every slot owns four consecutive vertices starting at `slot * 4` and six
//! indices starting at `slot * 6`. Texture coordinates and indices never
//! change after construction.

use std::mem::size_of_val;

use glam::{Vec2, Vec3};

use crate::bounds::Aabb;
use crate::color::ColorRgba;

/// Vertices written per particle
pub const VERTICES_PER_PARTICLE: usize = 4;

/// Indices written per particle (two triangles)
pub const INDICES_PER_PARTICLE: usize = 6;

/// Texture coordinates of the four billboard corners
pub const QUAD_TEXCOORDS: [Vec2; 4] = [
    Vec2::new(0.0, 0.0),
    Vec2::new(1.0, 0.0),
    Vec2::new(1.0, 1.0),
    Vec2::new(0.0, 1.0),
];

/// Largest capacity whose vertex indices fit in `u32`
pub const MAX_CAPACITY: usize = (u32::MAX as usize) / VERTICES_PER_PARTICLE;

/// Triangle indices for the quad of `slot`
#[inline]
pub fn quad_indices(slot: u32) -> [u32; INDICES_PER_PARTICLE] {
    let base = slot * VERTICES_PER_PARTICLE as u32;
    [base, base + 1, base + 2, base, base + 2, base + 3]
}

/// Read-only view of the published buffers
#[derive(Debug, Clone, Copy)]
pub struct RenderBuffers<'a> {
    /// Corner positions, four per slot
    pub vertices: &'a [Vec3],
    /// Per-vertex colors, four per slot
    pub colors: &'a [ColorRgba],
    /// Per-vertex texture coordinates, four per slot
    pub texcoords: &'a [Vec2],
    /// Triangle list indices, six per slot
    pub indices: &'a [u32],
    /// Bounds of every alive quad, `None` when nothing is alive
    pub bounds: Option<Aabb>,
}

impl RenderBuffers<'_> {
    /// Number of quads described
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / VERTICES_PER_PARTICLE
    }

    /// Combined size of all four arrays in bytes
    pub fn byte_len(&self) -> usize {
        size_of_val(self.vertices)
            + size_of_val(self.colors)
            + size_of_val(self.texcoords)
            + size_of_val(self.indices)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct OutputBuffers {
    vertices: Vec<Vec3>,
    colors: Vec<ColorRgba>,
    texcoords: Vec<Vec2>,
    indices: Vec<u32>,
    bounds: Option<Aabb>,
}

impl OutputBuffers {
    /// Caller guarantees `capacity <= MAX_CAPACITY`
    pub(crate) fn new(capacity: usize) -> Self {
        let vertex_count = capacity * VERTICES_PER_PARTICLE;
        let texcoords = QUAD_TEXCOORDS
            .iter()
            .copied()
            .cycle()
            .take(vertex_count)
            .collect();
        let indices = (0..capacity as u32).flat_map(quad_indices).collect();

        Self {
            vertices: vec![Vec3::ZERO; vertex_count],
            colors: vec![ColorRgba::TRANSPARENT; vertex_count],
            texcoords,
            indices,
            bounds: None,
        }
    }

    pub(crate) fn publish(&mut self, slot: usize, corners: &[Vec3; 4], color: ColorRgba) {
        let base = slot * VERTICES_PER_PARTICLE;
        self.vertices[base..base + VERTICES_PER_PARTICLE].copy_from_slice(corners);
        self.colors[base..base + VERTICES_PER_PARTICLE].fill(color);
    }

    /// Collapse the quad of `slot` onto `position` and make it transparent
    pub(crate) fn hide(&mut self, slot: usize, position: Vec3) {
        let base = slot * VERTICES_PER_PARTICLE;
        self.vertices[base..base + VERTICES_PER_PARTICLE].fill(position);
        self.colors[base..base + VERTICES_PER_PARTICLE].fill(ColorRgba::TRANSPARENT);
    }

    pub(crate) fn set_bounds(&mut self, bounds: Option<Aabb>) {
        self.bounds = bounds;
    }

    pub(crate) fn view(&self) -> RenderBuffers<'_> {
        RenderBuffers {
            vertices: &self.vertices,
            colors: &self.colors,
            texcoords: &self.texcoords,
            indices: &self.indices,
            bounds: self.bounds,
        }
    }
}
