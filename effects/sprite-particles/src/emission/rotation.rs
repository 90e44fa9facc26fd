//! Rotation of the canonical emission cone onto an arbitrary direction
//!
//! The cone sampler works in a local frame whose axis is [`REFERENCE_UP`].
//! [`RotationBasis`] holds the orthonormal matrix that carries that axis onto
//! the configured emission direction. It is rebuilt only when the direction
//! changes.
//!
//! The matrix is computed in double precision. When the direction is
//! (anti-)parallel to the reference axis the closed-form construction divides
//! by `1 + cos`, so that case is built from two Householder reflections
//! instead.

use glam::{DMat3, DVec3, Mat3, Vec3};

/// Axis of the untransformed emission cone
pub const REFERENCE_UP: Vec3 = Vec3::Y;

/// Directions shorter than this do not produce a basis
pub const MIN_DIRECTION_LENGTH: f32 = 0.1;

/// Orthonormal rotation taking [`REFERENCE_UP`] onto an emission direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationBasis {
    matrix: Mat3,
    direction: Vec3,
}

impl RotationBasis {
    /// Basis for the default emission direction (straight up)
    pub const IDENTITY: Self = Self {
        matrix: Mat3::IDENTITY,
        direction: REFERENCE_UP,
    };

    /// Build the basis for direction `d`
    ///
    /// Returns `None` when `d` is shorter than [`MIN_DIRECTION_LENGTH`] or not
    /// finite; callers keep their previous basis in that case.
    pub fn from_direction(d: Vec3) -> Option<Self> {
        if !d.is_finite() || d.length() < MIN_DIRECTION_LENGTH {
            return None;
        }

        let target = d.as_dvec3().normalize();
        let matrix = rotation_between(REFERENCE_UP.as_dvec3(), target);

        Some(Self {
            matrix: matrix.as_mat3(),
            direction: target.as_vec3(),
        })
    }

    /// The rotation matrix
    pub fn matrix(&self) -> Mat3 {
        self.matrix
    }

    /// Unit emission direction this basis was built for
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Rotate a vector from the cone's local frame into world space
    #[inline]
    pub fn rotate(&self, v: Vec3) -> Vec3 {
        self.matrix * v
    }
}

impl Default for RotationBasis {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Rotation matrix `R` with `R * from == to` for unit vectors `from` and `to`
fn rotation_between(from: DVec3, to: DVec3) -> DMat3 {
    let c = from.dot(to);
    let mut m = [[0.0f64; 3]; 3];

    if c.abs() > 1.0 - f64::EPSILON {
        // Reflect `from` onto the nearest coordinate axis, then that axis onto `to`.
        let axis = least_aligned_axis(from);
        let pv = axis - from;
        let qv = axis - to;

        let c1 = 2.0 / pv.dot(pv);
        let c2 = 2.0 / qv.dot(qv);
        let c3 = c1 * c2 * pv.dot(qv);

        let p = pv.to_array();
        let q = qv.to_array();
        for (i, row) in m.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = -c1 * p[i] * p[j] - c2 * q[i] * q[j] + c3 * q[i] * p[j];
            }
            row[i] += 1.0;
        }
    } else {
        let v = from.cross(to);
        let h = 1.0 / (1.0 + c);
        let hvx = h * v.x;
        let hvz = h * v.z;
        let hvxy = hvx * v.y;
        let hvxz = hvx * v.z;
        let hvyz = hvz * v.y;

        m[0][0] = c + hvx * v.x;
        m[0][1] = hvxy - v.z;
        m[0][2] = hvxz + v.y;
        m[1][0] = hvxy + v.z;
        m[1][1] = c + h * v.y * v.y;
        m[1][2] = hvyz - v.x;
        m[2][0] = hvxz - v.y;
        m[2][1] = hvyz + v.x;
        m[2][2] = c + hvz * v.z;
    }

    // `m` is row-major; glam takes columns.
    DMat3::from_cols_array_2d(&m).transpose()
}

/// Unit coordinate axis along the smallest absolute component of `v`
fn least_aligned_axis(v: DVec3) -> DVec3 {
    let a = v.abs();
    if a.x < a.y {
        if a.x < a.z { DVec3::X } else { DVec3::Z }
    } else if a.y < a.z {
        DVec3::Y
    } else {
        DVec3::Z
    }
}
