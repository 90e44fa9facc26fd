//! Particle storage and per-particle simulation
//!
//! Particles live in a [`ParticlePool`] laid out as parallel arrays, one entry
//! per slot. Slots are allocated once and reset in place, so a running
//! simulation never allocates. [`Particle`] is a copy of one slot for
//! observers.

use glam::Vec3;
use rand::Rng;

use crate::camera::CameraBasis;
use crate::color::ColorRgba;
use crate::error::{ParticleError, Result};

/// Lifecycle state of a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub enum ParticleStatus {
    /// Never spawned, or released for respawn
    #[default]
    Available,
    /// Being simulated and drawn
    Alive,
    /// Outlived its lifespan; waiting for the manager
    Dead,
}

/// Parameters shared by every particle during one step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KinematicParams {
    /// Acceleration in units per ms squared
    pub gravity: Vec3,
    /// Displacement divisor, always positive
    pub friction: f32,
    /// Horizontal noise amplitude
    pub jitter: f32,
    /// Spin rate in radians per second
    pub spin_speed: f32,
    /// Size at birth
    pub start_size: f32,
    /// Size at death
    pub end_size: f32,
    /// Color at birth
    pub start_color: ColorRgba,
    /// Color at death
    pub end_color: ColorRgba,
}

impl Default for KinematicParams {
    fn default() -> Self {
        Self {
            gravity: Vec3::ZERO,
            friction: 1.0,
            jitter: 0.0,
            spin_speed: 0.0,
            start_size: 1.0,
            end_size: 1.0,
            start_color: ColorRgba::WHITE,
            end_color: ColorRgba::WHITE,
        }
    }
}

/// Snapshot of a single slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// World-space position
    pub position: Vec3,
    /// Velocity in units per ms
    pub velocity: Vec3,
    /// Time since spawn in ms
    pub age_ms: f32,
    /// Age at which the particle dies
    pub lifespan_ms: f32,
    /// Current billboard half-extent
    pub size: f32,
    /// Current color
    pub color: ColorRgba,
    /// Accumulated spin in radians
    pub spin: f32,
    /// Billboard corners
    pub corners: [Vec3; 4],
    /// Lifecycle state
    pub status: ParticleStatus,
}

impl Particle {
    /// Whether the particle is being simulated
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.status == ParticleStatus::Alive
    }

    /// Age as a fraction of lifespan (0.0 to 1.0)
    #[inline]
    pub fn age_percent(&self) -> f32 {
        life_ratio(self.age_ms, self.lifespan_ms)
    }
}

/// Number of slots in each state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolStats {
    /// Slots ready to spawn
    pub available: usize,
    /// Slots being simulated
    pub alive: usize,
    /// Slots that died and were not respawned
    pub dead: usize,
}

impl PoolStats {
    /// Total number of slots
    pub fn total(&self) -> usize {
        self.available + self.alive + self.dead
    }
}

/// Fixed-size particle storage
#[derive(Debug, Clone)]
pub struct ParticlePool {
    position: Vec<Vec3>,
    path: Vec<Vec3>,
    velocity: Vec<Vec3>,
    age: Vec<f32>,
    lifespan: Vec<f32>,
    size: Vec<f32>,
    color: Vec<ColorRgba>,
    spin: Vec<f32>,
    corners: Vec<[Vec3; 4]>,
    status: Vec<ParticleStatus>,
}

impl ParticlePool {
    /// Allocate `capacity` Available slots at the origin
    pub fn new(capacity: usize) -> Self {
        Self {
            position: vec![Vec3::ZERO; capacity],
            path: vec![Vec3::ZERO; capacity],
            velocity: vec![Vec3::ZERO; capacity],
            age: vec![0.0; capacity],
            lifespan: vec![0.0; capacity],
            size: vec![0.0; capacity],
            color: vec![ColorRgba::TRANSPARENT; capacity],
            spin: vec![0.0; capacity],
            corners: vec![[Vec3::ZERO; 4]; capacity],
            status: vec![ParticleStatus::Available; capacity],
        }
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.status.len()
    }

    /// Whether the pool has no slots
    pub fn is_empty(&self) -> bool {
        self.status.is_empty()
    }

    /// State of `slot`
    pub fn status(&self, slot: usize) -> Option<ParticleStatus> {
        self.status.get(slot).copied()
    }

    /// Copy of `slot`
    pub fn get(&self, slot: usize) -> Option<Particle> {
        let status = *self.status.get(slot)?;
        Some(Particle {
            position: self.position[slot],
            velocity: self.velocity[slot],
            age_ms: self.age[slot],
            lifespan_ms: self.lifespan[slot],
            size: self.size[slot],
            color: self.color[slot],
            spin: self.spin[slot],
            corners: self.corners[slot],
            status,
        })
    }

    /// Snapshots of every slot in index order
    pub fn iter(&self) -> impl Iterator<Item = Particle> + '_ {
        (0..self.len()).filter_map(|slot| self.get(slot))
    }

    /// Per-state slot counts
    pub fn stats(&self) -> PoolStats {
        let mut stats = PoolStats::default();
        for status in &self.status {
            match status {
                ParticleStatus::Available => stats.available += 1,
                ParticleStatus::Alive => stats.alive += 1,
                ParticleStatus::Dead => stats.dead += 1,
            }
        }
        stats
    }

    /// Advance `slot` by `dt_ms`
    ///
    /// Returns `true` only on the step where the particle dies. Slots that
    /// are not alive are left untouched and report `false`. A dying particle
    /// keeps the position, size and color of its last live step.
    ///
    /// Jitter is a fresh horizontal offset from the ballistic path on every
    /// step, so it never drifts further than `jitter` from that path.
    pub fn update_and_check<R: Rng + ?Sized>(
        &mut self,
        slot: usize,
        dt_ms: f32,
        params: &KinematicParams,
        camera: &CameraBasis,
        orientation: f32,
        rng: &mut R,
    ) -> Result<bool> {
        self.check(slot)?;
        if self.status[slot] != ParticleStatus::Alive {
            return Ok(false);
        }

        self.age[slot] += dt_ms;
        let age = self.age[slot];
        let lifespan = self.lifespan[slot];
        if age > lifespan {
            self.status[slot] = ParticleStatus::Dead;
            return Ok(true);
        }

        self.velocity[slot] += params.gravity * dt_ms;
        self.path[slot] += self.velocity[slot] * dt_ms / params.friction;
        self.position[slot] = self.path[slot] + jitter_offset(params.jitter, rng);
        self.spin[slot] += params.spin_speed * dt_ms / 1000.0;

        let t = life_ratio(age, lifespan);
        self.size[slot] = lerp(params.start_size, params.end_size, t);
        self.color[slot] = params.start_color.lerp(params.end_color, t);

        self.update_verts(slot, camera, orientation)?;
        Ok(false)
    }

    /// Rebuild the billboard corners of `slot` facing `camera`
    pub fn update_verts(
        &mut self,
        slot: usize,
        camera: &CameraBasis,
        orientation: f32,
    ) -> Result<()> {
        self.check(slot)?;
        self.corners[slot] = billboard_corners(
            self.position[slot],
            self.size[slot],
            orientation + self.spin[slot],
            camera,
        );
        Ok(())
    }

    /// Reset `slot` in place as a newborn particle
    pub fn recreate(
        &mut self,
        slot: usize,
        velocity: Vec3,
        lifespan_ms: f32,
        position: Vec3,
        params: &KinematicParams,
    ) -> Result<()> {
        self.check(slot)?;
        self.position[slot] = position;
        self.path[slot] = position;
        self.velocity[slot] = velocity;
        self.age[slot] = 0.0;
        self.lifespan[slot] = lifespan_ms;
        self.size[slot] = params.start_size;
        self.color[slot] = params.start_color;
        self.spin[slot] = 0.0;
        self.status[slot] = ParticleStatus::Alive;
        Ok(())
    }

    /// Freeze `slot` as an invisible dead particle
    pub fn kill(&mut self, slot: usize) -> Result<()> {
        self.check(slot)?;
        self.velocity[slot] = Vec3::ZERO;
        self.size[slot] = 0.0;
        self.color[slot] = self.color[slot].with_alpha(0.0);
        self.corners[slot] = [self.position[slot]; 4];
        self.status[slot] = ParticleStatus::Dead;
        Ok(())
    }

    /// Release `slot` for respawn
    pub fn make_available(&mut self, slot: usize) -> Result<()> {
        self.check(slot)?;
        self.status[slot] = ParticleStatus::Available;
        Ok(())
    }

    /// Release every slot for respawn
    pub fn make_all_available(&mut self) {
        self.status.fill(ParticleStatus::Available);
    }

    pub(crate) fn corners(&self, slot: usize) -> &[Vec3; 4] {
        &self.corners[slot]
    }

    pub(crate) fn color(&self, slot: usize) -> ColorRgba {
        self.color[slot]
    }

    pub(crate) fn position(&self, slot: usize) -> Vec3 {
        self.position[slot]
    }

    fn check(&self, slot: usize) -> Result<()> {
        if slot < self.len() {
            Ok(())
        } else {
            Err(ParticleError::SlotOutOfRange {
                slot,
                capacity: self.len(),
            })
        }
    }
}

/// Corners of a quad of half-extent `size` centered on `position`, rotated
/// by `angle` in the camera plane
///
/// Order is bottom-left, bottom-right, top-right, top-left as seen by the
/// camera.
pub fn billboard_corners(
    position: Vec3,
    size: f32,
    angle: f32,
    camera: &CameraBasis,
) -> [Vec3; 4] {
    let (sin, cos) = angle.sin_cos();
    let bx = (camera.right * cos + camera.up * sin) * size;
    let by = (camera.up * cos - camera.right * sin) * size;
    [
        position - bx - by,
        position + bx - by,
        position + bx + by,
        position - bx + by,
    ]
}

fn jitter_offset<R: Rng + ?Sized>(jitter: f32, rng: &mut R) -> Vec3 {
    if jitter == 0.0 {
        return Vec3::ZERO;
    }
    let jx = jitter * (2.0 * rng.random::<f32>() - 1.0);
    let jz = jitter * (2.0 * rng.random::<f32>() - 1.0);
    Vec3::new(jx, 0.0, jz)
}

#[inline]
fn life_ratio(age: f32, lifespan: f32) -> f32 {
    if lifespan > 0.0 {
        (age / lifespan).clamp(0.0, 1.0)
    } else {
        1.0
    }
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn still_params() -> KinematicParams {
        KinematicParams {
            start_size: 10.0,
            end_size: 2.0,
            start_color: ColorRgba::new(1.0, 0.0, 0.0, 1.0),
            end_color: ColorRgba::new(0.0, 0.0, 1.0, 0.0),
            ..KinematicParams::default()
        }
    }

    fn spawned(lifespan: f32, params: &KinematicParams) -> ParticlePool {
        let mut pool = ParticlePool::new(2);
        pool.recreate(0, Vec3::ZERO, lifespan, Vec3::ZERO, params).unwrap();
        pool
    }

    #[test]
    fn test_new_pool_is_available() {
        let pool = ParticlePool::new(3);
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.stats(), PoolStats { available: 3, alive: 0, dead: 0 });
        assert_eq!(pool.get(0).unwrap().age_ms, 0.0);
        assert!(pool.get(3).is_none());
    }

    #[test]
    fn test_dies_exactly_once() {
        let params = still_params();
        let cam = CameraBasis::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut pool = spawned(100.0, &params);

        assert!(!pool.update_and_check(0, 60.0, &params, &cam, 0.0, &mut rng).unwrap());
        assert!(!pool.update_and_check(0, 40.0, &params, &cam, 0.0, &mut rng).unwrap());
        assert!(pool.update_and_check(0, 1.0, &params, &cam, 0.0, &mut rng).unwrap());
        assert_eq!(pool.status(0), Some(ParticleStatus::Dead));
        for _ in 0..5 {
            assert!(!pool.update_and_check(0, 50.0, &params, &cam, 0.0, &mut rng).unwrap());
        }
        assert_eq!(pool.get(0).unwrap().age_ms, 101.0);
    }

    #[test]
    fn test_available_slots_do_not_age() {
        let params = still_params();
        let mut pool = ParticlePool::new(1);
        let mut rng = StdRng::seed_from_u64(1);
        let died = pool
            .update_and_check(0, 500.0, &params, &CameraBasis::default(), 0.0, &mut rng)
            .unwrap();
        assert!(!died);
        assert_eq!(pool.get(0).unwrap().age_ms, 0.0);
    }

    #[test]
    fn test_interpolation() {
        let params = still_params();
        let cam = CameraBasis::default();
        let mut rng = StdRng::seed_from_u64(2);
        let mut pool = spawned(100.0, &params);

        let p = pool.get(0).unwrap();
        assert_eq!(p.size, 10.0);
        assert_eq!(p.color, params.start_color);

        pool.update_and_check(0, 50.0, &params, &cam, 0.0, &mut rng).unwrap();
        let p = pool.get(0).unwrap();
        assert!((p.size - 6.0).abs() < 1e-5);
        assert!((p.color.a - 0.5).abs() < 1e-5);

        pool.update_and_check(0, 50.0, &params, &cam, 0.0, &mut rng).unwrap();
        let p = pool.get(0).unwrap();
        assert!((p.size - 2.0).abs() < 1e-5);
        assert_eq!(p.color.a, 0.0);
    }

    #[test]
    fn test_motion() {
        let params = KinematicParams {
            gravity: Vec3::new(0.0, -0.001, 0.0),
            friction: 2.0,
            ..still_params()
        };
        let mut pool = ParticlePool::new(1);
        pool.recreate(0, Vec3::X, 1000.0, Vec3::ZERO, &params).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        pool.update_and_check(0, 10.0, &params, &CameraBasis::default(), 0.0, &mut rng)
            .unwrap();

        let p = pool.get(0).unwrap();
        assert!((p.velocity - Vec3::new(1.0, -0.01, 0.0)).length() < 1e-6);
        assert!((p.position - Vec3::new(5.0, -0.05, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_jitter_is_horizontal_and_bounded() {
        let params = KinematicParams {
            jitter: 0.5,
            ..still_params()
        };
        let mut rng = StdRng::seed_from_u64(4);
        let mut pool = spawned(100_000.0, &params);
        for _ in 0..2000 {
            pool.update_and_check(0, 10.0, &params, &CameraBasis::default(), 0.0, &mut rng)
                .unwrap();
            let offset = pool.get(0).unwrap().position;
            assert_eq!(offset.y, 0.0);
            assert!(offset.x.abs() <= 0.5 && offset.z.abs() <= 0.5, "drifted to {offset}");
        }
    }

    #[test]
    fn test_jitter_rides_on_ballistic_path() {
        let params = KinematicParams {
            jitter: 1.0,
            ..still_params()
        };
        let mut rng = StdRng::seed_from_u64(6);
        let mut pool = ParticlePool::new(1);
        pool.recreate(0, Vec3::X, 10_000.0, Vec3::ZERO, &params).unwrap();
        for step in 1..=100 {
            pool.update_and_check(0, 10.0, &params, &CameraBasis::default(), 0.0, &mut rng)
                .unwrap();
            let expected = Vec3::new(10.0 * step as f32, 0.0, 0.0);
            let p = pool.get(0).unwrap().position;
            assert!((p.x - expected.x).abs() <= 1.0 + 1e-3);
            assert!(p.z.abs() <= 1.0);
        }
    }

    #[test]
    fn test_billboard_corners() {
        let cam = CameraBasis::default();
        let c = billboard_corners(Vec3::ZERO, 1.0, 0.0, &cam);
        assert_eq!(c[0], Vec3::new(-1.0, -1.0, 0.0));
        assert_eq!(c[1], Vec3::new(1.0, -1.0, 0.0));
        assert_eq!(c[2], Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(c[3], Vec3::new(-1.0, 1.0, 0.0));

        let r = billboard_corners(Vec3::ZERO, 1.0, std::f32::consts::FRAC_PI_2, &cam);
        assert!((r[0] - Vec3::new(1.0, -1.0, 0.0)).length() < 1e-6);
        assert!((r[2] - Vec3::new(-1.0, 1.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_kill_collapses_quad() {
        let params = still_params();
        let mut pool = spawned(100.0, &params);
        pool.update_verts(0, &CameraBasis::default(), 0.0).unwrap();
        pool.kill(0).unwrap();

        let p = pool.get(0).unwrap();
        assert_eq!(p.status, ParticleStatus::Dead);
        assert_eq!(p.size, 0.0);
        assert_eq!(p.velocity, Vec3::ZERO);
        assert_eq!(p.color.a, 0.0);
        assert!(p.corners.iter().all(|c| *c == p.position));
    }

    #[test]
    fn test_slot_out_of_range() {
        let mut pool = ParticlePool::new(1);
        assert_eq!(
            pool.kill(1),
            Err(ParticleError::SlotOutOfRange { slot: 1, capacity: 1 })
        );
        assert!(pool.make_available(7).is_err());
    }
}
