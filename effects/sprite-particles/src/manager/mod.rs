//! Particle manager runtime state
//!
//! [`ParticleManager`] owns a fixed pool of particles and drives it from a
//! host-supplied time delta. Each simulation pass ages every slot, respawns
//! the ones that died according to the repeat mode and flow control, then
//! publishes every slot's quad into flat buffers for the renderer.

mod buffers;
mod clock;
mod flow;

use log::{debug, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::bounds::Aabb;
use crate::camera::CameraBasis;
use crate::config::{ParticleConfig, RepeatMode};
use crate::controller::Controller;
use crate::emission::EmitterGeometry;
use crate::error::{ParticleError, Result};
use crate::particle::{KinematicParams, Particle, ParticlePool, ParticleStatus, PoolStats};

pub use buffers::{
    INDICES_PER_PARTICLE, MAX_CAPACITY, QUAD_TEXCOORDS, RenderBuffers, VERTICES_PER_PARTICLE,
    quad_indices,
};
pub use clock::SimulationClock;
pub use flow::{FlowControl, RELEASE_WINDOW_MS};

use buffers::OutputBuffers;

/// Step fed to `update` by [`ParticleManager::warm_up`], in ms
pub const WARM_UP_STEP_MS: f32 = 100.0;

/// Passes run per warm-up iteration
pub const WARM_UP_STEPS_PER_ITERATION: u32 = 10;

/// Owner and driver of a particle pool
#[derive(Debug)]
pub struct ParticleManager<R: Rng = StdRng> {
    config: ParticleConfig,
    geometry: EmitterGeometry,
    camera: CameraBasis,
    pool: ParticlePool,
    buffers: OutputBuffers,
    clock: SimulationClock,
    flow: FlowControl,
    active: bool,
    rng: R,
}

impl ParticleManager<StdRng> {
    /// Manager for `capacity` particles, seeded from the operating system
    pub fn new(capacity: usize) -> Result<Self> {
        Self::with_rng(capacity, StdRng::from_os_rng())
    }

    /// Manager for `capacity` particles with a fixed seed
    pub fn seeded(capacity: usize, seed: u64) -> Result<Self> {
        Self::with_rng(capacity, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> ParticleManager<R> {
    /// Manager for `capacity` particles drawing randomness from `rng`
    ///
    /// Every slot starts Available; the first simulation pass spawns them.
    pub fn with_rng(capacity: usize, rng: R) -> Result<Self> {
        if capacity == 0 || capacity > MAX_CAPACITY {
            return Err(ParticleError::InvalidCapacity {
                capacity,
                max: MAX_CAPACITY,
            });
        }

        debug!("Creating particle manager with {capacity} slots");
        Ok(Self {
            config: ParticleConfig::for_capacity(capacity),
            geometry: EmitterGeometry::default(),
            camera: CameraBasis::default(),
            pool: ParticlePool::new(capacity),
            buffers: OutputBuffers::new(capacity),
            clock: SimulationClock::default(),
            flow: FlowControl::default(),
            active: true,
            rng,
        })
    }

    /// Number of particle slots
    pub fn capacity(&self) -> usize {
        self.pool.len()
    }

    /// Current configuration
    pub fn config(&self) -> &ParticleConfig {
        &self.config
    }

    /// Mutable configuration; setters clamp their input
    pub fn config_mut(&mut self) -> &mut ParticleConfig {
        &mut self.config
    }

    /// Replace the whole configuration
    pub fn set_config(&mut self, config: ParticleConfig) {
        self.config = config;
    }

    /// Spawn-position source
    pub fn geometry(&self) -> &EmitterGeometry {
        &self.geometry
    }

    /// Change the spawn-position source
    pub fn set_geometry(&mut self, geometry: EmitterGeometry) -> Result<()> {
        geometry.validate()?;
        debug!("Emitter geometry set to {}", geometry.kind());
        self.geometry = geometry;
        Ok(())
    }

    /// Camera axes used for billboarding
    pub fn camera(&self) -> &CameraBasis {
        &self.camera
    }

    /// Set the camera axes; read on the next pass
    pub fn set_camera(&mut self, camera: CameraBasis) {
        self.camera = camera;
    }

    /// Direct read access to the pool
    pub fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    /// Snapshot of one slot
    pub fn particle(&self, slot: usize) -> Option<Particle> {
        self.pool.get(slot)
    }

    /// Per-state slot counts
    pub fn stats(&self) -> PoolStats {
        self.pool.stats()
    }

    /// The simulation clock
    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    /// Release accounting for flow control
    pub fn flow(&self) -> &FlowControl {
        &self.flow
    }

    /// Buffers published by the last pass
    pub fn buffers(&self) -> RenderBuffers<'_> {
        self.buffers.view()
    }

    /// Bounds of the alive quads after the last pass
    pub fn bounds(&self) -> Option<Aabb> {
        self.buffers.view().bounds
    }

    /// Whether `update` does any work
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Turn the manager on or off
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Advance the simulation by `dt_ms` of host time
    pub fn update(&mut self, dt_ms: f32) -> Result<()> {
        if !self.active {
            return Ok(());
        }

        let Some(elapsed) = self
            .clock
            .advance(dt_ms * self.config.speed(), self.config.update_precision_ms())
        else {
            return Ok(());
        };

        let now = self.clock.now_ms();
        if !self.config.in_active_window(now) {
            trace!("t={now:.1}ms outside active window, skipping pass");
            return Ok(());
        }

        self.step(now, elapsed)?;
        self.publish();
        Ok(())
    }

    /// Mark every slot Available and reactivate the manager
    pub fn force_respawn(&mut self) {
        debug!("Forcing respawn of {} particles", self.pool.len());
        self.pool.make_all_available();
        self.active = true;
    }

    /// Run `iterations * 10` passes of 100 ms so particle ages spread out
    pub fn warm_up(&mut self, iterations: u32) -> Result<()> {
        let steps = iterations.saturating_mul(WARM_UP_STEPS_PER_ITERATION);
        trace!("Warming up with {steps} steps");
        for _ in 0..steps {
            self.update(WARM_UP_STEP_MS)?;
        }
        Ok(())
    }

    /// Warm up with the configured number of iterations
    pub fn warm_up_configured(&mut self) -> Result<()> {
        self.warm_up(self.config.warm_up_iterations())
    }

    fn step(&mut self, now: f64, elapsed: f32) -> Result<()> {
        let flow_controlled = self.config.flow_controlled();
        let mut budget = if flow_controlled {
            self.flow.budget(now, elapsed, &self.config, &mut self.rng)
        } else {
            0
        };

        let params = self.config.kinematics();
        let orientation = self.config.orientation();
        let mode = self.config.repeat_mode().effective();

        let mut candidates = 0;
        let mut respawned = 0;
        for slot in 0..self.pool.len() {
            self.pool.update_and_check(
                slot,
                elapsed,
                &params,
                &self.camera,
                orientation,
                &mut self.rng,
            )?;

            let status = self.pool.status(slot);
            if status == Some(ParticleStatus::Alive) || (flow_controlled && budget == 0) {
                continue;
            }
            candidates += 1;

            if mode == RepeatMode::Clamp && status == Some(ParticleStatus::Dead) {
                self.pool.kill(slot)?;
                continue;
            }

            self.respawn(slot, &params, orientation)?;
            respawned += 1;
            if flow_controlled {
                budget -= 1;
                self.flow.record_release();
            }
        }

        trace!(
            "Pass at t={now:.1}ms covered {elapsed:.1}ms, respawned {respawned}/{candidates} candidates"
        );

        if candidates == self.pool.len() && respawned == 0 {
            debug!("Every particle is dead and none respawned, deactivating");
            self.active = false;
        }
        Ok(())
    }

    fn respawn(&mut self, slot: usize, params: &KinematicParams, orientation: f32) -> Result<()> {
        let position = self.geometry.sample(&mut self.rng)?;
        let velocity = self.config.random_velocity(&mut self.rng);
        let lifespan = self.config.random_lifespan(&mut self.rng);
        self.pool
            .recreate(slot, velocity, lifespan, position, params)?;
        self.pool.update_verts(slot, &self.camera, orientation)
    }

    fn publish(&mut self) {
        let mut bounds: Option<Aabb> = None;
        for slot in 0..self.pool.len() {
            if self.pool.status(slot) == Some(ParticleStatus::Alive) {
                let corners = self.pool.corners(slot);
                self.buffers.publish(slot, corners, self.pool.color(slot));
                for &corner in corners {
                    match bounds.as_mut() {
                        Some(aabb) => aabb.expand_by_point(corner),
                        None => bounds = Some(Aabb::from_point(corner)),
                    }
                }
            } else {
                self.buffers.hide(slot, self.pool.position(slot));
            }
        }
        self.buffers.set_bounds(bounds);
    }
}

impl<R: Rng> Controller for ParticleManager<R> {
    fn update(&mut self, dt_ms: f32) -> Result<()> {
        ParticleManager::update(self, dt_ms)
    }

    fn is_active(&self) -> bool {
        ParticleManager::is_active(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn manager(capacity: usize) -> ParticleManager {
        ParticleManager::seeded(capacity, 42).unwrap()
    }

    #[test]
    fn test_invalid_capacity() {
        assert!(matches!(
            ParticleManager::seeded(0, 1),
            Err(ParticleError::InvalidCapacity { capacity: 0, .. })
        ));
    }

    #[test]
    fn test_first_pass_spawns_everything() {
        let mut m = manager(8);
        assert_eq!(m.stats().available, 8);
        m.update(16.0).unwrap();
        assert_eq!(m.stats().alive, 8);
        assert!(m.bounds().is_some());
    }

    #[test]
    fn test_precision_gate() {
        let mut m = manager(2);
        m.update(5.0).unwrap();
        assert_eq!(m.stats().available, 2);
        m.update(5.0).unwrap();
        assert_eq!(m.stats().alive, 2);
    }

    #[test]
    fn test_inactive_manager_ignores_updates() {
        let mut m = manager(2);
        m.set_active(false);
        m.update(100.0).unwrap();
        assert_eq!(m.clock().now_ms(), 0.0);
        assert_eq!(m.stats().available, 2);
    }

    #[test]
    fn test_speed_scales_time() {
        let mut m = manager(1);
        m.config_mut().set_speed(0.5);
        m.update(40.0).unwrap();
        assert_eq!(m.clock().now_ms(), 20.0);
    }

    #[test]
    fn test_keeps_stepping_after_long_uptime() {
        let mut m = manager(2);
        m.config_mut().set_minimum_lifetime_ms(1.0e9);
        m.update(3.0e8).unwrap();
        m.force_respawn();

        for _ in 0..100 {
            m.update(16.0).unwrap();
        }
        assert_eq!(m.clock().now_ms(), 3.0e8 + 1600.0);
        // Respawned on the first small step, aged by the other 99
        assert_eq!(m.particle(0).unwrap().age_ms, 99.0 * 16.0);
    }

    #[test]
    fn test_empty_mesh_geometry_rejected() {
        let mut m = manager(1);
        let err = m
            .set_geometry(EmitterGeometry::MeshVertices {
                vertices: Vec::<Vec3>::new().into(),
            })
            .unwrap_err();
        assert_eq!(err, ParticleError::EmptyEmitter { kind: "mesh" });
        assert_eq!(m.geometry(), &EmitterGeometry::default());
    }

    #[test]
    fn test_controller_trait() {
        fn drive(c: &mut dyn Controller) {
            c.update(20.0).unwrap();
        }
        let mut m = manager(3);
        drive(&mut m);
        assert!(Controller::is_active(&m));
        assert_eq!(m.stats().alive, 3);
    }
}
