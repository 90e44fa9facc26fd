//! Emitter configuration
//!
//! [`ParticleConfig`] is the single mutable description of how a manager
//! spawns and animates its particles. Setters never fail: out-of-range values
//! are clamped and the adjustment is logged at debug level.

use std::f32::consts::FRAC_PI_4;

use glam::Vec3;
use log::{debug, warn};
use rand::Rng;

use crate::color::ColorRgba;
use crate::emission::{ConeSampler, RotationBasis, clamp_cone_angle};
use crate::particle::KinematicParams;

/// Default minimum particle lifetime in milliseconds
pub const DEFAULT_MINIMUM_LIFETIME_MS: f32 = 2500.0;

/// Minimum lifetime used when a negative value is configured
pub const FALLBACK_MINIMUM_LIFETIME_MS: f32 = 1.0;

/// Default step granularity of the manager clock in milliseconds
pub const DEFAULT_UPDATE_PRECISION_MS: f32 = 10.0;

/// Default start size of a billboard
pub const DEFAULT_START_SIZE: f32 = 20.0;

/// Default end size of a billboard
pub const DEFAULT_END_SIZE: f32 = 4.0;

/// What happens to a slot after its particle dies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub enum RepeatMode {
    /// Dead particles are respawned
    #[default]
    Wrap,
    /// Particles live once; dead ones are frozen in place
    Clamp,
    /// Reserved; simulated as [`RepeatMode::Wrap`]
    Cycle,
}

impl RepeatMode {
    /// The mode the simulation actually runs
    pub fn effective(self) -> Self {
        match self {
            Self::Cycle => Self::Wrap,
            mode => mode,
        }
    }
}

/// Spawn, motion and appearance parameters of a particle emitter
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleConfig {
    emission_rate: f32,
    emission_variance: f32,
    minimum_lifetime_ms: f32,
    initial_speed: f32,
    emission_direction: Vec3,
    basis: RotationBasis,
    cone: ConeSampler,
    gravity: Vec3,
    start_color: ColorRgba,
    end_color: ColorRgba,
    start_size: f32,
    end_size: f32,
    positional_jitter: f32,
    friction: f32,
    repeat_mode: RepeatMode,
    flow_controlled: bool,
    guaranteed_release: bool,
    update_precision_ms: f32,
    speed: f32,
    spin_speed: f32,
    orientation: f32,
    active_window_ms: (f32, f32),
    warm_up_iterations: u32,
}

impl ParticleConfig {
    /// Defaults for a pool of `capacity` particles; the emission rate equals
    /// the capacity so the whole pool can turn over once per second
    pub fn for_capacity(capacity: usize) -> Self {
        Self {
            emission_rate: capacity as f32,
            ..Self::default()
        }
    }

    /// Particles released per second when flow control is on
    pub fn emission_rate(&self) -> f32 {
        self.emission_rate
    }

    /// Set the release rate; negative values become zero
    pub fn set_emission_rate(&mut self, rate: f32) {
        self.emission_rate = clamp_non_negative("emission_rate", rate);
    }

    /// Relative random variation of the release count
    pub fn emission_variance(&self) -> f32 {
        self.emission_variance
    }

    /// Set the release variance; negative values become zero
    pub fn set_emission_variance(&mut self, variance: f32) {
        self.emission_variance = clamp_non_negative("emission_variance", variance);
    }

    /// Shortest lifetime a particle can be given
    pub fn minimum_lifetime_ms(&self) -> f32 {
        self.minimum_lifetime_ms
    }

    /// Set the minimum lifetime; negative values are replaced by
    /// [`FALLBACK_MINIMUM_LIFETIME_MS`]
    pub fn set_minimum_lifetime_ms(&mut self, lifetime: f32) {
        self.minimum_lifetime_ms = if lifetime >= 0.0 {
            lifetime
        } else {
            debug!(
                "minimum_lifetime_ms {lifetime} is negative, using {FALLBACK_MINIMUM_LIFETIME_MS}"
            );
            FALLBACK_MINIMUM_LIFETIME_MS
        };
    }

    /// Draw a lifespan: `min * (0.5 + U(0, 1))`, never shorter than `min`
    pub fn random_lifespan<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        let min = self.minimum_lifetime_ms;
        let life = min * (0.5 + rng.random::<f32>());
        life.max(min)
    }

    /// Initial speed in world units per millisecond
    pub fn initial_speed(&self) -> f32 {
        self.initial_speed
    }

    /// Set the initial speed
    pub fn set_initial_speed(&mut self, speed: f32) {
        self.initial_speed = speed;
    }

    /// Unit emission direction
    pub fn emission_direction(&self) -> Vec3 {
        self.emission_direction
    }

    /// Point the emission cone along `direction`
    ///
    /// Directions shorter than [`crate::emission::MIN_DIRECTION_LENGTH`] are
    /// ignored; the previous direction and basis stay in effect.
    pub fn set_emission_direction(&mut self, direction: Vec3) {
        match RotationBasis::from_direction(direction) {
            Some(basis) => {
                self.basis = basis;
                self.emission_direction = basis.direction();
            }
            None => debug!("ignoring degenerate emission direction {direction}"),
        }
    }

    /// Cached rotation for the current emission direction
    pub fn rotation_basis(&self) -> &RotationBasis {
        &self.basis
    }

    /// Half-angle of the emission cone in radians
    pub fn max_cone_angle(&self) -> f32 {
        self.cone.max_angle()
    }

    /// Set the cone half-angle; clamped to `[0, PI]`
    pub fn set_max_cone_angle(&mut self, angle: f32) {
        let clamped = clamp_cone_angle(angle);
        if clamped != angle {
            debug!("max_cone_angle {angle} clamped to {clamped}");
        }
        self.cone = ConeSampler::new(clamped);
    }

    /// Sampler for initial directions
    pub fn cone(&self) -> &ConeSampler {
        &self.cone
    }

    /// Draw an initial velocity inside the emission cone
    pub fn random_velocity<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        self.cone.sample_velocity(&self.basis, self.initial_speed, rng)
    }

    /// Constant acceleration in units per ms squared
    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    /// Set the constant acceleration
    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = gravity;
    }

    /// Color at birth
    pub fn start_color(&self) -> ColorRgba {
        self.start_color
    }

    /// Set the color at birth
    pub fn set_start_color(&mut self, color: ColorRgba) {
        self.start_color = color;
    }

    /// Color at the end of life
    pub fn end_color(&self) -> ColorRgba {
        self.end_color
    }

    /// Set the color at the end of life
    pub fn set_end_color(&mut self, color: ColorRgba) {
        self.end_color = color;
    }

    /// Billboard half-extent at birth
    pub fn start_size(&self) -> f32 {
        self.start_size
    }

    /// Set the size at birth; negative values become zero
    pub fn set_start_size(&mut self, size: f32) {
        self.start_size = clamp_non_negative("start_size", size);
    }

    /// Billboard half-extent at the end of life
    pub fn end_size(&self) -> f32 {
        self.end_size
    }

    /// Set the size at the end of life; negative values become zero
    pub fn set_end_size(&mut self, size: f32) {
        self.end_size = clamp_non_negative("end_size", size);
    }

    /// Maximum per-step horizontal noise added to positions
    pub fn positional_jitter(&self) -> f32 {
        self.positional_jitter
    }

    /// Set the positional noise amplitude; the sign is ignored
    pub fn set_positional_jitter(&mut self, jitter: f32) {
        self.positional_jitter = if jitter.is_nan() { 0.0 } else { jitter.abs() };
    }

    /// Divisor applied to displacement each step
    pub fn friction(&self) -> f32 {
        self.friction
    }

    /// Set the friction divisor; values that are not strictly positive are
    /// ignored
    pub fn set_friction(&mut self, friction: f32) {
        if friction > 0.0 && friction.is_finite() {
            self.friction = friction;
        } else {
            debug!("friction {friction} must be positive, keeping {}", self.friction);
        }
    }

    /// Configured repeat mode
    pub fn repeat_mode(&self) -> RepeatMode {
        self.repeat_mode
    }

    /// Set the repeat mode
    pub fn set_repeat_mode(&mut self, mode: RepeatMode) {
        if mode == RepeatMode::Cycle {
            warn!("repeat mode Cycle is not supported, particles will wrap");
        }
        self.repeat_mode = mode;
    }

    /// Whether releases are limited to the emission rate
    pub fn flow_controlled(&self) -> bool {
        self.flow_controlled
    }

    /// Enable or disable flow control
    pub fn set_flow_controlled(&mut self, enabled: bool) {
        self.flow_controlled = enabled;
    }

    /// Whether at least one particle is released per step under flow control
    pub fn guaranteed_release(&self) -> bool {
        self.guaranteed_release
    }

    /// Set the release floor switch
    pub fn set_guaranteed_release(&mut self, enabled: bool) {
        self.guaranteed_release = enabled;
    }

    /// Smallest clock advance that triggers a simulation pass
    pub fn update_precision_ms(&self) -> f32 {
        self.update_precision_ms
    }

    /// Set the step granularity; negative values become zero
    pub fn set_update_precision_ms(&mut self, precision: f32) {
        self.update_precision_ms = clamp_non_negative("update_precision_ms", precision);
    }

    /// Global time multiplier
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Set the time multiplier; negative values become zero
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = clamp_non_negative("speed", speed);
    }

    /// Billboard spin in radians per second
    pub fn spin_speed(&self) -> f32 {
        self.spin_speed
    }

    /// Set the billboard spin rate
    pub fn set_spin_speed(&mut self, spin_speed: f32) {
        self.spin_speed = spin_speed;
    }

    /// Base rotation of every billboard in radians
    pub fn orientation(&self) -> f32 {
        self.orientation
    }

    /// Set the base billboard rotation
    pub fn set_orientation(&mut self, orientation: f32) {
        self.orientation = orientation;
    }

    /// Simulation-time window in which particles are updated
    pub fn active_window_ms(&self) -> (f32, f32) {
        self.active_window_ms
    }

    /// Set the active window; bounds given in the wrong order are swapped
    pub fn set_active_window_ms(&mut self, min: f32, max: f32) {
        self.active_window_ms = if min <= max {
            (min, max)
        } else {
            debug!("active window ({min}, {max}) reversed");
            (max, min)
        };
    }

    /// Whether simulation time `t` lies inside the active window
    pub fn in_active_window(&self, t: f64) -> bool {
        let (min, max) = self.active_window_ms;
        t >= f64::from(min) && t <= f64::from(max)
    }

    /// Warm-up passes applied by `warm_up_configured`
    pub fn warm_up_iterations(&self) -> u32 {
        self.warm_up_iterations
    }

    /// Set the configured warm-up passes
    pub fn set_warm_up_iterations(&mut self, iterations: u32) {
        self.warm_up_iterations = iterations;
    }

    /// Per-step parameters handed to the particle pool
    pub fn kinematics(&self) -> KinematicParams {
        KinematicParams {
            gravity: self.gravity,
            friction: self.friction,
            jitter: self.positional_jitter,
            spin_speed: self.spin_speed,
            start_size: self.start_size,
            end_size: self.end_size,
            start_color: self.start_color,
            end_color: self.end_color,
        }
    }
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            emission_rate: 0.0,
            emission_variance: 0.0,
            minimum_lifetime_ms: DEFAULT_MINIMUM_LIFETIME_MS,
            initial_speed: 1.0,
            emission_direction: Vec3::Y,
            basis: RotationBasis::IDENTITY,
            cone: ConeSampler::new(FRAC_PI_4),
            gravity: Vec3::ZERO,
            start_color: ColorRgba::RED,
            end_color: ColorRgba::YELLOW_TRANSPARENT,
            start_size: DEFAULT_START_SIZE,
            end_size: DEFAULT_END_SIZE,
            positional_jitter: 1.0,
            friction: 1.0,
            repeat_mode: RepeatMode::Wrap,
            flow_controlled: false,
            guaranteed_release: true,
            update_precision_ms: DEFAULT_UPDATE_PRECISION_MS,
            speed: 1.0,
            spin_speed: 0.0,
            orientation: 0.0,
            active_window_ms: (0.0, f32::MAX),
            warm_up_iterations: 0,
        }
    }
}

fn clamp_non_negative(name: &str, value: f32) -> f32 {
    if value >= 0.0 {
        value
    } else {
        debug!("{name} {value} clamped to 0");
        0.0
    }
}
