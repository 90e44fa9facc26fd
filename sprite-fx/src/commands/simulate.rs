//! Headless simulation command

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use glam::Vec3;
use log::info;
use serde::Serialize;
use sprite_particles::{CameraBasis, EmitterGeometry, ParticleManager, PoolStats, RepeatMode};

use crate::cli::{OutputFormat, parse_vec3};
use crate::utils::{
    create_property_table, create_step_bar, format_bytes, format_ms, format_percentage,
    format_vec3,
};

/// Spawn geometry selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum EmitterShape {
    /// Everything spawns at the origin
    #[default]
    Point,
    /// Segment from the origin along +X
    Line,
    /// Square on the XZ plane with a corner at the origin
    Rectangle,
    /// Annulus around the origin on the XZ plane
    Ring,
}

/// Repeat mode selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RepeatArg {
    /// Respawn dead particles
    #[default]
    Wrap,
    /// Let each particle live once
    Clamp,
    /// Reserved; runs as wrap
    Cycle,
}

impl From<RepeatArg> for RepeatMode {
    fn from(arg: RepeatArg) -> Self {
        match arg {
            RepeatArg::Wrap => Self::Wrap,
            RepeatArg::Clamp => Self::Clamp,
            RepeatArg::Cycle => Self::Cycle,
        }
    }
}

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Number of particle slots
    #[arg(short, long, default_value_t = 256)]
    pub capacity: usize,

    /// Number of update calls
    #[arg(short, long, default_value_t = 100)]
    pub steps: u32,

    /// Host time per update in milliseconds
    #[arg(long, default_value_t = 16.0)]
    pub dt: f32,

    /// Seed for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Warm-up iterations (10 passes of 100 ms each) before the run
    #[arg(long, default_value_t = 0)]
    pub warm_up: u32,

    /// Minimum particle lifetime in milliseconds
    #[arg(long, default_value_t = 2500.0)]
    pub lifetime: f32,

    /// Initial speed in units per millisecond
    #[arg(long, default_value_t = 1.0)]
    pub initial_speed: f32,

    /// Emission direction as x,y,z
    #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true, default_value = "0,1,0")]
    pub direction: Vec3,

    /// Emission cone half-angle in degrees
    #[arg(long, default_value_t = 45.0)]
    pub cone_degrees: f32,

    /// Gravity as x,y,z in units per ms squared
    #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true, default_value = "0,0,0")]
    pub gravity: Vec3,

    /// Billboard size at birth
    #[arg(long, default_value_t = 20.0)]
    pub start_size: f32,

    /// Billboard size at death
    #[arg(long, default_value_t = 4.0)]
    pub end_size: f32,

    /// Horizontal position noise per pass
    #[arg(long, default_value_t = 1.0)]
    pub jitter: f32,

    /// Displacement divisor
    #[arg(long, default_value_t = 1.0)]
    pub friction: f32,

    /// Billboard spin in radians per second
    #[arg(long, default_value_t = 0.0)]
    pub spin: f32,

    /// Global time multiplier
    #[arg(long, default_value_t = 1.0)]
    pub time_scale: f32,

    /// What happens to dead particles
    #[arg(long, value_enum, default_value_t = RepeatArg::Wrap)]
    pub repeat: RepeatArg,

    /// Limit releases to the emission rate
    #[arg(long)]
    pub flow: bool,

    /// Particles released per second under flow control (defaults to capacity)
    #[arg(long)]
    pub rate: Option<f32>,

    /// Random variation of the release count
    #[arg(long, default_value_t = 0.0)]
    pub variance: f32,

    /// Allow passes that release nothing under flow control
    #[arg(long)]
    pub no_guaranteed_release: bool,

    /// Spawn geometry
    #[arg(long, value_enum, default_value_t = EmitterShape::Point)]
    pub emitter: EmitterShape,

    /// Emitter origin as x,y,z
    #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true, default_value = "0,0,0")]
    pub origin: Vec3,

    /// Extent of line, rectangle and ring emitters
    #[arg(long, default_value_t = 10.0)]
    pub extent: f32,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

/// Final state of a simulation run
#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub capacity: usize,
    pub steps: u32,
    pub simulated_ms: f64,
    pub active: bool,
    pub stats: PoolStats,
    pub mean_age_ms: Option<f32>,
    pub bounds_min: Option<[f32; 3]>,
    pub bounds_max: Option<[f32; 3]>,
    pub buffer_bytes: usize,
}

pub fn execute(args: SimulateArgs, quiet: bool) -> Result<()> {
    let mut manager = build_manager(&args)?;

    info!(
        "Simulating {} particles for {} steps of {} ms",
        args.capacity, args.steps, args.dt
    );

    manager
        .warm_up(args.warm_up)
        .context("Failed to warm up particle manager")?;

    let show_progress = !quiet && !args.no_progress && args.format == OutputFormat::Table;
    let pb = create_step_bar(args.steps, args.dt, show_progress);
    for _ in 0..args.steps {
        manager
            .update(args.dt)
            .context("Particle update failed")?;
        pb.inc(1);
    }
    pb.finish_and_clear();

    let report = build_report(&manager, args.steps);
    match args.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Table => print_report(&report),
    }
    Ok(())
}

/// Build a configured manager from command-line arguments
pub fn build_manager(args: &SimulateArgs) -> Result<ParticleManager> {
    let mut manager = match args.seed {
        Some(seed) => ParticleManager::seeded(args.capacity, seed),
        None => ParticleManager::new(args.capacity),
    }
    .with_context(|| format!("Failed to create a pool of {} particles", args.capacity))?;

    let config = manager.config_mut();
    config.set_minimum_lifetime_ms(args.lifetime);
    config.set_initial_speed(args.initial_speed);
    config.set_emission_direction(args.direction);
    config.set_max_cone_angle(args.cone_degrees.to_radians());
    config.set_gravity(args.gravity);
    config.set_start_size(args.start_size);
    config.set_end_size(args.end_size);
    config.set_positional_jitter(args.jitter);
    config.set_friction(args.friction);
    config.set_spin_speed(args.spin);
    config.set_speed(args.time_scale);
    config.set_repeat_mode(args.repeat.into());
    config.set_flow_controlled(args.flow);
    if let Some(rate) = args.rate {
        config.set_emission_rate(rate);
    }
    config.set_emission_variance(args.variance);
    config.set_guaranteed_release(!args.no_guaranteed_release);

    manager.set_camera(CameraBasis::default());
    manager
        .set_geometry(emitter_geometry(args.emitter, args.origin, args.extent))
        .context("Invalid emitter geometry")?;
    Ok(manager)
}

fn emitter_geometry(shape: EmitterShape, origin: Vec3, extent: f32) -> EmitterGeometry {
    match shape {
        EmitterShape::Point => EmitterGeometry::point(origin),
        EmitterShape::Line => EmitterGeometry::line(origin, origin + Vec3::X * extent),
        EmitterShape::Rectangle => EmitterGeometry::rectangle(
            origin,
            origin + Vec3::X * extent,
            origin + Vec3::Z * extent,
        ),
        EmitterShape::Ring => EmitterGeometry::ring(origin, Vec3::Y, extent * 0.5, extent),
    }
}

/// Summarise the manager state after a run
pub fn build_report(manager: &ParticleManager, steps: u32) -> SimulationReport {
    let stats = manager.stats();
    let alive: Vec<f32> = manager
        .pool()
        .iter()
        .filter(|p| p.is_alive())
        .map(|p| p.age_ms)
        .collect();
    let mean_age_ms = if alive.is_empty() {
        None
    } else {
        Some(alive.iter().sum::<f32>() / alive.len() as f32)
    };
    let bounds = manager.bounds();

    SimulationReport {
        capacity: manager.capacity(),
        steps,
        simulated_ms: manager.clock().now_ms(),
        active: manager.is_active(),
        stats,
        mean_age_ms,
        bounds_min: bounds.map(|b| b.min.to_array()),
        bounds_max: bounds.map(|b| b.max.to_array()),
        buffer_bytes: manager.buffers().byte_len(),
    }
}

fn print_report(report: &SimulationReport) {
    println!("Particle Simulation");
    println!("===================");
    println!();

    let total = report.stats.total();
    let mut rows = vec![
        ("Capacity", report.capacity.to_string()),
        ("Steps", report.steps.to_string()),
        ("Simulated time", format_ms(report.simulated_ms as f32)),
        ("Active", report.active.to_string()),
        (
            "Alive",
            format!(
                "{} ({})",
                report.stats.alive,
                format_percentage(report.stats.alive, total)
            ),
        ),
        ("Dead", report.stats.dead.to_string()),
        ("Available", report.stats.available.to_string()),
        (
            "Mean age",
            report
                .mean_age_ms
                .map_or_else(|| "N/A".to_string(), format_ms),
        ),
        ("Buffer size", format_bytes(report.buffer_bytes as u64)),
    ];
    match (report.bounds_min, report.bounds_max) {
        (Some(min), Some(max)) => {
            rows.push(("Bounds min", format_vec3(Vec3::from_array(min))));
            rows.push(("Bounds max", format_vec3(Vec3::from_array(max))));
        }
        _ => rows.push(("Bounds", "empty".to_string())),
    }

    create_property_table(&rows).printstd();
}
