//! Emission basis inspection command

use anyhow::{Result, bail};
use clap::Args;
use glam::Vec3;
use serde::Serialize;
use sprite_particles::RotationBasis;
use sprite_particles::emission::{MIN_DIRECTION_LENGTH, REFERENCE_UP};

use crate::cli::{OutputFormat, parse_vec3};
use crate::utils::{create_matrix_table, format_vec3};

#[derive(Args, Debug)]
pub struct BasisArgs {
    /// Emission direction as x,y,z
    #[arg(value_parser = parse_vec3, allow_hyphen_values = true)]
    pub direction: Vec3,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

/// Rotation basis with its sanity checks
#[derive(Debug, Serialize)]
pub struct BasisReport {
    pub direction: [f32; 3],
    /// Row-major matrix
    pub rows: [[f32; 3]; 3],
    pub determinant: f32,
    pub mapped_up: [f32; 3],
}

pub fn execute(args: BasisArgs) -> Result<()> {
    let report = build_report(args.direction)?;
    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Table => print_report(&report),
    }
    Ok(())
}

pub fn build_report(direction: Vec3) -> Result<BasisReport> {
    let Some(basis) = RotationBasis::from_direction(direction) else {
        bail!(
            "Direction {} is shorter than {MIN_DIRECTION_LENGTH} or not finite",
            format_vec3(direction)
        );
    };

    let m = basis.matrix().transpose();
    Ok(BasisReport {
        direction: basis.direction().to_array(),
        rows: [m.x_axis.to_array(), m.y_axis.to_array(), m.z_axis.to_array()],
        determinant: basis.matrix().determinant(),
        mapped_up: basis.rotate(REFERENCE_UP).to_array(),
    })
}

fn print_report(report: &BasisReport) {
    println!("Emission Basis");
    println!("==============");
    println!();
    println!("Direction: {}", format_vec3(Vec3::from_array(report.direction)));
    println!();

    let table = create_matrix_table(&report.rows);
    table.printstd();

    println!();
    println!("Determinant: {:.6}", report.determinant);
    println!("R * up:      {}", format_vec3(Vec3::from_array(report.mapped_up)));
}
