use std::time::Instant;
use crate::error::FlowError;
use crate::flow::field::{Interpolation, VelocityField, VelocitySource};
use crate::flow::grid::Grid3;
use crate::flow::integrator::Scheme;
use crate::flow::region::Region;
use crate::flow::states::{Direction, NVec3, Seed};
use crate::flow::tracer::{FlowlineTracer, TraceConfig};

/// Helper to build a swirling field on an `n`^3 unit grid
fn make_field(n: usize) -> Result<VelocityField, FlowError> {
    let dims = [n, n, n];
    let c = 0.5 * n as f64;
    // rotation about the z axis plus a slow updraft
    let vx = Grid3::from_fn(dims, |_, j, _| -(j as f64 + 0.5 - c))?;
    let vy = Grid3::from_fn(dims, |i, _, _| i as f64 + 0.5 - c)?;
    let vz = Grid3::filled(dims, 0.1)?;
    let region = Region::new(NVec3::zeros(), NVec3::repeat(1.0), dims)?;
    VelocityField::new(region, vx, vy, vz)
}

/// Helper to build `count` deterministic positions inside an `n`^3 grid
fn make_points(n: usize, count: usize) -> Vec<NVec3> {
    let half = 0.5 * n as f64;
    (0..count)
        .map(|i| {
            let i_f = i as f64;
            // deterministic positions, no rand needed
            NVec3::new(
                half + (i_f * 0.37).sin() * 0.4 * half,
                half + (i_f * 0.13).cos() * 0.4 * half,
                half + (i_f * 0.07).sin() * 0.4 * half,
            )
        })
        .collect()
}

pub fn bench_interpolation() -> Result<(), FlowError> {
    // Different grid sizes to test
    let ns = [16, 32, 64, 128];
    let samples = 200_000;

    for n in ns {
        let points = make_points(n, samples);

        for kernel in [Interpolation::Trilinear, Interpolation::Nearest] {
            let field = make_field(n)?.with_interpolation(kernel);

            // Warm up
            let mut ok = 0usize;
            for p in points.iter().take(1000) {
                ok += field.sample(p).is_ok() as usize;
            }

            let t0 = Instant::now();
            for p in &points {
                ok += field.sample(p).is_ok() as usize;
            }
            let per_sample = t0.elapsed().as_secs_f64() / samples as f64;

            println!("n = {n:4}, {kernel:?}: {:10.3e} s/sample ({ok} ok)", per_sample);
        }
    }

    Ok(())
}

pub fn bench_schemes() -> Result<(), FlowError> {
    let ns = [16, 32, 64];
    let seeds_per_grid = 256;

    for n in ns {
        let field = make_field(n)?;
        let seeds: Vec<Seed> = make_points(n, seeds_per_grid)
            .into_iter()
            .enumerate()
            .map(|(i, p)| Seed::new(p, i as i32))
            .collect();

        for scheme in [Scheme::Euler, Scheme::Rk4] {
            let config = TraceConfig {
                scheme,
                direction: Direction::Forward,
                step_length: 0.25,
                max_steps: 2000,
                max_length: None,
            };
            let tracer = FlowlineTracer::new(&field, config)?;

            let t0 = Instant::now();
            let mut points = 0usize;
            for seed in &seeds {
                points += tracer.trace(seed).len();
            }
            let elapsed = t0.elapsed().as_secs_f64();

            println!(
                "n = {n:4}, {scheme:?}: {:8.6} s total, {:10.3e} s/point ({points} points)",
                elapsed,
                elapsed / points.max(1) as f64
            );
        }
    }

    Ok(())
}
