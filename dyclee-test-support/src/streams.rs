//! Synthetic 2-D sample-stream generators used by `dyclee-core`'s scenario
//! tests (two well-separated blobs, concentric rings, uniform noise, and an
//! online drift scenario).
//!
//! Every generator is seeded so tests are reproducible; none of this module
//! reads files or touches the network, keeping it a pure in-memory fixture
//! factory.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

/// Draws one sample from a standard normal distribution using the
/// Box-Muller transform.
fn standard_normal(rng: &mut SmallRng) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen_range(0.0..1.0);
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// Generates `n` 2-D samples drawn from two well-separated Gaussian blobs,
/// split evenly between a cluster centred at `(0, 0)` and one centred at
/// `(10, 10)`, each with unit standard deviation.
///
/// Used by scenario S1 ("Two blobs").
#[must_use]
pub fn two_blobs(n: usize, seed: u64) -> Vec<Vec<f64>> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let centers = [(0.0_f64, 0.0_f64), (10.0_f64, 10.0_f64)];
    (0..n)
        .map(|idx| {
            let (cx, cy) = centers[idx % 2];
            vec![
                cx + standard_normal(&mut rng),
                cy + standard_normal(&mut rng),
            ]
        })
        .collect()
}

/// Generates `n` 2-D samples drawn from two concentric rings (an inner ring
/// at relative radius `factor` and an outer ring at radius `1.0`), each
/// perturbed by Gaussian noise with standard deviation `noise`.
///
/// Used by scenario S2 ("Concentric circles"), mirroring
/// `sklearn.datasets.make_circles`.
#[must_use]
pub fn concentric_circles(n: usize, seed: u64, factor: f64, noise: f64) -> Vec<Vec<f64>> {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..n)
        .map(|idx| {
            let angle = 2.0 * PI * (idx as f64) / (n as f64).max(1.0);
            let radius = if idx % 2 == 0 { 1.0 } else { factor };
            vec![
                radius * angle.cos() + noise * standard_normal(&mut rng),
                radius * angle.sin() + noise * standard_normal(&mut rng),
            ]
        })
        .collect()
}

/// Generates `n` 2-D samples drawn uniformly from `[0, 1]^2`.
///
/// Used by scenario S3 ("Uniform noise").
#[must_use]
pub fn uniform_noise(n: usize, seed: u64) -> Vec<Vec<f64>> {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..n)
        .map(|_| vec![rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0)])
        .collect()
}

/// Generates an online drift stream: `n_each` samples around `(0, 0)`
/// followed by `n_each` samples around `(10, 10)`, each with unit standard
/// deviation, in ingestion order.
///
/// Used by scenario S4 ("Online drift").
#[must_use]
pub fn drifting_blobs(n_each: usize, seed: u64) -> Vec<Vec<f64>> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut samples = Vec::with_capacity(n_each.saturating_mul(2));
    for _ in 0..n_each {
        samples.push(vec![standard_normal(&mut rng), standard_normal(&mut rng)]);
    }
    for _ in 0..n_each {
        samples.push(vec![
            10.0 + standard_normal(&mut rng),
            10.0 + standard_normal(&mut rng),
        ]);
    }
    samples
}
