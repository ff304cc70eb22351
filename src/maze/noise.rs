//! Noisy range sensor
//!
//! A reading is the Manhattan distance plus a symmetric discrete error drawn
//! from a peaked kernel, clamped to `[1, 2 * size + 2]`. Reading 0 is reserved
//! for "target already captured".

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

/// Largest error the sensor can add or subtract
pub const NOISE_HALF_WIDTH: usize = 5;

/// Kernel weights grow by this factor per step toward the centre
pub const NOISE_BASE: f64 = 1.7;

/// Normalized kernel, index `i` meaning error `i - NOISE_HALF_WIDTH`
pub fn error_kernel() -> Vec<f64> {
    let rising: Vec<f64> = (0..=NOISE_HALF_WIDTH)
        .map(|k| NOISE_BASE.powi(k as i32))
        .collect();
    let mut kernel = rising.clone();
    kernel.extend(rising.iter().rev().skip(1));

    let total: f64 = kernel.iter().sum();
    kernel.iter_mut().for_each(|w| *w /= total);
    kernel
}

/// Sensor model with precomputed lookup tables
#[derive(Debug, Clone)]
pub struct NoiseModel {
    kernel: Vec<f64>,
    sampler: WeightedIndex<f64>,
    max_reading: u32,
    max_actual: u32,
    /// P(observed = n | actual = d), row n, column d
    likelihood: Vec<f64>,
    /// Same mass renormalized so each observed row sums to 1
    posterior: Vec<f64>,
}

impl NoiseModel {
    /// Build the model for a maze whose longer side is `size`
    pub fn new(size: usize) -> Self {
        let kernel = error_kernel();
        // All kernel weights are powers of a positive base
        let sampler = WeightedIndex::new(&kernel).expect("kernel weights are positive");

        let max_reading = 2 * size as u32 + 2;
        let max_actual = (2 * size as u32).saturating_sub(1);
        let columns = max_actual as usize + 1;
        let rows = max_reading as usize + 1;

        let mut likelihood = vec![0.0; rows * columns];
        for actual in 1..=max_actual {
            for (i, weight) in kernel.iter().enumerate() {
                let reading = clamp_reading(actual as i64 + i as i64 - NOISE_HALF_WIDTH as i64, max_reading);
                likelihood[reading as usize * columns + actual as usize] += weight;
            }
        }

        let mut posterior = likelihood.clone();
        for row in posterior.chunks_mut(columns) {
            let total: f64 = row.iter().sum();
            if total > 0.0 {
                row.iter_mut().for_each(|p| *p /= total);
            }
        }

        // Reading 0 is only ever produced for a captured target
        likelihood[0] = 1.0;
        posterior[0] = 1.0;

        Self {
            kernel,
            sampler,
            max_reading,
            max_actual,
            likelihood,
            posterior,
        }
    }

    pub fn kernel(&self) -> &[f64] {
        &self.kernel
    }

    /// Largest reading the sensor can produce
    pub fn max_reading(&self) -> u32 {
        self.max_reading
    }

    /// Largest true distance tabulated
    pub fn max_actual(&self) -> u32 {
        self.max_actual
    }

    /// Draw one reading for a true Manhattan distance
    pub fn sample<R: Rng + ?Sized>(&self, manhattan: u32, rng: &mut R) -> u32 {
        let offset = self.sampler.sample(rng) as i64 - NOISE_HALF_WIDTH as i64;
        clamp_reading(manhattan as i64 + offset, self.max_reading)
    }

    /// P(observed | actual); 0 for pairs outside the table
    pub fn likelihood(&self, observed: u32, actual: u32) -> f64 {
        self.lookup(&self.likelihood, observed, actual)
    }

    /// The likelihood renormalized over `actual` for a fixed `observed`
    ///
    /// Equivalent to P(actual | observed) under a uniform prior on the
    /// tabulated distances.
    pub fn observation_posterior(&self, observed: u32, actual: u32) -> f64 {
        self.lookup(&self.posterior, observed, actual)
    }

    fn lookup(&self, table: &[f64], observed: u32, actual: u32) -> f64 {
        if observed > self.max_reading || actual > self.max_actual {
            return 0.0;
        }
        let columns = self.max_actual as usize + 1;
        table[observed as usize * columns + actual as usize]
    }
}

fn clamp_reading(raw: i64, max_reading: u32) -> u32 {
    raw.clamp(1, max_reading as i64) as u32
}
