//! Particle filter over an arbitrary discrete hidden state
//!
//! The population is a map from particle value to weight. Typical cycle:
//!
//! 1. `add_particle` for each initial hypothesis
//! 2. `advance` every particle through the transition model
//! 3. `reweight` by the likelihood of the latest observation
//! 4. `resample` back to integer counts
//! 5. repeat from 2
//!
//! `advance` requires integer weights, so it must not run between `reweight`
//! and `resample`.

use ahash::RandomState;
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;
use std::hash::Hash;

use crate::core::error::{HuntError, Result};

type Weights<T> = HashMap<T, f64, RandomState>;

/// Fixed hasher seeds keep iteration order, and so seeded runs, reproducible
fn weight_map<T>() -> Weights<T> {
    HashMap::with_hasher(RandomState::with_seeds(
        0x243f_6a88_85a3_08d3,
        0x1319_8a2e_0370_7344,
        0xa409_3822_299f_31d0,
        0x082e_fa98_ec4e_6c89,
    ))
}

/// Weighted population of hypotheses about a hidden state
#[derive(Debug, Clone)]
pub struct ParticleFilter<T: Clone + Eq + Hash> {
    particle_count: usize,
    weights: Weights<T>,
}

impl<T: Clone + Eq + Hash> Default for ParticleFilter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Eq + Hash> ParticleFilter<T> {
    /// An empty population
    pub fn new() -> Self {
        Self {
            particle_count: 0,
            weights: weight_map(),
        }
    }

    /// A population holding one particle per item
    pub fn with_particles(particles: impl IntoIterator<Item = T>) -> Self {
        let mut filter = Self::new();
        for particle in particles {
            filter.add_particle(particle);
        }
        filter
    }

    /// Add one copy of `particle`. Only valid before the first resample.
    pub fn add_particle(&mut self, particle: T) {
        self.particle_count += 1;
        *self.weights.entry(particle).or_insert(0.0) += 1.0;
    }

    /// Total number of particles N
    pub fn particle_count(&self) -> usize {
        self.particle_count
    }

    /// Number of distinct particle values present
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn weight(&self, particle: &T) -> f64 {
        self.weights.get(particle).copied().unwrap_or(0.0)
    }

    pub fn total_weight(&self) -> f64 {
        self.weights.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&T, f64)> {
        self.weights.iter().map(|(particle, &weight)| (particle, weight))
    }

    /// Move every particle to a successor drawn uniformly from `transition`
    ///
    /// Each of a value's `c` copies draws independently. Requires integer
    /// weights, i.e. a fresh population or one just resampled.
    pub fn advance<R, F>(&mut self, rng: &mut R, mut transition: F) -> Result<()>
    where
        R: Rng + ?Sized,
        F: FnMut(&T) -> Result<Vec<T>>,
    {
        let mut next = weight_map();
        for (particle, &weight) in &self.weights {
            let copies = weight.round() as usize;
            if copies == 0 {
                continue;
            }
            let successors = transition(particle)?;
            if successors.is_empty() {
                return Err(HuntError::NoSuccessor);
            }
            for _ in 0..copies {
                if let Some(successor) = successors.choose(rng) {
                    *next.entry(successor.clone()).or_insert(0.0) += 1.0;
                }
            }
        }
        self.weights = next;
        Ok(())
    }

    /// Multiply every weight by `likelihood(particle)`
    ///
    /// Weights are left unnormalized until the next `resample`.
    pub fn reweight<F>(&mut self, mut likelihood: F)
    where
        F: FnMut(&T) -> f64,
    {
        for (particle, weight) in self.weights.iter_mut() {
            *weight *= likelihood(particle);
        }
    }

    /// Draw N particles in proportion to current weights
    ///
    /// Fails with `DegenerateWeights` when no particle carries any weight;
    /// the population is left untouched in that case.
    pub fn resample<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<()> {
        let (particles, weights): (Vec<T>, Vec<f64>) = self
            .weights
            .iter()
            .map(|(particle, &weight)| (particle.clone(), weight))
            .unzip();

        let total: f64 = weights.iter().sum();
        if total <= 0.0 || !total.is_finite() {
            return Err(HuntError::DegenerateWeights);
        }
        let sampler = WeightedIndex::new(&weights).map_err(|_| HuntError::DegenerateWeights)?;

        let mut counts = vec![0usize; particles.len()];
        for _ in 0..self.particle_count {
            counts[sampler.sample(rng)] += 1;
        }

        let mut next = weight_map();
        for (particle, count) in particles.into_iter().zip(counts) {
            if count > 0 {
                next.insert(particle, count as f64);
            }
        }
        self.weights = next;
        Ok(())
    }

    /// Weight / N for every particle present
    pub fn probabilities(&self) -> HashMap<T, f64> {
        let n = self.particle_count.max(1) as f64;
        self.weights
            .iter()
            .map(|(particle, &weight)| (particle.clone(), weight / n))
            .collect()
    }

    /// Probabilities summed over a projection of the particle value
    pub fn marginal<K, F>(&self, mut project: F) -> HashMap<K, f64>
    where
        K: Eq + Hash,
        F: FnMut(&T) -> K,
    {
        let n = self.particle_count.max(1) as f64;
        let mut marginal = HashMap::new();
        for (particle, &weight) in &self.weights {
            *marginal.entry(project(particle)).or_insert(0.0) += weight / n;
        }
        marginal
    }

    /// The heaviest particle, ties broken uniformly at random
    pub fn most_likely<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<T> {
        let best = self
            .weights
            .values()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        let tied: Vec<&T> = self
            .weights
            .iter()
            .filter(|(_, weight)| **weight == best)
            .map(|(particle, _)| particle)
            .collect();
        tied.choose(rng).map(|&particle| particle.clone())
    }
}
