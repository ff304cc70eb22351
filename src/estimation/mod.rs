//! Sequential Monte Carlo estimation
//!
//! The filter knows nothing about mazes or targets; callers supply the
//! transition and likelihood functions.

pub mod particle_filter;

pub use particle_filter::ParticleFilter;
