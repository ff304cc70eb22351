//! Bundled hunter agents
//!
//! - `greedy`: no inference, chases the field average
//! - `tracker`: particle filter per target

pub mod greedy;
pub mod tracker;

use std::sync::Arc;

use crate::core::config::GameConfig;
use crate::core::error::{HuntError, Result};
use crate::game::agent::HunterAgent;
use crate::maze::Maze;

pub use greedy::GreedyAgent;
pub use tracker::TrackingAgent;

/// Names accepted by `build`
pub const AGENT_NAMES: [&str; 2] = ["greedy", "tracker"];

/// Construct an agent by name
pub fn build(name: &str, maze: &Arc<Maze>, config: &GameConfig) -> Result<Box<dyn HunterAgent>> {
    match name.to_ascii_lowercase().as_str() {
        "greedy" => Ok(Box::new(GreedyAgent::new(Arc::clone(maze)))),
        "tracker" | "tracking" => Ok(Box::new(TrackingAgent::new(Arc::clone(maze), config)?)),
        _ => Err(HuntError::UnknownAgent(name.to_string())),
    }
}
