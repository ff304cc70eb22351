//! Game configuration with documented defaults
//!
//! Values can be loaded from TOML; any field left out keeps its default.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::{HuntError, Result};

/// Longest per-turn time limit or turn delay accepted (one day)
pub const MAX_WAIT_SECS: f64 = 86_400.0;

/// Configuration for one episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === EPISODE ===
    /// Number of targets spawned at the start of an episode
    pub targets: usize,

    /// Hard cap on episode length
    ///
    /// The episode also ends as soon as every target is captured.
    pub max_turns: u32,

    // === SCORING ===
    /// One-time reward for each captured target
    pub capture_reward: i64,

    /// Cost charged per still-alive target at the end of every turn
    pub turn_penalty: i64,

    // === AGENT ===
    /// Wall-clock time the agent has to commit a move each turn (seconds)
    ///
    /// Commits arriving after this are silently dropped and the hunter stays put.
    pub time_limit_secs: f64,

    /// Particle population size per target for the tracking agent
    pub particles_per_target: usize,

    // === REPORTING ===
    /// 0 = observations only, 1 = also agent beliefs, 2 = also ground truth
    pub information_level: u8,

    /// Pause after each turn (seconds). Only the CLI honours this.
    pub turn_delay_secs: f64,

    /// RNG seed. A random seed is drawn when absent.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            targets: 4,
            max_turns: 1000,
            capture_reward: 1000,
            turn_penalty: 1,
            time_limit_secs: 1.0,
            particles_per_target: 2000,
            information_level: 0,
            turn_delay_secs: 0.0,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.max_turns == 0 {
            return Err(HuntError::InvalidConfig("max_turns must be at least 1".into()));
        }

        if self.particles_per_target == 0 {
            return Err(HuntError::InvalidConfig(
                "particles_per_target must be positive".into(),
            ));
        }

        if !(0.0..=MAX_WAIT_SECS).contains(&self.time_limit_secs) {
            return Err(HuntError::InvalidConfig(format!(
                "time_limit_secs ({}) must be between 0 and {}",
                self.time_limit_secs, MAX_WAIT_SECS
            )));
        }

        if !(0.0..=MAX_WAIT_SECS).contains(&self.turn_delay_secs) {
            return Err(HuntError::InvalidConfig(format!(
                "turn_delay_secs ({}) must be between 0 and {}",
                self.turn_delay_secs, MAX_WAIT_SECS
            )));
        }

        if self.information_level > 2 {
            return Err(HuntError::InvalidConfig(format!(
                "information_level ({}) must be 0, 1 or 2",
                self.information_level
            )));
        }

        Ok(())
    }
}

/// Load and validate a config from a TOML file
pub fn load_config(path: impl AsRef<Path>) -> Result<GameConfig> {
    let contents = fs::read_to_string(path.as_ref())?;
    let config: GameConfig = toml::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}
