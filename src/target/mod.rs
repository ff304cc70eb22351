//! Targets - the mobile quarry the hunter chases
//!
//! Every target follows corridors without reversing, pauses for one turn at
//! each junction, and then picks a branch according to its behavior kind.

pub mod behavior;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::error::{HuntError, Result};
use crate::core::types::{Direction, Position};
use crate::maze::Maze;

pub use behavior::{next_state, possible_next_states, BRAVERY_RADIUS};

/// Targets spawn strictly farther than this (Manhattan) from the hunter start
pub const SPAWN_CLEARANCE: u32 = 2;

/// Movement policy applied at junctions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TargetKind {
    /// Picks any branch
    Random,
    /// Maximizes path distance from the hunter
    Scared,
    /// Heads for the corner farthest from the hunter
    CornerSeeking,
    /// Approaches the hunter until within `BRAVERY_RADIUS`, then flees
    Brave,
    /// Circles the maze centre until the hunter comes within `BRAVERY_RADIUS`
    Orbiting,
}

impl TargetKind {
    pub const ALL: [TargetKind; 5] = [
        TargetKind::Random,
        TargetKind::Scared,
        TargetKind::CornerSeeking,
        TargetKind::Brave,
        TargetKind::Orbiting,
    ];

    pub fn symbol(self) -> char {
        match self {
            Self::Random => 'R',
            Self::Scared => 'S',
            Self::CornerSeeking => 'C',
            Self::Brave => 'B',
            Self::Orbiting => 'O',
        }
    }

    pub fn from_symbol(c: char) -> Option<TargetKind> {
        Self::ALL.into_iter().find(|kind| kind.symbol() == c)
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for TargetKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => {
                Self::from_symbol(c.to_ascii_uppercase()).ok_or_else(|| format!("unknown target kind '{}'", s))
            }
            _ => match s.to_ascii_lowercase().as_str() {
                "random" => Ok(Self::Random),
                "scared" => Ok(Self::Scared),
                "corner" | "corner-seeking" | "cornerseeking" => Ok(Self::CornerSeeking),
                "brave" => Ok(Self::Brave),
                "orbiting" | "orbit" => Ok(Self::Orbiting),
                _ => Err(format!("unknown target kind '{}'", s)),
            },
        }
    }
}

/// Full state of one target
///
/// Immutable value: the behavior engine produces new states rather than
/// mutating, so states double as particle-filter hypotheses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetState {
    pub alive: bool,
    pub kind: TargetKind,
    pub position: Position,
    pub heading: Option<Direction>,
    /// Paused at a junction, deciding which branch to take
    pub thinking: bool,
}

impl TargetState {
    /// A live target that has not moved yet
    pub fn new(kind: TargetKind, position: Position) -> Self {
        Self {
            alive: true,
            kind,
            position,
            heading: None,
            thinking: true,
        }
    }

    /// The frozen state of a captured target
    pub fn captured(kind: TargetKind) -> Self {
        Self {
            alive: false,
            kind,
            position: Position::CAPTURED,
            heading: None,
            thinking: false,
        }
    }

    pub fn with_heading(mut self, heading: Direction) -> Self {
        self.heading = Some(heading);
        self
    }

    pub fn with_thinking(mut self, thinking: bool) -> Self {
        self.thinking = thinking;
        self
    }

    /// A random starting state: uniform kind, uniform spawnable cell
    pub fn spawn<R: Rng + ?Sized>(maze: &Maze, rng: &mut R) -> Result<Self> {
        let cells = spawn_cells(maze);
        let position = *cells.choose(rng).ok_or_else(|| {
            HuntError::InvalidConfig("maze has no cell far enough from the hunter start".into())
        })?;
        let kind = TargetKind::ALL[rng.gen_range(0..TargetKind::ALL.len())];
        Ok(Self::new(kind, position))
    }
}

/// Field cells where a target may start
pub fn spawn_cells(maze: &Maze) -> Vec<Position> {
    let start = maze.hunter_start();
    maze.field_of_play()
        .iter()
        .copied()
        .filter(|pos| pos.manhattan(&start) > SPAWN_CLEARANCE)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_kind_symbols_round_trip() {
        for kind in TargetKind::ALL {
            assert_eq!(TargetKind::from_symbol(kind.symbol()), Some(kind));
            assert_eq!(kind.to_string().parse::<TargetKind>(), Ok(kind));
        }
        assert_eq!("orbiting".parse::<TargetKind>(), Ok(TargetKind::Orbiting));
        assert!("x".parse::<TargetKind>().is_err());
    }

    #[test]
    fn test_spawn_respects_clearance() {
        let maze = Maze::classic();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..200 {
            let target = TargetState::spawn(&maze, &mut rng).unwrap();
            assert!(target.alive);
            assert!(target.thinking);
            assert_eq!(target.heading, None);
            assert!(maze.contains(target.position));
            assert!(target.position.manhattan(&maze.hunter_start()) > SPAWN_CLEARANCE);
        }
    }

    #[test]
    fn test_spawn_covers_every_kind() {
        let maze = Maze::classic();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(TargetState::spawn(&maze, &mut rng).unwrap().kind);
        }
        assert_eq!(seen.len(), TargetKind::ALL.len());
    }

    #[test]
    fn test_spawn_fails_on_cramped_maze() {
        let maze = Maze::parse(&["WWWWW", "W S W", "WWWWW"]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(matches!(
            TargetState::spawn(&maze, &mut rng),
            Err(HuntError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_captured_state_is_parked() {
        let state = TargetState::captured(TargetKind::Brave);
        assert!(!state.alive);
        assert_eq!(state.position, Position::CAPTURED);
        assert_eq!(state.heading, None);
    }
}
