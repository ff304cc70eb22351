//! The hunter - the one piece the agent controls

use serde::{Deserialize, Serialize};

use crate::core::types::{Direction, Position};
use crate::maze::Maze;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HunterState {
    pub position: Position,
    pub heading: Option<Direction>,
}

impl HunterState {
    /// A hunter standing on the maze's start cell
    pub fn new(maze: &Maze) -> Self {
        Self {
            position: maze.hunter_start(),
            heading: None,
        }
    }

    /// Legal moves from the current cell
    pub fn possible_moves(&self, maze: &Maze) -> Vec<(Direction, Position)> {
        maze.moves(self.position)
    }

    /// Move one step if `direction` is legal, otherwise stay put
    ///
    /// Returns whether the hunter moved.
    pub fn apply_move(&mut self, maze: &Maze, direction: Option<Direction>) -> bool {
        let Some(direction) = direction else {
            return false;
        };
        match maze.step(self.position, direction) {
            Some(next) => {
                self.position = next;
                self.heading = Some(direction);
                true
            }
            None => false,
        }
    }
}
