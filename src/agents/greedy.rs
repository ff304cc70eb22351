//! Greedy hunter with no inference
//!
//! Believes every target is equally likely to be on any field cell and steps
//! wherever the expected path distance to the live targets is smallest.

use std::collections::HashMap;
use std::sync::Arc;

use crate::core::types::Position;
use crate::game::agent::{uniform_kind_belief, Decision, HunterAgent, TurnView};
use crate::maze::Maze;
use crate::target::TargetKind;

pub struct GreedyAgent {
    maze: Arc<Maze>,
}

impl GreedyAgent {
    pub fn new(maze: Arc<Maze>) -> Self {
        Self { maze }
    }

    /// Expected path distance from `from` to a target under the uniform belief
    fn expected_distance(&self, from: Position) -> f64 {
        let belief = self.position_belief(0);
        belief
            .iter()
            .filter_map(|(&cell, &p)| self.maze.path_distance(from, cell).ok().map(|d| p * d as f64))
            .sum()
    }
}

impl HunterAgent for GreedyAgent {
    fn name(&self) -> &str {
        "greedy"
    }

    fn decide(&mut self, view: &TurnView, observations: &[u32], decision: &mut Decision) {
        let live = observations.iter().filter(|&&reading| reading != 0).count();
        if live == 0 {
            return;
        }

        let mut best = f64::INFINITY;
        for (direction, next) in view.possible_moves() {
            if !decision.time_remaining() {
                break;
            }
            let expected = live as f64 * self.expected_distance(next);
            if expected < best {
                best = expected;
                decision.commit(direction);
            }
        }
    }

    fn position_belief(&self, _target: usize) -> HashMap<Position, f64> {
        let field = self.maze.field_of_play();
        let p = 1.0 / field.len().max(1) as f64;
        field.iter().map(|&cell| (cell, p)).collect()
    }

    fn kind_belief(&self, _target: usize) -> HashMap<TargetKind, f64> {
        uniform_kind_belief()
    }
}
