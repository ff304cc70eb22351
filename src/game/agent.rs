//! Agent contract for the hunter
//!
//! Architecture mirrors the battle AI split:
//! - `HunterAgent` trait defines the interface for swappable strategies
//! - `TurnView` is the read-only snapshot the agent sees each call
//! - `Decision` is the only way to influence the game, and it enforces the
//!   per-turn deadline

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::core::types::{Direction, Position, Turn};
use crate::game::hunter::HunterState;
use crate::maze::Maze;
use crate::target::TargetKind;

/// What the agent is allowed to know at a given moment
#[derive(Debug, Clone, Copy)]
pub struct TurnView<'a> {
    pub maze: &'a Maze,
    pub hunter: HunterState,
    pub turn: Turn,
    pub target_count: usize,
}

impl<'a> TurnView<'a> {
    pub fn new(maze: &'a Maze, hunter: HunterState, turn: Turn, target_count: usize) -> Self {
        Self {
            maze,
            hunter,
            turn,
            target_count,
        }
    }

    /// Legal hunter moves this turn
    pub fn possible_moves(&self) -> Vec<(Direction, Position)> {
        self.hunter.possible_moves(self.maze)
    }
}

/// Longest decision window; larger limits are clamped to it
const LONGEST_WINDOW: Duration = Duration::from_secs(100 * 365 * 86_400);

/// Deadline-guarded move slot handed to `HunterAgent::decide`
///
/// Commits before the deadline replace earlier ones; commits after it are
/// dropped. The deadline is checked when committing, never preemptively.
#[derive(Debug, Clone)]
pub struct Decision {
    deadline: Instant,
    chosen: Option<Direction>,
}

impl Decision {
    /// A decision window starting now
    pub fn new(time_limit: Duration) -> Self {
        let now = Instant::now();
        let deadline = now
            .checked_add(time_limit.min(LONGEST_WINDOW))
            .unwrap_or(now);
        Self::with_deadline(deadline)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline,
            chosen: None,
        }
    }

    pub fn time_remaining(&self) -> bool {
        Instant::now() < self.deadline
    }

    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Record `direction` as the move; returns false if the deadline passed
    pub fn commit(&mut self, direction: Direction) -> bool {
        if self.time_remaining() {
            self.chosen = Some(direction);
            true
        } else {
            false
        }
    }

    pub fn chosen(&self) -> Option<Direction> {
        self.chosen
    }
}

/// Trait for hunter decision-making strategies
pub trait HunterAgent {
    /// Short identifier used in logs and summaries
    fn name(&self) -> &str;

    /// Pick a move from this turn's readings (0 = target already captured)
    ///
    /// Only moves committed through `decision` before its deadline count.
    fn decide(&mut self, view: &TurnView, observations: &[u32], decision: &mut Decision);

    /// Target `target` was caught on the hunter's cell
    fn on_captured(&mut self, _target: usize, _view: &TurnView) {}

    /// Target `target` is not on the hunter's cell
    fn on_not_captured(&mut self, _target: usize, _view: &TurnView) {}

    /// Every target has taken its move for this turn
    fn on_targets_moved(&mut self, _view: &TurnView) {}

    /// Belief over where `target` is; non-negative, sums to 1
    fn position_belief(&self, target: usize) -> HashMap<Position, f64>;

    /// Belief over `target`'s behavior kind; non-negative, sums to 1
    fn kind_belief(&self, target: usize) -> HashMap<TargetKind, f64>;
}

/// Uniform distribution over every behavior kind
pub fn uniform_kind_belief() -> HashMap<TargetKind, f64> {
    let p = 1.0 / TargetKind::ALL.len() as f64;
    TargetKind::ALL.into_iter().map(|kind| (kind, p)).collect()
}
