//! Episode - orchestrates one game from spawn to the last capture
//!
//! Each turn runs, strictly in order:
//! observe -> decide -> move hunter -> captures -> move targets -> captures -> score
//!
//! Targets move against a frozen hunter position, so their order within a turn
//! does not matter.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::core::config::GameConfig;
use crate::core::error::{HuntError, Result};
use crate::core::types::{Direction, Position, Turn};
use crate::game::agent::{Decision, HunterAgent, TurnView};
use crate::game::hunter::HunterState;
use crate::maze::{Cell, Maze};
use crate::target::{next_state, TargetState};

/// What happened during one turn
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnReport {
    pub turn: Turn,
    pub observations: Vec<u32>,
    /// Move the agent committed in time, if any
    pub hunter_move: Option<Direction>,
    pub hunter_position: Position,
    /// Targets captured this turn, in capture order
    pub captures: Vec<usize>,
    pub alive: usize,
    pub score: i64,
}

/// Final result of an episode
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpisodeSummary {
    pub agent: String,
    pub seed: u64,
    pub turns: Turn,
    pub score: i64,
    pub targets: usize,
    pub captured: usize,
    /// Turn each target was caught on
    pub capture_turns: Vec<Option<Turn>>,
    pub elapsed_secs: f64,
}

impl EpisodeSummary {
    /// Pretty-printed JSON form, as printed by the CLI
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// One game: maze, hunter, targets, agent and the rules tying them together
pub struct Episode {
    maze: Arc<Maze>,
    hunter: HunterState,
    targets: Vec<TargetState>,
    agent: Box<dyn HunterAgent>,
    config: GameConfig,
    rng: ChaCha8Rng,
    seed: u64,
    turn: Turn,
    score: i64,
    capture_turns: Vec<Option<Turn>>,
    over: bool,
}

impl Episode {
    /// Start an episode with `config.targets` randomly spawned targets
    pub fn new(maze: Arc<Maze>, agent: Box<dyn HunterAgent>, config: GameConfig) -> Result<Self> {
        let mut episode = Self::with_targets(maze, agent, config, Vec::new())?;
        episode.targets = (0..episode.config.targets)
            .map(|_| TargetState::spawn(&episode.maze, &mut episode.rng))
            .collect::<Result<_>>()?;
        episode.capture_turns = vec![None; episode.targets.len()];

        for (i, target) in episode.targets.iter().enumerate() {
            tracing::debug!(index = i, kind = %target.kind, position = %target.position, "target spawned");
        }
        Ok(episode)
    }

    /// Start an episode with explicitly placed targets
    ///
    /// `config.targets` is ignored in favour of `targets.len()`.
    pub fn with_targets(
        maze: Arc<Maze>,
        agent: Box<dyn HunterAgent>,
        config: GameConfig,
        targets: Vec<TargetState>,
    ) -> Result<Self> {
        config.validate()?;
        if let Some(stray) = targets.iter().find(|t| t.alive && !maze.contains(t.position)) {
            return Err(HuntError::OffField(stray.position));
        }

        let seed = config.seed.unwrap_or_else(rand::random);
        let hunter = HunterState::new(&maze);
        let capture_turns = vec![None; targets.len()];

        Ok(Self {
            maze,
            hunter,
            targets,
            agent,
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            turn: 0,
            score: 0,
            capture_turns,
            over: false,
        })
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn hunter(&self) -> HunterState {
        self.hunter
    }

    pub fn targets(&self) -> &[TargetState] {
        &self.targets
    }

    pub fn agent(&self) -> &dyn HunterAgent {
        self.agent.as_ref()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn turn(&self) -> Turn {
        self.turn
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn alive_count(&self) -> usize {
        self.targets.iter().filter(|t| t.alive).count()
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    /// Play turns until every target is caught or the turn cap is hit
    pub fn run(&mut self) -> Result<EpisodeSummary> {
        let start = Instant::now();
        while !self.over {
            self.play_turn()?;
        }
        let summary = self.summary(start.elapsed());
        tracing::info!(
            turns = summary.turns,
            score = summary.score,
            captured = summary.captured,
            "episode finished"
        );
        Ok(summary)
    }

    /// Play a single turn
    pub fn play_turn(&mut self) -> Result<TurnReport> {
        if self.over {
            return Err(HuntError::InvalidConfig("episode is already over".into()));
        }
        self.turn += 1;
        let maze = Arc::clone(&self.maze);

        // 1. Observe
        let observations: Vec<u32> = self
            .targets
            .iter()
            .map(|target| {
                if target.alive {
                    maze.noisy_distance(self.hunter.position, target.position, &mut self.rng)
                } else {
                    0
                }
            })
            .collect();
        tracing::debug!(turn = self.turn, ?observations, "observed distances");

        // 2. Decide
        let mut decision = Decision::new(Duration::from_secs_f64(self.config.time_limit_secs));
        let view = TurnView::new(&maze, self.hunter, self.turn, self.targets.len());
        self.agent.decide(&view, &observations, &mut decision);
        let hunter_move = decision.chosen();

        // 3. Move hunter
        if !self.hunter.apply_move(&maze, hunter_move) {
            tracing::debug!(turn = self.turn, ?hunter_move, "hunter stays in place");
        }
        tracing::debug!(turn = self.turn, position = %self.hunter.position, ?hunter_move, "hunter moved");

        if self.config.information_level >= 1 {
            self.report_beliefs();
        }

        // 4. Hunter may have landed on a target
        let mut captures = self.resolve_captures(&maze);

        // 5. Move targets against the hunter's current position
        let hunter = self.hunter.position;
        self.targets = self
            .targets
            .iter()
            .map(|target| next_state(target, hunter, &maze, &mut self.rng))
            .collect::<Result<_>>()?;
        let view = TurnView::new(&maze, self.hunter, self.turn, self.targets.len());
        self.agent.on_targets_moved(&view);

        // 6. A target may have run into the hunter
        captures.extend(self.resolve_captures(&maze));

        // 7. Score
        let alive = self.alive_count();
        self.score -= self.config.turn_penalty * alive as i64;
        self.over = alive == 0 || self.turn >= self.config.max_turns;

        tracing::debug!(turn = self.turn, score = self.score, alive, "turn complete");
        tracing::trace!("\n{}", self);

        Ok(TurnReport {
            turn: self.turn,
            observations,
            hunter_move,
            hunter_position: self.hunter.position,
            captures,
            alive,
            score: self.score,
        })
    }

    pub fn summary(&self, elapsed: Duration) -> EpisodeSummary {
        EpisodeSummary {
            agent: self.agent.name().to_string(),
            seed: self.seed,
            turns: self.turn,
            score: self.score,
            targets: self.targets.len(),
            captured: self.capture_turns.iter().filter(|t| t.is_some()).count(),
            capture_turns: self.capture_turns.clone(),
            elapsed_secs: elapsed.as_secs_f64(),
        }
    }

    /// Capture every live target sharing the hunter's cell and tell the agent
    fn resolve_captures(&mut self, maze: &Maze) -> Vec<usize> {
        let view = TurnView::new(maze, self.hunter, self.turn, self.targets.len());
        let mut captured = Vec::new();

        for i in 0..self.targets.len() {
            let target = &mut self.targets[i];
            if target.alive && target.position == self.hunter.position {
                tracing::info!(index = i, turn = self.turn, kind = %target.kind, "target captured");
                *target = TargetState::captured(target.kind);
                self.score += self.config.capture_reward;
                self.capture_turns[i] = Some(self.turn);
                self.agent.on_captured(i, &view);
                captured.push(i);
            } else {
                self.agent.on_not_captured(i, &view);
            }
        }

        captured
    }

    /// Log the agent's best guesses (and the truth at information level 2)
    fn report_beliefs(&self) {
        let show_truth = self.config.information_level >= 2;

        for (i, target) in self.targets.iter().enumerate().filter(|(_, t)| t.alive) {
            let kinds = self.agent.kind_belief(i);
            if let Some((kind, p)) = best_guess(&kinds) {
                if show_truth {
                    let actual = kinds.get(&target.kind).copied().unwrap_or(0.0);
                    tracing::info!(index = i, guess = %kind, p, actual = %target.kind, p_actual = actual, "predicted kind");
                } else {
                    tracing::info!(index = i, guess = %kind, p, "predicted kind");
                }
            }

            let positions = self.agent.position_belief(i);
            if let Some((pos, p)) = best_guess(&positions) {
                if show_truth {
                    let actual = positions.get(&target.position).copied().unwrap_or(0.0);
                    tracing::info!(index = i, guess = %pos, p, actual = %target.position, p_actual = actual, "predicted position");
                } else {
                    tracing::info!(index = i, guess = %pos, p, "predicted position");
                }
            }
        }
    }
}

fn best_guess<K: Copy + Eq + Hash>(belief: &HashMap<K, f64>) -> Option<(K, f64)> {
    belief
        .iter()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(Ordering::Equal))
        .map(|(&k, &p)| (k, p))
}

impl fmt::Display for Episode {
    /// Board dump: `P` hunter, `G` live targets (information level 2 only)
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show_targets = self.config.information_level >= 2;
        for y in 0..self.maze.height() as i32 {
            let mut line = String::with_capacity(self.maze.width());
            for x in 0..self.maze.width() as i32 {
                let pos = Position::new(x, y);
                let c = match self.maze.cell(pos) {
                    Some(Cell::Wall) | None => 'W',
                    _ if pos == self.hunter.position => 'P',
                    _ if show_targets && self.targets.iter().any(|t| t.alive && t.position == pos) => 'G',
                    _ => ' ',
                };
                line.push(c);
            }
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::TargetKind;

    /// Never moves, believes nothing in particular
    struct IdleAgent;

    impl HunterAgent for IdleAgent {
        fn name(&self) -> &str {
            "idle"
        }

        fn decide(&mut self, _view: &TurnView, _observations: &[u32], _decision: &mut Decision) {}

        fn position_belief(&self, _target: usize) -> HashMap<Position, f64> {
            HashMap::from([(Position::new(1, 1), 1.0)])
        }

        fn kind_belief(&self, _target: usize) -> HashMap<TargetKind, f64> {
            crate::game::agent::uniform_kind_belief()
        }
    }

    fn config() -> GameConfig {
        GameConfig {
            seed: Some(42),
            ..GameConfig::default()
        }
    }

    #[test]
    fn test_no_targets_ends_on_first_turn() {
        let maze = Arc::new(Maze::classic());
        let mut episode =
            Episode::with_targets(maze, Box::new(IdleAgent), config(), Vec::new()).unwrap();
        let summary = episode.run().unwrap();
        assert_eq!(summary.turns, 1);
        assert_eq!(summary.score, 0);
        assert!(episode.is_over());
    }

    #[test]
    fn test_playing_after_end_fails() {
        let maze = Arc::new(Maze::classic());
        let mut episode =
            Episode::with_targets(maze, Box::new(IdleAgent), config(), Vec::new()).unwrap();
        episode.run().unwrap();
        assert!(episode.play_turn().is_err());
    }

    #[test]
    fn test_summary_json_carries_every_field() {
        let summary = EpisodeSummary {
            agent: "greedy".to_string(),
            seed: 42,
            turns: 3,
            score: 997,
            targets: 2,
            captured: 1,
            capture_turns: vec![Some(3), None],
            elapsed_secs: 0.5,
        };
        let json: serde_json::Value = serde_json::from_str(&summary.to_json().unwrap()).unwrap();
        assert_eq!(json["agent"], "greedy");
        assert_eq!(json["score"], 997);
        assert_eq!(json["capture_turns"], serde_json::json!([3, null]));
    }

    #[test]
    fn test_turn_cap_and_penalty() {
        let maze = Arc::new(Maze::classic());
        let config = GameConfig {
            targets: 2,
            max_turns: 5,
            ..config()
        };
        // An idle hunter in the start pen can still be run into, so only
        // check the bookkeeping holds together
        let mut episode = Episode::new(maze, Box::new(IdleAgent), config).unwrap();
        let summary = episode.run().unwrap();
        assert!(summary.turns <= 5);
        let captured = summary.captured as i64;
        assert!(summary.score <= captured * 1000);
        assert_eq!(summary.capture_turns.len(), 2);
    }

    #[test]
    fn test_spawned_targets_are_valid() {
        let maze = Arc::new(Maze::classic());
        let episode = Episode::new(Arc::clone(&maze), Box::new(IdleAgent), config()).unwrap();
        assert_eq!(episode.targets().len(), 4);
        for target in episode.targets() {
            assert!(target.alive);
            assert!(maze.contains(target.position));
        }
    }

    #[test]
    fn test_seeded_episodes_are_reproducible() {
        let maze = Arc::new(Maze::classic());
        let cfg = GameConfig {
            max_turns: 20,
            ..config()
        };
        let mut a = Episode::new(Arc::clone(&maze), Box::new(IdleAgent), cfg.clone()).unwrap();
        let mut b = Episode::new(maze, Box::new(IdleAgent), cfg).unwrap();
        for _ in 0..20 {
            if a.is_over() {
                break;
            }
            assert_eq!(a.play_turn().unwrap(), b.play_turn().unwrap());
        }
        assert_eq!(a.targets(), b.targets());
    }

    #[test]
    fn test_off_field_target_rejected() {
        let maze = Arc::new(Maze::classic());
        let stray = TargetState::new(TargetKind::Random, Position::new(0, 0));
        let result = Episode::with_targets(maze, Box::new(IdleAgent), config(), vec![stray]);
        assert!(matches!(result, Err(HuntError::OffField(_))));
    }

    #[test]
    fn test_board_hides_targets_below_level_two() {
        let maze = Arc::new(Maze::classic());
        let target = TargetState::new(TargetKind::Random, Position::new(1, 1));
        let episode = Episode::with_targets(
            Arc::clone(&maze),
            Box::new(IdleAgent),
            config(),
            vec![target.clone()],
        )
        .unwrap();
        let board = episode.to_string();
        assert!(board.contains('P'));
        assert!(!board.contains('G'));

        let revealing = GameConfig {
            information_level: 2,
            ..config()
        };
        let episode =
            Episode::with_targets(maze, Box::new(IdleAgent), revealing, vec![target]).unwrap();
        assert_eq!(episode.to_string().lines().nth(1).unwrap().chars().nth(1), Some('G'));
    }
}
