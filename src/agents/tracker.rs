//! Particle-filter tracking hunter
//!
//! Keeps one population of `TargetState` hypotheses per target. Each turn:
//! 1. `decide` weighs every hypothesis by the range reading and resamples
//! 2. capture callbacks prune hypotheses the hunter's cell rules out
//! 3. `on_targets_moved` pushes every population through the behavior engine
//!
//! Because hypotheses carry the behavior kind, the same populations yield
//! both the position and the kind beliefs.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;

use crate::core::config::GameConfig;
use crate::core::error::{HuntError, Result};
use crate::core::types::Position;
use crate::estimation::ParticleFilter;
use crate::game::agent::{uniform_kind_belief, Decision, HunterAgent, TurnView};
use crate::maze::Maze;
use crate::target::{possible_next_states, spawn_cells, TargetKind, TargetState};

/// Offset applied to the game seed so the agent draws its own stream
const AGENT_SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Belief state for one target
#[derive(Debug, Clone)]
struct Track {
    filter: ParticleFilter<TargetState>,
    rng: ChaCha8Rng,
}

pub struct TrackingAgent {
    maze: Arc<Maze>,
    particles: usize,
    seed: u64,
    tracks: Vec<Track>,
}

impl TrackingAgent {
    pub fn new(maze: Arc<Maze>, config: &GameConfig) -> Result<Self> {
        if config.particles_per_target == 0 {
            return Err(HuntError::InvalidConfig(
                "particles_per_target must be positive".into(),
            ));
        }
        let seed = config
            .seed
            .map(|seed| seed ^ AGENT_SEED_SALT)
            .unwrap_or_else(rand::random);

        Ok(Self {
            maze,
            particles: config.particles_per_target,
            seed,
            tracks: Vec::new(),
        })
    }

    /// Start (or restart) tracking when the number of targets changes
    fn ensure_tracks(&mut self, count: usize) {
        if self.tracks.len() == count {
            return;
        }
        let initial = spawn_hypotheses(&self.maze);
        self.tracks = (0..count)
            .map(|i| {
                let mut rng = ChaCha8Rng::seed_from_u64(self.seed.wrapping_add(i as u64));
                let filter = population(&initial, self.particles, &mut rng);
                Track { filter, rng }
            })
            .collect();
        tracing::debug!(targets = count, particles = self.particles, "tracking started");
    }

    /// Replace a population that lost all of its mass
    fn reseed(&mut self, target: usize, hunter: Position, reason: &HuntError) {
        tracing::warn!(index = target, %reason, "tracking lost, reseeding population");
        let hypotheses = anywhere_hypotheses(&self.maze, hunter);
        if let Some(track) = self.tracks.get_mut(target) {
            track.filter = population(&hypotheses, self.particles, &mut track.rng);
        }
    }

    /// Most probable cell of the closest live target, if any remain
    fn pursuit_goal(&mut self, hunter: Position, observations: &[u32]) -> Option<Position> {
        let mut goal: Option<(u32, Position)> = None;

        for (track, &reading) in self.tracks.iter_mut().zip(observations) {
            if reading == 0 {
                continue;
            }
            let Some(best) = track.filter.most_likely(&mut track.rng) else {
                continue;
            };
            if !best.alive {
                continue;
            }
            let Ok(distance) = self.maze.path_distance(hunter, best.position) else {
                continue;
            };
            if goal.map_or(true, |(closest, _)| distance < closest) {
                goal = Some((distance, best.position));
            }
        }

        goal.map(|(_, position)| position)
    }
}

/// Every state a freshly spawned target could be in
fn spawn_hypotheses(maze: &Maze) -> Vec<TargetState> {
    let cells = spawn_cells(maze);
    if cells.is_empty() {
        hypotheses(maze.field_of_play())
    } else {
        hypotheses(&cells)
    }
}

/// Every live state on the field except the hunter's own cell
fn anywhere_hypotheses(maze: &Maze, hunter: Position) -> Vec<TargetState> {
    let cells: Vec<Position> = maze
        .field_of_play()
        .iter()
        .copied()
        .filter(|&cell| cell != hunter)
        .collect();
    hypotheses(&cells)
}

fn hypotheses(cells: &[Position]) -> Vec<TargetState> {
    cells
        .iter()
        .flat_map(|&cell| TargetKind::ALL.into_iter().map(move |kind| TargetState::new(kind, cell)))
        .collect()
}

/// `count` particles spread as evenly as possible over `hypotheses`
///
/// Every hypothesis gets `count / len` copies; the remainder goes to
/// hypotheses drawn without replacement, so no region is favoured.
fn population<R: Rng + ?Sized>(
    hypotheses: &[TargetState],
    count: usize,
    rng: &mut R,
) -> ParticleFilter<TargetState> {
    if hypotheses.is_empty() {
        return ParticleFilter::new();
    }
    let copies = count / hypotheses.len();
    let mut filter = ParticleFilter::with_particles(
        hypotheses
            .iter()
            .flat_map(|hypothesis| std::iter::repeat(hypothesis).take(copies))
            .cloned(),
    );
    for extra in hypotheses.choose_multiple(rng, count % hypotheses.len()) {
        filter.add_particle(extra.clone());
    }
    filter
}

/// Likelihood of a range reading given a hypothesis
fn reading_likelihood(maze: &Maze, hunter: Position, reading: u32, state: &TargetState) -> f64 {
    match (state.alive, reading) {
        (false, 0) => 1.0,
        (false, _) => 0.0,
        (true, _) => maze.noisy_distance_likelihood(reading, hunter.manhattan(&state.position)),
    }
}

impl HunterAgent for TrackingAgent {
    fn name(&self) -> &str {
        "tracker"
    }

    fn decide(&mut self, view: &TurnView, observations: &[u32], decision: &mut Decision) {
        self.ensure_tracks(view.target_count);
        let hunter = view.hunter.position;

        let mut lost = Vec::new();
        for (i, (track, &reading)) in self.tracks.iter_mut().zip(observations).enumerate() {
            let maze = &self.maze;
            track
                .filter
                .reweight(|state| reading_likelihood(maze, hunter, reading, state));
            if let Err(err) = track.filter.resample(&mut track.rng) {
                lost.push((i, err));
            }
        }
        for (i, err) in lost {
            self.reseed(i, hunter, &err);
        }

        if !decision.time_remaining() {
            tracing::debug!(turn = view.turn, "out of time before choosing a move");
            return;
        }
        let Some(goal) = self.pursuit_goal(hunter, observations) else {
            return;
        };

        let best = view
            .possible_moves()
            .into_iter()
            .filter_map(|(direction, next)| {
                self.maze
                    .path_distance(next, goal)
                    .ok()
                    .map(|distance| (distance, direction))
            })
            .min_by_key(|&(distance, _)| distance);
        if let Some((_, direction)) = best {
            tracing::trace!(turn = view.turn, goal = %goal, ?direction, "pursuing");
            decision.commit(direction);
        }
    }

    fn on_captured(&mut self, target: usize, view: &TurnView) {
        let Some(track) = self.tracks.get_mut(target) else {
            return;
        };
        // Keep each hypothesis's kind, everything else is now known
        let result = track
            .filter
            .advance(&mut track.rng, |state| Ok(vec![TargetState::captured(state.kind)]));
        if let Err(err) = result {
            self.reseed(target, view.hunter.position, &err);
        }
    }

    fn on_not_captured(&mut self, target: usize, view: &TurnView) {
        let hunter = view.hunter.position;
        let Some(track) = self.tracks.get_mut(target) else {
            return;
        };
        let ruled_out = track
            .filter
            .iter()
            .any(|(state, weight)| weight > 0.0 && state.alive && state.position == hunter);
        if !ruled_out {
            return;
        }

        track.filter.reweight(|state| {
            if state.alive && state.position == hunter {
                0.0
            } else {
                1.0
            }
        });
        if let Err(err) = track.filter.resample(&mut track.rng) {
            self.reseed(target, hunter, &err);
        }
    }

    fn on_targets_moved(&mut self, view: &TurnView) {
        let hunter = view.hunter.position;
        let maze = &self.maze;

        let failures: Vec<(usize, HuntError)> = self
            .tracks
            .par_iter_mut()
            .enumerate()
            .filter_map(|(i, track)| {
                track
                    .filter
                    .advance(&mut track.rng, |state| possible_next_states(state, hunter, maze))
                    .err()
                    .map(|err| (i, err))
            })
            .collect();

        for (i, err) in failures {
            self.reseed(i, hunter, &err);
        }
    }

    fn position_belief(&self, target: usize) -> HashMap<Position, f64> {
        match self.tracks.get(target) {
            Some(track) => track.filter.marginal(|state| state.position),
            None => {
                let field = self.maze.field_of_play();
                let p = 1.0 / field.len().max(1) as f64;
                field.iter().map(|&cell| (cell, p)).collect()
            }
        }
    }

    fn kind_belief(&self, target: usize) -> HashMap<TargetKind, f64> {
        match self.tracks.get(target) {
            Some(track) => track.filter.marginal(|state| state.kind),
            None => uniform_kind_belief(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::hunter::HunterState;
    use std::time::Duration;

    fn agent(maze: &Arc<Maze>, particles: usize) -> TrackingAgent {
        let config = GameConfig {
            particles_per_target: particles,
            seed: Some(42),
            ..GameConfig::default()
        };
        TrackingAgent::new(Arc::clone(maze), &config).unwrap()
    }

    fn sums_to_one<K>(belief: &HashMap<K, f64>) -> bool {
        (belief.values().sum::<f64>() - 1.0).abs() < 1e-9
    }

    #[test]
    fn test_rejects_empty_population() {
        let config = GameConfig {
            particles_per_target: 0,
            ..GameConfig::default()
        };
        assert!(TrackingAgent::new(Arc::new(Maze::classic()), &config).is_err());
    }

    #[test]
    fn test_initial_beliefs_cover_spawn_cells() {
        let maze = Arc::new(Maze::classic());
        let mut agent = agent(&maze, 2000);
        agent.ensure_tracks(2);

        let positions = agent.position_belief(1);
        assert!(sums_to_one(&positions));
        assert!(positions.keys().all(|pos| spawn_cells(&maze).contains(pos)));
        assert!(sums_to_one(&agent.kind_belief(0)));
    }

    #[test]
    fn test_sparse_prior_reaches_every_row() {
        let maze = Arc::new(Maze::classic());
        // Fewer particles than (cell, kind) hypotheses
        let mut agent = agent(&maze, 300);
        agent.ensure_tracks(1);
        assert!(300 < spawn_cells(&maze).len() * TargetKind::ALL.len());

        let positions = agent.position_belief(0);
        assert!(sums_to_one(&positions));
        let rows: std::collections::BTreeSet<i32> = spawn_cells(&maze).iter().map(|p| p.y).collect();
        for row in rows {
            assert!(
                positions.keys().any(|p| p.y == row),
                "row {} has no prior mass",
                row
            );
        }
    }

    #[test]
    fn test_whole_copies_give_uniform_prior() {
        let maze = Arc::new(Maze::classic());
        let cells = spawn_cells(&maze);
        let particles = 2 * cells.len() * TargetKind::ALL.len();
        let mut agent = agent(&maze, particles);
        agent.ensure_tracks(1);

        let positions = agent.position_belief(0);
        assert_eq!(positions.len(), cells.len());
        let expected = 1.0 / cells.len() as f64;
        for cell in &cells {
            assert!((positions[cell] - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_decide_keeps_distributions_and_moves() {
        let maze = Arc::new(Maze::classic());
        let mut agent = agent(&maze, 500);
        let hunter = HunterState::new(&maze);
        let view = TurnView::new(&maze, hunter, 1, 1);
        let mut decision = Decision::new(Duration::from_secs(60));

        let target = Position::new(1, 1);
        let reading = hunter.position.manhattan(&target);
        agent.decide(&view, &[reading], &mut decision);

        assert!(sums_to_one(&agent.position_belief(0)));
        let chosen = decision.chosen().unwrap();
        assert!(view.possible_moves().iter().any(|&(d, _)| d == chosen));
    }

    #[test]
    fn test_capture_collapses_belief() {
        let maze = Arc::new(Maze::classic());
        let mut agent = agent(&maze, 300);
        let view = TurnView::new(&maze, HunterState::new(&maze), 1, 1);
        agent.ensure_tracks(1);
        let kinds_before = agent.kind_belief(0);

        agent.on_captured(0, &view);
        let positions = agent.position_belief(0);
        assert_eq!(positions.len(), 1);
        assert!((positions[&Position::CAPTURED] - 1.0).abs() < 1e-9);
        let kinds_after = agent.kind_belief(0);
        for (kind, p) in kinds_before {
            assert!((kinds_after[&kind] - p).abs() < 1e-9);
        }
    }

    #[test]
    fn test_not_captured_clears_hunter_cell() {
        let maze = Arc::new(Maze::classic());
        let particles = 2 * spawn_cells(&maze).len() * TargetKind::ALL.len();
        let mut agent = agent(&maze, particles);
        let hunter = HunterState {
            position: Position::new(1, 1),
            heading: None,
        };
        let view = TurnView::new(&maze, hunter, 1, 1);
        agent.ensure_tracks(1);
        assert!(agent.position_belief(0).contains_key(&hunter.position));

        agent.on_not_captured(0, &view);
        let positions = agent.position_belief(0);
        assert!(!positions.contains_key(&hunter.position));
        assert!(sums_to_one(&positions));
    }

    #[test]
    fn test_impossible_reading_reseeds() {
        let maze = Arc::new(Maze::classic());
        let mut agent = agent(&maze, 200);
        let view = TurnView::new(&maze, HunterState::new(&maze), 1, 1);
        let mut decision = Decision::new(Duration::from_secs(60));

        // No live hypothesis can explain a reading far past the clamp range
        agent.decide(&view, &[10_000], &mut decision);
        let positions = agent.position_belief(0);
        assert!(sums_to_one(&positions));
        assert!(!positions.contains_key(&view.hunter.position));
        assert!(positions.keys().any(|p| p.y >= 10), "reseed skipped the lower half");
    }

    #[test]
    fn test_targets_moved_advances_every_track() {
        let maze = Arc::new(Maze::classic());
        let mut agent = agent(&maze, 400);
        let view = TurnView::new(&maze, HunterState::new(&maze), 1, 3);
        agent.ensure_tracks(3);
        agent.on_targets_moved(&view);
        for i in 0..3 {
            assert!(sums_to_one(&agent.position_belief(i)));
            assert_eq!(agent.tracks[i].filter.particle_count(), 400);
        }
    }
}
