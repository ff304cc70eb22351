//! Target behavior engine
//!
//! `possible_next_states` enumerates every equally likely successor of a
//! target state; `next_state` draws one. The enumeration is what the particle
//! filter uses as its transition model, so it must stay exact.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::core::error::{HuntError, Result};
use crate::core::types::{Direction, Position};
use crate::maze::Maze;

use super::{TargetKind, TargetState};

/// Path distance at which brave and orbiting targets start to flee
pub const BRAVERY_RADIUS: u32 = 6;

type Move = (Direction, Position);

/// Every equally likely successor of `state` given the hunter's position
///
/// Repeated entries are intentional: they weight the uniform draw.
pub fn possible_next_states(
    state: &TargetState,
    hunter: Position,
    maze: &Maze,
) -> Result<Vec<TargetState>> {
    if !state.alive {
        return Ok(vec![state.clone()]);
    }

    let behind = state.heading.map(Direction::reverse);
    let options: Vec<Move> = maze
        .moves(state.position)
        .into_iter()
        .filter(|(direction, _)| Some(*direction) != behind)
        .collect();

    let successors = match options.len() {
        // Dead end: turn around on the spot, the way back opens next turn
        0 => vec![TargetState {
            heading: behind,
            thinking: false,
            ..state.clone()
        }],
        // Corridor: keep following it
        1 => vec![moved(state, options[0])],
        // Junction reached: pause one turn
        _ if !state.thinking => vec![TargetState {
            thinking: true,
            ..state.clone()
        }],
        // Junction, second turn: commit to a branch
        _ => preferred_moves(state, hunter, maze, &options)?
            .into_iter()
            .map(|choice| moved(state, choice))
            .collect(),
    };

    Ok(successors)
}

/// Advance a target one turn
pub fn next_state<R: Rng + ?Sized>(
    state: &TargetState,
    hunter: Position,
    maze: &Maze,
    rng: &mut R,
) -> Result<TargetState> {
    possible_next_states(state, hunter, maze)?
        .choose(rng)
        .cloned()
        .ok_or(HuntError::NoSuccessor)
}

fn moved(state: &TargetState, (direction, position): Move) -> TargetState {
    TargetState {
        alive: true,
        kind: state.kind,
        position,
        heading: Some(direction),
        thinking: false,
    }
}

/// The branches a target of this kind would take from a junction
fn preferred_moves(
    state: &TargetState,
    hunter: Position,
    maze: &Maze,
    options: &[Move],
) -> Result<Vec<Move>> {
    let to_hunter = |&(_, pos): &Move| maze.path_distance(hunter, pos);

    let chosen = match state.kind {
        TargetKind::Random => options.to_vec(),
        TargetKind::Scared => argmax(options, to_hunter)?,
        TargetKind::CornerSeeking => toward_far_corner(hunter, maze, options)?,
        TargetKind::Brave => {
            if maze.path_distance(hunter, state.position)? > BRAVERY_RADIUS {
                argmin(options, to_hunter)?
            } else {
                argmax(options, to_hunter)?
            }
        }
        TargetKind::Orbiting => {
            if maze.path_distance(hunter, state.position)? <= BRAVERY_RADIUS {
                argmax(options, to_hunter)?
            } else {
                let center = maze.center();
                argmin(options, |&(_, pos)| maze.path_distance(center, pos))?
            }
        }
    };

    if chosen.is_empty() {
        Ok(options.to_vec())
    } else {
        Ok(chosen)
    }
}

/// Head for whichever corners are farthest from the hunter, preferring among
/// equally short routes the branch that also leaves the hunter farther behind
fn toward_far_corner(hunter: Position, maze: &Maze, options: &[Move]) -> Result<Vec<Move>> {
    let corners: Vec<Position> = maze
        .corners()
        .into_iter()
        .filter(|&corner| maze.contains(corner))
        .collect();
    let far_corners = argmax(&corners, |&corner| maze.path_distance(hunter, corner))?;

    let mut chosen = Vec::new();
    for corner in far_corners {
        chosen.extend(argmin(options, |&(_, pos)| {
            let to_corner = maze.path_distance(corner, pos)? as i64;
            let to_hunter = maze.path_distance(hunter, pos)? as i64;
            Ok((to_corner, -to_hunter))
        })?);
    }
    Ok(chosen)
}

/// Every item attaining the smallest key
fn argmin<T: Clone, K: Ord>(items: &[T], key: impl Fn(&T) -> Result<K>) -> Result<Vec<T>> {
    extreme(items, key, |candidate, best| candidate < best)
}

/// Every item attaining the largest key
fn argmax<T: Clone, K: Ord>(items: &[T], key: impl Fn(&T) -> Result<K>) -> Result<Vec<T>> {
    extreme(items, key, |candidate, best| candidate > best)
}

fn extreme<T: Clone, K: Ord>(
    items: &[T],
    key: impl Fn(&T) -> Result<K>,
    better: impl Fn(&K, &K) -> bool,
) -> Result<Vec<T>> {
    let mut best: Option<K> = None;
    let mut winners = Vec::new();

    for item in items {
        let k = key(item)?;
        match &best {
            Some(b) if better(&k, b) => {
                best = Some(k);
                winners.clear();
                winners.push(item.clone());
            }
            Some(b) if k == *b => winners.push(item.clone()),
            Some(_) => {}
            None => {
                best = Some(k);
                winners.push(item.clone());
            }
        }
    }

    Ok(winners)
}
