//! All-pairs path distances over the field of play
//!
//! Built by expanding pairs level by level: every pair known at distance `d`
//! extends to the neighbours of either end, recording `d + 1` for pairs not yet
//! seen. Tunnel shortcuts come for free through `Maze::moves`.

use crate::core::error::{HuntError, Result};
use crate::core::types::Position;

use super::Maze;

const UNKNOWN: u32 = u32::MAX;

/// Dense symmetric distance matrix indexed by field-of-play order
#[derive(Debug, Clone, Default)]
pub struct DistanceTable {
    cells: usize,
    distances: Vec<u32>,
}

impl DistanceTable {
    pub fn build(maze: &Maze) -> Self {
        let field = maze.field_of_play();
        let n = field.len();

        let neighbours: Vec<Vec<usize>> = field
            .iter()
            .map(|&pos| {
                maze.moves(pos)
                    .into_iter()
                    .filter_map(|(_, next)| maze.field_index(next))
                    .collect()
            })
            .collect();

        let mut distances = vec![UNKNOWN; n * n];
        let mut frontier: Vec<(usize, usize)> = Vec::with_capacity(n);
        for i in 0..n {
            distances[i * n + i] = 0;
            frontier.push((i, i));
        }

        let mut level = 0;
        while !frontier.is_empty() {
            let mut next = Vec::new();
            for &(a, b) in &frontier {
                for (fixed, moving) in [(b, a), (a, b)] {
                    for &stepped in &neighbours[moving] {
                        if distances[fixed * n + stepped] == UNKNOWN {
                            distances[fixed * n + stepped] = level + 1;
                            distances[stepped * n + fixed] = level + 1;
                            next.push((fixed, stepped));
                        }
                    }
                }
            }
            frontier = next;
            level += 1;
        }

        Self { cells: n, distances }
    }

    /// Number of field cells covered
    pub fn len(&self) -> usize {
        self.cells
    }

    pub fn is_empty(&self) -> bool {
        self.cells == 0
    }

    /// Look up the distance between two cells of `maze`
    pub fn distance(&self, maze: &Maze, a: Position, b: Position) -> Result<u32> {
        let i = maze.field_index(a).ok_or(HuntError::OffField(a))?;
        let j = maze.field_index(b).ok_or(HuntError::OffField(b))?;
        match self.distances.get(i * self.cells + j) {
            Some(&d) if d != UNKNOWN => Ok(d),
            _ => Err(HuntError::Unreachable(a, b)),
        }
    }

    /// Largest finite distance in the table
    pub fn diameter(&self) -> u32 {
        self.distances
            .iter()
            .copied()
            .filter(|&d| d != UNKNOWN)
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_distance_is_zero() {
        let maze = Maze::classic();
        for &pos in maze.field_of_play() {
            assert_eq!(maze.path_distance(pos, pos).unwrap(), 0);
        }
    }

    #[test]
    fn test_straight_corridor() {
        let maze = Maze::parse(&["WWWWWWW", "WS    W", "WWWWWWW"]).unwrap();
        let start = Position::new(1, 1);
        for x in 1..=5 {
            assert_eq!(
                maze.path_distance(start, Position::new(x, 1)).unwrap(),
                (x - 1) as u32
            );
        }
        assert_eq!(maze.distances().diameter(), 4);
    }

    #[test]
    fn test_tunnel_shortcut() {
        let maze = Maze::classic();
        let a = Position::new(0, 9);
        let b = Position::new(18, 9);
        assert_eq!(maze.path_distance(a, b).unwrap(), 1);
        // One step inside each mouth is three moves apart through the tunnel
        assert_eq!(
            maze.path_distance(Position::new(1, 9), Position::new(17, 9)).unwrap(),
            3
        );
    }

    #[test]
    fn test_walls_follow_corridors() {
        let maze = Maze::classic();
        // (1,1) to (1,3): straight down the left column
        assert_eq!(
            maze.path_distance(Position::new(1, 1), Position::new(1, 3)).unwrap(),
            2
        );
        // Start pen exits north, so reaching (9,7) takes two moves
        assert_eq!(
            maze.path_distance(maze.hunter_start(), Position::new(9, 7)).unwrap(),
            2
        );
    }

    #[test]
    fn test_off_field_lookup_fails() {
        let maze = Maze::classic();
        let wall = Position::new(0, 0);
        let open = Position::new(1, 1);
        assert!(matches!(
            maze.path_distance(wall, open),
            Err(HuntError::OffField(p)) if p == wall
        ));
    }

    #[test]
    fn test_disconnected_cells_are_unreachable() {
        let maze = Maze::parse(&["WWWWW", "WSW W", "WWWWW"]).unwrap();
        let result = maze.path_distance(Position::new(1, 1), Position::new(3, 1));
        assert!(matches!(result, Err(HuntError::Unreachable(_, _))));
    }
}
