//! Maze geometry - the static field of play
//!
//! A maze is a rectangular grid of walls and open cells with one hunter start
//! and an optional pair of tunnel endpoints joining opposite edges. Exact path
//! distances and the noisy range-sensor model are derived once at construction.

pub mod distance;
pub mod noise;

use rand::Rng;
use std::fmt;

use crate::core::error::{HuntError, Result};
use crate::core::types::{Direction, Position};

pub use distance::DistanceTable;
pub use noise::NoiseModel;

/// The classic 19x19 layout. The hunter starts in the central pen.
pub const CLASSIC_LAYOUT: [&str; 19] = [
    "WWWWWWWWWWWWWWWWWWW",
    "W        W        W",
    "W WW WWW W WWW WW W",
    "W  W           W  W",
    "WW W W WWWWW W W WW",
    "W    W   W   W    W",
    "W WW WWW W WWW WW W",
    "W    W       W    W",
    "WWWW W WW WW W WWWW",
    "A      WWSWW      B",
    "WWWW W WW WW W WWWW",
    "W    W       W    W",
    "W WW WWW W WWW WW W",
    "W    W   W   W    W",
    "WW W W WWWWW W W WW",
    "W  W           W  W",
    "W WW WWW W WWW WW W",
    "W        W        W",
    "WWWWWWWWWWWWWWWWWWW",
];

/// What occupies a single grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Wall,
    Open,
    HunterStart,
    /// Left-hand tunnel mouth; stepping West arrives at `TunnelB`
    TunnelA,
    /// Right-hand tunnel mouth; stepping East arrives at `TunnelA`
    TunnelB,
}

impl Cell {
    pub fn from_char(c: char) -> Option<Cell> {
        match c {
            'W' | '#' => Some(Cell::Wall),
            ' ' | '.' => Some(Cell::Open),
            'S' => Some(Cell::HunterStart),
            'A' => Some(Cell::TunnelA),
            'B' => Some(Cell::TunnelB),
            _ => None,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Cell::Wall => 'W',
            Cell::Open => ' ',
            Cell::HunterStart => 'S',
            Cell::TunnelA => 'A',
            Cell::TunnelB => 'B',
        }
    }

    pub fn is_wall(self) -> bool {
        self == Cell::Wall
    }
}

/// Static maze with precomputed distance and sensor tables
#[derive(Debug, Clone)]
pub struct Maze {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    /// Non-wall cells in row-major order
    field: Vec<Position>,
    hunter_start: Position,
    tunnel: Option<(Position, Position)>,
    distances: DistanceTable,
    noise: NoiseModel,
}

impl Maze {
    /// Maze built from `CLASSIC_LAYOUT`
    pub fn classic() -> Self {
        // The built-in layout is known to be well formed
        Self::parse(&CLASSIC_LAYOUT).expect("classic layout is valid")
    }

    /// Build a maze from text rows
    ///
    /// `W`/`#` wall, space/`.` open, `S` hunter start, `A`/`B` tunnel endpoints.
    pub fn parse<S: AsRef<str>>(rows: &[S]) -> Result<Self> {
        let height = rows.len();
        if height == 0 {
            return Err(HuntError::InvalidLayout("layout has no rows".into()));
        }
        let width = rows[0].as_ref().chars().count();
        if width == 0 {
            return Err(HuntError::InvalidLayout("layout has empty rows".into()));
        }

        let mut cells = Vec::with_capacity(width * height);
        let mut hunter_start = None;
        let mut tunnel_a = None;
        let mut tunnel_b = None;

        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.chars().count() != width {
                return Err(HuntError::InvalidLayout(format!(
                    "row {} has {} cells, expected {}",
                    y,
                    row.chars().count(),
                    width
                )));
            }

            for (x, c) in row.chars().enumerate() {
                let cell = Cell::from_char(c).ok_or_else(|| {
                    HuntError::InvalidLayout(format!("unknown cell {:?} at ({}, {})", c, x, y))
                })?;
                let pos = Position::new(x as i32, y as i32);
                let slot = match cell {
                    Cell::HunterStart => Some(&mut hunter_start),
                    Cell::TunnelA => Some(&mut tunnel_a),
                    Cell::TunnelB => Some(&mut tunnel_b),
                    _ => None,
                };
                if let Some(slot) = slot {
                    if slot.replace(pos).is_some() {
                        return Err(HuntError::InvalidLayout(format!(
                            "more than one {:?} cell",
                            cell
                        )));
                    }
                }
                cells.push(cell);
            }
        }

        let hunter_start = hunter_start
            .ok_or_else(|| HuntError::InvalidLayout("no hunter start cell".into()))?;
        let tunnel = match (tunnel_a, tunnel_b) {
            (Some(a), Some(b)) => Some((a, b)),
            (None, None) => None,
            _ => {
                return Err(HuntError::InvalidLayout(
                    "tunnel needs both an A and a B endpoint".into(),
                ))
            }
        };

        let field = cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| !cell.is_wall())
            .map(|(i, _)| Position::new((i % width) as i32, (i / width) as i32))
            .collect();

        let mut maze = Self {
            width,
            height,
            cells,
            field,
            hunter_start,
            tunnel,
            distances: DistanceTable::default(),
            noise: NoiseModel::new(width.max(height)),
        };
        maze.distances = DistanceTable::build(&maze);

        Ok(maze)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Side length used by the sensor model's clamp range
    pub fn size(&self) -> usize {
        self.width.max(self.height)
    }

    pub fn cell(&self, pos: Position) -> Option<Cell> {
        if pos.x < 0 || pos.y < 0 {
            return None;
        }
        let (x, y) = (pos.x as usize, pos.y as usize);
        if x < self.width && y < self.height {
            Some(self.cells[y * self.width + x])
        } else {
            None
        }
    }

    /// True if hunters and targets may stand on `pos`
    pub fn contains(&self, pos: Position) -> bool {
        matches!(self.cell(pos), Some(cell) if !cell.is_wall())
    }

    /// All non-wall cells in row-major order
    pub fn field_of_play(&self) -> &[Position] {
        &self.field
    }

    pub fn hunter_start(&self) -> Position {
        self.hunter_start
    }

    /// Centre of the maze, which is the hunter's start cell
    pub fn center(&self) -> Position {
        self.hunter_start
    }

    pub fn tunnel(&self) -> Option<(Position, Position)> {
        self.tunnel
    }

    /// The four cells just inside the outer wall
    pub fn corners(&self) -> [Position; 4] {
        let right = self.width as i32 - 2;
        let bottom = self.height as i32 - 2;
        [
            Position::new(1, 1),
            Position::new(1, bottom),
            Position::new(right, 1),
            Position::new(right, bottom),
        ]
    }

    /// Where one step in `direction` from `pos` leads, if anywhere
    ///
    /// Tunnel endpoints send West (A) or East (B) through to the other mouth.
    pub fn step(&self, pos: Position, direction: Direction) -> Option<Position> {
        match (self.cell(pos), direction) {
            (Some(Cell::TunnelA), Direction::West) => self.tunnel.map(|(_, b)| b),
            (Some(Cell::TunnelB), Direction::East) => self.tunnel.map(|(a, _)| a),
            _ => {
                let next = pos.offset(direction);
                self.contains(next).then_some(next)
            }
        }
    }

    /// Every legal move out of `pos` as (direction, destination)
    pub fn moves(&self, pos: Position) -> Vec<(Direction, Position)> {
        Direction::ALL
            .into_iter()
            .filter_map(|direction| self.step(pos, direction).map(|next| (direction, next)))
            .collect()
    }

    pub fn manhattan_distance(&self, a: Position, b: Position) -> u32 {
        a.manhattan(&b)
    }

    /// Shortest-path move count between two field cells, tunnels included
    pub fn path_distance(&self, a: Position, b: Position) -> Result<u32> {
        self.distances.distance(self, a, b)
    }

    pub fn distances(&self) -> &DistanceTable {
        &self.distances
    }

    pub fn noise(&self) -> &NoiseModel {
        &self.noise
    }

    /// Sample a noisy range reading between two cells
    pub fn noisy_distance<R: Rng + ?Sized>(&self, a: Position, b: Position, rng: &mut R) -> u32 {
        self.noise.sample(a.manhattan(&b), rng)
    }

    /// P(observed | actual) for the range sensor; 0 for untabulated pairs
    pub fn noisy_distance_likelihood(&self, observed: u32, actual: u32) -> f64 {
        self.noise.likelihood(observed, actual)
    }

    /// Row-major index of a field cell, used by the dense distance table
    pub(crate) fn field_index(&self, pos: Position) -> Option<usize> {
        if !self.contains(pos) {
            return None;
        }
        self.field.binary_search_by_key(&(pos.y, pos.x), |p| (p.y, p.x)).ok()
    }
}

impl fmt::Display for Maze {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.width) {
            let line: String = row.iter().map(|cell| cell.to_char()).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classic_dimensions() {
        let maze = Maze::classic();
        assert_eq!(maze.width(), 19);
        assert_eq!(maze.height(), 19);
        assert_eq!(maze.size(), 19);
        assert_eq!(maze.hunter_start(), Position::new(9, 9));
        assert_eq!(
            maze.tunnel(),
            Some((Position::new(0, 9), Position::new(18, 9)))
        );
    }

    #[test]
    fn test_field_excludes_walls() {
        let maze = Maze::classic();
        assert!(maze.field_of_play().iter().all(|&p| maze.contains(p)));
        assert!(!maze.contains(Position::new(0, 0)));
        assert!(!maze.contains(Position::new(-1, 9)));
        assert!(maze.contains(Position::new(1, 1)));
    }

    #[test]
    fn test_tunnel_wraps_around() {
        let maze = Maze::classic();
        let west_moves = maze.moves(Position::new(0, 9));
        assert!(west_moves.contains(&(Direction::West, Position::new(18, 9))));
        assert!(west_moves.contains(&(Direction::East, Position::new(1, 9))));

        let east_moves = maze.moves(Position::new(18, 9));
        assert!(east_moves.contains(&(Direction::East, Position::new(0, 9))));
        assert!(east_moves.contains(&(Direction::West, Position::new(17, 9))));
    }

    #[test]
    fn test_hunter_start_opens_north_and_south() {
        let maze = Maze::classic();
        let moves = maze.moves(maze.hunter_start());
        assert_eq!(
            moves,
            vec![
                (Direction::North, Position::new(9, 8)),
                (Direction::South, Position::new(9, 10)),
            ]
        );
    }

    #[test]
    fn test_corners_are_open() {
        let maze = Maze::classic();
        for corner in maze.corners() {
            assert!(maze.contains(corner), "{} should be open", corner);
        }
    }

    #[test]
    fn test_parse_rejects_ragged_rows() {
        let result = Maze::parse(&["WWW", "WS", "WWW"]);
        assert!(matches!(result, Err(HuntError::InvalidLayout(_))));
    }

    #[test]
    fn test_parse_rejects_missing_start() {
        let result = Maze::parse(&["WWW", "W W", "WWW"]);
        assert!(matches!(result, Err(HuntError::InvalidLayout(_))));
    }

    #[test]
    fn test_parse_rejects_half_tunnel() {
        let result = Maze::parse(&["WWWW", "AS W", "WWWW"]);
        assert!(matches!(result, Err(HuntError::InvalidLayout(_))));
    }

    #[test]
    fn test_display_round_trips_layout() {
        let maze = Maze::classic();
        let rendered = maze.to_string();
        let rows: Vec<&str> = rendered.lines().collect();
        assert_eq!(rows, CLASSIC_LAYOUT.to_vec());
    }
}
