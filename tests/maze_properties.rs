//! Grid map and sensor model properties

use maze_hunt::core::{Direction, HuntError, Position};
use maze_hunt::maze::Maze;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn field_pair() -> impl Strategy<Value = (usize, usize)> {
    let n = Maze::classic().field_of_play().len();
    (0..n, 0..n)
}

proptest! {
    #[test]
    fn test_path_distance_is_symmetric((i, j) in field_pair()) {
        let maze = Maze::classic();
        let a = maze.field_of_play()[i];
        let b = maze.field_of_play()[j];
        prop_assert_eq!(maze.path_distance(a, b).unwrap(), maze.path_distance(b, a).unwrap());
    }

    #[test]
    fn test_neighbors_differ_by_at_most_one((i, j) in field_pair()) {
        let maze = Maze::classic();
        let a = maze.field_of_play()[i];
        let b = maze.field_of_play()[j];
        let d = maze.path_distance(a, b).unwrap();
        for (_, next) in maze.moves(a) {
            let dn = maze.path_distance(next, b).unwrap();
            prop_assert!(dn + 1 >= d && dn <= d + 1);
        }
    }

    #[test]
    fn test_readings_stay_in_range(seed in any::<u64>(), (i, j) in field_pair()) {
        let maze = Maze::classic();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let a = maze.field_of_play()[i];
        let b = maze.field_of_play()[j];
        let reading = maze.noisy_distance(a, b, &mut rng);
        prop_assert!(reading >= 1);
        prop_assert!(reading <= 2 * maze.size() as u32 + 2);
        prop_assert!(reading.abs_diff(a.manhattan(&b)) <= 5 || reading == 1);
    }
}

#[test]
fn test_self_distance_is_zero() {
    let maze = Maze::classic();
    for &cell in maze.field_of_play() {
        assert_eq!(maze.path_distance(cell, cell).unwrap(), 0);
    }
}

#[test]
fn test_walls_fail_distance_lookup() {
    let maze = Maze::classic();
    let wall = Position::new(0, 0);
    assert!(matches!(
        maze.path_distance(wall, maze.hunter_start()),
        Err(HuntError::OffField(_))
    ));
}

#[test]
fn test_likelihood_columns_sum_to_one() {
    let maze = Maze::classic();
    let max_reading = maze.noise().max_reading();
    for actual in 1..=maze.noise().max_actual() {
        let total: f64 = (0..=max_reading)
            .map(|observed| maze.noisy_distance_likelihood(observed, actual))
            .sum();
        assert!((total - 1.0).abs() < 1e-9, "actual {} sums to {}", actual, total);
    }
}

#[test]
fn test_capture_signal() {
    let maze = Maze::classic();
    assert_eq!(maze.noisy_distance_likelihood(0, 0), 1.0);
    assert_eq!(maze.noisy_distance_likelihood(0, 7), 0.0);
    assert_eq!(maze.noisy_distance_likelihood(500, 7), 0.0);
}

#[test]
fn test_tunnel_is_a_shortcut() {
    let maze = Maze::classic();
    let (a, b) = maze.tunnel().unwrap();
    assert_eq!(maze.step(a, Direction::West), Some(b));
    assert_eq!(maze.step(b, Direction::East), Some(a));
    assert_eq!(maze.path_distance(a, b).unwrap(), 1);
}

#[test]
fn test_every_field_cell_has_a_move() {
    let maze = Maze::classic();
    for &cell in maze.field_of_play() {
        assert!(!maze.moves(cell).is_empty(), "{} is isolated", cell);
    }
}
