use std::collections::{HashSet, LinkedList};

use changing_mazes::{solve, solve_parallel, Direction, Graph, Grid, Position};
use rand::{rngs::StdRng, RngExt, SeedableRng};

fn grid<R: AsRef<[u8]>>(rows: &[R]) -> Grid {
    Grid::from_rows(rows).unwrap()
}

fn assert_both(grid: &Grid, expect: Option<usize>) {
    assert_eq!(solve(grid), expect, "sequential solve of\n{}", grid);
    assert_eq!(solve_parallel(grid), expect, "parallel solve of\n{}", grid);
}

#[test]
fn open_grid_reaches_lower_bound() {
    for (width, height) in [(1, 1), (1, 5), (6, 1), (4, 3), (7, 7)] {
        let grid = grid(&vec![vec![0u8; width]; height]);
        assert_both(&grid, Some(width + height - 1));
    }
}

#[test]
fn single_cell_grid_visits_one_cell() {
    assert_both(&grid(&[[0u8]]), Some(1));
}

#[test]
fn sealed_exit_is_unreachable() {
    assert_both(&grid(&[[0u8, 1, 1], [1, 1, 1], [1, 1, 0]]), None);
    assert_both(
        &grid(&[[0u8, 0, 1, 1, 0], [0, 0, 1, 1, 0], [0, 0, 1, 1, 0]]),
        None,
    );
}

#[test]
fn smaller_of_two_openings_wins() {
    // Opening (3, 3) gives 13 cells, opening (3, 4) gives 11.
    let grid = grid(&[
        [0u8, 0, 1, 0, 0],
        [1, 0, 0, 1, 1],
        [0, 0, 1, 0, 1],
        [0, 1, 0, 1, 0],
        [0, 0, 0, 1, 0],
    ]);
    let candidates = grid.barrier_candidates();
    assert!(candidates.contains(&Position::new(3, 3)));
    assert!(candidates.contains(&Position::new(3, 4)));
    for (barrier, expect) in [(Position::new(3, 3), 13), (Position::new(3, 4), 11)] {
        let mut graph = Graph::with_opened(&grid, &barrier);
        graph.simplify_fully();
        assert_eq!(graph.shortest_path_len(), Some(expect), "opening {}", barrier);
    }
    assert_both(&grid, Some(11));
}

#[test]
fn known_mazes_give_known_answers() {
    assert_both(
        &grid(&[
            [0u8, 0, 1, 1, 1],
            [1, 1, 1, 1, 1],
            [1, 0, 0, 0, 0],
            [0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0],
        ]),
        Some(9),
    );
    assert_both(&grid(&[[0u8, 0, 0, 0, 0, 0], [0, 0, 1, 0, 0, 0]]), Some(7));
    assert_both(
        &grid(&[[0u8, 0, 0, 1], [0, 0, 0, 1], [0, 0, 0, 1], [1, 1, 1, 0]]),
        Some(7),
    );
    assert_both(
        &grid(&[[0u8, 1, 1, 0], [0, 0, 0, 1], [1, 1, 0, 0], [1, 1, 1, 0]]),
        Some(7),
    );
}

#[test]
fn twenty_by_twenty_maze() {
    let grid = changing_mazes::read_grid("inputs.txt").unwrap();
    assert_eq!(grid.width(), 20);
    assert_eq!(grid.height(), 20);
    assert_both(&grid, Some(39));
}

/// Cells visited from the entrance to the exit walking only on open cells, by breadth first search.
fn walk_len(grid: &Grid, opened: Option<&Position>) -> Option<usize> {
    let passable = |pos: &Position| grid.is_open(pos) || Some(pos) == opened;
    let mut search_states = LinkedList::from([(grid.start(), 1)]);
    let mut searched_positions = HashSet::from([grid.start()]);
    while let Some((cur_pos, cur_cells_n)) = search_states.pop_front() {
        if cur_pos == grid.end() {
            return Some(cur_cells_n);
        }

        for next_pos in Direction::all_dirs()
            .iter()
            .filter_map(|dir| cur_pos.neighbor(*dir))
            .filter(|pos| passable(pos))
        {
            if searched_positions.insert(next_pos) {
                search_states.push_back((next_pos, cur_cells_n + 1));
            }
        }
    }

    None
}

/// Shortest walk over every way of opening at most one barrier.
fn exhaustive_len(grid: &Grid) -> Option<usize> {
    grid.positions()
        .filter(|pos| !grid.is_open(pos))
        .filter_map(|pos| walk_len(grid, Some(&pos)))
        .chain(walk_len(grid, None))
        .min()
}

fn random_grid(rng: &mut StdRng, width: usize, height: usize) -> Grid {
    let mut rows = (0..height)
        .map(|_| {
            (0..width)
                .map(|_| u8::from(rng.random_range(0..100) < 40))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    rows[0][0] = 0;
    rows[height - 1][width - 1] = 0;

    grid(&rows)
}

#[test]
fn random_mazes_match_exhaustive_search() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..2000 {
        let width = rng.random_range(1..8);
        let height = rng.random_range(1..8);
        let grid = random_grid(&mut rng, width, height);

        let expect = exhaustive_len(&grid);
        assert_eq!(solve(&grid), expect, "maze\n{}", grid);
        if let Some(len) = expect {
            assert!(len >= grid.lower_bound());
        }
    }
}

#[test]
fn parallel_matches_sequential_on_random_mazes() {
    let mut rng = StdRng::seed_from_u64(7);
    for size in 2..8 {
        for _ in 0..20 {
            let grid = random_grid(&mut rng, size + 1, size);
            assert_eq!(solve_parallel(&grid), solve(&grid), "maze\n{}", grid);
        }
    }
}
