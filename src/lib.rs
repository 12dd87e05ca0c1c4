use std::{
    error,
    fmt::Display,
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
    sync::atomic::{AtomicBool, Ordering},
};

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

pub use graph::Graph;
pub use grid::{Cell, Grid, GridBuilder};

pub mod graph;
pub mod grid;

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    InconsistentRow(usize, usize),
    InvalidCharForGrid(char),
    InvalidCellValue(u8),
    EmptyGrid,
    BlockedEntrance,
    BlockedExit,
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InconsistentRow(expect_col_n, this_col_n) => write!(
                f,
                "Expect {} column(s) in each row, given {}.",
                expect_col_n, this_col_n
            ),
            Error::InvalidCharForGrid(c) => write!(f, "Invalid character({}) for grid.", c),
            Error::InvalidCellValue(v) => {
                write!(f, "Invalid cell value({}), expect 0 or 1.", v)
            }
            Error::EmptyGrid => write!(f, "No cell in grid."),
            Error::BlockedEntrance => write!(f, "The entrance(top left cell) is a barrier."),
            Error::BlockedExit => write!(f, "The exit(bottom right cell) is a barrier."),
        }
    }
}

impl error::Error for Error {}

#[derive(Debug, Parser)]
pub struct CLIArgs {
    pub input_path: PathBuf,
    /// Try the barrier candidates on multiple threads
    #[arg(short, long)]
    pub parallel: bool,
    /// Print grid information before the answer
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    x: usize,
    y: usize,
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    pub fn x(&self) -> usize {
        self.x
    }

    pub fn y(&self) -> usize {
        self.y
    }

    pub fn neighbor(&self, dir: Direction) -> Option<Self> {
        match dir {
            Direction::North if self.y > 0 => Some(Self::new(self.x, self.y - 1)),
            Direction::East => Some(Self::new(self.x + 1, self.y)),
            Direction::South => Some(Self::new(self.x, self.y + 1)),
            Direction::West if self.x > 0 => Some(Self::new(self.x - 1, self.y)),
            _ => None,
        }
    }

    pub fn manhattan_dist(&self, other: &Position) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub fn all_dirs() -> &'static [Direction] {
        static ALL_DIRCTIONS: [Direction; 4] = [
            Direction::North,
            Direction::East,
            Direction::South,
            Direction::West,
        ];

        &ALL_DIRCTIONS
    }
}

/// Length(in visited cells) of the shortest path from the top left to the bottom right of `grid`,
/// allowing at most one barrier to be turned into a corridor. `None` if no such path exists.
pub fn solve(grid: &Grid) -> Option<usize> {
    let candidates = grid.barrier_candidates();
    debug!(
        "Solving {}x{} grid with {} barrier candidate(s).",
        grid.width(),
        grid.height(),
        candidates.len()
    );
    if candidates.is_empty() {
        let res = run_trial(Graph::from_grid(grid));
        info!("Shortest path without removing barrier: {:?}.", res);
        return res;
    }

    let lower_bound = grid.lower_bound();
    let mut min_steps_n = None;
    for barrier in &candidates {
        let steps_n = run_trial(Graph::with_opened(grid, barrier));
        debug!("Opening barrier at {} gives {:?}.", barrier, steps_n);
        if steps_n == Some(lower_bound) {
            info!("Reached the lower bound({}) by opening {}.", lower_bound, barrier);
            return steps_n;
        }

        min_steps_n = min_option(min_steps_n, steps_n);
    }

    info!("Shortest path after trying all candidates: {:?}.", min_steps_n);
    min_steps_n
}

/// Same answer as [`solve`], with the barrier candidates tried on the rayon thread pool.
pub fn solve_parallel(grid: &Grid) -> Option<usize> {
    let candidates = grid.barrier_candidates();
    if candidates.is_empty() {
        return run_trial(Graph::from_grid(grid));
    }

    let lower_bound = grid.lower_bound();
    let found_lower_bound = AtomicBool::new(false);
    let min_steps_n = candidates
        .par_iter()
        .filter_map(|barrier| {
            if found_lower_bound.load(Ordering::Relaxed) {
                return None;
            }

            let steps_n = run_trial(Graph::with_opened(grid, barrier));
            debug!("Opening barrier at {} gives {:?}.", barrier, steps_n);
            if steps_n == Some(lower_bound) {
                found_lower_bound.store(true, Ordering::Relaxed);
            }

            steps_n
        })
        .min();

    info!("Shortest path(parallel search): {:?}.", min_steps_n);
    min_steps_n
}

fn run_trial(mut graph: Graph) -> Option<usize> {
    graph.simplify_fully();
    graph.shortest_path_len()
}

fn min_option(left: Option<usize>, right: Option<usize>) -> Option<usize> {
    match (left, right) {
        (Some(l), Some(r)) => Some(l.min(r)),
        (l, None) => l,
        (None, r) => r,
    }
}

pub fn read_grid<P: AsRef<Path>>(path: P) -> Result<Grid> {
    let file = File::open(&path)
        .with_context(|| format!("Failed to open given file({}).", path.as_ref().display()))?;
    let reader = BufReader::new(file);
    let mut builder = GridBuilder::new();
    for (ind, line) in reader.lines().enumerate() {
        let line = line.with_context(|| {
            format!(
                "Failed to read line {} in given file({}).",
                ind + 1,
                path.as_ref().display()
            )
        })?;
        builder.add_row(line.as_str()).with_context(|| {
            format!(
                "Invalid row at line {} in given file({}).",
                ind + 1,
                path.as_ref().display()
            )
        })?;
    }

    Ok(builder.build()?)
}
