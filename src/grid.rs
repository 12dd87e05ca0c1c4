use std::fmt::Display;

use crate::{Direction, Error, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Open,
    Barrier,
}

impl TryFrom<u8> for Cell {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Cell::Open),
            1 => Ok(Cell::Barrier),
            other => Err(Error::InvalidCellValue(other)),
        }
    }
}

impl TryFrom<char> for Cell {
    type Error = Error;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            '0' => Ok(Cell::Open),
            '1' => Ok(Cell::Barrier),
            other => Err(Error::InvalidCharForGrid(other)),
        }
    }
}

/// Immutable rectangular maze, the entrance is the top left cell and the exit is the bottom right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cells: Vec<Cell>,
    width: usize,
    height: usize,
}

impl Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.cells.chunks(self.width) {
            for cell in row {
                write!(
                    f,
                    "{}",
                    match cell {
                        Cell::Open => '0',
                        Cell::Barrier => '1',
                    }
                )?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

impl Grid {
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self, Error> {
        let mut builder = GridBuilder::new();
        for row in rows {
            builder.add_cells(
                row.as_ref()
                    .iter()
                    .map(|v| Cell::try_from(*v))
                    .collect::<Result<Vec<_>, _>>()?,
            )?;
        }

        builder.build()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn start(&self) -> Position {
        Position::new(0, 0)
    }

    pub fn end(&self) -> Position {
        Position::new(self.width - 1, self.height - 1)
    }

    /// Number of cells on any shortest path between the corners of an empty grid.
    pub fn lower_bound(&self) -> usize {
        self.width + self.height - 1
    }

    pub fn cell(&self, pos: &Position) -> Option<&Cell> {
        if pos.x() < self.width && pos.y() < self.height {
            self.cells.get(pos.y() * self.width + pos.x())
        } else {
            None
        }
    }

    pub fn is_open(&self, pos: &Position) -> bool {
        self.cell(pos).is_some_and(|cell| *cell == Cell::Open)
    }

    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Position::new(x, y)))
    }

    pub fn open_positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.positions().filter(|pos| self.is_open(pos))
    }

    /// Barriers worth opening, in position order. A barrier with fewer than two open neighbors
    /// only adds a dead end when opened, which the simplification drops right away.
    pub fn barrier_candidates(&self) -> Vec<Position> {
        let mut candidates = self
            .positions()
            .filter(|pos| self.cell(pos).is_some_and(|cell| *cell == Cell::Barrier))
            .filter(|pos| self.open_neighbors_n(pos) >= 2)
            .collect::<Vec<_>>();
        candidates.sort();

        candidates
    }

    fn open_neighbors_n(&self, pos: &Position) -> usize {
        Direction::all_dirs()
            .iter()
            .filter_map(|dir| pos.neighbor(*dir))
            .filter(|pos| self.is_open(pos))
            .count()
    }
}

#[derive(Debug)]
pub struct GridBuilder {
    cells: Vec<Cell>,
    row_n: usize,
    col_n: Option<usize>,
}

impl Default for GridBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GridBuilder {
    pub fn new() -> Self {
        Self {
            cells: Vec::new(),
            row_n: 0,
            col_n: None,
        }
    }

    /// Parse one row of `0`s and `1`s. Separators used by list literals(spaces, commas and
    /// brackets) are skipped, rows with nothing left are ignored.
    pub fn add_row(&mut self, text: &str) -> Result<(), Error> {
        let cells = text
            .chars()
            .filter(|c| !c.is_whitespace() && !matches!(c, ',' | '[' | ']'))
            .map(Cell::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        if cells.is_empty() {
            return Ok(());
        }

        self.add_cells(cells)
    }

    pub fn add_cells(&mut self, cells: Vec<Cell>) -> Result<(), Error> {
        let this_col_n = cells.len();
        let expect_col_n = *self.col_n.get_or_insert(this_col_n);
        if expect_col_n != this_col_n {
            return Err(Error::InconsistentRow(expect_col_n, this_col_n));
        }

        self.cells.extend(cells);
        self.row_n += 1;

        Ok(())
    }

    pub fn build(self) -> Result<Grid, Error> {
        let width = self.col_n.unwrap_or(0);
        if width == 0 || self.row_n == 0 {
            return Err(Error::EmptyGrid);
        }

        let grid = Grid {
            cells: self.cells,
            width,
            height: self.row_n,
        };
        if !grid.is_open(&grid.start()) {
            return Err(Error::BlockedEntrance);
        }
        if !grid.is_open(&grid.end()) {
            return Err(Error::BlockedExit);
        }

        Ok(grid)
    }
}
