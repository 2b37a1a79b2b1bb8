use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::cell::{Cell, CellContent, CellState};
use crate::error::{GameError, Result};
use crate::types::{CellCount, Coord, NeighborIter, Pos, ToIndex, cell_total};

/// Fixed board parameters: dimensions plus the number of mines the layout
/// carries.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub width: Coord,
    pub height: Coord,
    pub mines: CellCount,
}

impl BoardConfig {
    pub fn new(width: Coord, height: Coord, mines: CellCount) -> Result<Self> {
        let config = Self {
            width,
            height,
            mines,
        };
        config.validate()?;
        Ok(config)
    }

    /// Invariant: `0 < mines < width * height`.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 || self.mines == 0 || self.mines >= self.total_cells()
        {
            return Err(GameError::InvalidConfiguration {
                width: self.width,
                height: self.height,
                mines: self.mines,
            });
        }
        Ok(())
    }

    pub const fn total_cells(&self) -> CellCount {
        cell_total(self.width, self.height)
    }
}

/// Aggregated neighborhood facts for one cell. Every deduction rule in the
/// assist engine is built on this one side-effect-free query.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NeighborSummary {
    /// In-bounds neighbor count: 3, 5, or 8.
    pub total: u8,
    /// The cell's own wire adjacency: `-1` for a mine, `0..=8` otherwise.
    pub adjacency: i8,
    pub revealed: u8,
    pub flagged: u8,
}

/// The `height x width` cell matrix for one game, row-major and 0-indexed.
/// A value type: history snapshots and undo restore whole grids by clone.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    config: BoardConfig,
    cells: Array2<Cell>,
}

impl Grid {
    /// All-hidden grid with no layout yet; every cell reads `Safe(0)` until
    /// the generator or a loaded file fills the contents in.
    pub fn new_hidden(config: BoardConfig) -> Grid {
        Grid {
            config,
            cells: Array2::default((config.height as usize, config.width as usize)),
        }
    }

    pub(crate) fn from_parts(config: BoardConfig, cells: Array2<Cell>) -> Grid {
        Grid { config, cells }
    }

    pub fn config(&self) -> BoardConfig {
        self.config
    }

    pub fn width(&self) -> Coord {
        self.config.width
    }

    pub fn height(&self) -> Coord {
        self.config.height
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.0 < self.config.height && pos.1 < self.config.width
    }

    pub fn validate(&self, pos: Pos) -> Result<Pos> {
        if self.in_bounds(pos) {
            Ok(pos)
        } else {
            Err(GameError::InvalidCoordinate)
        }
    }

    pub fn cell(&self, pos: Pos) -> Cell {
        self.cells[pos.to_index()]
    }

    pub(crate) fn cell_mut(&mut self, pos: Pos) -> &mut Cell {
        &mut self.cells[pos.to_index()]
    }

    pub fn neighbors(&self, pos: Pos) -> NeighborIter {
        NeighborIter::new(pos, self.config.height, self.config.width)
    }

    /// Row-major iteration over every position.
    pub fn positions(&self) -> impl Iterator<Item = Pos> + use<> {
        let rows = self.config.height;
        let cols = self.config.width;
        (0..rows).flat_map(move |row| (0..cols).map(move |col| (row, col)))
    }

    pub fn neighbor_summary(&self, pos: Pos) -> NeighborSummary {
        let mut total = 0;
        let mut revealed = 0;
        let mut flagged = 0;
        for neighbor in self.neighbors(pos) {
            total += 1;
            match self.cell(neighbor).state {
                CellState::Revealed => revealed += 1,
                CellState::Flagged => flagged += 1,
                CellState::Hidden | CellState::WronglyFlagged => {}
            }
        }
        NeighborSummary {
            total,
            adjacency: self.cell(pos).content.to_wire(),
            revealed,
            flagged,
        }
    }

    /// Whether a mine layout exists yet, generated or loaded.
    pub fn has_layout(&self) -> bool {
        self.cells.iter().any(|cell| cell.is_mine())
    }

    pub fn count_mines(&self) -> CellCount {
        self.cells.iter().filter(|cell| cell.is_mine()).count() as CellCount
    }

    /// Re-hide every cell, keeping the layout. Used by retry.
    pub(crate) fn close_all(&mut self) {
        for cell in self.cells.iter_mut() {
            cell.state = CellState::Hidden;
        }
    }

    pub fn count_state(&self, state: CellState) -> CellCount {
        self.cells.iter().filter(|cell| cell.state == state).count() as CellCount
    }

    /// First zero-adjacency cell in row-major order, a comfortable opening
    /// move to suggest after a retry.
    pub fn start_hint(&self) -> Option<Pos> {
        self.positions()
            .find(|&pos| self.cell(pos).content == CellContent::Safe(0))
    }
}
