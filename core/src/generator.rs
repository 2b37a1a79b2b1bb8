use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::index;

use crate::cell::CellContent;
use crate::error::{GameError, Result};
use crate::grid::{BoardConfig, Grid};
use crate::types::Pos;

/// Produces a mine layout for a board, honoring a set of cells that must
/// stay safe.
pub trait LayoutGenerator {
    fn generate(&mut self, config: BoardConfig, safe_zone: &[Pos]) -> Result<Grid>;
}

/// Uniform scatter: every combination of `config.mines` eligible cells is
/// equally likely. Deterministic for a given seed.
#[derive(Clone, Debug)]
pub struct MineScatter {
    rng: SmallRng,
}

impl MineScatter {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl LayoutGenerator for MineScatter {
    fn generate(&mut self, config: BoardConfig, safe_zone: &[Pos]) -> Result<Grid> {
        config.validate()?;

        let mut grid = Grid::new_hidden(config);
        let eligible: Vec<Pos> = grid
            .positions()
            .filter(|pos| !safe_zone.contains(pos))
            .collect();

        if usize::from(config.mines) > eligible.len() {
            return Err(GameError::InvalidConfiguration {
                width: config.width,
                height: config.height,
                mines: config.mines,
            });
        }

        for choice in index::sample(&mut self.rng, eligible.len(), config.mines.into()).into_vec() {
            grid.cell_mut(eligible[choice]).content = CellContent::Mine;
        }
        fill_adjacency(&mut grid);

        log::debug!(
            "generated {}x{} layout, {} mines, {} excluded cells",
            config.width,
            config.height,
            config.mines,
            safe_zone.len()
        );
        Ok(grid)
    }
}

/// Recomputes every safe cell's adjacency from the mine placement.
pub(crate) fn fill_adjacency(grid: &mut Grid) {
    for pos in grid.positions() {
        if grid.cell(pos).is_mine() {
            continue;
        }
        let count = grid
            .neighbors(pos)
            .filter(|&neighbor| grid.cell(neighbor).is_mine())
            .count() as u8;
        grid.cell_mut(pos).content = CellContent::Safe(count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NeighborIter;

    fn mine_positions(grid: &Grid) -> Vec<Pos> {
        grid.positions()
            .filter(|&pos| grid.cell(pos).is_mine())
            .collect()
    }

    #[test]
    fn places_exactly_the_requested_mines() {
        for seed in 0..8 {
            let config = BoardConfig::new(9, 9, 30).unwrap();
            let grid = MineScatter::new(seed).generate(config, &[]).unwrap();
            assert_eq!(mine_positions(&grid).len(), 30, "seed {seed}");
        }
    }

    #[test]
    fn adjacency_matches_recount() {
        let config = BoardConfig::new(8, 6, 12).unwrap();
        let grid = MineScatter::new(7).generate(config, &[]).unwrap();
        for pos in grid.positions() {
            let cell = grid.cell(pos);
            if cell.is_mine() {
                continue;
            }
            let recount = NeighborIter::new(pos, 6, 8)
                .filter(|&neighbor| grid.cell(neighbor).is_mine())
                .count() as i8;
            assert_eq!(cell.content.to_wire(), recount, "at {pos:?}");
        }
    }

    #[test]
    fn safe_zone_is_never_mined() {
        let config = BoardConfig::new(9, 9, 40).unwrap();
        let safe_zone: Vec<Pos> = [(4, 4)]
            .into_iter()
            .chain(NeighborIter::new((4, 4), 9, 9))
            .collect();
        for seed in 0..8 {
            let grid = MineScatter::new(seed).generate(config, &safe_zone).unwrap();
            for &pos in &safe_zone {
                assert!(!grid.cell(pos).is_mine(), "seed {seed} mined {pos:?}");
            }
            assert_eq!(mine_positions(&grid).len(), 40);
        }
    }

    #[test]
    fn rejects_mines_that_do_not_fit_the_exclusions() {
        // 3x3 leaves no eligible cell once the whole neighborhood is safe
        let config = BoardConfig::new(3, 3, 8).unwrap();
        let safe_zone: Vec<Pos> = [(1, 1)]
            .into_iter()
            .chain(NeighborIter::new((1, 1), 3, 3))
            .collect();
        let result = MineScatter::new(0).generate(config, &safe_zone);
        assert!(matches!(
            result,
            Err(GameError::InvalidConfiguration { mines: 8, .. })
        ));
    }

    #[test]
    fn same_seed_same_layout() {
        let config = BoardConfig::new(10, 10, 20).unwrap();
        let first = MineScatter::new(42).generate(config, &[(0, 0)]).unwrap();
        let second = MineScatter::new(42).generate(config, &[(0, 0)]).unwrap();
        assert_eq!(first, second);
        let third = MineScatter::new(43).generate(config, &[(0, 0)]).unwrap();
        assert_ne!(first, third);
    }

    #[test]
    fn generated_grid_starts_fully_hidden() {
        let config = BoardConfig::new(5, 5, 6).unwrap();
        let grid = MineScatter::new(1).generate(config, &[]).unwrap();
        assert_eq!(
            grid.count_state(crate::cell::CellState::Hidden),
            config.total_cells()
        );
    }
}
