use std::collections::{HashSet, VecDeque};
use std::ops::BitOr;

use crate::cell::{CellContent, CellState};
use crate::grid::Grid;
use crate::types::Pos;

/// Outcome of a reveal, mergeable across flood-fill and assist openings.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OpenOutcome {
    NoChange,
    Opened,
    Exploded,
    Won,
}

impl OpenOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }

    pub const fn is_exploded(self) -> bool {
        matches!(self, Self::Exploded)
    }
}

/// Merge keeps the most consequential outcome: an explosion trumps a win,
/// a win trumps a plain open.
impl BitOr for OpenOutcome {
    type Output = OpenOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use OpenOutcome::*;
        match (self, rhs) {
            (Exploded, _) | (_, Exploded) => Exploded,
            (Won, _) | (_, Won) => Won,
            (Opened, _) | (_, Opened) => Opened,
            (NoChange, NoChange) => NoChange,
        }
    }
}

/// Outcome of a flag gesture. `Won` replaces `Flagged` when the flag
/// completes the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlagOutcome {
    NoChange,
    Flagged,
    Unflagged,
    Won,
}

impl FlagOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

impl Grid {
    /// Open one cell. Not a top-level gesture: no assist rules, no win
    /// check, no history. A zero-adjacency cell flood-fills its region
    /// through an explicit worklist, so call depth stays flat on large
    /// boards.
    pub fn open_cell(&mut self, pos: Pos) -> OpenOutcome {
        if !self.in_bounds(pos) {
            return OpenOutcome::NoChange;
        }
        let cell = self.cell(pos);
        match cell.state {
            CellState::Revealed | CellState::WronglyFlagged => return OpenOutcome::NoChange,
            CellState::Hidden | CellState::Flagged => {}
        }

        self.cell_mut(pos).state = CellState::Revealed;
        let adjacency = match cell.content {
            CellContent::Mine => {
                log::debug!("mine hit at {:?}", pos);
                return OpenOutcome::Exploded;
            }
            CellContent::Safe(n) => n,
        };
        log::trace!("opened {:?}, adjacency {}", pos, adjacency);

        if adjacency == 0 {
            self.flood_from(pos);
        }
        OpenOutcome::Opened
    }

    /// Reveals the zero-adjacency region connected to `start` plus its
    /// numbered border. The worklist only ever admits hidden cells, so
    /// flags survive and nothing is visited twice.
    fn flood_from(&mut self, start: Pos) {
        let mut visited = HashSet::from([start]);
        let mut to_visit: VecDeque<Pos> = self
            .neighbors(start)
            .filter(|&pos| self.cell(pos).state.is_hidden())
            .collect();

        while let Some(pos) = to_visit.pop_front() {
            if !visited.insert(pos) {
                continue;
            }
            if !self.cell(pos).state.is_hidden() {
                continue;
            }

            self.cell_mut(pos).state = CellState::Revealed;
            log::trace!("flood opened {:?}", pos);

            if self.cell(pos).content == CellContent::Safe(0) {
                let next: Vec<Pos> = self
                    .neighbors(pos)
                    .filter(|&n| self.cell(n).state.is_hidden() && !visited.contains(&n))
                    .collect();
                to_visit.extend(next);
            }
        }
    }

    /// Loss cascade: flags that marked safe cells become terminal, then
    /// the whole board is revealed for the caller to show.
    pub fn cascade_loss(&mut self) {
        for pos in self.positions() {
            let cell = self.cell(pos);
            if cell.state == CellState::Flagged && !cell.is_mine() {
                self.cell_mut(pos).state = CellState::WronglyFlagged;
            }
        }
        for pos in self.positions() {
            let cell = self.cell_mut(pos);
            if matches!(cell.state, CellState::Hidden | CellState::Flagged) {
                cell.state = CellState::Revealed;
            }
        }
        log::debug!("loss cascade revealed the board");
    }

    /// Flag or unflag one cell. `force` always ends at `Flagged`; the
    /// auto-flag rule uses it so an already-placed flag is kept.
    pub fn set_flag(&mut self, pos: Pos, force: bool) -> FlagOutcome {
        if !self.in_bounds(pos) {
            return FlagOutcome::NoChange;
        }
        match self.cell(pos).state {
            CellState::Revealed | CellState::WronglyFlagged => FlagOutcome::NoChange,
            CellState::Flagged if force => FlagOutcome::NoChange,
            CellState::Flagged => {
                self.cell_mut(pos).state = CellState::Hidden;
                FlagOutcome::Unflagged
            }
            CellState::Hidden => {
                self.cell_mut(pos).state = CellState::Flagged;
                FlagOutcome::Flagged
            }
        }
    }

    /// Rule: when exactly `adjacency` unrevealed neighbors remain around a
    /// revealed cell, they are all mines; flag them. One sweep over the
    /// grid per top-level reveal.
    pub fn auto_flag_sweep(&mut self) -> bool {
        let mut changed = false;
        for pos in self.positions() {
            if !self.cell(pos).state.is_revealed() {
                continue;
            }
            let summary = self.neighbor_summary(pos);
            if (summary.total - summary.revealed) as i8 != summary.adjacency {
                continue;
            }
            let targets: Vec<Pos> = self
                .neighbors(pos)
                .filter(|&n| self.cell(n).state.is_hidden())
                .collect();
            for target in targets {
                changed |= self.set_flag(target, true).has_update();
                log::trace!("auto-flagged {:?}", target);
            }
        }
        changed
    }

    /// Rule: when a revealed cell's flagged-neighbor count equals its
    /// adjacency, its remaining neighbors are deduced safe; open them.
    /// Opening one cell can enable the rule elsewhere, so the grid is
    /// swept repeatedly until a full pass opens nothing. Flags are trusted:
    /// a wrong one makes this hit a mine, and the caller loses the game.
    pub fn auto_open_to_fixpoint(&mut self) -> OpenOutcome {
        let mut merged = OpenOutcome::NoChange;
        loop {
            let mut opened_this_pass = false;
            for pos in self.positions() {
                if !self.cell(pos).state.is_revealed() {
                    continue;
                }
                let summary = self.neighbor_summary(pos);
                if summary.adjacency < 0 {
                    continue;
                }
                let adjacency = summary.adjacency as u8;
                if summary.revealed + adjacency == summary.total || adjacency != summary.flagged {
                    continue;
                }
                let targets: Vec<Pos> = self
                    .neighbors(pos)
                    .filter(|&n| !self.cell(n).state.is_flagged())
                    .collect();
                for target in targets {
                    let outcome = self.open_cell(target);
                    if outcome.is_exploded() {
                        return OpenOutcome::Exploded;
                    }
                    opened_this_pass |= outcome.has_update();
                    merged = merged | outcome;
                }
            }
            if !opened_this_pass {
                break;
            }
        }
        merged
    }

    /// Win scan: not won while any flag marks a safe cell, any cell is
    /// still hidden, or a mine stands revealed.
    pub fn is_cleared(&self) -> bool {
        for pos in self.positions() {
            let cell = self.cell(pos);
            let blocking = match (cell.state, cell.content) {
                (CellState::Flagged, content) => !content.is_mine(),
                (CellState::Hidden, _) => true,
                (CellState::WronglyFlagged, _) => true,
                (CellState::Revealed, content) => content.is_mine(),
            };
            if blocking {
                return false;
            }
        }
        true
    }
}
