use crate::grid::Grid;

/// Append-only stack of full grid snapshots, oldest first. The first entry
/// is the game's initial state and is never popped.
#[derive(Clone, Debug)]
pub struct History {
    snapshots: Vec<Grid>,
}

impl History {
    pub fn new(initial: Grid) -> History {
        History {
            snapshots: vec![initial],
        }
    }

    /// Records the state after one completed top-level action.
    pub fn record(&mut self, grid: &Grid) {
        self.snapshots.push(grid.clone());
    }

    /// Steps back one action, returning the grid to restore wholesale.
    /// `None` when only the initial snapshot remains; that is a no-op for
    /// the caller, not an error.
    pub fn undo(&mut self) -> Option<Grid> {
        if self.snapshots.len() > 1 {
            self.snapshots.pop();
            self.snapshots.last().cloned()
        } else {
            None
        }
    }

    pub fn reset(&mut self, initial: Grid) {
        self.snapshots.clear();
        self.snapshots.push(initial);
    }

    pub fn depth(&self) -> usize {
        self.snapshots.len()
    }
}
