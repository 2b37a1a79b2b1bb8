use serde::{Deserialize, Serialize};

/// What a cell permanently is. Fixed when the layout is generated or
/// loaded; only the display state changes during play.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellContent {
    Mine,
    /// Number of mines among the up-to-8 neighbors.
    Safe(u8),
}

impl CellContent {
    pub const fn is_mine(self) -> bool {
        matches!(self, Self::Mine)
    }

    /// Board-file adjacency value: `-1` for a mine, `0..=8` otherwise.
    pub const fn to_wire(self) -> i8 {
        match self {
            Self::Mine => -1,
            Self::Safe(n) => n as i8,
        }
    }

    pub fn from_wire(raw: i8) -> Option<Self> {
        match raw {
            -1 => Some(Self::Mine),
            0..=8 => Some(Self::Safe(raw as u8)),
            _ => None,
        }
    }
}

impl Default for CellContent {
    fn default() -> Self {
        Self::Safe(0)
    }
}

/// Player-visible state of a cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellState {
    Hidden,
    Revealed,
    Flagged,
    /// Flag that turned out to be wrong, applied by the loss cascade.
    /// Terminal: never reversed within a game.
    WronglyFlagged,
}

impl CellState {
    pub const fn is_hidden(self) -> bool {
        matches!(self, Self::Hidden)
    }

    pub const fn is_revealed(self) -> bool {
        matches!(self, Self::Revealed)
    }

    pub const fn is_flagged(self) -> bool {
        matches!(self, Self::Flagged)
    }

    /// Board-file state value: `-1` hidden, `0` revealed, `1` flagged,
    /// `2` wrongly flagged.
    pub const fn to_wire(self) -> i8 {
        match self {
            Self::Hidden => -1,
            Self::Revealed => 0,
            Self::Flagged => 1,
            Self::WronglyFlagged => 2,
        }
    }

    pub fn from_wire(raw: i8) -> Option<Self> {
        match raw {
            -1 => Some(Self::Hidden),
            0 => Some(Self::Revealed),
            1 => Some(Self::Flagged),
            2 => Some(Self::WronglyFlagged),
            _ => None,
        }
    }
}

impl Default for CellState {
    fn default() -> Self {
        Self::Hidden
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub content: CellContent,
    pub state: CellState,
}

impl Cell {
    pub const fn is_mine(self) -> bool {
        self.content.is_mine()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_wire_round_trip() {
        for raw in -1..=8 {
            let content = CellContent::from_wire(raw).unwrap();
            assert_eq!(content.to_wire(), raw);
        }
        assert_eq!(CellContent::from_wire(9), None);
        assert_eq!(CellContent::from_wire(-2), None);
    }

    #[test]
    fn state_wire_round_trip() {
        for raw in -1..=2 {
            let state = CellState::from_wire(raw).unwrap();
            assert_eq!(state.to_wire(), raw);
        }
        assert_eq!(CellState::from_wire(3), None);
        assert_eq!(CellState::from_wire(-2), None);
    }

    #[test]
    fn default_cell_is_hidden_and_safe() {
        let cell = Cell::default();
        assert_eq!(cell.content, CellContent::Safe(0));
        assert_eq!(cell.state, CellState::Hidden);
    }
}
