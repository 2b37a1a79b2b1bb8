//! Text codec for the `.mboard` board format: a `width height mines`
//! header, then one line per row of `adjacency.state` tokens.
//!
//! Decoding validates shape and token domain only. Whether the adjacency
//! numbers are consistent with the mine placement is deliberately not
//! checked: a corrupt file loads as-is and displays whatever it says,
//! rather than being silently repaired.

use ndarray::Array2;

use crate::cell::{Cell, CellContent, CellState};
use crate::error::{GameError, Result};
use crate::grid::{BoardConfig, Grid};
use crate::types::{CellCount, Coord};

pub fn encode(grid: &Grid) -> String {
    let config = grid.config();
    let mut out = format!("{} {} {}\n", config.width, config.height, config.mines);
    for row in 0..config.height {
        for col in 0..config.width {
            let cell = grid.cell((row, col));
            if col > 0 {
                out.push(' ');
            }
            out.push_str(&format!("{}.{}", cell.content.to_wire(), cell.state.to_wire()));
        }
        out.push('\n');
    }
    out
}

pub fn decode(text: &str) -> Result<Grid> {
    let mut lines = text.lines().filter(|line| !line.trim().is_empty());

    let header = lines.next().ok_or_else(|| malformed("empty board file"))?;
    let fields: Vec<&str> = header.split_whitespace().collect();
    if fields.len() != 3 {
        return Err(malformed("header must be `width height mines`"));
    }
    let width: Coord = parse_number(fields[0], "width")?;
    let height: Coord = parse_number(fields[1], "height")?;
    let mines: CellCount = parse_number(fields[2], "mine count")?;
    if width == 0 || height == 0 {
        return Err(malformed("board dimensions must be positive"));
    }

    let mut cells: Array2<Cell> = Array2::default((height as usize, width as usize));
    for row in 0..height {
        let line = lines
            .next()
            .ok_or_else(|| malformed(format!("missing row {row}")))?;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != width as usize {
            return Err(malformed(format!(
                "row {row} has {} cells, expected {width}",
                tokens.len()
            )));
        }
        for (col, token) in tokens.iter().enumerate() {
            cells[[row as usize, col]] = parse_cell(token, row)?;
        }
    }

    let config = BoardConfig {
        width,
        height,
        mines,
    };
    Ok(Grid::from_parts(config, cells))
}

fn parse_cell(token: &str, row: Coord) -> Result<Cell> {
    let (adjacency, state) = token
        .split_once('.')
        .ok_or_else(|| malformed(format!("bad cell token `{token}` in row {row}")))?;
    let adjacency: i8 = parse_number(adjacency, "adjacency")?;
    let state: i8 = parse_number(state, "cell state")?;

    let content = CellContent::from_wire(adjacency)
        .ok_or_else(|| malformed(format!("adjacency {adjacency} out of range in row {row}")))?;
    let state = CellState::from_wire(state)
        .ok_or_else(|| malformed(format!("cell state {state} out of range in row {row}")))?;
    Ok(Cell { content, state })
}

fn parse_number<T: std::str::FromStr>(field: &str, what: &str) -> Result<T> {
    field
        .parse()
        .map_err(|_| malformed(format!("cannot parse {what} from `{field}`")))
}

fn malformed(message: impl Into<String>) -> GameError {
    GameError::MalformedBoardFile(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::fill_adjacency;
    use crate::types::Pos;

    fn layout(width: Coord, height: Coord, mines: &[Pos]) -> Grid {
        let config = BoardConfig {
            width,
            height,
            mines: mines.len() as CellCount,
        };
        let mut grid = Grid::new_hidden(config);
        for &pos in mines {
            grid.cell_mut(pos).content = CellContent::Mine;
        }
        fill_adjacency(&mut grid);
        grid
    }

    #[test]
    fn round_trip_preserves_every_cell() {
        let mut grid = layout(4, 3, &[(0, 0), (2, 3)]);
        grid.open_cell((1, 1));
        grid.set_flag((0, 0), false);
        grid.cell_mut((2, 0)).state = CellState::WronglyFlagged;

        let decoded = decode(&encode(&grid)).unwrap();
        assert_eq!(decoded, grid);
    }

    #[test]
    fn round_trip_of_a_lost_board() {
        let mut grid = layout(3, 3, &[(1, 1)]);
        grid.set_flag((0, 2), false);
        grid.open_cell((1, 1));
        grid.cascade_loss();

        let decoded = decode(&encode(&grid)).unwrap();
        assert_eq!(decoded, grid);
        assert_eq!(decoded.cell((0, 2)).state, CellState::WronglyFlagged);
    }

    #[test]
    fn encode_writes_the_documented_shape() {
        let grid = layout(2, 2, &[(0, 0)]);
        let text = encode(&grid);
        assert_eq!(text, "2 2 1\n-1.-1 1.-1\n1.-1 1.-1\n");
    }

    #[test]
    fn decode_accepts_trailing_spaces_and_blank_lines() {
        // some writers leave a space before each newline
        let text = "2 2 1\n-1.-1 1.-1 \n1.-1 1.0 \n\n";
        let grid = decode(text).unwrap();
        assert!(grid.cell((0, 0)).is_mine());
        assert!(grid.cell((1, 1)).state.is_revealed());
    }

    #[test]
    fn decode_does_not_cross_check_adjacency_against_mines() {
        // header claims 5 mines, grid has none; loads anyway
        let text = "2 1 5\n3.-1 8.0\n";
        let grid = decode(text).unwrap();
        assert_eq!(grid.config().mines, 5);
        assert_eq!(grid.cell((0, 0)).content, CellContent::Safe(3));
    }

    #[test]
    fn decode_rejects_structural_damage() {
        for text in [
            "",
            "2 2\n",
            "x 2 1\n-1.-1 1.-1\n1.-1 1.-1\n",
            "0 2 1\n",
            "2 2 1\n-1.-1 1.-1\n",
            "2 2 1\n-1.-1 1.-1 1.-1\n1.-1 1.-1\n",
            "2 2 1\n-1.-1 banana\n1.-1 1.-1\n",
            "2 2 1\n-1.-1 9.-1\n1.-1 1.-1\n",
            "2 2 1\n-1.-1 1.3\n1.-1 1.-1\n",
        ] {
            assert!(
                matches!(decode(text), Err(GameError::MalformedBoardFile(_))),
                "accepted: {text:?}"
            );
        }
    }
}
