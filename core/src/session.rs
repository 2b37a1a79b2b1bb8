use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::cell::CellState;
use crate::codec;
use crate::engine::{FlagOutcome, OpenOutcome};
use crate::error::{GameError, Result};
use crate::generator::{LayoutGenerator, MineScatter};
use crate::grid::{BoardConfig, Grid};
use crate::history::History;
use crate::types::{Coord, Pos, cell_total};

/// Board sides are capped at 50 cells, matching the settings collaborator.
pub const MAX_SIDE: Coord = 50;

/// Data returned by the settings collaborator: board dimensions plus the
/// difficulty rate that fixes the mine count.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameSettings {
    pub width: Coord,
    pub height: Coord,
    /// Fraction of the board that is mined, in `[0.0, 1.0]`.
    pub difficulty: f32,
}

impl GameSettings {
    pub fn new(width: Coord, height: Coord, difficulty: f32) -> Self {
        Self {
            width,
            height,
            difficulty,
        }
    }

    /// Board parameters implied by these settings; the mine count is the
    /// mined fraction of the area, truncated.
    pub fn board_config(&self) -> Result<BoardConfig> {
        let total = cell_total(self.width, self.height);
        let mines = (self.difficulty.clamp(0.0, 1.0) * f32::from(total)) as u16;
        if self.width == 0
            || self.width > MAX_SIDE
            || self.height == 0
            || self.height > MAX_SIDE
            || !(0.0..=1.0).contains(&self.difficulty)
        {
            return Err(GameError::InvalidConfiguration {
                width: self.width,
                height: self.height,
                mines,
            });
        }
        BoardConfig::new(self.width, self.height, mines)
    }
}

/// Automation switches for the assist engine. The auto-flag sweep always
/// runs after a top-level reveal; the auto-open fixed point is optional.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOptions {
    pub auto_open: bool,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self { auto_open: true }
    }
}

/// One game from settings to win or loss. Owns the grid, the undo history,
/// the RNG, and the once-per-game win notification gate; the presentation
/// layer calls the operations below and redraws from `grid()`.
///
/// Layout generation is deferred until the first reveal so that the first
/// clicked cell and its whole neighborhood can be excluded from the mines.
#[derive(Clone, Debug)]
pub struct GameSession {
    config: BoardConfig,
    options: GameOptions,
    grid: Grid,
    history: History,
    rng: SmallRng,
    generated: bool,
    has_won: bool,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
}

impl GameSession {
    pub fn new(settings: GameSettings, options: GameOptions) -> Result<Self> {
        Self::with_seed(settings, options, rand::rng().random())
    }

    /// Deterministic variant: the seed fixes every layout this session
    /// will generate.
    pub fn with_seed(settings: GameSettings, options: GameOptions, seed: u64) -> Result<Self> {
        let config = settings.board_config()?;
        let grid = Grid::new_hidden(config);
        Ok(Self {
            config,
            options,
            history: History::new(grid.clone()),
            grid,
            rng: SmallRng::seed_from_u64(seed),
            generated: false,
            has_won: false,
            started_at: None,
            ended_at: None,
        })
    }

    /// Adopts an existing grid, e.g. one decoded from a board file. The
    /// numeric settings do not apply; the grid brings its own config.
    pub fn from_grid(grid: Grid, options: GameOptions) -> Self {
        let config = grid.config();
        let generated = grid.has_layout();
        if generated && grid.count_mines() != config.mines {
            log::warn!(
                "board declares {} mines but contains {}",
                config.mines,
                grid.count_mines()
            );
        }
        Self {
            config,
            options,
            history: History::new(grid.clone()),
            grid,
            rng: SmallRng::from_os_rng(),
            generated,
            has_won: false,
            started_at: None,
            ended_at: None,
        }
    }

    pub fn from_board_file(path: impl AsRef<Path>, options: GameOptions) -> Result<Self> {
        let grid = codec::decode(&fs::read_to_string(path)?)?;
        Ok(Self::from_grid(grid, options))
    }

    /// Replaces the current game with a fresh ungenerated board.
    pub fn new_game(&mut self, settings: GameSettings) -> Result<()> {
        let config = settings.board_config()?;
        self.config = config;
        self.grid = Grid::new_hidden(config);
        self.history.reset(self.grid.clone());
        self.generated = false;
        self.has_won = false;
        self.started_at = None;
        self.ended_at = None;
        log::debug!(
            "new {}x{} game, {} mines",
            config.width,
            config.height,
            config.mines
        );
        Ok(())
    }

    /// Keeps the layout, closes every cell, and starts over. Before the
    /// first reveal there is no layout yet, so only the bookkeeping resets.
    pub fn retry(&mut self) {
        self.grid.close_all();
        self.history.reset(self.grid.clone());
        self.has_won = false;
        self.started_at = None;
        self.ended_at = None;
        log::debug!("retrying the same board");
    }

    /// Replaces the game with a board file's contents. Decoding happens
    /// before any state is touched, so a bad file leaves the current game
    /// intact.
    pub fn load_board(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let grid = codec::decode(&fs::read_to_string(path)?)?;
        self.config = grid.config();
        self.generated = grid.has_layout();
        self.history.reset(grid.clone());
        self.grid = grid;
        self.has_won = false;
        self.started_at = None;
        self.ended_at = None;
        Ok(())
    }

    pub fn save_board(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, codec::encode(&self.grid))?;
        Ok(())
    }

    /// Top-level reveal gesture. Generates the layout on the very first
    /// reveal, opens with flood-fill, then runs the loss cascade or the
    /// assist rules, checks for the win, and snapshots the result.
    pub fn open(&mut self, pos: Pos) -> Result<OpenOutcome> {
        let pos = self.grid.validate(pos)?;
        if !self.generated {
            self.generate_layout(pos)?;
        }

        let mut outcome = self.grid.open_cell(pos);
        if outcome.is_exploded() {
            return Ok(self.finish_loss());
        }

        if outcome.has_update() {
            self.grid.auto_flag_sweep();
            if self.options.auto_open {
                let assist = self.grid.auto_open_to_fixpoint();
                if assist.is_exploded() {
                    return Ok(self.finish_loss());
                }
                outcome = outcome | assist;
            }
        }

        if self.check_win() {
            outcome = outcome | OpenOutcome::Won;
        }
        if outcome.has_update() {
            self.mark_started();
            self.history.record(&self.grid);
        }
        Ok(outcome)
    }

    /// Top-level flag gesture. Flags are meaningless until the layout
    /// exists, so they are rejected before the first reveal.
    pub fn toggle_flag(&mut self, pos: Pos) -> Result<FlagOutcome> {
        let pos = self.grid.validate(pos)?;
        if !self.generated {
            return Err(GameError::IllegalStateTransition);
        }

        let mut outcome = self.grid.set_flag(pos, false);
        if self.check_win() {
            outcome = FlagOutcome::Won;
        }
        if outcome.has_update() {
            self.mark_started();
            self.history.record(&self.grid);
        }
        Ok(outcome)
    }

    /// Steps back one completed action, restoring the previous snapshot
    /// wholesale. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(previous) => {
                self.generated = previous.has_layout();
                self.grid = previous;
                // rewinding a terminal click resumes play
                self.ended_at = None;
                true
            }
            None => false,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn config(&self) -> BoardConfig {
        self.config
    }

    pub fn options(&self) -> GameOptions {
        self.options
    }

    /// Whether the mine layout exists yet.
    pub fn layout_ready(&self) -> bool {
        self.generated
    }

    pub fn has_won(&self) -> bool {
        self.has_won
    }

    /// How many mines are not flagged yet; negative with excess flags.
    pub fn mines_left(&self) -> i32 {
        i32::from(self.config.mines) - i32::from(self.grid.count_state(CellState::Flagged))
    }

    /// Seconds since the first reveal, 0 before it. Frozen once the game
    /// ends.
    pub fn elapsed_secs(&self) -> u32 {
        if let Some(started_at) = self.started_at {
            (self.ended_at.unwrap_or_else(Utc::now) - started_at)
                .num_seconds()
                .max(0) as u32
        } else {
            0
        }
    }

    /// A comfortable cell to suggest as the next opening move.
    pub fn start_hint(&self) -> Option<Pos> {
        if self.generated {
            self.grid.start_hint()
        } else {
            None
        }
    }

    fn generate_layout(&mut self, first: Pos) -> Result<()> {
        let mut safe_zone: Vec<Pos> = vec![first];
        safe_zone.extend(self.grid.neighbors(first));

        let seed = self.rng.random();
        self.grid = MineScatter::new(seed).generate(self.config, &safe_zone)?;
        self.generated = true;
        self.mark_started();
        Ok(())
    }

    fn finish_loss(&mut self) -> OpenOutcome {
        self.grid.cascade_loss();
        self.mark_started();
        self.ended_at = Some(Utc::now());
        self.history.record(&self.grid);
        OpenOutcome::Exploded
    }

    /// The clock starts at the first effective action.
    fn mark_started(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(Utc::now());
        }
    }

    /// Win scan with the once-per-game notification gate: the caller sees
    /// `Won` at most once, no matter how often the state is re-checked.
    fn check_win(&mut self) -> bool {
        if self.has_won {
            return false;
        }
        if self.grid.is_cleared() {
            self.has_won = true;
            self.ended_at = Some(Utc::now());
            log::debug!("board cleared");
            true
        } else {
            false
        }
    }
}
