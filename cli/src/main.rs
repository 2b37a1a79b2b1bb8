use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use mboard_core::{
    Cell, CellContent, CellState, FlagOutcome, GameOptions, GameSession, GameSettings, Grid,
    OpenOutcome, Pos,
};

#[derive(Parser, Debug)]
#[command(name = "mboard", about = "Minesweeper in the terminal", version)]
struct Args {
    /// Board width [1-50]
    #[arg(short = 'W', long, default_value_t = 15)]
    width: u8,
    /// Board height [1-50]
    #[arg(short = 'H', long, default_value_t = 15)]
    height: u8,
    /// Fraction of cells that are mines [0.0-1.0]
    #[arg(short, long, default_value_t = 0.25)]
    difficulty: f32,
    /// Start from a saved .mboard file, overriding the numeric settings
    #[arg(short, long)]
    board: Option<PathBuf>,
    /// Layout seed for reproducible games
    #[arg(long)]
    seed: Option<u64>,
    /// Disable the auto-open assist rule
    #[arg(long)]
    no_auto_open: bool,
    #[command(flatten)]
    verbosity: Verbosity<WarnLevel>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args.verbosity);

    let options = GameOptions {
        auto_open: !args.no_auto_open,
    };
    let settings = GameSettings::new(args.width, args.height, args.difficulty);

    let mut session = match &args.board {
        Some(path) => GameSession::from_board_file(path, options)
            .with_context(|| format!("cannot load board from {}", path.display()))?,
        None => match args.seed {
            Some(seed) => GameSession::with_seed(settings, options, seed)?,
            None => GameSession::new(settings, options)?,
        },
    };

    println!(
        "mboard {}x{}, {} mines. Type `help` for commands.",
        session.config().width,
        session.config().height,
        session.config().mines
    );

    let stdin = io::stdin();
    let mut input = String::new();
    loop {
        print_board(&session);
        print!("> ");
        io::stdout().flush()?;

        input.clear();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }
        let words: Vec<&str> = input.split_whitespace().collect();
        let Some(&command) = words.first() else {
            continue;
        };

        match command {
            "q" | "quit" | "exit" => break,
            "h" | "help" => print_help(),
            "o" | "open" => match parse_pos(&words) {
                Some(pos) => match session.open(pos) {
                    Ok(OpenOutcome::Exploded) => {
                        print_board(&session);
                        if !handle_loss(&mut session, settings, &stdin)? {
                            break;
                        }
                    }
                    Ok(OpenOutcome::Won) => println!("Winner!"),
                    Ok(OpenOutcome::NoChange) => println!("Nothing to open there."),
                    Ok(OpenOutcome::Opened) => {}
                    Err(err) => println!("{err}"),
                },
                None => println!("Usage: open ROW COL"),
            },
            "f" | "flag" => match parse_pos(&words) {
                Some(pos) => match session.toggle_flag(pos) {
                    Ok(FlagOutcome::Won) => println!("Winner!"),
                    Ok(FlagOutcome::NoChange) => println!("That cell cannot be flagged."),
                    Ok(_) => {}
                    Err(err) => println!("{err}"),
                },
                None => println!("Usage: flag ROW COL"),
            },
            "u" | "undo" => {
                if !session.undo() {
                    println!("Nothing to undo.");
                }
            }
            "retry" => {
                session.retry();
                print_hint(&session);
            }
            "new" => {
                if let Err(err) = session.new_game(settings) {
                    println!("{err}");
                }
            }
            "save" => match words.get(1) {
                Some(path) => match session.save_board(path) {
                    Ok(()) => println!("Saved to {path}."),
                    Err(err) => println!("{err}"),
                },
                None => println!("Usage: save PATH"),
            },
            "load" => match words.get(1) {
                Some(path) => {
                    if let Err(err) = session.load_board(path) {
                        println!("{err}");
                    }
                }
                None => println!("Usage: load PATH"),
            },
            "hint" => print_hint(&session),
            other => println!("Unknown command `{other}`. Type `help`."),
        }
    }

    Ok(())
}

fn init_logging(verbosity: &Verbosity<WarnLevel>) {
    use tracing_subscriber::filter::LevelFilter;
    let level = match verbosity.log_level_filter() {
        log::LevelFilter::Off => LevelFilter::OFF,
        log::LevelFilter::Error => LevelFilter::ERROR,
        log::LevelFilter::Warn => LevelFilter::WARN,
        log::LevelFilter::Info => LevelFilter::INFO,
        log::LevelFilter::Debug => LevelFilter::DEBUG,
        log::LevelFilter::Trace => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt().with_max_level(level).init();
}

fn parse_pos(words: &[&str]) -> Option<Pos> {
    let row = words.get(1)?.parse().ok()?;
    let col = words.get(2)?.parse().ok()?;
    Some((row, col))
}

/// Asks the three-way loss question. `false` means quit.
fn handle_loss(
    session: &mut GameSession,
    settings: GameSettings,
    stdin: &io::Stdin,
) -> anyhow::Result<bool> {
    println!("You stepped on a mine!");
    loop {
        print!("retry same board (r), new game (n), or cancel (c)? ");
        io::stdout().flush()?;

        let mut answer = String::new();
        if stdin.lock().read_line(&mut answer)? == 0 {
            return Ok(false);
        }
        match answer.trim() {
            "r" => {
                session.retry();
                print_hint(session);
                return Ok(true);
            }
            "n" => {
                if let Err(err) = session.new_game(settings) {
                    println!("{err}");
                }
                return Ok(true);
            }
            "c" => return Ok(true),
            _ => {}
        }
    }
}

fn print_hint(session: &GameSession) {
    match session.start_hint() {
        Some((row, col)) => println!("A good place to start: {row} {col}"),
        None => println!("No hint available yet."),
    }
}

fn print_board(session: &GameSession) {
    print!("{}", render(session.grid()));
    println!(
        "mines left: {}  elapsed: {}s",
        session.mines_left(),
        session.elapsed_secs()
    );
}

fn render(grid: &Grid) -> String {
    let mut out = String::from("   ");
    for col in 0..grid.width() {
        out.push_str(&format!("{}", col % 10));
    }
    out.push('\n');
    for row in 0..grid.height() {
        out.push_str(&format!("{row:>2} "));
        for col in 0..grid.width() {
            out.push(glyph(grid.cell((row, col))));
        }
        out.push('\n');
    }
    out
}

fn glyph(cell: Cell) -> char {
    match (cell.state, cell.content) {
        (CellState::Hidden, _) => '□',
        (CellState::Flagged, _) => '▶',
        (CellState::WronglyFlagged, _) => '✗',
        (CellState::Revealed, CellContent::Mine) => 'X',
        (CellState::Revealed, CellContent::Safe(0)) => '_',
        (CellState::Revealed, CellContent::Safe(n)) => char::from(b'0' + n),
    }
}

fn print_help() {
    println!("Commands:");
    println!("  o|open ROW COL   open a cell (the first open builds the board)");
    println!("  f|flag ROW COL   toggle a mine flag");
    println!("  u|undo           take back the last action");
    println!("  retry            replay the same board from the start");
    println!("  new              start a fresh board with the same settings");
    println!("  save PATH        write the board to a .mboard file");
    println!("  load PATH        replace the board from a .mboard file");
    println!("  hint             suggest a starting cell");
    println!("  q|quit           leave the game");
}
