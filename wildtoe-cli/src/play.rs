//! Play command - interactive terminal game
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: resolve_config(), game_loop(), report_result()
//! - Level 3: input parsing and turn handling
//! - Level 4: rendering utilities

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use wildtoe_core::{
    AiLevel, Board, Coord, Game, GameConfig, Line, Mark, Mode, Opponent, Status, Victory,
    BOARD_SIZE,
};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct PlayArgs {
    /// Placement mode
    #[arg(long, value_enum, default_value_t = ModeArg::Standard)]
    pub mode: ModeArg,

    /// Victory polarity
    #[arg(long, value_enum, default_value_t = VictoryArg::Standard)]
    pub victory: VictoryArg,

    /// Opponent kind
    #[arg(long, value_enum, default_value_t = OpponentArg::Computer)]
    pub opponent: OpponentArg,

    /// Computer difficulty (only consulted for standard/standard games)
    #[arg(long, value_enum)]
    pub level: Option<LevelArg>,

    /// RNG seed for a reproducible game
    #[arg(long)]
    pub seed: Option<u64>,

    /// Game configuration JSON file (overrides the rule flags)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ModeArg {
    Standard,
    Wild,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum VictoryArg {
    Standard,
    Misere,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OpponentArg {
    Human,
    Computer,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LevelArg {
    Easy,
    Hard,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Standard => Mode::Standard,
            ModeArg::Wild => Mode::Wild,
        }
    }
}

impl From<VictoryArg> for Victory {
    fn from(arg: VictoryArg) -> Self {
        match arg {
            VictoryArg::Standard => Victory::Standard,
            VictoryArg::Misere => Victory::Misere,
        }
    }
}

impl From<OpponentArg> for Opponent {
    fn from(arg: OpponentArg) -> Self {
        match arg {
            OpponentArg::Human => Opponent::Human,
            OpponentArg::Computer => Opponent::Computer,
        }
    }
}

impl From<LevelArg> for AiLevel {
    fn from(arg: LevelArg) -> Self {
        match arg {
            LevelArg::Easy => AiLevel::Easy,
            LevelArg::Hard => AiLevel::Hard,
        }
    }
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
///
/// 1. Resolve the rule configuration (JSON file or flags)
/// 2. Set up the game and the computer-move announcers
/// 3. Drive the input loop until the game ends
/// 4. Report the final position
pub fn run(args: PlayArgs) -> Result<()> {
    let config = resolve_config(&args)?;
    tracing::info!(
        "Starting game: mode={:?}, victory={:?}, opponent={:?}, level={:?}",
        config.mode,
        config.victory,
        config.opponent,
        config.level
    );

    let mut game = Game::with_seed(config, args.seed);
    // the last registration doubles as the ready signal, so the
    // computer's opening move (if it starts) is announced too
    register_announcers(&mut game);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    game_loop(&mut game, &mut lines)?;

    report_result(&game);
    Ok(())
}

// ============================================================================
// LEVEL 2 - CONFIGURATION, LOOP, REPORT
// ============================================================================

fn resolve_config(args: &PlayArgs) -> Result<GameConfig> {
    if let Some(path) = &args.config {
        let file = File::open(path)
            .with_context(|| format!("opening config file {}", path.display()))?;
        let config: GameConfig = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parsing config file {}", path.display()))?;
        return Ok(config);
    }

    Ok(GameConfig {
        mode: args.mode.into(),
        victory: args.victory.into(),
        opponent: args.opponent.into(),
        level: args.level.map(Into::into),
    })
}

/// One-shot announcers for every cell, printed when the computer plays
fn register_announcers(game: &mut Game) {
    for coord in Board::coords() {
        game.register_cell_callback(coord, move || {
            println!("Computer plays ({}, {})", coord.row, coord.col);
        });
    }
}

fn game_loop<I>(game: &mut Game, lines: &mut I) -> Result<()>
where
    I: Iterator<Item = io::Result<String>>,
{
    let wild = game.config().mode == Mode::Wild;

    while game.status() == Status::InProgress {
        println!("\n{}", render_board(game.board(), None));
        println!("{}", game.message());
        prompt(wild)?;

        // EOF ends the session
        let Some(line) = lines.next() else {
            tracing::info!("Input closed, leaving the game");
            return Ok(());
        };
        let line = line.context("reading move input")?;

        match parse_input(&line) {
            Some((coord, pick)) => {
                if let Some(mark) = pick {
                    game.set_choice(mark);
                }
                if !game.play(coord) {
                    println!("Cell ({}, {}) is not available.", coord.row, coord.col);
                }
            }
            None => {
                if wild {
                    println!("Expected: row col [X|O]");
                } else {
                    println!("Expected: row col");
                }
            }
        }
    }
    Ok(())
}

fn report_result(game: &Game) {
    if game.status() == Status::InProgress {
        return;
    }
    println!("\n{}", render_board(game.board(), game.winning_line()));
    println!("{}", game.message());
}

// ============================================================================
// LEVEL 3 - INPUT
// ============================================================================

/// Parse a move line: `row col` with an optional Wild-mode mark,
/// e.g. `1 2` or `0 0 X`
fn parse_input(line: &str) -> Option<(Coord, Option<Mark>)> {
    let mut parts = line.split_whitespace();
    let row = parts.next()?.parse::<u8>().ok()?;
    let col = parts.next()?.parse::<u8>().ok()?;
    let pick = match parts.next() {
        Some(token) => Some(token.parse::<Mark>().ok()?),
        None => None,
    };
    if parts.next().is_some() {
        return None;
    }
    Some((Coord::new(row, col), pick))
}

fn prompt(wild: bool) -> Result<()> {
    if wild {
        print!("Your move (row col [X|O]): ");
    } else {
        print!("Your move (row col): ");
    }
    io::stdout().flush().context("flushing prompt")?;
    Ok(())
}

// ============================================================================
// LEVEL 4 - RENDERING
// ============================================================================

/// Terminal board with row/column headers; cells on a winning line are
/// bracketed
fn render_board(board: &Board, highlight: Option<Line>) -> String {
    let mut out = String::from("    0   1   2\n");
    for row in 0..BOARD_SIZE {
        out.push_str(&format!("{}  ", row));
        for col in 0..BOARD_SIZE {
            let coord = Coord::new(row, col);
            let cell = match board.get(coord) {
                Some(mark) => mark.as_char(),
                None => '.',
            };
            let lit = highlight.is_some_and(|line| line.contains(&coord));
            if lit {
                out.push_str(&format!("[{cell}]"));
            } else {
                out.push_str(&format!(" {cell} "));
            }
            if col + 1 < BOARD_SIZE {
                out.push('|');
            }
        }
        out.push('\n');
        if row + 1 < BOARD_SIZE {
            out.push_str("   ---+---+---\n");
        }
    }
    out
}

// ============================================================================
// TESTS
// ============================================================================
