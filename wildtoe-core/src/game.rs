//! Game engine: turn state machine, terminal detection, per-cell
//! callbacks, and the derived status message
//!
//! A [`Game`] owns the board, the turn label, the Wild-mode symbol
//! pick, and a seeded RNG for everything random (who starts, fallback
//! moves). The automated side moves inline: a human placement that
//! leaves the game open hands the turn to the selector before `play`
//! returns.

use crate::ai;
use crate::board::{Board, Coord, Line, Mark};
use crate::rules::{GameConfig, Mode, Victory};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a game instance. Terminal states are absorbing: no
/// mutation moves a game out of `Won` or `Drawn`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    InProgress,
    Won,
    Drawn,
}

/// Cell the constructor-time opening trigger is tied to: registering a
/// callback here doubles as the "all observers in place" signal.
const LAST_CELL: Coord = Coord::new(2, 2);

type CellCallback = Box<dyn FnOnce() + 'static>;

/// Build the game RNG, seeded for reproducibility or from entropy
fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

// ============================================================================
// GAME
// ============================================================================

pub struct Game {
    config: GameConfig,
    board: Board,
    /// Turn label. After a terminal placement it stays on the mover who
    /// completed the line (or filled the board); it never advances past
    /// the end of the game.
    current: Mark,
    /// Wild-mode active symbol; `None` outside Wild mode
    pick: Option<Mark>,
    status: Status,
    winner: Option<Mark>,
    rng: ChaCha8Rng,
    callbacks: [[Option<CellCallback>; 3]; 3],
}

impl Game {
    /// New game with an entropy-seeded RNG. The starting player is a
    /// coin flip; Cross is always player one.
    pub fn new(config: GameConfig) -> Self {
        Self::with_seed(config, None)
    }

    /// New game with an optional fixed RNG seed, for reproducible runs
    pub fn with_seed(config: GameConfig, seed: Option<u64>) -> Self {
        let mut rng = create_rng(seed);
        let current = if rng.gen_bool(0.5) {
            Mark::Cross
        } else {
            Mark::Circle
        };
        let pick = (config.mode == Mode::Wild).then_some(current);

        Self {
            config,
            board: Board::new(),
            current,
            pick,
            status: Status::InProgress,
            winner: None,
            rng,
            callbacks: [[None, None, None], [None, None, None], [None, None, None]],
        }
    }

    /// Resume from an arbitrary position with `to_move` on turn.
    ///
    /// If the board already holds a completed line, the previous mover
    /// is credited with the completion and the game starts terminal.
    pub fn from_position(config: GameConfig, board: Board, to_move: Mark, seed: Option<u64>) -> Self {
        let mut game = Self::with_seed(config, seed);
        game.board = board;
        game.current = to_move;
        game.pick = (config.mode == Mode::Wild).then_some(to_move);

        if board.winning_line().is_some() {
            game.current = to_move.opponent();
            game.status = Status::Won;
            game.winner = Some(config.victory.winner_of(game.current));
        } else if board.is_full() {
            game.status = Status::Drawn;
        }
        game
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Turn label of the player on move (the completer, once terminal)
    pub fn current_mark(&self) -> Mark {
        self.current
    }

    /// Mark the next placement would write: the Wild-mode pick when one
    /// is active, otherwise the turn label
    pub fn current_play(&self) -> Mark {
        match self.config.mode {
            Mode::Wild => self.pick.unwrap_or(self.current),
            Mode::Standard => self.current,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Winning player label, if the game has been won
    pub fn winner(&self) -> Option<Mark> {
        self.winner
    }

    /// First completed line in canonical scan order, for highlighting
    pub fn winning_line(&self) -> Option<Line> {
        self.board.winning_line()
    }

    pub fn is_full(&self) -> bool {
        self.board.is_full()
    }

    pub fn is_empty(&self) -> bool {
        self.board.is_empty()
    }

    /// Human-readable game status, derived from current state.
    ///
    /// Draws report `Draw!`; Misere wins name the winner with Misere
    /// phrasing; otherwise the message names whose turn it is (or who
    /// won), symbol-qualified in Standard mode where marks are bound to
    /// players, unqualified in Wild mode where they are not.
    pub fn message(&self) -> String {
        if self.status == Status::Drawn {
            return "Draw!".to_string();
        }

        if self.status == Status::Won && self.config.victory == Victory::Misere {
            let winner = self.current.opponent();
            let prefix = if self.config.is_computer(winner) {
                "Computer "
            } else {
                ""
            };
            let number = if winner == Mark::Circle { "two" } else { "one" };
            return format!("{prefix}Player {number} won the game in Misere mode!");
        }

        let prefix = if self.config.is_computer(self.current) {
            "Computer "
        } else {
            ""
        };
        let number = match (self.config.mode, self.current) {
            (Mode::Wild, Mark::Cross) => "one",
            (Mode::Wild, Mark::Circle) => "two",
            (Mode::Standard, Mark::Cross) => "one (cross)",
            (Mode::Standard, Mark::Circle) => "two (circle)",
        };
        let tail = if self.status == Status::Won {
            " won the game!"
        } else {
            " turn."
        };
        format!("{prefix}Player {number}{tail}")
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Override the active symbol for the upcoming placement. Only
    /// effective in Wild mode; the turn label is unaffected.
    pub fn set_choice(&mut self, mark: Mark) {
        if self.config.mode == Mode::Wild {
            self.pick = Some(mark);
        }
    }

    /// Place the active mark at `coord` for the player on turn.
    ///
    /// Returns false, leaving all state untouched, when the game is
    /// over or the cell is occupied or out of range. On success the
    /// turn passes to the opponent, and if that opponent is the
    /// computer its reply is played before this returns.
    pub fn play(&mut self, coord: Coord) -> bool {
        if self.status != Status::InProgress {
            return false;
        }
        if !self.commit(coord) {
            return false;
        }

        if self.status == Status::InProgress {
            self.current = self.current.opponent();
            if self.config.is_computer(self.current) {
                self.computer_turn();
            }
        }
        true
    }

    /// Register a one-shot callback fired when the computer plays
    /// `coord`. A cell keeps its first callback; later registrations
    /// on the same cell are ignored until it fires.
    ///
    /// Registering on the last cell (2,2) signals that all observers
    /// are in place, as [`observers_ready`](Self::observers_ready).
    pub fn register_cell_callback<F>(&mut self, coord: Coord, callback: F)
    where
        F: FnOnce() + 'static,
    {
        if !coord.is_valid() {
            return;
        }
        let slot = &mut self.callbacks[coord.row as usize][coord.col as usize];
        if slot.is_none() {
            *slot = Some(Box::new(callback));
            if coord == LAST_CELL {
                self.observers_ready();
            }
        }
    }

    /// Signal that every observer is registered. If the computer holds
    /// the opening move it plays it now; otherwise (human to start, or
    /// a game already under way) this does nothing.
    pub fn observers_ready(&mut self) {
        if self.status == Status::InProgress
            && self.board.is_empty()
            && self.config.is_computer(self.current)
        {
            self.set_choice(Mark::Circle);
            self.computer_turn();
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Write the active mark and settle terminal state. The winner
    /// label is derived from the turn label through the victory
    /// polarity, not from the mark on the completed line.
    fn commit(&mut self, coord: Coord) -> bool {
        let mark = self.current_play();
        if !self.board.place(coord, mark) {
            return false;
        }

        if self.board.winning_line().is_some() {
            self.status = Status::Won;
            self.winner = Some(self.config.victory.winner_of(self.current));
        } else if self.board.is_full() {
            self.status = Status::Drawn;
        }
        true
    }

    /// Let the selector move for the side on turn, fire the cell's
    /// callback, and hand the turn back
    fn computer_turn(&mut self) {
        let active = self.current_play();
        let (coord, pick) = ai::select_move(&self.board, self.current, active, &self.config, &mut self.rng);

        if self.config.mode == Mode::Wild && pick != self.current_play() {
            self.set_choice(pick);
        }

        if self.commit(coord) {
            self.fire_callback(coord);
            if self.status == Status::InProgress {
                self.current = self.current.opponent();
            }
        }
    }

    fn fire_callback(&mut self, coord: Coord) {
        if let Some(callback) = self.callbacks[coord.row as usize][coord.col as usize].take() {
            callback();
        }
    }
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("config", &self.config)
            .field("board", &self.board)
            .field("current", &self.current)
            .field("pick", &self.pick)
            .field("status", &self.status)
            .field("winner", &self.winner)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// TESTS
// ============================================================================
