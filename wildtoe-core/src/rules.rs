//! Rule variants and game configuration
//!
//! Two independent rule axes combine into four games: the placement
//! mode (who may place which mark) and the victory polarity (whether
//! completing a line wins or loses). Each axis carries its own strategy
//! methods so the engine and the selectors never branch on enum pairs.

use crate::board::Mark;
use serde::{Deserialize, Serialize};

/// Board-placement mode
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Each player is bound to one mark for the whole game
    Standard,
    /// Either mark may be placed on a player's turn
    Wild,
}

impl Mode {
    /// Marks a mover may legally place, mover's own mark first.
    /// The selectors scan candidates in exactly this order.
    pub fn candidate_marks(self, mover: Mark) -> Vec<Mark> {
        match self {
            Mode::Standard => vec![mover],
            Mode::Wild => vec![mover, mover.opponent()],
        }
    }
}

/// Victory polarity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Victory {
    /// Completing a line wins for its owner
    Standard,
    /// Completing a line loses: the completer's opponent is the winner
    Misere,
}

impl Victory {
    /// Winner label given the player label that completed the line
    pub fn winner_of(self, completer: Mark) -> Mark {
        match self {
            Victory::Standard => completer,
            Victory::Misere => completer.opponent(),
        }
    }
}

/// Opponent kind
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Opponent {
    Human,
    Computer,
}

/// Automated-opponent difficulty. Only consulted for the one rule
/// combination where greedy play is otherwise safe (see
/// [`GameConfig::uses_minimax`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AiLevel {
    Easy,
    Hard,
}

/// Immutable per-game rule configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub mode: Mode,
    pub victory: Victory,
    pub opponent: Opponent,
    #[serde(default)]
    pub level: Option<AiLevel>,
}

impl GameConfig {
    /// Whether the automated opponent escalates to the exhaustive
    /// search when the one-ply scan finds nothing forcing.
    ///
    /// Misere play and Wild play are unsafe for greedy heuristics, so
    /// they always search; plain Standard/Standard only searches on
    /// Hard. An irrelevant `level` is simply ignored.
    pub fn uses_minimax(&self) -> bool {
        (self.level == Some(AiLevel::Hard)
            && self.mode == Mode::Standard
            && self.victory == Victory::Standard)
            || (self.mode == Mode::Standard && self.victory == Victory::Misere)
            || self.mode == Mode::Wild
    }

    /// True when `mark` is the automated side's turn label.
    /// Cross is always player one (the human); Circle is the computer
    /// whenever the opponent is automated.
    pub fn is_computer(&self, mark: Mark) -> bool {
        self.opponent == Opponent::Computer && mark == Mark::Circle
    }
}
