//! WILDTOE Core - Game engine and AI
//!
//! This crate provides the core game logic for WILDTOE:
//! - 3x3 board geometry, marks, and the eight winning lines
//! - Rule variants: Standard/Wild placement, Standard/Misere victory
//! - Game state machine with per-cell callbacks and status messages
//! - Automated opponent (one-ply heuristic scan and exhaustive minimax)

pub mod ai;
pub mod board;
pub mod game;
pub mod rules;

// Re-exports for convenient access
pub use ai::select_move;
pub use board::{Board, Coord, Line, Mark, ParseError, BOARD_SIZE, CENTER, LINES};
pub use game::{Game, Status};
pub use rules::{AiLevel, GameConfig, Mode, Opponent, Victory};
