//! Automated opponent: rule-based one-ply scan and exhaustive minimax
//!
//! The selectors never touch the live game. They work on a scratch copy
//! of the board with a strict place/evaluate/undo discipline, and
//! return the chosen cell together with the mark to write there (the
//! mark only matters in Wild mode, where a mover may place either one).

use crate::board::{Board, Coord, Mark, CENTER};
use crate::rules::{GameConfig, Mode, Victory};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

// ============================================================================
// ENTRY POINT
// ============================================================================

/// Pick the automated side's move.
///
/// `mover` is the turn label; `active` is the mark the next placement
/// would write (they differ only in Wild mode, where the pick overrides
/// the turn label). Never called on a terminal or full board; if it is,
/// the random fallback keeps it total.
pub fn select_move(
    board: &Board,
    mover: Mark,
    active: Mark,
    config: &GameConfig,
    rng: &mut ChaCha8Rng,
) -> (Coord, Mark) {
    if let Some(chosen) = heuristic_move(board, mover, config) {
        return chosen;
    }

    if config.uses_minimax() {
        minimax_move(board, mover, config, rng)
    } else {
        (random_move(board, rng), active)
    }
}

// ============================================================================
// HEURISTIC SELECTOR (one-ply lookahead)
// ============================================================================

/// Scan every empty cell with every legal candidate mark: take the
/// first direct win, else remember the first block. Misere play never
/// wants a completion or a block, so the scan stands aside and lets the
/// search decide.
fn heuristic_move(board: &Board, mover: Mark, config: &GameConfig) -> Option<(Coord, Mark)> {
    if config.victory != Victory::Standard {
        return None;
    }

    let mut scratch = *board;
    let mut block: Option<(Coord, Mark)> = None;

    for coord in Board::coords() {
        if scratch.get(coord).is_some() {
            continue;
        }
        for pick in config.mode.candidate_marks(mover) {
            if completes_line(&mut scratch, coord, pick) {
                return Some((coord, pick));
            }
            if block.is_none() && completes_line(&mut scratch, coord, pick.opponent()) {
                block = Some((coord, pick));
            }
        }
    }

    block
}

// ============================================================================
// MINIMAX SELECTOR (exhaustive search)
// ============================================================================

/// Full-tree search over a scratch board.
///
/// Top level tries every legal (cell, mark) candidate and recurses with
/// standard alternation; inside the recursion each side places its own
/// fixed mark even in Wild mode, with the give-away check compensating
/// for the marks the recursion does not try.
fn minimax_move(
    board: &Board,
    mover: Mark,
    config: &GameConfig,
    rng: &mut ChaCha8Rng,
) -> (Coord, Mark) {
    // Empty board: the recursion is pointless, the center is optimal
    if board.is_empty() {
        return (CENTER, mover);
    }

    let victory = config.victory;
    let mut scratch = *board;

    let candidates = legal_candidates(&scratch, mover, config);

    // Misere guard: never volunteer to complete a line, unless every
    // legal placement completes one
    let filter_completions = victory == Victory::Misere
        && candidates
            .iter()
            .any(|&(coord, pick)| !completes_line(&mut scratch, coord, pick));

    let mut best = i32::MIN;
    let mut ties: Vec<(Coord, Mark)> = Vec::new();

    for (coord, pick) in candidates {
        if filter_completions && completes_line(&mut scratch, coord, pick) {
            continue;
        }

        scratch.set(coord, pick);
        let mut score = minimax(&mut scratch, 1, false, mover, victory);
        scratch.clear(coord);

        if score < best {
            continue;
        }
        match (config.mode, victory) {
            // a candidate that hands the opponent an immediate
            // completion is excluded outright...
            (Mode::Wild, Victory::Standard) => {
                if gives_away_victory(&mut scratch, coord, pick, mover) {
                    continue;
                }
            }
            // ...or rewarded, when completions defeat their owner
            (Mode::Wild, Victory::Misere) => {
                if gives_away_victory(&mut scratch, coord, pick, mover) {
                    score += 1;
                }
            }
            (Mode::Standard, _) => {}
        }

        if score > best {
            best = score;
            ties.clear();
        }
        ties.push((coord, pick));
    }

    let chosen = match victory {
        Victory::Standard => ties.last().copied(),
        Victory::Misere => misere_tie_break(&mut scratch, &ties, mover),
    };

    chosen.unwrap_or_else(|| (random_move(board, rng), mover))
}

/// Score a position for `mover`, higher is better. Terminal completions
/// score +-(10 - depth): positive for the side the polarity favors, so
/// nearer outcomes dominate and Misere flips the reward.
fn minimax(board: &mut Board, depth: i32, maximizing: bool, mover: Mark, victory: Victory) -> i32 {
    if board.winning_line().is_some() {
        // the side that did NOT just move is to play here
        return match (victory, maximizing) {
            (Victory::Standard, true) => depth - 10,
            (Victory::Standard, false) => 10 - depth,
            (Victory::Misere, true) => 10 - depth,
            (Victory::Misere, false) => depth - 10,
        };
    }
    if board.is_full() {
        return 0;
    }

    let mark = if maximizing { mover } else { mover.opponent() };
    let mut best = if maximizing { i32::MIN } else { i32::MAX };

    for coord in Board::coords() {
        if board.get(coord).is_some() {
            continue;
        }
        board.set(coord, mark);
        let score = minimax(board, depth + 1, !maximizing, mover, victory);
        board.clear(coord);
        best = if maximizing {
            best.max(score)
        } else {
            best.min(score)
        };
    }

    best
}

/// All (cell, mark) pairs the mover may legally place, in scan order:
/// cells row-major, the mover's own mark before the opponent's.
fn legal_candidates(board: &Board, mover: Mark, config: &GameConfig) -> Vec<(Coord, Mark)> {
    let mut candidates = Vec::new();
    for coord in Board::coords() {
        if board.get(coord).is_some() {
            continue;
        }
        for pick in config.mode.candidate_marks(mover) {
            candidates.push((coord, pick));
        }
    }
    candidates
}

/// Would placing `mark` at `coord` complete a line?
fn completes_line(scratch: &mut Board, coord: Coord, mark: Mark) -> bool {
    scratch.set(coord, mark);
    let completes = scratch.winning_line().is_some();
    scratch.clear(coord);
    completes
}

/// Wild-mode lookahead: after placing `pick` at `coord`, can the next
/// mover complete a line with either mark on their very next turn?
fn gives_away_victory(scratch: &mut Board, coord: Coord, pick: Mark, mover: Mark) -> bool {
    scratch.set(coord, pick);
    let mut gives = false;

    'cells: for reply in Board::coords() {
        if scratch.get(reply).is_some() {
            continue;
        }
        for mark in [mover, mover.opponent()] {
            if completes_line(scratch, reply, mark) {
                gives = true;
                break 'cells;
            }
        }
    }

    scratch.clear(coord);
    gives
}

/// Among tied moves, prefer one that does not sit on a cell the
/// opponent needs for a completion: occupying it would block the streak
/// we want the opponent forced into. Falls back to the last tied move
/// when every tie blocks.
fn misere_tie_break(
    scratch: &mut Board,
    ties: &[(Coord, Mark)],
    mover: Mark,
) -> Option<(Coord, Mark)> {
    for &(coord, pick) in ties {
        if !completes_line(scratch, coord, mover.opponent()) {
            return Some((coord, pick));
        }
    }
    ties.last().copied()
}

// ============================================================================
// RANDOM FALLBACK
// ============================================================================

/// Uniformly random empty cell
fn random_move(board: &Board, rng: &mut ChaCha8Rng) -> Coord {
    let empties = board.empty_cells();
    if empties.is_empty() {
        return CENTER;
    }
    empties[rng.gen_range(0..empties.len())]
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{AiLevel, Opponent};
    use rand::SeedableRng;

    fn config(mode: Mode, victory: Victory, level: Option<AiLevel>) -> GameConfig {
        GameConfig {
            mode,
            victory,
            opponent: Opponent::Computer,
            level,
        }
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    fn select(board: &str, cfg: GameConfig) -> (Coord, Mark) {
        let board: Board = board.parse().unwrap();
        select_move(&board, Mark::Circle, Mark::Circle, &cfg, &mut rng())
    }

    #[test]
    fn test_takes_immediate_win() {
        // row 1 is O O _ with (1,2) open
        let cfg = config(Mode::Standard, Victory::Standard, None);
        let (coord, mark) = select(".X. OO. .X.", cfg);
        assert_eq!((coord, mark), (Coord::new(1, 2), Mark::Circle));

        // same position, every difficulty and the wild variant agree
        let hard = config(Mode::Standard, Victory::Standard, Some(AiLevel::Hard));
        assert_eq!(select(".X. OO. .X.", hard).0, Coord::new(1, 2));
        let wild = config(Mode::Wild, Victory::Standard, None);
        assert_eq!(select(".X. OO. .X.", wild).0, Coord::new(1, 2));
    }

    #[test]
    fn test_blocks_opponent_win() {
        // column 0 is X X _ for the human; O must take (2,0)
        let cfg = config(Mode::Standard, Victory::Standard, None);
        let (coord, mark) = select("X.O XO. ...", cfg);
        assert_eq!((coord, mark), (Coord::new(2, 0), Mark::Circle));
    }

    #[test]
    fn test_win_preferred_over_block() {
        // O can win on row 2 even though X threatens row 0
        let cfg = config(Mode::Standard, Victory::Standard, None);
        let (coord, _) = select("XX. ... OO.", cfg);
        assert_eq!(coord, Coord::new(2, 2));
    }

    #[test]
    fn test_opening_move_is_center() {
        let cfg = config(Mode::Standard, Victory::Standard, Some(AiLevel::Hard));
        let board = Board::new();
        let (coord, mark) = select_move(&board, Mark::Circle, Mark::Circle, &cfg, &mut rng());
        assert_eq!((coord, mark), (CENTER, Mark::Circle));

        // the shortcut holds for every searching combination
        for cfg in [
            config(Mode::Standard, Victory::Misere, None),
            config(Mode::Wild, Victory::Standard, None),
            config(Mode::Wild, Victory::Misere, None),
        ] {
            let (coord, _) = select_move(&board, Mark::Circle, Mark::Circle, &cfg, &mut rng());
            assert_eq!(coord, CENTER);
        }
    }

    #[test]
    fn test_easy_fallback_is_seeded_random() {
        // no win, no block: Easy Standard/Standard falls back to a
        // random empty cell drawn from the injected stream
        let cfg = config(Mode::Standard, Victory::Standard, Some(AiLevel::Easy));
        let board: Board = "X.. .O. ...".parse().unwrap();

        let a = select_move(&board, Mark::Circle, Mark::Circle, &cfg, &mut rng());
        let b = select_move(&board, Mark::Circle, Mark::Circle, &cfg, &mut rng());
        assert_eq!(a, b);
        assert_eq!(board.get(a.0), None);
    }

    #[test]
    fn test_misere_never_completes_a_line() {
        let cfg = config(Mode::Standard, Victory::Misere, None);

        // (0,2) finishes row 0 and (1,1) the corner diagonal; only
        // (1,2) is safe for O
        let (coord, mark) = select("OO. X.. XXO", cfg);
        assert_eq!((coord, mark), (Coord::new(1, 2), Mark::Circle));

        // (0,2) completes the anti diagonal for O; (2,2) is the only
        // safe cell left
        let (coord, _) = select("XX. OOX OX.", cfg);
        assert_eq!(coord, Coord::new(2, 2));

        // (0,2) completes row 0 for O
        let (coord, _) = select("OO. XX. OXX", cfg);
        assert_ne!(coord, Coord::new(0, 2));

        // (1,1) would complete the diagonal through three corners
        let (coord, _) = select("X.O ... O.X", cfg);
        assert_ne!(coord, Coord::new(1, 1));

        // (0,2) completes the anti diagonal
        let (coord, _) = select("XX. .O. O..", cfg);
        assert_ne!(coord, Coord::new(0, 2));
    }

    #[test]
    fn test_misere_completes_only_when_forced() {
        // every empty cell completes a line for O: the guard must not
        // leave the selector without a move
        let cfg = config(Mode::Standard, Victory::Misere, None);
        let board: Board = "OXO XOX .X.".parse().unwrap();
        let (coord, _) = select_move(&board, Mark::Circle, Mark::Circle, &cfg, &mut rng());
        assert!(board.get(coord).is_none());
    }

    #[test]
    fn test_misere_does_not_block_opponent_streak() {
        let cfg = config(Mode::Standard, Victory::Misere, None);

        // X threatens row 0 at (0,2) and O would die on (2,1); the
        // selector must neither block the streak nor complete its own
        let (coord, _) = select("XX. ... O.O", cfg);
        assert_ne!(coord, Coord::new(0, 2));
        assert_ne!(coord, Coord::new(2, 1));

        // X threatens row 0; O must leave the streak open
        let (coord, _) = select("XX. ... OOX", cfg);
        assert_ne!(coord, Coord::new(0, 2));

        // X threatens row 2 at (2,2)
        let (coord, _) = select("OOX ... XX.", cfg);
        assert_ne!(coord, Coord::new(2, 2));

        // X threatens column 2 at (0,2)
        let (coord, _) = select("X.. O.X O.X", cfg);
        assert_ne!(coord, Coord::new(0, 2));
    }

    #[test]
    fn test_misere_blocks_when_forced() {
        // (0,2) blocks X's column 2 threat, and nothing else is
        // survivable: (1,1) would complete column 1 for O
        let cfg = config(Mode::Standard, Victory::Misere, None);
        let (coord, _) = select("XO. X.X OOX", cfg);
        assert_eq!(coord, Coord::new(0, 2));
        assert_ne!(coord, Coord::new(1, 1));
    }

    #[test]
    fn test_wild_does_not_give_away_victory() {
        let cfg = config(Mode::Wild, Victory::Standard, None);

        // either mark on (0,2) or (1,1), O on (0,1), or X on (1,2)
        // would hand the next mover a completion
        let (coord, mark) = select("O.. X.. XOX", cfg);
        assert!(!(coord == Coord::new(0, 1) && mark == Mark::Circle));
        assert_ne!(coord, Coord::new(0, 2));
        assert_ne!(coord, Coord::new(1, 1));
        assert!(!(coord == Coord::new(1, 2) && mark == Mark::Cross));

        // same shape mirrored into the bottom-right corner
        let (coord, mark) = select("..X ..O OXX", cfg);
        assert!(!(coord == Coord::new(1, 0) && mark == Mark::Circle));
        assert_ne!(coord, Coord::new(0, 0));
        assert_ne!(coord, Coord::new(1, 1));
        assert!(!(coord == Coord::new(0, 1) && mark == Mark::Cross));

        // X on (2,1) would open column 1 for the opponent
        let (coord, mark) = select(".X. O.. X.O", cfg);
        assert!(!(coord == Coord::new(2, 1) && mark == Mark::Cross));
    }

    #[test]
    fn test_wild_misere_avoids_completions() {
        let cfg = config(Mode::Wild, Victory::Misere, None);

        // O on (0,2) completes the anti diagonal; O on the safe (2,2)
        // keeps every line open
        let (coord, mark) = select("XX. OOX OX.", cfg);
        assert_eq!((coord, mark), (Coord::new(2, 2), Mark::Circle));

        // (1,1) completes the corner diagonal for O
        let (coord, mark) = select("X.O ... O.X", cfg);
        assert!(!(coord == Coord::new(1, 1) && mark == Mark::Circle));

        // (0,2) completes the anti diagonal for O
        let (coord, mark) = select("XX. .O. O..", cfg);
        assert!(!(coord == Coord::new(0, 2) && mark == Mark::Circle));

        // forced block: only O on (0,2) avoids completing a line while
        // X threatens column 2
        let (coord, mark) = select("XO. X.X OOX", cfg);
        assert_eq!((coord, mark), (Coord::new(0, 2), Mark::Circle));
    }

    #[test]
    fn test_search_restores_scratch_state() {
        // the selectors must leave the caller's board untouched
        let board: Board = "XX. OO. ...".parse().unwrap();
        let before = board;
        for cfg in [
            config(Mode::Standard, Victory::Standard, Some(AiLevel::Hard)),
            config(Mode::Standard, Victory::Misere, None),
            config(Mode::Wild, Victory::Standard, None),
            config(Mode::Wild, Victory::Misere, None),
        ] {
            let _ = select_move(&board, Mark::Circle, Mark::Circle, &cfg, &mut rng());
            assert_eq!(board, before);
        }
    }
}
