//! Plain-text renderings of boards, moves, and solver output.

use crate::engine::{Board, Move};
use crate::grouping::Step;
use std::fmt::Write;

/// Formats a move with coordinates and tile values, e.g.
/// `(0,3)=7 <-> (1,3)=3`. Positions that do not hold a digit on the given
/// board render as `?`.
pub fn format_move(board: &Board, mv: Move) -> String {
    let (row_a, col_a) = Board::row_col(mv.a);
    let (row_b, col_b) = Board::row_col(mv.b);
    let value = |index: usize| {
        board
            .cells()
            .get(index)
            .and_then(|c| c.digit())
            .map_or_else(|| "?".to_string(), |d| d.to_string())
    };
    format!(
        "({row_a},{col_a})={} <-> ({row_b},{col_b})={}",
        value(mv.a),
        value(mv.b)
    )
}

/// Renders a numbered move sequence and the board left afterwards. Stops
/// with a note if a move cannot be applied.
pub fn format_sequence(start: &Board, moves: &[Move]) -> String {
    let mut out = String::new();
    let mut board = start.clone();
    for (step, &mv) in moves.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", step + 1, format_move(&board, mv));
        board = match board.apply(mv) {
            Ok(next) => next,
            Err(err) => {
                let _ = writeln!(out, "  (sequence stops: {err})");
                return out;
            }
        };
    }
    if board.is_empty() {
        out.push_str("  Board cleared!\n");
    } else {
        out.push_str("  Board after these moves:\n");
        for line in board.to_string().lines() {
            let _ = writeln!(out, "    {line}");
        }
    }
    out
}

/// Renders grouped display steps as a playable script: a header per step,
/// the moves shown together, then the board they are played on.
pub fn format_steps(steps: &[Step]) -> String {
    let mut out = String::new();
    for (n, step) in steps.iter().enumerate() {
        let plural = if step.moves.len() == 1 { "" } else { "s" };
        let removal = if step.row_removal.is_some() {
            " (removes row)"
        } else {
            ""
        };
        let _ = writeln!(out, "Step {}: {} move{plural}{removal}", n + 1, step.moves.len());
        for &mv in &step.moves {
            let _ = writeln!(out, "  {}", format_move(&step.board, mv));
        }
        for line in step.board.to_string().lines() {
            let _ = writeln!(out, "    {line}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping::group_for_display;

    #[test]
    fn format_move_shows_coordinates_and_values() {
        let b = Board::parse("91\n.5").unwrap();
        assert_eq!(format_move(&b, Move::new(0, 1)), "(0,0)=9 <-> (0,1)=1");
        assert_eq!(format_move(&b, Move::new(0, 10)), "(0,0)=9 <-> (1,1)=5");
    }

    #[test]
    fn format_sequence_walks_the_moves() {
        let b = Board::parse("91").unwrap();
        let out = format_sequence(&b, &[Move::new(0, 1)]);
        assert!(out.contains("1. (0,0)=9 <-> (0,1)=1"));
        assert!(out.contains("Board cleared!"));
    }

    #[test]
    fn format_sequence_reports_inapplicable_moves() {
        let b = Board::parse("91").unwrap();
        let out = format_sequence(&b, &[Move::new(0, 5)]);
        assert!(out.contains("sequence stops"));
    }

    #[test]
    fn format_steps_labels_row_removals() {
        let b = Board::parse("1955").unwrap();
        let steps = group_for_display(&b, &[Move::new(2, 3), Move::new(0, 1)]);
        let out = format_steps(&steps);
        assert!(out.starts_with("Step 1: 2 moves (removes row)"));
        assert!(out.contains("(0,2)=5 <-> (0,3)=5"));
    }
}
