//! Turns a flat solver move sequence into display steps.
//!
//! Raw solver output plays one pair at a time, which is tedious to follow
//! on a real board. This module rebuilds the sequence as a short list of
//! steps, each showing several mutually independent moves against one
//! board. Row removals renumber every later position, so they form hard
//! boundaries: the sequence is first cut into runs ending at each
//! row-removing move, then each run is split into rounds of moves that
//! are all legal on the round's board. The closing row-removal move joins
//! the last round only when it is legal there and no diagonal move in the
//! round spans the rows about to disappear; otherwise it stands alone.

use crate::engine::{Board, Move, ROW_WIDTH};

/// One display step: moves shown together against a single board.
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    /// Board the step's moves are played against.
    pub board: Board,
    /// Moves shown simultaneously; each is legal on `board`.
    pub moves: Vec<Move>,
    /// Index into `moves` of the move that triggers a row removal, if any.
    pub row_removal: Option<usize>,
}

/// Rows emptied by playing `mv` on `board`, as row indices of `board`
/// before compaction. Only the rows holding the move's endpoints can die.
fn rows_removed_by(board: &Board, mv: Move) -> Vec<usize> {
    let mut rows = vec![mv.a / ROW_WIDTH, mv.b / ROW_WIDTH];
    rows.dedup();
    rows.retain(|&r| {
        board.cells()[r * ROW_WIDTH..(r + 1) * ROW_WIDTH]
            .iter()
            .enumerate()
            .all(|(c, cell)| {
                let index = r * ROW_WIDTH + c;
                index == mv.a || index == mv.b || !cell.is_active()
            })
    });
    rows
}

/// Whether any diagonal move in `moves` has its endpoints on strictly
/// opposite sides of one of `rows`.
fn diagonal_crosses(moves: &[Move], rows: &[usize]) -> bool {
    moves.iter().filter(|m| m.is_diagonal()).any(|m| {
        let top = m.a / ROW_WIDTH;
        let bottom = m.b / ROW_WIDTH;
        rows.iter().any(|&r| top < r && r < bottom)
    })
}

/// A run of moves between two row removals, with the removal that ends it.
struct MacroGroup {
    board: Board,
    moves: Vec<Move>,
    closing: Option<(Move, Vec<usize>)>,
}

/// Groups `moves`, as played from `start`, into display steps.
///
/// Every step's moves are legal against that step's board, and the steps
/// concatenated hold exactly the input moves: rounds may pull a move
/// ahead of an input-order predecessor that is not yet legal, but nothing
/// is dropped or duplicated.
pub fn group_for_display(start: &Board, moves: &[Move]) -> Vec<Step> {
    let mut groups: Vec<MacroGroup> = Vec::new();
    let mut group_board = start.clone();
    let mut group_moves: Vec<Move> = Vec::new();
    let mut board = start.clone();
    for &mv in moves {
        let removed = rows_removed_by(&board, mv);
        board = board.apply_known(mv);
        if removed.is_empty() {
            group_moves.push(mv);
        } else {
            groups.push(MacroGroup {
                board: std::mem::replace(&mut group_board, board.clone()),
                moves: std::mem::take(&mut group_moves),
                closing: Some((mv, removed)),
            });
        }
    }
    if !group_moves.is_empty() {
        groups.push(MacroGroup {
            board: group_board,
            moves: group_moves,
            closing: None,
        });
    }

    let mut steps = Vec::new();
    for group in groups {
        let mut current = group.board;
        let mut remaining = group.moves;
        let first_step = steps.len();
        while !remaining.is_empty() {
            let mut ready = Vec::new();
            let mut deferred = Vec::new();
            for mv in remaining {
                if current.is_move_legal(mv) {
                    ready.push(mv);
                } else {
                    deferred.push(mv);
                }
            }
            if ready.is_empty() {
                // A well-formed sequence always has a playable move left;
                // admit the first one anyway so nothing is lost, and let
                // debug builds flag the malformed input.
                let mv = deferred.remove(0);
                debug_assert!(
                    current.is_move_legal(mv),
                    "deferred move {mv} is not legal on its step board"
                );
                ready.push(mv);
            }
            let step_board = current.clone();
            for &mv in &ready {
                current = current.apply_known(mv);
            }
            steps.push(Step {
                board: step_board,
                moves: ready,
                row_removal: None,
            });
            remaining = deferred;
        }
        if let Some((closing, removed)) = group.closing {
            let can_merge = match steps.last() {
                Some(last) if steps.len() > first_step => {
                    last.board.is_move_legal(closing) && !diagonal_crosses(&last.moves, &removed)
                }
                _ => false,
            };
            if can_merge {
                if let Some(last) = steps.last_mut() {
                    last.moves.push(closing);
                    last.row_removal = Some(last.moves.len() - 1);
                }
            } else {
                steps.push(Step {
                    board: current,
                    moves: vec![closing],
                    row_removal: Some(0),
                });
            }
        }
    }
    steps
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(text: &str) -> Board {
        Board::parse(text).unwrap()
    }

    /// Grouped steps must keep every move exactly once, stay legal on
    /// their step boards, and replay to the same end state.
    fn check_steps(start: &Board, moves: &[Move]) {
        let steps = group_for_display(start, moves);
        let mut collected: Vec<Move> = steps.iter().flat_map(|s| s.moves.iter().copied()).collect();
        let mut expected = moves.to_vec();
        collected.sort();
        expected.sort();
        assert_eq!(collected, expected, "steps must keep every move exactly once");

        let mut replay = start.clone();
        for step in &steps {
            assert_eq!(step.board, replay, "each step starts from the replayed board");
            for &mv in &step.moves {
                assert!(
                    step.board.is_move_legal(mv),
                    "step move {mv} must be legal on the step board"
                );
                replay = replay.apply(mv).unwrap();
            }
        }
    }

    #[test]
    fn no_moves_produce_no_steps() {
        assert!(group_for_display(&board("123456789"), &[]).is_empty());
    }

    #[test]
    fn independent_moves_share_a_step() {
        let b = board("91553");
        let moves = [Move::new(0, 1), Move::new(2, 3)];
        let steps = group_for_display(&b, &moves);
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].moves, moves.to_vec());
        assert_eq!(steps[0].row_removal, None);
        check_steps(&b, &moves);
    }

    #[test]
    fn dependent_moves_defer_to_a_later_step() {
        // 9 and 1 only see each other once the 5s between them are gone.
        let b = board("95513");
        let moves = [Move::new(1, 2), Move::new(0, 3)];
        let steps = group_for_display(&b, &moves);
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].moves, vec![Move::new(1, 2)]);
        assert_eq!(steps[1].moves, vec![Move::new(0, 3)]);
        assert_eq!(steps[1].board, b.apply(Move::new(1, 2)).unwrap());
        check_steps(&b, &moves);
    }

    #[test]
    fn removal_move_merges_into_the_preceding_step() {
        let b = board("1955");
        let moves = [Move::new(2, 3), Move::new(0, 1)];
        let steps = group_for_display(&b, &moves);
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].moves, moves.to_vec());
        assert_eq!(steps[0].row_removal, Some(1));
        check_steps(&b, &moves);
    }

    #[test]
    fn removal_move_stays_alone_when_not_legal_up_front() {
        // 5-5 opens only after 1-9 clears; it cannot join their step.
        let b = board("5195");
        let moves = [Move::new(1, 2), Move::new(0, 3)];
        let steps = group_for_display(&b, &moves);
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[1].moves, vec![Move::new(0, 3)]);
        assert_eq!(steps[1].row_removal, Some(0));
        check_steps(&b, &moves);
    }

    #[test]
    fn diagonal_across_a_dying_row_blocks_the_merge() {
        let b = board("3.......2\n...19\n..7.....4");
        let moves = [Move::new(0, 20), Move::new(12, 13)];
        let steps = group_for_display(&b, &moves);
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].moves, vec![Move::new(0, 20)]);
        assert_eq!(steps[1].moves, vec![Move::new(12, 13)]);
        assert_eq!(steps[1].row_removal, Some(0));
        check_steps(&b, &moves);
    }

    #[test]
    fn a_lone_removal_move_gets_its_own_step() {
        let b = board("91\n55");
        let moves = [Move::new(0, 1), Move::new(0, 1)];
        // Both rows die one after the other; each removal is its own step.
        let steps = group_for_display(&b, &moves);
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].row_removal, Some(0));
        assert_eq!(steps[1].row_removal, Some(0));
        assert_eq!(steps[1].board, board("55"));
    }

    #[test]
    #[should_panic(expected = "not legal")]
    fn an_illegal_sequence_trips_the_fallback_assertion() {
        let b = board("154");
        let _ = group_for_display(&b, &[Move::new(0, 2)]);
    }

    #[test]
    fn grouped_solver_output_replays_cleanly() {
        let b = board("1955\n5915");
        let report = crate::solver::solve(&b, 3);
        let best = report.best().unwrap();
        check_steps(&b, &best.moves);
    }
}
