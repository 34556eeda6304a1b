//! Multi-phase orchestration: solve, deal more tiles, solve again.
//!
//! A phase is one full search over a board. When the best result of a
//! phase leaves tiles behind, each surviving candidate board is extended
//! with a fresh copy of its remaining tiles and searched again; the
//! terminal lineages from every candidate are merged into one list ranked
//! by (remaining tiles, total moves) and trimmed back to the configured
//! width. The plan stops as soon as a full clear appears, when a phase
//! produces nothing, or, from the third phase on, when the best remaining
//! count stops improving.

use crate::engine::{Board, Move};
use crate::solver::{solve_with, SearchConfig, SearchResult, SolveReport};
use log::info;

/// One search invocation inside the plan: its kept results and state
/// counts, tagged with the phase it belongs to.
#[derive(Clone, Debug, PartialEq)]
pub struct PhaseRecord {
    /// 1-based phase the search belongs to.
    pub phase: usize,
    /// The results the search kept, ranked best first.
    pub results: Vec<SearchResult>,
    /// States the search entered for the first time.
    pub states_explored: u64,
    /// States the search reached again through another move order.
    pub states_skipped: u64,
}

impl PhaseRecord {
    /// Fewest remaining tiles among the kept results.
    pub fn best_remaining(&self) -> Option<usize> {
        self.results.first().map(|r| r.remaining)
    }
}

/// The best lineage seen anywhere in the plan.
#[derive(Clone, Debug, PartialEq)]
pub struct BestSolution {
    /// Board at the start of each phase; the first entry is the initial
    /// board, later entries are the extended boards.
    pub phase_boards: Vec<Board>,
    /// Move sequence played in each phase.
    pub phase_moves: Vec<Vec<Move>>,
    /// Terminal board after the last phase.
    pub final_board: Board,
    /// Active tiles left on the terminal board.
    pub remaining: usize,
}

impl BestSolution {
    /// Moves played across all phases.
    pub fn total_moves(&self) -> usize {
        self.phase_moves.iter().map(Vec::len).sum()
    }
}

/// Plan settings.
#[derive(Clone, Debug)]
pub struct PlanConfig {
    /// Deals allowed in total, counting the initial one.
    pub max_phases: usize,
    /// Search settings shared by every phase.
    pub search: SearchConfig,
}

impl Default for PlanConfig {
    /// Six deals: the game lets the player add tiles five times.
    fn default() -> Self {
        PlanConfig {
            max_phases: 6,
            search: SearchConfig::default(),
        }
    }
}

/// Everything the plan returns.
#[derive(Clone, Debug, PartialEq)]
pub struct PlanReport {
    /// Best lineage across all phases, if phase 1 produced any result.
    pub best: Option<BestSolution>,
    /// One record per search invocation, tagged with its phase.
    pub phases: Vec<PhaseRecord>,
    /// States explored, summed over every search.
    pub states_explored: u64,
    /// States skipped, summed over every search.
    pub states_skipped: u64,
}

#[derive(Clone)]
struct Candidate {
    phase_boards: Vec<Board>,
    phase_moves: Vec<Vec<Move>>,
    end_board: Board,
    remaining: usize,
    total_moves: usize,
}

impl Candidate {
    fn rank_key(&self) -> (usize, usize) {
        (self.remaining, self.total_moves)
    }

    fn into_solution(self) -> BestSolution {
        BestSolution {
            phase_boards: self.phase_boards,
            phase_moves: self.phase_moves,
            final_board: self.end_board,
            remaining: self.remaining,
        }
    }
}

fn record(phase: usize, report: &SolveReport) -> PhaseRecord {
    PhaseRecord {
        phase,
        results: report.results.clone(),
        states_explored: report.states_explored,
        states_skipped: report.states_skipped,
    }
}

/// Runs up to `max_phases` phases from `board` and returns the best
/// lineage seen anywhere, with a record of every search along the way.
///
/// Extending a board never removes tiles, so later phases can rank worse
/// than earlier ones; the returned best is global, not the last phase's.
pub fn solve_multi_phase(
    board: &Board,
    config: &PlanConfig,
    mut progress: Option<&mut (dyn FnMut(&str) + '_)>,
) -> PlanReport {
    let mut phases = Vec::new();
    let mut states_explored = 0u64;
    let mut states_skipped = 0u64;

    let report = solve_with(board, &config.search, progress.as_deref_mut());
    states_explored += report.states_explored;
    states_skipped += report.states_skipped;
    phases.push(record(1, &report));

    let mut candidates: Vec<Candidate> = report
        .results
        .iter()
        .map(|r| Candidate {
            phase_boards: vec![board.clone()],
            phase_moves: vec![r.moves.clone()],
            end_board: r.board.clone(),
            remaining: r.remaining,
            total_moves: r.moves.len(),
        })
        .collect();

    let mut best = candidates.first().cloned();
    if best.as_ref().map_or(true, |b| b.remaining == 0) {
        return PlanReport {
            best: best.map(Candidate::into_solution),
            phases,
            states_explored,
            states_skipped,
        };
    }
    let mut prev_best = candidates[0].remaining;

    for phase in 2..=config.max_phases {
        let mut merged: Vec<Candidate> = Vec::new();
        for candidate in &candidates {
            let extended = candidate.end_board.extend();
            let report = solve_with(&extended, &config.search, progress.as_deref_mut());
            states_explored += report.states_explored;
            states_skipped += report.states_skipped;
            phases.push(record(phase, &report));
            for result in &report.results {
                let mut phase_boards = candidate.phase_boards.clone();
                phase_boards.push(extended.clone());
                let mut phase_moves = candidate.phase_moves.clone();
                phase_moves.push(result.moves.clone());
                merged.push(Candidate {
                    phase_boards,
                    phase_moves,
                    end_board: result.board.clone(),
                    remaining: result.remaining,
                    total_moves: candidate.total_moves + result.moves.len(),
                });
            }
            if report.solved() {
                // A full clear; the rest of this phase cannot rank higher.
                break;
            }
        }
        if merged.is_empty() {
            break;
        }
        merged.sort_by_key(Candidate::rank_key);
        merged.truncate(config.search.top_k);
        if best
            .as_ref()
            .map_or(true, |b| merged[0].rank_key() < (b.remaining, b.total_moves))
        {
            best = Some(merged[0].clone());
        }
        let best_now = merged[0].remaining;
        info!(
            "phase {phase}: best {best_now} remaining after {} moves",
            merged[0].total_moves
        );
        candidates = merged;
        if best_now == 0 {
            break;
        }
        if phase >= 3 && best_now >= prev_best {
            break;
        }
        prev_best = best_now;
    }

    PlanReport {
        best: best.map(Candidate::into_solution),
        phases,
        states_explored,
        states_skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(text: &str) -> Board {
        Board::parse(text).unwrap()
    }

    #[test]
    fn a_solved_first_phase_ends_the_plan() {
        let report = solve_multi_phase(&board("91"), &PlanConfig::default(), None);
        assert_eq!(report.phases.len(), 1);
        let best = report.best.unwrap();
        assert_eq!(best.remaining, 0);
        assert_eq!(best.phase_moves, vec![vec![Move::new(0, 1)]]);
        assert!(best.final_board.is_empty());
    }

    #[test]
    fn extension_turns_a_stuck_board_into_a_win() {
        let report = solve_multi_phase(&board("5"), &PlanConfig::default(), None);
        let best = report.best.unwrap();
        assert_eq!(best.remaining, 0);
        assert_eq!(best.phase_boards.len(), 2);
        assert_eq!(best.phase_moves[0], Vec::<Move>::new());
        assert_eq!(best.phase_moves[1], vec![Move::new(0, 1)]);
        assert_eq!(best.phase_boards[1], board("55"));
        assert_eq!(best.total_moves(), 1);
    }

    #[test]
    fn the_plan_stops_when_extensions_stop_helping() {
        // 3 and 4 never pair; every extension only grows the board.
        let report = solve_multi_phase(&board("34"), &PlanConfig::default(), None);
        assert_eq!(report.phases.len(), 3);
        assert_eq!(report.phases.last().unwrap().phase, 3);
        let best = report.best.unwrap();
        assert_eq!(best.remaining, 2);
        assert_eq!(best.phase_boards.len(), 1);
        assert_eq!(best.total_moves(), 0);
    }

    #[test]
    fn max_phases_bounds_the_number_of_deals() {
        let config = PlanConfig {
            max_phases: 1,
            ..PlanConfig::default()
        };
        let report = solve_multi_phase(&board("5"), &config, None);
        assert_eq!(report.phases.len(), 1);
        assert_eq!(report.best.unwrap().remaining, 1);
    }

    #[test]
    fn state_counts_sum_over_every_search() {
        let report = solve_multi_phase(&board("34"), &PlanConfig::default(), None);
        let explored: u64 = report.phases.iter().map(|p| p.states_explored).sum();
        assert_eq!(report.states_explored, explored);
    }

    #[test]
    fn best_lineage_replays_to_its_final_board() {
        let report = solve_multi_phase(&board("5"), &PlanConfig::default(), None);
        let best = report.best.unwrap();
        let mut current = best.phase_boards[0].clone();
        for (i, moves) in best.phase_moves.iter().enumerate() {
            if i > 0 {
                current = current.extend();
                assert_eq!(current, best.phase_boards[i]);
            }
            for &mv in moves {
                current = current.apply(mv).unwrap();
            }
        }
        assert_eq!(current, best.final_board);
    }
}
