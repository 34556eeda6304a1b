//! Depth-first search over move application, with memoized states and a
//! ranked result list.
//!
//! The walk uses an explicit stack of frames rather than recursion, so
//! board depth is bounded only by memory and the per-depth branch cursors
//! can be read straight off the stack for progress reporting.

use crate::engine::{Board, Move};
use log::{debug, info};
use std::collections::HashSet;
use std::time::{Duration, Instant};

/// Minimum wall-clock gap between two progress reports.
pub const PROGRESS_INTERVAL: Duration = Duration::from_secs(2);

/// A terminal board together with the moves that reached it.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchResult {
    /// Moves played from the start board, in order.
    pub moves: Vec<Move>,
    /// The terminal board: no legal move remains on it.
    pub board: Board,
    /// Active tiles left on the terminal board.
    pub remaining: usize,
}

/// Why the search stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    /// Every reachable state was visited.
    Exhausted,
    /// A terminal with zero remaining tiles was found; the walk unwound
    /// immediately, so the sequence is a clear but not necessarily the
    /// shortest one.
    Solved,
    /// The configured state ceiling was hit.
    StateLimit,
    /// The configured time budget ran out.
    TimeLimit,
}

/// Everything a search invocation returns.
#[derive(Clone, Debug, PartialEq)]
pub struct SolveReport {
    /// Kept terminals, sorted by (remaining, move count) ascending.
    pub results: Vec<SearchResult>,
    /// States entered for the first time.
    pub states_explored: u64,
    /// States reached again through a different move order.
    pub states_skipped: u64,
    /// Why the walk stopped.
    pub termination: Termination,
}

impl SolveReport {
    /// The highest-ranked result, if any terminal was reached.
    pub fn best(&self) -> Option<&SearchResult> {
        self.results.first()
    }

    /// Whether a full clear was found.
    pub fn solved(&self) -> bool {
        self.termination == Termination::Solved
    }
}

/// Search settings. The ceilings are off by default; without them the
/// walk is exhaustive over the reachable unique states.
#[derive(Clone, Debug)]
pub struct SearchConfig {
    /// Result list capacity.
    pub top_k: usize,
    /// Stop after entering this many states.
    pub max_states: Option<u64>,
    /// Stop after this much wall-clock time.
    pub time_budget: Option<Duration>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            top_k: 5,
            max_states: None,
            time_budget: None,
        }
    }
}

/// One partially-explored board on the walk's stack.
struct Frame {
    children: Vec<(Move, Board)>,
    next: usize,
}

/// Children of a state, each legal move applied once. Moves that keep
/// every row intact come before moves that shrink the board, preserving
/// enumeration order within each half.
fn ordered_children(board: &Board) -> Vec<(Move, Board)> {
    let mut keeps = Vec::new();
    let mut shrinks = Vec::new();
    for mv in board.find_all_moves() {
        let child = board.apply_known(mv);
        if child.len() < board.len() {
            shrinks.push((mv, child));
        } else {
            keeps.push((mv, child));
        }
    }
    keeps.append(&mut shrinks);
    keeps
}

struct Search<'a, 'f, 'g> {
    config: &'a SearchConfig,
    progress: Option<&'f mut (dyn FnMut(&str) + 'g)>,
    visited: HashSet<Board>,
    results: Vec<SearchResult>,
    path: Vec<Move>,
    states_explored: u64,
    states_skipped: u64,
    solved: bool,
    started: Instant,
    last_report: Instant,
}

impl Search<'_, '_, '_> {
    /// Enters a state. Returns a frame to push when the state is new and
    /// has moves to explore; records it when it is a new terminal.
    fn enter(&mut self, board: Board) -> Option<Frame> {
        if self.visited.contains(&board) {
            self.states_skipped += 1;
            return None;
        }
        self.visited.insert(board.clone());
        self.states_explored += 1;

        let children = ordered_children(&board);
        if children.is_empty() {
            self.record_terminal(board);
            return None;
        }
        Some(Frame { children, next: 0 })
    }

    fn record_terminal(&mut self, board: Board) {
        let remaining = board.remaining_count();
        let admit = match self.results.last() {
            None => true,
            Some(worst) => {
                self.results.len() < self.config.top_k
                    || (remaining, self.path.len()) < (worst.remaining, worst.moves.len())
            }
        };
        if !admit {
            return;
        }
        self.results.push(SearchResult {
            moves: self.path.clone(),
            board,
            remaining,
        });
        self.results.sort_by_key(|r| (r.remaining, r.moves.len()));
        self.results.truncate(self.config.top_k);
        if self.results.first().map_or(false, |r| r.remaining == remaining) {
            debug!(
                "new best: {remaining} remaining after {} moves ({} states explored)",
                self.path.len(),
                self.states_explored
            );
        }
        if remaining == 0 {
            self.solved = true;
        }
    }

    fn over_limit(&self) -> Option<Termination> {
        if let Some(max) = self.config.max_states {
            if self.states_explored >= max {
                return Some(Termination::StateLimit);
            }
        }
        if let Some(budget) = self.config.time_budget {
            if self.started.elapsed() >= budget {
                return Some(Termination::TimeLimit);
            }
        }
        None
    }

    /// Hands a status line to the progress sink, at most once per
    /// [`PROGRESS_INTERVAL`]. Observation only.
    fn report_progress(&mut self, stack: &[Frame]) {
        if self.progress.is_none() || self.last_report.elapsed() < PROGRESS_INTERVAL {
            return;
        }
        self.last_report = Instant::now();
        let best = match self.results.first() {
            Some(r) => r.remaining.to_string(),
            None => "?".to_string(),
        };
        let trail: Vec<String> = stack
            .iter()
            .map(|f| format!("{}/{}", f.next, f.children.len()))
            .collect();
        let line = format!(
            "[{:.1}s] states explored: {}, skipped: {}, best so far: {} remaining, branch {}",
            self.started.elapsed().as_secs_f64(),
            self.states_explored,
            self.states_skipped,
            best,
            trail.join(" > "),
        );
        if let Some(sink) = self.progress.as_deref_mut() {
            sink(&line);
        }
    }
}

/// Searches `board` exhaustively and keeps the `top_k` best terminals.
pub fn solve(board: &Board, top_k: usize) -> SolveReport {
    let config = SearchConfig {
        top_k,
        ..SearchConfig::default()
    };
    solve_with(board, &config, None)
}

/// Searches `board` under `config`, reporting throttled status lines to
/// `progress` when given.
///
/// Terminals are ranked by (remaining tiles, sequence length) ascending.
/// The first terminal with zero remaining tiles ends the walk at once,
/// without visiting further siblings at any depth.
pub fn solve_with(
    board: &Board,
    config: &SearchConfig,
    progress: Option<&mut (dyn FnMut(&str) + '_)>,
) -> SolveReport {
    let now = Instant::now();
    let mut search = Search {
        config,
        progress,
        visited: HashSet::new(),
        results: Vec::new(),
        path: Vec::new(),
        states_explored: 0,
        states_skipped: 0,
        solved: false,
        started: now,
        last_report: now,
    };
    let mut stack: Vec<Frame> = Vec::new();
    if let Some(frame) = search.enter(board.clone()) {
        stack.push(frame);
    }

    let mut termination = Termination::Exhausted;
    loop {
        if search.solved {
            termination = Termination::Solved;
            break;
        }
        if let Some(cut) = search.over_limit() {
            termination = cut;
            break;
        }
        search.report_progress(&stack);
        let Some(frame) = stack.last_mut() else { break };
        if frame.next == frame.children.len() {
            stack.pop();
            if !stack.is_empty() {
                search.path.pop();
            }
            continue;
        }
        let (mv, child) = frame.children[frame.next].clone();
        frame.next += 1;
        search.path.push(mv);
        match search.enter(child) {
            Some(frame) => stack.push(frame),
            None => {
                search.path.pop();
            }
        }
    }

    info!(
        "search done in {:.1}s: {} states explored, {} skipped, best {:?} remaining",
        search.started.elapsed().as_secs_f64(),
        search.states_explored,
        search.states_skipped,
        search.results.first().map(|r| r.remaining),
    );
    SolveReport {
        results: search.results,
        states_explored: search.states_explored,
        states_skipped: search.states_skipped,
        termination,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(text: &str) -> Board {
        Board::parse(text).unwrap()
    }

    #[test]
    fn a_single_pair_clears_the_board() {
        let report = solve(&board("91"), 5);
        assert_eq!(report.termination, Termination::Solved);
        let best = report.best().unwrap();
        assert_eq!(best.remaining, 0);
        assert_eq!(best.moves, vec![Move::new(0, 1)]);
        assert!(best.board.is_empty());
    }

    #[test]
    fn a_board_without_moves_is_its_own_terminal() {
        let b = board("123456789");
        let report = solve(&b, 5);
        assert_eq!(report.termination, Termination::Exhausted);
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].board, b);
        assert_eq!(report.results[0].remaining, 9);
        assert!(report.results[0].moves.is_empty());
        assert_eq!(report.states_explored, 1);
        assert_eq!(report.states_skipped, 0);
    }

    #[test]
    fn stacked_pairs_clear_both_rows() {
        let report = solve(&board("55\n55"), 5);
        assert_eq!(report.termination, Termination::Solved);
        let best = report.best().unwrap();
        assert_eq!(best.remaining, 0);
        assert_eq!(best.moves.len(), 2);
        assert!(best.board.is_empty());
    }

    #[test]
    fn repeated_searches_return_identical_rankings() {
        let b = board("191\n.5.");
        assert_eq!(solve(&b, 5), solve(&b, 5));
    }

    #[test]
    fn rankings_are_sorted_and_truncated_to_top_k() {
        let b = board("191\n.5.");
        let full = solve(&b, 5);
        assert_eq!(full.results.len(), 2);
        let keys: Vec<_> = full
            .results
            .iter()
            .map(|r| (r.remaining, r.moves.len()))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);

        let trimmed = solve(&b, 1);
        assert_eq!(trimmed.results.len(), 1);
        assert_eq!(trimmed.results[0], full.results[0]);
    }

    #[test]
    fn state_limit_cuts_the_walk_short() {
        let config = SearchConfig {
            top_k: 5,
            max_states: Some(1),
            time_budget: None,
        };
        let report = solve_with(&board("55\n55"), &config, None);
        assert_eq!(report.termination, Termination::StateLimit);
        assert_eq!(report.states_explored, 1);
        assert!(report.results.is_empty());
    }

    #[test]
    fn a_progress_sink_never_changes_the_outcome() {
        let b = board("191\n.5.");
        let plain = solve(&b, 5);
        let mut lines = Vec::new();
        let mut sink = |s: &str| lines.push(s.to_string());
        let observed = solve_with(&b, &SearchConfig::default(), Some(&mut sink));
        assert_eq!(plain, observed);
    }

    #[test]
    fn row_preserving_moves_are_tried_first() {
        let b = board("91\n191");
        let children = ordered_children(&b);
        assert_eq!(children.first().unwrap().0, Move::new(0, 9));
        assert_eq!(children.last().unwrap().0, Move::new(0, 1));
        assert!(children
            .iter()
            .take(children.len() - 1)
            .all(|(m, _)| *m != Move::new(0, 1)));
    }
}
