//! # Number Match Solver Library
//!
//! This library provides the core game logic for the Number Match puzzle
//! and a depth-first solver that hunts for move sequences clearing the
//! board, or leaving as few tiles as possible.
//!
//! The game is played on rows of nine tiles holding digits 1-9. Two tiles
//! can be removed together when they hold the same digit or digits summing
//! to ten, provided no other tile sits between them in reading order,
//! vertically, or diagonally. A row whose tiles are all gone collapses, and
//! the remaining tiles can be re-dealt onto the end of the board a limited
//! number of times.
//!
//! It is used by two binaries:
//! - `solve_board`: parses a board, runs the multi-phase planner, and
//!   prints the winning move script grouped into display steps.
//! - `random_board`: produces seeded random deals for experimentation.
//!
//! ## Modules
//! - `engine`: board representation (`Board`), cell types (`Cell`), move
//!   enumeration, move application with row compaction, and the
//!   "deal more tiles" extension.
//! - `solver`: the depth-first search engine with memoized states and
//!   ranked results.
//! - `planner`: the multi-phase extend-and-resolve orchestration loop.
//! - `grouping`: turns a flat move sequence into human-reviewable steps.
//! - `utils`: plain-text renderings of boards, moves, and steps.

pub mod engine;
pub mod grouping;
pub mod planner;
pub mod solver;
pub mod utils;
