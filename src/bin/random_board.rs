use clap::Parser;
use numbermatch_solver::engine::Board;
use numbermatch_solver::solver::{solve_with, SearchConfig};
use numbermatch_solver::utils::format_sequence;
use std::time::Duration;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Full rows of random digits to deal
    #[clap(short, long, default_value_t = 3)]
    rows: usize,

    /// Seed for the deal; the same seed reproduces the same board
    #[clap(short, long, default_value_t = 514514)]
    seed: u64,

    /// Solve the generated board immediately
    #[clap(long)]
    solve: bool,

    /// Ranked results kept when solving
    #[clap(short = 'k', long, default_value_t = 5)]
    top_k: usize,

    /// Stop the search after this many seconds
    #[clap(long)]
    time_limit: Option<u64>,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let board = Board::random_deal(args.rows, args.seed);
    println!("{board}");

    if args.solve {
        let config = SearchConfig {
            top_k: args.top_k,
            max_states: None,
            time_budget: args.time_limit.map(Duration::from_secs),
        };
        let mut echo = |line: &str| println!("{line}");
        let report = solve_with(&board, &config, Some(&mut echo));
        println!(
            "\nStates explored: {} ({} skipped)",
            report.states_explored, report.states_skipped
        );
        for (rank, result) in report.results.iter().enumerate() {
            println!(
                "  #{}: {} moves, {} tiles remaining",
                rank + 1,
                result.moves.len(),
                result.remaining
            );
        }
        if let Some(best) = report.best() {
            println!("\nBest sequence:");
            print!("{}", format_sequence(&board, &best.moves));
        }
    }
}
