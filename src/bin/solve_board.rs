use clap::Parser;
use numbermatch_solver::engine::Board;
use numbermatch_solver::grouping::group_for_display;
use numbermatch_solver::planner::{solve_multi_phase, PlanConfig};
use numbermatch_solver::solver::SearchConfig;
use numbermatch_solver::utils::format_steps;
use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Path to the board file; reads stdin when omitted
    board_file: Option<PathBuf>,

    /// Ranked results kept per search
    #[clap(short = 'k', long, default_value_t = 5)]
    top_k: usize,

    /// Maximum number of deals, counting the initial one
    #[clap(short, long, default_value_t = 6)]
    phases: usize,

    /// Stop each search after exploring this many states
    #[clap(long)]
    max_states: Option<u64>,

    /// Stop each search after this many seconds
    #[clap(long)]
    time_limit: Option<u64>,
}

fn read_board_text(path: Option<&PathBuf>) -> Result<String, String> {
    match path {
        Some(path) => {
            fs::read_to_string(path).map_err(|e| format!("failed to read {}: {e}", path.display()))
        }
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(|e| format!("failed to read stdin: {e}"))?;
            Ok(text)
        }
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let text = match read_board_text(args.board_file.as_ref()) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    };
    let board = match Board::parse(&text) {
        Ok(board) => board,
        Err(err) => {
            eprintln!("invalid board: {err}");
            process::exit(1);
        }
    };

    println!("Board ({} tiles):\n{board}\n", board.remaining_count());

    let config = PlanConfig {
        max_phases: args.phases,
        search: SearchConfig {
            top_k: args.top_k,
            max_states: args.max_states,
            time_budget: args.time_limit.map(Duration::from_secs),
        },
    };
    println!("Solving...");
    let mut echo = |line: &str| println!("{line}");
    let report = solve_multi_phase(&board, &config, Some(&mut echo));

    println!(
        "Explored {} states ({} skipped) across {} searches:",
        report.states_explored,
        report.states_skipped,
        report.phases.len()
    );
    for record in &report.phases {
        println!(
            "  phase {}: best {} remaining, {} results kept, {} states",
            record.phase,
            record
                .best_remaining()
                .map_or_else(|| "-".to_string(), |r| r.to_string()),
            record.results.len(),
            record.states_explored
        );
    }

    let Some(best) = report.best else {
        println!("\nNo result produced.");
        return;
    };
    if best.total_moves() == 0 {
        println!("\nNo legal moves on this board.");
        return;
    }

    println!(
        "\nBest outcome: {} remaining after {} moves across {} deal(s).",
        best.remaining,
        best.total_moves(),
        best.phase_boards.len()
    );
    for (phase, (start, moves)) in best
        .phase_boards
        .iter()
        .zip(&best.phase_moves)
        .enumerate()
    {
        println!("\n=== Deal {} ({} moves) ===", phase + 1, moves.len());
        if phase > 0 {
            println!("[deal more tiles]\n{start}\n");
        }
        let steps = group_for_display(start, moves);
        print!("{}", format_steps(&steps));
    }
    if best.final_board.is_empty() {
        println!("\nBoard cleared!");
    } else {
        println!(
            "\nFinal board ({} remaining):\n{}",
            best.remaining, best.final_board
        );
    }
}
