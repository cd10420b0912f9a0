//! Perft runner: counts legal move-tree nodes for a position, optionally with
//! a per-root-move breakdown for bisecting generator bugs.
//!
//! Usage: perft <depth> [fen] [--divide]

use std::time::Instant;
use tempo::board::BoardState;
use tempo::moves::perft::{perft, perft_divide};

const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let divide = args.iter().any(|arg| arg == "--divide");
    let positional: Vec<&String> = args.iter().filter(|arg| !arg.starts_with("--")).collect();

    let Some(depth) = positional.first().and_then(|raw| raw.parse::<u32>().ok()) else {
        eprintln!("usage: perft <depth> [fen] [--divide]");
        std::process::exit(2);
    };
    let fen = positional
        .get(1)
        .map(|raw| raw.as_str())
        .unwrap_or(START_FEN);

    let mut board = match BoardState::from_fen(fen) {
        Ok(board) => board,
        Err(err) => {
            eprintln!("bad FEN: {err}");
            std::process::exit(2);
        }
    };

    println!("perft({depth}) on {fen}");

    if divide {
        let mut total = 0u64;
        for (text, nodes) in perft_divide(&mut board, depth) {
            println!("{text:<8} {nodes}");
            total += nodes;
        }
        println!("total: {total}");
        return;
    }

    let started = Instant::now();
    let nodes = perft(&mut board, depth);
    let elapsed = started.elapsed();
    let nps = nodes as f64 / elapsed.as_secs_f64().max(1e-9) / 1.0e6;
    println!(
        "{nodes} nodes in {} ms ({nps:.2} Mnps)",
        elapsed.as_millis()
    );
}
