//! Legal move-tree node counting, the standard cross-check for the generator
//! and the apply/undo pair: any rule bug shows up as a node-count drift
//! against published reference values.

use crate::board::BoardState;
use crate::moves::attacks::king_in_check;
use crate::moves::generator::calculate_possible_moves;

pub fn perft(board: &mut BoardState, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = calculate_possible_moves(board);
    let mut nodes = 0u64;
    for mv in &moves {
        board.apply_move(mv);
        if !king_in_check(board, mv.piece.color) {
            nodes += if depth == 1 { 1 } else { perft(board, depth - 1) };
        }
        board.undo_move();
    }
    nodes
}

/// Per-root-move breakdown, the usual tool for bisecting a perft mismatch.
pub fn perft_divide(board: &mut BoardState, depth: u32) -> Vec<(String, u64)> {
    let moves = calculate_possible_moves(board);
    let mut counts = Vec::new();
    for mv in &moves {
        board.apply_move(mv);
        if !king_in_check(board, mv.piece.color) {
            let nodes = if depth <= 1 { 1 } else { perft(board, depth - 1) };
            counts.push((mv.to_string(), nodes));
        }
        board.undo_move();
    }
    counts
}
