use crate::board::BoardState;
use crate::moves::attacks::king_in_check;
use crate::moves::generator::calculate_legal_moves;

/// Terminal-position classification for the current side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    InPlay,
    Checkmate,
    Stalemate,
    DrawThreefold,
}

pub fn is_draw_by_threefold(board: &BoardState) -> bool {
    board.current_state_repeated_three_times()
}

/// Determine the game status for the current position. Repetition outranks
/// the move-based outcomes.
pub fn position_status(board: &mut BoardState) -> GameStatus {
    if is_draw_by_threefold(board) {
        return GameStatus::DrawThreefold;
    }

    if calculate_legal_moves(board).is_empty() {
        if king_in_check(board, board.side_to_move) {
            GameStatus::Checkmate
        } else {
            GameStatus::Stalemate
        }
    } else {
        GameStatus::InPlay
    }
}
