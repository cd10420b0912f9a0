//! Static position evaluation in centipawns.
//!
//! The raw score is White-positive; the public entry points negate it for
//! Black so negamax always maximizes.

use crate::board::{BoardState, Color, Piece, PieceKind};
use crate::moves::attacks::{BISHOP_DIRECTIONS, KNIGHT_OFFSETS, QUEEN_DIRECTIONS, ROOK_DIRECTIONS};
use crate::search::params::{
    KING_POSITION_EVAL_MAP, LARGE_EVAL_VALUE, MAX_DOUBLE_PAWN_SQUARES_TO_CHECK,
    MEDIUM_EVAL_VALUE, PAWN_POSITION_EVAL_MAP, VERY_SMALL_EVAL_VALUE,
};
use crate::square::Square;

/// Full evaluation, relative to the side to move.
pub fn evaluate_position(board: &BoardState) -> i32 {
    let mut eval = 0;

    for sq in Square::all() {
        let Some(piece) = board.piece_at(sq) else {
            continue;
        };
        let term = match piece.kind {
            PieceKind::Pawn => evaluate_pawn(board, sq, piece),
            PieceKind::Knight => evaluate_knight(sq, piece),
            PieceKind::Bishop => evaluate_bishop(board, sq, piece),
            PieceKind::Rook => evaluate_rook(board, sq),
            PieceKind::Queen => evaluate_queen(board, sq),
            PieceKind::King => evaluate_king(board, sq, piece),
        };
        match piece.color {
            Color::White => eval += term,
            Color::Black => eval -= term,
        }
    }

    side_relative(board, eval)
}

/// Material-only evaluation, relative to the side to move. Cheap enough for
/// the razoring and futility margins.
pub fn evaluate_material(board: &BoardState) -> i32 {
    let mut eval = 0;
    for sq in Square::all() {
        if let Some(piece) = board.piece_at(sq) {
            match piece.color {
                Color::White => eval += piece.kind.value(),
                Color::Black => eval -= piece.kind.value(),
            }
        }
    }
    side_relative(board, eval)
}

#[inline(always)]
fn side_relative(board: &BoardState, white_positive: i32) -> i32 {
    match board.side_to_move {
        Color::White => white_positive,
        Color::Black => -white_positive,
    }
}

fn evaluate_pawn(board: &BoardState, sq: Square, pawn: Piece) -> i32 {
    let mut eval = PieceKind::Pawn.value();
    eval += PAWN_POSITION_EVAL_MAP[sq.file as usize];

    // Advancement only pays in the endgame, where promotion is the plan.
    if board.is_end_game {
        let rank_from_own_side = match pawn.color {
            Color::White => sq.rank as i32,
            Color::Black => (7 - sq.rank) as i32,
        };
        eval += rank_from_own_side * MEDIUM_EVAL_VALUE;
    }

    // Doubled pawns: any same-color pawn within the next three squares ahead.
    let direction = pawn.color.pawn_direction();
    for step in 1..=MAX_DOUBLE_PAWN_SQUARES_TO_CHECK {
        if let Some(ahead) = sq.offset(0, direction * step)
            && let Some(other) = board.piece_at(ahead)
            && other.kind == PieceKind::Pawn
            && other.color == pawn.color
        {
            eval -= MEDIUM_EVAL_VALUE;
        }
    }
    eval
}

fn evaluate_knight(sq: Square, knight: Piece) -> i32 {
    let mut eval = PieceKind::Knight.value();

    if !knight.has_moved {
        eval -= LARGE_EVAL_VALUE;
    }

    // Board-edge mobility only; collisions are ignored on purpose (a knight
    // near the rim is bad regardless of what stands on its targets).
    for &(dx, dy) in &KNIGHT_OFFSETS {
        if sq.offset(dx, dy).is_some() {
            eval += VERY_SMALL_EVAL_VALUE;
        }
    }
    eval
}

fn evaluate_bishop(board: &BoardState, sq: Square, bishop: Piece) -> i32 {
    let mut eval = PieceKind::Bishop.value();

    if !bishop.has_moved {
        eval -= LARGE_EVAL_VALUE;
    }

    // A bishop parked in front of its own pawn blocks the pawn chain.
    let direction = bishop.color.pawn_direction();
    if let Some(behind) = sq.offset(0, -direction)
        && let Some(piece) = board.piece_at(behind)
        && piece.kind == PieceKind::Pawn
        && piece.color == bishop.color
    {
        eval -= LARGE_EVAL_VALUE;
    }

    eval + mobility(board, sq, &BISHOP_DIRECTIONS) * VERY_SMALL_EVAL_VALUE
}

fn evaluate_rook(board: &BoardState, sq: Square) -> i32 {
    let mut eval = PieceKind::Rook.value();
    // Open lines matter once the position empties out.
    if board.is_end_game {
        eval += mobility(board, sq, &ROOK_DIRECTIONS) * VERY_SMALL_EVAL_VALUE;
    }
    eval
}

fn evaluate_queen(board: &BoardState, sq: Square) -> i32 {
    PieceKind::Queen.value() + mobility(board, sq, &QUEEN_DIRECTIONS) * VERY_SMALL_EVAL_VALUE
}

fn evaluate_king(board: &BoardState, sq: Square, king: Piece) -> i32 {
    let mut eval = PieceKind::King.value();

    // All shelter terms vanish in the endgame, where the king activates.
    if !board.is_end_game {
        if board.has_castled(king.color) {
            eval += LARGE_EVAL_VALUE;
        }
        eval += KING_POSITION_EVAL_MAP[sq.file as usize];
        // An exposed king radiates vision; every open ray square is a liability.
        eval -= mobility(board, sq, &QUEEN_DIRECTIONS) * VERY_SMALL_EVAL_VALUE;
    }
    eval
}

/// Empty squares reachable along the given rays before the first blocker.
fn mobility(board: &BoardState, sq: Square, directions: &[(i8, i8)]) -> i32 {
    let mut reachable = 0;
    for &(dx, dy) in directions {
        let mut current = sq;
        while let Some(next) = current.offset(dx, dy) {
            if board.piece_at(next).is_some() {
                break;
            }
            reachable += 1;
            current = next;
        }
    }
    reachable
}
