//! Attack queries: can a square be captured next move, is a king in check,
//! does a move leave its own king in check.

use crate::board::{BoardState, Color, PieceKind};
use crate::moves::types::Move;
use crate::square::Square;

pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (1, -2),
    (-1, 2),
    (-1, -2),
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
];

pub const KING_OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

pub const ROOK_DIRECTIONS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

pub const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

pub const QUEEN_DIRECTIONS: [(i8, i8); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// True iff any piece of the opposite color could capture on `sq` if it were
/// their turn. Union of five cheap piece-wise probes.
pub fn square_is_attacked(board: &BoardState, sq: Square, color_being_attacked: Color) -> bool {
    attacked_by_pawn(board, sq, color_being_attacked)
        || attacked_by_knight(board, sq, color_being_attacked)
        || attacked_by_slider(board, sq, color_being_attacked, &ROOK_DIRECTIONS, PieceKind::Rook)
        || attacked_by_slider(
            board,
            sq,
            color_being_attacked,
            &BISHOP_DIRECTIONS,
            PieceKind::Bishop,
        )
        || attacked_by_king(board, sq, color_being_attacked)
}

pub fn king_in_check(board: &BoardState, color: Color) -> bool {
    square_is_attacked(board, board.king_square(color), color)
}

/// Apply, probe, undo. The definition of legality for a pseudo-legal move.
pub fn move_leaves_own_king_in_check(board: &mut BoardState, mv: &Move) -> bool {
    let mover = mv.piece.color;
    board.apply_move(mv);
    let in_check = king_in_check(board, mover);
    board.undo_move();
    in_check
}

fn attacked_by_pawn(board: &BoardState, sq: Square, color_being_attacked: Color) -> bool {
    // Enemy pawns attack from the two forward diagonals of the defender.
    let direction = color_being_attacked.pawn_direction();
    for dx in [-1, 1] {
        if let Some(from) = sq.offset(dx, direction)
            && let Some(piece) = board.piece_at(from)
            && piece.kind == PieceKind::Pawn
            && piece.color != color_being_attacked
        {
            return true;
        }
    }
    false
}

fn attacked_by_knight(board: &BoardState, sq: Square, color_being_attacked: Color) -> bool {
    KNIGHT_OFFSETS.iter().any(|&(dx, dy)| {
        sq.offset(dx, dy).is_some_and(|from| {
            board
                .piece_at(from)
                .is_some_and(|p| p.kind == PieceKind::Knight && p.color != color_being_attacked)
        })
    })
}

/// Walk each ray until the first occupied square; a hit counts when it holds
/// an enemy `slider` or queen.
fn attacked_by_slider(
    board: &BoardState,
    sq: Square,
    color_being_attacked: Color,
    directions: &[(i8, i8)],
    slider: PieceKind,
) -> bool {
    for &(dx, dy) in directions {
        let mut current = sq;
        while let Some(next) = current.offset(dx, dy) {
            if let Some(piece) = board.piece_at(next) {
                if (piece.kind == slider || piece.kind == PieceKind::Queen)
                    && piece.color != color_being_attacked
                {
                    return true;
                }
                break;
            }
            current = next;
        }
    }
    false
}

fn attacked_by_king(board: &BoardState, sq: Square, color_being_attacked: Color) -> bool {
    KING_OFFSETS.iter().any(|&(dx, dy)| {
        sq.offset(dx, dy).is_some_and(|from| {
            board
                .piece_at(from)
                .is_some_and(|p| p.kind == PieceKind::King && p.color != color_being_attacked)
        })
    })
}
