//! Pseudo-legal move generation.
//!
//! Moves come out in two buckets, captures then quiets; final legality (the
//! mover's king not left in check) is enforced by the search through
//! apply/probe/undo rather than pre-filtered here, so pruned branches never
//! pay for it.

use crate::board::{BoardState, Color, Piece, PieceKind};
use crate::moves::attacks::{
    BISHOP_DIRECTIONS, KING_OFFSETS, KNIGHT_OFFSETS, QUEEN_DIRECTIONS, ROOK_DIRECTIONS,
    move_leaves_own_king_in_check, square_is_attacked,
};
use crate::moves::types::{Move, MoveList};
use crate::search::context::HistoryTable;
use crate::search::params::MVV_LVA_VALUES;
use crate::square::{FILE_A, FILE_B, FILE_C, FILE_D, FILE_F, FILE_G, FILE_H, Square};

const PROMOTION_KINDS: [PieceKind; 4] = [
    PieceKind::Queen,
    PieceKind::Rook,
    PieceKind::Bishop,
    PieceKind::Knight,
];

struct Buckets {
    quiet: MoveList,
    captures: MoveList,
}

/// All pseudo-legal moves for the side to move, captures first, unordered
/// within each bucket.
pub fn calculate_possible_moves(board: &BoardState) -> MoveList {
    let buckets = generate(board, false);
    merge(buckets.captures, buckets.quiet)
}

/// All pseudo-legal moves, captures ordered by MVV-LVA and quiets by the
/// history table, captures first.
pub fn calculate_ordered_moves(board: &BoardState, history: &HistoryTable) -> MoveList {
    let mut buckets = generate(board, false);
    sort_moves_mvv_lva(&mut buckets.captures);
    sort_moves_history(&mut buckets.quiet, history);
    merge(buckets.captures, buckets.quiet)
}

/// Capture moves only, MVV-LVA ordered; the quiescence feed.
pub fn calculate_capture_moves(board: &BoardState) -> MoveList {
    let mut buckets = generate(board, true);
    sort_moves_mvv_lva(&mut buckets.captures);
    reindex(&mut buckets.captures);
    buckets.captures
}

/// The fully legal move list: pseudo-legal minus moves that leave the mover's
/// king in check. Used by terminal-position detection and the interfaces, not
/// by the search inner loop.
pub fn calculate_legal_moves(board: &mut BoardState) -> MoveList {
    let pseudo = calculate_possible_moves(board);
    let mut legal = MoveList::new();
    for mv in pseudo {
        if !move_leaves_own_king_in_check(board, &mv) {
            legal.push(mv);
        }
    }
    reindex(&mut legal);
    legal
}

/// Most valuable victim, least valuable attacker. Higher searches first.
#[inline(always)]
pub fn mvv_lva_score(mv: &Move) -> i32 {
    match mv.captured {
        Some((victim, _)) => MVV_LVA_VALUES[victim.kind as usize][mv.piece.kind as usize],
        None => 0,
    }
}

pub fn sort_moves_mvv_lva(captures: &mut MoveList) {
    captures.sort_by_key(|mv| -mvv_lva_score(mv));
}

pub fn sort_moves_history(quiet: &mut MoveList, history: &HistoryTable) {
    quiet.sort_by_key(|mv| -history.score(mv));
}

fn merge(mut captures: MoveList, quiet: MoveList) -> MoveList {
    captures.extend(quiet);
    reindex(&mut captures);
    captures
}

fn reindex(moves: &mut MoveList) {
    for (index, mv) in moves.iter_mut().enumerate() {
        mv.list_index = index;
    }
}

fn generate(board: &BoardState, captures_only: bool) -> Buckets {
    let mut buckets = Buckets {
        quiet: MoveList::new(),
        captures: MoveList::new(),
    };
    let mover = board.side_to_move;

    for sq in Square::all() {
        let Some(piece) = board.piece_at(sq) else {
            continue;
        };
        if piece.color != mover {
            continue;
        }
        match piece.kind {
            PieceKind::Pawn => generate_pawn_moves(board, sq, piece, &mut buckets, captures_only),
            PieceKind::Knight => {
                generate_step_moves(board, sq, piece, &KNIGHT_OFFSETS, &mut buckets, captures_only);
            }
            PieceKind::Bishop => {
                generate_slider_moves(board, sq, piece, &BISHOP_DIRECTIONS, &mut buckets, captures_only);
            }
            PieceKind::Rook => {
                generate_slider_moves(board, sq, piece, &ROOK_DIRECTIONS, &mut buckets, captures_only);
            }
            PieceKind::Queen => {
                generate_slider_moves(board, sq, piece, &QUEEN_DIRECTIONS, &mut buckets, captures_only);
            }
            PieceKind::King => {
                generate_step_moves(board, sq, piece, &KING_OFFSETS, &mut buckets, captures_only);
                if !captures_only {
                    generate_castle_moves(board, sq, piece, &mut buckets.quiet);
                }
            }
        }
    }
    buckets
}

fn generate_pawn_moves(
    board: &BoardState,
    sq: Square,
    pawn: Piece,
    buckets: &mut Buckets,
    captures_only: bool,
) {
    let direction = pawn.color.pawn_direction();
    let promotion_rank = match pawn.color {
        Color::White => 7,
        Color::Black => 0,
    };

    if !captures_only {
        // Single and double advances.
        if let Some(one_ahead) = sq.offset(0, direction)
            && board.piece_at(one_ahead).is_none()
        {
            if one_ahead.rank == promotion_rank {
                for kind in PROMOTION_KINDS {
                    buckets.quiet.push(Move::promotion(sq, one_ahead, pawn, kind));
                }
            } else {
                buckets.quiet.push(Move::quiet(sq, one_ahead, pawn));
            }

            if !pawn.has_moved
                && let Some(two_ahead) = sq.offset(0, 2 * direction)
                && board.piece_at(two_ahead).is_none()
            {
                buckets.quiet.push(Move::double_step(sq, two_ahead, pawn));
            }
        }
    }

    // Diagonal captures.
    for dx in [-1, 1] {
        if let Some(target) = sq.offset(dx, direction)
            && let Some(victim) = board.piece_at(target)
            && victim.color != pawn.color
        {
            if target.rank == promotion_rank {
                for kind in PROMOTION_KINDS {
                    buckets
                        .captures
                        .push(Move::promotion_capture(sq, target, pawn, victim, kind));
                }
            } else {
                buckets.captures.push(Move::capture(sq, target, pawn, victim));
            }
        }
    }

    generate_en_passant_moves(board, sq, pawn, &mut buckets.captures);
}

/// En passant: the previous move must have been a double step landing beside
/// this pawn, and the capture destination must be empty.
fn generate_en_passant_moves(board: &BoardState, sq: Square, pawn: Piece, captures: &mut MoveList) {
    let ep_rank = match pawn.color {
        Color::White => 4,
        Color::Black => 3,
    };
    if sq.rank != ep_rank {
        return;
    }
    let Some(previous) = board.last_move() else {
        return;
    };
    let Some(landing) = previous.double_step else {
        return;
    };

    let direction = pawn.color.pawn_direction();
    for dx in [-1, 1] {
        let Some(beside) = sq.offset(dx, 0) else {
            continue;
        };
        if landing != beside {
            continue;
        }
        let Some(victim) = board.piece_at(beside) else {
            continue;
        };
        if victim.kind != PieceKind::Pawn || victim.color == pawn.color {
            continue;
        }
        if let Some(destination) = sq.offset(dx, direction)
            && board.piece_at(destination).is_none()
        {
            captures.push(Move::en_passant(sq, destination, pawn, victim, beside));
        }
    }
}

fn generate_step_moves(
    board: &BoardState,
    sq: Square,
    piece: Piece,
    offsets: &[(i8, i8)],
    buckets: &mut Buckets,
    captures_only: bool,
) {
    for &(dx, dy) in offsets {
        let Some(target) = sq.offset(dx, dy) else {
            continue;
        };
        match board.piece_at(target) {
            None => {
                if !captures_only {
                    buckets.quiet.push(Move::quiet(sq, target, piece));
                }
            }
            Some(victim) if victim.color != piece.color => {
                buckets.captures.push(Move::capture(sq, target, piece, victim));
            }
            Some(_) => {}
        }
    }
}

fn generate_slider_moves(
    board: &BoardState,
    sq: Square,
    piece: Piece,
    directions: &[(i8, i8)],
    buckets: &mut Buckets,
    captures_only: bool,
) {
    for &(dx, dy) in directions {
        let mut current = sq;
        while let Some(target) = current.offset(dx, dy) {
            match board.piece_at(target) {
                None => {
                    if !captures_only {
                        buckets.quiet.push(Move::quiet(sq, target, piece));
                    }
                    current = target;
                }
                Some(victim) => {
                    if victim.color != piece.color {
                        buckets.captures.push(Move::capture(sq, target, piece, victim));
                    }
                    break;
                }
            }
        }
    }
}

/// Castle generation enforces the full rule set up front: king and rook
/// unmoved, king not in check, the squares between king and rook empty, and
/// no square the king crosses attacked.
fn generate_castle_moves(board: &BoardState, sq: Square, king: Piece, quiet: &mut MoveList) {
    if king.has_moved || square_is_attacked(board, sq, king.color) {
        return;
    }
    let rank = sq.rank;

    // King side: rook on h, king crosses f and g.
    if can_castle(board, king, rank, FILE_H, &[FILE_F, FILE_G], &[FILE_F, FILE_G]) {
        quiet.push(Move::quiet(sq, Square::new(FILE_G, rank), king));
    }
    // Queen side: rook on a, b..d must be empty, king crosses d and c.
    if can_castle(
        board,
        king,
        rank,
        FILE_A,
        &[FILE_B, FILE_C, FILE_D],
        &[FILE_C, FILE_D],
    ) {
        quiet.push(Move::quiet(sq, Square::new(FILE_C, rank), king));
    }
}

fn can_castle(
    board: &BoardState,
    king: Piece,
    rank: i8,
    rook_file: i8,
    empty_files: &[i8],
    crossed_files: &[i8],
) -> bool {
    debug_assert_eq!(king.kind, PieceKind::King);
    let rook_ok = board
        .piece_at(Square::new(rook_file, rank))
        .is_some_and(|p| p.kind == PieceKind::Rook && p.color == king.color && !p.has_moved);
    if !rook_ok {
        return false;
    }
    let path_empty = empty_files
        .iter()
        .all(|&file| board.piece_at(Square::new(file, rank)).is_none());
    if !path_empty {
        return false;
    }
    crossed_files
        .iter()
        .all(|&file| !square_is_attacked(board, Square::new(file, rank), king.color))
}
