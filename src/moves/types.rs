use crate::board::{Piece, PieceKind};
use crate::square::Square;
use arrayvec::ArrayVec;
use std::fmt;

/// Upper bound on pseudo-legal moves in any reachable position (the known
/// maximum for legal positions is 218; promotion expansion stays well under
/// this cap).
pub const MAX_MOVES_PER_POSITION: usize = 256;

/// Fixed-capacity move buffer so generation never touches the heap.
pub type MoveList = ArrayVec<Move, MAX_MOVES_PER_POSITION>;

/// One move, carrying everything `undo_move` needs to invert it.
///
/// `captured` records the captured piece together with the square it stood on,
/// which differs from `to` exactly for en-passant captures.
#[derive(Debug, Clone, Copy, Eq)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    /// Pre-move snapshot of the moving piece.
    pub piece: Piece,
    pub captured: Option<(Piece, Square)>,
    pub promotion: Option<PieceKind>,
    pub is_en_passant: bool,
    /// True when the mover had not moved before this move.
    pub first_move_of_piece: bool,
    /// Landing square of a two-square pawn advance, None otherwise.
    pub double_step: Option<Square>,
    /// Position of this move in the generated list; search-only ordering aid,
    /// excluded from equality.
    pub list_index: usize,
}

impl Move {
    pub fn quiet(from: Square, to: Square, piece: Piece) -> Self {
        Move {
            from,
            to,
            piece,
            captured: None,
            promotion: None,
            is_en_passant: false,
            first_move_of_piece: !piece.has_moved,
            double_step: None,
            list_index: 0,
        }
    }

    pub fn capture(from: Square, to: Square, piece: Piece, captured: Piece) -> Self {
        Move {
            captured: Some((captured, to)),
            ..Move::quiet(from, to, piece)
        }
    }

    pub fn double_step(from: Square, to: Square, piece: Piece) -> Self {
        Move {
            double_step: Some(to),
            ..Move::quiet(from, to, piece)
        }
    }

    pub fn en_passant(from: Square, to: Square, piece: Piece, captured: Piece, captured_at: Square) -> Self {
        Move {
            captured: Some((captured, captured_at)),
            is_en_passant: true,
            ..Move::quiet(from, to, piece)
        }
    }

    pub fn promotion(from: Square, to: Square, piece: Piece, kind: PieceKind) -> Self {
        Move {
            promotion: Some(kind),
            ..Move::quiet(from, to, piece)
        }
    }

    pub fn promotion_capture(
        from: Square,
        to: Square,
        piece: Piece,
        captured: Piece,
        kind: PieceKind,
    ) -> Self {
        Move {
            captured: Some((captured, to)),
            promotion: Some(kind),
            ..Move::quiet(from, to, piece)
        }
    }

    #[inline(always)]
    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    /// King displaced two files: the castling encoding.
    #[inline(always)]
    pub fn is_castling(&self) -> bool {
        self.piece.kind == PieceKind::King && (self.to.file - self.from.file).abs() == 2
    }
}

/// Structural equality over everything except `list_index`.
impl PartialEq for Move {
    fn eq(&self, other: &Self) -> bool {
        self.from == other.from
            && self.to == other.to
            && self.piece == other.piece
            && self.captured == other.captured
            && self.promotion == other.promotion
            && self.is_en_passant == other.is_en_passant
            && self.first_move_of_piece == other.first_move_of_piece
            && self.double_step == other.double_step
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(kind) = self.promotion {
            write!(f, "{}", kind.to_char())?;
        }
        Ok(())
    }
}
