//! FEN setup and serialization.

use crate::board::{BoardState, Color, Piece, PieceKind};
use crate::moves::attacks::king_in_check;
use crate::moves::types::Move;
use crate::square::{FILE_A, FILE_E, FILE_H, Square};
use std::fmt;

/// Why a FEN string was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    /// Not six space-separated fields.
    WrongFieldCount { found: usize },
    /// A rank row does not describe exactly eight squares.
    BadRankWidth { rank: u8 },
    /// Placement does not contain exactly eight rank rows.
    BadRankCount { found: usize },
    InvalidPieceChar { ch: char },
    TooManyPieces { count: usize },
    /// A side has no king, or more than one.
    BadKingCount { color: Color, count: usize },
    InvalidSideToMove { found: String },
    InvalidCastlingRights { found: String },
    /// A castling right names a king/rook pair that is not on its home squares.
    CastlingRightsInconsistent { right: char },
    InvalidEnPassantTarget { found: String },
    /// The en-passant target is not behind a pawn of the side that just moved.
    EnPassantWithoutPawn { target: Square },
    InvalidClock { found: String },
    /// The side that just moved left its own king attackable.
    OppositeKingInCheck,
}

impl fmt::Display for FenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FenError::WrongFieldCount { found } => {
                write!(f, "FEN must have 6 fields, found {found}")
            }
            FenError::BadRankWidth { rank } => {
                write!(f, "rank row {rank} does not cover 8 squares")
            }
            FenError::BadRankCount { found } => {
                write!(f, "placement must have 8 rank rows, found {found}")
            }
            FenError::InvalidPieceChar { ch } => write!(f, "invalid piece character '{ch}'"),
            FenError::TooManyPieces { count } => {
                write!(f, "{count} pieces on the board, at most 32 allowed")
            }
            FenError::BadKingCount { color, count } => {
                write!(f, "{color:?} has {count} kings, exactly one required")
            }
            FenError::InvalidSideToMove { found } => {
                write!(f, "invalid side to move '{found}', expected 'w' or 'b'")
            }
            FenError::InvalidCastlingRights { found } => {
                write!(f, "invalid castling rights '{found}'")
            }
            FenError::CastlingRightsInconsistent { right } => {
                write!(f, "castling right '{right}' has no king/rook on home squares")
            }
            FenError::InvalidEnPassantTarget { found } => {
                write!(f, "invalid en passant target '{found}'")
            }
            FenError::EnPassantWithoutPawn { target } => {
                write!(f, "en passant target {target} has no matching pawn")
            }
            FenError::InvalidClock { found } => write!(f, "invalid move clock '{found}'"),
            FenError::OppositeKingInCheck => {
                write!(f, "side not to move is in check")
            }
        }
    }
}

impl std::error::Error for FenError {}

impl BoardState {
    /// Build a position from the six FEN fields, rejecting illegal setups
    /// with a reason code.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(FenError::WrongFieldCount { found: fields.len() });
        }

        let mut board = BoardState::empty();
        parse_placement(&mut board, fields[0])?;
        validate_piece_counts(&board)?;

        board.side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => {
                return Err(FenError::InvalidSideToMove {
                    found: other.to_string(),
                });
            }
        };

        apply_castling_rights(&mut board, fields[2])?;
        apply_en_passant_target(&mut board, fields[3])?;

        fields[4]
            .parse::<u32>()
            .map_err(|_| FenError::InvalidClock {
                found: fields[4].to_string(),
            })?;
        board.fullmove_number = fields[5].parse::<u32>().map_err(|_| FenError::InvalidClock {
            found: fields[5].to_string(),
        })?;

        if king_in_check(&board, board.side_to_move.opposite()) {
            return Err(FenError::OppositeKingInCheck);
        }

        board.reset_hash_tracking();
        Ok(board)
    }

    /// Serialize the current position. The halfmove clock is not tracked by
    /// this engine and is emitted as 0.
    pub fn to_fen(&self) -> String {
        let mut out = String::new();

        for rank in (0..8i8).rev() {
            let mut empty_run = 0;
            for file in 0..8i8 {
                match self.piece_at(Square::new(file, rank)) {
                    Some(piece) => {
                        if empty_run > 0 {
                            out.push((b'0' + empty_run) as char);
                            empty_run = 0;
                        }
                        out.push(piece.to_char());
                    }
                    None => empty_run += 1,
                }
            }
            if empty_run > 0 {
                out.push((b'0' + empty_run) as char);
            }
            if rank > 0 {
                out.push('/');
            }
        }

        out.push(' ');
        out.push(match self.side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        });

        out.push(' ');
        let rights = self.castling_rights_string();
        out.push_str(&rights);

        out.push(' ');
        match self.en_passant_target() {
            Some(target) => out.push_str(&target.to_string()),
            None => out.push('-'),
        }

        out.push_str(&format!(" 0 {}", self.fullmove_number));
        out
    }

    /// The square a pawn just double-stepped over, if the previous move was a
    /// double step.
    pub fn en_passant_target(&self) -> Option<Square> {
        let last = self.last_move()?;
        let landing = last.double_step?;
        landing.offset(0, -last.piece.color.pawn_direction())
    }

    fn castling_rights_string(&self) -> String {
        let mut rights = String::new();
        for (color, symbol_k, symbol_q, rank) in [
            (Color::White, 'K', 'Q', 0i8),
            (Color::Black, 'k', 'q', 7i8),
        ] {
            let king_home = self
                .piece_at(Square::new(FILE_E, rank))
                .is_some_and(|p| p.kind == PieceKind::King && p.color == color && !p.has_moved);
            let rook_home = |file: i8| {
                self.piece_at(Square::new(file, rank))
                    .is_some_and(|p| p.kind == PieceKind::Rook && p.color == color && !p.has_moved)
            };
            if king_home && rook_home(FILE_H) {
                rights.push(symbol_k);
            }
            if king_home && rook_home(FILE_A) {
                rights.push(symbol_q);
            }
        }
        if rights.is_empty() {
            rights.push('-');
        }
        rights
    }
}

fn parse_placement(board: &mut BoardState, placement: &str) -> Result<(), FenError> {
    let rows: Vec<&str> = placement.split('/').collect();
    if rows.len() != 8 {
        return Err(FenError::BadRankCount { found: rows.len() });
    }

    for (row_index, row) in rows.iter().enumerate() {
        // FEN rows run from rank 8 down to rank 1.
        let rank = 7 - row_index as i8;
        let mut file = 0i8;
        for ch in row.chars() {
            if file > 7 {
                return Err(FenError::BadRankWidth { rank: rank as u8 + 1 });
            }
            if let Some(run) = ch.to_digit(10) {
                if run == 0 || run > 8 {
                    return Err(FenError::InvalidPieceChar { ch });
                }
                file += run as i8;
                continue;
            }
            let kind = PieceKind::from_char(ch.to_ascii_lowercase())
                .ok_or(FenError::InvalidPieceChar { ch })?;
            let color = if ch.is_ascii_uppercase() {
                Color::White
            } else {
                Color::Black
            };
            let sq = Square::new(file, rank);
            board.put_piece(sq, placed_piece(kind, color, sq));
            file += 1;
        }
        if file != 8 {
            return Err(FenError::BadRankWidth { rank: rank as u8 + 1 });
        }
    }
    Ok(())
}

/// Pawns still on their start rank have provably never moved; everything else
/// is assumed moved until a castling right proves otherwise.
fn placed_piece(kind: PieceKind, color: Color, sq: Square) -> Piece {
    let start_rank = match color {
        Color::White => 1,
        Color::Black => 6,
    };
    Piece {
        kind,
        color,
        has_moved: !(kind == PieceKind::Pawn && sq.rank == start_rank),
    }
}

fn validate_piece_counts(board: &BoardState) -> Result<(), FenError> {
    let mut total = 0;
    let mut kings = [0usize; 2];
    for sq in Square::all() {
        if let Some(piece) = board.piece_at(sq) {
            total += 1;
            if piece.kind == PieceKind::King {
                kings[piece.color as usize] += 1;
            }
        }
    }
    if total > 32 {
        return Err(FenError::TooManyPieces { count: total });
    }
    for color in [Color::White, Color::Black] {
        if kings[color as usize] != 1 {
            return Err(FenError::BadKingCount {
                color,
                count: kings[color as usize],
            });
        }
    }
    Ok(())
}

/// Each granted right marks its king/rook pair unmoved; the pair must be on
/// its home squares for the right to be meaningful.
fn apply_castling_rights(board: &mut BoardState, rights: &str) -> Result<(), FenError> {
    if rights == "-" {
        return Ok(());
    }
    if rights.is_empty() || rights.len() > 4 {
        return Err(FenError::InvalidCastlingRights {
            found: rights.to_string(),
        });
    }

    for right in rights.chars() {
        let (color, rook_file, rank) = match right {
            'K' => (Color::White, FILE_H, 0i8),
            'Q' => (Color::White, FILE_A, 0i8),
            'k' => (Color::Black, FILE_H, 7i8),
            'q' => (Color::Black, FILE_A, 7i8),
            _ => {
                return Err(FenError::InvalidCastlingRights {
                    found: rights.to_string(),
                });
            }
        };

        let king_sq = Square::new(FILE_E, rank);
        let rook_sq = Square::new(rook_file, rank);
        let king_ok = board
            .piece_at(king_sq)
            .is_some_and(|p| p.kind == PieceKind::King && p.color == color);
        let rook_ok = board
            .piece_at(rook_sq)
            .is_some_and(|p| p.kind == PieceKind::Rook && p.color == color);
        if !king_ok || !rook_ok {
            return Err(FenError::CastlingRightsInconsistent { right });
        }

        clear_has_moved(board, king_sq);
        clear_has_moved(board, rook_sq);
    }
    Ok(())
}

fn clear_has_moved(board: &mut BoardState, sq: Square) {
    if let Some(piece) = board.piece_at(sq) {
        board.squares[sq.file as usize][sq.rank as usize] = Some(Piece {
            has_moved: false,
            ..piece
        });
    }
}

/// A target square implies the previous move was a double step; synthesize
/// that move record so en-passant generation sees it.
fn apply_en_passant_target(board: &mut BoardState, field: &str) -> Result<(), FenError> {
    if field == "-" {
        return Ok(());
    }
    let target: Square = field.parse().map_err(|_| FenError::InvalidEnPassantTarget {
        found: field.to_string(),
    })?;
    if target.rank != 2 && target.rank != 5 {
        return Err(FenError::InvalidEnPassantTarget {
            found: field.to_string(),
        });
    }

    // The pawn that double-stepped belongs to the side that just moved.
    let mover = board.side_to_move.opposite();
    let expected_rank = if target.rank == 2 { 3 } else { 4 };
    let landing = Square::new(target.file, expected_rank);
    let pawn_ok = board
        .piece_at(landing)
        .is_some_and(|p| p.kind == PieceKind::Pawn && p.color == mover);
    let correct_side = (target.rank == 2) == (mover == Color::White);
    if !pawn_ok || !correct_side {
        return Err(FenError::EnPassantWithoutPawn { target });
    }

    let start = Square::new(target.file, if mover == Color::White { 1 } else { 6 });
    let pawn_before = Piece::new(PieceKind::Pawn, mover);
    board
        .previous_moves
        .push(Move::double_step(start, landing, pawn_before));
    Ok(())
}
