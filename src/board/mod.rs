mod fen;

pub use fen::FenError;

use crate::hash::zobrist::{piece_key, zobrist_keys};
use crate::moves::types::Move;
use crate::square::{FILE_A, FILE_D, FILE_F, FILE_H, Square};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Material counts of the standard starting position.
pub const INITIAL_QUEENS_COUNT: i32 = 2;
pub const INITIAL_MAIN_PIECES_COUNT: i32 = 12;

/// Which side is to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Color {
    White,
    Black,
}

impl Color {
    #[inline(always)]
    pub fn opposite(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Rank direction pawns of this color advance in.
    #[inline(always)]
    pub fn pawn_direction(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }
}

impl std::ops::Not for Color {
    type Output = Self;

    fn not(self) -> Self::Output {
        self.opposite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// Base material value in centipawns.
    #[inline(always)]
    pub const fn value(self) -> i32 {
        match self {
            PieceKind::Pawn => 80,
            PieceKind::Knight => 320,
            PieceKind::Bishop => 340,
            PieceKind::Rook => 500,
            PieceKind::Queen => 900,
            PieceKind::King => 20_000,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }

    pub fn from_char(ch: char) -> Option<Self> {
        Some(match ch {
            'p' => PieceKind::Pawn,
            'n' => PieceKind::Knight,
            'b' => PieceKind::Bishop,
            'r' => PieceKind::Rook,
            'q' => PieceKind::Queen,
            'k' => PieceKind::King,
            _ => return None,
        })
    }
}

/// A piece value; its coordinates are the board array indices holding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
    pub has_moved: bool,
}

impl Piece {
    #[inline(always)]
    pub const fn new(kind: PieceKind, color: Color) -> Self {
        Piece {
            kind,
            color,
            has_moved: false,
        }
    }

    /// FEN letter: uppercase for White, lowercase for Black.
    pub fn to_char(self) -> char {
        match self.color {
            Color::White => self.kind.to_char().to_ascii_uppercase(),
            Color::Black => self.kind.to_char(),
        }
    }
}

/// The complete mutable game state: an 8×8 array of piece values plus the
/// bookkeeping the search needs (undo stack, incremental Zobrist hash,
/// repetition counts, derived material counters).
///
/// Mutation happens only through `apply_move` / `undo_move` /
/// `apply_null_move` / `undo_null_move`; these are total on any move the
/// generator produces.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardState {
    /// Indexed `[file][rank]`; `None` is an empty square.
    squares: [[Option<Piece>; 8]; 8],
    pub side_to_move: Color,
    /// Undo stack; one entry per applied move not yet undone.
    pub previous_moves: Vec<Move>,
    pub white_king: Square,
    pub black_king: Square,
    pub white_king_alive: bool,
    pub black_king_alive: bool,
    /// Queens of both colors still on the board.
    pub queens_on_board: i32,
    /// Rooks + bishops + knights of both colors still on the board.
    pub main_pieces_left: i32,
    pub white_has_castled: bool,
    pub black_has_castled: bool,
    /// Derived from the material counters; see `refresh_end_game_flag`.
    pub is_end_game: bool,
    pub fullmove_number: u32,
    hash: u64,
    /// One hash per visited position, the setup position included. The top
    /// always equals `hash`.
    hash_stack: Vec<u64>,
    /// Occurrence count per hash in `hash_stack`.
    visited_counts: HashMap<u64, u32>,
}

impl BoardState {
    /// The standard starting position.
    pub fn new() -> Self {
        use PieceKind::*;
        const BACK_RANK: [PieceKind; 8] = [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook];

        let mut board = BoardState::empty();
        for file in 0..8i8 {
            board.put_piece(Square::new(file, 1), Piece::new(Pawn, Color::White));
            board.put_piece(Square::new(file, 6), Piece::new(Pawn, Color::Black));
            board.put_piece(Square::new(file, 0), Piece::new(BACK_RANK[file as usize], Color::White));
            board.put_piece(Square::new(file, 7), Piece::new(BACK_RANK[file as usize], Color::Black));
        }
        board.reset_hash_tracking();
        board
    }

    /// A board with no pieces; used by FEN setup before placement.
    pub(crate) fn empty() -> Self {
        BoardState {
            squares: [[None; 8]; 8],
            side_to_move: Color::White,
            previous_moves: Vec::new(),
            white_king: Square::new(4, 0),
            black_king: Square::new(4, 7),
            white_king_alive: false,
            black_king_alive: false,
            queens_on_board: 0,
            main_pieces_left: 0,
            white_has_castled: false,
            black_has_castled: false,
            is_end_game: false,
            fullmove_number: 1,
            hash: 0,
            hash_stack: Vec::new(),
            visited_counts: HashMap::new(),
        }
    }

    #[inline(always)]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.squares[sq.file as usize][sq.rank as usize]
    }

    #[inline(always)]
    fn slot_mut(&mut self, sq: Square) -> &mut Option<Piece> {
        &mut self.squares[sq.file as usize][sq.rank as usize]
    }

    #[inline(always)]
    pub fn king_square(&self, color: Color) -> Square {
        match color {
            Color::White => self.white_king,
            Color::Black => self.black_king,
        }
    }

    #[inline(always)]
    pub fn king_alive(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_king_alive,
            Color::Black => self.black_king_alive,
        }
    }

    #[inline(always)]
    pub fn has_castled(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_has_castled,
            Color::Black => self.black_has_castled,
        }
    }

    /// Zobrist hash of the current position, maintained incrementally.
    #[inline(always)]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// The move that produced the current position, if any.
    #[inline(always)]
    pub fn last_move(&self) -> Option<&Move> {
        self.previous_moves.last()
    }

    /// Register a piece during setup, maintaining kings and material counters.
    pub(crate) fn put_piece(&mut self, sq: Square, piece: Piece) {
        match piece.kind {
            PieceKind::Queen => self.queens_on_board += 1,
            PieceKind::Rook | PieceKind::Bishop | PieceKind::Knight => self.main_pieces_left += 1,
            PieceKind::King => match piece.color {
                Color::White => {
                    self.white_king = sq;
                    self.white_king_alive = true;
                }
                Color::Black => {
                    self.black_king = sq;
                    self.black_king_alive = true;
                }
            },
            PieceKind::Pawn => {}
        }
        *self.slot_mut(sq) = Some(piece);
    }

    /// Recompute the derived endgame flag and seed hash/repetition tracking
    /// from the position as set up. Call once after placement is complete.
    pub(crate) fn reset_hash_tracking(&mut self) {
        self.refresh_end_game_flag();
        self.hash = self.compute_hash_from_scratch();
        self.hash_stack = vec![self.hash];
        self.visited_counts = HashMap::from([(self.hash, 1)]);
    }

    /// Transform the state so the top of the undo stack fully describes the
    /// inverse. See `undo_move`.
    pub fn apply_move(&mut self, mv: &Move) {
        let color = mv.piece.color;
        debug_assert_eq!(color, self.side_to_move, "move applied out of turn");

        if mv.is_en_passant {
            // The captured pawn sits beside the mover, not on the destination.
            if let Some((captured, captured_at)) = mv.captured {
                *self.slot_mut(captured_at) = None;
                self.hash ^= piece_key(captured.color, captured.kind, captured_at);
            }
        } else if mv.is_castling() {
            let rank = mv.from.rank;
            let (rook_from, rook_to) = if mv.to.file > mv.from.file {
                (Square::new(FILE_H, rank), Square::new(FILE_F, rank))
            } else {
                (Square::new(FILE_A, rank), Square::new(FILE_D, rank))
            };
            if let Some(mut rook) = self.slot_mut(rook_from).take() {
                rook.has_moved = true;
                *self.slot_mut(rook_to) = Some(rook);
                self.hash ^= piece_key(color, PieceKind::Rook, rook_from)
                    ^ piece_key(color, PieceKind::Rook, rook_to);
            }
            match color {
                Color::White => self.white_has_castled = true,
                Color::Black => self.black_has_castled = true,
            }
        } else if let Some((captured, captured_at)) = mv.captured {
            // Plain capture: the destination occupant leaves the board (the
            // slot itself is overwritten below).
            self.hash ^= piece_key(captured.color, captured.kind, captured_at);
        }

        *self.slot_mut(mv.from) = None;
        self.hash ^= piece_key(color, mv.piece.kind, mv.from);

        let placed = Piece {
            kind: mv.promotion.unwrap_or(mv.piece.kind),
            color,
            has_moved: true,
        };
        *self.slot_mut(mv.to) = Some(placed);
        self.hash ^= piece_key(color, placed.kind, mv.to);

        if placed.kind == PieceKind::King {
            match color {
                Color::White => self.white_king = mv.to,
                Color::Black => self.black_king = mv.to,
            }
        }

        self.manage_piece_counts_on_apply(mv);

        self.side_to_move = self.side_to_move.opposite();
        self.hash ^= zobrist_keys().side_to_move;
        if color == Color::Black {
            self.fullmove_number += 1;
        }

        self.previous_moves.push(*mv);
        self.hash_stack.push(self.hash);
        *self.visited_counts.entry(self.hash).or_insert(0) += 1;

        #[cfg(debug_assertions)]
        self.assert_hash();
    }

    /// Exact inverse of the most recent `apply_move`, driven only by the top
    /// move record and the board itself. Returns None when nothing applied
    /// since setup remains to undo.
    pub fn undo_move(&mut self) -> Option<Move> {
        if self.hash_stack.len() <= 1 {
            // A FEN with an en-passant target seeds one synthetic move record
            // that was never applied here; it is not undoable.
            return None;
        }
        let mv = self.previous_moves.pop()?;

        let undone_hash = self.hash_stack.pop().expect("hash stack holds one entry per move");
        self.forget_visited(undone_hash);
        self.hash = *self
            .hash_stack
            .last()
            .expect("hash stack retains the setup position");

        self.side_to_move = self.side_to_move.opposite();
        if mv.piece.color == Color::Black {
            self.fullmove_number -= 1;
        }

        // Remove whatever now stands on `to` (the mover, possibly promoted),
        // restore the captured piece, then the mover's pre-move snapshot.
        *self.slot_mut(mv.to) = None;
        if let Some((captured, captured_at)) = mv.captured {
            *self.slot_mut(captured_at) = Some(captured);
        }
        *self.slot_mut(mv.from) = Some(mv.piece);

        if mv.is_castling() {
            let rank = mv.from.rank;
            let (rook_from, rook_to) = if mv.to.file > mv.from.file {
                (Square::new(FILE_H, rank), Square::new(FILE_F, rank))
            } else {
                (Square::new(FILE_A, rank), Square::new(FILE_D, rank))
            };
            if let Some(mut rook) = self.slot_mut(rook_to).take() {
                // Castling required an unmoved rook.
                rook.has_moved = false;
                *self.slot_mut(rook_from) = Some(rook);
            }
            match mv.piece.color {
                Color::White => self.white_has_castled = false,
                Color::Black => self.black_has_castled = false,
            }
        }

        if mv.piece.kind == PieceKind::King {
            match mv.piece.color {
                Color::White => self.white_king = mv.from,
                Color::Black => self.black_king = mv.from,
            }
        }

        self.manage_piece_counts_on_undo(&mv);

        #[cfg(debug_assertions)]
        self.assert_hash();

        Some(mv)
    }

    /// Pass the turn. Legal only when the side to move is not in check; used
    /// by null-move pruning.
    pub fn apply_null_move(&mut self) {
        self.side_to_move = self.side_to_move.opposite();
        self.hash ^= zobrist_keys().side_to_move;
        self.hash_stack.push(self.hash);
        *self.visited_counts.entry(self.hash).or_insert(0) += 1;
    }

    pub fn undo_null_move(&mut self) {
        let undone_hash = self.hash_stack.pop().expect("null move was applied");
        self.forget_visited(undone_hash);
        self.hash = *self
            .hash_stack
            .last()
            .expect("hash stack retains the setup position");
        self.side_to_move = self.side_to_move.opposite();
    }

    fn forget_visited(&mut self, hash: u64) {
        if let Some(count) = self.visited_counts.get_mut(&hash) {
            *count -= 1;
            if *count == 0 {
                self.visited_counts.remove(&hash);
            }
        }
    }

    fn manage_piece_counts_on_apply(&mut self, mv: &Move) {
        let mut material_changed = false;

        if let Some((captured, _)) = mv.captured {
            material_changed = true;
            match captured.kind {
                PieceKind::Queen => self.queens_on_board -= 1,
                PieceKind::Rook | PieceKind::Bishop | PieceKind::Knight => {
                    self.main_pieces_left -= 1;
                }
                PieceKind::King => match captured.color {
                    Color::White => self.white_king_alive = false,
                    Color::Black => self.black_king_alive = false,
                },
                PieceKind::Pawn => {}
            }
        }
        if let Some(kind) = mv.promotion {
            material_changed = true;
            match kind {
                PieceKind::Queen => self.queens_on_board += 1,
                PieceKind::Rook | PieceKind::Bishop | PieceKind::Knight => {
                    self.main_pieces_left += 1;
                }
                _ => {}
            }
        }

        if material_changed {
            self.refresh_end_game_flag();
        }
    }

    fn manage_piece_counts_on_undo(&mut self, mv: &Move) {
        let mut material_changed = false;

        if let Some((captured, _)) = mv.captured {
            material_changed = true;
            match captured.kind {
                PieceKind::Queen => self.queens_on_board += 1,
                PieceKind::Rook | PieceKind::Bishop | PieceKind::Knight => {
                    self.main_pieces_left += 1;
                }
                PieceKind::King => match captured.color {
                    Color::White => self.white_king_alive = true,
                    Color::Black => self.black_king_alive = true,
                },
                PieceKind::Pawn => {}
            }
        }
        if let Some(kind) = mv.promotion {
            material_changed = true;
            match kind {
                PieceKind::Queen => self.queens_on_board -= 1,
                PieceKind::Rook | PieceKind::Bishop | PieceKind::Knight => {
                    self.main_pieces_left -= 1;
                }
                _ => {}
            }
        }

        if material_changed {
            self.refresh_end_game_flag();
        }
    }

    /// Endgame thresholds over queens and main pieces (both colors pooled).
    pub(crate) fn refresh_end_game_flag(&mut self) {
        let queens = self.queens_on_board;
        let main = self.main_pieces_left;
        self.is_end_game =
            (queens == 2 && main <= 2) || (queens == 1 && main <= 5) || (queens == 0 && main <= 8);
    }

    /// Full recompute; must match the incremental hash at all times.
    pub fn compute_hash_from_scratch(&self) -> u64 {
        let mut hash = 0u64;
        for sq in Square::all() {
            if let Some(piece) = self.piece_at(sq) {
                hash ^= piece_key(piece.color, piece.kind, sq);
            }
        }
        if self.side_to_move == Color::Black {
            hash ^= zobrist_keys().side_to_move;
        }
        hash
    }

    /// True when the current position occurs three or more times on the
    /// visited-state stack (threefold repetition).
    pub fn current_state_repeated_three_times(&self) -> bool {
        self.visited_counts.get(&self.hash).copied().unwrap_or(0) >= 3
    }

    /// True when the current position occurred earlier in the game or search
    /// line (its count on the stack is at least two).
    pub fn current_state_has_been_visited(&self) -> bool {
        self.visited_counts.get(&self.hash).copied().unwrap_or(0) >= 2
    }

    /// Number of positions on the visited-state stack (setup included).
    pub fn visited_stack_len(&self) -> usize {
        self.hash_stack.len()
    }

    #[cfg(debug_assertions)]
    #[inline]
    pub fn assert_hash(&self) {
        let full = self.compute_hash_from_scratch();
        debug_assert_eq!(
            self.hash, full,
            "Zobrist parity mismatch: stored={:#018x}, full={:#018x}",
            self.hash, full
        );
        debug_assert_eq!(self.hash_stack.last().copied(), Some(self.hash));
    }

    /// ASCII rendering with the given color at the bottom.
    pub fn render(&self, perspective: Color) -> String {
        let mut out = String::new();
        let ranks: Vec<i8> = match perspective {
            Color::White => (0..8).rev().collect(),
            Color::Black => (0..8).collect(),
        };
        let files: Vec<i8> = match perspective {
            Color::White => (0..8).collect(),
            Color::Black => (0..8).rev().collect(),
        };
        for &rank in &ranks {
            out.push((b'1' + rank as u8) as char);
            out.push(' ');
            for &file in &files {
                let ch = match self.squares[file as usize][rank as usize] {
                    Some(piece) => piece.to_char(),
                    None => '.',
                };
                out.push(ch);
                out.push(' ');
            }
            out.push('\n');
        }
        out.push_str("  ");
        for &file in &files {
            out.push((b'a' + file as u8) as char);
            out.push(' ');
        }
        out.push('\n');
        out
    }
}

impl Default for BoardState {
    fn default() -> Self {
        BoardState::new()
    }
}

impl FromStr for BoardState {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BoardState::from_fen(s)
    }
}

impl fmt::Display for BoardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fen())
    }
}
