//! Move-text parsing and printing.
//!
//! Grammar, identical for both colors (piece letters are lowercase):
//!
//! ```text
//! (O-O | O-O-O) | [kqrbnp] <from-sq> x? <to-sq> (= [qrbn])? [+#]?
//! ```
//!
//! with `<sq>` = `[a-h][1-8]`. Parsing resolves against the caller-supplied
//! legal move list, so an accepted string is always playable.

use crate::board::PieceKind;
use crate::moves::types::Move;
use crate::square::Square;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveTextError {
    /// Input does not match the grammar.
    Syntax { input: String },
    /// Well-formed, but no legal move matches (wrong piece, bad capture
    /// marker, missing promotion, or the move leaves the king in check).
    NoMatchingMove { input: String },
}

impl fmt::Display for MoveTextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveTextError::Syntax { input } => write!(f, "move text '{input}' is malformed"),
            MoveTextError::NoMatchingMove { input } => {
                write!(f, "no legal move matches '{input}'")
            }
        }
    }
}

impl std::error::Error for MoveTextError {}

/// Translate a move string into the matching entry of `legal_moves`.
pub fn parse_move_text(legal_moves: &[Move], input: &str) -> Result<Move, MoveTextError> {
    let text = input.trim();
    let stripped = text
        .strip_suffix(['+', '#'])
        .unwrap_or(text);

    if stripped == "O-O" || stripped == "O-O-O" {
        let king_side = stripped == "O-O";
        return legal_moves
            .iter()
            .find(|mv| mv.is_castling() && (mv.to.file > mv.from.file) == king_side)
            .copied()
            .ok_or(MoveTextError::NoMatchingMove {
                input: input.to_string(),
            });
    }

    let parsed = split_move_text(stripped).ok_or(MoveTextError::Syntax {
        input: input.to_string(),
    })?;

    legal_moves
        .iter()
        .find(|mv| {
            mv.from == parsed.from
                && mv.to == parsed.to
                && mv.piece.kind == parsed.kind
                && mv.is_capture() == parsed.is_capture
                && mv.promotion == parsed.promotion
        })
        .copied()
        .ok_or(MoveTextError::NoMatchingMove {
            input: input.to_string(),
        })
}

/// Print a move in the same grammar `parse_move_text` accepts.
pub fn format_move(mv: &Move) -> String {
    if mv.is_castling() {
        return if mv.to.file > mv.from.file {
            "O-O".to_string()
        } else {
            "O-O-O".to_string()
        };
    }
    let mut out = String::new();
    out.push(mv.piece.kind.to_char());
    out.push_str(&mv.from.to_string());
    if mv.is_capture() {
        out.push('x');
    }
    out.push_str(&mv.to.to_string());
    if let Some(kind) = mv.promotion {
        out.push('=');
        out.push(kind.to_char());
    }
    out
}

struct ParsedText {
    kind: PieceKind,
    from: Square,
    to: Square,
    is_capture: bool,
    promotion: Option<PieceKind>,
}

fn split_move_text(text: &str) -> Option<ParsedText> {
    let mut chars = text.chars();

    let kind = PieceKind::from_char(chars.next()?)?;
    let rest: String = chars.collect();
    let bytes = rest.as_bytes();
    if bytes.len() < 4 {
        return None;
    }

    let from: Square = rest.get(0..2)?.parse().ok()?;
    let mut cursor = 2;
    let is_capture = bytes.get(cursor) == Some(&b'x');
    if is_capture {
        cursor += 1;
    }
    let to: Square = rest.get(cursor..cursor + 2)?.parse().ok()?;
    cursor += 2;

    let promotion = match rest.get(cursor..) {
        Some("") | None => None,
        Some(tail) => {
            let kind_char = tail.strip_prefix('=')?;
            let mut tail_chars = kind_char.chars();
            let promo = PieceKind::from_char(tail_chars.next()?)?;
            if tail_chars.next().is_some() || promo == PieceKind::King || promo == PieceKind::Pawn {
                return None;
            }
            Some(promo)
        }
    };

    Some(ParsedText {
        kind,
        from,
        to,
        is_capture,
        promotion,
    })
}
