use crate::board::{Color, PieceKind};
use crate::square::Square;
use once_cell::sync::OnceCell;
use rand::{RngCore, SeedableRng, rngs::StdRng};

/// Fixed seed so hashes are reproducible across runs; repetition bookkeeping,
/// transposition-table contents and test fixtures all depend on that.
const ZOBRIST_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

pub struct ZobristKeys {
    /// [color][kind][square] with {White=0, Black=1} and {P,N,B,R,Q,K}={0..5}
    pub piece: [[[u64; 64]; 6]; 2],
    /// XORed in when Black is to move.
    pub side_to_move: u64,
}

/// Process-wide keys, generated on first use.
pub fn zobrist_keys() -> &'static ZobristKeys {
    static KEYS: OnceCell<ZobristKeys> = OnceCell::new();
    KEYS.get_or_init(|| generate_keys(StdRng::seed_from_u64(ZOBRIST_SEED)))
}

/// Key for one piece on one square.
#[inline(always)]
pub fn piece_key(color: Color, kind: PieceKind, sq: Square) -> u64 {
    zobrist_keys().piece[color as usize][kind as usize][sq.index()]
}

fn generate_keys(mut rng: StdRng) -> ZobristKeys {
    #[inline]
    fn non_zero(r: &mut StdRng) -> u64 {
        // avoid zero keys to reduce degenerate collisions
        let mut v = r.next_u64();
        while v == 0 {
            v = r.next_u64();
        }
        v
    }

    let mut keys = ZobristKeys {
        piece: [[[0u64; 64]; 6]; 2],
        side_to_move: 0,
    };

    for color in 0..2 {
        for kind in 0..6 {
            for sq in 0..64 {
                keys.piece[color][kind][sq] = non_zero(&mut rng);
            }
        }
    }
    keys.side_to_move = non_zero(&mut rng);

    keys
}
