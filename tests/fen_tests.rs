use tempo::board::{BoardState, Color, FenError, PieceKind};
use tempo::moves::generator::calculate_legal_moves;
use tempo::moves::notation::parse_move_text;
use tempo::square::Square;

const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[test]
fn starting_position_round_trips() {
    let board = BoardState::from_fen(START_FEN).unwrap();
    assert_eq!(board.to_fen(), START_FEN);
    assert_eq!(
        board.hash(),
        BoardState::new().hash(),
        "FEN setup must hash like the built-in start"
    );
    assert_eq!(BoardState::new().to_fen(), START_FEN);
}

#[test]
fn en_passant_target_round_trips_and_plays() {
    let fen = "rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 1";
    let mut board = BoardState::from_fen(fen).unwrap();
    assert_eq!(board.to_fen(), fen);

    let legal = calculate_legal_moves(&mut board);
    let ep = parse_move_text(&legal, "pe5xd6").expect("en passant must be offered");
    assert!(ep.is_en_passant);

    board.apply_move(&ep);
    let d6: Square = "d6".parse().unwrap();
    let d5: Square = "d5".parse().unwrap();
    assert_eq!(
        board.piece_at(d6).map(|p| (p.kind, p.color)),
        Some((PieceKind::Pawn, Color::White))
    );
    assert!(board.piece_at(d5).is_none());

    board.undo_move();
    assert_eq!(board.to_fen(), fen, "undo must restore the input position bit for bit");
}

#[test]
fn fullmove_and_side_fields_are_respected() {
    let board = BoardState::from_fen("4k3/8/8/8/8/8/8/4K3 b - - 0 42").unwrap();
    assert_eq!(board.side_to_move, Color::Black);
    assert_eq!(board.fullmove_number, 42);
}

#[test]
fn castling_rights_control_has_moved_flags() {
    // Only white king side granted: the a1 rook counts as moved.
    let board = BoardState::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w K - 0 1").unwrap();
    let h1: Square = "h1".parse().unwrap();
    let a1: Square = "a1".parse().unwrap();
    assert!(!board.piece_at(h1).unwrap().has_moved);
    assert!(board.piece_at(a1).unwrap().has_moved);
    assert_eq!(board.to_fen(), "r3k2r/8/8/8/8/8/8/R3K2R w K - 0 1");
}

#[test]
fn wrong_field_count_is_rejected() {
    assert_eq!(
        BoardState::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -"),
        Err(FenError::WrongFieldCount { found: 4 })
    );
}

#[test]
fn bad_rank_shapes_are_rejected() {
    assert!(matches!(
        BoardState::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP w KQkq - 0 1"),
        Err(FenError::BadRankCount { .. })
    ));
    assert!(matches!(
        BoardState::from_fen("rnbqkbnr/pppppppp/9/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
        Err(FenError::InvalidPieceChar { .. }) | Err(FenError::BadRankWidth { .. })
    ));
    assert!(matches!(
        BoardState::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNRR w KQkq - 0 1"),
        Err(FenError::BadRankWidth { .. })
    ));
}

#[test]
fn invalid_piece_characters_are_rejected() {
    assert!(matches!(
        BoardState::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNX w KQkq - 0 1"),
        Err(FenError::InvalidPieceChar { ch: 'X' })
    ));
}

#[test]
fn king_count_is_validated() {
    assert!(matches!(
        BoardState::from_fen("rnbq1bnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w - - 0 1"),
        Err(FenError::BadKingCount { color: Color::Black, count: 0 })
    ));
    assert!(matches!(
        BoardState::from_fen("rnbqkbnr/pppppppp/8/8/7k/8/PPPPPPPP/RNBQKBNR w - - 0 1"),
        Err(FenError::BadKingCount { color: Color::Black, count: 2 })
    ));
}

#[test]
fn oversized_armies_are_rejected() {
    // 33 pieces: the full start position plus one extra queen.
    assert!(matches!(
        BoardState::from_fen("rnbqkbnr/pppppppp/8/3Q4/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
        Err(FenError::TooManyPieces { count: 33 })
    ));
}

#[test]
fn inconsistent_castling_rights_are_rejected() {
    // Right granted but the rook is elsewhere.
    assert!(matches!(
        BoardState::from_fen("r3k2r/8/8/8/8/8/8/R3K1R1 w K - 0 1"),
        Err(FenError::CastlingRightsInconsistent { right: 'K' })
    ));
    // Right granted but the king is off its home square.
    assert!(matches!(
        BoardState::from_fen("r3k2r/8/8/8/8/8/8/R4K1R w K - 0 1"),
        Err(FenError::CastlingRightsInconsistent { right: 'K' })
    ));
}

#[test]
fn en_passant_targets_are_validated() {
    assert!(matches!(
        BoardState::from_fen("4k3/8/8/8/8/8/8/4K3 w - e5 0 1"),
        Err(FenError::InvalidEnPassantTarget { .. })
    ));
    // Target square behind no pawn.
    assert!(matches!(
        BoardState::from_fen("4k3/8/8/8/8/8/8/4K3 w - d6 0 1"),
        Err(FenError::EnPassantWithoutPawn { .. })
    ));
}

#[test]
fn side_not_to_move_may_not_be_in_check() {
    // White to move, but the black king already stands in check: illegal.
    assert_eq!(
        BoardState::from_fen("4k3/8/8/8/8/8/8/4RK2 w - - 0 1").map(|_| ()),
        Err(FenError::OppositeKingInCheck)
    );
}

#[test]
fn clock_fields_must_be_numeric() {
    assert!(matches!(
        BoardState::from_fen("4k3/8/8/8/8/8/8/4K3 w - - x 1"),
        Err(FenError::InvalidClock { .. })
    ));
    assert!(matches!(
        BoardState::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 y"),
        Err(FenError::InvalidClock { .. })
    ));
}

#[test]
fn midgame_positions_round_trip() {
    let fens = [
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 0 8",
    ];
    for fen in fens {
        let board = BoardState::from_fen(fen).unwrap();
        assert_eq!(board.to_fen(), fen, "round-trip mismatch");
    }
}
