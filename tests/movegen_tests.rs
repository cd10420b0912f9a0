use tempo::board::{BoardState, PieceKind};
use tempo::moves::generator::{
    calculate_capture_moves, calculate_legal_moves, calculate_possible_moves,
};
use tempo::moves::types::Move;

fn contains_text(moves: &[Move], text: &str) -> bool {
    moves.iter().any(|mv| mv.to_string() == text)
}

#[test]
fn starting_position_has_twenty_moves() {
    let board = BoardState::new();
    let moves = calculate_possible_moves(&board);
    assert_eq!(moves.len(), 20);
}

#[test]
fn generator_emits_no_duplicates() {
    let board =
        BoardState::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
            .unwrap();
    let moves = calculate_possible_moves(&board);
    for (i, a) in moves.iter().enumerate() {
        for b in moves.iter().skip(i + 1) {
            assert_ne!(a, b, "duplicate move {a}");
        }
    }
}

#[test]
fn every_capture_names_an_enemy_victim() {
    let board =
        BoardState::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
            .unwrap();
    for mv in calculate_capture_moves(&board).iter() {
        let (victim, _) = mv.captured.expect("capture list move carries a victim");
        assert_ne!(victim.color, mv.piece.color, "{mv} captures its own side");
    }
}

#[test]
fn capture_only_mode_is_a_subset_of_full_generation() {
    let board =
        BoardState::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
            .unwrap();
    let all = calculate_possible_moves(&board);
    let captures = calculate_capture_moves(&board);
    assert!(!captures.is_empty());
    for mv in captures.iter() {
        assert!(mv.is_capture());
        assert!(all.contains(mv), "{mv} missing from full generation");
    }
}

#[test]
fn en_passant_is_generated_from_the_fen_target() {
    let board =
        BoardState::from_fen("rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 1")
            .unwrap();
    let moves = calculate_possible_moves(&board);
    let ep = moves
        .iter()
        .find(|mv| mv.is_en_passant)
        .expect("e5xd6 en passant must be generated");
    assert_eq!(ep.to_string(), "e5d6");
    let (victim, victim_square) = ep.captured.unwrap();
    assert_eq!(victim.kind, PieceKind::Pawn);
    assert_eq!(victim_square.to_string(), "d5");
}

#[test]
fn en_passant_requires_an_immediately_preceding_double_step() {
    // Same placement, but no en-passant target: the double step is stale.
    let board =
        BoardState::from_fen("rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq - 0 1")
            .unwrap();
    let moves = calculate_possible_moves(&board);
    assert!(
        moves.iter().all(|mv| !mv.is_en_passant),
        "no en passant without the double-step record"
    );
}

#[test]
fn promotions_expand_into_four_moves() {
    let board = BoardState::from_fen("k7/4P3/8/8/8/8/8/K7 w - - 0 1").unwrap();
    let moves = calculate_possible_moves(&board);
    let promotions: Vec<&Move> = moves.iter().filter(|mv| mv.promotion.is_some()).collect();
    assert_eq!(promotions.len(), 4);
    for kind in [
        PieceKind::Queen,
        PieceKind::Rook,
        PieceKind::Bishop,
        PieceKind::Knight,
    ] {
        assert!(
            promotions.iter().any(|mv| mv.promotion == Some(kind)),
            "missing promotion to {kind:?}"
        );
    }
}

#[test]
fn castling_through_an_attacked_square_is_not_generated() {
    // Black rook on f2 covers f1: king side is barred, queen side is fine.
    let board = BoardState::from_fen("r3k2r/8/8/8/8/8/5r2/R3K2R w KQkq - 0 1").unwrap();
    let moves = calculate_legal_moves(&mut board.clone());
    assert!(!contains_text(&moves, "e1g1"), "O-O crosses attacked f1");
    assert!(contains_text(&moves, "e1c1"), "O-O-O path is clear and safe");
}

#[test]
fn castling_while_in_check_is_not_generated() {
    let board = BoardState::from_fen("r3k2r/8/8/8/8/8/4r3/R3K2R w KQkq - 0 1").unwrap();
    let moves = calculate_possible_moves(&board);
    assert!(!contains_text(&moves, "e1g1"));
    assert!(!contains_text(&moves, "e1c1"));
}

#[test]
fn castling_through_an_occupied_square_is_not_generated() {
    let board = BoardState::from_fen("r3k2r/8/8/8/8/8/8/RN2K2R w KQkq - 0 1").unwrap();
    let moves = calculate_possible_moves(&board);
    assert!(
        !contains_text(&moves, "e1c1"),
        "b1 knight blocks the queen-side rook path"
    );
    assert!(contains_text(&moves, "e1g1"));
}

#[test]
fn moved_rook_forfeits_castling() {
    let mut board = BoardState::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
    let legal = calculate_legal_moves(&mut board);
    let rook_shuffle = legal
        .iter()
        .find(|mv| mv.to_string() == "h1g1")
        .copied()
        .expect("h1g1 is legal");
    board.apply_move(&rook_shuffle);

    let reply = calculate_legal_moves(&mut board)
        .iter()
        .find(|mv| mv.to_string() == "a8b8")
        .copied()
        .expect("a8b8 is legal");
    board.apply_move(&reply);

    let moves = calculate_possible_moves(&board);
    assert!(!contains_text(&moves, "e1g1"), "king-side rook has moved");
    assert!(contains_text(&moves, "e1c1"), "queen-side castle is unaffected");
}

#[test]
fn pinned_piece_moves_are_pseudo_legal_but_filtered() {
    // The d2 knight is pinned against the king by the d8 rook.
    let board = BoardState::from_fen("3r3k/8/8/8/8/8/3N4/3K4 w - - 0 1").unwrap();
    let pseudo = calculate_possible_moves(&board);
    assert!(
        pseudo.iter().any(|mv| mv.piece.kind == PieceKind::Knight),
        "generator leaves pin filtering to legality"
    );
    let legal = calculate_legal_moves(&mut board.clone());
    assert!(
        legal.iter().all(|mv| mv.piece.kind != PieceKind::Knight),
        "legal list must drop every pinned-knight move"
    );
}
