use tempo::board::BoardState;
use tempo::moves::generator::calculate_legal_moves;
use tempo::moves::notation::parse_move_text;
use tempo::search::engine::{SearchEngine, SearchOutcome};
use tempo::search::params::INF_MINUS_1000;
use tempo::status::{GameStatus, position_status};

fn engine_for(fen: &str, depth: i32, time_ms: u64) -> SearchEngine {
    let board = BoardState::from_fen(fen).unwrap();
    let mut engine = SearchEngine::with_table_capacity(board, 1 << 16);
    engine.max_search_depth = depth;
    engine.max_search_time_ms = time_ms;
    engine
}

#[test]
fn finds_the_back_rank_mate_in_one() {
    let mut engine = engine_for("6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1", 3, 30_000);

    let outcome = engine.handle_engine_turn();
    let SearchOutcome::Move(best) = outcome else {
        panic!("position has legal moves, got {outcome:?}");
    };
    assert_eq!(best.to_string(), "a1a8", "Ra1a8 is the only mate in one");

    let (_, score) = engine.last_iteration_scores()[0];
    assert!(
        score > INF_MINUS_1000,
        "mate must carry a mate score, got {score}"
    );

    assert_eq!(
        position_status(&mut engine.board),
        GameStatus::Checkmate,
        "after Ra8 the black king is mated"
    );
}

#[test]
fn scholars_mate_sequence_ends_in_checkmate() {
    let mut board = BoardState::new();
    for text in [
        "pe2e4", "pe7e5", "bf1c4", "nb8c6", "qd1h5", "ng8f6", "qh5xf7#",
    ] {
        let legal = calculate_legal_moves(&mut board);
        let mv = parse_move_text(&legal, text)
            .unwrap_or_else(|err| panic!("'{text}' should be playable: {err}"));
        board.apply_move(&mv);
    }
    assert_eq!(position_status(&mut board), GameStatus::Checkmate);
}

#[test]
fn checkmate_position_returns_the_sentinel() {
    // Black is already mated (back-rank), black to move.
    let mut engine = engine_for("R5k1/5ppp/8/8/8/8/5PPP/6K1 b - - 0 1", 3, 5_000);
    assert_eq!(engine.handle_engine_turn(), SearchOutcome::Checkmate);
}

#[test]
fn stalemate_position_returns_the_sentinel() {
    // Classic corner stalemate: black king a8, white queen c7, white king a6.
    let mut engine = engine_for("k7/2Q5/K7/8/8/8/8/8 b - - 0 1", 3, 5_000);
    assert_eq!(engine.handle_engine_turn(), SearchOutcome::Stalemate);
}

#[test]
fn engine_does_not_grab_a_defended_pawn_with_its_queen() {
    // Qxe4 wins a pawn but loses the queen to Rxe4; quiescence must see the
    // recapture even at depth 1.
    let mut engine = engine_for("k3r3/8/8/8/4p3/8/4Q3/K7 w - - 0 1", 1, 10_000);
    let outcome = engine.handle_engine_turn();
    let SearchOutcome::Move(best) = outcome else {
        panic!("position has legal moves, got {outcome:?}");
    };
    assert_ne!(best.to_string(), "e2e4", "queen takes a defended pawn");
}

#[test]
fn engine_takes_a_hanging_queen() {
    let mut engine = engine_for("k2q4/8/8/8/8/8/3R4/K7 w - - 0 1", 2, 10_000);
    let outcome = engine.handle_engine_turn();
    let SearchOutcome::Move(best) = outcome else {
        panic!("position has legal moves, got {outcome:?}");
    };
    assert_eq!(best.to_string(), "d2d8", "Rxd8 wins the queen outright");
}

#[test]
fn engine_escapes_check_with_a_legal_move() {
    // White king in check from the e8 rook; every engine reply must be legal.
    let mut engine = engine_for("4r2k/8/8/8/8/8/3P4/4K3 w - - 0 1", 3, 10_000);
    let outcome = engine.handle_engine_turn();
    let SearchOutcome::Move(best) = outcome else {
        panic!("check can be escaped, got {outcome:?}");
    };
    // The applied move left a position where White is no longer in check.
    assert!(
        !tempo::moves::attacks::king_in_check(&engine.board, tempo::board::Color::White),
        "engine played {best} and is still in check"
    );
}

#[test]
fn search_counters_accumulate() {
    let mut engine = engine_for(
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        3,
        30_000,
    );
    engine.handle_engine_turn();
    assert!(engine.nodes_visited() > 0);
    assert!(engine.leaf_nodes_visited() > 0);
    assert!(
        engine.max_iterative_search_depth() >= 3,
        "three iterations fit comfortably in the budget"
    );
}
