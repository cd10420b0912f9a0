use std::time::Instant;
use tempo::board::BoardState;
use tempo::moves::generator::calculate_legal_moves;
use tempo::search::engine::{SearchEngine, SearchOutcome};
use tempo::search::params::MAX_SEARCH_DEPTH;

#[test]
fn deadline_bounds_the_search_and_yields_a_legal_move() {
    let board = BoardState::new();
    let legal_before = calculate_legal_moves(&mut board.clone());

    let mut engine = SearchEngine::with_table_capacity(board, 1 << 16);
    engine.max_search_depth = MAX_SEARCH_DEPTH;
    engine.max_search_time_ms = 300;

    let started = Instant::now();
    let outcome = engine.handle_engine_turn();
    let elapsed = started.elapsed();

    let SearchOutcome::Move(best) = outcome else {
        panic!("starting position is not terminal, got {outcome:?}");
    };
    assert!(
        legal_before.contains(&best),
        "cancelled search must still return a legal move, got {best}"
    );
    assert!(
        elapsed.as_millis() < 300 + 700,
        "watchdog must stop the search near the deadline, took {elapsed:?}"
    );
    assert!(
        !engine.engine_is_searching(),
        "running flag must be lowered after the turn"
    );
}

#[test]
fn completed_iterations_report_fully_scored_root_lists() {
    let mut engine = SearchEngine::with_table_capacity(BoardState::new(), 1 << 16);
    engine.max_search_depth = 3;
    engine.max_search_time_ms = 60_000;

    engine.handle_engine_turn();

    let scores = engine.last_iteration_scores();
    assert_eq!(
        scores.len(),
        20,
        "every root move keeps a score through depth 3"
    );
    // Best first.
    for pair in scores.windows(2) {
        assert!(pair[0].1 >= pair[1].1, "root list must be sorted by score");
    }
}

#[test]
fn deeper_budgets_never_produce_an_illegal_move() {
    // A sharp middlegame: plenty of captures, checks and pins.
    let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
    for depth in 1..=3 {
        let board = BoardState::from_fen(fen).unwrap();
        let legal = calculate_legal_moves(&mut board.clone());
        let mut engine = SearchEngine::with_table_capacity(board, 1 << 16);
        engine.max_search_depth = depth;
        engine.max_search_time_ms = 60_000;

        let outcome = engine.handle_engine_turn();
        let SearchOutcome::Move(best) = outcome else {
            panic!("depth {depth}: got {outcome:?}");
        };
        assert!(
            legal.contains(&best),
            "depth {depth} played illegal move {best}"
        );
    }
}

#[test]
fn aspiration_and_full_window_agree_on_a_quiet_position() {
    let fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    let mut windowed = SearchEngine::with_table_capacity(BoardState::from_fen(fen).unwrap(), 1 << 16);
    windowed.max_search_depth = 3;
    windowed.max_search_time_ms = 60_000;
    windowed.use_aspiration_window = true;
    windowed.handle_engine_turn();

    let mut full = SearchEngine::with_table_capacity(BoardState::from_fen(fen).unwrap(), 1 << 16);
    full.max_search_depth = 3;
    full.max_search_time_ms = 60_000;
    full.use_aspiration_window = false;
    full.handle_engine_turn();

    let windowed_best = windowed.last_iteration_scores()[0].1;
    let full_best = full.last_iteration_scores()[0].1;
    assert!(
        (windowed_best - full_best).abs() <= 80,
        "aspiration windows change the work, not the assessment: {windowed_best} vs {full_best}"
    );
}
