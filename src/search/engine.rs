//! Iterative-deepening negamax search with alpha-beta pruning and the usual
//! retinue: transposition table, aspiration windows, null-move pruning,
//! razoring, futility pruning, PVS, late move reductions, quiescence with
//! delta pruning, history-ordered quiets and root-move pruning, all under a
//! cooperative deadline.

use crate::board::{BoardState, PieceKind};
use crate::moves::attacks::king_in_check;
use crate::moves::generator::{
    calculate_capture_moves, calculate_legal_moves, calculate_ordered_moves,
};
use crate::moves::types::{Move, MoveList};
use crate::search::context::HistoryTable;
use crate::search::eval::{evaluate_material, evaluate_position};
use crate::search::params::{
    ASPIRATION_WINDOWS, DEFAULT_SEARCH_TIME_MS, DEFAULT_TRANSPOSITION_TABLE_CAPACITY,
    EXTREME_LMR_THRESHOLD, INF, INF_MINUS_1000, LATE_MOVE_REDUCTION,
    LMR_EXTREME_REDUCTION_INDEX_DIVISOR, LMR_THRESHOLD, MAX_SEARCH_DEPTH,
    MIN_FUTILITY_PRUNING_PLY, MIN_LMR_DEPTH, MIN_LMR_ITERATION_DEPTH, MIN_NULL_MOVE_DEPTH,
    MIN_NULL_MOVE_ITERATION_DEPTH, MIN_RAZOR_PRUNING_PLY, MIN_ROOT_MOVE_PRUNING_DEPTH,
    NULL_MOVE_REDUCTION, ROOT_MOVE_PRUNING_INTERVAL, razor_margin,
};
use crate::search::thread_handler::ThreadHandler;
use crate::search::tt::{BoundFlag, TranspositionTable};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// What a completed engine turn produced.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// The move that was applied to the board.
    Move(Move),
    /// The side to move has no legal moves and is in check.
    Checkmate,
    /// The side to move has no legal moves and is not in check.
    Stalemate,
}

/// Per-line search state, passed by value down the recursion instead of
/// living in globals.
#[derive(Debug, Clone, Copy, Default)]
struct LineFlags {
    in_null_move_line: bool,
    in_lmr_line: bool,
    in_pvs_line: bool,
}

pub struct SearchEngine {
    pub board: BoardState,
    /// Iterative-deepening ceiling.
    pub max_search_depth: i32,
    /// Per-move deadline enforced by the watchdog.
    pub max_search_time_ms: u64,
    pub use_aspiration_window: bool,
    pub show_performance: bool,
    pub show_move_evaluations: bool,
    pub pondering_enabled: bool,

    running_search_flag: Arc<AtomicBool>,
    nodes_visited: AtomicU64,
    leaf_nodes_visited: AtomicU64,
    quiescence_nodes_visited: AtomicU64,
    best_eval_of_search_iteration: AtomicI32,
    /// Target depth of the iteration in flight; gates the depth-sensitive
    /// heuristics (null move, LMR).
    max_iterative_search_depth: AtomicI32,

    transposition_table: TranspositionTable,
    history_table: HistoryTable,
    /// Root scores of the deepest completed iteration, best first.
    last_iteration_scores: Vec<(Move, i32)>,
}

impl SearchEngine {
    pub fn new(board: BoardState) -> Self {
        SearchEngine::with_table_capacity(board, DEFAULT_TRANSPOSITION_TABLE_CAPACITY)
    }

    pub fn with_table_capacity(board: BoardState, table_capacity: usize) -> Self {
        SearchEngine {
            board,
            max_search_depth: MAX_SEARCH_DEPTH,
            max_search_time_ms: DEFAULT_SEARCH_TIME_MS,
            use_aspiration_window: true,
            show_performance: false,
            show_move_evaluations: false,
            pondering_enabled: false,
            running_search_flag: Arc::new(AtomicBool::new(false)),
            nodes_visited: AtomicU64::new(0),
            leaf_nodes_visited: AtomicU64::new(0),
            quiescence_nodes_visited: AtomicU64::new(0),
            best_eval_of_search_iteration: AtomicI32::new(-INF),
            max_iterative_search_depth: AtomicI32::new(0),
            transposition_table: TranspositionTable::new(table_capacity),
            history_table: HistoryTable::new(),
            last_iteration_scores: Vec::new(),
        }
    }

    /// Search under the deadline, apply the best move from the deepest
    /// completed iteration exactly once, and return it. Terminal positions
    /// return the checkmate/stalemate sentinel instead. If not even depth 1
    /// completed before the deadline, the first legal move is played.
    pub fn handle_engine_turn(&mut self) -> SearchOutcome {
        let legal_moves = calculate_legal_moves(&mut self.board);
        if legal_moves.is_empty() {
            return if king_in_check(&self.board, self.board.side_to_move) {
                SearchOutcome::Checkmate
            } else {
                SearchOutcome::Stalemate
            };
        }

        let deadline = Duration::from_millis(self.max_search_time_ms);
        let handler = ThreadHandler::new(Arc::clone(&self.running_search_flag));
        let best = handler.run_with_deadline(deadline, || self.run_iterative_deepening_search());

        let best_move = best.unwrap_or(legal_moves[0]);
        self.board.apply_move(&best_move);
        SearchOutcome::Move(best_move)
    }

    /// Deadline-bounded transposition-table warming on the current position;
    /// no move is executed.
    pub fn ponder(&mut self) {
        if !self.pondering_enabled {
            return;
        }
        let deadline = Duration::from_millis(self.max_search_time_ms);
        let handler = ThreadHandler::new(Arc::clone(&self.running_search_flag));
        handler.run_with_deadline(deadline, || {
            let _ = self.run_iterative_deepening_search();
        });
    }

    /// Cooperative cancellation: the search unwinds at the next node check.
    pub fn stop_search(&self) {
        self.running_search_flag.store(false, Ordering::Release);
    }

    /// Clone of the running flag, for cancelling from another thread.
    pub fn running_flag_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running_search_flag)
    }

    pub fn engine_is_searching(&self) -> bool {
        self.running_search_flag.load(Ordering::Acquire)
    }

    pub fn clear_transposition_table(&mut self) {
        self.transposition_table.clear();
    }

    pub fn nodes_visited(&self) -> u64 {
        self.nodes_visited.load(Ordering::Relaxed)
    }

    pub fn leaf_nodes_visited(&self) -> u64 {
        self.leaf_nodes_visited.load(Ordering::Relaxed)
    }

    pub fn quiescence_nodes_visited(&self) -> u64 {
        self.quiescence_nodes_visited.load(Ordering::Relaxed)
    }

    pub fn best_eval_of_search_iteration(&self) -> i32 {
        self.best_eval_of_search_iteration.load(Ordering::Relaxed)
    }

    pub fn max_iterative_search_depth(&self) -> i32 {
        self.max_iterative_search_depth.load(Ordering::Relaxed)
    }

    /// Root scores of the deepest completed iteration, best first.
    pub fn last_iteration_scores(&self) -> &[(Move, i32)] {
        &self.last_iteration_scores
    }

    #[inline(always)]
    fn running(&self) -> bool {
        self.running_search_flag.load(Ordering::Acquire)
    }

    /// Iterative deepening over the root-move list. Every completed iteration
    /// yields a fully scored list; a partial iteration is discarded entirely.
    fn run_iterative_deepening_search(&mut self) -> Option<Move> {
        self.nodes_visited.store(0, Ordering::Relaxed);
        self.leaf_nodes_visited.store(0, Ordering::Relaxed);
        self.quiescence_nodes_visited.store(0, Ordering::Relaxed);

        let mut root_moves: Vec<(Move, i32)> =
            calculate_ordered_moves(&self.board, &self.history_table)
                .iter()
                .map(|mv| (*mv, 0))
                .collect();
        root_moves.retain(|(mv, _)| {
            let mover = mv.piece.color;
            self.board.apply_move(mv);
            let legal = !king_in_check(&self.board, mover);
            self.board.undo_move();
            legal
        });
        if root_moves.is_empty() {
            return None;
        }

        let mut best: Option<(Move, i32)> = None;

        'deepening: for iteration_depth in 1..=self.max_search_depth {
            let iteration_start = Instant::now();
            self.max_iterative_search_depth
                .store(iteration_depth, Ordering::Relaxed);
            self.best_eval_of_search_iteration
                .store(-INF, Ordering::Relaxed);

            let mut scores: Vec<(Move, i32)> = Vec::with_capacity(root_moves.len());
            for (mv, previous_score) in &root_moves {
                if !self.running() {
                    break 'deepening;
                }
                self.board.apply_move(mv);
                let eval = if iteration_depth >= 2 && self.use_aspiration_window {
                    self.search_with_aspiration_window(iteration_depth - 1, *previous_score)
                } else {
                    self.search_full_window(iteration_depth - 1)
                };
                self.board.undo_move();
                if !self.running() {
                    break 'deepening;
                }
                scores.push((*mv, eval));
                self.best_eval_of_search_iteration
                    .fetch_max(eval, Ordering::Relaxed);
            }

            scores.sort_by_key(|&(_, score)| -score);
            best = scores.first().copied();
            self.last_iteration_scores = scores.clone();
            self.report_iteration(iteration_depth, iteration_start, best);

            root_moves = scores;
            if iteration_depth >= MIN_ROOT_MOVE_PRUNING_DEPTH
                && iteration_depth % ROOT_MOVE_PRUNING_INTERVAL == 0
                && root_moves.len() > 1
            {
                // The bottom half of the scored list rarely recovers.
                root_moves.truncate(root_moves.len().div_ceil(2));
            }

            if let Some((_, score)) = best
                && score > INF_MINUS_1000
            {
                // Mate found; deeper iterations cannot improve on it.
                break;
            }
        }

        self.history_table.decay();
        best.map(|(mv, _)| mv)
    }

    /// Search a root move with progressively wider windows around its score
    /// from the previous iteration; the final window is full-width.
    fn search_with_aspiration_window(&mut self, depth: i32, previous_score: i32) -> i32 {
        let mut eval = 0;
        for window in ASPIRATION_WINDOWS {
            if !self.running() {
                return 0;
            }
            let alpha = clamp_score(previous_score as i64 - window as i64);
            let beta = clamp_score(previous_score as i64 + window as i64);
            eval = -self.negamax(-beta, -alpha, depth, LineFlags::default());
            if eval > alpha && eval < beta {
                return eval;
            }
            // Fail-high or fail-low: re-search with the next wider window.
        }
        eval
    }

    fn search_full_window(&mut self, depth: i32) -> i32 {
        -self.negamax(-INF, INF, depth, LineFlags::default())
    }

    /// Negamax alpha-beta over one node. Returns a score relative to the side
    /// to move of the current board position.
    fn negamax(&mut self, mut alpha: i32, beta: i32, depth: i32, flags: LineFlags) -> i32 {
        if !self.running() {
            // Unwind; the caller discards the partial iteration.
            return 0;
        }
        self.nodes_visited.fetch_add(1, Ordering::Relaxed);

        // A position already on the visited stack is a draw by repetition.
        if self.board.current_state_has_been_visited() {
            return 0;
        }

        let hash = self.board.hash();
        let original_alpha = alpha;

        let mut table_move_index: Option<usize> = None;
        if let Some(probe) = self.transposition_table.retrieve(hash, false) {
            table_move_index = probe.best_move_index;
            if probe.depth >= depth {
                match probe.flag {
                    BoundFlag::Exact => return probe.score,
                    BoundFlag::LowerBound if probe.score >= beta => return probe.score,
                    BoundFlag::UpperBound if probe.score <= alpha => return probe.score,
                    _ => {}
                }
            }
        }

        if depth <= 0 {
            self.leaf_nodes_visited.fetch_add(1, Ordering::Relaxed);
            return self.quiescence_search(alpha, beta);
        }

        let side = self.board.side_to_move;
        let in_check = king_in_check(&self.board, side);
        let iteration_depth = self.max_iterative_search_depth.load(Ordering::Relaxed);

        // Null move: if passing the turn still beats beta, a real move will
        // too. One null move per line, never while in check.
        if !flags.in_null_move_line
            && !in_check
            && depth >= MIN_NULL_MOVE_DEPTH
            && iteration_depth >= MIN_NULL_MOVE_ITERATION_DEPTH
        {
            self.board.apply_null_move();
            let null_flags = LineFlags {
                in_null_move_line: true,
                ..flags
            };
            let eval = -self.negamax(
                -beta,
                clamp_score(-(beta as i64) + 1),
                depth - 1 - NULL_MOVE_REDUCTION,
                null_flags,
            );
            self.board.undo_null_move();
            if self.running() && eval >= beta {
                return beta;
            }
        }

        let standing_material = evaluate_material(&self.board);

        // Razoring: a node too far below alpha for its remaining depth drops
        // straight into quiescence.
        if depth <= MIN_RAZOR_PRUNING_PLY
            && !in_check
            && standing_material.saturating_add(razor_margin(depth)) < alpha
        {
            return self.quiescence_search(alpha, beta);
        }

        let mut moves = calculate_ordered_moves(&self.board, &self.history_table);
        promote_table_move(&mut moves, table_move_index);

        let mut max_eval = -INF;
        let mut best_move_index: Option<usize> = None;
        let mut moves_searched = 0usize;

        for (index, mv) in moves.iter().enumerate() {
            if !self.running() {
                return 0;
            }

            // Capturing the king means the previous ply was illegal; this
            // line refutes it outright.
            if mv.captured.is_some_and(|(victim, _)| victim.kind == PieceKind::King) {
                return INF;
            }

            // Futility: a quiet move cannot close a hopeless material gap at
            // frontier depths. Only after one searched move, so mate and
            // stalemate detection below stays sound.
            if moves_searched > 0
                && depth <= MIN_FUTILITY_PRUNING_PLY
                && !in_check
                && mv.captured.is_none()
                && mv.promotion.is_none()
                && standing_material.saturating_add(razor_margin(depth)) < alpha
            {
                continue;
            }

            self.board.apply_move(mv);
            if king_in_check(&self.board, side) {
                // Pseudo-legal move left its own king in check.
                self.board.undo_move();
                continue;
            }
            let eval = self.search_move(moves_searched, depth, alpha, beta, flags);
            self.board.undo_move();
            moves_searched += 1;

            if eval > max_eval {
                max_eval = eval;
                best_move_index = Some(index);
            }
            if eval > alpha {
                alpha = eval;
            }
            if alpha >= beta {
                if mv.captured.is_none() {
                    self.history_table.record_beta_cutoff(mv, depth);
                }
                break;
            }
        }

        if !self.running() {
            return 0;
        }

        if moves_searched == 0 {
            // Every reply left the king in check (or none existed): mate if
            // the king is attacked now, stalemate otherwise.
            max_eval = if in_check { -INF } else { 0 };
        }

        // Shift mate scores one step toward zero per ply so shorter mates win
        // the comparison and the engine walks the sequence forward.
        if max_eval > INF_MINUS_1000 {
            max_eval -= 1;
        } else if max_eval < -INF_MINUS_1000 {
            max_eval += 1;
        }

        let flag = if max_eval >= beta {
            BoundFlag::LowerBound
        } else if max_eval <= original_alpha {
            BoundFlag::UpperBound
        } else {
            BoundFlag::Exact
        };
        self.transposition_table
            .store(hash, depth, max_eval, flag, best_move_index, false);

        max_eval
    }

    /// PVS + LMR treatment of a single already-applied move. The first
    /// searched move gets the full window; later moves are scouted with a
    /// null window (reduced when late) and re-searched on fail-high.
    fn search_move(
        &mut self,
        searched_index: usize,
        depth: i32,
        alpha: i32,
        beta: i32,
        flags: LineFlags,
    ) -> i32 {
        if searched_index == 0 {
            let pv_flags = LineFlags {
                in_pvs_line: true,
                ..flags
            };
            return -self.negamax(-beta, -alpha, depth - 1, pv_flags);
        }

        // No reductions on the principal variation and no nested reductions;
        // late siblings elsewhere get searched shallower.
        let iteration_depth = self.max_iterative_search_depth.load(Ordering::Relaxed);
        let mut reduction = 0;
        if searched_index > LMR_THRESHOLD
            && depth >= MIN_LMR_DEPTH
            && iteration_depth >= MIN_LMR_ITERATION_DEPTH
            && !flags.in_lmr_line
            && !flags.in_pvs_line
        {
            reduction = LATE_MOVE_REDUCTION;
            if searched_index > EXTREME_LMR_THRESHOLD {
                reduction += (searched_index / LMR_EXTREME_REDUCTION_INDEX_DIVISOR) as i32;
            }
        }

        let scout_flags = LineFlags {
            in_lmr_line: flags.in_lmr_line || reduction > 0,
            ..flags
        };
        let null_beta = clamp_score(-(alpha as i64));
        let null_alpha = clamp_score(-(alpha as i64) - 1);
        let mut eval = -self.negamax(null_alpha, null_beta, depth - 1 - reduction, scout_flags);

        if eval > alpha && self.running() {
            if reduction > 0 {
                // The reduced scout beat alpha: repeat at full depth before
                // trusting it.
                eval = -self.negamax(null_alpha, null_beta, depth - 1, flags);
            }
            if eval > alpha && eval < beta {
                // Inside the window: the null-window result is only a bound,
                // re-search with the real window.
                eval = -self.negamax(-beta, -alpha, depth - 1, flags);
            }
        }
        eval
    }

    /// Capture-only extension past the nominal horizon so the leaf score is
    /// quiet. Keeps its own transposition slot.
    fn quiescence_search(&mut self, mut alpha: i32, beta: i32) -> i32 {
        if !self.running() {
            return 0;
        }
        self.quiescence_nodes_visited.fetch_add(1, Ordering::Relaxed);

        let hash = self.board.hash();
        let original_alpha = alpha;

        let mut table_move_index: Option<usize> = None;
        if let Some(probe) = self.transposition_table.retrieve(hash, true) {
            table_move_index = probe.best_move_index;
            match probe.flag {
                BoundFlag::Exact => return probe.score,
                BoundFlag::LowerBound if probe.score >= beta => return probe.score,
                BoundFlag::UpperBound if probe.score <= alpha => return probe.score,
                _ => {}
            }
        }

        let standing_pat = evaluate_position(&self.board);
        if standing_pat >= beta {
            return beta;
        }
        if standing_pat > alpha {
            alpha = standing_pat;
        }

        let mut moves = calculate_capture_moves(&self.board);
        promote_table_move(&mut moves, table_move_index);

        let mut best_move_index: Option<usize> = None;

        for (index, mv) in moves.iter().enumerate() {
            if !self.running() {
                return 0;
            }

            let Some((victim, _)) = mv.captured else {
                continue;
            };
            if victim.kind == PieceKind::King {
                return INF;
            }

            // Delta pruning: even winning this piece plus a whole queen of
            // positional swing would not reach alpha. Off in the endgame,
            // where thin material makes such swings normal.
            if !self.board.is_end_game
                && standing_pat
                    .saturating_add(victim.kind.value())
                    .saturating_add(PieceKind::Queen.value())
                    < alpha
            {
                continue;
            }

            self.board.apply_move(mv);
            let eval = -self.quiescence_search(-beta, -alpha);
            self.board.undo_move();

            if eval > alpha {
                alpha = eval;
                best_move_index = Some(index);
            }
            if alpha >= beta {
                self.transposition_table.store(
                    hash,
                    0,
                    beta,
                    BoundFlag::LowerBound,
                    best_move_index,
                    true,
                );
                return beta;
            }
        }

        let flag = if alpha <= original_alpha {
            BoundFlag::UpperBound
        } else {
            BoundFlag::Exact
        };
        self.transposition_table
            .store(hash, 0, alpha, flag, best_move_index, true);
        alpha
    }

    fn report_iteration(&self, depth: i32, started: Instant, best: Option<(Move, i32)>) {
        let elapsed = started.elapsed();
        let nodes = self.nodes_visited();
        let leaf_nodes = self.leaf_nodes_visited();
        let quiescence_nodes = self.quiescence_nodes_visited();
        let best_score = best.map(|(_, score)| score).unwrap_or(-INF);

        tracing::info!(
            depth,
            nodes,
            leaf_nodes,
            quiescence_nodes,
            elapsed_ms = elapsed.as_millis() as u64,
            best_score,
            "search iteration complete"
        );

        if self.show_performance {
            let elapsed_ms = elapsed.as_millis().max(1) as u64;
            println!(
                "depth {depth}: {nodes} nodes ({leaf_nodes} leaf, {quiescence_nodes} quiescence) \
                 in {elapsed_ms}ms, {} kN/s",
                nodes / elapsed_ms
            );
        }
        if self.show_move_evaluations
            && let Some((mv, score)) = best
        {
            println!("depth {depth}: best {mv} score {score}");
        }
    }
}

/// Bring the table's remembered best move to the front of the list, keeping
/// `list_index` consistent with the final order.
fn promote_table_move(moves: &mut MoveList, table_move_index: Option<usize>) {
    if let Some(index) = table_move_index
        && index > 0
        && index < moves.len()
    {
        let best = moves.remove(index);
        moves.insert(0, best);
        for (position, mv) in moves.iter_mut().enumerate() {
            mv.list_index = position;
        }
    }
}

#[inline(always)]
fn clamp_score(value: i64) -> i32 {
    value.clamp(-(INF as i64), INF as i64) as i32
}
