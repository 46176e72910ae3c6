//! Iterative-deepening negamax with alpha-beta pruning.
//!
//! This module implements the move choice:
//! - Negamax over the shared position, made and unmade in place
//! - Alpha-beta pruning with captures searched first
//! - A Zobrist-keyed transposition table kept across iterations and calls
//! - Capture-only quiescence search at the horizon
//!
//! Scores returned by the recursion are from the point of view of the side
//! to move; [`crate::eval`] scores are White-positive and are multiplied by
//! the mover's sign.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::board::Move;
use crate::constants::{
    DEADLINE_CHECK_NODES, DEFAULT_DEPTH, DEFAULT_TT_CAPACITY, DEFAULT_ZOBRIST_SEED,
    QUIESCENCE_PLIES,
};
use crate::eval::{self, EvalWeights};
use crate::movegen::{capture_moves, legal_moves, order_moves};
use crate::position::Position;
use crate::rules;
use crate::tt::{Bound, TranspositionTable, TtEntry};
use crate::zobrist::ZobristKeys;

/// Tunable search settings.
#[derive(Clone, Debug)]
pub struct SearchOptions {
    /// Nominal depth used by [`Searcher::best_move`].
    pub max_depth: u32,
    /// Probe and store the transposition table.
    pub use_tt: bool,
    /// Cut off siblings on `alpha >= beta`. Disabling gives a full-width
    /// negamax with the same result.
    pub pruning: bool,
    /// Number of table slots.
    pub tt_capacity: usize,
    /// Seed for the Zobrist keys.
    pub zobrist_seed: u64,
    /// Abandon deeper iterations once this much time has passed.
    pub time_limit: Option<Duration>,
    /// Abandon deeper iterations after this many nodes (quiescence excluded).
    pub node_limit: Option<u64>,
    pub weights: EvalWeights,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_DEPTH,
            use_tt: true,
            pruning: true,
            tt_capacity: DEFAULT_TT_CAPACITY,
            zobrist_seed: DEFAULT_ZOBRIST_SEED,
            time_limit: None,
            node_limit: None,
            weights: EvalWeights::default(),
        }
    }
}

/// Score of a node from the mover's point of view, and the move reaching it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SearchResult {
    pub score: f64,
    pub best_move: Option<Move>,
}

impl SearchResult {
    fn leaf(score: f64) -> Self {
        Self {
            score,
            best_move: None,
        }
    }
}

/// Counters for the last search.
#[derive(Copy, Clone, Debug, Default)]
pub struct SearchStats {
    pub nodes: u64,
    pub qnodes: u64,
    pub tt_hits: u64,
    pub cutoffs: u64,
    /// Deepest fully completed iteration.
    pub depth: u32,
}

/// Search state: keys, table, and settings.
pub struct Searcher {
    options: SearchOptions,
    keys: ZobristKeys,
    tt: TranspositionTable,
    stats: SearchStats,
    deadline: Option<Instant>,
    aborted: bool,
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new(SearchOptions::default())
    }
}

impl Searcher {
    pub fn new(options: SearchOptions) -> Self {
        let keys = ZobristKeys::new(options.zobrist_seed);
        let tt = TranspositionTable::new(if options.use_tt { options.tt_capacity } else { 1 });
        Self {
            options,
            keys,
            tt,
            stats: SearchStats::default(),
            deadline: None,
            aborted: false,
        }
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    pub fn set_max_depth(&mut self, depth: u32) {
        self.options.max_depth = depth.max(1);
    }

    pub fn set_node_limit(&mut self, limit: Option<u64>) {
        self.options.node_limit = limit;
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    pub fn tt(&self) -> &TranspositionTable {
        &self.tt
    }

    /// Forget all stored results.
    pub fn clear(&mut self) {
        self.tt.clear();
    }

    /// Choose a move at the configured depth.
    pub fn best_move(&mut self, pos: &mut Position) -> Option<Move> {
        self.choose_move(pos, self.options.max_depth)
    }

    /// Choose a move for the side to move, searching up to `depth` plies.
    ///
    /// Returns `None` only when the side to move has no legal move. The
    /// position is restored before returning.
    pub fn choose_move(&mut self, pos: &mut Position, depth: u32) -> Option<Move> {
        let result = self.search(pos, depth);
        result.best_move.or_else(|| {
            let mut moves = legal_moves(pos, pos.turn());
            order_moves(&mut moves);
            moves.first().copied()
        })
    }

    /// Iterative deepening from depth 1 to `max_depth`.
    ///
    /// Each completed iteration replaces the previous result. An iteration
    /// cut short by the time or node limit is discarded.
    pub fn search(&mut self, pos: &mut Position, max_depth: u32) -> SearchResult {
        self.stats = SearchStats::default();
        self.aborted = false;
        self.deadline = self.options.time_limit.map(|limit| Instant::now() + limit);
        self.tt.new_generation();

        let mut best = SearchResult::leaf(self.static_score(pos));
        for depth in 1..=max_depth.max(1) {
            let result = self.negamax(pos, depth, 0, f64::NEG_INFINITY, f64::INFINITY);
            if self.aborted {
                debug!(depth, nodes = self.stats.nodes, "search abandoned at limit");
                break;
            }
            best = result;
            self.stats.depth = depth;
            debug!(
                depth,
                score = best.score,
                best_move = %best.best_move.map(|m| m.to_string()).unwrap_or_else(|| "-".into()),
                nodes = self.stats.nodes,
                qnodes = self.stats.qnodes,
                tt_hits = self.stats.tt_hits,
                cutoffs = self.stats.cutoffs,
                "completed iteration"
            );
        }
        best
    }

    /// Score of the position for the side to move at depth zero.
    pub fn static_score(&mut self, pos: &mut Position) -> f64 {
        self.quiescence(pos, f64::NEG_INFINITY, f64::INFINITY, QUIESCENCE_PLIES)
    }

    /// Whether the search must stop. The clock is only read when
    /// `check_clock` is set; the node budget is checked every time.
    fn should_stop(&mut self, check_clock: bool) -> bool {
        if !self.aborted {
            let over_budget = self
                .options
                .node_limit
                .is_some_and(|limit| self.stats.nodes > limit);
            let past_deadline =
                check_clock && self.deadline.is_some_and(|deadline| Instant::now() >= deadline);
            self.aborted = over_budget || past_deadline;
        }
        self.aborted
    }

    fn negamax(
        &mut self,
        pos: &mut Position,
        depth: u32,
        ply: u32,
        mut alpha: f64,
        mut beta: f64,
    ) -> SearchResult {
        self.stats.nodes += 1;
        if self.should_stop(self.stats.nodes % DEADLINE_CHECK_NODES == 0) {
            return SearchResult::leaf(0.0);
        }

        let key = self.keys.hash(pos);
        let mut hash_move = None;
        // The root always searches so that a move is returned
        if self.options.use_tt && ply > 0 {
            if let Some(entry) = self.tt.probe(key) {
                hash_move = entry.best_move;
                if entry.depth >= depth {
                    self.stats.tt_hits += 1;
                    match entry.bound {
                        Bound::Exact => return SearchResult::leaf(entry.score),
                        Bound::Lower => alpha = alpha.max(entry.score),
                        Bound::Upper => beta = beta.min(entry.score),
                    }
                    if alpha >= beta {
                        return SearchResult::leaf(entry.score);
                    }
                }
            }
        }

        if depth == 0 {
            return SearchResult::leaf(self.quiescence(pos, alpha, beta, QUIESCENCE_PLIES));
        }

        let sign = pos.turn().sign();
        let status = rules::status(pos);
        if status.is_terminal() {
            return SearchResult::leaf(sign * eval::score(pos, status, &self.options.weights));
        }

        let mut moves = legal_moves(pos, pos.turn());
        order_moves(&mut moves);
        if let Some(idx) = hash_move.and_then(|hm| moves.iter().position(|m| *m == hm)) {
            moves[..=idx].rotate_right(1);
        }

        let window_alpha = alpha;
        let mut best = SearchResult::leaf(f64::NEG_INFINITY);
        for mv in moves {
            if ply == 0 && self.should_stop(true) {
                break;
            }
            let (child_alpha, child_beta) = if self.options.pruning {
                (-beta, -alpha)
            } else {
                (f64::NEG_INFINITY, f64::INFINITY)
            };
            let score = {
                let mut child = pos.scoped(mv);
                -self.negamax(&mut child, depth - 1, ply + 1, child_alpha, child_beta).score
            };
            if self.aborted {
                return best;
            }

            if score > best.score {
                best = SearchResult {
                    score,
                    best_move: Some(mv),
                };
            }
            if score > alpha {
                alpha = score;
            }
            if self.options.pruning && alpha >= beta {
                self.stats.cutoffs += 1;
                break;
            }
        }

        if self.options.use_tt && !self.aborted {
            let bound = if best.score <= window_alpha {
                Bound::Upper
            } else if best.score >= beta {
                Bound::Lower
            } else {
                Bound::Exact
            };
            self.tt.store(TtEntry {
                key,
                depth,
                score: best.score,
                bound,
                best_move: if bound == Bound::Upper { None } else { best.best_move },
            });
        }
        best
    }

    /// Capture-only search past the horizon. Fail-hard: the result lies in
    /// `[alpha, beta]`.
    fn quiescence(&mut self, pos: &mut Position, mut alpha: f64, beta: f64, remaining: u32) -> f64 {
        self.stats.qnodes += 1;

        let status = rules::status(pos);
        let stand_pat = pos.turn().sign() * eval::score(pos, status, &self.options.weights);
        if stand_pat >= beta {
            return beta;
        }
        if stand_pat > alpha {
            alpha = stand_pat;
        }
        if remaining == 0 || status.is_terminal() {
            return alpha;
        }

        for mv in capture_moves(pos, pos.turn()) {
            let score = {
                let mut child = pos.scoped(mv);
                -self.quiescence(&mut child, -beta, -alpha, remaining - 1)
            };
            if score >= beta {
                return beta;
            }
            if score > alpha {
                alpha = score;
            }
        }
        alpha
    }
}

/// Pick a legal move uniformly at random.
pub fn random_move(pos: &Position, rng: &mut fastrand::Rng) -> Option<Move> {
    let moves = legal_moves(pos, pos.turn());
    if moves.is_empty() {
        return None;
    }
    Some(moves[rng.usize(..moves.len())])
}
