//! End-to-end tests of the public API.
//!
//! Positions are built from diagrams (row 0 first, `W`, `B`, `.`) or from
//! move sequences in coordinate notation.

use std::collections::HashSet;

use fianco_rs::board::{Color, Move, Square};
use fianco_rs::constants::TERMINAL_BONUS;
use fianco_rs::eval;
use fianco_rs::movegen::{capture_moves, legal_moves};
use fianco_rs::position::{CapturePolicy, Position};
use fianco_rs::protocol::ProtocolEngine;
use fianco_rs::rules::{self, GameStatus};
use fianco_rs::search::{SearchOptions, Searcher, random_move};
use fianco_rs::EngineError;

// =============================================================================
// Helper functions
// =============================================================================

fn sq(row: usize, col: usize) -> Square {
    Square::new(row, col)
}

/// Play a sequence of moves from the starting position.
fn setpos(moves: &[&str]) -> Position {
    let mut pos = Position::new();
    for text in moves {
        let mv: Move = text.parse().unwrap_or_else(|e| panic!("bad notation {text}: {e}"));
        if let Err(e) = pos.apply_move(mv) {
            panic!("Illegal move {text} in setpos: {e}");
        }
    }
    pos
}

/// Format moves for assertion messages
fn format_moves(moves: &[Move]) -> String {
    moves.iter().map(Move::to_string).collect::<Vec<_>>().join(" ")
}

fn searcher(use_tt: bool, pruning: bool) -> Searcher {
    Searcher::new(SearchOptions {
        use_tt,
        pruning,
        tt_capacity: 1 << 16,
        ..SearchOptions::default()
    })
}

/// A middlegame with captures available for both sides.
const SKIRMISH: &str = "
    B B . B B . B B B
    . B . . . . . B .
    . . B . . . . . .
    . . . B . B . . .
    . . . . W . . . .
    . . . W . . . . .
    . . W . . . W . .
    . W . . . . . W .
    W W W . W W . W W
";

/// Few pieces, no captures for either side yet.
const ENDGAME: &str = "
    . . . . . . . . B
    . . . . . . . . .
    . . B . . . . . .
    . . . . . . . . .
    . . . . . . . . .
    . . . . . . . . .
    . . . . . W . . .
    . . . . . . . . .
    W . . . . . . . .
";

// =============================================================================
// Starting position and notation
// =============================================================================

#[test]
fn test_start_position_layout() {
    let pos = Position::new();
    assert_eq!(pos.turn(), Color::White);
    assert_eq!(pos.count(Color::White), 15);
    assert_eq!(pos.count(Color::Black), 15);
    assert_eq!(pos.policy(), CapturePolicy::Mandatory);
    assert_eq!(rules::status(&pos), GameStatus::Ongoing);

    for col in 0..9 {
        assert_eq!(pos.piece_at(sq(0, col)).map(|p| p.color()), Some(Color::Black));
        assert_eq!(pos.piece_at(sq(8, col)).map(|p| p.color()), Some(Color::White));
    }
}

#[test]
fn test_start_position_has_only_translations() {
    let pos = Position::new();
    let moves = legal_moves(&pos, Color::White);
    assert!(capture_moves(&pos, Color::Black).is_empty());

    // Every empty square one step sideways or forward from a White piece
    let mut expected = HashSet::new();
    for (from, piece) in pos.pieces() {
        if piece.color() != Color::White {
            continue;
        }
        for (dr, dc) in [(0, -1), (-1, 0), (0, 1)] {
            if let Some(to) = from.offset(dr, dc).filter(|&to| pos.is_empty(to)) {
                expected.insert(Move::translation(from, to));
            }
        }
    }
    let generated: HashSet<Move> = moves.iter().copied().collect();

    assert_eq!(moves.len(), 25, "[{}]", format_moves(&moves));
    assert_eq!(generated.len(), moves.len(), "duplicate moves generated");
    assert_eq!(generated, expected);
    assert!(moves.iter().all(|m| !m.capture));
}

#[test]
fn test_notation_matches_board() {
    let pos = setpos(&["d4-d5"]);
    assert_eq!(pos.piece_at(sq(4, 3)).map(|p| p.color()), Some(Color::White));
    assert!(pos.is_empty(sq(5, 3)));
    assert_eq!(pos.last_move().map(|m| m.to_string()), Some("d4-d5".to_string()));
    assert_eq!(pos.turn(), Color::Black);
}

#[test]
fn test_diagram_matches_piece_list() {
    let pos = Position::from_diagram(ENDGAME, Color::White).unwrap();
    let listed = Position::with_pieces(
        Color::White,
        &[sq(6, 5), sq(8, 0)],
        &[sq(0, 8), sq(2, 2)],
    );
    assert_eq!(pos, listed);

    let err = Position::from_diagram(". . .", Color::White).unwrap_err();
    assert!(matches!(err, EngineError::MalformedNotation(_)));
}

// =============================================================================
// Captures
// =============================================================================

#[test]
fn test_capture_direction_depends_on_color() {
    // A piece straight ahead cannot be captured
    let pos = Position::with_pieces(Color::White, &[sq(2, 4)], &[sq(3, 4)]);
    assert!(capture_moves(&pos, Color::White).is_empty());

    // Diagonally forward it can
    let pos = Position::with_pieces(Color::White, &[sq(4, 4)], &[sq(3, 5)]);
    let captures = capture_moves(&pos, Color::White);
    assert_eq!(captures, vec![Move::jump(sq(4, 4), sq(2, 6))]);

    // Black jumps downwards
    let pos = Position::with_pieces(Color::Black, &[sq(5, 3)], &[sq(4, 4)]);
    assert_eq!(capture_moves(&pos, Color::Black), vec![Move::jump(sq(4, 4), sq(6, 2))]);
}

#[test]
fn test_cannot_jump_own_piece_or_into_occupied_square() {
    let pos = Position::with_pieces(Color::White, &[sq(4, 4), sq(3, 5)], &[sq(0, 0)]);
    assert!(capture_moves(&pos, Color::White).is_empty());

    let pos = Position::with_pieces(Color::White, &[sq(4, 4), sq(2, 6)], &[sq(3, 5)]);
    assert!(capture_moves(&pos, Color::White).is_empty());
}

#[test]
fn test_mandatory_capture_restricts_moves() {
    let pos = Position::with_pieces(Color::White, &[sq(4, 4), sq(8, 0)], &[sq(3, 5), sq(0, 8)]);
    let moves = legal_moves(&pos, Color::White);
    assert_eq!(moves, vec![Move::jump(sq(4, 4), sq(2, 6))]);

    let relaxed = pos.with_policy(CapturePolicy::Preferred);
    let moves = legal_moves(&relaxed, Color::White);
    assert!(moves.len() > 1);
    assert!(moves.contains(&Move::jump(sq(4, 4), sq(2, 6))));
}

#[test]
fn test_capture_removes_and_restores_piece() {
    let mut pos =
        Position::with_pieces(Color::White, &[sq(4, 4), sq(8, 0)], &[sq(3, 5), sq(0, 8)]);
    pos.apply_move("e5xg7".parse().unwrap()).unwrap();
    assert!(pos.is_empty(sq(3, 5)));
    assert_eq!(pos.count(Color::Black), 1);
    assert_eq!(pos.captured(Color::Black).len(), 1);

    let mv = pos.undo_move().unwrap();
    assert!(mv.capture);
    assert_eq!(pos.piece_at(sq(3, 5)).map(|p| p.color()), Some(Color::Black));
    assert!(pos.captured(Color::Black).is_empty());
}

// =============================================================================
// Make / undo
// =============================================================================

#[test]
fn test_every_legal_move_undoes_exactly() {
    let cases = [
        (SKIRMISH, Color::White),
        (SKIRMISH, Color::Black),
        (ENDGAME, Color::White),
    ];
    for (diagram, turn) in cases {
        for policy in [CapturePolicy::Mandatory, CapturePolicy::Preferred] {
            let mut pos = Position::from_diagram(diagram, turn).unwrap().with_policy(policy);
            let before = pos.clone();
            for mv in legal_moves(&pos, turn) {
                pos.apply_move(mv).unwrap();
                assert_eq!(pos.turn(), turn.opponent());
                assert_eq!(pos.undo_move().unwrap(), mv);
                assert_eq!(pos, before, "undo of {mv} did not restore the position");
            }
        }
    }
}

#[test]
fn test_illegal_move_leaves_position_untouched() {
    let mut pos = Position::new();
    let before = pos.clone();
    // Backwards, onto a piece, and out of turn
    for text in ["d4-d3", "a1-b1", "d6-d5"] {
        let err = pos.apply_move(text.parse().unwrap()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidMove(_)), "{text}: {err}");
        assert_eq!(pos, before);
    }
    assert_eq!(pos.undo_move(), Err(EngineError::EmptyHistory));
}

// =============================================================================
// Game end
// =============================================================================

#[test]
fn test_breakthrough_wins() {
    let pos = Position::with_pieces(Color::Black, &[sq(0, 4), sq(8, 0)], &[sq(0, 0), sq(4, 8)]);
    assert_eq!(rules::status(&pos), GameStatus::Win(Color::White));
    assert!(eval::evaluate(&pos) > TERMINAL_BONUS / 2.0);

    let pos = Position::with_pieces(Color::White, &[sq(7, 0)], &[sq(8, 4)]);
    assert_eq!(rules::status(&pos), GameStatus::Win(Color::Black));
    assert!(eval::evaluate(&pos) < -TERMINAL_BONUS / 2.0);
}

#[test]
fn test_elimination_and_immobility() {
    let pos = Position::with_pieces(Color::Black, &[sq(4, 4)], &[]);
    assert_eq!(rules::status(&pos), GameStatus::Win(Color::White));

    // White cannot move any piece, so White loses
    let pos = Position::with_pieces(
        Color::White,
        &[sq(1, 0), sq(1, 1)],
        &[sq(0, 0), sq(0, 1), sq(0, 2), sq(1, 2)],
    );
    assert!(legal_moves(&pos, Color::White).is_empty());
    assert_eq!(rules::status(&pos), GameStatus::Win(Color::Black));
}

#[test]
fn test_threefold_repetition_is_a_draw() {
    let cycle = ["d4-c4", "d6-c6", "c4-d4", "c6-d6"];
    let moves: Vec<&str> = cycle.iter().chain(cycle.iter()).copied().collect();
    let mut pos = setpos(&moves);
    // The start grid has now occurred twice in the history
    assert_eq!(rules::status(&pos), GameStatus::Ongoing);

    pos.apply_move("d4-c4".parse().unwrap()).unwrap();
    assert_eq!(rules::status(&pos), GameStatus::Draw);
    assert_eq!(eval::breakdown(&pos, GameStatus::Draw).terminal, 0.0);

    pos.undo_move().unwrap();
    assert_eq!(rules::status(&pos), GameStatus::Ongoing);
}

// =============================================================================
// Search
// =============================================================================

#[test]
fn test_static_score_is_side_relative() {
    // No captures on the board, so the quiescence score is the stand-pat
    let mut white = Position::new();
    let mut black = white.with_turn(Color::Black);
    let mut s = Searcher::default();
    let for_white = s.static_score(&mut white);
    let for_black = s.static_score(&mut black);
    assert_eq!(for_white, -for_black);
    assert_eq!(for_white, eval::evaluate(&white));
}

#[test]
fn test_pruning_does_not_change_result() {
    let positions = [
        Position::new(),
        Position::from_diagram(SKIRMISH, Color::White)
            .unwrap()
            .with_policy(CapturePolicy::Preferred),
        Position::from_diagram(ENDGAME, Color::Black).unwrap(),
    ];
    for mut pos in positions {
        for depth in 1..=3 {
            let full = searcher(false, false).search(&mut pos, depth);
            let pruned = searcher(false, true).search(&mut pos, depth);
            assert!(
                (full.score - pruned.score).abs() < 1e-9,
                "depth {depth}: {} vs {}",
                full.score,
                pruned.score
            );
            assert_eq!(full.best_move, pruned.best_move, "depth {depth}");
        }
    }
}

#[test]
fn test_transposition_table_does_not_change_result() {
    let positions = [
        setpos(&["d4-d5", "f6-f5"]),
        Position::from_diagram(SKIRMISH, Color::Black).unwrap(),
    ];
    for mut pos in positions {
        let without = searcher(false, true).search(&mut pos, 3);
        let mut with_tt = searcher(true, true);
        let with = with_tt.search(&mut pos, 3);
        assert!((without.score - with.score).abs() < 1e-9);
        assert_eq!(without.best_move, with.best_move);
        assert!(!with_tt.tt().is_empty());
    }
}

#[test]
fn test_search_finds_breakthrough_in_two() {
    // e7 reaches row 0 in two steps; Black needs two steps of its own and moves second
    let mut pos = Position::with_pieces(Color::White, &[sq(2, 4), sq(8, 8)], &[sq(6, 0)]);
    let mut s = Searcher::default();
    let result = s.search(&mut pos, 3);
    assert!(result.score > TERMINAL_BONUS / 2.0, "score {}", result.score);
    assert_eq!(result.best_move, Some(Move::translation(sq(2, 4), sq(1, 4))));
    assert_eq!(s.stats().depth, 3);
}

#[test]
fn test_game_against_random_player_stays_consistent() {
    let mut pos = Position::new();
    let mut s = Searcher::new(SearchOptions {
        max_depth: 2,
        tt_capacity: 1 << 14,
        ..SearchOptions::default()
    });
    let mut rng = fastrand::Rng::with_seed(3);

    while !rules::status(&pos).is_terminal() && pos.move_history().len() < 200 {
        let mv = if pos.turn() == Color::White {
            s.best_move(&mut pos)
        } else {
            random_move(&pos, &mut rng)
        };
        let mv = mv.expect("ongoing game always has a move");
        assert!(legal_moves(&pos, pos.turn()).contains(&mv));
        pos.apply_move(mv).unwrap();
        // Pieces are only ever moved or captured
        for color in Color::ALL {
            assert_eq!(pos.count(color) + pos.captured(color).len(), 15);
        }
    }

    // Unwinding the whole game gets back to the start
    while pos.undo_move().is_ok() {}
    assert_eq!(pos, Position::new());
}

// =============================================================================
// Protocol
// =============================================================================

#[test]
fn test_protocol_session() {
    let mut engine = ProtocolEngine::with_options(SearchOptions {
        max_depth: 2,
        tt_capacity: 1 << 12,
        ..SearchOptions::default()
    });
    let input = b"1 play d4-d5\n2 genmove\n3 turn\n4 undo\n5 undo\n6 history\n7 bogus\nquit\n";
    let mut output = Vec::new();
    engine.run_on(&input[..], &mut output).unwrap();
    let text = String::from_utf8(output).unwrap();
    let responses: Vec<&str> = text.split("\n\n").filter(|r| !r.is_empty()).collect();

    assert_eq!(responses.len(), 8, "{text}");
    assert_eq!(responses[0], "=1 ");
    assert!(responses[1].starts_with("=2 "));
    let reply: Move = responses[1][3..].parse().unwrap();
    assert_eq!(responses[2], "=3 white");
    assert_eq!(responses[3], format!("=4 {reply}"));
    assert_eq!(responses[4], "=5 d4-d5");
    assert_eq!(responses[5], "=6 ");
    assert!(responses[6].starts_with("?7 unknown command"));
    assert_eq!(responses[7], "= ");
    assert!(engine.position().move_history().is_empty());
}

#[test]
fn test_protocol_respects_capture_policy() {
    let mut engine = ProtocolEngine::new().with_policy(CapturePolicy::Preferred);
    assert_eq!(engine.position().policy(), CapturePolicy::Preferred);
    let mut output = Vec::new();
    engine.run_on(&b"clear_board\nquit\n"[..], &mut output).unwrap();
    assert_eq!(engine.position().policy(), CapturePolicy::Preferred);
}
