//! Line-oriented command protocol for driving the engine from another program.
//!
//! The framing follows GTP: each command line may start with a numeric id,
//! and every response is `=id text` on success or `?id text` on failure,
//! followed by a blank line.
//!
//! ## Supported Commands
//!
//! - `name`, `version`, `protocol_version` - Engine identification
//! - `list_commands`, `known_command <cmd>` - Command discovery
//! - `quit` - Exit the loop
//! - `clear_board` - Start a new game
//! - `depth <n>` - Set the search depth
//! - `play <move>` - Play a move for the side to move (`d4-d5`, `e5xg7`)
//! - `genmove` - Search, play, and print a move for the side to move
//! - `undo` - Take back the last move
//! - `legal` - List legal moves
//! - `status` - `ongoing`, `white wins`, `black wins`, or `draw`
//! - `turn` - Side to move
//! - `showboard` - Print the board
//! - `eval` - Static evaluation with its breakdown
//! - `history` - Moves played so far
//!
//! ## Example
//!
//! ```ignore
//! use fianco_rs::protocol::ProtocolEngine;
//! let mut engine = ProtocolEngine::new();
//! engine.run()?;
//! ```

use std::io::{self, BufRead, Write};

use anyhow::Context;
use tracing::{debug, trace};

use crate::board::Move;
use crate::error::EngineError;
use crate::eval;
use crate::movegen::legal_moves;
use crate::position::{CapturePolicy, Position};
use crate::rules::{self, GameStatus};
use crate::search::{SearchOptions, Searcher};

/// The list of known commands.
const KNOWN_COMMANDS: &[&str] = &[
    "clear_board",
    "depth",
    "eval",
    "genmove",
    "history",
    "known_command",
    "legal",
    "list_commands",
    "name",
    "play",
    "protocol_version",
    "quit",
    "showboard",
    "status",
    "turn",
    "undo",
    "version",
];

/// Protocol engine state.
pub struct ProtocolEngine {
    /// Current game position
    pos: Position,
    /// Searcher, reused across moves so its table carries over
    searcher: Searcher,
    /// Search depth for `genmove`
    depth: u32,
    /// Capture rule for new games
    policy: CapturePolicy,
}

impl Default for ProtocolEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolEngine {
    pub fn new() -> Self {
        Self::with_options(SearchOptions::default())
    }

    pub fn with_options(options: SearchOptions) -> Self {
        let depth = options.max_depth.max(1);
        Self {
            pos: Position::new(),
            searcher: Searcher::new(options),
            depth,
            policy: CapturePolicy::default(),
        }
    }

    /// Play this and every following game under `policy`.
    pub fn with_policy(mut self, policy: CapturePolicy) -> Self {
        self.policy = policy;
        self.pos = Position::new().with_policy(policy);
        self
    }

    pub fn position(&self) -> &Position {
        &self.pos
    }

    /// Run the command loop on stdin/stdout.
    pub fn run(&mut self) -> anyhow::Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.run_on(stdin.lock(), stdout.lock())
    }

    /// Run the command loop on arbitrary streams until `quit` or end of input.
    pub fn run_on<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> anyhow::Result<()> {
        for line in input.lines() {
            let line = line.context("failed to read command")?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            let Some((command, args)) = parts.split_first() else {
                continue;
            };
            let command = command.to_lowercase();
            trace!(%command, ?args, "command");

            let (success, message) = self.execute(&command, args);
            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();

            writeln!(output, "{prefix}{id_str} {message}\n").context("failed to write response")?;
            output.flush().context("failed to flush response")?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command ID from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        if end > 0 {
            if let Ok(id) = trimmed[..end].parse::<u32>() {
                return (Some(id), trimmed[end..].trim());
            }
        }
        (None, trimmed)
    }

    /// Execute a command and return (success, response).
    fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match command {
            "name" => (true, "fianco-rs".to_string()),

            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),

            "protocol_version" => (true, "1".to_string()),

            "list_commands" => (true, KNOWN_COMMANDS.join("\n")),

            "known_command" => match args.first() {
                Some(cmd) => {
                    let known = KNOWN_COMMANDS.contains(&cmd.to_lowercase().as_str());
                    (true, known.to_string())
                }
                None => (false, "missing argument".to_string()),
            },

            "quit" => (true, String::new()),

            "clear_board" => {
                self.pos = Position::new().with_policy(self.policy);
                (true, String::new())
            }

            "depth" => match args.first().map(|a| a.parse::<u32>()) {
                Some(Ok(depth)) if depth > 0 => {
                    self.depth = depth;
                    self.searcher.set_max_depth(depth);
                    (true, String::new())
                }
                Some(_) => (false, "invalid depth".to_string()),
                None => (false, "missing argument".to_string()),
            },

            "play" => {
                if args.is_empty() {
                    return (false, "missing argument".to_string());
                }
                if rules::status(&self.pos).is_terminal() {
                    return (false, "game over".to_string());
                }
                let result = args
                    .join(" ")
                    .parse::<Move>()
                    .and_then(|mv| self.pos.apply_move(mv));
                match result {
                    Ok(()) => (true, String::new()),
                    Err(e) => (false, e.to_string()),
                }
            }

            "genmove" => {
                if rules::status(&self.pos).is_terminal() {
                    return (false, "game over".to_string());
                }
                let color = self.pos.turn();
                match self.searcher.choose_move(&mut self.pos, self.depth) {
                    Some(mv) => {
                        let stats = self.searcher.stats();
                        debug!(%mv, nodes = stats.nodes, depth = stats.depth, "genmove");
                        match self.pos.apply_move(mv) {
                            Ok(()) => (true, mv.to_string()),
                            Err(e) => (false, e.to_string()),
                        }
                    }
                    None => (false, EngineError::NoLegalMoves(color).to_string()),
                }
            }

            "undo" => match self.pos.undo_move() {
                Ok(mv) => (true, mv.to_string()),
                Err(e) => (false, e.to_string()),
            },

            "legal" => {
                let moves: Vec<String> = legal_moves(&self.pos, self.pos.turn())
                    .iter()
                    .map(Move::to_string)
                    .collect();
                (true, moves.join(" "))
            }

            "status" => {
                let text = match rules::status(&self.pos) {
                    GameStatus::Ongoing => "ongoing".to_string(),
                    GameStatus::Win(color) => format!("{color} wins"),
                    GameStatus::Draw => "draw".to_string(),
                };
                (true, text)
            }

            "turn" => (true, self.pos.turn().to_string()),

            "showboard" => (true, format!("\n{}", self.pos)),

            "eval" => {
                let weights = &self.searcher.options().weights;
                let status = rules::status(&self.pos);
                let b = eval::breakdown(&self.pos, status);
                let text = format!(
                    "{:.3}\nmaterial {:.3}\npositional {:.3}\nmobility {:.3}\nstructure {:.3}\n\
                     safety {:.3}\ndevelopment {:.3}\ncontrol {:.3}\nendgame {:.3}\nterminal {:.3}",
                    b.total(weights),
                    b.material,
                    b.positional,
                    b.mobility,
                    b.structure,
                    b.safety,
                    b.development,
                    b.control,
                    b.endgame,
                    b.terminal,
                );
                (true, text)
            }

            "history" => {
                let moves: Vec<String> = self
                    .pos
                    .move_history()
                    .iter()
                    .map(Move::to_string)
                    .collect();
                (true, moves.join(" "))
            }

            _ => (false, format!("unknown command: {command}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> ProtocolEngine {
        ProtocolEngine::with_options(SearchOptions {
            max_depth: 2,
            tt_capacity: 1 << 12,
            ..SearchOptions::default()
        })
    }

    #[test]
    fn test_parse_id_with_id() {
        let (id, cmd) = ProtocolEngine::parse_id("123 name");
        assert_eq!(id, Some(123));
        assert_eq!(cmd, "name");
    }

    #[test]
    fn test_parse_id_without_id() {
        let (id, cmd) = ProtocolEngine::parse_id("name");
        assert_eq!(id, None);
        assert_eq!(cmd, "name");
    }

    #[test]
    fn test_name_command() {
        let mut engine = engine();
        let (success, response) = engine.execute("name", &[]);
        assert!(success);
        assert_eq!(response, "fianco-rs");
    }

    #[test]
    fn test_known_command() {
        let mut engine = engine();

        let (success, response) = engine.execute("known_command", &["genmove"]);
        assert!(success);
        assert_eq!(response, "true");

        let (success, response) = engine.execute("known_command", &["komi"]);
        assert!(success);
        assert_eq!(response, "false");
    }

    #[test]
    fn test_play_undo_and_clear() {
        let mut engine = engine();

        let (success, _) = engine.execute("play", &["d4-d5"]);
        assert!(success);
        assert_eq!(engine.execute("turn", &[]).1, "black");
        assert_eq!(engine.execute("history", &[]).1, "d4-d5");

        let (success, response) = engine.execute("undo", &[]);
        assert!(success);
        assert_eq!(response, "d4-d5");

        let (success, response) = engine.execute("undo", &[]);
        assert!(!success);
        assert_eq!(response, "no move to undo");

        engine.execute("play", &["d4", "d5"]);
        let (success, _) = engine.execute("clear_board", &[]);
        assert!(success);
        assert!(engine.position().move_history().is_empty());
    }

    #[test]
    fn test_play_rejects_illegal_and_malformed() {
        let mut engine = engine();
        let (success, response) = engine.execute("play", &["d4-d3"]);
        assert!(!success);
        assert!(response.starts_with("illegal move"));

        let (success, response) = engine.execute("play", &["zz"]);
        assert!(!success);
        assert!(response.starts_with("malformed notation"));
        assert!(engine.position().move_history().is_empty());
    }

    #[test]
    fn test_genmove_plays_legal_move() {
        let mut engine = engine();
        let (success, response) = engine.execute("genmove", &[]);
        assert!(success, "{response}");
        assert_eq!(engine.position().move_history().len(), 1);
        assert_eq!(engine.execute("history", &[]).1, response);
    }

    #[test]
    fn test_depth_validation() {
        let mut engine = engine();
        assert!(engine.execute("depth", &["3"]).0);
        assert!(!engine.execute("depth", &["0"]).0);
        assert!(!engine.execute("depth", &["deep"]).0);
        assert!(!engine.execute("depth", &[]).0);
    }

    #[test]
    fn test_run_on_streams() {
        let mut engine = engine();
        let input = b"1 name\n# comment\n\n2 play a1-a2\n3 status\nquit\nname\n";
        let mut output = Vec::new();
        engine.run_on(&input[..], &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();
        assert_eq!(text, "=1 fianco-rs\n\n=2 \n\n=3 ongoing\n\n= \n\n");
    }
}
