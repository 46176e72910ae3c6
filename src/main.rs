//! Fianco-rs: a Fianco playing engine.
//!
//! ## Usage
//!
//! - `fianco` - Show a demo
//! - `fianco protocol` - Start the command protocol on stdin/stdout
//! - `fianco play` - Play against the engine in the terminal
//! - `fianco selfplay` - Let the engine play itself (or a random player)

use std::io::{self, BufRead, Write};
use std::time::{Duration, Instant};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use fianco_rs::board::{Color, Move};
use fianco_rs::constants::DEFAULT_DEPTH;
use fianco_rs::movegen::legal_moves;
use fianco_rs::position::{CapturePolicy, Position};
use fianco_rs::protocol::ProtocolEngine;
use fianco_rs::rules::{self, GameStatus};
use fianco_rs::search::{SearchOptions, Searcher, random_move};

/// Fianco-rs: a Fianco playing engine
#[derive(Parser)]
#[command(name = "fianco")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG overrides it.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the line-oriented command protocol for use by other programs
    Protocol {
        #[command(flatten)]
        search: SearchArgs,
    },
    /// Play against the engine
    Play {
        /// Side played by the engine
        #[arg(long, value_enum, default_value_t = Side::Black)]
        engine: Side,
        /// Face a player that picks uniformly random legal moves
        #[arg(long)]
        random: bool,
        #[command(flatten)]
        search: SearchArgs,
    },
    /// Play a game between two players and print it
    Selfplay {
        /// Let a random player take Black
        #[arg(long)]
        random_black: bool,
        /// Stop after this many plies
        #[arg(long, default_value_t = 200)]
        max_plies: usize,
        /// Seed for the random player
        #[arg(long, default_value_t = 1)]
        seed: u64,
        #[command(flatten)]
        search: SearchArgs,
    },
    /// Run a simple demo of the engine
    Demo,
}

#[derive(clap::Args)]
struct SearchArgs {
    /// Search depth in plies
    #[arg(short, long, default_value_t = DEFAULT_DEPTH)]
    depth: u32,
    /// Time limit per move in milliseconds
    #[arg(long)]
    movetime: Option<u64>,
    /// Disable the transposition table
    #[arg(long)]
    no_tt: bool,
    /// Treat captures as optional (searched first, never forced)
    #[arg(long)]
    optional_captures: bool,
}

impl SearchArgs {
    fn options(&self) -> SearchOptions {
        SearchOptions {
            max_depth: self.depth.max(1),
            use_tt: !self.no_tt,
            time_limit: self.movetime.map(Duration::from_millis),
            ..SearchOptions::default()
        }
    }

    fn policy(&self) -> CapturePolicy {
        if self.optional_captures {
            CapturePolicy::Preferred
        } else {
            CapturePolicy::Mandatory
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Side {
    White,
    Black,
}

impl From<Side> for Color {
    fn from(side: Side) -> Color {
        match side {
            Side::White => Color::White,
            Side::Black => Color::Black,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Protocol { search }) => ProtocolEngine::with_options(search.options())
            .with_policy(search.policy())
            .run(),
        Some(Commands::Play {
            engine,
            random,
            search,
        }) => {
            let opponent = if random {
                Opponent::Random(fastrand::Rng::new())
            } else {
                Opponent::Search(Searcher::new(search.options()))
            };
            play(engine.into(), opponent, search.policy())
        }
        Some(Commands::Selfplay {
            random_black,
            max_plies,
            seed,
            search,
        }) => selfplay(&search, random_black, max_plies, seed),
        Some(Commands::Demo) | None => {
            run_demo();
            Ok(())
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// A computer player.
enum Opponent {
    Search(Searcher),
    Random(fastrand::Rng),
}

impl Opponent {
    fn choose(&mut self, pos: &mut Position) -> Option<Move> {
        match self {
            Opponent::Search(searcher) => searcher.best_move(pos),
            Opponent::Random(rng) => random_move(pos, rng),
        }
    }

    fn describe(&self) -> String {
        match self {
            Opponent::Search(searcher) => format!("depth {}", searcher.stats().depth),
            Opponent::Random(_) => "random".to_string(),
        }
    }
}

/// Human against engine in the terminal.
fn play(engine_color: Color, mut engine: Opponent, policy: CapturePolicy) -> anyhow::Result<()> {
    let mut pos = Position::new().with_policy(policy);
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut stdout = io::stdout();

    println!("Welcome to Fianco! You play {}.", engine_color.opponent());
    println!("Enter moves like d4-d5 or e5xg7; 'undo' takes back a full turn, 'quit' exits.\n");
    println!("{pos}\n");

    while !rules::status(&pos).is_terminal() {
        if pos.turn() == engine_color {
            let start = Instant::now();
            let Some(mv) = engine.choose(&mut pos) else {
                bail!("engine found no move in an ongoing game");
            };
            pos.apply_move(mv)?;
            println!(
                "Engine plays {mv} ({:.2}s, {})\n",
                start.elapsed().as_secs_f64(),
                engine.describe()
            );
            println!("{pos}\n");
            continue;
        }

        print!("Your move: ");
        stdout.flush().context("failed to flush prompt")?;
        let Some(line) = lines.next() else {
            return Ok(());
        };
        let line = line.context("failed to read move")?;
        match line.trim() {
            "" => continue,
            "quit" => return Ok(()),
            "undo" => {
                // Take back the engine reply and the human move
                for _ in 0..2 {
                    if pos.undo_move().is_err() {
                        break;
                    }
                }
                println!("{pos}\n");
            }
            "legal" => {
                let moves: Vec<String> = legal_moves(&pos, pos.turn())
                    .iter()
                    .map(Move::to_string)
                    .collect();
                println!("{}", moves.join(" "));
            }
            text => match text.parse::<Move>().and_then(|mv| pos.apply_move(mv)) {
                Ok(()) => println!("\n{pos}\n"),
                Err(e) => println!("Invalid move ({e}). Try again."),
            },
        }
    }

    print_result(&pos);
    Ok(())
}

/// Engine against itself, or against a random Black.
fn selfplay(
    args: &SearchArgs,
    random_black: bool,
    max_plies: usize,
    seed: u64,
) -> anyhow::Result<()> {
    let mut pos = Position::new().with_policy(args.policy());
    let mut white = Opponent::Search(Searcher::new(args.options()));
    let mut black = if random_black {
        Opponent::Random(fastrand::Rng::with_seed(seed))
    } else {
        Opponent::Search(Searcher::new(args.options()))
    };
    let start = Instant::now();

    while !rules::status(&pos).is_terminal() && pos.move_history().len() < max_plies {
        let mv = match pos.turn() {
            Color::White => white.choose(&mut pos),
            Color::Black => black.choose(&mut pos),
        };
        let Some(mv) = mv else {
            bail!("no move available in an ongoing game");
        };
        pos.apply_move(mv)?;
        println!("{:>3}. {mv}", pos.move_history().len());
    }

    println!("\n{pos}\n");
    print_result(&pos);
    info!(
        plies = pos.move_history().len(),
        seconds = start.elapsed().as_secs_f64(),
        "selfplay finished"
    );
    Ok(())
}

fn print_result(pos: &Position) {
    match rules::status(pos) {
        GameStatus::Win(color) => println!("Game over: {color} wins!"),
        GameStatus::Draw => println!("Game over: draw by threefold repetition."),
        GameStatus::Ongoing => println!("Game stopped after {} plies.", pos.move_history().len()),
    }
}

fn run_demo() {
    println!("Fianco-rs: Fianco alpha-beta engine\n");

    let mut pos = Position::new();
    println!("{pos}\n");
    println!(
        "White has {} legal moves in the starting position.",
        legal_moves(&pos, Color::White).len()
    );

    let mut searcher = Searcher::default();
    let result = searcher.search(&mut pos, DEFAULT_DEPTH);
    match result.best_move {
        Some(mv) => println!(
            "Best move at depth {DEFAULT_DEPTH}: {mv} (score {:.2})",
            result.score
        ),
        None => println!("No move found"),
    }
    let stats = searcher.stats();
    println!(
        "Searched {} nodes, {} quiescence nodes, {} table hits.",
        stats.nodes, stats.qnodes, stats.tt_hits
    );
}
