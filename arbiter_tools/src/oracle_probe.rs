//! Asks one question of an oracle and prints the parsed answer.
//!
//! Handy for checking a rules program or a decision program in isolation:
//!
//! ```text
//! oracle_probe --moves "e2e4 e7e5" legal g1f3
//! oracle_probe --side black moves
//! oracle_probe --decision-program ./ai.sh choose
//! ```
use anyhow::{bail, Context, Result};
use arbiter::{
    config::OracleArgs, DecisionOracle, RulesOracle, SubprocessDecision, SubprocessRules,
};
use arbiter_core::{Board, Color, Move};
use clap::{Parser, Subcommand};
use log::debug;

#[derive(Debug, Parser)]
#[command(name = "oracle_probe", about = "Query a rules or decision oracle once")]
struct Args {
    #[command(flatten)]
    oracles: OracleArgs,

    /// Side the query is about
    #[arg(long, default_value_t = Color::White)]
    side: Color,

    /// Moves to play from the initial position before asking, e.g. "e2e4 e7e5". They are not checked.
    #[arg(long, default_value = "")]
    moves: String,

    #[command(subcommand)]
    query: Query,
}

#[derive(Debug, Subcommand)]
enum Query {
    /// Does the move follow its piece's movement rules?
    Valid { mv: Move },
    /// Is the move legal?
    Legal { mv: Move },
    /// Is the side in check?
    Check,
    /// Is the side checkmated?
    Checkmate,
    /// List every legal move for the side
    Moves,
    /// Ask the decision oracle to pick one of the side's legal moves
    Choose,
}

/// Builds the position to ask about.
fn setup_board(moves: &str) -> Result<Board> {
    let mut board = Board::new();

    for mv_str in moves.split_ascii_whitespace() {
        let mv = Move::from_uci(mv_str).context(format!("Invalid move {mv_str:?} in --moves"))?;
        if !board.has(mv.from()) {
            bail!("No piece on {} to play {mv}", mv.from());
        }
        board.apply_move(mv);
    }

    Ok(board)
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    args.oracles
        .validate(matches!(args.query, Query::Choose))
        .context("Failed to set up the oracles")?;

    let board = setup_board(&args.moves)?;
    let side = args.side;
    let rules = SubprocessRules::new(args.oracles.rules_command());

    println!("{board}\n");
    debug!("Board term: {}", board.to_rules_term());

    match args.query {
        Query::Valid { mv } => {
            println!("valid_move({side}, {mv}): {}", rules.is_valid_move(&board, side, mv)?);
        }
        Query::Legal { mv } => {
            println!("legal_move({side}, {mv}): {}", rules.is_legal_move(&board, side, mv)?);
        }
        Query::Check => {
            println!("in_check({side}): {}", rules.is_in_check(&board, side)?);
        }
        Query::Checkmate => {
            println!("is_checkmate({side}): {}", rules.is_checkmate(&board, side)?);
        }
        Query::Moves => {
            let moves = rules.legal_moves(&board, side)?;
            let moves = moves.iter().map(Move::to_uci).collect::<Vec<_>>();
            println!("{} legal moves for {side}: {}", moves.len(), moves.join(" "));
        }
        Query::Choose => {
            let moves = rules.legal_moves(&board, side)?;
            let tokens = moves.iter().map(Move::to_uci).collect::<Vec<_>>();
            println!("Offering {}: {}", tokens.len(), tokens.join(" "));

            let decision = SubprocessDecision::new(args.oracles.decision_command());
            match decision.choose_move(side, &board.to_compact(), &tokens)? {
                Some(choice) if tokens.contains(&choice) => println!("Chose {choice}"),
                Some(choice) => println!("Chose {choice:?}, which was not offered"),
                None => println!("No choice was made"),
            }
        }
    }

    Ok(())
}
