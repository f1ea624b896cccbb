use std::fmt;

use arbiter_core::{Board, Color, Move};
use log::debug;

use crate::{
    response::{parse_verdict, scan_move_records, FAILURE, SUCCESS},
    OracleCommand, OracleError,
};

/// The predicates a rules oracle understands.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Predicate {
    /// The move follows the piece's movement rules (pseudo-legal).
    ValidMove,
    /// The move is valid and does not leave the mover's king in check.
    LegalMove,
    /// The side's king is attacked.
    InCheck,
    /// The side is in check and has no legal move.
    IsCheckmate,
    /// Binds `Moves` to every legal move for the side.
    AllLegalMoves,
}

impl Predicate {
    /// Fetches the name of this [`Predicate`] as written in a goal.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ValidMove => "valid_move",
            Self::LegalMove => "legal_move",
            Self::InCheck => "in_check",
            Self::IsCheckmate => "is_checkmate",
            Self::AllLegalMoves => "all_legal_moves",
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The single source of truth for legality, check, and checkmate.
///
/// Every method is a pure function of its arguments. An `Err` means the oracle
/// could not answer; callers must not read it as either `true` or `false`.
pub trait RulesOracle {
    /// Whether `mv` follows the movement rules for `side`'s piece, ignoring king safety.
    fn is_valid_move(&self, board: &Board, side: Color, mv: Move) -> Result<bool, OracleError>;

    /// Whether `side` may play `mv` on `board`.
    fn is_legal_move(&self, board: &Board, side: Color, mv: Move) -> Result<bool, OracleError>;

    /// Whether `side`'s king is in check on `board`.
    fn is_in_check(&self, board: &Board, side: Color) -> Result<bool, OracleError>;

    /// Whether `side` is checkmated on `board`.
    fn is_checkmate(&self, board: &Board, side: Color) -> Result<bool, OracleError>;

    /// Every legal move for `side` on `board`.
    fn legal_moves(&self, board: &Board, side: Color) -> Result<Vec<Move>, OracleError>;
}

/// Builds the goal for `predicate`, binding `Board` to the board's term list.
///
/// Move predicates take the four one-based coordinates of `mv`; the
/// enumeration predicate binds `Moves`.
///
/// # Example
/// ```
/// # use arbiter::rules::{goal, Predicate};
/// # use arbiter_core::{Board, Color, Move};
/// let mut board = Board::empty();
/// board.set(1, 4, Some(arbiter_core::Piece::WHITE_PAWN));
/// let mv = Move::from_uci("e2e4").unwrap();
/// assert_eq!(
///     goal(&board, Predicate::LegalMove, Color::White, Some(mv)),
///     "Board = [piece(pawn,white,2,5)], legal_move(Board, white, 2, 5, 4, 5)"
/// );
/// assert_eq!(
///     goal(&board, Predicate::InCheck, Color::Black, None),
///     "Board = [piece(pawn,white,2,5)], in_check(Board, black)"
/// );
/// ```
pub fn goal(board: &Board, predicate: Predicate, side: Color, mv: Option<Move>) -> String {
    let args = match (predicate, mv) {
        (Predicate::AllLegalMoves, _) => format!("{side}, Moves"),
        (_, Some(mv)) => {
            let [fr, fc, tr, tc] = mv.rank_file();
            format!("{side}, {fr}, {fc}, {tr}, {tc}")
        }
        (_, None) => format!("{side}"),
    };

    format!("Board = {}, {predicate}(Board, {args})", board.to_rules_term())
}

/// A [`RulesOracle`] answered by a freshly started process per query.
///
/// The goal is appended as the final argument of the command. A boolean goal
/// is wrapped to print [`SUCCESS`] or [`FAILURE`] and halt; the enumeration
/// goal is wrapped to print the `Moves` list and halt.
#[derive(Clone, Debug)]
pub struct SubprocessRules {
    command: OracleCommand,
}

impl SubprocessRules {
    /// Creates a rules oracle that launches `command` for every query.
    pub fn new(command: OracleCommand) -> Self {
        Self { command }
    }

    /// The command launched for every query.
    pub fn command(&self) -> &OracleCommand {
        &self.command
    }

    /// Runs a boolean query and reads its verdict.
    fn ask(
        &self,
        board: &Board,
        predicate: Predicate,
        side: Color,
        mv: Option<Move>,
    ) -> Result<bool, OracleError> {
        let goal = goal(board, predicate, side, mv);
        let wrapped = format!("({goal} -> write('{SUCCESS}') ; write('{FAILURE}')), halt");

        let output = self.command.run([wrapped])?;
        let verdict = parse_verdict(&output).map_err(|failure| OracleError::Malformed {
            reason: failure.to_string(),
            output,
        })?;

        debug!("{predicate} for {side} => {verdict}");
        Ok(verdict)
    }
}

impl RulesOracle for SubprocessRules {
    fn is_valid_move(&self, board: &Board, side: Color, mv: Move) -> Result<bool, OracleError> {
        self.ask(board, Predicate::ValidMove, side, Some(mv))
    }

    fn is_legal_move(&self, board: &Board, side: Color, mv: Move) -> Result<bool, OracleError> {
        self.ask(board, Predicate::LegalMove, side, Some(mv))
    }

    fn is_in_check(&self, board: &Board, side: Color) -> Result<bool, OracleError> {
        self.ask(board, Predicate::InCheck, side, None)
    }

    fn is_checkmate(&self, board: &Board, side: Color) -> Result<bool, OracleError> {
        self.ask(board, Predicate::IsCheckmate, side, None)
    }

    fn legal_moves(&self, board: &Board, side: Color) -> Result<Vec<Move>, OracleError> {
        let goal = goal(board, Predicate::AllLegalMoves, side, None);
        let wrapped = format!("({goal} -> write(Moves) ; true), halt");

        let output = self.command.run([wrapped])?;
        let moves = scan_move_records(&output);

        debug!("{} legal moves for {side}", moves.len());
        Ok(moves)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_goal_for_every_predicate() {
        let board = Board::empty();
        let mv = Move::from_uci("a1h8").unwrap();

        assert_eq!(
            goal(&board, Predicate::ValidMove, Color::White, Some(mv)),
            "Board = [], valid_move(Board, white, 1, 1, 8, 8)"
        );
        assert_eq!(
            goal(&board, Predicate::IsCheckmate, Color::White, None),
            "Board = [], is_checkmate(Board, white)"
        );
        assert_eq!(
            goal(&board, Predicate::AllLegalMoves, Color::Black, None),
            "Board = [], all_legal_moves(Board, black, Moves)"
        );
    }

    #[test]
    fn test_goal_embeds_full_board() {
        let board = Board::new();
        let goal = goal(&board, Predicate::InCheck, Color::White, None);
        assert!(goal.starts_with("Board = [piece(rook,white,1,1), piece(knight,white,1,2)"));
        assert!(goal.ends_with("piece(rook,black,8,8)], in_check(Board, white)"));
    }
}
