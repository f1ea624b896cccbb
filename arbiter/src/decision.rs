use arbiter_core::Color;
use log::debug;

use crate::{response::first_token, OracleCommand, OracleError};

/// Picks one move out of a list of moves already known to be legal.
///
/// The choice is advisory. Whatever comes back is re-validated by the rules
/// oracle before it is played.
pub trait DecisionOracle {
    /// Chooses one of `legal_moves` for `side`, or `None` if no choice was made.
    ///
    /// `board` is the compact board encoding (see [`arbiter_core::Board::to_compact`])
    /// and each entry of `legal_moves` is a 4-character coordinate token such as `e2e4`.
    fn choose_move(
        &self,
        side: Color,
        board: &str,
        legal_moves: &[String],
    ) -> Result<Option<String>, OracleError>;
}

/// A [`DecisionOracle`] answered by a freshly started process per request.
///
/// The process receives the side name, the board encoding, and every legal
/// move token as separate trailing arguments. The first whitespace-delimited
/// token it prints is the choice.
#[derive(Clone, Debug)]
pub struct SubprocessDecision {
    command: OracleCommand,
}

impl SubprocessDecision {
    /// Creates a decision oracle that launches `command` for every request.
    pub fn new(command: OracleCommand) -> Self {
        Self { command }
    }

    /// The command launched for every request.
    pub fn command(&self) -> &OracleCommand {
        &self.command
    }
}

impl DecisionOracle for SubprocessDecision {
    fn choose_move(
        &self,
        side: Color,
        board: &str,
        legal_moves: &[String],
    ) -> Result<Option<String>, OracleError> {
        // Nothing to choose from; don't bother starting a process
        if legal_moves.is_empty() {
            debug!("No legal moves offered to the decision oracle for {side}");
            return Ok(None);
        }

        let args = [side.name(), board]
            .into_iter()
            .chain(legal_moves.iter().map(String::as_str));
        let output = self.command.run(args)?;

        let choice = first_token(&output).ok().map(str::to_string);
        debug!("Decision oracle chose {choice:?} for {side}");

        Ok(choice)
    }
}
