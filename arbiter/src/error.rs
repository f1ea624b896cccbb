use std::{error::Error, fmt, io, time::Duration};

use arbiter_core::Move;

/// Failure of a single oracle invocation.
#[derive(Debug)]
pub enum OracleError {
    /// The oracle process could not be started.
    Spawn { program: String, source: io::Error },
    /// Reading the oracle's output, or waiting on it, failed.
    Io(io::Error),
    /// The oracle did not halt within its time bound and was killed.
    Timeout { program: String, after: Duration },
    /// The oracle halted, but its output matched no recognized response shape.
    Malformed { reason: String, output: String },
}

impl fmt::Display for OracleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spawn { program, source } => write!(f, "failed to start {program:?}: {source}"),
            Self::Io(err) => write!(f, "failed to communicate with oracle: {err}"),
            Self::Timeout { program, after } => {
                write!(f, "{program:?} did not halt within {}ms", after.as_millis())
            }
            Self::Malformed { reason, output } => {
                write!(f, "unrecognized oracle response ({reason}): {:?}", output.trim())
            }
        }
    }
}

impl Error for OracleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Spawn { source, .. } => Some(source),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for OracleError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

/// Reasons a ply could not be played.
#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub enum SessionError {
    /// An oracle could not be reached, or answered with something unrecognizable.
    OracleUnavailable(String),
    /// The rules oracle rejected the move.
    IllegalMove(Move),
    /// Human input did not match the move grammar.
    MalformedInput(String),
    /// The session has already ended in checkmate or was aborted.
    SessionTerminal,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OracleUnavailable(reason) => write!(f, "oracle unavailable: {reason}"),
            Self::IllegalMove(mv) => write!(f, "illegal move {mv}"),
            Self::MalformedInput(input) => {
                write!(f, "{input:?} is not a move. Moves look like \"e2e4\" or \"e2 e4\"")
            }
            Self::SessionTerminal => write!(f, "the game is already over"),
        }
    }
}

impl Error for SessionError {
    //
}

impl From<OracleError> for SessionError {
    fn from(err: OracleError) -> Self {
        Self::OracleUnavailable(err.to_string())
    }
}
