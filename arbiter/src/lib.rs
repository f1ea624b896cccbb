/// Command-line play: the terminal observer and the game driver.
pub mod cli;
/// Command-line flags and their defaults.
pub mod config;
/// Choosing a move from a list of legal ones.
pub mod decision;
/// Error types for oracle calls and for sessions.
pub mod error;
/// Move sources: a person at the console, or the decision oracle.
pub mod player;
/// Launching an oracle program and capturing everything it prints.
pub mod process;
/// Grammars for reading oracle output.
///
/// Oracle processes print whatever they like around their answers (banners,
/// warnings, echoes of the query), so every grammar here scans for the shape
/// it needs and ignores the rest.
pub mod response;
/// Legality, check, and checkmate queries.
pub mod rules;
/// The turn state machine.
pub mod session;

pub use decision::*;
pub use error::*;
pub use player::*;
pub use process::*;
pub use rules::*;
pub use session::*;

/// Re-exports all the things you'll need.
pub mod prelude {
    pub use crate::decision::*;
    pub use crate::error::*;
    pub use crate::player::*;
    pub use crate::process::*;
    pub use crate::rules::*;
    pub use crate::session::*;
    pub use arbiter_core::prelude::*;
}
