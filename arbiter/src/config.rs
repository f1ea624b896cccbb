use std::{
    fmt,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Result};
use clap::{Args, Parser, ValueEnum};

use crate::{session::DEFAULT_RETRIES, OracleCommand};

/// Directory the rules oracle is launched from.
pub const DEFAULT_RULES_DIR: &str = "../prolog";

/// Program answering rules queries.
pub const DEFAULT_RULES_PROGRAM: &str = "swipl";

/// Arguments passed to the rules program ahead of the goal.
pub const DEFAULT_RULES_ARGS: [&str; 3] = ["-s", "check_detection.pl", "-g"];

/// Directory the decision oracle is launched from.
pub const DEFAULT_DECISION_DIR: &str = "../scheme";

/// Program answering move-choice requests.
pub const DEFAULT_DECISION_PROGRAM: &str = "racket";

/// Arguments passed to the decision program ahead of the side, board, and moves.
pub const DEFAULT_DECISION_ARGS: [&str; 1] = ["ai.rkt"];

/// How long an oracle may run before it is killed, in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Who plays a side.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default, ValueEnum)]
pub enum Controller {
    /// Moves are typed at the console.
    #[default]
    Human,
    /// Moves are chosen by the decision oracle.
    Ai,
}

impl fmt::Display for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Human => write!(f, "human"),
            Self::Ai => write!(f, "ai"),
        }
    }
}

/// Where the oracles live and how to launch them.
#[derive(Clone, PartialEq, Eq, Debug, Args)]
pub struct OracleArgs {
    /// Directory to launch the rules oracle from
    #[arg(long, value_name = "DIR", default_value = DEFAULT_RULES_DIR)]
    pub rules_dir: PathBuf,

    /// Program that answers rules queries
    #[arg(long, value_name = "PROG", default_value = DEFAULT_RULES_PROGRAM)]
    pub rules_program: PathBuf,

    /// Argument for the rules program, placed before the goal (repeatable)
    #[arg(
        long = "rules-arg",
        value_name = "ARG",
        allow_hyphen_values = true,
        default_values = DEFAULT_RULES_ARGS
    )]
    pub rules_args: Vec<String>,

    /// Directory to launch the decision oracle from
    #[arg(long, value_name = "DIR", default_value = DEFAULT_DECISION_DIR)]
    pub decision_dir: PathBuf,

    /// Program that chooses moves
    #[arg(long, value_name = "PROG", default_value = DEFAULT_DECISION_PROGRAM)]
    pub decision_program: PathBuf,

    /// Argument for the decision program, placed before the side, board, and moves (repeatable)
    #[arg(
        long = "decision-arg",
        value_name = "ARG",
        allow_hyphen_values = true,
        default_values = DEFAULT_DECISION_ARGS
    )]
    pub decision_args: Vec<String>,

    /// Milliseconds an oracle may run before it is killed (0 waits forever)
    #[arg(long, value_name = "MS", default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout_ms: u64,
}

impl OracleArgs {
    /// The time bound for every oracle call, if any.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }

    /// The command that answers rules queries.
    pub fn rules_command(&self) -> OracleCommand {
        OracleCommand::new(&self.rules_program)
            .args(self.rules_args.iter().cloned())
            .in_dir(&self.rules_dir)
            .with_timeout(self.timeout())
    }

    /// The command that chooses moves.
    pub fn decision_command(&self) -> OracleCommand {
        OracleCommand::new(&self.decision_program)
            .args(self.decision_args.iter().cloned())
            .in_dir(&self.decision_dir)
            .with_timeout(self.timeout())
    }

    /// Ensures both oracle directories exist.
    ///
    /// The decision oracle's directory is only required if `needs_decision` is set.
    pub fn validate(&self, needs_decision: bool) -> Result<()> {
        check_dir("rules", &self.rules_dir)?;
        if needs_decision {
            check_dir("decision", &self.decision_dir)?;
        }
        Ok(())
    }
}

impl Default for OracleArgs {
    fn default() -> Self {
        Self {
            rules_dir: DEFAULT_RULES_DIR.into(),
            rules_program: DEFAULT_RULES_PROGRAM.into(),
            rules_args: DEFAULT_RULES_ARGS.map(String::from).to_vec(),
            decision_dir: DEFAULT_DECISION_DIR.into(),
            decision_program: DEFAULT_DECISION_PROGRAM.into(),
            decision_args: DEFAULT_DECISION_ARGS.map(String::from).to_vec(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

fn check_dir(oracle: &str, dir: &Path) -> Result<()> {
    if !dir.exists() {
        bail!("The {oracle} oracle directory {dir:?} does not exist");
    }
    if !dir.is_dir() {
        bail!("The {oracle} oracle directory {dir:?} is not a directory");
    }
    Ok(())
}

/// Play chess against a friend or the decision oracle, refereed by the rules oracle.
#[derive(Clone, PartialEq, Eq, Debug, Parser)]
#[command(name = "arbiter", version, about)]
pub struct Config {
    #[command(flatten)]
    pub oracles: OracleArgs,

    /// Who plays White
    #[arg(long, value_enum, default_value_t = Controller::Human)]
    pub white: Controller,

    /// Who plays Black
    #[arg(long, value_enum, default_value_t = Controller::Human)]
    pub black: Controller,

    /// Attempts the decision oracle gets per move before the move is forfeited
    #[arg(long, value_name = "N", default_value_t = DEFAULT_RETRIES)]
    pub retries: usize,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl Config {
    /// Whether either side is played by the decision oracle.
    pub fn uses_decision_oracle(&self) -> bool {
        self.white == Controller::Ai || self.black == Controller::Ai
    }

    /// Checks everything that must hold before a game can start.
    pub fn validate(&self) -> Result<()> {
        if self.retries == 0 {
            bail!("--retries must be at least 1");
        }
        self.oracles.validate(self.uses_decision_oracle())
    }
}
