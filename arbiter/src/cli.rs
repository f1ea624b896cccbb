use std::io::{self, Write};

use anyhow::{Context, Result};
use arbiter_core::{Board, Color, Move};
use colored::Colorize;
use log::{info, warn};

use crate::{
    config::{Config, Controller, OracleArgs},
    ConsolePlayer, MoveSource, OraclePlayer, Session, SessionError, SessionObserver, SessionState,
    SubprocessDecision, SubprocessRules,
};

const RULE: &str = "════════════════════════════════════════";

/// Reports a game on a terminal.
pub struct ConsoleObserver<W> {
    out: W,
    white: Controller,
    black: Controller,
}

impl ConsoleObserver<io::Stdout> {
    /// An observer printing to stdout.
    pub fn stdout(white: Controller, black: Controller) -> Self {
        Self::new(io::stdout(), white, black)
    }
}

impl<W: Write> ConsoleObserver<W> {
    /// An observer printing to `out`, announcing who controls each side.
    pub fn new(out: W, white: Controller, black: Controller) -> Self {
        Self { out, white, black }
    }

    /// Consumes `self`, returning what it printed to.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Prints the opening banner.
    pub fn banner(&mut self) {
        let name = env!("CARGO_PKG_NAME");
        let version = env!("CARGO_PKG_VERSION");
        let authors = env!("CARGO_PKG_AUTHORS").replace(':', ", ");
        self.emit(&format!("{name} {version} by {authors}"));

        let text = format!(
            "\n╔{RULE}╗\n║{:^40}║\n╚{RULE}╝\n\n  Commands:\n    • Move format: e2 e4 (or e2e4)\n    • Type 'quit' or 'exit' to end\n",
            "♔ ♕  ARBITER CHESS  ♛ ♚"
        );
        self.emit(&text);
    }

    /// Prints the final position and a closing line for `state`.
    pub fn farewell(&mut self, board: &Board, state: SessionState) {
        let outcome = match state {
            SessionState::Checkmate { winner } => format!("{winner} won by checkmate"),
            _ => String::from("Game ended"),
        };
        let text = format!(
            "{board}\n╔{RULE}╗\n║{:^40}║\n║{:^40}║\n╚{RULE}╝\n",
            outcome, "Thanks for playing!"
        );
        self.emit(&text);
    }

    fn controller(&self, side: Color) -> Controller {
        match side {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }

    fn emit(&mut self, text: &str) {
        if let Err(err) = writeln!(self.out, "{text}") {
            warn!("Failed to write to the console: {err}");
        }
    }
}

impl<W: Write> SessionObserver for ConsoleObserver<W> {
    fn on_turn(&mut self, board: &Board, state: SessionState) {
        let Some(side) = state.side_to_move() else {
            return;
        };

        let glyph = match side {
            Color::White => '♔',
            Color::Black => '♚',
        };
        let mut status = format!("Current Player: {} {glyph}", side.name().to_uppercase());
        if self.controller(side) == Controller::Ai {
            status.push_str(" (AI)");
        }

        self.emit(&format!("{board}"));
        self.emit(&format!("╔{RULE}╗\n║{status:^40}║\n╚{RULE}╝"));

        if self.controller(side) == Controller::Ai {
            self.emit("\nAI is thinking...");
        }
    }

    fn on_move(&mut self, side: Color, mv: Move) {
        self.emit(&format!("{side} plays {mv}"));
    }

    fn on_malformed(&mut self, _side: Color, input: &str) {
        let msg = format!("Invalid format {input:?}! Use format like 'e2 e4'");
        self.emit(&msg.red().to_string());
    }

    fn on_illegal(&mut self, _side: Color, mv: Move) {
        self.emit(&format!("Illegal move {mv}!").red().to_string());
    }

    fn on_forfeit(&mut self, side: Color, reason: &SessionError) {
        let msg = format!("{side} could not produce a move: {reason}");
        self.emit(&msg.red().to_string());
    }

    fn on_check(&mut self, side: Color) {
        let msg = format!("\n*** CHECK! {side} is in check ***");
        self.emit(&msg.yellow().bold().to_string());
    }

    fn on_checkmate(&mut self, winner: Color) {
        let msg = format!("\n*** CHECKMATE! {winner} wins! ***");
        self.emit(&msg.green().bold().to_string());
    }

    fn on_abort(&mut self) {
        self.emit(&"\nGame aborted.".red().to_string());
    }
}

/// Creates whoever plays `side`.
fn player(controller: Controller, side: Color, oracles: &OracleArgs) -> Box<dyn MoveSource> {
    match controller {
        Controller::Human => Box::new(ConsolePlayer::stdio(format!("{side} (human)"))),
        Controller::Ai => Box::new(OraclePlayer::new(
            SubprocessDecision::new(oracles.decision_command()),
            format!("{side} (ai)"),
        )),
    }
}

/// Validates `config` and plays one game on the terminal.
pub fn run(config: Config) -> Result<()> {
    if config.no_color {
        colored::control::set_override(false);
    }

    config
        .validate()
        .context("Failed to set up the oracles")?;

    let rules = SubprocessRules::new(config.oracles.rules_command());
    info!("Rules oracle: {:?}", rules.command());

    let mut white = player(config.white, Color::White, &config.oracles);
    let mut black = player(config.black, Color::Black, &config.oracles);

    let mut observer = ConsoleObserver::stdout(config.white, config.black);
    observer.banner();

    let mut session = Session::new(rules).with_retries(config.retries);
    let state = session.play(white.as_mut(), black.as_mut(), &mut observer);

    info!("Game over: {state}");
    observer.farewell(session.board(), state);

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn printed(observer: ConsoleObserver<Vec<u8>>) -> String {
        String::from_utf8(observer.into_inner()).unwrap()
    }

    #[test]
    fn test_turn_status() {
        colored::control::set_override(false);
        let mut observer = ConsoleObserver::new(Vec::new(), Controller::Human, Controller::Ai);

        observer.on_turn(&Board::new(), SessionState::AwaitingMove(Color::White));
        observer.on_turn(&Board::new(), SessionState::CheckAnnounced(Color::Black));
        observer.on_turn(&Board::new(), SessionState::Aborted);

        let out = printed(observer);
        assert!(out.contains("Current Player: WHITE ♔"));
        assert!(out.contains("Current Player: BLACK ♚ (AI)"));
        assert_eq!(out.matches("AI is thinking...").count(), 1);
        assert_eq!(out.matches("Current Player").count(), 2);
    }

    #[test]
    fn test_announcements() {
        colored::control::set_override(false);
        let mut observer = ConsoleObserver::new(Vec::new(), Controller::Human, Controller::Human);

        observer.on_check(Color::Black);
        observer.on_checkmate(Color::White);
        observer.on_illegal(Color::White, Move::from_uci("e2e5").unwrap());

        let out = printed(observer);
        assert!(out.contains("*** CHECK! black is in check ***"));
        assert!(out.contains("*** CHECKMATE! white wins! ***"));
        assert!(out.contains("Illegal move e2e5!"));
    }

    #[test]
    fn test_farewell() {
        colored::control::set_override(false);
        let mut observer = ConsoleObserver::new(Vec::new(), Controller::Human, Controller::Human);

        observer.banner();
        observer.farewell(&Board::new(), SessionState::Checkmate { winner: Color::Black });

        let out = printed(observer);
        assert!(out.contains("Type 'quit' or 'exit' to end"));
        assert!(out.contains("black won by checkmate"));
        assert!(out.contains("Thanks for playing!"));
    }

    struct ClosedConsole;

    impl Write for ClosedConsole {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_closed_console_does_not_stop_the_game() {
        let mut observer = ConsoleObserver::new(ClosedConsole, Controller::Ai, Controller::Ai);

        observer.banner();
        observer.on_turn(&Board::new(), SessionState::AwaitingMove(Color::White));
        observer.on_checkmate(Color::White);
        observer.farewell(&Board::new(), SessionState::Checkmate { winner: Color::White });
    }
}
