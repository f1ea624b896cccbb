use std::io::{self, BufRead, Write};

use arbiter_core::{Board, Color, Move};
use log::{info, warn};

use crate::{DecisionOracle, RulesOracle};

/// What a move source offers for one ply.
#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub enum Candidate {
    /// A well-formed move. It may still be illegal.
    Play(Move),
    /// The player asked to end the game.
    Quit,
    /// Input that failed the move grammar.
    Malformed(String),
    /// The source could not come up with a move.
    NoMoveAvailable,
}

/// Everything a move source may look at when asked for a move.
pub struct Turn<'a> {
    /// The current position.
    pub board: &'a Board,
    /// The side to move.
    pub side: Color,
    /// The session's rules oracle.
    pub rules: &'a dyn RulesOracle,
}

/// Something that can be asked for one move per ply.
///
/// A session treats all move sources alike, except that an interactive source
/// is re-asked without limit after bad input, while a non-interactive source
/// only gets a bounded number of attempts.
pub trait MoveSource {
    /// Asks for a move for `turn.side`.
    fn request_move(&mut self, turn: &Turn<'_>) -> Candidate;

    /// Whether a person is on the other end.
    fn is_interactive(&self) -> bool {
        false
    }

    /// A short description for logs and messages.
    fn name(&self) -> &str;
}

/// A source of lines of text.
///
/// Implemented for stdin without holding its lock, so two console players can share it.
pub trait ReadLine {
    /// Reads one line into `buf`, returning the number of bytes read. `0` means end of input.
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize>;
}

impl ReadLine for io::Stdin {
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        io::Stdin::read_line(self, buf)
    }
}

impl ReadLine for &[u8] {
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        BufRead::read_line(self, buf)
    }
}

impl<R: io::Read> ReadLine for io::BufReader<R> {
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        BufRead::read_line(self, buf)
    }
}

/// A person typing moves at a prompt.
///
/// Accepts `quit` or `exit` (exactly, case-sensitive) to end the game, and
/// coordinate moves like `e2e4` or `e2 e4`. End of input counts as `quit`.
/// Moves starting on an empty square or on an opponent's piece are refused
/// here, before they reach the rules oracle.
pub struct ConsolePlayer<R, W> {
    input: R,
    output: W,
    name: String,
}

impl ConsolePlayer<io::Stdin, io::Stdout> {
    /// A console player reading from stdin and writing to stdout.
    pub fn stdio(name: impl Into<String>) -> Self {
        Self::new(io::stdin(), io::stdout(), name)
    }
}

impl<R: ReadLine, W: Write> ConsolePlayer<R, W> {
    /// Creates a console player reading lines from `input` and writing prompts to `output`.
    pub fn new(input: R, output: W, name: impl Into<String>) -> Self {
        Self {
            input,
            output,
            name: name.into(),
        }
    }

    /// Consumes `self`, returning the output it wrote to.
    pub fn into_output(self) -> W {
        self.output
    }

    /// Writes a line of feedback. Write failures are only logged.
    fn say(&mut self, msg: &str) {
        if let Err(err) = writeln!(self.output, "{msg}") {
            warn!("Failed to write to console: {err}");
        }
    }

    fn prompt(&mut self) {
        let res = write!(self.output, "\nEnter your move (e.g., 'e2 e4' or 'e2e4'): ")
            .and_then(|_| self.output.flush());
        if let Err(err) = res {
            warn!("Failed to write prompt: {err}");
        }
    }
}

impl<R: ReadLine, W: Write> MoveSource for ConsolePlayer<R, W> {
    fn request_move(&mut self, turn: &Turn<'_>) -> Candidate {
        let mut buffer = String::with_capacity(64);

        loop {
            self.prompt();

            buffer.clear();
            let bytes = match self.input.read_line(&mut buffer) {
                Ok(bytes) => bytes,
                Err(err) => {
                    warn!("Failed to read move from console: {err}");
                    return Candidate::Quit;
                }
            };

            // For ctrl + d
            if bytes == 0 {
                warn!("Console input closed; treating it as quit");
                return Candidate::Quit;
            }

            let line = buffer.trim();
            if line == "quit" || line == "exit" {
                return Candidate::Quit;
            }

            let mv = match Move::from_uci(line) {
                Ok(mv) => mv,
                Err(_) => return Candidate::Malformed(line.to_string()),
            };

            match turn.board.piece_at(mv.from()) {
                None => self.say("No piece at that position!"),
                Some(piece) if piece.color() != turn.side => self.say("That's not your piece!"),
                Some(_) => return Candidate::Play(mv),
            }
        }
    }

    fn is_interactive(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A side played by the decision oracle.
///
/// Legal moves are enumerated by the session's rules oracle and offered to the
/// decision oracle; its answer is parsed with the same grammar as human input.
/// Any failure along the way yields [`Candidate::NoMoveAvailable`].
pub struct OraclePlayer<D> {
    decision: D,
    name: String,
}

impl<D: DecisionOracle> OraclePlayer<D> {
    /// Creates a player that asks `decision` for every move.
    pub fn new(decision: D, name: impl Into<String>) -> Self {
        Self {
            decision,
            name: name.into(),
        }
    }

    /// The decision oracle this player consults.
    pub fn decision(&self) -> &D {
        &self.decision
    }
}

impl<D: DecisionOracle> MoveSource for OraclePlayer<D> {
    fn request_move(&mut self, turn: &Turn<'_>) -> Candidate {
        let legal_moves = match turn.rules.legal_moves(turn.board, turn.side) {
            Ok(moves) => moves,
            Err(err) => {
                warn!("Could not enumerate legal moves for {}: {err}", turn.side);
                return Candidate::NoMoveAvailable;
            }
        };

        if legal_moves.is_empty() {
            warn!("No legal moves for {}", turn.side);
            return Candidate::NoMoveAvailable;
        }

        let tokens = legal_moves.iter().map(Move::to_uci).collect::<Vec<_>>();
        let board = turn.board.to_compact();

        let token = match self.decision.choose_move(turn.side, &board, &tokens) {
            Ok(Some(token)) => token,
            Ok(None) => return Candidate::NoMoveAvailable,
            Err(err) => {
                warn!("Decision oracle failed for {}: {err}", turn.side);
                return Candidate::NoMoveAvailable;
            }
        };

        match Move::from_uci(&token) {
            Ok(mv) => {
                info!("{} suggests {mv} for {}", self.name, turn.side);
                Candidate::Play(mv)
            }
            Err(err) => {
                warn!("Decision oracle answered {token:?}, which is not a move: {err}");
                Candidate::NoMoveAvailable
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
