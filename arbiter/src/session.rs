use std::fmt;

use arbiter_core::{Board, Color, Move};
use log::{info, trace, warn};

use crate::{Candidate, MoveSource, OracleError, RulesOracle, SessionError, Turn};

/// Number of attempts a non-interactive source gets per ply, by default.
pub const DEFAULT_RETRIES: usize = 3;

/// Where a [`Session`] stands.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum SessionState {
    /// Waiting for the given side to move.
    AwaitingMove(Color),
    /// A move by the given side is being validated and applied.
    Evaluating(Color),
    /// The given side was announced in check, and it is their move.
    CheckAnnounced(Color),
    /// The game ended with the given side checkmating their opponent.
    Checkmate { winner: Color },
    /// The game was ended by request.
    Aborted,
}

impl SessionState {
    /// The side whose move is awaited, if moves are being accepted.
    pub const fn side_to_move(&self) -> Option<Color> {
        match self {
            Self::AwaitingMove(side) | Self::CheckAnnounced(side) => Some(*side),
            _ => None,
        }
    }

    /// Returns `true` once the game is over.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Checkmate { .. } | Self::Aborted)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AwaitingMove(side) => write!(f, "awaiting {side}'s move"),
            Self::Evaluating(side) => write!(f, "evaluating {side}'s move"),
            Self::CheckAnnounced(side) => write!(f, "{side} is in check"),
            Self::Checkmate { winner } => write!(f, "checkmate, {winner} wins"),
            Self::Aborted => write!(f, "aborted"),
        }
    }
}

/// The result of a successfully played (or ended) ply.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum PlyOutcome {
    /// The move was played; nothing else happened.
    Moved(Move),
    /// The move was played and put `side` in check.
    Check { mv: Move, side: Color },
    /// The move was played and checkmated the opponent.
    Checkmate { mv: Move, winner: Color },
    /// The player quit instead of moving.
    Aborted,
}

/// Hooks for reporting what happens during a game.
///
/// Every method defaults to doing nothing.
pub trait SessionObserver {
    /// A move is about to be requested on `board`.
    fn on_turn(&mut self, _board: &Board, _state: SessionState) {}

    /// `side` played `mv`.
    fn on_move(&mut self, _side: Color, _mv: Move) {}

    /// `side` offered text that is not a move.
    fn on_malformed(&mut self, _side: Color, _input: &str) {}

    /// The rules oracle rejected `mv` for `side`.
    fn on_illegal(&mut self, _side: Color, _mv: Move) {}

    /// `side` could not produce a playable move within its attempts.
    fn on_forfeit(&mut self, _side: Color, _reason: &SessionError) {}

    /// `side` is in check.
    fn on_check(&mut self, _side: Color) {}

    /// `winner` checkmated their opponent.
    fn on_checkmate(&mut self, _winner: Color) {}

    /// The game was ended by request.
    fn on_abort(&mut self) {}
}

/// An observer that ignores everything.
impl SessionObserver for () {}

/// One game of chess, refereed by a [`RulesOracle`].
///
/// The session owns the board and is its only writer. Every move, no matter
/// where it came from, is checked with the rules oracle before it is applied,
/// and after it is applied the opponent is checked for checkmate, then check.
///
/// Oracle failures never grant anything: a move the oracle could not judge is
/// illegal, and a checkmate or check it could not judge did not happen.
pub struct Session<R> {
    board: Board,
    state: SessionState,
    rules: R,
    retries: usize,
}

impl<R: RulesOracle> Session<R> {
    /// Starts a game from the initial position with White to move.
    pub fn new(rules: R) -> Self {
        Self::from_position(rules, Board::new(), Color::White)
    }

    /// Starts a game from `board` with `side` to move.
    pub fn from_position(rules: R, board: Board, side: Color) -> Self {
        Self {
            board,
            state: SessionState::AwaitingMove(side),
            rules,
            retries: DEFAULT_RETRIES,
        }
    }

    /// Sets how many attempts a non-interactive source gets per ply. At least one is always allowed.
    pub fn with_retries(mut self, retries: usize) -> Self {
        self.retries = retries.max(1);
        self
    }

    /// The current position.
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// The current state.
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// The side whose move is awaited, if the game is still going.
    pub const fn side_to_move(&self) -> Option<Color> {
        self.state.side_to_move()
    }

    /// Returns `true` once the game is over.
    pub const fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// The rules oracle refereeing this game.
    pub const fn rules(&self) -> &R {
        &self.rules
    }

    /// Ends the game by request.
    pub fn quit(&mut self) -> Result<(), SessionError> {
        if self.is_terminal() {
            return Err(SessionError::SessionTerminal);
        }
        self.transition(SessionState::Aborted);
        Ok(())
    }

    /// Plays `mv` for the side to move.
    ///
    /// If the rules oracle rejects `mv` (or cannot be reached), nothing changes
    /// and [`SessionError::IllegalMove`] is returned. Otherwise the move is
    /// applied and the opponent is examined for checkmate, then check.
    pub fn submit(
        &mut self,
        mv: Move,
        observer: &mut dyn SessionObserver,
    ) -> Result<PlyOutcome, SessionError> {
        let side = self.side_to_move().ok_or(SessionError::SessionTerminal)?;
        let previous = self.state;

        self.transition(SessionState::Evaluating(side));
        let legal = fail_closed(
            self.rules.is_legal_move(&self.board, side, mv),
            "legal_move",
        );
        if !legal {
            self.transition(previous);
            observer.on_illegal(side, mv);
            return Err(SessionError::IllegalMove(mv));
        }

        self.board.apply_move(mv);
        info!("{side} played {mv}");
        observer.on_move(side, mv);

        let opponent = side.opponent();

        if fail_closed(
            self.rules.is_checkmate(&self.board, opponent),
            "is_checkmate",
        ) {
            self.transition(SessionState::Checkmate { winner: side });
            observer.on_checkmate(side);
            return Ok(PlyOutcome::Checkmate { mv, winner: side });
        }

        if fail_closed(self.rules.is_in_check(&self.board, opponent), "in_check") {
            self.transition(SessionState::CheckAnnounced(opponent));
            observer.on_check(opponent);
            return Ok(PlyOutcome::Check { mv, side: opponent });
        }

        self.transition(SessionState::AwaitingMove(opponent));
        Ok(PlyOutcome::Moved(mv))
    }

    /// Asks `source` for a move for the side to move until one is played or the player quits.
    ///
    /// Malformed input and illegal moves are reported to `observer` and the
    /// source is asked again. An interactive source is asked until it produces
    /// a legal move or quits. A non-interactive source gets the configured
    /// number of attempts; once they run out the ply is forfeited: the board
    /// is left as it was, the opponent is to move, and the last error is
    /// returned.
    pub fn play_turn(
        &mut self,
        source: &mut dyn MoveSource,
        observer: &mut dyn SessionObserver,
    ) -> Result<PlyOutcome, SessionError> {
        let side = self.side_to_move().ok_or(SessionError::SessionTerminal)?;
        let mut failures = 0;

        loop {
            let candidate = source.request_move(&Turn {
                board: &self.board,
                side,
                rules: &self.rules,
            });

            let err = match candidate {
                Candidate::Play(mv) => match self.submit(mv, observer) {
                    Ok(outcome) => return Ok(outcome),
                    Err(err) => err,
                },
                Candidate::Quit => {
                    self.quit()?;
                    observer.on_abort();
                    return Ok(PlyOutcome::Aborted);
                }
                Candidate::Malformed(input) => {
                    observer.on_malformed(side, &input);
                    SessionError::MalformedInput(input)
                }
                Candidate::NoMoveAvailable => SessionError::OracleUnavailable(format!(
                    "{} had no move for {side}",
                    source.name()
                )),
            };

            if source.is_interactive() {
                continue;
            }

            failures += 1;
            warn!(
                "Attempt {failures}/{} by {} failed: {err}",
                self.retries,
                source.name()
            );
            if failures >= self.retries {
                self.transition(SessionState::AwaitingMove(side.opponent()));
                observer.on_forfeit(side, &err);
                return Err(err);
            }
        }
    }

    /// Plays until the game is over, asking `white` and `black` for their moves in turn.
    ///
    /// The game only ends on a quit or a checkmate. A side that forfeits its
    /// ply (see [`Session::play_turn`]) simply loses its turn.
    pub fn play(
        &mut self,
        white: &mut dyn MoveSource,
        black: &mut dyn MoveSource,
        observer: &mut dyn SessionObserver,
    ) -> SessionState {
        while let Some(side) = self.side_to_move() {
            observer.on_turn(&self.board, self.state);

            let source: &mut dyn MoveSource = match side {
                Color::White => &mut *white,
                Color::Black => &mut *black,
            };

            if let Err(err) = self.play_turn(source, observer) {
                warn!("{side} forfeited its move: {err}");
            }
        }

        self.state
    }

    fn transition(&mut self, next: SessionState) {
        trace!("{:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

/// Reads an oracle answer, treating an unanswered query as `false`.
fn fail_closed(answer: Result<bool, OracleError>, query: &str) -> bool {
    answer.unwrap_or_else(|err| {
        warn!("{query} could not be answered, assuming false: {err}");
        false
    })
}
