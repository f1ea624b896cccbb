use std::fmt;

use super::{Color, Move, Piece, PieceKind, Square};

/// Back-rank piece order, from file a to file h.
const BACK_RANK: [PieceKind; Square::SIZE] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/// An 8x8 grid of optional pieces, indexed `[row][col]`.
///
/// Row `0` is rank 1 and column `0` is file a.
///
/// The board is a plain container. It knows nothing about legality, check,
/// captures, or special moves; all of that is decided by the rules oracle.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Board {
    squares: [[Option<Piece>; Square::SIZE]; Square::SIZE],
}

impl Board {
    /// Creates a [`Board`] set up in the standard initial position.
    pub fn new() -> Self {
        let mut board = Self::empty();
        board.setup_initial_position();
        board
    }

    /// Creates a [`Board`] with no pieces on it.
    pub const fn empty() -> Self {
        Self {
            squares: [[None; Square::SIZE]; Square::SIZE],
        }
    }

    /// Removes every piece from the board.
    pub fn clear(&mut self) {
        self.squares = [[None; Square::SIZE]; Square::SIZE];
    }

    /// Clears the board and places all 32 pieces in their starting squares.
    pub fn setup_initial_position(&mut self) {
        self.clear();

        for (col, kind) in BACK_RANK.into_iter().enumerate() {
            self.squares[0][col] = Some(Piece::new(Color::White, kind));
            self.squares[1][col] = Some(Piece::WHITE_PAWN);
            self.squares[6][col] = Some(Piece::BLACK_PAWN);
            self.squares[7][col] = Some(Piece::new(Color::Black, kind));
        }
    }

    /// Fetches the piece at the zero-based `(row, col)`, if there is one.
    ///
    /// Out-of-range coordinates yield `None`, same as an empty square.
    ///
    /// # Example
    /// ```
    /// # use arbiter_core::{Board, Piece};
    /// let board = Board::new();
    /// assert_eq!(board.get(0, 4), Some(Piece::WHITE_KING));
    /// assert_eq!(board.get(4, 4), None);
    /// assert_eq!(board.get(8, 4), None);
    /// ```
    pub fn get(&self, row: usize, col: usize) -> Option<Piece> {
        self.squares.get(row)?.get(col).copied().flatten()
    }

    /// Places `piece` (or nothing) at the zero-based `(row, col)`.
    ///
    /// Out-of-range coordinates are ignored.
    pub fn set(&mut self, row: usize, col: usize, piece: Option<Piece>) {
        if let Some(square) = self.squares.get_mut(row).and_then(|r| r.get_mut(col)) {
            *square = piece;
        }
    }

    /// Fetches the piece at `square`, if there is one.
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.squares[square.row()][square.col()]
    }

    /// Places `piece` (or nothing) at `square`.
    pub fn set_piece_at(&mut self, square: Square, piece: Option<Piece>) {
        self.squares[square.row()][square.col()] = piece;
    }

    /// Returns `true` if there is a piece at `square`.
    pub fn has(&self, square: Square) -> bool {
        self.piece_at(square).is_some()
    }

    /// An iterator over every occupied square and its piece, in row-major order.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::iter().filter_map(|square| Some((square, self.piece_at(square)?)))
    }

    /// Moves whatever stands on `mv.from()` to `mv.to()`, leaving `mv.from()` empty.
    ///
    /// Anything on the destination is overwritten. Promotion, castling and
    /// en passant are not special-cased here: this is plain relocation, and
    /// those semantics belong to the rules oracle. Extending the board model
    /// for them starts at this method.
    ///
    /// # Example
    /// ```
    /// # use arbiter_core::{Board, Move, Piece};
    /// let mut board = Board::new();
    /// board.apply_move(Move::from_uci("e2e4").unwrap());
    /// assert_eq!(board.get(1, 4), None);
    /// assert_eq!(board.get(3, 4), Some(Piece::WHITE_PAWN));
    /// ```
    pub fn apply_move(&mut self, mv: Move) {
        let piece = self.piece_at(mv.from());
        self.set_piece_at(mv.to(), piece);
        self.set_piece_at(mv.from(), None);
    }

    /// Serializes every occupied square as a rules-oracle term list.
    ///
    /// Each record is `piece(<kind>,<side>,<rank>,<file>)` with a one-based
    /// rank and file. Records appear in row-major order and empty squares are
    /// omitted.
    ///
    /// # Example
    /// ```
    /// # use arbiter_core::{Board, Piece};
    /// let mut board = Board::empty();
    /// board.set(0, 4, Some(Piece::WHITE_KING));
    /// board.set(7, 4, Some(Piece::BLACK_KING));
    /// assert_eq!(
    ///     board.to_rules_term(),
    ///     "[piece(king,white,1,5), piece(king,black,8,5)]"
    /// );
    /// ```
    pub fn to_rules_term(&self) -> String {
        let records = self
            .pieces()
            .map(|(square, piece)| {
                format!(
                    "piece({},{},{},{})",
                    piece.kind().name(),
                    piece.color().name(),
                    square.rank(),
                    square.file()
                )
            })
            .collect::<Vec<_>>();

        format!("[{}]", records.join(", "))
    }

    /// Encodes the board as 64 characters for the decision oracle.
    ///
    /// Squares run from a1 to h1, then a2 to h2, and so on up to h8. An empty
    /// square is `.`; a piece is its [`Piece::to_char`].
    ///
    /// # Example
    /// ```
    /// # use arbiter_core::Board;
    /// let compact = Board::new().to_compact();
    /// assert_eq!(&compact[..16], "RNBQKBNRPPPPPPPP");
    /// assert_eq!(&compact[48..], "pppppppprnbqkbnr");
    /// ```
    pub fn to_compact(&self) -> String {
        Square::iter()
            .map(|square| self.piece_at(square).map(|p| p.to_char()).unwrap_or('.'))
            .collect()
    }
}

impl Default for Board {
    /// A default [`Board`] is in the standard initial position.
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    /// Renders the board for a terminal, rank 8 at the top.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let files = "    a   b   c   d   e   f   g   h";

        writeln!(f, "{files}")?;
        writeln!(f, "  ╔═══╦═══╦═══╦═══╦═══╦═══╦═══╦═══╗")?;
        for row in (0..Square::SIZE).rev() {
            write!(f, "{} ║", row + 1)?;
            for col in 0..Square::SIZE {
                let square = Square::at(row, col);
                match self.piece_at(square) {
                    Some(piece) => write!(f, " {} ║", piece.glyph())?,
                    None if square.is_light() => write!(f, "   ║")?,
                    None => write!(f, " · ║")?,
                }
            }
            writeln!(f, " {}", row + 1)?;

            if row > 0 {
                writeln!(f, "  ╠═══╬═══╬═══╬═══╬═══╬═══╬═══╬═══╣")?;
            }
        }
        writeln!(f, "  ╚═══╩═══╩═══╩═══╩═══╩═══╩═══╩═══╝")?;
        write!(f, "{files}")
    }
}

impl fmt::Debug for Board {
    /// Debug formatting shows one rank per line using piece characters, rank 8 first.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..Square::SIZE).rev() {
            write!(f, "{}|", row + 1)?;
            for col in 0..Square::SIZE {
                let piece_char = self.get(row, col).map(|p| p.to_char()).unwrap_or('.');
                write!(f, " {piece_char}")?;
            }
            writeln!(f)?;
        }
        write!(f, " +----------------\n   a b c d e f g h")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_initial_position_term() {
        let term = Board::new().to_rules_term();
        let records = term
            .trim_start_matches('[')
            .trim_end_matches(']')
            .split(", ")
            .collect::<Vec<_>>();

        assert_eq!(records.len(), 32);
        assert_eq!(records[0], "piece(rook,white,1,1)");
        assert_eq!(records[4], "piece(king,white,1,5)");
        assert_eq!(records[8], "piece(pawn,white,2,1)");
        assert_eq!(records[16], "piece(pawn,black,7,1)");
        assert_eq!(records[27], "piece(queen,black,8,4)");
        assert_eq!(records[31], "piece(rook,black,8,8)");

        for record in &records {
            let rank = record.split(',').nth(2).unwrap();
            assert!(["1", "2", "7", "8"].contains(&rank), "{record}");
        }
    }

    #[test]
    fn test_term_for_each_side_has_sixteen_records() {
        let term = Board::new().to_rules_term();
        assert_eq!(term.matches(",white,").count(), 16);
        assert_eq!(term.matches(",black,").count(), 16);
    }

    #[test]
    fn test_empty_board_term() {
        assert_eq!(Board::empty().to_rules_term(), "[]");
        assert_eq!(Board::empty().to_compact(), ".".repeat(64));
    }

    #[test]
    fn test_apply_move_only_touches_two_squares() {
        let before = Board::new();
        let mv = Move::from_uci("g1f3").unwrap();
        let mut after = before.clone();
        after.apply_move(mv);

        for square in Square::iter() {
            if square == mv.from() {
                assert_eq!(after.piece_at(square), None);
            } else if square == mv.to() {
                assert_eq!(after.piece_at(square), Some(Piece::WHITE_KNIGHT));
            } else {
                assert_eq!(after.piece_at(square), before.piece_at(square));
            }
        }
    }

    #[test]
    fn test_apply_move_overwrites_capture() {
        let mut board = Board::new();
        board.apply_move(Move::from_uci("d1d7").unwrap());
        assert_eq!(board.get(6, 3), Some(Piece::WHITE_QUEEN));
        assert_eq!(board.pieces().count(), 31);
        assert!(board.to_rules_term().contains("piece(queen,white,7,4)"));
    }

    #[test]
    fn test_out_of_range_access_is_soft() {
        let mut board = Board::new();
        let before = board.clone();
        board.set(8, 0, Some(Piece::BLACK_QUEEN));
        board.set(0, 99, None);
        assert_eq!(board, before);
        assert_eq!(board.get(usize::MAX, 0), None);
    }

    #[test]
    fn test_setup_resets_a_mutated_board() {
        let mut board = Board::new();
        board.apply_move(Move::from_uci("e2e4").unwrap());
        board.setup_initial_position();
        assert_eq!(board, Board::default());

        board.clear();
        assert_eq!(board, Board::empty());
    }

    #[test]
    fn test_render_has_ranks_top_down() {
        let rendered = Board::new().to_string();
        let lines = rendered.lines().collect::<Vec<_>>();
        assert!(lines[2].starts_with("8 ║ ♜"));
        assert!(lines[lines.len() - 3].starts_with("1 ║ ♖"));
    }
}
