use std::{fmt, str::FromStr};

use anyhow::{bail, Context, Result};

use super::Square;

/// A move of whatever piece stands on `from` to `to`.
///
/// A [`Move`] carries no notion of legality, captures, or special moves; it is
/// only a pair of in-range squares. Whether it may be played is decided
/// elsewhere.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    from: Square,
    to: Square,
}

impl Move {
    /// Creates a new [`Move`] between two squares.
    pub const fn new(from: Square, to: Square) -> Self {
        Self { from, to }
    }

    /// Creates a new [`Move`] from one-based `(rank, file)` coordinates, as found in rules-oracle output.
    ///
    /// # Example
    /// ```
    /// # use arbiter_core::Move;
    /// let mv = Move::from_rank_file(2, 5, 4, 5).unwrap();
    /// assert_eq!(mv.to_string(), "e2e4");
    /// assert!(Move::from_rank_file(2, 5, 4, 9).is_err());
    /// ```
    pub fn from_rank_file(
        from_rank: usize,
        from_file: usize,
        to_rank: usize,
        to_file: usize,
    ) -> Result<Self> {
        Ok(Self::new(
            Square::from_rank_file(from_rank, from_file)?,
            Square::from_rank_file(to_rank, to_file)?,
        ))
    }

    /// The square this [`Move`] starts on.
    pub const fn from(&self) -> Square {
        self.from
    }

    /// The square this [`Move`] ends on.
    pub const fn to(&self) -> Square {
        self.to
    }

    /// Parses a [`Move`] from coordinate notation.
    ///
    /// Spaces are removed first. What remains must be exactly
    /// `<file-letter><rank-digit><file-letter><rank-digit>`, with file letters
    /// `a..h` (either case) and rank digits `1..8`.
    ///
    /// # Example
    /// ```
    /// # use arbiter_core::Move;
    /// let mv = Move::from_uci("E2 e4").unwrap();
    /// assert_eq!((mv.from().row(), mv.from().col()), (1, 4));
    /// assert_eq!((mv.to().row(), mv.to().col()), (3, 4));
    ///
    /// assert!(Move::from_uci("e2e9").is_err());
    /// assert!(Move::from_uci("e2e4q").is_err());
    /// assert!(Move::from_uci("quit").is_err());
    /// ```
    pub fn from_uci(input: &str) -> Result<Self> {
        let clean = input.chars().filter(|c| *c != ' ').collect::<String>();

        if clean.chars().count() != 4 {
            bail!("Moves must be 4 characters long, like \"e2e4\". Got {input:?}");
        }

        // Slicing fails on a char boundary only for non-ASCII input
        let (from, to) = match (clean.get(0..2), clean.get(2..4)) {
            (Some(from), Some(to)) => (from, to),
            _ => bail!("Moves must be written in ASCII. Got {input:?}"),
        };

        let from = Square::from_uci(from).with_context(|| format!("Invalid move {input:?}"))?;
        let to = Square::from_uci(to).with_context(|| format!("Invalid move {input:?}"))?;

        Ok(Self::new(from, to))
    }

    /// Converts this [`Move`] to its 4-character coordinate notation, lowercase.
    ///
    /// This is also the token format handed to the decision oracle.
    pub fn to_uci(&self) -> String {
        format!("{}{}", self.from, self.to)
    }

    /// The four one-based coordinates `(from_rank, from_file, to_rank, to_file)`.
    pub const fn rank_file(&self) -> [usize; 4] {
        [
            self.from.rank(),
            self.from.file(),
            self.to.rank(),
            self.to.file(),
        ]
    }
}

impl FromStr for Move {
    type Err = anyhow::Error;
    /// Alias for [`Move::from_uci`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_uci(s)
    }
}

impl fmt::Display for Move {
    /// A [`Move`] is displayed in its coordinate notation.
    ///
    /// See [`Move::to_uci`] for more.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?} -> {:?})", self, self.from, self.to)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_every_coordinate_pair_reserializes() {
        for from in Square::iter() {
            for to in [Square::new(0, 0).unwrap(), Square::new(7, 7).unwrap(), from] {
                let text = format!("{from}{to}");
                assert_eq!(Move::from_uci(&text).unwrap().to_uci(), text);
                assert_eq!(
                    Move::from_uci(&text.to_ascii_uppercase()).unwrap().to_uci(),
                    text
                );
            }
        }
    }

    #[test]
    fn test_internal_spaces_are_stripped() {
        let expected = Move::from_uci("g1f3").unwrap();
        assert_eq!(Move::from_uci("g1 f3").unwrap(), expected);
        assert_eq!(Move::from_uci(" g 1 f 3 ").unwrap(), expected);
    }

    #[test]
    fn test_malformed_moves() {
        let bad_moves = [
            "", "e2", "e2e", "e2e4e", "22e4", "e2ee", "z2e4", "e0e4", "exit", "e2\te4", "é2e4",
        ];
        for bad in bad_moves {
            assert!(Move::from_uci(bad).is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn test_rank_file_is_one_based() {
        let mv = Move::from_uci("a1h8").unwrap();
        assert_eq!(mv.rank_file(), [1, 1, 8, 8]);
        assert_eq!(Move::from_rank_file(1, 1, 8, 8).unwrap(), mv);
    }
}
