use std::{fmt, str::FromStr};

use anyhow::{anyhow, bail, Result};

/// A square on an 8x8 chessboard.
///
/// Rows and columns are zero-based: row `0` is rank 1 and column `0` is file a.
/// A [`Square`] can only be constructed in range.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    row: u8,
    col: u8,
}

impl Square {
    /// Number of rows (and columns) on the board.
    pub const SIZE: usize = 8;

    /// Number of squares on the board.
    pub const COUNT: usize = Self::SIZE * Self::SIZE;

    /// Creates a new [`Square`] from a zero-based row and column.
    ///
    /// # Example
    /// ```
    /// # use arbiter_core::Square;
    /// let e2 = Square::new(1, 4).unwrap();
    /// assert_eq!(e2.to_string(), "e2");
    /// assert!(Square::new(8, 0).is_err());
    /// ```
    pub fn new(row: usize, col: usize) -> Result<Self> {
        if row >= Self::SIZE || col >= Self::SIZE {
            bail!("Square coordinates must be within [0,7]. Got row {row}, col {col}.");
        }
        Ok(Self {
            row: row as u8,
            col: col as u8,
        })
    }

    /// Creates a new [`Square`] from a one-based rank and file, as used in rules-oracle terms.
    ///
    /// # Example
    /// ```
    /// # use arbiter_core::Square;
    /// let a1 = Square::from_rank_file(1, 1).unwrap();
    /// assert_eq!((a1.row(), a1.col()), (0, 0));
    /// assert!(Square::from_rank_file(0, 1).is_err());
    /// ```
    pub fn from_rank_file(rank: usize, file: usize) -> Result<Self> {
        if !(1..=Self::SIZE).contains(&rank) || !(1..=Self::SIZE).contains(&file) {
            bail!("Rank and file must be within [1,8]. Got rank {rank}, file {file}.");
        }
        Self::new(rank - 1, file - 1)
    }

    /// An iterator over all squares in row-major order, starting at a1.
    pub fn iter() -> impl Iterator<Item = Self> {
        (0..Self::SIZE).flat_map(|row| (0..Self::SIZE).map(move |col| Self::at(row, col)))
    }

    /// Internal constructor for coordinates already known to be in range.
    pub(crate) const fn at(row: usize, col: usize) -> Self {
        Self {
            row: row as u8,
            col: col as u8,
        }
    }

    /// Zero-based row of this [`Square`].
    pub const fn row(&self) -> usize {
        self.row as usize
    }

    /// Zero-based column of this [`Square`].
    pub const fn col(&self) -> usize {
        self.col as usize
    }

    /// One-based rank of this [`Square`].
    pub const fn rank(&self) -> usize {
        self.row as usize + 1
    }

    /// One-based file of this [`Square`].
    pub const fn file(&self) -> usize {
        self.col as usize + 1
    }

    /// The file letter of this [`Square`], `'a'` through `'h'`.
    pub const fn file_char(&self) -> char {
        (b'a' + self.col) as char
    }

    /// The rank digit of this [`Square`], `'1'` through `'8'`.
    pub const fn rank_char(&self) -> char {
        (b'1' + self.row) as char
    }

    /// Returns `true` if this [`Square`] is a light square.
    pub const fn is_light(&self) -> bool {
        (self.row + self.col) % 2 != 0
    }

    /// Parses a [`Square`] from `<file-letter><rank-digit>` notation.
    ///
    /// The file letter is case-insensitive.
    ///
    /// # Example
    /// ```
    /// # use arbiter_core::Square;
    /// let e4 = Square::from_uci("E4").unwrap();
    /// assert_eq!((e4.row(), e4.col()), (3, 4));
    /// assert!(Square::from_uci("i1").is_err());
    /// assert!(Square::from_uci("a9").is_err());
    /// ```
    pub fn from_uci(square: &str) -> Result<Self> {
        let mut chars = square.chars();
        let file = chars
            .next()
            .ok_or(anyhow!("Square str must contain a file letter."))?
            .to_ascii_lowercase();
        let rank = chars
            .next()
            .ok_or(anyhow!("Square str must contain a rank digit."))?;

        if chars.next().is_some() {
            bail!("Square str must be exactly 2 chars long. Got {square:?}");
        }
        if !('a'..='h').contains(&file) {
            bail!("File letters must be [a, h]. Found {file:?}");
        }
        if !('1'..='8').contains(&rank) {
            bail!("Rank digits must be [1, 8]. Found {rank:?}");
        }

        Ok(Self::at(
            (rank as u8 - b'1') as usize,
            (file as u8 - b'a') as usize,
        ))
    }
}

impl FromStr for Square {
    type Err = anyhow::Error;
    /// Alias for [`Square::from_uci`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_uci(s)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}

impl fmt::Debug for Square {
    /// Debug formatting shows the square's name and its zero-based coordinates.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self} ({},{})", self.row, self.col)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_iter_is_row_major() {
        let squares = Square::iter().collect::<Vec<_>>();
        assert_eq!(squares.len(), Square::COUNT);
        assert_eq!(squares[0].to_string(), "a1");
        assert_eq!(squares[1].to_string(), "b1");
        assert_eq!(squares[8].to_string(), "a2");
        assert_eq!(squares[63].to_string(), "h8");
    }

    #[test]
    fn test_square_colors() {
        assert!(!Square::from_uci("a1").unwrap().is_light());
        assert!(Square::from_uci("h1").unwrap().is_light());
        assert!(!Square::from_uci("h8").unwrap().is_light());
    }

    #[test]
    fn test_one_based_conversions() {
        let g7 = Square::from_uci("g7").unwrap();
        assert_eq!((g7.rank(), g7.file()), (7, 7));
        assert_eq!(Square::from_rank_file(7, 7).unwrap(), g7);
        assert!(Square::from_rank_file(9, 1).is_err());
    }
}
