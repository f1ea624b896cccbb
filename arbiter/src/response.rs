use std::fmt;

use arbiter_core::Move;

/// Printed by the rules oracle when a query holds.
pub const SUCCESS: &str = "SUCCESS";

/// Printed by the rules oracle when a query does not hold.
pub const FAILURE: &str = "FAILURE";

/// Opening of a move record in rules-oracle output.
const RECORD_OPEN: &str = "move(";

/// Why a piece of oracle output could not be read as a response.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum ParseFailure {
    /// Neither verdict token appears.
    NoVerdict,
    /// Both verdict tokens appear.
    ConflictingVerdict,
    /// The output holds nothing but whitespace.
    Empty,
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoVerdict => write!(f, "neither {SUCCESS} nor {FAILURE} was printed"),
            Self::ConflictingVerdict => write!(f, "both {SUCCESS} and {FAILURE} were printed"),
            Self::Empty => write!(f, "nothing was printed"),
        }
    }
}

/// Reads a boolean verdict from rules-oracle output.
///
/// Exactly one of [`SUCCESS`] and [`FAILURE`] must appear somewhere in `output`;
/// whatever surrounds it is ignored.
///
/// # Example
/// ```
/// # use arbiter::response::{parse_verdict, ParseFailure};
/// assert_eq!(parse_verdict("% loaded\nSUCCESS"), Ok(true));
/// assert_eq!(parse_verdict("FAILURE\n"), Ok(false));
/// assert_eq!(parse_verdict("Warning: goal raised exception"), Err(ParseFailure::NoVerdict));
/// ```
pub fn parse_verdict(output: &str) -> Result<bool, ParseFailure> {
    match (output.contains(SUCCESS), output.contains(FAILURE)) {
        (true, false) => Ok(true),
        (false, true) => Ok(false),
        (true, true) => Err(ParseFailure::ConflictingVerdict),
        (false, false) if output.trim().is_empty() => Err(ParseFailure::Empty),
        (false, false) => Err(ParseFailure::NoVerdict),
    }
}

/// Finds every `move(fr,fc,tr,tc)` record in `output`, in order of appearance.
///
/// Coordinates in a record are one-based and converted to a [`Move`]. Each
/// occurrence of `move(` is examined on its own, so surrounding noise is
/// harmless. A record that lacks a coordinate, holds anything other than four
/// comma-separated integers in `1..=8` (ASCII whitespace around each is
/// allowed), or is never closed is skipped.
///
/// # Example
/// ```
/// # use arbiter::response::scan_move_records;
/// let moves = scan_move_records("noise move(2,5,4,5) garbage move(1,1,1,2)x");
/// let moves = moves.iter().map(|mv| mv.to_string()).collect::<Vec<_>>();
/// assert_eq!(moves, ["e2e4", "a1b1"]);
/// ```
pub fn scan_move_records(output: &str) -> Vec<Move> {
    output
        .match_indices(RECORD_OPEN)
        .filter_map(|(start, open)| parse_record_body(&output[start + open.len()..]))
        .collect()
}

/// Parses `n,n,n,n)` at the start of `body`.
fn parse_record_body(body: &str) -> Option<Move> {
    let close = body.find(')')?;

    let mut fields = body[..close].split(',').map(parse_coordinate);
    let from_rank = fields.next()??;
    let from_file = fields.next()??;
    let to_rank = fields.next()??;
    let to_file = fields.next()??;
    if fields.next().is_some() {
        return None;
    }

    Move::from_rank_file(from_rank, from_file, to_rank, to_file).ok()
}

/// Parses a bare unsigned integer, allowing surrounding ASCII whitespace.
fn parse_coordinate(field: &str) -> Option<usize> {
    let field = field.trim_matches(|c: char| c.is_ascii_whitespace());
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

/// Takes the first whitespace-delimited token of `output`.
///
/// # Example
/// ```
/// # use arbiter::response::{first_token, ParseFailure};
/// assert_eq!(first_token("  e2e4\nthinking took 3ms"), Ok("e2e4"));
/// assert_eq!(first_token("\n\n"), Err(ParseFailure::Empty));
/// ```
pub fn first_token(output: &str) -> Result<&str, ParseFailure> {
    output.split_whitespace().next().ok_or(ParseFailure::Empty)
}

#[cfg(test)]
mod test {
    use super::*;

    fn moves(output: &str) -> Vec<String> {
        scan_move_records(output)
            .iter()
            .map(Move::to_uci)
            .collect()
    }

    #[test]
    fn test_verdicts() {
        assert_eq!(parse_verdict("SUCCESS"), Ok(true));
        assert_eq!(parse_verdict("Welcome to SWI-Prolog\nFAILURE"), Ok(false));
        assert_eq!(parse_verdict(""), Err(ParseFailure::Empty));
        assert_eq!(parse_verdict("success"), Err(ParseFailure::NoVerdict));
        assert_eq!(
            parse_verdict("Warning: (legal_move(...) -> write('SUCCESS') ; write('FAILURE'))"),
            Err(ParseFailure::ConflictingVerdict)
        );
    }

    #[test]
    fn test_scan_noisy_output() {
        let scanned = scan_move_records("noise move(2,5,4,5) garbage move(1,1,1,2)x");
        assert_eq!(scanned.len(), 2);

        let first = scanned[0];
        assert_eq!((first.from().row(), first.from().col()), (1, 4));
        assert_eq!((first.to().row(), first.to().col()), (3, 4));

        let second = scanned[1];
        assert_eq!((second.from().row(), second.from().col()), (0, 0));
        assert_eq!((second.to().row(), second.to().col()), (0, 1));
    }

    #[test]
    fn test_scan_list_output() {
        assert_eq!(
            moves("[move(2,5,4,5),move(2,5,3,5),move(1,7,3,6)]\n"),
            ["e2e4", "e2e3", "g1f3"]
        );
        assert_eq!(moves("[move( 2, 4 ,4,4 )]"), ["d2d4"]);
        assert!(moves("[]").is_empty());
        assert!(moves("").is_empty());
    }

    #[test]
    fn test_scan_skips_broken_records() {
        // Missing coordinate, extra coordinate, out-of-range, negative, unclosed, nested
        let output = "move(2,5,4) move(2,5,4,5,6) move(0,1,2,3) move(9,1,1,1) \
                      move(-2,5,4,5) move((2),5,4,5) move(a,b,c,d) move(7,5,5,5)";
        assert_eq!(moves(output), ["e7e5"]);
        assert!(moves("move(2,5,4,5").is_empty());
    }

    #[test]
    fn test_scan_recovers_after_garbled_record() {
        assert_eq!(moves("move(2,5,4 oops move(1,2,3,3)"), ["b1c3"]);
        assert_eq!(moves("all_legal_move(2,5,4,5)"), ["e2e4"]);
    }

    #[test]
    fn test_first_token() {
        assert_eq!(first_token("d2d4"), Ok("d2d4"));
        assert_eq!(first_token("\tg8f6 e7e5\n"), Ok("g8f6"));
        assert_eq!(first_token(""), Err(ParseFailure::Empty));
    }
}
