//! Token grammar for the report-control keywords.
//!
//! RPTRST, RPTSCHED and RPTSOL carry free-form token lists rather than
//! fixed-slot records. A token is one of:
//!
//! - `NAME` — a mnemonic flag, implicitly value 1
//! - `NAME=VALUE` — a mnemonic assignment (`NAME=` alone also means 1)
//! - a bare integer — one slot of the legacy positional style
//! - a lone `=` — produced by decks that write `NAME = VALUE` with spaces
//!
//! Classification is all this grammar does; deciding whether a token mix is
//! legal (and salvaging legacy spacing) is the resolver's job.

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, digit1},
    combinator::{all_consuming, map, map_res, opt, recognize},
    multi::many0,
    sequence::pair,
};

/// One classified report-control token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RptToken {
    /// `NAME=VALUE` (or `NAME=`, which reads as value 1).
    Assign { name: String, value: i64 },
    /// A bare mnemonic name; flag semantics, value 1.
    Flag(String),
    /// A bare integer: one positional slot.
    Integer(i64),
    /// A lone `=` separating a name token from a value token.
    Equals,
}

impl RptToken {
    pub fn is_integer(&self) -> bool {
        matches!(self, RptToken::Integer(_))
    }
}

/// Parse a (possibly negative) integer.
fn integer(input: &str) -> IResult<&str, i64> {
    map_res(
        recognize(pair(opt(char('-')), digit1)),
        |s: &str| s.parse::<i64>(),
    )
    .parse(input)
}

/// Parse a mnemonic name: letters, then letters/digits/underscores.
fn name(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alpha1,
        many0(alt((alphanumeric1, tag("_")))),
    ))
    .parse(input)
}

/// Parse `NAME=VALUE` or `NAME=`.
fn assignment(input: &str) -> IResult<&str, RptToken> {
    map(
        (name, char('='), opt(integer)),
        |(name, _, value)| RptToken::Assign {
            name: name.to_string(),
            value: value.unwrap_or(1),
        },
    )
    .parse(input)
}

/// Parse a bare mnemonic flag.
fn flag(input: &str) -> IResult<&str, RptToken> {
    map(name, |n: &str| RptToken::Flag(n.to_string())).parse(input)
}

/// Parse a lone positional integer.
fn bare_integer(input: &str) -> IResult<&str, RptToken> {
    map(integer, RptToken::Integer).parse(input)
}

/// Parse a lone `=`.
fn lone_equals(input: &str) -> IResult<&str, RptToken> {
    map(char('='), |_| RptToken::Equals).parse(input)
}

/// Classify one whitespace-free token, requiring the full text to match.
pub(crate) fn classify_token(text: &str) -> Result<RptToken, String> {
    all_consuming(alt((assignment, bare_integer, lone_equals, flag)))
        .parse(text)
        .map(|(_, token)| token)
        .map_err(|_| text.to_string())
}

/// Split an item on whitespace and classify every piece.
///
/// Decks occasionally pack several tokens into one quoted item
/// (`'BASIC=3 FREQ=2'`); splitting here keeps the resolver agnostic of how
/// the external parser grouped them.
pub(crate) fn tokenize(text: &str) -> Result<Vec<RptToken>, String> {
    text.split_whitespace().map(classify_token).collect()
}
