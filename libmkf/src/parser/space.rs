//! Recognisers for the layout of a grammar line: blanks, comments,
//! indentation and rule-name headers.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    IResult,
};

/// True when `s` holds nothing but whitespace, or whitespace and then a
/// comment. A comment starts with `//` and runs to the end of the line.
pub fn blank_or_comment(s: &str) -> bool {
    let s = s.trim();
    s.is_empty() || s.starts_with("//")
}

/// One indentation unit: exactly four spaces or a single tab.
pub fn indentation(line: &str) -> IResult<&str, &str> {
    alt((tag("    "), tag("\t")))(line)
}

/// A rule name: ASCII letters and underscores.
pub fn rule_name(input: &str) -> IResult<&str, &str> {
    take_while1(|ch: char| ch.is_ascii_alphabetic() || ch == '_')(input)
}
