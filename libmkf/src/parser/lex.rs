//! Lexes the text of one alternative into tokens, then checks the sequence
//! of token kinds against the handful of shapes an alternative may take.

use super::space;
use crate::fault::SyntaxErr;
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1, take_while_m_n},
    character::complete::{anychar, char, digit1, none_of},
    combinator::{map, map_res, opt, recognize, value},
    error::ErrorKind,
    multi::many0,
    sequence::{delimited, pair},
    IResult,
};
use once_cell::sync::Lazy;
use regex::Regex;

/// Upper bound on the number of tokens in one alternative.
pub const MAX_TOKENS: usize = 128;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Tok<'a> {
    /// The empty marker `""`.
    Empty,
    Space,
    /// Contents of a `"…"` literal, without the quotes.
    Literal(&'a str),
    /// `'x'`, `'XXXX'`, `'XXXXX'` or `'10XXXX'`.
    CodePoint(u32),
    Dot,
    Minus,
    /// Contents of a `/…/` regex, still escaped.
    Regex(&'a str),
    Rule(&'a str),
    /// One of `?`, `+`, `*`, `{m}` or `{m,n}`.
    Quantifier(&'a str),
    Separator,
}

impl Tok<'_> {
    /// The single character standing for this token's kind in the sentence
    /// checked by `validate`.
    pub fn symbol(&self) -> char {
        match self {
            Tok::Empty => 'E',
            Tok::Space => ' ',
            Tok::Literal(_) => 'L',
            Tok::CodePoint(_) => 'S',
            Tok::Dot => '.',
            Tok::Minus => '-',
            Tok::Regex(_) => 'r',
            Tok::Rule(_) => 'R',
            Tok::Quantifier(_) => '#',
            Tok::Separator => '§',
        }
    }
}

pub struct Lexer<'input> {
    text: &'input str,
    input: &'input str,
    done: bool,
}

impl<'input> Lexer<'input> {
    pub fn new(text: &'input str) -> Self {
        Self {
            text,
            input: text,
            done: false,
        }
    }

    /// Byte offset of the lexer into the alternative's text.
    fn column(&self) -> usize {
        self.text.len() - self.input.len()
    }
}

impl<'input> From<&'input str> for Lexer<'input> {
    fn from(text: &'input str) -> Self {
        Self::new(text)
    }
}

impl<'input> Iterator for Lexer<'input> {
    type Item = Result<Tok<'input>, SyntaxErr>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match lexeme_parser(self.input) {
            Ok((rest, tok)) => {
                self.input = rest;
                // Whatever follows is layout or a trailing comment.
                if space::blank_or_comment(rest) {
                    self.done = true;
                }
                Some(Ok(tok))
            }
            Err(_) => {
                self.done = true;
                Some(Err(SyntaxErr::Tokenize {
                    column: self.column(),
                }))
            }
        }
    }
}

/// Tokenizes and validates one alternative. Whitespace tokens are dropped
/// from the result.
pub fn tokenize(text: &str) -> Result<Vec<Tok<'_>>, SyntaxErr> {
    let mut tokens = Vec::new();
    for tok in Lexer::new(text) {
        if tokens.len() == MAX_TOKENS {
            return Err(SyntaxErr::TooManyTokens { max: MAX_TOKENS });
        }
        tokens.push(tok?);
    }

    validate(&tokens)?;

    tokens.retain(|tok| *tok != Tok::Space);
    Ok(tokens)
}

/// The shapes an alternative is made of, written as token-kind sentences.
/// Order matters: ranges must collapse before lone code points do.
const ACCEPTED: &[&str] = &[
    " L ", " r ", " R§R ", " R§S ", " R# ", " R ", " S . S ", " S.S ", " S ", " - ", " E ",
];

/// Collapses every accepted shape in the token-kind sentence and complains
/// about whatever is left. The exact item structure is checked later, by the
/// item compiler.
fn validate(tokens: &[Tok]) -> Result<(), SyntaxErr> {
    let mut sentence: String = std::iter::once(' ')
        .chain(tokens.iter().map(Tok::symbol))
        .chain(std::iter::once(' '))
        .collect();

    for shape in ACCEPTED {
        // Two neighbouring shapes share the space between them, so a single
        // pass only collapses every other one.
        for _ in 0..2 {
            sentence = sentence.replace(shape, " ! ");
        }
    }

    if sentence.contains('§') {
        Err(SyntaxErr::SeparatorMisuse)
    } else if !sentence.trim_matches(|ch| ch == '!' || ch == ' ').is_empty() {
        Err(SyntaxErr::UnrecognizedAlternative)
    } else {
        Ok(())
    }
}

fn lexeme_parser(input: &str) -> IResult<&str, Tok<'_>> {
    alt((
        empty,
        whitespace,
        literal,
        single_char,
        simple_hex,
        ten_hex,
        value(Tok::Dot, char('.')),
        value(Tok::Minus, char('-')),
        regex,
        map(space::rule_name, Tok::Rule),
        quantifier,
        value(Tok::Separator, char('§')),
    ))(input)
}

fn empty(input: &str) -> IResult<&str, Tok<'_>> {
    value(Tok::Empty, tag("\"\""))(input)
}

fn whitespace(input: &str) -> IResult<&str, Tok<'_>> {
    value(Tok::Space, take_while1(|ch: char| ch == ' ' || ch == '\t'))(input)
}

fn literal(input: &str) -> IResult<&str, Tok<'_>> {
    let contents = take_while1(|ch: char| ch != '"' && !ch.is_control());
    map(delimited(char('"'), contents, char('"')), Tok::Literal)(input)
}

/// Any single character outside the Unicode "Other" categories (controls,
/// format characters, surrogates, private use, unassigned).
static SINGLE_CHAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^'([^\p{C}])'").unwrap_or_else(|e| panic!("invalid built-in regex: {}", e))
});

fn single_char(input: &str) -> IResult<&str, Tok<'_>> {
    let found = SINGLE_CHAR.captures(input).and_then(|caps| {
        let end = caps.get(0)?.end();
        let ch = caps.get(1)?.as_str().chars().next()?;
        Some((end, ch))
    });
    match found {
        Some((end, ch)) => Ok((&input[end..], Tok::CodePoint(ch as u32))),
        None => Err(nom::Err::Error(nom::error::Error::new(
            input,
            ErrorKind::RegexpCapture,
        ))),
    }
}

fn is_upper_hex(ch: char) -> bool {
    ch.is_ascii_digit() || ('A'..='F').contains(&ch)
}

fn hex_code_point(hex: &str) -> Result<Tok<'_>, std::num::ParseIntError> {
    u32::from_str_radix(hex, 16).map(Tok::CodePoint)
}

/// `'XXXX'` or `'XXXXX'`.
fn simple_hex(input: &str) -> IResult<&str, Tok<'_>> {
    let digits = take_while_m_n(4, 5, is_upper_hex);
    map_res(delimited(char('\''), digits, char('\'')), hex_code_point)(input)
}

/// `'10XXXX'`, the top plane.
fn ten_hex(input: &str) -> IResult<&str, Tok<'_>> {
    let digits = recognize(pair(tag("10"), take_while_m_n(4, 4, is_upper_hex)));
    map_res(delimited(char('\''), digits, char('\'')), hex_code_point)(input)
}

/// `/…/`. A backslash escapes whatever follows it, so the body may contain
/// `\/` and may end in `\\`.
fn regex(input: &str) -> IResult<&str, Tok<'_>> {
    let escaped = recognize(pair(char('\\'), anychar));
    let body = recognize(many0(alt((escaped, recognize(none_of("/\\"))))));
    map(delimited(char('/'), body, char('/')), Tok::Regex)(input)
}

fn quantifier(input: &str) -> IResult<&str, Tok<'_>> {
    let bounds = recognize(delimited(
        char('{'),
        pair(digit1, opt(pair(char(','), digit1))),
        char('}'),
    ));
    map(alt((tag("?"), bounds, tag("+"), tag("*"))), Tok::Quantifier)(input)
}
