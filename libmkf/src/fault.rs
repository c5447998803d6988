use thiserror::Error;

pub type GrammarRes<T = ()> = std::result::Result<T, GrammarErr>;
pub type MatchRes<T = ()> = std::result::Result<T, MatchErr>;

/// Raised while compiling grammar text. A failed compilation never hands out
/// a partially built grammar.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum GrammarErr {
    #[error("{kind}, on line: {line}")]
    Syntax { line: usize, kind: SyntaxErr },

    #[error("rule not found: {rule_name}")]
    RuleNotFound { rule_name: String },
}

impl GrammarErr {
    pub fn syntax(kind: SyntaxErr, line: usize) -> Self {
        Self::Syntax { line, kind }
    }

    /// The 0-based line the error was found on. Reference errors concern the
    /// whole grammar and have no line.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Syntax { line, .. } => Some(*line),
            Self::RuleNotFound { .. } => None,
        }
    }
}

/// What went wrong on a single grammar line.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SyntaxErr {
    #[error("duplicate rule `{rule_name}`")]
    DuplicateRule { rule_name: String },

    #[error("unexpected content after rule name")]
    UnexpectedContentAfterRuleName,

    #[error("orphaned alternative")]
    OrphanedAlternative,

    #[error("unable to parse grammar")]
    UnableToParse,

    /// `column` is a 0-based byte offset into the alternative's text (the
    /// part after the indentation unit).
    #[error("couldn't tokenize alternative at column {column}")]
    Tokenize { column: usize },

    #[error("alternative too big (max: {max} tokens)")]
    TooManyTokens { max: usize },

    #[error("misuse of the separator operator")]
    SeparatorMisuse,

    #[error("unrecognized alternative")]
    UnrecognizedAlternative,

    #[error("unallowed empty alternative")]
    UnallowedEmpty,

    #[error("invalid syntax")]
    InvalidSyntax,

    #[error("invalid range")]
    InvalidRange,

    #[error("invalid exclusion range")]
    InvalidExclusionRange,

    #[error("invalid code point {code_point:04X}")]
    InvalidCodePoint { code_point: u32 },

    #[error("invalid quantifier `{quantifier}`")]
    InvalidQuantifier { quantifier: String },

    #[error("error compiling regex: {message}")]
    Regex { message: String },

    #[error("regexes must be anchored at the beginning (^)")]
    UnanchoredRegex,
}

/// Raised by a top-level parse. Failures inside the matcher are absorbed by
/// backtracking; only these surface.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum MatchErr {
    #[error("empty grammar")]
    EmptyGrammar,

    #[error("input doesn't match grammar")]
    NoMatch,

    #[error(
        "input doesn't match grammar: {remaining} trailing bytes unconsumed at \
        offset {consumed}"
    )]
    TrailingInput { consumed: usize, remaining: usize },

    #[error(
        "rule nesting deeper than {limit} while matching `{rule_name}`; the rule \
        may be left-recursive, or the input nests too deeply for the limit"
    )]
    RecursionLimit { limit: usize, rule_name: String },

    #[error("The identifier `{rule_name}` is not the name of a rule!")]
    UnboundRuleName { rule_name: String },
}

impl MatchErr {
    pub fn unbound_rule_name(rule_name: &str) -> Self {
        Self::UnboundRuleName {
            rule_name: rule_name.into(),
        }
    }
}
