use crate::checked;
use crate::fault::{GrammarErr, GrammarRes, SyntaxErr};
use std::collections::HashSet;
use std::convert::TryFrom;
use std::str::FromStr;
use tracing::{debug, warn};

pub mod item;
pub mod lex;
pub mod report;
pub mod space;
pub mod syntax;

use item::Compiled;
use syntax::{Grammar, Rule, RuleName};

/// The four kinds of line a grammar is made of.
#[derive(Debug, PartialEq)]
enum Line<'src> {
    Blank,
    /// A rule name, and whatever followed it on the line.
    Header(&'src str, &'src str),
    /// The text of an alternative, after its indentation unit.
    Alternative(&'src str),
    Unknown,
}

impl<'src> Line<'src> {
    fn classify(line: &'src str) -> Self {
        if space::blank_or_comment(line) {
            Self::Blank
        } else if let Ok((rest, name)) = space::rule_name(line) {
            Self::Header(name, rest)
        } else if let Ok((text, _indent)) = space::indentation(line) {
            Self::Alternative(text)
        } else {
            Self::Unknown
        }
    }
}

/// Compiles grammar text into a `Grammar`. Line numbers in errors are
/// 0-based.
pub fn compile(src: &str) -> GrammarRes<Grammar> {
    let mut rules: Vec<Rule> = vec![];
    let mut declared = HashSet::new();
    let mut current: Option<Rule> = None;

    for (line_no, line) in src.split('\n').enumerate() {
        let err = |kind| GrammarErr::syntax(kind, line_no);

        match Line::classify(line) {
            Line::Blank => {}
            Line::Header(name, rest) => {
                if !space::blank_or_comment(rest) {
                    return Err(err(SyntaxErr::UnexpectedContentAfterRuleName));
                }
                if !declared.insert(name) {
                    return Err(err(SyntaxErr::DuplicateRule {
                        rule_name: name.to_string(),
                    }));
                }
                rules.extend(current.replace(Rule::new(RuleName::new(name))));
            }
            Line::Alternative(text) => {
                let rule = current
                    .as_mut()
                    .ok_or_else(|| err(SyntaxErr::OrphanedAlternative))?;
                let first = rule.alternatives.is_empty() && !rule.allow_empty;
                match item::compile_alternative(text, first).map_err(err)? {
                    Compiled::Empty => rule.allow_empty = true,
                    Compiled::Alternative(alternative) => rule.alternatives.push(alternative),
                }
            }
            Line::Unknown => return Err(err(SyntaxErr::UnableToParse)),
        }
    }
    rules.extend(current);

    checked::check_references(&rules)?;
    for name in checked::unused_rules(&rules) {
        warn!(rule = %name, "rule is never used");
    }

    for rule in &rules {
        debug!(
            rule = %rule.name,
            alternatives = rule.alternatives.len(),
            allow_empty = rule.allow_empty,
            "compiled rule"
        );
    }

    Ok(Grammar::new(rules))
}

impl TryFrom<&str> for Grammar {
    type Error = GrammarErr;

    fn try_from(src: &str) -> GrammarRes<Self> {
        compile(src)
    }
}

impl FromStr for Grammar {
    type Err = GrammarErr;

    fn from_str(src: &str) -> GrammarRes<Self> {
        compile(src)
    }
}
