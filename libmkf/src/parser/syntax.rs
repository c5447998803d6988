use crate::fault::SyntaxErr;
use crate::range::{write_code_point, ComplexRange, SimpleRange};
use itertools::Itertools;
use regex::Regex;
use regex_syntax::hir::Look;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// The name of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RuleName(pub Arc<str>);

impl RuleName {
    pub fn new(name: &str) -> Self {
        Self(Arc::from(name))
    }
}

impl AsRef<str> for RuleName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for RuleName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// A compiled regular expression that can only ever match at the start of
/// the text it is applied to.
#[derive(Debug, Clone)]
pub struct AnchoredRegex(Regex);

impl AnchoredRegex {
    /// Compiles `pattern`, then refuses it unless every possible match has to
    /// begin at offset 0. `(?m)^` can match after any newline, so it doesn't
    /// count as an anchor.
    pub fn new(pattern: &str) -> Result<Self, SyntaxErr> {
        let regex = Regex::new(pattern).map_err(|e| SyntaxErr::Regex {
            message: e.to_string(),
        })?;
        let hir = regex_syntax::parse(pattern).map_err(|e| SyntaxErr::Regex {
            message: e.to_string(),
        })?;
        if !hir.properties().look_set_prefix().contains(Look::Start) {
            return Err(SyntaxErr::UnanchoredRegex);
        }
        Ok(Self(regex))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Length of the match at the front of `input`, if there is one.
    pub fn match_len(&self, input: &str) -> Option<usize> {
        let m = self.0.find(input)?;
        debug_assert_eq!(m.start(), 0, "anchored regex matched mid-text");
        Some(m.end())
    }
}

impl PartialEq for AnchoredRegex {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for AnchoredRegex {}

/// One matchable unit inside an alternative. This set is closed: the item
/// compiler emits nothing else and the matcher handles each case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Literal(String),
    CodePoint(char),
    SimpleRange(SimpleRange),
    ComplexRange(ComplexRange),
    Regex(AnchoredRegex),
    RuleRef(RuleName),
    /// `max == None` means unbounded.
    Quantified {
        rule: RuleName,
        min: usize,
        max: Option<usize>,
    },
    /// The separator is either a `CodePoint` or a `RuleRef`.
    Separated {
        rule: RuleName,
        separator: Box<Item>,
    },
}

impl Item {
    /// Names of the rules this item would invoke.
    pub fn referenced_rules(&self) -> Vec<&RuleName> {
        match self {
            Item::RuleRef(rule) | Item::Quantified { rule, .. } => vec![rule],
            Item::Separated { rule, separator } => {
                let mut names = vec![rule];
                names.extend(separator.referenced_rules());
                names
            }
            _ => vec![],
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::Literal(text) => write!(f, "\"{}\"", text),
            Item::CodePoint(ch) => write_code_point(f, *ch as u32),
            Item::SimpleRange(range) => write!(f, "{}", range),
            Item::ComplexRange(range) => write!(f, "{}", range),
            Item::Regex(regex) => write!(f, "/{}/", regex.as_str().replace('/', "\\/")),
            Item::RuleRef(rule) => write!(f, "{}", rule),
            Item::Quantified { rule, min, max } => match (min, max) {
                (0, Some(1)) => write!(f, "{}?", rule),
                (0, None) => write!(f, "{}*", rule),
                (1, None) => write!(f, "{}+", rule),
                (min, Some(max)) if min == max => write!(f, "{}{{{}}}", rule, min),
                (min, Some(max)) => write!(f, "{}{{{},{}}}", rule, min, max),
                (min, None) => write!(f, "{}{{{},}}", rule, min),
            },
            Item::Separated { rule, separator } => write!(f, "{}§{}", rule, separator),
        }
    }
}

/// One candidate right-hand side of a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alternative {
    pub items: Vec<Item>,
}

impl fmt::Display for Alternative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.items.iter().join(" "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub name: RuleName,
    pub alternatives: Vec<Alternative>,
    /// Set when the rule's first alternative was the empty marker `""`.
    pub allow_empty: bool,
}

impl Rule {
    pub fn new(name: RuleName) -> Self {
        Self {
            name,
            alternatives: vec![],
            allow_empty: false,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        if self.allow_empty {
            writeln!(f, "\t\"\"")?;
        }
        for alternative in &self.alternatives {
            writeln!(f, "\t{}", alternative)?;
        }
        Ok(())
    }
}

/// A compiled grammar. Read-only once built; the first declared rule is the
/// root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grammar {
    rules: Vec<Rule>,
    by_name: HashMap<RuleName, usize>,
}

impl Grammar {
    /// Callers must have made sure rule names are unique.
    pub(crate) fn new(rules: Vec<Rule>) -> Self {
        let by_name = rules
            .iter()
            .enumerate()
            .map(|(idx, rule)| (rule.name.clone(), idx))
            .collect();
        Self { rules, by_name }
    }

    pub fn root(&self) -> Option<&Rule> {
        self.rules.first()
    }

    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.by_name.get(name).map(|&idx| &self.rules[idx])
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rules.iter().join("\n"))
    }
}
