//! Turns one alternative's validated tokens into matchable `Item`s.

use super::lex::{self, Tok};
use super::syntax::{Alternative, AnchoredRegex, Item, RuleName};
use crate::fault::SyntaxErr;
use crate::range::{ComplexRange, SimpleRange};

type Res<'t, 'a> = Result<(Item, &'t [Tok<'a>]), SyntaxErr>;

/// What one alternative line compiled to.
#[derive(Debug, PartialEq)]
pub enum Compiled {
    /// The lone empty marker, on a rule's first alternative.
    Empty,
    Alternative(Alternative),
}

/// Compiles the text of one alternative (after its indentation). `first`
/// tells whether this is the first alternative of its rule, the only place
/// the empty marker is allowed.
pub fn compile_alternative(text: &str, first: bool) -> Result<Compiled, SyntaxErr> {
    let tokens = lex::tokenize(text)?;

    if first && tokens == [Tok::Empty] {
        return Ok(Compiled::Empty);
    }

    let mut items = vec![];
    let mut rest = &tokens[..];
    while !rest.is_empty() {
        let (item, tail) = next_item(rest)?;
        items.push(item);
        rest = tail;
    }

    Ok(Compiled::Alternative(Alternative { items }))
}

/// Consumes as many tokens as the next item needs.
fn next_item<'t, 'a>(tokens: &'t [Tok<'a>]) -> Res<'t, 'a> {
    match tokens {
        [Tok::Empty, ..] => Err(SyntaxErr::UnallowedEmpty),
        [Tok::Literal(text), rest @ ..] => Ok((Item::Literal(text.to_string()), rest)),
        [Tok::Regex(pattern), rest @ ..] => {
            let regex = AnchoredRegex::new(&pattern.replace("\\/", "/"))?;
            Ok((Item::Regex(regex), rest))
        }
        [Tok::Rule(name), Tok::Quantifier(quantifier), rest @ ..] => {
            Ok((quantified(name, quantifier)?, rest))
        }
        [Tok::Rule(name), Tok::Separator, separator, rest @ ..] => {
            let separator = match separator {
                Tok::CodePoint(cp) => Item::CodePoint(code_point(*cp)?),
                Tok::Rule(sep_name) => Item::RuleRef(RuleName::new(sep_name)),
                _ => return Err(SyntaxErr::InvalidSyntax),
            };
            let item = Item::Separated {
                rule: RuleName::new(name),
                separator: Box::new(separator),
            };
            Ok((item, rest))
        }
        [Tok::Rule(name), rest @ ..] => Ok((Item::RuleRef(RuleName::new(name)), rest)),
        [Tok::CodePoint(lo), Tok::Dot, Tok::CodePoint(hi), rest @ ..] => range(*lo, *hi, rest),
        [Tok::CodePoint(_), Tok::Dot, ..] => Err(SyntaxErr::InvalidSyntax),
        [Tok::CodePoint(cp), rest @ ..] => Ok((Item::CodePoint(code_point(*cp)?), rest)),
        _ => Err(SyntaxErr::InvalidSyntax),
    }
}

/// A `lo . hi` range, plus every `- x` or `- x . y` exclusion that follows
/// it.
fn range<'t, 'a>(lo: u32, hi: u32, mut rest: &'t [Tok<'a>]) -> Res<'t, 'a> {
    let base = SimpleRange::new(lo, hi).ok_or(SyntaxErr::InvalidRange)?;

    let mut excludes = vec![];
    while let [Tok::Minus, tail @ ..] = rest {
        let (lo, hi, tail) = match tail {
            [Tok::CodePoint(lo), Tok::Dot, Tok::CodePoint(hi), tail @ ..] => (*lo, *hi, tail),
            [Tok::CodePoint(_), Tok::Dot, ..] => return Err(SyntaxErr::InvalidSyntax),
            [Tok::CodePoint(cp), tail @ ..] => (*cp, *cp, tail),
            _ => return Err(SyntaxErr::InvalidSyntax),
        };
        excludes.push(SimpleRange::new(lo, hi).ok_or(SyntaxErr::InvalidExclusionRange)?);
        rest = tail;
    }

    let item = if excludes.is_empty() {
        Item::SimpleRange(base)
    } else {
        Item::ComplexRange(ComplexRange::new(base, excludes))
    };
    Ok((item, rest))
}

fn quantified(name: &str, quantifier: &str) -> Result<Item, SyntaxErr> {
    let invalid = || SyntaxErr::InvalidQuantifier {
        quantifier: quantifier.to_string(),
    };

    let (min, max) = match quantifier {
        "?" => (0, Some(1)),
        "+" => (1, None),
        "*" => (0, None),
        bounds => {
            let inner = bounds
                .strip_prefix('{')
                .and_then(|b| b.strip_suffix('}'))
                .ok_or_else(invalid)?;
            let (min, max) = inner.split_once(',').unwrap_or((inner, inner));
            let min = min.parse::<usize>().map_err(|_| invalid())?;
            let max = max.parse::<usize>().map_err(|_| invalid())?;
            if min > max {
                return Err(invalid());
            }
            (min, Some(max))
        }
    };

    Ok(Item::Quantified {
        rule: RuleName::new(name),
        min,
        max,
    })
}

fn code_point(cp: u32) -> Result<char, SyntaxErr> {
    char::from_u32(cp).ok_or(SyntaxErr::InvalidCodePoint { code_point: cp })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn items(text: &str) -> Vec<Item> {
        match compile_alternative(text, false) {
            Ok(Compiled::Alternative(alt)) => alt.items,
            other => panic!("{:?} compiled to {:?}", text, other),
        }
    }

    fn kinds(text: &str) -> Vec<&'static str> {
        items(text)
            .iter()
            .map(|item| match item {
                Item::Literal(_) => "literal",
                Item::CodePoint(_) => "code point",
                Item::SimpleRange(_) => "simple range",
                Item::ComplexRange(_) => "complex range",
                Item::Regex(_) => "regex",
                Item::RuleRef(_) => "rule",
                Item::Quantified { .. } => "quantified",
                Item::Separated { .. } => "separated",
            })
            .collect()
    }

    fn range(lo: char, hi: char) -> SimpleRange {
        SimpleRange::new(lo as u32, hi as u32).unwrap()
    }

    #[test]
    fn empty_marker_on_first_alternative() {
        assert_eq!(compile_alternative(r#""" // comment"#, true), Ok(Compiled::Empty));
    }

    #[test]
    fn empty_marker_anywhere_else() {
        assert_eq!(
            compile_alternative(r#""""#, false),
            Err(SyntaxErr::UnallowedEmpty)
        );
        assert_eq!(
            compile_alternative(r#""hello" """#, true),
            Err(SyntaxErr::UnallowedEmpty)
        );
    }

    #[test]
    fn item_kinds() {
        assert_eq!(
            kinds(r#""hello" 'a' 'f' . 't'"#),
            vec!["literal", "code point", "simple range"]
        );
        assert_eq!(
            kinds(r#""hi" 'b' . 'd' 'a' . 'z' - 't' . 'v' - 'h' /^a \/ aa/ '10ABCD'"#),
            vec!["literal", "simple range", "complex range", "regex", "code point"]
        );
        assert_eq!(
            kinds("a b? c+ d* e{2} f{1,3} g§h i§'|'"),
            vec![
                "rule",
                "quantified",
                "quantified",
                "quantified",
                "quantified",
                "quantified",
                "separated",
                "separated"
            ]
        );
    }

    #[test]
    fn compact_range() {
        assert_eq!(items("'a'.'z'"), vec![Item::SimpleRange(range('a', 'z'))]);
    }

    #[test]
    fn complex_range_keeps_exclusions_in_order() {
        assert_eq!(
            items("'a' . 'z' - 'p' - 'd' . 'f'"),
            vec![Item::ComplexRange(ComplexRange::new(
                range('a', 'z'),
                vec![range('p', 'p'), range('d', 'f')]
            ))]
        );
    }

    #[test]
    fn invalid_ranges() {
        let compile = |text| compile_alternative(text, false);
        assert_eq!(compile("'z' . 'a'"), Err(SyntaxErr::InvalidRange));
        assert_eq!(compile("'0000' . 'FFFF'"), Err(SyntaxErr::InvalidRange));
        assert_eq!(
            compile("'a' . 'z' - 'k' . 'c'"),
            Err(SyntaxErr::InvalidExclusionRange)
        );
        assert_eq!(
            compile("'a' . 'z' - '0000'"),
            Err(SyntaxErr::InvalidExclusionRange)
        );
        // Only ranges take exclusions.
        assert_eq!(compile("'a' - 'b'"), Err(SyntaxErr::InvalidSyntax));
        assert_eq!(compile(r#"'a' . 'z' - "x""#), Err(SyntaxErr::InvalidSyntax));
        assert_eq!(compile("'a' . 'z' -"), Err(SyntaxErr::InvalidSyntax));
        assert_eq!(compile("'a' ."), Err(SyntaxErr::InvalidSyntax));
        assert_eq!(
            compile("'D800'"),
            Err(SyntaxErr::InvalidCodePoint { code_point: 0xD800 })
        );
    }

    #[test]
    fn quantifier_bounds() {
        let bounds = |text| match items(text).pop() {
            Some(Item::Quantified { min, max, .. }) => (min, max),
            other => panic!("expected a quantified item, got {:?}", other),
        };
        assert_eq!(bounds("digit?"), (0, Some(1)));
        assert_eq!(bounds("digit+"), (1, None));
        assert_eq!(bounds("digit*"), (0, None));
        assert_eq!(bounds("digit{4}"), (4, Some(4)));
        assert_eq!(bounds("digit{2,7}"), (2, Some(7)));

        assert_matches!(
            compile_alternative("digit{5,2}", false),
            Err(SyntaxErr::InvalidQuantifier { .. })
        );
        assert_matches!(
            compile_alternative("digit{99999999999999999999999}", false),
            Err(SyntaxErr::InvalidQuantifier { .. })
        );
    }

    #[test]
    fn separated_lists() {
        assert_eq!(
            items("digits§','"),
            vec![Item::Separated {
                rule: RuleName::new("digits"),
                separator: Box::new(Item::CodePoint(',')),
            }]
        );
        assert_eq!(
            items("digits§comma_ws"),
            vec![Item::Separated {
                rule: RuleName::new("digits"),
                separator: Box::new(Item::RuleRef(RuleName::new("comma_ws"))),
            }]
        );
    }

    #[test]
    fn regexes_are_unescaped_and_anchored() {
        match items(r"/^a\/b/").as_slice() {
            [Item::Regex(re)] => assert_eq!(re.as_str(), "^a/b"),
            other => panic!("expected one regex, got {:?}", other),
        }
        match items(r"/^a\\/").as_slice() {
            [Item::Regex(re)] => {
                assert_eq!(re.as_str(), r"^a\\");
                assert_eq!(re.match_len(r"a\b"), Some(2));
            }
            other => panic!("expected one regex, got {:?}", other),
        }
        assert_eq!(
            compile_alternative("/[A-Z]+/", false),
            Err(SyntaxErr::UnanchoredRegex)
        );
        assert_matches!(
            compile_alternative("/^(/", false),
            Err(SyntaxErr::Regex { .. })
        );
    }
}
