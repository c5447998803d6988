//! Runs a compiled grammar against input text.
//!
//! Matching is a pure function of a rule and the input suffix it is tried
//! on: every alternative starts over from the same suffix, so backtracking
//! never has to undo anything. Of all the alternatives that match, the one
//! consuming the most input wins, and among equally long matches the one
//! declared last.

use crate::fault::{MatchErr, MatchRes};
use crate::node::Node;
use crate::parser::syntax::{Grammar, Item, Rule, RuleName};
use tracing::{debug, trace};

/// Each nested rule activation costs four stack frames, a few hundred bytes
/// in release builds and up to a couple of kilobytes in debug builds. This
/// default fits an 8 MiB main thread with room to spare; lower it when
/// matching on threads with small stacks.
pub const DEFAULT_MAX_DEPTH: usize = 2048;

/// What to do when the root rule matches but input is left over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trailing {
    Reject,
    /// Return the node for the matched prefix.
    Allow,
}

impl Default for Trailing {
    fn default() -> Self {
        Trailing::Reject
    }
}

#[derive(Debug, Clone)]
pub struct Matcher<'g> {
    grammar: &'g Grammar,
    /// How many rule activations may be nested before the parse is abandoned
    /// with `MatchErr::RecursionLimit`.
    pub max_depth: usize,
    pub trailing: Trailing,
}

/// The rule activation that items are being matched for. A recursion
/// failure names the rule whose alternative asked to go one level deeper.
#[derive(Debug, Clone, Copy)]
struct Frame<'g> {
    rule: &'g RuleName,
    depth: usize,
}

/// How much input a run of items consumed, and the children it contributes
/// to the enclosing node.
#[derive(Debug, Default)]
struct Matched<'i> {
    len: usize,
    nodes: Vec<Node<'i>>,
}

impl<'i> Matched<'i> {
    fn leaf(input: &'i str, len: usize) -> Self {
        Self {
            len,
            nodes: vec![Node::leaf(&input[..len])],
        }
    }

    fn push(&mut self, node: Node<'i>) {
        self.len += node.text.len();
        self.nodes.push(node);
    }

    fn append(&mut self, other: Matched<'i>) {
        self.len += other.len;
        self.nodes.extend(other.nodes);
    }
}

impl<'i> From<Node<'i>> for Matched<'i> {
    fn from(node: Node<'i>) -> Self {
        Self {
            len: node.text.len(),
            nodes: vec![node],
        }
    }
}

impl<'g> Matcher<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        Self {
            grammar,
            max_depth: DEFAULT_MAX_DEPTH,
            trailing: Trailing::default(),
        }
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn trailing(mut self, trailing: Trailing) -> Self {
        self.trailing = trailing;
        self
    }

    /// Matches `input` against the root rule.
    pub fn parse<'i>(&self, input: &'i str) -> MatchRes<Node<'i>> {
        let root = self.grammar.root().ok_or(MatchErr::EmptyGrammar)?;
        debug!(root = %root.name, bytes = input.len(), "parsing input");

        let node = self.match_rule(root, input, 1)?.ok_or(MatchErr::NoMatch)?;

        let consumed = node.text.len();
        if consumed < input.len() && self.trailing == Trailing::Reject {
            return Err(MatchErr::TrailingInput {
                consumed,
                remaining: input.len() - consumed,
            });
        }

        debug!(consumed, "input matched");
        Ok(node)
    }

    fn match_rule<'i>(
        &self,
        rule: &'g Rule,
        input: &'i str,
        depth: usize,
    ) -> MatchRes<Option<Node<'i>>> {
        trace!(rule = %rule.name, depth, "trying rule");
        let frame = Frame {
            rule: &rule.name,
            depth,
        };

        let mut best: Option<Matched<'i>> = None;
        for alternative in &rule.alternatives {
            if let Some(matched) = self.match_items(&alternative.items, input, frame)? {
                // `>=` so that a later alternative wins a tie.
                if best.as_ref().map_or(true, |best| matched.len >= best.len) {
                    best = Some(matched);
                }
            }
        }

        let node = match best {
            Some(Matched { len, nodes }) => Node::named(rule.name.clone(), &input[..len], nodes),
            None if rule.allow_empty => Node::named(rule.name.clone(), &input[..0], vec![]),
            None => return Ok(None),
        };
        Ok(Some(node))
    }

    fn invoke<'i>(
        &self,
        name: &RuleName,
        input: &'i str,
        frame: Frame<'g>,
    ) -> MatchRes<Option<Node<'i>>> {
        if frame.depth >= self.max_depth {
            return Err(MatchErr::RecursionLimit {
                limit: self.max_depth,
                rule_name: frame.rule.to_string(),
            });
        }
        let rule = self
            .grammar
            .rule(name.as_ref())
            .ok_or_else(|| MatchErr::unbound_rule_name(name.as_ref()))?;
        self.match_rule(rule, input, frame.depth + 1)
    }

    /// Items are matched strictly left to right, each on what the previous
    /// one left over. The first item to fail fails the whole run.
    fn match_items<'i>(
        &self,
        items: &[Item],
        input: &'i str,
        frame: Frame<'g>,
    ) -> MatchRes<Option<Matched<'i>>> {
        let mut matched = Matched::default();
        for item in items {
            match self.match_item(item, &input[matched.len..], frame)? {
                Some(next) => matched.append(next),
                None => return Ok(None),
            }
        }
        Ok(Some(matched))
    }

    fn match_item<'i>(
        &self,
        item: &Item,
        input: &'i str,
        frame: Frame<'g>,
    ) -> MatchRes<Option<Matched<'i>>> {
        let matched = match item {
            Item::Literal(text) => input
                .starts_with(text.as_str())
                .then(|| Matched::leaf(input, text.len())),
            Item::CodePoint(expected) => match_char(input, |ch| ch == *expected),
            Item::SimpleRange(range) => match_char(input, |ch| range.contains(ch)),
            Item::ComplexRange(range) => match_char(input, |ch| range.contains(ch)),
            Item::Regex(regex) => regex.match_len(input).map(|len| Matched::leaf(input, len)),
            Item::RuleRef(name) => self.invoke(name, input, frame)?.map(Matched::from),
            Item::Quantified { rule, min, max } => {
                self.repeat(rule, *min, *max, input, frame)?
            }
            Item::Separated { rule, separator } => {
                self.separated(rule, separator, input, frame)?
            }
        };
        Ok(matched)
    }

    /// Invokes `rule` up to `max` times. A repetition that consumes nothing
    /// could go on forever, so it ends the loop and satisfies `min`.
    fn repeat<'i>(
        &self,
        rule: &RuleName,
        min: usize,
        max: Option<usize>,
        input: &'i str,
        frame: Frame<'g>,
    ) -> MatchRes<Option<Matched<'i>>> {
        let mut matched = Matched::default();
        let mut count = 0;

        while max.map_or(true, |max| count < max) {
            let node = match self.invoke(rule, &input[matched.len..], frame)? {
                Some(node) => node,
                None => break,
            };
            count += 1;
            let empty = node.text.is_empty();
            matched.push(node);
            if empty {
                count = count.max(min);
                break;
            }
        }

        Ok((count >= min).then(|| matched))
    }

    /// `rule§separator`: one required `rule`, then as many `separator rule`
    /// pairs as match in full.
    fn separated<'i>(
        &self,
        rule: &RuleName,
        separator: &Item,
        input: &'i str,
        frame: Frame<'g>,
    ) -> MatchRes<Option<Matched<'i>>> {
        let mut matched = match self.invoke(rule, input, frame)? {
            Some(first) => Matched::from(first),
            None => return Ok(None),
        };

        loop {
            let rest = &input[matched.len..];
            let sep = match self.match_item(separator, rest, frame)? {
                Some(sep) => sep,
                None => break,
            };
            let next = match self.invoke(rule, &rest[sep.len..], frame)? {
                Some(next) => next,
                None => break,
            };
            let consumed = sep.len + next.text.len();
            matched.append(sep);
            matched.push(next);
            if consumed == 0 {
                break;
            }
        }

        Ok(Some(matched))
    }
}

/// One Unicode scalar value off the front of `input`.
fn match_char(input: &str, accept: impl Fn(char) -> bool) -> Option<Matched<'_>> {
    let ch = input.chars().next()?;
    accept(ch).then(|| Matched::leaf(input, ch.len_utf8()))
}

impl Grammar {
    /// A matcher over this grammar with default settings.
    pub fn matcher(&self) -> Matcher<'_> {
        Matcher::new(self)
    }

    /// Matches the whole of `input` against the root rule.
    pub fn parse<'i>(&self, input: &'i str) -> MatchRes<Node<'i>> {
        self.matcher().parse(input)
    }

    /// Like `parse`, but succeeds as soon as the root rule matches a prefix
    /// of `input`.
    pub fn parse_prefix<'i>(&self, input: &'i str) -> MatchRes<Node<'i>> {
        self.matcher().trailing(Trailing::Allow).parse(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::compile;
    use assert_matches::assert_matches;
    use insta::assert_snapshot;

    fn grammar(src: &str) -> Grammar {
        compile(src).unwrap_or_else(|e| panic!("grammar failed to compile: {}", e))
    }

    fn rules_of(node: &Node) -> Vec<Option<String>> {
        node.children
            .iter()
            .map(|child| child.rule().map(str::to_string))
            .collect()
    }

    #[test]
    fn empty_grammar() {
        assert_eq!(Grammar::default().parse("x"), Err(MatchErr::EmptyGrammar));
    }

    #[test]
    fn literals_and_code_points() {
        let g = grammar("greeting\n\t\"hi\" ' ' 'w' . 'z' '00E9'");
        let node = g.parse("hi xé").unwrap();
        assert_eq!(node.rule(), Some("greeting"));
        let texts: Vec<_> = node.children.iter().map(Node::text).collect();
        assert_eq!(texts, vec!["hi", " ", "x", "é"]);

        assert_eq!(g.parse("hi a"), Err(MatchErr::NoMatch));
        assert_eq!(g.parse("hi x"), Err(MatchErr::NoMatch));
    }

    #[test]
    fn complex_range() {
        let g = grammar("letter\n\t'a' . 'z' - 'p' - 'd' . 'f'");
        for ok in &["a", "t", "q", "z"] {
            assert!(g.parse(ok).is_ok(), "{} should match", ok);
        }
        for bad in &["p", "f", "e", "d", "A", ""] {
            assert_eq!(g.parse(bad), Err(MatchErr::NoMatch), "{} shouldn't match", bad);
        }
    }

    #[test]
    fn regex_terminal() {
        let g = grammar("hex\n\t/^0x[A-Fa-f0-9]+/");
        assert_eq!(g.parse("0x1F").unwrap().children[0].text, "0x1F");
        assert_eq!(g.parse("1F"), Err(MatchErr::NoMatch));
    }

    #[test]
    fn quantifiers() {
        let src = |q| format!("number\n\tdigit{}\ndigit\n\t'0' . '9'", q);

        let plus = grammar(&src("+"));
        assert_eq!(plus.parse("123").unwrap().children.len(), 3);
        assert_eq!(plus.parse(""), Err(MatchErr::NoMatch));

        let star = grammar(&src("*"));
        assert_eq!(star.parse("").unwrap().children.len(), 0);

        let opt = grammar(&src("?"));
        let node = opt.parse_prefix("5x").unwrap();
        assert_eq!(node.children.len(), 1);
        assert_eq!(node.text, "5");

        let bounded = grammar(&src("{2,3}"));
        assert_eq!(bounded.parse("1"), Err(MatchErr::NoMatch));
        assert_eq!(bounded.parse("12").unwrap().children.len(), 2);
        assert_eq!(
            bounded.parse("1234"),
            Err(MatchErr::TrailingInput {
                consumed: 3,
                remaining: 1
            })
        );
    }

    #[test]
    fn repeating_an_empty_match_terminates() {
        let g = grammar("list\n\tmaybe* 'x'\nmaybe\n\t\"\"\n\t'm'");
        // Two `m`s, then one empty repetition that ends the loop.
        assert_eq!(g.parse("mmx").unwrap().children.len(), 4);
        assert_eq!(g.parse("x").unwrap().children.len(), 2);

        let g = grammar("list\n\tmaybe{3} 'x'\nmaybe\n\t\"\"\n\t'm'");
        assert!(g.parse("x").is_ok());
    }

    #[test]
    fn separated_list() {
        let g = grammar("csv\n\tdigits§','\ndigits\n\tdigit+\ndigit\n\t'0' . '9'");
        let node = g.parse("1,22,333").unwrap();
        assert_eq!(
            rules_of(&node),
            vec![
                Some("digits".into()),
                None,
                Some("digits".into()),
                None,
                Some("digits".into()),
            ]
        );
        assert_eq!(
            g.parse("1,2,"),
            Err(MatchErr::TrailingInput {
                consumed: 3,
                remaining: 1
            })
        );
        assert_eq!(g.parse(""), Err(MatchErr::NoMatch));
    }

    #[test]
    fn longest_alternative_wins() {
        let g = grammar("value\n\tdigit\n\tdigit value\ndigit\n\t'0' . '9'");
        let node = g.parse("12").unwrap();
        assert_eq!(rules_of(&node), vec![Some("digit".into()), Some("value".into())]);
    }

    #[test]
    fn later_alternative_wins_a_tie() {
        let g = grammar("root\n\tfirst\n\tsecond\nfirst\n\t'x'\nsecond\n\t\"x\"");
        assert_eq!(rules_of(&g.parse("x").unwrap()), vec![Some("second".into())]);
    }

    #[test]
    fn allow_empty() {
        let g = grammar("ws\n\t\"\"\n\t/^\\s+/");
        assert_eq!(g.parse("").unwrap().text, "");
        assert_eq!(g.parse("  \t").unwrap().text, "  \t");
        assert_eq!(
            g.parse("x"),
            Err(MatchErr::TrailingInput {
                consumed: 0,
                remaining: 1
            })
        );
    }

    /// Runs `f` on a thread with a stack deep enough for `DEFAULT_MAX_DEPTH`
    /// nested rules in an unoptimized build.
    fn with_big_stack<F: FnOnce() + Send + 'static>(f: F) {
        std::thread::Builder::new()
            .stack_size(256 << 20)
            .spawn(f)
            .unwrap()
            .join()
            .unwrap();
    }

    #[test]
    fn left_recursion_hits_the_limit() {
        let g = grammar("expr\n\texpr \"+\" term\n\tterm\nterm\n\t'0' . '9'");
        let at_default = g.clone();
        with_big_stack(move || {
            assert_matches!(
                at_default.parse("1+2"),
                Err(MatchErr::RecursionLimit { limit: DEFAULT_MAX_DEPTH, ref rule_name }) if rule_name == "expr"
            );
        });
        assert_matches!(
            g.matcher().max_depth(8).parse("1"),
            Err(MatchErr::RecursionLimit { limit: 8, .. })
        );
    }

    #[test]
    fn nesting_within_the_limit() {
        let g = grammar("parens\n\t\"(\" parens \")\"\n\t\"x\"");
        let input = format!("{}x{}", "(".repeat(10), ")".repeat(10));
        assert!(g.matcher().max_depth(11).parse(&input).is_ok());
        assert_matches!(
            g.matcher().max_depth(10).parse(&input),
            Err(MatchErr::RecursionLimit { limit: 10, .. })
        );
    }

    const DECIMAL: &str = "dec\n\tdigit dec\n\tdigit\ndigit\n\t'0' . '9'";

    #[test]
    fn right_recursion_nests_once_per_digit() {
        with_big_stack(|| {
            let g = grammar(DECIMAL);
            let input = "7".repeat(300);
            assert_eq!(g.parse(&input).unwrap().text, input);

            // The last `dec` still tries `digit` on the empty rest, one deeper.
            let input = "7".repeat(DEFAULT_MAX_DEPTH - 2);
            assert_eq!(g.parse(&input).unwrap().text, input);
            assert_matches!(
                g.parse(&format!("{}7", input)),
                Err(MatchErr::RecursionLimit { ref rule_name, .. }) if rule_name == "dec"
            );
        });
    }

    #[test]
    fn recursion_limit_names_the_recursing_rule() {
        let g = grammar(DECIMAL);
        // Six nested `dec`s, the last one failing `digit` on the empty rest.
        assert!(g.matcher().max_depth(7).parse("77777").is_ok());
        assert_matches!(
            g.matcher().max_depth(6).parse("77777"),
            Err(MatchErr::RecursionLimit { limit: 6, ref rule_name }) if rule_name == "dec"
        );
        assert_snapshot!(
            g.matcher().max_depth(6).parse("77777").unwrap_err(),
            @"rule nesting deeper than 6 while matching `dec`; the rule may be left-recursive, or the input nests too deeply for the limit"
        );
    }

    #[test]
    fn trailing_policy() {
        let g = grammar("word\n\t/^[a-z]+/");
        assert_eq!(
            g.parse("abc def"),
            Err(MatchErr::TrailingInput {
                consumed: 3,
                remaining: 4
            })
        );
        assert_eq!(g.parse_prefix("abc def").unwrap().text, "abc");
        let lenient = g.matcher().trailing(Trailing::Allow);
        assert_eq!(lenient.parse("abc def").unwrap().text, "abc");
    }

    #[test]
    fn tree_shape() {
        let g = grammar("pair\n\tdigit ',' digit\ndigit\n\t'0' . '9'");
        assert_snapshot!(g.parse("4,2").unwrap(), @r###"
        pair "4,2"
          digit "4"
            "4"
          ","
          digit "2"
            "2"
        "###);
    }
}
