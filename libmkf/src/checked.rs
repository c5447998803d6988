//! Whole-grammar checks that run once every line has been compiled.

use crate::fault::{GrammarErr, GrammarRes};
use crate::parser::syntax::{Rule, RuleName};
use std::collections::HashSet;

/// Every rule invoked by a `RuleRef`, `Quantified` or `Separated` item
/// (separators included) must be declared. The first dangling name, in
/// declaration order, is reported.
pub fn check_references(rules: &[Rule]) -> GrammarRes {
    let declared: HashSet<&str> = rules.iter().map(|rule| rule.name.as_ref()).collect();

    let dangling = referenced(rules).find(|name| !declared.contains(name.as_ref()));

    match dangling {
        Some(name) => Err(GrammarErr::RuleNotFound {
            rule_name: name.to_string(),
        }),
        None => Ok(()),
    }
}

/// Rules other than the root that no alternative invokes.
pub fn unused_rules(rules: &[Rule]) -> Vec<&RuleName> {
    let used: HashSet<&RuleName> = referenced(rules).collect();
    rules
        .iter()
        .skip(1)
        .map(|rule| &rule.name)
        .filter(|name| !used.contains(name))
        .collect()
}

fn referenced(rules: &[Rule]) -> impl Iterator<Item = &RuleName> {
    rules
        .iter()
        .flat_map(|rule| &rule.alternatives)
        .flat_map(|alternative| &alternative.items)
        .flat_map(|item| item.referenced_rules())
}
