//! Unit tests for the grammar module

use lr_parser::grammar::{Grammar, Rule};
use lr_parser::pattern::{Associativity, Pattern};
use lr_parser::symbol::Symbol;
use lr_parser::error::Inspection;
use std::collections::BTreeSet;

fn plain(rules: Vec<Rule<()>>) -> Grammar<()> {
    Grammar::new(rules, &[]).unwrap()
}

#[test]
fn test_partition_variables_and_terminals() {
    let grammar = plain(vec![
        Rule::unit("S", "A b"),
        Rule::unit("A", "a"),
        Rule::unit("A", ""),
    ]);

    assert!(grammar.is_variable(&Symbol::new("S")));
    assert!(grammar.is_variable(&Symbol::new("A")));
    assert!(!grammar.is_variable(&Symbol::new("a")));
    assert!(grammar.terminals().contains(&Symbol::new("a")));
    assert!(grammar.terminals().contains(&Symbol::new("b")));
    assert!(grammar.terminals().contains(&Symbol::end()));
    assert!(!grammar.terminals().contains(&Symbol::epsilon()));
}

#[test]
fn test_rule_order_is_preserved() {
    let grammar = plain(vec![
        Rule::unit("S", "A"),
        Rule::unit("A", "a"),
        Rule::unit("A", "b"),
    ]);

    assert_eq!(grammar.rules().len(), 3);
    assert_eq!(grammar.start_symbol(), &Symbol::new("S"));
    assert_eq!(grammar.rules()[1].rhs, vec![Symbol::new("a")]);
    assert_eq!(grammar.rules()[2].rhs, vec![Symbol::new("b")]);
}

#[test]
fn test_augmented_rule_is_hidden() {
    let grammar = plain(vec![Rule::unit("S", "a")]);

    // The synthetic AUG → S rule never shows up in the user rules.
    assert_eq!(grammar.rules().len(), 1);
    let augmented = grammar.production(grammar.augmented_index());
    assert!(augmented.lhs.is_augmented());
    assert_eq!(augmented.rhs, vec![Symbol::new("S")]);
}

#[test]
fn test_empty_grammar_rejected() {
    assert!(Grammar::<()>::new(vec![], &[]).is_err());
}

#[test]
fn test_first_sets() {
    let grammar = plain(vec![
        Rule::unit("S", "A b"),
        Rule::unit("A", "a"),
        Rule::unit("A", ""),
    ]);

    let first_s = grammar.first(&Symbol::new("S"));
    assert!(first_s.contains(&Symbol::new("a")));
    assert!(first_s.contains(&Symbol::new("b")));
    assert!(!first_s.contains(&Symbol::epsilon()));

    let first_a = grammar.first(&Symbol::new("A"));
    assert!(first_a.contains(&Symbol::new("a")));
    assert!(first_a.contains(&Symbol::epsilon()));
}

#[test]
fn test_first_of_sequence() {
    let grammar = plain(vec![
        Rule::unit("S", "A b"),
        Rule::unit("A", "a"),
        Rule::unit("A", ""),
    ]);

    let first = grammar.first_of_sequence(&[Symbol::new("A"), Symbol::new("b")]);
    assert!(first.contains(&Symbol::new("a")));
    assert!(first.contains(&Symbol::new("b")));
    assert!(!first.contains(&Symbol::epsilon()));

    let first = grammar.first_of_sequence(&[]);
    assert_eq!(first, BTreeSet::from([Symbol::epsilon()]));
}

#[test]
fn test_rule_count_without_groups_is_input_count() {
    let patterns: Vec<Pattern<()>> = vec![
        Pattern::regex("NUMBER", "[0-9]+").group("Literal"),
        Pattern::regex("STRING", "\"[^\"]*\"").group("Literal"),
    ];
    let grammar = Grammar::new(
        vec![Rule::unit("S", "NUMBER"), Rule::unit("S", "STRING")],
        &patterns,
    )
    .unwrap();

    assert_eq!(grammar.rules().len(), 2);
}

#[test]
fn test_group_expansion_grows_rule_count() {
    // One :Literal: occurrence over m = 2 member patterns: + (m - 1) rules.
    let patterns: Vec<Pattern<()>> = vec![
        Pattern::regex("NUMBER", "[0-9]+").group("Literal"),
        Pattern::regex("STRING", "\"[^\"]*\"").group("Literal"),
    ];
    let grammar = Grammar::new(
        vec![Rule::unit("Value", ":Literal:"), Rule::unit("Value", "x")],
        &patterns,
    )
    .unwrap();

    assert_eq!(grammar.rules().len(), 3);
    assert_eq!(grammar.rules()[0].rhs, vec![Symbol::new("NUMBER")]);
    assert_eq!(grammar.rules()[1].rhs, vec![Symbol::new("STRING")]);
    assert_eq!(grammar.rules()[2].rhs, vec![Symbol::new("x")]);
}

#[test]
fn test_group_expansion_two_occurrences() {
    // Two rules each carrying one occurrence: + 2 * (m - 1) rules.
    let patterns: Vec<Pattern<()>> = vec![
        Pattern::regex("NUMBER", "[0-9]+").group("Literal"),
        Pattern::regex("STRING", "\"[^\"]*\"").group("Literal"),
    ];
    let grammar = Grammar::new(
        vec![
            Rule::unit("Value", ":Literal:"),
            Rule::unit("Item", ":Literal: ,"),
        ],
        &patterns,
    )
    .unwrap();

    assert_eq!(grammar.rules().len(), 4);
}

#[test]
fn test_group_expansion_keeps_surrounding_symbols() {
    let patterns: Vec<Pattern<()>> = vec![Pattern::regex("NUMBER", "[0-9]+").group("Literal")];
    let grammar = Grammar::new(vec![Rule::unit("Pair", "( :Literal: )")], &patterns).unwrap();

    assert_eq!(grammar.rules().len(), 1);
    assert_eq!(
        grammar.rules()[0].rhs,
        vec![Symbol::new("("), Symbol::new("NUMBER"), Symbol::new(")")]
    );
}

#[test]
fn test_rule_precedence_is_max_of_rhs_terminals() {
    let patterns: Vec<Pattern<()>> = vec![
        Pattern::literal("+", "+").precedence(1).associativity(Associativity::Left),
        Pattern::literal("*", "*").precedence(2).associativity(Associativity::Left),
    ];
    let grammar = Grammar::new(
        vec![
            Rule::unit("S", "S + S"),
            Rule::unit("S", "S * S"),
            Rule::unit("S", "S + S * S"),
            Rule::unit("S", "n"),
        ],
        &patterns,
    )
    .unwrap();

    assert_eq!(grammar.rule_precedence(0), 1);
    assert_eq!(grammar.rule_precedence(1), 2);
    assert_eq!(grammar.rule_precedence(2), 2);
    assert_eq!(grammar.rule_precedence(3), 0);
}

#[test]
fn test_operator_metadata_defaults() {
    let grammar = plain(vec![Rule::unit("S", "a")]);
    let info = grammar.operator(&Symbol::new("a"));
    assert_eq!(info.precedence, 0);
    assert_eq!(info.associativity, Associativity::None);
}

#[test]
fn test_inspect_reports_undefined_symbols() {
    let patterns: Vec<Pattern<()>> = vec![Pattern::regex("NUMBER", "[0-9]+")];
    let grammar = Grammar::new(
        vec![Rule::unit("S", "NUMBER mystery")],
        &patterns,
    )
    .unwrap();

    let findings = grammar.inspect();
    assert!(findings.iter().any(|finding| matches!(
        finding,
        Inspection::UndefinedSymbol { symbol, .. } if symbol == &Symbol::new("mystery")
    )));
}

#[test]
fn test_inspect_reports_unreachable_variables() {
    let grammar = plain(vec![
        Rule::unit("S", "a"),
        Rule::unit("Orphan", "S"),
    ]);

    let findings = grammar.inspect();
    assert!(findings.iter().any(|finding| matches!(
        finding,
        Inspection::UnreachableVariable { name } if name == &Symbol::new("Orphan")
    )));
}

#[test]
fn test_inspect_clean_grammar() {
    let patterns: Vec<Pattern<()>> = vec![Pattern::regex("NUMBER", "[0-9]+")];
    let grammar = Grammar::new(
        vec![Rule::unit("S", "A"), Rule::unit("A", "NUMBER")],
        &patterns,
    )
    .unwrap();

    assert!(grammar.inspect().is_empty());
}

#[test]
fn test_epsilon_rule_arity() {
    let rule: Rule<()> = Rule::unit("S", "");
    assert_eq!(rule.arity(), 0);
    assert!(rule.is_empty());

    let rule: Rule<()> = Rule::unit("S", "a b");
    assert_eq!(rule.arity(), 2);
}

#[test]
fn test_rule_display() {
    let rule: Rule<()> = Rule::unit("S", "S + S");
    assert_eq!(rule.to_string(), "S → S + S");

    let rule: Rule<()> = Rule::unit("S", "");
    assert_eq!(rule.to_string(), "S → ε");
}

#[test]
fn test_grammar_display_lists_rules_in_order() {
    let grammar = plain(vec![
        Rule::unit("S", "A b"),
        Rule::unit("A", "a"),
        Rule::unit("A", ""),
    ]);

    // One rule per line, declaration order, augmented rule omitted.
    assert_eq!(grammar.to_string(), "S → A b\nA → a\nA → ε\n");
}
