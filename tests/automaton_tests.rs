//! Unit tests for automaton construction (CLR and LALR)

use lr_parser::automaton::{Automaton, TableMode};
use lr_parser::grammar::{Grammar, Rule};
use lr_parser::pattern::Pattern;
use lr_parser::symbol::Symbol;
use pretty_assertions::assert_eq;
use std::collections::BTreeSet;

fn json_patterns() -> Vec<Pattern<()>> {
    vec![
        Pattern::literal("{", "{"),
        Pattern::literal("}", "}"),
        Pattern::literal("[", "["),
        Pattern::literal("]", "]"),
        Pattern::literal(",", ","),
        Pattern::literal(":", ":"),
        Pattern::regex("STRING", "\"[^\"]*\""),
        Pattern::regex("NUMBER", "[0-9]+"),
        Pattern::regex("BOOLEAN", "true|false"),
        Pattern::literal("NULL", "null"),
        Pattern::regex("WS", r"[ \t\n]+").ignored(),
    ]
}

fn json_rules() -> Vec<Rule<()>> {
    vec![
        Rule::unit("Json", "Object"),
        Rule::unit("Object", "{ ObjectItem }"),
        Rule::unit("Object", "{ }"),
        Rule::unit("ObjectItem", "STRING : Value"),
        Rule::unit("ObjectItem", "STRING : Value , ObjectItem"),
        Rule::unit("Value", "STRING"),
        Rule::unit("Value", "NUMBER"),
        Rule::unit("Value", "BOOLEAN"),
        Rule::unit("Value", "NULL"),
        Rule::unit("Value", "Object"),
        Rule::unit("Value", "Array"),
        Rule::unit("Array", "[ ArrayItem ]"),
        Rule::unit("Array", "[ ]"),
        Rule::unit("ArrayItem", "Value"),
        Rule::unit("ArrayItem", "Value , ArrayItem"),
    ]
}

fn json_automaton(mode: TableMode) -> Automaton<()> {
    let patterns = json_patterns();
    let grammar = Grammar::new(json_rules(), &patterns).unwrap();
    Automaton::build(grammar, mode)
}

fn lookahead_set(symbols: &[&str]) -> BTreeSet<Symbol> {
    symbols.iter().map(|s| Symbol::new(*s)).collect()
}

#[test]
fn test_json_lalr_has_25_states() {
    let automaton = json_automaton(TableMode::Lalr);
    assert_eq!(automaton.states().len(), 25);
}

#[test]
fn test_json_initial_state_closure() {
    let automaton = json_automaton(TableMode::Lalr);
    let grammar = automaton.grammar();
    let initial = automaton.state(0);

    // Augmented start, Json → Object, and both Object productions.
    assert_eq!(initial.closure().len(), 4);
    let rendered: Vec<String> = initial
        .closure()
        .iter()
        .map(|item| item.core.display(grammar))
        .collect();
    assert_eq!(
        rendered,
        vec![
            "AUG → • Json",
            "Json → • Object",
            "Object → • { ObjectItem }",
            "Object → • { }",
        ]
    );

    // Every lookahead set is exactly {$}.
    for item in initial.closure() {
        assert_eq!(item.lookaheads, lookahead_set(&["$"]));
    }
}

#[test]
fn test_json_brace_successor_closure() {
    let automaton = json_automaton(TableMode::Lalr);
    let grammar = automaton.grammar();

    let target = automaton.state(0).transitions()[&Symbol::new("{")];
    let state = automaton.state(target);
    assert_eq!(state.closure().len(), 4);

    // The two Object items carry the merged lookaheads of every context an
    // object can appear in; the two ObjectItem items see only }.
    let object_lookaheads = lookahead_set(&["}", "]", ",", "$"]);
    let item_lookaheads = lookahead_set(&["}"]);
    for item in state.closure() {
        let lhs = &grammar.production(item.core.rule).lhs;
        if lhs == &Symbol::new("Object") {
            assert_eq!(item.lookaheads, object_lookaheads);
        } else {
            assert_eq!(lhs, &Symbol::new("ObjectItem"));
            assert_eq!(item.lookaheads, item_lookaheads);
        }
    }
}

#[test]
fn test_lookaheads_are_terminals_or_end() {
    for mode in [TableMode::Lalr, TableMode::Clr] {
        let automaton = json_automaton(mode);
        let grammar = automaton.grammar();
        for state in automaton.states() {
            for item in state.closure() {
                for lookahead in &item.lookaheads {
                    assert!(!lookahead.is_epsilon());
                    assert!(!grammar.is_variable(lookahead));
                    assert!(
                        grammar.terminals().contains(lookahead) || lookahead.is_end(),
                        "lookahead {lookahead} is not a terminal"
                    );
                }
            }
        }
    }
}

#[test]
fn test_lalr_kernel_cores_are_unique() {
    let automaton = json_automaton(TableMode::Lalr);
    let mut seen: Vec<BTreeSet<(usize, usize)>> = Vec::new();
    for state in automaton.states() {
        let cores: BTreeSet<(usize, usize)> = state
            .kernel()
            .iter()
            .map(|item| (item.core.rule, item.core.dot))
            .collect();
        assert!(
            !seen.contains(&cores),
            "state {} duplicates another kernel core",
            state.id()
        );
        seen.push(cores);
    }
}

#[test]
fn test_clr_full_kernels_are_unique() {
    let automaton = json_automaton(TableMode::Clr);
    let mut seen: Vec<BTreeSet<(usize, usize, Vec<Symbol>)>> = Vec::new();
    for state in automaton.states() {
        let kernel: BTreeSet<(usize, usize, Vec<Symbol>)> = state
            .kernel()
            .iter()
            .map(|item| {
                (
                    item.core.rule,
                    item.core.dot,
                    item.lookaheads.iter().cloned().collect(),
                )
            })
            .collect();
        assert!(
            !seen.contains(&kernel),
            "state {} duplicates another full kernel",
            state.id()
        );
        seen.push(kernel);
    }
}

#[test]
fn test_lalr_merges_states_clr_keeps_apart() {
    let clr = json_automaton(TableMode::Clr);
    let lalr = json_automaton(TableMode::Lalr);
    assert_eq!(clr.mode(), TableMode::Clr);
    assert_eq!(lalr.mode(), TableMode::Lalr);
    assert!(
        lalr.states().len() < clr.states().len(),
        "LALR ({}) should be strictly smaller than CLR ({})",
        lalr.states().len(),
        clr.states().len()
    );
}

#[test]
fn test_state_ids_match_positions() {
    let automaton = json_automaton(TableMode::Lalr);
    for (position, state) in automaton.states().iter().enumerate() {
        assert_eq!(state.id(), position);
    }
}

#[test]
fn test_transitions_reference_valid_states() {
    for mode in [TableMode::Lalr, TableMode::Clr] {
        let automaton = json_automaton(mode);
        for state in automaton.states() {
            for (symbol, &target) in state.transitions() {
                assert!(target < automaton.states().len());
                assert!(!symbol.is_epsilon());
            }
        }
    }
}

#[test]
fn test_kernel_is_closure_prefix() {
    let automaton = json_automaton(TableMode::Lalr);
    for state in automaton.states() {
        let kernel = state.kernel();
        assert!(!kernel.is_empty());
        assert_eq!(&state.closure()[..kernel.len()], kernel);
    }
}

#[test]
fn test_construction_is_deterministic() {
    let first = json_automaton(TableMode::Lalr);
    let second = json_automaton(TableMode::Lalr);

    assert_eq!(first.states().len(), second.states().len());
    for (a, b) in first.states().iter().zip(second.states()) {
        assert_eq!(a.closure(), b.closure());
        let a_transitions: Vec<_> = a.transitions().iter().collect();
        let b_transitions: Vec<_> = b.transitions().iter().collect();
        assert_eq!(a_transitions, b_transitions);
    }
}

#[test]
fn test_simple_grammar_states() {
    // S → S + S | n over one operator: a small, well-known collection.
    let patterns: Vec<Pattern<()>> = vec![
        Pattern::literal("+", "+"),
        Pattern::regex("n", "[0-9]+"),
    ];
    let grammar = Grammar::new(
        vec![Rule::unit("S", "S + n"), Rule::unit("S", "n")],
        &patterns,
    )
    .unwrap();
    let automaton = Automaton::build(grammar, TableMode::Lalr);

    // AUG → • S; then states for S, n, +, and n after +.
    assert_eq!(automaton.states().len(), 5);
}
