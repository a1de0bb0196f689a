//! Grammar module: production rules, semantic actions, and the grammar
//! facade consumed by the automaton.
//!
//! A grammar is built from an ordered list of production rules plus the
//! lexical patterns declared for the lexer. Construction expands group
//! references, appends the augmented start rule, partitions symbols into
//! variables and terminals, and computes FIRST sets.

use crate::error::{Inspection, ParserError, Result};
use crate::first::{FirstSets, compute_first_sets, first_of_string};
use crate::pattern::{Associativity, Pattern};
use crate::symbol::{Symbol, symbols_from_str, symbols_to_string};
use crate::token::Token;
use indexmap::IndexSet;
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::fmt;
use std::rc::Rc;

/// A value flowing through semantic actions.
///
/// Terminal frames contribute their token, reduced variables contribute the
/// value their action returned. The identity action wraps multi-symbol
/// reductions in `List`.
#[derive(Debug, Clone)]
pub enum Payload<V> {
    Token(Token<V>),
    Value(V),
    List(Vec<Payload<V>>),
}

impl<V> Payload<V> {
    /// Consumes the payload, returning the user value if it is one.
    pub fn into_value(self) -> Option<V> {
        match self {
            Payload::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Consumes the payload, returning the token if it is one.
    pub fn into_token(self) -> Option<Token<V>> {
        match self {
            Payload::Token(token) => Some(token),
            _ => None,
        }
    }

    /// Borrows the token if this payload is one.
    pub fn token(&self) -> Option<&Token<V>> {
        match self {
            Payload::Token(token) => Some(token),
            _ => None,
        }
    }

    /// Borrows the user value if this payload is one.
    pub fn value(&self) -> Option<&V> {
        match self {
            Payload::Value(value) => Some(value),
            _ => None,
        }
    }
}

/// A semantic action invoked on reduction.
///
/// The payloads arrive in the rule's left-to-right source order; the
/// returned payload becomes the reduced variable's value.
pub type SemanticAction<V> = Rc<dyn Fn(Vec<Payload<V>>) -> Payload<V>>;

/// The default action: returns its single payload, or the payload list when
/// the rule's arity differs from 1.
pub fn identity_action<V>() -> SemanticAction<V> {
    Rc::new(|mut payloads| {
        if payloads.len() == 1 {
            payloads.remove(0)
        } else {
            Payload::List(payloads)
        }
    })
}

/// A production rule in a context-free grammar.
///
/// Represents a rule of the form LHS → RHS with an attached semantic
/// action. The rhs is either the single-element `[ε]` (empty production)
/// or an ε-free symbol sequence.
pub struct Rule<V> {
    pub lhs: Symbol,
    pub rhs: Vec<Symbol>,
    pub action: SemanticAction<V>,
}

impl<V> Rule<V> {
    /// Creates a rule from a space-separated rhs string.
    ///
    /// An empty rhs string denotes the empty production.
    pub fn new(
        lhs: impl Into<Symbol>,
        rhs: &str,
        action: impl Fn(Vec<Payload<V>>) -> Payload<V> + 'static,
    ) -> Self {
        Rule::with_symbols(lhs, symbols_from_str(rhs), Rc::new(action))
    }

    /// Creates a rule with the default identity action.
    pub fn unit(lhs: impl Into<Symbol>, rhs: &str) -> Self {
        Rule::with_symbols(lhs, symbols_from_str(rhs), identity_action())
    }

    /// Creates a rule from an explicit symbol sequence.
    pub fn with_symbols(
        lhs: impl Into<Symbol>,
        rhs: Vec<Symbol>,
        action: SemanticAction<V>,
    ) -> Self {
        // Normalize: ε only ever appears as the sole rhs symbol.
        let mut rhs: Vec<Symbol> = if rhs.len() > 1 {
            rhs.into_iter().filter(|s| !s.is_epsilon()).collect()
        } else {
            rhs
        };
        if rhs.is_empty() {
            rhs.push(Symbol::epsilon());
        }
        Rule {
            lhs: lhs.into(),
            rhs,
            action,
        }
    }

    /// The number of rhs symbols that occupy stack frames on reduction.
    pub fn arity(&self) -> usize {
        self.rhs.iter().filter(|s| !s.is_epsilon()).count()
    }

    /// Checks if this is the empty production.
    pub fn is_empty(&self) -> bool {
        self.arity() == 0
    }
}

impl<V> Clone for Rule<V> {
    fn clone(&self) -> Self {
        Rule {
            lhs: self.lhs.clone(),
            rhs: self.rhs.clone(),
            action: self.action.clone(),
        }
    }
}

impl<V> fmt::Debug for Rule<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("lhs", &self.lhs)
            .field("rhs", &self.rhs)
            .finish()
    }
}

impl<V> fmt::Display for Rule<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.lhs, symbols_to_string(&self.rhs))
    }
}

/// Per-terminal operator metadata declared on patterns.
#[derive(Debug, Clone, Copy, Default)]
pub struct OperatorInfo {
    pub precedence: u32,
    pub associativity: Associativity,
}

/// A context-free grammar with semantic actions.
///
/// Rules keep their declaration order; rule 0 is the start rule. The
/// synthetic augmented rule `AUG → start` is stored internally after the
/// user rules and never shows up in [`Grammar::rules`].
pub struct Grammar<V> {
    /// User rules followed by the augmented rule.
    rules: Vec<Rule<V>>,
    /// All variables, in first-lhs-appearance order.
    variables: IndexSet<Symbol>,
    /// All terminals appearing in some rhs, plus `$`.
    terminals: IndexSet<Symbol>,
    /// Map from variables to the indices of their rules.
    rule_map: HashMap<Symbol, Vec<usize>>,
    /// FIRST sets for every symbol.
    first_sets: FirstSets,
    /// Operator metadata per pattern-declared terminal.
    operators: HashMap<Symbol, OperatorInfo>,
    /// Declared pattern names, for inspection.
    pattern_names: BTreeSet<Symbol>,
}

impl<V> Grammar<V> {
    /// Builds a grammar from rules and the declared lexical patterns.
    ///
    /// Group references of the form `:Name:` in any rhs are expanded first:
    /// the rule is replaced by one rule per pattern whose groups contain
    /// `Name`, with the pattern name substituted at that position.
    pub fn new(rules: Vec<Rule<V>>, patterns: &[Pattern<V>]) -> Result<Self> {
        let rules = expand_groups(rules, patterns);
        if rules.is_empty() {
            return Err(ParserError::EmptyGrammar);
        }

        let mut rules = rules;
        let start = rules[0].lhs.clone();
        rules.push(Rule::with_symbols(
            Symbol::augmented(),
            vec![start],
            identity_action(),
        ));

        // Partition: variables are lhs symbols, terminals the rest.
        let mut variables: IndexSet<Symbol> = IndexSet::new();
        for rule in &rules {
            variables.insert(rule.lhs.clone());
        }

        let mut terminals: IndexSet<Symbol> = IndexSet::new();
        for rule in &rules {
            for symbol in &rule.rhs {
                if !variables.contains(symbol) && !symbol.is_epsilon() {
                    terminals.insert(symbol.clone());
                }
            }
        }
        terminals.insert(Symbol::end());

        let mut rule_map: HashMap<Symbol, Vec<usize>> = HashMap::new();
        for (index, rule) in rules.iter().enumerate() {
            rule_map.entry(rule.lhs.clone()).or_default().push(index);
        }

        let first_sets = compute_first_sets(
            &rules,
            variables.iter().cloned(),
            terminals.iter().cloned(),
        );

        let mut operators = HashMap::new();
        let mut pattern_names = BTreeSet::new();
        for pattern in patterns {
            let name = Symbol::new(pattern.name.clone());
            operators.insert(
                name.clone(),
                OperatorInfo {
                    precedence: pattern.precedence,
                    associativity: pattern.associativity,
                },
            );
            pattern_names.insert(name);
        }

        Ok(Self {
            rules,
            variables,
            terminals,
            rule_map,
            first_sets,
            operators,
            pattern_names,
        })
    }

    /// Returns the user rules, in declaration order.
    pub fn rules(&self) -> &[Rule<V>] {
        &self.rules[..self.rules.len() - 1]
    }

    /// Returns any production by index, including the augmented rule.
    pub fn production(&self, index: usize) -> &Rule<V> {
        &self.rules[index]
    }

    /// The index of the synthetic augmented rule.
    pub fn augmented_index(&self) -> usize {
        self.rules.len() - 1
    }

    /// Returns the indices of all rules for a given variable.
    pub fn productions_for(&self, variable: &Symbol) -> &[usize] {
        self.rule_map
            .get(variable)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Returns the start variable (lhs of rule 0).
    pub fn start_symbol(&self) -> &Symbol {
        &self.rules[0].lhs
    }

    /// Returns all variables in the grammar.
    pub fn variables(&self) -> &IndexSet<Symbol> {
        &self.variables
    }

    /// Returns all terminals in the grammar.
    pub fn terminals(&self) -> &IndexSet<Symbol> {
        &self.terminals
    }

    /// Checks if a symbol is a variable of this grammar.
    pub fn is_variable(&self, symbol: &Symbol) -> bool {
        self.variables.contains(symbol)
    }

    /// Returns FIRST(X) for a single symbol.
    pub fn first(&self, symbol: &Symbol) -> BTreeSet<Symbol> {
        self.first_sets.get(symbol).cloned().unwrap_or_default()
    }

    /// Returns FIRST over a symbol sequence.
    pub fn first_of_sequence(&self, symbols: &[Symbol]) -> BTreeSet<Symbol> {
        first_of_string(&self.first_sets, symbols)
    }

    /// Returns the pattern-declared operator metadata of a terminal.
    pub fn operator(&self, terminal: &Symbol) -> OperatorInfo {
        self.operators.get(terminal).copied().unwrap_or_default()
    }

    /// A rule's precedence: the maximum declared precedence of any terminal
    /// in its rhs, or 0 when there is none.
    pub fn rule_precedence(&self, index: usize) -> u32 {
        self.rules[index]
            .rhs
            .iter()
            .filter(|s| !self.is_variable(s))
            .map(|s| self.operator(s).precedence)
            .max()
            .unwrap_or(0)
    }

    /// Inspects the grammar for undefined rhs symbols and unreachable
    /// variables. The diagnostics are advisory; construction never fails on
    /// them.
    pub fn inspect(&self) -> Vec<Inspection> {
        let mut findings = Vec::new();

        for rule in self.rules() {
            for symbol in &rule.rhs {
                if !self.is_variable(symbol)
                    && !self.pattern_names.contains(symbol)
                    && !symbol.is_epsilon()
                    && !symbol.is_end()
                {
                    findings.push(Inspection::UndefinedSymbol {
                        rule: rule.to_string(),
                        symbol: symbol.clone(),
                    });
                }
            }
        }

        // Reachability walk from the start variable.
        let mut reachable: BTreeSet<Symbol> = BTreeSet::new();
        let mut queue = VecDeque::from([self.start_symbol().clone()]);
        while let Some(variable) = queue.pop_front() {
            if !reachable.insert(variable.clone()) {
                continue;
            }
            for &index in self.productions_for(&variable) {
                for symbol in &self.rules[index].rhs {
                    if self.is_variable(symbol) && !reachable.contains(symbol) {
                        queue.push_back(symbol.clone());
                    }
                }
            }
        }
        for variable in &self.variables {
            if !variable.is_augmented() && !reachable.contains(variable) {
                findings.push(Inspection::UnreachableVariable {
                    name: variable.clone(),
                });
            }
        }

        findings
    }
}

impl<V> fmt::Display for Grammar<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rule in self.rules() {
            writeln!(f, "{}", rule)?;
        }
        Ok(())
    }
}

/// Expands `:Group:` rhs references into one rule per member pattern.
///
/// Expansion is depth-first so declaration order is preserved; a rule whose
/// rhs contains no group passes through unchanged.
fn expand_groups<V>(rules: Vec<Rule<V>>, patterns: &[Pattern<V>]) -> Vec<Rule<V>> {
    let mut expanded = Vec::with_capacity(rules.len());
    for rule in rules {
        expand_rule(rule, patterns, &mut expanded);
    }
    expanded
}

fn expand_rule<V>(rule: Rule<V>, patterns: &[Pattern<V>], out: &mut Vec<Rule<V>>) {
    let group = rule
        .rhs
        .iter()
        .enumerate()
        .find_map(|(i, s)| s.group_name().map(|g| (i, g.to_string())));

    match group {
        None => out.push(rule),
        Some((position, group)) => {
            for pattern in patterns {
                if pattern.groups.iter().any(|g| *g == group) {
                    let mut rhs = rule.rhs.clone();
                    rhs[position] = Symbol::new(pattern.name.clone());
                    expand_rule(
                        Rule::with_symbols(rule.lhs.clone(), rhs, rule.action.clone()),
                        patterns,
                        out,
                    );
                }
            }
        }
    }
}
