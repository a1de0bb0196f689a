//! Parse-table assembly and conflict resolution.
//!
//! The table maps `(state, symbol)` to a single action. Population records
//! shifts and gotos from state transitions and reduces from completed
//! closure items; a resolution pass then arbitrates multi-action cells
//! using operator precedence and associativity.

use crate::automaton::Automaton;
use crate::error::{ConflictKind, ParserError, Result};
use crate::grammar::Grammar;
use crate::pattern::Associativity;
use crate::symbol::Symbol;
use indexmap::IndexMap;
use log::debug;
use std::fmt;

/// A parsing-table action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Shift(usize),
    Goto(usize),
    Reduce(usize),
    Accept,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Shift(state) => write!(f, "s{}", state),
            Action::Goto(state) => write!(f, "g{}", state),
            Action::Reduce(rule) => write!(f, "r{}", rule),
            Action::Accept => write!(f, "acc"),
        }
    }
}

/// Global preference for shift/reduce conflicts that precedence and
/// associativity leave unresolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Favor {
    Shift,
    Reduce,
    #[default]
    None,
}

/// The assembled parse table: one action row per state.
#[derive(Debug)]
pub struct ParseTable {
    rows: Vec<IndexMap<Symbol, Action>>,
}

impl ParseTable {
    /// Builds the table from an automaton.
    ///
    /// For each state: terminal transitions become Shift, variable
    /// transitions become Goto, the completed augmented item becomes Accept
    /// under `$` only, and every other completed item becomes Reduce under
    /// each of its lookaheads. Cells that end up with more than one action
    /// are resolved (or rejected) by [`resolve_cell`].
    pub fn build<V>(automaton: &Automaton<V>, favor: Favor) -> Result<Self> {
        let grammar = automaton.grammar();
        let mut rows = Vec::with_capacity(automaton.states().len());

        for state in automaton.states() {
            let mut cells: IndexMap<Symbol, Vec<Action>> = IndexMap::new();

            for (symbol, &target) in state.transitions() {
                let action = if grammar.is_variable(symbol) {
                    Action::Goto(target)
                } else {
                    Action::Shift(target)
                };
                cells.entry(symbol.clone()).or_default().push(action);
            }

            for item in state.closure() {
                if !item.core.is_completed(grammar) {
                    continue;
                }
                if grammar.production(item.core.rule).lhs.is_augmented() {
                    cells.entry(Symbol::end()).or_default().push(Action::Accept);
                } else {
                    for lookahead in &item.lookaheads {
                        cells
                            .entry(lookahead.clone())
                            .or_default()
                            .push(Action::Reduce(item.core.rule));
                    }
                }
            }

            let mut row = IndexMap::with_capacity(cells.len());
            for (symbol, actions) in cells {
                let action = resolve_cell(grammar, state.id(), &symbol, actions, favor)?;
                row.insert(symbol, action);
            }
            rows.push(row);
        }

        Ok(ParseTable { rows })
    }

    /// Returns the action for a state and symbol, if any.
    pub fn action(&self, state: usize, symbol: &Symbol) -> Option<&Action> {
        self.rows.get(state).and_then(|row| row.get(symbol))
    }

    /// Returns a state's full action row.
    pub fn row(&self, state: usize) -> &IndexMap<Symbol, Action> {
        &self.rows[state]
    }

    /// The number of states covered by the table.
    pub fn state_count(&self) -> usize {
        self.rows.len()
    }
}

/// Resolves a single table cell down to one action.
///
/// Shift/Reduce: the terminal's declared precedence against the rule's
/// (max terminal precedence in its rhs); ties fall to the terminal's
/// associativity — Left reduces, Right shifts, None is a hard conflict
/// unless the global favor overrides. Reduce/Reduce: the unique
/// highest-precedence rule wins; any tie is a hard conflict.
fn resolve_cell<V>(
    grammar: &Grammar<V>,
    state: usize,
    symbol: &Symbol,
    mut actions: Vec<Action>,
    favor: Favor,
) -> Result<Action> {
    if actions.len() == 1 {
        return Ok(actions.remove(0));
    }

    let mut shift = None;
    let mut reduces: Vec<usize> = Vec::new();
    let mut accept = false;
    for action in actions {
        match action {
            Action::Shift(target) => shift = Some(target),
            Action::Reduce(rule) => {
                if !reduces.contains(&rule) {
                    reduces.push(rule);
                }
            }
            Action::Accept => accept = true,
            // A variable transition is unique per symbol and lookaheads are
            // never variables, so a Goto cell holds exactly one action.
            Action::Goto(target) => return Ok(Action::Goto(target)),
        }
    }

    // A rule reducing on $ in the accept state means the grammar is
    // ambiguous at end of input.
    if accept {
        if reduces.is_empty() && shift.is_none() {
            return Ok(Action::Accept);
        }
        return Err(ParserError::GrammarNotLr1 {
            kind: ConflictKind::ReduceReduce,
            state,
            symbol: symbol.clone(),
        });
    }

    let reduce = match reduces.len() {
        0 => None,
        1 => Some(reduces[0]),
        _ => Some(resolve_reduce_reduce(grammar, state, symbol, &reduces)?),
    };

    match (shift, reduce) {
        (Some(target), None) => Ok(Action::Shift(target)),
        (None, Some(rule)) => Ok(Action::Reduce(rule)),
        (Some(target), Some(rule)) => {
            resolve_shift_reduce(grammar, state, symbol, target, rule, favor)
        }
        (None, None) => unreachable!("empty table cell"),
    }
}

fn resolve_shift_reduce<V>(
    grammar: &Grammar<V>,
    state: usize,
    symbol: &Symbol,
    target: usize,
    rule: usize,
    favor: Favor,
) -> Result<Action> {
    let shift_precedence = grammar.operator(symbol).precedence;
    let rule_precedence = grammar.rule_precedence(rule);

    let resolved = if shift_precedence > rule_precedence {
        Action::Shift(target)
    } else if shift_precedence < rule_precedence {
        Action::Reduce(rule)
    } else {
        match grammar.operator(symbol).associativity {
            Associativity::Left => Action::Reduce(rule),
            Associativity::Right => Action::Shift(target),
            Associativity::None => match favor {
                Favor::Shift => Action::Shift(target),
                Favor::Reduce => Action::Reduce(rule),
                Favor::None => {
                    return Err(ParserError::GrammarNotLr1 {
                        kind: ConflictKind::ShiftReduce,
                        state,
                        symbol: symbol.clone(),
                    });
                }
            },
        }
    };

    debug!(
        "state {}: shift/reduce on '{}' resolved to {}",
        state, symbol, resolved
    );
    Ok(resolved)
}

fn resolve_reduce_reduce<V>(
    grammar: &Grammar<V>,
    state: usize,
    symbol: &Symbol,
    reduces: &[usize],
) -> Result<usize> {
    let max = reduces
        .iter()
        .map(|&rule| grammar.rule_precedence(rule))
        .max()
        .unwrap_or(0);
    let mut winners = reduces
        .iter()
        .filter(|&&rule| grammar.rule_precedence(rule) == max);

    match (winners.next(), winners.next()) {
        // "Highest precedence wins" is only well-defined when the maximum
        // is unique; a tie (including all-equal) is a hard conflict.
        (Some(&winner), None) => {
            debug!(
                "state {}: reduce/reduce on '{}' resolved to rule {}",
                state, symbol, winner
            );
            Ok(winner)
        }
        _ => Err(ParserError::GrammarNotLr1 {
            kind: ConflictKind::ReduceReduce,
            state,
            symbol: symbol.clone(),
        }),
    }
}
