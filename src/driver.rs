//! Shift/reduce driver: the stack machine that consumes a token stream and
//! executes semantic actions on reduction.

use crate::error::{ParserError, Result};
use crate::grammar::{Grammar, Payload};
use crate::symbol::Symbol;
use crate::table::{Action, ParseTable};
use crate::token::Token;
use log::{debug, trace};
use std::collections::BTreeSet;

/// A stack frame. The bottom frame is always `State(0)`; state and symbol
/// frames alternate above it.
enum Frame<V> {
    State(usize),
    Terminal(Token<V>),
    Variable(Symbol, Payload<V>),
}

/// One parse run over a `$`-terminated token sequence.
pub struct Driver<'p, V> {
    table: &'p ParseTable,
    grammar: &'p Grammar<V>,
    max_iterations: usize,
    debug: bool,
}

impl<'p, V> Driver<'p, V> {
    pub fn new(
        table: &'p ParseTable,
        grammar: &'p Grammar<V>,
        max_iterations: usize,
        debug: bool,
    ) -> Self {
        Driver {
            table,
            grammar,
            max_iterations,
            debug,
        }
    }

    /// Runs the shift/reduce loop until Accept, an error, or the iteration
    /// ceiling.
    pub fn parse(&self, tokens: Vec<Token<V>>) -> Result<Payload<V>> {
        let mut input = tokens.into_iter().peekable();
        let mut stack: Vec<Frame<V>> = vec![Frame::State(0)];

        for _ in 0..self.max_iterations {
            let state = top_state(&stack);
            let (kind, lexeme, location) = {
                // The $ sentinel never shifts, so the stream cannot run dry.
                let token = match input.peek() {
                    Some(token) => token,
                    None => unreachable!("token streams end with the $ sentinel"),
                };
                (token.kind.clone(), token.lexeme.clone(), token.start)
            };

            match self.table.action(state, &kind) {
                Some(Action::Shift(target)) => {
                    let target = *target;
                    self.log(format_args!("shift '{}' → state {}", lexeme, target));
                    if let Some(token) = input.next() {
                        stack.push(Frame::Terminal(token));
                        stack.push(Frame::State(target));
                    }
                }
                Some(Action::Reduce(rule)) => {
                    self.reduce(&mut stack, *rule);
                }
                Some(Action::Accept) => {
                    self.log(format_args!("accept"));
                    return accept(stack);
                }
                // Invariant 5: Goto never occupies a terminal cell.
                Some(Action::Goto(_)) | None => {
                    return Err(ParserError::UnexpectedToken {
                        lexeme,
                        location,
                        expected: self.expected(state),
                    });
                }
            }
        }

        Err(ParserError::IterationLimit(self.max_iterations))
    }

    /// Pops one state/symbol pair per rhs symbol, invokes the rule's action
    /// with the payloads in source order, and pushes the reduced variable
    /// plus its Goto state.
    fn reduce(&self, stack: &mut Vec<Frame<V>>, rule_index: usize) {
        let rule = self.grammar.production(rule_index);
        self.log(format_args!("reduce by {}", rule));

        let mut payloads = Vec::with_capacity(rule.arity());
        for _ in 0..rule.arity() {
            stack.pop();
            match stack.pop() {
                Some(Frame::Terminal(token)) => payloads.push(Payload::Token(token)),
                Some(Frame::Variable(_, payload)) => payloads.push(payload),
                _ => unreachable!("state and symbol frames alternate"),
            }
        }
        // Popped right-to-left; actions see the rhs left-to-right.
        payloads.reverse();

        let payload = (rule.action)(payloads);

        let state = top_state(stack);
        match self.table.action(state, &rule.lhs) {
            Some(Action::Goto(target)) => {
                stack.push(Frame::Variable(rule.lhs.clone(), payload));
                stack.push(Frame::State(*target));
            }
            _ => unreachable!("table assembly installs a Goto for every reachable reduction"),
        }
    }

    /// The advisory suggestion set for an unexpected token: shiftable
    /// terminals of the row plus FIRST of its Goto variables, without ε
    /// and `$`.
    fn expected(&self, state: usize) -> Vec<Symbol> {
        let mut suggestions: BTreeSet<Symbol> = BTreeSet::new();
        for (symbol, action) in self.table.row(state) {
            match action {
                Action::Shift(_) => {
                    suggestions.insert(symbol.clone());
                }
                Action::Goto(_) => {
                    suggestions.extend(self.grammar.first(symbol));
                }
                _ => {}
            }
        }
        suggestions.remove(&Symbol::epsilon());
        suggestions.remove(&Symbol::end());
        suggestions.into_iter().collect()
    }

    fn log(&self, args: std::fmt::Arguments<'_>) {
        if self.debug {
            debug!("{}", args);
        } else {
            trace!("{}", args);
        }
    }
}

/// The id in the topmost `State` frame.
fn top_state<V>(stack: &[Frame<V>]) -> usize {
    match stack.last() {
        Some(Frame::State(id)) => *id,
        _ => unreachable!("the stack always ends in a state frame"),
    }
}

/// Extracts the accepted start variable's payload: the frame directly above
/// the bottom state frame.
fn accept<V>(mut stack: Vec<Frame<V>>) -> Result<Payload<V>> {
    match stack.drain(1..).next() {
        Some(Frame::Variable(_, payload)) => Ok(payload),
        _ => unreachable!("accept always follows a start-rule reduction"),
    }
}
