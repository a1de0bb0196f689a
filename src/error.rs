//! Error types for the LR parser toolkit.

use crate::symbol::Symbol;
use crate::token::Location;
use std::fmt;
use thiserror::Error;

/// The kind of an unresolved parsing-table conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    ShiftReduce,
    ReduceReduce,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictKind::ShiftReduce => write!(f, "shift/reduce"),
            ConflictKind::ReduceReduce => write!(f, "reduce/reduce"),
        }
    }
}

/// Errors that can occur during parser construction and parsing.
#[derive(Error, Debug)]
pub enum ParserError {
    #[error("grammar is not LR(1): {kind} conflict at state {state} on '{symbol}'")]
    GrammarNotLr1 {
        kind: ConflictKind,
        state: usize,
        symbol: Symbol,
    },

    #[error("grammar has no rules")]
    EmptyGrammar,

    #[error("invalid pattern '{name}': {source}")]
    InvalidPattern {
        name: String,
        source: regex::Error,
    },

    #[error("unexpected token '{lexeme}' at {location}, expected one of: {}", format_expected(.expected))]
    UnexpectedToken {
        lexeme: String,
        location: Location,
        expected: Vec<Symbol>,
    },

    #[error("parse exceeded the iteration limit of {0}")]
    IterationLimit(usize),

    #[error("unrecognized input '{lexeme}' at {location}")]
    LexerError { lexeme: String, location: Location },
}

fn format_expected(expected: &[Symbol]) -> String {
    expected
        .iter()
        .map(Symbol::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Type alias for Results in this crate.
pub type Result<T> = std::result::Result<T, ParserError>;

/// Non-fatal diagnostics produced by grammar inspection.
///
/// Whether these are treated as warnings or hard errors is at the caller's
/// discretion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inspection {
    /// A rhs symbol is neither a declared variable, a pattern name, `$`,
    /// nor ε.
    UndefinedSymbol { rule: String, symbol: Symbol },
    /// A variable that cannot be reached from the start variable.
    UnreachableVariable { name: Symbol },
}

impl fmt::Display for Inspection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Inspection::UndefinedSymbol { rule, symbol } => {
                write!(f, "undefined symbol '{}' in rule {}", symbol, rule)
            }
            Inspection::UnreachableVariable { name } => {
                write!(f, "unreachable variable '{}'", name)
            }
        }
    }
}
