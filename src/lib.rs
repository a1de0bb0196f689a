//! LR Parser Toolkit
//!
//! A Rust implementation of a parser generator for context-free grammars:
//! canonical LR(1) and LALR(1) automaton construction, parsing-table
//! assembly with operator-precedence conflict resolution, and a
//! shift/reduce driver executing semantic actions during reduction.
//!
//! A parser is built from an ordered list of production rules plus lexical
//! patterns, and transforms source text into a user-defined value:
//!
//! ```
//! use lr_parser::{Parser, Pattern, Payload, Rule};
//!
//! let rules = vec![
//!     Rule::new("Sum", "Sum + NUMBER", |p: Vec<Payload<i64>>| {
//!         let left = p[0].value().copied().unwrap_or(0);
//!         let right = p[2].token().and_then(|t| t.literal).unwrap_or(0);
//!         Payload::Value(left + right)
//!     }),
//!     Rule::new("Sum", "NUMBER", |p: Vec<Payload<i64>>| {
//!         Payload::Value(p[0].token().and_then(|t| t.literal).unwrap_or(0))
//!     }),
//! ];
//! let patterns = vec![
//!     Pattern::regex("NUMBER", "[0-9]+").transform(|s| s.parse().unwrap_or(0)),
//!     Pattern::literal("+", "+"),
//! ];
//!
//! let parser = Parser::new(rules, patterns).unwrap();
//! let result = parser.parse("1+2+3").unwrap();
//! assert!(matches!(result, Payload::Value(6)));
//! ```

pub mod automaton;
pub mod driver;
pub mod error;
pub mod first;
pub mod grammar;
pub mod item;
pub mod lexer;
pub mod parser;
pub mod pattern;
pub mod state;
pub mod symbol;
pub mod table;
pub mod token;

// Re-export commonly used types
pub use automaton::{Automaton, TableMode};
pub use error::{ConflictKind, Inspection, ParserError, Result};
pub use grammar::{Grammar, Payload, Rule, SemanticAction};
pub use lexer::Lexer;
pub use parser::{Parser, ParserOptions};
pub use pattern::{Associativity, Matcher, Pattern};
pub use table::{Action, Favor, ParseTable};
pub use token::{Location, Token};
