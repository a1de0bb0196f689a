//! The parser facade: builds the lexer, grammar, automaton, and table at
//! construction time and runs a fresh driver stack per `parse` call.

use crate::automaton::{Automaton, TableMode};
use crate::driver::Driver;
use crate::error::{Inspection, Result};
use crate::grammar::{Grammar, Payload, Rule};
use crate::lexer::Lexer;
use crate::pattern::Pattern;
use crate::table::{Favor, ParseTable};
use crate::token::Token;
use log::debug;

/// Parser configuration.
#[derive(Debug, Clone, Copy)]
pub struct ParserOptions {
    /// Ceiling on driver loop iterations per `parse` call.
    pub max_iterations: usize,
    /// Log driver steps at `debug` level instead of `trace`.
    pub debug: bool,
    /// Global preference for otherwise-unresolvable shift/reduce conflicts.
    pub favor: Favor,
    /// Which LR(1) family to build.
    pub mode: TableMode,
}

impl Default for ParserOptions {
    fn default() -> Self {
        ParserOptions {
            max_iterations: 5000,
            debug: false,
            favor: Favor::None,
            mode: TableMode::Lalr,
        }
    }
}

/// A runnable parser for a context-free grammar.
///
/// Construction assembles everything up front; a `Parser` is immutable
/// afterwards and may be reused for any number of `parse` calls.
pub struct Parser<V> {
    lexer: Lexer<V>,
    automaton: Automaton<V>,
    table: ParseTable,
    options: ParserOptions,
}

impl<V> std::fmt::Debug for Parser<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser")
            .field("lexer", &self.lexer)
            .field("automaton", &self.automaton)
            .field("table", &self.table)
            .field("options", &self.options)
            .finish()
    }
}

impl<V> Parser<V> {
    /// Builds a parser with default options (LALR, 5000 iterations).
    pub fn new(rules: Vec<Rule<V>>, patterns: Vec<Pattern<V>>) -> Result<Self> {
        Parser::with_options(rules, patterns, ParserOptions::default())
    }

    /// Builds a parser with explicit options.
    pub fn with_options(
        rules: Vec<Rule<V>>,
        patterns: Vec<Pattern<V>>,
        options: ParserOptions,
    ) -> Result<Self> {
        let grammar = Grammar::new(rules, &patterns)?;
        let lexer = Lexer::new(patterns)?;
        let automaton = Automaton::build(grammar, options.mode);
        let table = ParseTable::build(&automaton, options.favor)?;
        debug!(
            "parser ready: {} rules, {} states",
            automaton.grammar().rules().len(),
            automaton.states().len()
        );
        Ok(Parser {
            lexer,
            automaton,
            table,
            options,
        })
    }

    /// Lexes and parses the input, returning the semantic value produced by
    /// the start rule's action.
    pub fn parse(&self, input: &str) -> Result<Payload<V>> {
        let tokens = self.lexer.tokenize(input)?;
        self.parse_tokens(tokens)
    }

    /// Parses an already-lexed token sequence. The `$` sentinel is appended
    /// if the caller left it off.
    pub fn parse_tokens(&self, mut tokens: Vec<Token<V>>) -> Result<Payload<V>> {
        if tokens.last().is_none_or(|token| !token.is_end()) {
            let location = tokens
                .last()
                .map(|token| token.end)
                .unwrap_or_else(crate::token::Location::start);
            tokens.push(Token::end_sentinel(location));
        }
        Driver::new(
            &self.table,
            self.automaton.grammar(),
            self.options.max_iterations,
            self.options.debug,
        )
        .parse(tokens)
    }

    /// The grammar, after group expansion.
    pub fn grammar(&self) -> &Grammar<V> {
        self.automaton.grammar()
    }

    /// The LR automaton the table was derived from.
    pub fn automaton(&self) -> &Automaton<V> {
        &self.automaton
    }

    /// The assembled parse table.
    pub fn table(&self) -> &ParseTable {
        &self.table
    }

    /// The options the parser was built with.
    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Advisory grammar diagnostics (undefined symbols, unreachable
    /// variables).
    pub fn inspect(&self) -> Vec<Inspection> {
        self.grammar().inspect()
    }
}
