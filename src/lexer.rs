//! Lexer: turns source text into a `$`-terminated token stream.

use crate::error::{ParserError, Result};
use crate::pattern::{Matcher, Pattern};
use crate::symbol::Symbol;
use crate::token::{Location, Token};
use log::trace;
use regex::Regex;

/// A pattern matcher compiled for scanning.
enum CompiledMatcher {
    Literal(String),
    Regex(Regex),
}

impl CompiledMatcher {
    /// Returns the length of a match at the start of `input`, if any.
    fn match_len(&self, input: &str) -> Option<usize> {
        match self {
            CompiledMatcher::Literal(text) => {
                input.starts_with(text.as_str()).then(|| text.len())
            }
            CompiledMatcher::Regex(regex) => regex.find(input).map(|m| m.end()),
        }
    }
}

struct CompiledPattern<V> {
    pattern: Pattern<V>,
    matchers: Vec<CompiledMatcher>,
}

/// A longest-match lexer over a fixed pattern set.
///
/// At each position every pattern is tried and the longest match wins;
/// ties go to the earliest-declared pattern. Patterns marked `ignored`
/// consume input without emitting a token.
pub struct Lexer<V> {
    patterns: Vec<CompiledPattern<V>>,
}

impl<V> std::fmt::Debug for Lexer<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lexer").finish_non_exhaustive()
    }
}

impl<V> Lexer<V> {
    /// Compiles the given patterns. Regex sources are anchored; an invalid
    /// expression fails construction with `InvalidPattern`.
    pub fn new(patterns: Vec<Pattern<V>>) -> Result<Self> {
        let mut compiled = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            let mut matchers = Vec::with_capacity(pattern.matchers.len());
            for matcher in &pattern.matchers {
                match matcher {
                    Matcher::Literal(text) => {
                        matchers.push(CompiledMatcher::Literal(text.clone()));
                    }
                    Matcher::Regex(source) => {
                        let anchored = format!("^(?:{})", source);
                        let regex = Regex::new(&anchored).map_err(|source| {
                            ParserError::InvalidPattern {
                                name: pattern.name.clone(),
                                source,
                            }
                        })?;
                        matchers.push(CompiledMatcher::Regex(regex));
                    }
                }
            }
            compiled.push(CompiledPattern { pattern, matchers });
        }
        Ok(Lexer { patterns: compiled })
    }

    /// Tokenizes the input, appending the `$` end sentinel.
    pub fn tokenize(&self, input: &str) -> Result<Vec<Token<V>>> {
        let mut tokens = Vec::new();
        let mut location = Location::start();

        while location.offset < input.len() {
            let rest = &input[location.offset..];

            // Longest match over all patterns; first declared wins ties.
            let mut best: Option<(usize, usize)> = None;
            for (index, compiled) in self.patterns.iter().enumerate() {
                for matcher in &compiled.matchers {
                    if let Some(len) = matcher.match_len(rest) {
                        if len > 0 && best.is_none_or(|(_, best_len)| len > best_len) {
                            best = Some((index, len));
                        }
                    }
                }
            }

            let Some((index, len)) = best else {
                let lexeme = rest.chars().next().map(String::from).unwrap_or_default();
                return Err(ParserError::LexerError { lexeme, location });
            };

            let compiled = &self.patterns[index];
            let lexeme = &rest[..len];
            let start = location;
            let end = advance(location, lexeme);
            location = end;

            if compiled.pattern.ignored {
                continue;
            }

            trace!("lexed {} '{}' at {}", compiled.pattern.name, lexeme, start);
            tokens.push(Token {
                kind: Symbol::new(compiled.pattern.name.clone()),
                lexeme: lexeme.to_string(),
                literal: compiled.pattern.transform.as_ref().map(|f| f(lexeme)),
                groups: compiled.pattern.groups.clone(),
                precedence: compiled.pattern.precedence,
                associativity: compiled.pattern.associativity,
                start,
                end,
            });
        }

        tokens.push(Token::end_sentinel(location));
        Ok(tokens)
    }
}

/// Advances a location over the given lexeme.
fn advance(mut location: Location, lexeme: &str) -> Location {
    for c in lexeme.chars() {
        if c == '\n' {
            location.line += 1;
            location.column = 1;
        } else {
            location.column += 1;
        }
    }
    location.offset += lexeme.len();
    location
}
