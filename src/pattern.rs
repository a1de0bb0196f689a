//! Lexical patterns: how terminals are matched in source text.
//!
//! A pattern pairs a terminal name with one or more matchers (literal
//! strings or regular expressions) and carries the options the rest of the
//! toolkit consumes: groups for grammar-rule expansion, a transform filling
//! the token's literal value, operator precedence and associativity, and an
//! ignored flag for trivia such as whitespace.

use std::fmt;
use std::rc::Rc;

/// Operator associativity of a terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Associativity {
    Left,
    Right,
    #[default]
    None,
}

/// A single way of matching a pattern: an exact literal or a regex source.
///
/// Regex sources are compiled (anchored) when the lexer is built, so
/// invalid expressions surface as construction-time errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    Literal(String),
    Regex(String),
}

impl Matcher {
    pub fn literal(text: impl Into<String>) -> Self {
        Matcher::Literal(text.into())
    }

    pub fn regex(source: impl Into<String>) -> Self {
        Matcher::Regex(source.into())
    }
}

/// The transform applied to a matched lexeme to produce a token literal.
pub type Transform<V> = Rc<dyn Fn(&str) -> V>;

/// A lexical pattern.
pub struct Pattern<V> {
    pub name: String,
    pub matchers: Vec<Matcher>,
    pub groups: Vec<String>,
    pub transform: Option<Transform<V>>,
    pub precedence: u32,
    pub associativity: Associativity,
    pub ignored: bool,
}

impl<V> Pattern<V> {
    /// Creates a pattern with the given matchers.
    pub fn new(name: impl Into<String>, matchers: Vec<Matcher>) -> Self {
        Pattern {
            name: name.into(),
            matchers,
            groups: Vec::new(),
            transform: None,
            precedence: 0,
            associativity: Associativity::None,
            ignored: false,
        }
    }

    /// Creates a pattern matching an exact literal.
    pub fn literal(name: impl Into<String>, text: impl Into<String>) -> Self {
        Pattern::new(name, vec![Matcher::literal(text)])
    }

    /// Creates a pattern matching a regular expression.
    pub fn regex(name: impl Into<String>, source: impl Into<String>) -> Self {
        Pattern::new(name, vec![Matcher::regex(source)])
    }

    /// Adds the pattern to a group referenced by `:Name:` rhs symbols.
    pub fn group(mut self, name: impl Into<String>) -> Self {
        self.groups.push(name.into());
        self
    }

    /// Sets the transform producing the token's literal value.
    pub fn transform(mut self, f: impl Fn(&str) -> V + 'static) -> Self {
        self.transform = Some(Rc::new(f));
        self
    }

    /// Sets the operator precedence (higher binds tighter; default 0).
    pub fn precedence(mut self, precedence: u32) -> Self {
        self.precedence = precedence;
        self
    }

    /// Sets the operator associativity.
    pub fn associativity(mut self, associativity: Associativity) -> Self {
        self.associativity = associativity;
        self
    }

    /// Marks the pattern as trivia: matched but never emitted as a token.
    pub fn ignored(mut self) -> Self {
        self.ignored = true;
        self
    }
}

impl<V> Clone for Pattern<V> {
    fn clone(&self) -> Self {
        Pattern {
            name: self.name.clone(),
            matchers: self.matchers.clone(),
            groups: self.groups.clone(),
            transform: self.transform.clone(),
            precedence: self.precedence,
            associativity: self.associativity,
            ignored: self.ignored,
        }
    }
}

impl<V> fmt::Debug for Pattern<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pattern")
            .field("name", &self.name)
            .field("matchers", &self.matchers)
            .field("groups", &self.groups)
            .field("precedence", &self.precedence)
            .field("associativity", &self.associativity)
            .field("ignored", &self.ignored)
            .finish()
    }
}
