//! LR(0) and LR(1) items.
//!
//! An item is a production rule with a dot marking parse progress. Items
//! reference their rule by index into the grammar, never by pointer, so
//! states can be compared and cloned cheaply.

use crate::grammar::Grammar;
use crate::symbol::Symbol;
use std::collections::BTreeSet;

/// An LR(0) item: a rule index plus a dot position.
///
/// The dot ranges over `0..=arity(rhs)`; an item is completed when the dot
/// has passed every non-ε rhs symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Item {
    pub rule: usize,
    pub dot: usize,
}

impl Item {
    pub fn new(rule: usize, dot: usize) -> Self {
        Item { rule, dot }
    }

    /// Checks if the dot is at the end (reduce item).
    pub fn is_completed<V>(&self, grammar: &Grammar<V>) -> bool {
        self.dot >= grammar.production(self.rule).arity()
    }

    /// Returns the symbol after the dot, if any.
    pub fn next_symbol<'g, V>(&self, grammar: &'g Grammar<V>) -> Option<&'g Symbol> {
        if self.is_completed(grammar) {
            None
        } else {
            grammar.production(self.rule).rhs.get(self.dot)
        }
    }

    /// Returns the symbol one past the one after the dot, if any.
    pub fn next_next_symbol<'g, V>(&self, grammar: &'g Grammar<V>) -> Option<&'g Symbol> {
        if self.is_completed(grammar) {
            None
        } else {
            grammar.production(self.rule).rhs.get(self.dot + 1)
        }
    }

    /// The rhs tail after the symbol at the dot.
    pub fn tail<'g, V>(&self, grammar: &'g Grammar<V>) -> &'g [Symbol] {
        let rhs = &grammar.production(self.rule).rhs;
        if self.dot + 1 >= rhs.len() {
            &[]
        } else {
            &rhs[self.dot + 1..]
        }
    }

    /// The same item with the dot advanced over one symbol.
    pub fn advanced(&self) -> Item {
        Item::new(self.rule, self.dot + 1)
    }

    /// Renders the item as `lhs → α • β`.
    pub fn display<V>(&self, grammar: &Grammar<V>) -> String {
        let rule = grammar.production(self.rule);
        let mut parts: Vec<String> = Vec::with_capacity(rule.rhs.len() + 2);
        for (i, symbol) in rule.rhs.iter().enumerate() {
            if i == self.dot {
                parts.push("•".to_string());
            }
            parts.push(symbol.to_string());
        }
        if self.dot >= rule.rhs.len() {
            parts.push("•".to_string());
        }
        format!("{} → {}", rule.lhs, parts.join(" "))
    }
}

/// An LR(1) item: an LR(0) core plus a set of lookahead terminals.
///
/// Lookahead sets are owned values; advancing an item clones the set so no
/// two items ever alias one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lr1Item {
    pub core: Item,
    pub lookaheads: BTreeSet<Symbol>,
}

impl Lr1Item {
    pub fn new(core: Item, lookaheads: BTreeSet<Symbol>) -> Self {
        Lr1Item { core, lookaheads }
    }

    /// An item with no lookaheads yet, as introduced by closure discovery.
    pub fn bare(core: Item) -> Self {
        Lr1Item {
            core,
            lookaheads: BTreeSet::new(),
        }
    }

    /// Equality on the LR(0) core only, ignoring lookaheads.
    pub fn core_eq(&self, other: &Lr1Item) -> bool {
        self.core == other.core
    }

    /// The item with the dot advanced and the lookaheads copied.
    pub fn advanced(&self) -> Lr1Item {
        Lr1Item {
            core: self.core.advanced(),
            lookaheads: self.lookaheads.clone(),
        }
    }

    /// Checks if this item's lookaheads include all of the other's.
    pub fn covers(&self, other: &Lr1Item) -> bool {
        other.lookaheads.is_subset(&self.lookaheads)
    }

    /// Renders the item as `lhs → α • β, {a, b}`.
    pub fn display<V>(&self, grammar: &Grammar<V>) -> String {
        let lookaheads: Vec<&str> = self.lookaheads.iter().map(Symbol::as_str).collect();
        format!(
            "{}, {{{}}}",
            self.core.display(grammar),
            lookaheads.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Rule;

    fn grammar() -> Grammar<()> {
        Grammar::new(
            vec![Rule::unit("S", "S + S"), Rule::unit("S", "n"), Rule::unit("E", "")],
            &[],
        )
        .unwrap()
    }

    #[test]
    fn test_next_symbol_and_completion() {
        let g = grammar();
        let item = Item::new(0, 1);
        assert_eq!(item.next_symbol(&g), Some(&Symbol::new("+")));
        assert_eq!(item.next_next_symbol(&g), Some(&Symbol::new("S")));
        assert!(!item.is_completed(&g));
        assert!(Item::new(0, 3).is_completed(&g));
    }

    #[test]
    fn test_empty_production_is_completed_at_zero() {
        let g = grammar();
        let item = Item::new(2, 0);
        assert!(item.is_completed(&g));
        assert_eq!(item.next_symbol(&g), None);
    }

    #[test]
    fn test_display() {
        let g = grammar();
        assert_eq!(Item::new(0, 1).display(&g), "S → S • + S");
        assert_eq!(Item::new(1, 1).display(&g), "S → n •");
    }

    #[test]
    fn test_core_vs_full_equality() {
        let a = Lr1Item::new(Item::new(0, 1), BTreeSet::from([Symbol::end()]));
        let b = Lr1Item::new(Item::new(0, 1), BTreeSet::from([Symbol::new("+")]));
        assert!(a.core_eq(&b));
        assert_ne!(a, b);

        let advanced = a.advanced();
        assert_eq!(advanced.core.dot, 2);
        assert_eq!(advanced.lookaheads, a.lookaheads);
    }
}
