//! FIRST set computation for context-free grammars.
//!
//! This module implements the FIRST algorithm from Aho et al., "Compilers:
//! Principles, Techniques, and Tools" (2nd Edition), section 4.4. FIRST sets
//! feed the LR(1) lookahead propagation and the driver's suggestion sets.

use crate::grammar::Rule;
use crate::symbol::Symbol;
use std::collections::{BTreeSet, HashMap};

/// Type alias for FIRST sets mapping.
pub type FirstSets = HashMap<Symbol, BTreeSet<Symbol>>;

/// Computes the FIRST sets for all symbols of the grammar.
///
/// # Algorithm
/// 1. For terminals: FIRST(a) = {a}
/// 2. For variables A with rule A → X₁X₂...Xₙ:
///    - Add FIRST(X₁) - {ε} to FIRST(A)
///    - If ε ∈ FIRST(X₁), add FIRST(X₂) - {ε}
///    - Continue while ε ∈ FIRST(Xᵢ)
///    - If ε ∈ FIRST(Xᵢ) for all i, add ε to FIRST(A)
/// 3. Repeat until no changes (fixed-point iteration)
pub fn compute_first_sets<V>(
    rules: &[Rule<V>],
    variables: impl Iterator<Item = Symbol>,
    terminals: impl Iterator<Item = Symbol>,
) -> FirstSets {
    let mut first_sets: FirstSets = HashMap::new();

    // Terminals and sentinels start with their singleton sets.
    for terminal in terminals {
        first_sets.insert(terminal.clone(), BTreeSet::from([terminal]));
    }
    first_sets.insert(Symbol::epsilon(), BTreeSet::from([Symbol::epsilon()]));
    first_sets.insert(Symbol::end(), BTreeSet::from([Symbol::end()]));

    // Variables start empty.
    for variable in variables {
        first_sets.insert(variable, BTreeSet::new());
    }

    // Fixed-point iteration
    let mut changed = true;
    while changed {
        changed = false;

        for rule in rules {
            let rhs_first = first_of_string(&first_sets, &rule.rhs);
            let current = first_sets.entry(rule.lhs.clone()).or_default();

            let before = current.len();
            current.extend(rhs_first);
            if current.len() != before {
                changed = true;
            }
        }
    }

    first_sets
}

/// Computes the FIRST set of a sequence of symbols.
///
/// # Algorithm
/// - Add FIRST(X₁) - {ε} to result
/// - If ε ∈ FIRST(X₁), add FIRST(X₂) - {ε}
/// - Continue while ε ∈ FIRST(Xᵢ)
/// - If ε ∈ FIRST(Xᵢ) for all i, add ε to result
pub fn first_of_string(first_sets: &FirstSets, symbols: &[Symbol]) -> BTreeSet<Symbol> {
    let mut result = BTreeSet::new();
    let mut has_epsilon = true;

    for symbol in symbols {
        if !has_epsilon {
            break;
        }

        let first_sym = first_sets.get(symbol).cloned().unwrap_or_default();

        for sym in &first_sym {
            if !sym.is_epsilon() {
                result.insert(sym.clone());
            }
        }

        has_epsilon = first_sym.contains(&Symbol::epsilon());
    }

    if has_epsilon {
        result.insert(Symbol::epsilon());
    }

    result
}
