//! Automaton states: kernel, closure, lookahead propagation, transitions.
//!
//! A state stores its closure as a single insertion-ordered vector whose
//! prefix is the kernel. Closure discovery adds items with empty lookahead
//! sets; a separate worklist pass fills lookaheads in, so nothing is
//! over-propagated. Transitions reference neighbor states by id.

use crate::grammar::Grammar;
use crate::item::{Item, Lr1Item};
use crate::symbol::Symbol;
use indexmap::IndexMap;
use std::collections::{BTreeSet, HashMap, VecDeque};

/// Lifecycle of a state: `Fresh → Closed → Expanded`. LALR kernel merges
/// reset a state to `Fresh` so it re-resolves and re-expands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Fresh,
    Closed,
    Expanded,
}

/// Memoized FIRST(β) sets, keyed by item core and shared automaton-wide.
pub(crate) type FirstCache = HashMap<Item, BTreeSet<Symbol>>;

/// A state in the LR automaton.
#[derive(Debug)]
pub struct State {
    id: usize,
    /// Kernel followed by closure-discovered items, in insertion order.
    items: Vec<Lr1Item>,
    kernel_len: usize,
    /// Transition targets by symbol, in first-appearance order.
    transitions: IndexMap<Symbol, usize>,
    phase: Phase,
}

impl State {
    pub(crate) fn new(id: usize, kernel: Vec<Lr1Item>) -> Self {
        let kernel_len = kernel.len();
        State {
            id,
            items: kernel,
            kernel_len,
            transitions: IndexMap::new(),
            phase: Phase::Fresh,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// The items introduced by the transition into this state.
    pub fn kernel(&self) -> &[Lr1Item] {
        &self.items[..self.kernel_len]
    }

    /// The full closure, kernel included, in insertion order.
    pub fn closure(&self) -> &[Lr1Item] {
        &self.items
    }

    /// Transition targets by symbol.
    pub fn transitions(&self) -> &IndexMap<Symbol, usize> {
        &self.transitions
    }

    pub(crate) fn phase(&self) -> Phase {
        self.phase
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub(crate) fn link(&mut self, symbol: Symbol, target: usize) {
        self.transitions.insert(symbol, target);
    }

    /// Computes the FIRST-closure of the kernel.
    ///
    /// BFS over items with a variable at the dot: for `A → α • B β` and
    /// every rule `B → γ`, the item `B → • γ` joins the closure with empty
    /// lookaheads. Items are deduplicated by core, so re-running after an
    /// LALR kernel merge discovers nothing new.
    pub(crate) fn close<V>(&mut self, grammar: &Grammar<V>) {
        let mut queue: VecDeque<usize> = (0..self.items.len()).collect();
        while let Some(index) = queue.pop_front() {
            let Some(next) = self.items[index].core.next_symbol(grammar) else {
                continue;
            };
            if !grammar.is_variable(next) {
                continue;
            }
            let next = next.clone();
            for &rule in grammar.productions_for(&next) {
                let core = Item::new(rule, 0);
                if !self.items.iter().any(|item| item.core == core) {
                    self.items.push(Lr1Item::bare(core));
                    queue.push_back(self.items.len() - 1);
                }
            }
        }
    }

    /// Fills in closure lookaheads by worklist propagation.
    ///
    /// For each item `A → α • B β, L`, every dot-0 closure item with lhs B
    /// accumulates FIRST(β) — plus L when β can derive ε (or is empty).
    /// Items whose sets grow re-enter the worklist, so growth cascades
    /// through chained derivations. Lookahead sets are monotone and bounded
    /// by the terminal set, which guarantees termination.
    pub(crate) fn propagate_lookaheads<V>(
        &mut self,
        grammar: &Grammar<V>,
        cache: &mut FirstCache,
    ) {
        let mut worklist: VecDeque<usize> = (0..self.items.len()).collect();

        while let Some(index) = worklist.pop_front() {
            let core = self.items[index].core;
            let Some(next) = core.next_symbol(grammar) else {
                continue;
            };
            if !grammar.is_variable(next) {
                continue;
            }
            let next = next.clone();

            let beta_first = cache
                .entry(core)
                .or_insert_with(|| grammar.first_of_sequence(core.tail(grammar)))
                .clone();

            let mut contribution: BTreeSet<Symbol> = beta_first
                .iter()
                .filter(|s| !s.is_epsilon())
                .cloned()
                .collect();
            if beta_first.contains(&Symbol::epsilon()) {
                contribution.extend(self.items[index].lookaheads.iter().cloned());
            }

            for target in 0..self.items.len() {
                let item = &self.items[target];
                if item.core.dot != 0 || grammar.production(item.core.rule).lhs != next {
                    continue;
                }
                let before = self.items[target].lookaheads.len();
                self.items[target]
                    .lookaheads
                    .extend(contribution.iter().cloned());
                if self.items[target].lookaheads.len() != before {
                    worklist.push_back(target);
                }
            }
        }
    }

    /// Enumerates candidate successor kernels: for each distinct symbol at
    /// a dot (in closure insertion order), every matching item advanced by
    /// one, lookaheads cloned.
    pub(crate) fn successor_kernels<V>(
        &self,
        grammar: &Grammar<V>,
    ) -> Vec<(Symbol, Vec<Lr1Item>)> {
        let mut kernels: IndexMap<Symbol, Vec<Lr1Item>> = IndexMap::new();
        for item in &self.items {
            if let Some(next) = item.core.next_symbol(grammar) {
                kernels
                    .entry(next.clone())
                    .or_default()
                    .push(item.advanced());
            }
        }
        kernels.into_iter().collect()
    }

    /// Kernel equality ignoring lookaheads (LALR lookup).
    pub(crate) fn kernel_core_eq(&self, candidate: &[Lr1Item]) -> bool {
        let kernel = self.kernel();
        kernel.len() == candidate.len()
            && candidate
                .iter()
                .all(|item| kernel.iter().any(|k| k.core_eq(item)))
    }

    /// Kernel equality including lookaheads (CLR lookup).
    pub(crate) fn kernel_full_eq(&self, candidate: &[Lr1Item]) -> bool {
        let kernel = self.kernel();
        kernel.len() == candidate.len()
            && candidate
                .iter()
                .all(|item| kernel.iter().any(|k| k == item))
    }

    /// Checks if this kernel's lookaheads already cover the candidate's.
    pub(crate) fn kernel_covers(&self, candidate: &[Lr1Item]) -> bool {
        candidate.iter().all(|item| {
            self.kernel()
                .iter()
                .any(|k| k.core_eq(item) && k.covers(item))
        })
    }

    /// Unions the candidate kernel's lookaheads into this kernel. Returns
    /// whether any set grew.
    pub(crate) fn merge_kernel(&mut self, candidate: &[Lr1Item]) -> bool {
        let mut grew = false;
        for item in candidate {
            for kernel_item in &mut self.items[..self.kernel_len] {
                if kernel_item.core == item.core {
                    let before = kernel_item.lookaheads.len();
                    kernel_item.lookaheads.extend(item.lookaheads.iter().cloned());
                    grew |= kernel_item.lookaheads.len() != before;
                }
            }
        }
        grew
    }

    /// Renders every closure item, for diagnostics.
    pub fn display<V>(&self, grammar: &Grammar<V>) -> String {
        let items: Vec<String> = self
            .items
            .iter()
            .map(|item| format!("  {}", item.display(grammar)))
            .collect();
        format!("state {}:\n{}", self.id, items.join("\n"))
    }
}
