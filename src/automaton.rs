//! Automaton construction: breadth-first state population for the
//! canonical LR(1) and LALR(1) collections.
//!
//! The automaton owns the grammar and every state; states reference each
//! other by id. Ids are assigned at registration in creation order and the
//! kernel lookup scans states in id order, so construction is fully
//! deterministic.

use crate::grammar::Grammar;
use crate::item::{Item, Lr1Item};
use crate::state::{FirstCache, Phase, State};
use crate::symbol::Symbol;
use log::{debug, trace};
use std::collections::{BTreeSet, VecDeque};

/// Which LR(1) family the automaton builds.
///
/// CLR keeps one state per distinct kernel-plus-lookaheads combination;
/// LALR merges states whose kernels agree modulo lookaheads and unions the
/// lookahead sets, re-expanding merged states until the collection is
/// stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableMode {
    Clr,
    #[default]
    Lalr,
}

/// The LR automaton: an ordered collection of states over a grammar.
pub struct Automaton<V> {
    grammar: Grammar<V>,
    states: Vec<State>,
    mode: TableMode,
    first_cache: FirstCache,
}

impl<V> std::fmt::Debug for Automaton<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Automaton")
            .field("states", &self.states)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl<V> Automaton<V> {
    /// Builds the automaton for the grammar.
    ///
    /// State 0's kernel is the augmented item `AUG → • start, {$}`. A work
    /// queue drives `resolve` (closure + lookaheads) then `expand` per
    /// state; LALR lookahead merges re-queue the affected state, so the
    /// loop runs until no state needs re-expansion.
    pub fn build(grammar: Grammar<V>, mode: TableMode) -> Self {
        let start = Lr1Item::new(
            Item::new(grammar.augmented_index(), 0),
            BTreeSet::from([Symbol::end()]),
        );

        let mut automaton = Automaton {
            grammar,
            states: Vec::new(),
            mode,
            first_cache: FirstCache::new(),
        };
        automaton.register(vec![start]);

        let mut queue = VecDeque::from([0]);
        while let Some(id) = queue.pop_front() {
            if automaton.states[id].phase() == Phase::Expanded {
                continue;
            }
            automaton.resolve(id);
            automaton.expand(id, &mut queue);
        }

        debug!(
            "automaton complete: {} states ({:?})",
            automaton.states.len(),
            mode
        );
        for state in &automaton.states {
            trace!("{}", state.display(&automaton.grammar));
        }
        automaton
    }

    /// Returns the grammar the automaton was built from.
    pub fn grammar(&self) -> &Grammar<V> {
        &self.grammar
    }

    /// Returns all states, indexed by id.
    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// Returns a state by id.
    pub fn state(&self, id: usize) -> &State {
        &self.states[id]
    }

    /// The construction mode of this automaton.
    pub fn mode(&self) -> TableMode {
        self.mode
    }

    /// Registers a new state with the next id.
    fn register(&mut self, kernel: Vec<Lr1Item>) -> usize {
        let id = self.states.len();
        self.states.push(State::new(id, kernel));
        debug!("registered state {}", id);
        id
    }

    /// Closure plus lookahead propagation for one state.
    fn resolve(&mut self, id: usize) {
        let Automaton {
            grammar,
            states,
            first_cache,
            ..
        } = self;
        let state = &mut states[id];
        state.close(grammar);
        state.propagate_lookaheads(grammar, first_cache);
        state.set_phase(Phase::Closed);
    }

    /// Installs transitions for every symbol at a dot, creating or reusing
    /// target states.
    fn expand(&mut self, id: usize, queue: &mut VecDeque<usize>) {
        let successors = self.states[id].successor_kernels(&self.grammar);

        for (symbol, kernel) in successors {
            let target = match self.lookup(&kernel) {
                Some(existing) => {
                    if self.mode == TableMode::Lalr
                        && !self.states[existing].kernel_covers(&kernel)
                        && self.states[existing].merge_kernel(&kernel)
                    {
                        // The merged state must re-resolve and re-expand so
                        // the new lookaheads reach its successors.
                        debug!("merged lookaheads into state {}", existing);
                        self.states[existing].set_phase(Phase::Fresh);
                        queue.push_back(existing);
                    }
                    existing
                }
                None => {
                    let created = self.register(kernel);
                    queue.push_back(created);
                    created
                }
            };
            self.states[id].link(symbol, target);
        }

        // A self-loop merge resets this very state to Fresh; leave it that
        // way so the queued re-entry resolves it again.
        if self.states[id].phase() == Phase::Closed {
            self.states[id].set_phase(Phase::Expanded);
        }
    }

    /// Finds an existing state for a candidate kernel: full equality under
    /// CLR, core equality under LALR. Scans in id order, so the first match
    /// is deterministic.
    fn lookup(&self, kernel: &[Lr1Item]) -> Option<usize> {
        match self.mode {
            TableMode::Clr => self
                .states
                .iter()
                .position(|state| state.kernel_full_eq(kernel)),
            TableMode::Lalr => self
                .states
                .iter()
                .position(|state| state.kernel_core_eq(kernel)),
        }
    }
}
