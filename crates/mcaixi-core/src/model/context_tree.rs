//! A binary context tree of KT estimators mixed by the CTW recurrence.

use super::history::History;
use super::node::{NodeArena, NodeId};
use mcaixi_common::Symbol;
use mcaixi_math::{ln_one_plus_exp, log_kt_multiplier, LN_HALF};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Override for the default most-recent-suffix context extraction.
///
/// Given the history and the tree depth, fills the context buffer with the
/// conditioning symbols, most recent first.
pub type ContextFn = Arc<dyn Fn(&History, usize, &mut Vec<Symbol>) + Send + Sync>;

/// The tree machinery of a context tree, without a history.
///
/// Every operation takes the conditioning [`History`] as an argument so that
/// a factored tree can share one history across all of its factors. The
/// caller owns the history bookkeeping: push the symbol *after* `update`,
/// pop it *before* `revert`.
#[derive(Clone, Serialize, Deserialize)]
pub(crate) struct TreeCore {
    arena: NodeArena,
    root: NodeId,
    depth: usize,
    #[serde(skip)]
    context_fn: Option<ContextFn>,
}

impl TreeCore {
    pub fn new(depth: usize) -> Self {
        let mut arena = NodeArena::new();
        let root = arena.alloc();
        TreeCore {
            arena,
            root,
            depth,
            context_fn: None,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn set_context_fn(&mut self, f: ContextFn) {
        self.context_fn = Some(f);
    }

    /// The log block probability of everything this tree has seen.
    pub fn log_block_probability(&self) -> f64 {
        self.arena.get(self.root).log_prob_weighted
    }

    /// The symbol observed more often at the root, ties broken to `Off`.
    pub fn most_frequent_sym(&self) -> Symbol {
        let root = self.arena.get(self.root);
        if root.count(Symbol::On) > root.count(Symbol::Off) {
            Symbol::On
        } else {
            Symbol::Off
        }
    }

    /// Number of nodes reachable from the root.
    pub fn size(&self) -> usize {
        self.subtree_size(self.root)
    }

    fn subtree_size(&self, id: NodeId) -> usize {
        let node = self.arena.get(id);
        let mut total = 1;
        for sym in [Symbol::Off, Symbol::On] {
            if let Some(child) = node.child(sym) {
                total += self.subtree_size(child);
            }
        }
        total
    }

    /// Drop all statistics and start from a fresh root.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = self.arena.alloc();
    }

    fn gather_context(&self, history: &History, out: &mut Vec<Symbol>) {
        match &self.context_fn {
            Some(f) => f(history, self.depth, out),
            None => history.write_context(self.depth, out),
        }
    }

    /// Walk the context path root -> leaf, creating missing nodes.
    fn build_context_path(&mut self, context: &[Symbol]) -> Vec<NodeId> {
        let mut path = Vec::with_capacity(context.len() + 1);
        let mut id = self.root;
        path.push(id);
        for &sym in context {
            let next = match self.arena.get(id).child(sym) {
                Some(child) => child,
                None => {
                    let child = self.arena.alloc();
                    self.arena.get_mut(id).child[sym.index()] = Some(child);
                    child
                }
            };
            path.push(next);
            id = next;
        }
        path
    }

    /// Walk the context path without creating nodes; `None` if incomplete.
    fn existing_context_path(&self, context: &[Symbol]) -> Option<Vec<NodeId>> {
        let mut path = Vec::with_capacity(context.len() + 1);
        let mut id = self.root;
        path.push(id);
        for &sym in context {
            id = self.arena.get(id).child(sym)?;
            path.push(id);
        }
        Some(path)
    }

    /// Recompute the weighted probability of a node from its children.
    fn refresh_weighted(&mut self, id: NodeId, is_leaf: bool) {
        let (est, log_w_off, log_w_on) = {
            let node = self.arena.get(id);
            let off = node
                .child(Symbol::Off)
                .map_or(0.0, |c| self.arena.get(c).log_prob_weighted);
            let on = node
                .child(Symbol::On)
                .map_or(0.0, |c| self.arena.get(c).log_prob_weighted);
            (node.log_prob_est, off, on)
        };
        let weighted = if is_leaf {
            est
        } else {
            // P_w = 0.5 * (P_kt + P_w0 * P_w1), in log space
            LN_HALF + est + ln_one_plus_exp(log_w_off + log_w_on - est)
        };
        self.arena.get_mut(id).log_prob_weighted = weighted;
    }

    /// Account for one observed symbol in the current context.
    ///
    /// Does nothing when the history is still shorter than the depth; the
    /// caller appends the symbol to the history afterwards either way.
    pub fn update(&mut self, sym: Symbol, history: &History) {
        let mut context = Vec::with_capacity(self.depth);
        self.gather_context(history, &mut context);
        if context.len() < self.depth {
            return;
        }

        let path = self.build_context_path(&context);
        for (node_depth, &id) in path.iter().enumerate().rev() {
            {
                let node = self.arena.get_mut(id);
                let log_mul = log_kt_multiplier(node.count(sym), node.visits());
                node.log_prob_est += log_mul;
                node.count[sym.index()] = node.count[sym.index()].saturating_add(1);
            }
            self.refresh_weighted(id, node_depth == self.depth);
        }
    }

    /// Undo the most recent `update` of `sym`.
    ///
    /// The caller has already popped the symbol off the history; `history`
    /// is the conditioning sequence exactly as `update` saw it. The counts
    /// are decremented *before* the KT multiplier is recomputed, which is
    /// the only ordering that exactly inverts `update`.
    pub fn revert(&mut self, sym: Symbol, history: &History) {
        let mut context = Vec::with_capacity(self.depth);
        self.gather_context(history, &mut context);
        if context.len() < self.depth {
            return;
        }

        // A revert without a matching update leaves the tree untouched.
        let Some(path) = self.existing_context_path(&context) else {
            return;
        };

        for (node_depth, &id) in path.iter().enumerate().rev() {
            {
                let node = self.arena.get_mut(id);
                node.count[sym.index()] = node.count[sym.index()].saturating_sub(1);
                let log_mul = log_kt_multiplier(node.count(sym), node.visits());
                node.log_prob_est -= log_mul;
            }

            // Reclaim children that no longer carry any observations.
            for s in [Symbol::Off, Symbol::On] {
                if let Some(child) = self.arena.get(id).child(s) {
                    if self.arena.get(child).visits() == 0 {
                        self.arena.release(child);
                        self.arena.get_mut(id).child[s.index()] = None;
                    }
                }
            }

            self.refresh_weighted(id, node_depth == self.depth);
        }
    }

    #[cfg(test)]
    pub(crate) fn assert_no_unvisited_nodes(&self) {
        fn walk(core: &TreeCore, id: NodeId, is_root: bool) {
            let node = core.arena.get(id);
            if !is_root {
                assert!(node.visits() > 0, "non-root node with zero visits");
            }
            for sym in [Symbol::Off, Symbol::On] {
                if let Some(child) = node.child(sym) {
                    walk(core, child, false);
                }
            }
        }
        walk(self, self.root, true);
    }
}

/// A binary context tree together with the history it conditions on.
#[derive(Clone, Serialize, Deserialize)]
pub struct ContextTree {
    core: TreeCore,
    history: History,
}

impl ContextTree {
    /// Create a context tree of the given maximum depth.
    pub fn new(depth: usize) -> Self {
        ContextTree {
            core: TreeCore::new(depth),
            history: History::new(),
        }
    }

    pub fn depth(&self) -> usize {
        self.core.depth()
    }

    pub fn history_size(&self) -> usize {
        self.history.len()
    }

    /// Number of nodes in the tree.
    pub fn size(&self) -> usize {
        self.core.size()
    }

    /// The n'th history symbol, if it exists.
    pub fn nth_history_symbol(&self, n: usize) -> Option<Symbol> {
        self.history.nth(n)
    }

    pub fn set_context_fn(&mut self, f: ContextFn) {
        self.core.set_context_fn(f);
    }

    pub fn log_block_probability(&self) -> f64 {
        self.core.log_block_probability()
    }

    pub fn most_frequent_sym(&self) -> Symbol {
        self.core.most_frequent_sym()
    }

    /// Update the tree and history with a new symbol.
    pub fn update(&mut self, sym: Symbol) {
        self.core.update(sym, &self.history);
        self.history.push(sym);
    }

    /// Update with a block of symbols, one at a time.
    pub fn update_all(&mut self, syms: &[Symbol]) {
        for &sym in syms {
            self.update(sym);
        }
    }

    /// Append symbols to the history without touching the tree.
    pub fn update_history(&mut self, syms: &[Symbol]) {
        self.history.extend(syms);
    }

    /// Remove the most recently observed symbol.
    pub fn revert(&mut self) {
        let Some(sym) = self.history.pop() else {
            return;
        };
        self.core.revert(sym, &self.history);
    }

    /// Shrink the history down to a former size without touching the tree.
    pub fn revert_history(&mut self, new_len: usize) {
        self.history.truncate(new_len);
    }

    /// Estimated probability of observing `sym` next.
    pub fn predict(&mut self, sym: Symbol) -> f64 {
        // Without enough context the prediction is uniform.
        if self.history.len() + 1 <= self.depth() {
            return 0.5;
        }

        let log_prob_history = self.log_block_probability();
        self.update(sym);
        let log_prob_sym_and_history = self.log_block_probability();
        self.revert();

        (log_prob_sym_and_history - log_prob_history).exp()
    }

    /// Estimated probability of observing a particular sequence next.
    pub fn predict_all(&mut self, syms: &[Symbol]) -> f64 {
        if self.history.len() + syms.len() <= self.depth() {
            return 2f64.powi(-(syms.len() as i32));
        }

        let log_prob_history = self.log_block_probability();
        self.update_all(syms);
        let log_prob_syms_and_history = self.log_block_probability();
        for _ in 0..syms.len() {
            self.revert();
        }

        (log_prob_syms_and_history - log_prob_history).exp()
    }

    /// Sample `bits` symbols from the tree statistics and update the tree
    /// with each as it is drawn.
    pub fn gen_random_symbols_and_update(&mut self, rng: &mut StdRng, bits: usize) -> Vec<Symbol> {
        let mut symbols = Vec::with_capacity(bits);
        for _ in 0..bits {
            let p_off = self.predict(Symbol::Off);
            let sym = if rng.gen::<f64>() < p_off {
                Symbol::Off
            } else {
                Symbol::On
            };
            symbols.push(sym);
            self.update(sym);
        }
        symbols
    }

    /// Sample `bits` symbols from the tree statistics, leaving the tree
    /// unchanged.
    pub fn gen_random_symbols(&mut self, rng: &mut StdRng, bits: usize) -> Vec<Symbol> {
        let symbols = self.gen_random_symbols_and_update(rng, bits);
        for _ in 0..bits {
            self.revert();
        }
        symbols
    }

    /// Drop all statistics and history.
    pub fn clear(&mut self) {
        self.history.clear();
        self.core.clear();
    }

    #[cfg(test)]
    pub(crate) fn core(&self) -> &TreeCore {
        &self.core
    }
}
