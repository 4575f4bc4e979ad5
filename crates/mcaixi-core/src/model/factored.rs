//! Factored context tree: one tree per percept bit, one shared history.
//!
//! Factor `i` predicts bit `i` of each percept block, conditioning on the
//! full interleaved symbol stream. In the factored update each factor's tree
//! is touched exactly once per block while the shared history sees every
//! symbol, which is what the per-factor bystander updates of the classical
//! formulation amount to.

use super::context_tree::{ContextFn, TreeCore};
use super::history::History;
use mcaixi_common::Symbol;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// K parallel context trees over a single shared history.
#[derive(Clone, Serialize, Deserialize)]
pub struct FactoredContextTree {
    factors: Vec<TreeCore>,
    history: History,
}

impl FactoredContextTree {
    /// Create `num_factors` trees of identical depth.
    pub fn new(num_factors: usize, depth: usize) -> Self {
        FactoredContextTree {
            factors: (0..num_factors).map(|_| TreeCore::new(depth)).collect(),
            history: History::new(),
        }
    }

    pub fn num_factors(&self) -> usize {
        self.factors.len()
    }

    pub fn depth(&self) -> usize {
        self.factors[0].depth()
    }

    pub fn history_size(&self) -> usize {
        self.history.len()
    }

    /// The n'th history symbol, if it exists.
    pub fn nth_history_symbol(&self, n: usize) -> Option<Symbol> {
        self.history.nth(n)
    }

    /// Total node count across all factors.
    pub fn size(&self) -> usize {
        self.factors.iter().map(TreeCore::size).sum()
    }

    pub fn set_context_fn(&mut self, f: ContextFn) {
        for factor in &mut self.factors {
            factor.set_context_fn(f.clone());
        }
    }

    /// The log block probability of the whole sequence, summed over factors.
    pub fn log_block_probability(&self) -> f64 {
        self.factors
            .iter()
            .map(TreeCore::log_block_probability)
            .sum()
    }

    /// Update factor `offset` with `sym`; every other factor sees the symbol
    /// through the shared history only.
    fn update_factor(&mut self, offset: usize, sym: Symbol) {
        self.factors[offset].update(sym, &self.history);
        self.history.push(sym);
    }

    /// Undo the most recent `update_factor` that targeted `offset`.
    fn revert_factor(&mut self, offset: usize) {
        let Some(sym) = self.history.pop() else {
            return;
        };
        self.factors[offset].revert(sym, &self.history);
    }

    /// Update with a full percept block; factor `i` models bit `i`.
    pub fn update(&mut self, block: &[Symbol]) {
        debug_assert_eq!(block.len(), self.factors.len());
        for (offset, &sym) in block.iter().enumerate() {
            self.update_factor(offset, sym);
        }
    }

    /// Undo the update that targeted factor `offset`.
    pub fn revert(&mut self, offset: usize) {
        self.revert_factor(offset);
    }

    /// Append symbols to the shared history without touching any tree.
    pub fn update_history(&mut self, syms: &[Symbol]) {
        self.history.extend(syms);
    }

    /// Shrink the shared history down to a former size.
    pub fn revert_history(&mut self, new_len: usize) {
        self.history.truncate(new_len);
    }

    /// Estimated probability of observing a particular percept block next.
    pub fn predict(&mut self, block: &[Symbol]) -> f64 {
        if block.is_empty() {
            return 1.0;
        }

        // Without enough context the prediction is uniform.
        if self.history.len() + block.len() <= self.depth() {
            return 2f64.powi(-(block.len() as i32));
        }

        let log_prob_history = self.log_block_probability();
        self.update(block);
        let log_prob_block_and_history = self.log_block_probability();
        for offset in (0..block.len()).rev() {
            self.revert(offset);
        }

        (log_prob_block_and_history - log_prob_history).exp()
    }

    /// Sample one percept block from the model statistics and update the
    /// model with it.
    ///
    /// When a factor has enough context, the most frequent root symbol is
    /// tried first: the tree is updated with the guess and the resulting
    /// block-probability ratio decides whether to keep it, saving a predict
    /// sweep whenever the guess is accepted.
    pub fn gen_random_symbols_and_update(&mut self, rng: &mut StdRng) -> Vec<Symbol> {
        let bits = self.factors.len();
        let mut symbols: Vec<Symbol> = Vec::with_capacity(bits);

        for offset in 0..bits {
            if self.history.len() + symbols.len() <= self.factors[offset].depth() {
                let sym = if rng.gen::<f64>() < 0.5 {
                    Symbol::Off
                } else {
                    Symbol::On
                };
                symbols.push(sym);
                self.update_factor(offset, sym);
            } else {
                let log_prob_history = self.log_block_probability();

                let guess = self.factors[offset].most_frequent_sym();
                self.update_factor(offset, guess);
                let log_prob_sym_and_history = self.log_block_probability();
                let p = (log_prob_sym_and_history - log_prob_history).exp();
                symbols.push(guess);

                if rng.gen::<f64>() >= p {
                    let flipped = guess.flip();
                    self.revert_factor(offset);
                    self.update_factor(offset, flipped);
                    *symbols.last_mut().expect("just pushed") = flipped;
                }
            }
        }

        symbols
    }

    /// Sample one percept block, leaving the model unchanged.
    pub fn gen_random_symbols(&mut self, rng: &mut StdRng) -> Vec<Symbol> {
        let symbols = self.gen_random_symbols_and_update(rng);
        for offset in (0..symbols.len()).rev() {
            self.revert(offset);
        }
        symbols
    }

    /// Drop all statistics and the shared history.
    pub fn clear(&mut self) {
        self.history.clear();
        for factor in &mut self.factors {
            factor.clear();
        }
    }
}
