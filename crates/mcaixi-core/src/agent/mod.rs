//! The agent facade: channel coding, history hash, and reversible updates.
//!
//! An [`Agent`] binds a [`FactoredContextTree`] environment model to the
//! binary interaction channel: it encodes actions, decodes rewards, keeps a
//! rolling 64-bit hash of the whole history (the key of the search tree),
//! and can roll its model back to any earlier point via [`ModelUndo`]
//! snapshots.

mod hive;

pub use hive::Hive;

use crate::config::Config;
use crate::model::{ContextFn, ContextTree, FactoredContextTree};
use mcaixi_common::{Action, Age, HistoryHash, Result, Reward, RewardEncoding, Symbol};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::info;

// DJB2 seed in the high half, SDBM seed (0) in the low half.
const HASH_SEED: HistoryHash = 5381u64 << 32;

/// A learning agent interacting across a two-way binary channel.
#[derive(Clone, Serialize, Deserialize)]
pub struct Agent {
    num_actions: u64,
    action_bits: u32,
    obs_bits: u32,
    rew_bits: u32,
    horizon: u64,
    model: FactoredContextTree,
    self_model: Option<ContextTree>,
    hash: HistoryHash,
    age: Age,
    last_update_percept: bool,
    reward_encoding: RewardEncoding,
    total_reward: Reward,
    id: usize,
}

impl Agent {
    /// Construct a fresh agent from the runtime configuration.
    pub fn new(config: &Config, id: usize) -> Self {
        let percept_bits = (config.observation_bits + config.reward_bits) as usize;
        let self_model = config
            .bootstrapped_playouts
            .then(|| ContextTree::new(config.ct_depth));

        let mut agent = Agent {
            num_actions: config.num_actions,
            action_bits: action_bit_width(config.num_actions),
            obs_bits: config.observation_bits,
            rew_bits: config.reward_bits,
            horizon: config.horizon,
            model: FactoredContextTree::new(percept_bits, config.ct_depth),
            self_model,
            hash: HASH_SEED,
            age: 0,
            last_update_percept: false,
            reward_encoding: config.reward_encoding,
            total_reward: 0.0,
            id,
        };
        agent.reset();
        agent
    }

    /// Deep copy of this agent under a different identity.
    pub fn clone_with_id(&self, id: usize) -> Self {
        let mut copy = self.clone();
        copy.id = id;
        copy
    }

    /// Load an agent from a saved file.
    pub fn load(path: &Path, binary: bool) -> Result<Self> {
        let agent: Agent = if binary {
            info!(path = %path.display(), "loading (binary-mode) agent");
            let file = File::open(path)?;
            bincode::deserialize_from(BufReader::new(file))?
        } else {
            info!(path = %path.display(), "loading (text-mode) agent");
            let contents = std::fs::read_to_string(path)?;
            serde_json::from_str(&contents)?
        };
        agent.log_startup_properties();
        Ok(agent)
    }

    /// Save the state of this agent to disk.
    pub fn save(&self, path: &Path, binary: bool) -> Result<()> {
        if binary {
            let file = File::create(path)?;
            bincode::serialize_into(BufWriter::new(file), self)?;
        } else {
            let contents = serde_json::to_string_pretty(self)?;
            std::fs::write(path, contents)?;
        }
        info!(path = %path.display(), "successfully saved agent");
        Ok(())
    }

    /// Reset the agent to what it would be with no history.
    pub fn reset(&mut self) {
        self.model.clear();
        if let Some(sm) = &mut self.self_model {
            sm.clear();
        }
        self.hash = HASH_SEED;
        self.age = 0;
        self.last_update_percept = false;
        self.total_reward = 0.0;
        self.log_startup_properties();
    }

    // === Accessors ===

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn age(&self) -> Age {
        self.age
    }

    pub fn hash(&self) -> HistoryHash {
        self.hash
    }

    pub fn num_actions(&self) -> u64 {
        self.num_actions
    }

    pub fn horizon(&self) -> u64 {
        self.horizon
    }

    pub fn history_size(&self) -> usize {
        self.model.history_size()
    }

    pub fn model_size(&self) -> usize {
        self.model.size()
    }

    pub fn use_self_model(&self) -> bool {
        self.self_model.is_some()
    }

    /// Total reward accumulated across the agent's lifespan.
    pub fn reward(&self) -> Reward {
        self.total_reward
    }

    /// Average reward received per completed cycle.
    pub fn average_reward(&self) -> Reward {
        if self.age > 0 {
            self.total_reward / self.age as Reward
        } else {
            0.0
        }
    }

    /// Maximum reward receivable in a single cycle.
    pub fn max_reward(&self) -> Reward {
        match self.reward_encoding {
            RewardEncoding::Base2 => 2f64.powi(self.rew_bits as i32) - 1.0,
            RewardEncoding::BitCount => self.rew_bits as Reward,
        }
    }

    /// Minimum reward receivable in a single cycle.
    pub fn min_reward(&self) -> Reward {
        0.0
    }

    /// Install a context extraction override on the environment model.
    pub fn set_context_fn(&mut self, f: ContextFn) {
        self.model.set_context_fn(f);
    }

    // === Channel coding ===

    /// Parse a percept line into symbols; `None` on wrong length or bad
    /// characters.
    pub fn percept_to_symbols(&self, line: &str) -> Option<Vec<Symbol>> {
        let percept_len = (self.obs_bits + self.rew_bits) as usize;
        if line.chars().count() != percept_len {
            return None;
        }
        line.chars().map(Symbol::from_char).collect()
    }

    /// Encode an action as its bit pattern, MSB first.
    pub fn encode_action(&self, action: Action) -> Vec<Symbol> {
        debug_assert!(self.is_action_ok(action));
        (0..self.action_bits)
            .map(|i| Symbol::from_bit(action & (1 << (self.action_bits - i - 1)) != 0))
            .collect()
    }

    fn symbols_to_action(&self, syms: &[Symbol]) -> Option<Action> {
        let mut action: Action = 0;
        for (c, &sym) in syms.iter().rev().enumerate() {
            if sym.is_on() {
                action |= 1 << c;
            }
        }
        self.is_action_ok(action).then_some(action)
    }

    fn is_action_ok(&self, action: Action) -> bool {
        action < self.num_actions
    }

    /// Decode the reward suffix of a percept block.
    pub fn reward_from_percept(&self, percept: &[Symbol]) -> Reward {
        debug_assert_eq!(percept.len(), (self.obs_bits + self.rew_bits) as usize);
        let reward_suffix = &percept[percept.len() - self.rew_bits as usize..];

        let reward = match self.reward_encoding {
            RewardEncoding::Base2 => {
                let mut r: u64 = 0;
                for (c, &sym) in reward_suffix.iter().rev().enumerate() {
                    if sym.is_on() {
                        r |= 1 << c;
                    }
                }
                r as Reward
            }
            RewardEncoding::BitCount => {
                reward_suffix.iter().filter(|s| s.is_on()).count() as Reward
            }
        };

        debug_assert!(reward >= self.min_reward() && reward <= self.max_reward());
        reward
    }

    // === History hash ===

    fn hash_after_symbol(sym: Symbol, hash: HistoryHash) -> HistoryHash {
        let c = u64::from(if sym.is_on() { b'1' } else { b'0' });

        // one iteration of the SDBM hash on the low half
        let low = hash & 0xffff_ffff;
        let low = c
            .wrapping_add(low << 6)
            .wrapping_add(low << 16)
            .wrapping_sub(low);

        // one iteration of the DJB2 hash on the high half
        let high = hash >> 32;
        let high = (high << 5).wrapping_add(high).wrapping_add(c);

        (high << 32) | low
    }

    /// The hash the history would have after processing `syms`, without
    /// mutating the agent.
    pub fn hash_after_symbols(&self, syms: &[Symbol]) -> HistoryHash {
        syms.iter()
            .fold(self.hash, |h, &sym| Self::hash_after_symbol(sym, h))
    }

    /// The hash the history would have after performing `action`.
    pub fn hash_after_action(&self, action: Action) -> HistoryHash {
        self.hash_after_symbols(&self.encode_action(action))
    }

    // === Model updates ===

    /// Update the agent's model with a percept received from the
    /// environment.
    pub fn model_update_percept(&mut self, percept: &[Symbol]) {
        debug_assert_eq!(percept.len(), (self.obs_bits + self.rew_bits) as usize);
        self.model.update(percept);
        self.non_model_percept_update(percept);
    }

    /// Everything a percept changes besides the environment model itself.
    fn non_model_percept_update(&mut self, percept: &[Symbol]) {
        if let Some(sm) = &mut self.self_model {
            sm.update_history(percept);
        }
        self.hash = self.hash_after_symbols(percept);
        self.total_reward += self.reward_from_percept(percept);
        self.last_update_percept = true;
    }

    /// Update the agent's model with an action it performed.
    ///
    /// Actions are pushed into the environment model's history without
    /// touching its trees: the environment model never predicts the
    /// agent's own actions. The self-model, when present, does.
    pub fn model_update_action(&mut self, action: Action) {
        debug_assert!(self.is_action_ok(action));
        debug_assert!(self.last_update_percept);

        let action_syms = self.encode_action(action);
        self.model.update_history(&action_syms);
        if let Some(sm) = &mut self.self_model {
            sm.update_all(&action_syms);
        }

        self.hash = self.hash_after_symbols(&action_syms);
        self.age += 1;
        self.last_update_percept = false;
    }

    /// Revert the agent to the state captured by `undo`; `false` when the
    /// snapshot is from the agent's future.
    ///
    /// Excess updates are shed one batch at a time, newest first. The kind
    /// of the most recent batch is tracked by `last_update_percept`: a
    /// percept batch is undone through the factored tree in decreasing
    /// factor order, an action batch is a pure history truncation on the
    /// environment model and a tree revert on the self-model.
    pub fn model_revert(&mut self, undo: &ModelUndo) -> bool {
        if self.age < undo.age {
            return false;
        }

        let block = (self.obs_bits + self.rew_bits) as usize;
        let action_bits = self.action_bits as usize;

        while self.model.history_size() > undo.history_size {
            if self.last_update_percept {
                for offset in (0..block).rev() {
                    self.model.revert(offset);
                }
                if let Some(sm) = &mut self.self_model {
                    sm.revert_history(sm.history_size().saturating_sub(block));
                }
                self.last_update_percept = false;
            } else {
                self.model
                    .revert_history(self.model.history_size().saturating_sub(action_bits));
                if let Some(sm) = &mut self.self_model {
                    for _ in 0..action_bits {
                        sm.revert();
                    }
                }
                self.last_update_percept = true;
            }
        }

        self.age = undo.age;
        self.hash = undo.hash;
        self.total_reward = undo.reward;
        self.last_update_percept = undo.last_update_percept;

        debug_assert_eq!(self.model.history_size(), undo.history_size);
        debug_assert!(self
            .self_model
            .as_ref()
            .map_or(true, |sm| sm.history_size() == self.model.history_size()));
        true
    }

    // === Sampling ===

    /// Select a legal action uniformly at random.
    pub fn select_random_action(&self, rng: &mut StdRng) -> Action {
        let action = (rng.gen::<f64>() * self.num_actions as f64) as Action;
        debug_assert!(self.is_action_ok(action));
        action
    }

    /// Sample an action from the agent's model of its own behaviour,
    /// rejection-sampling until the bit pattern is a legal action. Falls
    /// back to a uniform draw without a self-model.
    pub fn gen_action(&mut self, rng: &mut StdRng) -> Action {
        if self.self_model.is_none() {
            return self.select_random_action(rng);
        }

        let action_bits = self.action_bits as usize;
        let num_actions = self.num_actions;
        let sm = self.self_model.as_mut().expect("checked above");
        loop {
            let syms = sm.gen_random_symbols(rng, action_bits);
            let mut action: Action = 0;
            for (c, &sym) in syms.iter().rev().enumerate() {
                if sym.is_on() {
                    action |= 1 << c;
                }
            }
            if action < num_actions {
                return action;
            }
        }
    }

    /// Generate a percept distributed according to the model statistics,
    /// leaving the agent unchanged.
    pub fn gen_percept(&mut self, rng: &mut StdRng) -> Vec<Symbol> {
        self.model.gen_random_symbols(rng)
    }

    /// Generate a percept from the model statistics and update the agent
    /// with it, as if the environment had produced it.
    pub fn gen_percept_and_update(&mut self, rng: &mut StdRng) -> Vec<Symbol> {
        let percept = self.model.gen_random_symbols_and_update(rng);
        self.non_model_percept_update(&percept);
        percept
    }

    /// The model's probability of receiving a particular percept next.
    pub fn percept_probability(&mut self, percept: &[Symbol]) -> f64 {
        debug_assert_eq!(percept.len(), (self.obs_bits + self.rew_bits) as usize);
        self.model.predict(percept)
    }

    /// Probability of selecting `action` under the agent's model of its own
    /// behaviour; uniform without a self-model.
    pub fn predicted_action_prob(&mut self, action: Action) -> f64 {
        if self.self_model.is_none() {
            return 1.0 / self.num_actions as f64;
        }

        // Normalise over legal actions, since some bit patterns may be
        // illegal.
        let mut total = 0.0;
        let mut chosen = 0.0;
        for a in 0..self.num_actions {
            let syms = self.encode_action(a);
            let sm = self.self_model.as_mut().expect("checked above");
            let p = sm.predict_all(&syms);
            total += p;
            if a == action {
                chosen = p;
            }
        }
        debug_assert!(total > 0.0);
        chosen / total
    }

    // === Logging ===

    /// Log the startup configuration properties of the agent.
    pub fn log_startup_properties(&self) {
        if self.id != 0 {
            info!(id = self.id, "additional agent created");
            return;
        }
        info!(
            observation_bits = self.obs_bits,
            reward_bits = self.rew_bits,
            reward_encoding = %self.reward_encoding,
            action_bits = self.action_bits,
            age = self.age,
            horizon = self.horizon,
            model_nodes = self.model.size(),
            "agent created"
        );
    }

    /// Log the dynamic agent properties.
    pub fn log_dynamic_properties(&self) {
        info!(
            average_reward = self.average_reward(),
            total_reward = self.total_reward,
            hash = self.hash,
            age = self.age,
            "agent state"
        );
    }
}

/// Bit width needed to encode actions `0..n`, for `n >= 2`.
fn action_bit_width(n: u64) -> u32 {
    debug_assert!(n >= 2);
    (n - 1).ilog2() + 1
}

/// Snapshot of the five primitive agent fields, sufficient to roll the
/// agent back to a previous point in time.
#[derive(Debug, Clone, Copy)]
pub struct ModelUndo {
    age: Age,
    hash: HistoryHash,
    reward: Reward,
    history_size: usize,
    last_update_percept: bool,
}

impl ModelUndo {
    /// Capture a save point for `agent`.
    pub fn new(agent: &Agent) -> Self {
        ModelUndo {
            age: agent.age(),
            hash: agent.hash(),
            reward: agent.reward(),
            history_size: agent.history_size(),
            last_update_percept: agent.last_update_percept,
        }
    }

    pub fn age(&self) -> Age {
        self.age
    }

    pub fn hash(&self) -> HistoryHash {
        self.hash
    }

    pub fn reward(&self) -> Reward {
        self.reward
    }

    pub fn history_size(&self) -> usize {
        self.history_size
    }

    pub fn last_update_percept(&self) -> bool {
        self.last_update_percept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcaixi_common::Symbol::{Off, On};
    use rand::SeedableRng;

    fn test_config(observation_bits: u32, reward_bits: u32, num_actions: u64) -> Config {
        Config {
            observation_bits,
            reward_bits,
            num_actions,
            ct_depth: 3,
            horizon: 1,
            ..Config::default()
        }
    }

    #[test]
    fn action_bit_widths() {
        assert_eq!(action_bit_width(2), 1);
        assert_eq!(action_bit_width(3), 2);
        assert_eq!(action_bit_width(4), 2);
        assert_eq!(action_bit_width(5), 3);
        assert_eq!(action_bit_width(8), 3);
    }

    #[test]
    fn action_encoding_is_msb_first() {
        let agent = Agent::new(&test_config(1, 1, 4), 0);
        assert_eq!(agent.encode_action(0), vec![Off, Off]);
        assert_eq!(agent.encode_action(1), vec![Off, On]);
        assert_eq!(agent.encode_action(2), vec![On, Off]);
        assert_eq!(agent.encode_action(3), vec![On, On]);
    }

    #[test]
    fn action_encoding_round_trips() {
        let agent = Agent::new(&test_config(1, 1, 5), 0);
        for a in 0..5 {
            let syms = agent.encode_action(a);
            assert_eq!(agent.symbols_to_action(&syms), Some(a));
        }
        // Bit pattern 7 is not a legal action when only 5 exist.
        assert_eq!(agent.symbols_to_action(&[On, On, On]), None);
    }

    #[test]
    fn percept_parsing() {
        let agent = Agent::new(&test_config(2, 1, 2), 0);
        assert_eq!(agent.percept_to_symbols("101"), Some(vec![On, Off, On]));
        assert_eq!(agent.percept_to_symbols("10"), None);
        assert_eq!(agent.percept_to_symbols("1012"), None);
        assert_eq!(agent.percept_to_symbols("1x1"), None);
    }

    #[test]
    fn base2_reward_decoding() {
        let agent = Agent::new(&test_config(1, 3, 2), 0);
        // Reward suffix is the last 3 bits, MSB first.
        assert_eq!(agent.reward_from_percept(&[Off, On, Off, On]), 5.0);
        assert_eq!(agent.reward_from_percept(&[On, Off, Off, Off]), 0.0);
        assert_eq!(agent.reward_from_percept(&[Off, On, On, On]), 7.0);
        assert_eq!(agent.max_reward(), 7.0);
        assert_eq!(agent.min_reward(), 0.0);
    }

    #[test]
    fn bitcount_reward_decoding() {
        let config = Config {
            reward_encoding: RewardEncoding::BitCount,
            ..test_config(1, 3, 2)
        };
        let agent = Agent::new(&config, 0);
        assert_eq!(agent.reward_from_percept(&[On, On, Off, On]), 2.0);
        assert_eq!(agent.max_reward(), 3.0);
    }

    #[test]
    fn reward_within_bounds_for_all_percepts() {
        let agent = Agent::new(&test_config(1, 2, 2), 0);
        for bits in 0..8u32 {
            let percept: Vec<Symbol> = (0..3)
                .map(|i| Symbol::from_bit(bits & (1 << (2 - i)) != 0))
                .collect();
            let r = agent.reward_from_percept(&percept);
            assert!(r >= agent.min_reward() && r <= agent.max_reward());
        }
    }

    #[test]
    fn hash_after_action_matches_actual_update() {
        // Scenario: the pure hash predictor must agree with a real update.
        let mut agent = Agent::new(&test_config(1, 1, 4), 0);
        agent.model_update_percept(&[On, Off]);

        for action in 0..4 {
            let mut probe = agent.clone();
            let predicted = probe.hash_after_action(action);
            probe.model_update_action(action);
            assert_eq!(probe.hash(), predicted);
        }
    }

    #[test]
    fn hash_changes_with_every_symbol() {
        let agent = Agent::new(&test_config(1, 1, 2), 0);
        let h0 = agent.hash();
        let h1 = agent.hash_after_symbols(&[Off]);
        let h2 = agent.hash_after_symbols(&[On]);
        assert_ne!(h0, h1);
        assert_ne!(h0, h2);
        assert_ne!(h1, h2);
    }

    #[test]
    fn coin_flip_prediction_sharpens() {
        // Scenario: percept-only traffic on an alternating reward bit.
        let mut agent = Agent::new(&test_config(0, 1, 2), 0);

        // The first predictions, before enough context, are uniform.
        assert_eq!(agent.percept_probability(&[Off]), 0.5);

        for i in 0..200 {
            let sym = if i % 2 == 0 { Off } else { On };
            agent.model_update_percept(&[sym]);
        }
        // In phase the next symbol is Off.
        assert!(agent.percept_probability(&[Off]) > 0.9);
        assert!(agent.percept_probability(&[On]) < 0.1);
    }

    #[test]
    fn model_update_and_revert_round_trip() {
        let mut agent = Agent::new(&test_config(1, 1, 4), 0);
        agent.model_update_percept(&[On, Off]);
        agent.model_update_action(2);

        let undo = ModelUndo::new(&agent);
        let log_prob = agent.model.log_block_probability();

        agent.model_update_percept(&[Off, On]);
        agent.model_update_action(1);
        agent.model_update_percept(&[On, On]);

        assert!(agent.model_revert(&undo));
        assert_eq!(agent.hash(), undo.hash());
        assert_eq!(agent.age(), undo.age());
        assert_eq!(agent.reward(), undo.reward());
        assert_eq!(agent.history_size(), undo.history_size());
        let diff = (agent.model.log_block_probability() - log_prob).abs();
        assert!(diff < 1e-9);
    }

    #[test]
    fn revert_from_the_future_fails() {
        let mut agent = Agent::new(&test_config(1, 1, 2), 0);
        agent.model_update_percept(&[On, Off]);
        agent.model_update_action(1);
        let undo = ModelUndo::new(&agent);

        let mut earlier = Agent::new(&test_config(1, 1, 2), 0);
        assert!(!earlier.model_revert(&undo));
    }

    #[test]
    fn self_model_stays_in_lockstep() {
        let config = Config {
            bootstrapped_playouts: true,
            ..test_config(1, 1, 2)
        };
        let mut agent = Agent::new(&config, 0);
        let mut rng = StdRng::seed_from_u64(31);

        let undo = ModelUndo::new(&agent);
        for _ in 0..5 {
            agent.model_update_percept(&[On, Off]);
            let action = agent.gen_action(&mut rng);
            agent.model_update_action(action);
        }
        let sm = agent.self_model.as_ref().expect("self model enabled");
        assert_eq!(sm.history_size(), agent.history_size());

        assert!(agent.model_revert(&undo));
        let sm = agent.self_model.as_ref().expect("self model enabled");
        assert_eq!(sm.history_size(), 0);
        assert_eq!(agent.history_size(), 0);
    }

    #[test]
    fn predicted_action_prob_is_uniform_without_self_model() {
        let mut agent = Agent::new(&test_config(1, 1, 4), 0);
        for a in 0..4 {
            assert_eq!(agent.predicted_action_prob(a), 0.25);
        }
    }

    #[test]
    fn predicted_action_probs_normalise() {
        let config = Config {
            bootstrapped_playouts: true,
            ..test_config(1, 1, 3)
        };
        let mut agent = Agent::new(&config, 0);
        for _ in 0..20 {
            agent.model_update_percept(&[On, Off]);
            agent.model_update_action(1);
        }
        let total: f64 = (0..3).map(|a| agent.predicted_action_prob(a)).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn select_random_action_is_legal() {
        let agent = Agent::new(&test_config(1, 1, 3), 0);
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..200 {
            assert!(agent.select_random_action(&mut rng) < 3);
        }
    }

    #[test]
    fn gen_percept_preserves_state() {
        let mut agent = Agent::new(&test_config(1, 1, 2), 0);
        for _ in 0..30 {
            agent.model_update_percept(&[On, Off]);
        }
        let hash = agent.hash();
        let reward = agent.reward();
        let history = agent.history_size();

        let mut rng = StdRng::seed_from_u64(13);
        let percept = agent.gen_percept(&mut rng);

        assert_eq!(percept.len(), 2);
        assert_eq!(agent.hash(), hash);
        assert_eq!(agent.reward(), reward);
        assert_eq!(agent.history_size(), history);
    }

    #[test]
    fn gen_percept_and_update_advances_state() {
        let mut agent = Agent::new(&test_config(1, 1, 2), 0);
        let mut rng = StdRng::seed_from_u64(13);
        let undo = ModelUndo::new(&agent);

        let percept = agent.gen_percept_and_update(&mut rng);
        assert_eq!(agent.history_size(), 2);
        assert_ne!(agent.hash(), undo.hash());
        assert!(agent.last_update_percept);

        let expected_reward = agent.reward_from_percept(&percept);
        assert_eq!(agent.reward(), expected_reward);

        assert!(agent.model_revert(&undo));
        assert_eq!(agent.history_size(), 0);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut agent = Agent::new(&test_config(1, 1, 2), 0);
        let initial_hash = agent.hash();
        agent.model_update_percept(&[On, On]);
        agent.model_update_action(1);
        agent.reset();
        assert_eq!(agent.hash(), initial_hash);
        assert_eq!(agent.age(), 0);
        assert_eq!(agent.reward(), 0.0);
        assert_eq!(agent.history_size(), 0);
    }
}
