//! Action selection by simulating possible future lives of the agent.
//!
//! The main controller is a multi-threaded Monte-Carlo tree search (UCT)
//! over alternating decision and chance nodes, using the agent's factored
//! context tree as a generative simulator of the future. Each worker thread
//! owns one hive agent and an independent RNG; the search tree itself is
//! shared through the hash-keyed [`NodePool`].

mod node;

pub use node::{NodeKind, NodePool, SearchError, SearchNode};

use crate::agent::{Agent, Hive, ModelUndo};
use crate::config::{Config, Controller};
use mcaixi_common::{Action, Reward};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Nodes are expanded only after this many visits.
const MIN_VISITS_BEFORE_EXPANSION: u64 = 1;

/// Samples deeper than this many half-plies finish with a playout.
const MAX_DISTANCE_FROM_ROOT: u32 = 100;

/// UCB priority assigned to actions that have never been tried.
const UNEXPLORED_BIAS: f64 = 1e9;

/// Scale of the random noise that breaks priority ties.
const TIE_BREAK_NOISE: f64 = 1e-4;

/// The search driver: owns the node pool and the per-cycle budgets.
pub struct Search {
    pool: NodePool,
    controller: Controller,
    time_limit: Option<Duration>,
    simulations: Option<u64>,
    bootstrapped_playouts: bool,
    memsearch_mb: usize,
    rng: StdRng,
}

impl Search {
    pub fn new(config: &Config) -> Self {
        Search {
            pool: NodePool::with_memory_budget(config.memsearch_mb * 1024 * 1024),
            controller: config.controller,
            time_limit: config.cycle_length_ms.map(Duration::from_millis),
            simulations: config.mc_simulations,
            bootstrapped_playouts: config.bootstrapped_playouts,
            memsearch_mb: config.memsearch_mb,
            rng: StdRng::from_entropy(),
        }
    }

    /// Determine the best action by simulating many possible future lives
    /// of the agent.
    pub fn best_action(&mut self, hive: &mut Hive) -> Action {
        let started = Instant::now();

        let best = match self.controller {
            Controller::NaiveMc => {
                let time_limit = self
                    .time_limit
                    .expect("validated: controller=mc requires cycle-length-ms");
                naive_monte_carlo(hive.primary_mut(), &mut self.rng, time_limit)
            }
            Controller::Mcts => self.mcts(hive),
            Controller::Random => hive.primary().select_random_action(&mut self.rng),
        };

        info!(elapsed = ?started.elapsed(), "searched for a best action");
        best
    }

    /// Prepare the node pool for a fresh search cycle.
    fn init_mcts(&self) {
        info!(
            memsearch_mb = self.memsearch_mb,
            max_nodes = self.pool.max_nodes(),
            "search pool sized"
        );
        if self.bootstrapped_playouts {
            info!("using bootstrapped playouts");
        }
        self.pool.clear();
    }

    /// Monte-Carlo tree search across all hive agents.
    fn mcts(&mut self, hive: &mut Hive) -> Action {
        self.init_mcts();

        let root = match self
            .pool
            .find_or_create(hive.primary().hash(), NodeKind::Decision)
        {
            Ok(root) => root,
            Err(_) => return hive.primary().select_random_action(&mut self.rng),
        };

        let deadline = self.time_limit.map(|limit| Instant::now() + limit);
        let simulations = self.simulations.unwrap_or(u64::MAX);
        let counter = Mutex::new(0u64);

        {
            let pool = &self.pool;
            let root = &root;
            let counter = &counter;
            thread::scope(|scope| {
                for agent in hive.agents_mut() {
                    scope.spawn(move || {
                        sample_worker(root, agent, pool, counter, simulations, deadline)
                    });
                }
            });
        }

        let samples = *counter.lock().unwrap_or_else(PoisonError::into_inner);
        info!(samples, "mcts decision");

        select_best_action(hive.primary_mut(), &self.pool, &mut self.rng)
    }
}

/// One search worker: repeatedly sample from the root until the simulation
/// or wall-clock budget runs out. Worker-scoped failures (pool exhaustion
/// mid-descent) silently stop this worker; the others proceed.
fn sample_worker(
    root: &Arc<SearchNode>,
    agent: &mut Agent,
    pool: &NodePool,
    counter: &Mutex<u64>,
    simulations: u64,
    deadline: Option<Instant>,
) {
    let mut rng = StdRng::from_entropy();

    loop {
        {
            let mut samples = counter.lock().unwrap_or_else(PoisonError::into_inner);
            if *samples >= simulations {
                break;
            }
            *samples += 1;
        }

        if let Err(err) = sample(root, agent, pool, &mut rng, 0) {
            debug!(%err, "search worker stopping");
            break;
        }

        if deadline.is_some_and(|d| Instant::now() >= d) {
            break;
        }
    }
}

/// Perform one sample run through `node` and its children, returning the
/// accumulated reward. `dfr` is the distance from the root in half-plies.
///
/// The agent is always rolled back before this function returns, including
/// on the error path, so a dying worker leaves its hive agent consistent.
fn sample(
    node: &Arc<SearchNode>,
    agent: &mut Agent,
    pool: &NodePool,
    rng: &mut StdRng,
    dfr: u32,
) -> Result<Reward, SearchError> {
    if u64::from(dfr) == agent.horizon() * 2 {
        return Ok(0.0);
    }

    let undo = ModelUndo::new(agent);

    let reward = match node.kind() {
        NodeKind::Chance => {
            // Dream up a percept and descend into the resulting decision
            // state.
            let percept = agent.gen_percept_and_update(rng);
            let immediate = agent.reward_from_percept(&percept);

            let child = match pool.find_or_create(agent.hash(), NodeKind::Decision) {
                Ok(child) => child,
                Err(err) => {
                    agent.model_revert(&undo);
                    return Err(err);
                }
            };
            let future = sample(&child, agent, pool, rng, dfr + 1);
            agent.model_revert(&undo);
            immediate + future?
        }
        NodeKind::Decision => {
            let guard = node.lock();
            let do_playout = node.visits() < MIN_VISITS_BEFORE_EXPANSION
                || dfr >= MAX_DISTANCE_FROM_ROOT
                || pool.is_full();

            if do_playout {
                drop(guard);
                playout(agent, rng, agent.horizon() - u64::from(dfr) / 2)
            } else {
                let action = select_action(node, agent, pool, rng);
                drop(guard);

                agent.model_update_action(action);
                let child = match pool.find_or_create(agent.hash(), NodeKind::Chance) {
                    Ok(child) => child,
                    Err(err) => {
                        agent.model_revert(&undo);
                        return Err(err);
                    }
                };
                let future = sample(&child, agent, pool, rng, dfr + 1);
                agent.model_revert(&undo);
                future?
            }
        }
    };

    node.record_sample(reward);
    Ok(reward)
}

/// UCB1 action selection at a decision node.
///
/// Sibling statistics are read without holding their locks; the atomics
/// guarantee the values are merely stale, never torn.
fn select_action(node: &SearchNode, agent: &Agent, pool: &NodePool, rng: &mut StdRng) -> Action {
    let explore_bias = agent.horizon() as f64 * agent.max_reward();

    let mut best_action = 0;
    let mut best_priority = f64::NEG_INFINITY;

    for action in 0..agent.num_actions() {
        let child = pool.find(agent.hash_after_action(action));
        let noise = rng.gen::<f64>() * TIE_BREAK_NOISE;

        let priority = match child {
            Some(ref child) if child.visits() > 0 => {
                let parent_visits = node.visits() as f64;
                let child_visits = child.visits() as f64;
                let bias = explore_bias * (2.0 * parent_visits.ln() / child_visits).sqrt();
                child.expectation() + bias + noise
            }
            _ => UNEXPLORED_BIAS + noise,
        };

        if priority > best_priority {
            best_action = action;
            best_priority = priority;
        }
    }

    best_action
}

/// Simulate a path through a hypothetical future of the agent within its
/// own model of the world, returning the accumulated reward.
fn playout(agent: &mut Agent, rng: &mut StdRng, cycles: u64) -> Reward {
    let start_reward = agent.reward();
    let mut undos = Vec::with_capacity(cycles as usize * 2);

    for _ in 0..cycles {
        undos.push(ModelUndo::new(agent));
        let action = if agent.use_self_model() {
            agent.gen_action(rng)
        } else {
            agent.select_random_action(rng)
        };
        agent.model_update_action(action);

        undos.push(ModelUndo::new(agent));
        agent.gen_percept_and_update(rng);
    }

    let accumulated = agent.reward() - start_reward;

    for undo in undos.iter().rev() {
        agent.model_revert(undo);
    }

    accumulated
}

/// Select the action whose chance node accumulated the best expectation.
fn select_best_action(agent: &mut Agent, pool: &NodePool, rng: &mut StdRng) -> Action {
    let mut best_action = agent.select_random_action(rng);
    let mut best_expectation = f64::NEG_INFINITY;

    for action in 0..agent.num_actions() {
        if let Some(node) = pool.find(agent.hash_after_action(action)) {
            let noise = rng.gen::<f64>() * TIE_BREAK_NOISE;
            let expectation = node.expectation() + noise;

            debug!(
                action,
                expectation = node.expectation(),
                visits = node.visits(),
                self_predicted_prob = agent.predicted_action_prob(action),
                "mcts action statistics"
            );

            if expectation > best_expectation {
                best_expectation = expectation;
                best_action = action;
            }
        }
    }

    best_action
}

/// Determine the best action with naive one-ply Monte-Carlo sampling:
/// round-robin over actions until the time budget elapses, then pick the
/// best sample mean.
fn naive_monte_carlo(agent: &mut Agent, rng: &mut StdRng, time_limit: Duration) -> Action {
    let started = Instant::now();
    let undo = ModelUndo::new(agent);
    let start_history = agent.history_size();

    // Sufficient statistics for the sample mean of each action.
    let mut totals = vec![(0.0f64, 0.0f64); agent.num_actions() as usize];
    let mut total_samples = 0u64;

    // Every action always gets at least one estimate.
    loop {
        for action in 0..agent.num_actions() {
            agent.model_update_action(action);

            let percept = agent.gen_percept_and_update(rng);
            let mut reward = agent.reward_from_percept(&percept);
            reward += playout(agent, rng, agent.horizon() - 1);

            totals[action as usize].0 += reward;
            totals[action as usize].1 += 1.0;

            agent.model_revert(&undo);
            debug_assert_eq!(agent.history_size(), start_history);
            total_samples += 1;
        }
        if started.elapsed() >= time_limit {
            break;
        }
    }

    info!(samples = total_samples, "naive monte-carlo decision");

    let mut best_action = 0;
    let mut best_mean = f64::NEG_INFINITY;
    for (action, &(total, count)) in totals.iter().enumerate() {
        let mean = total / count + rng.gen::<f64>() * TIE_BREAK_NOISE;
        debug!(action, mean = total / count, "naive monte-carlo statistics");
        if mean > best_mean {
            best_mean = mean;
            best_action = action as Action;
        }
    }

    best_action
}
