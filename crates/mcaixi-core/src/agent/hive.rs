//! A group of identical agents sharing one conceptual world model.
//!
//! The search phase runs one worker thread per agent; between cycles every
//! model update is broadcast to all members so the copies never diverge.

use super::Agent;
use crate::config::Config;
use mcaixi_common::{Action, Result, Symbol};
use std::path::Path;

/// N identical agents, one per search worker thread.
pub struct Hive {
    agents: Vec<Agent>,
}

impl Hive {
    /// Construct a hive of `n` fresh agents.
    pub fn new(n: usize, config: &Config) -> Self {
        Hive {
            agents: (0..n).map(|id| Agent::new(config, id)).collect(),
        }
    }

    /// Construct a hive of `n` identical agents defined in a file: the
    /// first is loaded from disk, the rest are deep copies.
    pub fn from_file(n: usize, path: &Path, binary: bool) -> Result<Self> {
        let primary = Agent::load(path, binary)?;
        let mut agents = Vec::with_capacity(n);
        for id in 1..n {
            agents.push(primary.clone_with_id(id));
        }
        agents.insert(0, primary);
        Ok(Hive { agents })
    }

    /// How many agents are in the hive.
    pub fn count(&self) -> usize {
        self.agents.len()
    }

    /// The primary agent (id 0).
    pub fn primary(&self) -> &Agent {
        &self.agents[0]
    }

    pub fn primary_mut(&mut self) -> &mut Agent {
        &mut self.agents[0]
    }

    /// Agent accessor; `None` if no such agent exists.
    pub fn agent(&self, idx: usize) -> Option<&Agent> {
        self.agents.get(idx)
    }

    /// All agents, for handing one to each worker thread.
    pub fn agents_mut(&mut self) -> &mut [Agent] {
        &mut self.agents
    }

    /// Broadcast a percept update to every agent.
    pub fn model_update_percept(&mut self, percept: &[Symbol]) {
        for agent in &mut self.agents {
            agent.model_update_percept(percept);
        }
    }

    /// Broadcast an action update to every agent.
    pub fn model_update_action(&mut self, action: Action) {
        for agent in &mut self.agents {
            agent.model_update_action(action);
        }
    }

    /// Reset every agent's model and history.
    pub fn reset(&mut self) {
        for agent in &mut self.agents {
            agent.reset();
        }
    }
}
