//! CLI surface and validated runtime configuration.
//!
//! Options are parsed by `clap` into [`Cli`], then converted into a plain
//! [`Config`] value that is threaded explicitly through the program. All
//! option-combination rules are checked in [`Config::validate`] before the
//! interaction loop starts.

use clap::Parser;
use mcaixi_common::RewardEncoding;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Control algorithm used to pick actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Controller {
    /// Monte-Carlo tree search (UCT).
    Mcts,
    /// Naive one-ply Monte-Carlo sampling.
    NaiveMc,
    /// Uniformly random actions.
    Random,
}

impl FromStr for Controller {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mcts" => Ok(Controller::Mcts),
            "mc" => Ok(Controller::NaiveMc),
            "random" => Ok(Controller::Random),
            other => Err(format!("invalid controller: {other}")),
        }
    }
}

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("incompatible options: {0}")]
    Incompatible(String),
}

impl ConfigError {
    fn invalid(field: &str, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// An approximate universal artificial intelligence for tree based
/// environments.
///
/// The environment communicates percepts to the agent over stdin; the agent
/// responds with actions over stdout. All channels are binary.
#[derive(Debug, Parser)]
#[command(name = "mcaixi", version, about, long_about = None)]
pub struct Cli {
    /// Maximum depth of the context tree used for prediction
    #[arg(long, default_value_t = 3)]
    pub ct_depth: usize,

    /// How many bits are used to encode the reward signal
    #[arg(long, default_value_t = 1)]
    pub reward_bits: u32,

    /// How many bits are used to encode the observation signal
    #[arg(long, default_value_t = 1)]
    pub observation_bits: u32,

    /// Milliseconds after receiving a percept to choose an action
    #[arg(long)]
    pub cycle_length_ms: Option<u64>,

    /// The number of percept/action pairs to look forward
    #[arg(long, default_value_t = 16)]
    pub agent_horizon: u64,

    /// The number of distinct actions the agent can do
    #[arg(long, default_value_t = 4)]
    pub agent_actions: u64,

    /// Load a pre-existing agent from a file
    #[arg(long)]
    pub agent_load: Option<PathBuf>,

    /// Save the agent to file upon exit
    #[arg(long)]
    pub agent_save: Option<PathBuf>,

    /// How the agent interprets the reward encoding (bitcount/base2)
    #[arg(long, default_value = "base2")]
    pub reward_encoding: String,

    /// Control algorithm to use: (mcts/mc/random)
    #[arg(long, default_value = "mcts")]
    pub controller: String,

    /// Number of search threads to use
    #[arg(long, default_value_t = 1)]
    pub threads: usize,

    /// Probability of playing a random move
    #[arg(long)]
    pub exploration: Option<f64>,

    /// Geometric decay of the exploration rate, within [0, 1]
    #[arg(long, default_value_t = 1.0)]
    pub explore_decay: f64,

    /// Use a self-improving playout policy
    #[arg(long)]
    pub bootstrapped_playouts: bool,

    /// How many agent/environment cycles before the agent needs to close
    #[arg(long)]
    pub terminate_age: Option<u64>,

    /// Use native (faster but non-portable) binary file i/o
    #[arg(long)]
    pub binary_io: bool,

    /// Maximum amount of memory used by the search tree in megabytes
    #[arg(long, default_value_t = 32)]
    pub memsearch: usize,

    /// Number of MC simulations per cycle
    #[arg(long)]
    pub mc_simulations: Option<u64>,
}

/// Validated runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub ct_depth: usize,
    pub reward_bits: u32,
    pub observation_bits: u32,
    pub cycle_length_ms: Option<u64>,
    pub horizon: u64,
    pub num_actions: u64,
    pub agent_load: Option<PathBuf>,
    pub agent_save: Option<PathBuf>,
    pub reward_encoding: RewardEncoding,
    pub controller: Controller,
    pub threads: usize,
    pub exploration: Option<f64>,
    pub explore_decay: f64,
    pub bootstrapped_playouts: bool,
    pub terminate_age: Option<u64>,
    pub binary_io: bool,
    pub memsearch_mb: usize,
    pub mc_simulations: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            ct_depth: 3,
            reward_bits: 1,
            observation_bits: 1,
            cycle_length_ms: None,
            horizon: 16,
            num_actions: 4,
            agent_load: None,
            agent_save: None,
            reward_encoding: RewardEncoding::Base2,
            controller: Controller::Mcts,
            threads: 1,
            exploration: None,
            explore_decay: 1.0,
            bootstrapped_playouts: false,
            terminate_age: None,
            binary_io: false,
            memsearch_mb: 32,
            mc_simulations: None,
        }
    }
}

impl Config {
    /// Build and validate a configuration from parsed CLI options.
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        let reward_encoding = cli
            .reward_encoding
            .parse::<RewardEncoding>()
            .map_err(|e| ConfigError::invalid("reward-encoding", e))?;
        let controller = cli
            .controller
            .parse::<Controller>()
            .map_err(|e| ConfigError::invalid("controller", e))?;

        let config = Config {
            ct_depth: cli.ct_depth,
            reward_bits: cli.reward_bits,
            observation_bits: cli.observation_bits,
            cycle_length_ms: cli.cycle_length_ms,
            horizon: cli.agent_horizon,
            num_actions: cli.agent_actions,
            agent_load: cli.agent_load,
            agent_save: cli.agent_save,
            reward_encoding,
            controller,
            threads: cli.threads,
            exploration: cli.exploration,
            explore_decay: cli.explore_decay,
            bootstrapped_playouts: cli.bootstrapped_playouts,
            terminate_age: cli.terminate_age,
            binary_io: cli.binary_io,
            memsearch_mb: cli.memsearch,
            mc_simulations: cli.mc_simulations,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check every option-combination rule.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threads < 1 {
            return Err(ConfigError::invalid("threads", "must be > 0"));
        }
        if self.threads > 32 {
            return Err(ConfigError::invalid("threads", "cannot use more than 32 threads"));
        }
        if self.threads > 1 && self.controller != Controller::Mcts {
            return Err(ConfigError::Incompatible(
                "using more than 1 thread requires controller=mcts".into(),
            ));
        }

        if self.num_actions < 2 {
            return Err(ConfigError::invalid(
                "agent-actions",
                "the number of distinct actions must be at least 2",
            ));
        }
        if self.horizon < 1 {
            return Err(ConfigError::invalid("agent-horizon", "must be at least one"));
        }

        if self.reward_bits < 1 {
            return Err(ConfigError::invalid("reward-bits", "must be positive"));
        }
        if self.reward_bits > 32 {
            return Err(ConfigError::invalid("reward-bits", "must be 32 or less"));
        }
        if self.observation_bits < 1 {
            return Err(ConfigError::invalid("observation-bits", "must be positive"));
        }

        if let Some(x) = self.exploration {
            if self.controller == Controller::Random {
                return Err(ConfigError::Incompatible(
                    "exploration and controller=random options are incompatible".into(),
                ));
            }
            if !(0.0..=1.0).contains(&x) {
                return Err(ConfigError::invalid("exploration", "must lie within [0, 1]"));
            }
        }
        if !(0.0..=1.0).contains(&self.explore_decay) {
            return Err(ConfigError::invalid("explore-decay", "must lie within [0, 1]"));
        }

        if let Some(sims) = self.mc_simulations {
            if sims == 0 {
                return Err(ConfigError::invalid("mc-simulations", "must be > 0"));
            }
            if self.cycle_length_ms.is_some() {
                return Err(ConfigError::Incompatible(
                    "mc-simulations and cycle-length-ms options are incompatible".into(),
                ));
            }
        }

        match self.controller {
            Controller::Mcts => {
                if self.mc_simulations.is_none() && self.cycle_length_ms.is_none() {
                    return Err(ConfigError::Incompatible(
                        "either mc-simulations or cycle-length-ms must be specified".into(),
                    ));
                }
            }
            Controller::NaiveMc => {
                if self.cycle_length_ms.is_none() {
                    return Err(ConfigError::Incompatible(
                        "controller=mc requires cycle-length-ms".into(),
                    ));
                }
            }
            Controller::Random => {}
        }

        Ok(())
    }
}
