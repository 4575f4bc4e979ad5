//! MC-AIXI(FAC-CTW) agent core.
//!
//! This library implements a prototype of the MC-AIXI(FAC-CTW)
//! reinforcement-learning agent:
//! - `model`: the Factored Context Tree Weighting environment predictor
//! - `agent`: the agent facade (channel coding, history hash, reversible
//!   model updates) and the hive of per-thread agent copies
//! - `search`: the multi-threaded Monte-Carlo tree search planner
//! - `protocol`: the environment channel loop and colon commands
//! - `config`: CLI surface and option validation
//!
//! The binary entry point is in `main.rs`.

pub mod agent;
pub mod config;
pub mod exit_codes;
pub mod model;
pub mod protocol;
pub mod search;
