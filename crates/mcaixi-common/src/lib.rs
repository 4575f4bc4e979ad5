//! Common types shared across the mcaixi crates.
//!
//! This crate provides the foundational vocabulary of the agent:
//! - The binary channel alphabet ([`Symbol`])
//! - Reward signal encodings ([`RewardEncoding`])
//! - Scalar aliases for actions, rewards, ages, and history hashes
//! - The unified error type with stable error codes

pub mod error;
pub mod reward;
pub mod symbol;

pub use error::{Error, ErrorCategory, Result};
pub use reward::RewardEncoding;
pub use symbol::{symbols_to_string, Symbol};

/// An agent action, drawn from `0..num_actions`.
pub type Action = u64;

/// Reward accumulated by an agent.
pub type Reward = f64;

/// Agent age measured in completed interaction cycles.
pub type Age = u64;

/// 64-bit rolling hash over the entire interaction history.
pub type HistoryHash = u64;
