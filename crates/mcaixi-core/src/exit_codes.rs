//! Exit codes for the mcaixi binary.
//!
//! These are a stable contract for the environment driver:
//! - 0-9: normal termination outcomes
//! - 10-19: user/configuration errors
//! - 20-29: runtime errors

/// Exit codes for mcaixi sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Clean shutdown via `:quit` or end of input.
    Clean = 0,

    /// `:quit` with a configured agent save.
    SavedOnQuit = 1,

    /// Invalid CLI options or option combinations.
    ArgsError = 10,

    /// Unhandled runtime error (malformed percept, I/O failure).
    RuntimeError = 20,
}
