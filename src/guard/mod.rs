//! Command gating for agent-driven shell execution.
//!
//! This module decides whether a command line may be executed (block-list
//! gate on the leading command) and decomposes compound command lines
//! into the set of executables they would invoke, for audit visibility.

mod blocklist;
mod gate;
mod tokenizer;

pub use blocklist::{BlockListStore, DEFAULT_BLOCKED_COMMANDS};
pub use gate::CommandGuard;
pub use tokenizer::{extract_commands, Decomposition, MAX_SUBSHELL_DEPTH};
