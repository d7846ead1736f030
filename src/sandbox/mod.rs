//! Filesystem sandboxing for agent-driven file tools.
//!
//! This module confines every path a tool may touch to an
//! administrator-configured set of allowed directories. The allow list
//! is reloadable at runtime; validation resolves symlinks and tolerates
//! not-yet-created paths, all under a hard time budget.

mod allowlist;
mod paths;

pub use allowlist::{AllowListStore, AllowSources};
pub use paths::{PathSandbox, ValidationOutcome, DEFAULT_VALIDATION_TIMEOUT};
