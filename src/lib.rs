//! Toolgate - security gating for agent-exposed filesystem and shell tools
//!
//! This library provides the two policy engines every tool call must pass
//! through before touching the host:
//! - [`PathSandbox`] confines filesystem tool paths to an
//!   administrator-configured set of allowed directories, under a hard
//!   time budget
//! - [`CommandGuard`] gates shell execution against a block list and
//!   decomposes compound command lines for audit
//!
//! Denials, timeouts, and degraded parses are ordinary return values, so
//! the tool dispatch layer can turn them into protocol responses instead
//! of catching faults.
//!
//! # Example
//!
//! ```no_run
//! use toolgate::{AllowListStore, AllowSources, BlockListStore, CommandGuard, PathSandbox, ValidationOutcome};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = AllowListStore::new(AllowSources {
//!         explicit: vec!["/srv/projects".into()],
//!         config_file: vec![],
//!     })?;
//!     let sandbox = PathSandbox::new(store);
//!
//!     match sandbox.validate("/srv/projects/notes.txt").await {
//!         ValidationOutcome::Resolved(path) => println!("ok: {}", path.display()),
//!         ValidationOutcome::AccessDenied(path) => println!("denied: {}", path.display()),
//!         ValidationOutcome::TimedOut { requested, budget } => {
//!             println!("timed out after {budget:?}: {}", requested.display())
//!         }
//!     }
//!
//!     let guard = CommandGuard::new(BlockListStore::new());
//!     assert!(!guard.is_allowed("sudo rm -rf /"));
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod guard;
pub mod sandbox;
pub mod utils;

// Re-export commonly used types
pub use config::PolicyConfig;
pub use guard::{BlockListStore, CommandGuard, Decomposition};
pub use sandbox::{AllowListStore, AllowSources, PathSandbox, ValidationOutcome};
