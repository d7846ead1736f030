//! Path validation inside the allowed-directory sandbox.
//!
//! `PathSandbox::validate` is the single entrypoint every file tool must
//! pass a caller-supplied path through before touching the host. Denial
//! and timeout are ordinary return values, never errors, so the tool
//! dispatch layer can surface them as structured responses.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use tokio::task;
use tokio::time;
use tracing::{debug, warn};

use super::allowlist::{contained_in, lexical_normalize, AllowListStore};

/// Default time budget for a single validation.
pub const DEFAULT_VALIDATION_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Result of validating a requested path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// The path is inside an allowed directory; carries the canonical
    /// (symlink-resolved) form for existing paths, or the normalized
    /// absolute form for paths that do not exist yet.
    Resolved(PathBuf),
    /// The requested path falls outside every allowed directory.
    AccessDenied(PathBuf),
    /// Resolution did not complete within the time budget.
    TimedOut {
        requested: PathBuf,
        budget: Duration,
    },
}

/// Validates caller-supplied paths against the allow list.
///
/// Owns its [`AllowListStore`]; the constructing orchestrator builds the
/// store and moves it in. All mutation goes through [`PathSandbox::reload`].
pub struct PathSandbox {
    store: AllowListStore,
    budget: Duration,
    #[cfg(test)]
    artificial_delay: Duration,
}

impl PathSandbox {
    /// Create a sandbox with the default 10 s validation budget.
    pub fn new(store: AllowListStore) -> Self {
        Self::with_budget(store, DEFAULT_VALIDATION_TIMEOUT)
    }

    /// Create a sandbox with an explicit validation budget.
    pub fn with_budget(store: AllowListStore, budget: Duration) -> Self {
        Self {
            store,
            budget,
            #[cfg(test)]
            artificial_delay: Duration::ZERO,
        }
    }

    #[cfg(test)]
    fn with_artificial_delay(mut self, delay: Duration) -> Self {
        self.artificial_delay = delay;
        self
    }

    /// Re-derive the allow list from its injected sources.
    pub fn reload(&mut self) -> Result<()> {
        self.store.reload()
    }

    /// The directories currently allowed.
    pub fn allowed_dirs(&self) -> &[PathBuf] {
        self.store.dirs()
    }

    /// Validate a requested path against the allowed directories.
    ///
    /// Home markers (`~`, `~/...`) are expanded, relative paths resolve
    /// against the current working directory, and existing paths are
    /// canonicalized with the containment check re-run against the real
    /// target so a symlink cannot smuggle the caller outside the sandbox.
    /// Paths that do not exist yet validate against their normalized
    /// absolute form so create-new-file flows can be pre-checked.
    ///
    /// The filesystem work runs on a blocking thread raced against the
    /// budget; on expiry the call is abandoned, not cancelled. An
    /// abandoned resolution may still complete later with no observer —
    /// it touches no shared state, so this is only a resource caveat.
    pub async fn validate(&self, requested: &str) -> ValidationOutcome {
        let requested_owned = requested.to_string();
        let allowed = self.store.dirs().to_vec();
        #[cfg(test)]
        let delay = self.artificial_delay;

        let resolution = task::spawn_blocking(move || {
            #[cfg(test)]
            std::thread::sleep(delay);
            resolve(&requested_owned, &allowed)
        });

        match time::timeout(self.budget, resolution).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(join_error)) => {
                // A panicked resolution task must not widen access
                warn!("Path resolution task failed for {requested}: {join_error}");
                ValidationOutcome::AccessDenied(PathBuf::from(requested))
            }
            Err(_elapsed) => {
                debug!(
                    "Path validation timed out after {:?}: {requested}",
                    self.budget
                );
                ValidationOutcome::TimedOut {
                    requested: PathBuf::from(requested),
                    budget: self.budget,
                }
            }
        }
    }
}

/// Expand a leading `~` / `~/...` to the user's home directory.
///
/// Returned unchanged when no home directory can be resolved or the
/// marker is not at the start of the path.
pub(crate) fn expand_home(raw: &str) -> PathBuf {
    if raw == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = raw.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(raw)
}

/// Synchronous resolution pipeline run on the blocking pool.
fn resolve(requested: &str, allowed: &[PathBuf]) -> ValidationOutcome {
    let expanded = expand_home(requested);
    let absolute = if expanded.is_absolute() {
        lexical_normalize(&expanded)
    } else {
        match std::env::current_dir() {
            Ok(cwd) => lexical_normalize(&cwd.join(&expanded)),
            Err(e) => {
                warn!("Cannot resolve current working directory: {e}");
                return ValidationOutcome::AccessDenied(PathBuf::from(requested));
            }
        }
    };

    if !contained_in(&absolute, allowed) {
        return ValidationOutcome::AccessDenied(PathBuf::from(requested));
    }

    match std::fs::canonicalize(&absolute) {
        Ok(real) => {
            // The symlink target must itself be inside the sandbox
            if contained_in(&real, allowed) {
                ValidationOutcome::Resolved(real)
            } else {
                debug!(
                    "Symlink target {} escapes the allowed directories",
                    real.display()
                );
                ValidationOutcome::AccessDenied(PathBuf::from(requested))
            }
        }
        Err(_) => {
            // Target does not exist yet: probe for the nearest existing
            // ancestor (create-new-file flows), then report the original
            // absolute form regardless of what the walk found
            let mut ancestor = absolute.clone();
            loop {
                let Some(parent) = ancestor.parent().map(Path::to_path_buf) else {
                    break;
                };
                if parent == ancestor {
                    break;
                }
                if parent.exists() {
                    debug!(
                        "Nearest existing ancestor of {} is {}",
                        absolute.display(),
                        parent.display()
                    );
                    break;
                }
                ancestor = parent;
            }
            ValidationOutcome::Resolved(absolute)
        }
    }
}
