//! Blocked-command management.
//!
//! This module maintains the set of command names that must not be
//! executed. The set is seeded with a fixed default list at construction
//! and mutated only through `block`/`unblock`; edits live for the process
//! lifetime and reset to the defaults on restart by design.

use std::collections::HashSet;

/// Commands blocked by default at process start.
pub const DEFAULT_BLOCKED_COMMANDS: &[&str] = &[
    "format", "mount", "umount", "mkfs", "fdisk", "dd", "sudo", "su", "passwd", "adduser",
    "useradd", "usermod", "groupadd",
];

/// Mutable set of blocked base-command names, unique by lowercase name.
pub struct BlockListStore {
    blocked: HashSet<String>,
}

impl Default for BlockListStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockListStore {
    /// Create a store seeded with [`DEFAULT_BLOCKED_COMMANDS`].
    pub fn new() -> Self {
        Self {
            blocked: DEFAULT_BLOCKED_COMMANDS
                .iter()
                .map(|name| name.to_string())
                .collect(),
        }
    }

    /// Add a command name to the block list.
    ///
    /// Returns `true` if the name was newly added, `false` if it was
    /// already blocked (no state change).
    pub fn block(&mut self, name: &str) -> bool {
        self.blocked.insert(normalize(name))
    }

    /// Remove a command name from the block list.
    ///
    /// Returns `true` if the name was present, `false` otherwise.
    pub fn unblock(&mut self, name: &str) -> bool {
        self.blocked.remove(&normalize(name))
    }

    /// Whether a command name is blocked.
    pub fn is_blocked(&self, name: &str) -> bool {
        self.blocked.contains(&normalize(name))
    }

    /// The block list as a lexicographically sorted sequence.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.blocked.iter().cloned().collect();
        names.sort();
        names
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}
