//! Command execution gating against the block list.

use std::collections::BTreeSet;

use tracing::info;

use super::blocklist::BlockListStore;
use super::tokenizer::{coarse_base_command, extract_commands, Decomposition};

/// Gates command execution for the command tool.
///
/// Owns its [`BlockListStore`]; the constructing orchestrator builds the
/// store and moves it in. The executing layer must call
/// [`CommandGuard::is_allowed`] before spawning any process.
pub struct CommandGuard {
    blocklist: BlockListStore,
}

impl CommandGuard {
    pub fn new(blocklist: BlockListStore) -> Self {
        Self { blocklist }
    }

    /// Whether a raw command line may be executed.
    ///
    /// The gate is deliberately coarse: it inspects only the leading
    /// command of the line as submitted (first whitespace token,
    /// lowercased) against the block list. It does not consult the full
    /// decomposition, so a blocked command behind a separator
    /// (`ls; sudo ...`) passes the gate while still being reported by
    /// [`CommandGuard::decompose`]. This asymmetry is part of the
    /// contract; do not unify the two checks here.
    pub fn is_allowed(&self, raw: &str) -> bool {
        match coarse_base_command(raw) {
            Some(base) => !self.blocklist.is_blocked(&base),
            // No leading token: nothing to match against the block list.
            // The executing layer rejects empty commands before spawning.
            None => true,
        }
    }

    /// Decompose a raw command line into the base commands it would
    /// invoke. Audit/visibility only — never a substitute for
    /// [`CommandGuard::is_allowed`].
    pub fn decompose(&self, raw: &str) -> Decomposition {
        let decomposition = extract_commands(raw);
        if decomposition.degraded {
            info!("Degraded decomposition surfaced for audit: {raw}");
        }
        decomposition
    }

    /// Base commands of a raw line that are currently blocked. Audit
    /// companion to [`CommandGuard::decompose`].
    pub fn blocked_in(&self, raw: &str) -> BTreeSet<String> {
        self.decompose(raw)
            .commands
            .into_iter()
            .filter(|name| self.blocklist.is_blocked(name))
            .collect()
    }

    /// Add a command name to the block list; `false` if already blocked.
    pub fn block(&mut self, name: &str) -> bool {
        self.blocklist.block(name)
    }

    /// Remove a command name from the block list; `false` if not blocked.
    pub fn unblock(&mut self, name: &str) -> bool {
        self.blocklist.unblock(name)
    }

    /// The block list, lexicographically sorted.
    pub fn blocked(&self) -> Vec<String> {
        self.blocklist.list()
    }
}

impl Default for CommandGuard {
    fn default() -> Self {
        Self::new(BlockListStore::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocked_leading_command_denied() {
        let guard = CommandGuard::default();
        assert!(!guard.is_allowed("sudo rm -rf /"));
        assert!(!guard.is_allowed("SUDO rm -rf /"));
        assert!(!guard.is_allowed("dd if=/dev/zero of=/dev/sda"));
    }

    #[test]
    fn test_unblocked_command_allowed() {
        let guard = CommandGuard::default();
        assert!(guard.is_allowed("ls -la"));
        assert!(guard.is_allowed("echo hello"));
    }

    #[test]
    fn test_gate_inspects_only_leading_token() {
        // The gate is coarse by contract: a blocked command behind a
        // separator passes, while decomposition still reports it.
        let guard = CommandGuard::default();
        assert!(guard.is_allowed("ls; sudo rm -rf /"));
        assert!(guard.decompose("ls; sudo rm -rf /").commands.contains("sudo"));
        assert_eq!(
            guard.blocked_in("ls; sudo rm -rf /"),
            ["sudo".to_string()].into_iter().collect()
        );
    }

    #[test]
    fn test_block_and_unblock_cycle() {
        let mut guard = CommandGuard::default();
        assert!(guard.is_allowed("curl http://x"));

        assert!(guard.block("curl"));
        assert!(!guard.is_allowed("curl http://x"));
        assert!(!guard.block("curl"));

        assert!(guard.unblock("curl"));
        assert!(guard.is_allowed("curl http://x"));
        assert!(!guard.unblock("curl"));
    }

    #[test]
    fn test_empty_command_line_allowed() {
        let guard = CommandGuard::default();
        assert!(guard.is_allowed(""));
        assert!(guard.is_allowed("   "));
    }

    #[test]
    fn test_blocked_listing_reflects_mutations() {
        let mut guard = CommandGuard::default();
        guard.block("curl");
        assert!(guard.blocked().contains(&"curl".to_string()));
        guard.unblock("curl");
        assert!(!guard.blocked().contains(&"curl".to_string()));
    }
}
