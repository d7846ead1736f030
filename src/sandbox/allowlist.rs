//! Allowed-directory management.
//!
//! This module maintains the ordered set of directories that filesystem
//! tools are permitted to operate under. The set is derived from injected
//! sources with a fixed precedence and always contains the process's
//! current working directory.

use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR};

use anyhow::{Context, Result};
use tracing::debug;

use super::paths::expand_home;

/// Configuration sources for the allow list, in precedence order.
///
/// `explicit` (e.g. repeated `--allow` flags) wins over `config_file`
/// (the `allowedDirectories` array); when both are empty the compiled-in
/// default (the user's home directory) applies. The process's current
/// working directory is appended afterward regardless of source.
#[derive(Debug, Clone, Default)]
pub struct AllowSources {
    pub explicit: Vec<PathBuf>,
    pub config_file: Vec<PathBuf>,
}

/// Ordered set of allowed directories.
///
/// Membership comparisons are path-normalized and case-insensitive. The
/// case folding is a portability caveat inherited from the tool protocol,
/// not a cross-platform guarantee.
pub struct AllowListStore {
    sources: AllowSources,
    dirs: Vec<PathBuf>,
}

impl AllowListStore {
    /// Build the store from its sources and derive the initial set.
    pub fn new(sources: AllowSources) -> Result<Self> {
        let mut store = Self {
            sources,
            dirs: Vec::new(),
        };
        store.reload()?;
        Ok(store)
    }

    /// Re-derive the allowed set from the injected sources.
    ///
    /// This is a full replacement, not a merge: the highest-precedence
    /// non-empty source wins, then the current working directory is
    /// appended if absent. Callers may invoke this at any time to pick up
    /// reconfiguration without a restart.
    pub fn reload(&mut self) -> Result<()> {
        let source: Vec<PathBuf> = if !self.sources.explicit.is_empty() {
            self.sources.explicit.clone()
        } else if !self.sources.config_file.is_empty() {
            self.sources.config_file.clone()
        } else {
            default_dirs()
        };

        let cwd = std::env::current_dir()
            .context("Failed to resolve current working directory for the allow list")?;

        let mut dirs: Vec<PathBuf> = Vec::new();
        let mut seen: Vec<String> = Vec::new();
        for entry in source.iter().chain(std::iter::once(&cwd)) {
            let absolute = absolutize(entry, &cwd);
            let key = compare_key(&absolute);
            if !seen.contains(&key) {
                seen.push(key);
                dirs.push(absolute);
            }
        }

        debug!("Allow list reloaded with {} directories", dirs.len());
        self.dirs = dirs;
        Ok(())
    }

    /// Replace the injected sources and re-derive the set.
    pub fn update_sources(&mut self, sources: AllowSources) -> Result<()> {
        self.sources = sources;
        self.reload()
    }

    /// The current allowed directories, in precedence order.
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Whether `candidate` lies inside (or equals) an allowed directory.
    pub fn contains(&self, candidate: &Path) -> bool {
        contained_in(candidate, &self.dirs)
    }
}

/// Compiled-in default allow list: the user's home directory.
fn default_dirs() -> Vec<PathBuf> {
    dirs::home_dir().into_iter().collect()
}

/// Expand a leading `~` and resolve against `cwd` if relative.
fn absolutize(entry: &Path, cwd: &Path) -> PathBuf {
    let expanded = expand_home(&entry.to_string_lossy());
    if expanded.is_absolute() {
        lexical_normalize(&expanded)
    } else {
        lexical_normalize(&cwd.join(expanded))
    }
}

/// Check containment of `candidate` against a set of allowed directories.
///
/// Accepts an exact match or a `allowed + separator` prefix; comparisons
/// use the normalized, case-folded form of both sides.
pub(crate) fn contained_in(candidate: &Path, allowed: &[PathBuf]) -> bool {
    let key = compare_key(candidate);
    allowed.iter().any(|dir| {
        let dir_key = compare_key(dir);
        if key == dir_key {
            return true;
        }
        if dir_key.ends_with(MAIN_SEPARATOR) {
            // Filesystem root: every absolute path is a child
            key.starts_with(&dir_key)
        } else {
            key.starts_with(&format!("{dir_key}{MAIN_SEPARATOR}"))
        }
    })
}

/// Normalized, case-folded comparison key for a path.
pub(crate) fn compare_key(path: &Path) -> String {
    lexical_normalize(path).to_string_lossy().to_lowercase()
}

/// Purely lexical normalization: drops `.` components and resolves `..`
/// against the preceding component, without touching the filesystem.
pub(crate) fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => out.push(prefix.as_os_str()),
            Component::RootDir => out.push(MAIN_SEPARATOR.to_string()),
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(part) => out.push(part),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(explicit: &[&str], config: &[&str]) -> AllowListStore {
        let sources = AllowSources {
            explicit: explicit.iter().map(PathBuf::from).collect(),
            config_file: config.iter().map(PathBuf::from).collect(),
        };
        match AllowListStore::new(sources) {
            Ok(store) => store,
            Err(e) => panic!("store construction failed: {e}"),
        }
    }

    #[test]
    fn test_explicit_beats_config() {
        let store = store_with(&["/srv/explicit"], &["/srv/config"]);
        assert!(store.contains(Path::new("/srv/explicit/file.txt")));
        assert!(!store.contains(Path::new("/srv/config/file.txt")));
    }

    #[test]
    fn test_config_used_when_no_explicit() {
        let store = store_with(&[], &["/srv/config"]);
        assert!(store.contains(Path::new("/srv/config/file.txt")));
    }

    #[test]
    fn test_cwd_always_present() {
        let store = store_with(&["/srv/explicit"], &[]);
        let cwd = match std::env::current_dir() {
            Ok(cwd) => cwd,
            Err(e) => panic!("no cwd: {e}"),
        };
        assert!(store.contains(&cwd));
        assert!(store.contains(&cwd.join("subdir/file.txt")));
    }

    #[test]
    fn test_exact_match_allowed() {
        let store = store_with(&["/srv/data"], &[]);
        assert!(store.contains(Path::new("/srv/data")));
    }

    #[test]
    fn test_sibling_prefix_rejected() {
        // "/srv/data-other" shares a string prefix with "/srv/data" but is
        // not inside it
        let store = store_with(&["/srv/data"], &[]);
        assert!(!store.contains(Path::new("/srv/data-other/file.txt")));
    }

    #[test]
    fn test_case_insensitive_comparison() {
        let store = store_with(&["/srv/Data"], &[]);
        assert!(store.contains(Path::new("/srv/data/File.TXT")));
    }

    #[test]
    fn test_lexical_normalize_drops_dot_and_dotdot() {
        assert_eq!(
            lexical_normalize(Path::new("/a/./b/../c")),
            PathBuf::from("/a/c")
        );
        assert_eq!(lexical_normalize(Path::new("/a//b/")), PathBuf::from("/a/b"));
    }

    #[test]
    fn test_traversal_does_not_escape() {
        let store = store_with(&["/srv/data"], &[]);
        assert!(!store.contains(Path::new("/srv/data/../outside")));
    }

    #[test]
    fn test_reload_replaces_set() {
        let mut store = store_with(&["/srv/old"], &[]);
        assert!(store.contains(Path::new("/srv/old/x")));

        let replacement = AllowSources {
            explicit: vec![PathBuf::from("/srv/new")],
            config_file: Vec::new(),
        };
        if let Err(e) = store.update_sources(replacement) {
            panic!("reload failed: {e}");
        }
        assert!(store.contains(Path::new("/srv/new/x")));
        assert!(!store.contains(Path::new("/srv/old/x")));
    }

    #[test]
    fn test_duplicate_entries_deduplicated() {
        let store = store_with(&["/srv/data", "/srv/data/", "/srv/DATA"], &[]);
        let matching = store
            .dirs()
            .iter()
            .filter(|d| compare_key(d) == "/srv/data")
            .count();
        assert_eq!(matching, 1);
    }
}
