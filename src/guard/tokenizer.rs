//! Compound command-line decomposition.
//!
//! `extract_commands` identifies the set of base commands a raw shell
//! line would invoke, respecting quoting, escaping, chain separators, and
//! subshells. It performs only enough structural parsing to name the
//! executables; it is not a shell interpreter. The result is surfaced for
//! audit and logging, never as the execution gate itself.

use std::collections::BTreeSet;

use tracing::warn;

/// Maximum subshell nesting before decomposition degrades to the coarse
/// fallback. Bounds recursion on adversarial input.
pub const MAX_SUBSHELL_DEPTH: usize = 16;

/// Chain/control separators, longest-match first so `&&` is never split
/// into two `&`.
const SEPARATORS: [&str; 5] = ["&&", "||", ";", "|", "&"];

/// Decomposition of a raw command line into base command names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decomposition {
    /// Deduplicated base commands, lowercased. Order is not significant.
    pub commands: BTreeSet<String>,
    /// True when full decomposition could not run (e.g. subshell nesting
    /// beyond [`MAX_SUBSHELL_DEPTH`]) and the coarse single-command
    /// fallback was used instead.
    pub degraded: bool,
}

struct DepthExceeded;

/// Extract the set of base commands a raw command line would invoke.
///
/// Never panics and never returns an error: if full decomposition cannot
/// run, the result degrades to the coarse base command of the entire raw
/// string, flagged via [`Decomposition::degraded`] and logged for audit.
pub fn extract_commands(raw: &str) -> Decomposition {
    let chars: Vec<char> = raw.chars().collect();
    let mut commands = BTreeSet::new();
    match scan(&chars, 0, &mut commands) {
        Ok(()) => Decomposition {
            commands,
            degraded: false,
        },
        Err(DepthExceeded) => {
            warn!("Command decomposition degraded to coarse extraction: {raw}");
            let mut commands = BTreeSet::new();
            if let Some(base) = coarse_base_command(raw) {
                commands.insert(base);
            }
            Decomposition {
                commands,
                degraded: true,
            }
        }
    }
}

/// Coarse base command of a raw line: its first whitespace-delimited
/// token, lowercased. This is what the execution gate inspects.
pub(crate) fn coarse_base_command(raw: &str) -> Option<String> {
    raw.split_whitespace().next().map(str::to_lowercase)
}

/// Left-to-right scan of one command sequence.
///
/// Tracks the current segment buffer, quote state, and escape state;
/// recurses into balanced parenthesized subshells.
fn scan(input: &[char], depth: usize, out: &mut BTreeSet<String>) -> Result<(), DepthExceeded> {
    if depth > MAX_SUBSHELL_DEPTH {
        return Err(DepthExceeded);
    }

    let mut segment = String::new();
    let mut in_quote = false;
    let mut quote_char = '\0';
    let mut escaped = false;
    let mut i = 0;

    while i < input.len() {
        let ch = input[i];

        if escaped {
            // Escaped character is literal, never a separator or quote
            segment.push(ch);
            escaped = false;
            i += 1;
            continue;
        }
        if ch == '\\' {
            escaped = true;
            i += 1;
            continue;
        }
        if in_quote {
            if ch == quote_char {
                in_quote = false;
            } else {
                segment.push(ch);
            }
            i += 1;
            continue;
        }
        if ch == '"' || ch == '\'' {
            in_quote = true;
            quote_char = ch;
            i += 1;
            continue;
        }
        if ch == '(' {
            // Subshell: recurse on the balanced body, then resume after
            // the closing paren. An unmatched paren runs to end of input.
            let close = matching_paren(input, i);
            scan(&input[i + 1..close], depth + 1, out)?;
            i = close + 1;
            continue;
        }
        if let Some(len) = leading_separator(&input[i..]) {
            flush_segment(&mut segment, out);
            i += len;
            continue;
        }

        segment.push(ch);
        i += 1;
    }

    flush_segment(&mut segment, out);
    Ok(())
}

/// Index of the `)` matching the `(` at `open`, by balance counting.
/// Returns `input.len()` when unmatched.
fn matching_paren(input: &[char], open: usize) -> usize {
    let mut balance = 0usize;
    for (idx, &ch) in input.iter().enumerate().skip(open) {
        match ch {
            '(' => balance += 1,
            ')' => {
                balance = balance.saturating_sub(1);
                if balance == 0 {
                    return idx;
                }
            }
            _ => {}
        }
    }
    input.len()
}

/// Length of the separator starting at the head of `rest`, if any.
fn leading_separator(rest: &[char]) -> Option<usize> {
    SEPARATORS.iter().find_map(|sep| {
        let len = sep.chars().count();
        if rest.len() >= len && sep.chars().zip(rest.iter()).all(|(a, &b)| a == b) {
            Some(len)
        } else {
            None
        }
    })
}

/// Close the current segment, emitting its base command if it has one.
fn flush_segment(segment: &mut String, out: &mut BTreeSet<String>) {
    let closed = std::mem::take(segment);
    if let Some(base) = segment_base_command(&closed) {
        out.insert(base);
    }
}

/// Base command of a single segment.
///
/// Strips leading `KEY=VALUE` environment assignments, then takes the
/// first whitespace token. Tokens beginning with `(` or `$` are not
/// literal command names and yield nothing.
fn segment_base_command(segment: &str) -> Option<String> {
    let mut tokens = segment
        .split_whitespace()
        .skip_while(|token| is_env_assignment(token));
    let first = tokens.next()?;
    if first.starts_with('(') || first.starts_with('$') {
        return None;
    }
    Some(first.to_lowercase())
}

/// Whether a token is a `KEY=VALUE` environment-variable assignment:
/// word characters, `=`, then any non-whitespace value.
fn is_env_assignment(token: &str) -> bool {
    match token.split_once('=') {
        Some((key, value)) => {
            !key.is_empty()
                && !value.is_empty()
                && key.chars().all(|c| c.is_alphanumeric() || c == '_')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commands(raw: &str) -> BTreeSet<String> {
        extract_commands(raw).commands
    }

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_single_command() {
        assert_eq!(commands("ls -la"), set(&["ls"]));
    }

    #[test]
    fn test_chained_commands() {
        assert_eq!(commands("a; b && c"), set(&["a", "b", "c"]));
    }

    #[test]
    fn test_pipe_and_or() {
        assert_eq!(commands("cat f | grep x || echo none"), set(&["cat", "grep", "echo"]));
    }

    #[test]
    fn test_background_ampersand() {
        assert_eq!(commands("sleep 5 & ls"), set(&["sleep", "ls"]));
    }

    #[test]
    fn test_double_ampersand_not_split_as_two() {
        // "&&" must match before "&"
        assert_eq!(commands("make && make install"), set(&["make"]));
    }

    #[test]
    fn test_separator_inside_quotes_ignored() {
        assert_eq!(commands("echo \"a;b\" | grep x"), set(&["echo", "grep"]));
        assert_eq!(commands("echo 'a && b'"), set(&["echo"]));
    }

    #[test]
    fn test_escaped_separator_ignored() {
        assert_eq!(commands("echo a\\;b"), set(&["echo"]));
    }

    #[test]
    fn test_escaped_quote_does_not_toggle() {
        assert_eq!(commands("echo \\\"; ls"), set(&["echo", "ls"]));
    }

    #[test]
    fn test_subshell_unwrapped() {
        assert_eq!(commands("(rm -rf /)"), set(&["rm"]));
    }

    #[test]
    fn test_nested_subshells() {
        assert_eq!(commands("(cd /tmp && (ls; pwd))"), set(&["cd", "ls", "pwd"]));
    }

    #[test]
    fn test_unmatched_paren_runs_to_end() {
        assert_eq!(commands("(ls; pwd"), set(&["ls", "pwd"]));
    }

    #[test]
    fn test_env_assignments_stripped() {
        assert_eq!(commands("FOO=1 BAR=2 ls -la"), set(&["ls"]));
    }

    #[test]
    fn test_segment_of_only_assignments_yields_nothing() {
        assert_eq!(commands("FOO=1; ls"), set(&["ls"]));
    }

    #[test]
    fn test_dollar_token_discarded() {
        assert_eq!(commands("$HOME/script.sh arg"), set(&[]));
        assert_eq!(commands("echo $(date)"), set(&["echo", "date"]));
    }

    #[test]
    fn test_commands_lowercased_and_deduplicated() {
        assert_eq!(commands("LS; ls -la | ls"), set(&["ls"]));
    }

    #[test]
    fn test_empty_input() {
        let result = extract_commands("");
        assert!(result.commands.is_empty());
        assert!(!result.degraded);
    }

    #[test]
    fn test_depth_cap_degrades() {
        let open = "(".repeat(MAX_SUBSHELL_DEPTH + 2);
        let close = ")".repeat(MAX_SUBSHELL_DEPTH + 2);
        let raw = format!("{open}echo hi{close}");
        let result = extract_commands(&raw);
        assert!(result.degraded);
        assert_eq!(result.commands.len(), 1);
    }

    #[test]
    fn test_nesting_within_cap_not_degraded() {
        let open = "(".repeat(MAX_SUBSHELL_DEPTH);
        let close = ")".repeat(MAX_SUBSHELL_DEPTH);
        let raw = format!("{open}echo hi{close}");
        let result = extract_commands(&raw);
        assert!(!result.degraded);
        assert_eq!(result.commands, set(&["echo"]));
    }

    #[test]
    fn test_coarse_base_command() {
        assert_eq!(coarse_base_command("SUDO rm -rf /"), Some("sudo".to_string()));
        assert_eq!(coarse_base_command("   "), None);
    }
}
