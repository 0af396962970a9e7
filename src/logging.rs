use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[allow(dead_code)]
pub struct LogGuard(tracing_appender::non_blocking::WorkerGuard);

/// Initialize debug logging.
///
/// Opt-in via `FIN_SNAP_DEBUG=1`; logs go to `fin-snap-debug.log` in the
/// storage directory. Never writes to stdout — the terminal belongs to the
/// TUI. Returns `None` when debug logging is disabled.
pub fn init(storage_dir: Option<&Path>) -> Result<Option<LogGuard>> {
    let enabled = std::env::var("FIN_SNAP_DEBUG")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if !enabled {
        return Ok(None);
    }

    let log_path = resolve_log_path(storage_dir)?;
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;

    let (writer, guard) = tracing_appender::non_blocking(file);

    // Default: debug our crate, warn for everything else.
    let filter =
        EnvFilter::try_new("fin_snap=debug,warn").unwrap_or_else(|_| EnvFilter::new("debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(true)
        .with_writer(writer)
        .try_init()
        .ok(); // If already initialized (e.g., in tests), don't crash.

    tracing::info!(log_file = %log_path.display(), "debug logging enabled");

    Ok(Some(LogGuard(guard)))
}

fn resolve_log_path(storage_dir: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = storage_dir {
        return Ok(dir.join("fin-snap-debug.log"));
    }
    let dir = dirs::config_dir()
        .context("Failed to get config directory")?
        .join("fin-snap");
    Ok(dir.join("fin-snap-debug.log"))
}

/// Best-effort redaction for API key shapes (`sk-…` and `AIza…`) before
/// error bodies reach the log file.
pub fn redact_secrets(input: &str) -> String {
    let redacted = redact_prefix(input, "sk-", "sk-***REDACTED***", 8);
    redact_prefix(&redacted, "AIza", "AIza***REDACTED***", 8)
}

fn redact_prefix(input: &str, prefix: &str, replacement: &str, min_tail: usize) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut last = 0usize;
    let mut i = 0usize;

    while i < input.len() {
        if input[i..].starts_with(prefix) && i + prefix.len() < input.len() {
            let mut j = i + prefix.len();
            while j < input.len() {
                match bytes[j] {
                    b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' => j += 1,
                    _ => break,
                }
            }

            // Require a minimum length to reduce false positives.
            if j.saturating_sub(i + prefix.len()) >= min_tail {
                out.push_str(&input[last..i]);
                out.push_str(replacement);
                last = j;
                i = j;
                continue;
            }
        }

        let ch = input[i..].chars().next().unwrap();
        i += ch.len_utf8();
    }

    out.push_str(&input[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_openai_style_keys() {
        let input = "error: key sk-abcdefghijklmnop was rejected";
        let out = redact_secrets(input);
        assert!(out.contains("sk-***REDACTED***"));
        assert!(!out.contains("abcdefghijklmnop"));
    }

    #[test]
    fn redacts_google_style_keys() {
        let input = "API key not valid: AIzaSyB1234567890abcdef";
        let out = redact_secrets(input);
        assert!(out.contains("AIza***REDACTED***"));
        assert!(!out.contains("SyB1234567890abcdef"));
    }

    #[test]
    fn short_prefixes_are_left_alone() {
        assert_eq!(redact_secrets("risk-free"), "risk-free");
        assert_eq!(redact_secrets("sk-abc"), "sk-abc");
    }
}
