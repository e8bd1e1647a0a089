//! KB-015: Append-only JSONL activity journal.

use crate::core::types::{Action, ActivityEntry};
use std::io::Write;
use std::path::Path;
use tracing::warn;

/// Number of entries shown by the history view.
pub const DEFAULT_LIMIT: usize = 40;

/// Current time as an RFC 3339 UTC timestamp.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

/// Build an entry stamped with the current time.
pub fn entry(user: &str, action: Action, target: &str) -> ActivityEntry {
    ActivityEntry {
        ts: now_rfc3339(),
        user: user.to_string(),
        action,
        target: target.to_string(),
    }
}

/// Append an entry to the journal, creating the file and its directory.
pub fn append(path: &Path, entry: &ActivityEntry) -> Result<(), String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("cannot create journal dir {}: {}", parent.display(), e))?;
    }

    let json = serde_json::to_string(entry).map_err(|e| format!("JSON serialize error: {}", e))?;

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| format!("cannot open journal {}: {}", path.display(), e))?;

    writeln!(file, "{}", json).map_err(|e| format!("write error: {}", e))?;

    Ok(())
}

/// The newest `limit` entries, newest first. A missing journal is empty.
pub fn recent(path: &Path, limit: usize) -> Result<Vec<ActivityEntry>, String> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read journal {}: {}", path.display(), e))?;

    let mut entries = Vec::new();
    for (n, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<ActivityEntry>(line) {
            Ok(e) => entries.push(e),
            Err(e) => warn!(line = n + 1, "skipping malformed journal entry: {}", e),
        }
    }

    entries.reverse();
    entries.truncate(limit);
    Ok(entries)
}
