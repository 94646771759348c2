//! Scripted session replay.
//!
//! A script is JSON lines, each `{"at_ms": <offset>, "event": <HostEvent>}`.
//! Blank lines and lines starting with `#` are skipped. Events are fed to the
//! session at their offsets from the start of the replay, so debounce and
//! re-enable timers behave as they would on a live page.

use std::time::Duration;

use funnel_core::error::{FunnelError, Result};
use funnel_page::{Effect, HostEvent, PageSession};
use serde::Deserialize;
use tokio::time::Instant;

/// One scripted host event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScriptLine {
    pub at_ms: u64,
    pub event: HostEvent,
}

/// Parse a script. Lines are returned ordered by offset; equal offsets keep
/// file order.
pub fn parse_script(content: &str) -> Result<Vec<ScriptLine>> {
    let mut lines = Vec::new();
    for (index, raw) in content.lines().enumerate() {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let line: ScriptLine = serde_json::from_str(trimmed).map_err(|e| {
            FunnelError::Serialization(format!("script line {}: {}", index + 1, e))
        })?;
        lines.push(line);
    }
    lines.sort_by_key(|l| l.at_ms);
    Ok(lines)
}

/// Replay `script` against `session` and return every effect produced.
///
/// After the last line the replay waits `settle` so pending timers can fire,
/// then unloads the session if the script did not.
pub async fn replay(
    session: &mut PageSession,
    script: &[ScriptLine],
    settle: Duration,
) -> Vec<Effect> {
    let start = Instant::now();
    let mut effects = Vec::new();

    session.start();
    for line in script {
        tokio::time::sleep_until(start + Duration::from_millis(line.at_ms)).await;
        tracing::debug!(at_ms = line.at_ms, event = ?line.event, "Replaying host event");
        effects.extend(session.handle(line.event.clone()));
    }

    if !session.is_unloaded() {
        tokio::time::sleep(settle).await;
        session.unload();
    }
    effects
}
