use crate::bracket::{ActiveMatch, SlotSide};
use crate::config::{append_results_log, now_ms};
use crate::session::BracketSession;
use crate::types::*;
use serde_json::Value;

// ── Helpers ─────────────────────────────────────────────────────────────

/// Lock the session, then call `f` with `(&mut BracketSession, now_ms)` and
/// return the snapshot taken while the lock is still held.
fn with_session<F>(session: &SharedSession, f: F) -> Result<SessionSnapshot, String>
where
    F: FnOnce(&mut BracketSession, u64) -> Result<(), String>,
{
    let now = now_ms();
    let mut guard = session.lock().map_err(|e| e.to_string())?;
    f(&mut guard, now)?;
    Ok(guard.snapshot())
}

/// Score inputs arrive as JSON strings or numbers; anything else is kept as
/// its JSON text so finalize can report it as non-numeric.
pub fn score_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        other => other.to_string(),
    }
}

// ── Commands ────────────────────────────────────────────────────────────

pub fn bracket_state(session: &SharedSession) -> SessionSnapshot {
    let guard = session.lock().unwrap_or_else(|e| e.into_inner());
    guard.snapshot()
}

pub fn bracket_active_match(session: &SharedSession) -> Result<ActiveMatch, String> {
    let guard = session.lock().map_err(|e| e.to_string())?;
    guard
        .active_match()
        .ok_or_else(|| "Tournament has not started.".to_string())
}

pub fn bracket_add_competitor(session: &SharedSession, name: &str) -> Result<SessionSnapshot, String> {
    with_session(session, |current, now| {
        current.add_competitor(name, now).map_err(|e| e.to_string())?;
        Ok(())
    })
}

pub fn bracket_rename_competitor(
    session: &SharedSession,
    index: usize,
    name: &str,
) -> Result<SessionSnapshot, String> {
    with_session(session, |current, now| {
        current.rename_competitor(index, name, now).map_err(|e| e.to_string())?;
        Ok(())
    })
}

pub fn bracket_remove_competitor(session: &SharedSession, index: usize) -> Result<SessionSnapshot, String> {
    with_session(session, |current, now| {
        current.remove_competitor(index, now).map_err(|e| e.to_string())?;
        Ok(())
    })
}

pub fn bracket_start(session: &SharedSession) -> Result<SessionSnapshot, String> {
    with_session(session, |current, now| {
        let bracket = current.start(now).map_err(|e| e.to_string())?;
        append_results_log(
            "draw",
            &format!(
                "{} competitors, {} byes: {}",
                bracket.competitors().len(),
                bracket.bye_count(),
                bracket.competitors().join(", ")
            ),
        );
        Ok(())
    })
}

pub fn bracket_submit_score(
    session: &SharedSession,
    round_index: usize,
    match_index: usize,
    side: SlotSide,
    value: &Value,
) -> Result<SessionSnapshot, String> {
    let text = score_text(value);
    with_session(session, |current, now| {
        current
            .submit_score(round_index, match_index, side, &text, now)
            .map_err(|e| e.to_string())?;
        Ok(())
    })
}

pub fn bracket_finalize_match(
    session: &SharedSession,
    round_index: usize,
    match_index: usize,
) -> Result<SessionSnapshot, String> {
    with_session(session, |current, now| {
        let bracket = current
            .finalize_match(round_index, match_index, now)
            .map_err(|e| e.to_string())?;
        if let Some(result) = bracket.get_match(round_index, match_index).and_then(|m| m.result()) {
            append_results_log(
                &format!("match {round_index}-{match_index}"),
                &format!("{} beat {}", result.winner, result.loser),
            );
        }
        if let Some(champion) = bracket.champion() {
            append_results_log("champion", champion);
        }
        Ok(())
    })
}

pub fn bracket_reset(session: &SharedSession) -> Result<SessionSnapshot, String> {
    with_session(session, |current, now| {
        current.reset(now);
        Ok(())
    })
}
