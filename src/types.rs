use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

use crate::bracket::{ActiveMatch, Match};
use crate::roster::Roster;
use crate::session::BracketSession;

// ── Constants ──────────────────────────────────────────────────────────

pub const DEFAULT_MAX_COMPETITORS: usize = 64;
pub const DEFAULT_MAX_NAME_LENGTH: usize = 5;
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:17880";
pub const DEFAULT_STATIC_DIR: &str = "web";
pub const DEFAULT_LOG_FILE: &str = "bracket.log";

// ── Shared state type aliases ──────────────────────────────────────────

pub type SharedSession = Arc<Mutex<BracketSession>>;

// ── Config ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub static_dir: String,
    pub seed: Option<u64>,
    pub max_competitors: usize,
    pub max_name_length: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            static_dir: DEFAULT_STATIC_DIR.to_string(),
            seed: None,
            max_competitors: DEFAULT_MAX_COMPETITORS,
            max_name_length: DEFAULT_MAX_NAME_LENGTH,
        }
    }
}

#[derive(Clone)]
pub struct ServerState {
    pub session: SharedSession,
}

// ── Snapshot types (what the rendering layer receives) ─────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionPhase {
    Collection,
    Tournament,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundView {
    pub index: usize,
    pub label: String,
    pub matches: Vec<Match>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketView {
    pub bracket_size: usize,
    pub bye_count: usize,
    pub competitors: Vec<String>,
    pub rounds: Vec<RoundView>,
    pub active: ActiveMatch,
    pub champion: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub roster: Roster,
    pub bracket: Option<BracketView>,
    pub updated_at_ms: u64,
}

// ── Request payloads ───────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitorPayload {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScorePayload {
    pub side: crate::bracket::SlotSide,
    pub value: serde_json::Value,
}
