use crate::types::*;
use chrono::Local;
use std::{
    env,
    fs,
    io::Write,
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

pub fn repo_root() -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

pub fn resolve_repo_path(raw: &str) -> PathBuf {
  let path = PathBuf::from(raw);
  if path.is_absolute() {
    path
  } else {
    repo_root().join(path)
  }
}

pub fn config_path() -> PathBuf {
  if let Some(raw) = env_default("BRACKET_CONFIG_PATH") {
    return resolve_repo_path(&raw);
  }
  repo_root().join("config.json")
}

pub fn logs_dir() -> PathBuf {
  repo_root().join("logs")
}

pub fn env_default(key: &str) -> Option<String> {
  env::var(key)
    .ok()
    .map(|value| value.trim().to_string())
    .filter(|value| !value.is_empty())
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
  let raw = env_default(key)?;
  match raw.parse::<T>() {
    Ok(value) => Some(value),
    Err(_) => {
      tracing::warn!("Ignoring {key}={raw:?}: not a valid value");
      None
    }
  }
}

/// Environment variables win over `config.json`.
pub fn apply_env_overrides(mut config: AppConfig) -> AppConfig {
  if let Some(value) = env_default("BRACKET_BIND_ADDR") {
    config.bind_addr = value;
  }
  if let Some(value) = env_default("BRACKET_STATIC_DIR") {
    config.static_dir = value;
  }
  if let Some(seed) = env_parsed::<u64>("BRACKET_SEED") {
    config.seed = Some(seed);
  }
  if let Some(max) = env_parsed::<usize>("BRACKET_MAX_COMPETITORS") {
    config.max_competitors = max;
  }
  if let Some(max) = env_parsed::<usize>("BRACKET_MAX_NAME_LENGTH") {
    config.max_name_length = max;
  }
  config
}

pub fn load_config_inner() -> Result<AppConfig, String> {
  let path = config_path();
  if !path.is_file() {
    return Ok(apply_env_overrides(AppConfig::default()));
  }
  let data = fs::read_to_string(&path).map_err(|e| format!("read config {}: {e}", path.display()))?;
  let config =
    serde_json::from_str::<AppConfig>(&data).map_err(|e| format!("parse config {}: {e}", path.display()))?;
  Ok(apply_env_overrides(config))
}

pub fn load_env_file() {
  let env_path = repo_root().join(".env");
  if !env_path.is_file() {
    return;
  }
  let contents = match fs::read_to_string(&env_path) {
    Ok(data) => data,
    Err(_) => return,
  };
  for line in contents.lines() {
    if let Some((key, value)) = parse_env_line(line) {
      if env::var_os(&key).is_none() {
        env::set_var(key, value);
      }
    }
  }
}

pub fn parse_env_line(line: &str) -> Option<(String, String)> {
  let trimmed = line.trim();
  if trimmed.is_empty() || trimmed.starts_with('#') {
    return None;
  }
  let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
  let (key, raw_value) = trimmed.split_once('=')?;
  let key = key.trim();
  if key.is_empty() {
    return None;
  }
  let mut value = raw_value.trim();
  if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
    value = &value[1..value.len() - 1];
  } else if value.starts_with('\'') && value.ends_with('\'') && value.len() >= 2 {
    value = &value[1..value.len() - 1];
  } else if let Some(idx) = value.find('#') {
    value = value[..idx].trim_end();
  }
  Some((key.to_string(), value.to_string()))
}

pub fn now_ms() -> u64 {
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .unwrap_or_default()
    .as_millis() as u64
}

pub fn results_log_path() -> PathBuf {
  logs_dir().join("results.log")
}

/// Append a timestamped line to the match results log. Failures are ignored.
pub fn append_results_log(label: &str, payload: &str) {
  let dir = logs_dir();
  if fs::create_dir_all(&dir).is_err() {
    return;
  }
  let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
  let entry = format!("[{timestamp}] {label}: {payload}\n");
  if let Ok(mut file) = fs::OpenOptions::new().create(true).append(true).open(results_log_path()) {
    let _ = file.write_all(entry.as_bytes());
  }
}

pub fn log_env_warnings(config: &AppConfig) {
  let mut warnings = Vec::new();

  if config.max_competitors < 2 {
    warnings.push(format!(
      "maxCompetitors is {} — no bracket can ever be started",
      config.max_competitors
    ));
  }
  if config.max_name_length == 0 {
    warnings.push("maxNameLength is 0 — every competitor name will be rejected".to_string());
  }
  if config.seed.is_some() {
    warnings.push("BRACKET_SEED is set — draws are reproducible, not random".to_string());
  }
  if config.bind_addr.starts_with("0.0.0.0") {
    warnings.push(format!(
      "bindAddr {} listens on all interfaces — anyone on the network can edit the bracket",
      config.bind_addr
    ));
  }

  for msg in warnings {
    tracing::warn!("{}", msg);
  }
}
