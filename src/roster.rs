use crate::error::RosterError;
use crate::types::{DEFAULT_MAX_COMPETITORS, DEFAULT_MAX_NAME_LENGTH};
use serde::Serialize;

/// Competitors registered before the bracket is drawn.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Roster {
    competitors: Vec<String>,
    max_competitors: usize,
    max_name_length: usize,
}

impl Default for Roster {
    fn default() -> Self {
        Roster::with_limits(DEFAULT_MAX_COMPETITORS, DEFAULT_MAX_NAME_LENGTH)
    }
}

impl Roster {
    pub fn with_limits(max_competitors: usize, max_name_length: usize) -> Self {
        Roster {
            competitors: Vec::new(),
            max_competitors,
            max_name_length,
        }
    }

    pub fn competitors(&self) -> &[String] {
        &self.competitors
    }

    pub fn len(&self) -> usize {
        self.competitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.competitors.is_empty()
    }

    /// Register a new competitor; returns the stored (trimmed) name.
    pub fn add(&mut self, raw: &str) -> Result<String, RosterError> {
        let name = self.validate_name(raw)?;
        if self.competitors.contains(&name) {
            return Err(RosterError::DuplicateName(name));
        }
        if self.competitors.len() >= self.max_competitors {
            return Err(RosterError::RosterFull(self.max_competitors));
        }
        self.competitors.push(name.clone());
        Ok(name)
    }

    pub fn rename(&mut self, index: usize, raw: &str) -> Result<String, RosterError> {
        if index >= self.competitors.len() {
            return Err(RosterError::NoSuchCompetitor(index));
        }
        let name = self.validate_name(raw)?;
        // Renaming to the current name is a no-op, not a clash.
        let clash = self
            .competitors
            .iter()
            .enumerate()
            .any(|(idx, existing)| idx != index && *existing == name);
        if clash {
            return Err(RosterError::DuplicateName(name));
        }
        self.competitors[index] = name.clone();
        Ok(name)
    }

    pub fn remove(&mut self, index: usize) -> Result<String, RosterError> {
        if index >= self.competitors.len() {
            return Err(RosterError::NoSuchCompetitor(index));
        }
        Ok(self.competitors.remove(index))
    }

    pub fn clear(&mut self) {
        self.competitors.clear();
    }

    fn validate_name(&self, raw: &str) -> Result<String, RosterError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(RosterError::EmptyName);
        }
        if trimmed.chars().count() > self.max_name_length {
            return Err(RosterError::NameTooLong {
                name: trimmed.to_string(),
                max: self.max_name_length,
            });
        }
        Ok(trimmed.to_string())
    }
}
