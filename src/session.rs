use crate::bracket::{round_label, ActiveMatch, Bracket, SlotSide};
use crate::error::SessionError;
use crate::roster::Roster;
use crate::shuffle::{source_for_seed, ShuffleSource};
use crate::types::{AppConfig, BracketView, RoundView, SessionPhase, SessionSnapshot};
use tracing::{info, warn};

/// Collection phase until `start`, tournament phase until `reset`.
pub struct BracketSession {
    roster: Roster,
    bracket: Option<Bracket>,
    shuffle: Box<dyn ShuffleSource>,
    updated_at_ms: u64,
}

impl BracketSession {
    pub fn new(config: &AppConfig) -> Self {
        BracketSession::with_source(
            source_for_seed(config.seed),
            Roster::with_limits(config.max_competitors, config.max_name_length),
        )
    }

    pub fn with_source(shuffle: Box<dyn ShuffleSource>, roster: Roster) -> Self {
        BracketSession {
            roster,
            bracket: None,
            shuffle,
            updated_at_ms: 0,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        if self.bracket.is_some() {
            SessionPhase::Tournament
        } else {
            SessionPhase::Collection
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn bracket(&self) -> Option<&Bracket> {
        self.bracket.as_ref()
    }

    pub fn add_competitor(&mut self, name: &str, now_ms: u64) -> Result<String, SessionError> {
        self.require_collection()?;
        let added = self.roster.add(name)?;
        self.updated_at_ms = now_ms;
        Ok(added)
    }

    pub fn rename_competitor(&mut self, index: usize, name: &str, now_ms: u64) -> Result<String, SessionError> {
        self.require_collection()?;
        let renamed = self.roster.rename(index, name)?;
        self.updated_at_ms = now_ms;
        Ok(renamed)
    }

    pub fn remove_competitor(&mut self, index: usize, now_ms: u64) -> Result<String, SessionError> {
        self.require_collection()?;
        let removed = self.roster.remove(index)?;
        self.updated_at_ms = now_ms;
        Ok(removed)
    }

    /// Draw the bracket from the current roster. On failure the session
    /// stays in the collection phase with the roster untouched.
    pub fn start(&mut self, now_ms: u64) -> Result<&Bracket, SessionError> {
        self.require_collection()?;
        let bracket = Bracket::create(self.roster.competitors(), self.shuffle.as_mut())?;
        self.updated_at_ms = now_ms;
        Ok(self.bracket.insert(bracket))
    }

    pub fn submit_score(
        &mut self,
        round_index: usize,
        match_index: usize,
        side: SlotSide,
        value: &str,
        now_ms: u64,
    ) -> Result<&Bracket, SessionError> {
        let next = self
            .require_bracket()?
            .submit_score(round_index, match_index, side, value)?;
        self.updated_at_ms = now_ms;
        Ok(self.bracket.insert(next))
    }

    pub fn finalize_match(&mut self, round_index: usize, match_index: usize, now_ms: u64) -> Result<&Bracket, SessionError> {
        let next = match self.require_bracket()?.finalize_match(round_index, match_index) {
            Ok(next) => next,
            Err(e) => {
                warn!("Finalize rejected for match {round_index}-{match_index}: {e}");
                return Err(e.into());
            }
        };
        self.updated_at_ms = now_ms;
        Ok(self.bracket.insert(next))
    }

    pub fn active_match(&self) -> Option<ActiveMatch> {
        self.bracket.as_ref().map(Bracket::locate_active_match)
    }

    /// Drop the bracket, its results and the roster together.
    pub fn reset(&mut self, now_ms: u64) {
        if self.bracket.is_some() {
            info!("Bracket reset");
        }
        self.bracket = None;
        self.roster.clear();
        self.updated_at_ms = now_ms;
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase(),
            roster: self.roster.clone(),
            bracket: self.bracket.as_ref().map(bracket_view),
            updated_at_ms: self.updated_at_ms,
        }
    }

    fn require_collection(&self) -> Result<(), SessionError> {
        if self.bracket.is_some() {
            return Err(SessionError::WrongPhase("Tournament already started; reset to edit competitors."));
        }
        Ok(())
    }

    fn require_bracket(&self) -> Result<&Bracket, SessionError> {
        self.bracket
            .as_ref()
            .ok_or(SessionError::WrongPhase("Tournament has not started."))
    }
}

fn bracket_view(bracket: &Bracket) -> BracketView {
    let round_count = bracket.round_count();
    let rounds = bracket
        .rounds()
        .iter()
        .enumerate()
        .map(|(index, matches)| RoundView {
            index,
            label: round_label(index, round_count),
            matches: matches.clone(),
        })
        .collect();
    BracketView {
        bracket_size: bracket.bracket_size(),
        bye_count: bracket.bye_count(),
        competitors: bracket.competitors().to_vec(),
        rounds,
        active: bracket.locate_active_match(),
        champion: bracket.champion().map(str::to_string),
    }
}
