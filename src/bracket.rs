use crate::error::BracketError;
use crate::ledger::ScoreEntry;
use crate::shuffle::{is_permutation, ShuffleSource};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "camelCase")]
pub enum Slot {
  Competitor(String),
  Bye,
  Empty,
}

impl Slot {
  pub fn competitor(&self) -> Option<&str> {
    match self {
      Slot::Competitor(name) => Some(name.as_str()),
      Slot::Bye | Slot::Empty => None,
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotSide {
  A,
  B,
}

impl SlotSide {
  pub fn index(self) -> usize {
    match self {
      SlotSide::A => 0,
      SlotSide::B => 1,
    }
  }

  pub fn from_index(index: usize) -> Option<Self> {
    match index {
      0 => Some(SlotSide::A),
      1 => Some(SlotSide::B),
      _ => None,
    }
  }

  pub fn other(self) -> Self {
    match self {
      SlotSide::A => SlotSide::B,
      SlotSide::B => SlotSide::A,
    }
  }

  /// Side a winner of match `match_index` fills in the next round.
  pub fn feeding(match_index: usize) -> Self {
    if match_index % 2 == 0 {
      SlotSide::A
    } else {
      SlotSide::B
    }
  }
}

impl fmt::Display for SlotSide {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SlotSide::A => f.write_str("A"),
      SlotSide::B => f.write_str("B"),
    }
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "camelCase")]
pub enum Opponent {
  Competitor(String),
  Bye,
}

impl fmt::Display for Opponent {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Opponent::Competitor(name) => f.write_str(name),
      Opponent::Bye => f.write_str("BYE"),
    }
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
  pub winner: String,
  pub loser: Opponent,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Outcome {
  Unresolved,
  Resolved(MatchResult),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
  pub(crate) round_index: usize,
  pub(crate) match_index: usize,
  pub(crate) slots: [Slot; 2],
  pub(crate) scores: [Option<ScoreEntry>; 2],
  pub(crate) outcome: Outcome,
}

impl Match {
  fn new(round_index: usize, match_index: usize, slots: [Slot; 2]) -> Self {
    Match {
      round_index,
      match_index,
      slots,
      scores: [None, None],
      outcome: Outcome::Unresolved,
    }
  }

  pub fn round_index(&self) -> usize {
    self.round_index
  }

  pub fn match_index(&self) -> usize {
    self.match_index
  }

  pub fn slot(&self, side: SlotSide) -> &Slot {
    &self.slots[side.index()]
  }

  pub fn score(&self, side: SlotSide) -> Option<&ScoreEntry> {
    self.scores[side.index()].as_ref()
  }

  pub fn result(&self) -> Option<&MatchResult> {
    match &self.outcome {
      Outcome::Resolved(result) => Some(result),
      Outcome::Unresolved => None,
    }
  }

  pub fn is_resolved(&self) -> bool {
    matches!(self.outcome, Outcome::Resolved(_))
  }

  /// Both slots hold real competitors.
  pub fn is_ready(&self) -> bool {
    self.slots.iter().all(|slot| slot.competitor().is_some())
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ActiveMatch {
  #[serde(rename_all = "camelCase")]
  Match { round_index: usize, match_index: usize },
  Complete,
}

/// A single-elimination bracket. Operations never mutate the receiver;
/// they return the next bracket or an error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bracket {
  pub(crate) competitors: Vec<String>,
  pub(crate) bracket_size: usize,
  pub(crate) rounds: Vec<Vec<Match>>,
  pub(crate) champion: Option<String>,
}

impl Bracket {
  /// Seeds round 0 from `competitors` in the order drawn from `source`,
  /// pads with byes up to the next power of two, and resolves the byes.
  pub fn create(competitors: &[String], source: &mut dyn ShuffleSource) -> Result<Self, BracketError> {
    let count = competitors.len();
    if count < 2 {
      return Err(BracketError::TooFewCompetitors(count));
    }
    let mut seen = HashSet::new();
    for name in competitors {
      if !seen.insert(name.as_str()) {
        return Err(BracketError::DuplicateCompetitor(name.clone()));
      }
    }

    let round_count = round_count_for(count);
    let bracket_size = 1usize << round_count;
    let bye_count = bracket_size - count;

    let order = source.permutation(count);
    if !is_permutation(&order, count) {
      return Err(BracketError::InvalidPermutation(count));
    }
    let seeded = order
      .iter()
      .map(|&idx| competitors[idx].clone())
      .collect::<Vec<_>>();

    let mut rounds = Vec::with_capacity(round_count);
    let opening = (0..bracket_size / 2)
      .map(|i| {
        let slots = if i < bye_count {
          [Slot::Competitor(seeded[i].clone()), Slot::Bye]
        } else {
          let first = bye_count + (i - bye_count) * 2;
          [
            Slot::Competitor(seeded[first].clone()),
            Slot::Competitor(seeded[first + 1].clone()),
          ]
        };
        Match::new(0, i, slots)
      })
      .collect::<Vec<_>>();
    rounds.push(opening);
    for round_index in 1..round_count {
      let matches = (0..bracket_size >> (round_index + 1))
        .map(|match_index| Match::new(round_index, match_index, [Slot::Empty, Slot::Empty]))
        .collect();
      rounds.push(matches);
    }

    let mut bracket = Bracket {
      competitors: seeded,
      bracket_size,
      rounds,
      champion: None,
    };
    bracket.resolve_byes();
    info!(
      "Bracket created: {count} competitors, {round_count} rounds, {bye_count} byes"
    );
    Ok(bracket)
  }

  fn resolve_byes(&mut self) {
    let mut advancing = Vec::new();
    for (match_index, m) in self.rounds[0].iter().enumerate() {
      let result = match &m.slots {
        [Slot::Competitor(name), Slot::Bye] | [Slot::Bye, Slot::Competitor(name)] => MatchResult {
          winner: name.clone(),
          loser: Opponent::Bye,
        },
        _ => continue,
      };
      advancing.push((match_index, result));
    }
    for (match_index, result) in advancing {
      debug!("Bye advances {} from match 0-{match_index}", result.winner);
      self.record_result(0, match_index, result);
    }
  }

  /// Stores `result` on the match and moves the winner forward in one step.
  pub(crate) fn record_result(&mut self, round_index: usize, match_index: usize, result: MatchResult) {
    let winner = result.winner.clone();
    let Some(target) = self
      .rounds
      .get_mut(round_index)
      .and_then(|round| round.get_mut(match_index))
    else {
      unreachable!("result recorded for missing match {round_index}-{match_index}");
    };
    target.outcome = Outcome::Resolved(result);
    self.propagate(round_index, match_index, winner);
  }

  fn propagate(&mut self, round_index: usize, match_index: usize, winner: String) {
    if round_index + 1 == self.rounds.len() {
      info!("Champion crowned: {winner}");
      self.champion = Some(winner);
      return;
    }
    let side = SlotSide::feeding(match_index);
    let Some(target) = self
      .rounds
      .get_mut(round_index + 1)
      .and_then(|round| round.get_mut(match_index / 2))
    else {
      unreachable!("no downstream match for {round_index}-{match_index}");
    };
    target.slots[side.index()] = Slot::Competitor(winner);
  }

  /// First match without a result in round-major order. Advisory only.
  pub fn locate_active_match(&self) -> ActiveMatch {
    for round in &self.rounds {
      for m in round {
        if !m.is_resolved() {
          return ActiveMatch::Match {
            round_index: m.round_index,
            match_index: m.match_index,
          };
        }
      }
    }
    ActiveMatch::Complete
  }

  pub fn rounds(&self) -> &[Vec<Match>] {
    &self.rounds
  }

  pub fn round_count(&self) -> usize {
    self.rounds.len()
  }

  pub fn bracket_size(&self) -> usize {
    self.bracket_size
  }

  pub fn bye_count(&self) -> usize {
    self.bracket_size - self.competitors.len()
  }

  /// Competitors in drawn order.
  pub fn competitors(&self) -> &[String] {
    &self.competitors
  }

  pub fn champion(&self) -> Option<&str> {
    self.champion.as_deref()
  }

  pub fn get_match(&self, round_index: usize, match_index: usize) -> Option<&Match> {
    self.rounds.get(round_index)?.get(match_index)
  }

  pub fn matches(&self) -> impl Iterator<Item = &Match> {
    self.rounds.iter().flatten()
  }

  pub fn total_matches(&self) -> usize {
    self.rounds.iter().map(Vec::len).sum()
  }

  pub fn is_complete(&self) -> bool {
    self.matches().all(Match::is_resolved)
  }
}

pub fn round_count_for(competitor_count: usize) -> usize {
  let mut rounds = 0usize;
  let mut size = competitor_count.max(2).next_power_of_two();
  while size > 1 {
    rounds += 1;
    size /= 2;
  }
  rounds
}

pub fn round_label(round_index: usize, round_count: usize) -> String {
  match round_count.saturating_sub(round_index) {
    1 => "Final".to_string(),
    2 => "Semifinals".to_string(),
    3 => "Quarterfinals".to_string(),
    _ => format!("Round {}", round_index + 1),
  }
}
