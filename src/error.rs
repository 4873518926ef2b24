use crate::bracket::SlotSide;

/// Errors raised while building a bracket or recording match results.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BracketError {
  #[error("A bracket needs at least two competitors (got {0}).")]
  TooFewCompetitors(usize),
  #[error("Competitor {0:?} is listed more than once.")]
  DuplicateCompetitor(String),
  #[error("Shuffle source did not return a permutation of {0} competitors.")]
  InvalidPermutation(usize),
  #[error("Match {round_index}-{match_index} does not exist.")]
  InvalidMatch { round_index: usize, match_index: usize },
  #[error("Match {round_index}-{match_index} is missing competitors.")]
  MatchNotReady { round_index: usize, match_index: usize },
  #[error("Match {round_index}-{match_index} is already resolved.")]
  AlreadyResolved { round_index: usize, match_index: usize },
  #[error("Slot {side} has no score yet.")]
  MissingScore { side: SlotSide },
  #[error("Slot {side} score {value:?} is not a number.")]
  NonNumericScore { side: SlotSide, value: String },
  #[error("Scores are tied at {score}; enter unique scores for both.")]
  TiedScore { score: i64 },
}

/// Errors raised while registering competitors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RosterError {
  #[error("Name cannot be empty.")]
  EmptyName,
  #[error("Name {name:?} exceeds {max} characters.")]
  NameTooLong { name: String, max: usize },
  #[error("Name {0:?} is already registered; names must be unique.")]
  DuplicateName(String),
  #[error("Maximum of {0} competitors reached.")]
  RosterFull(usize),
  #[error("No competitor at position {0}.")]
  NoSuchCompetitor(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
  #[error(transparent)]
  Bracket(#[from] BracketError),
  #[error(transparent)]
  Roster(#[from] RosterError),
  #[error("{0}")]
  WrongPhase(&'static str),
}
