//! Score proposals and result finalization.
//!
//! A score is only a proposal until `finalize_match` turns both proposals into
//! a result. Finalization and winner propagation happen on a cloned bracket,
//! so a failed call leaves the caller's bracket untouched.

use crate::bracket::{Bracket, Match, MatchResult, Opponent, SlotSide};
use crate::error::BracketError;
use serde::Serialize;
use tracing::{debug, info};

/// A submitted score, kept as entered until the match is finalized.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ScoreEntry {
  raw: String,
}

impl ScoreEntry {
  pub fn new(raw: &str) -> Self {
    ScoreEntry { raw: raw.trim().to_string() }
  }

  pub fn raw(&self) -> &str {
    &self.raw
  }

  /// Integer value of the score. Decimals truncate toward zero.
  pub fn value(&self) -> Option<i64> {
    if let Ok(value) = self.raw.parse::<i64>() {
      return Some(value);
    }
    let value = self.raw.parse::<f64>().ok()?.trunc();
    if value.is_finite() && value >= i64::MIN as f64 && value < i64::MAX as f64 {
      Some(value as i64)
    } else {
      None
    }
  }
}

impl Bracket {
  pub fn submit_score(
    &self,
    round_index: usize,
    match_index: usize,
    side: SlotSide,
    value: &str,
  ) -> Result<Bracket, BracketError> {
    self.playable_match(round_index, match_index)?;
    let mut next = self.clone();
    let target = &mut next.rounds[round_index][match_index];
    let entry = ScoreEntry::new(value);
    if entry.raw().is_empty() {
      target.scores[side.index()] = None;
      debug!("Score cleared for slot {side} of match {round_index}-{match_index}");
    } else {
      target.scores[side.index()] = Some(entry);
      debug!("Score {value:?} proposed for slot {side} of match {round_index}-{match_index}");
    }
    Ok(next)
  }

  pub fn finalize_match(&self, round_index: usize, match_index: usize) -> Result<Bracket, BracketError> {
    let (current, names) = self.playable_match(round_index, match_index)?;
    let score_a = parsed_score(current, SlotSide::A)?;
    let score_b = parsed_score(current, SlotSide::B)?;
    if score_a == score_b {
      return Err(BracketError::TiedScore { score: score_a });
    }

    let winner_side = if score_a > score_b { SlotSide::A } else { SlotSide::B };
    let result = MatchResult {
      winner: names[winner_side.index()].to_string(),
      loser: Opponent::Competitor(names[winner_side.other().index()].to_string()),
    };
    info!(
      "Match {round_index}-{match_index} finalized {score_a}-{score_b}: {} advances",
      result.winner
    );

    let mut next = self.clone();
    next.record_result(round_index, match_index, result);
    Ok(next)
  }

  /// The match and its two competitor names, if it can take scores.
  fn playable_match(&self, round_index: usize, match_index: usize) -> Result<(&Match, [&str; 2]), BracketError> {
    let current = self
      .get_match(round_index, match_index)
      .ok_or(BracketError::InvalidMatch { round_index, match_index })?;
    if current.is_resolved() {
      return Err(BracketError::AlreadyResolved { round_index, match_index });
    }
    match (current.slots[0].competitor(), current.slots[1].competitor()) {
      (Some(a), Some(b)) => Ok((current, [a, b])),
      _ => Err(BracketError::MatchNotReady { round_index, match_index }),
    }
  }
}

fn parsed_score(current: &Match, side: SlotSide) -> Result<i64, BracketError> {
  let entry = current.score(side).ok_or(BracketError::MissingScore { side })?;
  entry.value().ok_or_else(|| BracketError::NonNumericScore {
    side,
    value: entry.raw().to_string(),
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::bracket::{ActiveMatch, Slot};
  use crate::shuffle::{FixedPermutation, SimRng};

  fn five() -> Bracket {
    let list = ["A", "B", "C", "D", "E"].iter().map(|s| s.to_string()).collect::<Vec<_>>();
    Bracket::create(&list, &mut FixedPermutation::identity()).unwrap()
  }

  fn play(bracket: &Bracket, r: usize, m: usize, a: &str, b: &str) -> Bracket {
    bracket
      .submit_score(r, m, SlotSide::A, a)
      .and_then(|next| next.submit_score(r, m, SlotSide::B, b))
      .and_then(|next| next.finalize_match(r, m))
      .unwrap()
  }

  fn slot(name: &str) -> Slot {
    Slot::Competitor(name.to_string())
  }

  #[test]
  fn test_five_competitor_walkthrough() {
    let bracket = five();

    let bracket = play(&bracket, 0, 3, "10", "7");
    assert_eq!(bracket.rounds()[1][1].slots, [slot("C"), slot("D")]);
    assert_eq!(
      bracket.get_match(0, 3).unwrap().result().unwrap().loser,
      Opponent::Competitor("E".to_string())
    );

    let bracket = play(&bracket, 1, 0, "3", "5");
    assert_eq!(bracket.rounds()[2][0].slots, [slot("B"), Slot::Empty]);
    let bracket = play(&bracket, 1, 1, "8", "2");
    assert_eq!(bracket.rounds()[2][0].slots, [slot("B"), slot("C")]);
    assert_eq!(
      bracket.locate_active_match(),
      ActiveMatch::Match { round_index: 2, match_index: 0 }
    );
    assert!(bracket.champion().is_none());

    let bracket = play(&bracket, 2, 0, "6", "4");
    assert_eq!(bracket.champion(), Some("B"));
    assert_eq!(bracket.locate_active_match(), ActiveMatch::Complete);
    assert!(bracket.is_complete());
  }

  #[test]
  fn test_submit_does_not_resolve() {
    let bracket = five();
    let next = bracket.submit_score(0, 3, SlotSide::A, "4").unwrap();
    let m = next.get_match(0, 3).unwrap();
    assert!(!m.is_resolved());
    assert_eq!(m.score(SlotSide::A).map(ScoreEntry::raw), Some("4"));
    assert!(m.score(SlotSide::B).is_none());
    assert!(bracket.get_match(0, 3).unwrap().score(SlotSide::A).is_none());
  }

  #[test]
  fn test_resubmit_replaces_score() {
    let bracket = five()
      .submit_score(0, 3, SlotSide::B, "1")
      .and_then(|b| b.submit_score(0, 3, SlotSide::B, " 9 "))
      .unwrap();
    assert_eq!(bracket.get_match(0, 3).unwrap().score(SlotSide::B).map(ScoreEntry::raw), Some("9"));
  }

  #[test]
  fn test_tie_is_rejected_and_leaves_match_open() {
    let bracket = five()
      .submit_score(0, 3, SlotSide::A, "5")
      .and_then(|b| b.submit_score(0, 3, SlotSide::B, "5"))
      .unwrap();
    assert_eq!(bracket.finalize_match(0, 3), Err(BracketError::TiedScore { score: 5 }));
    assert!(!bracket.get_match(0, 3).unwrap().is_resolved());

    let fixed = bracket.submit_score(0, 3, SlotSide::B, "6").unwrap();
    let done = fixed.finalize_match(0, 3).unwrap();
    assert_eq!(done.get_match(0, 3).unwrap().result().unwrap().winner, "E");
  }

  #[test]
  fn test_missing_score() {
    let bracket = five();
    assert_eq!(
      bracket.finalize_match(0, 3),
      Err(BracketError::MissingScore { side: SlotSide::A })
    );
    let half = bracket.submit_score(0, 3, SlotSide::A, "2").unwrap();
    assert_eq!(
      half.finalize_match(0, 3),
      Err(BracketError::MissingScore { side: SlotSide::B })
    );
  }

  #[test]
  fn test_non_numeric_score() {
    let bracket = five()
      .submit_score(0, 3, SlotSide::A, "3")
      .and_then(|b| b.submit_score(0, 3, SlotSide::B, "x1"))
      .unwrap();
    assert_eq!(
      bracket.finalize_match(0, 3),
      Err(BracketError::NonNumericScore { side: SlotSide::B, value: "x1".to_string() })
    );
    let infinite = bracket.submit_score(0, 3, SlotSide::B, "inf").unwrap();
    assert!(matches!(
      infinite.finalize_match(0, 3),
      Err(BracketError::NonNumericScore { side: SlotSide::B, .. })
    ));
  }

  #[test]
  fn test_negative_large_and_decimal_scores() {
    let two = vec!["X".to_string(), "Y".to_string()];
    let bracket = Bracket::create(&two, &mut FixedPermutation::identity()).unwrap();

    let done = play(&bracket, 0, 0, "-1", "-3");
    assert_eq!(done.champion(), Some("X"));

    let done = play(&bracket, 0, 0, "1", "5000000000");
    assert_eq!(done.champion(), Some("Y"));

    let done = play(&bracket, 0, 0, "2.5", "1");
    assert_eq!(done.champion(), Some("X"));

    let tied = bracket
      .submit_score(0, 0, SlotSide::A, "7.0")
      .and_then(|b| b.submit_score(0, 0, SlotSide::B, "7"))
      .unwrap();
    assert_eq!(tied.finalize_match(0, 0), Err(BracketError::TiedScore { score: 7 }));
  }

  #[test]
  fn test_blank_submission_clears_score() {
    let bracket = five()
      .submit_score(0, 3, SlotSide::A, "4")
      .and_then(|b| b.submit_score(0, 3, SlotSide::B, "3"))
      .and_then(|b| b.submit_score(0, 3, SlotSide::A, "   "))
      .unwrap();
    assert!(bracket.get_match(0, 3).unwrap().score(SlotSide::A).is_none());
    assert_eq!(
      bracket.finalize_match(0, 3),
      Err(BracketError::MissingScore { side: SlotSide::A })
    );
    let empty = five().submit_score(0, 3, SlotSide::B, "").unwrap();
    assert!(empty.get_match(0, 3).unwrap().score(SlotSide::B).is_none());
  }

  #[test]
  fn test_already_resolved_changes_nothing() {
    let done = play(&five(), 0, 3, "10", "7");
    assert_eq!(
      done.finalize_match(0, 3),
      Err(BracketError::AlreadyResolved { round_index: 0, match_index: 3 })
    );
    assert_eq!(
      done.submit_score(0, 3, SlotSide::A, "1"),
      Err(BracketError::AlreadyResolved { round_index: 0, match_index: 3 })
    );

    let two = vec!["X".to_string(), "Y".to_string()];
    let finished = play(&Bracket::create(&two, &mut FixedPermutation::identity()).unwrap(), 0, 0, "1", "0");
    assert_eq!(finished.champion(), Some("X"));
    assert!(finished.finalize_match(0, 0).is_err());
    assert_eq!(finished.champion(), Some("X"));
  }

  #[test]
  fn test_bye_and_empty_matches_reject_scores() {
    let bracket = five();
    assert_eq!(
      bracket.submit_score(0, 0, SlotSide::A, "1"),
      Err(BracketError::AlreadyResolved { round_index: 0, match_index: 0 })
    );
    assert_eq!(
      bracket.submit_score(1, 1, SlotSide::A, "1"),
      Err(BracketError::MatchNotReady { round_index: 1, match_index: 1 })
    );
    assert_eq!(
      bracket.finalize_match(2, 0),
      Err(BracketError::MatchNotReady { round_index: 2, match_index: 0 })
    );
  }

  #[test]
  fn test_unknown_match() {
    let bracket = five();
    assert_eq!(
      bracket.submit_score(3, 0, SlotSide::A, "1"),
      Err(BracketError::InvalidMatch { round_index: 3, match_index: 0 })
    );
    assert_eq!(
      bracket.finalize_match(0, 4),
      Err(BracketError::InvalidMatch { round_index: 0, match_index: 4 })
    );
  }

  #[test]
  fn test_out_of_order_finalization_is_allowed() {
    let bracket = play(&five(), 1, 0, "1", "2");
    assert_eq!(bracket.rounds()[2][0].slots, [slot("B"), Slot::Empty]);
    assert_eq!(
      bracket.locate_active_match(),
      ActiveMatch::Match { round_index: 0, match_index: 3 }
    );
  }

  #[test]
  fn test_winner_lands_in_fixed_position() {
    let list = (0..16).map(|i| format!("P{i}")).collect::<Vec<_>>();
    let mut bracket = Bracket::create(&list, &mut SimRng::new(5)).unwrap();
    for r in 0..bracket.round_count() {
      for m in 0..bracket.rounds()[r].len() {
        bracket = play(&bracket, r, m, &(m + 1).to_string(), "0");
        let winner = bracket.get_match(r, m).unwrap().result().unwrap().winner.clone();
        if r + 1 < bracket.round_count() {
          let target = bracket.get_match(r + 1, m / 2).unwrap();
          assert_eq!(target.slot(SlotSide::feeding(m)), &Slot::Competitor(winner));
        } else {
          assert_eq!(bracket.champion(), Some(winner.as_str()));
        }
      }
    }
  }

  #[test]
  fn test_champion_iff_all_resolved() {
    let list = (0..13).map(|i| format!("P{i}")).collect::<Vec<_>>();
    let mut bracket = Bracket::create(&list, &mut SimRng::new(11)).unwrap();
    loop {
      assert_eq!(bracket.champion().is_some(), bracket.is_complete());
      let ActiveMatch::Match { round_index, match_index } = bracket.locate_active_match() else {
        break;
      };
      bracket = play(&bracket, round_index, match_index, "2", "3");
    }
    assert!(bracket.champion().is_some());
    assert!(bracket.is_complete());
  }
}
