//! Random permutation sources used when seeding round 0.
//!
//! The builder never reaches for an ambient RNG; it asks a [`ShuffleSource`]
//! for a permutation of `0..len` so tests and replays can pin the draw.

use rand::seq::SliceRandom;

pub trait ShuffleSource: Send {
  /// Returns a permutation of `0..len`.
  fn permutation(&mut self, len: usize) -> Vec<usize>;
}

/// Xorshift generator; the same seed always yields the same draws.
#[derive(Clone, Debug)]
pub struct SimRng {
  state: u64,
}

impl SimRng {
  pub fn new(seed: u64) -> Self {
    let mut state = seed;
    if state == 0 {
      state = 0x9E37_79B9_7F4A_7C15;
    }
    SimRng { state }
  }

  fn next_u64(&mut self) -> u64 {
    let mut x = self.state;
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    self.state = x;
    x
  }

  fn gen_index(&mut self, max_inclusive: usize) -> usize {
    if max_inclusive == 0 {
      return 0;
    }
    let span = max_inclusive as u64 + 1;
    (self.next_u64() % span) as usize
  }
}

impl ShuffleSource for SimRng {
  fn permutation(&mut self, len: usize) -> Vec<usize> {
    let mut order = (0..len).collect::<Vec<_>>();
    for i in (1..len).rev() {
      let j = self.gen_index(i);
      order.swap(i, j);
    }
    order
  }
}

/// Backed by the thread-local RNG; used when no seed is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadShuffle;

impl ShuffleSource for ThreadShuffle {
  fn permutation(&mut self, len: usize) -> Vec<usize> {
    let mut order = (0..len).collect::<Vec<_>>();
    order.shuffle(&mut rand::rng());
    order
  }
}

/// Hands back a caller-chosen order. `None` means identity.
#[derive(Clone, Debug, Default)]
pub struct FixedPermutation {
  order: Option<Vec<usize>>,
}

impl FixedPermutation {
  pub fn new(order: Vec<usize>) -> Self {
    FixedPermutation { order: Some(order) }
  }

  pub fn identity() -> Self {
    FixedPermutation { order: None }
  }
}

impl ShuffleSource for FixedPermutation {
  fn permutation(&mut self, len: usize) -> Vec<usize> {
    match &self.order {
      Some(order) => order.clone(),
      None => (0..len).collect(),
    }
  }
}

/// Picks the seeded generator when a seed is set, the thread RNG otherwise.
pub fn source_for_seed(seed: Option<u64>) -> Box<dyn ShuffleSource> {
  match seed {
    Some(seed) => Box::new(SimRng::new(seed)),
    None => Box::new(ThreadShuffle),
  }
}

pub fn is_permutation(order: &[usize], len: usize) -> bool {
  if order.len() != len {
    return false;
  }
  let mut seen = vec![false; len];
  for &idx in order {
    if idx >= len || seen[idx] {
      return false;
    }
    seen[idx] = true;
  }
  true
}
