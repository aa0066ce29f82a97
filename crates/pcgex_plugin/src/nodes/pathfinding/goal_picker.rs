//! Which goals each seed is routed to.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use smallvec::SmallVec;

/// Goal selection strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GoalPicker {
  /// One goal drawn per seed. Deterministic for a given `seed`.
  Random { seed: u64 },
  /// The goal sharing the seed's index, if any.
  SameIndex,
  /// Every goal.
  All,
}

impl Default for GoalPicker {
  fn default() -> Self {
    Self::Random { seed: 0 }
  }
}

impl GoalPicker {
  /// Goal indices for seed `seed_index`, in increasing order.
  pub fn goal_indices(&self, seed_index: usize, num_goals: usize) -> SmallVec<[usize; 4]> {
    if num_goals == 0 {
      return SmallVec::new();
    }
    match *self {
      Self::Random { seed } => {
        let mut rng = StdRng::seed_from_u64(seed ^ mix(seed_index as u64));
        SmallVec::from_elem(rng.random_range(0..num_goals), 1)
      }
      Self::SameIndex if seed_index < num_goals => SmallVec::from_elem(seed_index, 1),
      Self::SameIndex => SmallVec::new(),
      Self::All => (0..num_goals).collect(),
    }
  }
}

/// splitmix64 finalizer, so neighbouring seed indices draw unrelated streams.
#[inline]
fn mix(mut x: u64) -> u64 {
  x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
  x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
  x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
  x ^ (x >> 31)
}
