//! Running length and extent of a polyline.

use glam::DVec3;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PathMetrics {
  pub start: DVec3,
  pub last: DVec3,
  pub length: f64,
  pub count: usize,
}

impl PathMetrics {
  pub fn new(start: DVec3) -> Self {
    Self {
      start,
      last: start,
      length: 0.0,
      count: 1,
    }
  }

  /// Append `location`. Returns the accumulated length.
  pub fn add(&mut self, location: DVec3) -> f64 {
    if self.count == 0 {
      *self = Self::new(location);
      return 0.0;
    }
    self.length += self.last.distance(location);
    self.last = location;
    self.count += 1;
    self.length
  }

  /// Whether `location` lies strictly closer than `sqrt(range_squared)` to
  /// the last added location.
  #[inline]
  pub fn is_last_within_range(&self, location: DVec3, range_squared: f64) -> bool {
    self.last.distance_squared(location) < range_squared
  }
}
