//! Value to partition key mapping.

use crate::error::ConfigError;

/// Buckets scalar values into integer partition keys.
///
/// `key = floor(value * upscale / filter_size)`. Flooring keeps every bucket
/// the same width on both sides of zero: with `filter_size = 10`, `-0.5`
/// lands in `-1` and `0.5` in `0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PartitionRule {
  pub upscale: f64,
  pub filter_size: f64,
}

impl PartitionRule {
  pub fn new(filter_size: f64) -> Self {
    Self {
      upscale: 1.0,
      filter_size,
    }
  }

  /// `filter_size` must be finite and strictly positive.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.filter_size.is_finite() && self.filter_size > 0.0 {
      Ok(())
    } else {
      Err(ConfigError::InvalidFilterSize(self.filter_size))
    }
  }

  /// Partition key of `value`.
  ///
  /// Non-finite values saturate: NaN maps to `0`, infinities to the `i64`
  /// bounds.
  #[inline]
  pub fn filter(&self, value: f64) -> Result<i64, ConfigError> {
    self.validate()?;
    let upscaled = value * self.upscale;
    Ok((upscaled / self.filter_size).floor() as i64)
  }
}

impl Default for PartitionRule {
  fn default() -> Self {
    Self::new(1.0)
  }
}
