//! Where a point's partition value is read from.

use crate::data::PointData;
use crate::error::ConfigError;
use crate::types::Point;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValueSelector {
  /// Numeric attribute (`Bool`, `Int64` or `Double`).
  Attribute(String),
  PositionX,
  PositionY,
  PositionZ,
}

impl ValueSelector {
  /// Check that every point of `data` can be read.
  pub fn validate(&self, data: &PointData) -> Result<(), ConfigError> {
    match self {
      Self::Attribute(name) => match data.metadata.attribute(name) {
        Some(attribute) if attribute.default_value().is_numeric() => Ok(()),
        _ => Err(ConfigError::MissingAttribute(name.clone())),
      },
      Self::PositionX | Self::PositionY | Self::PositionZ => Ok(()),
    }
  }

  /// Selected value of `point`, `None` when it cannot be read as a number.
  #[inline]
  pub fn read(&self, data: &PointData, point: &Point) -> Option<f64> {
    match self {
      Self::Attribute(name) => data
        .metadata
        .value(name, point.metadata_entry)
        .and_then(|value| value.as_f64()),
      Self::PositionX => Some(point.position.x),
      Self::PositionY => Some(point.position.y),
      Self::PositionZ => Some(point.position.z),
    }
  }
}
