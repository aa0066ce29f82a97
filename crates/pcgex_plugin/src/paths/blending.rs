//! Metadata blending along a generated path.
//!
//! Blenders rewrite the metadata of a path's points from its endpoints. They
//! never move points.

use super::PathMetrics;
use crate::data::PointData;

pub trait SubPointsBlending: Send + Sync {
  /// Blend every point of `path`. The first point is the path start, the
  /// last point the path end.
  fn blend_sub_points(&self, path: &mut PointData, metrics: &PathMetrics);
}

/// Leaves metadata untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoBlending;

impl SubPointsBlending for NoBlending {
  fn blend_sub_points(&self, _path: &mut PointData, _metrics: &PathMetrics) {}
}

/// Every point takes the start point's values.
#[derive(Clone, Copy, Debug, Default)]
pub struct InheritStart;

impl SubPointsBlending for InheritStart {
  fn blend_sub_points(&self, path: &mut PointData, _metrics: &PathMetrics) {
    if let Some(first) = path.points.first().copied() {
      inherit_from(path, first.metadata_entry);
    }
  }
}

/// Every point takes the end point's values.
#[derive(Clone, Copy, Debug, Default)]
pub struct InheritEnd;

impl SubPointsBlending for InheritEnd {
  fn blend_sub_points(&self, path: &mut PointData, _metrics: &PathMetrics) {
    if let Some(last) = path.points.last().copied() {
      inherit_from(path, last.metadata_entry);
    }
  }
}

fn inherit_from(path: &mut PointData, source_entry: i64) {
  let PointData { points, metadata } = path;
  for point in points.iter_mut() {
    metadata.ensure_entry(point);
    metadata.copy_entry(source_entry, point.metadata_entry);
  }
}

#[cfg(test)]
mod tests {
  use glam::DVec3;

  use super::*;
  use crate::test_utils::valued_points;
  use crate::types::AttributeValue;

  fn values(path: &PointData) -> Vec<f64> {
    path
      .points
      .iter()
      .filter_map(|point| path.metadata.value("W", point.metadata_entry))
      .filter_map(AttributeValue::as_f64)
      .collect()
  }

  #[test]
  fn test_inherit_start() {
    let mut path = valued_points("W", &[1.0, 2.0, 3.0]);
    let positions: Vec<DVec3> = path.points.iter().map(|p| p.position).collect();
    InheritStart.blend_sub_points(&mut path, &PathMetrics::default());

    assert_eq!(values(&path), vec![1.0, 1.0, 1.0]);
    let after: Vec<DVec3> = path.points.iter().map(|p| p.position).collect();
    assert_eq!(after, positions);
  }

  #[test]
  fn test_inherit_end() {
    let mut path = valued_points("W", &[1.0, 2.0, 3.0]);
    InheritEnd.blend_sub_points(&mut path, &PathMetrics::default());
    assert_eq!(values(&path), vec![3.0, 3.0, 3.0]);
  }

  #[test]
  fn test_no_blending() {
    let mut path = valued_points("W", &[1.0, 2.0]);
    NoBlending.blend_sub_points(&mut path, &PathMetrics::default());
    assert_eq!(values(&path), vec![1.0, 2.0]);
  }

  #[test]
  fn test_empty_path() {
    let mut path = PointData::new();
    InheritStart.blend_sub_points(&mut path, &PathMetrics::default());
    InheritEnd.blend_sub_points(&mut path, &PathMetrics::default());
    assert!(path.is_empty());
  }
}
