//! Graphs encoded on point collections.
//!
//! Each socket is an `Int64` attribute named `PCGEx/Socket/<name>` holding
//! the index of the neighbor point in the same collection, or `-1`. A second
//! `Int64` attribute, `PCGEx/CachedIndex`, records every point's index at the
//! time the graph was built, so links can be repaired after points are
//! removed or reordered.

use smallvec::SmallVec;
use tracing::warn;

use super::dedup::EdgeSet;
use crate::constants::{CACHED_INDEX_ATTRIBUTE, NO_NEIGHBOR, SOCKET_ATTRIBUTE_PREFIX};
use crate::data::PointData;
use crate::error::MetadataError;
use crate::types::{AttributeType, AttributeValue};

/// The sockets of a graph, by attribute name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SocketLayout {
  attributes: SmallVec<[String; 8]>,
}

impl SocketLayout {
  pub fn new<I, N>(socket_names: I) -> Self
  where
    I: IntoIterator<Item = N>,
    N: AsRef<str>,
  {
    Self {
      attributes: socket_names
        .into_iter()
        .map(|name| Self::attribute_name(name.as_ref()))
        .collect(),
    }
  }

  /// Sockets already present on `data`, in attribute-name order.
  pub fn detect(data: &PointData) -> Self {
    let attributes = data
      .metadata
      .attribute_names()
      .filter(|name| name.starts_with(SOCKET_ATTRIBUTE_PREFIX))
      .filter(|name| data.metadata.attribute_type(name) == Some(AttributeType::Int64))
      .map(str::to_owned)
      .collect();
    Self { attributes }
  }

  pub fn attribute_name(socket: &str) -> String {
    format!("{SOCKET_ATTRIBUTE_PREFIX}{socket}")
  }

  pub fn len(&self) -> usize {
    self.attributes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.attributes.is_empty()
  }

  pub fn attributes(&self) -> impl Iterator<Item = &str> {
    self.attributes.iter().map(String::as_str)
  }

  /// Declare socket attributes on `data`, give every point an entry, and
  /// record the cached indices. Existing links are cleared.
  pub fn install(&self, data: &mut PointData) {
    for attribute in &self.attributes {
      data
        .metadata
        .create_attribute(attribute, AttributeValue::Int64(NO_NEIGHBOR));
    }
    write_cached_indices(data);
  }

  /// Neighbor of point `index` through `socket`. `None` for `-1`, negative
  /// values, or a missing point.
  pub fn neighbor(&self, data: &PointData, index: usize, socket: usize) -> Option<u32> {
    let point = data.points.get(index)?;
    let attribute = self.attributes.get(socket)?;
    let value = data.metadata.value(attribute, point.metadata_entry)?.as_i64()?;
    u32::try_from(value).ok()
  }

  pub fn set_neighbor(
    &self,
    data: &mut PointData,
    index: usize,
    socket: usize,
    neighbor: Option<u32>,
  ) -> Result<(), MetadataError> {
    let attribute = self
      .attributes
      .get(socket)
      .ok_or_else(|| MetadataError::UnknownAttribute(format!("socket #{socket}")))?;
    let entry = data
      .points
      .get(index)
      .map(|point| point.metadata_entry)
      .ok_or(MetadataError::UnknownPoint(index))?;
    let value = neighbor.map_or(NO_NEIGHBOR, i64::from);
    data.metadata.set_value(attribute, entry, value)
  }

  /// Call `link(index, neighbor)` for every usable link of point `index`.
  ///
  /// Links to `-1`, to indices past the end of the collection, and to the
  /// point itself are skipped.
  pub fn for_each_link(&self, data: &PointData, index: usize, mut link: impl FnMut(u32, u32)) {
    let count = data.len();
    for socket in 0..self.attributes.len() {
      let Some(neighbor) = self.neighbor(data, index, socket) else {
        continue;
      };
      if neighbor as usize >= count || neighbor as usize == index {
        continue;
      }
      link(index as u32, neighbor);
    }
  }
}

/// `PCGEx/CachedIndex` of point `index`, when recorded.
pub fn cached_index(data: &PointData, index: usize) -> Option<u32> {
  let point = data.points.get(index)?;
  let value = data
    .metadata
    .value(CACHED_INDEX_ATTRIBUTE, point.metadata_entry)?
    .as_i64()?;
  u32::try_from(value).ok()
}

/// Record every point's current index as its cached index, allocating
/// entries where missing.
pub fn write_cached_indices(data: &mut PointData) {
  let PointData { points, metadata } = data;
  metadata.create_attribute(CACHED_INDEX_ATTRIBUTE, AttributeValue::Int64(NO_NEIGHBOR));
  for (index, point) in points.iter_mut().enumerate() {
    metadata.ensure_entry(point);
    if let Err(err) = metadata.set_value(CACHED_INDEX_ATTRIBUTE, point.metadata_entry, index as i64)
    {
      warn!(%err, index, "failed to cache point index");
    }
  }
}

/// Collect the unique edges of a socket graph into `edges`.
/// Returns the number of edges added.
pub fn extract_edges(data: &PointData, layout: &SocketLayout, edges: &mut EdgeSet) -> usize {
  let before = edges.len();
  for index in 0..data.len() {
    layout.for_each_link(data, index, |a, b| {
      edges.insert(a, b);
    });
  }
  edges.len() - before
}

#[cfg(test)]
#[path = "sockets_test.rs"]
mod sockets_test;
