//! Concurrent key -> partition map.
//!
//! Many workers distribute points at once. Partitions are created lazily
//! with a double-checked protocol:
//!
//! 1. read-lock the map and look the key up
//! 2. on a miss, write-lock the map, look again, create if still absent
//! 3. release the map lock, then write-lock only the partition to append
//!
//! The map lock is never held while a point is appended, so workers hitting
//! different partitions only contend on the (short) lookups.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};
use tracing::warn;

use crate::data::PointData;
use crate::types::{AttributeValue, Point};

/// Points sharing one partition key.
#[derive(Debug)]
pub struct Partition {
  key: i64,
  data: RwLock<PointData>,
}

impl Partition {
  fn new(key: i64, schema_source: &PointData, key_attribute: Option<&str>) -> Self {
    let mut data = schema_source.empty_like();
    if let Some(name) = key_attribute {
      data
        .metadata
        .create_attribute(name, AttributeValue::Int64(0));
    }
    Self {
      key,
      data: RwLock::new(data),
    }
  }

  pub fn key(&self) -> i64 {
    self.key
  }

  pub fn len(&self) -> usize {
    self.data.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.data.read().is_empty()
  }

  pub fn read(&self) -> RwLockReadGuard<'_, PointData> {
    self.data.read()
  }

  fn into_data(self) -> PointData {
    self.data.into_inner()
  }
}

/// Shared partition map, optionally tagging points with their key.
#[derive(Debug, Default)]
pub struct Partitions {
  map: RwLock<HashMap<i64, Arc<Partition>>>,
  key_attribute: Option<String>,
}

impl Partitions {
  /// `key_attribute`: Int64 attribute receiving each point's key.
  pub fn new(key_attribute: Option<String>) -> Self {
    Self {
      map: RwLock::default(),
      key_attribute,
    }
  }

  pub fn len(&self) -> usize {
    self.map.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.map.read().is_empty()
  }

  pub fn get(&self, key: i64) -> Option<Arc<Partition>> {
    self.map.read().get(&key).cloned()
  }

  /// Append a copy of `point` (read from `source`) to partition `key`.
  ///
  /// The copy gets a fresh metadata entry holding the source values.
  pub fn distribute_point(&self, source: &PointData, point: &Point, key: i64) {
    let partition = self.find_or_create(key, source);

    let mut data = partition.data.write();
    let entry = data
      .metadata
      .copy_entry_from(&source.metadata, point.metadata_entry);
    if let Some(name) = &self.key_attribute {
      if let Err(err) = data.metadata.set_value(name, entry, key) {
        warn!(%err, key, "failed to tag partition key");
      }
    }
    data.points.push(Point::with_entry(point.position, entry));
  }

  /// Double-checked lazy creation. Returns with no lock held.
  fn find_or_create(&self, key: i64, source: &PointData) -> Arc<Partition> {
    let existing = self.map.read().get(&key).cloned();
    if let Some(partition) = existing {
      return partition;
    }

    let mut map = self.map.write();
    let partition = map.entry(key).or_insert_with(|| {
      Arc::new(Partition::new(key, source, self.key_attribute.as_deref()))
    });
    Arc::clone(partition)
  }

  /// Partition keys in ascending order.
  pub fn keys(&self) -> Vec<i64> {
    let mut keys: Vec<_> = self.map.read().keys().copied().collect();
    keys.sort_unstable();
    keys
  }

  /// Consume the map, yielding partitions ordered by key.
  pub fn into_sorted(self) -> Vec<(i64, PointData)> {
    self.drain_sorted()
  }

  /// Empty the map, yielding its partitions ordered by key.
  pub fn drain_sorted(&self) -> Vec<(i64, PointData)> {
    let map = std::mem::take(&mut *self.map.write());
    let mut partitions: Vec<_> = map
      .into_iter()
      .map(|(key, partition)| {
        let data = Arc::try_unwrap(partition)
          .map(Partition::into_data)
          .unwrap_or_else(|shared| shared.read().clone());
        (key, data)
      })
      .collect();
    partitions.sort_unstable_by_key(|(key, _)| *key);
    partitions
  }
}

#[cfg(test)]
#[path = "partitions_test.rs"]
mod partitions_test;
