//! Core value types: points and attribute values.

use glam::DVec3;

use crate::constants::INVALID_ENTRY;

/// A point: a position plus an opaque handle into its collection's metadata.
///
/// The handle is only meaningful for the [`Metadata`](crate::data::Metadata)
/// store of the collection the point lives in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
  /// World-space position.
  pub position: DVec3,
  /// Metadata entry key, [`INVALID_ENTRY`] when no entry was allocated.
  pub metadata_entry: i64,
}

impl Point {
  /// Point without metadata.
  pub fn new(position: DVec3) -> Self {
    Self {
      position,
      metadata_entry: INVALID_ENTRY,
    }
  }

  /// Point bound to an existing metadata entry.
  pub fn with_entry(position: DVec3, metadata_entry: i64) -> Self {
    Self {
      position,
      metadata_entry,
    }
  }

  /// True when the point has a metadata entry.
  #[inline]
  pub fn has_entry(&self) -> bool {
    self.metadata_entry != INVALID_ENTRY
  }
}

impl Default for Point {
  fn default() -> Self {
    Self::new(DVec3::ZERO)
  }
}

/// Storage type of an attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttributeType {
  Bool,
  Int64,
  Double,
  Vector,
  String,
}

/// A single attribute value.
#[derive(Clone, Debug, PartialEq)]
pub enum AttributeValue {
  Bool(bool),
  Int64(i64),
  Double(f64),
  Vector(DVec3),
  String(String),
}

impl AttributeValue {
  /// Zero value of the given type.
  pub fn zero(value_type: AttributeType) -> Self {
    match value_type {
      AttributeType::Bool => Self::Bool(false),
      AttributeType::Int64 => Self::Int64(0),
      AttributeType::Double => Self::Double(0.0),
      AttributeType::Vector => Self::Vector(DVec3::ZERO),
      AttributeType::String => Self::String(String::new()),
    }
  }

  pub fn value_type(&self) -> AttributeType {
    match self {
      Self::Bool(_) => AttributeType::Bool,
      Self::Int64(_) => AttributeType::Int64,
      Self::Double(_) => AttributeType::Double,
      Self::Vector(_) => AttributeType::Vector,
      Self::String(_) => AttributeType::String,
    }
  }

  /// Scalar view used by value selectors. Vectors and strings have none.
  pub fn as_f64(&self) -> Option<f64> {
    match self {
      Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
      Self::Int64(i) => Some(*i as f64),
      Self::Double(d) => Some(*d),
      Self::Vector(_) | Self::String(_) => None,
    }
  }

  pub fn as_i64(&self) -> Option<i64> {
    match self {
      Self::Int64(i) => Some(*i),
      _ => None,
    }
  }

  /// True for types [`as_f64`](Self::as_f64) can read.
  pub fn is_numeric(&self) -> bool {
    self.as_f64().is_some()
  }
}

impl From<bool> for AttributeValue {
  fn from(value: bool) -> Self {
    Self::Bool(value)
  }
}

impl From<i64> for AttributeValue {
  fn from(value: i64) -> Self {
    Self::Int64(value)
  }
}

impl From<f64> for AttributeValue {
  fn from(value: f64) -> Self {
    Self::Double(value)
  }
}

impl From<DVec3> for AttributeValue {
  fn from(value: DVec3) -> Self {
    Self::Vector(value)
  }
}

impl From<&str> for AttributeValue {
  fn from(value: &str) -> Self {
    Self::String(value.to_owned())
  }
}

impl From<String> for AttributeValue {
  fn from(value: String) -> Self {
    Self::String(value)
  }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
