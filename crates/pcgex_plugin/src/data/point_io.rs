//! Point collections and their input/output views.

use std::sync::Arc;

use glam::DVec3;

use super::Metadata;
use crate::types::Point;

/// An ordered point sequence plus the metadata its handles point into.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointData {
  pub points: Vec<Point>,
  pub metadata: Metadata,
}

impl PointData {
  pub fn new() -> Self {
    Self::default()
  }

  /// Points without metadata entries.
  pub fn from_positions(positions: impl IntoIterator<Item = DVec3>) -> Self {
    Self {
      points: positions.into_iter().map(Point::new).collect(),
      metadata: Metadata::new(),
    }
  }

  /// Empty collection that declares the same attributes as `self`.
  pub fn empty_like(&self) -> Self {
    let mut metadata = Metadata::new();
    metadata.inherit_schema(&self.metadata);
    Self {
      points: Vec::new(),
      metadata,
    }
  }

  /// Append a point with a freshly allocated entry, returning its index.
  pub fn add_point(&mut self, position: DVec3) -> usize {
    let entry = self.metadata.add_entry();
    self.points.push(Point::with_entry(position, entry));
    self.points.len() - 1
  }

  pub fn len(&self) -> usize {
    self.points.len()
  }

  pub fn is_empty(&self) -> bool {
    self.points.is_empty()
  }
}

/// How a node allocates the output side of a collection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InitMode {
  /// No output; the node writes derived collections elsewhere.
  #[default]
  NoOutput,
  /// Empty output declaring the input's attributes.
  NewOutput,
  /// Output starts as a full copy of the input.
  DuplicateInput,
}

/// Read-only input view plus an optional mutable output.
///
/// The input is shared so background tasks can hold it past the tick that
/// dispatched them.
#[derive(Debug)]
pub struct PointIO {
  input: Arc<PointData>,
  output: Option<PointData>,
  index: usize,
}

impl PointIO {
  pub fn new(input: Arc<PointData>, init: InitMode) -> Self {
    let mut io = Self {
      input,
      output: None,
      index: 0,
    };
    io.init_output(init);
    io
  }

  /// Tag this IO with the position of its source in the node's inputs.
  pub fn with_index(mut self, index: usize) -> Self {
    self.index = index;
    self
  }

  /// Position of the source collection in the node's inputs.
  pub fn index(&self) -> usize {
    self.index
  }

  /// Number of input points.
  pub fn num(&self) -> usize {
    self.input.len()
  }

  pub fn input(&self) -> &Arc<PointData> {
    &self.input
  }

  /// Input point at `index`. Panics when out of range.
  pub fn in_point(&self, index: usize) -> &Point {
    &self.input.points[index]
  }

  pub fn try_in_point(&self, index: usize) -> Option<&Point> {
    self.input.points.get(index)
  }

  /// (Re)allocate the output according to `init`.
  pub fn init_output(&mut self, init: InitMode) {
    self.output = match init {
      InitMode::NoOutput => None,
      InitMode::NewOutput => Some(self.input.empty_like()),
      InitMode::DuplicateInput => Some((*self.input).clone()),
    };
  }

  pub fn output(&self) -> Option<&PointData> {
    self.output.as_ref()
  }

  pub fn output_mut(&mut self) -> Option<&mut PointData> {
    self.output.as_mut()
  }

  pub fn take_output(&mut self) -> Option<PointData> {
    self.output.take()
  }
}

#[cfg(test)]
#[path = "point_io_test.rs"]
mod point_io_test;
