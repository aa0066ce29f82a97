//! Ordered group of point IOs owned by a node execution.

use std::sync::Arc;

use super::{InitMode, PointData, PointIO};
use crate::node::TaggedData;

#[derive(Debug, Default)]
pub struct PointIOGroup {
  ios: Vec<PointIO>,
}

impl PointIOGroup {
  pub fn new() -> Self {
    Self::default()
  }

  /// Wrap the node inputs that pass `validate`, keeping their input positions.
  pub fn from_inputs(
    inputs: &[Arc<PointData>],
    init: InitMode,
    mut validate: impl FnMut(&PointData) -> bool,
  ) -> Self {
    let ios = inputs
      .iter()
      .enumerate()
      .filter(|(_, data)| validate(data))
      .map(|(index, data)| PointIO::new(Arc::clone(data), init).with_index(index))
      .collect();
    Self { ios }
  }

  /// Add an IO sharing `source`'s input, with its own output.
  pub fn emplace(&mut self, source: &PointIO, init: InitMode) -> &mut PointIO {
    let io = PointIO::new(Arc::clone(source.input()), init).with_index(source.index());
    self.ios.push(io);
    let last = self.ios.len() - 1;
    &mut self.ios[last]
  }

  pub fn push(&mut self, io: PointIO) {
    self.ios.push(io);
  }

  pub fn len(&self) -> usize {
    self.ios.len()
  }

  pub fn is_empty(&self) -> bool {
    self.ios.is_empty()
  }

  pub fn get(&self, index: usize) -> Option<&PointIO> {
    self.ios.get(index)
  }

  pub fn get_mut(&mut self, index: usize) -> Option<&mut PointIO> {
    self.ios.get_mut(index)
  }

  pub fn iter(&self) -> impl Iterator<Item = &PointIO> {
    self.ios.iter()
  }

  pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut PointIO> {
    self.ios.iter_mut()
  }

  /// Shared input views, in group order.
  pub fn inputs(&self) -> Vec<Arc<PointData>> {
    self.ios.iter().map(|io| Arc::clone(io.input())).collect()
  }

  /// Move every output to `pin`. Returns the number of collections written.
  pub fn output_to(
    &mut self,
    outputs: &mut Vec<TaggedData>,
    pin: &str,
    skip_empty: bool,
  ) -> usize {
    let before = outputs.len();
    for io in &mut self.ios {
      let Some(data) = io.take_output() else {
        continue;
      };
      if skip_empty && data.is_empty() {
        continue;
      }
      outputs.push(TaggedData::new(pin, data));
    }
    outputs.len() - before
  }
}
