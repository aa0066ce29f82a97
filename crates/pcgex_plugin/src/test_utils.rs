//! Shared test fixtures.

use glam::DVec3;

use crate::data::PointData;
use crate::graph::SocketLayout;
use crate::types::AttributeValue;

/// Points spaced one unit apart along +X, each with a metadata entry.
pub fn line_points(count: usize) -> PointData {
  let mut data = PointData::new();
  for i in 0..count {
    data.add_point(DVec3::new(i as f64, 0.0, 0.0));
  }
  data
}

/// Points along +X whose `name` attribute holds `values[i]`.
pub fn valued_points(name: &str, values: &[f64]) -> PointData {
  let mut data = line_points(values.len());
  data.metadata.create_attribute(name, AttributeValue::Double(0.0));
  for (point, &value) in data.points.iter().zip(values) {
    data
      .metadata
      .set_value(name, point.metadata_entry, value)
      .unwrap();
  }
  data
}

/// Socket graph over `count` line points. Each link `(a, b)` fills the next
/// free socket of `a`; sockets are named `S0`, `S1`, ...
pub fn socket_graph(count: usize, links: &[(u32, u32)]) -> (PointData, SocketLayout) {
  let mut degree = vec![0usize; count];
  for &(a, _) in links {
    degree[a as usize] += 1;
  }
  let max_degree = degree.iter().copied().max().unwrap_or(0).max(1);
  let layout = SocketLayout::new((0..max_degree).map(|i| format!("S{i}")));

  let mut data = line_points(count);
  layout.install(&mut data);

  let mut next_socket = vec![0usize; count];
  for &(a, b) in links {
    let socket = next_socket[a as usize];
    next_socket[a as usize] += 1;
    layout
      .set_neighbor(&mut data, a as usize, socket, Some(b))
      .unwrap();
  }
  (data, layout)
}

/// Tick `node` until done, panicking if it takes unreasonably long.
pub fn run_node(node: &mut dyn crate::node::GraphNode) -> Vec<crate::node::TaggedData> {
  let ticks = crate::node::run_to_completion(node, 1_000_000);
  assert!(ticks.is_some(), "node {} did not finish", node.name());
  node.take_outputs()
}
