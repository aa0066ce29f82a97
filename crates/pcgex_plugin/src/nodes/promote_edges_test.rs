use glam::DVec3;

use super::*;
use crate::node::{Node, NodeInputs, TaggedData};
use crate::test_utils::{line_points, run_node, socket_graph};

fn run(processing: ProcessorSettings, inputs: NodeInputs) -> Vec<TaggedData> {
  let settings = PromoteEdgesSettings { processing };
  let mut node = Node::<PromoteEdges>::new(settings, Default::default(), inputs);
  run_node(&mut node)
}

fn endpoints(data: &PointData) -> Vec<(i64, i64)> {
  data
    .points
    .iter()
    .map(|point| {
      let read = |name| {
        data
          .metadata
          .value(name, point.metadata_entry)
          .and_then(AttributeValue::as_i64)
          .unwrap()
      };
      (read(EDGE_START_ATTRIBUTE), read(EDGE_END_ATTRIBUTE))
    })
    .collect()
}

#[test]
fn test_unique_edges_become_midpoints() {
  let (graph, _) = socket_graph(5, &[(1, 2), (2, 1), (3, 4), (0, 1)]);
  let inputs = NodeInputs::new().with(SOURCE_LABEL, graph);
  let outputs = run(ProcessorSettings::synchronous(), inputs);

  assert_eq!(outputs.len(), 1);
  assert_eq!(outputs[0].pin, OUTPUT_EDGES_LABEL);

  let edges = &outputs[0].data;
  assert_eq!(endpoints(edges), vec![(0, 1), (1, 2), (3, 4)]);
  let positions: Vec<_> = edges.points.iter().map(|point| point.position).collect();
  assert_eq!(
    positions,
    vec![
      DVec3::new(0.5, 0.0, 0.0),
      DVec3::new(1.5, 0.0, 0.0),
      DVec3::new(3.5, 0.0, 0.0),
    ]
  );
}

#[test]
fn test_async_matches_sync() {
  let links: Vec<(u32, u32)> = (0..63).flat_map(|i| [(i, i + 1), (i + 1, i)]).collect();
  let (graph, _) = socket_graph(64, &links);

  let sync = run(
    ProcessorSettings::synchronous(),
    NodeInputs::new().with(SOURCE_LABEL, graph.clone()),
  );
  let parallel = run(
    ProcessorSettings {
      do_async_processing: true,
      chunk_size: 7,
      worker_threads: 4,
    },
    NodeInputs::new().with(SOURCE_LABEL, graph),
  );

  assert_eq!(sync, parallel);
  assert_eq!(parallel[0].data.len(), 63);
}

#[test]
fn test_one_output_per_graph() {
  let (first, _) = socket_graph(3, &[(0, 1)]);
  let (second, _) = socket_graph(3, &[(0, 2), (2, 1)]);
  let (isolated, _) = socket_graph(2, &[]);
  let inputs = NodeInputs::new()
    .with(SOURCE_LABEL, first)
    .with(SOURCE_LABEL, isolated)
    .with(SOURCE_LABEL, second);
  let outputs = run(ProcessorSettings::default(), inputs);

  assert_eq!(outputs.len(), 2);
  assert_eq!(endpoints(&outputs[0].data), vec![(0, 1)]);
  assert_eq!(endpoints(&outputs[1].data), vec![(0, 2), (1, 2)]);
}

#[test]
fn test_points_without_sockets_are_skipped() {
  let inputs = NodeInputs::new().with(SOURCE_LABEL, line_points(4));
  assert!(run(ProcessorSettings::default(), inputs).is_empty());
}
