use super::*;
use crate::constants::CACHED_INDEX_ATTRIBUTE;
use crate::node::{Node, NodeInputs, TaggedData};
use crate::test_utils::{line_points, run_node, socket_graph};

fn run(processing: ProcessorSettings, inputs: NodeInputs) -> Vec<TaggedData> {
  let settings = ConsolidateGraphSettings { processing };
  let mut node = Node::<ConsolidateGraph>::new(settings, Default::default(), inputs);
  run_node(&mut node)
}

/// First socket of every point.
fn first_links(data: &PointData, layout: &SocketLayout) -> Vec<Option<u32>> {
  (0..data.len())
    .map(|index| layout.neighbor(data, index, 0))
    .collect()
}

fn cached(data: &PointData) -> Vec<Option<u32>> {
  (0..data.len()).map(|index| cached_index(data, index)).collect()
}

fn ring() -> (PointData, SocketLayout) {
  socket_graph(4, &[(0, 1), (1, 2), (2, 3), (3, 0)])
}

#[test]
fn test_removed_point_clears_links() {
  let (mut graph, layout) = ring();
  graph.points.remove(1);

  let inputs = NodeInputs::new().with(SOURCE_LABEL, graph);
  let outputs = run(ProcessorSettings::synchronous(), inputs);

  assert_eq!(outputs.len(), 1);
  let out = &outputs[0].data;
  assert_eq!(out.len(), 3);
  // old 0 -> 1 is gone, old 2 -> 3 becomes 1 -> 2, old 3 -> 0 becomes 2 -> 0
  assert_eq!(first_links(out, &layout), vec![None, Some(2), Some(0)]);
  assert_eq!(cached(out), vec![Some(0), Some(1), Some(2)]);
}

#[test]
fn test_reordered_points_follow_their_neighbors() {
  let (mut graph, layout) = socket_graph(3, &[(0, 1), (1, 2)]);
  graph.points.reverse();

  let outputs = run(
    ProcessorSettings::default(),
    NodeInputs::new().with(SOURCE_LABEL, graph),
  );

  let out = &outputs[0].data;
  // new order: old 2, old 1, old 0
  assert_eq!(first_links(out, &layout), vec![None, Some(0), Some(1)]);
}

#[test]
fn test_untouched_graph_is_stable() {
  let (graph, _) = socket_graph(16, &[(0, 5), (5, 9), (9, 15), (3, 4), (4, 3)]);
  let processing = ProcessorSettings {
    do_async_processing: true,
    chunk_size: 3,
    worker_threads: 2,
  };
  let outputs = run(processing, NodeInputs::new().with(SOURCE_LABEL, graph.clone()));

  assert_eq!(outputs.len(), 1);
  assert_eq!(outputs[0].data, graph);
}

#[test]
fn test_point_without_cached_index_loses_links() {
  let (mut graph, layout) = socket_graph(3, &[(0, 1), (1, 2)]);
  let entry = graph.points[1].metadata_entry;
  graph
    .metadata
    .set_value(CACHED_INDEX_ATTRIBUTE, entry, -1i64)
    .unwrap();

  let outputs = run(
    ProcessorSettings::synchronous(),
    NodeInputs::new().with(SOURCE_LABEL, graph),
  );

  let out = &outputs[0].data;
  // point 1 left the old index space, so nothing can reach it either
  assert_eq!(first_links(out, &layout), vec![None, None, None]);
  assert_eq!(cached(out), vec![Some(0), Some(1), Some(2)]);
}

#[test]
fn test_huge_cached_index_is_remapped_sparsely() {
  let (mut graph, layout) = socket_graph(3, &[(0, 1), (1, 2)]);
  let entry = graph.points[2].metadata_entry;
  graph
    .metadata
    .set_value(CACHED_INDEX_ATTRIBUTE, entry, i64::from(u32::MAX))
    .unwrap();

  let outputs = run(
    ProcessorSettings::synchronous(),
    NodeInputs::new().with(SOURCE_LABEL, graph),
  );

  let out = &outputs[0].data;
  // nothing claims old index 2 anymore, so 1 -> 2 is dropped
  assert_eq!(first_links(out, &layout), vec![Some(1), None, None]);
  assert_eq!(cached(out), vec![Some(0), Some(1), Some(2)]);
}

#[test]
fn test_inputs_without_sockets_are_skipped() {
  let outputs = run(
    ProcessorSettings::default(),
    NodeInputs::new().with(SOURCE_LABEL, line_points(3)),
  );
  assert!(outputs.is_empty());
}
