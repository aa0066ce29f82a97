//! Debug drawing of socket graphs.

use std::sync::Arc;

use glam::DVec3;
use tracing::{debug, warn};

use crate::config::ProcessorSettings;
use crate::constants::SOURCE_LABEL;
use crate::context::{AsyncState, ProcessingContext};
use crate::data::PointData;
use crate::error::ConfigError;
use crate::graph::{extract_edges, EdgeSet, SocketLayout};
use crate::node::PointsProcessor;

#[derive(Clone, Debug, PartialEq)]
pub struct LineStyle {
  /// RGBA.
  pub color: [u8; 4],
  pub thickness: f32,
  /// Seconds. Ignored when `persistent`.
  pub lifetime: f32,
  pub persistent: bool,
}

impl Default for LineStyle {
  fn default() -> Self {
    Self {
      color: [255, 0, 255, 255],
      thickness: 1.0,
      lifetime: -1.0,
      persistent: true,
    }
  }
}

/// Where debug lines go. Called from the driving thread only.
pub trait DebugDrawSink: Send + Sync {
  fn draw_line(&self, start: DVec3, end: DVec3, style: &LineStyle);
}

#[derive(Clone, Debug, PartialEq)]
pub struct DrawEdgesSettings {
  pub processing: ProcessorSettings,
  /// Nothing is drawn unless set.
  pub debug: bool,
  pub style: LineStyle,
}

impl Default for DrawEdgesSettings {
  fn default() -> Self {
    Self {
      processing: ProcessorSettings::default(),
      debug: true,
      style: LineStyle::default(),
    }
  }
}

#[derive(Default)]
pub struct DrawEdgesWorkload {
  pub sink: Option<Arc<dyn DebugDrawSink>>,
}

impl DrawEdgesWorkload {
  pub fn new(sink: Arc<dyn DebugDrawSink>) -> Self {
    Self { sink: Some(sink) }
  }
}

pub struct DrawEdges;

impl PointsProcessor for DrawEdges {
  const NAME: &'static str = "DrawEdges";

  type Settings = DrawEdgesSettings;
  type Workload = DrawEdgesWorkload;

  fn processor_settings(settings: &Self::Settings) -> &ProcessorSettings {
    &settings.processing
  }

  fn validate_input(_settings: &Self::Settings, data: &PointData) -> bool {
    if data.is_empty() {
      return false;
    }
    if SocketLayout::detect(data).is_empty() {
      warn!(node = Self::NAME, "input has no sockets, skipping");
      return false;
    }
    true
  }

  fn boot(ctx: &mut ProcessingContext<Self::Settings, Self::Workload>) -> Result<(), ConfigError> {
    if !ctx.settings.debug {
      ctx.done();
      return Ok(());
    }
    if ctx.main_points().is_empty() {
      return Err(ConfigError::MissingInput(SOURCE_LABEL));
    }
    if ctx.workload.sink.is_none() {
      return Err(ConfigError::MissingDebugSink);
    }
    Ok(())
  }

  fn execute(ctx: &mut ProcessingContext<Self::Settings, Self::Workload>) {
    if !ctx.is_state(AsyncState::ReadyForNextPoints) {
      return;
    }
    if !ctx.advance_points_io() {
      ctx.done();
      return;
    }
    let (Some(io), Some(sink)) = (ctx.current_io(), ctx.workload.sink.as_ref()) else {
      return;
    };

    let graph = io.input();
    let mut edges = EdgeSet::new();
    extract_edges(graph, &SocketLayout::detect(graph), &mut edges);

    let mut drawn = 0usize;
    for edge in edges.edges().iter().filter(|edge| edge.valid) {
      let (Some(start), Some(end)) = (
        graph.points.get(edge.start as usize),
        graph.points.get(edge.end as usize),
      ) else {
        continue;
      };
      sink.draw_line(start.position, end.position, &ctx.settings.style);
      drawn += 1;
    }
    debug!(node = Self::NAME, io = io.index(), drawn, "graph drawn");
  }
}

#[cfg(test)]
mod tests {
  use parking_lot::Mutex;

  use super::*;
  use crate::node::{GraphNode, Node, NodeInputs};
  use crate::test_utils::{run_node, socket_graph};

  #[derive(Default)]
  struct RecordingSink {
    lines: Mutex<Vec<(DVec3, DVec3)>>,
  }

  impl DebugDrawSink for RecordingSink {
    fn draw_line(&self, start: DVec3, end: DVec3, _style: &LineStyle) {
      self.lines.lock().push((start, end));
    }
  }

  fn graphs() -> NodeInputs {
    let (first, _) = socket_graph(3, &[(0, 1), (1, 0), (1, 2)]);
    let (second, _) = socket_graph(2, &[(1, 0)]);
    NodeInputs::new()
      .with(SOURCE_LABEL, first)
      .with(SOURCE_LABEL, second)
  }

  #[test]
  fn test_draws_unique_edges_of_every_graph() {
    let sink = Arc::new(RecordingSink::default());
    let mut node = Node::<DrawEdges>::new(
      DrawEdgesSettings::default(),
      DrawEdgesWorkload::new(sink.clone()),
      graphs(),
    );
    let outputs = run_node(&mut node);

    assert!(outputs.is_empty());
    assert_eq!(
      *sink.lines.lock(),
      vec![
        (DVec3::new(0.0, 0.0, 0.0), DVec3::new(1.0, 0.0, 0.0)),
        (DVec3::new(1.0, 0.0, 0.0), DVec3::new(2.0, 0.0, 0.0)),
        (DVec3::new(1.0, 0.0, 0.0), DVec3::new(0.0, 0.0, 0.0)),
      ]
    );
  }

  #[test]
  fn test_debug_disabled_is_a_no_op() {
    let sink = Arc::new(RecordingSink::default());
    let settings = DrawEdgesSettings {
      debug: false,
      ..Default::default()
    };
    let mut node = Node::<DrawEdges>::new(settings, DrawEdgesWorkload::new(sink.clone()), graphs());

    assert!(node.execute());
    assert!(sink.lines.lock().is_empty());
  }

  #[test]
  fn test_missing_sink_soft_fails() {
    let mut node = Node::<DrawEdges>::new(DrawEdgesSettings::default(), Default::default(), graphs());
    assert!(node.execute());
    assert!(node.take_outputs().is_empty());
  }
}
