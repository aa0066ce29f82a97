//! Promote the unique edges of socket graphs to points.
//!
//! Each main input is a graph encoded with sockets. Its links are gathered
//! into a [`SharedEdgeSet`] by a chunked loop, then every unique edge
//! becomes one point on `Edges`: placed at the edge midpoint, carrying the
//! endpoint indices in `EdgeStart` / `EdgeEnd`.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::ProcessorSettings;
use crate::constants::{
  EDGE_END_ATTRIBUTE, EDGE_START_ATTRIBUTE, OUTPUT_EDGES_LABEL, SOURCE_LABEL,
};
use crate::context::{AsyncState, ProcessingContext};
use crate::data::PointData;
use crate::error::ConfigError;
use crate::graph::{unpack_edge_key, EdgeSet, SharedEdgeSet, SocketLayout};
use crate::loops::LoopSource;
use crate::node::PointsProcessor;
use crate::types::AttributeValue;

const STATE_PROMOTING_EDGES: AsyncState = AsyncState::Custom("PromoteEdges");

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PromoteEdgesSettings {
  pub processing: ProcessorSettings,
}

#[derive(Debug, Default)]
pub struct PromoteEdgesWorkload {
  layout: Arc<SocketLayout>,
  edges: Arc<SharedEdgeSet>,
}

pub struct PromoteEdges;

impl PointsProcessor for PromoteEdges {
  const NAME: &'static str = "PromoteEdges";

  type Settings = PromoteEdgesSettings;
  type Workload = PromoteEdgesWorkload;

  fn main_output_pin() -> &'static str {
    OUTPUT_EDGES_LABEL
  }

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
    if ctx.main_points().is_empty() {
      return Err(ConfigError::MissingInput(SOURCE_LABEL));
    }
    Ok(())
  }

  fn execute(ctx: &mut ProcessingContext<Self::Settings, Self::Workload>) {
    if ctx.is_state(AsyncState::ReadyForNextPoints) {
      if !ctx.advance_points_io() {
        ctx.done();
        return;
      }
      if let Some(io) = ctx.current_io() {
        let layout = SocketLayout::detect(io.input());
        ctx.workload.layout = Arc::new(layout);
        ctx.workload.edges = Arc::new(SharedEdgeSet::new());
      }
      ctx.set_state(AsyncState::ProcessingPoints);
    }

    if ctx.is_state(AsyncState::ProcessingPoints) {
      let layout = Arc::clone(&ctx.workload.layout);
      let edges = Arc::clone(&ctx.workload.edges);
      let body = move |index: usize, source: &LoopSource| {
        layout.for_each_link(&source.data, index, |a, b| {
          edges.insert(a, b);
        });
      };
      if ctx.process_current_points(None, body, false) {
        ctx.start_async_wait(STATE_PROMOTING_EDGES);
      }
      return;
    }

    if ctx.is_state(STATE_PROMOTING_EDGES) {
      let mut edges = ctx.workload.edges.take();
      edges.sort_by_key();
      if let Some(io) = ctx.current_io() {
        let promoted = promote(io.input(), &edges);
        debug!(node = Self::NAME, io = io.index(), edges = promoted.len(), "edges promoted");
        if !promoted.is_empty() {
          ctx.push_output(OUTPUT_EDGES_LABEL, promoted);
        }
      }
      ctx.set_state(AsyncState::ReadyForNextPoints);
    }
  }
}

/// One midpoint per edge, tagged with its endpoint indices (smaller first).
pub fn promote(graph: &PointData, edges: &EdgeSet) -> PointData {
  let mut out = PointData::new();
  out
    .metadata
    .create_attribute(EDGE_START_ATTRIBUTE, AttributeValue::Int64(-1));
  out
    .metadata
    .create_attribute(EDGE_END_ATTRIBUTE, AttributeValue::Int64(-1));

  for edge in edges.edges().iter().filter(|edge| edge.valid) {
    let (start, end) = unpack_edge_key(edge.key());
    let (Some(a), Some(b)) = (
      graph.points.get(start as usize),
      graph.points.get(end as usize),
    ) else {
      continue;
    };
    let index = out.add_point(a.position.lerp(b.position, 0.5));
    let entry = out.points[index].metadata_entry;
    let written = out
      .metadata
      .set_value(EDGE_START_ATTRIBUTE, entry, i64::from(start))
      .and_then(|()| {
        out
          .metadata
          .set_value(EDGE_END_ATTRIBUTE, entry, i64::from(end))
      });
    if let Err(err) = written {
      warn!(%err, "failed to tag promoted edge");
    }
  }
  out
}

#[cfg(test)]
#[path = "promote_edges_test.rs"]
mod promote_edges_test;
