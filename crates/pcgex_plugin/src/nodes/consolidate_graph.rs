//! Repair socket links after points were removed or reordered.
//!
//! Socket values and `PCGEx/CachedIndex` still describe the collection as it
//! was when the graph was built. For each input, the cached indices give the
//! old -> new [`IndexRemap`]; every link is rewritten through it, links to
//! vanished points are cleared to `-1`, and the cached indices are refreshed.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::config::ProcessorSettings;
use crate::constants::SOURCE_LABEL;
use crate::context::{AsyncState, ProcessingContext};
use crate::data::{InitMode, PointData};
use crate::error::ConfigError;
use crate::graph::{
  cached_index, consolidate_edges, write_cached_indices, IndexRemap, IndexedEdge, SocketLayout,
};
use crate::loops::LoopSource;
use crate::node::PointsProcessor;

const STATE_CONSOLIDATING: AsyncState = AsyncState::Custom("Consolidating");

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConsolidateGraphSettings {
  pub processing: ProcessorSettings,
}

/// A socket link in the pre-consolidation index space.
#[derive(Clone, Copy, Debug)]
struct SocketLink {
  point: u32,
  socket: usize,
  edge: IndexedEdge,
}

#[derive(Debug, Default)]
pub struct ConsolidateGraphWorkload {
  layout: Arc<SocketLayout>,
  remap: Arc<IndexRemap>,
  links: Arc<Mutex<Vec<SocketLink>>>,
}

pub struct ConsolidateGraph;

impl PointsProcessor for ConsolidateGraph {
  const NAME: &'static str = "ConsolidateGraph";

  type Settings = ConsolidateGraphSettings;
  type Workload = ConsolidateGraphWorkload;

  fn main_output_init_mode() -> InitMode {
    InitMode::DuplicateInput
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
        ctx.output_main_points();
        ctx.done();
        return;
      }
      if let Some(input) = ctx.current_io().map(|io| Arc::clone(io.input())) {
        let remap = IndexRemap::from_pairs(
          (0..input.len())
            .filter_map(|index| cached_index(&input, index).map(|old| (old, index as u32))),
        );
        ctx.workload.layout = Arc::new(SocketLayout::detect(&input));
        ctx.workload.remap = Arc::new(remap);
        ctx.workload.links = Arc::default();
      }
      ctx.set_state(AsyncState::ProcessingPoints);
    }

    if ctx.is_state(AsyncState::ProcessingPoints) {
      let layout = Arc::clone(&ctx.workload.layout);
      let links = Arc::clone(&ctx.workload.links);
      let body = move |index: usize, source: &LoopSource| {
        let found = collect_links(&source.data, &layout, index);
        if !found.is_empty() {
          links.lock().extend(found);
        }
      };
      if ctx.process_current_points(None, body, false) {
        ctx.start_async_wait(STATE_CONSOLIDATING);
      }
      return;
    }

    if ctx.is_state(STATE_CONSOLIDATING) {
      let mut links = std::mem::take(&mut *ctx.workload.links.lock());
      links.sort_unstable_by_key(|link| (link.point, link.socket));

      let mut edges: Vec<IndexedEdge> = links.iter().map(|link| link.edge).collect();
      let stats = consolidate_edges(&mut edges, &ctx.workload.remap);

      let layout = Arc::clone(&ctx.workload.layout);
      let io_index = ctx.current_io_index();
      if let Some(output) = ctx.current_io_mut().and_then(|io| io.output_mut()) {
        for (link, edge) in links.iter().zip(&edges) {
          let neighbor = edge.valid.then_some(edge.end);
          if let Err(err) =
            layout.set_neighbor(output, link.point as usize, link.socket, neighbor)
          {
            warn!(%err, point = link.point, "failed to rewrite socket");
          }
        }
        write_cached_indices(output);
      }
      debug!(node = Self::NAME, io = ?io_index, ?stats, "graph consolidated");
      ctx.set_state(AsyncState::ReadyForNextPoints);
    }
  }
}

/// Links of point `index`, expressed in the old index space.
///
/// A point without a cached index cannot be placed in that space; its links
/// come back invalid and are cleared.
fn collect_links(data: &PointData, layout: &SocketLayout, index: usize) -> Vec<SocketLink> {
  let old = cached_index(data, index);
  (0..layout.len())
    .filter_map(|socket| {
      let neighbor = layout.neighbor(data, index, socket)?;
      let mut edge = IndexedEdge::new(old.unwrap_or(index as u32), neighbor);
      edge.valid = old.is_some();
      Some(SocketLink {
        point: index as u32,
        socket,
        edge,
      })
    })
    .collect()
}

#[cfg(test)]
#[path = "consolidate_graph_test.rs"]
mod consolidate_graph_test;
