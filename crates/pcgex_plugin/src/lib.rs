//! pcgex_plugin - Host independent point processing nodes
//!
//! Nodes of a procedural content graph ingest point collections and write
//! derived collections back. This crate provides the nodes together with
//! the engine they share: a resumable per-node state machine that mixes
//! synchronous, chunked and background execution without ever blocking the
//! host's driving thread.
//!
//! # Features
//!
//! - **Processing context**: [`ProcessingContext`] keeps a node's state
//!   between ticks; [`GraphNode::execute`] drives one tick
//! - **Loop strategies**: plain, bulk, async and bulk-async chunked loops
//!   over one or all main collections
//! - **Task manager**: bounded rayon worker pool with cooperative
//!   cancellation and outstanding-task accounting
//! - **Partitioning**: value bucketing into a concurrently built key map
//! - **Edge engine**: canonical edge keys, deduplication and index
//!   consolidation over socket graphs
//!
//! # Example
//!
//! ```
//! use pcgex_plugin::nodes::{PartitionByValues, PartitionByValuesSettings};
//! use pcgex_plugin::{run_to_completion, Node, NodeInputs, PointData, SOURCE_LABEL};
//! use glam::DVec3;
//!
//! let points = PointData::from_positions((0..10).map(|i| DVec3::new(i as f64, 0.0, 0.0)));
//! let inputs = NodeInputs::new().with(SOURCE_LABEL, points);
//!
//! let mut node = Node::<PartitionByValues>::new(
//!   PartitionByValuesSettings::default(),
//!   Default::default(),
//!   inputs,
//! );
//! assert!(run_to_completion(&mut node, 10_000).is_some());
//! ```

pub mod config;
pub mod constants;
pub mod context;
pub mod data;
pub mod error;
pub mod graph;
pub mod loops;
pub mod node;
pub mod nodes;
pub mod partition;
pub mod paths;
pub mod threading;
pub mod types;

#[cfg(test)]
mod test_utils;

// Re-export commonly used items
pub use config::ProcessorSettings;
pub use constants::{
  OUTPUT_EDGES_LABEL, OUTPUT_LABEL, OUTPUT_PATHS_LABEL, SOURCE_GOALS_LABEL, SOURCE_LABEL,
  SOURCE_SEEDS_LABEL,
};
pub use context::{AsyncState, ProcessingContext};
pub use data::{Attribute, InitMode, Metadata, PointData, PointIO, PointIOGroup};
pub use error::{Cancelled, ConfigError, MetadataError, NavQueryError};
pub use loops::{LoopKind, LoopSource, PointLoop};
pub use node::{run_to_completion, GraphNode, Node, NodeInputs, PointsProcessor, TaggedData};
pub use threading::{CancellationToken, TaskManager, TaskOutcome, TaskStats};
pub use types::{AttributeType, AttributeValue, Point};
