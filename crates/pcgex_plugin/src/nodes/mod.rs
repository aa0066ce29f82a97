//! The nodes shipped with the library.

pub mod consolidate_graph;
pub mod draw_edges;
pub mod partition_by_values;
pub mod pathfinding;
pub mod promote_edges;

pub use consolidate_graph::{ConsolidateGraph, ConsolidateGraphSettings};
pub use draw_edges::{DebugDrawSink, DrawEdges, DrawEdgesSettings, DrawEdgesWorkload, LineStyle};
pub use partition_by_values::{PartitionByValues, PartitionByValuesSettings};
pub use pathfinding::{
  GoalPicker, NavAgentProfile, NavigationOracle, PathQuery, PathfindingMode, PathfindingNavmesh,
  PathfindingNavmeshSettings, PathfindingNavmeshWorkload,
};
pub use promote_edges::{PromoteEdges, PromoteEdgesSettings};
