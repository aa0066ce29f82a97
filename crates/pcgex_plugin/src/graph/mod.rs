//! Edge engine: canonical keys, deduplication, consolidation, and the
//! socket encoding of graphs on point collections.

pub mod consolidate;
pub mod dedup;
pub mod edge;
pub mod sockets;

pub use consolidate::{consolidate_edges, ConsolidationStats, IndexRemap};
pub use dedup::{EdgeSet, SharedEdgeSet};
pub use edge::{edge_key, unpack_edge_key, EdgeKey, IndexedEdge};
pub use sockets::{cached_index, extract_edges, write_cached_indices, SocketLayout};
