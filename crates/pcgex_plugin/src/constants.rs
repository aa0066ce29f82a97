//! Pin labels, reserved attribute names and engine defaults.

/// Default main input pin.
pub const SOURCE_LABEL: &str = "Source";

/// Default main output pin.
pub const OUTPUT_LABEL: &str = "Out";

/// Pathfinding seeds (main input of the pathfinding node).
pub const SOURCE_SEEDS_LABEL: &str = "Seeds";

/// Pathfinding goals.
pub const SOURCE_GOALS_LABEL: &str = "Goals";

/// Computed paths, one collection per successful query.
pub const OUTPUT_PATHS_LABEL: &str = "Paths";

/// Edges promoted to points.
pub const OUTPUT_EDGES_LABEL: &str = "Edges";

/// Default attribute written on partitioned points.
pub const DEFAULT_PARTITION_KEY_NAME: &str = "PartitionKey";

/// Point index recorded when a graph was built. Consolidation reads it to
/// learn where each surviving point used to live.
pub const CACHED_INDEX_ATTRIBUTE: &str = "PCGEx/CachedIndex";

/// Prefix of the per-socket neighbor index attributes.
pub const SOCKET_ATTRIBUTE_PREFIX: &str = "PCGEx/Socket/";

/// Attributes written on promoted edge points.
pub const EDGE_START_ATTRIBUTE: &str = "EdgeStart";
pub const EDGE_END_ATTRIBUTE: &str = "EdgeEnd";

/// Metadata entry key of a point that never had an entry allocated.
pub const INVALID_ENTRY: i64 = -1;

/// Socket value meaning "no neighbor".
pub const NO_NEIGHBOR: i64 = -1;

/// Chunk size used when neither the settings nor the node express one.
pub const DEFAULT_CHUNK_SIZE: i32 = 256;

/// Check whether a name can be used for an attribute the engine writes.
///
/// Accepts ASCII alphanumerics plus `_`, `-`, `/`, `.` and space.
pub fn is_valid_attribute_name(name: &str) -> bool {
  !name.trim().is_empty()
    && name
      .chars()
      .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '/' | '.' | ' '))
}

#[cfg(test)]
#[path = "constants_test.rs"]
mod constants_test;
