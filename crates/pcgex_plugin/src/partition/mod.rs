//! Value-based partitioning.
//!
//! - [`PartitionRule`]: scalar -> integer key
//! - [`ValueSelector`]: which scalar of a point is bucketed
//! - [`Partitions`]: concurrent key -> collection map

pub mod partitions;
pub mod rule;
pub mod selector;

pub use partitions::{Partition, Partitions};
pub use rule::PartitionRule;
pub use selector::ValueSelector;
