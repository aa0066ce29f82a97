//! Error types shared by the engine and the nodes.
//!
//! None of these reach the host graph directly: configuration errors are
//! logged by the node wrapper, which then completes the node as a no-op.

use thiserror::Error;

use crate::types::AttributeType;

/// Problems detected while booting a node, before any work is scheduled.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// A required input pin has no data, or only empty collections.
  #[error("missing input points on pin `{0}`")]
  MissingInput(&'static str),

  /// An attribute name the node would write is malformed.
  #[error("attribute name `{0}` is invalid")]
  InvalidAttributeName(String),

  /// Bucket width must be strictly positive and finite.
  #[error("filter size must be > 0, got {0}")]
  InvalidFilterSize(f64),

  /// A value selector refers to an attribute absent from the input.
  #[error("attribute `{0}` does not exist on the input")]
  MissingAttribute(String),

  /// Pathfinding was configured without a navigation oracle.
  #[error("no navigation data bound to the node")]
  MissingNavigation,

  /// Debug drawing was enabled without a sink to draw into.
  #[error("no debug draw sink bound to the node")]
  MissingDebugSink,

  /// The dedicated worker pool could not be created.
  #[error("failed to build worker pool: {0}")]
  ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Metadata store misuse.
#[derive(Debug, Error, PartialEq)]
pub enum MetadataError {
  #[error("attribute `{0}` does not exist")]
  UnknownAttribute(String),

  #[error("attribute `{name}` holds {expected:?} values, got {actual:?}")]
  TypeMismatch {
    name: String,
    expected: AttributeType,
    actual: AttributeType,
  },

  #[error("entry {0} was never allocated by this store")]
  UnknownEntry(i64),

  #[error("point index {0} is out of range")]
  UnknownPoint(usize),
}

/// Failure reported by a navigation oracle.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NavQueryError {
  #[error("no route between the requested locations")]
  NoRoute,

  #[error("end location is not on navigable space")]
  UnreachableEnd,

  #[error("navigation query failed: {0}")]
  Other(String),
}

/// Raised at a checkpoint once the owning task manager was cancelled.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("task cancelled")]
pub struct Cancelled;
