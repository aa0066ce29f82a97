//! Path helpers: running metrics and endpoint blending.

pub mod blending;
pub mod metrics;

pub use blending::{InheritEnd, InheritStart, NoBlending, SubPointsBlending};
pub use metrics::PathMetrics;
