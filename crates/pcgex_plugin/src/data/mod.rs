//! Point collection data model.
//!
//! - [`PointData`]: points + [`Metadata`]
//! - [`PointIO`]: shared input view, optional owned output ([`InitMode`])
//! - [`PointIOGroup`]: the ordered set of IOs a node works on

pub mod group;
pub mod metadata;
pub mod point_io;

pub use group::PointIOGroup;
pub use metadata::{Attribute, Metadata};
pub use point_io::{InitMode, PointData, PointIO};
