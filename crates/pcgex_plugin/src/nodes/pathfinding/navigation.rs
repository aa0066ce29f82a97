//! Navigation oracle contract.

use glam::DVec3;

use crate::error::NavQueryError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PathfindingMode {
  #[default]
  Regular,
  Hierarchical,
}

/// Size and stepping ability of the agent a path is computed for.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NavAgentProfile {
  pub radius: f64,
  pub height: f64,
  pub step_height: f64,
}

impl Default for NavAgentProfile {
  fn default() -> Self {
    Self {
      radius: 35.0,
      height: 144.0,
      step_height: 45.0,
    }
  }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PathQuery {
  pub start: DVec3,
  pub end: DVec3,
  pub agent: NavAgentProfile,
  pub mode: PathfindingMode,
  /// Fail instead of ending at the closest reachable location.
  pub require_navigable_end: bool,
  pub cost_limit: f64,
}

impl PathQuery {
  pub fn new(start: DVec3, end: DVec3) -> Self {
    Self {
      start,
      end,
      agent: NavAgentProfile::default(),
      mode: PathfindingMode::default(),
      require_navigable_end: false,
      cost_limit: f64::MAX,
    }
  }
}

/// Synchronous route queries, issued from worker threads.
pub trait NavigationOracle: Send + Sync {
  /// Waypoints from `query.start` to `query.end`. They may include the
  /// endpoints themselves.
  fn find_path(&self, query: &PathQuery) -> Result<Vec<DVec3>, NavQueryError>;
}
