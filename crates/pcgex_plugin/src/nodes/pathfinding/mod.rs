//! Navigation-backed paths from seed points to goal points.
//!
//! Seeds are the main input. For each seed the [`GoalPicker`] selects goals
//! on the `Goals` pin, and every seed/goal pair becomes one background task
//! querying the [`NavigationOracle`]. Successful routes are turned into point
//! collections and sent back over a channel; they are written to `Paths` once
//! every task finished, ordered by (input, seed, goal).
//!
//! ```text
//! Setup -> ReadyForNextPoints <-> ProcessingPoints
//!                 |
//!                 v
//!         WaitingOnAsyncWork -> Pathfinding -> Done
//! ```

mod goal_picker;
mod navigation;

use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use glam::DVec3;
use tracing::{debug, trace};

pub use goal_picker::GoalPicker;
pub use navigation::{NavAgentProfile, NavigationOracle, PathQuery, PathfindingMode};

use crate::config::ProcessorSettings;
use crate::constants::{OUTPUT_PATHS_LABEL, SOURCE_GOALS_LABEL, SOURCE_SEEDS_LABEL};
use crate::context::{AsyncState, ProcessingContext};
use crate::data::PointData;
use crate::error::{Cancelled, ConfigError};
use crate::loops::ChunkCursor;
use crate::node::PointsProcessor;
use crate::paths::{NoBlending, PathMetrics, SubPointsBlending};
use crate::threading::{CancellationToken, TaskOutcome};
use crate::types::Point;

const STATE_PATHFINDING: AsyncState = AsyncState::Custom("Pathfinding");

#[derive(Clone)]
pub struct PathfindingNavmeshSettings {
  pub processing: ProcessorSettings,
  pub goal_picker: GoalPicker,
  /// Keep the seed location as the first path point.
  pub add_seed_to_path: bool,
  /// Keep the goal location as the last path point.
  pub add_goal_to_path: bool,
  /// Waypoints closer than this to the previous kept one are dropped.
  pub fuse_distance: f64,
  pub agent: NavAgentProfile,
  pub mode: PathfindingMode,
  pub require_navigable_end_location: bool,
  pub blending: Arc<dyn SubPointsBlending>,
}

impl Default for PathfindingNavmeshSettings {
  fn default() -> Self {
    Self {
      processing: ProcessorSettings::default(),
      goal_picker: GoalPicker::default(),
      add_seed_to_path: true,
      add_goal_to_path: true,
      fuse_distance: 10.0,
      agent: NavAgentProfile::default(),
      mode: PathfindingMode::default(),
      require_navigable_end_location: false,
      blending: Arc::new(NoBlending),
    }
  }
}

/// A finished route.
#[derive(Debug)]
struct ComputedPath {
  io: usize,
  seed: usize,
  goal: usize,
  points: PointData,
}

#[derive(Default)]
pub struct PathfindingNavmeshWorkload {
  pub oracle: Option<Arc<dyn NavigationOracle>>,
  planner: Option<Arc<PathPlanner>>,
  results: Option<Receiver<ComputedPath>>,
  seed_cursor: Option<ChunkCursor>,
}

impl PathfindingNavmeshWorkload {
  pub fn new(oracle: Arc<dyn NavigationOracle>) -> Self {
    Self {
      oracle: Some(oracle),
      ..Default::default()
    }
  }
}

/// Everything a path task needs, shared by all of them.
struct PathPlanner {
  oracle: Arc<dyn NavigationOracle>,
  blending: Arc<dyn SubPointsBlending>,
  goals: Arc<PointData>,
  agent: NavAgentProfile,
  mode: PathfindingMode,
  require_navigable_end: bool,
  add_seed: bool,
  add_goal: bool,
  fuse_distance_squared: f64,
  results: Sender<ComputedPath>,
}

impl PathPlanner {
  fn new(
    settings: &PathfindingNavmeshSettings,
    oracle: Arc<dyn NavigationOracle>,
    goals: Arc<PointData>,
    results: Sender<ComputedPath>,
  ) -> Self {
    Self {
      oracle,
      blending: Arc::clone(&settings.blending),
      goals,
      agent: settings.agent,
      mode: settings.mode,
      require_navigable_end: settings.require_navigable_end_location,
      add_seed: settings.add_seed_to_path,
      add_goal: settings.add_goal_to_path,
      fuse_distance_squared: settings.fuse_distance * settings.fuse_distance,
      results,
    }
  }

  /// Route one seed to one goal. `Ok(None)` when no usable path exists.
  fn plan(
    &self,
    token: &CancellationToken,
    seeds: &PointData,
    seed_index: usize,
    goal_index: usize,
  ) -> Result<Option<PointData>, Cancelled> {
    token.checkpoint()?;

    let (Some(seed), Some(goal)) = (
      seeds.points.get(seed_index),
      self.goals.points.get(goal_index),
    ) else {
      return Ok(None);
    };

    let query = PathQuery {
      start: seed.position,
      end: goal.position,
      agent: self.agent,
      mode: self.mode,
      require_navigable_end: self.require_navigable_end,
      cost_limit: f64::MAX,
    };

    token.checkpoint()?;
    let waypoints = match self.oracle.find_path(&query) {
      Ok(waypoints) => waypoints,
      Err(err) => {
        trace!(%err, seed_index, goal_index, "navigation query failed");
        return Ok(None);
      }
    };
    token.checkpoint()?;

    let mut locations = Vec::with_capacity(waypoints.len() + 2);
    locations.push(seed.position);
    locations.extend(waypoints);
    locations.push(goal.position);
    self.fuse(&mut locations, seed.position);

    // start and end alone are not a path
    if locations.len() <= 2 {
      return Ok(None);
    }

    token.checkpoint()?;

    let mut path = seeds.empty_like();
    let mut metrics = PathMetrics::default();
    let last = locations.len() - 1;
    for (index, &location) in locations.iter().enumerate() {
      let entry = if index < last {
        path
          .metadata
          .copy_entry_from(&seeds.metadata, seed.metadata_entry)
      } else {
        path
          .metadata
          .copy_entry_from(&self.goals.metadata, goal.metadata_entry)
      };
      path.points.push(Point::with_entry(location, entry));
      metrics.add(location);
    }

    token.checkpoint()?;
    self.blending.blend_sub_points(&mut path, &metrics);

    if !self.add_seed {
      path.points.remove(0);
    }
    if !self.add_goal {
      path.points.pop();
    }
    Ok(Some(path))
  }

  /// Drop waypoints within the fuse distance of the last kept location.
  ///
  /// The seed is never fused. Neither is the goal, nor the waypoint right
  /// before it when the goal is kept.
  fn fuse(&self, locations: &mut Vec<DVec3>, start: DVec3) {
    let keep_tail = if self.add_goal { 2 } else { 1 };
    let mut metrics = PathMetrics::new(start);
    let mut index = usize::from(self.add_seed);
    while index < locations.len() {
      let location = locations[index];
      if index > 0
        && index + keep_tail < locations.len()
        && metrics.is_last_within_range(location, self.fuse_distance_squared)
      {
        locations.remove(index);
        continue;
      }
      metrics.add(location);
      index += 1;
    }
  }
}

pub struct PathfindingNavmesh;

impl PointsProcessor for PathfindingNavmesh {
  const NAME: &'static str = "PathfindingNavmesh";

  type Settings = PathfindingNavmeshSettings;
  type Workload = PathfindingNavmeshWorkload;

  fn main_input_pin() -> &'static str {
    SOURCE_SEEDS_LABEL
  }

  fn main_output_pin() -> &'static str {
    OUTPUT_PATHS_LABEL
  }

  fn preferred_chunk_size() -> i32 {
    32
  }

  fn processor_settings(settings: &Self::Settings) -> &ProcessorSettings {
    &settings.processing
  }

  fn boot(ctx: &mut ProcessingContext<Self::Settings, Self::Workload>) -> Result<(), ConfigError> {
    let goals = ctx
      .inputs(SOURCE_GOALS_LABEL)
      .first()
      .filter(|goals| !goals.is_empty())
      .cloned()
      .ok_or(ConfigError::MissingInput(SOURCE_GOALS_LABEL))?;

    let oracle = ctx
      .workload
      .oracle
      .clone()
      .ok_or(ConfigError::MissingNavigation)?;

    if ctx.main_points().is_empty() {
      return Err(ConfigError::MissingInput(SOURCE_SEEDS_LABEL));
    }

    let (sender, receiver) = crossbeam_channel::unbounded();
    let planner = PathPlanner::new(&ctx.settings, oracle, goals, sender);
    ctx.workload.planner = Some(Arc::new(planner));
    ctx.workload.results = Some(receiver);
    Ok(())
  }

  fn execute(ctx: &mut ProcessingContext<Self::Settings, Self::Workload>) {
    if ctx.is_state(AsyncState::ReadyForNextPoints) {
      if !ctx.advance_points_io() {
        ctx.workload.planner = None;
        ctx.start_async_wait(STATE_PATHFINDING);
        return;
      }
      let num_seeds = ctx.current_io().map_or(0, |io| io.num());
      ctx.workload.seed_cursor = Some(ChunkCursor::new(num_seeds, ctx.chunk_size()));
      ctx.set_state(AsyncState::ProcessingPoints);
    }

    if ctx.is_state(AsyncState::ProcessingPoints) {
      let next = ctx.workload.seed_cursor.as_mut().and_then(Iterator::next);
      let (Some(range), Some(planner), Some(io)) =
        (next, ctx.workload.planner.as_ref(), ctx.current_io())
      else {
        ctx.set_state(AsyncState::ReadyForNextPoints);
        return;
      };

      let io_index = io.index();
      let seeds = Arc::clone(io.input());
      let num_goals = planner.goals.len();
      for seed_index in range {
        for goal_index in ctx.settings.goal_picker.goal_indices(seed_index, num_goals) {
          let planner = Arc::clone(planner);
          let seeds = Arc::clone(&seeds);
          ctx.tasks().start(move |token| {
            match planner.plan(token, &seeds, seed_index, goal_index) {
              Ok(Some(points)) => {
                let path = ComputedPath {
                  io: io_index,
                  seed: seed_index,
                  goal: goal_index,
                  points,
                };
                TaskOutcome::from_success(planner.results.send(path).is_ok())
              }
              Ok(None) => TaskOutcome::Failed,
              Err(Cancelled) => TaskOutcome::Cancelled,
            }
          });
        }
      }
      return;
    }

    if ctx.is_state(STATE_PATHFINDING) {
      let mut paths: Vec<ComputedPath> = ctx
        .workload
        .results
        .take()
        .map(|results| results.try_iter().collect())
        .unwrap_or_default();
      paths.sort_unstable_by_key(|path| (path.io, path.seed, path.goal));

      debug!(node = Self::NAME, paths = paths.len(), "pathfinding complete");
      for path in paths {
        if !path.points.is_empty() {
          ctx.push_output(OUTPUT_PATHS_LABEL, path.points);
        }
      }
      ctx.done();
    }
  }
}
