//! Per-execution processing context and its resumable state machine.
//!
//! The host calls the node once per tick. Between ticks the context keeps
//! everything needed to resume: the current [`AsyncState`], the cursor over
//! the main collections, any partially advanced loop, and the
//! [`TaskManager`], which is the only channel between background tasks and
//! the driving thread.
//!
//! ```text
//! Setup -> ReadyForNextPoints <-> ProcessingPoints
//!                 |                     |
//!                 v                     v
//!          WaitingOnAsyncWork -> (recorded next state) -> ... -> Done
//! ```

use std::sync::Arc;

use tracing::{debug, trace};

use crate::data::{PointData, PointIO, PointIOGroup};
use crate::loops::{LoopKind, LoopSource, PointLoop};
use crate::node::{NodeInputs, TaggedData};
use crate::threading::TaskManager;

/// Resumable execution state of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AsyncState {
  Setup,
  ReadyForNextPoints,
  ProcessingPoints,
  WaitingOnAsyncWork,
  Done,
  /// Node-specific state.
  Custom(&'static str),
}

/// Everything one node execution owns, generic over the node's settings and
/// workload.
pub struct ProcessingContext<S, W> {
  pub settings: S,
  pub workload: W,
  state: AsyncState,
  resume_state: AsyncState,
  main_points: PointIOGroup,
  current_io: Option<usize>,
  point_loop: Option<PointLoop>,
  tasks: TaskManager,
  chunk_size: i32,
  inputs: NodeInputs,
  output_pin: &'static str,
  outputs: Vec<TaggedData>,
}

impl<S, W> ProcessingContext<S, W> {
  pub fn new(
    settings: S,
    workload: W,
    inputs: NodeInputs,
    main_points: PointIOGroup,
    tasks: TaskManager,
    chunk_size: i32,
    output_pin: &'static str,
  ) -> Self {
    Self {
      settings,
      workload,
      state: AsyncState::Setup,
      resume_state: AsyncState::Done,
      main_points,
      current_io: None,
      point_loop: None,
      tasks,
      chunk_size,
      inputs,
      output_pin,
      outputs: Vec::new(),
    }
  }

  // ===========================================================================
  // State
  // ===========================================================================

  pub fn state(&self) -> AsyncState {
    self.state
  }

  pub fn is_state(&self, state: AsyncState) -> bool {
    self.state == state
  }

  pub fn is_setup(&self) -> bool {
    self.is_state(AsyncState::Setup)
  }

  pub fn is_done(&self) -> bool {
    self.is_state(AsyncState::Done)
  }

  pub fn set_state(&mut self, state: AsyncState) {
    if self.state != state {
      trace!(from = ?self.state, to = ?state, "state change");
    }
    self.state = state;
  }

  pub fn done(&mut self) {
    self.set_state(AsyncState::Done);
  }

  // ===========================================================================
  // Async wait
  // ===========================================================================

  /// Suspend until every outstanding task finished, then resume in `next`.
  pub fn start_async_wait(&mut self, next: AsyncState) {
    self.resume_state = next;
    self.set_state(AsyncState::WaitingOnAsyncWork);
  }

  pub fn is_async_work_complete(&self) -> bool {
    self.tasks.is_complete()
  }

  /// Returns `true` while still waiting. On completion, resets the task
  /// bookkeeping and moves to the state recorded by [`Self::start_async_wait`].
  pub fn poll_async_wait(&mut self) -> bool {
    if !self.is_state(AsyncState::WaitingOnAsyncWork) {
      return false;
    }
    if !self.tasks.is_complete() {
      return true;
    }
    debug!(stats = ?self.tasks.stats(), next = ?self.resume_state, "async work complete");
    self.tasks.reset();
    self.set_state(self.resume_state);
    false
  }

  pub fn tasks(&self) -> &TaskManager {
    &self.tasks
  }

  pub fn do_async_processing(&self) -> bool {
    self.tasks.is_async()
  }

  pub fn chunk_size(&self) -> i32 {
    self.chunk_size
  }

  // ===========================================================================
  // Main collections
  // ===========================================================================

  pub fn main_points(&self) -> &PointIOGroup {
    &self.main_points
  }

  pub fn main_points_mut(&mut self) -> &mut PointIOGroup {
    &mut self.main_points
  }

  /// Move the cursor to the next main collection. `false` past the last one.
  pub fn advance_points_io(&mut self) -> bool {
    self.point_loop = None;
    let next = self.current_io.map_or(0, |index| index + 1);
    if next < self.main_points.len() {
      self.current_io = Some(next);
      true
    } else {
      self.current_io = Some(self.main_points.len());
      false
    }
  }

  /// Position of the cursor within the main group.
  pub fn current_io_index(&self) -> Option<usize> {
    self.current_io.filter(|&index| index < self.main_points.len())
  }

  pub fn current_io(&self) -> Option<&PointIO> {
    self.current_io.and_then(|index| self.main_points.get(index))
  }

  pub fn current_io_mut(&mut self) -> Option<&mut PointIO> {
    self.current_io.and_then(|index| self.main_points.get_mut(index))
  }

  /// Advance the loop over the current collection by one step.
  ///
  /// Synchronous execution handles one chunk per call; async execution
  /// dispatches every chunk at once. Returns `true` once nothing is left
  /// to dispatch. With async execution the caller then waits with
  /// [`Self::start_async_wait`].
  pub fn process_current_points<B>(
    &mut self,
    initialize: Option<&mut (dyn FnMut(&LoopSource) + '_)>,
    body: B,
    force_sync: bool,
  ) -> bool
  where
    B: Fn(usize, &LoopSource) + Send + Sync + 'static,
  {
    let Some(io) = self.current_io() else {
      return true;
    };
    if self.point_loop.is_none() {
      let kind = LoopKind::select(false, !force_sync && self.tasks.is_async());
      let source = LoopSource::new(io.index(), Arc::clone(io.input()));
      self.point_loop = Some(PointLoop::new(kind, vec![source], self.chunk_size));
    }
    self.drive_loop(initialize, body)
  }

  /// Advance one loop over every main collection at once.
  ///
  /// Same return contract as [`Self::process_current_points`].
  pub fn bulk_process_main_points<B>(
    &mut self,
    initialize: Option<&mut (dyn FnMut(&LoopSource) + '_)>,
    body: B,
  ) -> bool
  where
    B: Fn(usize, &LoopSource) + Send + Sync + 'static,
  {
    if self.point_loop.is_none() {
      let kind = LoopKind::select(true, self.tasks.is_async());
      let sources = self
        .main_points
        .iter()
        .map(|io| LoopSource::new(io.index(), Arc::clone(io.input())))
        .collect();
      self.point_loop = Some(PointLoop::new(kind, sources, self.chunk_size));
    }
    self.drive_loop(initialize, body)
  }

  fn drive_loop<B>(
    &mut self,
    mut initialize: Option<&mut (dyn FnMut(&LoopSource) + '_)>,
    body: B,
  ) -> bool
  where
    B: Fn(usize, &LoopSource) + Send + Sync + 'static,
  {
    let Some(point_loop) = self.point_loop.as_mut() else {
      return true;
    };

    let remaining = if point_loop.kind().is_async() {
      let body = Arc::new(body);
      loop {
        let body = Arc::clone(&body);
        let more = point_loop.advance(
          &self.tasks,
          initialize.as_deref_mut(),
          move |index, source| body(index, source),
        );
        if !more {
          break false;
        }
      }
    } else {
      point_loop.advance(&self.tasks, initialize, body)
    };

    if !remaining {
      self.point_loop = None;
    }
    !remaining
  }

  // ===========================================================================
  // Inputs / outputs
  // ===========================================================================

  /// Collections bound to `pin`.
  pub fn inputs(&self, pin: &str) -> &[Arc<PointData>] {
    self.inputs.get(pin)
  }

  pub fn push_output(&mut self, pin: &str, data: PointData) {
    self.outputs.push(TaggedData::new(pin, data));
  }

  /// Move every non-empty main output to the node's main output pin.
  pub fn output_main_points(&mut self) -> usize {
    self
      .main_points
      .output_to(&mut self.outputs, self.output_pin, true)
  }

  pub fn take_outputs(&mut self) -> Vec<TaggedData> {
    std::mem::take(&mut self.outputs)
  }
}

impl<S, W> Drop for ProcessingContext<S, W> {
  fn drop(&mut self) {
    if !self.tasks.is_complete() {
      debug!(outstanding = self.tasks.outstanding(), "context teardown, cancelling tasks");
      self.tasks.cancel();
      self.tasks.wait_for_drain();
    }
  }
}

#[cfg(test)]
#[path = "context_test.rs"]
mod context_test;
