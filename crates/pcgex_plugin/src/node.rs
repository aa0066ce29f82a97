//! Node trait, the generic node wrapper, and the host-facing contract.
//!
//! A node is a [`PointsProcessor`]: a settings type, a workload type and two
//! hooks (`boot`, `execute`) over a shared [`ProcessingContext`]. Hosts see
//! nodes through the object-safe [`GraphNode`] and tick them until
//! [`GraphNode::execute`] returns `true`.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, error, warn};
// WASM compat: use web_time::Instant, NOT std::time::Instant
use web_time::Instant;

use crate::config::ProcessorSettings;
use crate::constants::{DEFAULT_CHUNK_SIZE, OUTPUT_LABEL, SOURCE_LABEL};
use crate::context::{AsyncState, ProcessingContext};
use crate::data::{InitMode, PointData, PointIOGroup};
use crate::error::ConfigError;
use crate::threading::TaskManager;

/// Point collections bound to a node's input pins.
#[derive(Clone, Debug, Default)]
pub struct NodeInputs {
  pins: HashMap<String, Vec<Arc<PointData>>>,
}

impl NodeInputs {
  pub fn new() -> Self {
    Self::default()
  }

  /// Builder form of [`Self::add`].
  pub fn with(mut self, pin: &str, data: PointData) -> Self {
    self.add(pin, data);
    self
  }

  pub fn add(&mut self, pin: &str, data: PointData) {
    self.add_shared(pin, Arc::new(data));
  }

  pub fn add_shared(&mut self, pin: &str, data: Arc<PointData>) {
    self.pins.entry(pin.to_owned()).or_default().push(data);
  }

  /// Collections on `pin`, empty when unbound.
  pub fn get(&self, pin: &str) -> &[Arc<PointData>] {
    self.pins.get(pin).map(Vec::as_slice).unwrap_or_default()
  }

  pub fn is_empty(&self) -> bool {
    self.pins.values().all(Vec::is_empty)
  }
}

/// A collection produced on an output pin.
#[derive(Clone, Debug, PartialEq)]
pub struct TaggedData {
  pub pin: String,
  pub data: PointData,
}

impl TaggedData {
  pub fn new(pin: &str, data: PointData) -> Self {
    Self {
      pin: pin.to_owned(),
      data,
    }
  }
}

/// Node behaviour plugged into the shared processing engine.
pub trait PointsProcessor: 'static {
  const NAME: &'static str;

  type Settings: Send + 'static;
  type Workload: Send + 'static;

  fn main_input_pin() -> &'static str {
    SOURCE_LABEL
  }

  fn main_output_pin() -> &'static str {
    OUTPUT_LABEL
  }

  fn main_output_init_mode() -> InitMode {
    InitMode::NoOutput
  }

  fn preferred_chunk_size() -> i32 {
    DEFAULT_CHUNK_SIZE
  }

  fn processor_settings(settings: &Self::Settings) -> &ProcessorSettings;

  /// Whether a main input collection takes part in processing.
  fn validate_input(_settings: &Self::Settings, data: &PointData) -> bool {
    !data.is_empty()
  }

  /// Validate configuration and prepare the workload. Runs once, in `Setup`.
  fn boot(ctx: &mut ProcessingContext<Self::Settings, Self::Workload>) -> Result<(), ConfigError>;

  /// One tick of work. Must eventually reach `Done`.
  fn execute(ctx: &mut ProcessingContext<Self::Settings, Self::Workload>);
}

/// Object-safe view of a node, as seen by a host graph.
pub trait GraphNode: Send {
  fn name(&self) -> &'static str;

  /// Drive one tick. Returns `true` once the node is done.
  fn execute(&mut self) -> bool;

  /// Drain the collections produced so far.
  fn take_outputs(&mut self) -> Vec<TaggedData>;
}

/// A [`PointsProcessor`] bound to its execution context.
pub struct Node<P: PointsProcessor> {
  context: ProcessingContext<P::Settings, P::Workload>,
  pending_error: Option<ConfigError>,
  /// Set on the first tick.
  started: Option<Instant>,
}

impl<P: PointsProcessor> Node<P> {
  pub fn new(settings: P::Settings, workload: P::Workload, inputs: NodeInputs) -> Self {
    let processing = P::processor_settings(&settings).clone();
    let (tasks, pending_error) = match TaskManager::for_settings(&processing) {
      Ok(tasks) => (tasks, None),
      Err(err) => (TaskManager::inline(), Some(err)),
    };

    let main_pin = P::main_input_pin();
    let main_points = PointIOGroup::from_inputs(
      inputs.get(main_pin),
      P::main_output_init_mode(),
      |data| {
        let valid = P::validate_input(&settings, data);
        if !valid {
          warn!(node = P::NAME, pin = main_pin, "skipping invalid input collection");
        }
        valid
      },
    );

    let context = ProcessingContext::new(
      settings,
      workload,
      inputs,
      main_points,
      tasks,
      processing.resolve_chunk_size(P::preferred_chunk_size()),
      P::main_output_pin(),
    );

    Self {
      context,
      pending_error,
      started: None,
    }
  }

  pub fn context(&self) -> &ProcessingContext<P::Settings, P::Workload> {
    &self.context
  }

  pub fn context_mut(&mut self) -> &mut ProcessingContext<P::Settings, P::Workload> {
    &mut self.context
  }

  fn soft_fail(&mut self, err: ConfigError) {
    error!(node = P::NAME, %err, "node configuration error");
    self.context.done();
  }
}

impl<P: PointsProcessor> GraphNode for Node<P> {
  fn name(&self) -> &'static str {
    P::NAME
  }

  #[cfg_attr(feature = "instrument", tracing::instrument(skip_all, fields(node = P::NAME)))]
  fn execute(&mut self) -> bool {
    let started = *self.started.get_or_insert_with(Instant::now);
    if self.context.is_setup() {
      if let Some(err) = self.pending_error.take() {
        self.soft_fail(err);
        return true;
      }
      if let Err(err) = P::boot(&mut self.context) {
        self.soft_fail(err);
        return true;
      }
      if self.context.is_setup() {
        self.context.set_state(AsyncState::ReadyForNextPoints);
      }
    }

    if self.context.poll_async_wait() {
      return false;
    }

    if !self.context.is_done() {
      P::execute(&mut self.context);
    }

    let done = self.context.is_done();
    if done {
      debug!(
        node = P::NAME,
        elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
        "node done"
      );
    }
    done
  }

  fn take_outputs(&mut self) -> Vec<TaggedData> {
    self.context.take_outputs()
  }
}

/// Tick `node` until done. Returns the number of ticks, or `None` when
/// `max_ticks` ran out first.
pub fn run_to_completion(node: &mut dyn GraphNode, max_ticks: usize) -> Option<usize> {
  for tick in 1..=max_ticks {
    if node.execute() {
      return Some(tick);
    }
    std::thread::yield_now();
  }
  warn!(node = node.name(), max_ticks, "node did not finish");
  None
}
