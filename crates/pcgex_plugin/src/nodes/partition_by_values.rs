//! Split points into one collection per bucketed value.
//!
//! Every main input goes through a single bulk loop. Each point's value is
//! read with the [`ValueSelector`], bucketed by the [`PartitionRule`] and
//! appended to the matching partition. Once the loop drained, partitions
//! are written to `Out` in ascending key order.

use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::config::ProcessorSettings;
use crate::constants::{
  is_valid_attribute_name, DEFAULT_PARTITION_KEY_NAME, OUTPUT_LABEL, SOURCE_LABEL,
};
use crate::context::{AsyncState, ProcessingContext};
use crate::data::PointData;
use crate::error::ConfigError;
use crate::loops::LoopSource;
use crate::node::PointsProcessor;
use crate::partition::{PartitionRule, Partitions, ValueSelector};

const STATE_PARTITION_OUTPUT: AsyncState = AsyncState::Custom("PartitionOutput");

#[derive(Clone, Debug, PartialEq)]
pub struct PartitionByValuesSettings {
  pub processing: ProcessorSettings,
  pub selector: ValueSelector,
  pub rule: PartitionRule,
  /// Tag each output point with its partition key.
  pub write_key_to_attribute: bool,
  pub key_attribute_name: String,
}

impl Default for PartitionByValuesSettings {
  fn default() -> Self {
    Self {
      processing: ProcessorSettings::default(),
      selector: ValueSelector::PositionX,
      rule: PartitionRule::default(),
      write_key_to_attribute: true,
      key_attribute_name: DEFAULT_PARTITION_KEY_NAME.to_owned(),
    }
  }
}

#[derive(Debug, Default)]
pub struct PartitionByValuesWorkload {
  partitions: Option<Arc<Partitions>>,
}

pub struct PartitionByValues;

impl PointsProcessor for PartitionByValues {
  const NAME: &'static str = "PartitionByValues";

  type Settings = PartitionByValuesSettings;
  type Workload = PartitionByValuesWorkload;

  fn processor_settings(settings: &Self::Settings) -> &ProcessorSettings {
    &settings.processing
  }

  fn validate_input(settings: &Self::Settings, data: &PointData) -> bool {
    if data.is_empty() {
      return false;
    }
    match settings.selector.validate(data) {
      Ok(()) => true,
      Err(err) => {
        warn!(node = Self::NAME, %err, "input cannot be partitioned");
        false
      }
    }
  }

  fn boot(ctx: &mut ProcessingContext<Self::Settings, Self::Workload>) -> Result<(), ConfigError> {
    if ctx.main_points().is_empty() {
      return Err(ConfigError::MissingInput(SOURCE_LABEL));
    }

    let settings = &ctx.settings;
    settings.rule.validate()?;

    let key_attribute = if settings.write_key_to_attribute {
      if !is_valid_attribute_name(&settings.key_attribute_name) {
        return Err(ConfigError::InvalidAttributeName(
          settings.key_attribute_name.clone(),
        ));
      }
      Some(settings.key_attribute_name.clone())
    } else {
      None
    };

    ctx.workload.partitions = Some(Arc::new(Partitions::new(key_attribute)));
    Ok(())
  }

  fn execute(ctx: &mut ProcessingContext<Self::Settings, Self::Workload>) {
    match ctx.state() {
      AsyncState::ReadyForNextPoints | AsyncState::ProcessingPoints => {
        ctx.set_state(AsyncState::ProcessingPoints);
        let Some(partitions) = ctx.workload.partitions.clone() else {
          ctx.done();
          return;
        };

        let selector = ctx.settings.selector.clone();
        let rule = ctx.settings.rule;
        let body = move |index: usize, source: &LoopSource| {
          let point = &source.data.points[index];
          let Some(value) = selector.read(&source.data, point) else {
            return;
          };
          if !value.is_finite() {
            trace!(index, value, "skipping non-finite value");
            return;
          }
          if let Ok(key) = rule.filter(value) {
            partitions.distribute_point(&source.data, point, key);
          }
        };

        if ctx.bulk_process_main_points(None, body) {
          ctx.start_async_wait(STATE_PARTITION_OUTPUT);
        }
      }
      STATE_PARTITION_OUTPUT => {
        if let Some(partitions) = ctx.workload.partitions.take() {
          let sorted = partitions.drain_sorted();
          debug!(node = Self::NAME, partitions = sorted.len(), "flushing partitions");
          for (_, data) in sorted {
            ctx.push_output(OUTPUT_LABEL, data);
          }
        }
        ctx.done();
      }
      _ => {}
    }
  }
}

#[cfg(test)]
#[path = "partition_by_values_test.rs"]
mod partition_by_values_test;
