//! Node selection and settings, read from TOML.
//!
//! ```toml
//! node = "partition_by_values"
//!
//! [processing]
//! do_async_processing = true
//! chunk_size = -1
//! worker_threads = 0
//!
//! [partition_by_values]
//! selector = { attribute = "Height" }
//! filter_size = 10.0
//! ```

use anyhow::{Context, Result};
use pcgex_plugin::nodes::{
	ConsolidateGraph, ConsolidateGraphSettings, PartitionByValues, PartitionByValuesSettings,
	PromoteEdges, PromoteEdgesSettings,
};
use pcgex_plugin::partition::{PartitionRule, ValueSelector};
use pcgex_plugin::{GraphNode, Node, NodeInputs, ProcessorSettings};
use serde::Deserialize;
use std::path::Path;

/// Nodes the command line host can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
	PartitionByValues,
	PromoteEdges,
	ConsolidateGraph,
}

/// Root configuration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
	/// Node to run.
	pub node: NodeKind,
	/// Execution options shared by every node.
	#[serde(default)]
	pub processing: ProcessingConfig,
	/// Settings of the partition node. Ignored by the others.
	#[serde(default)]
	pub partition_by_values: PartitionConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
	pub do_async_processing: bool,
	/// `-1` keeps the node's preferred chunk size.
	pub chunk_size: i32,
	/// `0` shares rayon's global pool.
	pub worker_threads: usize,
}

impl Default for ProcessingConfig {
	fn default() -> Self {
		let defaults = ProcessorSettings::default();
		Self {
			do_async_processing: defaults.do_async_processing,
			chunk_size: defaults.chunk_size,
			worker_threads: defaults.worker_threads,
		}
	}
}

impl From<&ProcessingConfig> for ProcessorSettings {
	fn from(config: &ProcessingConfig) -> Self {
		Self {
			do_async_processing: config.do_async_processing,
			chunk_size: config.chunk_size,
			worker_threads: config.worker_threads,
		}
	}
}

/// Which value of a point gets bucketed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectorConfig {
	#[default]
	PositionX,
	PositionY,
	PositionZ,
	/// Numeric attribute, as `{ attribute = "Name" }`.
	Attribute(String),
}

impl From<&SelectorConfig> for ValueSelector {
	fn from(config: &SelectorConfig) -> Self {
		match config {
			SelectorConfig::PositionX => Self::PositionX,
			SelectorConfig::PositionY => Self::PositionY,
			SelectorConfig::PositionZ => Self::PositionZ,
			SelectorConfig::Attribute(name) => Self::Attribute(name.clone()),
		}
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PartitionConfig {
	pub selector: SelectorConfig,
	/// Bucket width. Must be > 0.
	pub filter_size: f64,
	/// Applied to values before bucketing.
	pub upscale: f64,
	pub write_key_to_attribute: bool,
	pub key_attribute_name: String,
}

impl Default for PartitionConfig {
	fn default() -> Self {
		let defaults = PartitionByValuesSettings::default();
		Self {
			selector: SelectorConfig::default(),
			filter_size: defaults.rule.filter_size,
			upscale: defaults.rule.upscale,
			write_key_to_attribute: defaults.write_key_to_attribute,
			key_attribute_name: defaults.key_attribute_name,
		}
	}
}

impl PartitionConfig {
	fn settings(&self, processing: ProcessorSettings) -> PartitionByValuesSettings {
		PartitionByValuesSettings {
			processing,
			selector: ValueSelector::from(&self.selector),
			rule: PartitionRule {
				upscale: self.upscale,
				filter_size: self.filter_size,
			},
			write_key_to_attribute: self.write_key_to_attribute,
			key_attribute_name: self.key_attribute_name.clone(),
		}
	}
}

impl Config {
	/// Load configuration from a TOML file.
	pub fn load(path: &Path) -> Result<Self> {
		let content = std::fs::read_to_string(path)
			.with_context(|| format!("Failed to read config file: {}", path.display()))?;
		Self::parse(&content)
	}

	pub fn parse(content: &str) -> Result<Self> {
		toml::from_str(content).with_context(|| "Failed to parse config TOML")
	}

	/// Instantiate the selected node over `inputs`.
	pub fn build_node(&self, inputs: NodeInputs) -> Box<dyn GraphNode> {
		let processing = ProcessorSettings::from(&self.processing);
		match self.node {
			NodeKind::PartitionByValues => Box::new(Node::<PartitionByValues>::new(
				self.partition_by_values.settings(processing),
				Default::default(),
				inputs,
			)),
			NodeKind::PromoteEdges => Box::new(Node::<PromoteEdges>::new(
				PromoteEdgesSettings { processing },
				Default::default(),
				inputs,
			)),
			NodeKind::ConsolidateGraph => Box::new(Node::<ConsolidateGraph>::new(
				ConsolidateGraphSettings { processing },
				Default::default(),
				inputs,
			)),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_minimal_config_uses_defaults() {
		let config = Config::parse(r#"node = "promote_edges""#).unwrap();
		assert_eq!(config.node, NodeKind::PromoteEdges);
		assert_eq!(
			ProcessorSettings::from(&config.processing),
			ProcessorSettings::default()
		);
		assert_eq!(config.partition_by_values.selector, SelectorConfig::PositionX);
	}

	#[test]
	fn test_partition_settings() {
		let config = Config::parse(
			r#"
			node = "partition_by_values"

			[processing]
			do_async_processing = false
			chunk_size = 64

			[partition_by_values]
			selector = { attribute = "Height" }
			filter_size = 2.5
			write_key_to_attribute = false
			"#,
		)
		.unwrap();

		let settings = config
			.partition_by_values
			.settings(ProcessorSettings::from(&config.processing));
		assert!(!settings.processing.do_async_processing);
		assert_eq!(settings.processing.chunk_size, 64);
		assert_eq!(settings.selector, ValueSelector::Attribute("Height".into()));
		assert_eq!(settings.rule, PartitionRule::new(2.5));
		assert!(!settings.write_key_to_attribute);
		assert_eq!(settings.key_attribute_name, "PartitionKey");
	}

	#[test]
	fn test_builds_the_selected_node() {
		let config = Config::parse(r#"node = "consolidate_graph""#).unwrap();
		let node = config.build_node(NodeInputs::new());
		assert_eq!(node.name(), "ConsolidateGraph");
	}

	#[test]
	fn test_rejects_unknown_node() {
		assert!(Config::parse(r#"node = "teleport""#).is_err());
		assert!(Config::parse("").is_err());
	}
}
