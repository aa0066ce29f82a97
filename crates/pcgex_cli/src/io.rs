//! JSON point files.
//!
//! ```json
//! {
//!   "collections": [
//!     {
//!       "pin": "Source",
//!       "points": [
//!         { "position": [0.0, 0.0, 0.0], "attributes": { "Height": 2.5 } }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Attribute values map to booleans, integers, doubles, strings and
//! `[x, y, z]` vectors. An attribute mixing integers and doubles is read as
//! double.

use anyhow::{bail, Context, Result};
use glam::DVec3;
use pcgex_plugin::{
	AttributeType, AttributeValue, NodeInputs, PointData, TaggedData, SOURCE_LABEL,
};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PointFile {
	pub collections: Vec<CollectionRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CollectionRecord {
	/// Pin the collection is bound to (inputs) or came from (outputs).
	#[serde(default = "default_pin")]
	pub pin: String,
	#[serde(default)]
	pub points: Vec<PointRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PointRecord {
	pub position: [f64; 3],
	#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
	pub attributes: BTreeMap<String, Value>,
}

fn default_pin() -> String {
	SOURCE_LABEL.to_owned()
}

impl PointFile {
	pub fn load(path: &Path) -> Result<Self> {
		let content = std::fs::read_to_string(path)
			.with_context(|| format!("Failed to read points file: {}", path.display()))?;
		serde_json::from_str(&content)
			.with_context(|| format!("Failed to parse points JSON: {}", path.display()))
	}

	pub fn save(&self, path: &Path) -> Result<()> {
		let content = serde_json::to_string_pretty(self).context("Failed to encode points JSON")?;
		std::fs::write(path, content)
			.with_context(|| format!("Failed to write: {}", path.display()))
	}

	/// Bind every collection to its pin.
	pub fn into_inputs(self) -> Result<NodeInputs> {
		let mut inputs = NodeInputs::new();
		for (index, collection) in self.collections.iter().enumerate() {
			let data = collection
				.to_point_data()
				.with_context(|| format!("Collection #{index} on pin `{}`", collection.pin))?;
			inputs.add(&collection.pin, data);
		}
		Ok(inputs)
	}

	pub fn from_outputs(outputs: &[TaggedData]) -> Self {
		Self {
			collections: outputs
				.iter()
				.map(|output| CollectionRecord::from_point_data(&output.pin, &output.data))
				.collect(),
		}
	}
}

impl CollectionRecord {
	pub fn to_point_data(&self) -> Result<PointData> {
		let mut data = PointData::new();

		// Declare every attribute up front so mixed integer/double columns
		// settle on one type.
		let mut types: BTreeMap<&str, AttributeType> = BTreeMap::new();
		for point in &self.points {
			for (name, value) in &point.attributes {
				let found = json_type(name, value)?;
				let merged = match types.get(name.as_str()) {
					None => found,
					Some(&existing) => merge_types(name, existing, found)?,
				};
				types.insert(name.as_str(), merged);
			}
		}
		for (name, &value_type) in &types {
			data.metadata
				.create_attribute(name, AttributeValue::zero(value_type));
		}

		for point in &self.points {
			let index = data.add_point(DVec3::from_array(point.position));
			let entry = data.points[index].metadata_entry;
			for (name, value) in &point.attributes {
				let Some(&value_type) = types.get(name.as_str()) else {
					continue;
				};
				let value = json_to_value(name, value, value_type)?;
				data.metadata.set_value(name, entry, value)?;
			}
		}
		Ok(data)
	}

	pub fn from_point_data(pin: &str, data: &PointData) -> Self {
		let names: Vec<&str> = data.metadata.attribute_names().collect();
		let points = data
			.points
			.iter()
			.map(|point| PointRecord {
				position: point.position.to_array(),
				attributes: names
					.iter()
					.filter_map(|&name| {
						let value = data.metadata.value(name, point.metadata_entry)?;
						Some((name.to_owned(), value_to_json(value)))
					})
					.collect(),
			})
			.collect();
		Self {
			pin: pin.to_owned(),
			points,
		}
	}
}

fn json_type(name: &str, value: &Value) -> Result<AttributeType> {
	Ok(match value {
		Value::Bool(_) => AttributeType::Bool,
		Value::Number(number) if number.is_i64() => AttributeType::Int64,
		Value::Number(_) => AttributeType::Double,
		Value::String(_) => AttributeType::String,
		Value::Array(items) if items.len() == 3 && items.iter().all(Value::is_number) => {
			AttributeType::Vector
		}
		_ => bail!("Attribute `{name}` has an unsupported value: {value}"),
	})
}

fn merge_types(name: &str, a: AttributeType, b: AttributeType) -> Result<AttributeType> {
	use AttributeType::{Double, Int64};
	match (a, b) {
		(a, b) if a == b => Ok(a),
		(Int64, Double) | (Double, Int64) => Ok(Double),
		_ => bail!("Attribute `{name}` mixes {a:?} and {b:?} values"),
	}
}

fn json_to_value(name: &str, value: &Value, value_type: AttributeType) -> Result<AttributeValue> {
	let converted = match (value_type, value) {
		(AttributeType::Bool, Value::Bool(b)) => Some(AttributeValue::Bool(*b)),
		(AttributeType::Int64, Value::Number(n)) => n.as_i64().map(AttributeValue::Int64),
		(AttributeType::Double, Value::Number(n)) => n.as_f64().map(AttributeValue::Double),
		(AttributeType::String, Value::String(s)) => Some(AttributeValue::String(s.clone())),
		(AttributeType::Vector, Value::Array(items)) => {
			let components: Option<Vec<f64>> = items.iter().map(Value::as_f64).collect();
			components
				.filter(|c| c.len() == 3)
				.map(|c| AttributeValue::Vector(DVec3::new(c[0], c[1], c[2])))
		}
		_ => None,
	};
	converted.with_context(|| format!("Attribute `{name}`: cannot read {value} as {value_type:?}"))
}

fn value_to_json(value: &AttributeValue) -> Value {
	let number = |x: f64| Number::from_f64(x).map_or(Value::Null, Value::Number);
	match value {
		AttributeValue::Bool(b) => Value::Bool(*b),
		AttributeValue::Int64(i) => Value::from(*i),
		AttributeValue::Double(d) => number(*d),
		AttributeValue::Vector(v) => Value::Array(vec![number(v.x), number(v.y), number(v.z)]),
		AttributeValue::String(s) => Value::String(s.clone()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn parse(value: Value) -> PointFile {
		serde_json::from_value(value).unwrap()
	}

	#[test]
	fn test_reads_typed_attributes() {
		let file = parse(json!({
			"collections": [{
				"points": [
					{ "position": [0.0, 1.0, 2.0], "attributes": { "H": 1, "Tag": "a", "On": true } },
					{ "position": [3.0, 4.0, 5.0], "attributes": { "H": 2.5, "Dir": [1, 0, 0] } }
				]
			}]
		}));
		let data = file.collections[0].to_point_data().unwrap();

		assert_eq!(file.collections[0].pin, SOURCE_LABEL);
		assert_eq!(data.len(), 2);
		assert_eq!(data.points[1].position, DVec3::new(3.0, 4.0, 5.0));
		assert_eq!(data.metadata.attribute_type("H"), Some(AttributeType::Double));

		let first = data.points[0].metadata_entry;
		let second = data.points[1].metadata_entry;
		assert_eq!(data.metadata.value("H", first), Some(&AttributeValue::Double(1.0)));
		assert_eq!(data.metadata.value("H", second), Some(&AttributeValue::Double(2.5)));
		assert_eq!(data.metadata.value("On", second), Some(&AttributeValue::Bool(false)));
		assert_eq!(
			data.metadata.value("Dir", second),
			Some(&AttributeValue::Vector(DVec3::X))
		);
	}

	#[test]
	fn test_rejects_mixed_attribute_types() {
		let file = parse(json!({
			"collections": [{
				"points": [
					{ "position": [0.0, 0.0, 0.0], "attributes": { "H": 1 } },
					{ "position": [0.0, 0.0, 0.0], "attributes": { "H": "tall" } }
				]
			}]
		}));
		assert!(file.into_inputs().is_err());
	}

	#[test]
	fn test_outputs_round_trip_through_disk() {
		let mut data = PointData::new();
		data.metadata.create_attribute("K", AttributeValue::Int64(-1));
		let index = data.add_point(DVec3::new(1.0, 2.0, 3.0));
		let entry = data.points[index].metadata_entry;
		data.metadata.set_value("K", entry, 7i64).unwrap();

		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("out.json");
		PointFile::from_outputs(&[TaggedData::new("Out", data.clone())])
			.save(&path)
			.unwrap();

		let loaded = PointFile::load(&path).unwrap();
		assert_eq!(loaded.collections[0].pin, "Out");
		let reread = loaded.collections[0].to_point_data().unwrap();
		assert_eq!(reread.points[0].position, DVec3::new(1.0, 2.0, 3.0));
		assert_eq!(
			reread.metadata.value("K", reread.points[0].metadata_entry),
			Some(&AttributeValue::Int64(7))
		);
	}

	#[test]
	fn test_missing_file_reports_path() {
		let err = PointFile::load(Path::new("/definitely/not/here.json")).unwrap_err();
		assert!(format!("{err:#}").contains("not/here.json"));
	}
}
