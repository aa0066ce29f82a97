//! Per-collection key/value metadata store.
//!
//! Values are addressed by `(attribute name, entry key)`. Points carry the
//! entry key; the store owns the values. An attribute without an explicit
//! value for an entry reads as its default.

use std::collections::{BTreeMap, HashMap};

use crate::constants::INVALID_ENTRY;
use crate::error::MetadataError;
use crate::types::{AttributeType, AttributeValue, Point};

/// A typed attribute column.
#[derive(Clone, Debug, PartialEq)]
pub struct Attribute {
  default: AttributeValue,
  values: HashMap<i64, AttributeValue>,
}

impl Attribute {
  fn new(default: AttributeValue) -> Self {
    Self {
      default,
      values: HashMap::new(),
    }
  }

  pub fn value_type(&self) -> AttributeType {
    self.default.value_type()
  }

  pub fn default_value(&self) -> &AttributeValue {
    &self.default
  }

  /// Value for `entry`, or the default when unset.
  pub fn get(&self, entry: i64) -> &AttributeValue {
    self.values.get(&entry).unwrap_or(&self.default)
  }

  /// Explicitly set values only.
  pub fn explicit(&self, entry: i64) -> Option<&AttributeValue> {
    self.values.get(&entry)
  }

  /// Number of entries with an explicit value.
  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }
}

/// Attribute store of one point collection.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Metadata {
  attributes: BTreeMap<String, Attribute>,
  next_entry: i64,
}

impl Metadata {
  pub fn new() -> Self {
    Self::default()
  }

  /// Allocate a fresh entry key.
  pub fn add_entry(&mut self) -> i64 {
    let entry = self.next_entry;
    self.next_entry += 1;
    entry
  }

  /// Give `point` an entry if it has none yet.
  pub fn ensure_entry(&mut self, point: &mut Point) {
    if !self.is_valid_entry(point.metadata_entry) {
      point.metadata_entry = self.add_entry();
    }
  }

  /// Whether `entry` was allocated by this store.
  pub fn is_valid_entry(&self, entry: i64) -> bool {
    entry != INVALID_ENTRY && (0..self.next_entry).contains(&entry)
  }

  /// Number of entries allocated so far.
  pub fn entry_count(&self) -> usize {
    self.next_entry as usize
  }

  /// Create `name`, replacing any existing attribute of that name.
  pub fn create_attribute(&mut self, name: &str, default: AttributeValue) {
    self
      .attributes
      .insert(name.to_owned(), Attribute::new(default));
  }

  /// Create `name` unless an attribute of the same type already exists.
  pub fn find_or_create_attribute(
    &mut self,
    name: &str,
    default: AttributeValue,
  ) -> Result<(), MetadataError> {
    match self.attributes.get(name) {
      Some(existing) if existing.value_type() != default.value_type() => {
        Err(MetadataError::TypeMismatch {
          name: name.to_owned(),
          expected: existing.value_type(),
          actual: default.value_type(),
        })
      }
      Some(_) => Ok(()),
      None => {
        self.create_attribute(name, default);
        Ok(())
      }
    }
  }

  pub fn has_attribute(&self, name: &str) -> bool {
    self.attributes.contains_key(name)
  }

  pub fn attribute(&self, name: &str) -> Option<&Attribute> {
    self.attributes.get(name)
  }

  pub fn attribute_type(&self, name: &str) -> Option<AttributeType> {
    self.attributes.get(name).map(Attribute::value_type)
  }

  /// Attribute names in lexical order.
  pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
    self.attributes.keys().map(String::as_str)
  }

  /// Set a value, type-checked against the attribute default.
  pub fn set_value(
    &mut self,
    name: &str,
    entry: i64,
    value: impl Into<AttributeValue>,
  ) -> Result<(), MetadataError> {
    let value = value.into();
    if !self.is_valid_entry(entry) {
      return Err(MetadataError::UnknownEntry(entry));
    }
    let attribute = self
      .attributes
      .get_mut(name)
      .ok_or_else(|| MetadataError::UnknownAttribute(name.to_owned()))?;
    if attribute.value_type() != value.value_type() {
      return Err(MetadataError::TypeMismatch {
        name: name.to_owned(),
        expected: attribute.value_type(),
        actual: value.value_type(),
      });
    }
    attribute.values.insert(entry, value);
    Ok(())
  }

  /// Read a value. `None` only when the attribute does not exist.
  pub fn value(&self, name: &str, entry: i64) -> Option<&AttributeValue> {
    self.attributes.get(name).map(|attribute| attribute.get(entry))
  }

  /// Declare every attribute of `source` here, without copying values.
  pub fn inherit_schema(&mut self, source: &Metadata) {
    for (name, attribute) in &source.attributes {
      self
        .attributes
        .entry(name.clone())
        .or_insert_with(|| Attribute::new(attribute.default.clone()));
    }
  }

  /// Copy the values of `source_entry` from another store into a new entry.
  ///
  /// Missing attributes are created with the source default. Attributes that
  /// exist here with a different type keep their default for the new entry.
  pub fn copy_entry_from(&mut self, source: &Metadata, source_entry: i64) -> i64 {
    let entry = self.add_entry();
    for (name, source_attribute) in &source.attributes {
      let attribute = self
        .attributes
        .entry(name.clone())
        .or_insert_with(|| Attribute::new(source_attribute.default.clone()));
      if attribute.value_type() != source_attribute.value_type() {
        continue;
      }
      if let Some(value) = source_attribute.explicit(source_entry) {
        attribute.values.insert(entry, value.clone());
      }
    }
    entry
  }

  /// Overwrite every attribute value of `to` with the value held by `from`.
  pub fn copy_entry(&mut self, from: i64, to: i64) {
    if from == to {
      return;
    }
    for attribute in self.attributes.values_mut() {
      match attribute.values.get(&from).cloned() {
        Some(value) => {
          attribute.values.insert(to, value);
        }
        None => {
          attribute.values.remove(&to);
        }
      }
    }
  }
}

#[cfg(test)]
#[path = "metadata_test.rs"]
mod metadata_test;
