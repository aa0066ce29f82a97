use glam::DVec3;

use super::*;
use crate::partition::PartitionRule;

fn values_source(values: &[f64]) -> PointData {
  let mut data = PointData::new();
  data.metadata.create_attribute("Value", AttributeValue::Double(0.0));
  for &value in values {
    let index = data.add_point(DVec3::new(value, 0.0, 0.0));
    let entry = data.points[index].metadata_entry;
    data.metadata.set_value("Value", entry, value).unwrap();
  }
  data
}

#[test]
fn test_unit_rule_partition_sizes() {
  let values = [0.0, 5.0, 9.0, 10.0, 19.0, 20.0];
  let source = values_source(&values);
  let rule = PartitionRule::new(10.0);
  let partitions = Partitions::new(None);

  for point in &source.points {
    let key = rule.filter(point.position.x).unwrap();
    partitions.distribute_point(&source, point, key);
  }

  let sorted = partitions.into_sorted();
  let keys: Vec<_> = sorted.iter().map(|(key, _)| *key).collect();
  let sizes: Vec<_> = sorted.iter().map(|(_, data)| data.len()).collect();
  assert_eq!(keys, vec![0, 1, 2]);
  assert_eq!(sizes, vec![3, 2, 1]);
}

#[test]
fn test_copies_metadata_and_tags_key() {
  let source = values_source(&[3.0, 42.0]);
  let partitions = Partitions::new(Some("PartitionKey".into()));
  partitions.distribute_point(&source, &source.points[1], 4);

  let partition = partitions.get(4).unwrap();
  let data = partition.read();
  let point = data.points[0];
  assert_eq!(point.position.x, 42.0);
  assert_eq!(
    data.metadata.value("Value", point.metadata_entry),
    Some(&AttributeValue::Double(42.0))
  );
  assert_eq!(
    data.metadata.value("PartitionKey", point.metadata_entry),
    Some(&AttributeValue::Int64(4))
  );
}

#[test]
fn test_key_attribute_replaces_conflicting_source_attribute() {
  let mut source = PointData::new();
  source
    .metadata
    .create_attribute("PartitionKey", AttributeValue::from("old"));
  let index = source.add_point(DVec3::ZERO);
  let entry = source.points[index].metadata_entry;
  source.metadata.set_value("PartitionKey", entry, "stale").unwrap();

  let partitions = Partitions::new(Some("PartitionKey".into()));
  partitions.distribute_point(&source, &source.points[0], -3);

  let (_, data) = partitions.into_sorted().remove(0);
  assert_eq!(
    data.metadata.value("PartitionKey", data.points[0].metadata_entry),
    Some(&AttributeValue::Int64(-3))
  );
}

#[test]
fn test_no_tagging_without_key_attribute() {
  let source = values_source(&[1.0]);
  let partitions = Partitions::new(None);
  partitions.distribute_point(&source, &source.points[0], 0);
  let (_, data) = partitions.into_sorted().remove(0);
  assert!(!data.metadata.has_attribute("PartitionKey"));
}

#[test]
fn test_concurrent_distribution_creates_each_partition_once() {
  let values: Vec<f64> = (0..4000).map(|i| (i % 97) as f64).collect();
  let source = values_source(&values);
  let rule = PartitionRule::new(10.0);
  let partitions = Partitions::new(Some("Key".into()));

  std::thread::scope(|scope| {
    for chunk in source.points.chunks(250) {
      let partitions = &partitions;
      let source = &source;
      scope.spawn(move || {
        for point in chunk {
          let key = rule.filter(point.position.x).unwrap();
          partitions.distribute_point(source, point, key);
        }
      });
    }
  });

  assert_eq!(partitions.keys(), (0..10).collect::<Vec<_>>());
  let sorted = partitions.into_sorted();
  let total: usize = sorted.iter().map(|(_, data)| data.len()).sum();
  assert_eq!(total, values.len());
  for (key, data) in &sorted {
    for point in &data.points {
      assert_eq!(rule.filter(point.position.x).unwrap(), *key);
      assert_eq!(
        data.metadata.value("Key", point.metadata_entry),
        Some(&AttributeValue::Int64(*key))
      );
    }
  }
}
