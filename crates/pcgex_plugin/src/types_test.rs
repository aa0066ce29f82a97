use super::*;

#[test]
fn test_new_point_has_no_entry() {
  let point = Point::new(DVec3::new(1.0, 2.0, 3.0));
  assert!(!point.has_entry());
  assert_eq!(point.metadata_entry, INVALID_ENTRY);
}

#[test]
fn test_numeric_views() {
  assert_eq!(AttributeValue::Bool(true).as_f64(), Some(1.0));
  assert_eq!(AttributeValue::Int64(-4).as_f64(), Some(-4.0));
  assert_eq!(AttributeValue::Double(2.5).as_f64(), Some(2.5));
  assert_eq!(AttributeValue::Vector(DVec3::ONE).as_f64(), None);
  assert_eq!(AttributeValue::from("x").as_f64(), None);

  assert_eq!(AttributeValue::Int64(7).as_i64(), Some(7));
  assert_eq!(AttributeValue::Double(7.0).as_i64(), None);
}

#[test]
fn test_zero_matches_type() {
  for value_type in [
    AttributeType::Bool,
    AttributeType::Int64,
    AttributeType::Double,
    AttributeType::Vector,
    AttributeType::String,
  ] {
    assert_eq!(AttributeValue::zero(value_type).value_type(), value_type);
  }
}
